//! Golden-output tests: emitted envelopes render to exact canonical bytes,
//! and canonical text survives a parse/serialize round trip unchanged.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use kalends_core::capability::{FixedClock, FnUidSource};
use kalends_ical::build::serialize;
use kalends_ical::core::{RecurrenceRule, Temporal, VComponent};
use kalends_ical::parse::parse;
use kalends_itip::{ChangeScope, EditSession, ItipMessage, ScopeRange, VCalendar};

const PRODID: &str = "-//Kalends//Kalends Scheduling Engine//EN";

fn floating(y: i32, mo: u32, d: u32, h: u32) -> Temporal {
    Temporal::floating(
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap(),
    )
}

fn daily_calendar() -> VCalendar {
    let mut calendar = VCalendar::default();
    calendar
        .upsert(
            VComponent::event("series-1@kalends", floating(2015, 11, 9, 10))
                .with_dtend(floating(2015, 11, 9, 11))
                .with_summary("Morning briefing")
                .with_categories(vec!["Work".to_string()])
                .with_rrule(RecurrenceRule::daily())
                .with_dtstamp(Utc.with_ymd_and_hms(2015, 11, 8, 8, 0, 0).unwrap()),
        )
        .unwrap();
    calendar
}

#[test_log::test]
fn delete_one_request_renders_exact_bytes() {
    let mut calendar = daily_calendar();
    let uid_source = FnUidSource(|| "unused@kalends".to_string());
    let clock = FixedClock(Utc.with_ymd_and_hms(2016, 5, 1, 12, 0, 0).unwrap());

    let session = EditSession::setup(
        &mut calendar,
        &uid_source,
        &clock,
        "series-1@kalends",
        floating(2015, 11, 11, 10),
        floating(2015, 11, 11, 11),
        Vec::new(),
    )
    .unwrap();

    let messages = session
        .delete(Box::new(
            |choices: &BTreeMap<ChangeScope, ScopeRange>| {
                assert!(choices.contains_key(&ChangeScope::One));
                Some(ChangeScope::One)
            },
        ))
        .unwrap();

    let expected = "\
BEGIN:VCALENDAR\r\n\
METHOD:REQUEST\r\n\
PRODID:-//Kalends//Kalends Scheduling Engine//EN\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
CATEGORIES:Work\r\n\
DTSTART:20151109T100000\r\n\
DTEND:20151109T110000\r\n\
SUMMARY:Morning briefing\r\n\
DTSTAMP:20160501T120000Z\r\n\
UID:series-1@kalends\r\n\
RRULE:FREQ=DAILY\r\n\
EXDATE:20151111T100000\r\n\
SEQUENCE:1\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    assert_eq!(messages[0].to_text(PRODID), expected);
}

#[test_log::test]
fn override_publish_renders_recurrence_id() {
    let clock_stamp = Utc.with_ymd_and_hms(2016, 5, 1, 12, 0, 0).unwrap();
    let detached = VComponent::event("series-1@kalends", floating(2015, 11, 11, 14))
        .with_dtend(floating(2015, 11, 11, 15))
        .with_summary("One-off deep dive")
        .with_recurrence_id(floating(2015, 11, 11, 10))
        .with_dtstamp(clock_stamp);

    let expected = "\
BEGIN:VCALENDAR\r\n\
METHOD:PUBLISH\r\n\
PRODID:-//Kalends//Kalends Scheduling Engine//EN\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20151111T140000\r\n\
DTEND:20151111T150000\r\n\
SUMMARY:One-off deep dive\r\n\
DTSTAMP:20160501T120000Z\r\n\
UID:series-1@kalends\r\n\
RECURRENCE-ID:20151111T100000\r\n\
SEQUENCE:0\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    assert_eq!(
        ItipMessage::publish(vec![detached]).to_text(PRODID),
        expected
    );
}

#[test_log::test]
fn canonical_text_round_trips_byte_identical() {
    let canonical = "\
BEGIN:VCALENDAR\r\n\
METHOD:PUBLISH\r\n\
PRODID:-//Kalends//Kalends Scheduling Engine//EN\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
CATEGORIES:Work\r\n\
DTSTART;TZID=America/New_York:20151109T100000\r\n\
DTEND;TZID=America/New_York:20151109T110000\r\n\
DESCRIPTION:Bring the Q4 numbers\\, printed\r\n\
SUMMARY:Morning briefing\r\n\
DTSTAMP:20151108T080000Z\r\n\
UID:series-1@kalends\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR\r\n\
ORGANIZER:mailto:lead@example.com\r\n\
LOCATION:Room 4\r\n\
SEQUENCE:0\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTSTART;TZID=America/New_York:20151111T140000\r\n\
DTEND;TZID=America/New_York:20151111T150000\r\n\
SUMMARY:Morning briefing (moved)\r\n\
DTSTAMP:20151110T080000Z\r\n\
UID:series-1@kalends\r\n\
RECURRENCE-ID;TZID=America/New_York:20151111T100000\r\n\
SEQUENCE:1\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    let parsed = parse(canonical).unwrap();
    assert_eq!(serialize(&parsed), canonical);

    // A second pass through the typed layer must not change the bytes
    // either.
    let envelope = ItipMessage::from_text(canonical).unwrap();
    assert_eq!(envelope.to_text(PRODID), canonical);
}

#[test_log::test]
fn related_to_splits_render_in_canonical_slot() {
    let mut future = VComponent::event("series-2@kalends", floating(2016, 5, 16, 10))
        .with_dtend(floating(2016, 5, 16, 11))
        .with_summary("Morning briefing")
        .with_rrule(RecurrenceRule::daily())
        .with_dtstamp(Utc.with_ymd_and_hms(2016, 5, 1, 12, 0, 0).unwrap());
    future.related_to = Some("series-1@kalends".to_string());

    let text = ItipMessage::publish(vec![future]).to_text(PRODID);

    let related_pos = text.find("RELATED-TO:series-1@kalends\r\n").unwrap();
    let sequence_pos = text.find("SEQUENCE:0\r\n").unwrap();
    let summary_pos = text.find("SUMMARY:").unwrap();
    assert!(summary_pos < related_pos);
    assert!(related_pos < sequence_pos);
}
