//! Shared RRULE expansion cases.
//!
//! Each case is a DTSTART + RRULE pair with the expected leading
//! occurrences in RFC 5545 text form. Values are taken from RFC 5545
//! §3.8.5.3 examples or worked out by hand.

pub struct RRuleCase {
    pub name: &'static str,
    pub dtstart: &'static str,
    pub rrule: &'static str,
    pub expected: &'static [&'static str],
}

pub fn rrule_cases() -> Vec<RRuleCase> {
    vec![
        RRuleCase {
            name: "daily_basic",
            dtstart: "20120201T093000Z",
            rrule: "FREQ=DAILY;COUNT=3",
            expected: &["20120201T093000Z", "20120202T093000Z", "20120203T093000Z"],
        },
        RRuleCase {
            name: "weekly_tu_th",
            dtstart: "19970902T090000",
            rrule: "FREQ=WEEKLY;COUNT=4;BYDAY=TU,TH",
            expected: &[
                "19970902T090000",
                "19970904T090000",
                "19970909T090000",
                "19970911T090000",
            ],
        },
        RRuleCase {
            name: "every_other_week",
            dtstart: "19970902T090000",
            rrule: "FREQ=WEEKLY;INTERVAL=2;COUNT=4",
            expected: &[
                "19970902T090000",
                "19970916T090000",
                "19970930T090000",
                "19971014T090000",
            ],
        },
        RRuleCase {
            name: "monthly_first_day",
            dtstart: "20120101T090000",
            rrule: "FREQ=MONTHLY;COUNT=3;BYMONTHDAY=1",
            expected: &["20120101T090000", "20120201T090000", "20120301T090000"],
        },
        RRuleCase {
            name: "monthly_last_day",
            dtstart: "20120131T090000",
            rrule: "FREQ=MONTHLY;COUNT=3;BYMONTHDAY=-1",
            expected: &["20120131T090000", "20120229T090000", "20120331T090000"],
        },
        RRuleCase {
            name: "monthly_first_friday",
            dtstart: "19970905T090000",
            rrule: "FREQ=MONTHLY;COUNT=3;BYDAY=1FR",
            expected: &["19970905T090000", "19971003T090000", "19971107T090000"],
        },
        RRuleCase {
            name: "monthly_last_weekday_setpos",
            dtstart: "20151130T100000",
            rrule: "FREQ=MONTHLY;COUNT=3;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
            expected: &["20151130T100000", "20151231T100000", "20160129T100000"],
        },
        RRuleCase {
            name: "yearly_basic",
            dtstart: "20120101T090000",
            rrule: "FREQ=YEARLY;COUNT=3",
            expected: &["20120101T090000", "20130101T090000", "20140101T090000"],
        },
        RRuleCase {
            name: "yearly_byyearday_interval",
            dtstart: "19970101T090000",
            rrule: "FREQ=YEARLY;INTERVAL=3;COUNT=4;BYYEARDAY=1,100,200",
            expected: &[
                "19970101T090000",
                "19970410T090000",
                "19970719T090000",
                "20000101T090000",
            ],
        },
        RRuleCase {
            name: "yearly_week20_monday",
            dtstart: "19970512T090000",
            rrule: "FREQ=YEARLY;COUNT=3;BYWEEKNO=20;BYDAY=MO",
            expected: &["19970512T090000", "19980511T090000", "19990517T090000"],
        },
        RRuleCase {
            name: "yearly_thanksgiving",
            dtstart: "19971127T090000",
            rrule: "FREQ=YEARLY;COUNT=3;BYMONTH=11;BYDAY=4TH",
            expected: &["19971127T090000", "19981126T090000", "19991125T090000"],
        },
        RRuleCase {
            name: "hourly_basic",
            dtstart: "20120101T090000",
            rrule: "FREQ=HOURLY;COUNT=3",
            expected: &["20120101T090000", "20120101T100000", "20120101T110000"],
        },
        RRuleCase {
            name: "until_inclusive",
            dtstart: "20151109T100000",
            rrule: "FREQ=DAILY;UNTIL=20151111T100000",
            expected: &["20151109T100000", "20151110T100000", "20151111T100000"],
        },
    ]
}
