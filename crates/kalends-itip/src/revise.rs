//! The reviser/deleter state machine (iTIP semantics, RFC 5546).
//!
//! Given a chosen [`ChangeScope`], the original series, and an edited copy,
//! this module computes the minimal ordered list of envelopes that realizes
//! the change. The edited copy follows one convention throughout: its
//! DTSTART/end are *rebased to the selected occurrence* — they carry the
//! (possibly shifted) start and end of the occurrence the user touched, not
//! of the series' first occurrence.
//!
//! Dispatch is a closed match over the scope; each arm builds its output
//! components by cloning and mutating explicitly.

use kalends_core::capability::{Clock, UidSource};
use kalends_ical::core::{Duration, EndSpec, RecurrenceEnd, Temporal, VComponent};

use crate::error::{EngineError, EngineResult};
use crate::message::ItipMessage;
use crate::scope::ChangeScope;

/// Inputs of one revision.
pub struct ReviseInput<'a> {
    /// The component being edited: the series master, or the override
    /// itself when the selected occurrence already is one.
    pub original: &'a VComponent,
    /// The master's overrides (empty when `original` is an override).
    pub overrides: Vec<&'a VComponent>,
    /// Edited copy, rebased to the selected occurrence.
    pub edited: &'a VComponent,
    /// Start of the occurrence the user selected (pre-edit).
    pub selected_start: &'a Temporal,
}

/// Runs the reviser for `scope`.
///
/// ## Errors
///
/// Returns a validation error when the edit is inconsistent with the scope
/// (rule change under `One`, future-split without a rule, UID mismatch) or
/// when a component violates model invariants.
#[tracing::instrument(skip_all, fields(scope = ?scope, uid = %input.original.uid))]
pub fn revise(
    scope: ChangeScope,
    input: &ReviseInput<'_>,
    uid_source: &dyn UidSource,
    clock: &dyn Clock,
) -> EngineResult<Vec<ItipMessage>> {
    input.original.validate()?;
    input.edited.validate()?;
    if input.edited.uid != input.original.uid {
        return Err(EngineError::Validation(format!(
            "edited copy changed UID from {} to {}",
            input.original.uid, input.edited.uid
        )));
    }
    if !input
        .edited
        .dtstart
        .kind()
        .same_category(input.original.dtstart.kind())
    {
        return Err(EngineError::InconsistentTemporalType {
            expected: input.original.dtstart.kind(),
            found: input.edited.dtstart.kind(),
        });
    }

    let messages = match scope {
        ChangeScope::Cancel => Vec::new(),
        ChangeScope::One => revise_one(input, clock)?,
        ChangeScope::All | ChangeScope::AllIgnoreOverrides => {
            revise_all(scope, input, clock)
        }
        ChangeScope::ThisAndFuture | ChangeScope::ThisAndFutureIgnoreOverrides => {
            revise_this_and_future(scope, input, uid_source, clock)?
        }
    };

    tracing::debug!(envelopes = messages.len(), "revision computed");
    Ok(messages)
}

/// Scope ONE: detach or update a single occurrence.
fn revise_one(input: &ReviseInput<'_>, clock: &dyn Clock) -> EngineResult<Vec<ItipMessage>> {
    if input.original.rrule != input.edited.rrule {
        return Err(EngineError::Validation(
            "a single-occurrence edit cannot change the recurrence rule".to_string(),
        ));
    }

    let now = clock.now_utc();

    if input.original.is_override() {
        // The selected occurrence already is a detached instance; update it
        // in place.
        let mut updated = rebuild_override(input.edited, input.selected_start.clone());
        updated.recurrence_id = input.original.recurrence_id.clone();
        updated.sequence = input.original.sequence + 1;
        updated.dtstamp = now;
        return Ok(vec![ItipMessage::request(vec![updated])]);
    }

    // Master keeps its shape but excludes the occurrence; a net-new
    // override carries the edited fields.
    let mut master = input.original.clone();
    master.exdates.insert(input.selected_start.clone());
    master.sequence += 1;
    master.dtstamp = now;

    let mut detached = rebuild_override(input.edited, input.selected_start.clone());
    detached.sequence = 0;
    detached.dtstamp = now;

    Ok(vec![
        ItipMessage::request(vec![master]),
        ItipMessage::publish(vec![detached]),
    ])
}

/// Scope ALL: rewrite the master, optionally republishing overrides.
fn revise_all(
    scope: ChangeScope,
    input: &ReviseInput<'_>,
    clock: &dyn Clock,
) -> Vec<ItipMessage> {
    let original = input.original;
    let edited = input.edited;
    let delta = input.selected_start.seconds_until(&edited.dtstart);

    let mut master = original.clone();

    if delta != 0 {
        master.dtstart = original.dtstart.plus_seconds(delta);
        // Exceptions and extra dates name occurrence starts; they move with
        // the series.
        master.exdates = master
            .exdates
            .iter()
            .map(|ex| ex.plus_seconds(delta))
            .collect();
        master.rdates = master.rdates.iter().map(|rd| rd.plus_seconds(delta)).collect();
    }

    master.end = match (&original.end, edited.span_seconds()) {
        (_, None) => None,
        (Some(EndSpec::Span(_)), Some(span)) => {
            Some(EndSpec::Span(Duration::from_seconds(span)))
        }
        (_, Some(span)) => Some(EndSpec::DtEnd(master.dtstart.plus_seconds(span))),
    };

    if !original.descriptive_eq(edited) {
        master.summary = edited.summary.clone();
        master.description = edited.description.clone();
        master.location = edited.location.clone();
        master.organizer = edited.organizer.clone();
        master.categories = edited.categories.clone();
    }
    master.rrule = edited.rrule.clone();

    master.sequence += 1;
    master.dtstamp = clock.now_utc();

    let mut messages = vec![ItipMessage::request(vec![master])];

    if scope.ignores_overrides() && !input.overrides.is_empty() {
        let untouched: Vec<VComponent> =
            input.overrides.iter().map(|o| (*o).clone()).collect();
        messages.push(ItipMessage::publish(untouched));
    }

    messages
}

/// Scope THIS-AND-FUTURE: truncate the master and split off a new series.
fn revise_this_and_future(
    scope: ChangeScope,
    input: &ReviseInput<'_>,
    uid_source: &dyn UidSource,
    clock: &dyn Clock,
) -> EngineResult<Vec<ItipMessage>> {
    let original = input.original;
    let edited = input.edited;
    let split = input.selected_start;

    let Some(original_rule) = &original.rrule else {
        return Err(EngineError::Validation(
            "a future-split requires a recurring series".to_string(),
        ));
    };

    let now = clock.now_utc();
    let delta = split.seconds_until(&edited.dtstart);
    let until = boundary_before(split);

    // (a) The original master ends just before the split.
    let mut truncated = original.clone();
    let mut truncated_rule = original_rule.clone();
    truncated_rule.end = RecurrenceEnd::Until(until);
    truncated.rrule = Some(truncated_rule);
    truncated.exdates.retain(|ex| ex < split);
    truncated.rdates.retain(|rd| rd < split);
    truncated.sequence += 1;
    truncated.dtstamp = now;

    // (b) A new component owns everything from the split on.
    let mut future = edited.clone();
    future.uid = uid_source.next_uid();
    future.related_to = Some(original.uid.clone());
    future.recurrence_id = None;
    future.sequence = 0;
    future.dtstamp = now;

    let mut future_rule = edited.rrule.clone().unwrap_or_else(|| original_rule.clone());
    if edited.rrule.as_ref() == Some(original_rule)
        || edited.rrule.is_none()
    {
        // Rule untouched: the new series continues the old one, so a COUNT
        // sheds the occurrences the first half already consumed.
        if let RecurrenceEnd::Count(n) = original_rule.end {
            let consumed = u32::try_from(
                original_rule
                    .occurrences(&original.dtstart)
                    .take_while(|occ| occ < split)
                    .count(),
            )
            .unwrap_or(n);
            future_rule.end = RecurrenceEnd::Count(n.saturating_sub(consumed).max(1));
        }
    }
    future.rrule = Some(future_rule);

    future.exdates = original
        .exdates
        .iter()
        .filter(|ex| *ex >= split)
        .map(|ex| ex.plus_seconds(delta))
        .collect();
    future.rdates = original
        .rdates
        .iter()
        .filter(|rd| *rd >= split)
        .map(|rd| rd.plus_seconds(delta))
        .collect();

    let future_uid = future.uid.clone();
    let mut messages = vec![
        ItipMessage::request(vec![truncated]),
        ItipMessage::publish(vec![future]),
    ];

    // (c) Overrides at or after the split.
    let affected: Vec<&VComponent> = input
        .overrides
        .iter()
        .copied()
        .filter(|o| o.recurrence_id.as_ref().is_some_and(|rid| rid >= split))
        .collect();

    if !affected.is_empty() {
        if scope.ignores_overrides() {
            // Republished unchanged; they stay parented to the old UID.
            let untouched: Vec<VComponent> = affected.iter().map(|o| (*o).clone()).collect();
            messages.push(ItipMessage::publish(untouched));
        } else {
            // Re-parented under the new series; the old entries go away.
            let stale: Vec<VComponent> = affected.iter().map(|o| (*o).clone()).collect();
            messages.push(ItipMessage::cancel(stale));

            let reparented: Vec<VComponent> = affected
                .iter()
                .map(|o| {
                    let mut moved = (*o).clone();
                    moved.uid = future_uid.clone();
                    moved.recurrence_id =
                        o.recurrence_id.as_ref().map(|rid| rid.plus_seconds(delta));
                    moved.dtstamp = now;
                    moved
                })
                .collect();
            messages.push(ItipMessage::publish(reparented));
        }
    }

    Ok(messages)
}

/// Runs the deleter for `scope`.
///
/// The same machine as [`revise`], restricted: One adds an exception date
/// with no replacement, All cancels the whole series, ThisAndFuture
/// truncates and drops future overrides.
///
/// ## Errors
///
/// Returns a validation error for future-splits on non-recurring series or
/// invariant violations.
#[tracing::instrument(skip_all, fields(scope = ?scope, uid = %master.uid))]
pub fn delete(
    scope: ChangeScope,
    master: &VComponent,
    overrides: &[&VComponent],
    selected_start: &Temporal,
    clock: &dyn Clock,
) -> EngineResult<Vec<ItipMessage>> {
    master.validate()?;
    let now = clock.now_utc();

    let messages = match scope {
        ChangeScope::Cancel => Vec::new(),
        ChangeScope::One => {
            let mut revised = master.clone();
            revised.exdates.insert(selected_start.clone());
            revised.sequence += 1;
            revised.dtstamp = now;

            let mut messages = vec![ItipMessage::request(vec![revised])];

            // An override of the deleted occurrence goes away with it.
            let doomed: Vec<VComponent> = overrides
                .iter()
                .filter(|o| {
                    o.recurrence_id
                        .as_ref()
                        .is_some_and(|rid| rid.matches(selected_start))
                })
                .map(|o| (*o).clone())
                .collect();
            if !doomed.is_empty() {
                messages.push(ItipMessage::cancel(doomed));
            }
            messages
        }
        ChangeScope::All | ChangeScope::AllIgnoreOverrides => {
            let mut gone = vec![master.clone()];
            gone.extend(overrides.iter().map(|o| (*o).clone()));
            vec![ItipMessage::cancel(gone)]
        }
        ChangeScope::ThisAndFuture | ChangeScope::ThisAndFutureIgnoreOverrides => {
            let Some(rule) = &master.rrule else {
                return Err(EngineError::Validation(
                    "a future-split requires a recurring series".to_string(),
                ));
            };

            let mut truncated = master.clone();
            let mut truncated_rule = rule.clone();
            truncated_rule.end = RecurrenceEnd::Until(boundary_before(selected_start));
            truncated.rrule = Some(truncated_rule);
            truncated.exdates.retain(|ex| ex < selected_start);
            truncated.rdates.retain(|rd| rd < selected_start);
            truncated.sequence += 1;
            truncated.dtstamp = now;

            let mut messages = vec![ItipMessage::request(vec![truncated])];

            let dropped: Vec<VComponent> = overrides
                .iter()
                .filter(|o| {
                    o.recurrence_id
                        .as_ref()
                        .is_some_and(|rid| rid >= selected_start)
                })
                .map(|o| (*o).clone())
                .collect();
            if !dropped.is_empty() {
                messages.push(ItipMessage::cancel(dropped));
            }
            messages
        }
    };

    tracing::debug!(envelopes = messages.len(), "deletion computed");
    Ok(messages)
}

/// The boundary "immediately before" an occurrence start, in the series'
/// own temporal form: one second for timed series, one day for whole-day
/// series.
fn boundary_before(split: &Temporal) -> Temporal {
    if split.is_whole_day() {
        split.plus_days(-1)
    } else {
        split.plus_seconds(-1)
    }
}

/// Shapes the edited copy into a standalone single-occurrence override.
fn rebuild_override(edited: &VComponent, recurrence_id: Temporal) -> VComponent {
    let mut component = edited.clone();
    component.rrule = None;
    component.rdates.clear();
    component.exdates.clear();
    component.related_to = None;
    component.recurrence_id = Some(recurrence_id);
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use kalends_core::capability::{FixedClock, FnUidSource};
    use kalends_ical::core::RecurrenceRule;
    use crate::message::ItipMethod;

    fn floating(y: i32, mo: u32, d: u32, h: u32) -> Temporal {
        Temporal::floating(
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2015, 11, 8, 8, 0, 0).unwrap())
    }

    fn uid_source() -> impl UidSource {
        FnUidSource(|| "split-1@kalends".to_string())
    }

    fn daily_master() -> VComponent {
        VComponent::event("daily@kalends", floating(2015, 11, 9, 10))
            .with_dtend(floating(2015, 11, 9, 11))
            .with_summary("Daily standup")
            .with_rrule(RecurrenceRule::daily())
    }

    /// Edited copy rebased to `selected`, shifted by `shift_hours`.
    fn rebased(master: &VComponent, selected: &Temporal, shift_hours: i64) -> VComponent {
        let mut edited = master.clone();
        edited.dtstart = selected.plus_seconds(shift_hours * 3600);
        edited.end = Some(EndSpec::DtEnd(edited.dtstart.plus_seconds(3600)));
        edited
    }

    #[test]
    fn one_detaches_occurrence() {
        let master = daily_master();
        let selected = floating(2015, 11, 11, 10);
        let mut edited = rebased(&master, &selected, 4);
        edited.summary = Some("Moved standup".to_string());

        let input = ReviseInput {
            original: &master,
            overrides: Vec::new(),
            edited: &edited,
            selected_start: &selected,
        };
        let messages = revise(ChangeScope::One, &input, &uid_source(), &clock()).unwrap();

        assert_eq!(messages.len(), 2);

        // REQUEST: master gains the exception date, SEQUENCE bumps.
        assert_eq!(messages[0].method, ItipMethod::Request);
        let master2 = &messages[0].components[0];
        assert!(master2.exdates.iter().any(|ex| ex.matches(&selected)));
        assert_eq!(master2.sequence, 1);
        assert_eq!(master2.dtstamp, clock().0);

        // PUBLISH: net-new override at the edited time.
        assert_eq!(messages[1].method, ItipMethod::Publish);
        let detached = &messages[1].components[0];
        assert_eq!(detached.recurrence_id, Some(selected.clone()));
        assert_eq!(detached.dtstart, floating(2015, 11, 11, 14));
        assert_eq!(detached.sequence, 0);
        assert!(detached.rrule.is_none());
        assert!(detached.related_to.is_none());
        assert_eq!(detached.summary.as_deref(), Some("Moved standup"));
    }

    #[test]
    fn one_rejects_rule_change() {
        let master = daily_master();
        let selected = floating(2015, 11, 11, 10);
        let mut edited = rebased(&master, &selected, 0);
        edited.rrule = Some(RecurrenceRule::weekly());

        let input = ReviseInput {
            original: &master,
            overrides: Vec::new(),
            edited: &edited,
            selected_start: &selected,
        };
        assert!(revise(ChangeScope::One, &input, &uid_source(), &clock()).is_err());
    }

    #[test]
    fn one_updates_existing_override() {
        let selected = floating(2015, 11, 11, 10);
        let existing = VComponent::event("daily@kalends", floating(2015, 11, 11, 14))
            .with_dtend(floating(2015, 11, 11, 15))
            .with_recurrence_id(selected.clone());
        let mut edited = existing.clone();
        edited.recurrence_id = None;
        edited.dtstart = floating(2015, 11, 11, 16);
        edited.end = Some(EndSpec::DtEnd(floating(2015, 11, 11, 17)));

        let input = ReviseInput {
            original: &existing,
            overrides: Vec::new(),
            edited: &edited,
            selected_start: &selected,
        };
        let messages = revise(ChangeScope::One, &input, &uid_source(), &clock()).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].method, ItipMethod::Request);
        let updated = &messages[0].components[0];
        assert_eq!(updated.sequence, 1);
        assert_eq!(updated.recurrence_id, Some(selected));
        assert_eq!(updated.dtstart, floating(2015, 11, 11, 16));
    }

    #[test]
    fn all_applies_descriptive_edit() {
        let master = daily_master();
        let selected = floating(2015, 11, 11, 10);
        let mut edited = rebased(&master, &selected, 0);
        edited.summary = Some("Renamed".to_string());

        let input = ReviseInput {
            original: &master,
            overrides: Vec::new(),
            edited: &edited,
            selected_start: &selected,
        };
        let messages = revise(ChangeScope::All, &input, &uid_source(), &clock()).unwrap();

        assert_eq!(messages.len(), 1);
        let master2 = &messages[0].components[0];
        assert_eq!(master2.summary.as_deref(), Some("Renamed"));
        // Times unchanged.
        assert_eq!(master2.dtstart, floating(2015, 11, 9, 10));
        assert_eq!(master2.sequence, 1);
    }

    #[test]
    fn all_time_shift_moves_series() {
        let master = daily_master();
        let selected = floating(2015, 11, 11, 10);
        // Same descriptive fields, start moved two hours later.
        let edited = rebased(&master, &selected, 2);

        let input = ReviseInput {
            original: &master,
            overrides: Vec::new(),
            edited: &edited,
            selected_start: &selected,
        };
        let messages = revise(ChangeScope::All, &input, &uid_source(), &clock()).unwrap();

        let master2 = &messages[0].components[0];
        assert_eq!(master2.dtstart, floating(2015, 11, 9, 12));
        assert_eq!(
            master2.end,
            Some(EndSpec::DtEnd(floating(2015, 11, 9, 13)))
        );
    }

    #[test]
    fn all_ignore_republishes_overrides() {
        let master = daily_master();
        let selected = floating(2015, 11, 11, 10);
        let moved = VComponent::event("daily@kalends", floating(2015, 11, 12, 14))
            .with_recurrence_id(floating(2015, 11, 12, 10));
        let mut edited = rebased(&master, &selected, 0);
        edited.summary = Some("Renamed".to_string());

        let input = ReviseInput {
            original: &master,
            overrides: vec![&moved],
            edited: &edited,
            selected_start: &selected,
        };
        let messages =
            revise(ChangeScope::AllIgnoreOverrides, &input, &uid_source(), &clock()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].method, ItipMethod::Publish);
        assert_eq!(messages[1].components[0], moved);
    }

    #[test]
    fn this_and_future_splits_series() {
        let master = daily_master();
        let selected = floating(2016, 5, 16, 10);
        let edited = rebased(&master, &selected, 0);

        let input = ReviseInput {
            original: &master,
            overrides: Vec::new(),
            edited: &edited,
            selected_start: &selected,
        };
        let messages =
            revise(ChangeScope::ThisAndFuture, &input, &uid_source(), &clock()).unwrap();

        assert_eq!(messages.len(), 2);

        // Original master truncated just before the split.
        let truncated = &messages[0].components[0];
        let rule = truncated.rrule.as_ref().unwrap();
        assert_eq!(
            rule.end,
            RecurrenceEnd::Until(floating(2016, 5, 16, 10).plus_seconds(-1))
        );
        assert_eq!(truncated.sequence, 1);
        assert_eq!(truncated.uid, "daily@kalends");

        // New series from the split on.
        assert_eq!(messages[1].method, ItipMethod::Publish);
        let future = &messages[1].components[0];
        assert_eq!(future.uid, "split-1@kalends");
        assert_eq!(future.related_to.as_deref(), Some("daily@kalends"));
        assert_eq!(future.dtstart, selected);
        assert_eq!(future.sequence, 0);
        assert_eq!(future.rrule.as_ref().unwrap().end, RecurrenceEnd::Never);
    }

    #[test]
    fn this_and_future_adjusts_count() {
        let master = daily_master().with_rrule(RecurrenceRule::daily().with_count(10));
        // 2015-11-14 is the 6th occurrence; 5 consumed before it.
        let selected = floating(2015, 11, 14, 10);
        let edited = {
            let mut e = master.clone();
            e.dtstart = selected.clone();
            e.end = Some(EndSpec::DtEnd(selected.plus_seconds(3600)));
            e
        };

        let input = ReviseInput {
            original: &master,
            overrides: Vec::new(),
            edited: &edited,
            selected_start: &selected,
        };
        let messages =
            revise(ChangeScope::ThisAndFuture, &input, &uid_source(), &clock()).unwrap();

        let future = &messages[1].components[0];
        assert_eq!(
            future.rrule.as_ref().unwrap().end,
            RecurrenceEnd::Count(5)
        );
    }

    #[test]
    fn this_and_future_reparents_overrides() {
        let master = daily_master();
        let selected = floating(2016, 5, 16, 10);
        let before = VComponent::event("daily@kalends", floating(2016, 5, 10, 14))
            .with_recurrence_id(floating(2016, 5, 10, 10));
        let after = VComponent::event("daily@kalends", floating(2016, 5, 20, 14))
            .with_recurrence_id(floating(2016, 5, 20, 10));
        let edited = rebased(&master, &selected, 0);

        let input = ReviseInput {
            original: &master,
            overrides: vec![&before, &after],
            edited: &edited,
            selected_start: &selected,
        };
        let messages =
            revise(ChangeScope::ThisAndFuture, &input, &uid_source(), &clock()).unwrap();

        // REQUEST + PUBLISH(new) + CANCEL(stale) + PUBLISH(reparented)
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].method, ItipMethod::Cancel);
        assert_eq!(messages[2].components[0].uid, "daily@kalends");
        assert_eq!(messages[3].method, ItipMethod::Publish);
        let reparented = &messages[3].components[0];
        assert_eq!(reparented.uid, "split-1@kalends");
        assert_eq!(
            reparented.recurrence_id,
            Some(floating(2016, 5, 20, 10))
        );
    }

    #[test]
    fn cancel_is_a_no_op() {
        let master = daily_master();
        let selected = floating(2015, 11, 11, 10);
        let edited = rebased(&master, &selected, 0);
        let input = ReviseInput {
            original: &master,
            overrides: Vec::new(),
            edited: &edited,
            selected_start: &selected,
        };
        let messages = revise(ChangeScope::Cancel, &input, &uid_source(), &clock()).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn delete_one_adds_exception() {
        let master = daily_master();
        let selected = floating(2015, 11, 11, 10);
        let messages = delete(ChangeScope::One, &master, &[], &selected, &clock()).unwrap();

        assert_eq!(messages.len(), 1);
        let revised = &messages[0].components[0];
        assert!(revised.exdates.iter().any(|ex| ex.matches(&selected)));
        assert_eq!(revised.sequence, 1);
    }

    #[test]
    fn delete_one_cancels_override_too() {
        let master = daily_master();
        let selected = floating(2015, 11, 11, 10);
        let moved = VComponent::event("daily@kalends", floating(2015, 11, 11, 14))
            .with_recurrence_id(selected.clone());
        let messages =
            delete(ChangeScope::One, &master, &[&moved], &selected, &clock()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].method, ItipMethod::Cancel);
    }

    #[test]
    fn delete_all_cancels_series() {
        let master = daily_master();
        let moved = VComponent::event("daily@kalends", floating(2015, 11, 11, 14))
            .with_recurrence_id(floating(2015, 11, 11, 10));
        let messages = delete(
            ChangeScope::All,
            &master,
            &[&moved],
            &floating(2015, 11, 11, 10),
            &clock(),
        )
        .unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].method, ItipMethod::Cancel);
        assert_eq!(messages[0].components.len(), 2);
    }

    #[test]
    fn delete_future_truncates_and_drops() {
        let master = daily_master();
        let selected = floating(2016, 5, 16, 10);
        let after = VComponent::event("daily@kalends", floating(2016, 5, 20, 14))
            .with_recurrence_id(floating(2016, 5, 20, 10));
        let messages = delete(
            ChangeScope::ThisAndFuture,
            &master,
            &[&after],
            &selected,
            &clock(),
        )
        .unwrap();

        assert_eq!(messages.len(), 2);
        let truncated = &messages[0].components[0];
        assert_eq!(
            truncated.rrule.as_ref().unwrap().end,
            RecurrenceEnd::Until(selected.plus_seconds(-1))
        );
        assert_eq!(messages[1].method, ItipMethod::Cancel);
    }

    #[test]
    fn whole_day_split_backs_off_one_day() {
        let day = Temporal::date(NaiveDate::from_ymd_opt(2015, 11, 9).unwrap());
        let master = VComponent::event("allday@kalends", day.clone())
            .with_rrule(RecurrenceRule::daily());
        let selected = day.plus_days(5);
        let messages =
            delete(ChangeScope::ThisAndFuture, &master, &[], &selected, &clock()).unwrap();
        let truncated = &messages[0].components[0];
        assert_eq!(
            truncated.rrule.as_ref().unwrap().end,
            RecurrenceEnd::Until(day.plus_days(4))
        );
    }
}
