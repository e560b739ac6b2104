//! Change scopes: which slices of a series an edit or deletion may target,
//! and which of them are legal for a given edit.

use std::collections::BTreeMap;

use kalends_ical::core::{Temporal, VComponent};
use serde::{Deserialize, Serialize};

use crate::materialize::Series;

/// Occurrence-scan cap used when sizing a finite series.
const MAX_SCAN: usize = 10_000;

/// The slice of a series a revision or deletion applies to.
///
/// The `IgnoreOverrides` variants behave like their base variant but leave
/// existing overrides untouched instead of rewriting them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ChangeScope {
    /// Only the selected occurrence.
    One,
    /// Every occurrence of the series.
    All,
    /// Every occurrence, republishing overrides unchanged.
    AllIgnoreOverrides,
    /// The selected occurrence and everything after it.
    ThisAndFuture,
    /// The selected occurrence and everything after it, republishing
    /// overrides unchanged.
    ThisAndFutureIgnoreOverrides,
    /// Abort the operation.
    Cancel,
}

impl ChangeScope {
    /// Returns whether this scope leaves existing overrides untouched.
    #[must_use]
    pub const fn ignores_overrides(self) -> bool {
        matches!(
            self,
            Self::AllIgnoreOverrides | Self::ThisAndFutureIgnoreOverrides
        )
    }
}

/// The date range a scope affects; `end: None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRange {
    pub start: Temporal,
    pub end: Option<Temporal>,
}

impl ScopeRange {
    /// Range covering a single occurrence.
    #[must_use]
    pub fn single(at: Temporal) -> Self {
        Self {
            start: at.clone(),
            end: Some(at),
        }
    }

    /// Range from `start` to an optional last occurrence.
    #[must_use]
    pub const fn from(start: Temporal, end: Option<Temporal>) -> Self {
        Self { start, end }
    }
}

/// Last occurrence start of the series, or `None` when the rule never ends.
fn last_occurrence(master: &VComponent) -> Option<Temporal> {
    match &master.rrule {
        None => Some(master.dtstart.clone()),
        Some(rule) if rule.is_finite() => rule
            .occurrences(&master.dtstart)
            .take(MAX_SCAN)
            .last(),
        Some(_) => None,
    }
}

/// Number of live occurrences (exceptions applied), capped at `cap`.
fn occurrence_count(master: &VComponent, cap: usize) -> usize {
    match &master.rrule {
        None => 1 + master.rdates.len().min(cap.saturating_sub(1)),
        Some(rule) => rule
            .occurrences(&master.dtstart)
            .take(cap)
            .filter(|occ| !master.exdates.iter().any(|ex| ex.matches(occ)))
            .count(),
    }
}

/// Computes the legal scopes for revising `original` into `edited` at the
/// selected occurrence, each mapped to the range it would affect.
///
/// - `One` is offered only when the recurrence rule itself is untouched.
/// - `ThisAndFuture` is offered when the selected occurrence is neither the
///   first nor the last, or when DTSTART changed.
/// - `All` is always offered.
/// - `IgnoreOverrides` variants appear when the series has overrides.
#[must_use]
pub fn resolve_revise_choices(
    series: &Series<'_>,
    edited: &VComponent,
    selected_start: &Temporal,
) -> BTreeMap<ChangeScope, ScopeRange> {
    let master = series.master;
    let mut choices = BTreeMap::new();

    let first = master.dtstart.clone();
    let last = last_occurrence(master);
    let dtstart_delta = master.dtstart.seconds_until(&edited.dtstart);
    let rule_changed = master.rrule != edited.rrule;
    let has_overrides = !series.overrides.is_empty();

    if !rule_changed {
        choices.insert(ChangeScope::One, ScopeRange::single(selected_start.clone()));
    }

    choices.insert(
        ChangeScope::All,
        ScopeRange::from(first.clone(), last.clone()),
    );
    if has_overrides {
        choices.insert(
            ChangeScope::AllIgnoreOverrides,
            ScopeRange::from(first.clone(), last.clone()),
        );
    }

    let is_first = selected_start.matches(&first);
    let is_last = last.as_ref().is_some_and(|l| selected_start.matches(l));
    if (!is_first && !is_last) || dtstart_delta != 0 {
        let shifted = selected_start.plus_seconds(dtstart_delta);
        choices.insert(
            ChangeScope::ThisAndFuture,
            ScopeRange::from(shifted.clone(), last.clone()),
        );
        if has_overrides {
            choices.insert(
                ChangeScope::ThisAndFutureIgnoreOverrides,
                ScopeRange::from(shifted, last),
            );
        }
    }

    choices
}

/// Computes the legal scopes for deleting at the selected occurrence.
///
/// `One` and `ThisAndFuture` require the series to have more than one live
/// occurrence; otherwise only `All` is offered.
#[must_use]
pub fn resolve_delete_choices(
    series: &Series<'_>,
    selected_start: &Temporal,
) -> BTreeMap<ChangeScope, ScopeRange> {
    let master = series.master;
    let mut choices = BTreeMap::new();

    let first = master.dtstart.clone();
    let last = last_occurrence(master);

    choices.insert(
        ChangeScope::All,
        ScopeRange::from(first.clone(), last.clone()),
    );

    if occurrence_count(master, 3) > 1 {
        choices.insert(ChangeScope::One, ScopeRange::single(selected_start.clone()));

        let is_first = selected_start.matches(&first);
        let is_last = last.as_ref().is_some_and(|l| selected_start.matches(l));
        if !is_first && !is_last {
            choices.insert(
                ChangeScope::ThisAndFuture,
                ScopeRange::from(selected_start.clone(), last),
            );
        }
    }

    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kalends_ical::core::RecurrenceRule;

    fn floating(y: i32, mo: u32, d: u32, h: u32) -> Temporal {
        Temporal::floating(
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    fn master() -> VComponent {
        VComponent::event("series@kalends", floating(2015, 11, 9, 10))
            .with_dtend(floating(2015, 11, 9, 11))
            .with_rrule(RecurrenceRule::daily().with_count(10))
    }

    #[test]
    fn one_offered_when_rule_untouched() {
        let master = master();
        let series = Series::solo(&master);
        let edited = master.clone().with_summary("Edited");
        let choices = resolve_revise_choices(&series, &edited, &floating(2015, 11, 12, 10));
        assert!(choices.contains_key(&ChangeScope::One));
    }

    #[test]
    fn one_withheld_when_rule_edited() {
        let master = master();
        let series = Series::solo(&master);
        let edited = master.clone().with_rrule(RecurrenceRule::weekly());
        let choices = resolve_revise_choices(&series, &edited, &floating(2015, 11, 12, 10));
        assert!(!choices.contains_key(&ChangeScope::One));
        assert!(choices.contains_key(&ChangeScope::All));
    }

    #[test]
    fn this_and_future_needs_interior_selection() {
        let master = master();
        let series = Series::solo(&master);
        let edited = master.clone().with_summary("Edited");

        // First occurrence: no THIS_AND_FUTURE.
        let choices = resolve_revise_choices(&series, &edited, &floating(2015, 11, 9, 10));
        assert!(!choices.contains_key(&ChangeScope::ThisAndFuture));

        // Last occurrence (COUNT=10 from Nov 9 is Nov 18): none either.
        let choices = resolve_revise_choices(&series, &edited, &floating(2015, 11, 18, 10));
        assert!(!choices.contains_key(&ChangeScope::ThisAndFuture));

        // Interior occurrence: offered, range runs through the last.
        let choices = resolve_revise_choices(&series, &edited, &floating(2015, 11, 12, 10));
        let range = &choices[&ChangeScope::ThisAndFuture];
        assert_eq!(range.start, floating(2015, 11, 12, 10));
        assert_eq!(range.end, Some(floating(2015, 11, 18, 10)));
    }

    #[test]
    fn dtstart_shift_unlocks_this_and_future_on_first() {
        let master = master();
        let series = Series::solo(&master);
        let mut edited = master.clone();
        edited.dtstart = floating(2015, 11, 9, 12);
        edited.end = Some(kalends_ical::core::EndSpec::DtEnd(floating(2015, 11, 9, 13)));

        let choices = resolve_revise_choices(&series, &edited, &floating(2015, 11, 9, 10));
        let range = &choices[&ChangeScope::ThisAndFuture];
        // Affected range starts at the shifted selection.
        assert_eq!(range.start, floating(2015, 11, 9, 12));
    }

    #[test]
    fn unbounded_series_has_open_range() {
        let unbounded = VComponent::event("series@kalends", floating(2015, 11, 9, 10))
            .with_rrule(RecurrenceRule::daily());
        let series = Series::solo(&unbounded);
        let edited = unbounded.clone().with_summary("Edited");
        let choices = resolve_revise_choices(&series, &edited, &floating(2016, 5, 16, 10));
        assert_eq!(choices[&ChangeScope::All].end, None);
        assert_eq!(choices[&ChangeScope::ThisAndFuture].end, None);
    }

    #[test]
    fn ignore_variants_appear_with_overrides() {
        let master = master();
        let moved = VComponent::event("series@kalends", floating(2015, 11, 12, 14))
            .with_recurrence_id(floating(2015, 11, 12, 10));
        let series = Series::new(&master, vec![&moved]).unwrap();
        let edited = master.clone().with_summary("Edited");

        let choices = resolve_revise_choices(&series, &edited, &floating(2015, 11, 13, 10));
        assert!(choices.contains_key(&ChangeScope::AllIgnoreOverrides));
        assert!(choices.contains_key(&ChangeScope::ThisAndFutureIgnoreOverrides));
    }

    #[test]
    fn delete_single_event_offers_only_all() {
        let solo = VComponent::event("solo@kalends", floating(2015, 11, 9, 10));
        let series = Series::solo(&solo);
        let choices = resolve_delete_choices(&series, &floating(2015, 11, 9, 10));
        assert_eq!(choices.len(), 1);
        assert!(choices.contains_key(&ChangeScope::All));
    }

    #[test]
    fn delete_recurring_offers_one_and_future() {
        let master = master();
        let series = Series::solo(&master);
        let choices = resolve_delete_choices(&series, &floating(2015, 11, 11, 10));
        assert!(choices.contains_key(&ChangeScope::One));
        assert!(choices.contains_key(&ChangeScope::ThisAndFuture));
        assert!(choices.contains_key(&ChangeScope::All));
    }
}
