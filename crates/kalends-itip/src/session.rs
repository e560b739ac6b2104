//! Edit sessions: the narrow interface an editor collaborator drives.
//!
//! A session clones the selected component, takes explicit synchronous
//! field updates (no listener cascades), and on commit resolves the legal
//! change scopes, asks the host to choose one, runs the reviser/deleter,
//! and applies the resulting envelopes to the calendar.

use std::collections::BTreeMap;

use kalends_core::capability::{Clock, UidSource};
use kalends_ical::core::{EndSpec, RecurrenceRule, Temporal, VComponent};

use crate::calendar::VCalendar;
use crate::error::{EngineError, EngineResult};
use crate::materialize::Series;
use crate::message::ItipMessage;
use crate::revise::{ReviseInput, delete, revise};
use crate::scope::{
    ChangeScope, ScopeRange, resolve_delete_choices, resolve_revise_choices,
};

/// Host-supplied resolution of an ambiguous scope choice. Returning `None`
/// or [`ChangeScope::Cancel`] aborts the operation.
pub type ScopeChooser<'c> =
    Box<dyn FnOnce(&BTreeMap<ChangeScope, ScopeRange>) -> Option<ChangeScope> + 'c>;

/// One in-flight edit of a single selected occurrence.
pub struct EditSession<'a> {
    calendar: &'a mut VCalendar,
    uid_source: &'a dyn UidSource,
    clock: &'a dyn Clock,
    uid: String,
    /// The component being edited: master, or the override itself when the
    /// selected occurrence is one.
    original: VComponent,
    edited: VComponent,
    selected_start: Temporal,
    selected_end: Temporal,
    /// Category list supplied by the host for its pickers.
    categories: Vec<String>,
}

impl<'a> EditSession<'a> {
    /// Begins an edit of the occurrence of `uid` starting at
    /// `selected_start`.
    ///
    /// The edited working copy starts out rebased to the selected
    /// occurrence: its DTSTART/DTEND carry that occurrence's times.
    ///
    /// ## Errors
    /// Returns `MissingSeries` for an unknown UID.
    pub fn setup(
        calendar: &'a mut VCalendar,
        uid_source: &'a dyn UidSource,
        clock: &'a dyn Clock,
        uid: &str,
        selected_start: Temporal,
        selected_end: Temporal,
        categories: Vec<String>,
    ) -> EngineResult<Self> {
        let series = calendar.series(uid)?;

        // When the selected occurrence is already an override, the edit
        // targets the override component itself. The host may hand us
        // either the override's displayed start or the occurrence it
        // replaced; accept both.
        let original = series
            .overrides
            .iter()
            .find(|o| {
                o.dtstart.matches(&selected_start)
                    || o.recurrence_id
                        .as_ref()
                        .is_some_and(|rid| rid.matches(&selected_start))
            })
            .copied()
            .unwrap_or(series.master)
            .clone();

        let mut edited = original.clone();
        edited.recurrence_id = None;
        edited.dtstart = selected_start.clone();
        edited.end = match &original.end {
            Some(EndSpec::Span(span)) => Some(EndSpec::Span(*span)),
            Some(EndSpec::DtEnd(_)) => Some(EndSpec::DtEnd(selected_end.clone())),
            None => None,
        };

        Ok(Self {
            calendar,
            uid_source,
            clock,
            uid: uid.to_string(),
            original,
            edited,
            selected_start,
            selected_end,
            categories,
        })
    }

    /// The categories available to the host's pickers.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The selected occurrence's pre-edit start and end.
    #[must_use]
    pub fn selected_occurrence(&self) -> (&Temporal, &Temporal) {
        (&self.selected_start, &self.selected_end)
    }

    /// The edited working copy.
    #[must_use]
    pub const fn edited(&self) -> &VComponent {
        &self.edited
    }

    /// Moves the selected occurrence's start, keeping its length.
    pub fn set_start(&mut self, start: Temporal) {
        let span = self.edited.span_seconds();
        self.edited.dtstart = start;
        if let (Some(span), Some(EndSpec::DtEnd(_))) = (span, &self.edited.end) {
            self.edited.end = Some(EndSpec::DtEnd(self.edited.dtstart.plus_seconds(span)));
        }
    }

    /// Sets the selected occurrence's end.
    pub fn set_end(&mut self, end: Temporal) {
        self.edited.end = Some(EndSpec::DtEnd(end));
    }

    /// Replaces the recurrence rule of the working copy.
    pub fn set_rule(&mut self, rule: Option<RecurrenceRule>) {
        self.edited.rrule = rule;
    }

    /// Sets the summary.
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.edited.summary = Some(summary.into());
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.edited.description = Some(description.into());
    }

    /// Sets the location.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.edited.location = Some(location.into());
    }

    /// Sets the categories.
    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.edited.categories = categories;
    }

    /// Commits the edit: resolves legal scopes, lets the host choose, runs
    /// the reviser, and applies the result to the calendar.
    ///
    /// Returns the applied envelopes; empty when the host cancelled.
    ///
    /// ## Errors
    /// Returns a validation error for an illegal scope choice or an
    /// inconsistent edit; the calendar is unchanged on error.
    pub fn revise(self, chooser: ScopeChooser<'_>) -> EngineResult<Vec<ItipMessage>> {
        let series = self.calendar.series(&self.uid)?;

        let choices = if self.original.is_override() {
            // An override is a single instance; only a single-occurrence
            // edit is meaningful.
            let mut choices = BTreeMap::new();
            choices.insert(
                ChangeScope::One,
                ScopeRange::single(self.selected_start.clone()),
            );
            choices
        } else {
            resolve_revise_choices(&series, &self.edited, &self.selected_start)
        };

        let Some(scope) = chooser(&choices) else {
            return Ok(Vec::new());
        };
        if scope == ChangeScope::Cancel {
            return Ok(Vec::new());
        }
        if !choices.contains_key(&scope) {
            return Err(EngineError::Validation(format!(
                "scope {scope:?} is not legal for this edit"
            )));
        }

        let overrides: Vec<&VComponent> = if self.original.is_override() {
            Vec::new()
        } else {
            series.overrides.clone()
        };

        let input = ReviseInput {
            original: &self.original,
            overrides,
            edited: &self.edited,
            selected_start: &self.selected_start,
        };
        let messages = revise(scope, &input, self.uid_source, self.clock)?;

        self.calendar.process_messages(&messages)?;
        Ok(messages)
    }

    /// Commits a deletion at the selected occurrence.
    ///
    /// Returns the applied envelopes; empty when the host cancelled.
    ///
    /// ## Errors
    /// Returns a validation error for an illegal scope choice; the
    /// calendar is unchanged on error.
    pub fn delete(self, chooser: ScopeChooser<'_>) -> EngineResult<Vec<ItipMessage>> {
        let series = self.calendar.series(&self.uid)?;

        let choices = resolve_delete_choices(&series, &self.selected_start);

        let Some(scope) = chooser(&choices) else {
            return Ok(Vec::new());
        };
        if scope == ChangeScope::Cancel {
            return Ok(Vec::new());
        }
        if !choices.contains_key(&scope) {
            return Err(EngineError::Validation(format!(
                "scope {scope:?} is not legal for this deletion"
            )));
        }

        let master = series.master.clone();
        let overrides: Vec<VComponent> =
            series.overrides.iter().map(|o| (*o).clone()).collect();
        let override_refs: Vec<&VComponent> = overrides.iter().collect();

        let messages = delete(
            scope,
            &master,
            &override_refs,
            &self.selected_start,
            self.clock,
        )?;

        self.calendar.process_messages(&messages)?;
        Ok(messages)
    }
}
