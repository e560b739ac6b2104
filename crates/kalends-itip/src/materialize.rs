//! Occurrence materialization: rule expansion + exceptions + overrides
//! flattened into renderable [`Appointment`]s for a query window.

use kalends_ical::core::{Temporal, VComponent};

use crate::appointment::{Appointment, InstanceKey, Window};
use crate::error::{EngineError, EngineResult};

/// Hard cap on occurrences expanded for one query, matching the default
/// `expansion.max_instances` setting.
const MAX_INSTANCES: usize = 10_000;

/// One logical series: the master component plus its overrides (components
/// sharing the UID and carrying a RECURRENCE-ID).
#[derive(Debug, Clone)]
pub struct Series<'a> {
    pub master: &'a VComponent,
    pub overrides: Vec<&'a VComponent>,
}

impl<'a> Series<'a> {
    /// Creates a series with no overrides.
    #[must_use]
    pub fn solo(master: &'a VComponent) -> Self {
        Self {
            master,
            overrides: Vec::new(),
        }
    }

    /// Creates a series, checking that every override belongs to the
    /// master's UID.
    ///
    /// ## Errors
    /// Returns a validation error when an override has a different UID or
    /// no RECURRENCE-ID.
    pub fn new(master: &'a VComponent, overrides: Vec<&'a VComponent>) -> EngineResult<Self> {
        for component in &overrides {
            if component.uid != master.uid {
                return Err(EngineError::Validation(format!(
                    "override UID {} does not match series UID {}",
                    component.uid, master.uid
                )));
            }
            if component.recurrence_id.is_none() {
                return Err(EngineError::Validation(format!(
                    "series {} has two masters",
                    master.uid
                )));
            }
        }
        Ok(Self { master, overrides })
    }

    /// Generated occurrence starts up to (not including) `limit`,
    /// exceptions applied, RDATE union included.
    #[must_use]
    pub fn occurrence_starts(&self, limit: &Temporal) -> Vec<Temporal> {
        let master = self.master;
        let mut starts: Vec<Temporal> = match &master.rrule {
            Some(rule) => rule
                .occurrences(&master.dtstart)
                .take_while(|occ| occ < limit)
                .take(MAX_INSTANCES)
                .collect(),
            None => {
                if &master.dtstart < limit {
                    vec![master.dtstart.clone()]
                } else {
                    Vec::new()
                }
            }
        };

        for rdate in &master.rdates {
            if rdate < limit && !starts.iter().any(|s| s.matches(rdate)) {
                starts.push(rdate.clone());
            }
        }
        starts.sort();

        starts.retain(|start| !master.exdates.iter().any(|ex| ex.matches(start)));
        starts
    }
}

/// Materializes the series into appointments for `window`.
///
/// Generated occurrences whose start matches an override's RECURRENCE-ID
/// are replaced by the override (which always wins); overrides that match
/// no generated occurrence render as detached instances.
///
/// The result is deterministic: the same series and window always produce
/// the same list.
///
/// ## Errors
///
/// Returns an error when the master or an override violates component
/// invariants.
#[tracing::instrument(skip(series, window), fields(uid = %series.master.uid))]
pub fn materialize(series: &Series<'_>, window: &Window) -> EngineResult<Vec<Appointment>> {
    series.master.validate()?;
    for component in &series.overrides {
        component.validate()?;
    }

    let master = series.master;
    let mut appointments = Vec::new();
    let mut used_overrides = vec![false; series.overrides.len()];

    for start in series.occurrence_starts(&window.end) {
        let override_idx = series.overrides.iter().position(|o| {
            o.recurrence_id
                .as_ref()
                .is_some_and(|rid| rid.matches(&start))
        });

        match override_idx {
            Some(idx) => {
                used_overrides[idx] = true;
                push_if_visible(&mut appointments, series.overrides[idx], None, window);
            }
            None => {
                push_if_visible(&mut appointments, master, Some(&start), window);
            }
        }
    }

    // Detached overrides: a RECURRENCE-ID that matches no generated
    // occurrence still renders.
    for (idx, component) in series.overrides.iter().enumerate() {
        if !used_overrides[idx] {
            push_if_visible(&mut appointments, component, None, window);
        }
    }

    appointments.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.key.cmp(&b.key)));

    tracing::debug!(count = appointments.len(), "materialized occurrences");

    Ok(appointments)
}

/// Builds the appointment for one occurrence and keeps it when it overlaps
/// the window. `start` is the generated start for master occurrences;
/// overrides use their own DTSTART.
fn push_if_visible(
    out: &mut Vec<Appointment>,
    component: &VComponent,
    start: Option<&Temporal>,
    window: &Window,
) {
    let start = start.unwrap_or(&component.dtstart).clone();
    let end = component.occurrence_end(&start);

    if !window.overlaps(&start, &end) {
        return;
    }

    out.push(Appointment {
        key: InstanceKey {
            uid: component.uid.clone(),
            recurrence_id: component.recurrence_id.clone(),
        },
        start,
        end,
        summary: component.summary.clone(),
        description: component.description.clone(),
        location: component.location.clone(),
        categories: component.categories.clone(),
    });
}
