//! The VCALENDAR aggregate: an ordered component list with
//! (UID, RECURRENCE-ID) keyed lookup and transactional iTIP application.

use std::collections::BTreeMap;

use kalends_ical::core::{ICalendar, SchedulableKind, VComponent};

use crate::appointment::{Appointment, InstanceKey, Window};
use crate::error::{EngineError, EngineResult};
use crate::materialize::{Series, materialize};
use crate::message::{ItipMessage, ItipMethod};

/// In-memory calendar: every component of every series, in arrival order.
///
/// Components are addressed by [`InstanceKey`]; each UID forms one series
/// with exactly one master (no RECURRENCE-ID) and any number of overrides.
#[derive(Debug, Clone)]
pub struct VCalendar {
    /// PRODID stamped on rendered envelopes.
    pub prodid: String,
    /// iCalendar VERSION string.
    pub version: String,
    components: Vec<VComponent>,
    applied: Vec<Vec<ItipMessage>>,
}

impl VCalendar {
    /// Creates an empty calendar.
    #[must_use]
    pub fn new(prodid: impl Into<String>) -> Self {
        Self {
            prodid: prodid.into(),
            version: "2.0".to_string(),
            components: Vec::new(),
            applied: Vec::new(),
        }
    }

    /// Returns all components in arrival order.
    #[must_use]
    pub fn components(&self) -> &[VComponent] {
        &self.components
    }

    /// Returns the component with the given key.
    #[must_use]
    pub fn get(&self, key: &InstanceKey) -> Option<&VComponent> {
        self.components.iter().find(|c| component_key(c) == *key)
    }

    /// Returns the series for a UID: its master plus all overrides.
    ///
    /// ## Errors
    /// Returns `MissingSeries` when no master with that UID exists.
    pub fn series(&self, uid: &str) -> EngineResult<Series<'_>> {
        let master = self
            .components
            .iter()
            .find(|c| c.uid == uid && !c.is_override())
            .ok_or_else(|| EngineError::MissingSeries(uid.to_string()))?;
        let overrides: Vec<&VComponent> = self
            .components
            .iter()
            .filter(|c| c.uid == uid && c.is_override())
            .collect();
        Series::new(master, overrides)
    }

    /// Inserts or replaces a component directly (initial load path).
    ///
    /// ## Errors
    /// Returns an error when the component violates model invariants.
    pub fn upsert(&mut self, component: VComponent) -> EngineResult<()> {
        component.validate()?;
        let key = component_key(&component);
        match self.components.iter_mut().find(|c| component_key(c) == key) {
            Some(slot) => *slot = component,
            None => self.components.push(component),
        }
        Ok(())
    }

    /// Applies a batch of iTIP envelopes transactionally.
    ///
    /// The whole batch is validated before any mutation; envelopes then
    /// apply strictly in emission order. PUBLISH and REQUEST upsert by key,
    /// CANCEL removes — a cancelled master takes its entire series with it.
    /// Applied batches land in an internal log the host can drain.
    ///
    /// ## Errors
    /// Returns the first validation error; the calendar is unchanged then.
    #[tracing::instrument(skip_all, fields(envelopes = messages.len()))]
    pub fn process_messages(&mut self, messages: &[ItipMessage]) -> EngineResult<()> {
        for message in messages {
            for component in &message.components {
                component.validate()?;
            }
        }

        for message in messages {
            match message.method {
                ItipMethod::Publish | ItipMethod::Request => {
                    for component in &message.components {
                        let key = component_key(component);
                        match self
                            .components
                            .iter_mut()
                            .find(|c| component_key(c) == key)
                        {
                            Some(slot) => *slot = component.clone(),
                            None => self.components.push(component.clone()),
                        }
                    }
                }
                ItipMethod::Cancel => {
                    for component in &message.components {
                        if component.is_override() {
                            let key = component_key(component);
                            self.components.retain(|c| component_key(c) != key);
                        } else {
                            // Cancelling a master removes the whole series.
                            let uid = component.uid.clone();
                            self.components.retain(|c| c.uid != uid);
                        }
                    }
                }
            }
        }

        tracing::debug!(components = self.components.len(), "batch applied");
        self.applied.push(messages.to_vec());
        Ok(())
    }

    /// Drains the log of applied envelope batches (the host's event
    /// stream for persistence or display).
    pub fn take_applied(&mut self) -> Vec<Vec<ItipMessage>> {
        std::mem::take(&mut self.applied)
    }

    /// Derives the appointments of every series for a query window.
    ///
    /// Re-derivation happens after message batches are applied, never
    /// per-envelope; the result is deterministic for a given state.
    ///
    /// ## Errors
    /// Returns an error when a stored component violates invariants.
    pub fn appointments(&self, window: &Window) -> EngineResult<Vec<Appointment>> {
        let mut by_uid: BTreeMap<&str, Vec<&VComponent>> = BTreeMap::new();
        for component in &self.components {
            by_uid.entry(component.uid.as_str()).or_default().push(component);
        }

        let mut out = Vec::new();
        for (_, group) in by_uid {
            let master = group.iter().find(|c| !c.is_override());
            match master {
                Some(master) => {
                    let overrides: Vec<&VComponent> =
                        group.iter().copied().filter(|c| c.is_override()).collect();
                    let series = Series::new(master, overrides)?;
                    out.extend(materialize(&series, window)?);
                }
                None => {
                    // Orphaned overrides render as detached instances.
                    for component in group {
                        let series = Series::solo(component);
                        out.extend(materialize(&series, window)?);
                    }
                }
            }
        }

        out.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.key.cmp(&b.key)));
        Ok(out)
    }

    /// Loads every schedulable component of a parsed iCalendar document.
    ///
    /// ## Errors
    /// Returns an error for non-schedulable components or invariant
    /// violations; nothing is loaded on error.
    pub fn load_ical(&mut self, ical: &ICalendar) -> EngineResult<()> {
        let mut incoming = Vec::new();
        for child in &ical.root.children {
            let kind = child.kind.unwrap_or(kalends_ical::core::ComponentKind::Unknown);
            if SchedulableKind::from_component_kind(kind).is_none() {
                return Err(EngineError::UnsupportedComponentType(kind));
            }
            let component = VComponent::from_component(child)?;
            component.validate()?;
            incoming.push(component);
        }
        for component in incoming {
            self.upsert(component)?;
        }
        Ok(())
    }
}

impl Default for VCalendar {
    fn default() -> Self {
        Self::new("-//Kalends//Kalends Scheduling Engine//EN")
    }
}

/// Key of a stored component.
fn component_key(component: &VComponent) -> InstanceKey {
    InstanceKey {
        uid: component.uid.clone(),
        recurrence_id: component.recurrence_id.clone(),
    }
}
