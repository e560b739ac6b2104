//! Typed calendar components (VEVENT / VTODO / VJOURNAL).
//!
//! [`VComponent`] carries the scheduling semantics of a component: identity,
//! start/end, recurrence, override linkage, and sequence numbering. The
//! generic [`Component`](super::Component) layer remains the round-trip
//! representation; conversion between the two lives here.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use kalends_core::error::{CoreError, CoreResult};

use super::property::names;
use super::{
    Component, ComponentKind, Duration, Property, PropertyValue, RecurrenceRule, Temporal,
};

/// The closed set of component kinds the scheduling engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulableKind {
    Event,
    Todo,
    Journal,
}

impl SchedulableKind {
    /// Returns the component name (`VEVENT`, `VTODO`, `VJOURNAL`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Journal => "VJOURNAL",
        }
    }

    /// Maps from the generic component kind; `None` for kinds the engine
    /// does not schedule (VFREEBUSY, VALARM, VTIMEZONE, ...).
    #[must_use]
    pub const fn from_component_kind(kind: ComponentKind) -> Option<Self> {
        match kind {
            ComponentKind::Event => Some(Self::Event),
            ComponentKind::Todo => Some(Self::Todo),
            ComponentKind::Journal => Some(Self::Journal),
            _ => None,
        }
    }

    /// Maps into the generic component kind.
    #[must_use]
    pub const fn to_component_kind(self) -> ComponentKind {
        match self {
            Self::Event => ComponentKind::Event,
            Self::Todo => ComponentKind::Todo,
            Self::Journal => ComponentKind::Journal,
        }
    }

    /// Name of the end property for this kind (DTEND for events, DUE for
    /// todos; journals carry no end).
    #[must_use]
    pub const fn end_property(self) -> Option<&'static str> {
        match self {
            Self::Event => Some(names::DTEND),
            Self::Todo => Some(names::DUE),
            Self::Journal => None,
        }
    }
}

impl std::fmt::Display for SchedulableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// End of a component: an explicit end time or a duration, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndSpec {
    /// DTEND (or DUE for todos).
    DtEnd(Temporal),
    /// DURATION relative to DTSTART.
    Span(Duration),
}

/// A typed calendar component.
///
/// One instance is either a series master (no `recurrence_id`) or an
/// override of a single occurrence (`recurrence_id` set, never a rule).
#[derive(Debug, Clone, PartialEq)]
pub struct VComponent {
    /// Component kind.
    pub kind: SchedulableKind,
    /// Unique identifier; all members of a series share it.
    pub uid: String,
    /// Start of the (first) occurrence.
    pub dtstart: Temporal,
    /// End time or duration.
    pub end: Option<EndSpec>,
    /// Instant this representation was produced; refreshed on every
    /// revision.
    pub dtstamp: DateTime<Utc>,
    /// Revision counter, monotonically non-decreasing.
    pub sequence: u32,
    /// Recurrence rule; absent on overrides and one-shot components.
    pub rrule: Option<RecurrenceRule>,
    /// Additional explicit occurrence starts (RDATE).
    pub rdates: Vec<Temporal>,
    /// Occurrence starts excluded from expansion (EXDATE).
    pub exdates: BTreeSet<Temporal>,
    /// The occurrence this component overrides; absent on masters.
    pub recurrence_id: Option<Temporal>,
    /// UID of the master a split-off future series was derived from.
    pub related_to: Option<String>,
    /// SUMMARY text.
    pub summary: Option<String>,
    /// DESCRIPTION text.
    pub description: Option<String>,
    /// LOCATION text.
    pub location: Option<String>,
    /// ORGANIZER cal-address.
    pub organizer: Option<String>,
    /// CATEGORIES entries.
    pub categories: Vec<String>,
    /// Properties this model does not interpret, preserved for round-trip.
    pub extra: Vec<Property>,
}

impl VComponent {
    /// Creates a component with the mandatory fields and defaults elsewhere.
    #[must_use]
    pub fn new(kind: SchedulableKind, uid: impl Into<String>, dtstart: Temporal) -> Self {
        Self {
            kind,
            uid: uid.into(),
            dtstart,
            end: None,
            dtstamp: DateTime::<Utc>::UNIX_EPOCH,
            sequence: 0,
            rrule: None,
            rdates: Vec::new(),
            exdates: BTreeSet::new(),
            recurrence_id: None,
            related_to: None,
            summary: None,
            description: None,
            location: None,
            organizer: None,
            categories: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Creates a VEVENT.
    #[must_use]
    pub fn event(uid: impl Into<String>, dtstart: Temporal) -> Self {
        Self::new(SchedulableKind::Event, uid, dtstart)
    }

    /// Creates a VTODO.
    #[must_use]
    pub fn todo(uid: impl Into<String>, dtstart: Temporal) -> Self {
        Self::new(SchedulableKind::Todo, uid, dtstart)
    }

    /// Creates a VJOURNAL.
    #[must_use]
    pub fn journal(uid: impl Into<String>, dtstart: Temporal) -> Self {
        Self::new(SchedulableKind::Journal, uid, dtstart)
    }

    /// Sets DTEND.
    #[must_use]
    pub fn with_dtend(mut self, end: Temporal) -> Self {
        self.end = Some(EndSpec::DtEnd(end));
        self
    }

    /// Sets DURATION.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.end = Some(EndSpec::Span(duration));
        self
    }

    /// Sets the recurrence rule.
    #[must_use]
    pub fn with_rrule(mut self, rule: RecurrenceRule) -> Self {
        self.rrule = Some(rule);
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the organizer.
    #[must_use]
    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = Some(organizer.into());
        self
    }

    /// Sets the categories.
    #[must_use]
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Sets DTSTAMP.
    #[must_use]
    pub fn with_dtstamp(mut self, dtstamp: DateTime<Utc>) -> Self {
        self.dtstamp = dtstamp;
        self
    }

    /// Marks this component as the override of one occurrence.
    #[must_use]
    pub fn with_recurrence_id(mut self, recurrence_id: Temporal) -> Self {
        self.recurrence_id = Some(recurrence_id);
        self
    }

    /// Returns whether this component overrides a single occurrence.
    #[must_use]
    pub const fn is_override(&self) -> bool {
        self.recurrence_id.is_some()
    }

    /// Returns whether this component repeats.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.rrule.is_some()
    }

    /// Length of one occurrence in seconds, when an end is specified.
    #[must_use]
    pub fn span_seconds(&self) -> Option<i64> {
        match &self.end {
            Some(EndSpec::DtEnd(end)) => Some(self.dtstart.seconds_until(end)),
            Some(EndSpec::Span(duration)) => Some(duration.as_seconds()),
            None => None,
        }
    }

    /// End of the occurrence that starts at `start`, derived from this
    /// component's span. Without an end spec, whole-day components span one
    /// day and timed components are instantaneous.
    #[must_use]
    pub fn occurrence_end(&self, start: &Temporal) -> Temporal {
        let span = self.span_seconds().unwrap_or_else(|| {
            if self.dtstart.is_whole_day() {
                86_400
            } else {
                0
            }
        });
        start.plus_seconds(span)
    }

    /// Returns whether the descriptive fields of two components are equal
    /// (summary, description, location, organizer, categories).
    #[must_use]
    pub fn descriptive_eq(&self, other: &Self) -> bool {
        self.summary == other.summary
            && self.description == other.description
            && self.location == other.location
            && self.organizer == other.organizer
            && self.categories == other.categories
    }

    /// Checks the component invariants.
    ///
    /// ## Errors
    ///
    /// Returns a validation error when DTSTART and the end disagree on the
    /// date vs date-time category, the end precedes the start, an override
    /// carries a rule, an EXDATE disagrees with DTSTART's category, or the
    /// rule itself is invalid.
    pub fn validate(&self) -> CoreResult<()> {
        if self.uid.is_empty() {
            return Err(CoreError::ValidationError(
                "component UID must not be empty".to_string(),
            ));
        }

        if let Some(EndSpec::DtEnd(end)) = &self.end {
            if !end.kind().same_category(self.dtstart.kind()) {
                return Err(CoreError::ValidationError(format!(
                    "DTSTART is {} but the end is {}",
                    self.dtstart.kind(),
                    end.kind()
                )));
            }
            if end < &self.dtstart {
                return Err(CoreError::ValidationError(format!(
                    "end {end} precedes start {}",
                    self.dtstart
                )));
            }
        }

        if self.recurrence_id.is_some() && self.rrule.is_some() {
            return Err(CoreError::ValidationError(
                "an override (RECURRENCE-ID) must not carry an RRULE".to_string(),
            ));
        }

        if let Some(rid) = &self.recurrence_id
            && !rid.kind().same_category(self.dtstart.kind())
        {
            return Err(CoreError::ValidationError(format!(
                "RECURRENCE-ID is {} but DTSTART is {}",
                rid.kind(),
                self.dtstart.kind()
            )));
        }

        for exdate in &self.exdates {
            if !exdate.kind().same_category(self.dtstart.kind()) {
                return Err(CoreError::ValidationError(format!(
                    "EXDATE {exdate} is {} but DTSTART is {}",
                    exdate.kind(),
                    self.dtstart.kind()
                )));
            }
        }

        if let Some(rule) = &self.rrule {
            rule.validate(self.dtstart.kind())?;
        }

        Ok(())
    }

    /// Builds a typed component from a parsed generic component.
    ///
    /// ## Errors
    ///
    /// Returns an error for non-schedulable kinds, missing UID/DTSTART, or
    /// malformed field values.
    pub fn from_component(component: &Component) -> CoreResult<Self> {
        let kind = component
            .kind
            .and_then(SchedulableKind::from_component_kind)
            .ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "component {} is not schedulable",
                    component.name
                ))
            })?;

        let uid = component
            .uid()
            .ok_or_else(|| CoreError::InvalidInput("component has no UID".to_string()))?
            .to_string();

        let dtstart = component
            .get_property(names::DTSTART)
            .and_then(Property::as_temporal)
            .cloned()
            .ok_or_else(|| CoreError::InvalidInput("component has no DTSTART".to_string()))?;

        let mut typed = Self::new(kind, uid, dtstart);

        if let Some(end) = component
            .get_property(names::DTEND)
            .or_else(|| component.get_property(names::DUE))
            .and_then(Property::as_temporal)
        {
            typed.end = Some(EndSpec::DtEnd(end.clone()));
        } else if let Some(duration) = component
            .get_property(names::DURATION)
            .and_then(Property::as_duration)
        {
            typed.end = Some(EndSpec::Span(*duration));
        }

        if let Some(Temporal::Utc(stamp)) = component
            .get_property(names::DTSTAMP)
            .and_then(Property::as_temporal)
        {
            typed.dtstamp = *stamp;
        }

        if let Some(sequence) = component
            .get_property(names::SEQUENCE)
            .and_then(Property::as_integer)
        {
            typed.sequence = u32::try_from(sequence).map_err(|_| {
                CoreError::InvalidInput(format!("negative SEQUENCE {sequence}"))
            })?;
        }

        if let Some(rule) = component
            .get_property(names::RRULE)
            .and_then(|p| p.value.as_recur())
        {
            typed.rrule = Some(rule.clone());
        }

        for prop in component.get_properties(names::EXDATE) {
            if let Some(list) = prop.value.as_temporal_list() {
                typed.exdates.extend(list.into_iter().cloned());
            }
        }

        for prop in component.get_properties(names::RDATE) {
            if let Some(list) = prop.value.as_temporal_list() {
                typed.rdates.extend(list.into_iter().cloned());
            }
        }

        typed.recurrence_id = component
            .get_property(names::RECURRENCE_ID)
            .and_then(Property::as_temporal)
            .cloned();

        typed.related_to = component
            .get_property(names::RELATED_TO)
            .and_then(Property::as_text)
            .map(ToString::to_string);

        typed.summary = component
            .get_property(names::SUMMARY)
            .and_then(Property::as_text)
            .map(ToString::to_string);
        typed.description = component
            .get_property(names::DESCRIPTION)
            .and_then(Property::as_text)
            .map(ToString::to_string);
        typed.location = component
            .get_property(names::LOCATION)
            .and_then(Property::as_text)
            .map(ToString::to_string);

        typed.organizer = component.get_property(names::ORGANIZER).map(|p| match &p.value {
            PropertyValue::Uri(uri) => uri.clone(),
            _ => p.raw_value.clone(),
        });

        if let Some(prop) = component.get_property(names::CATEGORIES) {
            typed.categories = match &prop.value {
                PropertyValue::TextList(list) => list.clone(),
                PropertyValue::Text(s) => vec![s.clone()],
                _ => Vec::new(),
            };
        }

        let modeled = [
            names::UID,
            names::DTSTART,
            names::DTEND,
            names::DUE,
            names::DURATION,
            names::DTSTAMP,
            names::SEQUENCE,
            names::RRULE,
            names::RDATE,
            names::EXDATE,
            names::RECURRENCE_ID,
            names::RELATED_TO,
            names::SUMMARY,
            names::DESCRIPTION,
            names::LOCATION,
            names::ORGANIZER,
            names::CATEGORIES,
        ];
        typed.extra = component
            .properties
            .iter()
            .filter(|p| !modeled.contains(&p.name.as_str()))
            .cloned()
            .collect();

        Ok(typed)
    }

    /// Renders this component back into the generic layer.
    #[must_use]
    pub fn to_component(&self) -> Component {
        let mut component = Component::new(self.kind.to_component_kind());

        if !self.categories.is_empty() {
            component.add_property(Property::text_list(names::CATEGORIES, self.categories.clone()));
        }

        component.add_property(Property::temporal(names::DTSTART, self.dtstart.clone()));

        match &self.end {
            Some(EndSpec::DtEnd(end)) => {
                if let Some(name) = self.kind.end_property() {
                    component.add_property(Property::temporal(name, end.clone()));
                }
            }
            Some(EndSpec::Span(duration)) => {
                component.add_property(Property::duration(names::DURATION, *duration));
            }
            None => {}
        }

        if let Some(description) = &self.description {
            component.add_property(Property::text(names::DESCRIPTION, description));
        }
        if let Some(summary) = &self.summary {
            component.add_property(Property::text(names::SUMMARY, summary));
        }

        component.add_property(Property::temporal(
            names::DTSTAMP,
            Temporal::utc(self.dtstamp),
        ));
        component.add_property(Property::text(names::UID, &self.uid));

        if let Some(rule) = &self.rrule {
            component.add_property(Property::recur(names::RRULE, rule.clone()));
        }
        if !self.rdates.is_empty() {
            component.add_property(Property::temporal_list(names::RDATE, self.rdates.clone()));
        }
        if !self.exdates.is_empty() {
            component.add_property(Property::temporal_list(
                names::EXDATE,
                self.exdates.iter().cloned().collect(),
            ));
        }

        if let Some(organizer) = &self.organizer {
            let mut prop = Property::text(names::ORGANIZER, organizer);
            prop.value = PropertyValue::Uri(organizer.clone());
            component.add_property(prop);
        }
        if let Some(location) = &self.location {
            component.add_property(Property::text(names::LOCATION, location));
        }
        if let Some(rid) = &self.recurrence_id {
            component.add_property(Property::temporal(names::RECURRENCE_ID, rid.clone()));
        }
        if let Some(related_to) = &self.related_to {
            component.add_property(Property::text(names::RELATED_TO, related_to));
        }

        component.add_property(Property::integer(
            names::SEQUENCE,
            i32::try_from(self.sequence).unwrap_or(i32::MAX),
        ));

        for prop in &self.extra {
            component.add_property(prop.clone());
        }

        component
    }
}
