//! iTIP message envelopes (RFC 5546).
//!
//! The reviser/deleter emits ordered lists of envelopes; each envelope is a
//! method plus the component snapshots it carries, and renders to a
//! standalone VCALENDAR text.

use kalends_ical::build::serialize;
use kalends_ical::core::{ICalendar, VComponent};
use kalends_ical::parse::parse;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// iTIP method of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItipMethod {
    /// Net-new components the receiver did not have.
    Publish,
    /// Updates to components the receiver already holds.
    Request,
    /// Removal of components.
    Cancel,
}

impl ItipMethod {
    /// Returns the METHOD property value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "PUBLISH",
            Self::Request => "REQUEST",
            Self::Cancel => "CANCEL",
        }
    }

    /// Parses a METHOD property value (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "PUBLISH" => Self::Publish,
            "REQUEST" => Self::Request,
            "CANCEL" => Self::Cancel,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ItipMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One iTIP envelope: a method and the components it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ItipMessage {
    pub method: ItipMethod,
    pub components: Vec<VComponent>,
}

impl ItipMessage {
    /// Creates an envelope.
    #[must_use]
    pub fn new(method: ItipMethod, components: Vec<VComponent>) -> Self {
        Self { method, components }
    }

    /// Creates a PUBLISH envelope.
    #[must_use]
    pub fn publish(components: Vec<VComponent>) -> Self {
        Self::new(ItipMethod::Publish, components)
    }

    /// Creates a REQUEST envelope.
    #[must_use]
    pub fn request(components: Vec<VComponent>) -> Self {
        Self::new(ItipMethod::Request, components)
    }

    /// Creates a CANCEL envelope.
    #[must_use]
    pub fn cancel(components: Vec<VComponent>) -> Self {
        Self::new(ItipMethod::Cancel, components)
    }

    /// Renders this envelope as an iCalendar document.
    #[must_use]
    pub fn to_ical(&self, prodid: &str) -> ICalendar {
        let mut ical = ICalendar::with_method(prodid, self.method.as_str());
        for component in &self.components {
            ical.add_component(component.to_component());
        }
        ical
    }

    /// Renders this envelope as canonical iCalendar text.
    #[must_use]
    pub fn to_text(&self, prodid: &str) -> String {
        serialize(&self.to_ical(prodid))
    }

    /// Parses an inbound iTIP text into an envelope.
    ///
    /// ## Errors
    /// Returns an error for invalid iCalendar text, a missing or unknown
    /// METHOD, or components the engine does not schedule.
    pub fn from_text(text: &str) -> EngineResult<Self> {
        let ical = parse(text)?;
        let method = ical
            .method()
            .and_then(ItipMethod::parse)
            .ok_or_else(|| {
                EngineError::Validation("iTIP text carries no known METHOD".to_string())
            })?;

        let components = ical
            .root
            .children
            .iter()
            .map(VComponent::from_component)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { method, components })
    }
}
