//! iCalendar core models (RFC 5545).
//!
//! These types are designed for:
//! - Round-trip fidelity: preserving unknown properties and parameters
//! - Deterministic serialization: canonical ordering for stable output
//! - Type safety: scheduling semantics live on closed enums, not strings

mod component;
mod duration;
mod parameter;
mod property;
mod rrule;
mod temporal;
mod vcomponent;

pub use component::{Component, ComponentKind, ICalendar};
pub use duration::Duration;
pub use parameter::Parameter;
pub use property::{ContentLine, Property, PropertyValue};
pub use rrule::{ByDay, Frequency, RecurrenceEnd, RecurrenceRule, Weekday};
pub use temporal::{Temporal, TemporalKind};
pub use vcomponent::{EndSpec, SchedulableKind, VComponent};
