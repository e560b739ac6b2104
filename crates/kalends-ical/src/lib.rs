//! RFC 5545 (iCalendar) layer: object model, content-line parser,
//! canonical serializer, timezone resolution, and the recurrence-rule
//! expansion engine.
//!
//! The model is split in two layers:
//! - a generic property-bag layer (`core::Component`) that preserves
//!   unknown properties and X-components for round-trip fidelity, and
//! - a typed layer (`core::VComponent`) carrying the scheduling semantics
//!   (identity, start/end, recurrence, overrides, sequence numbering).

pub mod build;
pub mod core;
pub mod expand;
pub mod parse;
