//! Recurrence expansion and timezone resolution.

mod engine;
mod timezone;

pub use engine::OccurrenceIter;
pub use timezone::{TimezoneError, TzResolver};
