//! Scheduling engine over the RFC 5545 layer: occurrence materialization,
//! change-scope resolution, the reviser/deleter state machine producing
//! iTIP (RFC 5546) PUBLISH/REQUEST/CANCEL envelopes, and the VCALENDAR
//! container that applies envelope batches transactionally.
//!
//! Everything here is synchronous, pure, in-memory computation; the host
//! (a GUI, a sync daemon) owns I/O, persistence, and edit serialization.

pub mod appointment;
pub mod calendar;
pub mod error;
pub mod materialize;
pub mod message;
pub mod revise;
pub mod scope;
pub mod session;

pub use appointment::{Appointment, InstanceKey, Window};
pub use calendar::VCalendar;
pub use error::{EngineError, EngineResult};
pub use materialize::{Series, materialize};
pub use message::{ItipMessage, ItipMethod};
pub use revise::{ReviseInput, delete, revise};
pub use scope::{ChangeScope, ScopeRange, resolve_delete_choices, resolve_revise_choices};
pub use session::EditSession;
