//! Shared foundation for the kalends workspace: error taxonomy, settings,
//! and injected capabilities (UID generation, clock).

pub mod capability;
pub mod config;
pub mod error;
