//! Injected capabilities: UID generation and wall-clock access.
//!
//! Components are identified by UIDs minted at creation time, and every
//! revision stamps DTSTAMP with "now". Both are supplied by the caller so
//! the engine itself holds no global mutable state and tests stay
//! deterministic.

use chrono::{DateTime, Utc};

/// Source of new component UIDs.
pub trait UidSource {
    /// Returns a fresh, globally unique identifier.
    fn next_uid(&self) -> String;
}

/// UID source backed by random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSource;

impl UidSource for UuidSource {
    fn next_uid(&self) -> String {
        format!("{}@kalends", uuid::Uuid::new_v4())
    }
}

/// Adapts a closure into a [`UidSource`].
///
/// Lets the caller own the generation state (a counter, a namespace)
/// without defining a type for it.
pub struct FnUidSource<F>(pub F);

impl<F> UidSource for FnUidSource<F>
where
    F: Fn() -> String,
{
    fn next_uid(&self) -> String {
        (self.0)()
    }
}

/// Source of the current UTC instant, used for DTSTAMP refresh.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn uuid_source_is_unique() {
        let source = UuidSource;
        assert_ne!(source.next_uid(), source.next_uid());
        assert!(source.next_uid().ends_with("@kalends"));
    }

    #[test]
    fn closure_source() {
        let counter = std::cell::Cell::new(0u32);
        let source = FnUidSource(|| {
            counter.set(counter.get() + 1);
            format!("uid-{}", counter.get())
        });
        assert_eq!(source.next_uid(), "uid-1");
        assert_eq!(source.next_uid(), "uid-2");
    }

    #[test]
    fn fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2015, 11, 9, 10, 0, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now_utc(), instant);
        assert_eq!(clock.now_utc(), clock.now_utc());
    }
}
