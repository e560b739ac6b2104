//! Materialized occurrences and the keys that tie them to their components.

use kalends_ical::core::Temporal;
use serde::{Deserialize, Serialize};

/// Stable key of one component inside a calendar: the series UID plus the
/// RECURRENCE-ID for overrides (`None` marks the series master).
///
/// Appointments carry this key as their back-reference, so renderers never
/// rely on object identity to find the owning component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceKey {
    /// Series UID.
    pub uid: String,
    /// RECURRENCE-ID of the override this key names; `None` for the master.
    pub recurrence_id: Option<Temporal>,
}

impl InstanceKey {
    /// Key of a series master.
    #[must_use]
    pub fn master(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            recurrence_id: None,
        }
    }

    /// Key of an override component.
    #[must_use]
    pub fn override_of(uid: impl Into<String>, recurrence_id: Temporal) -> Self {
        Self {
            uid: uid.into(),
            recurrence_id: Some(recurrence_id),
        }
    }
}

/// One renderable occurrence of a calendar component.
///
/// Appointments are derived for a query window and regenerated whenever the
/// window or the underlying components change; they are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Key of the component this occurrence came from.
    pub key: InstanceKey,
    /// Occurrence start.
    pub start: Temporal,
    /// Occurrence end.
    pub end: Temporal,
    /// SUMMARY of the owning component.
    pub summary: Option<String>,
    /// DESCRIPTION of the owning component.
    pub description: Option<String>,
    /// LOCATION of the owning component.
    pub location: Option<String>,
    /// CATEGORIES of the owning component.
    pub categories: Vec<String>,
}

impl Appointment {
    /// Returns whether this occurrence covers a whole day.
    #[must_use]
    pub const fn is_whole_day(&self) -> bool {
        self.start.is_whole_day()
    }
}

/// Half-open query window `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: Temporal,
    pub end: Temporal,
}

impl Window {
    /// Creates a window; `start` must precede `end`.
    #[must_use]
    pub fn new(start: Temporal, end: Temporal) -> Self {
        Self { start, end }
    }

    /// Returns whether an occurrence `[start, end)` overlaps this window.
    ///
    /// Zero-length occurrences count when their instant lies inside the
    /// window.
    #[must_use]
    pub fn overlaps(&self, start: &Temporal, end: &Temporal) -> bool {
        if start >= &self.end {
            return false;
        }
        if start == end {
            start >= &self.start
        } else {
            end > &self.start
        }
    }

    /// Returns whether a single instant falls inside the window.
    #[must_use]
    pub fn contains(&self, t: &Temporal) -> bool {
        t >= &self.start && t < &self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn floating(y: i32, mo: u32, d: u32, h: u32) -> Temporal {
        Temporal::floating(
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    fn window() -> Window {
        Window::new(floating(2015, 11, 15, 0), floating(2015, 11, 22, 0))
    }

    #[test]
    fn overlap_cases() {
        let w = window();

        // Fully inside
        assert!(w.overlaps(&floating(2015, 11, 16, 10), &floating(2015, 11, 16, 11)));
        // Ends before the window starts
        assert!(!w.overlaps(&floating(2015, 11, 14, 10), &floating(2015, 11, 14, 11)));
        // Straddles the window start
        assert!(w.overlaps(&floating(2015, 11, 14, 23), &floating(2015, 11, 15, 1)));
        // Starts at the exclusive end
        assert!(!w.overlaps(&floating(2015, 11, 22, 0), &floating(2015, 11, 22, 1)));
        // Zero-length inside
        assert!(w.overlaps(&floating(2015, 11, 15, 0), &floating(2015, 11, 15, 0)));
    }

    #[test]
    fn contains_is_half_open() {
        let w = window();
        assert!(w.contains(&floating(2015, 11, 15, 0)));
        assert!(!w.contains(&floating(2015, 11, 22, 0)));
    }

    #[test]
    fn keys_compare_master_before_overrides() {
        let master = InstanceKey::master("uid-1");
        let override_key = InstanceKey::override_of("uid-1", floating(2015, 11, 16, 10));
        assert!(master < override_key);
    }

    #[test]
    fn appointment_serializes() {
        let appointment = Appointment {
            key: InstanceKey::master("uid-1"),
            start: floating(2015, 11, 16, 10),
            end: floating(2015, 11, 16, 11),
            summary: Some("Standup".to_string()),
            description: None,
            location: None,
            categories: vec!["Work".to_string()],
        };
        let json = serde_json::to_string(&appointment).unwrap();
        let back: Appointment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, appointment);
    }
}
