//! iCalendar serializer (RFC 5545).
//!
//! Serializes iCalendar structures to compliant text. Output is canonical:
//! properties follow a fixed order per component kind so the same model
//! always renders to the same bytes.

use super::escape::{escape_param_value, escape_text};
use super::fold::fold_line;
use crate::core::{Component, ComponentKind, ICalendar, Parameter, Property, PropertyValue};

/// Serializes an iCalendar document to a string.
#[must_use]
pub fn serialize(ical: &ICalendar) -> String {
    serialize_component(&ical.root)
}

/// Serializes a component to a string.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut result = String::new();

    result.push_str(&fold_line(&format!("BEGIN:{}", component.name)));

    let ordered_props = canonical_property_order(&component.properties, component.kind);
    for prop in ordered_props {
        result.push_str(&serialize_property(prop));
    }

    let ordered_children = canonical_component_order(&component.children);
    for child in ordered_children {
        result.push_str(&serialize_component(child));
    }

    result.push_str(&fold_line(&format!("END:{}", component.name)));

    result
}

/// Serializes a property to a string.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    let mut line = prop.name.clone();

    let ordered_params = canonical_param_order(&prop.params);
    for param in ordered_params {
        line.push(';');
        line.push_str(&serialize_parameter(param));
    }

    line.push(':');
    line.push_str(&serialize_value(&prop.value, &prop.raw_value));

    fold_line(&line)
}

/// Serializes a parameter to a string.
fn serialize_parameter(param: &Parameter) -> String {
    let mut result = param.name.clone();
    result.push('=');

    let values: Vec<String> = param.values.iter().map(|v| escape_param_value(v)).collect();
    result.push_str(&values.join(","));

    result
}

/// Serializes a value, preferring the raw value for round-trip fidelity.
fn serialize_value(value: &PropertyValue, raw_value: &str) -> String {
    // Text needs re-escaping; everything else renders from the preserved
    // raw value so unknown content survives byte-for-byte.
    match value {
        PropertyValue::Text(s) => escape_text(s),
        PropertyValue::TextList(list) => list
            .iter()
            .map(|s| escape_text(s))
            .collect::<Vec<_>>()
            .join(","),
        _ => raw_value.to_string(),
    }
}

/// Fixed property order for VEVENT/VTODO/VJOURNAL output.
///
/// The engine's iTIP envelopes are compared byte-for-byte in golden tests;
/// this order is part of the wire contract.
const SCHEDULABLE_ORDER: &[&str] = &[
    "CATEGORIES",
    "DTSTART",
    "DTEND",
    "DUE",
    "DURATION",
    "DESCRIPTION",
    "SUMMARY",
    "DTSTAMP",
    "UID",
    "RRULE",
    "RDATE",
    "EXDATE",
    "ORGANIZER",
    "LOCATION",
    "RECURRENCE-ID",
    "RELATED-TO",
    "SEQUENCE",
];

/// Returns properties in canonical order for deterministic output.
fn canonical_property_order(props: &[Property], kind: Option<ComponentKind>) -> Vec<&Property> {
    let order: &[&str] = match kind {
        Some(ComponentKind::Calendar) => &["METHOD", "PRODID", "VERSION", "CALSCALE"],
        Some(ComponentKind::Event | ComponentKind::Todo | ComponentKind::Journal) => {
            SCHEDULABLE_ORDER
        }
        _ => &[],
    };

    let mut ordered: Vec<&Property> = Vec::with_capacity(props.len());

    // First, properties in the defined order
    for &name in order {
        for prop in props {
            if prop.name.eq_ignore_ascii_case(name) {
                ordered.push(prop);
            }
        }
    }

    // Then the remaining properties (including X-properties) in arrival order
    for prop in props {
        if !order.iter().any(|&n| prop.name.eq_ignore_ascii_case(n)) {
            ordered.push(prop);
        }
    }

    ordered
}

/// Returns parameters in canonical order.
fn canonical_param_order(params: &[Parameter]) -> Vec<&Parameter> {
    let order = ["VALUE", "TZID", "LANGUAGE", "RELTYPE", "RANGE"];

    let mut ordered: Vec<&Parameter> = Vec::with_capacity(params.len());

    for name in &order {
        for param in params {
            if param.name.eq_ignore_ascii_case(name) {
                ordered.push(param);
            }
        }
    }

    for param in params {
        if !order.iter().any(|n| param.name.eq_ignore_ascii_case(n)) {
            ordered.push(param);
        }
    }

    ordered
}

/// Returns child components in canonical order: timezones first, then
/// schedulables sorted by UID and RECURRENCE-ID, then everything else.
fn canonical_component_order(children: &[Component]) -> Vec<&Component> {
    let mut timezones: Vec<&Component> = Vec::new();
    let mut schedulables: Vec<&Component> = Vec::new();
    let mut other: Vec<&Component> = Vec::new();

    for child in children {
        match child.kind {
            Some(ComponentKind::Timezone) => timezones.push(child),
            Some(ComponentKind::Event | ComponentKind::Todo | ComponentKind::Journal) => {
                schedulables.push(child);
            }
            _ => other.push(child),
        }
    }

    schedulables.sort_by(|a, b| cmp_by_uid_recurrence(a, b));

    let mut result = Vec::with_capacity(children.len());
    result.extend(timezones);
    result.extend(schedulables);
    result.extend(other);
    result
}

/// Compares components by UID, then by RECURRENCE-ID (masters first).
fn cmp_by_uid_recurrence(a: &Component, b: &Component) -> std::cmp::Ordering {
    let uid_a = a.uid().unwrap_or("");
    let uid_b = b.uid().unwrap_or("");

    match uid_a.cmp(uid_b) {
        std::cmp::Ordering::Equal => {
            let recur_a = a
                .get_property("RECURRENCE-ID")
                .map_or("", |p| p.raw_value.as_str());
            let recur_b = b
                .get_property("RECURRENCE-ID")
                .map_or("", |p| p.raw_value.as_str());
            recur_a.cmp(recur_b)
        }
        other => other,
    }
}
