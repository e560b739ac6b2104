//! Value type parsers for iCalendar (RFC 5545 §3.3).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::core::{
    ByDay, Duration, Frequency, RecurrenceEnd, RecurrenceRule, Temporal, Weekday,
};

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "20151109")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit calendar date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col));
    }

    let year: i32 = s[0..4]
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDate, line, col))?;
    let month: u32 = s[4..6]
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDate, line, col))?;
    let day: u32 = s[6..8]
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDate, line, col))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDate, line, col))
}

/// Parses a TIME value (RFC 5545 §3.3.12), returning the time and whether
/// it carried a UTC 'Z' suffix.
fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<(NaiveTime, bool)> {
    let (time_str, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };

    if time_str.len() != 6 || !time_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(ParseErrorKind::InvalidTime, line, col));
    }

    let hour: u32 = time_str[0..2]
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidTime, line, col))?;
    let minute: u32 = time_str[2..4]
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidTime, line, col))?;
    // Clamp leap seconds: chrono has no second 60.
    let second: u32 = time_str[4..6]
        .parse::<u32>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidTime, line, col))?
        .min(59);

    NaiveTime::from_hms_opt(hour, minute, second)
        .map(|t| (t, is_utc))
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidTime, line, col))
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5) into a [`Temporal`].
///
/// Format: YYYYMMDD"T"HHMMSS[Z]. The TZID comes from the property
/// parameter level; a trailing 'Z' always wins over a TZID.
///
/// ## Errors
/// Returns an error if the string is not a valid date-time.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<Temporal> {
    let t_pos = s
        .find('T')
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDateTime, line, col))?;

    let date = parse_date(&s[..t_pos], line, col)?;
    let (time, is_utc) = parse_time(&s[t_pos + 1..], line, col + t_pos + 1)?;
    let civil = NaiveDateTime::new(date, time);

    let temporal = if is_utc {
        Temporal::utc(Utc.from_utc_datetime(&civil))
    } else if let Some(tz) = tzid {
        Temporal::zoned(civil, tz)
    } else {
        Temporal::floating(civil)
    };

    Ok(temporal)
}

/// Parses a DATE or DATE-TIME value according to the presence of a 'T'.
///
/// ## Errors
/// Returns an error if the string is neither a valid date nor date-time.
pub fn parse_temporal(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<Temporal> {
    if s.contains('T') {
        parse_datetime(s, tzid, line, col)
    } else {
        parse_date(s, line, col).map(Temporal::date)
    }
}

/// Parses a DURATION value (RFC 5545 §3.3.6).
///
/// Format: [+|-]P[nW] or [+|-]P[nD][T[nH][nM][nS]]
///
/// ## Errors
/// Returns an error if the string is not a valid duration.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<Duration> {
    let err = || ParseError::new(ParseErrorKind::InvalidDuration, line, col);

    let mut rest = s;
    let mut dur = Duration::zero();

    if let Some(stripped) = rest.strip_prefix('-') {
        dur.negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else {
        // No sign, duration is positive.
    }

    rest = rest.strip_prefix('P').ok_or_else(err)?;
    if rest.is_empty() {
        return Err(err());
    }

    let mut in_time = false;
    let mut saw_component = false;
    let mut num = String::new();

    for c in rest.chars() {
        match c {
            '0'..='9' => num.push(c),
            'T' if num.is_empty() => in_time = true,
            'W' | 'D' | 'H' | 'M' | 'S' => {
                let value: u32 = num.parse().map_err(|_| err())?;
                num.clear();
                saw_component = true;
                match (c, in_time) {
                    ('W', false) => dur.weeks = value,
                    ('D', false) => dur.days = value,
                    ('H', true) => dur.hours = value,
                    ('M', true) => dur.minutes = value,
                    ('S', true) => dur.seconds = value,
                    _ => return Err(err()),
                }
            }
            _ => return Err(err()),
        }
    }

    if !num.is_empty() || !saw_component {
        return Err(err());
    }

    Ok(dur)
}

/// Parses a RECUR (RRULE) value (RFC 5545 §3.3.10).
///
/// ## Errors
/// Returns an error for malformed rule parts, a missing FREQ, or a rule
/// carrying both COUNT and UNTIL.
pub fn parse_rrule(s: &str, line: usize, col: usize) -> ParseResult<RecurrenceRule> {
    let mut freq = None;
    let mut interval = 1u32;
    let mut end = RecurrenceEnd::Never;
    let mut wkst = Weekday::Monday;
    let mut by_second = Vec::new();
    let mut by_minute = Vec::new();
    let mut by_hour = Vec::new();
    let mut by_day = Vec::new();
    let mut by_monthday = Vec::new();
    let mut by_yearday = Vec::new();
    let mut by_weekno = Vec::new();
    let mut by_month = Vec::new();
    let mut by_setpos = Vec::new();

    for part in s.split(';') {
        let eq_pos = part
            .find('=')
            .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidRRule, line, col))?;

        let key = &part[..eq_pos];
        let value = &part[eq_pos + 1..];

        match key.to_ascii_uppercase().as_str() {
            "FREQ" => {
                freq = Some(Frequency::parse(value).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::InvalidFrequency, line, col)
                })?);
            }
            "INTERVAL" => {
                interval = value
                    .parse()
                    .map_err(|_| ParseError::new(ParseErrorKind::InvalidRRule, line, col))?;
            }
            "COUNT" => {
                if !matches!(end, RecurrenceEnd::Never) {
                    return Err(ParseError::new(
                        ParseErrorKind::UntilCountConflict,
                        line,
                        col,
                    ));
                }
                let count = value
                    .parse()
                    .map_err(|_| ParseError::new(ParseErrorKind::InvalidRRule, line, col))?;
                end = RecurrenceEnd::Count(count);
            }
            "UNTIL" => {
                if !matches!(end, RecurrenceEnd::Never) {
                    return Err(ParseError::new(
                        ParseErrorKind::UntilCountConflict,
                        line,
                        col,
                    ));
                }
                end = RecurrenceEnd::Until(parse_temporal(value, None, line, col)?);
            }
            "WKST" => {
                wkst = Weekday::parse(value)
                    .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidWeekday, line, col))?;
            }
            "BYSECOND" => by_second = parse_num_list(value, line, col)?,
            "BYMINUTE" => by_minute = parse_num_list(value, line, col)?,
            "BYHOUR" => by_hour = parse_num_list(value, line, col)?,
            "BYDAY" => by_day = parse_byday(value, line, col)?,
            "BYMONTHDAY" => by_monthday = parse_num_list(value, line, col)?,
            "BYYEARDAY" => by_yearday = parse_num_list(value, line, col)?,
            "BYWEEKNO" => by_weekno = parse_num_list(value, line, col)?,
            "BYMONTH" => by_month = parse_num_list(value, line, col)?,
            "BYSETPOS" => by_setpos = parse_num_list(value, line, col)?,
            _ => {} // Unknown rule part - ignore
        }
    }

    let freq =
        freq.ok_or_else(|| ParseError::new(ParseErrorKind::MissingFrequency, line, col))?;

    let mut rule = RecurrenceRule::new(freq).with_interval(interval).with_wkst(wkst);
    rule.end = end;
    rule.by_second = by_second;
    rule.by_minute = by_minute;
    rule.by_hour = by_hour;
    rule.by_day = by_day;
    rule.by_monthday = by_monthday;
    rule.by_yearday = by_yearday;
    rule.by_weekno = by_weekno;
    rule.by_month = by_month;
    rule.by_setpos = by_setpos;

    Ok(rule)
}

/// Parses a comma-separated list of numbers.
fn parse_num_list<T: std::str::FromStr>(
    s: &str,
    line: usize,
    col: usize,
) -> ParseResult<Vec<T>> {
    s.split(',')
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ParseError::new(ParseErrorKind::InvalidRRule, line, col))
        })
        .collect()
}

/// Parses a BYDAY value (weekdays with optional ordinals).
fn parse_byday(s: &str, line: usize, col: usize) -> ParseResult<Vec<ByDay>> {
    s.split(',')
        .map(|v| parse_weekday_num(v.trim(), line, col))
        .collect()
}

/// Parses a single weekday with optional ordinal (e.g., "MO", "1MO", "-1FR").
fn parse_weekday_num(s: &str, line: usize, col: usize) -> ParseResult<ByDay> {
    if s.len() < 2 {
        return Err(ParseError::new(ParseErrorKind::InvalidWeekday, line, col));
    }

    let weekday_str = &s[s.len() - 2..];
    let ordinal_str = &s[..s.len() - 2];

    let weekday = Weekday::parse(weekday_str)
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidWeekday, line, col))?;

    let ordinal = if ordinal_str.is_empty() {
        None
    } else {
        let n: i8 = ordinal_str
            .parse()
            .map_err(|_| ParseError::new(ParseErrorKind::InvalidRRule, line, col))?;
        if n == 0 || !(-53..=53).contains(&n) {
            return Err(ParseError::new(ParseErrorKind::InvalidRRule, line, col));
        }
        Some(n)
    };

    Ok(ByDay { ordinal, weekday })
}

/// Unescapes text values (RFC 5545 §3.3.11).
///
/// Escape sequences: \\ \, \; \n \N
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => result.push('\n'),
                Some(',') => result.push(','),
                Some(';') => result.push(';'),
                Some('\\') | None => result.push('\\'),
                Some(other) => {
                    // Invalid escape, preserve as-is
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Splits a TEXT list on commas that are not escaped, unescaping each item.
///
/// Used for CATEGORIES, where `a\,b,c` means the two entries `a,b` and `c`.
#[must_use]
pub fn split_text_list(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in s.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(unescape_text(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    items.push(unescape_text(&current));

    items
}

/// Parses an INTEGER value (RFC 5545 §3.3.8).
///
/// ## Errors
/// Returns an error if the string is not a valid integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    s.parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidInteger, line, col))
}
