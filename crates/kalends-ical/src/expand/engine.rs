//! Recurrence-rule expansion (RFC 5545 §3.3.10, §3.8.5.3).
//!
//! [`OccurrenceIter`] turns a rule plus a seed start into a lazy, strictly
//! increasing stream of occurrence starts. Expansion is period-based: the
//! seed advances by `INTERVAL` units of `FREQ`, and within each period the
//! by-rules refine the candidate set in the RFC's prescribed order, with
//! BYSETPOS selecting positions from the period's full set last.
//!
//! The stream is restartable: every call to
//! [`RecurrenceRule::occurrences`] starts over from the seed.

use std::collections::VecDeque;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::core::{ByDay, Frequency, RecurrenceEnd, RecurrenceRule, Temporal, Weekday};

/// Consecutive empty periods tolerated before the stream gives up.
///
/// Bounds rules that can never match (e.g. FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30)
/// so windowed queries terminate promptly.
const MAX_DRY_PERIODS: u32 = 1000;

impl RecurrenceRule {
    /// Returns the lazy occurrence stream of this rule from `seed`.
    ///
    /// The seed itself is always the first occurrence (it counts against
    /// COUNT), even when it does not match the by-rules; everything after
    /// it is rule-generated and strictly increasing. Without an end
    /// condition the stream is unbounded; take a prefix or a window.
    #[must_use]
    pub fn occurrences(&self, seed: &Temporal) -> OccurrenceIter<'_> {
        OccurrenceIter::new(self, seed.clone())
    }
}

/// Lazy iterator over the occurrence starts of one recurrence rule.
pub struct OccurrenceIter<'a> {
    rule: &'a RecurrenceRule,
    seed: Temporal,
    seed_civil: NaiveDateTime,
    until_civil: Option<NaiveDateTime>,
    count_left: Option<u32>,
    period: i64,
    pending: VecDeque<NaiveDateTime>,
    emitted_seed: bool,
    last_emitted: Option<NaiveDateTime>,
    dry_periods: u32,
    exhausted: bool,
}

impl<'a> OccurrenceIter<'a> {
    fn new(rule: &'a RecurrenceRule, seed: Temporal) -> Self {
        let seed_civil = seed.civil();

        // UNTIL is compared on the seed's wall clock. RFC 5545 requires a
        // UTC UNTIL for zoned series; convert it into the seed's zone when
        // possible, otherwise compare civil values directly.
        let until_civil = match &rule.end {
            RecurrenceEnd::Until(until) => Some(match seed.tzid() {
                Some(tzid) => until.civil_in_zone(tzid).unwrap_or_else(|| until.civil()),
                None => until.civil(),
            }),
            _ => None,
        };

        let count_left = match rule.end {
            RecurrenceEnd::Count(n) => Some(n),
            _ => None,
        };

        Self {
            rule,
            seed,
            seed_civil,
            until_civil,
            count_left,
            period: 0,
            pending: VecDeque::new(),
            emitted_seed: false,
            last_emitted: None,
            dry_periods: 0,
            exhausted: false,
        }
    }

    fn emit(&mut self, civil: NaiveDateTime) -> Temporal {
        self.last_emitted = Some(civil);
        if let Some(left) = self.count_left.as_mut() {
            *left -= 1;
        }
        self.seed.with_civil(civil)
    }

    fn past_until(&self, civil: NaiveDateTime) -> bool {
        self.until_civil.is_some_and(|until| civil > until)
    }

    /// Fills `pending` with the next non-empty period's candidates.
    fn refill(&mut self) {
        while self.pending.is_empty() && !self.exhausted {
            let candidates = expand_period(self.rule, self.seed_civil, self.period);
            self.period += 1;

            // Stop scanning once an entire period opens past UNTIL.
            if let Some(until) = self.until_civil {
                let period_floor =
                    period_anchor(self.rule, self.seed_civil, self.period - 1);
                if period_floor > until && candidates.iter().all(|c| *c > until) {
                    self.exhausted = true;
                    return;
                }
            }

            let cutoff = self.last_emitted.unwrap_or(self.seed_civil);
            let fresh: Vec<NaiveDateTime> =
                candidates.into_iter().filter(|c| *c > cutoff).collect();

            if fresh.is_empty() {
                self.dry_periods += 1;
                if self.dry_periods >= MAX_DRY_PERIODS {
                    self.exhausted = true;
                }
            } else {
                self.dry_periods = 0;
                self.pending.extend(fresh);
            }
        }
    }
}

impl Iterator for OccurrenceIter<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.count_left == Some(0) {
            return None;
        }

        if !self.emitted_seed {
            self.emitted_seed = true;
            if self.past_until(self.seed_civil) {
                self.exhausted = true;
                return None;
            }
            let seed_civil = self.seed_civil;
            return Some(self.emit(seed_civil));
        }

        loop {
            if self.pending.is_empty() {
                self.refill();
            }
            let Some(candidate) = self.pending.pop_front() else {
                self.exhausted = true;
                return None;
            };

            // Strictly increasing; duplicates across by-rules collapse.
            if self
                .last_emitted
                .is_some_and(|last| candidate <= last)
            {
                continue;
            }

            if self.past_until(candidate) {
                self.exhausted = true;
                return None;
            }

            return Some(self.emit(candidate));
        }
    }
}

/// Start of period `k`, used as the scan floor for UNTIL termination.
fn period_anchor(rule: &RecurrenceRule, seed: NaiveDateTime, k: i64) -> NaiveDateTime {
    let steps = i64::from(rule.interval) * k;
    match rule.freq {
        Frequency::Secondly => seed + chrono::Duration::seconds(steps),
        Frequency::Minutely => seed + chrono::Duration::minutes(steps),
        Frequency::Hourly => seed + chrono::Duration::hours(steps),
        Frequency::Daily => seed + chrono::Duration::days(steps),
        Frequency::Weekly => seed + chrono::Duration::weeks(steps),
        Frequency::Monthly => add_months(seed, steps),
        Frequency::Yearly => add_months(seed, steps * 12),
    }
}

/// Expands period `k` of the rule into sorted candidate date-times.
fn expand_period(rule: &RecurrenceRule, seed: NaiveDateTime, k: i64) -> Vec<NaiveDateTime> {
    let anchor = period_anchor(rule, seed, k);

    let mut candidates = match rule.freq {
        Frequency::Secondly | Frequency::Minutely | Frequency::Hourly => {
            expand_sub_daily(rule, anchor)
        }
        Frequency::Daily => {
            let date = anchor.date();
            if passes_date_limits(rule, date) {
                cross_with_times(rule, vec![date], anchor.time())
            } else {
                Vec::new()
            }
        }
        Frequency::Weekly => expand_week(rule, anchor),
        Frequency::Monthly => {
            let months = month_offset(seed, i64::from(rule.interval) * k);
            expand_month(rule, seed, months, anchor.time())
        }
        Frequency::Yearly => {
            let year = seed.year()
                + i32::try_from(i64::from(rule.interval) * k).unwrap_or(i32::MAX);
            expand_year(rule, seed, year, anchor.time())
        }
    };

    candidates.sort_unstable();
    candidates.dedup();
    apply_setpos(&rule.by_setpos, candidates)
}

/// SECONDLY/MINUTELY/HOURLY periods: the anchor instant, limited by every
/// by-rule at or above the frequency and expanded by those below it.
fn expand_sub_daily(rule: &RecurrenceRule, anchor: NaiveDateTime) -> Vec<NaiveDateTime> {
    if !passes_date_limits(rule, anchor.date()) {
        return Vec::new();
    }

    let hour_ok = rule.by_hour.is_empty()
        || rule
            .by_hour
            .contains(&u8::try_from(anchor.hour()).unwrap_or(u8::MAX));
    if !hour_ok {
        return Vec::new();
    }

    match rule.freq {
        Frequency::Secondly => {
            let minute_ok = rule.by_minute.is_empty()
                || rule
                    .by_minute
                    .contains(&u8::try_from(anchor.minute()).unwrap_or(u8::MAX));
            let second_ok = rule.by_second.is_empty()
                || rule
                    .by_second
                    .contains(&u8::try_from(anchor.second()).unwrap_or(u8::MAX));
            if minute_ok && second_ok {
                vec![anchor]
            } else {
                Vec::new()
            }
        }
        Frequency::Minutely => {
            let minute_ok = rule.by_minute.is_empty()
                || rule
                    .by_minute
                    .contains(&u8::try_from(anchor.minute()).unwrap_or(u8::MAX));
            if !minute_ok {
                return Vec::new();
            }
            let seconds = expand_units(&rule.by_second, anchor.second());
            seconds
                .into_iter()
                .filter_map(|s| anchor.with_second(s))
                .collect()
        }
        _ => {
            // HOURLY: minutes and seconds expand below the frequency.
            let minutes = expand_units(&rule.by_minute, anchor.minute());
            let seconds = expand_units(&rule.by_second, anchor.second());
            let mut out = Vec::new();
            for m in &minutes {
                for s in &seconds {
                    if let Some(t) = NaiveTime::from_hms_opt(anchor.hour(), *m, *s) {
                        out.push(anchor.date().and_time(t));
                    }
                }
            }
            out
        }
    }
}

/// WEEKLY periods: the week containing the anchor, starting at WKST.
fn expand_week(rule: &RecurrenceRule, anchor: NaiveDateTime) -> Vec<NaiveDateTime> {
    let week_start = start_of_week(anchor.date(), rule.wkst);

    let dates: Vec<NaiveDate> = if rule.by_day.is_empty() {
        vec![anchor.date()]
    } else {
        (0..7)
            .map(|offset| week_start + chrono::Duration::days(offset))
            .filter(|d| {
                rule.by_day
                    .iter()
                    .any(|bd| bd.weekday.to_chrono() == d.weekday())
            })
            .collect()
    };

    let dates = dates
        .into_iter()
        .filter(|d| passes_month_limit(rule, *d))
        .collect();

    cross_with_times(rule, dates, anchor.time())
}

/// MONTHLY periods, identified by months-since-epoch to sidestep day
/// clamping at period boundaries (Jan 31 + 1 month is not a date).
fn expand_month(
    rule: &RecurrenceRule,
    seed: NaiveDateTime,
    months: i64,
    seed_time: NaiveTime,
) -> Vec<NaiveDateTime> {
    let year = i32::try_from(months.div_euclid(12)).unwrap_or(i32::MAX);
    let month = u32::try_from(months.rem_euclid(12)).unwrap_or(0) + 1;

    if !rule.by_month.is_empty()
        && !rule
            .by_month
            .contains(&u8::try_from(month).unwrap_or(u8::MAX))
    {
        return Vec::new();
    }

    let dates: Vec<NaiveDate> = if !rule.by_monthday.is_empty() {
        let mut days = resolve_monthdays(year, month, &rule.by_monthday);
        if !rule.by_day.is_empty() {
            // BYDAY limits when BYMONTHDAY is present.
            days.retain(|d| byday_matches_in_month(&rule.by_day, *d));
        }
        days
    } else if !rule.by_day.is_empty() {
        expand_byday_in_month(year, month, &rule.by_day)
    } else {
        // Months without the seed's day yield nothing (RFC: no clamping).
        NaiveDate::from_ymd_opt(year, month, seed.day())
            .into_iter()
            .collect()
    };

    cross_with_times(rule, dates, seed_time)
}

/// YEARLY periods.
fn expand_year(
    rule: &RecurrenceRule,
    seed: NaiveDateTime,
    year: i32,
    seed_time: NaiveTime,
) -> Vec<NaiveDateTime> {
    let dates: Vec<NaiveDate> = if !rule.by_yearday.is_empty() {
        resolve_yeardays(year, &rule.by_yearday)
            .into_iter()
            .filter(|d| passes_month_limit(rule, *d))
            .filter(|d| {
                rule.by_day.is_empty()
                    || rule
                        .by_day
                        .iter()
                        .any(|bd| bd.weekday.to_chrono() == d.weekday())
            })
            .collect()
    } else if !rule.by_weekno.is_empty() {
        expand_weeknos(rule, seed, year)
    } else {
        let months: Vec<u32> = if rule.by_month.is_empty() {
            vec![seed.month()]
        } else {
            rule.by_month.iter().map(|m| u32::from(*m)).collect()
        };

        if !rule.by_monthday.is_empty() {
            let mut days = Vec::new();
            for m in &months {
                let mut month_days = resolve_monthdays(year, *m, &rule.by_monthday);
                if !rule.by_day.is_empty() {
                    month_days.retain(|d| byday_matches_in_month(&rule.by_day, *d));
                }
                days.append(&mut month_days);
            }
            days
        } else if !rule.by_day.is_empty() {
            if rule.by_month.is_empty() {
                expand_byday_in_year(year, &rule.by_day)
            } else {
                months
                    .iter()
                    .flat_map(|m| expand_byday_in_month(year, *m, &rule.by_day))
                    .collect()
            }
        } else {
            months
                .iter()
                .filter_map(|m| NaiveDate::from_ymd_opt(year, *m, seed.day()))
                .collect()
        }
    };

    cross_with_times(rule, dates, seed_time)
}

/// BYWEEKNO expansion: days of the selected ISO weeks, refined by BYDAY or
/// defaulting to the seed's weekday. Week numbering follows ISO 8601.
fn expand_weeknos(rule: &RecurrenceRule, seed: NaiveDateTime, year: i32) -> Vec<NaiveDate> {
    let total_weeks = iso_weeks_in_year(year);
    let wanted: Vec<u32> = rule
        .by_weekno
        .iter()
        .filter_map(|n| {
            let resolved = if *n > 0 {
                i32::from(*n)
            } else {
                i32::from(total_weeks) + i32::from(*n) + 1
            };
            u32::try_from(resolved).ok()
        })
        .collect();

    days_of_year(year)
        .filter(|d| {
            let week = d.iso_week();
            week.year() == year && wanted.contains(&week.week())
        })
        .filter(|d| {
            if rule.by_day.is_empty() {
                d.weekday() == seed.date().weekday()
            } else {
                rule.by_day
                    .iter()
                    .any(|bd| bd.weekday.to_chrono() == d.weekday())
            }
        })
        .collect()
}

/// Crosses a set of candidate dates with the time-of-day expansion
/// (BYHOUR/BYMINUTE/BYSECOND, defaulting to the seed's time).
fn cross_with_times(
    rule: &RecurrenceRule,
    dates: Vec<NaiveDate>,
    seed_time: NaiveTime,
) -> Vec<NaiveDateTime> {
    let hours = expand_units(&rule.by_hour, seed_time.hour());
    let minutes = expand_units(&rule.by_minute, seed_time.minute());
    let seconds = expand_units(&rule.by_second, seed_time.second());

    let mut out = Vec::with_capacity(dates.len() * hours.len() * minutes.len() * seconds.len());
    for date in dates {
        for h in &hours {
            for m in &minutes {
                for s in &seconds {
                    if let Some(t) = NaiveTime::from_hms_opt(*h, *m, *s) {
                        out.push(date.and_time(t));
                    }
                }
            }
        }
    }
    out
}

/// By-rule unit expansion: the listed values, or the seed's own value.
fn expand_units(list: &[u8], seed_value: u32) -> Vec<u32> {
    if list.is_empty() {
        vec![seed_value]
    } else {
        let mut values: Vec<u32> = list.iter().map(|v| u32::from(*v)).collect();
        values.sort_unstable();
        values.dedup();
        values
    }
}

/// Date-level limits applied to DAILY and sub-daily candidates.
fn passes_date_limits(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    if !passes_month_limit(rule, date) {
        return false;
    }

    if !rule.by_monthday.is_empty() {
        let dim = days_in_month(date.year(), date.month());
        let day = i8::try_from(date.day()).unwrap_or(i8::MAX);
        let negative = i8::try_from(i64::from(date.day()) - i64::from(dim) - 1).unwrap_or(i8::MIN);
        if !rule.by_monthday.contains(&day) && !rule.by_monthday.contains(&negative) {
            return false;
        }
    }

    if !rule.by_yearday.is_empty() {
        let len = i32::try_from(year_len(date.year())).unwrap_or(365);
        let ordinal = i32::try_from(date.ordinal()).unwrap_or(0);
        let matches = rule.by_yearday.iter().any(|n| {
            let resolved = if *n > 0 {
                i32::from(*n)
            } else {
                len + i32::from(*n) + 1
            };
            resolved == ordinal
        });
        if !matches {
            return false;
        }
    }

    if !rule.by_day.is_empty()
        && !rule
            .by_day
            .iter()
            .any(|bd| bd.weekday.to_chrono() == date.weekday())
    {
        return false;
    }

    true
}

fn passes_month_limit(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    rule.by_month.is_empty()
        || rule
            .by_month
            .contains(&u8::try_from(date.month()).unwrap_or(u8::MAX))
}

/// Resolves BYMONTHDAY entries for one month; negative values count from
/// the month's end, out-of-range values drop.
fn resolve_monthdays(year: i32, month: u32, monthdays: &[i8]) -> Vec<NaiveDate> {
    let dim = days_in_month(year, month);
    let mut dates: Vec<NaiveDate> = monthdays
        .iter()
        .filter_map(|md| {
            let day = if *md > 0 {
                i64::from(*md)
            } else {
                i64::from(dim) + i64::from(*md) + 1
            };
            u32::try_from(day)
                .ok()
                .and_then(|d| NaiveDate::from_ymd_opt(year, month, d))
        })
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Resolves BYYEARDAY entries for one year.
fn resolve_yeardays(year: i32, yeardays: &[i16]) -> Vec<NaiveDate> {
    let len = year_len(year);
    let mut dates: Vec<NaiveDate> = yeardays
        .iter()
        .filter_map(|yd| {
            let ordinal = if *yd > 0 {
                i64::from(*yd)
            } else {
                i64::from(len) + i64::from(*yd) + 1
            };
            u32::try_from(ordinal)
                .ok()
                .and_then(|o| NaiveDate::from_yo_opt(year, o))
        })
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Expands BYDAY entries within one month, honoring ordinals
/// (`3TU` = third Tuesday, `-1FR` = last Friday). An ordinal past the
/// month's matches yields nothing.
fn expand_byday_in_month(year: i32, month: u32, by_day: &[ByDay]) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for entry in by_day {
        let matches: Vec<NaiveDate> = dates_of_month(year, month)
            .filter(|d| d.weekday() == entry.weekday.to_chrono())
            .collect();
        select_ordinal(&matches, entry.ordinal, &mut dates);
    }
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Expands BYDAY entries within one year (YEARLY without BYMONTH).
fn expand_byday_in_year(year: i32, by_day: &[ByDay]) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for entry in by_day {
        let matches: Vec<NaiveDate> = days_of_year(year)
            .filter(|d| d.weekday() == entry.weekday.to_chrono())
            .collect();
        select_ordinal(&matches, entry.ordinal, &mut dates);
    }
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Pushes either every match or the nth match (negative from the end).
fn select_ordinal(matches: &[NaiveDate], ordinal: Option<i8>, out: &mut Vec<NaiveDate>) {
    match ordinal {
        None => out.extend_from_slice(matches),
        Some(n) if n > 0 => {
            if let Some(d) = matches.get(usize::from(n.unsigned_abs()) - 1) {
                out.push(*d);
            }
        }
        Some(n) => {
            let from_end = usize::from(n.unsigned_abs());
            if from_end <= matches.len() {
                out.push(matches[matches.len() - from_end]);
            }
        }
    }
}

/// BYDAY as a limit within a month: weekday must match, and when an
/// ordinal is present the date must be that ordinal instance.
fn byday_matches_in_month(by_day: &[ByDay], date: NaiveDate) -> bool {
    by_day.iter().any(|entry| {
        if entry.weekday.to_chrono() != date.weekday() {
            return false;
        }
        match entry.ordinal {
            None => true,
            Some(n) => {
                let matches: Vec<NaiveDate> = dates_of_month(date.year(), date.month())
                    .filter(|d| d.weekday() == entry.weekday.to_chrono())
                    .collect();
                let mut selected = Vec::new();
                select_ordinal(&matches, Some(n), &mut selected);
                selected.contains(&date)
            }
        }
    })
}

/// BYSETPOS selection over one period's sorted candidate set.
fn apply_setpos(by_setpos: &[i16], candidates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
    if by_setpos.is_empty() || candidates.is_empty() {
        return candidates;
    }

    let len = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
    let mut selected: Vec<NaiveDateTime> = by_setpos
        .iter()
        .filter_map(|pos| {
            let idx = if *pos > 0 {
                i64::from(*pos) - 1
            } else {
                len + i64::from(*pos)
            };
            usize::try_from(idx).ok().and_then(|i| candidates.get(i)).copied()
        })
        .collect();
    selected.sort_unstable();
    selected.dedup();
    selected
}

/// First day of the week containing `date`, for the given week start.
fn start_of_week(date: NaiveDate, wkst: Weekday) -> NaiveDate {
    let offset = (7 + i64::from(date.weekday().num_days_from_monday())
        - i64::from(wkst.to_chrono().num_days_from_monday()))
        % 7;
    date - chrono::Duration::days(offset)
}

fn month_offset(seed: NaiveDateTime, delta: i64) -> i64 {
    i64::from(seed.year()) * 12 + i64::from(seed.month0()) + delta
}

/// Adds calendar months, clamping the day to the target month's length.
fn add_months(dt: NaiveDateTime, months: i64) -> NaiveDateTime {
    let total = month_offset(dt, months);
    let year = i32::try_from(total.div_euclid(12)).unwrap_or(i32::MAX);
    let month = u32::try_from(total.rem_euclid(12)).unwrap_or(0) + 1;
    let day = dt.day().min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day)
        .map_or(dt, |date| date.and_time(dt.time()))
}

/// Returns the number of days in a month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map_or(31, |d| d.day())
}

/// Returns the number of days in a year.
fn year_len(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Number of ISO weeks in a year (52 or 53).
fn iso_weeks_in_year(year: i32) -> u8 {
    NaiveDate::from_ymd_opt(year, 12, 28)
        .map_or(52, |d| u8::try_from(d.iso_week().week()).unwrap_or(52))
}

fn dates_of_month(year: i32, month: u32) -> impl Iterator<Item = NaiveDate> {
    let dim = days_in_month(year, month);
    (1..=dim).filter_map(move |d| NaiveDate::from_ymd_opt(year, month, d))
}

fn days_of_year(year: i32) -> impl Iterator<Item = NaiveDate> {
    let len = year_len(year);
    (1..=len).filter_map(move |o| NaiveDate::from_yo_opt(year, o))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ByDay, RecurrenceRule, Weekday};

    fn floating(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Temporal {
        Temporal::floating(
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap(),
        )
    }

    fn starts(rule: &RecurrenceRule, seed: &Temporal, n: usize) -> Vec<String> {
        rule.occurrences(seed).take(n).map(|t| t.to_string()).collect()
    }

    #[test]
    fn daily_count() {
        let rule = RecurrenceRule::daily().with_count(3);
        let seed = floating(2015, 11, 9, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 10),
            vec!["20151109T100000", "20151110T100000", "20151111T100000"]
        );
    }

    #[test]
    fn daily_interval() {
        let rule = RecurrenceRule::daily().with_interval(3);
        let seed = floating(2015, 11, 9, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 3),
            vec!["20151109T100000", "20151112T100000", "20151115T100000"]
        );
    }

    #[test]
    fn weekly_byday_from_monday_seed() {
        // Seed is a Monday; rule selects Tuesdays. The seed itself is
        // occurrence 1, the Tuesdays follow.
        let rule = RecurrenceRule::weekly().with_by_day(vec![ByDay::every(Weekday::Tuesday)]);
        let seed = floating(2015, 11, 9, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 6),
            vec![
                "20151109T100000",
                "20151110T100000",
                "20151117T100000",
                "20151124T100000",
                "20151201T100000",
                "20151208T100000",
            ]
        );
    }

    #[test]
    fn weekly_multiple_bydays() {
        let rule = RecurrenceRule::weekly()
            .with_count(6)
            .with_by_day(vec![
                ByDay::every(Weekday::Monday),
                ByDay::every(Weekday::Wednesday),
                ByDay::every(Weekday::Friday),
            ]);
        // 2026-01-05 is a Monday.
        let seed = floating(2026, 1, 5, 9, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 10),
            vec![
                "20260105T090000",
                "20260107T090000",
                "20260109T090000",
                "20260112T090000",
                "20260114T090000",
                "20260116T090000",
            ]
        );
    }

    #[test]
    fn until_is_inclusive() {
        let until = floating(2015, 11, 11, 10, 0, 0);
        let rule = RecurrenceRule::daily().with_until(until);
        let seed = floating(2015, 11, 9, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 10),
            vec!["20151109T100000", "20151110T100000", "20151111T100000"]
        );
    }

    #[test]
    fn until_before_next_candidate_stops() {
        let until = floating(2015, 11, 10, 9, 0, 0);
        let rule = RecurrenceRule::daily().with_until(until);
        let seed = floating(2015, 11, 9, 10, 0, 0);
        assert_eq!(starts(&rule, &seed, 10), vec!["20151109T100000"]);
    }

    #[test]
    fn monthly_negative_monthday() {
        // Third-to-last day of each month.
        let rule = RecurrenceRule::monthly().with_by_monthday(vec![-3]);
        let seed = floating(2016, 5, 29, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 3),
            vec!["20160529T100000", "20160628T100000", "20160729T100000"]
        );
    }

    #[test]
    fn monthly_nth_weekday() {
        // Third Tuesday of each month; seed 2015-11-17 is one.
        let rule = RecurrenceRule::monthly().with_by_day(vec![ByDay::nth(3, Weekday::Tuesday)]);
        let seed = floating(2015, 11, 17, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 3),
            vec!["20151117T100000", "20151215T100000", "20160119T100000"]
        );
    }

    #[test]
    fn monthly_last_friday() {
        let rule = RecurrenceRule::monthly().with_by_day(vec![ByDay::nth(-1, Weekday::Friday)]);
        let seed = floating(2015, 11, 27, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 3),
            vec!["20151127T100000", "20151225T100000", "20160129T100000"]
        );
    }

    #[test]
    fn monthly_day_31_skips_short_months() {
        let rule = RecurrenceRule::monthly();
        let seed = floating(2016, 1, 31, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 4),
            vec![
                "20160131T100000",
                "20160331T100000",
                "20160531T100000",
                "20160731T100000",
            ]
        );
    }

    #[test]
    fn monthly_setpos_last_weekday() {
        let rule = RecurrenceRule::monthly()
            .with_by_day(vec![
                ByDay::every(Weekday::Monday),
                ByDay::every(Weekday::Tuesday),
                ByDay::every(Weekday::Wednesday),
                ByDay::every(Weekday::Thursday),
                ByDay::every(Weekday::Friday),
            ])
            .with_by_setpos(vec![-1]);
        // Last weekday of Nov 2015 is Monday the 30th.
        let seed = floating(2015, 11, 30, 10, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 3),
            vec!["20151130T100000", "20151231T100000", "20160129T100000"]
        );
    }

    #[test]
    fn yearly_bymonth() {
        let rule = RecurrenceRule::yearly().with_by_month(vec![1, 7]);
        let seed = floating(2016, 1, 10, 8, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 4),
            vec![
                "20160110T080000",
                "20160710T080000",
                "20170110T080000",
                "20170710T080000",
            ]
        );
    }

    #[test]
    fn yearly_feb_29_skips_non_leap_years() {
        let rule = RecurrenceRule::yearly();
        let seed = floating(2016, 2, 29, 12, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 3),
            vec!["20160229T120000", "20200229T120000", "20240229T120000"]
        );
    }

    #[test]
    fn hourly_basic() {
        let rule = RecurrenceRule::new(Frequency::Hourly).with_count(3);
        let seed = floating(2016, 1, 1, 9, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 10),
            vec!["20160101T090000", "20160101T100000", "20160101T110000"]
        );
    }

    #[test]
    fn daily_byhour_expands() {
        let mut rule = RecurrenceRule::daily().with_count(4);
        rule.by_hour = vec![9, 15];
        let seed = floating(2016, 1, 1, 9, 0, 0);
        assert_eq!(
            starts(&rule, &seed, 10),
            vec![
                "20160101T090000",
                "20160101T150000",
                "20160102T090000",
                "20160102T150000",
            ]
        );
    }

    #[test]
    fn no_matching_rule_terminates() {
        // February 30th never exists.
        let mut rule = RecurrenceRule::yearly();
        rule.by_month = vec![2];
        rule.by_monthday = vec![30];
        let seed = floating(2016, 1, 1, 0, 0, 0);
        let occurrences: Vec<Temporal> = rule.occurrences(&seed).take(5).collect();
        // Only the seed is emitted; the rule itself never matches.
        assert_eq!(occurrences.len(), 1);
    }

    #[test]
    fn streams_are_restartable() {
        let rule = RecurrenceRule::daily();
        let seed = floating(2015, 11, 9, 10, 0, 0);
        let first: Vec<String> = starts(&rule, &seed, 5);
        let second: Vec<String> = starts(&rule, &seed, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn strictly_increasing() {
        let mut rule = RecurrenceRule::monthly();
        rule.by_monthday = vec![1, 15, -1];
        let seed = floating(2016, 1, 1, 8, 0, 0);
        let occurrences: Vec<Temporal> = rule.occurrences(&seed).take(12).collect();
        for pair in occurrences.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn whole_day_seed() {
        let rule = RecurrenceRule::weekly().with_count(3);
        let seed = Temporal::date(NaiveDate::from_ymd_opt(2015, 11, 9).unwrap());
        let occurrences: Vec<String> = starts(&rule, &seed, 5);
        assert_eq!(occurrences, vec!["20151109", "20151116", "20151123"]);
    }

    #[test]
    fn wkst_changes_weekly_grouping() {
        // With interval 2 and BYDAY, the week-start day decides which week
        // a Sunday belongs to.
        let rule = RecurrenceRule::weekly()
            .with_interval(2)
            .with_by_day(vec![ByDay::every(Weekday::Sunday)])
            .with_wkst(Weekday::Sunday);
        let seed = floating(2015, 11, 8, 10, 0, 0); // a Sunday
        assert_eq!(
            starts(&rule, &seed, 3),
            vec!["20151108T100000", "20151122T100000", "20151206T100000"]
        );
    }
}
