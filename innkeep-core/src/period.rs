//! Period boundary resolution.
//!
//! A logical period (day/month/year plus an anchor date) is interpreted in a
//! property's named timezone and resolved to a half-open `[utc_start,
//! utc_end)` instant range. Each boundary is converted to UTC independently
//! using the zone's rules at that specific instant, so a daylight-saving
//! transition inside the period shifts only the boundary it actually affects.
//!
//! Resolution is a pure computation: no I/O, no suspension points.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::PeriodError;

/// How far forward to probe when a local midnight falls into a DST gap.
/// Steps of 15 minutes cover zones with 30-minute transitions.
const GAP_PROBE_STEP_MINUTES: i64 = 15;
const GAP_PROBE_LIMIT: usize = 12;

/// The logical unit of a reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Day,
    Month,
    Year,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeriodKind::Day => "day",
            PeriodKind::Month => "month",
            PeriodKind::Year => "year",
        };
        f.write_str(s)
    }
}

impl FromStr for PeriodKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(PeriodKind::Day),
            "month" => Ok(PeriodKind::Month),
            "year" => Ok(PeriodKind::Year),
            _ => Err(()),
        }
    }
}

/// A logical reporting period: a unit plus an anchor date.
///
/// The anchor is interpreted in the owning property's timezone, never the
/// server's or the caller's. Construct through [`Period::new`] (or the
/// per-kind helpers), which canonicalizes the anchor to the first day of the
/// unit so that equal periods compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub kind: PeriodKind,
    pub anchor: NaiveDate,
}

impl Period {
    /// Create a period with a canonical anchor (truncated to the unit start).
    pub fn new(kind: PeriodKind, anchor: NaiveDate) -> Self {
        let anchor = match kind {
            PeriodKind::Day => anchor,
            // `with_day(1)` / `with_ordinal(1)` cannot fail for day 1.
            PeriodKind::Month => anchor.with_day(1).unwrap_or(anchor),
            PeriodKind::Year => anchor.with_ordinal(1).unwrap_or(anchor),
        };
        Self { kind, anchor }
    }

    /// A single calendar day.
    pub fn day(anchor: NaiveDate) -> Self {
        Self::new(PeriodKind::Day, anchor)
    }

    /// The calendar month containing `anchor`.
    pub fn month(anchor: NaiveDate) -> Self {
        Self::new(PeriodKind::Month, anchor)
    }

    /// The calendar year containing `anchor`.
    pub fn year(anchor: NaiveDate) -> Self {
        Self::new(PeriodKind::Year, anchor)
    }

    /// Local calendar bounds of this period: `[start_date, end_date)`.
    fn local_bounds(&self) -> Result<(NaiveDate, NaiveDate), PeriodError> {
        let out_of_range = || PeriodError::AnchorOutOfRange {
            kind: self.kind,
            anchor: self.anchor,
        };

        match self.kind {
            PeriodKind::Day => {
                let end = self.anchor.checked_add_days(Days::new(1)).ok_or_else(out_of_range)?;
                Ok((self.anchor, end))
            }
            PeriodKind::Month => {
                let start = self.anchor.with_day(1).ok_or_else(out_of_range)?;
                let (next_year, next_month) = if start.month() == 12 {
                    (start.year() + 1, 1)
                } else {
                    (start.year(), start.month() + 1)
                };
                let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(out_of_range)?;
                Ok((start, end))
            }
            PeriodKind::Year => {
                let start = NaiveDate::from_ymd_opt(self.anchor.year(), 1, 1).ok_or_else(out_of_range)?;
                let end = NaiveDate::from_ymd_opt(self.anchor.year() + 1, 1, 1).ok_or_else(out_of_range)?;
                Ok((start, end))
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.anchor)
    }
}

/// A half-open UTC instant range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl UtcRange {
    /// Whether an instant falls inside the range. The end boundary is
    /// exclusive: an instant exactly at `end` belongs to the next period.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Parse a named IANA timezone, e.g. "Europe/Berlin".
///
/// Fixed offsets are deliberately not accepted: only a named zone carries
/// the transition rules needed for correct boundary conversion.
pub fn parse_timezone(name: &str) -> Result<Tz, PeriodError> {
    name.parse::<Tz>().map_err(|_| PeriodError::UnknownTimezone {
        name: name.to_string(),
    })
}

/// Resolve a logical period in a property's timezone to a half-open UTC range.
///
/// The local first-instant of the period and of the following period are each
/// converted to UTC with the zone's rules at that instant. An event at local
/// 00:30 on the first of a month in a UTC+1 zone therefore lands in that
/// local month even though its UTC instant is still in the previous UTC month.
pub fn resolve_period(period: &Period, tz: Tz) -> Result<UtcRange, PeriodError> {
    let (start_date, end_date) = period.local_bounds()?;
    let start = local_midnight_to_utc(start_date, tz)?;
    let end = local_midnight_to_utc(end_date, tz)?;
    Ok(UtcRange { start, end })
}

/// Convert a local calendar date's first instant to UTC.
///
/// Ambiguous local midnights (fall-back transitions) take the earlier
/// instant. Nonexistent local midnights (spring-forward gaps) roll forward to
/// the first instant that exists in the zone.
fn local_midnight_to_utc(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, PeriodError> {
    let mut probe = date.and_time(NaiveTime::MIN);
    for _ in 0..=GAP_PROBE_LIMIT {
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(local) => return Ok(local.with_timezone(&Utc)),
            LocalResult::Ambiguous(earlier, _later) => return Ok(earlier.with_timezone(&Utc)),
            LocalResult::None => probe += Duration::minutes(GAP_PROBE_STEP_MINUTES),
        }
    }
    Err(PeriodError::UnresolvableBoundary {
        date,
        zone: tz.name().to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn anchor_strategy() -> impl Strategy<Value = NaiveDate> {
        // Dates across several DST eras, well inside chrono's range.
        (1990i32..=2030, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
        })
    }

    fn kind_strategy() -> impl Strategy<Value = PeriodKind> {
        prop_oneof![
            Just(PeriodKind::Day),
            Just(PeriodKind::Month),
            Just(PeriodKind::Year),
        ]
    }

    fn zone_strategy() -> impl Strategy<Value = Tz> {
        prop_oneof![
            Just(chrono_tz::Etc::UTC),
            Just(chrono_tz::Europe::Berlin),
            Just(chrono_tz::America::New_York),
            Just(chrono_tz::America::Santiago),
            Just(chrono_tz::Australia::Lord_Howe),
            Just(chrono_tz::Asia::Kathmandu),
        ]
    }

    proptest! {
        /// Resolved ranges are non-empty and half-open.
        #[test]
        fn prop_range_is_nonempty_and_half_open(
            anchor in anchor_strategy(),
            kind in kind_strategy(),
            tz in zone_strategy(),
        ) {
            let range = resolve_period(&Period::new(kind, anchor), tz).expect("resolvable");
            prop_assert!(range.start < range.end);
            prop_assert!(range.contains(range.start));
            prop_assert!(!range.contains(range.end));
        }

        /// A day is 24h plus or minus at most one DST transition.
        #[test]
        fn prop_day_length_within_transition_bounds(
            anchor in anchor_strategy(),
            tz in zone_strategy(),
        ) {
            let range = resolve_period(&Period::day(anchor), tz).expect("resolvable");
            let length = range.end - range.start;
            prop_assert!(length >= Duration::hours(23), "day too short: {}", length);
            prop_assert!(length <= Duration::hours(25), "day too long: {}", length);
        }

        /// Consecutive periods tile time: this period's end is the next
        /// period's start.
        #[test]
        fn prop_consecutive_months_tile(
            anchor in anchor_strategy(),
            tz in zone_strategy(),
        ) {
            let this = Period::month(anchor);
            let (_, next_start) = this.local_bounds().expect("bounds");
            let next = Period::month(next_start);

            let this_range = resolve_period(&this, tz).expect("resolvable");
            let next_range = resolve_period(&next, tz).expect("resolvable");
            prop_assert_eq!(this_range.end, next_range.start);
        }
    }
}
