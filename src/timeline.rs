// src/timeline.rs

use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Launch of permanent structured cooperation.
pub const PESCO_LAUNCH: i32 = 2017;
/// First year of the reinforced-cooperation phase.
pub const ACCELERATION: i32 = 2020;
/// First year of the maturity phase.
pub const MATURITY: i32 = 2023;

pub const DEFAULT_START: i32 = 2017;
pub const DEFAULT_END: i32 = 2027;

/// Longest accepted range, in years.
pub const MAX_SPAN: i32 = 1000;

/// Where a calendar year sits relative to the fixed breakpoints.
/// The payload is the step `k` counted from the phase's reference year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Before,
    Launch(f64),
    Acceleration(f64),
    Maturity(f64),
}

impl Phase {
    pub fn of(year: i32) -> Self {
        if year < PESCO_LAUNCH {
            Phase::Before
        } else if year < ACCELERATION {
            Phase::Launch(f64::from(year - (PESCO_LAUNCH - 1)))
        } else if year < MATURITY {
            Phase::Acceleration(f64::from(year - (ACCELERATION - 1)))
        } else {
            Phase::Maturity(f64::from(year - (MATURITY - 1)))
        }
    }
}

/// Years elapsed since the launch, counting the launch year as 1; 0 before it.
pub fn years_since_launch(year: i32) -> f64 {
    if year >= PESCO_LAUNCH {
        f64::from(year - (PESCO_LAUNCH - 1))
    } else {
        0.0
    }
}

/// Inclusive range of simulated years.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeline {
    pub start: i32,
    pub end: i32,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
        }
    }
}

impl Timeline {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            bail!("start year {} is after end year {}", start, end);
        }
        if i64::from(end) - i64::from(start) >= i64::from(MAX_SPAN) {
            bail!(
                "range {}-{} spans more than {} years",
                start,
                end,
                MAX_SPAN
            );
        }
        for year in [start, end] {
            if NaiveDate::from_ymd_opt(year, 12, 31).is_none() {
                bail!("year {} is outside the supported calendar", year);
            }
        }
        Ok(Self { start, end })
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        (i64::from(self.end) - i64::from(self.start) + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One 31 December per simulated year. `new` guarantees every year in
    /// range has one.
    pub fn year_ends(&self) -> Vec<NaiveDate> {
        self.years()
            .filter_map(|y| NaiveDate::from_ymd_opt(y, 12, 31))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn phases_follow_breakpoints() {
        assert_eq!(Phase::of(2015), Phase::Before);
        assert_eq!(Phase::of(2017), Phase::Launch(1.0));
        assert_eq!(Phase::of(2019), Phase::Launch(3.0));
        assert_eq!(Phase::of(2020), Phase::Acceleration(1.0));
        assert_eq!(Phase::of(2022), Phase::Acceleration(3.0));
        assert_eq!(Phase::of(2023), Phase::Maturity(1.0));
        assert_eq!(Phase::of(2027), Phase::Maturity(5.0));
    }

    #[test]
    fn default_range_is_eleven_year_ends() {
        let t = Timeline::default();
        assert_eq!(t.len(), 11);
        let ends = t.year_ends();
        assert_eq!(ends.len(), 11);
        assert_eq!(ends[0], NaiveDate::from_ymd_opt(2017, 12, 31).unwrap());
        assert!(ends.iter().all(|d| d.month() == 12 && d.day() == 31));
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(Timeline::new(2027, 2017).is_err());
        assert_eq!(Timeline::new(2020, 2020).unwrap().len(), 1);
    }

    #[test]
    fn oversized_or_unrepresentable_ranges_rejected() {
        assert!(Timeline::new(1, 2_000_000_000).is_err());
        assert!(Timeline::new(i32::MIN, i32::MAX).is_err());
        assert!(Timeline::new(2000, 2000 + MAX_SPAN).is_err());
        assert!(Timeline::new(500_000, 500_010).is_err());

        let widest = Timeline::new(2000, 2000 + MAX_SPAN - 1).unwrap();
        assert_eq!(widest.len(), MAX_SPAN as usize);
        assert_eq!(widest.year_ends().len(), widest.len());
        assert!(!widest.is_empty());
    }
}
