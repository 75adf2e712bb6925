//! Adjacent-date prefetch policy for date-indexed resources.
//!
//! Pure boundary clamping: given the date on screen, the earliest valid date
//! and "today", decide which neighbours are worth warming in the cache.

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Neighbours of a date that fall inside `[floor, today]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdjacentDates {
    pub previous: Option<NaiveDate>,
    pub next: Option<NaiveDate>,
}

impl AdjacentDates {
    /// Dates to prefetch, previous first.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        self.previous.into_iter().chain(self.next)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }
}

/// Compute the in-range neighbours of `current`.
///
/// The previous day is kept when it is not before `floor`; the next day when
/// it does not exceed `today`. A `current` outside the window is clamped
/// first, so a stale "today" never yields a future date.
#[must_use]
pub fn adjacent_dates(current: NaiveDate, floor: NaiveDate, today: NaiveDate) -> AdjacentDates {
    if floor > today {
        return AdjacentDates {
            previous: None,
            next: None,
        };
    }
    let current = current.clamp(floor, today);

    let previous = current
        .checked_sub_days(Days::new(1))
        .filter(|d| *d >= floor);
    let next = current
        .checked_add_days(Days::new(1))
        .filter(|d| *d <= today);

    AdjacentDates { previous, next }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const FLOOR: (i32, u32, u32) = (1995, 6, 16);

    fn floor() -> NaiveDate {
        date(FLOOR.0, FLOOR.1, FLOOR.2)
    }

    #[test]
    fn middle_date_has_both_neighbours() {
        let adj = adjacent_dates(date(2024, 3, 1), floor(), date(2024, 6, 1));
        assert_eq!(adj.previous, Some(date(2024, 2, 29)));
        assert_eq!(adj.next, Some(date(2024, 3, 2)));
        assert_eq!(adj.iter().count(), 2);
    }

    #[test]
    fn floor_has_no_previous() {
        let adj = adjacent_dates(floor(), floor(), date(2024, 6, 1));
        assert_eq!(adj.previous, None);
        assert_eq!(adj.next, Some(date(1995, 6, 17)));
    }

    #[test]
    fn today_has_no_next() {
        let today = date(2024, 6, 1);
        let adj = adjacent_dates(today, floor(), today);
        assert_eq!(adj.previous, Some(date(2024, 5, 31)));
        assert_eq!(adj.next, None);
    }

    #[test]
    fn single_day_window_is_empty() {
        let adj = adjacent_dates(floor(), floor(), floor());
        assert!(adj.is_empty());
    }

    #[test]
    fn out_of_range_current_is_clamped() {
        let today = date(2024, 6, 1);
        let adj = adjacent_dates(date(2030, 1, 1), floor(), today);
        assert_eq!(adj.next, None);
        assert_eq!(adj.previous, Some(date(2024, 5, 31)));

        let adj = adjacent_dates(date(1990, 1, 1), floor(), today);
        assert_eq!(adj.previous, None);
        assert_eq!(adj.next, Some(date(1995, 6, 17)));
    }

    #[test]
    fn inverted_window_is_empty() {
        assert!(adjacent_dates(floor(), date(2024, 1, 1), date(2023, 1, 1)).is_empty());
    }
}
