//! Stay intervals and requests
//!
//! All instants are local calendar timestamps already normalized by the
//! caller (check-in date + time, check-out date + time).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::ApartmentId;

/// Half-open interval `[start, end)` over local timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl StayInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Two intervals overlap when each starts before the other ends.
    ///
    /// Back-to-back intervals (one ends exactly where the other starts) do
    /// not overlap.
    pub fn overlaps(&self, other: &StayInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Every calendar day touched by the interval, first and last included
    pub fn calendar_days(&self) -> Vec<NaiveDate> {
        let last = self.end.date();
        self.start
            .date()
            .iter_days()
            .take_while(|day| *day <= last)
            .collect()
    }
}

impl std::fmt::Display for StayInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%b %d, %H:%M"),
            self.end.format("%b %d, %H:%M")
        )
    }
}

/// Midnight at the start of a calendar day
pub fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// A guest stay an apartment asks parking for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRequest {
    pub apartment_id: ApartmentId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub guest_name: Option<String>,
}

impl StayRequest {
    pub fn new(apartment_id: ApartmentId, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            apartment_id,
            start,
            end,
            guest_name: None,
        }
    }

    /// Build a request from check-in/check-out dates and times
    pub fn from_dates(
        apartment_id: ApartmentId,
        check_in_date: NaiveDate,
        check_in: NaiveTime,
        check_out_date: NaiveDate,
        check_out: NaiveTime,
    ) -> Self {
        Self::new(
            apartment_id,
            check_in_date.and_time(check_in),
            check_out_date.and_time(check_out),
        )
    }

    pub fn with_guest(mut self, guest_name: String) -> Self {
        self.guest_name = Some(guest_name);
        self
    }

    pub fn interval(&self) -> StayInterval {
        StayInterval::new(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let cases = [
            (StayInterval::new(at(1, 16), at(2, 11)), StayInterval::new(at(2, 10), at(3, 11))),
            (StayInterval::new(at(1, 16), at(2, 11)), StayInterval::new(at(2, 11), at(3, 11))),
            (StayInterval::new(at(1, 0), at(5, 0)), StayInterval::new(at(2, 0), at(3, 0))),
            (StayInterval::new(at(1, 0), at(2, 0)), StayInterval::new(at(4, 0), at(5, 0))),
        ];
        for (a, b) in cases {
            assert_eq!(a.overlaps(&b), b.overlaps(&a), "{a} vs {b}");
        }
    }

    #[test]
    fn test_back_to_back_is_not_overlap() {
        let first = StayInterval::new(at(1, 16), at(2, 11));
        let second = StayInterval::new(at(2, 11), at(3, 11));
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = StayInterval::new(at(1, 0), at(5, 0));
        let inner = StayInterval::new(at(2, 0), at(3, 0));
        assert!(outer.overlaps(&inner));
        assert!(outer.overlaps(&outer));
    }

    #[test]
    fn test_calendar_days() {
        let stay = StayInterval::new(at(1, 16), at(3, 11));
        let days = stay.calendar_days();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0], at(1, 0).date());
        assert_eq!(days[2], at(3, 0).date());

        let same_day = StayInterval::new(at(1, 8), at(1, 20));
        assert_eq!(same_day.calendar_days().len(), 1);

        let inverted = StayInterval::new(at(3, 8), at(1, 20));
        assert!(inverted.calendar_days().is_empty());
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_request_from_dates() {
        let request = StayRequest::from_dates(
            ApartmentId::new("apt-6"),
            at(1, 0).date(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            at(2, 0).date(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        );
        assert_eq!(request.start, at(1, 16));
        assert_eq!(request.end, at(2, 11));
        assert_eq!(start_of_day(at(2, 0).date()), at(2, 0));
    }
}
