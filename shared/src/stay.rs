use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BookingError;

/// A half-open night range `[check_in, check_out)` holding at least one night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStayRange")]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

#[derive(Deserialize)]
struct RawStayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl TryFrom<RawStayRange> for StayRange {
    type Error = BookingError;

    fn try_from(raw: RawStayRange) -> Result<Self, Self::Error> {
        Self::new(raw.check_in, raw.check_out)
    }
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_out <= check_in {
            return Err(BookingError::Validation(format!(
                "check-out {check_out} must be at least one night after check-in {check_in}"
            )));
        }
        Ok(Self { check_in, check_out })
    }

    /// Range covering `days` consecutive nights starting at `start`.
    pub fn starting_at(start: NaiveDate, days: u32) -> Result<Self, BookingError> {
        let check_out = start
            .checked_add_days(chrono::Days::new(u64::from(days)))
            .ok_or_else(|| BookingError::Validation(format!("{days} days from {start} is out of range")))?;
        Self::new(start, check_out)
    }

    pub const fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub const fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> u32 {
        // NaiveDate spans fewer than u32::MAX days, and new() keeps this positive.
        (self.check_out - self.check_in).num_days() as u32
    }

    /// Every night of the stay, in calendar order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let check_out = self.check_out;
        self.check_in.iter_days().take_while(move |d| *d < check_out)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date < self.check_out
    }
}

impl fmt::Display for StayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.check_in, self.check_out)
    }
}
