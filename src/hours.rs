//! Hours
//!
//! Local wall-clock hours and the windows that time-of-day discounts are keyed on.

use std::fmt;

use thiserror::Error;

/// Errors constructing an [`Hour`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HourError {
    /// The value is not a valid hour of the day.
    #[error("hour must be between 0 and 23, got {0}")]
    OutOfRange(i64),
}

/// An hour of the day, `0..=23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hour(u8);

impl Hour {
    /// Midnight.
    pub const MIDNIGHT: Hour = Hour(0);

    /// Creates a new hour.
    ///
    /// # Errors
    ///
    /// Returns [`HourError::OutOfRange`] if `value` is greater than 23.
    pub fn new(value: u8) -> Result<Self, HourError> {
        if value > 23 {
            return Err(HourError::OutOfRange(i64::from(value)));
        }

        Ok(Hour(value))
    }

    /// Creates an hour, wrapping values past 23 around the clock.
    pub const fn wrapping(value: u8) -> Self {
        Hour(value % 24)
    }

    /// The current hour in the system's local time zone.
    ///
    /// # Errors
    ///
    /// Returns [`HourError::OutOfRange`] if the clock reports an impossible hour.
    pub fn now() -> Result<Self, HourError> {
        Hour::try_from(jiff::Zoned::now().hour())
    }

    /// The hour as a number.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i8> for Hour {
    type Error = HourError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_err| HourError::OutOfRange(i64::from(value)))
            .and_then(Hour::new)
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

/// Where the current hour comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Always report this hour.
    Fixed(Hour),

    /// Read the system's local time.
    Local,
}

impl Clock {
    /// The current hour according to this clock.
    ///
    /// # Errors
    ///
    /// Returns [`HourError::OutOfRange`] if the system clock reports an impossible hour.
    pub fn hour(self) -> Result<Hour, HourError> {
        match self {
            Clock::Fixed(hour) => Ok(hour),
            Clock::Local => Hour::now(),
        }
    }
}

/// An inclusive range of hours.
///
/// When `start` is later than `end` the window wraps past midnight, so
/// `18..=5` covers the evening and the small hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    start: Hour,
    end: Hour,
}

impl HourWindow {
    /// Creates a new window covering `start` through `end`, inclusive.
    pub fn new(start: Hour, end: Hour) -> Self {
        Self { start, end }
    }

    /// First hour in the window.
    pub fn start(self) -> Hour {
        self.start
    }

    /// Last hour in the window.
    pub fn end(self) -> Hour {
        self.end
    }

    /// Does the window include the given hour?
    pub fn contains(self, hour: Hour) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour <= self.end
        } else {
            hour >= self.start || hour <= self.end
        }
    }
}
