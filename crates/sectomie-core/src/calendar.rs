//! Game calendar: turn counter and in-world date.
//!
//! One turn is one month. The turn counter starts at 1 and the month wraps
//! from 12 back to 1, incrementing the year. All advancement uses checked
//! arithmetic.

use serde::{Deserialize, Serialize};

/// Months in a year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Errors that can occur during calendar operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// Turn or year counter would overflow.
    #[error("calendar overflow: cannot advance beyond the last representable turn")]
    TurnOverflow,

    /// A date or turn outside the valid range.
    #[error("invalid calendar state: {reason}")]
    InvalidDate {
        /// What is wrong with the supplied state.
        reason: String,
    },
}

/// A year/month pair. Both start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameDate {
    /// In-world year.
    pub year: u32,
    /// Month within the year, `1..=12`.
    pub month: u32,
}

impl GameDate {
    /// Check that both components are in range.
    pub fn validate(self) -> Result<Self, CalendarError> {
        if self.year == 0 {
            return Err(CalendarError::InvalidDate {
                reason: "year must be at least 1".to_owned(),
            });
        }
        if !(1..=MONTHS_PER_YEAR).contains(&self.month) {
            return Err(CalendarError::InvalidDate {
                reason: format!("month must be 1..=12, got {}", self.month),
            });
        }
        Ok(self)
    }

    /// The month after this one.
    pub fn next(self) -> Result<Self, CalendarError> {
        if self.month >= MONTHS_PER_YEAR {
            let year = self.year.checked_add(1).ok_or(CalendarError::TurnOverflow)?;
            Ok(Self { year, month: 1 })
        } else {
            let month = self.month.checked_add(1).ok_or(CalendarError::TurnOverflow)?;
            Ok(Self {
                year: self.year,
                month,
            })
        }
    }
}

impl Default for GameDate {
    fn default() -> Self {
        Self { year: 1, month: 1 }
    }
}

impl std::fmt::Display for GameDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Year {}, Month {}", self.year, self.month)
    }
}

/// Turn counter plus the date of the current turn.
///
/// Not serializable on its own; persistence stores the parts and rebuilds
/// through [`Calendar::from_parts`] so saved state is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    current_turn: u64,
    date: GameDate,
}

impl Calendar {
    /// Start a new calendar at turn 1 on the given date.
    pub fn new(start: GameDate) -> Result<Self, CalendarError> {
        Ok(Self {
            current_turn: 1,
            date: start.validate()?,
        })
    }

    /// Rebuild a calendar from saved state.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] if `turn` is 0 or the date is
    /// out of range.
    pub fn from_parts(current_turn: u64, date: GameDate) -> Result<Self, CalendarError> {
        if current_turn == 0 {
            return Err(CalendarError::InvalidDate {
                reason: "turn counter starts at 1".to_owned(),
            });
        }
        Ok(Self {
            current_turn,
            date: date.validate()?,
        })
    }

    /// Move to the next turn. Returns the new turn number.
    ///
    /// Nothing changes if either counter would overflow.
    pub fn advance_turn(&mut self) -> Result<u64, CalendarError> {
        let turn = self
            .current_turn
            .checked_add(1)
            .ok_or(CalendarError::TurnOverflow)?;
        let date = self.date.next()?;
        self.current_turn = turn;
        self.date = date;
        Ok(turn)
    }

    /// Current turn number.
    pub const fn current_turn(&self) -> u64 {
        self.current_turn
    }

    /// Date of the current turn.
    pub const fn date(&self) -> GameDate {
        self.date
    }

    /// Current year.
    pub const fn year(&self) -> u32 {
        self.date.year
    }

    /// Current month.
    pub const fn month(&self) -> u32 {
        self.date.month
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            current_turn: 1,
            date: GameDate::default(),
        }
    }
}
