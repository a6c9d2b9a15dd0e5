//! This module defines the core vocabulary shared by the encoder, simulator and enumerator:
//! tape directions, simulation statuses, transition slots, search limits and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The largest number of states a packed machine can describe.
pub const MAX_STATES: usize = 5;
/// The size of the tape alphabet.
pub const SYMBOLS: usize = 2;
/// Number of transition slots in a packed machine table.
pub const SLOTS: usize = MAX_STATES * SYMBOLS;
/// Numeric label of the halting state inside a packed transition.
pub const HALT: u8 = 5;
/// Machines which have not introduced more than this many states are checked against
/// the proven 4-state bounds.
pub const SMALL_MACHINE_STATES: u8 = 4;

/// Represents the two directions a head can move after a transition.
///
/// The discriminants match the packed encoding: right is `0`, left is `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the right.
    Right = 0,
    /// Move the head one cell to the left.
    Left = 1,
}

impl Direction {
    /// Enumeration order used when generating children.
    pub const ALL: [Direction; 2] = [Direction::Right, Direction::Left];

    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    pub fn bit(self) -> bool {
        self == Direction::Left
    }

    /// Signed head displacement.
    pub fn delta(self) -> i64 {
        match self {
            Direction::Right => 1,
            Direction::Left => -1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Right => write!(f, "R"),
            Direction::Left => write!(f, "L"),
        }
    }
}

/// Classification of a simulated machine, written to the log as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The machine reached an undefined transition.
    Halting = 0,
    /// The machine outgrew the proven 4-state bounds while using at most 4 states.
    NonHalting = 1,
    /// The head span exceeded the space bound.
    UndecidedSpace = 2,
    /// The machine ran for the full time bound.
    UndecidedTime = 3,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Halting,
        Status::NonHalting,
        Status::UndecidedSpace,
        Status::UndecidedTime,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Status::ALL.get(code as usize).copied()
    }
}

/// Identifies one entry of the transition table: a state and the symbol read in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub state: u8,
    pub symbol: u8,
}

impl Slot {
    pub fn new(state: u8, symbol: u8) -> Self {
        Self { state, symbol }
    }

    /// Position of the slot inside the packed table.
    pub fn index(self) -> usize {
        SYMBOLS * self.state as usize + self.symbol as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::new((index / SYMBOLS) as u8, (index % SYMBOLS) as u8)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", state_letter(self.state), self.symbol)
    }
}

/// Returns the conventional letter of a state (`A` for 0, ..., `Z` for halt).
pub fn state_letter(state: u8) -> char {
    if state >= HALT {
        'Z'
    } else {
        (b'A' + state) as char
    }
}

/// Time and space bounds for one state count.
///
/// `max_time`/`max_space` are the bounds applied to every machine; `small_time` and
/// `small_space` are the proven bounds applied while a machine uses at most
/// [`SMALL_MACHINE_STATES`] states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub states: u8,
    pub max_time: u64,
    pub max_space: u64,
    pub small_time: u64,
    pub small_space: u64,
}

impl Limits {
    /// 4-state search. Every 4-state machine is decided by the small-machine bounds, so
    /// the global bounds are never reached.
    pub const BB4: Limits = Limits {
        states: 4,
        ..Limits::BB5
    };

    /// Conjectured bounds for 5-state machines.
    pub const BB5: Limits = Limits {
        states: 5,
        max_time: 47_176_870,
        max_space: 12_289,
        small_time: 107,
        small_space: 16,
    };

    /// Looks up the preset for a state count.
    pub fn for_states(states: u8) -> Result<Self, BeaverError> {
        match states {
            4 => Ok(Limits::BB4),
            5 => Ok(Limits::BB5),
            _ => Err(BeaverError::ValidationError(format!(
                "No bounds known for {} states (expected 4 or 5)",
                states
            ))),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits::BB5
    }
}

/// Represents the errors that can occur while encoding, simulating or enumerating machines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeaverError {
    /// A tape access fell outside the preallocated buffer.
    #[error("Tape boundary exceeded at position {0}")]
    TapeBoundary(i64),
    /// A machine text could not be parsed.
    #[error("Machine parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A value was syntactically valid but not a usable machine, record or setting.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Reading or writing a log file failed.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let right_json = serde_json::to_string(&Direction::Right).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(right_json, "\"Right\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_direction_bits() {
        assert!(!Direction::Right.bit());
        assert!(Direction::Left.bit());
        assert_eq!(Direction::from_bit(true), Direction::Left);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::Left.delta(), -1);
    }

    #[test]
    fn test_status_codes() {
        for status in Status::ALL {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
        assert_eq!(Status::UndecidedTime.code(), 3);
        assert_eq!(Status::from_code(4), None);
    }

    #[test]
    fn test_slot_index() {
        let slot = Slot::new(3, 1);
        assert_eq!(slot.index(), 7);
        assert_eq!(Slot::from_index(7), slot);
        assert_eq!(slot.to_string(), "D1");
    }

    #[test]
    fn test_limits_presets() {
        assert_eq!(Limits::for_states(5).unwrap(), Limits::BB5);
        assert_eq!(Limits::for_states(4).unwrap().small_time, 107);
        assert!(Limits::for_states(6).is_err());

        let json = serde_json::to_string(&Limits::BB5).unwrap();
        let limits: Limits = serde_json::from_str(&json).unwrap();
        assert_eq!(limits, Limits::BB5);
    }

    #[test]
    fn test_error_display() {
        let error = BeaverError::TapeBoundary(-12290);
        assert!(error.to_string().contains("-12290"));
    }
}
