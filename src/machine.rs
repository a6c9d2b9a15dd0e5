//! This module defines the packed machine encoding. A whole transition table, plus the two
//! bookkeeping fields used by the enumerator, fits in a single `u64`.
//!
//! Layout, from the least significant bit:
//!
//! | bits    | content                                             |
//! |---------|-----------------------------------------------------|
//! | 0..50   | ten 5-bit transitions, slot `2 * state + symbol`    |
//! | 50..54  | number of transitions still pointing at `HALT`      |
//! | 54..58  | lowest state whose two transitions both halt        |
//!
//! Inside a transition, bits 0..3 hold the next state (`HALT` = 5), bit 3 the symbol to
//! write and bit 4 the direction (right = 0, left = 1).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{state_letter, BeaverError, Direction, Slot, HALT, MAX_STATES, SLOTS, SYMBOLS};

const TRANSITION_BITS: u32 = 5;
const TRANSITION_MASK: u64 = 0b11111;
const TABLE_BITS: u32 = TRANSITION_BITS * SLOTS as u32;
const TABLE_MASK: u64 = (1 << TABLE_BITS) - 1;
const UNDEFINED_SHIFT: u32 = 50;
const FIRST_UNDEFINED_SHIFT: u32 = 54;
const FIELD_MASK: u64 = 0b1111;

/// A single transition rule: the state to enter, the symbol to write and where to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Next state, or [`HALT`].
    pub next: u8,
    pub write: u8,
    pub direction: Direction,
}

impl Transition {
    /// The placeholder stored in every slot that has not been assigned yet.
    pub const UNDEFINED: Transition = Transition {
        next: HALT,
        write: 0,
        direction: Direction::Right,
    };

    pub fn new(next: u8, write: u8, direction: Direction) -> Self {
        Self {
            next,
            write,
            direction,
        }
    }

    pub fn is_halt(&self) -> bool {
        self.next == HALT
    }

    /// The state entered by this transition, `None` when it halts.
    pub fn next_state(&self) -> Option<u8> {
        (!self.is_halt()).then_some(self.next)
    }

    pub fn pack(&self) -> u64 {
        (self.direction.bit() as u64) << 4 | ((self.write & 1) as u64) << 3 | (self.next & 0b111) as u64
    }

    pub fn unpack(bits: u64) -> Self {
        Self {
            next: (bits & 0b111) as u8,
            write: ((bits >> 3) & 1) as u8,
            direction: Direction::from_bit((bits >> 4) & 1 == 1),
        }
    }
}

/// Renders `0RZ`, which packs to the same bits as an undefined slot, as `---`.
impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Transition::UNDEFINED {
            write!(f, "---")
        } else {
            write!(f, "{}{}{}", self.write, self.direction, state_letter(self.next))
        }
    }
}

/// A (possibly partial) Turing machine packed into one integer.
///
/// The value is the exact encoding written to the enumeration log, so two machines are
/// equal if and only if their encodings are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Machine(u64);

impl Machine {
    /// Wraps a raw encoding without checking it.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw encoding.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Builds a machine from a full table and its bookkeeping fields.
    pub fn from_table(
        table: &[Transition; SLOTS],
        undefined_count: u8,
        first_undefined_state: u8,
    ) -> Self {
        let bits = table
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, t)| acc | t.pack() << (TRANSITION_BITS * i as u32));

        Self(bits).with_metadata(undefined_count, first_undefined_state)
    }

    /// Builds a machine from its table alone, deriving the bookkeeping fields for a machine
    /// with `states` live states.
    pub fn from_transitions(table: &[Transition; SLOTS], states: u8) -> Self {
        let machine = Self::from_table(table, 0, 0);
        machine.with_metadata(
            machine.count_halting(states),
            machine.lowest_halting_state(states),
        )
    }

    /// The search root for `states` states: `A0 -> 1RB`, everything else undefined.
    pub fn root(states: u8) -> Self {
        let mut table = [Transition::UNDEFINED; SLOTS];
        table[0] = Transition::new(1, 1, Direction::Right);

        Self::from_table(&table, 2 * states - 1, 1)
    }

    pub fn transition(self, slot: Slot) -> Transition {
        Transition::unpack(self.0 >> (TRANSITION_BITS * slot.index() as u32))
    }

    /// Returns the full table.
    pub fn table(self) -> [Transition; SLOTS] {
        std::array::from_fn(|i| self.transition(Slot::from_index(i)))
    }

    /// Returns a copy with `slot` replaced; the bookkeeping fields are left untouched.
    pub fn with_transition(self, slot: Slot, transition: Transition) -> Self {
        let shift = TRANSITION_BITS * slot.index() as u32;
        Self(self.0 & !(TRANSITION_MASK << shift) | transition.pack() << shift)
    }

    pub fn undefined_count(self) -> u8 {
        ((self.0 >> UNDEFINED_SHIFT) & FIELD_MASK) as u8
    }

    pub fn first_undefined_state(self) -> u8 {
        ((self.0 >> FIRST_UNDEFINED_SHIFT) & FIELD_MASK) as u8
    }

    /// Returns a copy carrying the given bookkeeping fields.
    pub fn with_metadata(self, undefined_count: u8, first_undefined_state: u8) -> Self {
        Self(
            self.0 & TABLE_MASK
                | (undefined_count as u64 & FIELD_MASK) << UNDEFINED_SHIFT
                | (first_undefined_state as u64 & FIELD_MASK) << FIRST_UNDEFINED_SHIFT,
        )
    }

    /// Returns true when both transitions of `state` halt.
    pub fn is_fully_halting(self, state: u8) -> bool {
        (0..SYMBOLS as u8).all(|symbol| self.transition(Slot::new(state, symbol)).is_halt())
    }

    /// Returns true when any transition of `state` halts.
    pub fn has_halting(self, state: u8) -> bool {
        (0..SYMBOLS as u8).any(|symbol| self.transition(Slot::new(state, symbol)).is_halt())
    }

    /// Counts halting transitions among the first `states` states.
    pub fn count_halting(self, states: u8) -> u8 {
        (0..states as usize * SYMBOLS)
            .filter(|&i| self.transition(Slot::from_index(i)).is_halt())
            .count() as u8
    }

    /// Lowest state among the first `states` whose transitions all halt, or `states`.
    pub fn lowest_halting_state(self, states: u8) -> u8 {
        (0..states)
            .find(|&state| self.is_fully_halting(state))
            .unwrap_or(states)
    }

    /// Number of states rendered by `Display`: trailing fully halting states are omitted.
    pub fn live_states(self) -> u8 {
        (1..=MAX_STATES as u8)
            .rev()
            .find(|&n| !self.is_fully_halting(n - 1))
            .unwrap_or(1)
    }

    /// Parses either a decimal encoding or a standard text machine.
    pub fn parse(input: &str) -> Result<Self, BeaverError> {
        let input = input.trim();
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            return input.parse::<u64>().map(Machine).map_err(|e| {
                BeaverError::ValidationError(format!("Invalid machine encoding {}: {}", input, e))
            });
        }

        crate::parser::parse(input)
    }
}

impl FromStr for Machine {
    type Err = BeaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Machine::parse(s)
    }
}

/// Renders the standard text format, e.g. `1RB1LB_1LA0LC_1RZ1LD_1RD0RA`.
impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for state in 0..self.live_states() {
            if state > 0 {
                write!(f, "_")?;
            }
            for symbol in 0..SYMBOLS as u8 {
                write!(f, "{}", self.transition(Slot::new(state, symbol)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_encoding() {
        let root = Machine::root(5);

        assert_eq!(root.raw(), 28329094430233769);
        assert_eq!(root.undefined_count(), 9);
        assert_eq!(root.first_undefined_state(), 1);
        assert_eq!(
            root.transition(Slot::new(0, 0)),
            Transition::new(1, 1, Direction::Right)
        );
        for i in 1..SLOTS {
            assert_eq!(root.transition(Slot::from_index(i)), Transition::UNDEFINED);
        }
    }

    #[test]
    fn test_four_state_root() {
        let root = Machine::root(4);
        assert_eq!(root.undefined_count(), 7);
        assert_eq!(root.table(), Machine::root(5).table());
    }

    #[test]
    fn test_transition_packing() {
        assert_eq!(Transition::UNDEFINED.pack(), 0b00101);
        let t = Transition::new(3, 1, Direction::Left);
        assert_eq!(t.pack(), 0b11011);
        assert_eq!(Transition::unpack(t.pack()), t);
        assert_eq!(t.next_state(), Some(3));
        assert_eq!(Transition::UNDEFINED.next_state(), None);
    }

    #[test]
    fn test_table_round_trip() {
        let mut table = [Transition::UNDEFINED; SLOTS];
        table[0] = Transition::new(1, 1, Direction::Right);
        table[3] = Transition::new(4, 0, Direction::Left);
        table[9] = Transition::new(0, 1, Direction::Left);

        let machine = Machine::from_table(&table, 7, 3);
        assert_eq!(machine.table(), table);
        assert_eq!(machine.undefined_count(), 7);
        assert_eq!(machine.first_undefined_state(), 3);
    }

    #[test]
    fn test_with_transition_keeps_other_fields() {
        let root = Machine::root(5);
        let slot = Slot::new(1, 0);
        let child = root.with_transition(slot, Transition::new(2, 0, Direction::Left));

        assert_eq!(child.transition(slot), Transition::new(2, 0, Direction::Left));
        assert_eq!(child.transition(Slot::new(0, 0)), root.transition(Slot::new(0, 0)));
        assert_eq!(child.undefined_count(), 9);
        assert_eq!(child.first_undefined_state(), 1);
    }

    #[test]
    fn test_metadata_masking() {
        let machine = Machine::root(5).with_metadata(4, 5);
        assert_eq!(machine.undefined_count(), 4);
        assert_eq!(machine.first_undefined_state(), 5);
        assert_eq!(machine.table(), Machine::root(5).table());
    }

    #[test]
    fn test_derived_metadata() {
        let root = Machine::root(5);
        let derived = Machine::from_transitions(&root.table(), 5);
        assert_eq!(derived, root);
    }

    #[test]
    fn test_display() {
        assert_eq!(Machine::root(5).to_string(), "1RB---");
        let mut table = [Transition::UNDEFINED; SLOTS];
        table[0] = Transition::new(1, 1, Direction::Right);
        table[2] = Transition::new(2, 0, Direction::Left);
        assert_eq!(
            Machine::from_transitions(&table, 5).to_string(),
            "1RB---_0LC---"
        );
    }

    #[test]
    fn test_parse_decimal() {
        let machine: Machine = "28329094430233769".parse().unwrap();
        assert_eq!(machine, Machine::root(5));
        assert!(Machine::parse("99999999999999999999999").is_err());
    }
}
