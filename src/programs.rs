//! Known busy beaver champions, parsed once on first use.

use crate::machine::Machine;
use crate::types::{BeaverError, Slot};

// Champion texts with their state counts and step counts (halting transition included).
const CHAMPION_TEXTS: [(&str, u8, &str, u64); 4] = [
    ("bb2", 2, "1RB1LB_1LA1RZ", 6),
    ("bb3", 3, "1RB1RZ_1LB0RC_1LC1LA", 21),
    ("bb4", 4, "1RB1LB_1LA0LC_1RZ1LD_1RD0RA", 107),
    ("bb5", 5, "1RB1LC_1RC1RB_1RD0LE_1LA1LD_1RZ0LA", 47_176_870),
];

/// A machine known to run longest among halting machines of its size.
#[derive(Debug, Clone, PartialEq)]
pub struct Champion {
    pub name: &'static str,
    pub states: u8,
    pub machine: Machine,
    pub steps: u64,
}

impl Champion {
    /// The slot whose transition halts the champion.
    pub fn halting_slot(&self) -> Option<Slot> {
        (0..2 * self.states as usize)
            .map(Slot::from_index)
            .find(|&slot| self.machine.transition(slot).is_halt())
    }
}

lazy_static::lazy_static! {
    pub static ref CHAMPIONS: Vec<Champion> = CHAMPION_TEXTS
        .iter()
        .filter_map(|&(name, states, text, steps)| match Machine::parse(text) {
            Ok(machine) => Some(Champion { name, states, machine, steps }),
            Err(e) => {
                log::warn!("Failed to parse champion {}: {}", name, e);
                None
            }
        })
        .collect();
}

pub struct ChampionManager;

impl ChampionManager {
    /// Get the number of available champions
    pub fn get_champion_count() -> usize {
        CHAMPIONS.len()
    }

    /// Get a champion by its name, e.g. `bb4`
    pub fn get_champion_by_name(name: &str) -> Result<&'static Champion, BeaverError> {
        CHAMPIONS
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| BeaverError::ValidationError(format!("Champion '{}' not found", name)))
    }

    /// Get the champion for a state count
    pub fn get_champion_for_states(states: u8) -> Result<&'static Champion, BeaverError> {
        CHAMPIONS
            .iter()
            .find(|c| c.states == states)
            .ok_or_else(|| {
                BeaverError::ValidationError(format!("No champion known for {} states", states))
            })
    }
}
