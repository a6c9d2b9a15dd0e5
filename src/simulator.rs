//! This module defines the `Simulator`, which runs one packed machine from a blank tape until
//! it halts, is shown to be a non-halting small machine, or exceeds its time or space bound.

use serde::{Deserialize, Serialize};

use crate::machine::Machine;
use crate::tape::Tape;
use crate::types::{BeaverError, Limits, Slot, Status, SMALL_MACHINE_STATES};

/// How a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Reached the undefined transition at the given slot.
    Halting(Slot),
    NonHalting,
    UndecidedSpace,
    UndecidedTime,
}

impl Outcome {
    pub fn status(self) -> Status {
        match self {
            Outcome::Halting(_) => Status::Halting,
            Outcome::NonHalting => Status::NonHalting,
            Outcome::UndecidedSpace => Status::UndecidedSpace,
            Outcome::UndecidedTime => Status::UndecidedTime,
        }
    }

    /// The slot that caused the halt, if any.
    pub fn halting_slot(self) -> Option<Slot> {
        match self {
            Outcome::Halting(slot) => Some(slot),
            _ => None,
        }
    }
}

/// Result of one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    pub outcome: Outcome,
    /// Transitions executed, counting the halting one.
    pub steps: u64,
    /// Number of distinct cells the head visited.
    pub span: u64,
}

impl Simulation {
    pub fn status(&self) -> Status {
        self.outcome.status()
    }
}

/// Runs machines against a reusable tape.
///
/// The tape buffer is sized for `limits.max_space` and shared by every call to
/// [`Simulator::simulate`], which must therefore run one at a time.
pub struct Simulator {
    limits: Limits,
    tape: Tape,
}

impl Simulator {
    /// Creates a new `Simulator` with a tape large enough for the given limits.
    pub fn new(limits: Limits) -> Self {
        Self {
            tape: Tape::new(limits.max_space),
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Simulates `machine` from state A on a blank tape.
    ///
    /// The small-machine bounds apply while `machine.first_undefined_state()` is at most
    /// [`SMALL_MACHINE_STATES`], i.e. the machine has introduced no more than four states.
    pub fn simulate(&mut self, machine: Machine) -> Result<Simulation, BeaverError> {
        let limits = self.limits;
        let small = machine.first_undefined_state() <= SMALL_MACHINE_STATES;

        self.tape.reset();
        let mut position: i64 = 0;
        let (mut leftmost, mut rightmost) = (0i64, 0i64);
        let mut state = 0u8;

        let finish = |outcome, steps, leftmost: i64, rightmost: i64| Simulation {
            outcome,
            steps,
            span: (rightmost - leftmost + 1) as u64,
        };

        for step in 0..limits.max_time {
            let symbol = self.tape.read(position);
            let slot = Slot::new(state, symbol);
            let transition = machine.transition(slot);

            let Some(next) = transition.next_state() else {
                return Ok(finish(Outcome::Halting(slot), step + 1, leftmost, rightmost));
            };

            self.tape.write(position, transition.write)?;
            position += transition.direction.delta();
            state = next;

            leftmost = leftmost.min(position);
            rightmost = rightmost.max(position);
            let span = (rightmost - leftmost + 1) as u64;

            if small && (span > limits.small_space || step + 1 > limits.small_time) {
                return Ok(finish(Outcome::NonHalting, step + 1, leftmost, rightmost));
            }

            if span > limits.max_space {
                return Ok(finish(Outcome::UndecidedSpace, step + 1, leftmost, rightmost));
            }
        }

        Ok(finish(
            Outcome::UndecidedTime,
            limits.max_time,
            leftmost,
            rightmost,
        ))
    }
}
