//! This module defines the `Enumerator`, which grows the tree of partial machines breadth
//! first. Each dequeued machine is simulated once and recorded once; when it halts on an
//! undefined transition, every admissible way of filling that transition becomes a child.

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::Write;

use crate::machine::{Machine, Transition};
use crate::prune::{prune_equivalent_states, prune_useless_states};
use crate::record::{Record, RecordWriter};
use crate::simulator::{Outcome, Simulation, Simulator};
use crate::types::{BeaverError, Direction, Limits, Slot, Status};

/// Totals of a finished (or partial) enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub visited: u64,
    pub halting: u64,
    pub non_halting: u64,
    pub undecided_space: u64,
    pub undecided_time: u64,
    /// Largest number of machines waiting in the queue at once.
    pub peak_queue: usize,
    /// Longest-running halting machine and its step count.
    pub longest_halt: Option<(Machine, u64)>,
}

impl Summary {
    fn count(&mut self, status: Status) {
        self.visited += 1;
        match status {
            Status::Halting => self.halting += 1,
            Status::NonHalting => self.non_halting += 1,
            Status::UndecidedSpace => self.undecided_space += 1,
            Status::UndecidedTime => self.undecided_time += 1,
        }
    }

    pub fn get(&self, status: Status) -> u64 {
        match status {
            Status::Halting => self.halting,
            Status::NonHalting => self.non_halting,
            Status::UndecidedSpace => self.undecided_space,
            Status::UndecidedTime => self.undecided_time,
        }
    }
}

/// Breadth-first search over partially defined machines.
pub struct Enumerator {
    simulator: Simulator,
    queue: VecDeque<Machine>,
    summary: Summary,
}

impl Enumerator {
    /// Creates an enumerator whose queue holds only the root for `limits.states` states.
    pub fn new(limits: Limits) -> Self {
        Self::from_machines(limits, [Machine::root(limits.states)])
    }

    /// Creates an enumerator starting from arbitrary machines instead of the root.
    pub fn from_machines(limits: Limits, machines: impl IntoIterator<Item = Machine>) -> Self {
        let queue: VecDeque<Machine> = machines.into_iter().collect();

        Self {
            simulator: Simulator::new(limits),
            summary: Summary {
                peak_queue: queue.len(),
                ..Summary::default()
            },
            queue,
        }
    }

    pub fn limits(&self) -> &Limits {
        self.simulator.limits()
    }

    /// Number of machines waiting to be visited.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Visits the machine at the front of the queue and enqueues its surviving children.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Record))` for the visited machine.
    /// * `Ok(None)` once the queue is empty.
    pub fn step(&mut self) -> Result<Option<Record>, BeaverError> {
        let Some(machine) = self.queue.pop_front() else {
            return Ok(None);
        };

        let simulation = self.simulator.simulate(machine)?;
        let record = Record::new(machine, simulation.status());
        trace!("{} {} ({:?})", machine, record.status.code(), simulation);

        self.summary.count(record.status);
        self.track_longest(machine, &simulation);

        if let Outcome::Halting(slot) = simulation.outcome {
            if machine.undefined_count() > 1 {
                let children = self.children(machine, slot);
                self.queue.extend(children);
                self.summary.peak_queue = self.summary.peak_queue.max(self.queue.len());
            }
        }

        Ok(Some(record))
    }

    /// Generates the admissible children of `machine` for the undefined `slot`.
    ///
    /// Candidates are produced in the order write symbol, direction, next state. A child may
    /// only target states up to its first undefined state, and is dropped when either
    /// pruning rule fires.
    pub fn children(&self, machine: Machine, slot: Slot) -> Vec<Machine> {
        let mut first_undefined = machine.first_undefined_state();
        if first_undefined == slot.state {
            first_undefined += 1;
        }
        let undefined = machine.undefined_count().saturating_sub(1);

        let states = self.limits().states;
        let mut children = Vec::new();
        for write in 0..=1 {
            for direction in Direction::ALL {
                for next in (0..states).filter(|&next| next <= first_undefined) {
                    let child = machine
                        .with_transition(slot, Transition::new(next, write, direction))
                        .with_metadata(undefined, first_undefined);

                    if !prune_equivalent_states(child, slot.state, states)
                        && !prune_useless_states(child, slot)
                    {
                        children.push(child);
                    }
                }
            }
        }

        children
    }

    /// Runs the search to completion, writing one line per visited machine and the final
    /// `done` line to `out`.
    pub fn run<W: Write>(&mut self, out: W) -> Result<Summary, BeaverError> {
        info!(
            "Enumerating {}-state machines from {} queued machine(s)",
            self.limits().states,
            self.queue.len()
        );

        let mut writer = RecordWriter::new(out);
        let mut depth = None;

        while let Some(machine) = self.queue.front().copied() {
            let level = machine.undefined_count();
            if depth != Some(level) {
                debug!(
                    "Entering level with {} undefined transitions: {} queued, {} visited",
                    level,
                    self.queue.len(),
                    self.summary.visited
                );
                depth = Some(level);
            }

            if let Some(record) = self.step()? {
                writer.write(&record)?;
            }
        }

        writer.finish()?;

        info!(
            "Visited {} machines: {} halting, {} non-halting, {} undecided (space), {} undecided (time)",
            self.summary.visited,
            self.summary.halting,
            self.summary.non_halting,
            self.summary.undecided_space,
            self.summary.undecided_time
        );
        if let Some((machine, steps)) = self.summary.longest_halt {
            info!("Longest halting machine: {} after {} steps", machine, steps);
        }

        Ok(self.summary.clone())
    }

    fn track_longest(&mut self, machine: Machine, simulation: &Simulation) {
        if simulation.status() != Status::Halting {
            return;
        }
        let longer = match self.summary.longest_halt {
            Some((_, steps)) => simulation.steps > steps,
            None => true,
        };
        if longer {
            self.summary.longest_halt = Some((machine, simulation.steps));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_root_is_visited_first() {
        let mut enumerator = Enumerator::new(Limits::BB5);
        let record = enumerator.step().unwrap().unwrap();

        assert_eq!(record.machine, Machine::root(5));
        assert_eq!(record.status, Status::Halting);
        assert!(enumerator.pending() > 0);
    }

    #[test]
    fn test_limits() {
        let enumerator = Enumerator::new(Limits::BB4);
        assert_eq!(*enumerator.limits(), Limits::BB4);
        assert_eq!(enumerator.pending(), 1);
    }

    #[test]
    fn test_root_children() {
        let enumerator = Enumerator::new(Limits::BB5);
        let root = Machine::root(5);
        let children = enumerator.children(root, Slot::new(1, 0));

        // Targets A, B or the fresh C, for each write and direction.
        assert_eq!(children.len(), 12);
        for child in &children {
            assert_eq!(child.undefined_count(), 8);
            assert_eq!(child.first_undefined_state(), 2);
            assert!(child.transition(Slot::new(1, 0)).next <= 2);
        }
        assert_eq!(
            children[0].transition(Slot::new(1, 0)),
            Transition::new(0, 0, Direction::Right)
        );
        assert_eq!(
            children[11].transition(Slot::new(1, 0)),
            Transition::new(2, 1, Direction::Left)
        );
    }

    #[test]
    fn test_children_skip_useless_states() {
        // A0 -> 1RB, B: 0LA 1LA. The machine halts on A1; any child entering B while moving
        // right is immediately sent back, so those children are pruned.
        let enumerator = Enumerator::new(Limits::BB5);
        let parent: Machine = "1RB---_0LA1LA_------".parse().unwrap();
        let slot = Slot::new(0, 1);

        let mut simulator = Simulator::new(Limits::BB5);
        assert_eq!(
            simulator.simulate(parent).unwrap().outcome,
            Outcome::Halting(slot)
        );

        let children = enumerator.children(parent, slot);
        assert_eq!(children.len(), 10);
        for child in &children {
            let filled = child.transition(slot);
            assert!(!(filled.next == 1 && filled.direction == Direction::Right));
        }
    }

    #[test]
    fn test_children_skip_equivalent_states() {
        // Filling B1 with 1LA or 1LB would make B a copy of A.
        let enumerator = Enumerator::new(Limits::BB5);
        let parent: Machine = "1RB1LB_1RA---_------".parse().unwrap();
        let slot = Slot::new(1, 1);

        let children = enumerator.children(parent, slot);
        let twin = Transition::new(0, 1, Direction::Left);
        let looping = Transition::new(1, 1, Direction::Left);
        assert!(children
            .iter()
            .all(|child| child.transition(slot) != twin && child.transition(slot) != looping));
        assert_eq!(children.len(), 10);
    }

    #[test]
    fn test_children_never_skip_fresh_states() {
        let enumerator = Enumerator::new(Limits::BB5);
        let parent: Machine = "1RB1LC_1RA1LA_------".parse().unwrap();
        assert_eq!(parent.first_undefined_state(), 2);
        let children = enumerator.children(parent, Slot::new(2, 0));

        // Filling C makes D available as a target.
        assert_eq!(children.len(), 16);
        assert!(children.iter().all(|c| c.first_undefined_state() == 3));
        assert!(children
            .iter()
            .any(|c| c.transition(Slot::new(2, 0)).next == 3));
    }

    #[test]
    fn test_breadth_first_invariants() {
        let mut enumerator = Enumerator::new(Limits::BB4);
        let mut seen = HashSet::new();
        let mut last_level = u8::MAX;

        for _ in 0..5_000 {
            let Some(record) = enumerator.step().unwrap() else {
                break;
            };
            let machine = record.machine;

            assert!(seen.insert(machine), "duplicate visit of {}", machine);
            assert!(machine.undefined_count() <= last_level);
            last_level = machine.undefined_count();

            if let Outcome::Halting(slot) = Simulator::new(Limits::BB4)
                .simulate(machine)
                .unwrap()
                .outcome
            {
                for child in enumerator.children(machine, slot) {
                    assert_eq!(child.undefined_count() + 1, machine.undefined_count());
                    assert!(child.first_undefined_state() >= machine.first_undefined_state());
                }
            }
        }
    }

    #[test]
    fn test_run_writes_log() {
        // A single machine that cannot halt anywhere it goes.
        let machine: Machine = "1RA1RA_------".parse().unwrap();
        let mut enumerator = Enumerator::from_machines(Limits::BB5, [machine]);

        let mut out = Vec::new();
        let summary = enumerator.run(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{} 1\ndone\n", machine.raw())
        );
        assert_eq!(summary.visited, 1);
        assert_eq!(summary.non_halting, 1);
        assert_eq!(summary.longest_halt, None);
    }

    #[test]
    fn test_summary_serialization() {
        let summary = Summary {
            visited: 2,
            halting: 1,
            non_halting: 1,
            peak_queue: 12,
            longest_halt: Some((Machine::root(5), 2)),
            ..Summary::default()
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("28329094430233769"));
        let back: Summary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
        assert_eq!(back.get(Status::Halting), 1);
    }
}
