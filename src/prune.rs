//! This module provides the structural checks that drop redundant children before they are
//! simulated. Both checks only look at the table, never at a run of the machine.
//!
//! States that still have a halting transition are never pruned, since deeper levels of
//! the search may yet fill those transitions in.

use crate::machine::{Machine, Transition};
use crate::types::{Slot, SYMBOLS};

/// Returns true when `state` behaves exactly like some other fully defined state.
///
/// Transitions are compared on written symbol, direction and target. Before comparing,
/// targets naming either of the two states are relabelled to the smaller of the two, so
/// that a state looping on itself matches a state jumping to its twin. Only `state` is
/// checked against the others: every other state is unchanged since its parent passed.
///
/// # Arguments
///
/// * `machine` - The candidate child.
/// * `state` - The state whose transition was just filled.
/// * `states` - Number of states in the search.
pub fn prune_equivalent_states(machine: Machine, state: u8, states: u8) -> bool {
    if machine.has_halting(state) {
        return false;
    }

    let changed = transitions_of(machine, state);

    (0..states)
        .filter(|&other| other != state && !machine.has_halting(other))
        .any(|other| {
            let (low, high) = (state.min(other), state.max(other));
            let canonical = |t: Transition| Transition {
                next: if t.next == high { low } else { t.next },
                ..t
            };

            transitions_of(machine, other)
                .iter()
                .zip(changed.iter())
                .all(|(&a, &b)| canonical(a) == canonical(b))
        })
}

/// Returns true when the transition at `slot` leads into a state with no effect.
///
/// A target state has no effect when, for both symbols, it writes back the symbol it read,
/// moves opposite to the direction it was entered with, and continues into the same
/// non-halting state. Entering it just undoes the move, so the same machine with the
/// transition pointing straight at the continuation is already in the search tree.
pub fn prune_useless_states(machine: Machine, slot: Slot) -> bool {
    let entering = machine.transition(slot);
    let Some(target) = entering.next_state() else {
        return false;
    };

    let [on_zero, on_one] = transitions_of(machine, target);

    !on_zero.is_halt()
        && !on_one.is_halt()
        && on_zero.write == 0
        && on_one.write == 1
        && on_zero.direction == entering.direction.opposite()
        && on_one.direction == entering.direction.opposite()
        && on_zero.next == on_one.next
}

fn transitions_of(machine: Machine, state: u8) -> [Transition; SYMBOLS] {
    std::array::from_fn(|symbol| machine.transition(Slot::new(state, symbol as u8)))
}
