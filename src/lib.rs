//! This crate enumerates small two-symbol Turing machines for the Busy Beaver problem.
//! It includes modules for the packed machine encoding, a bounded bit tape, the simulator,
//! the structural pruning rules and the breadth-first enumerator, as well as reading logs
//! back and comparing them against the published seed database.

pub mod encoder;
pub mod enumerator;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod prune;
pub mod record;
pub mod simulator;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the seed database helpers from the encoder module.
pub use encoder::{encode, Seed, BB5_SEED_DIGEST};
/// Re-exports the `Enumerator` and its `Summary`.
pub use enumerator::{Enumerator, Summary};
/// Re-exports the `LogLoader` struct from the loader module.
pub use loader::{Log, LogLoader};
/// Re-exports the packed `Machine` and its `Transition`.
pub use machine::{Machine, Transition};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Champion`, `ChampionManager`, and `CHAMPIONS` from the programs module.
pub use programs::{Champion, ChampionManager, CHAMPIONS};
/// Re-exports the pruning rules.
pub use prune::{prune_equivalent_states, prune_useless_states};
/// Re-exports the log line format.
pub use record::{Record, RecordWriter, DONE};
/// Re-exports the `Simulator` and its results.
pub use simulator::{Outcome, Simulation, Simulator};
/// Re-exports the `Tape` struct.
pub use tape::Tape;
/// Re-exports the shared vocabulary from the types module.
pub use types::{BeaverError, Direction, Limits, Slot, Status, HALT, MAX_STATES};
