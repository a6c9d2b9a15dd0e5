//! This module converts packed machines into the bbchallenge seed database format and
//! computes the digest used to compare a finished enumeration against the published seed.
//!
//! A database row is 30 bytes: for each of the ten slots, the symbol to write, the
//! direction and the next state numbered from 1 (0 meaning halt).

use sha1::{Digest, Sha1};

use crate::machine::Machine;
use crate::record::Record;
use crate::types::{Slot, Status, HALT, SLOTS};

/// Size of one database row.
pub const ROW_BYTES: usize = 3 * SLOTS;
/// Size of the database header.
pub const HEADER_BYTES: usize = 30;
/// Digest of the undecided machines of the complete 5-state enumeration.
pub const BB5_SEED_DIGEST: &str = "e57063afefd900fa629cfefb40731fd083d90b5e";

/// Encodes a machine as a 30-byte database row.
pub fn encode(machine: Machine) -> [u8; ROW_BYTES] {
    let mut row = [0u8; ROW_BYTES];

    for (i, chunk) in row.chunks_exact_mut(3).enumerate() {
        let t = machine.transition(Slot::from_index(i));
        chunk[0] = t.write;
        chunk[1] = t.direction.bit() as u8;
        chunk[2] = (t.next + 1) % (HALT + 1);
    }

    row
}

/// Encodes the database header for the given counts of undecided machines.
pub fn encode_header(undecided_time: u32, undecided_space: u32) -> [u8; HEADER_BYTES] {
    let mut header = [0u8; HEADER_BYTES];

    header[0..4].copy_from_slice(&undecided_time.to_be_bytes());
    header[4..8].copy_from_slice(&undecided_space.to_be_bytes());
    header[8..12].copy_from_slice(&(undecided_time + undecided_space).to_be_bytes());
    header[12] = 1;

    header
}

/// The undecided machines of one or more logs, in database order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seed {
    pub undecided_time: Vec<[u8; ROW_BYTES]>,
    pub undecided_space: Vec<[u8; ROW_BYTES]>,
}

impl Seed {
    /// Collects the undecided machines of `records`, sorting each group by row bytes.
    pub fn collect<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut seed = Seed::default();

        for record in records {
            match record.status {
                Status::UndecidedTime => seed.undecided_time.push(encode(record.machine)),
                Status::UndecidedSpace => seed.undecided_space.push(encode(record.machine)),
                Status::Halting | Status::NonHalting => {}
            }
        }

        seed.undecided_time.sort_unstable();
        seed.undecided_space.sort_unstable();
        seed
    }

    /// Number of undecided machines.
    pub fn len(&self) -> usize {
        self.undecided_time.len() + self.undecided_space.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hex SHA-1 of the header, then the time rows, then the space rows.
    pub fn digest(&self) -> String {
        let mut hasher = Sha1::new();

        hasher.update(encode_header(
            self.undecided_time.len() as u32,
            self.undecided_space.len() as u32,
        ));
        for row in self.undecided_time.iter().chain(&self.undecided_space) {
            hasher.update(row);
        }

        format!("{:x}", hasher.finalize())
    }
}
