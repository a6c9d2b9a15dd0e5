//! This module defines the line format of the enumeration log: one `<encoding> <status>` line
//! per visited machine, followed by a final `done` line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::machine::Machine;
use crate::types::{BeaverError, Status};

/// The last line of a complete log.
pub const DONE: &str = "done";

/// One visited machine and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub machine: Machine,
    pub status: Status,
}

impl Record {
    pub fn new(machine: Machine, status: Status) -> Self {
        Self { machine, status }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.machine.raw(), self.status.code())
    }
}

impl FromStr for Record {
    type Err = BeaverError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let invalid = || BeaverError::ValidationError(format!("Invalid log line: {:?}", line));

        let mut fields = line.split_whitespace();
        let (Some(machine), Some(status), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };

        let machine = machine.parse::<u64>().map_err(|_| invalid())?;
        let status = status
            .parse::<u8>()
            .ok()
            .and_then(Status::from_code)
            .ok_or_else(invalid)?;

        Ok(Record::new(Machine::from_raw(machine), status))
    }
}

/// Appends records to an output, one line each.
pub struct RecordWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, record: &Record) -> Result<(), BeaverError> {
        writeln!(self.out, "{}", record).map_err(write_error)?;
        self.written += 1;
        Ok(())
    }

    /// Writes the `done` sentinel and flushes, returning the underlying output.
    pub fn finish(mut self) -> Result<W, BeaverError> {
        writeln!(self.out, "{}", DONE).map_err(write_error)?;
        self.out.flush().map_err(write_error)?;
        Ok(self.out)
    }

    /// Number of records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

fn write_error(e: std::io::Error) -> BeaverError {
    BeaverError::FileError(format!("Failed to write log: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_line() {
        let record = Record::new(Machine::root(5), Status::Halting);
        assert_eq!(record.to_string(), "28329094430233769 0");
        assert_eq!("28329094430233769 0".parse::<Record>().unwrap(), record);
    }

    #[test]
    fn test_invalid_lines() {
        assert!("done".parse::<Record>().is_err());
        assert!("123".parse::<Record>().is_err());
        assert!("123 4".parse::<Record>().is_err());
        assert!("123 1 2".parse::<Record>().is_err());
        assert!("abc 1".parse::<Record>().is_err());
    }

    #[test]
    fn test_writer() {
        let mut writer = RecordWriter::new(Vec::new());
        writer
            .write(&Record::new(Machine::from_raw(42), Status::UndecidedTime))
            .unwrap();
        assert_eq!(writer.written(), 1);

        let out = writer.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "42 3\ndone\n");
    }
}
