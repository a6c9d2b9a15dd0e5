//! This module provides the `LogLoader` struct, responsible for reading enumeration logs back
//! from files, strings and directories of `.txt` logs.

use crate::record::{Record, DONE};
use crate::types::{BeaverError, Status};
use std::fs;
use std::path::{Path, PathBuf};

/// The records of one enumeration log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Log {
    pub records: Vec<Record>,
    /// Whether the log ends with the `done` sentinel.
    pub complete: bool,
}

impl Log {
    /// Iterates over the records with the given status.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().filter(move |r| r.status == status)
    }
}

/// `LogLoader` is a utility struct for loading enumeration logs.
pub struct LogLoader;

impl LogLoader {
    /// Loads a single log from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Log)` if the file is read and every line is a record or the final `done`.
    /// * `Err(BeaverError::FileError)` if the file cannot be read.
    /// * `Err(BeaverError::ValidationError)` if a line is malformed.
    pub fn load_log(path: &Path) -> Result<Log, BeaverError> {
        let content = fs::read_to_string(path).map_err(|e| {
            BeaverError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_log_from_string(&content)
    }

    /// Loads a log from string content.
    ///
    /// A `done` line is only accepted as the last non-empty line.
    pub fn load_log_from_string(content: &str) -> Result<Log, BeaverError> {
        let mut log = Log::default();

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if log.complete {
                return Err(BeaverError::ValidationError(format!(
                    "Unexpected line after {}: {:?}",
                    DONE, line
                )));
            }

            if line == DONE {
                log.complete = true;
            } else {
                log.records.push(line.parse()?);
            }
        }

        Ok(log)
    }

    /// Loads all logs (`.txt` extension) from a given directory.
    ///
    /// Directories and other files are skipped. Each element of the result is either the
    /// path and its log, or the error raised while loading that file.
    pub fn load_logs(directory: &Path) -> Vec<Result<(PathBuf, Log), BeaverError>> {
        if !directory.exists() {
            return vec![Err(BeaverError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(BeaverError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .map(|path| Self::load_log(&path).map(|log| (path, log)))
            .collect()
    }
}
