//! This module defines the bit tape used by the simulator. Cells are packed into 64-bit
//! words, addressed by a signed offset from a fixed origin in the middle of the buffer.
//!
//! The buffer is allocated once and reused between simulations. Instead of zeroing the
//! whole buffer on every reset, the tape tracks the range of words touched since the last
//! reset; words outside that range read as zero and are cleared when first written.

use crate::types::BeaverError;

const WORD_BITS: usize = u64::BITS as usize;

/// A bounded, lazily cleared binary tape.
#[derive(Debug, Clone)]
pub struct Tape {
    words: Vec<u64>,
    origin: usize,
    radius: u64,
    // Inclusive range of words cleared since the last reset.
    low: usize,
    high: usize,
}

impl Tape {
    /// Creates a tape able to hold every cell within `radius` of the origin.
    pub fn new(radius: u64) -> Self {
        let origin = radius as usize;
        let word_count = (2 * origin + 1) / WORD_BITS + 1;
        let word = origin / WORD_BITS;

        Self {
            words: vec![0; word_count],
            origin,
            radius,
            low: word,
            high: word,
        }
    }

    /// Largest distance from the origin that may be addressed.
    pub fn radius(&self) -> u64 {
        self.radius
    }

    /// Number of words backing the tape.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Makes the tape read as all zeros again, clearing only the origin word.
    pub fn reset(&mut self) {
        let word = self.origin / WORD_BITS;
        self.words[word] = 0;
        self.low = word;
        self.high = word;
    }

    /// Returns the bit stored at `position`. Cells never written since the last reset,
    /// including cells outside the buffer, read as 0.
    pub fn read(&self, position: i64) -> u8 {
        match self.locate(position) {
            Some((word, bit)) if (self.low..=self.high).contains(&word) => {
                ((self.words[word] >> bit) & 1) as u8
            }
            _ => 0,
        }
    }

    /// Stores `value` at `position`.
    ///
    /// # Returns
    ///
    /// * `Err(BeaverError::TapeBoundary)` if `position` lies outside the buffer.
    pub fn write(&mut self, position: i64, value: u8) -> Result<(), BeaverError> {
        let (word, bit) = self
            .locate(position)
            .ok_or(BeaverError::TapeBoundary(position))?;

        self.touch(word);
        self.words[word] = self.words[word] & !(1 << bit) | ((value & 1) as u64) << bit;
        Ok(())
    }

    /// Converts a signed position into a word index and bit offset.
    fn locate(&self, position: i64) -> Option<(usize, usize)> {
        if position.unsigned_abs() > self.radius {
            return None;
        }
        let index = (self.origin as i64 + position) as usize;
        Some((index / WORD_BITS, index % WORD_BITS))
    }

    /// Extends the cleared range to include `word`.
    fn touch(&mut self, word: usize) {
        while word < self.low {
            self.low -= 1;
            self.words[self.low] = 0;
        }
        while word > self.high {
            self.high += 1;
            self.words[self.high] = 0;
        }
    }
}
