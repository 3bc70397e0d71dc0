//! Output targets for the streaming operations.
//!
//! Every merge and threshold engine writes its result through
//! [`BitmapStorage`]. An [`EwahBitmap`](crate::EwahBitmap) materializes the
//! stream; [`BitCounter`] only counts set bits; [`NonEmptyDetector`] stops the
//! computation at the first set bit.

use crate::word::Word;

/// Early-exit signal raised by a sink that has seen enough.
///
/// Engines propagate it with `?` and stop writing. The sink records its own
/// outcome, so callers inspect the sink rather than the error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Halt;

/// Result of a single sink write.
pub type StorageResult = Result<(), Halt>;

/// A consumer of an uncompressed word stream.
///
/// Words arrive in order, either one at a time or as homogeneous runs.
pub trait BitmapStorage<W: Word> {
    /// Appends one word, compressing it if it is all zeros or all ones.
    fn add_word(&mut self, word: W) -> StorageResult;

    /// Appends one word verbatim as a literal.
    fn add_literal_word(&mut self, word: W) -> StorageResult;

    /// Appends `count` words that are all `bit`.
    fn add_stream_of_empty_words(&mut self, bit: bool, count: usize) -> StorageResult;

    /// Appends literal words verbatim.
    fn add_stream_of_literal_words(&mut self, words: &[W]) -> StorageResult {
        words.iter().try_for_each(|&w| self.add_literal_word(w))
    }

    /// Appends the complement of each word as a literal.
    fn add_stream_of_negated_literal_words(&mut self, words: &[W]) -> StorageResult {
        words.iter().try_for_each(|&w| self.add_literal_word(!w))
    }

    /// Forgets everything written so far.
    fn clear(&mut self);

    /// Sets the logical size of the stream, which must end inside the last
    /// word written.
    fn set_size_in_bits_within_last_word(&mut self, bits: usize);
}

/// A sink that counts set bits and discards the words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitCounter {
    ones: usize,
}

impl BitCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { ones: 0 }
    }

    /// Number of set bits seen.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.ones
    }
}

impl<W: Word> BitmapStorage<W> for BitCounter {
    #[inline]
    fn add_word(&mut self, word: W) -> StorageResult {
        self.ones += word.count_ones() as usize;
        Ok(())
    }

    #[inline]
    fn add_literal_word(&mut self, word: W) -> StorageResult {
        self.ones += word.count_ones() as usize;
        Ok(())
    }

    fn add_stream_of_empty_words(&mut self, bit: bool, count: usize) -> StorageResult {
        if bit {
            self.ones += count * W::BITS as usize;
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.ones = 0;
    }

    fn set_size_in_bits_within_last_word(&mut self, _bits: usize) {}
}

/// A sink that only answers whether any bit was set, halting on the first one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NonEmptyDetector {
    non_empty: bool,
}

impl NonEmptyDetector {
    /// Creates a detector that has seen nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self { non_empty: false }
    }

    /// Whether a set bit was written.
    #[must_use]
    pub const fn is_non_empty(&self) -> bool {
        self.non_empty
    }

    #[inline]
    fn check<W: Word>(&mut self, word: W) -> StorageResult {
        if word == W::ZERO {
            Ok(())
        } else {
            self.non_empty = true;
            Err(Halt)
        }
    }
}

impl<W: Word> BitmapStorage<W> for NonEmptyDetector {
    fn add_word(&mut self, word: W) -> StorageResult {
        self.check(word)
    }

    fn add_literal_word(&mut self, word: W) -> StorageResult {
        self.check(word)
    }

    fn add_stream_of_empty_words(&mut self, bit: bool, count: usize) -> StorageResult {
        if bit && count > 0 {
            self.non_empty = true;
            return Err(Halt);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.non_empty = false;
    }

    fn set_size_in_bits_within_last_word(&mut self, _bits: usize) {}
}
