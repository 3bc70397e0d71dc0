//! Block-level traversal of a compressed word array.

use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::{rlw, word::Word};

/// One running-length word together with the literal words it owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block<'a, W: Word> {
    /// Index of the RLW in the word array.
    pub position: usize,
    /// Bit value of the run.
    pub running_bit: bool,
    /// Number of words in the run.
    pub running_length: usize,
    /// The literal words that follow the RLW.
    pub literals: &'a [W],
}

impl<W: Word> Block<'_, W> {
    /// Number of literal words.
    #[inline]
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    /// Number of uncompressed words the block stands for.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.running_length + self.literals.len()
    }
}

/// Walks the RLW chain of a word array, yielding one [`Block`] per RLW.
///
/// Literal counts are trusted; a count that would run past the end of the
/// array is clipped to the words that are actually there.
#[derive(Clone, Debug)]
pub struct EwahIterator<'a, W: Word> {
    words: &'a [W],
    pointer: usize,
}

impl<'a, W: Word> EwahIterator<'a, W> {
    /// Starts at the first word of `words`.
    #[must_use]
    pub fn new(words: &'a [W]) -> Self {
        Self { words, pointer: 0 }
    }

    /// Index of the next RLW to be decoded.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pointer
    }

    /// Whether another block remains.
    #[inline]
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.pointer < self.words.len()
    }
}

impl<'a, W: Word> Iterator for EwahIterator<'a, W> {
    type Item = Block<'a, W>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        let position = self.pointer;
        let literal_count = rlw::literal_count(self.words, position);
        let start = position + 1;
        let end = start.saturating_add(literal_count).min(self.words.len());
        self.pointer = start.saturating_add(literal_count);
        Some(Block {
            position,
            running_bit: rlw::running_bit(self.words, position),
            running_length: rlw::running_length(self.words, position),
            literals: &self.words[start..end],
        })
    }
}

impl<W: Word> FusedIterator for EwahIterator<'_, W> {}

/// Yields the blocks of a word array from last to first.
///
/// The chain can only be decoded front to back, so construction records every
/// block up front.
#[derive(Clone, Debug)]
pub struct ReverseEwahIterator<'a, W: Word> {
    blocks: Vec<Block<'a, W>>,
}

impl<'a, W: Word> ReverseEwahIterator<'a, W> {
    /// Decodes the chain of `words` and positions at its last block.
    #[must_use]
    pub fn new(words: &'a [W]) -> Self {
        Self {
            blocks: EwahIterator::new(words).collect(),
        }
    }

    /// Total number of uncompressed words in the blocks not yet yielded.
    #[must_use]
    pub fn remaining_words(&self) -> usize {
        self.blocks.iter().map(Block::size).sum()
    }
}

impl<'a, W: Word> Iterator for ReverseEwahIterator<'a, W> {
    type Item = Block<'a, W>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.blocks.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.blocks.len(), Some(self.blocks.len()))
    }
}

impl<W: Word> ExactSizeIterator for ReverseEwahIterator<'_, W> {}

impl<W: Word> FusedIterator for ReverseEwahIterator<'_, W> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> [u32; 5] {
        [
            rlw::encode(true, 3, 2),
            0xAAAA,
            0x5555,
            rlw::encode(false, 10, 1),
            0x1,
        ]
    }

    #[test]
    fn test_forward_blocks() {
        let words = chain();
        let blocks: Vec<_> = EwahIterator::new(&words).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].position, 0);
        assert!(blocks[0].running_bit);
        assert_eq!(blocks[0].running_length, 3);
        assert_eq!(blocks[0].literals, &[0xAAAA, 0x5555]);
        assert_eq!(blocks[1].position, 3);
        assert_eq!(blocks[1].size(), 11);
    }

    #[test]
    fn test_reverse_blocks() {
        let words = chain();
        let mut rev = ReverseEwahIterator::new(&words);
        assert_eq!(rev.remaining_words(), 16);
        assert_eq!(rev.next().map(|b| b.position), Some(3));
        assert_eq!(rev.remaining_words(), 5);
        assert_eq!(rev.next().map(|b| b.position), Some(0));
        assert_eq!(rev.next(), None);
    }

    #[test]
    fn test_overlong_literal_count_is_clipped() {
        let words = [rlw::encode::<u64>(false, 0, 5), 7];
        let block = EwahIterator::new(&words).next();
        assert_eq!(block.map(|b| b.literals.len()), Some(1));
    }
}
