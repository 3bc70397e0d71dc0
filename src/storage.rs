//! Growable word storage backing a compressed bitmap.

use alloc::vec::Vec;
use core::{iter, ops::Index};

use log::trace;

use crate::word::Word;

/// Capacity (in words) of a freshly created buffer.
pub(crate) const DEFAULT_BUFFER_SIZE: usize = 4;

/// Below this many words the buffer doubles on growth; above it grows by half.
const DOUBLING_LIMIT: usize = 32_768;

/// A growable array of words that is never empty.
///
/// A new buffer holds a single zero word, which is where the first
/// running-length word of a bitmap lives. Capacity is managed explicitly: it
/// doubles while the buffer is small and grows by half once it is large,
/// capped at the largest allocation a `Vec<W>` can describe.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer<W: Word> {
    words: Vec<W>,
}

impl<W: Word> Buffer<W> {
    /// Creates a buffer holding one zero word with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Creates a buffer holding one zero word with room for `words` words.
    #[must_use]
    pub fn with_capacity(words: usize) -> Self {
        let mut storage = Vec::with_capacity(words.max(1));
        storage.push(W::ZERO);
        Self { words: storage }
    }

    /// Wraps decoded words. The caller guarantees `words` is non-empty.
    pub(crate) fn from_words(words: Vec<W>) -> Self {
        debug_assert!(!words.is_empty());
        Self { words }
    }

    /// Number of words in use.
    #[inline(always)]
    #[must_use]
    pub fn size_in_words(&self) -> usize {
        self.words.len()
    }

    /// Number of words that fit without reallocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.words.capacity()
    }

    /// The word at `pos`.
    #[inline(always)]
    #[must_use]
    pub fn word(&self, pos: usize) -> W {
        self.words[pos]
    }

    /// The last word in use.
    #[inline]
    #[must_use]
    pub fn last_word(&self) -> W {
        self.words[self.words.len() - 1]
    }

    /// The words in use.
    #[inline(always)]
    #[must_use]
    pub fn as_slice(&self) -> &[W] {
        &self.words
    }

    #[inline(always)]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [W] {
        &mut self.words
    }

    #[inline]
    pub(crate) fn set_word(&mut self, pos: usize, word: W) {
        self.words[pos] = word;
    }

    #[inline]
    pub(crate) fn and_word(&mut self, pos: usize, mask: W) {
        self.words[pos] &= mask;
    }

    #[inline]
    pub(crate) fn or_word(&mut self, pos: usize, mask: W) {
        self.words[pos] |= mask;
    }

    #[inline]
    pub(crate) fn negate_word(&mut self, pos: usize) {
        self.words[pos] = !self.words[pos];
    }

    #[inline]
    pub(crate) fn and_last_word(&mut self, mask: W) {
        let last = self.words.len() - 1;
        self.and_word(last, mask);
    }

    #[inline]
    pub(crate) fn or_last_word(&mut self, mask: W) {
        let last = self.words.len() - 1;
        self.or_word(last, mask);
    }

    /// Appends one word.
    #[inline]
    pub fn push_back(&mut self, word: W) {
        self.reserve(1);
        self.words.push(word);
    }

    /// Appends a run of words.
    pub fn push_back_slice(&mut self, words: &[W]) {
        self.reserve(words.len());
        self.words.extend_from_slice(words);
    }

    /// Appends the complement of each word.
    pub fn push_back_negated(&mut self, words: &[W]) {
        self.reserve(words.len());
        self.words.extend(words.iter().map(|&w| !w));
    }

    /// Drops the last word. The first word is never removed.
    pub(crate) fn remove_last_word(&mut self) {
        debug_assert!(self.words.len() > 1);
        if self.words.len() > 1 {
            self.words.pop();
        }
    }

    /// Opens a gap of `count` zero words at `pos`, shifting the tail right.
    pub(crate) fn expand(&mut self, pos: usize, count: usize) {
        self.reserve(count);
        self.words.splice(pos..pos, iter::repeat_n(W::ZERO, count));
    }

    /// Removes `count` words starting at `pos`, shifting the tail left.
    pub(crate) fn collapse(&mut self, pos: usize, count: usize) {
        self.words.drain(pos..pos + count);
    }

    /// Resets to a single zero word, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.truncate(1);
        self.words[0] = W::ZERO;
    }

    /// Releases unused capacity.
    pub fn trim(&mut self) {
        self.words.shrink_to_fit();
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.words.len().saturating_add(additional);
        if needed <= self.words.capacity() {
            return;
        }
        let grown = if needed < DOUBLING_LIMIT {
            needed.saturating_mul(2)
        } else {
            needed.saturating_add(needed / 2)
        };
        let target = grown.min(max_words::<W>()).max(needed);
        trace!(
            "growing word buffer from {} to {} words",
            self.words.capacity(),
            target
        );
        self.words.reserve_exact(target - self.words.len());
    }
}

/// Largest word count a `Vec<W>` can hold.
fn max_words<W: Word>() -> usize {
    isize::MAX as usize / W::BYTES
}

impl<W: Word> Default for Buffer<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Word> Index<usize> for Buffer<W> {
    type Output = W;

    #[inline(always)]
    fn index(&self, pos: usize) -> &W {
        &self.words[pos]
    }
}

impl<W: Word> AsRef<[W]> for Buffer<W> {
    fn as_ref(&self) -> &[W] {
        &self.words
    }
}

impl<W: Word> core::fmt::Debug for Buffer<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.words.iter()).finish()
    }
}
