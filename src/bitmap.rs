//! `EwahBitmap` struct, the append path and whole-bitmap queries.

use core::mem;

use log::trace;

use crate::{
    buffered::IteratingRlw,
    cursor::{EwahIterator, ReverseEwahIterator},
    error::{Error, Result},
    macros::words_for,
    rlw,
    sink::{BitmapStorage, StorageResult},
    storage::{Buffer, DEFAULT_BUFFER_SIZE},
    word::Word,
};

/// A bitmap compressed with the Enhanced Word-Aligned Hybrid (EWAH) scheme.
///
/// # Overview
///
/// The bitmap is a sequence of words. Words that are all zeros or all ones
/// are stored as runs; every other word is stored verbatim as a literal. The
/// stored array is a chain of running-length words (RLWs), each followed by
/// the literal words it owns:
///
/// ```text
/// [RLW][literal]...[literal][RLW][literal]...
/// ```
///
/// Each RLW describes a run of identical words followed by its literals. The
/// bitmap also tracks its logical size in bits; bits at or beyond that size
/// read as zero and are kept zero in storage.
///
/// # Construction
///
/// Bits can be set in any order. Setting a bit past the end is amortized
/// O(1); setting a bit inside the bitmap splices the word array in place.
///
/// # Examples
///
/// ```
/// use ewah_bitmap::EwahBitmap64;
///
/// let mut bitmap = EwahBitmap64::new();
/// bitmap.set(3).unwrap();
/// bitmap.set(1_000_000).unwrap();
///
/// assert!(bitmap.get(3));
/// assert!(!bitmap.get(4));
/// assert_eq!(bitmap.cardinality(), 2);
/// assert_eq!(bitmap.size_in_bits(), 1_000_001);
/// // a long zero gap costs a single word
/// assert!(bitmap.size_in_words() < 8);
/// ```
#[derive(Clone)]
pub struct EwahBitmap<W: Word = u64> {
    pub(crate) buffer: Buffer<W>,
    /// Index of the last RLW, where appends land.
    pub(crate) rlw: usize,
    pub(crate) size_in_bits: usize,
}

/// A bitmap compressed over 32-bit words.
pub type EwahBitmap32 = EwahBitmap<u32>;

/// A bitmap compressed over 64-bit words.
pub type EwahBitmap64 = EwahBitmap<u64>;

impl<W: Word> EwahBitmap<W> {
    /// Largest bit index that [`set`](Self::set) accepts.
    ///
    /// The serialized layout stores the size in bits as a signed 32-bit
    /// integer, and one word of headroom is kept below that limit.
    pub const MAX_BIT_INDEX: usize = i32::MAX as usize - W::BITS as usize;

    /// Creates an empty bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let bitmap = EwahBitmap32::new();
    /// assert!(bitmap.is_empty());
    /// assert_eq!(bitmap.size_in_bits(), 0);
    /// assert_eq!(bitmap.size_in_words(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Creates an empty bitmap with room for `words` stored words.
    #[must_use]
    pub fn with_capacity(words: usize) -> Self {
        Self {
            buffer: Buffer::with_capacity(words),
            rlw: 0,
            size_in_bits: 0,
        }
    }

    pub(crate) fn from_parts(buffer: Buffer<W>, rlw: usize, size_in_bits: usize) -> Self {
        Self {
            buffer,
            rlw,
            size_in_bits,
        }
    }

    /// Builds a bitmap with the given bits set. Positions may come in any
    /// order and may repeat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if a position exceeds
    /// [`MAX_BIT_INDEX`](Self::MAX_BIT_INDEX).
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap64;
    /// let bitmap = EwahBitmap64::bitmap_of(&[64, 0, 2]).unwrap();
    /// assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![0, 2, 64]);
    /// ```
    pub fn bitmap_of(positions: &[usize]) -> Result<Self> {
        let mut bitmap = Self::new();
        for &pos in positions {
            bitmap.set(pos)?;
        }
        Ok(bitmap)
    }

    /// Logical size in bits: one past the highest position ever set, or the
    /// size given to the last explicit resize.
    #[inline]
    #[must_use]
    pub fn size_in_bits(&self) -> usize {
        self.size_in_bits
    }

    /// Number of stored (compressed) words.
    #[inline]
    #[must_use]
    pub fn size_in_words(&self) -> usize {
        self.buffer.size_in_words()
    }

    /// Memory taken by the stored words.
    #[inline]
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.buffer.size_in_words() * W::BYTES
    }

    /// Length of the binary serialization produced by
    /// [`to_be_bytes`](Self::to_be_bytes).
    #[inline]
    #[must_use]
    pub fn serialized_size_in_bytes(&self) -> usize {
        self.size_in_bytes() + 3 * 4
    }

    /// The stored words.
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[W] {
        self.buffer.as_slice()
    }

    /// The underlying word buffer.
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &Buffer<W> {
        &self.buffer
    }

    /// Index of the RLW that receives appended words.
    #[inline]
    #[must_use]
    pub fn rlw_position(&self) -> usize {
        self.rlw
    }

    /// Walks the stored blocks front to back.
    #[must_use]
    pub fn ewah_iter(&self) -> EwahIterator<'_, W> {
        EwahIterator::new(self.buffer.as_slice())
    }

    /// Walks the stored blocks back to front.
    #[must_use]
    pub fn reverse_ewah_iter(&self) -> ReverseEwahIterator<'_, W> {
        ReverseEwahIterator::new(self.buffer.as_slice())
    }

    /// A consumable cursor over the uncompressed words.
    #[must_use]
    pub fn iterating_rlw(&self) -> IteratingRlw<'_, W> {
        IteratingRlw::new(self.buffer.as_slice())
    }

    /// Number of set bits.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let mut bitmap = EwahBitmap32::new();
    /// bitmap.set_size_in_bits(100, true);
    /// bitmap.set(200).unwrap();
    /// assert_eq!(bitmap.cardinality(), 101);
    /// ```
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.ewah_iter()
            .map(|block| {
                let run = if block.running_bit {
                    block.running_length * W::BITS as usize
                } else {
                    0
                };
                run + block
                    .literals
                    .iter()
                    .map(|w| w.count_ones() as usize)
                    .sum::<usize>()
            })
            .sum()
    }

    /// Whether no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ewah_iter().all(|block| {
            !(block.running_bit && block.running_length > 0)
                && block.literals.iter().all(|&w| w == W::ZERO)
        })
    }

    /// Position of the lowest set bit.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap64;
    /// let bitmap = EwahBitmap64::bitmap_of(&[700, 130]).unwrap();
    /// assert_eq!(bitmap.first_set_bit(), Some(130));
    /// assert_eq!(EwahBitmap64::new().first_set_bit(), None);
    /// ```
    #[must_use]
    pub fn first_set_bit(&self) -> Option<usize> {
        let bits = W::BITS as usize;
        let mut offset = 0;
        for block in self.ewah_iter() {
            if block.running_bit && block.running_length > 0 {
                return Some(offset);
            }
            offset += block.running_length * bits;
            for &word in block.literals {
                if word != W::ZERO {
                    return Some(offset + word.trailing_zeros() as usize);
                }
                offset += bits;
            }
        }
        None
    }

    /// Exchanges the contents of two bitmaps without copying words.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Releases unused buffer capacity.
    pub fn trim(&mut self) {
        self.buffer.trim();
    }

    /// Resets to an empty bitmap, keeping the allocation.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.rlw = 0;
        self.size_in_bits = 0;
    }

    /// Complements every bit below [`size_in_bits`](Self::size_in_bits) in
    /// place. Bits at or beyond the size stay zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let mut bitmap = EwahBitmap32::bitmap_of(&[1, 3]).unwrap();
    /// bitmap.negate();
    /// assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![0, 2]);
    /// ```
    pub fn negate(&mut self) {
        if self.size_in_bits == 0 {
            return;
        }
        let mut pos = 0;
        while pos < self.buffer.size_in_words() {
            let words = self.buffer.as_mut_slice();
            let bit = rlw::running_bit(words, pos);
            rlw::set_running_bit(words, pos, !bit);
            let literal_count = rlw::literal_count(words, pos);
            for literal in pos + 1..=pos + literal_count {
                self.buffer.negate_word(literal);
            }
            pos += 1 + literal_count;
        }
        self.clear_tail();
    }

    /// Sets the size in bits to `size`, which must end inside the last stored
    /// word. Bits past the new size are cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeOutsideLastWord`] if `size` needs a different
    /// number of words than the current size.
    pub fn set_size_in_bits_within_last_word(&mut self, size: usize) -> Result<()> {
        if words_for!(W, size) != words_for!(W, self.size_in_bits) {
            return Err(Error::SizeOutsideLastWord {
                current: self.size_in_bits,
                requested: size,
            });
        }
        self.resize_within_last_word(size);
        Ok(())
    }

    pub(crate) fn resize_within_last_word(&mut self, size: usize) {
        debug_assert_eq!(words_for!(W, size), words_for!(W, self.size_in_bits));
        self.size_in_bits = size;
        self.clear_tail();
    }

    /// Grows the bitmap to `size` bits, filling the new positions with
    /// `default`. Returns `false` and does nothing if `size` is not larger
    /// than the current size.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap64;
    /// let mut bitmap = EwahBitmap64::bitmap_of(&[1]).unwrap();
    /// assert!(bitmap.set_size_in_bits(200, true));
    /// assert_eq!(bitmap.cardinality(), 1 + 198);
    /// assert!(!bitmap.set_size_in_bits(100, false));
    /// ```
    pub fn set_size_in_bits(&mut self, size: usize, default: bool) -> bool {
        if size <= self.size_in_bits {
            return false;
        }
        let bits = W::BITS as usize;

        let used = self.size_in_bits % bits;
        if used != 0 {
            let take = (bits - used).min(size - self.size_in_bits);
            if default {
                let mask = W::low_mask((used + take) as u32) & !W::low_mask(used as u32);
                self.or_into_last_word(mask);
            }
            self.size_in_bits += take;
        }

        if self.size_in_bits < size {
            let remaining = size - self.size_in_bits;
            self.add_stream_of_empty_words(default, remaining / bits);
            let partial = remaining % bits;
            if partial > 0 {
                if default {
                    self.insert_literal_word(W::low_mask(partial as u32));
                } else {
                    self.insert_empty_word(false);
                }
                self.size_in_bits += partial;
            }
        }
        true
    }

    /// Appends one full word, compressing it if it is all zeros or all ones.
    pub fn add_word(&mut self, word: W) {
        self.size_in_bits += W::BITS as usize;
        self.insert_word(word);
    }

    /// Appends a word of which only the low `bits` bits belong to the bitmap.
    /// Higher bits of `word` are ignored.
    ///
    /// The bitmap must end on a word boundary. With `bits < W::BITS` the
    /// appended word becomes a partial last word; grow the bitmap further with
    /// [`set_size_in_bits`](Self::set_size_in_bits) or [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWordAppend`] if `bits` is zero or exceeds the
    /// word width, or if the bitmap ends inside a word.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let mut bitmap = EwahBitmap32::new();
    /// bitmap.add_word(u32::MAX);
    /// bitmap.add_word_with_bits(0b1111_0101, 4).unwrap();
    /// assert_eq!(bitmap.size_in_bits(), 36);
    /// assert_eq!(bitmap.cardinality(), 34);
    /// assert!(bitmap.add_word_with_bits(1, 1).is_err());
    /// ```
    pub fn add_word_with_bits(&mut self, word: W, bits: usize) -> Result<()> {
        if bits == 0 || bits > W::BITS as usize || self.size_in_bits % W::BITS as usize != 0 {
            return Err(Error::InvalidWordAppend {
                bits,
                size_in_bits: self.size_in_bits,
            });
        }
        self.size_in_bits += bits;
        self.insert_word(word & W::low_mask(bits as u32));
        Ok(())
    }

    fn insert_word(&mut self, word: W) {
        if word == W::ZERO {
            self.insert_empty_word(false);
        } else if word == W::ONES {
            self.insert_empty_word(true);
        } else {
            self.insert_literal_word(word);
        }
    }

    /// Appends one full word as a literal.
    pub fn add_literal_word(&mut self, word: W) {
        self.size_in_bits += W::BITS as usize;
        self.insert_literal_word(word);
    }

    /// Appends literal words verbatim.
    pub fn add_stream_of_literal_words(&mut self, words: &[W]) {
        self.push_literals(words, false);
    }

    /// Appends the complement of each word as a literal.
    pub fn add_stream_of_negated_literal_words(&mut self, words: &[W]) {
        self.push_literals(words, true);
    }

    /// Appends `count` words that are all `bit`.
    pub fn add_stream_of_empty_words(&mut self, bit: bool, count: usize) {
        if count == 0 {
            return;
        }
        self.size_in_bits += count * W::BITS as usize;
        self.fast_add_stream_of_empty_words(bit, count);
    }

    fn push_literals(&mut self, mut words: &[W], negate: bool) {
        while !words.is_empty() {
            let literal_count = rlw::literal_count(self.buffer.as_slice(), self.rlw);
            let take = words.len().min(W::LARGEST_LITERAL_COUNT - literal_count);
            let (head, tail) = words.split_at(take);
            rlw::set_literal_count(self.buffer.as_mut_slice(), self.rlw, literal_count + take);
            if negate {
                self.buffer.push_back_negated(head);
            } else {
                self.buffer.push_back_slice(head);
            }
            self.size_in_bits += take * W::BITS as usize;
            words = tail;
            if !words.is_empty() {
                self.push_marker();
            }
        }
    }

    /// Appends a zero RLW and makes it the write cursor.
    fn push_marker(&mut self) {
        self.buffer.push_back(W::ZERO);
        self.rlw = self.buffer.size_in_words() - 1;
    }

    pub(crate) fn insert_empty_word(&mut self, bit: bool) {
        let words = self.buffer.as_mut_slice();
        let no_literal = rlw::literal_count(words, self.rlw) == 0;
        let run = rlw::running_length(words, self.rlw);
        if no_literal && run == 0 {
            rlw::set_running_bit(words, self.rlw, bit);
        }
        if no_literal
            && rlw::running_bit(words, self.rlw) == bit
            && run < W::LARGEST_RUNNING_LENGTH_COUNT
        {
            rlw::set_running_length(words, self.rlw, run + 1);
            return;
        }
        self.push_marker();
        rlw::set(self.buffer.as_mut_slice(), self.rlw, bit, 1, 0);
    }

    pub(crate) fn insert_literal_word(&mut self, word: W) {
        let count = rlw::literal_count(self.buffer.as_slice(), self.rlw);
        if count >= W::LARGEST_LITERAL_COUNT {
            self.push_marker();
            rlw::set_literal_count(self.buffer.as_mut_slice(), self.rlw, 1);
        } else {
            rlw::set_literal_count(self.buffer.as_mut_slice(), self.rlw, count + 1);
        }
        self.buffer.push_back(word);
    }

    fn fast_add_stream_of_empty_words(&mut self, bit: bool, mut count: usize) {
        let words = self.buffer.as_slice();
        let current_bit = rlw::running_bit(words, self.rlw);
        if current_bit != bit && rlw::size(words, self.rlw) == 0 {
            rlw::set_running_bit(self.buffer.as_mut_slice(), self.rlw, bit);
        } else if rlw::literal_count(words, self.rlw) != 0 || current_bit != bit {
            self.push_marker();
            rlw::set_running_bit(self.buffer.as_mut_slice(), self.rlw, bit);
        }

        let max = W::LARGEST_RUNNING_LENGTH_COUNT;
        let run = rlw::running_length(self.buffer.as_slice(), self.rlw);
        let extend = count.min(max - run);
        rlw::set_running_length(self.buffer.as_mut_slice(), self.rlw, run + extend);
        count -= extend;

        while count > 0 {
            let chunk = count.min(max);
            self.push_marker();
            rlw::set(self.buffer.as_mut_slice(), self.rlw, bit, chunk, 0);
            count -= chunk;
        }
    }

    /// ORs `mask` into the last logical word, which is either the last
    /// literal or the tail of a trailing zero run. Returns whether any bit of
    /// `mask` was newly set.
    pub(crate) fn or_into_last_word(&mut self, mask: W) -> bool {
        let words = self.buffer.as_slice();
        let literal_count = rlw::literal_count(words, self.rlw);
        if literal_count > 0 {
            let last = self.buffer.last_word();
            if last | mask == last {
                return false;
            }
            self.buffer.or_last_word(mask);
            if self.buffer.last_word() == W::ONES {
                self.buffer.remove_last_word();
                rlw::set_literal_count(self.buffer.as_mut_slice(), self.rlw, literal_count - 1);
                self.drop_empty_marker();
                self.insert_empty_word(true);
            }
            return true;
        }

        let run = rlw::running_length(words, self.rlw);
        if rlw::running_bit(words, self.rlw) || run == 0 {
            return false;
        }
        rlw::set_running_length(self.buffer.as_mut_slice(), self.rlw, run - 1);
        self.drop_empty_marker();
        if mask == W::ONES {
            self.insert_empty_word(true);
        } else {
            self.insert_literal_word(mask);
        }
        true
    }

    /// Clears stored bits at or beyond the size, turning a trailing run of
    /// ones that covers a partial word into a literal.
    fn clear_tail(&mut self) {
        let used = (self.size_in_bits % W::BITS as usize) as u32;
        if used == 0 {
            return;
        }
        let mask = W::low_mask(used);
        let words = self.buffer.as_slice();
        if rlw::literal_count(words, self.rlw) > 0 {
            self.buffer.and_last_word(mask);
            return;
        }

        let run = rlw::running_length(words, self.rlw);
        if run == 0 || !rlw::running_bit(words, self.rlw) {
            return;
        }
        // the last run word becomes a literal; a marker left empty hands it
        // to the previous block
        rlw::set_running_length(self.buffer.as_mut_slice(), self.rlw, run - 1);
        self.drop_empty_marker();
        self.insert_literal_word(mask);
    }

    /// Removes the write cursor's RLW if it stands for no words, moving the
    /// cursor back to the block before it. The first RLW is never removed.
    fn drop_empty_marker(&mut self) {
        if self.rlw == 0 || rlw::size(self.buffer.as_slice(), self.rlw) != 0 {
            return;
        }
        debug_assert_eq!(self.rlw, self.buffer.size_in_words() - 1);
        let previous = self.previous_rlw();
        trace!("dropping empty marker at {}, write cursor back to {previous}", self.rlw);
        self.buffer.remove_last_word();
        self.rlw = previous;
    }

    /// Position of the RLW right before the write cursor.
    fn previous_rlw(&self) -> usize {
        let mut previous = 0;
        for block in self.ewah_iter() {
            if block.position >= self.rlw {
                break;
            }
            previous = block.position;
        }
        previous
    }
}

impl<W: Word> BitmapStorage<W> for EwahBitmap<W> {
    #[inline]
    fn add_word(&mut self, word: W) -> StorageResult {
        EwahBitmap::add_word(self, word);
        Ok(())
    }

    #[inline]
    fn add_literal_word(&mut self, word: W) -> StorageResult {
        EwahBitmap::add_literal_word(self, word);
        Ok(())
    }

    fn add_stream_of_empty_words(&mut self, bit: bool, count: usize) -> StorageResult {
        EwahBitmap::add_stream_of_empty_words(self, bit, count);
        Ok(())
    }

    fn add_stream_of_literal_words(&mut self, words: &[W]) -> StorageResult {
        EwahBitmap::add_stream_of_literal_words(self, words);
        Ok(())
    }

    fn add_stream_of_negated_literal_words(&mut self, words: &[W]) -> StorageResult {
        EwahBitmap::add_stream_of_negated_literal_words(self, words);
        Ok(())
    }

    fn clear(&mut self) {
        EwahBitmap::clear(self);
    }

    fn set_size_in_bits_within_last_word(&mut self, bits: usize) {
        self.resize_within_last_word(bits);
    }
}
