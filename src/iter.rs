//! Iterators over the bits of an `EwahBitmap`.

use core::{iter::FusedIterator, ops::Range};

use crate::{
    bitmap::EwahBitmap,
    cursor::{EwahIterator, ReverseEwahIterator},
    word::Word,
};

/// An iterator over the positions of set bits, in ascending order.
///
/// This struct is created by the [`iter`](EwahBitmap::iter) method on
/// [`EwahBitmap`].
pub type Iter<'a, W> = Positions<'a, W, true>;

/// An iterator over the positions of clear bits below the size, in ascending
/// order.
///
/// This struct is created by the [`clear_iter`](EwahBitmap::clear_iter)
/// method on [`EwahBitmap`].
pub type ClearIter<'a, W> = Positions<'a, W, false>;

/// Ascending positions whose bit equals `SET`, limited to the bitmap size.
///
/// Runs of the wanted value are expanded lazily; runs of the other value are
/// skipped in one step.
#[derive(Clone, Debug)]
pub struct Positions<'a, W: Word, const SET: bool> {
    blocks: EwahIterator<'a, W>,
    size_in_bits: usize,
    /// Bit offset of the first word not yet loaded.
    offset: usize,
    run: Range<usize>,
    literals: &'a [W],
    /// Remaining matching bits of the current literal word.
    word: W,
    word_base: usize,
}

impl<'a, W: Word, const SET: bool> Positions<'a, W, SET> {
    pub(crate) fn new(bitmap: &'a EwahBitmap<W>) -> Self {
        Self {
            blocks: bitmap.ewah_iter(),
            size_in_bits: bitmap.size_in_bits(),
            offset: 0,
            run: 0..0,
            literals: &[],
            word: W::ZERO,
            word_base: 0,
        }
    }

    fn finish(&mut self) -> Option<usize> {
        self.blocks = EwahIterator::new(&[]);
        self.run = 0..0;
        self.literals = &[];
        self.word = W::ZERO;
        None
    }
}

impl<W: Word, const SET: bool> Iterator for Positions<'_, W, SET> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if let Some(pos) = self.run.next() {
                return if pos < self.size_in_bits {
                    Some(pos)
                } else {
                    self.finish()
                };
            }

            if self.word != W::ZERO {
                let pos = self.word_base + self.word.trailing_zeros() as usize;
                self.word = self.word.clear_lowest_one();
                return if pos < self.size_in_bits {
                    Some(pos)
                } else {
                    self.finish()
                };
            }

            if let Some((&first, rest)) = self.literals.split_first() {
                self.word = if SET { first } else { !first };
                self.word_base = self.offset;
                self.offset += W::BITS as usize;
                self.literals = rest;
                continue;
            }

            let block = self.blocks.next()?;
            let run_bits = block.running_length * W::BITS as usize;
            if block.running_bit == SET {
                self.run = self.offset..self.offset + run_bits;
            }
            self.offset += run_bits;
            self.literals = block.literals;
        }
    }
}

impl<W: Word, const SET: bool> FusedIterator for Positions<'_, W, SET> {}

/// An iterator over the positions of set bits, in descending order.
///
/// This struct is created by the [`reverse_iter`](EwahBitmap::reverse_iter)
/// method on [`EwahBitmap`].
#[derive(Clone, Debug)]
pub struct ReverseIter<'a, W: Word> {
    blocks: ReverseEwahIterator<'a, W>,
    size_in_bits: usize,
    /// Bit offset where the most recently loaded block starts.
    block_start: usize,
    /// Exclusive end of the literal words not yet loaded.
    end: usize,
    run: Range<usize>,
    literals: &'a [W],
    word: W,
    word_base: usize,
}

impl<'a, W: Word> ReverseIter<'a, W> {
    pub(crate) fn new(bitmap: &'a EwahBitmap<W>) -> Self {
        let blocks = bitmap.reverse_ewah_iter();
        let total_bits = blocks.remaining_words() * W::BITS as usize;
        Self {
            blocks,
            size_in_bits: bitmap.size_in_bits(),
            block_start: total_bits,
            end: total_bits,
            run: 0..0,
            literals: &[],
            word: W::ZERO,
            word_base: 0,
        }
    }
}

impl<W: Word> Iterator for ReverseIter<'_, W> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let bits = W::BITS as usize;
        loop {
            if self.word != W::ZERO {
                let high = W::BITS - 1 - self.word.leading_zeros();
                self.word ^= W::bit(high);
                return Some(self.word_base + high as usize);
            }

            if let Some((&last, rest)) = self.literals.split_last() {
                self.literals = rest;
                self.end -= bits;
                self.word_base = self.end;
                self.word = if self.size_in_bits <= self.word_base {
                    W::ZERO
                } else if self.size_in_bits - self.word_base >= bits {
                    last
                } else {
                    last & W::low_mask((self.size_in_bits - self.word_base) as u32)
                };
                continue;
            }

            if let Some(pos) = self.run.next_back() {
                return Some(pos);
            }

            let block = self.blocks.next()?;
            let end = self.block_start;
            let run_end = end - block.literal_count() * bits;
            self.block_start = run_end - block.running_length * bits;
            self.end = end;
            self.literals = block.literals;
            self.run = if block.running_bit {
                self.block_start..run_end.min(self.size_in_bits).max(self.block_start)
            } else {
                0..0
            };
        }
    }
}

impl<W: Word> FusedIterator for ReverseIter<'_, W> {}

/// A maximal run of equal bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Value of every bit in the run.
    pub bit: bool,
    /// Number of bits in the run.
    pub len: usize,
}

/// An iterator over the maximal runs of equal bits that cover
/// `0..size_in_bits`, including a trailing run of zeros.
///
/// Besides plain iteration, the head chunk can be inspected with
/// [`current`](Self::current) and consumed partially with
/// [`advance`](Self::advance).
///
/// # Examples
///
/// ```
/// # use ewah_bitmap::{Chunk, EwahBitmap32};
/// let mut bitmap = EwahBitmap32::bitmap_of(&[2, 3, 4]).unwrap();
/// bitmap.set_size_in_bits(10, false);
/// let chunks: Vec<Chunk> = bitmap.chunk_iter().collect();
/// assert_eq!(
///     chunks,
///     [
///         Chunk { bit: false, len: 2 },
///         Chunk { bit: true, len: 3 },
///         Chunk { bit: false, len: 5 },
///     ]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct ChunkIter<'a, W: Word> {
    blocks: EwahIterator<'a, W>,
    /// Bits not yet turned into pieces.
    remaining: usize,
    literals: &'a [W],
    /// Unread bits of the current literal word, low-aligned.
    word: W,
    word_bits: u32,
    lookahead: Option<Chunk>,
    current: Option<Chunk>,
}

impl<'a, W: Word> ChunkIter<'a, W> {
    pub(crate) fn new(bitmap: &'a EwahBitmap<W>) -> Self {
        let mut iter = Self {
            blocks: bitmap.ewah_iter(),
            remaining: bitmap.size_in_bits(),
            literals: &[],
            word: W::ZERO,
            word_bits: 0,
            lookahead: None,
            current: None,
        };
        iter.current = iter.next_chunk();
        iter
    }

    /// The chunk at the head of the iterator, shortened by any partial
    /// [`advance`](Self::advance).
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<Chunk> {
        self.current
    }

    /// Consumes `bits` bits from the front, crossing chunk boundaries as
    /// needed.
    pub fn advance(&mut self, mut bits: usize) {
        while bits > 0 {
            let Some(chunk) = self.current.as_mut() else {
                return;
            };
            if bits < chunk.len {
                chunk.len -= bits;
                return;
            }
            bits -= chunk.len;
            self.current = self.next_chunk();
        }
    }

    fn next_chunk(&mut self) -> Option<Chunk> {
        let mut chunk = match self.lookahead.take() {
            Some(piece) => piece,
            None => self.next_piece()?,
        };
        while let Some(piece) = self.next_piece() {
            if piece.bit != chunk.bit {
                self.lookahead = Some(piece);
                break;
            }
            chunk.len += piece.len;
        }
        Some(chunk)
    }

    /// The next homogeneous piece: a whole run, or a stretch of equal bits
    /// inside a literal word.
    fn next_piece(&mut self) -> Option<Chunk> {
        loop {
            if self.remaining == 0 {
                return None;
            }

            if self.word_bits > 0 {
                let bit = self.word & W::ONE != W::ZERO;
                let run = if bit {
                    self.word.trailing_ones()
                } else {
                    self.word.trailing_zeros()
                }
                .min(self.word_bits);
                self.word = if run >= W::BITS {
                    W::ZERO
                } else {
                    self.word >> run
                };
                self.word_bits -= run;
                return Some(self.clip(bit, run as usize));
            }

            if let Some((&first, rest)) = self.literals.split_first() {
                self.word = first;
                self.word_bits = W::BITS;
                self.literals = rest;
                continue;
            }

            let block = self.blocks.next()?;
            self.literals = block.literals;
            if block.running_length > 0 {
                return Some(self.clip(block.running_bit, block.running_length * W::BITS as usize));
            }
        }
    }

    fn clip(&mut self, bit: bool, len: usize) -> Chunk {
        let len = len.min(self.remaining);
        self.remaining -= len;
        Chunk { bit, len }
    }
}

impl<W: Word> Iterator for ChunkIter<'_, W> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let chunk = self.current?;
        self.current = self.next_chunk();
        Some(chunk)
    }
}

impl<W: Word> FusedIterator for ChunkIter<'_, W> {}

impl<W: Word> EwahBitmap<W> {
    /// Returns an iterator over the positions of set bits, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap64;
    /// let bitmap = EwahBitmap64::bitmap_of(&[300, 2, 64]).unwrap();
    /// assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![2, 64, 300]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, W> {
        Positions::new(self)
    }

    /// Returns an iterator over the positions of set bits, in descending
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let bitmap = EwahBitmap32::bitmap_of(&[300, 2, 64]).unwrap();
    /// assert_eq!(bitmap.reverse_iter().collect::<Vec<_>>(), vec![300, 64, 2]);
    /// ```
    #[must_use]
    pub fn reverse_iter(&self) -> ReverseIter<'_, W> {
        ReverseIter::new(self)
    }

    /// Returns an iterator over the positions of clear bits below
    /// [`size_in_bits`](Self::size_in_bits), in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let bitmap = EwahBitmap32::bitmap_of(&[0, 2, 3]).unwrap();
    /// assert_eq!(bitmap.clear_iter().collect::<Vec<_>>(), vec![1]);
    /// ```
    #[must_use]
    pub fn clear_iter(&self) -> ClearIter<'_, W> {
        Positions::new(self)
    }

    /// Returns an iterator over the maximal runs of equal bits.
    #[must_use]
    pub fn chunk_iter(&self) -> ChunkIter<'_, W> {
        ChunkIter::new(self)
    }
}
