//! A consumable view of one bitmap's word stream, used by the merge engines.

use crate::{
    cursor::EwahIterator,
    sink::{BitmapStorage, StorageResult},
    word::Word,
};

/// A cursor over the uncompressed words of a bitmap that can be consumed from
/// the front a few words at a time.
///
/// The cursor always describes the remainder of the current block: a run of
/// [`running_length`](Self::running_length) words of
/// [`running_bit`](Self::running_bit) followed by the literal words still
/// pending. Blocks that stand for no words at all are skipped. Once the stream
/// is exhausted every query reports zero.
#[derive(Clone, Debug)]
pub struct IteratingRlw<'a, W: Word> {
    blocks: EwahIterator<'a, W>,
    running_bit: bool,
    running_length: usize,
    literals: &'a [W],
}

impl<'a, W: Word> IteratingRlw<'a, W> {
    /// Positions the cursor at the first non-empty block of `words`.
    #[must_use]
    pub fn new(words: &'a [W]) -> Self {
        let mut cursor = Self {
            blocks: EwahIterator::new(words),
            running_bit: false,
            running_length: 0,
            literals: &[],
        };
        cursor.next();
        cursor
    }

    /// Loads the next non-empty block. Returns `false` once the stream is
    /// exhausted, leaving the cursor empty.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        for block in self.blocks.by_ref() {
            if block.size() == 0 {
                continue;
            }
            self.running_bit = block.running_bit;
            self.running_length = block.running_length;
            self.literals = block.literals;
            return true;
        }
        self.running_bit = false;
        self.running_length = 0;
        self.literals = &[];
        false
    }

    /// Words left in the current block.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.running_length + self.literals.len()
    }

    /// Bit value of the pending run.
    #[inline]
    #[must_use]
    pub fn running_bit(&self) -> bool {
        self.running_bit
    }

    /// Words left in the pending run.
    #[inline]
    #[must_use]
    pub fn running_length(&self) -> usize {
        self.running_length
    }

    /// Literal words left in the current block.
    #[inline]
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    /// The `index`-th pending literal word.
    #[inline]
    #[must_use]
    pub fn literal_word_at(&self, index: usize) -> W {
        self.literals[index]
    }

    /// The pending literal words.
    #[inline]
    #[must_use]
    pub fn literals(&self) -> &'a [W] {
        self.literals
    }

    /// Skips `count` words, run words first, crossing blocks as needed.
    pub fn discard_first_words(&mut self, mut count: usize) {
        while count > 0 {
            if self.running_length > count {
                self.running_length -= count;
                return;
            }
            count -= self.running_length;
            self.running_length = 0;
            let taken = count.min(self.literals.len());
            self.literals = &self.literals[taken..];
            count -= taken;
            if (count > 0 || self.size() == 0) && !self.next() {
                return;
            }
        }
    }

    /// Drops the pending run, moving on if no literals are left.
    pub fn discard_running_words(&mut self) {
        self.running_length = 0;
        if self.literals.is_empty() {
            self.next();
        }
    }

    /// Drops `count` pending literal words, moving on if the block empties.
    pub fn discard_literal_words(&mut self, count: usize) {
        self.literals = &self.literals[count..];
        if self.size() == 0 {
            self.next();
        }
    }

    /// Copies up to `max` words into `sink`, consuming them. Returns the number
    /// of words copied, which is less than `max` only if the stream ran out.
    pub fn discharge<S>(&mut self, sink: &mut S, max: usize) -> Result<usize, crate::Halt>
    where
        S: BitmapStorage<W> + ?Sized,
    {
        self.discharge_with(sink, max, false)
    }

    /// Like [`discharge`](Self::discharge), but writes every word complemented.
    pub fn discharge_negated<S>(&mut self, sink: &mut S, max: usize) -> Result<usize, crate::Halt>
    where
        S: BitmapStorage<W> + ?Sized,
    {
        self.discharge_with(sink, max, true)
    }

    fn discharge_with<S>(
        &mut self,
        sink: &mut S,
        max: usize,
        negate: bool,
    ) -> Result<usize, crate::Halt>
    where
        S: BitmapStorage<W> + ?Sized,
    {
        let mut copied = 0;
        while copied < max && self.size() > 0 {
            let run = self.running_length.min(max - copied);
            sink.add_stream_of_empty_words(self.running_bit != negate, run)?;
            self.running_length -= run;
            copied += run;
            if self.running_length > 0 {
                break;
            }

            let count = self.literals.len().min(max - copied);
            let head = &self.literals[..count];
            if negate {
                sink.add_stream_of_negated_literal_words(head)?;
            } else {
                sink.add_stream_of_literal_words(head)?;
            }
            self.discard_literal_words(count);
            copied += count;
        }
        Ok(copied)
    }

    /// Copies everything that is left into `sink`.
    pub fn discharge_all<S>(&mut self, sink: &mut S) -> StorageResult
    where
        S: BitmapStorage<W> + ?Sized,
    {
        self.discharge_all_with(sink, false)
    }

    /// Copies everything that is left into `sink`, complemented.
    pub fn discharge_all_negated<S>(&mut self, sink: &mut S) -> StorageResult
    where
        S: BitmapStorage<W> + ?Sized,
    {
        self.discharge_all_with(sink, true)
    }

    fn discharge_all_with<S>(&mut self, sink: &mut S, negate: bool) -> StorageResult
    where
        S: BitmapStorage<W> + ?Sized,
    {
        while self.size() > 0 {
            sink.add_stream_of_empty_words(self.running_bit != negate, self.running_length)?;
            if negate {
                sink.add_stream_of_negated_literal_words(self.literals)?;
            } else {
                sink.add_stream_of_literal_words(self.literals)?;
            }
            self.running_length = 0;
            self.literals = &[];
            self.next();
        }
        Ok(())
    }

    /// Consumes everything that is left, writing it to `sink` as a run of
    /// `bit` of the same length.
    pub fn discharge_as_run<S>(&mut self, sink: &mut S, bit: bool) -> StorageResult
    where
        S: BitmapStorage<W> + ?Sized,
    {
        while self.size() > 0 {
            sink.add_stream_of_empty_words(bit, self.size())?;
            self.running_length = 0;
            self.literals = &[];
            self.next();
        }
        Ok(())
    }

    /// Consumes everything that is left, writing it to `sink` as zeros.
    pub fn discharge_as_empty<S>(&mut self, sink: &mut S) -> StorageResult
    where
        S: BitmapStorage<W> + ?Sized,
    {
        self.discharge_as_run(sink, false)
    }
}
