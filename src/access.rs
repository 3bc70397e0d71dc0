//! Random access to single bits: `get` scans the chain, `set` either appends
//! or splices the word array in place.

use log::trace;

use crate::{
    bitmap::EwahBitmap,
    error::{Error, Result},
    macros::bitpos,
    rlw,
    word::Word,
};

/// Where a bit lives inside the chain.
#[derive(Clone, Copy, Debug)]
struct Location {
    /// Index of the owning RLW.
    pos: usize,
    running_bit: bool,
    running_length: usize,
    literal_count: usize,
    /// 1-based index of the target word inside the run or the literal
    /// section of the block.
    word_position: usize,
}

impl<W: Word> EwahBitmap<W> {
    /// Returns the bit at position `i`. Positions at or beyond the size read
    /// as `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap64;
    /// let bitmap = EwahBitmap64::bitmap_of(&[5, 10_000]).unwrap();
    /// assert!(bitmap.get(5));
    /// assert!(bitmap.get(10_000));
    /// assert!(!bitmap.get(6));
    /// assert!(!bitmap.get(usize::MAX));
    /// ```
    #[must_use]
    pub fn get(&self, i: usize) -> bool {
        if i >= self.size_in_bits {
            return false;
        }
        let (target, bit) = bitpos!(W, i);
        let mut words_before = 0;
        for block in self.ewah_iter() {
            if target < words_before + block.running_length {
                return block.running_bit;
            }
            words_before += block.running_length;
            if target < words_before + block.literal_count() {
                return block.literals[target - words_before] & W::bit(bit) != W::ZERO;
            }
            words_before += block.literal_count();
        }
        false
    }

    /// Sets the bit at position `i`. Returns `true` if the bit was previously
    /// clear.
    ///
    /// Setting past the end grows the bitmap to `i + 1` bits in amortized
    /// constant time. Setting inside the bitmap rewrites the affected block,
    /// inserting or removing at most two words.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `i` exceeds
    /// [`MAX_BIT_INDEX`](Self::MAX_BIT_INDEX).
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let mut bitmap = EwahBitmap32::new();
    /// assert_eq!(bitmap.set(1_000), Ok(true));
    /// assert_eq!(bitmap.set(3), Ok(true));
    /// assert_eq!(bitmap.set(3), Ok(false));
    /// assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![3, 1_000]);
    /// ```
    pub fn set(&mut self, i: usize) -> Result<bool> {
        if i > Self::MAX_BIT_INDEX {
            return Err(Error::IndexOutOfRange {
                index: i,
                max: Self::MAX_BIT_INDEX,
            });
        }
        if i >= self.size_in_bits {
            self.set_size_in_bits(i + 1, false);
            let (_, bit) = bitpos!(W, i);
            return Ok(self.or_into_last_word(W::bit(bit)));
        }
        Ok(self.locate_and_set(i))
    }

    fn locate(&self, i: usize) -> Option<(Location, bool)> {
        let (target, _) = bitpos!(W, i);
        let mut words_before = 0;
        for block in self.ewah_iter() {
            let mut location = Location {
                pos: block.position,
                running_bit: block.running_bit,
                running_length: block.running_length,
                literal_count: block.literal_count(),
                word_position: 0,
            };
            if target < words_before + block.running_length {
                location.word_position = target - words_before + 1;
                return Some((location, true));
            }
            words_before += block.running_length;
            if target < words_before + block.literal_count() {
                location.word_position = target - words_before + 1;
                return Some((location, false));
            }
            words_before += block.literal_count();
        }
        None
    }

    fn locate_and_set(&mut self, i: usize) -> bool {
        let (_, bit) = bitpos!(W, i);
        let mask = W::bit(bit);
        match self.locate(i) {
            Some((location, true)) => self.set_in_run(location, mask),
            Some((location, false)) => self.set_in_literals(location, mask),
            None => false,
        }
    }

    /// Splits a run around the target word, which becomes a literal.
    fn set_in_run(&mut self, at: Location, mask: W) -> bool {
        if at.running_bit {
            return false;
        }
        let Location {
            pos,
            running_length,
            literal_count,
            word_position,
            ..
        } = at;

        let at_end = word_position == running_length;
        if at_end && literal_count < W::LARGEST_LITERAL_COUNT {
            // the last run word becomes the first literal of the block
            trace!("set: expand 1 word at {}", pos + 1);
            self.buffer.expand(pos + 1, 1);
            self.buffer.set_word(pos + 1, mask);
            if self.rlw > pos {
                self.rlw += 1;
            }
            rlw::set(
                self.buffer.as_mut_slice(),
                pos,
                false,
                running_length - 1,
                literal_count + 1,
            );
            return true;
        }

        // prefix run, one literal, then a new RLW for the suffix run and the
        // original literals
        trace!("set: expand 2 words at {}", pos + 1);
        self.buffer.expand(pos + 1, 2);
        self.buffer.set_word(pos + 1, mask);
        let words = self.buffer.as_mut_slice();
        rlw::set(words, pos, false, word_position - 1, 1);
        rlw::set(
            words,
            pos + 2,
            false,
            running_length - word_position,
            literal_count,
        );
        if self.rlw >= pos {
            self.rlw += 2;
            trace!("set: write cursor moved to {}", self.rlw);
        }
        true
    }

    /// Sets the bit inside a literal word. A literal that fills up is folded
    /// into the neighboring runs, or splits the block when it cannot be.
    fn set_in_literals(&mut self, at: Location, mask: W) -> bool {
        let Location {
            pos,
            running_bit,
            running_length,
            literal_count,
            word_position,
        } = at;
        let target = pos + word_position;
        let word = self.buffer.word(target);
        if word & mask != W::ZERO {
            return false;
        }
        self.buffer.or_word(target, mask);
        if word | mask != W::ONES {
            return true;
        }

        let max_run = W::LARGEST_RUNNING_LENGTH_COUNT;
        let merge_current = word_position == 1
            && (running_bit || running_length == 0)
            && running_length < max_run;

        let next_pos = pos + literal_count + 1;
        let next = if word_position == literal_count && next_pos < self.buffer.size_in_words() {
            let words = self.buffer.as_slice();
            let next_bit = rlw::running_bit(words, next_pos);
            let next_run = rlw::running_length(words, next_pos);
            let next_literals = rlw::literal_count(words, next_pos);
            ((next_bit || next_run == 0) && next_run < max_run).then_some((next_run, next_literals))
        } else {
            None
        };

        match next {
            Some((next_run, next_literals))
                if merge_current && running_length + 1 + next_run <= max_run =>
            {
                // the literal is the only one in its block: drop it and the
                // next RLW, joining both runs around it
                trace!("set: collapse 2 words at {pos}");
                self.buffer.collapse(pos, 2);
                rlw::set(
                    self.buffer.as_mut_slice(),
                    pos,
                    true,
                    running_length + 1 + next_run,
                    next_literals,
                );
                if self.rlw >= pos + 2 {
                    self.rlw -= 2;
                }
            }
            _ if merge_current => {
                trace!("set: collapse 1 word at {}", pos + 1);
                self.buffer.collapse(pos + 1, 1);
                rlw::set(
                    self.buffer.as_mut_slice(),
                    pos,
                    true,
                    running_length + 1,
                    literal_count - 1,
                );
                if self.rlw >= pos + 2 {
                    self.rlw -= 1;
                }
            }
            Some((next_run, next_literals)) => {
                trace!("set: collapse 1 word at {target}");
                self.buffer.collapse(target, 1);
                let words = self.buffer.as_mut_slice();
                rlw::set(words, pos, running_bit, running_length, literal_count - 1);
                rlw::set(words, target, true, next_run + 1, next_literals);
                if self.rlw >= next_pos {
                    self.rlw -= 1;
                }
            }
            None => {
                // the full word becomes an RLW for a one-word run of ones that
                // owns the literals after it
                let words = self.buffer.as_mut_slice();
                rlw::set(words, pos, running_bit, running_length, word_position - 1);
                rlw::set(words, target, true, 1, literal_count - word_position);
                if self.rlw == pos {
                    self.rlw = target;
                    trace!("set: write cursor moved to {target}");
                }
            }
        }
        true
    }
}
