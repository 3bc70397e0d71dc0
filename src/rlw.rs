//! Field access for running-length words stored inside a word array.
//!
//! An RLW is addressed by its index in the word array. Setters only touch
//! their own field and leave the other two intact.

use crate::word::Word;

#[inline(always)]
fn running_length_mask<W: Word>() -> W {
    W::from_usize(W::LARGEST_RUNNING_LENGTH_COUNT)
}

#[inline(always)]
fn literal_shift<W: Word>() -> u32 {
    1 + W::RUNNING_LENGTH_BITS
}

/// Packs the three RLW fields into one word.
#[inline]
pub fn encode<W: Word>(running_bit: bool, running_length: usize, literal_count: usize) -> W {
    debug_assert!(running_length <= W::LARGEST_RUNNING_LENGTH_COUNT);
    debug_assert!(literal_count <= W::LARGEST_LITERAL_COUNT);
    let bit = if running_bit { W::ONE } else { W::ZERO };
    bit | (W::from_usize(running_length) << 1) | (W::from_usize(literal_count) << literal_shift::<W>())
}

/// The bit value of the run described by the RLW.
#[inline(always)]
pub fn running_bit<W: Word>(words: &[W], pos: usize) -> bool {
    words[pos] & W::ONE != W::ZERO
}

/// Number of words in the run described by the RLW.
#[inline(always)]
pub fn running_length<W: Word>(words: &[W], pos: usize) -> usize {
    ((words[pos] >> 1) & running_length_mask::<W>()).to_usize()
}

/// Number of literal words following the RLW.
#[inline(always)]
pub fn literal_count<W: Word>(words: &[W], pos: usize) -> usize {
    (words[pos] >> literal_shift::<W>()).to_usize()
}

/// Total number of uncompressed words the RLW stands for.
#[inline(always)]
pub fn size<W: Word>(words: &[W], pos: usize) -> usize {
    running_length(words, pos) + literal_count(words, pos)
}

#[inline]
pub fn set_running_bit<W: Word>(words: &mut [W], pos: usize, bit: bool) {
    if bit {
        words[pos] |= W::ONE;
    } else {
        words[pos] &= !W::ONE;
    }
}

#[inline]
pub fn set_running_length<W: Word>(words: &mut [W], pos: usize, count: usize) {
    debug_assert!(count <= W::LARGEST_RUNNING_LENGTH_COUNT);
    let field = running_length_mask::<W>() << 1;
    words[pos] = (words[pos] & !field) | (W::from_usize(count) << 1);
}

#[inline]
pub fn set_literal_count<W: Word>(words: &mut [W], pos: usize, count: usize) {
    debug_assert!(count <= W::LARGEST_LITERAL_COUNT);
    let keep = W::low_mask(literal_shift::<W>());
    words[pos] = (words[pos] & keep) | (W::from_usize(count) << literal_shift::<W>());
}

/// Overwrites all three fields at once.
#[inline]
pub fn set<W: Word>(
    words: &mut [W],
    pos: usize,
    running_bit: bool,
    running_length: usize,
    literal_count: usize,
) {
    words[pos] = encode(running_bit, running_length, literal_count);
}
