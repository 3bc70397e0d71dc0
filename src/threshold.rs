//! K-of-N aggregation: a bit is set in the output when it is set in at least
//! `k` of the inputs.

use alloc::vec::Vec;

use log::trace;

use crate::{
    bitmap::EwahBitmap,
    buffered::IteratingRlw,
    macros::words_for,
    sink::{BitmapStorage, StorageResult},
    word::Word,
};

impl<W: Word> EwahBitmap<W> {
    /// Bits set in at least `k` of `bitmaps`.
    ///
    /// `k = 0` sets every bit, `k = 1` is the union, `k = bitmaps.len()` is
    /// the intersection and any larger `k` gives an empty result. The result
    /// has the largest input size.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let a = EwahBitmap32::bitmap_of(&[1, 2, 3]).unwrap();
    /// let b = EwahBitmap32::bitmap_of(&[2, 3, 4]).unwrap();
    /// let c = EwahBitmap32::bitmap_of(&[3, 4, 5]).unwrap();
    /// let majority = EwahBitmap32::threshold(2, &[&a, &b, &c]);
    /// assert_eq!(majority.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
    /// ```
    #[must_use]
    pub fn threshold(k: usize, bitmaps: &[&Self]) -> Self {
        let capacity = bitmaps.iter().map(|b| b.size_in_words()).max().unwrap_or(1);
        let mut out = Self::with_capacity(capacity);
        Self::threshold_to_container(&mut out, k, bitmaps);
        out
    }

    /// Streams the bits set in at least `k` of `bitmaps` into `container`,
    /// which is cleared first.
    pub fn threshold_to_container<S>(container: &mut S, k: usize, bitmaps: &[&Self])
    where
        S: BitmapStorage<W> + ?Sized,
    {
        container.clear();
        let size_in_bits = bitmaps.iter().map(|b| b.size_in_bits()).max().unwrap_or(0);
        if threshold_words(container, k, bitmaps, words_for!(W, size_in_bits)).is_err() {
            trace!("threshold({k}) halted early by its sink");
            return;
        }
        container.set_size_in_bits_within_last_word(size_in_bits);
    }
}

fn threshold_words<W, S>(
    sink: &mut S,
    k: usize,
    bitmaps: &[&EwahBitmap<W>],
    total_words: usize,
) -> StorageResult
where
    W: Word,
    S: BitmapStorage<W> + ?Sized,
{
    if k == 0 || k > bitmaps.len() {
        return sink.add_stream_of_empty_words(k == 0, total_words);
    }

    let mut cursors: Vec<IteratingRlw<'_, W>> = bitmaps.iter().map(|b| b.iterating_rlw()).collect();
    let mut column = Vec::with_capacity(cursors.len());
    let mut planes = Vec::new();
    let mut written = 0;

    loop {
        // exhausted inputs read as zeros for the rest of the stream
        cursors.retain(|c| c.size() > 0);
        if cursors.len() < k {
            break;
        }

        if cursors.iter().all(|c| c.running_length() > 0) {
            let length = cursors.iter().map(IteratingRlw::running_length).min().unwrap_or(0);
            let ones = cursors.iter().filter(|c| c.running_bit()).count();
            sink.add_stream_of_empty_words(ones >= k, length)?;
            cursors.iter_mut().for_each(|c| c.discard_first_words(length));
            written += length;
            continue;
        }

        // every cursor can serve this many words without changing shape
        let length = cursors
            .iter()
            .map(|c| {
                if c.running_length() > 0 {
                    c.running_length()
                } else {
                    c.literal_count()
                }
            })
            .min()
            .unwrap_or(0);
        for index in 0..length {
            column.clear();
            column.extend(cursors.iter().map(|c| {
                if c.running_length() > 0 {
                    if c.running_bit() { W::ONES } else { W::ZERO }
                } else {
                    c.literal_word_at(index)
                }
            }));
            sink.add_word(at_least(&column, k, &mut planes))?;
        }
        cursors.iter_mut().for_each(|c| c.discard_first_words(length));
        written += length;
    }

    sink.add_stream_of_empty_words(false, total_words.saturating_sub(written))
}

/// For every bit lane, whether at least `k` of `words` have it set.
///
/// Counts per lane are kept bit-sliced: `planes[j]` holds bit `j` of every
/// lane's count.
fn at_least<W: Word>(words: &[W], k: usize, planes: &mut Vec<W>) -> W {
    planes.clear();
    for &word in words {
        let mut carry = word;
        for plane in planes.iter_mut() {
            if carry == W::ZERO {
                break;
            }
            let next = *plane & carry;
            *plane ^= carry;
            carry = next;
        }
        if carry != W::ZERO {
            planes.push(carry);
        }
    }

    if planes.len() < usize::BITS as usize && k >> planes.len() != 0 {
        return W::ZERO;
    }
    // compare each lane's count against k from the top bit down
    let mut greater = W::ZERO;
    let mut equal = W::ONES;
    for (j, &plane) in planes.iter().enumerate().rev() {
        if (k >> j) & 1 == 1 {
            equal &= plane;
        } else {
            greater |= equal & plane;
            equal &= !plane;
        }
    }
    greater | equal
}
