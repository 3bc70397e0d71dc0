//! Machine words usable as the compression unit of a bitmap.

use core::{
    fmt,
    hash::Hash,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl, Shr},
};

use byteorder::ByteOrder;

/// An unsigned word type that an [`EwahBitmap`](crate::EwahBitmap) can be
/// built from.
///
/// The word width fixes the layout of every running-length word (RLW):
///
/// ```text
/// bit 0                 running bit
/// bits 1..=W/2          running length   (W/2 bits)
/// bits W/2+1..W         literal count    (W/2 - 1 bits)
/// ```
///
/// Implemented for [`u32`] and [`u64`].
pub trait Word:
    Copy
    + Default
    + Eq
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Binary
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
    + BitAndAssign
    + BitOrAssign
    + BitXorAssign
{
    /// Number of bits in the word.
    const BITS: u32;
    /// Number of bytes in the word.
    const BYTES: usize;
    /// The all-zeros word.
    const ZERO: Self;
    /// The word with only the lowest bit set.
    const ONE: Self;
    /// The all-ones word.
    const ONES: Self;

    /// Width of the running-length field of an RLW.
    const RUNNING_LENGTH_BITS: u32 = Self::BITS / 2;
    /// Width of the literal-count field of an RLW.
    const LITERAL_BITS: u32 = Self::BITS - 1 - Self::RUNNING_LENGTH_BITS;
    /// Largest run (in words) a single RLW can describe.
    const LARGEST_RUNNING_LENGTH_COUNT: usize = ((1u64 << Self::RUNNING_LENGTH_BITS) - 1) as usize;
    /// Largest number of literal words a single RLW can own.
    const LARGEST_LITERAL_COUNT: usize = ((1u64 << Self::LITERAL_BITS) - 1) as usize;

    /// Truncating conversion from `usize`.
    fn from_usize(value: usize) -> Self;

    /// Truncating conversion to `usize`.
    fn to_usize(self) -> usize;

    /// Number of set bits.
    fn count_ones(self) -> u32;

    /// Number of trailing zero bits.
    fn trailing_zeros(self) -> u32;

    /// Number of trailing one bits.
    fn trailing_ones(self) -> u32;

    /// Number of leading zero bits.
    fn leading_zeros(self) -> u32;

    /// Clears the lowest set bit.
    fn clear_lowest_one(self) -> Self;

    /// Reads a word from the first [`Self::BYTES`] bytes of `buf`.
    fn read_from<B: ByteOrder>(buf: &[u8]) -> Self;

    /// Writes the word into the first [`Self::BYTES`] bytes of `buf`.
    fn write_to<B: ByteOrder>(self, buf: &mut [u8]);

    /// Returns a word with the lowest `bits` bits set.
    #[inline]
    fn low_mask(bits: u32) -> Self {
        if bits == 0 {
            Self::ZERO
        } else {
            Self::ONES >> (Self::BITS - bits)
        }
    }

    /// Returns a word with only bit `index` set.
    #[inline]
    fn bit(index: u32) -> Self {
        Self::ONE << index
    }
}

macro_rules! impl_word {
    ($t:ty, $read:ident, $write:ident) => {
        impl Word for $t {
            const BITS: u32 = <$t>::BITS;
            const BYTES: usize = core::mem::size_of::<$t>();
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const ONES: Self = !0;

            #[inline(always)]
            fn from_usize(value: usize) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_usize(self) -> usize {
                self as usize
            }

            #[inline(always)]
            fn count_ones(self) -> u32 {
                <$t>::count_ones(self)
            }

            #[inline(always)]
            fn trailing_zeros(self) -> u32 {
                <$t>::trailing_zeros(self)
            }

            #[inline(always)]
            fn trailing_ones(self) -> u32 {
                <$t>::trailing_ones(self)
            }

            #[inline(always)]
            fn leading_zeros(self) -> u32 {
                <$t>::leading_zeros(self)
            }

            #[inline(always)]
            fn clear_lowest_one(self) -> Self {
                self & self.wrapping_sub(1)
            }

            #[inline]
            fn read_from<B: ByteOrder>(buf: &[u8]) -> Self {
                B::$read(buf)
            }

            #[inline]
            fn write_to<B: ByteOrder>(self, buf: &mut [u8]) {
                B::$write(buf, self)
            }
        }
    };
}

impl_word!(u32, read_u32, write_u32);
impl_word!(u64, read_u64, write_u64);
