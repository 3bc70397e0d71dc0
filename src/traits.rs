//! Trait implementations for `EwahBitmap`.

use core::{
    fmt,
    hash::{Hash, Hasher},
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Sub, SubAssign},
};

use crate::{
    bitmap::EwahBitmap,
    iter::{Chunk, Iter},
    sink::NonEmptyDetector,
    word::Word,
};

impl<W: Word> Default for EwahBitmap<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Word> fmt::Debug for EwahBitmap<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = f.debug_set();
        for bit in self {
            w.entry(&bit);
        }
        w.finish()
    }
}

impl<W: Word> PartialEq for EwahBitmap<W> {
    /// Two bitmaps are equal when they have the same set bits, whatever their
    /// sizes and word layouts.
    ///
    /// # Examples
    ///
    /// ```
    /// use ewah_bitmap::EwahBitmap32;
    ///
    /// let a = EwahBitmap32::bitmap_of(&[1, 40]).unwrap();
    /// let mut b = EwahBitmap32::bitmap_of(&[40, 1]).unwrap();
    /// b.set_size_in_bits(1_000, false);
    /// assert_eq!(a, b);
    /// ```
    fn eq(&self, other: &Self) -> bool {
        let mut detector = NonEmptyDetector::new();
        self.xor_to_container(other, &mut detector);
        !detector.is_non_empty()
    }
}

impl<W: Word> Eq for EwahBitmap<W> {}

impl<W: Word> Hash for EwahBitmap<W> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // maximal runs identify the bit sequence; the trailing zeros do not
        // take part in equality, so they are left out
        let mut chunks = self.chunk_iter().peekable();
        while let Some(Chunk { bit, len }) = chunks.next() {
            if !bit && chunks.peek().is_none() {
                break;
            }
            bit.hash(state);
            len.hash(state);
        }
    }
}

impl<'a, W: Word> IntoIterator for &'a EwahBitmap<W> {
    type Item = usize;
    type IntoIter = Iter<'a, W>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Bitwise Operator Implementations
// ============================================================================

macro_rules! impl_binary_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $merge:ident) => {
        impl<W: Word> $op for EwahBitmap<W> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self::Output {
                self.$merge(&rhs)
            }
        }

        impl<W: Word> $op for &EwahBitmap<W> {
            type Output = EwahBitmap<W>;

            #[inline]
            fn $method(self, rhs: Self) -> Self::Output {
                self.$merge(rhs)
            }
        }

        impl<W: Word> $op<&Self> for EwahBitmap<W> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: &Self) -> Self::Output {
                self.$merge(rhs)
            }
        }

        impl<W: Word> $assign for EwahBitmap<W> {
            #[inline]
            fn $assign_method(&mut self, rhs: Self) {
                *self = self.$merge(&rhs);
            }
        }

        impl<W: Word> $assign<&Self> for EwahBitmap<W> {
            #[inline]
            fn $assign_method(&mut self, rhs: &Self) {
                *self = self.$merge(rhs);
            }
        }
    };
}

impl_binary_op!(BitAnd, bitand, BitAndAssign, bitand_assign, and);
impl_binary_op!(BitOr, bitor, BitOrAssign, bitor_assign, or);
impl_binary_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, xor);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, and_not);

impl<W: Word> Not for EwahBitmap<W> {
    type Output = Self;

    /// Returns the complement of the bitmap below its size.
    ///
    /// # Examples
    ///
    /// ```
    /// use ewah_bitmap::EwahBitmap64;
    ///
    /// let mut a = EwahBitmap64::bitmap_of(&[0, 2]).unwrap();
    /// a.set_size_in_bits(4, false);
    /// let b = !a;
    /// assert_eq!(b.iter().collect::<Vec<_>>(), vec![1, 3]);
    /// ```
    #[inline]
    fn not(mut self) -> Self::Output {
        self.negate();
        self
    }
}

impl<W: Word> Not for &EwahBitmap<W> {
    type Output = EwahBitmap<W>;

    #[inline]
    fn not(self) -> Self::Output {
        !self.clone()
    }
}
