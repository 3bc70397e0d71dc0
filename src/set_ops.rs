//! Set operations for `EwahBitmap`: a streaming two-way merge shared by every
//! binary operator, the N-ary reductions built on it, and composition.

use log::trace;

use crate::{
    bitmap::EwahBitmap,
    error::{Error, Result},
    sink::{BitCounter, BitmapStorage, NonEmptyDetector, StorageResult},
    word::Word,
};

/// A two-input boolean function given by its truth table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LogicalOp {
    name: &'static str,
    /// Bit `(x << 1) | y` holds `f(x, y)`.
    table: u8,
}

/// What a binary operator reduces to once one input is fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unary {
    Const(bool),
    Identity,
    Negate,
}

impl LogicalOp {
    pub(crate) const AND: Self = Self::new("and", 0b1000);
    pub(crate) const OR: Self = Self::new("or", 0b1110);
    pub(crate) const XOR: Self = Self::new("xor", 0b0110);
    pub(crate) const AND_NOT: Self = Self::new("and_not", 0b0100);

    const fn new(name: &'static str, table: u8) -> Self {
        Self { name, table }
    }

    #[inline(always)]
    const fn eval(self, x: bool, y: bool) -> bool {
        let index = ((x as u8) << 1) | y as u8;
        (self.table >> index) & 1 == 1
    }

    /// Combines two literal words bit by bit.
    #[inline]
    fn apply<W: Word>(self, x: W, y: W) -> W {
        match self.table {
            0b1000 => x & y,
            0b1110 => x | y,
            0b0110 => x ^ y,
            0b0100 => x & !y,
            _ => {
                let mut out = W::ZERO;
                if self.eval(true, true) {
                    out |= x & y;
                }
                if self.eval(true, false) {
                    out |= x & !y;
                }
                if self.eval(false, true) {
                    out |= !x & y;
                }
                if self.eval(false, false) {
                    out |= !(x | y);
                }
                out
            }
        }
    }

    /// The function of the free input when the other input is fixed to `bit`.
    fn fix(self, bit: bool, fixed_is_left: bool) -> Unary {
        let f = |free: bool| {
            if fixed_is_left {
                self.eval(bit, free)
            } else {
                self.eval(free, bit)
            }
        };
        match (f(false), f(true)) {
            (a, b) if a == b => Unary::Const(a),
            (false, true) => Unary::Identity,
            _ => Unary::Negate,
        }
    }
}

/// Streams `op(left, right)` into `sink`.
///
/// The sink is cleared first. The result spans as many words as the longer
/// input and its size in bits is the larger of the two sizes. If the sink
/// halts, the merge stops and the sink keeps whatever it recorded.
pub(crate) fn merge<W, S>(op: LogicalOp, left: &EwahBitmap<W>, right: &EwahBitmap<W>, sink: &mut S)
where
    W: Word,
    S: BitmapStorage<W> + ?Sized,
{
    sink.clear();
    if merge_words(op, left, right, sink).is_err() {
        trace!("{} merge halted early by its sink", op.name);
        return;
    }
    sink.set_size_in_bits_within_last_word(left.size_in_bits().max(right.size_in_bits()));
}

fn merge_words<W, S>(
    op: LogicalOp,
    left: &EwahBitmap<W>,
    right: &EwahBitmap<W>,
    sink: &mut S,
) -> StorageResult
where
    W: Word,
    S: BitmapStorage<W> + ?Sized,
{
    let mut x = left.iterating_rlw();
    let mut y = right.iterating_rlw();

    while x.size() > 0 && y.size() > 0 {
        while x.running_length() > 0 || y.running_length() > 0 {
            // the longer run drives; ties go to the left input
            let left_is_prey = x.running_length() < y.running_length();
            let (prey, predator) = if left_is_prey {
                (&mut x, &mut y)
            } else {
                (&mut y, &mut x)
            };
            let length = predator.running_length();
            match op.fix(predator.running_bit(), !left_is_prey) {
                Unary::Const(bit) => {
                    sink.add_stream_of_empty_words(bit, length)?;
                    prey.discard_first_words(length);
                }
                Unary::Identity => {
                    let copied = prey.discharge(sink, length)?;
                    sink.add_stream_of_empty_words(false, length - copied)?;
                }
                Unary::Negate => {
                    let copied = prey.discharge_negated(sink, length)?;
                    sink.add_stream_of_empty_words(true, length - copied)?;
                }
            }
            predator.discard_running_words();
        }

        let count = x.literal_count().min(y.literal_count());
        if count > 0 {
            for (&a, &b) in x.literals()[..count].iter().zip(&y.literals()[..count]) {
                sink.add_word(op.apply(a, b))?;
            }
            x.discard_literal_words(count);
            y.discard_literal_words(count);
        }
    }
    debug_assert!(x.size() == 0 || y.size() == 0);

    // one input is exhausted and reads as zeros from here on
    let rest_is_left = x.size() > 0;
    let rest = if rest_is_left { &mut x } else { &mut y };
    match op.fix(false, !rest_is_left) {
        Unary::Identity => rest.discharge_all(sink),
        Unary::Negate => rest.discharge_all_negated(sink),
        Unary::Const(bit) => rest.discharge_as_run(sink, bit),
    }
}

macro_rules! binary_op {
    (
        $op:expr,
        $(#[$doc:meta])*
        fn $name:ident;
        fn $to_container:ident;
        fn $cardinality:ident;
    ) => {
        $(#[$doc])*
        #[must_use]
        pub fn $name(&self, other: &Self) -> Self {
            let mut out = Self::with_capacity(self.size_in_words().max(other.size_in_words()));
            self.$to_container(other, &mut out);
            out
        }

        #[doc = concat!("Streams the result of [`", stringify!($name), "`](Self::", stringify!($name), ") into `container`, which is cleared first.")]
        pub fn $to_container<S>(&self, other: &Self, container: &mut S)
        where
            S: BitmapStorage<W> + ?Sized,
        {
            merge($op, self, other, container);
        }

        #[doc = concat!("Number of set bits in the result of [`", stringify!($name), "`](Self::", stringify!($name), "), computed without building it.")]
        #[must_use]
        pub fn $cardinality(&self, other: &Self) -> usize {
            let mut counter = BitCounter::new();
            self.$to_container(other, &mut counter);
            counter.count()
        }
    };
}

impl<W: Word> EwahBitmap<W> {
    binary_op! {
        LogicalOp::AND,
        /// Intersection: bits set in both bitmaps.
        ///
        /// The result has the larger of the two sizes.
        ///
        /// # Examples
        ///
        /// ```
        /// # use ewah_bitmap::EwahBitmap32;
        /// let a = EwahBitmap32::bitmap_of(&[1, 5, 100]).unwrap();
        /// let b = EwahBitmap32::bitmap_of(&[5, 100, 200]).unwrap();
        /// assert_eq!(a.and(&b).iter().collect::<Vec<_>>(), vec![5, 100]);
        /// assert_eq!(a.and_cardinality(&b), 2);
        /// ```
        fn and;
        fn and_to_container;
        fn and_cardinality;
    }

    binary_op! {
        LogicalOp::OR,
        /// Union: bits set in either bitmap.
        ///
        /// # Examples
        ///
        /// ```
        /// # use ewah_bitmap::EwahBitmap64;
        /// let a = EwahBitmap64::bitmap_of(&[1, 5]).unwrap();
        /// let b = EwahBitmap64::bitmap_of(&[5, 1_000]).unwrap();
        /// let union = a.or(&b);
        /// assert_eq!(union.iter().collect::<Vec<_>>(), vec![1, 5, 1_000]);
        /// assert_eq!(union.size_in_bits(), 1_001);
        /// ```
        fn or;
        fn or_to_container;
        fn or_cardinality;
    }

    binary_op! {
        LogicalOp::XOR,
        /// Symmetric difference: bits set in exactly one bitmap.
        ///
        /// # Examples
        ///
        /// ```
        /// # use ewah_bitmap::EwahBitmap32;
        /// let a = EwahBitmap32::bitmap_of(&[1, 5]).unwrap();
        /// let b = EwahBitmap32::bitmap_of(&[5, 9]).unwrap();
        /// assert_eq!(a.xor(&b).iter().collect::<Vec<_>>(), vec![1, 9]);
        /// ```
        fn xor;
        fn xor_to_container;
        fn xor_cardinality;
    }

    binary_op! {
        LogicalOp::AND_NOT,
        /// Difference: bits set in `self` but not in `other`.
        ///
        /// # Examples
        ///
        /// ```
        /// # use ewah_bitmap::EwahBitmap32;
        /// let a = EwahBitmap32::bitmap_of(&[1, 5, 300]).unwrap();
        /// let b = EwahBitmap32::bitmap_of(&[5]).unwrap();
        /// assert_eq!(a.and_not(&b).iter().collect::<Vec<_>>(), vec![1, 300]);
        /// ```
        fn and_not;
        fn and_not_to_container;
        fn and_not_cardinality;
    }

    /// Whether the two bitmaps share a set bit. Stops at the first one found.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap64;
    /// let a = EwahBitmap64::bitmap_of(&[3, 70]).unwrap();
    /// assert!(a.intersects(&EwahBitmap64::bitmap_of(&[70]).unwrap()));
    /// assert!(!a.intersects(&EwahBitmap64::bitmap_of(&[71]).unwrap()));
    /// ```
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let mut detector = NonEmptyDetector::new();
        self.and_to_container(other, &mut detector);
        detector.is_non_empty()
    }

    /// Positional composition.
    ///
    /// The `j`-th set bit of `self` is kept if bit `j` of `other` is set; all
    /// other bits are cleared. The result has the size of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let a = EwahBitmap32::bitmap_of(&[1, 3, 4]).unwrap();
    /// let b = EwahBitmap32::bitmap_of(&[1, 2]).unwrap();
    /// // set bits of `a` are numbered 0, 1, 2; `b` keeps numbers 1 and 2
    /// assert_eq!(a.compose(&b).iter().collect::<Vec<_>>(), vec![3, 4]);
    /// ```
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        let mut out = Self::with_capacity(self.size_in_words());
        self.compose_to_container(other, &mut out);
        out
    }

    /// Writes the composition of `self` with `other` into `container`, which
    /// is cleared first.
    pub fn compose_to_container(&self, other: &Self, container: &mut Self) {
        container.clear();
        let mut chunks = self.chunk_iter();
        let mut other_chunks = other.chunk_iter();
        let mut index = 0;
        while let (Some(chunk), Some(other_chunk)) = (chunks.current(), other_chunks.current()) {
            if chunk.bit {
                let length = chunk.len.min(other_chunk.len);
                index += length;
                container.set_size_in_bits(index, other_chunk.bit);
                chunks.advance(length);
                other_chunks.advance(length);
            } else {
                index += chunk.len;
                container.set_size_in_bits(index, false);
                chunks.advance(chunk.len);
            }
        }
        container.set_size_in_bits(self.size_in_bits(), false);
    }

    /// Intersection of every bitmap. A single bitmap is returned as a copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughBitmaps`] if `bitmaps` is empty.
    pub fn and_all(bitmaps: &[&Self]) -> Result<Self> {
        Self::reduce(LogicalOp::AND, bitmaps)
    }

    /// Union of every bitmap. A single bitmap is returned as a copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughBitmaps`] if `bitmaps` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap64;
    /// let a = EwahBitmap64::bitmap_of(&[1]).unwrap();
    /// let b = EwahBitmap64::bitmap_of(&[2]).unwrap();
    /// let c = EwahBitmap64::bitmap_of(&[3]).unwrap();
    /// let all = EwahBitmap64::or_all(&[&a, &b, &c]).unwrap();
    /// assert_eq!(all.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    /// assert!(EwahBitmap64::or_all(&[]).is_err());
    /// ```
    pub fn or_all(bitmaps: &[&Self]) -> Result<Self> {
        Self::reduce(LogicalOp::OR, bitmaps)
    }

    /// Exclusive or of every bitmap: bits set in an odd number of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughBitmaps`] if `bitmaps` is empty.
    pub fn xor_all(bitmaps: &[&Self]) -> Result<Self> {
        Self::reduce(LogicalOp::XOR, bitmaps)
    }

    /// Streams the intersection of every bitmap into `container`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughBitmaps`] for fewer than two bitmaps.
    pub fn and_all_to_container<S>(container: &mut S, bitmaps: &[&Self]) -> Result<()>
    where
        S: BitmapStorage<W> + ?Sized,
    {
        Self::reduce_to_container(LogicalOp::AND, container, bitmaps)
    }

    /// Streams the union of every bitmap into `container`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughBitmaps`] for fewer than two bitmaps.
    pub fn or_all_to_container<S>(container: &mut S, bitmaps: &[&Self]) -> Result<()>
    where
        S: BitmapStorage<W> + ?Sized,
    {
        Self::reduce_to_container(LogicalOp::OR, container, bitmaps)
    }

    /// Streams the exclusive or of every bitmap into `container`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughBitmaps`] for fewer than two bitmaps.
    pub fn xor_all_to_container<S>(container: &mut S, bitmaps: &[&Self]) -> Result<()>
    where
        S: BitmapStorage<W> + ?Sized,
    {
        Self::reduce_to_container(LogicalOp::XOR, container, bitmaps)
    }

    /// Number of bits set in every bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughBitmaps`] if `bitmaps` is empty.
    pub fn and_cardinality_all(bitmaps: &[&Self]) -> Result<usize> {
        Self::reduce_cardinality(LogicalOp::AND, bitmaps)
    }

    /// Number of bits set in at least one bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotEnoughBitmaps`] if `bitmaps` is empty.
    pub fn or_cardinality_all(bitmaps: &[&Self]) -> Result<usize> {
        Self::reduce_cardinality(LogicalOp::OR, bitmaps)
    }

    fn reduce(op: LogicalOp, bitmaps: &[&Self]) -> Result<Self> {
        match bitmaps {
            [] => Err(Error::NotEnoughBitmaps {
                operation: op.name,
                min: 1,
                actual: 0,
            }),
            [only] => Ok((*only).clone()),
            _ => {
                let mut out = Self::with_capacity(largest_word_count(bitmaps));
                Self::reduce_to_container(op, &mut out, bitmaps)?;
                Ok(out)
            }
        }
    }

    fn reduce_cardinality(op: LogicalOp, bitmaps: &[&Self]) -> Result<usize> {
        match bitmaps {
            [] => Err(Error::NotEnoughBitmaps {
                operation: op.name,
                min: 1,
                actual: 0,
            }),
            [only] => Ok(only.cardinality()),
            _ => {
                let mut counter = BitCounter::new();
                Self::reduce_to_container(op, &mut counter, bitmaps)?;
                Ok(counter.count())
            }
        }
    }

    /// Folds `bitmaps` left to right, ping-ponging between two scratch
    /// bitmaps and streaming only the last step into `container`.
    fn reduce_to_container<S>(op: LogicalOp, container: &mut S, bitmaps: &[&Self]) -> Result<()>
    where
        S: BitmapStorage<W> + ?Sized,
    {
        let [first, second, rest @ ..] = bitmaps else {
            return Err(Error::NotEnoughBitmaps {
                operation: op.name,
                min: 2,
                actual: bitmaps.len(),
            });
        };
        let Some((last, middle)) = rest.split_last() else {
            merge(op, first, second, container);
            return Ok(());
        };

        let capacity = largest_word_count(bitmaps);
        let mut acc = Self::with_capacity(capacity);
        let mut scratch = Self::with_capacity(capacity);
        merge(op, first, second, &mut acc);
        for bitmap in middle {
            merge(op, &acc, bitmap, &mut scratch);
            acc.swap(&mut scratch);
        }
        merge(op, &acc, last, container);
        Ok(())
    }
}

fn largest_word_count<W: Word>(bitmaps: &[&EwahBitmap<W>]) -> usize {
    bitmaps.iter().map(|b| b.size_in_words()).max().unwrap_or(0)
}
