/// Splits a bit index into `(word index, bit within word)` for word type `$w`.
macro_rules! bitpos {
    ($w:ty, $idx:expr) => {{
        let idx: usize = $idx;
        let bits = <$w as $crate::word::Word>::BITS as usize;
        (idx / bits, (idx % bits) as u32)
    }};
}

/// Number of words needed to hold `$bits` bits of word type `$w`.
macro_rules! words_for {
    ($w:ty, $bits:expr) => {{
        let bits: usize = $bits;
        bits.div_ceil(<$w as $crate::word::Word>::BITS as usize)
    }};
}

pub(crate) use bitpos;
pub(crate) use words_for;
