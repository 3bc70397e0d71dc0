//! Serde implementations for `EwahBitmap`.
//!
//! The default implementation writes the little-endian binary layout, as
//! bytes for binary formats and as base64 text for human-readable ones. The
//! modules below can be used with `#[serde(with = "...")]` to pick another
//! representation.

use alloc::vec::Vec;
use core::{fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
    ser::{self, SerializeSeq},
};

use crate::{EwahBitmap, error::DecodeError, word::Word};

/// Module for serializing and deserializing [`EwahBitmap`] as a sorted set of
/// positions.
pub mod sorted_set {
    use super::*;

    /// Serialize the [`EwahBitmap`] as an ascending sequence of positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails to serialize the sequence.
    pub fn serialize<W, S>(b: &EwahBitmap<W>, serializer: S) -> Result<S::Ok, S::Error>
    where
        W: Word,
        S: Serializer,
    {
        positions::serialize(b, serializer)
    }

    /// Deserialize an [`EwahBitmap`] from a strictly ascending sequence of
    /// positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is not strictly ascending or holds a
    /// position the bitmap cannot address.
    pub fn deserialize<'de, W, D>(deserializer: D) -> Result<EwahBitmap<W>, D::Error>
    where
        W: Word,
        D: Deserializer<'de>,
    {
        positions::deserialize(deserializer, positions::Order::Strict)
    }
}

/// Module for serializing and deserializing [`EwahBitmap`] as an unordered set
/// of positions.
pub mod unordered_set {
    use super::*;

    /// Serialize the [`EwahBitmap`] as a sequence of positions. The output is
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails to serialize the sequence.
    pub fn serialize<W, S>(b: &EwahBitmap<W>, serializer: S) -> Result<S::Ok, S::Error>
    where
        W: Word,
        S: Serializer,
    {
        positions::serialize(b, serializer)
    }

    /// Deserialize an [`EwahBitmap`] from positions in any order, duplicates
    /// allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if a position is beyond what the bitmap can address.
    pub fn deserialize<'de, W, D>(deserializer: D) -> Result<EwahBitmap<W>, D::Error>
    where
        W: Word,
        D: Deserializer<'de>,
    {
        positions::deserialize(deserializer, positions::Order::Any)
    }
}

/// Bitmaps as sequences of set positions, built through
/// [`EwahBitmap::bitmap_of`] after the positions are brought into ascending
/// order.
mod positions {
    use super::*;

    #[derive(Clone, Copy)]
    pub enum Order {
        /// Positions must arrive strictly ascending.
        Strict,
        /// Positions may arrive in any order and repeat.
        Any,
    }

    pub fn serialize<W, S>(b: &EwahBitmap<W>, serializer: S) -> Result<S::Ok, S::Error>
    where
        W: Word,
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(b.cardinality()))?;
        for pos in b {
            seq.serialize_element(&pos)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, W, D>(deserializer: D, order: Order) -> Result<EwahBitmap<W>, D::Error>
    where
        W: Word,
        D: Deserializer<'de>,
    {
        struct PositionsVisitor<W>(Order, PhantomData<W>);

        impl<'de, W: Word> Visitor<'de> for PositionsVisitor<W> {
            type Value = EwahBitmap<W>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                match self.0 {
                    Order::Strict => formatter.write_str("a sorted sequence of bit positions"),
                    Order::Any => formatter.write_str("a sequence of bit positions"),
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(pos) = seq.next_element::<usize>()? {
                    list.push(pos);
                }
                match self.0 {
                    Order::Strict => {
                        if let Some(pair) = list.windows(2).find(|pair| pair[0] >= pair[1]) {
                            return Err(de::Error::invalid_value(
                                de::Unexpected::Unsigned(pair[1] as u64),
                                &"sorted sequence",
                            ));
                        }
                    }
                    Order::Any => {
                        list.sort_unstable();
                        list.dedup();
                    }
                }
                EwahBitmap::bitmap_of(&list).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_seq(PositionsVisitor(order, PhantomData))
    }
}

/// Macro to implement byte-based serialization and deserialization for
/// [`EwahBitmap`].
macro_rules! impl_bytes {
    ($mod:ident, $from_fn:ident, $to_fn:ident, $doc:literal) => {
        #[doc = $doc]
        pub mod $mod {
            use super::*;

            /// Serialize the [`EwahBitmap`] in its binary layout.
            ///
            /// # Errors
            ///
            /// Returns an error if the bitmap does not fit the layout or the
            /// serializer fails.
            pub fn serialize<W, S>(b: &EwahBitmap<W>, serializer: S) -> Result<S::Ok, S::Error>
            where
                W: Word,
                S: Serializer,
            {
                let bytes = b.$to_fn().map_err(ser::Error::custom)?;
                binser::serialize(&bytes, serializer)
            }

            /// Deserialize an [`EwahBitmap`] from its binary layout.
            ///
            /// # Errors
            ///
            /// Returns an error if the bytes are not exactly one well-formed
            /// bitmap.
            pub fn deserialize<'de, W, D>(deserializer: D) -> Result<EwahBitmap<W>, D::Error>
            where
                W: Word,
                D: Deserializer<'de>,
            {
                binser::deserialize(deserializer, EwahBitmap::<W>::$from_fn)
            }
        }
    };
}

impl_bytes!(
    le_bytes,
    from_le_bytes,
    to_le_bytes,
    "Serialize and deserialize [`EwahBitmap`] using little-endian byte order."
);
impl_bytes!(
    be_bytes,
    from_be_bytes,
    to_be_bytes,
    "Serialize and deserialize [`EwahBitmap`] using big-endian byte order."
);

impl<W: Word> Serialize for EwahBitmap<W> {
    /// Serialize the [`EwahBitmap`] using little-endian byte order.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        le_bytes::serialize(self, serializer)
    }
}

impl<'de, W: Word> Deserialize<'de> for EwahBitmap<W> {
    /// Deserialize an [`EwahBitmap`] using little-endian byte order.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        le_bytes::deserialize(deserializer)
    }
}

/// Helper module for base64 serialization
mod binser {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            let encoded = data_encoding::BASE64.encode(bytes);
            serializer.serialize_str(&encoded)
        } else {
            serializer.serialize_bytes(bytes)
        }
    }

    pub fn deserialize<'de, W, D, P>(deserializer: D, parse: P) -> Result<EwahBitmap<W>, D::Error>
    where
        W: Word,
        D: Deserializer<'de>,
        P: FnOnce(&[u8]) -> Result<(EwahBitmap<W>, &[u8]), DecodeError>,
    {
        struct BytesVisitor<W, P>(P, PhantomData<W>);

        impl<W, P> BytesVisitor<W, P>
        where
            W: Word,
            P: FnOnce(&[u8]) -> Result<(EwahBitmap<W>, &[u8]), DecodeError>,
        {
            fn parse_exact<E: de::Error>(self, bytes: &[u8]) -> Result<EwahBitmap<W>, E> {
                let (bitmap, leftover) = (self.0)(bytes).map_err(E::custom)?;
                if !leftover.is_empty() {
                    return Err(E::invalid_length(bytes.len(), &"exactly one encoded bitmap"));
                }
                Ok(bitmap)
            }
        }

        impl<'de, W, P> Visitor<'de> for BytesVisitor<W, P>
        where
            W: Word,
            P: FnOnce(&[u8]) -> Result<(EwahBitmap<W>, &[u8]), DecodeError>,
        {
            type Value = EwahBitmap<W>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("bytes representation of a compressed bitmap")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let decoded = data_encoding::BASE64
                    .decode(v.as_bytes())
                    .map_err(E::custom)?;
                self.parse_exact(&decoded)
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                self.parse_exact(v)
            }
        }

        let visitor = BytesVisitor(parse, PhantomData);
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(visitor)
        } else {
            deserializer.deserialize_bytes(visitor)
        }
    }
}
