//! Fixed binary layout.
//!
//! ```text
//! [size_in_bits: i32][used_words: i32][used_words x word][rlw_position: i32]
//! ```
//!
//! The three header fields are signed 32-bit integers; words are written at
//! their full width. Both fields and words use the byte order of the chosen
//! entry point.

use alloc::{vec, vec::Vec};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;

use crate::{
    bitmap::EwahBitmap,
    error::{DecodeError, Error, Result},
    macros::words_for,
    rlw,
    storage::Buffer,
    word::Word,
};

const FIELD_BYTES: usize = 4;

impl<W: Word> EwahBitmap<W> {
    /// Encodes the bitmap in big-endian byte order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooLargeToEncode`] if a header field exceeds `i32::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ewah_bitmap::EwahBitmap32;
    /// let bitmap = EwahBitmap32::bitmap_of(&[1, 3]).unwrap();
    /// let bytes = bitmap.to_be_bytes().unwrap();
    /// assert_eq!(bytes.len(), bitmap.serialized_size_in_bytes());
    ///
    /// let (decoded, rest) = EwahBitmap32::from_be_bytes(&bytes).unwrap();
    /// assert!(rest.is_empty());
    /// assert_eq!(decoded, bitmap);
    /// ```
    pub fn to_be_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes::<BigEndian>()
    }

    /// Encodes the bitmap in little-endian byte order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooLargeToEncode`] if a header field exceeds `i32::MAX`.
    pub fn to_le_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes::<LittleEndian>()
    }

    /// Decodes a big-endian bitmap from the front of `bytes`, returning it
    /// together with the bytes that follow it.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the input is truncated or does not hold a
    /// well-formed bitmap.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        Self::from_bytes::<BigEndian>(bytes)
    }

    /// Decodes a little-endian bitmap from the front of `bytes`, returning it
    /// together with the bytes that follow it.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the input is truncated or does not hold a
    /// well-formed bitmap.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        Self::from_bytes::<LittleEndian>(bytes)
    }

    fn to_bytes<B: ByteOrder>(&self) -> Result<Vec<u8>> {
        let size_in_bits = header_field("size_in_bits", self.size_in_bits())?;
        let used_words = header_field("used_words", self.size_in_words())?;
        let rlw_position = header_field("rlw_position", self.rlw_position())?;

        let mut out = vec![0u8; self.serialized_size_in_bytes()];
        B::write_i32(&mut out[..FIELD_BYTES], size_in_bits);
        B::write_i32(&mut out[FIELD_BYTES..2 * FIELD_BYTES], used_words);
        let body = &mut out[2 * FIELD_BYTES..];
        for (chunk, &word) in body.chunks_exact_mut(W::BYTES).zip(self.words()) {
            word.write_to::<B>(chunk);
        }
        let tail = out.len() - FIELD_BYTES;
        B::write_i32(&mut out[tail..], rlw_position);
        Ok(out)
    }

    fn from_bytes<B: ByteOrder>(bytes: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (size_in_bits, rest) = read_field::<B>(bytes, "size_in_bits")?;
        let (used_words, rest) = read_field::<B>(rest, "used_words")?;
        let needed = used_words.saturating_mul(W::BYTES);
        if rest.len() < needed {
            return Err(reject(DecodeError::Truncated {
                needed,
                available: rest.len(),
            }));
        }
        let (body, rest) = rest.split_at(needed);
        let words = body.chunks_exact(W::BYTES).map(W::read_from::<B>).collect();
        let (rlw_position, rest) = read_field::<B>(rest, "rlw_position")?;
        let bitmap = Self::from_decoded(size_in_bits, words, rlw_position)?;
        Ok((bitmap, rest))
    }

    /// Checks a decoded layout against the invariants of the encoding before
    /// adopting it.
    fn from_decoded(size_in_bits: usize, words: Vec<W>, rlw_position: usize) -> Result<Self, DecodeError> {
        if words.is_empty() {
            return Err(reject(DecodeError::Corrupt("no marker word")));
        }

        let mut pos = 0;
        let mut last_marker = 0;
        // the last marker that stands for at least one word
        let mut last_block = None;
        let mut implied_words = 0;
        while pos < words.len() {
            let size = rlw::size(&words, pos);
            if size > 0 {
                last_block = Some(pos);
            }
            implied_words += size;
            last_marker = pos;
            pos += 1 + rlw::literal_count(&words, pos);
        }
        if pos != words.len() {
            return Err(reject(DecodeError::Corrupt("literal words run past the buffer")));
        }
        if rlw_position != last_marker {
            return Err(reject(DecodeError::Corrupt("rlw position is not the last marker")));
        }
        if implied_words != words_for!(W, size_in_bits) {
            return Err(reject(DecodeError::Corrupt("word count does not match size_in_bits")));
        }
        if last_block.is_some_and(|marker| !tail_is_clear(&words, marker, size_in_bits)) {
            return Err(reject(DecodeError::Corrupt("bits set past size_in_bits")));
        }

        Ok(Self::from_parts(Buffer::from_words(words), rlw_position, size_in_bits))
    }
}

#[cfg(feature = "std")]
impl<W: Word> EwahBitmap<W> {
    /// Writes the big-endian layout to `writer`.
    ///
    /// # Errors
    ///
    /// Returns the writer's error, or [`std::io::ErrorKind::InvalidInput`]
    /// if the bitmap does not fit the layout.
    pub fn serialize_into<Wr: std::io::Write>(&self, mut writer: Wr) -> std::io::Result<()> {
        let bytes = self
            .to_be_bytes()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
        writer.write_all(&bytes)
    }

    /// Reads one big-endian bitmap from `reader`, consuming exactly its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Io`] if the reader fails or ends early, or
    /// another [`DecodeError`] if the layout is malformed.
    pub fn deserialize_from<R: std::io::Read>(mut reader: R) -> Result<Self, DecodeError> {
        use std::io::Read;

        use byteorder::ReadBytesExt;

        let size_in_bits = non_negative("size_in_bits", reader.read_i32::<BigEndian>()?)?;
        let used_words = non_negative("used_words", reader.read_i32::<BigEndian>()?)?;
        let needed = used_words.saturating_mul(W::BYTES);
        // the declared length is not trusted for allocation
        let mut body = Vec::new();
        reader.by_ref().take(needed as u64).read_to_end(&mut body)?;
        if body.len() < needed {
            return Err(reject(DecodeError::Truncated {
                needed,
                available: body.len(),
            }));
        }
        let words = body.chunks_exact(W::BYTES).map(W::read_from::<BigEndian>).collect();
        let rlw_position = non_negative("rlw_position", reader.read_i32::<BigEndian>()?)?;
        Self::from_decoded(size_in_bits, words, rlw_position)
    }
}

/// Whether the last word of the block at `marker` holds no bits at or past
/// `size_in_bits`.
fn tail_is_clear<W: Word>(words: &[W], marker: usize, size_in_bits: usize) -> bool {
    let used = (size_in_bits % W::BITS as usize) as u32;
    if used == 0 {
        return true;
    }
    match rlw::literal_count(words, marker) {
        0 => !rlw::running_bit(words, marker),
        count => words[marker + count] & !W::low_mask(used) == W::ZERO,
    }
}

fn header_field(field: &'static str, value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::TooLargeToEncode { field, value })
}

fn read_field<'a, B: ByteOrder>(bytes: &'a [u8], field: &'static str) -> Result<(usize, &'a [u8]), DecodeError> {
    if bytes.len() < FIELD_BYTES {
        return Err(reject(DecodeError::Truncated {
            needed: FIELD_BYTES,
            available: bytes.len(),
        }));
    }
    let (head, rest) = bytes.split_at(FIELD_BYTES);
    Ok((non_negative(field, B::read_i32(head))?, rest))
}

fn non_negative(field: &'static str, value: i32) -> Result<usize, DecodeError> {
    usize::try_from(value).map_err(|_| reject(DecodeError::NegativeField { field, value }))
}

fn reject(err: DecodeError) -> DecodeError {
    debug!("rejecting encoded bitmap: {err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EwahBitmap32, EwahBitmap64};

    #[test]
    fn test_layout_is_bit_exact() {
        let mut bitmap = EwahBitmap32::new();
        bitmap.add_literal_word(1);
        bitmap.add_literal_word(2);
        assert_eq!(bitmap.words(), &[rlw::encode::<u32>(false, 0, 2), 1, 2]);
        let bytes = bitmap.to_be_bytes().unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&64i32.to_be_bytes());
        expected.extend_from_slice(&3i32.to_be_bytes());
        expected.extend_from_slice(&rlw::encode::<u32>(false, 0, 2).to_be_bytes());
        expected.extend_from_slice(&1u32.to_be_bytes());
        expected.extend_from_slice(&2u32.to_be_bytes());
        expected.extend_from_slice(&0i32.to_be_bytes());
        assert_eq!(bytes, expected);

        let le = bitmap.to_le_bytes().unwrap();
        assert_eq!(&le[..4], &64i32.to_le_bytes());
        assert_eq!(le.len(), bytes.len());
    }

    #[test]
    fn test_decode_returns_trailing_bytes() {
        let bitmap = EwahBitmap64::bitmap_of(&[5, 1_000, 70_000]).unwrap();
        let mut bytes = bitmap.to_le_bytes().unwrap();
        bytes.extend_from_slice(b"tail");
        let (decoded, rest) = EwahBitmap64::from_le_bytes(&bytes).unwrap();
        assert_eq!(rest, b"tail");
        assert_eq!(decoded.words(), bitmap.words());
        assert_eq!(decoded.size_in_bits(), bitmap.size_in_bits());
        assert_eq!(decoded.rlw_position(), bitmap.rlw_position());
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let bytes = EwahBitmap32::bitmap_of(&[3]).unwrap().to_be_bytes().unwrap();
        for len in 0..bytes.len() {
            assert!(
                matches!(
                    EwahBitmap32::from_be_bytes(&bytes[..len]),
                    Err(DecodeError::Truncated { .. })
                ),
                "prefix of {len} bytes"
            );
        }
    }

    #[test]
    fn test_decode_rejects_negative_fields() {
        let mut bytes = EwahBitmap32::new().to_be_bytes().unwrap();
        bytes[..4].copy_from_slice(&(-1i32).to_be_bytes());
        assert!(matches!(
            EwahBitmap32::from_be_bytes(&bytes),
            Err(DecodeError::NegativeField {
                field: "size_in_bits",
                value: -1
            })
        ));
    }

    #[test]
    fn test_decode_rejects_inconsistent_chains() {
        let bitmap = EwahBitmap32::bitmap_of(&[0, 100]).unwrap();
        let good = bitmap.to_be_bytes().unwrap();

        // size that needs one more word than the chain provides
        let mut bytes = good.clone();
        bytes[..4].copy_from_slice(&(bitmap.size_in_bits() as i32 + 32).to_be_bytes());
        assert!(matches!(EwahBitmap32::from_be_bytes(&bytes), Err(DecodeError::Corrupt(_))));

        // write cursor pointing at a literal
        let mut bytes = good.clone();
        let tail = bytes.len() - 4;
        bytes[tail..].copy_from_slice(&1i32.to_be_bytes());
        assert!(matches!(EwahBitmap32::from_be_bytes(&bytes), Err(DecodeError::Corrupt(_))));

        // first marker claims more literals than stored
        let mut bytes = good;
        bytes[8..12].copy_from_slice(&rlw::encode::<u32>(false, 0, 9).to_be_bytes());
        assert!(matches!(EwahBitmap32::from_be_bytes(&bytes), Err(DecodeError::Corrupt(_))));

        // a run of ones covering a partial last word
        let mut ones = Vec::new();
        ones.extend_from_slice(&5i32.to_be_bytes());
        ones.extend_from_slice(&1i32.to_be_bytes());
        ones.extend_from_slice(&rlw::encode::<u32>(true, 1, 0).to_be_bytes());
        ones.extend_from_slice(&0i32.to_be_bytes());
        assert!(matches!(
            EwahBitmap32::from_be_bytes(&ones),
            Err(DecodeError::Corrupt("bits set past size_in_bits"))
        ));

        // a literal with bits above the size
        let mut literal = Vec::new();
        literal.extend_from_slice(&5i32.to_be_bytes());
        literal.extend_from_slice(&2i32.to_be_bytes());
        literal.extend_from_slice(&rlw::encode::<u32>(false, 0, 1).to_be_bytes());
        literal.extend_from_slice(&0b10_0001u32.to_be_bytes());
        literal.extend_from_slice(&0i32.to_be_bytes());
        assert!(matches!(
            EwahBitmap32::from_be_bytes(&literal),
            Err(DecodeError::Corrupt("bits set past size_in_bits"))
        ));

        // the same literal within the size is accepted and counts consistently
        literal[12..16].copy_from_slice(&0b1_0001u32.to_be_bytes());
        let (decoded, _) = EwahBitmap32::from_be_bytes(&literal).unwrap();
        assert_eq!(decoded.cardinality(), decoded.iter().count());
        assert_eq!(decoded.iter().collect::<Vec<_>>(), [0, 4]);

        let mut empty = Vec::new();
        empty.extend_from_slice(&0i32.to_be_bytes());
        empty.extend_from_slice(&0i32.to_be_bytes());
        empty.extend_from_slice(&0i32.to_be_bytes());
        assert!(matches!(EwahBitmap32::from_be_bytes(&empty), Err(DecodeError::Corrupt(_))));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_io_round_trip() {
        let bitmap = EwahBitmap64::bitmap_of(&[1, 2, 64, 4_096]).unwrap();
        let mut sink = Vec::new();
        bitmap.serialize_into(&mut sink).unwrap();
        bitmap.serialize_into(&mut sink).unwrap();
        assert_eq!(sink, [bitmap.to_be_bytes().unwrap(), bitmap.to_be_bytes().unwrap()].concat());

        let mut reader = sink.as_slice();
        let first = EwahBitmap64::deserialize_from(&mut reader).unwrap();
        let second = EwahBitmap64::deserialize_from(&mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(first, bitmap);
        assert_eq!(second.iter().collect::<Vec<_>>(), [1, 2, 64, 4_096]);

        assert!(matches!(
            EwahBitmap64::deserialize_from(&[0u8; 6][..]),
            Err(DecodeError::Io(_))
        ));
    }
}
