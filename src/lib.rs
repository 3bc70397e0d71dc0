//! Compressed bitmaps using Enhanced Word-Aligned Hybrid (EWAH) encoding.
//!
//! This crate provides [`EwahBitmap`], a bitmap stored as a chain of
//! *marker words* (running-length words), each describing a run of uniform
//! words followed by a number of literal words copied verbatim. Sparse and
//! dense regions collapse into runs, so memory and the cost of logical
//! operations grow with the compressed size rather than the bit count.
//!
//! # Features
//!
//! - **Generic word width**: [`EwahBitmap32`] and [`EwahBitmap64`]
//! - **Streaming set algebra** (AND, OR, XOR, AND-NOT) without decompression,
//!   writing into any [`BitmapStorage`] sink
//! - **K-of-N aggregation** with [`EwahBitmap::threshold`]
//! - **In-place random access** with [`EwahBitmap::get`] and
//!   [`EwahBitmap::set`]
//! - **Iterators** over set bits, clear bits, reverse order and runs
//! - **Fixed binary layout** with big- and little-endian codecs, plus serde
//!   support (optional)
//! - **`no_std` support** with `alloc`
//!
//! # Examples
//!
//! ```
//! use ewah_bitmap::EwahBitmap64;
//!
//! // Bits can be set in any order
//! let mut a = EwahBitmap64::new();
//! a.set(10).unwrap();
//! a.set(1_000_000).unwrap();
//! a.set(42).unwrap();
//!
//! assert!(a.get(42));
//! assert!(!a.get(43));
//! assert_eq!(a.cardinality(), 3);
//!
//! // The million-bit gap is a single run
//! assert!(a.size_in_words() < 8);
//!
//! let b = EwahBitmap64::bitmap_of(&[42, 77]).unwrap();
//! let union = a.or(&b);
//! let intersection = &a & &b;
//!
//! assert_eq!(union.iter().collect::<Vec<_>>(), vec![10, 42, 77, 1_000_000]);
//! assert_eq!(intersection.iter().collect::<Vec<_>>(), vec![42]);
//! assert!(a.intersects(&b));
//! ```
//!
//! # Encoding
//!
//! Each marker word keeps the run bit in bit 0, the run length in the next
//! `W / 2` bits and the literal count in the remaining `W / 2 - 1` bits.
//! Longer runs or literal sequences continue in a fresh marker word. The
//! bitmap always appends to its last marker word, so building a bitmap in
//! ascending order costs amortized O(1) per word.
//!
//! # Performance
//!
//! - Appending words or setting ascending bits is amortized O(1)
//! - Logical operations are linear in the compressed sizes of the operands
//! - `get` and out-of-order `set` walk the marker chain, and `set` may splice
//!   the buffer

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

// Module declarations
mod access;
mod bitmap;
mod buffered;
mod cursor;
mod error;
mod iter;
mod macros;
mod rlw;
mod ser;
mod set_ops;
mod sink;
mod storage;
mod threshold;
mod traits;
mod word;

#[cfg(feature = "serde")]
pub mod serde;

// Re-exports
pub use bitmap::{EwahBitmap, EwahBitmap32, EwahBitmap64};
pub use buffered::IteratingRlw;
pub use cursor::{Block, EwahIterator, ReverseEwahIterator};
pub use error::{DecodeError, Error, Result};
pub use iter::{Chunk, ChunkIter, ClearIter, Iter, Positions, ReverseIter};
pub use sink::{BitCounter, BitmapStorage, Halt, NonEmptyDetector, StorageResult};
pub use storage::Buffer;
pub use word::Word;
