//! # asterix-core
//!
//! Runtime primitives for decoding ASTERIX surveillance messages.
//!
//! This crate holds the bit-level machinery shared by the registry and the
//! packet parser; it knows nothing about categories or XML.
//!
//! ## Key components
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`BitCursor`] | Read bit runs from a byte slice, MSB-first |
//! | [`Fspec`] | ASTERIX Field Specification bitmap (variable-length, FX-chained) |
//! | [`FieldValue`] | Decoded value tree produced by the parser |
//! | [`FieldMap`] | Insertion-ordered field-name map used inside [`FieldValue`] |
//! | [`DecodeError`] | Error type for bit-level decode failures |
//!
//! The free functions [`extract_unsigned`], [`extract_signed`] and
//! [`extract_bytes`] translate the 1-based, LSB-counted bit indices used by
//! ASTERIX specifications into MSB-first buffer positions.
//!
//! ## Example
//!
//! ```rust
//! use asterix_core::{BitCursor, Fspec, extract_unsigned};
//!
//! let record = [0x80, 0x01, 0x02];
//! let mut cursor = BitCursor::new(&record);
//!
//! let fspec = Fspec::read(&mut cursor).unwrap();
//! assert_eq!(fspec.frns().collect::<Vec<_>>(), vec![1]);
//!
//! let item = cursor.read_bytes(2).unwrap();
//! assert_eq!(extract_unsigned(item, 16, 9).unwrap(), 1);
//! assert_eq!(extract_unsigned(item, 8, 1).unwrap(), 2);
//! ```

pub mod cursor;
pub mod error;
pub mod fspec;
pub mod value;

pub use cursor::{BitCursor, extract_bytes, extract_signed, extract_unsigned};
pub use error::DecodeError;
pub use fspec::Fspec;
pub use value::{FieldMap, FieldValue};
