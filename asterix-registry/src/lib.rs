//! # asterix-registry
//!
//! Category definitions for ASTERIX decoding, loaded from XML.
//!
//! A category file describes one ASTERIX category: its User Application
//! Profiles (the FRN-to-item mapping of a record) and the format descriptor
//! of every data item. This crate deserializes those files, validates them,
//! and exposes the result as an immutable [`CategoryRegistry`] that the
//! packet parser reads while decoding.
//!
//! The pipeline is parse, transform, register:
//!
//! - [`xml_model`]: serde mirror of the document structure
//! - [`transform`]: validation into the runtime [`model`]
//! - [`registry`]: the loaded, deduplicated category set with lookups
//!
//! Load errors are fatal to the registry build; no partially-validated
//! category is ever observable.

pub mod error;
pub mod model;
pub mod parser;
pub mod registry;
pub mod transform;
pub mod xml_model;

pub use error::{LoadError, TransformError};
pub use model::{
    Bds, BitField, Category, Compound, DataItem, Encoding, Explicit, Fixed, Format, Repetitive,
    Rule, Subfield, Uap, UapSelector, UapSlot, Variable,
};
pub use registry::CategoryRegistry;
