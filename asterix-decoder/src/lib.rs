//! Data-driven decoder for the ASTERIX ATM surveillance protocol.
//!
//! ASTERIX (All-Purpose Structured EUROCONTROL Surveillance Information
//! Exchange) is a compact, bit-packed binary protocol used for Air Traffic
//! Management surveillance data exchange: radar plots, tracks, ADS-B
//! reports, system status. This crate interprets category definitions
//! loaded from XML at runtime and decodes arbitrary byte frames into
//! structured records, which it can re-emit as text, JSON or XML.
//!
//! # Thread safety
//!
//! The registry is immutable after load and shared behind an [`Arc`],
//! so any number of threads can parse concurrently through clones of one
//! [`Decoder`]. The convenience free functions guard their process-default
//! handle with a lock that is written only by [`init`]/[`load_category`].
//!
//! [`Arc`]: std::sync::Arc
//!
//! # Quick start
//!
//! ```no_run
//! use asterix_decoder::{Decoder, ParseOptions};
//!
//! # fn main() -> Result<(), asterix_decoder::AsterixError> {
//! let decoder = Decoder::from_config_dir("config/")?;
//!
//! let data = std::fs::read("sample.asterix").expect("readable capture");
//! let output = decoder.parse(&data, &ParseOptions::default());
//!
//! for block in &output.blocks {
//!     println!("CAT{:03}: {} records", block.category, block.records.len());
//!     for record in &block.records {
//!         if let Some(item) = record.get_item("I048/010") {
//!             println!("  source: {:?}", item.value);
//!         }
//!     }
//! }
//! for err in &output.errors {
//!     eprintln!("decode problem: {err}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Incremental parsing
//!
//! For large captures, [`Decoder::parse_with_offset`] decodes a bounded
//! number of blocks per call and always stops on a block boundary:
//!
//! ```no_run
//! use asterix_decoder::{Decoder, ParseOptions};
//!
//! # fn main() -> Result<(), asterix_decoder::AsterixError> {
//! # let decoder = Decoder::from_config_dir("config/")?;
//! # let data: Vec<u8> = Vec::new();
//! let mut offset = 0;
//! loop {
//!     let result = decoder.parse_with_offset(&data, offset, 100, &ParseOptions::default());
//!     offset += result.bytes_consumed;
//!     if result.remaining_blocks == 0 || result.bytes_consumed == 0 {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Metadata queries
//!
//! [`Decoder::describe`] answers "what does this mean?" at four levels:
//!
//! ```no_run
//! # fn main() -> Result<(), asterix_decoder::AsterixError> {
//! # let decoder = asterix_decoder::Decoder::from_config_dir("config/")?;
//! decoder.describe(62, None, None, None)?;                              // category
//! decoder.describe(62, Some("010"), None, None)?;                       // item
//! decoder.describe(62, Some("010"), Some("SAC"), None)?;                // field
//! decoder.describe(62, Some("010"), Some("SAC"), Some("1"))?;           // value
//! # Ok(())
//! # }
//! ```

pub mod decoder;
mod describe;
pub mod error;
mod parse;
pub mod render;
pub mod types;

pub use asterix_core::{FieldMap, FieldValue};
pub use asterix_registry::CategoryRegistry;
pub use decoder::{
    Decoder, describe, init, is_category_defined, load_category, parse, parse_with_offset,
};
pub use error::AsterixError;
pub use render::OutputFormat;
pub use types::{
    DataBlock, DataRecord, DecodedItem, ParseOptions, ParseOutput, ParseResult,
};
