//! Decoded output structures and parse options.

use asterix_core::FieldValue;
use serde::Serialize;

use crate::error::AsterixError;

/// Options controlling a parse call.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Resolve item names into the decoded tree and let renderers show
    /// field meanings and units.
    pub verbose: bool,

    /// Only decode blocks of this category; others are skipped (their
    /// bytes are still consumed).
    pub filter_category: Option<u8>,

    /// Stop decoding after this many records across all blocks.
    pub max_records: Option<usize>,
}

/// One decoded data block: the category-tagged, length-prefixed unit on
/// the wire.
#[derive(Debug, Clone, Serialize)]
pub struct DataBlock {
    pub category: u8,

    /// Total block length as declared on the wire, header included.
    pub length: u16,

    /// Milliseconds since the Unix epoch. The parser has no clock; it
    /// stamps 0 and transports overwrite it when they know better.
    pub timestamp_ms: u64,

    /// Lowercase hex of the raw block bytes, header included.
    pub hex_data: String,

    pub records: Vec<DataRecord>,
}

impl DataBlock {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// One decoded data record. Items appear in FRN order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataRecord {
    pub items: Vec<DecodedItem>,

    /// True when decoding stopped partway through the record. The decoded
    /// prefix is still valid; `error` says what went wrong.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DataRecord {
    pub fn get_item(&self, id: &str) -> Option<&DecodedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn has_item(&self, id: &str) -> bool {
        self.get_item(id).is_some()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// One decoded data item, labelled `I<cat>/<id>`.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedItem {
    /// Full item label, e.g. `"I048/010"`.
    pub id: String,

    /// Item name from the category definition; populated in verbose mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub value: FieldValue,
}

/// Everything a [`parse`](crate::Decoder::parse) call produced: the decoded
/// blocks plus every error met along the way. Neither list is ever silently
/// dropped in favour of the other.
#[derive(Debug, Default)]
pub struct ParseOutput {
    pub blocks: Vec<DataBlock>,
    pub errors: Vec<AsterixError>,
}

impl ParseOutput {
    pub fn records(&self) -> impl Iterator<Item = &DataRecord> {
        self.blocks.iter().flat_map(|b| b.records.iter())
    }

    pub fn record_count(&self) -> usize {
        self.blocks.iter().map(|b| b.records.len()).sum()
    }
}

/// Result of incremental parsing via
/// [`parse_with_offset`](crate::Decoder::parse_with_offset).
#[derive(Debug, Default)]
pub struct ParseResult {
    pub blocks: Vec<DataBlock>,

    /// Bytes consumed from the input, always a whole number of blocks.
    /// Add to the previous offset to resume.
    pub bytes_consumed: usize,

    /// Best-effort count of blocks left after `bytes_consumed`, obtained by
    /// hopping LEN fields without decoding.
    pub remaining_blocks: usize,

    pub errors: Vec<AsterixError>,
}

impl ParseResult {
    pub fn record_count(&self) -> usize {
        self.blocks.iter().map(|b| b.records.len()).sum()
    }
}

pub(crate) fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
