//! Data-block framing and record segmentation.
//!
//! A frame is a concatenation of blocks, each `CAT (1) | LEN (2, big-endian,
//! header inclusive) | records`. Structural damage (inconsistent LEN) ends
//! the scan because no later byte can be trusted as a block boundary;
//! an unknown category only skips its own block. Inside a block, an item
//! failure ends that record and skips the rest of the block, since record
//! boundaries are not self-describing.

use asterix_core::{BitCursor, FieldValue, Fspec};
use asterix_registry::{Category, CategoryRegistry, Uap};
use log::debug;

use crate::error::AsterixError;
use crate::parse::item::parse_format;
use crate::types::{DataBlock, DataRecord, DecodedItem, ParseOptions, hex_string};

/// Size of the CAT + LEN block header.
const BLOCK_HEADER_LEN: usize = 3;

pub(crate) struct FrameOutput {
    pub blocks: Vec<DataBlock>,
    pub errors: Vec<AsterixError>,
    pub bytes_consumed: usize,
}

pub(crate) fn parse_frames(
    registry: &CategoryRegistry,
    data: &[u8],
    offset: usize,
    max_blocks: Option<usize>,
    opts: &ParseOptions,
) -> FrameOutput {
    let mut blocks = Vec::new();
    let mut errors = Vec::new();
    let mut pos = offset.min(data.len());
    let mut records_left = opts.max_records;

    while pos < data.len() {
        if max_blocks.is_some_and(|max| blocks.len() >= max) {
            break;
        }
        if records_left == Some(0) {
            break;
        }

        let remaining = data.len() - pos;
        if remaining < BLOCK_HEADER_LEN {
            errors.push(AsterixError::MalformedBlock {
                offset: pos,
                detail: format!("{remaining} trailing bytes, too short for a block header"),
            });
            break;
        }
        let cat = data[pos];
        let len = u16::from_be_bytes([data[pos + 1], data[pos + 2]]) as usize;
        if len < BLOCK_HEADER_LEN {
            errors.push(AsterixError::MalformedBlock {
                offset: pos,
                detail: format!("declared length {len} is below the {BLOCK_HEADER_LEN}-byte header"),
            });
            break;
        }
        if len > remaining {
            errors.push(AsterixError::MalformedBlock {
                offset: pos,
                detail: format!("declared length {len} exceeds the {remaining} bytes remaining"),
            });
            break;
        }

        let block_bytes = &data[pos..pos + len];
        let Some(category) = registry.category(cat) else {
            errors.push(AsterixError::InvalidCategory {
                cat,
                reason: "no definition loaded".into(),
            });
            pos += len;
            continue;
        };
        if opts.filter_category.is_some_and(|want| want != cat) {
            debug!("skipping CAT{cat:03} block at {pos}: filtered");
            pos += len;
            continue;
        }

        let (records, mut record_errors) = parse_block_records(
            category,
            &block_bytes[BLOCK_HEADER_LEN..],
            pos + BLOCK_HEADER_LEN,
            opts,
            &mut records_left,
        );
        errors.append(&mut record_errors);
        blocks.push(DataBlock {
            category: cat,
            length: len as u16,
            timestamp_ms: 0,
            hex_data: hex_string(block_bytes),
            records,
        });
        pos += len;
    }

    FrameOutput {
        blocks,
        errors,
        bytes_consumed: pos - offset.min(data.len()),
    }
}

/// Counts the blocks after `offset` by hopping LEN fields, without decoding.
pub(crate) fn estimate_blocks(data: &[u8], offset: usize) -> usize {
    let mut pos = offset;
    let mut count = 0;
    while pos + BLOCK_HEADER_LEN <= data.len() {
        let len = u16::from_be_bytes([data[pos + 1], data[pos + 2]]) as usize;
        if len < BLOCK_HEADER_LEN || pos + len > data.len() {
            break;
        }
        count += 1;
        pos += len;
    }
    count
}

fn parse_block_records(
    category: &Category,
    payload: &[u8],
    payload_offset: usize,
    opts: &ParseOptions,
    records_left: &mut Option<usize>,
) -> (Vec<DataRecord>, Vec<AsterixError>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut cursor = BitCursor::new(payload);

    while cursor.remaining_bits() >= 8 {
        if *records_left == Some(0) {
            debug!(
                "record limit reached, skipping the rest of the CAT{:03} block",
                category.id
            );
            break;
        }

        let fspec = match Fspec::read(&mut cursor) {
            Ok(f) => f,
            Err(e) => {
                errors.push(AsterixError::MalformedBlock {
                    offset: payload_offset + cursor.byte_pos(),
                    detail: format!("FSPEC ran past the end of the block: {e}"),
                });
                break;
            }
        };

        let Some(uap) = category.select_uap(cursor.peek_byte()) else {
            errors.push(AsterixError::InvalidCategory {
                cat: category.id,
                reason: "category declares no UAP".into(),
            });
            break;
        };

        let (record, failed) = parse_record(category, uap, &fspec, &mut cursor, opts, &mut errors);
        let keep = !record.items.is_empty() || !failed;
        if keep {
            records.push(record);
            if let Some(left) = records_left {
                *left -= 1;
            }
        }
        if failed {
            // No way to find the next record boundary after a bad item.
            break;
        }
    }

    (records, errors)
}

fn parse_record(
    category: &Category,
    uap: &Uap,
    fspec: &Fspec,
    cursor: &mut BitCursor<'_>,
    opts: &ParseOptions,
    errors: &mut Vec<AsterixError>,
) -> (DataRecord, bool) {
    let mut record = DataRecord::default();

    for frn in fspec.frns() {
        let slot = match uap.slot(frn) {
            Some(s) if s.is_extender => continue,
            Some(s) => s,
            None => {
                let err = AsterixError::InvalidCategory {
                    cat: category.id,
                    reason: format!("FSPEC bit set for FRN {frn}, which the UAP does not define"),
                };
                record.partial = true;
                record.error = Some(err.to_string());
                errors.push(err);
                return (record, true);
            }
        };
        let Some(item_id) = &slot.item_id else {
            let err = AsterixError::InvalidCategory {
                cat: category.id,
                reason: format!("FSPEC bit set for spare FRN {frn}"),
            };
            record.partial = true;
            record.error = Some(err.to_string());
            errors.push(err);
            return (record, true);
        };
        let label = format!("I{:03}/{}", category.id, item_id);

        if slot.is_presence_only {
            record.items.push(DecodedItem {
                id: label,
                description: None,
                value: FieldValue::BitFlag(true),
            });
            continue;
        }

        let Some(item) = category.item(item_id) else {
            // The transform guarantees UAP references resolve.
            let err = AsterixError::Internal(format!("registry lost item {label}"));
            record.partial = true;
            record.error = Some(err.to_string());
            errors.push(err);
            return (record, true);
        };

        match parse_format(&label, &item.format, cursor) {
            Ok(value) => record.items.push(DecodedItem {
                id: label,
                description: opts.verbose.then(|| item.name.clone()),
                value,
            }),
            Err(err) => {
                record.partial = true;
                record.error = Some(err.to_string());
                errors.push(err);
                return (record, true);
            }
        }
    }

    (record, false)
}
