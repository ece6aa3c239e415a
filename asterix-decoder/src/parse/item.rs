//! Parsers for the six item format kinds.
//!
//! Each parser consumes exactly the bytes its descriptor prescribes and
//! produces a [`FieldValue`] tree mirroring the descriptor's shape. Errors
//! are reported against the full item label (`I048/010`) so the record-level
//! containment in the packet parser can surface them verbatim.

use asterix_core::{BitCursor, FieldMap, FieldValue};
use asterix_registry::{Bds, Compound, Encoding, Explicit, Fixed, Format, Repetitive, Variable};
use log::debug;

use crate::error::AsterixError;
use crate::parse::encoding::decode_bitfield;
use crate::types::hex_string;

pub(crate) fn parse_format(
    label: &str,
    format: &Format,
    cursor: &mut BitCursor<'_>,
) -> Result<FieldValue, AsterixError> {
    match format {
        Format::Fixed(f) => parse_fixed(f, cursor),
        Format::Variable(v) => parse_variable(label, v, cursor),
        Format::Repetitive(r) => parse_repetitive(r, cursor),
        Format::Compound(c) => parse_compound(label, c, cursor),
        Format::Explicit(e) => parse_explicit(label, e, cursor),
        Format::Bds(b) => parse_bds(b, cursor),
    }
}

fn parse_fixed(fixed: &Fixed, cursor: &mut BitCursor<'_>) -> Result<FieldValue, AsterixError> {
    let bytes = cursor.read_bytes(fixed.length)?;
    Ok(FieldValue::Nested(decode_fields(fixed, bytes)?))
}

/// Decodes every reportable field of a fixed layout. Spare ranges and
/// declared FX bits carry no information and are skipped.
fn decode_fields(fixed: &Fixed, bytes: &[u8]) -> Result<FieldMap, AsterixError> {
    let mut map = FieldMap::new();
    for field in &fixed.fields {
        if field.encoding == Encoding::Spare || field.name == "FX" {
            continue;
        }
        map.insert(field.name.clone(), decode_bitfield(field, bytes)?);
    }
    Ok(map)
}

fn parse_variable(
    label: &str,
    variable: &Variable,
    cursor: &mut BitCursor<'_>,
) -> Result<FieldValue, AsterixError> {
    let mut extents = Vec::new();
    let mut idx = 0;
    loop {
        if idx == variable.parts.len() {
            debug!("{label}: more extents than declared parts, reusing the last layout");
        }
        let part = &variable.parts[idx.min(variable.parts.len() - 1)];
        let bytes = cursor.read_bytes(part.length)?;
        extents.push(FieldValue::Nested(decode_fields(part, bytes)?));
        // The LSB of the last byte of each part is the FX extension bit.
        if bytes[part.length - 1] & 0x01 == 0 {
            break;
        }
        idx += 1;
    }
    Ok(FieldValue::Array(extents))
}

fn parse_repetitive(
    repetitive: &Repetitive,
    cursor: &mut BitCursor<'_>,
) -> Result<FieldValue, AsterixError> {
    let count = cursor.read_u8()? as usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let bytes = cursor.read_bytes(repetitive.element.length)?;
        out.push(FieldValue::Nested(decode_fields(&repetitive.element, bytes)?));
    }
    Ok(FieldValue::Array(out))
}

fn parse_compound(
    label: &str,
    compound: &Compound,
    cursor: &mut BitCursor<'_>,
) -> Result<FieldValue, AsterixError> {
    // Primary subfield: FX-chained presence bitmap, 7 data bits per byte.
    let mut presence = Vec::new();
    loop {
        let b = cursor.read_u8()?;
        for j in 0..7 {
            presence.push(b & (0x80 >> j) != 0);
        }
        if b & 0x01 == 0 {
            break;
        }
    }

    let mut map = FieldMap::new();
    for (i, set) in presence.iter().enumerate() {
        if !set {
            continue;
        }
        let Some(sub) = compound.subfields.get(i) else {
            return Err(AsterixError::UnknownSubfield {
                item: label.to_string(),
                bit: (i + 1) as u8,
            });
        };
        map.insert(sub.name.clone(), parse_format(label, &sub.format, cursor)?);
    }
    Ok(FieldValue::Nested(map))
}

fn parse_explicit(
    label: &str,
    explicit: &Explicit,
    cursor: &mut BitCursor<'_>,
) -> Result<FieldValue, AsterixError> {
    let offset = cursor.byte_pos();
    let len = cursor.read_u8()? as usize;
    if len == 0 {
        return Err(AsterixError::MalformedBlock {
            offset,
            detail: format!("explicit item {label} declares length 0"),
        });
    }
    let payload = cursor.read_bytes(len - 1)?;
    match &explicit.inner {
        Some(inner) => {
            let mut sub = BitCursor::new(payload);
            parse_format(label, inner, &mut sub)
        }
        None => Ok(FieldValue::Bytes(payload.to_vec())),
    }
}

fn parse_bds(bds: &Bds, cursor: &mut BitCursor<'_>) -> Result<FieldValue, AsterixError> {
    let count = cursor.read_u8()? as usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        // 56 bits of register payload, then the 8-bit BDS code.
        let payload = cursor.read_bytes(7)?;
        let code = cursor.read_u8()?;

        let mut map = FieldMap::new();
        map.insert("BDS", FieldValue::String(format!("{code:02x}")));
        match bds.registers.get(&code) {
            Some(layout) => map.extend(decode_fields(layout, payload)?),
            None => map.insert("MB", FieldValue::String(hex_string(payload))),
        }
        out.push(FieldValue::Nested(map));
    }
    Ok(FieldValue::Array(out))
}
