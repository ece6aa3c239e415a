//! Applies a bit field's encoding to the raw bytes of its fixed layout.

use asterix_core::{DecodeError, FieldValue, extract_bytes, extract_signed, extract_unsigned};
use asterix_registry::{BitField, Encoding};

use crate::types::hex_string;

/// Decodes one bit field out of the `bytes` of its enclosing fixed layout.
pub(crate) fn decode_bitfield(field: &BitField, bytes: &[u8]) -> Result<FieldValue, DecodeError> {
    match field.encoding {
        Encoding::Unsigned | Encoding::Spare => {
            let raw = extract_unsigned(bytes, field.from_bit, field.to_bit)?;
            Ok(match field.scale {
                Some(scale) => FieldValue::Float(raw as f64 * scale),
                None if field.width() == 1 => FieldValue::BitFlag(raw != 0),
                None => FieldValue::Unsigned(raw),
            })
        }
        Encoding::Signed => {
            let raw = extract_signed(bytes, field.from_bit, field.to_bit)?;
            Ok(match field.scale {
                Some(scale) => FieldValue::Float(raw as f64 * scale),
                None => FieldValue::Integer(raw),
            })
        }
        Encoding::Ascii => {
            let s = decode_chars(field, bytes, 8, ascii_char)?;
            Ok(FieldValue::String(s))
        }
        Encoding::SixBit => {
            let s = decode_chars(field, bytes, 6, icao_char)?;
            // Callsigns are space-padded on the right.
            Ok(FieldValue::String(s.trim_end_matches(' ').to_string()))
        }
        Encoding::Hex | Encoding::MbData => {
            let raw = extract_bytes(bytes, field.from_bit, field.to_bit)?;
            Ok(FieldValue::String(hex_string(&raw)))
        }
        Encoding::Octal => {
            let raw = extract_unsigned(bytes, field.from_bit, field.to_bit)?;
            let digits = (field.width() as usize).div_ceil(3);
            Ok(FieldValue::String(format!("{raw:0digits$o}")))
        }
    }
}

/// Splits the field into `width`-bit codes from the most significant group
/// down and maps each through `to_char`. A trailing partial group is ignored.
fn decode_chars(
    field: &BitField,
    bytes: &[u8],
    width: u32,
    to_char: impl Fn(u64) -> char,
) -> Result<String, DecodeError> {
    let groups = field.width() / width;
    let mut out = String::with_capacity(groups as usize);
    for i in 0..groups {
        let hi = field.from_bit - i * width;
        let lo = hi + 1 - width;
        out.push(to_char(extract_unsigned(bytes, hi, lo)?));
    }
    Ok(out)
}

/// ICAO 6-bit alphanumeric table: A-Z map to 1..=26, digits keep their
/// ASCII codes, 32 is space. Every other pattern renders as `?`.
fn icao_char(code: u64) -> char {
    match code {
        1..=26 => (b'A' + code as u8 - 1) as char,
        32 => ' ',
        48..=57 => (b'0' + code as u8 - 48) as char,
        _ => '?',
    }
}

fn ascii_char(code: u64) -> char {
    match code {
        0x20..=0x7E => code as u8 as char,
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn field(from: u32, to: u32, encoding: Encoding, scale: Option<f64>) -> BitField {
        BitField {
            name: "F".into(),
            description: None,
            from_bit: from,
            to_bit: to,
            encoding,
            scale,
            unit: None,
            decimals: scale.map(|_| 2).unwrap_or(0),
            meanings: BTreeMap::new(),
        }
    }

    #[test]
    fn unsigned_plain_and_scaled() {
        let bytes = [0x01, 0x80];
        let plain = field(16, 1, Encoding::Unsigned, None);
        assert_eq!(decode_bitfield(&plain, &bytes).unwrap(), FieldValue::Unsigned(0x0180));

        let scaled = field(16, 1, Encoding::Unsigned, Some(0.25));
        assert_eq!(decode_bitfield(&scaled, &bytes).unwrap(), FieldValue::Float(96.0));
    }

    #[test]
    fn single_bit_becomes_flag() {
        let bytes = [0x80];
        let f = field(8, 8, Encoding::Unsigned, None);
        assert_eq!(decode_bitfield(&f, &bytes).unwrap(), FieldValue::BitFlag(true));

        let f = field(1, 1, Encoding::Unsigned, None);
        assert_eq!(decode_bitfield(&f, &bytes).unwrap(), FieldValue::BitFlag(false));
    }

    #[test]
    fn signed_two_complement() {
        let bytes = [0xFF, 0xFE];
        let f = field(16, 1, Encoding::Signed, None);
        assert_eq!(decode_bitfield(&f, &bytes).unwrap(), FieldValue::Integer(-2));

        let f = field(16, 1, Encoding::Signed, Some(0.25));
        assert_eq!(decode_bitfield(&f, &bytes).unwrap(), FieldValue::Float(-0.5));
    }

    #[test]
    fn sixbit_callsign() {
        // "AB12    " in ICAO 6-bit: codes 1, 2, 49, 50, then four spaces
        // (32), packed MSB-first into six bytes.
        let bytes = [0x04, 0x2C, 0x72, 0x82, 0x08, 0x20];
        let f = field(48, 1, Encoding::SixBit, None);
        let decoded = decode_bitfield(&f, &bytes).unwrap();
        assert_eq!(decoded, FieldValue::String("AB12".into()));
    }

    #[test]
    fn sixbit_unknown_pattern_renders_question_mark() {
        // Bits 8..3 hold code 31, which is not in the table.
        let bytes = [0x7C];
        let f = field(8, 3, Encoding::SixBit, None);
        assert_eq!(decode_bitfield(&f, &bytes).unwrap(), FieldValue::String("?".into()));
    }

    #[test]
    fn hex_is_lowercase_zero_padded() {
        let bytes = [0x0A, 0xBC, 0xDE];
        let f = field(24, 1, Encoding::Hex, None);
        assert_eq!(
            decode_bitfield(&f, &bytes).unwrap(),
            FieldValue::String("0abcde".into())
        );
    }

    #[test]
    fn octal_squawk() {
        // Mode-3/A 7777 == 0o7777 == 4095 in 12 bits.
        let bytes = [0x0F, 0xFF];
        let f = field(12, 1, Encoding::Octal, None);
        assert_eq!(decode_bitfield(&f, &bytes).unwrap(), FieldValue::String("7777".into()));

        let bytes = [0x00, 0x21];
        assert_eq!(decode_bitfield(&f, &bytes).unwrap(), FieldValue::String("0041".into()));
    }

    #[test]
    fn ascii_replaces_control_characters() {
        let bytes = [b'A', 0x07, b'Z'];
        let f = field(24, 1, Encoding::Ascii, None);
        assert_eq!(decode_bitfield(&f, &bytes).unwrap(), FieldValue::String("A?Z".into()));
    }
}
