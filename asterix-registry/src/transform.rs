//! Turns the raw XML data model into the validated runtime model.
//!
//! All structural invariants are enforced here, so the parser can trust
//! every descriptor it pulls out of the registry: bit ranges fit their
//! field and do not overlap, UAP references resolve, BDS register payloads
//! are exactly seven bytes.

use std::collections::BTreeMap;

use crate::error::TransformError;
use crate::model::*;
use crate::xml_model::*;

pub fn build_category(xml: XmlCategory) -> Result<Category, TransformError> {
    if xml.id == 0 {
        return Err(TransformError::BadCategoryId);
    }

    let mut items = BTreeMap::new();
    for raw in xml.items {
        let item = build_item(raw)?;
        let id = item.id.clone();
        if items.insert(id.clone(), item).is_some() {
            return Err(TransformError::DuplicateItem(id));
        }
    }

    if xml.uaps.is_empty() {
        return Err(TransformError::MissingUap);
    }
    let uaps = xml
        .uaps
        .into_iter()
        .map(|u| build_uap(u, &items))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Category {
        id: xml.id,
        name: xml.name,
        version: xml.ver,
        uaps,
        items,
        filtered: xml.filtered,
    })
}

fn build_item(raw: XmlDataItem) -> Result<DataItem, TransformError> {
    let rule = match raw.rule.as_str() {
        "mandatory" => Rule::Mandatory,
        "optional" | "" => Rule::Optional,
        "conditional" => Rule::Conditional,
        other => {
            return Err(TransformError::BadRule {
                item: raw.id,
                rule: other.to_string(),
            });
        }
    };
    let format = build_format(&raw.id, raw.format)?;
    Ok(DataItem {
        id: raw.id,
        name: raw.name,
        definition: raw.definition,
        rule,
        format,
    })
}

fn build_format(item: &str, raw: XmlFormat) -> Result<Format, TransformError> {
    match raw {
        XmlFormat::Fixed(f) => Ok(Format::Fixed(build_fixed(item, f)?)),
        XmlFormat::Variable(v) => {
            if v.parts.is_empty() {
                return Err(TransformError::EmptyVariable { item: item.into() });
            }
            let parts = v
                .parts
                .into_iter()
                .map(|p| build_fixed(item, p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Format::Variable(Variable { parts }))
        }
        XmlFormat::Repetitive(r) => Ok(Format::Repetitive(Repetitive {
            element: build_fixed(item, r.element)?,
        })),
        XmlFormat::Compound(c) => {
            if c.subfields.is_empty() {
                return Err(TransformError::EmptyCompound { item: item.into() });
            }
            let mut subfields = Vec::with_capacity(c.subfields.len());
            for sub in c.subfields {
                if subfields.iter().any(|s: &Subfield| s.name == sub.name) {
                    return Err(TransformError::DuplicateSubfield {
                        item: item.into(),
                        name: sub.name,
                    });
                }
                subfields.push(Subfield {
                    name: sub.name,
                    format: build_format(item, *sub.format)?,
                });
            }
            Ok(Format::Compound(Compound { subfields }))
        }
        XmlFormat::Explicit(e) => {
            let inner = match e.inner {
                Some(f) => Some(Box::new(build_format(item, *f)?)),
                None => None,
            };
            Ok(Format::Explicit(Explicit { inner }))
        }
        XmlFormat::BDS(b) => {
            let mut registers = BTreeMap::new();
            for reg in b.registers {
                let code = parse_register_id(&reg.id).ok_or_else(|| {
                    TransformError::BadRegisterId {
                        item: item.into(),
                        id: reg.id.clone(),
                    }
                })?;
                let layout = build_fixed(item, reg.layout)?;
                if layout.length != 7 {
                    return Err(TransformError::BadRegisterLayout {
                        item: item.into(),
                        reg: code,
                        len: layout.length,
                    });
                }
                if registers.insert(code, layout).is_some() {
                    return Err(TransformError::DuplicateRegister {
                        item: item.into(),
                        reg: code,
                    });
                }
            }
            Ok(Format::Bds(Bds { registers }))
        }
    }
}

fn parse_register_id(id: &str) -> Option<u8> {
    if let Some(hex) = id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).ok()
    } else {
        id.parse().ok()
    }
}

fn build_fixed(item: &str, raw: XmlFixed) -> Result<Fixed, TransformError> {
    if raw.length == 0 {
        return Err(TransformError::BadLength {
            item: item.into(),
            len: raw.length,
        });
    }
    let fields = raw
        .bits
        .into_iter()
        .map(|b| build_bitfield(item, raw.length, b))
        .collect::<Result<Vec<_>, _>>()?;

    // Declared ranges must not overlap within the same fixed layout.
    let mut ranges: Vec<(u32, u32, &str)> = fields
        .iter()
        .map(|f| (f.to_bit, f.from_bit, f.name.as_str()))
        .collect();
    ranges.sort_by_key(|r| r.0);
    for pair in ranges.windows(2) {
        if pair[0].1 >= pair[1].0 {
            return Err(TransformError::OverlappingFields {
                item: item.into(),
                first: pair[0].2.to_string(),
                second: pair[1].2.to_string(),
            });
        }
    }

    Ok(Fixed {
        length: raw.length,
        fields,
    })
}

fn build_bitfield(item: &str, length: usize, raw: XmlBits) -> Result<BitField, TransformError> {
    let (from, to) = match (raw.from, raw.to, raw.bit) {
        (Some(f), Some(t), _) => (f.max(t), f.min(t)),
        (_, _, Some(b)) => (b, b),
        (Some(f), None, None) => (f, f),
        (None, _, None) => {
            return Err(TransformError::MissingBitRange {
                item: item.into(),
                field: raw.name,
            });
        }
    };
    if to < 1 || from as usize > length * 8 {
        return Err(TransformError::BadBitRange {
            item: item.into(),
            field: raw.name,
            from,
            to,
            len: length,
        });
    }

    let encoding = match raw.encode.as_deref() {
        None => Encoding::Unsigned,
        Some(kw) => Encoding::from_keyword(kw).ok_or_else(|| TransformError::BadEncoding {
            item: item.into(),
            field: raw.name.clone(),
            encoding: kw.to_string(),
        })?,
    };
    // String-like encodings may span any width; numeric extraction is
    // limited to 64 bits.
    let numeric = matches!(
        encoding,
        Encoding::Unsigned | Encoding::Signed | Encoding::Octal
    );
    if numeric && from - to + 1 > 64 {
        return Err(TransformError::TooWide {
            item: item.into(),
            field: raw.name,
        });
    }

    let decimals = raw
        .decimals
        .unwrap_or_else(|| raw.scale.map(decimals_for_scale).unwrap_or(0));

    Ok(BitField {
        name: raw.name,
        description: raw.desc,
        from_bit: from,
        to_bit: to,
        encoding,
        scale: raw.scale,
        unit: raw.unit,
        decimals,
        meanings: raw.values.into_iter().map(|v| (v.val, v.meaning)).collect(),
    })
}

/// Minimum number of decimal places that represents `scale` without loss,
/// capped at 8 for scales like 360/2^16 that only terminate much later.
fn decimals_for_scale(scale: f64) -> u8 {
    for d in 0u8..=8 {
        let shifted = scale * 10f64.powi(d as i32);
        if (shifted - shifted.round()).abs() < 1e-9 {
            return d;
        }
    }
    8
}

fn build_uap(
    raw: XmlUap,
    items: &BTreeMap<String, DataItem>,
) -> Result<Uap, TransformError> {
    let use_if = match (raw.use_if_bit, raw.use_if_value) {
        (None, None) => None,
        (Some(bit), Some(value)) => {
            if !(1..=8).contains(&bit) {
                return Err(TransformError::BadSelectorBit(bit));
            }
            Some(UapSelector { bit, value })
        }
        _ => return Err(TransformError::IncompleteSelector),
    };

    let mut slots: Vec<UapSlot> = Vec::with_capacity(raw.items.len());
    for entry in raw.items {
        if entry.bit == 0 {
            return Err(TransformError::BadFrn);
        }
        if slots.iter().any(|s| s.frn == entry.bit) {
            return Err(TransformError::DuplicateFrn(entry.bit));
        }
        let text = entry.item.trim();
        let slot = match text {
            "" | "-" => UapSlot {
                frn: entry.bit,
                item_id: None,
                is_extender: false,
                is_presence_only: false,
            },
            "FX" => UapSlot {
                frn: entry.bit,
                item_id: None,
                is_extender: true,
                is_presence_only: false,
            },
            id => {
                if !entry.presence_only && !items.contains_key(id) {
                    return Err(TransformError::UndefinedItem {
                        frn: entry.bit,
                        item: id.to_string(),
                    });
                }
                UapSlot {
                    frn: entry.bit,
                    item_id: Some(id.to_string()),
                    is_extender: false,
                    is_presence_only: entry.presence_only,
                }
            }
        };
        slots.push(slot);
    }
    slots.sort_by_key(|s| s.frn);

    Ok(Uap { use_if, slots })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_category_str;

    fn build(xml: &str) -> Result<Category, TransformError> {
        build_category(parse_category_str(xml).expect("XML must deserialize"))
    }

    const BASE: &str = r#"
<Category id="48" name="Test" ver="1.0">
  <DataItem id="010" rule="mandatory" name="Data Source Identifier">
    <Fixed length="2">
      <Bits from="16" to="9" name="SAC"/>
      <Bits from="8" to="1" name="SIC"/>
    </Fixed>
  </DataItem>
  <UAP>
    <UAPItem bit="1">010</UAPItem>
    <UAPItem bit="2">-</UAPItem>
  </UAP>
</Category>
"#;

    #[test]
    fn builds_minimal_category() {
        let cat = build(BASE).unwrap();

        assert_eq!(cat.id, 48);
        assert_eq!(cat.version, "1.0");
        let item = cat.item("010").unwrap();
        assert_eq!(item.rule, Rule::Mandatory);
        assert_eq!(item.find_field("SAC").unwrap().width(), 8);

        let uap = &cat.uaps[0];
        assert_eq!(uap.slot(1).unwrap().item_id.as_deref(), Some("010"));
        assert!(uap.slot(2).unwrap().item_id.is_none());
    }

    #[test]
    fn rejects_undefined_uap_reference() {
        let xml = r#"
<Category id="48">
  <UAP><UAPItem bit="1">999</UAPItem></UAP>
</Category>
"#;
        assert!(matches!(
            build(xml),
            Err(TransformError::UndefinedItem { frn: 1, .. })
        ));
    }

    #[test]
    fn accepts_forward_references() {
        // UAP declared before the item it names.
        let xml = r#"
<Category id="48">
  <UAP><UAPItem bit="1">010</UAPItem></UAP>
  <DataItem id="010"><Fixed length="1"><Bits from="8" to="1" name="X"/></Fixed></DataItem>
</Category>
"#;
        assert!(build(xml).is_ok());
    }

    #[test]
    fn rejects_overlapping_fields() {
        let xml = r#"
<Category id="48">
  <DataItem id="010">
    <Fixed length="2">
      <Bits from="16" to="8" name="A"/>
      <Bits from="8" to="1" name="B"/>
    </Fixed>
  </DataItem>
  <UAP><UAPItem bit="1">010</UAPItem></UAP>
</Category>
"#;
        assert!(matches!(
            build(xml),
            Err(TransformError::OverlappingFields { .. })
        ));
    }

    #[test]
    fn rejects_range_outside_field() {
        let xml = r#"
<Category id="48">
  <DataItem id="010">
    <Fixed length="1"><Bits from="9" to="1" name="A"/></Fixed>
  </DataItem>
  <UAP><UAPItem bit="1">010</UAPItem></UAP>
</Category>
"#;
        assert!(matches!(build(xml), Err(TransformError::BadBitRange { .. })));
    }

    #[test]
    fn rejects_missing_uap() {
        let xml = r#"<Category id="48"></Category>"#;
        assert!(matches!(build(xml), Err(TransformError::MissingUap)));
    }

    #[test]
    fn rejects_unknown_rule() {
        let xml = r#"
<Category id="48">
  <DataItem id="010" rule="sometimes">
    <Fixed length="1"><Bits from="8" to="1" name="A"/></Fixed>
  </DataItem>
  <UAP><UAPItem bit="1">010</UAPItem></UAP>
</Category>
"#;
        assert!(matches!(build(xml), Err(TransformError::BadRule { .. })));
    }

    #[test]
    fn single_bit_shorthand() {
        let xml = r#"
<Category id="48">
  <DataItem id="010">
    <Fixed length="1">
      <Bits bit="8" name="V"/>
      <Bits from="7" to="1" name="REST"/>
    </Fixed>
  </DataItem>
  <UAP><UAPItem bit="1">010</UAPItem></UAP>
</Category>
"#;
        let cat = build(xml).unwrap();
        let v = cat.item("010").unwrap().find_field("V").unwrap();
        assert_eq!((v.from_bit, v.to_bit), (8, 8));
    }

    #[test]
    fn derives_decimals_from_scale() {
        assert_eq!(decimals_for_scale(0.25), 2);
        assert_eq!(decimals_for_scale(1.0), 0);
        assert_eq!(decimals_for_scale(0.1), 1);
        // 1/128 terminates at 7 places.
        assert_eq!(decimals_for_scale(0.0078125), 7);
        // 360/2^16 would need more than 8; capped.
        assert_eq!(decimals_for_scale(360.0 / 65536.0), 8);
    }

    #[test]
    fn explicit_decimals_win() {
        let xml = r#"
<Category id="48">
  <DataItem id="040">
    <Fixed length="2"><Bits from="16" to="1" name="RHO" scale="0.00390625" unit="NM" decimals="3"/></Fixed>
  </DataItem>
  <UAP><UAPItem bit="1">040</UAPItem></UAP>
</Category>
"#;
        let cat = build(xml).unwrap();
        assert_eq!(cat.item("040").unwrap().find_field("RHO").unwrap().decimals, 3);
    }

    #[test]
    fn bds_register_ids_parse_hex_and_decimal() {
        let xml = r#"
<Category id="48">
  <DataItem id="250">
    <BDS>
      <Register id="0x40"><Fixed length="7"><Bits from="56" to="44" name="MCP" encode="unsigned"/></Fixed></Register>
      <Register id="96"><Fixed length="7"><Bits from="56" to="46" name="RA"/></Fixed></Register>
    </BDS>
  </DataItem>
  <UAP><UAPItem bit="1">250</UAPItem></UAP>
</Category>
"#;
        let cat = build(xml).unwrap();
        match &cat.item("250").unwrap().format {
            Format::Bds(bds) => {
                assert!(bds.registers.contains_key(&0x40));
                assert!(bds.registers.contains_key(&0x60));
            }
            other => panic!("expected Bds, got {:?}", other.kind()),
        }
    }

    #[test]
    fn bds_register_layout_must_be_seven_bytes() {
        let xml = r#"
<Category id="48">
  <DataItem id="250">
    <BDS><Register id="0x40"><Fixed length="8"><Bits from="64" to="1" name="X" encode="hex"/></Fixed></Register></BDS>
  </DataItem>
  <UAP><UAPItem bit="1">250</UAPItem></UAP>
</Category>
"#;
        assert!(matches!(
            build(xml),
            Err(TransformError::BadRegisterLayout { len: 8, .. })
        ));
    }

    #[test]
    fn uap_selector_validation() {
        let xml = r#"
<Category id="1">
  <DataItem id="020"><Fixed length="1"><Bits from="8" to="1" name="TYP"/></Fixed></DataItem>
  <UAP use_if_bit="8"><UAPItem bit="1">020</UAPItem></UAP>
</Category>
"#;
        assert!(matches!(
            build(xml),
            Err(TransformError::IncompleteSelector)
        ));
    }

    #[test]
    fn presence_only_slot_needs_no_item() {
        let xml = r#"
<Category id="1">
  <DataItem id="010"><Fixed length="1"><Bits from="8" to="1" name="X"/></Fixed></DataItem>
  <UAP>
    <UAPItem bit="1">010</UAPItem>
    <UAPItem bit="2" presence_only="true">BLIP</UAPItem>
  </UAP>
</Category>
"#;
        let cat = build(xml).unwrap();
        let slot = cat.uaps[0].slot(2).unwrap();
        assert!(slot.is_presence_only);
        assert_eq!(slot.item_id.as_deref(), Some("BLIP"));
    }
}
