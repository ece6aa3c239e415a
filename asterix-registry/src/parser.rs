use log::warn;
use quick_xml::events::Event;

use crate::xml_model::XmlCategory;

/// Parses the given XML string into the raw category data model.
pub fn parse_category_str(xml: &str) -> Result<XmlCategory, quick_xml::DeError> {
    quick_xml::de::from_str(xml)
}

/// Attributes each element is allowed to carry. Anything else is reported
/// by [`lint_attributes`] but never treated as an error.
const KNOWN_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("Category", &["id", "name", "ver", "filtered"]),
    ("DataItem", &["id", "name", "rule", "definition"]),
    ("Fixed", &["length"]),
    ("Variable", &[]),
    ("Repetitive", &[]),
    ("Compound", &[]),
    ("Subfield", &["name"]),
    ("Explicit", &[]),
    ("BDS", &[]),
    ("Register", &["id"]),
    (
        "Bits",
        &["from", "to", "bit", "name", "desc", "encode", "scale", "unit", "decimals"],
    ),
    ("BitsValue", &["val"]),
    ("UAP", &["use_if_bit", "use_if_value"]),
    ("UAPItem", &["bit", "presence_only"]),
];

/// Walks the raw XML events and warns about unknown attributes.
///
/// Deserialization silently drops attributes it has no field for, so this
/// separate pass is what gives spec authors their diagnostics. Malformed
/// XML simply ends the walk; the serde pass owns that error.
pub fn lint_attributes(xml: &str, file: &str) {
    let mut reader = quick_xml::Reader::from_str(xml);
    loop {
        let event = match reader.read_event() {
            Ok(e) => e,
            Err(_) => return,
        };
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let elem = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let Some((_, known)) = KNOWN_ATTRIBUTES.iter().find(|(n, _)| *n == elem) else {
                    continue;
                };
                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    if !known.contains(&key.as_str()) {
                        warn!(
                            "{}:{}: ignoring unknown attribute '{}' on <{}>",
                            file,
                            line_at(xml, reader.buffer_position()),
                            key,
                            elem
                        );
                    }
                }
            }
            Event::Eof => return,
            _ => {}
        }
    }
}

/// 1-based line number of a byte offset into `xml`.
pub(crate) fn line_at(xml: &str, pos: usize) -> u32 {
    let pos = pos.min(xml.len());
    xml.as_bytes()[..pos].iter().filter(|b| **b == b'\n').count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_model::XmlFormat;

    const MINIMAL: &str = r#"
<Category id="48" name="Test" ver="1.0">
  <DataItem id="010" rule="mandatory" name="Data Source Identifier">
    <Fixed length="2">
      <Bits from="16" to="9" name="SAC"/>
      <Bits from="8" to="1" name="SIC"/>
    </Fixed>
  </DataItem>
  <UAP>
    <UAPItem bit="1">010</UAPItem>
  </UAP>
</Category>
"#;

    #[test]
    fn parses_minimal_category() {
        let cat = parse_category_str(MINIMAL).expect("parse failed");

        assert_eq!(cat.id, 48);
        assert_eq!(cat.name, "Test");
        assert_eq!(cat.ver, "1.0");
        assert_eq!(cat.items.len(), 1);
        assert_eq!(cat.uaps.len(), 1);
        assert_eq!(cat.uaps[0].items[0].bit, 1);
        assert_eq!(cat.uaps[0].items[0].item, "010");
    }

    #[test]
    fn parses_fixed_bits() {
        let cat = parse_category_str(MINIMAL).unwrap();

        match &cat.items[0].format {
            XmlFormat::Fixed(fixed) => {
                assert_eq!(fixed.length, 2);
                assert_eq!(fixed.bits.len(), 2);
                assert_eq!(fixed.bits[0].name, "SAC");
                assert_eq!(fixed.bits[0].from, Some(16));
                assert_eq!(fixed.bits[0].to, Some(9));
            }
            other => panic!("expected Fixed, got {:?}", other),
        }
    }

    #[test]
    fn parses_explicit_without_inner() {
        let xml = r#"
<Category id="48">
  <DataItem id="SP"><Explicit/></DataItem>
  <UAP><UAPItem bit="1">SP</UAPItem></UAP>
</Category>
"#;
        let cat = parse_category_str(xml).unwrap();
        match &cat.items[0].format {
            XmlFormat::Explicit(e) => assert!(e.inner.is_none()),
            other => panic!("expected Explicit, got {:?}", other),
        }
    }

    #[test]
    fn parses_bits_value_meanings() {
        let xml = r#"
<Category id="34">
  <DataItem id="000" rule="mandatory">
    <Fixed length="1">
      <Bits from="8" to="1" name="MSGTYP">
        <BitsValue val="1">North marker message</BitsValue>
        <BitsValue val="2">Sector crossing message</BitsValue>
      </Bits>
    </Fixed>
  </DataItem>
  <UAP><UAPItem bit="1">000</UAPItem></UAP>
</Category>
"#;
        let cat = parse_category_str(xml).unwrap();
        match &cat.items[0].format {
            XmlFormat::Fixed(fixed) => {
                let vals = &fixed.bits[0].values;
                assert_eq!(vals.len(), 2);
                assert_eq!(vals[0].val, 1);
                assert_eq!(vals[0].meaning, "North marker message");
            }
            other => panic!("expected Fixed, got {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(parse_category_str("<Category id=\"48\"").is_err());
    }

    #[test]
    fn line_numbers() {
        let text = "a\nb\nc";
        assert_eq!(line_at(text, 0), 1);
        assert_eq!(line_at(text, 2), 2);
        assert_eq!(line_at(text, 4), 3);
        assert_eq!(line_at(text, 400), 3);
    }
}
