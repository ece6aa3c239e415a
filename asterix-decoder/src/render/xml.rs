//! XML rendering, compact and hierarchical, via the quick-xml writer.

use asterix_core::FieldValue;
use asterix_registry::DataItem;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::AsterixError;
use crate::render::{Renderer, flatten_leaves, format_leaf};
use crate::types::DataBlock;

type XmlWriter = Writer<Vec<u8>>;

pub(crate) fn block_xml(
    r: &Renderer<'_>,
    block: &DataBlock,
    hierarchical: bool,
) -> Result<String, AsterixError> {
    let mut writer = if hierarchical {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };

    let mut root = BytesStart::new("DataBlock");
    root.push_attribute(("category", block.category.to_string().as_str()));
    root.push_attribute(("length", block.length.to_string().as_str()));
    if r.verbose {
        root.push_attribute(("hex", block.hex_data.as_str()));
    }
    write(&mut writer, Event::Start(root))?;

    for record in &block.records {
        write(&mut writer, Event::Start(BytesStart::new("Record")))?;
        for item in &record.items {
            let mut elem = BytesStart::new("Item");
            elem.push_attribute(("id", item.id.as_str()));
            if let Some(name) = &item.description {
                elem.push_attribute(("name", name.as_str()));
            }
            write(&mut writer, Event::Start(elem))?;

            let descr = r.item_descr(block.category, &item.id);
            if hierarchical {
                write_node(&mut writer, descr, None, &item.value)?;
            } else {
                write_flat(&mut writer, descr, &item.value)?;
            }
            write(&mut writer, Event::End(BytesEnd::new("Item")))?;
        }
        if let Some(err) = &record.error {
            write(&mut writer, Event::Start(BytesStart::new("Error")))?;
            write(&mut writer, Event::Text(BytesText::new(err)))?;
            write(&mut writer, Event::End(BytesEnd::new("Error")))?;
        }
        write(&mut writer, Event::End(BytesEnd::new("Record")))?;
    }
    write(&mut writer, Event::End(BytesEnd::new("DataBlock")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| AsterixError::Internal(format!("XML rendering produced invalid UTF-8: {e}")))
}

/// Hierarchical form: nested maps become `<Group>`, array elements
/// `<Entry index="..">`, leaves `<Field name="..">value</Field>`.
fn write_node(
    writer: &mut XmlWriter,
    item: Option<&DataItem>,
    label: Option<&str>,
    value: &FieldValue,
) -> Result<(), AsterixError> {
    match value {
        FieldValue::Nested(map) => {
            if let Some(label) = label {
                let mut elem = BytesStart::new("Group");
                elem.push_attribute(("name", label));
                write(writer, Event::Start(elem))?;
            }
            for (name, v) in map.iter() {
                write_node(writer, item, Some(name), v)?;
            }
            if label.is_some() {
                write(writer, Event::End(BytesEnd::new("Group")))?;
            }
        }
        FieldValue::Array(values) => {
            for (i, v) in values.iter().enumerate() {
                let mut elem = BytesStart::new("Entry");
                elem.push_attribute(("index", i.to_string().as_str()));
                if let Some(label) = label {
                    elem.push_attribute(("name", label));
                }
                write(writer, Event::Start(elem))?;
                // The entry's own tag carries the position; its content
                // needs no extra label.
                write_node(writer, item, None, v)?;
                write(writer, Event::End(BytesEnd::new("Entry")))?;
            }
        }
        leaf => {
            let field = label.and_then(|l| item.and_then(|it| it.find_field(l)));
            let mut elem = BytesStart::new("Field");
            elem.push_attribute(("name", label.unwrap_or("value")));
            write(writer, Event::Start(elem))?;
            write(writer, Event::Text(BytesText::new(&format_leaf(leaf, field))))?;
            write(writer, Event::End(BytesEnd::new("Field")))?;
        }
    }
    Ok(())
}

/// Compact form: one `<Field>` per leaf with a dotted/indexed path name.
fn write_flat(
    writer: &mut XmlWriter,
    item: Option<&DataItem>,
    value: &FieldValue,
) -> Result<(), AsterixError> {
    let mut leaves = Vec::new();
    flatten_leaves(item, "", None, value, &mut leaves);
    for (path, rendered) in &leaves {
        let mut elem = BytesStart::new("Field");
        elem.push_attribute(("name", if path.is_empty() { "value" } else { path.as_str() }));
        write(writer, Event::Start(elem))?;
        write(writer, Event::Text(BytesText::new(rendered)))?;
        write(writer, Event::End(BytesEnd::new("Field")))?;
    }
    Ok(())
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), AsterixError> {
    writer
        .write_event(event)
        .map_err(|e| AsterixError::Internal(format!("XML writer failed: {e}")))
}
