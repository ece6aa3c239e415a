//! Output rendering for decoded blocks.

mod json;
mod text;
mod xml;

use asterix_core::FieldValue;
use asterix_registry::{BitField, CategoryRegistry, DataItem};

use crate::error::AsterixError;
use crate::types::{DataBlock, hex_string};

/// The available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Multiline listing, one field per line.
    Text,
    /// One line per record, for log filtering.
    OutLine,
    /// Flat JSON: `{item: {field: value}}` with dotted keys for nesting.
    JsonCompact,
    /// JSON mirroring the decoded tree.
    JsonHierarchical,
    /// Flat XML, one `<Field>` element per leaf.
    Xml,
    /// XML mirroring the decoded tree.
    XmlHierarchical,
}

pub(crate) fn render_block(
    registry: &CategoryRegistry,
    block: &DataBlock,
    format: OutputFormat,
    verbose: bool,
) -> Result<String, AsterixError> {
    let r = Renderer { registry, verbose };
    match format {
        OutputFormat::Text => Ok(text::block_text(&r, block)),
        OutputFormat::OutLine => Ok(text::block_outline(&r, block)),
        OutputFormat::JsonCompact => json::block_json(&r, block, false),
        OutputFormat::JsonHierarchical => json::block_json(&r, block, true),
        OutputFormat::Xml => xml::block_xml(&r, block, false),
        OutputFormat::XmlHierarchical => xml::block_xml(&r, block, true),
    }
}

pub(crate) struct Renderer<'r> {
    pub registry: &'r CategoryRegistry,
    pub verbose: bool,
}

impl Renderer<'_> {
    /// Resolves the registry description behind a decoded item label
    /// (`"I048/010"` -> item `"010"` of category 48).
    pub fn item_descr(&self, cat: u8, label: &str) -> Option<&DataItem> {
        let bare = label.rsplit('/').next().unwrap_or(label);
        self.registry.item(cat, bare)
    }
}

/// Formats a leaf value, honouring the field's declared decimals.
pub(crate) fn format_leaf(value: &FieldValue, field: Option<&BitField>) -> String {
    match value {
        FieldValue::Integer(v) => v.to_string(),
        FieldValue::Unsigned(v) => v.to_string(),
        FieldValue::Float(v) => match field {
            Some(f) => format!("{v:.prec$}", prec = f.decimals as usize),
            None => format!("{v}"),
        },
        FieldValue::String(s) => s.clone(),
        FieldValue::Bytes(b) => hex_string(b),
        FieldValue::BitFlag(true) => "1".to_string(),
        FieldValue::BitFlag(false) => "0".to_string(),
        // Containers are walked by the callers, never formatted whole.
        FieldValue::Nested(_) | FieldValue::Array(_) => String::new(),
    }
}

/// The raw integer behind a leaf, for meaning-table lookups.
pub(crate) fn raw_of(value: &FieldValue) -> Option<u64> {
    match value {
        FieldValue::Unsigned(v) => Some(*v),
        FieldValue::Integer(v) => u64::try_from(*v).ok(),
        FieldValue::BitFlag(b) => Some(*b as u64),
        _ => None,
    }
}

/// Flattens a value tree into `(path, leaf)` pairs. Nested maps extend the
/// path with dots, arrays with `[index]`; `name` tracks the innermost field
/// name so leaves can resolve their descriptor.
pub(crate) fn flatten_leaves(
    item: Option<&DataItem>,
    prefix: &str,
    name: Option<&str>,
    value: &FieldValue,
    out: &mut Vec<(String, String)>,
) {
    match value {
        FieldValue::Nested(map) => {
            for (n, v) in map.iter() {
                let path = if prefix.is_empty() {
                    n.to_string()
                } else {
                    format!("{prefix}.{n}")
                };
                flatten_leaves(item, &path, Some(n), v, out);
            }
        }
        FieldValue::Array(values) => {
            for (i, v) in values.iter().enumerate() {
                flatten_leaves(item, &format!("{prefix}[{i}]"), name, v, out);
            }
        }
        leaf => {
            let field = name.and_then(|n| item.and_then(|it| it.find_field(n)));
            out.push((prefix.to_string(), format_leaf(leaf, field)));
        }
    }
}
