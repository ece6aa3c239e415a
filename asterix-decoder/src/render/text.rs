//! Text and OutLine rendering.

use std::fmt::Write;

use asterix_core::FieldValue;
use asterix_registry::DataItem;

use crate::render::{Renderer, flatten_leaves, format_leaf, raw_of};
use crate::types::{DataBlock, DecodedItem};

/// Multiline listing: block header, then one field per line. Verbose mode
/// adds item names, units and meaning-table entries.
pub(crate) fn block_text(r: &Renderer<'_>, block: &DataBlock) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Data Block CAT{:03} len={} records={}",
        block.category,
        block.length,
        block.records.len()
    );
    if r.verbose {
        let _ = writeln!(out, " hex: {}", block.hex_data);
    }
    for (i, record) in block.records.iter().enumerate() {
        let _ = writeln!(out, " [Record {}]", i + 1);
        for item in &record.items {
            match &item.description {
                Some(name) => {
                    let _ = writeln!(out, "  {} : {}", item.id, name);
                }
                None => {
                    let _ = writeln!(out, "  {}", item.id);
                }
            }
            let descr = r.item_descr(block.category, &item.id);
            write_value(r, &mut out, 3, descr, None, &item.value);
        }
        if let Some(err) = &record.error {
            let _ = writeln!(out, "  <error: {err}>");
        }
    }
    out
}

fn write_value(
    r: &Renderer<'_>,
    out: &mut String,
    indent: usize,
    item: Option<&DataItem>,
    label: Option<&str>,
    value: &FieldValue,
) {
    let pad = " ".repeat(indent);
    match value {
        FieldValue::Nested(map) => {
            let child_indent = match label {
                Some(label) => {
                    let _ = writeln!(out, "{pad}{label}:");
                    indent + 1
                }
                None => indent,
            };
            for (name, v) in map.iter() {
                write_value(r, out, child_indent, item, Some(name), v);
            }
        }
        FieldValue::Array(values) => {
            let base = label.unwrap_or("");
            for (i, v) in values.iter().enumerate() {
                let elem_label = format!("{base}[{i}]");
                write_value(r, out, indent, item, Some(elem_label.as_str()), v);
            }
        }
        leaf => {
            let field = label.and_then(|l| item.and_then(|it| it.find_field(l)));
            let rendered = format_leaf(leaf, field);
            let label = label.unwrap_or("value");
            let _ = write!(out, "{pad}{label}: {rendered}");
            if r.verbose {
                if let Some(field) = field {
                    if let Some(unit) = &field.unit {
                        let _ = write!(out, " {unit}");
                    }
                    if let Some(meaning) = raw_of(leaf).and_then(|raw| field.meaning(raw)) {
                        let _ = write!(out, " ({meaning})");
                    }
                }
            }
            out.push('\n');
        }
    }
}

/// One line per record: category prefix, then semicolon-separated items
/// with comma-separated `path=value` fields.
pub(crate) fn block_outline(r: &Renderer<'_>, block: &DataBlock) -> String {
    let mut lines = Vec::with_capacity(block.records.len());
    for record in &block.records {
        let mut parts = vec![format!("CAT{:03}", block.category)];
        for item in &record.items {
            parts.push(item_outline(r, block.category, item));
        }
        if record.error.is_some() {
            parts.push("<error>".to_string());
        }
        lines.push(parts.join(";"));
    }
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn item_outline(r: &Renderer<'_>, cat: u8, item: &DecodedItem) -> String {
    let descr = r.item_descr(cat, &item.id);
    let mut leaves = Vec::new();
    flatten_leaves(descr, "", None, &item.value, &mut leaves);

    // A bare leaf (presence-only flag, opaque payload) renders without a
    // field name.
    let body = if leaves.len() == 1 && leaves[0].0.is_empty() {
        leaves[0].1.clone()
    } else {
        leaves
            .iter()
            .map(|(path, v)| format!("{path}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    };
    format!("{}:{}", item.id, body)
}
