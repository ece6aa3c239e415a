//! Metadata queries against the registry.

use asterix_registry::CategoryRegistry;

use crate::error::AsterixError;

/// Answers "what does this category/item/field/value mean?".
///
/// Returns the most specific description available for the given levels;
/// a missing level is a typed error, never an empty string. A value with
/// no meaning-table entry yields `"<no meaning defined>"`.
pub(crate) fn describe(
    registry: &CategoryRegistry,
    cat: u8,
    item: Option<&str>,
    field: Option<&str>,
    value: Option<&str>,
) -> Result<String, AsterixError> {
    let category = registry
        .category(cat)
        .ok_or_else(|| AsterixError::InvalidCategory {
            cat,
            reason: "not defined".into(),
        })?;

    let Some(item_id) = item else {
        return Ok(format!(
            "CAT{:03} {} (version {})",
            category.id, category.name, category.version
        ));
    };
    let bare = bare_item_id(cat, item_id);
    let item = category
        .item(bare)
        .ok_or_else(|| AsterixError::UnknownItem {
            cat,
            item: bare.to_string(),
        })?;

    let Some(field_name) = field else {
        let mut out = format!("I{:03}/{} {}", cat, item.id, item.name);
        if let Some(definition) = &item.definition {
            out.push_str(": ");
            out.push_str(definition);
        }
        return Ok(out);
    };
    let field = item
        .find_field(field_name)
        .ok_or_else(|| AsterixError::UnknownField {
            item: format!("I{:03}/{}", cat, item.id),
            field: field_name.to_string(),
        })?;

    let Some(value) = value else {
        let mut out = format!(
            "{} ({} bits, {})",
            field.description.as_deref().unwrap_or(&field.name),
            field.width(),
            field.encoding.keyword()
        );
        if let Some(unit) = &field.unit {
            out.push_str(&format!(", unit {unit}"));
        }
        return Ok(out);
    };
    let raw = parse_raw_value(value).ok_or_else(|| AsterixError::BadValue {
        value: value.to_string(),
    })?;

    Ok(field
        .meaning(raw)
        .unwrap_or("<no meaning defined>")
        .to_string())
}

/// Accepts both bare item ids (`010`) and full labels (`I048/010`).
fn bare_item_id(cat: u8, item: &str) -> &str {
    let prefix = format!("I{cat:03}/");
    item.strip_prefix(&prefix).map_or(item, |rest| rest)
}

fn parse_raw_value(value: &str) -> Option<u64> {
    if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}
