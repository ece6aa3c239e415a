use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Insertion-ordered map of field names to values.
///
/// ASTERIX output order is contractual (items in FRN order, fields in
/// specification order), so this map preserves insertion order instead of
/// sorting keys. Lookup is linear; maps hold a handful of entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Appends all entries of `other`, keeping their order.
    pub fn extend(&mut self, other: FieldMap) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A decoded ASTERIX field value.
///
/// The tree mirrors the shape of the item's format descriptor: Fixed items
/// decode to [`Nested`](Self::Nested) maps of leaf values, Repetitive items
/// to [`Array`](Self::Array)s, Compound items to nested maps keyed by
/// subfield name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Signed integer (two's-complement fields).
    Integer(i64),

    /// Unsigned integer.
    Unsigned(u64),

    /// Scaled physical quantity.
    Float(f64),

    /// Textual value (callsigns, hex, octal renderings).
    String(String),

    /// Opaque payload (Explicit items without an inner format).
    Bytes(Vec<u8>),

    /// Nested structure (Fixed field groups, Compound subfields).
    Nested(FieldMap),

    /// Repetition (Repetitive and Variable items, BDS registers).
    Array(Vec<FieldValue>),

    /// Single presence or status bit.
    BitFlag(bool),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Unsigned(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Unsigned(v) => Some(*v),
            FieldValue::Integer(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Unsigned(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::BitFlag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Nested(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, FieldValue::Nested(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldValue::Array(_))
    }
}
