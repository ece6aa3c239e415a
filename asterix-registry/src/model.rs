//! Validated runtime model of a category definition.
//!
//! Built once by [`crate::transform`] and then only ever read; nothing in
//! this module mutates after construction.

use std::collections::BTreeMap;

/// One ASTERIX category: its UAP(s) and data item descriptions.
#[derive(Debug, Clone)]
pub struct Category {
    /// Category number, 1..=255.
    pub id: u8,
    pub name: String,
    pub version: String,
    /// Declared UAPs in source order; selection rules live in
    /// [`select_uap`](Self::select_uap).
    pub uaps: Vec<Uap>,
    /// Data items keyed by their bare id (`"010"`, `"SP"`, ...).
    pub items: BTreeMap<String, DataItem>,
    /// Legacy filtering marker carried from the definition file. The parser
    /// never consults it; per-call category filters take precedence.
    pub filtered: bool,
}

impl Category {
    pub fn item(&self, id: &str) -> Option<&DataItem> {
        self.items.get(id)
    }

    /// Picks the UAP for a record.
    ///
    /// `first_item_byte` is the byte immediately after the FSPEC (the first
    /// byte of the first present item). Predicated UAPs are tested in
    /// declaration order and the first match wins; with no match the default
    /// (predicate-free) UAP applies, and failing that the first declared.
    pub fn select_uap(&self, first_item_byte: Option<u8>) -> Option<&Uap> {
        if self.uaps.len() <= 1 {
            return self.uaps.first();
        }
        if let Some(byte) = first_item_byte {
            for uap in &self.uaps {
                if let Some(sel) = &uap.use_if {
                    if (byte >> (sel.bit - 1)) & 1 == sel.value & 1 {
                        return Some(uap);
                    }
                }
            }
        }
        self.uaps
            .iter()
            .find(|u| u.use_if.is_none())
            .or(self.uaps.first())
    }
}

/// One User Application Profile: the FRN-to-item mapping of a record.
#[derive(Debug, Clone)]
pub struct Uap {
    pub use_if: Option<UapSelector>,
    /// Slots sorted by FRN.
    pub slots: Vec<UapSlot>,
}

impl Uap {
    pub fn slot(&self, frn: u8) -> Option<&UapSlot> {
        self.slots.iter().find(|s| s.frn == frn)
    }
}

/// Predicate attached to a non-default UAP: selected when the designated
/// bit (1-based from the LSB) of the first item byte equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UapSelector {
    pub bit: u8,
    pub value: u8,
}

/// One FRN position in a UAP.
#[derive(Debug, Clone)]
pub struct UapSlot {
    pub frn: u8,
    /// `None` marks a spare slot: the FSPEC bit exists but no item backs it.
    pub item_id: Option<String>,
    pub is_extender: bool,
    /// Presence-only items carry no bytes; their presence bit is the datum.
    pub is_presence_only: bool,
}

/// How an item's presence is governed by the category specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Mandatory,
    Optional,
    Conditional,
}

/// Description of a single data item.
#[derive(Debug, Clone)]
pub struct DataItem {
    pub id: String,
    pub name: String,
    pub definition: Option<String>,
    pub rule: Rule,
    pub format: Format,
}

impl DataItem {
    /// Finds a named bit field anywhere in this item's descriptor tree.
    pub fn find_field(&self, name: &str) -> Option<&BitField> {
        self.format.find_field(name)
    }
}

/// Structural layout of an item. Parsing dispatches on the variant.
#[derive(Debug, Clone)]
pub enum Format {
    Fixed(Fixed),
    Variable(Variable),
    Repetitive(Repetitive),
    Compound(Compound),
    Explicit(Explicit),
    Bds(Bds),
}

impl Format {
    pub fn kind(&self) -> &'static str {
        match self {
            Format::Fixed(_) => "fixed",
            Format::Variable(_) => "variable",
            Format::Repetitive(_) => "repetitive",
            Format::Compound(_) => "compound",
            Format::Explicit(_) => "explicit",
            Format::Bds(_) => "bds",
        }
    }

    /// Depth-first search for a named bit field; first match wins.
    pub fn find_field(&self, name: &str) -> Option<&BitField> {
        match self {
            Format::Fixed(f) => f.field(name),
            Format::Variable(v) => v.parts.iter().find_map(|p| p.field(name)),
            Format::Repetitive(r) => r.element.field(name),
            Format::Compound(c) => c.subfields.iter().find_map(|s| s.format.find_field(name)),
            Format::Explicit(e) => e.inner.as_ref().and_then(|f| f.find_field(name)),
            Format::Bds(b) => b.registers.values().find_map(|l| l.field(name)),
        }
    }
}

/// Fixed-length layout: `length` bytes split into bit fields.
#[derive(Debug, Clone)]
pub struct Fixed {
    pub length: usize,
    pub fields: Vec<BitField>,
}

impl Fixed {
    pub fn field(&self, name: &str) -> Option<&BitField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// FX-chained sequence of fixed parts; the LSB of each part is the
/// extension bit and is never reported as data.
#[derive(Debug, Clone)]
pub struct Variable {
    pub parts: Vec<Fixed>,
}

/// REP-counted repetition of a fixed element.
#[derive(Debug, Clone)]
pub struct Repetitive {
    pub element: Fixed,
}

/// Presence-bitmapped group of named subfields.
#[derive(Debug, Clone)]
pub struct Compound {
    pub subfields: Vec<Subfield>,
}

/// One compound subfield; its position in the list is its presence bit.
#[derive(Debug, Clone)]
pub struct Subfield {
    pub name: String,
    pub format: Format,
}

/// Length-prefixed payload, opaque unless an inner format is declared.
#[derive(Debug, Clone)]
pub struct Explicit {
    pub inner: Option<Box<Format>>,
}

/// Catalogue of Mode-S register layouts keyed by BDS code.
#[derive(Debug, Clone)]
pub struct Bds {
    pub registers: BTreeMap<u8, Fixed>,
}

/// Value interpretation of a bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Unsigned,
    Signed,
    Ascii,
    SixBit,
    Hex,
    Octal,
    MbData,
    Spare,
}

impl Encoding {
    /// Maps an `encode` attribute keyword; `None` for unknown keywords.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "unsigned" => Some(Encoding::Unsigned),
            "signed" => Some(Encoding::Signed),
            "ascii" => Some(Encoding::Ascii),
            "sixbit" => Some(Encoding::SixBit),
            "hex" => Some(Encoding::Hex),
            "octal" => Some(Encoding::Octal),
            "mb" => Some(Encoding::MbData),
            "spare" => Some(Encoding::Spare),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Encoding::Unsigned => "unsigned",
            Encoding::Signed => "signed",
            Encoding::Ascii => "ascii",
            Encoding::SixBit => "sixbit",
            Encoding::Hex => "hex",
            Encoding::Octal => "octal",
            Encoding::MbData => "mb",
            Encoding::Spare => "spare",
        }
    }
}

/// One bit range within a fixed layout.
#[derive(Debug, Clone)]
pub struct BitField {
    pub name: String,
    pub description: Option<String>,
    /// Most significant bit of the range, 1-based from the LSB of the field.
    pub from_bit: u32,
    /// Least significant bit of the range.
    pub to_bit: u32,
    pub encoding: Encoding,
    pub scale: Option<f64>,
    pub unit: Option<String>,
    /// Decimal places for rendering scaled values. Derived from the scale
    /// when the definition does not declare it.
    pub decimals: u8,
    pub meanings: BTreeMap<u64, String>,
}

impl BitField {
    pub fn width(&self) -> u32 {
        self.from_bit - self.to_bit + 1
    }

    /// Width rounded up to whole bytes, used for hex zero-padding.
    pub fn byte_width(&self) -> usize {
        (self.width() as usize).div_ceil(8)
    }

    pub fn meaning(&self, raw: u64) -> Option<&str> {
        self.meanings.get(&raw).map(String::as_str)
    }
}
