//! serde data model of the category definition XML.
//!
//! These types mirror the document structure one-to-one and perform no
//! validation beyond what deserialization enforces; [`crate::transform`]
//! turns them into the checked runtime model.

use serde::Deserialize;

/// `<Category id=".." name=".." ver="..">` root element.
#[derive(Debug, Deserialize)]
pub struct XmlCategory {
    #[serde(rename = "@id")]
    pub id: u8,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@ver", default)]
    pub ver: String,

    #[serde(rename = "@filtered", default)]
    pub filtered: bool,

    #[serde(rename = "DataItem", default)]
    pub items: Vec<XmlDataItem>,

    #[serde(rename = "UAP", default)]
    pub uaps: Vec<XmlUap>,
}

/// `<UAP [use_if_bit=".." use_if_value=".."]>` element.
#[derive(Debug, Deserialize)]
pub struct XmlUap {
    #[serde(rename = "@use_if_bit")]
    pub use_if_bit: Option<u8>,

    #[serde(rename = "@use_if_value")]
    pub use_if_value: Option<u8>,

    #[serde(rename = "UAPItem", default)]
    pub items: Vec<XmlUapItem>,
}

/// `<UAPItem bit="FRN">item-id</UAPItem>`.
///
/// The text content names the data item; `-` (or nothing) marks a spare
/// slot and `FX` marks an extender slot.
#[derive(Debug, Deserialize)]
pub struct XmlUapItem {
    #[serde(rename = "@bit")]
    pub bit: u8,

    #[serde(rename = "@presence_only", default)]
    pub presence_only: bool,

    #[serde(rename = "$text", default)]
    pub item: String,
}

/// `<DataItem id=".." rule="..">` with exactly one format child.
#[derive(Debug, Deserialize)]
pub struct XmlDataItem {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@rule", default)]
    pub rule: String,

    #[serde(rename = "@definition")]
    pub definition: Option<String>,

    /// The structural definition of this item.
    #[serde(rename = "$value")]
    pub format: XmlFormat,
}

/// The six format kinds a data item can declare.
#[derive(Debug, Deserialize)]
pub enum XmlFormat {
    Fixed(XmlFixed),
    Variable(XmlVariable),
    Repetitive(XmlRepetitive),
    Compound(XmlCompound),
    Explicit(XmlExplicit),
    BDS(XmlBds),
}

/// `<Fixed length="L">` with its bit fields.
#[derive(Debug, Deserialize)]
pub struct XmlFixed {
    #[serde(rename = "@length")]
    pub length: usize,

    #[serde(rename = "Bits", default)]
    pub bits: Vec<XmlBits>,
}

/// `<Variable>`: one `<Fixed>` per extent part.
#[derive(Debug, Deserialize)]
pub struct XmlVariable {
    #[serde(rename = "Fixed", default)]
    pub parts: Vec<XmlFixed>,
}

/// `<Repetitive>`: the repeated element layout.
#[derive(Debug, Deserialize)]
pub struct XmlRepetitive {
    #[serde(rename = "Fixed")]
    pub element: XmlFixed,
}

/// `<Compound>`: ordered presence-mapped subfields.
#[derive(Debug, Deserialize)]
pub struct XmlCompound {
    #[serde(rename = "Subfield", default)]
    pub subfields: Vec<XmlSubfield>,
}

/// `<Subfield name="..">` wrapping one format child.
#[derive(Debug, Deserialize)]
pub struct XmlSubfield {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "$value")]
    pub format: Box<XmlFormat>,
}

/// `<Explicit>`: empty for opaque payloads, or one inner format.
#[derive(Debug, Default, Deserialize)]
pub struct XmlExplicit {
    #[serde(rename = "$value", default)]
    pub inner: Option<Box<XmlFormat>>,
}

/// `<BDS>`: catalogue of Mode-S register layouts.
#[derive(Debug, Deserialize)]
pub struct XmlBds {
    #[serde(rename = "Register", default)]
    pub registers: Vec<XmlRegister>,
}

/// `<Register id="0x40">` with the 7-byte payload layout.
#[derive(Debug, Deserialize)]
pub struct XmlRegister {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "Fixed")]
    pub layout: XmlFixed,
}

/// `<Bits from=".." to="..">` (or `bit=".."` for a single bit).
#[derive(Debug, Deserialize)]
pub struct XmlBits {
    #[serde(rename = "@from")]
    pub from: Option<u32>,

    #[serde(rename = "@to")]
    pub to: Option<u32>,

    #[serde(rename = "@bit")]
    pub bit: Option<u32>,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@desc")]
    pub desc: Option<String>,

    #[serde(rename = "@encode")]
    pub encode: Option<String>,

    #[serde(rename = "@scale")]
    pub scale: Option<f64>,

    #[serde(rename = "@unit")]
    pub unit: Option<String>,

    #[serde(rename = "@decimals")]
    pub decimals: Option<u8>,

    #[serde(rename = "BitsValue", default)]
    pub values: Vec<XmlBitsValue>,
}

/// `<BitsValue val="n">meaning</BitsValue>`.
#[derive(Debug, Deserialize)]
pub struct XmlBitsValue {
    #[serde(rename = "@val")]
    pub val: u64,

    #[serde(rename = "$text", default)]
    pub meaning: String,
}
