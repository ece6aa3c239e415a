use thiserror::Error;

/// Errors raised while loading category definition files.
///
/// Any load error is fatal to the registry build: no partially-validated
/// category is ever exposed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("configuration path not found: {path}")]
    ConfigNotFound { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error in {file}: {detail}")]
    Xml {
        file: String,
        line: Option<u32>,
        detail: String,
    },

    #[error("invalid category definition in {file}: {detail}")]
    Invalid {
        file: String,
        #[source]
        detail: TransformError,
    },
}

/// Validation failures while turning the raw XML model into the runtime
/// model. Each variant names the offending construct.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("category id 0 is reserved")]
    BadCategoryId,

    #[error("duplicate data item '{0}'")]
    DuplicateItem(String),

    #[error("item '{item}': unknown rule '{rule}'")]
    BadRule { item: String, rule: String },

    #[error("item '{item}': field '{field}' has unknown encoding '{encoding}'")]
    BadEncoding {
        item: String,
        field: String,
        encoding: String,
    },

    #[error("item '{item}': fixed length {len} is invalid")]
    BadLength { item: String, len: usize },

    #[error("item '{item}': field '{field}' declares no bit range")]
    MissingBitRange { item: String, field: String },

    #[error("item '{item}': field '{field}' range {from}..={to} does not fit a {len}-byte field")]
    BadBitRange {
        item: String,
        field: String,
        from: u32,
        to: u32,
        len: usize,
    },

    #[error("item '{item}': numeric field '{field}' is wider than 64 bits")]
    TooWide { item: String, field: String },

    #[error("item '{item}': fields '{first}' and '{second}' overlap")]
    OverlappingFields {
        item: String,
        first: String,
        second: String,
    },

    #[error("item '{item}': variable format declares no parts")]
    EmptyVariable { item: String },

    #[error("item '{item}': compound format declares no subfields")]
    EmptyCompound { item: String },

    #[error("item '{item}': duplicate compound subfield '{name}'")]
    DuplicateSubfield { item: String, name: String },

    #[error("item '{item}': BDS register id '{id}' is not a valid register code")]
    BadRegisterId { item: String, id: String },

    #[error("item '{item}': duplicate BDS register {reg:#04x}")]
    DuplicateRegister { item: String, reg: u8 },

    #[error("item '{item}': BDS register {reg:#04x} payload must be 7 bytes, got {len}")]
    BadRegisterLayout { item: String, reg: u8, len: usize },

    #[error("category declares no UAP")]
    MissingUap,

    #[error("UAP declares duplicate FRN {0}")]
    DuplicateFrn(u8),

    #[error("UAP FRN {frn} references undefined item '{item}'")]
    UndefinedItem { frn: u8, item: String },

    #[error("UAP FRN 0 is invalid; FRNs are 1-based")]
    BadFrn,

    #[error("UAP selector needs both use_if_bit and use_if_value")]
    IncompleteSelector,

    #[error("UAP selector bit {0} is outside 1..=8")]
    BadSelectorBit(u8),
}
