use asterix_core::DecodeError;
use asterix_registry::LoadError;
use thiserror::Error;

/// Unified error type of the decoder.
///
/// Load-time errors abort the registry build. Parse-time errors never abort
/// the whole call: structural ones ([`MalformedBlock`](Self::MalformedBlock))
/// end the scan of the current buffer, item-level ones are contained to one
/// record. Both are returned alongside whatever decoded cleanly.
#[derive(Debug, Error)]
pub enum AsterixError {
    #[error("configuration path not found: {path}")]
    ConfigNotFound { path: String },

    #[error("failed to read {path}: {detail}")]
    ConfigIo { path: String, detail: String },

    #[error("XML error in {file}: {detail}")]
    XmlParse {
        file: String,
        line: Option<u32>,
        detail: String,
    },

    #[error("invalid category {cat}: {reason}")]
    InvalidCategory { cat: u8, reason: String },

    #[error("unknown item I{cat:03}/{item}")]
    UnknownItem { cat: u8, item: String },

    #[error("unknown field '{field}' in item {item}")]
    UnknownField { item: String, field: String },

    #[error("malformed data block at offset {offset}: {detail}")]
    MalformedBlock { offset: usize, detail: String },

    #[error("unknown compound subfield bit {bit} in item {item}")]
    UnknownSubfield { item: String, bit: u8 },

    #[error("value '{value}' is not numeric")]
    BadValue { value: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("decoder not initialised: call init() or load_category() first")]
    NotInitialized,

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl From<LoadError> for AsterixError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::ConfigNotFound { path } => AsterixError::ConfigNotFound { path },
            LoadError::Io { path, source } => AsterixError::ConfigIo {
                path,
                detail: source.to_string(),
            },
            LoadError::Xml { file, line, detail } => AsterixError::XmlParse { file, line, detail },
            LoadError::Invalid { file, detail } => AsterixError::XmlParse {
                file,
                line: None,
                detail: detail.to_string(),
            },
        }
    }
}
