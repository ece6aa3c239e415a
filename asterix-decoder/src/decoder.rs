//! The decoder handle and the process-default convenience wrapper.

use std::path::Path;
use std::sync::{Arc, RwLock};

use asterix_registry::CategoryRegistry;

use crate::error::AsterixError;
use crate::parse::{estimate_blocks, parse_frames};
use crate::render::{OutputFormat, render_block};
use crate::types::{DataBlock, ParseOptions, ParseOutput, ParseResult};

/// An ASTERIX decoder bound to an immutable category registry.
///
/// A `Decoder` is cheap to clone and safe to share across threads; the
/// registry behind it is never mutated by parsing. Loading additional
/// categories swaps in a new registry handle, so decoders cloned earlier
/// keep seeing the set they were created with.
#[derive(Debug, Clone)]
pub struct Decoder {
    registry: Arc<CategoryRegistry>,
}

impl Decoder {
    pub fn new(registry: CategoryRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Builds a decoder from a directory of category definition files.
    pub fn from_config_dir(dir: impl AsRef<Path>) -> Result<Self, AsterixError> {
        Ok(Self::new(CategoryRegistry::from_dir(dir)?))
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Loads one more category file into this handle.
    pub fn load_category_file(&mut self, path: impl AsRef<Path>) -> Result<(), AsterixError> {
        Arc::make_mut(&mut self.registry).load_file(path)?;
        Ok(())
    }

    pub fn is_category_defined(&self, id: u8) -> bool {
        self.registry.is_defined(id)
    }

    /// Decodes every block in `data`.
    ///
    /// Never fails as a whole: structural and item errors are collected in
    /// [`ParseOutput::errors`] next to whatever decoded cleanly.
    pub fn parse(&self, data: &[u8], options: &ParseOptions) -> ParseOutput {
        let out = parse_frames(&self.registry, data, 0, None, options);
        ParseOutput {
            blocks: out.blocks,
            errors: out.errors,
        }
    }

    /// Incremental variant of [`parse`](Self::parse): starts at `offset`,
    /// decodes at most `max_blocks` blocks, and reports how far it got.
    /// `bytes_consumed` is always a whole number of blocks.
    pub fn parse_with_offset(
        &self,
        data: &[u8],
        offset: usize,
        max_blocks: usize,
        options: &ParseOptions,
    ) -> ParseResult {
        let out = parse_frames(&self.registry, data, offset, Some(max_blocks), options);
        let consumed = out.bytes_consumed;
        ParseResult {
            blocks: out.blocks,
            bytes_consumed: consumed,
            remaining_blocks: estimate_blocks(data, offset + consumed),
            errors: out.errors,
        }
    }

    /// Renders one decoded block in the requested output format.
    pub fn render(
        &self,
        block: &DataBlock,
        format: OutputFormat,
        verbose: bool,
    ) -> Result<String, AsterixError> {
        render_block(&self.registry, block, format, verbose)
    }

    /// Describes a category, item, field or field value. See the crate
    /// docs for the level rules.
    pub fn describe(
        &self,
        cat: u8,
        item: Option<&str>,
        field: Option<&str>,
        value: Option<&str>,
    ) -> Result<String, AsterixError> {
        crate::describe::describe(&self.registry, cat, item, field, value)
    }
}

// ---------------------------------------------------------------------------
// Process-default handle.
//
// Single-registry callers get free functions mirroring the Decoder methods.
// The slot is written only by init()/load_category() and read everywhere
// else; a replaced decoder is swapped in whole, never mutated in place.

static DEFAULT: RwLock<Option<Decoder>> = RwLock::new(None);

fn read_default() -> Result<Decoder, AsterixError> {
    let guard = DEFAULT.read().unwrap_or_else(|e| e.into_inner());
    guard.clone().ok_or(AsterixError::NotInitialized)
}

/// Initialises the default decoder from a directory of category files,
/// replacing any previously loaded set.
pub fn init(config_dir: impl AsRef<Path>) -> Result<(), AsterixError> {
    let decoder = Decoder::from_config_dir(config_dir)?;
    let mut guard = DEFAULT.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(decoder);
    Ok(())
}

/// Loads a single category file into the default decoder, creating it if
/// this is the first load. Idempotent per `(id, version)`.
pub fn load_category(path: impl AsRef<Path>) -> Result<(), AsterixError> {
    let mut guard = DEFAULT.write().unwrap_or_else(|e| e.into_inner());
    match guard.as_mut() {
        Some(decoder) => decoder.load_category_file(path),
        None => {
            let mut decoder = Decoder::new(CategoryRegistry::new());
            decoder.load_category_file(path)?;
            *guard = Some(decoder);
            Ok(())
        }
    }
}

pub fn is_category_defined(id: u8) -> bool {
    let guard = DEFAULT.read().unwrap_or_else(|e| e.into_inner());
    guard.as_ref().is_some_and(|d| d.is_category_defined(id))
}

pub fn parse(data: &[u8], options: &ParseOptions) -> Result<ParseOutput, AsterixError> {
    Ok(read_default()?.parse(data, options))
}

pub fn parse_with_offset(
    data: &[u8],
    offset: usize,
    max_blocks: usize,
    options: &ParseOptions,
) -> Result<ParseResult, AsterixError> {
    Ok(read_default()?.parse_with_offset(data, offset, max_blocks, options))
}

pub fn describe(
    cat: u8,
    item: Option<&str>,
    field: Option<&str>,
    value: Option<&str>,
) -> Result<String, AsterixError> {
    read_default()?.describe(cat, item, field, value)
}
