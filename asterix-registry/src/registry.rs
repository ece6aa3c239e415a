use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::error::LoadError;
use crate::model::{BitField, Category, DataItem};
use crate::parser::{lint_attributes, parse_category_str};
use crate::transform::build_category;

/// The loaded set of category definitions.
///
/// Built up front from one or more XML files and then observed read-only:
/// parsing never mutates the registry, so any number of parsers can share
/// one instance by reference.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    categories: BTreeMap<u8, Category>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `.xml` file in `dir`, in lexical filename order so the
    /// result is deterministic. Any failing file aborts the whole build.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LoadError::ConfigNotFound {
                path: dir.display().to_string(),
            });
        }
        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(|e| LoadError::Io {
                path: dir.display().to_string(),
                source: e,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
            })
            .collect();
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            registry.load_file(&path)?;
        }
        debug!("loaded {} categories from {}", registry.len(), dir.display());
        Ok(registry)
    }

    /// Loads a single category file. Reloading the same `(id, version)` is
    /// a no-op; a different version of an already-known id replaces it.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoadError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let xml = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.load_str(&xml, &path.display().to_string())
    }

    /// Loads a category from an XML string; `source` names it in errors.
    pub fn load_str(&mut self, xml: &str, source: &str) -> Result<(), LoadError> {
        lint_attributes(xml, source);
        let raw = parse_category_str(xml).map_err(|e| LoadError::Xml {
            file: source.to_string(),
            line: None,
            detail: e.to_string(),
        })?;
        let category = build_category(raw).map_err(|e| LoadError::Invalid {
            file: source.to_string(),
            detail: e,
        })?;
        self.insert(category);
        Ok(())
    }

    fn insert(&mut self, category: Category) {
        match self.categories.get(&category.id) {
            Some(existing) if existing.version == category.version => {
                debug!(
                    "category {} version {} already loaded, skipping",
                    category.id, category.version
                );
            }
            Some(existing) => {
                warn!(
                    "replacing category {} version {} with version {}",
                    category.id, existing.version, category.version
                );
                self.categories.insert(category.id, category);
            }
            None => {
                self.categories.insert(category.id, category);
            }
        }
    }

    pub fn category(&self, id: u8) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn is_defined(&self, id: u8) -> bool {
        self.categories.contains_key(&id)
    }

    pub fn item(&self, cat: u8, item: &str) -> Option<&DataItem> {
        self.category(cat)?.item(item)
    }

    pub fn bitfield(&self, cat: u8, item: &str, field: &str) -> Option<&BitField> {
        self.item(cat, item)?.find_field(field)
    }

    pub fn meaning(&self, cat: u8, item: &str, field: &str, raw: u64) -> Option<&str> {
        self.bitfield(cat, item, field)?.meaning(raw)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAT: &str = r#"
<Category id="48" name="Target Reports" ver="1.21">
  <DataItem id="010" rule="mandatory" name="Data Source Identifier">
    <Fixed length="2">
      <Bits from="16" to="9" name="SAC" desc="System Area Code"/>
      <Bits from="8" to="1" name="SIC" desc="System Identification Code"/>
    </Fixed>
  </DataItem>
  <UAP><UAPItem bit="1">010</UAPItem></UAP>
</Category>
"#;

    #[test]
    fn load_and_look_up() {
        let mut registry = CategoryRegistry::new();
        registry.load_str(CAT, "cat048.xml").unwrap();

        assert!(registry.is_defined(48));
        assert!(!registry.is_defined(62));
        assert_eq!(registry.category(48).unwrap().name, "Target Reports");
        assert_eq!(registry.item(48, "010").unwrap().name, "Data Source Identifier");
        assert_eq!(registry.bitfield(48, "010", "SIC").unwrap().from_bit, 8);
        assert!(registry.bitfield(48, "010", "XYZ").is_none());
    }

    #[test]
    fn reload_same_version_is_noop() {
        let mut registry = CategoryRegistry::new();
        registry.load_str(CAT, "cat048.xml").unwrap();
        registry.load_str(CAT, "cat048.xml").unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn different_version_replaces() {
        let mut registry = CategoryRegistry::new();
        registry.load_str(CAT, "cat048.xml").unwrap();
        let newer = CAT.replace("ver=\"1.21\"", "ver=\"1.30\"");
        registry.load_str(&newer, "cat048_130.xml").unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.category(48).unwrap().version, "1.30");
    }

    #[test]
    fn bad_file_leaves_registry_unchanged() {
        let mut registry = CategoryRegistry::new();
        registry.load_str(CAT, "cat048.xml").unwrap();

        let err = registry.load_str("<Category id=\"62\">", "cat062.xml");
        assert!(err.is_err());
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_defined(62));
    }

    #[test]
    fn missing_dir_is_config_not_found() {
        let err = CategoryRegistry::from_dir("/nonexistent/asterix-config").unwrap_err();
        assert!(matches!(err, LoadError::ConfigNotFound { .. }));
    }

    #[test]
    fn meaning_lookup() {
        let xml = r#"
<Category id="34" ver="1.27">
  <DataItem id="000" rule="mandatory" name="Message Type">
    <Fixed length="1">
      <Bits from="8" to="1" name="MSGTYP">
        <BitsValue val="1">North marker message</BitsValue>
      </Bits>
    </Fixed>
  </DataItem>
  <UAP><UAPItem bit="1">000</UAPItem></UAP>
</Category>
"#;
        let mut registry = CategoryRegistry::new();
        registry.load_str(xml, "cat034.xml").unwrap();

        assert_eq!(
            registry.meaning(34, "000", "MSGTYP", 1),
            Some("North marker message")
        );
        assert_eq!(registry.meaning(34, "000", "MSGTYP", 99), None);
    }
}
