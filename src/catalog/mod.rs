//! Entity metadata catalog
//!
//! Maps logical entity properties (including shadow properties that have no
//! field on the mapped type) to physical columns, declared SQL types, and
//! optional value converters. Metadata is supplied by the collaborating ORM
//! runtime, either built in code or loaded from YAML, and is cached for the
//! process lifetime: registered once, then read concurrently.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::debug;
use serde::{Deserialize, Serialize};

mod errors;
mod value;

pub use errors::CatalogError;
pub use value::{SqlValue, ValueConverter};

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Per-instance property value map. Supplies values for shadow properties
/// (and explicit-instance assignments generally); keyed by property name.
pub type PropertyOverlay = HashMap<String, SqlValue>;

/// Case-insensitive overlay lookup. Property names compare case-insensitively
/// throughout, matching how callers reference them.
pub fn overlay_get<'a>(overlay: &'a PropertyOverlay, property: &str) -> Option<&'a SqlValue> {
    overlay.get(property).or_else(|| {
        overlay
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    })
}

fn default_true() -> bool {
    true
}

/// Logical property -> physical column mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub property: String,
    pub column: String,
    pub sql_type: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    /// Property exists only in metadata, not on the mapped type.
    #[serde(default)]
    pub shadow: bool,
    /// Registered programmatically after load; never serialized.
    #[serde(skip)]
    pub converter: Option<ValueConverter>,
}

/// Read-only description of one mapped entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub entity: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub table: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub columns: Vec<ColumnMapping>,
}

impl EntityMetadata {
    /// The table alias used in generated statements. Defaults to the first
    /// character of the table name, lowercased (`Item` -> `i`).
    pub fn table_alias(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self
                .table
                .chars()
                .next()
                .map(|c| c.to_ascii_lowercase().to_string())
                .unwrap_or_else(|| "t".to_string()),
        }
    }

    fn find(&self, property: &str, shadow: bool) -> Option<&ColumnMapping> {
        self.columns
            .iter()
            .find(|c| c.shadow == shadow && c.property.eq_ignore_ascii_case(property))
    }

    /// Resolve an ordinary (non-shadow) property.
    pub fn resolve(&self, property: &str) -> Result<&ColumnMapping> {
        self.find(property, false).ok_or_else(|| CatalogError::UnknownProperty {
            entity: self.entity.clone(),
            property: property.to_string(),
        })
    }

    /// Resolve a shadow property: present in metadata only.
    pub fn resolve_shadow(&self, property: &str) -> Result<&ColumnMapping> {
        self.find(property, true).ok_or_else(|| CatalogError::UnknownProperty {
            entity: self.entity.clone(),
            property: property.to_string(),
        })
    }

    /// Resolve a property through the ordinary path, falling back to the
    /// shadow path on a miss. Once resolved, shadow and ordinary columns are
    /// treated identically.
    pub fn resolve_any(&self, property: &str) -> Result<&ColumnMapping> {
        self.resolve(property).or_else(|_| self.resolve_shadow(property))
    }

    /// Attach a value converter to a property after metadata load.
    pub fn set_converter(&mut self, property: &str, converter: ValueConverter) -> Result<()> {
        let entity = self.entity.clone();
        let mapping = self
            .columns
            .iter_mut()
            .find(|c| c.property.eq_ignore_ascii_case(property))
            .ok_or_else(|| CatalogError::UnknownProperty {
                entity,
                property: property.to_string(),
            })?;
        mapping.converter = Some(converter);
        Ok(())
    }
}

/// Process-lifetime entity metadata cache. Populated at load time, then
/// read-only; concurrent reads from multiple batch calls are safe.
#[derive(Debug, Default)]
pub struct EntityCatalog {
    entities: RwLock<HashMap<String, Arc<EntityMetadata>>>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, metadata: EntityMetadata) {
        debug!(
            "registering entity '{}' ({} columns, table {})",
            metadata.entity,
            metadata.columns.len(),
            metadata.table
        );
        let mut entities = self.entities.write().expect("catalog lock poisoned");
        entities.insert(metadata.entity.clone(), Arc::new(metadata));
    }

    /// Load one or more entity descriptions from YAML. Converters are
    /// registered separately after load.
    pub fn load_yaml(&self, yaml: &str) -> Result<()> {
        let loaded: Vec<EntityMetadata> = serde_yaml::from_str(yaml)?;
        for metadata in loaded {
            self.register(metadata);
        }
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Result<Arc<EntityMetadata>> {
        let entities = self.entities.read().expect("catalog lock poisoned");
        entities
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownEntity(name.to_string()))
    }

    /// Resolve an ordinary property on a registered entity.
    pub fn resolve(&self, entity: &str, property: &str) -> Result<ColumnMapping> {
        let metadata = self.entity(entity)?;
        metadata.resolve(property).cloned()
    }

    /// Resolve a shadow property on a registered entity.
    pub fn resolve_shadow(&self, entity: &str, property: &str) -> Result<ColumnMapping> {
        let metadata = self.entity(entity)?;
        metadata.resolve_shadow(property).cloned()
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_CATALOG: EntityCatalog = EntityCatalog::new();
}

/// The shared process-wide catalog, for callers that register metadata once
/// at startup.
pub fn global() -> &'static EntityCatalog {
    &GLOBAL_CATALOG
}
