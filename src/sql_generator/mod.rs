//! Batch SQL generation
//!
//! Translates predicate and assignment expression trees into parameterized,
//! dialect-correct SQL fragments and assembles them into a single batch
//! `UPDATE`/`DELETE` statement. All translation-time failures surface here,
//! before any SQL reaches the engine.

use std::sync::Arc;

use crate::catalog::{EntityCatalog, EntityMetadata};
use crate::dialect::{self, DialectProfile, EngineKind};

mod assignment;
mod common;
mod errors;
mod params;
mod predicate;
mod statement;

pub use assignment::{translate_update, Assignment, AssignmentSpec};
pub use errors::SqlGeneratorError;
pub use params::{BoundParam, ParamBag};
pub use predicate::{translate_predicate, Combinator, TranslatedPredicate};
pub use statement::{assemble, BatchStatement};

pub type Result<T> = std::result::Result<T, SqlGeneratorError>;

/// Shared translation state: the target entity, its alias in the statement,
/// the dialect profile, and catalog access for related-entity lookups.
pub struct TranslationContext<'a> {
    pub catalog: &'a EntityCatalog,
    pub entity: Arc<EntityMetadata>,
    pub alias: String,
    pub profile: &'static DialectProfile,
}

impl<'a> TranslationContext<'a> {
    pub fn new(catalog: &'a EntityCatalog, entity: &str, engine: EngineKind) -> Result<Self> {
        let entity = catalog.entity(entity)?;
        let profile = dialect::describe(engine)?;
        let alias = entity.table_alias();
        Ok(Self {
            catalog,
            entity,
            alias,
            profile,
        })
    }

    /// The alias as referenced in column-qualifying position.
    pub(crate) fn alias_ref(&self) -> String {
        self.profile.alias_ref(&self.alias)
    }

    /// A context for a related entity inside a correlated subquery. The
    /// subquery alias is derived from the related table and nudged if it
    /// would collide with the outer alias.
    pub(crate) fn related(&self, entity: Arc<EntityMetadata>) -> TranslationContext<'a> {
        let mut alias = entity.table_alias();
        if alias == self.alias {
            alias.push('2');
        }
        TranslationContext {
            catalog: self.catalog,
            entity,
            alias,
            profile: self.profile,
        }
    }
}
