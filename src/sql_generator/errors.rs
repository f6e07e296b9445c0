use thiserror::Error;

use crate::catalog::CatalogError;
use crate::dialect::DialectError;

#[derive(Debug, Error)]
pub enum SqlGeneratorError {
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("Property '{0}' maps to a primary key column and cannot be assigned")]
    ImmutableColumn(String),

    #[error("Row limit cannot be combined with this predicate on the target engine: {0}")]
    UnsupportedLimitCombination(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Dialect(#[from] DialectError),
}
