//! SET clause translation
//!
//! Converts either an explicit-column prototype instance or a projection
//! expression into an ordered assignment list. A column absent from the
//! input never appears in the generated SET clause; a self-referencing
//! right-hand side compiles into the fragment and is never evaluated
//! client-side.

use crate::catalog::{overlay_get, SqlValue};
use crate::expr::{Expr, UpdateSpec};

use super::common::render_expr;
use super::params::ParamBag;
use super::{Result, SqlGeneratorError, TranslationContext};

/// One SET entry. `param` is the bound-parameter index for a plain value
/// assignment, or None for a fragment computed from the row itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub fragment: String,
    pub param: Option<usize>,
}

/// Ordered assignment list; empty for deletes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssignmentSpec {
    pub entries: Vec<Assignment>,
}

impl AssignmentSpec {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The SET body in entry order (never re-sorted).
    pub fn to_set_body(&self, ctx: &TranslationContext<'_>) -> String {
        self.entries
            .iter()
            .map(|a| format!("{} = {}", ctx.profile.quote_ident(&a.column), a.fragment))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Translate an update input into an ordered assignment list. Assigning a
/// primary-key property is rejected in either input shape.
pub fn translate_update(
    ctx: &TranslationContext<'_>,
    spec: &UpdateSpec,
    params: &mut ParamBag,
) -> Result<AssignmentSpec> {
    let entries = match spec {
        UpdateSpec::Instance { values, columns } => {
            let mut entries = Vec::with_capacity(columns.len());
            for property in columns {
                let column = ctx.entity.resolve_any(property)?;
                if column.primary_key {
                    return Err(SqlGeneratorError::ImmutableColumn(property.clone()));
                }
                // A listed column missing from the overlay is an explicit
                // null-out, distinct from an unlisted (untouched) column.
                let value = overlay_get(values, property)
                    .cloned()
                    .unwrap_or(SqlValue::Null);
                let stored = match column.converter {
                    Some(converter) => converter.store(&value),
                    None => value,
                };
                let ordinal = params.next_ordinal();
                let fragment = params.bind(stored, ctx.profile.param_style);
                entries.push(Assignment {
                    column: column.column.clone(),
                    fragment,
                    param: Some(ordinal),
                });
            }
            entries
        }
        UpdateSpec::Projection(pairs) => {
            let mut entries = Vec::with_capacity(pairs.len());
            for (property, value_expr) in pairs {
                let column = ctx.entity.resolve_any(property)?;
                if column.primary_key {
                    return Err(SqlGeneratorError::ImmutableColumn(property.clone()));
                }
                match value_expr {
                    Expr::Literal(value) => {
                        let stored = match column.converter {
                            Some(converter) => converter.store(value),
                            None => value.clone(),
                        };
                        let ordinal = params.next_ordinal();
                        let fragment = params.bind(stored, ctx.profile.param_style);
                        entries.push(Assignment {
                            column: column.column.clone(),
                            fragment,
                            param: Some(ordinal),
                        });
                    }
                    computed => {
                        let fragment = render_expr(ctx, computed, params)?;
                        entries.push(Assignment {
                            column: column.column.clone(),
                            fragment,
                            param: None,
                        });
                    }
                }
            }
            entries
        }
    };

    if entries.is_empty() {
        return Err(SqlGeneratorError::UnsupportedExpression(
            "update requires at least one assigned column".to_string(),
        ));
    }

    Ok(AssignmentSpec { entries })
}
