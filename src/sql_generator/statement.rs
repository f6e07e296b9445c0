//! Batch statement assembly
//!
//! Fixed clause ordering across dialects so generated statements stay
//! diffable: leading comment, verb, prefix row limit, table, alias, SET,
//! WHERE, suffix row limit. Capability checks run here, before any SQL
//! text exists.

use log::debug;

use crate::dialect::{EngineKind, RowLimitForm, RowLimitSupport};

use super::assignment::AssignmentSpec;
use super::params::{BoundParam, ParamBag};
use super::predicate::TranslatedPredicate;
use super::{Result, SqlGeneratorError, TranslationContext};

/// One fully assembled, fully parameterized batch statement. Constructed
/// once per batch call, executed once, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatement {
    pub engine: EngineKind,
    pub sql: String,
    pub params: Vec<BoundParam>,
}

/// Assemble the final statement from translated parts. The assignment list
/// must be empty for deletes and non-empty for updates.
pub fn assemble(
    ctx: &TranslationContext<'_>,
    predicate: &TranslatedPredicate,
    assignments: &AssignmentSpec,
    limit: Option<u64>,
    leading_comment: Option<&str>,
    is_delete: bool,
    params: ParamBag,
) -> Result<BatchStatement> {
    let profile = ctx.profile;

    if let Some(n) = limit {
        match profile.limit_support {
            RowLimitSupport::Unsupported => {
                return Err(SqlGeneratorError::UnsupportedLimitCombination(format!(
                    "engine {} does not support row-limited batch statements (requested limit {})",
                    profile.engine, n
                )));
            }
            RowLimitSupport::SinglePredicateOnly if predicate.condition_count() > 1 => {
                return Err(SqlGeneratorError::UnsupportedLimitCombination(format!(
                    "engine {} only supports a row limit with a single top-level condition \
                     (predicate has {})",
                    profile.engine,
                    predicate.condition_count()
                )));
            }
            _ => {}
        }
    }

    if is_delete && !assignments.is_empty() {
        return Err(SqlGeneratorError::UnsupportedExpression(
            "delete statement cannot carry an assignment list".to_string(),
        ));
    }
    if !is_delete && assignments.is_empty() {
        return Err(SqlGeneratorError::UnsupportedExpression(
            "update statement requires a non-empty assignment list".to_string(),
        ));
    }

    let mut sql = String::new();

    // Caller-supplied tag text goes first, verbatim, one comment per line.
    if let Some(comment) = leading_comment {
        for line in comment.lines() {
            sql.push_str("-- ");
            sql.push_str(line);
            sql.push('\n');
        }
    }

    sql.push_str(if is_delete { "DELETE" } else { "UPDATE" });

    if let (Some(n), RowLimitForm::TopPrefix) = (limit, profile.limit_form) {
        sql.push_str(&format!(" TOP({})", n));
    }

    if is_delete {
        sql.push_str(" FROM");
    }

    sql.push(' ');
    sql.push_str(&profile.table_ref(ctx.entity.schema.as_deref(), &ctx.entity.table));
    sql.push_str(&profile.alias_clause(&ctx.alias));

    if !is_delete {
        sql.push_str(" SET ");
        sql.push_str(&assignments.to_set_body(ctx));
    }

    if !predicate.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate.to_where_body());
    }

    if let (Some(n), RowLimitForm::LimitSuffix) = (limit, profile.limit_form) {
        sql.push_str(&format!(" LIMIT {}", n));
    }

    debug!(
        "assembled batch {} for entity '{}' on {}: {}",
        if is_delete { "delete" } else { "update" },
        ctx.entity.entity,
        profile.engine,
        sql
    );

    Ok(BatchStatement {
        engine: profile.engine,
        sql,
        params: params.into_params(),
    })
}
