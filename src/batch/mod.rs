//! Top-level batch operations
//!
//! One call compiles a filtered request into a single dialect-correct
//! statement and executes it over the caller's connection. Every
//! translation-time failure is raised before any SQL reaches the engine.

use thiserror::Error;

use crate::catalog::EntityCatalog;
use crate::dialect::EngineKind;
use crate::executor::{self, BatchConnection, BatchOperation, ExecuteError};
use crate::expr::{Expr, UpdateSpec};
use crate::sql_generator::{
    assemble, translate_predicate, translate_update, AssignmentSpec, BatchStatement, ParamBag,
    SqlGeneratorError, TranslatedPredicate, TranslationContext,
};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Generator(#[from] SqlGeneratorError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

pub type Result<T> = std::result::Result<T, BatchError>;

/// A filtered batch request against one entity.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    pub entity: String,
    pub predicate: Option<Expr>,
    /// Affect at most this many matching rows; legality depends on the
    /// dialect profile and predicate shape.
    pub limit: Option<u64>,
    /// Caller-supplied tag, preserved verbatim as a leading SQL comment.
    pub tag: Option<String>,
}

impl BatchRequest {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, predicate: Expr) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn take(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn tag_with(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

fn translate_request(
    ctx: &TranslationContext<'_>,
    request: &BatchRequest,
    params: &mut ParamBag,
) -> std::result::Result<TranslatedPredicate, SqlGeneratorError> {
    match &request.predicate {
        Some(expr) => translate_predicate(ctx, expr, params),
        None => Ok(TranslatedPredicate::empty()),
    }
}

/// Compile a batch update. Assignments are translated before the predicate
/// so placeholders appear in statement-text order (required for dialects
/// that bind strictly positionally).
pub fn compile_update(
    catalog: &EntityCatalog,
    request: &BatchRequest,
    update: &UpdateSpec,
    engine: EngineKind,
) -> Result<BatchStatement> {
    let ctx = TranslationContext::new(catalog, &request.entity, engine)?;
    let mut params = ParamBag::new();
    let assignments = translate_update(&ctx, update, &mut params)?;
    let predicate = translate_request(&ctx, request, &mut params)?;
    let statement = assemble(
        &ctx,
        &predicate,
        &assignments,
        request.limit,
        request.tag.as_deref(),
        false,
        params,
    )?;
    Ok(statement)
}

/// Compile a batch delete.
pub fn compile_delete(
    catalog: &EntityCatalog,
    request: &BatchRequest,
    engine: EngineKind,
) -> Result<BatchStatement> {
    let ctx = TranslationContext::new(catalog, &request.entity, engine)?;
    let mut params = ParamBag::new();
    let predicate = translate_request(&ctx, request, &mut params)?;
    let statement = assemble(
        &ctx,
        &predicate,
        &AssignmentSpec::default(),
        request.limit,
        request.tag.as_deref(),
        true,
        params,
    )?;
    Ok(statement)
}

/// Compile and execute a batch update, returning the affected-row count.
pub async fn batch_update(
    conn: &dyn BatchConnection,
    catalog: &EntityCatalog,
    request: &BatchRequest,
    update: &UpdateSpec,
) -> Result<u64> {
    let statement = compile_update(catalog, request, update, conn.engine())?;
    let affected =
        executor::execute_statement(conn, &statement, &request.entity, BatchOperation::Update)
            .await?;
    Ok(affected)
}

/// Compile and execute a batch delete, returning the affected-row count.
pub async fn batch_delete(
    conn: &dyn BatchConnection,
    catalog: &EntityCatalog,
    request: &BatchRequest,
) -> Result<u64> {
    let statement = compile_delete(catalog, request, conn.engine())?;
    let affected =
        executor::execute_statement(conn, &statement, &request.entity, BatchOperation::Delete)
            .await?;
    Ok(affected)
}
