//! Shared expression-to-SQL rendering
//!
//! Every parameterizable operand is routed through the parameter bag;
//! fragments never embed raw literal text for values.

use crate::catalog::{SqlValue, ValueConverter};
use crate::dialect::ConcatStyle;
use crate::expr::{BinaryOp, Expr, RelatedSum};

use super::params::ParamBag;
use super::{Result, SqlGeneratorError, TranslationContext};

/// Render an expression into a SQL fragment, binding literals as parameters.
pub(super) fn render_expr(
    ctx: &TranslationContext<'_>,
    expr: &Expr,
    params: &mut ParamBag,
) -> Result<String> {
    match expr {
        Expr::Literal(value) => Ok(params.bind(value.clone(), ctx.profile.param_style)),
        Expr::Property(name) => render_property(ctx, name),
        Expr::Binary { op, lhs, rhs } if op.is_logical() => {
            let left = render_logical_operand(ctx, *op, lhs, params)?;
            let right = render_logical_operand(ctx, *op, rhs, params)?;
            Ok(format!("{} {} {}", left, op.sql_symbol(), right))
        }
        Expr::Binary { op, lhs, rhs } if op.is_comparison() => {
            render_comparison(ctx, *op, lhs, rhs, params)
        }
        Expr::Binary { op: BinaryOp::Add, lhs, rhs } if contains_string_literal(expr) => {
            render_concat(ctx, lhs, rhs, params)
        }
        Expr::Binary { op, lhs, rhs } => {
            let left = render_arithmetic_operand(ctx, lhs, params)?;
            let right = render_arithmetic_operand(ctx, rhs, params)?;
            Ok(format!("{} {} {}", left, op.sql_symbol(), right))
        }
        Expr::InList { expr, values } => render_in_list(ctx, expr, values, params),
        Expr::RelatedSum(related) => render_related_sum(ctx, related, params),
    }
}

/// Qualified, quoted column reference for a property of the target entity.
pub(super) fn render_property(ctx: &TranslationContext<'_>, name: &str) -> Result<String> {
    let column = ctx.entity.resolve_any(name)?;
    Ok(format!(
        "{}.{}",
        ctx.alias_ref(),
        ctx.profile.quote_ident(&column.column)
    ))
}

/// The converter of the column on the other side of a comparison, if any.
/// A literal compared against a converted column must pass through the same
/// to-storage conversion, or stored values would never match.
fn peer_converter(ctx: &TranslationContext<'_>, peer: &Expr) -> Result<Option<ValueConverter>> {
    match peer {
        Expr::Property(name) => Ok(ctx.entity.resolve_any(name)?.converter),
        _ => Ok(None),
    }
}

fn render_comparison(
    ctx: &TranslationContext<'_>,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    params: &mut ParamBag,
) -> Result<String> {
    // Null-check forms: `= NULL` / `<> NULL` compile to IS [NOT] NULL.
    let null_form = |other: &Expr, params: &mut ParamBag| -> Result<Option<String>> {
        let keyword = match op {
            BinaryOp::Eq => "IS NULL",
            BinaryOp::Ne => "IS NOT NULL",
            _ => return Ok(None),
        };
        let target = render_expr(ctx, other, params)?;
        Ok(Some(format!("{} {}", target, keyword)))
    };
    if matches!(rhs, Expr::Literal(SqlValue::Null)) {
        if let Some(sql) = null_form(lhs, params)? {
            return Ok(sql);
        }
    }
    if matches!(lhs, Expr::Literal(SqlValue::Null)) {
        if let Some(sql) = null_form(rhs, params)? {
            return Ok(sql);
        }
    }

    let left = render_comparison_operand(ctx, lhs, rhs, params)?;
    let right = render_comparison_operand(ctx, rhs, lhs, params)?;
    Ok(format!("{} {} {}", left, op.sql_symbol(), right))
}

fn render_comparison_operand(
    ctx: &TranslationContext<'_>,
    operand: &Expr,
    peer: &Expr,
    params: &mut ParamBag,
) -> Result<String> {
    match operand {
        Expr::Literal(value) => {
            let stored = match peer_converter(ctx, peer)? {
                Some(converter) => converter.store(value),
                None => value.clone(),
            };
            Ok(params.bind(stored, ctx.profile.param_style))
        }
        other => render_expr(ctx, other, params),
    }
}

fn render_logical_operand(
    ctx: &TranslationContext<'_>,
    parent: BinaryOp,
    operand: &Expr,
    params: &mut ParamBag,
) -> Result<String> {
    let sql = render_expr(ctx, operand, params)?;
    match operand {
        // A nested group of the other combinator keeps its own parentheses.
        Expr::Binary { op, .. } if op.is_logical() && *op != parent => Ok(format!("({})", sql)),
        _ => Ok(sql),
    }
}

fn render_arithmetic_operand(
    ctx: &TranslationContext<'_>,
    operand: &Expr,
    params: &mut ParamBag,
) -> Result<String> {
    let sql = render_expr(ctx, operand, params)?;
    match operand {
        Expr::Binary { op, .. } if !op.is_logical() && !op.is_comparison() => {
            Ok(format!("({})", sql))
        }
        _ => Ok(sql),
    }
}

/// Check if an expression contains a string literal (recursively through
/// nested `+` operations), which switches `+` to the dialect's
/// concatenation form.
fn contains_string_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(SqlValue::Text(_)) => true,
        Expr::Binary { op: BinaryOp::Add, lhs, rhs } => {
            contains_string_literal(lhs) || contains_string_literal(rhs)
        }
        _ => false,
    }
}

/// Flatten nested `+` operations into rendered operands for concatenation.
fn flatten_concat_operands(
    ctx: &TranslationContext<'_>,
    expr: &Expr,
    params: &mut ParamBag,
    out: &mut Vec<String>,
) -> Result<()> {
    match expr {
        Expr::Binary { op: BinaryOp::Add, lhs, rhs } => {
            flatten_concat_operands(ctx, lhs, params, out)?;
            flatten_concat_operands(ctx, rhs, params, out)?;
            Ok(())
        }
        other => {
            out.push(render_expr(ctx, other, params)?);
            Ok(())
        }
    }
}

fn render_concat(
    ctx: &TranslationContext<'_>,
    lhs: &Expr,
    rhs: &Expr,
    params: &mut ParamBag,
) -> Result<String> {
    let mut operands = Vec::new();
    flatten_concat_operands(ctx, lhs, params, &mut operands)?;
    flatten_concat_operands(ctx, rhs, params, &mut operands)?;
    let sql = match ctx.profile.concat_style {
        ConcatStyle::PlusOperator => operands.join(" + "),
        ConcatStyle::DoublePipe => operands.join(" || "),
        ConcatStyle::ConcatFunction => format!("CONCAT({})", operands.join(", ")),
    };
    Ok(sql)
}

fn render_in_list(
    ctx: &TranslationContext<'_>,
    expr: &Expr,
    values: &[SqlValue],
    params: &mut ParamBag,
) -> Result<String> {
    if values.is_empty() {
        // Membership in an empty set matches nothing.
        return Ok("0 = 1".to_string());
    }
    let target = render_expr(ctx, expr, params)?;
    let converter = peer_converter(ctx, expr)?;
    let placeholders: Vec<String> = values
        .iter()
        .map(|value| {
            let stored = match converter {
                Some(converter) => converter.store(value),
                None => value.clone(),
            };
            params.bind(stored, ctx.profile.param_style)
        })
        .collect();
    Ok(format!("{} IN ({})", target, placeholders.join(", ")))
}

fn render_related_sum(
    ctx: &TranslationContext<'_>,
    related: &RelatedSum,
    params: &mut ParamBag,
) -> Result<String> {
    if !ctx.profile.supports_correlated_subquery() {
        return Err(SqlGeneratorError::UnsupportedExpression(format!(
            "correlated aggregate subquery over related entity '{}' is not supported on engine {}",
            related.entity, ctx.profile.engine
        )));
    }
    let child = ctx.related(ctx.catalog.entity(&related.entity)?);
    let sum_column = child.entity.resolve_any(&related.sum)?.column.clone();
    let related_key = child.entity.resolve_any(&related.related_key)?.column.clone();
    let parent_key = ctx.entity.resolve_any(&related.parent_key)?.column.clone();

    let profile = ctx.profile;
    let mut sql = format!(
        "(SELECT SUM({}.{}) FROM {}{} WHERE {}.{} = {}.{}",
        child.alias_ref(),
        profile.quote_ident(&sum_column),
        profile.table_ref(child.entity.schema.as_deref(), &child.entity.table),
        profile.alias_clause(&child.alias),
        child.alias_ref(),
        profile.quote_ident(&related_key),
        ctx.alias_ref(),
        profile.quote_ident(&parent_key),
    );
    if let Some(filter) = &related.filter {
        let condition = render_expr(&child, filter, params)?;
        sql.push_str(" AND (");
        sql.push_str(&condition);
        sql.push(')');
    }
    sql.push(')');
    Ok(sql)
}
