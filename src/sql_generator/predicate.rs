//! WHERE clause translation

use serde::Serialize;

use crate::expr::{BinaryOp, Expr};

use super::common::render_expr;
use super::params::ParamBag;
use super::{Result, SqlGeneratorError, TranslationContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn sql(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

/// A translated WHERE body: ordered condition fragments joined by a single
/// top-level combinator. Fragments carry no raw literal values; every
/// parameterizable operand went through the parameter channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedPredicate {
    pub conditions: Vec<String>,
    pub combinator: Combinator,
}

impl TranslatedPredicate {
    pub fn empty() -> Self {
        Self {
            conditions: Vec::new(),
            combinator: Combinator::And,
        }
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The WHERE body text, each top-level group parenthesized when more
    /// than one is present.
    pub fn to_where_body(&self) -> String {
        match self.conditions.len() {
            0 => String::new(),
            1 => self.conditions[0].clone(),
            _ => self
                .conditions
                .iter()
                .map(|c| format!("({})", c))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", self.combinator.sql())),
        }
    }
}

/// Split the top-level AND/OR chain into ordered parts sharing one
/// combinator. Nested groups of the other combinator stay inside a part.
fn split_top_level(expr: &Expr) -> (Combinator, Vec<&Expr>) {
    let combinator = match expr {
        Expr::Binary { op: BinaryOp::And, .. } => Combinator::And,
        Expr::Binary { op: BinaryOp::Or, .. } => Combinator::Or,
        _ => return (Combinator::And, vec![expr]),
    };
    let mut parts = Vec::new();
    collect_parts(expr, combinator, &mut parts);
    (combinator, parts)
}

fn collect_parts<'e>(expr: &'e Expr, combinator: Combinator, out: &mut Vec<&'e Expr>) {
    let op = match combinator {
        Combinator::And => BinaryOp::And,
        Combinator::Or => BinaryOp::Or,
    };
    match expr {
        Expr::Binary { op: node_op, lhs, rhs } if *node_op == op => {
            collect_parts(lhs, combinator, out);
            collect_parts(rhs, combinator, out);
        }
        other => out.push(other),
    }
}

/// Translate a predicate tree into a WHERE body for the context's dialect.
/// Fails before any SQL is emitted when the dialect cannot express the
/// predicate (construct or conjunction count).
pub fn translate_predicate(
    ctx: &TranslationContext<'_>,
    expr: &Expr,
    params: &mut ParamBag,
) -> Result<TranslatedPredicate> {
    let (combinator, parts) = split_top_level(expr);
    let conditions = parts
        .iter()
        .map(|part| render_expr(ctx, part, params))
        .collect::<Result<Vec<String>>>()?;

    if !ctx.profile.allows_conjunctions(conditions.len()) {
        return Err(SqlGeneratorError::UnsupportedExpression(format!(
            "predicate has {} top-level conditions but engine {} accepts at most {}",
            conditions.len(),
            ctx.profile.engine,
            ctx.profile.max_where_conditions.unwrap_or(0)
        )));
    }

    Ok(TranslatedPredicate {
        conditions,
        combinator,
    })
}
