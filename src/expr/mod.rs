//! Predicate and assignment expression trees
//!
//! A closed, tagged AST consumed by the SQL generator. Every node kind has an
//! explicit, exhaustively-matched translation rule per dialect; a construct
//! the target dialect cannot express fails loudly instead of being dropped.

use serde::{Deserialize, Serialize};

use crate::catalog::{PropertyOverlay, SqlValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal operand, always bound through the parameter channel.
    Literal(SqlValue),

    /// Member access on the batch target row.
    Property(String),

    /// Binary operator application: comparison, boolean logic, arithmetic.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Membership test over a finite value set, compiled to `IN (...)` with
    /// one parameter per element.
    InList { expr: Box<Expr>, values: Vec<SqlValue> },

    /// Conditional SUM over a related collection, compiled to a correlated
    /// scalar subquery on engines that support it.
    RelatedSum(RelatedSum),
}

/// Navigation-to-aggregate: sum a property over related rows joined by
/// `related.related_key = parent.parent_key`, optionally filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedSum {
    /// Related entity name in the catalog.
    pub entity: String,
    /// Join property on the related entity.
    pub related_key: String,
    /// Join property on the batch target entity.
    pub parent_key: String,
    /// Filter over related entity properties.
    pub filter: Option<Box<Expr>>,
    /// Summed property on the related entity.
    pub sum: String,
}

impl Expr {
    pub fn prop(name: impl Into<String>) -> Self {
        Expr::Property(name.into())
    }

    pub fn lit(value: impl Into<SqlValue>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::And, lhs, rhs)
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Or, lhs, rhs)
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Eq, lhs, rhs)
    }

    pub fn ne(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Ne, lhs, rhs)
    }

    pub fn le(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Le, lhs, rhs)
    }

    pub fn ge(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Ge, lhs, rhs)
    }

    pub fn gt(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Gt, lhs, rhs)
    }

    /// Membership over a finite value set.
    pub fn in_list(expr: Expr, values: Vec<SqlValue>) -> Self {
        Expr::InList {
            expr: Box::new(expr),
            values,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }
}

/// The two assignment input shapes. Both produce an equivalent ordered
/// assignment list; a column absent from either never appears in the
/// generated SET clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateSpec {
    /// A prototype instance with a caller-supplied explicit column list.
    /// Only listed columns are included; a listed column whose overlay value
    /// is null (or missing) means `SET col = NULL`, while an unlisted column
    /// is left untouched.
    Instance {
        values: PropertyOverlay,
        columns: Vec<String>,
    },

    /// A record-construction projection: each entry becomes one assignment.
    /// Right-hand sides may reference properties of the row being updated;
    /// such self-referencing expressions compile into the SQL fragment and
    /// are never evaluated client-side.
    Projection(Vec<(String, Expr)>),
}

impl UpdateSpec {
    /// Instance shape from (property, value) pairs; the explicit column list
    /// is taken in the given order.
    pub fn instance(pairs: Vec<(&str, SqlValue)>) -> Self {
        let columns = pairs.iter().map(|(name, _)| name.to_string()).collect();
        let values = pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        UpdateSpec::Instance { values, columns }
    }

    pub fn projection(pairs: Vec<(&str, Expr)>) -> Self {
        UpdateSpec::Projection(
            pairs
                .into_iter()
                .map(|(name, expr)| (name.to_string(), expr))
                .collect(),
        )
    }
}
