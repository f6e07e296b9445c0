//! Per-engine dialect profiles
//!
//! Single source of per-engine capability truth: identifier quoting, alias
//! form, row-limit syntax and support level, predicate complexity, parameter
//! placeholder style. All capability checks run against these profiles during
//! statement assembly, never at arbitrary call sites.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

mod errors;

pub use errors::DialectError;

pub type Result<T> = std::result::Result<T, DialectError>;

/// Database engines this crate knows about. Having a variant does not imply
/// a dialect profile exists for it; see [`describe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineKind {
    SqlServer,
    Sqlite,
    MySql,
    PostgreSql,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::SqlServer => "SqlServer",
            EngineKind::Sqlite => "Sqlite",
            EngineKind::MySql => "MySql",
            EngineKind::PostgreSql => "PostgreSql",
        };
        write!(f, "{}", name)
    }
}

/// Identifier quote pair, e.g. `[`/`]` or `"`/`"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotePair {
    pub open: char,
    pub close: char,
}

impl QuotePair {
    /// Quote an identifier, doubling any embedded closing quote so a
    /// metadata-supplied name can never break out of identifier position.
    pub fn quote(&self, ident: &str) -> String {
        let mut out = String::with_capacity(ident.len() + 2);
        out.push(self.open);
        for ch in ident.chars() {
            out.push(ch);
            if ch == self.close {
                out.push(self.close);
            }
        }
        out.push(self.close);
        out
    }
}

/// How the table alias is emitted after the table reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasForm {
    /// `"Item" AS "i"`
    QuotedAs,
    /// `[Item] AS i`
    BareAs,
}

/// Where the row-limit directive sits in the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimitForm {
    /// `UPDATE TOP(n) ...` / `DELETE TOP(n) FROM ...`
    TopPrefix,
    /// `... LIMIT n` at statement end
    LimitSuffix,
}

/// Which predicate shapes a row limit may be combined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimitSupport {
    AnyPredicate,
    SinglePredicateOnly,
    Unsupported,
}

/// Parameter placeholder convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `@p0`, `@p1`, ... (bound by name)
    AtNamed,
    /// `?1`, `?2`, ... (1-based index)
    QuestionIndexed,
    /// `?` (bound strictly in text order)
    QuestionPositional,
}

impl ParamStyle {
    /// Placeholder text for the parameter with the given zero-based ordinal.
    pub fn placeholder(&self, ordinal: usize) -> String {
        match self {
            ParamStyle::AtNamed => format!("@p{}", ordinal),
            ParamStyle::QuestionIndexed => format!("?{}", ordinal + 1),
            ParamStyle::QuestionPositional => "?".to_string(),
        }
    }
}

/// String concatenation form for `+` over string operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatStyle {
    /// `a + b`
    PlusOperator,
    /// `a || b`
    DoublePipe,
    /// `CONCAT(a, b)`
    ConcatFunction,
}

/// Immutable per-engine facts. One instance per supported engine, selected
/// by connection identity at call time.
#[derive(Debug, Clone, PartialEq)]
pub struct DialectProfile {
    pub engine: EngineKind,
    pub quotes: QuotePair,
    pub alias_form: AliasForm,
    pub limit_form: RowLimitForm,
    pub limit_support: RowLimitSupport,
    /// Maximum number of top-level WHERE conditions. None = unlimited.
    pub max_where_conditions: Option<usize>,
    pub param_style: ParamStyle,
    pub concat_style: ConcatStyle,
    pub correlated_subqueries: bool,
}

impl DialectProfile {
    pub fn allows_conjunctions(&self, count: usize) -> bool {
        match self.max_where_conditions {
            Some(max) => count <= max,
            None => true,
        }
    }

    /// Whether a row limit is legal together with `conditions` top-level
    /// WHERE conditions. Callers can check this before translating.
    pub fn allows_limit_with(&self, conditions: usize) -> bool {
        match self.limit_support {
            RowLimitSupport::AnyPredicate => true,
            RowLimitSupport::SinglePredicateOnly => conditions <= 1,
            RowLimitSupport::Unsupported => false,
        }
    }

    pub fn supports_correlated_subquery(&self) -> bool {
        self.correlated_subqueries
    }

    pub fn quote_ident(&self, ident: &str) -> String {
        self.quotes.quote(ident)
    }

    /// Schema-qualified, quoted table reference: `[dbo].[Item]` or `"Item"`.
    pub fn table_ref(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quotes.quote(schema), self.quotes.quote(table)),
            None => self.quotes.quote(table),
        }
    }

    /// The alias as it appears when referencing columns: `"i"` or `i`.
    pub fn alias_ref(&self, alias: &str) -> String {
        match self.alias_form {
            AliasForm::QuotedAs => self.quotes.quote(alias),
            AliasForm::BareAs => alias.to_string(),
        }
    }

    /// The alias clause emitted immediately after the table reference,
    /// including the leading space: ` AS "i"` or ` AS i`.
    pub fn alias_clause(&self, alias: &str) -> String {
        format!(" AS {}", self.alias_ref(alias))
    }
}

// Static dialect profile registry
lazy_static::lazy_static! {
    static ref PROFILES: HashMap<EngineKind, DialectProfile> = {
        let mut m = HashMap::new();

        m.insert(EngineKind::SqlServer, DialectProfile {
            engine: EngineKind::SqlServer,
            quotes: QuotePair { open: '[', close: ']' },
            alias_form: AliasForm::BareAs,
            limit_form: RowLimitForm::TopPrefix,
            limit_support: RowLimitSupport::AnyPredicate,
            max_where_conditions: None,
            param_style: ParamStyle::AtNamed,
            concat_style: ConcatStyle::PlusOperator,
            correlated_subqueries: true,
        });

        m.insert(EngineKind::Sqlite, DialectProfile {
            engine: EngineKind::Sqlite,
            quotes: QuotePair { open: '"', close: '"' },
            alias_form: AliasForm::QuotedAs,
            limit_form: RowLimitForm::LimitSuffix,
            limit_support: RowLimitSupport::Unsupported,
            // Batch statements accept a single top-level condition only.
            max_where_conditions: Some(1),
            param_style: ParamStyle::QuestionIndexed,
            concat_style: ConcatStyle::DoublePipe,
            correlated_subqueries: false,
        });

        m.insert(EngineKind::MySql, DialectProfile {
            engine: EngineKind::MySql,
            quotes: QuotePair { open: '`', close: '`' },
            alias_form: AliasForm::BareAs,
            limit_form: RowLimitForm::LimitSuffix,
            limit_support: RowLimitSupport::SinglePredicateOnly,
            max_where_conditions: None,
            param_style: ParamStyle::QuestionPositional,
            concat_style: ConcatStyle::ConcatFunction,
            correlated_subqueries: false,
        });

        m
    };
}

/// Look up the dialect profile for an engine. A miss is a fatal
/// configuration error, never silently defaulted.
pub fn describe(engine: EngineKind) -> Result<&'static DialectProfile> {
    PROFILES
        .get(&engine)
        .ok_or(DialectError::UnsupportedEngine(engine))
}
