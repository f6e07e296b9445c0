//! Ordered parameter collection

use crate::catalog::SqlValue;
use crate::dialect::ParamStyle;

/// One bound parameter. `name` is the bare name (`p0`) for dialects that
/// bind by name; positional dialects bind in vector order, which matches
/// placeholder order in the statement text.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    pub name: String,
    pub value: SqlValue,
}

/// Collects bound parameters in traversal order and hands out the matching
/// dialect placeholder text. Numbering is deterministic (`p0`, `p1`, ...),
/// so re-translating the same tree yields byte-identical SQL.
#[derive(Debug, Default)]
pub struct ParamBag {
    params: Vec<BoundParam>,
}

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordinal the next bound parameter will receive.
    pub fn next_ordinal(&self) -> usize {
        self.params.len()
    }

    /// Bind a value and return its placeholder text.
    pub fn bind(&mut self, value: SqlValue, style: ParamStyle) -> String {
        let ordinal = self.params.len();
        self.params.push(BoundParam {
            name: format!("p{}", ordinal),
            value,
        });
        style.placeholder(ordinal)
    }

    pub fn params(&self) -> &[BoundParam] {
        &self.params
    }

    pub fn into_params(self) -> Vec<BoundParam> {
        self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
