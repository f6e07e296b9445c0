use thiserror::Error;

use super::EngineKind;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DialectError {
    #[error("Unsupported database engine '{0}' (no dialect profile registered)")]
    UnsupportedEngine(EngineKind),
}
