use core::fmt;

use thiserror::Error;
use tracing::debug;

use crate::Value;
use crate::parser::PatternError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("pattern syntax error: {0}")]
    PatternSyntax(#[from] PatternError),
    #[error("unsupported value type for argument {key:?}: expected {expected}")]
    UnsupportedValueType { key: String, expected: &'static str },
    #[error("invalid value for argument {key:?}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("locale data error: {0}")]
    Data(String),
    #[error("internal error: {0}")]
    Internal(&'static str),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub(crate) fn data(err: impl fmt::Display) -> Self {
        CoreError::Data(err.to_string())
    }

    pub(crate) fn unsupported(key: &str, expected: &'static str) -> Self {
        CoreError::UnsupportedValueType {
            key: key.to_string(),
            expected,
        }
    }

    /// A render-time argument whose value cannot feed its formatter.
    pub(crate) fn mismatch(key: &str, value: &Value, expected: &'static str) -> Self {
        debug!(key, found = value.type_name(), expected, "argument type mismatch");
        Self::unsupported(key, expected)
    }
}
