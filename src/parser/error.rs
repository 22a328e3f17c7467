use thiserror::Error as ThisError;

use super::tokenizer::Token;

/// Everything that can sink a block. The driver reports all of them the same
/// way; the detail only reaches the debug log.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: &'static str, found: Token },
    #[error("variable '{0}' is not declared")]
    Undeclared(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot cast {0} to int")]
    NonFiniteCast(f64),
    #[error("expressions nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

impl Error {
    pub(crate) fn unexpected(expected: &'static str, found: &Token) -> Self {
        Self::UnexpectedToken {
            expected,
            found: found.clone(),
        }
    }
}
