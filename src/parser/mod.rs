mod error;
mod grammar;
pub mod tokenizer;

pub use error::Error;
pub(crate) use grammar::Parser;
pub use tokenizer::{tokenize_string, Token, TokenType, Tokenizer};
