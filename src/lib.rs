mod environment;
pub use environment::{Environment, NumType};

mod parser;
pub use parser::{tokenize_string, Error, Token, TokenType, Tokenizer};

mod interpreter;
pub use interpreter::{run, Interpreter, Outcome};
