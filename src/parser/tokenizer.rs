use const_format::concatcp;
use derivative::Derivative;
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Token {
    pub(crate) typ: TokenType,
    pub(crate) lexeme: String,
}

impl Token {
    pub(crate) fn new(typ: TokenType, lexeme: &str) -> Self {
        Self {
            typ,
            lexeme: lexeme.to_string(),
        }
    }
    fn endmarker() -> Self {
        Self::new(TokenType::ENDMARKER, "EOF")
    }
    pub fn typ(&self) -> TokenType {
        self.typ
    }
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}('{}')", self.typ, self.lexeme)
    }
}

#[allow(non_camel_case_types)]
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TokenType {
    NAME,
    INTNUMBER,
    REALNUMBER,
    IF,
    THEN,
    ELSE,
    LET,
    IN,
    END,
    INT,
    REAL,
    SEMI,
    COLON,
    EQUAL,
    LPAR,
    RPAR,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    LESS,
    LESSEQUAL,
    GREATER,
    GREATEREQUAL,
    EQEQUAL,
    NOTEQUAL,
    ENDMARKER,
    #[default]
    ERRORTOKEN,
}

const LESSEQUAL: (&str, TokenType) = ("<=", TokenType::LESSEQUAL);
const NOTEQUAL: (&str, TokenType) = ("<>", TokenType::NOTEQUAL);
const GREATEREQUAL: (&str, TokenType) = (">=", TokenType::GREATEREQUAL);
const EQEQUAL: (&str, TokenType) = ("==", TokenType::EQEQUAL);
const SEMI: (&str, TokenType) = (";", TokenType::SEMI);
const COLON: (&str, TokenType) = (":", TokenType::COLON);
const EQUAL: (&str, TokenType) = ("=", TokenType::EQUAL);
const LPAR: (&str, TokenType) = ("(", TokenType::LPAR);
const RPAR: (&str, TokenType) = (")", TokenType::RPAR);
const PLUS: (&str, TokenType) = ("+", TokenType::PLUS);
const MINUS: (&str, TokenType) = ("-", TokenType::MINUS);
const STAR: (&str, TokenType) = ("*", TokenType::STAR);
const SLASH: (&str, TokenType) = ("/", TokenType::SLASH);
const LESS: (&str, TokenType) = ("<", TokenType::LESS);
#[cfg(not(feature = "legacy-gt"))]
const GREATER: (&str, TokenType) = (">", TokenType::GREATER);

// Two-character lexemes come first so the longest match wins.
#[cfg(not(feature = "legacy-gt"))]
const SIMPLE_TOKENS: [(&str, TokenType); 15] = [
    LESSEQUAL,
    NOTEQUAL,
    GREATEREQUAL,
    EQEQUAL,
    SEMI,
    COLON,
    EQUAL,
    LPAR,
    RPAR,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    LESS,
    GREATER,
];

#[cfg(feature = "legacy-gt")]
const SIMPLE_TOKENS: [(&str, TokenType); 14] = [
    LESSEQUAL,
    NOTEQUAL,
    GREATEREQUAL,
    EQEQUAL,
    SEMI,
    COLON,
    EQUAL,
    LPAR,
    RPAR,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    LESS,
];

const KEYWORDS: [(&str, TokenType); 8] = [
    ("if", TokenType::IF),
    ("then", TokenType::THEN),
    ("else", TokenType::ELSE),
    ("let", TokenType::LET),
    ("in", TokenType::IN),
    ("end", TokenType::END),
    ("int", TokenType::INT),
    ("real", TokenType::REAL),
];

const S_WHITESPACE: &str = r"^\s+";
const S_NAME_START: &str = r"[\p{L}_]";
const S_NAME_PART: &str = r"[\p{L}\p{N}_]";
const S_NAME: &str = concatcp!("^", S_NAME_START, S_NAME_PART, "*");
const S_DIGITS: &str = r"[0-9]+";
const S_FRACTION: &str = r"\.[0-9]*";
const S_NUMBER: &str = concatcp!("^", S_DIGITS, "(?:", S_FRACTION, ")?");

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_WHITESPACE).expect("Error compiling regex."));
static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(S_NAME).expect("Error compiling regex."));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(S_NUMBER).expect("Error compiling regex."));

/// Pulls tokens one at a time off a source buffer.
///
/// Scanning stops at the first character no rule accepts: that character is
/// dropped and `ENDMARKER` is reported in its place.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Tokenizer<'a> {
    #[derivative(Debug = "ignore")]
    source: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn next_token(&mut self) -> Token {
        let token = self.scan();
        trace!("scanned {token} at offset {}", self.pos);
        token
    }

    fn scan(&mut self) -> Token {
        if let Some(m) = WHITESPACE.find(self.rest()) {
            self.pos += m.end();
        }
        let rest = self.rest();
        let Some(chr) = rest.chars().next() else {
            return Token::endmarker();
        };

        for (lexeme, tok_type) in SIMPLE_TOKENS {
            if rest.starts_with(lexeme) {
                self.pos += lexeme.len();
                return Token::new(tok_type, lexeme);
            }
        }

        #[cfg(feature = "legacy-gt")]
        if chr == '>' {
            // The `>` is consumed, then the character after it is treated
            // as unrecognised.
            self.pos += 1;
            if let Some(next) = self.rest().chars().next() {
                self.pos += next.len_utf8();
            }
            return Token::endmarker();
        }

        if let Some(m) = NAME.find(rest) {
            self.pos += m.end();
            let lower = m.as_str().to_lowercase();
            let typ = KEYWORDS
                .iter()
                .find(|(keyword, _)| *keyword == lower)
                .map_or(TokenType::NAME, |(_, typ)| *typ);
            return Token::new(typ, m.as_str());
        }

        if let Some(m) = NUMBER.find(rest) {
            self.pos += m.end();
            let typ = if m.as_str().contains('.') {
                TokenType::REALNUMBER
            } else {
                TokenType::INTNUMBER
            };
            return Token::new(typ, m.as_str());
        }

        self.pos += chr.len_utf8();
        Token::endmarker()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }
}

/// Scans `source` up to and including the first `ENDMARKER`.
pub fn tokenize_string(source: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = vec![];
    loop {
        let token = tokenizer.next_token();
        let done = token.typ == TokenType::ENDMARKER;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
