// block:   'let' decl+ 'in' type '(' expr ')' 'end' ';'
// decl:    NAME ':' type '=' expr ';'
// type:    'int' | 'real'
// expr:    'if' cond 'then' expr 'else' expr | add_sub
// cond:    operand comp_op operand
// operand: NAME | INTNUMBER | REALNUMBER
// comp_op: '<' | '<=' | '>' | '>=' | '==' | '<>'
// add_sub: term (('+' | '-') term)*
// term:    factor (('*' | '/') factor)*
// factor:  '(' expr ')' | NAME | INTNUMBER | REALNUMBER | type '(' NAME ')'
//
// Every rule evaluates what it recognises. The `live` flag is cleared inside
// the branch of an `if` that was not taken: the branch is still parsed, but
// leaves yield 0.0 and nothing is looked up, divided or cast.

use crate::environment::{Environment, NumType};

use super::error::Error;
use super::tokenizer::{Token, TokenType as TT, Tokenizer};

/// Values closer together than this compare equal, and divisors closer to
/// zero than this are rejected.
pub(crate) const EPSILON: f64 = 1e-15;

/// Limit on nested expressions, so deep input fails the block instead of
/// exhausting the stack.
pub(crate) const MAX_DEPTH: usize = 128;

#[derive(Debug)]
pub(crate) struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut tokenizer = Tokenizer::new(source);
        let current = tokenizer.next_token();
        Self {
            tokenizer,
            current,
            depth: 0,
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.current.typ == TT::ENDMARKER
    }

    /// Drops tokens up to the next `let` or the end of input and returns how
    /// many were dropped.
    pub(crate) fn recover(&mut self) -> usize {
        let mut skipped = 0;
        while !matches!(self.current.typ, TT::LET | TT::ENDMARKER) {
            self.advance();
            skipped += 1;
        }
        skipped
    }

    fn advance(&mut self) -> Token {
        let next = self.tokenizer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn expect(&mut self, typ: TT, expected: &'static str) -> Result<Token, Error> {
        if self.current.typ == typ {
            Ok(self.advance())
        } else {
            Err(Error::unexpected(expected, &self.current))
        }
    }

    /// Parses and evaluates one block. The returned value is already cast to
    /// the block's result type.
    pub(crate) fn block(&mut self) -> Result<(NumType, f64), Error> {
        self.depth = 0;
        self.expect(TT::LET, "'let'")?;
        let mut env = Environment::new();
        self.decl(&mut env)?;
        while self.current.typ == TT::NAME {
            self.decl(&mut env)?;
        }
        self.expect(TT::IN, "'in'")?;
        let typ = self.type_()?;
        self.expect(TT::LPAR, "'('")?;
        let value = self.expr(&env, true)?;
        self.expect(TT::RPAR, "')'")?;
        self.expect(TT::END, "'end'")?;
        self.expect(TT::SEMI, "';'")?;
        Ok((typ, typ.cast(value)?))
    }

    fn decl(&mut self, env: &mut Environment) -> Result<(), Error> {
        let name = self.expect(TT::NAME, "a variable name")?;
        self.expect(TT::COLON, "':'")?;
        let typ = self.type_()?;
        self.expect(TT::EQUAL, "'='")?;
        let value = self.expr(env, true)?;
        self.expect(TT::SEMI, "';'")?;
        env.declare(&name.lexeme, typ, value)
    }

    fn type_(&mut self) -> Result<NumType, Error> {
        let typ = match self.current.typ {
            TT::INT => NumType::Int,
            TT::REAL => NumType::Real,
            _ => return Err(Error::unexpected("a type", &self.current)),
        };
        self.advance();
        Ok(typ)
    }

    fn expr(&mut self, env: &Environment, live: bool) -> Result<f64, Error> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = if self.current.typ == TT::IF {
            self.if_expr(env, live)
        } else {
            self.add_sub(env, live)
        };
        self.depth -= 1;
        value
    }

    fn if_expr(&mut self, env: &Environment, live: bool) -> Result<f64, Error> {
        self.expect(TT::IF, "'if'")?;
        let cond = self.cond(env, live)?;
        self.expect(TT::THEN, "'then'")?;
        let then_value = self.expr(env, live && cond)?;
        self.expect(TT::ELSE, "'else'")?;
        let else_value = self.expr(env, live && !cond)?;
        Ok(if cond { then_value } else { else_value })
    }

    fn cond(&mut self, env: &Environment, live: bool) -> Result<bool, Error> {
        let left = self.operand(env, live)?;
        let op = self.current.typ;
        if !matches!(
            op,
            TT::LESS | TT::LESSEQUAL | TT::GREATER | TT::GREATEREQUAL | TT::EQEQUAL | TT::NOTEQUAL
        ) {
            return Err(Error::unexpected("a comparison operator", &self.current));
        }
        self.advance();
        let right = self.operand(env, live)?;
        if !live {
            return Ok(false);
        }
        Ok(compare(op, left, right))
    }

    fn operand(&mut self, env: &Environment, live: bool) -> Result<f64, Error> {
        match self.current.typ {
            TT::NAME => {
                let name = self.advance();
                variable(env, &name.lexeme, live)
            }
            TT::INTNUMBER | TT::REALNUMBER => Ok(literal(&self.advance())),
            _ => Err(Error::unexpected("an operand", &self.current)),
        }
    }

    fn add_sub(&mut self, env: &Environment, live: bool) -> Result<f64, Error> {
        let mut value = self.term(env, live)?;
        while matches!(self.current.typ, TT::PLUS | TT::MINUS) {
            let op = self.advance().typ;
            let rhs = self.term(env, live)?;
            if op == TT::PLUS {
                value += rhs;
            } else {
                value -= rhs;
            }
        }
        Ok(value)
    }

    fn term(&mut self, env: &Environment, live: bool) -> Result<f64, Error> {
        let mut value = self.factor(env, live)?;
        while matches!(self.current.typ, TT::STAR | TT::SLASH) {
            let op = self.advance().typ;
            let rhs = self.factor(env, live)?;
            if op == TT::STAR {
                value *= rhs;
            } else if live {
                if rhs.abs() < EPSILON {
                    return Err(Error::DivisionByZero);
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self, env: &Environment, live: bool) -> Result<f64, Error> {
        match self.current.typ {
            TT::LPAR => {
                self.advance();
                let value = self.expr(env, live)?;
                self.expect(TT::RPAR, "')'")?;
                Ok(value)
            }
            TT::NAME => {
                let name = self.advance();
                variable(env, &name.lexeme, live)
            }
            TT::INTNUMBER | TT::REALNUMBER => Ok(literal(&self.advance())),
            TT::INT | TT::REAL => {
                let typ = self.type_()?;
                self.expect(TT::LPAR, "'('")?;
                let name = self.expect(TT::NAME, "a variable name")?;
                self.expect(TT::RPAR, "')'")?;
                if !live {
                    return Ok(0.0);
                }
                typ.cast(variable(env, &name.lexeme, live)?)
            }
            _ => Err(Error::unexpected("an expression", &self.current)),
        }
    }
}

fn variable(env: &Environment, name: &str, live: bool) -> Result<f64, Error> {
    if !live {
        return Ok(0.0);
    }
    env.lookup(name)
        .map(|(_, value)| value)
        .ok_or_else(|| Error::Undeclared(name.to_string()))
}

// The scanner only emits digits with an optional fraction (`5`, `5.`, `5.25`),
// all of which `f64` parses.
fn literal(token: &Token) -> f64 {
    token.lexeme.parse().unwrap_or_default()
}

fn compare(op: TT, left: f64, right: f64) -> bool {
    match op {
        TT::LESS => left < right,
        TT::LESSEQUAL => left <= right,
        TT::GREATER => left > right,
        TT::GREATEREQUAL => left >= right,
        TT::EQEQUAL => (left - right).abs() < EPSILON,
        TT::NOTEQUAL => (left - right).abs() > EPSILON,
        _ => unreachable!(),
    }
}
