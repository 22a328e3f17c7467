use log::debug;

use crate::environment::NumType;
use crate::parser::Parser;

/// What a single block printed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Int(f64),
    Real(f64),
    Error,
}

impl Outcome {
    fn from_value(typ: NumType, value: f64) -> Self {
        match typ {
            NumType::Int => Self::Int(value),
            NumType::Real => Self::Real(value),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", format_int(*value)),
            Self::Real(value) => write!(f, "{}", format_real(*value)),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Runs a program block by block, yielding one `Outcome` per block.
///
/// A failed block yields `Outcome::Error`; the tokens up to the next `let`
/// are then skipped and evaluation carries on from there.
#[derive(Debug)]
pub struct Interpreter<'a> {
    parser: Parser<'a>,
    blocks: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            parser: Parser::new(source),
            blocks: 0,
        }
    }
}

impl Iterator for Interpreter<'_> {
    type Item = Outcome;

    fn next(&mut self) -> Option<Outcome> {
        if self.parser.at_end() {
            return None;
        }
        self.blocks += 1;
        match self.parser.block() {
            Ok((typ, value)) => {
                debug!("block {}: {typ} result {value}", self.blocks);
                Some(Outcome::from_value(typ, value))
            }
            Err(err) => {
                debug!("block {} failed: {err}", self.blocks);
                let skipped = self.parser.recover();
                debug!("skipped {skipped} tokens looking for the next block");
                Some(Outcome::Error)
            }
        }
    }
}

/// Evaluates every block of `source` and returns the printed lines.
pub fn run(source: &str) -> Vec<String> {
    Interpreter::new(source)
        .map(|outcome| outcome.to_string())
        .collect()
}

fn format_int(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value:.0}")
    }
}

// Shortest round-trip digits, fixed notation for decimal exponents in
// [-4, 16), scientific with a signed two-digit exponent otherwise.
fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let sci = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let sign = if value < 0.0 { "-" } else { "" };
    if !(-4..16).contains(&exponent) {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.abs());
    }
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("{sign}0.{zeros}{digits}");
    }
    let int_len = exponent as usize + 1;
    if digits.len() > int_len {
        format!("{sign}{}.{}", &digits[..int_len], &digits[int_len..])
    } else {
        let zeros = "0".repeat(int_len - digits.len());
        format!("{sign}{digits}{zeros}.0")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn outputs(input: &str, expected: &[&str]) {
        let result = run(input);
        assert_eq!(
            result, expected,
            "\nUnexpected output for \"{}\"\n",
            input
        );
    }

    #[test]
    fn test_simple_blocks() {
        outputs("let x:int=3; in int(x+2) end;", &["5"]);
        outputs("let x:real=2.5; in real(x*2) end;", &["5.0"]);
        outputs("let x:real=3.9; in int(x) end;", &["3"]);
    }

    #[cfg(not(feature = "legacy-gt"))]
    #[test]
    fn test_greater_than() {
        outputs("let x:int=5; in int(if x>3 then x else 0) end;", &["5"]);
    }

    #[cfg(feature = "legacy-gt")]
    #[test]
    fn test_greater_than_ends_program() {
        outputs(
            "let x:int=5; in int(if x>3 then x else 0) end; let y:int=1; in int(y) end;",
            &["Error"],
        );
    }

    #[test]
    fn test_semantic_errors() {
        outputs("let x:int=1; in int(y) end;", &["Error"]);
        outputs("let x:int=1; in int(x/0) end;", &["Error"]);
        outputs("let x:real=1e; in real(x) end;", &["Error"]);
    }

    #[test]
    fn test_error_isolation() {
        outputs(
            "let x:int=; in int(x) end; let y:int=4; in int(y*2) end;",
            &["Error", "8"],
        );
        outputs(
            "let a:int=1; in int(b) end;\nlet a:int=1; in int(a/0) end;\nlet a:real=1; in real(a) end;",
            &["Error", "Error", "1.0"],
        );
    }

    #[test]
    fn test_leading_garbage_is_skipped() {
        outputs("x y z ; let x:int=2; in int(x) end;", &["Error", "2"]);
    }

    #[test]
    fn test_redeclaration_uses_latest() {
        outputs("let x:int=1; x:int=7; in int(x) end;", &["7"]);
        outputs("let x:int=1; x:real=x+0.5; in real(x) end;", &["1.5"]);
    }

    #[test]
    fn test_no_leak_between_blocks() {
        outputs(
            "let x:int=1; in int(x) end; let y:int=2; in int(x+y) end;",
            &["1", "Error"],
        );
    }

    #[test]
    fn test_deterministic() {
        let input = "let x:real=0.1; y:real=0.2; in real(x+y) end; let q:int=7; in real(q/2) end;";
        assert_eq!(run(input), run(input));
        outputs(input, &["0.30000000000000004", "3.5"]);
    }

    #[test]
    fn test_empty_program() {
        outputs("", &[]);
        outputs("   \n\t ", &[]);
    }

    #[test]
    fn test_unrecognized_character_ends_program() {
        outputs(
            "let x:int=1; in int(x) end; let y:int=2 $; in int(y) end; let z:int=3; in int(z) end;",
            &["1", "Error"],
        );
    }

    #[test]
    fn test_deep_nesting_fails_block() {
        let input = format!(
            "let x:int=1; in int({}x{}) end; let y:int=2; in int(y) end;",
            "(".repeat(5000),
            ")".repeat(5000)
        );
        outputs(&input, &["Error", "2"]);
    }

    #[test]
    fn test_truncated_block() {
        outputs("let x:int=1; in int(x)", &["Error"]);
        outputs("let x:int=1; in int(x) end", &["Error"]);
    }

    #[test]
    fn test_interpreter_yields_outcomes() {
        let outcomes: Vec<Outcome> =
            Interpreter::new("let x:int=0-7; in int(x/2) end; let x:int=0; in real(1/x) end;")
                .collect();
        assert_eq!(outcomes, vec![Outcome::Int(-3.0), Outcome::Error]);
    }

    #[test]
    fn test_format_int() {
        assert_eq!(Outcome::Int(5.0).to_string(), "5");
        assert_eq!(Outcome::Int(-3.0).to_string(), "-3");
        assert_eq!(Outcome::Int(-0.0).to_string(), "0");
        assert_eq!(Outcome::Int(1e20).to_string(), "100000000000000000000");
    }

    #[test]
    fn test_format_real() {
        assert_eq!(Outcome::Real(5.0).to_string(), "5.0");
        assert_eq!(Outcome::Real(-2.5).to_string(), "-2.5");
        assert_eq!(Outcome::Real(0.0).to_string(), "0.0");
        assert_eq!(Outcome::Real(-0.0).to_string(), "-0.0");
        assert_eq!(Outcome::Real(0.001).to_string(), "0.001");
        assert_eq!(Outcome::Real(0.0001).to_string(), "0.0001");
        assert_eq!(Outcome::Real(0.00001).to_string(), "1e-05");
        assert_eq!(Outcome::Real(123456.75).to_string(), "123456.75");
        assert_eq!(Outcome::Real(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Outcome::Real(1e16).to_string(), "1e+16");
        assert_eq!(Outcome::Real(1.5e300).to_string(), "1.5e+300");
        assert_eq!(Outcome::Real(f64::INFINITY).to_string(), "inf");
        assert_eq!(Outcome::Real(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Outcome::Real(f64::NAN).to_string(), "nan");
        assert_eq!(Outcome::Error.to_string(), "Error");
    }
}
