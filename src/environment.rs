use std::collections::HashMap;

use crate::parser::Error;

/// The two declarable numeric types. Values are always carried as `f64`; the
/// type only decides how a value is cast when it is stored or reported.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NumType {
    Int,
    Real,
}

impl NumType {
    /// `Int` truncates toward zero, `Real` leaves the value alone.
    pub fn cast(self, value: f64) -> Result<f64, Error> {
        match self {
            Self::Int if !value.is_finite() => Err(Error::NonFiniteCast(value)),
            Self::Int => Ok(value.trunc()),
            Self::Real => Ok(value),
        }
    }
}

impl std::fmt::Display for NumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Real => write!(f, "real"),
        }
    }
}

/// Variables of a single block. Built empty when a block starts and dropped
/// when it ends.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, (NumType, f64)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` cast to `typ`, replacing any earlier binding of `name`.
    pub fn declare(&mut self, name: &str, typ: NumType, value: f64) -> Result<(), Error> {
        let value = typ.cast(value)?;
        self.bindings.insert(name.to_string(), (typ, value));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<(NumType, f64)> {
        self.bindings.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_declare_casts_to_type() {
        let mut env = Environment::new();
        env.declare("x", NumType::Int, 3.9).unwrap();
        env.declare("y", NumType::Real, 3.9).unwrap();
        env.declare("z", NumType::Int, -2.7).unwrap();
        assert_eq!(env.lookup("x"), Some((NumType::Int, 3.0)));
        assert_eq!(env.lookup("y"), Some((NumType::Real, 3.9)));
        assert_eq!(env.lookup("z"), Some((NumType::Int, -2.0)));
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let mut env = Environment::new();
        env.declare("x", NumType::Int, 1.0).unwrap();
        env.declare("x", NumType::Real, 2.5).unwrap();
        assert_eq!(env.lookup("x"), Some((NumType::Real, 2.5)));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_lookup_missing() {
        let env = Environment::new();
        assert!(env.is_empty());
        assert_eq!(env.lookup("x"), None);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut env = Environment::new();
        env.declare("x", NumType::Int, 1.0).unwrap();
        assert_eq!(env.lookup("X"), None);
    }

    #[test]
    fn test_int_cast_of_non_finite_fails() {
        assert!(matches!(
            NumType::Int.cast(f64::INFINITY),
            Err(Error::NonFiniteCast(_))
        ));
        assert!(NumType::Int.cast(f64::NAN).is_err());
        assert_eq!(NumType::Real.cast(f64::INFINITY), Ok(f64::INFINITY));
        let mut env = Environment::new();
        assert!(env.declare("x", NumType::Int, f64::NEG_INFINITY).is_err());
        assert!(env.is_empty());
    }
}
