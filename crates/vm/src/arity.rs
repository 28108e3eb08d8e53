//! Argument-count contracts for commands and helpers

use std::fmt;

use crate::error::{InterpreterError, Result};

/// How many arguments a command or helper accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n`
    Equal(usize),
    /// At least `n`
    Greater(usize),
    /// At most `n`
    Less(usize),
    /// Between `min` and `max`, inclusive
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Equal(n) => count == n,
            Arity::Greater(n) => count >= n,
            Arity::Less(n) => count <= n,
            Arity::Between(min, max) => (min..=max).contains(&count),
        }
    }

    /// Fail with an arity error naming `name` when `count` is not accepted
    pub fn check(&self, name: &str, count: usize) -> Result<()> {
        if self.accepts(count) {
            return Ok(());
        }
        Err(InterpreterError::Arity {
            name: name.to_string(),
            expected: *self,
            actual: count,
        })
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Equal(n) => write!(f, "exactly {} argument(s)", n),
            Arity::Greater(n) => write!(f, "at least {} argument(s)", n),
            Arity::Less(n) => write!(f, "at most {} argument(s)", n),
            Arity::Between(min, max) => write!(f, "between {} and {} arguments", min, max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        assert!(Arity::Equal(2).accepts(2));
        assert!(!Arity::Equal(2).accepts(3));
        assert!(Arity::Greater(1).accepts(1));
        assert!(!Arity::Greater(1).accepts(0));
        assert!(Arity::Less(1).accepts(0));
        assert!(!Arity::Less(1).accepts(2));
        assert!(Arity::Between(3, 4).accepts(3));
        assert!(Arity::Between(3, 4).accepts(4));
        assert!(!Arity::Between(3, 4).accepts(5));
    }

    #[test]
    fn test_check_names_the_bound() {
        for count in [0, 3] {
            let err = Arity::Between(1, 2).check("@ens", count).unwrap_err();
            assert!(matches!(err, InterpreterError::Arity { actual, .. } if actual == count));
            assert_eq!(
                err.to_string(),
                format!("Arity error: `@ens` expects between 1 and 2 arguments, got {}", count)
            );
        }
    }
}
