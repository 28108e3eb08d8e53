//! Runtime values produced by evaluating argument expressions

use std::fmt;

use ethabi::Uint;

use daoscript_common::Address;

/// An evaluated argument
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(Uint),
    Bool(bool),
    Address(Address),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    /// A bare word that did not match any address binding
    Identifier(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Address(_) => "address",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Identifier(_) => "identifier",
        }
    }

    /// Address values, and strings or identifiers spelled as an address
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Address(address) => Some(*address),
            Value::String(s) | Value::Identifier(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text of string and identifier values
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Identifier(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Address(a) => write!(f, "{}", a),
            Value::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Identifier(id) => write!(f, "{}", id),
        }
    }
}

/// Largest power of ten representable in 256 bits
const MAX_EXPONENT: usize = 77;

/// Convert numeric text such as `42`, `1e18` or `1.5e18` into an integer
pub fn parse_number(text: &str) -> Result<Uint, String> {
    let lower = text.to_ascii_lowercase();
    let (mantissa, exponent) = match lower.split_once('e') {
        Some((mantissa, exponent)) => (
            mantissa,
            exponent
                .parse::<usize>()
                .map_err(|_| format!("invalid exponent in `{}`", text))?,
        ),
        None => (lower.as_str(), 0),
    };

    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > exponent {
        return Err(format!("`{}` is not an integer", text));
    }

    let scale = exponent - fraction.len();
    if scale > MAX_EXPONENT {
        return Err(format!("`{}` does not fit in 256 bits", text));
    }

    let digits = format!("{}{}", integer, fraction);
    let base = Uint::from_dec_str(&digits).map_err(|_| format!("invalid number `{}`", text))?;
    base.checked_mul(Uint::exp10(scale))
        .ok_or_else(|| format!("`{}` does not fit in 256 bits", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_scientific_numbers() {
        assert_eq!(parse_number("42").unwrap(), Uint::from(42u64));
        assert_eq!(parse_number("1e3").unwrap(), Uint::from(1000u64));
        assert_eq!(parse_number("1.5e3").unwrap(), Uint::from(1500u64));
        assert_eq!(parse_number("2.50E2").unwrap(), Uint::from(250u64));
        assert_eq!(
            parse_number("1e18").unwrap(),
            Uint::from(1_000_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_parse_rejects_fractions_and_overflow() {
        assert!(parse_number("1.5").is_err());
        assert!(parse_number("1.25e1").is_err());
        assert!(parse_number("1e78").is_err());
    }

    #[test]
    fn test_as_address_accepts_spelled_addresses() {
        let raw = "0x0000000000000000000000000000000000000001";
        assert!(Value::String(raw.to_string()).as_address().is_some());
        assert!(Value::Identifier("vault".to_string()).as_address().is_none());
        assert!(Value::Bool(true).as_address().is_none());
    }
}
