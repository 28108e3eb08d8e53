//! Fixed-size primitives: account addresses and 32-byte hashes

use std::fmt;
use std::str::FromStr;

use ethabi::ethereum_types::{H160, H256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CommonError, Result};

/// A 20-byte account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Sentinel granting a permission to every account (`ANY_ENTITY`)
    pub const ANY_ENTITY: Address = Address([0xffu8; 20]);

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Build an address from a slice, which must be exactly 20 bytes long
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let inner: [u8; 20] = bytes
            .try_into()
            .map_err(|_| CommonError::InvalidAddress(format!("expected 20 bytes, got {}", bytes.len())))?;
        Ok(Address(inner))
    }

    /// Check whether a token looks like a `0x`-prefixed 40 digit hex address
    pub fn is_address(token: &str) -> bool {
        token.len() == 42
            && token.starts_with("0x")
            && token[2..].chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl FromStr for Address {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        if !Address::is_address(s) {
            return Err(CommonError::InvalidAddress(s.to_string()));
        }
        H160::from_str(&s[2..])
            .map(Address::from)
            .map_err(|e| CommonError::InvalidAddress(format!("{}: {}", s, e)))
    }
}

impl From<H160> for Address {
    fn from(address: H160) -> Self {
        Address(address.0)
    }
}

impl From<Address> for H160 {
    fn from(address: Address) -> Self {
        H160(address.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", H160::from(*self))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A 32-byte hash, used for role identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let inner: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CommonError::InvalidHash(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Hash(inner))
    }
}

impl FromStr for Hash {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        H256::from_str(digits)
            .map(Hash::from)
            .map_err(|e| CommonError::InvalidHash(format!("{}: {}", s, e)))
    }
}

impl From<H256> for Hash {
    fn from(hash: H256) -> Self {
        Hash(hash.0)
    }
}

impl From<Hash> for H256 {
    fn from(hash: Hash) -> Self {
        H256(hash.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", H256::from(*self))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Decode a hex string with an optional `0x` prefix
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(digits)?)
}

/// Serde adapter writing byte vectors as `0x`-prefixed hex strings
pub mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::decode_hex(&raw).map_err(de::Error::custom)
    }
}
