//! Keccak-256 hashing

use sha3::{Digest, Keccak256};

use crate::types::Hash;

/// Keccak-256 digest of arbitrary bytes
pub fn keccak256(data: impl AsRef<[u8]>) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    Hash(hasher.finalize().into())
}

/// Four-byte function selector for a canonical signature such as
/// `grantPermission(address,address,bytes32)`
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest.0[..4]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_of_empty_input() {
        assert_eq!(
            keccak256(b"").to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_forward_selector() {
        assert_eq!(hex::encode(selector("forward(bytes)")), "d948d468");
    }

    #[test]
    fn test_grant_permission_selector() {
        assert_eq!(
            hex::encode(selector("grantPermission(address,address,bytes32)")),
            "0a8ed3db"
        );
    }
}
