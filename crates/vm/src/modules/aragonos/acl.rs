//! Calldata for the ACL app

use ethabi::{encode, Token};

use daoscript_common::{keccak256, selector, Address, Hash};

/// Role identifier: keccak-256 of the role name
pub fn role_hash(name: &str) -> Hash {
    keccak256(name.as_bytes())
}

fn address(a: &Address) -> Token {
    Token::Address((*a).into())
}

fn role(r: &Hash) -> Token {
    Token::FixedBytes(r.0.to_vec())
}

fn call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(encode(tokens));
    data
}

pub fn create_permission(entity: &Address, app: &Address, r: &Hash, manager: &Address) -> Vec<u8> {
    call(
        "createPermission(address,address,bytes32,address)",
        &[address(entity), address(app), role(r), address(manager)],
    )
}

pub fn grant_permission(entity: &Address, app: &Address, r: &Hash) -> Vec<u8> {
    call(
        "grantPermission(address,address,bytes32)",
        &[address(entity), address(app), role(r)],
    )
}

pub fn revoke_permission(entity: &Address, app: &Address, r: &Hash) -> Vec<u8> {
    call(
        "revokePermission(address,address,bytes32)",
        &[address(entity), address(app), role(r)],
    )
}

pub fn remove_permission_manager(app: &Address, r: &Hash) -> Vec<u8> {
    call(
        "removePermissionManager(address,bytes32)",
        &[address(app), role(r)],
    )
}
