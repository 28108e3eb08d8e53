//! Records returned by the app-resolution service for a DAO kernel

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// Current holders of one role on an installed app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Role name, e.g. `TRANSFER_ROLE`
    pub role: String,
    #[serde(default)]
    pub manager: Option<Address>,
    #[serde(default)]
    pub grantees: Vec<Address>,
}

/// An app installed under a DAO kernel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// App identifier, `name` or `name:index`
    pub identifier: String,
    pub address: Address,
    /// Role names declared by the app's contract
    #[serde(default)]
    pub roles: Vec<String>,
    /// Permissions already set on chain
    #[serde(default)]
    pub permissions: Vec<PermissionRecord>,
}
