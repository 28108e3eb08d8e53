//! Collaborators the interpreter consults for on-chain facts
//!
//! The interpreter never talks to a node itself. Signer identity, name
//! resolution and DAO app discovery sit behind the traits below; the static
//! implementations serve configuration files and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use daoscript_common::{Address, AppRecord};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolverError {
    #[error("name {0} could not be resolved")]
    NameNotFound(String),

    #[error("no DAO found at {0}")]
    DaoNotFound(Address),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Identity on whose behalf actions are produced
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;
    fn chain_id(&self) -> u64;
}

/// Resolves human readable names (ENS) to addresses
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// `Ok(None)` when the name has no record. `registry` selects a
    /// non-default registry.
    async fn resolve_name(
        &self,
        name: &str,
        registry: Option<Address>,
    ) -> Result<Option<Address>, ResolverError>;
}

/// Discovers the installed apps and permission state of a DAO
#[async_trait]
pub trait AppResolver: Send + Sync {
    async fn resolve_apps(&self, kernel: Address) -> Result<Vec<AppRecord>, ResolverError>;
}

#[derive(Debug, Clone)]
pub struct StaticSigner {
    address: Address,
    chain_id: u64,
}

impl StaticSigner {
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self { address, chain_id }
    }
}

impl Signer for StaticSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Name table held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticNameResolver {
    names: HashMap<String, Address>,
    registries: HashMap<Address, HashMap<String, Address>>,
}

impl StaticNameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>, address: Address) -> Self {
        self.names.insert(name.into(), address);
        self
    }

    pub fn with_registry_name(
        mut self,
        registry: Address,
        name: impl Into<String>,
        address: Address,
    ) -> Self {
        self.registries
            .entry(registry)
            .or_default()
            .insert(name.into(), address);
        self
    }
}

#[async_trait]
impl NameResolver for StaticNameResolver {
    async fn resolve_name(
        &self,
        name: &str,
        registry: Option<Address>,
    ) -> Result<Option<Address>, ResolverError> {
        let table = match registry {
            Some(registry) => match self.registries.get(&registry) {
                Some(table) => table,
                None => return Ok(None),
            },
            None => &self.names,
        };
        Ok(table.get(name).copied())
    }
}

/// DAO app listings held in memory, keyed by kernel address
#[derive(Debug, Clone, Default)]
pub struct StaticAppResolver {
    daos: HashMap<Address, Vec<AppRecord>>,
}

impl StaticAppResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dao(mut self, kernel: Address, apps: Vec<AppRecord>) -> Self {
        self.daos.insert(kernel, apps);
        self
    }
}

#[async_trait]
impl AppResolver for StaticAppResolver {
    async fn resolve_apps(&self, kernel: Address) -> Result<Vec<AppRecord>, ResolverError> {
        self.daos
            .get(&kernel)
            .cloned()
            .ok_or(ResolverError::DaoNotFound(kernel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[tokio::test]
    async fn test_static_names_respect_registry() {
        let resolver = StaticNameResolver::new()
            .with_name("dao.aragonid.eth", addr(1))
            .with_registry_name(addr(9), "dao.aragonid.eth", addr(2));

        assert_eq!(
            resolver.resolve_name("dao.aragonid.eth", None).await.unwrap(),
            Some(addr(1))
        );
        assert_eq!(
            resolver
                .resolve_name("dao.aragonid.eth", Some(addr(9)))
                .await
                .unwrap(),
            Some(addr(2))
        );
        assert_eq!(
            resolver
                .resolve_name("dao.aragonid.eth", Some(addr(8)))
                .await
                .unwrap(),
            None
        );
        assert_eq!(resolver.resolve_name("missing.eth", None).await.unwrap(), None);
    }

    #[test]
    fn test_unknown_dao_is_an_error() {
        let resolver = StaticAppResolver::new().with_dao(addr(1), Vec::new());
        assert!(block_on(resolver.resolve_apps(addr(1))).unwrap().is_empty());
        assert_eq!(
            block_on(resolver.resolve_apps(addr(2))),
            Err(ResolverError::DaoNotFound(addr(2)))
        );
    }
}
