//! daoscript
//!
//! Compiles DAO governance scripts into an ordered list of on-chain call
//! descriptors. Parsing lives in `daoscript-dsl`, interpretation in
//! `daoscript-vm`; this crate wires them to a configuration.

use std::sync::Arc;

use tracing::debug;

use daoscript_common::Action;
use daoscript_config::Config;
use daoscript_vm::{
    Collaborators, Interpreter, StaticAppResolver, StaticNameResolver, StaticSigner,
};

/// Module version information
pub mod version {
    /// The current version of the daoscript library
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

pub use daoscript_common as common;
pub use daoscript_config as config;
pub use daoscript_dsl as dsl;
pub use daoscript_vm as vm;

/// In-memory collaborators backed by the fixtures of `config`
pub fn collaborators(config: &Config) -> Collaborators {
    let names = config
        .names
        .iter()
        .fold(StaticNameResolver::new(), |names, (name, address)| {
            names.with_name(name.clone(), *address)
        });
    let apps = config
        .daos
        .iter()
        .fold(StaticAppResolver::new(), |apps, dao| {
            apps.with_dao(dao.kernel, dao.apps.clone())
        });

    Collaborators {
        signer: Arc::new(StaticSigner::new(config.signer, config.chain_id)),
        names: Arc::new(names),
        apps: Arc::new(apps),
    }
}

/// Interpret `source` against the fixtures of `config`
pub async fn run_script(source: &str, config: &Config) -> daoscript_vm::Result<Vec<Action>> {
    let mut interpreter = Interpreter::new(collaborators(config));
    let actions = interpreter.run(source).await?;
    debug!(actions = actions.len(), "Script interpreted");
    Ok(actions)
}
