use thiserror::Error;

use daoscript_common::Address;

/// Rule violations raised while connecting to a DAO or editing its ACL
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DaoError {
    #[error("trying to connect to an already connected DAO ({0})")]
    AlreadyConnected(Address),

    #[error("{0} is not a DAO's app")]
    NotAnApp(String),

    #[error("app {0} is declared twice")]
    DuplicateApp(String),

    #[error("invalid app identifier {0}")]
    InvalidAppIdentifier(String),

    #[error("given permission doesn't exists on app {0}")]
    UnknownPermission(String),

    #[error("permission manager missing")]
    ManagerMissing,

    #[error("invalid permission manager {0}")]
    InvalidManager(String),

    #[error("a permission manager was given for existing permission {role} on app {app}")]
    ManagerForExistingPermission { app: String, role: String },

    #[error("invalid address {0}")]
    InvalidAddress(String),

    #[error("grantee {0} doesn't have the given permission")]
    MissingGrantee(String),

    #[error("permission {role} on app {app} has no manager to remove")]
    NoManager { app: String, role: String },

    #[error("expected a boolean, got {0}")]
    NotABoolean(String),

    #[error("invalid role {0}")]
    InvalidRole(String),

    #[error("the DAO at {0} has no acl app")]
    AclNotFound(Address),

    #[error("an action sending value to {0} cannot be forwarded")]
    ValueNotForwardable(Address),

    #[error("calldata of {0} bytes is too large for a calls script")]
    CalldataTooLarge(usize),

    #[error("unknown forwarder {0}")]
    UnknownForwarder(String),
}

pub type Result<T> = std::result::Result<T, DaoError>;
