//! Common types shared by the daoscript crates
//!
//! Addresses, role hashes, the actions produced by an interpretation run and
//! the records returned by the external app-resolution service.

pub mod action;
pub mod app;
pub mod error;
pub mod hash;
pub mod logging;
pub mod types;

pub use action::{Action, CallAction, ProviderAction, ScriptEncodedAction};
pub use app::{AppRecord, PermissionRecord};
pub use error::{CommonError, Result};
pub use hash::{keccak256, selector};
pub use types::{Address, Hash};
