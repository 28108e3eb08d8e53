//! Interpreter for daoscript
//!
//! Walks the syntax tree produced by `daoscript-dsl`, resolving each command
//! against the loaded modules and collecting the actions they emit in source
//! order.

pub mod arity;
pub mod bindings;
pub mod error;
pub mod interpreter;
pub mod module;
pub mod modules;
pub mod resolver;
pub mod value;

pub use arity::Arity;
pub use bindings::{Binding, BindingSpace, BindingsManager};
pub use error::{InterpreterError, Result};
pub use interpreter::{Collaborators, Interpreter};
pub use module::{Module, CommandSpec, HelperSpec};
pub use resolver::{
    AppResolver, NameResolver, ResolverError, Signer, StaticAppResolver, StaticNameResolver,
    StaticSigner,
};
pub use value::Value;
