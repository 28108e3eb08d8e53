//! Parser for the daoscript governance language
//!
//! A script is a newline-separated list of commands. Commands may be
//! qualified with a module alias and may carry a parenthesized block of
//! nested commands:
//!
//! ```text
//! load aragonos as ar
//! ar:connect my-dao token-manager voting (
//!   grant @me vault TRANSFER_ROLE
//! )
//! ```

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{CommandExpression, Expression, Script, Span};
pub use error::ParseError;
pub use parser::{parse, Rule, ScriptParser};
