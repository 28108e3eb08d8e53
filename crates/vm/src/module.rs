//! Command modules
//!
//! A module owns a closed table of commands and helpers. The interpreter
//! looks entries up by name, validates arity against the table and then
//! dispatches to [`Module::execute`] or [`Module::evaluate`].

use std::sync::Arc;

use async_trait::async_trait;

use daoscript_common::Action;
use daoscript_dsl::{CommandExpression, Expression};

use crate::arity::Arity;
use crate::error::{InterpreterError, Result};
use crate::interpreter::Interpreter;
use crate::modules::{aragonos::AragonOs, standard::Standard};
use crate::value::Value;

/// Table entry for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub arity: Arity,
    /// Leading arguments handed to the command as written instead of evaluated
    pub unevaluated: usize,
    /// Whether the command runs a `( ... )` block
    pub takes_block: bool,
}

impl CommandSpec {
    pub const fn new(name: &'static str, arity: Arity) -> Self {
        Self {
            name,
            arity,
            unevaluated: 0,
            takes_block: false,
        }
    }

    pub const fn unevaluated(mut self, count: usize) -> Self {
        self.unevaluated = count;
        self
    }

    pub const fn with_block(mut self) -> Self {
        self.takes_block = true;
        self
    }
}

/// Table entry for a helper, invoked as `@name(args)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelperSpec {
    pub name: &'static str,
    pub arity: Arity,
}

/// A command or helper argument: the expression as written and its value
#[derive(Debug, Clone)]
pub struct Argument {
    pub expr: Expression,
    pub value: Value,
}

impl Argument {
    /// Source word of the argument: the inner text of strings and bare
    /// identifiers, the written form of anything else
    pub fn word(&self) -> String {
        match &self.expr {
            Expression::StringLiteral(s) | Expression::ProbableIdentifier(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Name the argument refers to. Variables stand for the text they hold;
    /// everything else is taken as written.
    pub fn name(&self) -> String {
        match (&self.expr, self.value.as_text()) {
            (Expression::VariableIdentifier(_), Some(text)) => text.to_string(),
            _ => self.word(),
        }
    }
}

pub struct CommandCall<'a> {
    pub name: &'a str,
    pub args: Vec<Argument>,
    pub block: Option<&'a [CommandExpression]>,
}

pub struct HelperCall<'a> {
    pub name: &'a str,
    pub args: Vec<Argument>,
}

#[async_trait]
pub trait Module: Send + Sync {
    /// Name the module is loaded by
    fn name(&self) -> &'static str;

    fn commands(&self) -> &'static [CommandSpec];

    fn helpers(&self) -> &'static [HelperSpec] {
        &[]
    }

    fn command(&self, name: &str) -> Option<&'static CommandSpec> {
        self.commands().iter().find(|spec| spec.name == name)
    }

    fn helper(&self, name: &str) -> Option<&'static HelperSpec> {
        self.helpers().iter().find(|spec| spec.name == name)
    }

    /// Run a command whose arity has already been checked
    async fn execute(
        &self,
        interpreter: &mut Interpreter,
        call: CommandCall<'_>,
    ) -> Result<Vec<Action>>;

    /// Evaluate a helper whose arity has already been checked
    async fn evaluate(&self, _interpreter: &Interpreter, call: HelperCall<'_>) -> Result<Value> {
        Err(InterpreterError::binding(format!(
            "helper @{} is not defined in module {}",
            call.name,
            self.name()
        )))
    }
}

/// Instantiate a module by the name used in `load`
pub fn instantiate(name: &str) -> Option<Arc<dyn Module>> {
    match name {
        Standard::NAME => Some(Arc::new(Standard)),
        AragonOs::NAME => Some(Arc::new(AragonOs::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_known_modules() {
        assert_eq!(instantiate("std").map(|m| m.name()), Some("std"));
        assert_eq!(instantiate("aragonos").map(|m| m.name()), Some("aragonos"));
        assert!(instantiate("unknown").is_none());
    }

    #[test]
    fn test_word_uses_source_text() {
        let arg = Argument {
            expr: Expression::StringLiteral("vault".to_string()),
            value: Value::String("vault".to_string()),
        };
        assert_eq!(arg.word(), "vault");

        let arg = Argument {
            expr: Expression::VariableIdentifier("x".to_string()),
            value: Value::Bool(true),
        };
        assert_eq!(arg.word(), "$x");
    }

    #[test]
    fn test_name_follows_variables() {
        let arg = Argument {
            expr: Expression::VariableIdentifier("app".to_string()),
            value: Value::Identifier("vault".to_string()),
        };
        assert_eq!(arg.name(), "vault");

        // Non-text values keep the source word
        let arg = Argument {
            expr: Expression::VariableIdentifier("flag".to_string()),
            value: Value::Bool(true),
        };
        assert_eq!(arg.name(), "$flag");

        let arg = Argument {
            expr: Expression::ProbableIdentifier("finance".to_string()),
            value: Value::Identifier("finance".to_string()),
        };
        assert_eq!(arg.name(), "finance");
    }

    #[test]
    fn test_block_flag_defaults_off() {
        let spec = CommandSpec::new("grant", Arity::Equal(3));
        assert!(!spec.takes_block);
        assert!(spec.with_block().takes_block);
    }
}
