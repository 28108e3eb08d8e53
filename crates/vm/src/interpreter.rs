//! Tree-walking interpreter
//!
//! Commands run in document order. For each one the interpreter resolves the
//! owning module, evaluates the arguments left to right (helpers first, in
//! post-order), validates arity and dispatches. Commands carrying a block get
//! a fresh scope for the duration of the call, and the block's default module
//! is recorded in that scope so nested unqualified commands find it.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use daoscript_common::Action;
use daoscript_dsl::{parse, CommandExpression, Expression, Script};

use crate::bindings::{BindingSpace, BindingsManager};
use crate::error::{InterpreterError, Result};
use crate::module::{Argument, CommandCall, HelperCall, Module};
use crate::modules::standard::Standard;
use crate::resolver::{AppResolver, NameResolver, Signer};
use crate::value::{parse_number, Value};

/// `Alias` space key holding the alias of the enclosing block's module
pub const BLOCK_MODULE: &str = "@block";

/// External services an interpretation run depends on
#[derive(Clone)]
pub struct Collaborators {
    pub signer: Arc<dyn Signer>,
    pub names: Arc<dyn NameResolver>,
    pub apps: Arc<dyn AppResolver>,
}

pub struct Interpreter {
    bindings: BindingsManager,
    collaborators: Collaborators,
}

impl Interpreter {
    /// Create an interpreter with the standard module loaded
    pub fn new(collaborators: Collaborators) -> Self {
        let mut bindings = BindingsManager::new();
        bindings.set_module(Standard::NAME, Arc::new(Standard));
        bindings.set_value(
            BindingSpace::Alias,
            Standard::NAME,
            Value::String(Standard::NAME.to_string()),
        );
        Self {
            bindings,
            collaborators,
        }
    }

    /// Parse and interpret `source`, failing with every parse error found
    pub async fn run(&mut self, source: &str) -> Result<Vec<Action>> {
        let (script, errors) = parse(source);
        if !errors.is_empty() {
            return Err(InterpreterError::Parse(errors));
        }
        self.interpret(&script).await
    }

    pub async fn interpret(&mut self, script: &Script) -> Result<Vec<Action>> {
        self.interpret_block(&script.commands).await
    }

    /// Interpret a sequence of commands in the current scope
    pub fn interpret_block<'a>(
        &'a mut self,
        commands: &'a [CommandExpression],
    ) -> BoxFuture<'a, Result<Vec<Action>>> {
        async move {
            let mut actions = Vec::new();
            for command in commands {
                actions.extend(self.interpret_command(command).await?);
            }
            Ok(actions)
        }
        .boxed()
    }

    async fn interpret_command(&mut self, command: &CommandExpression) -> Result<Vec<Action>> {
        let (alias, module) = self.resolve_command_module(command)?;
        let spec = module.command(&command.name).ok_or_else(|| {
            InterpreterError::binding(format!(
                "command {} is not defined in module {}",
                command.name, alias
            ))
        })?;
        if command.block.is_some() && !spec.takes_block {
            return Err(InterpreterError::command(
                spec.name,
                format!("`{}` does not accept a block", spec.name),
            ));
        }

        let mut args = Vec::with_capacity(command.args.len());
        for (i, expr) in command.args.iter().enumerate() {
            let value = if i < spec.unevaluated {
                Value::Identifier(expr.to_string())
            } else {
                self.evaluate(expr).await?
            };
            args.push(Argument {
                expr: expr.clone(),
                value,
            });
        }
        spec.arity.check(spec.name, args.len())?;

        debug!(
            command = %command.qualified_name(),
            line = command.span.line,
            "Executing command"
        );

        let call = CommandCall {
            name: spec.name,
            args,
            block: command.block.as_deref(),
        };

        if command.block.is_none() {
            return module.execute(self, call).await;
        }

        self.bindings.enter_scope();
        self.bindings
            .set_value(BindingSpace::Alias, BLOCK_MODULE, Value::String(alias));
        let result = module.execute(self, call).await;
        self.bindings.exit_scope()?;
        result
    }

    fn resolve_command_module(
        &self,
        command: &CommandExpression,
    ) -> Result<(String, Arc<dyn Module>)> {
        if let Some(alias) = &command.module {
            let module = self.bindings.get_module(alias).ok_or_else(|| {
                InterpreterError::binding(format!("module {} is not loaded", alias))
            })?;
            return Ok((alias.clone(), module));
        }
        self.resolve_unqualified(&command.name, |module, name| module.command(name).is_some())
    }

    /// Enclosing block module, then `std`, then the one loaded module
    /// exposing `name`
    fn resolve_unqualified(
        &self,
        name: &str,
        exposes: impl Fn(&dyn Module, &str) -> bool,
    ) -> Result<(String, Arc<dyn Module>)> {
        let block_alias = self
            .bindings
            .get_value(BindingSpace::Alias, BLOCK_MODULE)
            .and_then(Value::as_text);
        if let Some(alias) = block_alias {
            if let Some(module) = self.bindings.get_module(alias) {
                if exposes(module.as_ref(), name) {
                    return Ok((alias.to_string(), module));
                }
            }
        }

        if let Some(module) = self.bindings.get_module(Standard::NAME) {
            if exposes(module.as_ref(), name) {
                return Ok((Standard::NAME.to_string(), module));
            }
        }

        let mut candidates: Vec<(String, Arc<dyn Module>)> = self
            .bindings
            .get_all_identifiers(&[BindingSpace::Module])
            .into_iter()
            .filter_map(|alias| {
                let module = self.bindings.get_module(&alias)?;
                exposes(module.as_ref(), name).then_some((alias, module))
            })
            .collect();

        match candidates.len() {
            0 => Err(InterpreterError::binding(format!("{} is not defined", name))),
            1 => Ok(candidates.remove(0)),
            _ => {
                let aliases: Vec<_> = candidates.iter().map(|(alias, _)| alias.as_str()).collect();
                Err(InterpreterError::binding(format!(
                    "{} is ambiguous between modules {}",
                    name,
                    aliases.join(", ")
                )))
            }
        }
    }

    /// Evaluate an argument expression. Boxed for recursion through arrays
    /// and helper arguments.
    pub fn evaluate<'a>(&'a self, expr: &'a Expression) -> BoxFuture<'a, Result<Value>> {
        async move {
            match expr {
                Expression::StringLiteral(s) => Ok(Value::String(s.clone())),
                Expression::NumberLiteral(n) => parse_number(n)
                    .map(Value::Number)
                    .map_err(InterpreterError::InvalidLiteral),
                Expression::BoolLiteral(b) => Ok(Value::Bool(*b)),
                Expression::AddressLiteral(a) => a
                    .parse()
                    .map(Value::Address)
                    .map_err(|e| InterpreterError::InvalidLiteral(format!("{}", e))),
                Expression::BytesLiteral(b) => daoscript_common::types::decode_hex(b)
                    .map(Value::Bytes)
                    .map_err(|e| InterpreterError::InvalidLiteral(format!("{}", e))),
                Expression::ArrayLiteral(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(self.evaluate(item).await?);
                    }
                    Ok(Value::Array(values))
                }
                Expression::ProbableIdentifier(id) => Ok(self
                    .bindings
                    .get_value(BindingSpace::Addr, id)
                    .cloned()
                    .unwrap_or_else(|| Value::Identifier(id.clone()))),
                Expression::VariableIdentifier(name) => self
                    .bindings
                    .get_value(BindingSpace::User, name)
                    .cloned()
                    .ok_or_else(|| InterpreterError::binding(format!("${} is not defined", name))),
                Expression::HelperFunctionCall { name, args } => {
                    self.evaluate_helper(name, args).await
                }
            }
        }
        .boxed()
    }

    async fn evaluate_helper(&self, name: &str, exprs: &[Expression]) -> Result<Value> {
        let helper_name = format!("@{}", name);
        let (_, module) = self
            .resolve_unqualified(name, |module, name| module.helper(name).is_some())
            .map_err(|_| InterpreterError::binding(format!("{} is not defined", helper_name)))?;
        let spec = module
            .helper(name)
            .ok_or_else(|| InterpreterError::binding(format!("{} is not defined", helper_name)))?;

        let mut args = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let value = self.evaluate(expr).await?;
            args.push(Argument {
                expr: expr.clone(),
                value,
            });
        }
        spec.arity.check(&helper_name, args.len())?;

        debug!(helper = %helper_name, "Evaluating helper");
        module
            .evaluate(
                self,
                HelperCall {
                    name: spec.name,
                    args,
                },
            )
            .await
    }

    pub fn bindings(&self) -> &BindingsManager {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut BindingsManager {
        &mut self.bindings
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.collaborators.signer
    }

    pub fn names(&self) -> &Arc<dyn NameResolver> {
        &self.collaborators.names
    }

    pub fn apps(&self) -> &Arc<dyn AppResolver> {
        &self.collaborators.apps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{StaticAppResolver, StaticNameResolver, StaticSigner};
    use daoscript_common::{Address, ProviderAction};
    use pretty_assertions::assert_eq;

    fn interpreter() -> Interpreter {
        Interpreter::new(Collaborators {
            signer: Arc::new(StaticSigner::new(Address([0xaa; 20]), 1)),
            names: Arc::new(StaticNameResolver::new().with_name("vitalik.eth", Address([0xbb; 20]))),
            apps: Arc::new(StaticAppResolver::new()),
        })
    }

    #[tokio::test]
    async fn test_variables_and_helpers() {
        let mut interpreter = interpreter();
        let actions = interpreter
            .run("set $who @ens(\"vitalik.eth\")\nset $me @me\n")
            .await
            .unwrap();
        assert!(actions.is_empty());
        assert_eq!(
            interpreter.bindings().get_value(BindingSpace::User, "who"),
            Some(&Value::Address(Address([0xbb; 20])))
        );
        assert_eq!(
            interpreter.bindings().get_value(BindingSpace::User, "me"),
            Some(&Value::Address(Address([0xaa; 20])))
        );
    }

    #[tokio::test]
    async fn test_undefined_variable_is_a_binding_error() {
        let err = interpreter().run("set $a $missing").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Binding(msg) if msg == "$missing is not defined"));
    }

    #[tokio::test]
    async fn test_unknown_command_and_module() {
        let err = interpreter().run("frobnicate 1").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Binding(_)));

        let err = interpreter().run("ar:connect dao ()").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Binding(msg) if msg == "module ar is not loaded"));
    }

    #[tokio::test]
    async fn test_parse_errors_abort_the_run() {
        let err = interpreter().run("set $a (\nset $b 1").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Parse(errors) if !errors.is_empty()));
    }

    #[tokio::test]
    async fn test_command_arity_is_checked_before_dispatch() {
        let err = interpreter().run("set $a").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Arity error: `set` expects exactly 2 argument(s), got 1"
        );
    }

    #[tokio::test]
    async fn test_invalid_number_literal() {
        let err = interpreter().run("set $a 1.5").await.unwrap_err();
        assert!(matches!(err, InterpreterError::InvalidLiteral(_)));
    }

    #[tokio::test]
    async fn test_switch_emits_provider_action() {
        let actions = interpreter().run("switch gnosis").await.unwrap();
        assert_eq!(actions, vec![Action::Provider(ProviderAction::switch_chain(100))]);
    }

    #[tokio::test]
    async fn test_scope_is_balanced_after_failures() {
        let mut interpreter = interpreter();
        interpreter.run("load aragonos").await.unwrap();
        let err = interpreter.run("connect 0x00000000000000000000000000000000000000aa (\n)").await;
        assert!(err.is_err());
        assert_eq!(interpreter.bindings().depth(), 0);
    }
}
