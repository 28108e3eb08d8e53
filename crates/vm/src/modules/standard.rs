//! The `std` module, loaded into every interpreter

use async_trait::async_trait;
use ethabi::Uint;
use tracing::debug;

use daoscript_common::{keccak256, Action, ProviderAction};
use daoscript_dsl::Expression;

use crate::arity::Arity;
use crate::bindings::BindingSpace;
use crate::error::{InterpreterError, Result};
use crate::interpreter::Interpreter;
use crate::module::{instantiate, CommandCall, CommandSpec, HelperCall, HelperSpec, Module};
use crate::resolver::ResolverError;
use crate::value::Value;

static COMMANDS: [CommandSpec; 3] = [
    CommandSpec::new("load", Arity::Between(1, 3)).unevaluated(3),
    CommandSpec::new("set", Arity::Equal(2)).unevaluated(1),
    CommandSpec::new("switch", Arity::Equal(1)),
];

static HELPERS: [HelperSpec; 3] = [
    HelperSpec {
        name: "me",
        arity: Arity::Equal(0),
    },
    HelperSpec {
        name: "ens",
        arity: Arity::Between(1, 2),
    },
    HelperSpec {
        name: "id",
        arity: Arity::Equal(1),
    },
];

/// Chain ids of the networks `switch` accepts by name
const NETWORKS: &[(&str, u64)] = &[
    ("mainnet", 1),
    ("goerli", 5),
    ("sepolia", 11155111),
    ("gnosis", 100),
    ("xdai", 100),
    ("polygon", 137),
    ("optimism", 10),
    ("arbitrum", 42161),
];

#[derive(Debug, Default)]
pub struct Standard;

impl Standard {
    pub const NAME: &'static str = "std";

    fn load(&self, interpreter: &mut Interpreter, call: &CommandCall<'_>) -> Result<Vec<Action>> {
        let words: Vec<String> = call.args.iter().map(|arg| arg.word()).collect();
        let (name, alias) = match words.as_slice() {
            [name] => (name.as_str(), name.as_str()),
            [name, keyword, alias] if keyword == "as" => (name.as_str(), alias.as_str()),
            _ => {
                return Err(InterpreterError::command(
                    "load",
                    "expected `load <module>` or `load <module> as <alias>`",
                ))
            }
        };

        if interpreter.bindings().get_module(alias).is_some() {
            return Err(InterpreterError::command(
                "load",
                format!("alias {} is already in use", alias),
            ));
        }
        let module = instantiate(name)
            .ok_or_else(|| InterpreterError::binding(format!("module {} not found", name)))?;

        debug!(module = name, alias, "Loading module");
        let bindings = interpreter.bindings_mut();
        bindings.set_module(alias, module);
        bindings.set_value(BindingSpace::Alias, name, Value::String(alias.to_string()));
        Ok(Vec::new())
    }

    fn set(&self, interpreter: &mut Interpreter, call: CommandCall<'_>) -> Result<Vec<Action>> {
        let mut args = call.args.into_iter();
        let (Some(target), Some(value)) = (args.next(), args.next()) else {
            return Err(InterpreterError::command("set", "expected a variable and a value"));
        };
        let Expression::VariableIdentifier(name) = &target.expr else {
            return Err(InterpreterError::command(
                "set",
                format!("expected a variable, got {}", target.expr),
            ));
        };
        interpreter
            .bindings_mut()
            .set_value(BindingSpace::User, name, value.value);
        Ok(Vec::new())
    }

    fn switch(&self, call: &CommandCall<'_>) -> Result<Vec<Action>> {
        let chain_id = match call.args.first().map(|arg| &arg.value) {
            Some(Value::Number(n)) => {
                if *n > Uint::from(u64::MAX) {
                    return Err(InterpreterError::command(
                        "switch",
                        format!("chain id {} is out of range", n),
                    ));
                }
                n.low_u64()
            }
            Some(other) => {
                let network = other.as_text().unwrap_or_default().to_ascii_lowercase();
                NETWORKS
                    .iter()
                    .find(|(name, _)| *name == network)
                    .map(|(_, id)| *id)
                    .ok_or_else(|| {
                        InterpreterError::command("switch", format!("unknown network {}", other))
                    })?
            }
            None => return Err(InterpreterError::command("switch", "missing chain")),
        };
        Ok(vec![Action::Provider(ProviderAction::switch_chain(chain_id))])
    }

    async fn ens(&self, interpreter: &Interpreter, call: &HelperCall<'_>) -> Result<Value> {
        let name = call
            .args
            .first()
            .and_then(|arg| arg.value.as_text())
            .ok_or_else(|| InterpreterError::command("@ens", "expected a name"))?;
        let registry = match call.args.get(1) {
            Some(arg) => Some(arg.value.as_address().ok_or_else(|| {
                InterpreterError::command("@ens", format!("invalid registry {}", arg.value))
            })?),
            None => None,
        };

        let resolved = interpreter.names().resolve_name(name, registry).await?;
        resolved
            .map(Value::Address)
            .ok_or_else(|| ResolverError::NameNotFound(name.to_string()).into())
    }
}

#[async_trait]
impl Module for Standard {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn commands(&self) -> &'static [CommandSpec] {
        &COMMANDS
    }

    fn helpers(&self) -> &'static [HelperSpec] {
        &HELPERS
    }

    async fn execute(
        &self,
        interpreter: &mut Interpreter,
        call: CommandCall<'_>,
    ) -> Result<Vec<Action>> {
        let name = call.name;
        match name {
            "load" => self.load(interpreter, &call),
            "set" => self.set(interpreter, call),
            "switch" => self.switch(&call),
            other => Err(InterpreterError::binding(format!(
                "command {} is not defined in module {}",
                other,
                Self::NAME
            ))),
        }
    }

    async fn evaluate(&self, interpreter: &Interpreter, call: HelperCall<'_>) -> Result<Value> {
        match call.name {
            "me" => Ok(Value::Address(interpreter.signer().address())),
            "ens" => self.ens(interpreter, &call).await,
            "id" => {
                let text = call
                    .args
                    .first()
                    .and_then(|arg| arg.value.as_text())
                    .ok_or_else(|| InterpreterError::command("@id", "expected a string"))?;
                Ok(Value::Bytes(keccak256(text.as_bytes()).0.to_vec()))
            }
            other => Err(InterpreterError::binding(format!(
                "helper @{} is not defined in module {}",
                other,
                Self::NAME
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::interpreter::Collaborators;
    use daoscript_common::Address;
    use crate::resolver::{StaticAppResolver, StaticNameResolver, StaticSigner};

    fn interpreter() -> Interpreter {
        let registry = Address([0x99; 20]);
        Interpreter::new(Collaborators {
            signer: Arc::new(StaticSigner::new(Address([0x01; 20]), 5)),
            names: Arc::new(
                StaticNameResolver::new()
                    .with_name("dao.aragonid.eth", Address([0x02; 20]))
                    .with_registry_name(registry, "dao.aragonid.eth", Address([0x03; 20])),
            ),
            apps: Arc::new(StaticAppResolver::new()),
        })
    }

    #[tokio::test]
    async fn test_load_with_alias() {
        let mut interpreter = interpreter();
        interpreter.run("load aragonos as ar").await.unwrap();
        assert_eq!(
            interpreter.bindings().get_module("ar").map(|m| m.name()),
            Some("aragonos")
        );
        assert_eq!(
            interpreter.bindings().get_value(BindingSpace::Alias, "aragonos"),
            Some(&Value::String("ar".to_string()))
        );
    }

    #[tokio::test]
    async fn test_load_rejects_taken_alias_and_unknown_module() {
        let mut interpreter = interpreter();
        interpreter.run("load aragonos").await.unwrap();
        let err = interpreter.run("load aragonos").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Command { command, .. } if command == "load"));

        let err = interpreter.run("load nope").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Binding(msg) if msg == "module nope not found"));

        let err = interpreter.run("load aragonos to x").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Command { .. }));
    }

    #[tokio::test]
    async fn test_set_requires_a_variable() {
        let err = interpreter().run("set name 1").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Command { command, .. } if command == "set"));
    }

    #[tokio::test]
    async fn test_ens_with_registry_and_missing_name() {
        let mut interpreter = interpreter();
        let source = format!(
            "set $a @ens(\"dao.aragonid.eth\")\nset $b @ens(\"dao.aragonid.eth\", 0x{})",
            "99".repeat(20)
        );
        interpreter.run(&source).await.unwrap();
        let bindings = interpreter.bindings();
        assert_eq!(
            bindings.get_value(BindingSpace::User, "a"),
            Some(&Value::Address(Address([0x02; 20])))
        );
        assert_eq!(
            bindings.get_value(BindingSpace::User, "b"),
            Some(&Value::Address(Address([0x03; 20])))
        );

        let err = interpreter.run("set $c @ens(\"nobody.eth\")").await.unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::Resolution(ResolverError::NameNotFound(name)) if name == "nobody.eth"
        ));
    }

    #[tokio::test]
    async fn test_ens_arity() {
        for source in ["set $a @ens", "set $a @ens(\"a\", \"b\", \"c\")"] {
            let err = interpreter().run(source).await.unwrap_err();
            assert!(
                matches!(&err, InterpreterError::Arity { name, .. } if name == "@ens"),
                "{}",
                err
            );
        }
    }

    #[tokio::test]
    async fn test_id_hashes_text() {
        let mut interpreter = interpreter();
        interpreter.run("set $role @id(\"TRANSFER_ROLE\")").await.unwrap();
        assert_eq!(
            interpreter.bindings().get_value(BindingSpace::User, "role"),
            Some(&Value::Bytes(keccak256("TRANSFER_ROLE").0.to_vec()))
        );
    }

    #[tokio::test]
    async fn test_switch_by_id_and_unknown_network() {
        let actions = interpreter().run("switch 137").await.unwrap();
        assert_eq!(actions, vec![Action::Provider(ProviderAction::switch_chain(137))]);

        let err = interpreter().run("switch atlantis").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Command { command, .. } if command == "switch"));
    }
}
