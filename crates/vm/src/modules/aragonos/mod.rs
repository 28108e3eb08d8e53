//! The `aragonos` module: connect to AragonOS DAOs and edit their ACL
//!
//! ```text
//! load aragonos as ar
//! ar:connect my-dao token-manager voting (
//!   grant @me vault TRANSFER_ROLE
//!   revoke ANY_ENTITY finance CREATE_PAYMENTS_ROLE true
//! )
//! ```
//!
//! `connect` pushes the DAO on the module's stack for the duration of its
//! block. Calls produced inside the block are wrapped through the listed
//! forwarders.

pub mod acl;
pub mod dao;
pub mod error;
pub mod forwarding;
pub mod permissions;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use daoscript_common::{Action, Address};

use crate::arity::Arity;
use crate::bindings::BindingSpace;
use crate::error::{InterpreterError, Result};
use crate::interpreter::Interpreter;
use crate::module::{Argument, CommandCall, CommandSpec, Module};
use crate::resolver::ResolverError;
use crate::value::Value;

pub use dao::{App, AppIdentifier, Dao, DaoStack, Permission};
pub use error::DaoError;
pub use forwarding::Forwarder;

use permissions::{GrantRequest, RevokeRequest};

static COMMANDS: [CommandSpec; 3] = [
    CommandSpec::new("connect", Arity::Greater(1)).with_block(),
    CommandSpec::new("grant", Arity::Between(3, 4)),
    CommandSpec::new("revoke", Arity::Between(3, 4)),
];

/// Suffix appended to DAO names given without a domain
const ARAGON_ID_DOMAIN: &str = ".aragonid.eth";

const NOT_CONNECTED: &str = "must be used within a \"connect\" command";

#[derive(Debug, Default)]
pub struct AragonOs {
    connections: RwLock<DaoStack>,
}

impl AragonOs {
    pub const NAME: &'static str = "aragonos";

    pub fn new() -> Self {
        Self::default()
    }

    async fn resolve_kernel(&self, interpreter: &Interpreter, arg: &Argument) -> Result<Address> {
        if let Some(address) = arg.value.as_address() {
            return Ok(address);
        }
        let Some(text) = arg.value.as_text() else {
            return Err(InterpreterError::command(
                "connect",
                DaoError::InvalidAddress(arg.word()),
            ));
        };

        let name = if text.contains('.') {
            text.to_string()
        } else {
            format!("{}{}", text, ARAGON_ID_DOMAIN)
        };
        let names = interpreter.names().clone();
        let resolved = names.resolve_name(&name, None).await?;
        resolved.ok_or_else(|| InterpreterError::from(ResolverError::NameNotFound(name)))
    }

    async fn connect(
        &self,
        interpreter: &mut Interpreter,
        call: CommandCall<'_>,
    ) -> Result<Vec<Action>> {
        let err = |e: DaoError| InterpreterError::command("connect", e);
        let block = call
            .block
            .ok_or_else(|| InterpreterError::command("connect", "a block of commands is required"))?;
        let (dao_arg, forwarder_args) = call
            .args
            .split_first()
            .ok_or_else(|| InterpreterError::command("connect", "missing DAO"))?;

        let kernel = self.resolve_kernel(interpreter, dao_arg).await?;
        let nesting_index = {
            let stack = self.connections.read().await;
            if stack.is_connected(&kernel) {
                return Err(err(DaoError::AlreadyConnected(kernel)));
            }
            stack.next_nesting_index()
        };

        let apps = interpreter.apps().clone();
        let records = apps.resolve_apps(kernel).await?;
        let dao = Dao::new(kernel, nesting_index, &records).map_err(err)?;

        let mut forwarders = Vec::with_capacity(forwarder_args.len());
        for arg in forwarder_args {
            let label = arg.name();
            let app = dao
                .app(&label)
                .or_else(|| arg.value.as_address().and_then(|a| dao.app_by_address(&a)))
                .ok_or_else(|| err(DaoError::UnknownForwarder(label.clone())))?;
            forwarders.push(Forwarder {
                label,
                address: app.address,
            });
        }

        let bindings = interpreter.bindings_mut();
        for app in dao.apps.values() {
            let address = Value::Address(app.address);
            bindings.set_value(BindingSpace::Addr, &app.identifier.to_string(), address.clone());
            if app.identifier.index == 0 {
                bindings.set_value(BindingSpace::Addr, &app.identifier.name, address);
            }
        }

        self.connections.write().await.push(dao).map_err(err)?;
        info!(dao = %kernel, nesting_index, apps = records.len(), "Connected to DAO");

        let result = interpreter.interpret_block(block).await;

        self.connections.write().await.pop();
        info!(dao = %kernel, "Disconnected from DAO");

        let actions = result?;
        debug!(
            actions = actions.len(),
            forwarders = forwarders.len(),
            "Forwarding block actions"
        );
        forwarding::forward_actions(actions, &forwarders).map_err(err)
    }

    async fn grant(&self, call: CommandCall<'_>) -> Result<Vec<Action>> {
        let err = |e: DaoError| InterpreterError::command("grant", e);
        let mut stack = self.connections.write().await;
        let dao = stack
            .current_mut()
            .ok_or_else(|| InterpreterError::command("grant", NOT_CONNECTED))?;

        let [entity, app, role, rest @ ..] = call.args.as_slice() else {
            return Err(InterpreterError::command("grant", "missing arguments"));
        };
        let app = permissions::resolve_app(dao, app).map_err(err)?;
        let role = permissions::resolve_role(role).map_err(err)?;
        let entity = permissions::resolve_entity(dao, entity)
            .ok_or_else(|| err(DaoError::InvalidAddress(entity.name())))?;
        let manager = match rest.first() {
            Some(arg) => Some(
                permissions::resolve_entity(dao, arg)
                    .ok_or_else(|| err(DaoError::InvalidManager(arg.name())))?,
            ),
            None => None,
        };

        let request = GrantRequest {
            entity,
            app,
            role,
            manager,
        };
        let action = permissions::grant(dao, &request).map_err(err)?;
        Ok(action.into_iter().map(Action::from).collect())
    }

    async fn revoke(&self, call: CommandCall<'_>) -> Result<Vec<Action>> {
        let err = |e: DaoError| InterpreterError::command("revoke", e);
        let mut stack = self.connections.write().await;
        let dao = stack
            .current_mut()
            .ok_or_else(|| InterpreterError::command("revoke", NOT_CONNECTED))?;

        let [grantee, app, role, rest @ ..] = call.args.as_slice() else {
            return Err(InterpreterError::command("revoke", "missing arguments"));
        };
        let app = permissions::resolve_app(dao, app).map_err(err)?;
        let grantee = permissions::resolve_entity(dao, grantee)
            .ok_or_else(|| err(DaoError::InvalidAddress(grantee.name())))?;
        let role = permissions::resolve_role(role).map_err(err)?;
        let remove_manager = match rest.first() {
            Some(arg) => arg
                .value
                .as_bool()
                .ok_or_else(|| err(DaoError::NotABoolean(arg.word())))?,
            None => false,
        };

        let request = RevokeRequest {
            grantee,
            app,
            role,
            remove_manager,
        };
        let calls = permissions::revoke(dao, &request).map_err(err)?;
        Ok(calls.into_iter().map(Action::from).collect())
    }
}

#[async_trait]
impl Module for AragonOs {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn commands(&self) -> &'static [CommandSpec] {
        &COMMANDS
    }

    async fn execute(
        &self,
        interpreter: &mut Interpreter,
        call: CommandCall<'_>,
    ) -> Result<Vec<Action>> {
        let name = call.name;
        match name {
            "connect" => self.connect(interpreter, call).await,
            "grant" => self.grant(call).await,
            "revoke" => self.revoke(call).await,
            other => Err(InterpreterError::binding(format!(
                "command {} is not defined in module {}",
                other,
                Self::NAME
            ))),
        }
    }
}
