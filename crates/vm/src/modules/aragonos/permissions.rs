//! Grant and revoke against the permission state of the current DAO

use tracing::warn;

use daoscript_common::{Address, CallAction, Hash};

use super::acl;
use super::dao::{AppIdentifier, Dao};
use super::error::{DaoError, Result};
use crate::module::Argument;
use crate::value::Value;

const ANY_ENTITY: &str = "ANY_ENTITY";

/// Address named by an argument: a literal or bound address, `ANY_ENTITY`,
/// or one of the DAO's apps
pub fn resolve_entity(dao: &Dao, arg: &Argument) -> Option<Address> {
    if let Some(address) = arg.value.as_address() {
        return Some(address);
    }
    let word = arg.name();
    if word == ANY_ENTITY {
        return Some(Address::ANY_ENTITY);
    }
    dao.app(&word).map(|app| app.address)
}

/// Identifier of the DAO app named by an argument
pub fn resolve_app(dao: &Dao, arg: &Argument) -> Result<AppIdentifier> {
    let word = arg.name();
    if let Some(app) = dao.app(&word) {
        return Ok(app.identifier.clone());
    }
    if let Some(app) = arg.value.as_address().and_then(|a| dao.app_by_address(&a)) {
        return Ok(app.identifier.clone());
    }
    let shown = word
        .parse::<AppIdentifier>()
        .map(|id| id.to_string())
        .unwrap_or(word);
    Err(DaoError::NotAnApp(shown))
}

/// Role hash from a role name or a 32-byte value
pub fn resolve_role(arg: &Argument) -> Result<Hash> {
    match &arg.value {
        Value::Bytes(bytes) if bytes.len() == 32 => {
            Hash::from_slice(bytes).map_err(|_| DaoError::InvalidRole(arg.word()))
        }
        value => value
            .as_text()
            .filter(|name| !name.is_empty())
            .map(acl::role_hash)
            .ok_or_else(|| DaoError::InvalidRole(arg.word())),
    }
}

#[derive(Debug, Clone)]
pub struct GrantRequest {
    pub entity: Address,
    pub app: AppIdentifier,
    pub role: Hash,
    pub manager: Option<Address>,
}

/// Grant `request.role` to `request.entity`, creating the permission when it
/// does not exist yet. Re-granting a holder produces no call.
pub fn grant(dao: &mut Dao, request: &GrantRequest) -> Result<Option<CallAction>> {
    let acl_address = dao.acl()?;
    let app = dao
        .app_mut(&request.app)
        .ok_or_else(|| DaoError::NotAnApp(request.app.to_string()))?;
    if !app.has_role(&request.role) && !app.permissions.contains_key(&request.role) {
        return Err(DaoError::UnknownPermission(request.app.to_string()));
    }

    let app_address = app.address;
    let role_name = app.role_name(&request.role);
    let permission = app.permissions.entry(request.role).or_default();

    if !permission.exists() {
        let manager = request.manager.ok_or(DaoError::ManagerMissing)?;
        permission.manager = Some(manager);
        permission.grantees.insert(request.entity);
        let data = acl::create_permission(&request.entity, &app_address, &request.role, &manager);
        return Ok(Some(CallAction::new(acl_address, data)));
    }

    if request.manager.is_some() {
        return Err(DaoError::ManagerForExistingPermission {
            app: request.app.to_string(),
            role: role_name,
        });
    }

    if !permission.grantees.insert(request.entity) {
        warn!(
            entity = %request.entity,
            app = %request.app,
            role = %role_name,
            "Entity already holds the permission, skipping grant"
        );
        return Ok(None);
    }

    let data = acl::grant_permission(&request.entity, &app_address, &request.role);
    Ok(Some(CallAction::new(acl_address, data)))
}

#[derive(Debug, Clone)]
pub struct RevokeRequest {
    pub grantee: Address,
    pub app: AppIdentifier,
    pub role: Hash,
    pub remove_manager: bool,
}

/// Revoke `request.role` from `request.grantee`, optionally removing the
/// permission's manager as well
pub fn revoke(dao: &mut Dao, request: &RevokeRequest) -> Result<Vec<CallAction>> {
    let acl_address = dao.acl()?;
    let app = dao
        .app_mut(&request.app)
        .ok_or_else(|| DaoError::NotAnApp(request.app.to_string()))?;
    let app_address = app.address;
    let role_name = app.role_name(&request.role);

    let permission = app
        .permissions
        .get_mut(&request.role)
        .filter(|permission| permission.exists())
        .ok_or_else(|| DaoError::UnknownPermission(request.app.to_string()))?;

    if !permission.grantees.contains(&request.grantee) {
        return Err(DaoError::MissingGrantee(request.grantee.to_string()));
    }
    if request.remove_manager && permission.manager.is_none() {
        return Err(DaoError::NoManager {
            app: request.app.to_string(),
            role: role_name,
        });
    }

    permission.grantees.remove(&request.grantee);
    let mut calls = vec![CallAction::new(
        acl_address,
        acl::revoke_permission(&request.grantee, &app_address, &request.role),
    )];

    if request.remove_manager {
        permission.manager = None;
        calls.push(CallAction::new(
            acl_address,
            acl::remove_permission_manager(&app_address, &request.role),
        ));
    }
    Ok(calls)
}
