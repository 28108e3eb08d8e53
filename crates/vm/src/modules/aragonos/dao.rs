//! Connected DAO state: apps, roles and the permissions known so far

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use daoscript_common::{keccak256, Address, AppRecord, Hash};

use super::error::{DaoError, Result};

/// `name` or `name:index`; a bare name is instance 0
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppIdentifier {
    pub name: String,
    pub index: usize,
}

impl AppIdentifier {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl FromStr for AppIdentifier {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, index) = match s.rsplit_once(':') {
            Some((name, index)) => {
                let index = index
                    .parse()
                    .map_err(|_| DaoError::InvalidAppIdentifier(s.to_string()))?;
                (name, index)
            }
            None => (s, 0),
        };
        if name.is_empty() {
            return Err(DaoError::InvalidAppIdentifier(s.to_string()));
        }
        Ok(Self::new(name, index))
    }
}

impl fmt::Display for AppIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.index)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Permission {
    pub grantees: BTreeSet<Address>,
    pub manager: Option<Address>,
}

impl Permission {
    /// Created on chain as far as this run can tell
    pub fn exists(&self) -> bool {
        self.manager.is_some() || !self.grantees.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct App {
    pub identifier: AppIdentifier,
    pub address: Address,
    /// Role hash to role name
    pub roles: HashMap<Hash, String>,
    pub permissions: HashMap<Hash, Permission>,
}

impl App {
    pub fn from_record(record: &AppRecord) -> Result<Self> {
        let identifier: AppIdentifier = record.identifier.parse()?;
        let mut roles: HashMap<Hash, String> = record
            .roles
            .iter()
            .map(|role| (keccak256(role.as_bytes()), role.clone()))
            .collect();

        let mut permissions = HashMap::new();
        for record in &record.permissions {
            let role = keccak256(record.role.as_bytes());
            roles.entry(role).or_insert_with(|| record.role.clone());
            permissions.insert(
                role,
                Permission {
                    grantees: record.grantees.iter().copied().collect(),
                    manager: record.manager,
                },
            );
        }

        Ok(Self {
            identifier,
            address: record.address,
            roles,
            permissions,
        })
    }

    pub fn has_role(&self, role: &Hash) -> bool {
        self.roles.contains_key(role)
    }

    /// Name of the role, or its hash when the app does not declare it
    pub fn role_name(&self, role: &Hash) -> String {
        self.roles
            .get(role)
            .cloned()
            .unwrap_or_else(|| role.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Dao {
    pub kernel: Address,
    pub nesting_index: usize,
    pub apps: BTreeMap<AppIdentifier, App>,
}

impl Dao {
    pub fn new(kernel: Address, nesting_index: usize, records: &[AppRecord]) -> Result<Self> {
        let mut apps = BTreeMap::new();
        for record in records {
            let app = App::from_record(record)?;
            if apps.contains_key(&app.identifier) {
                return Err(DaoError::DuplicateApp(app.identifier.to_string()));
            }
            apps.insert(app.identifier.clone(), app);
        }
        Ok(Self {
            kernel,
            nesting_index,
            apps,
        })
    }

    /// App named by an identifier as written in a script
    pub fn app(&self, identifier: &str) -> Option<&App> {
        let key: AppIdentifier = identifier.parse().ok()?;
        self.apps.get(&key)
    }

    pub fn app_mut(&mut self, identifier: &AppIdentifier) -> Option<&mut App> {
        self.apps.get_mut(identifier)
    }

    pub fn app_by_address(&self, address: &Address) -> Option<&App> {
        self.apps.values().find(|app| &app.address == address)
    }

    pub fn acl(&self) -> Result<Address> {
        self.app("acl")
            .map(|app| app.address)
            .ok_or(DaoError::AclNotFound(self.kernel))
    }
}

/// The chain of DAOs currently connected, outermost first
#[derive(Debug, Default)]
pub struct DaoStack {
    daos: Vec<Dao>,
}

impl DaoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self, kernel: &Address) -> bool {
        self.daos.iter().any(|dao| &dao.kernel == kernel)
    }

    pub fn next_nesting_index(&self) -> usize {
        self.daos.len()
    }

    pub fn push(&mut self, dao: Dao) -> Result<()> {
        if self.is_connected(&dao.kernel) {
            return Err(DaoError::AlreadyConnected(dao.kernel));
        }
        self.daos.push(dao);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Dao> {
        self.daos.pop()
    }

    pub fn current(&self) -> Option<&Dao> {
        self.daos.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Dao> {
        self.daos.last_mut()
    }

    pub fn len(&self) -> usize {
        self.daos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daos.is_empty()
    }
}
