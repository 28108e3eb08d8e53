//! Scoped bindings
//!
//! Scopes live in an arena of frames. Each frame points at its parent, and
//! `current` is the innermost frame. Lookups walk outward through parents;
//! writes always land in the current frame, so a nested block shadows outer
//! bindings without touching them.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{InterpreterError, Result};
use crate::module::Module;
use crate::value::Value;

/// Namespaces partitioning the bindings of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingSpace {
    /// Script variables (`$name`)
    User,
    /// Named addresses and resolved app identifiers
    Addr,
    /// Loaded module instances, keyed by alias
    Module,
    /// Module names mapped to the alias they were loaded under
    Alias,
}

/// A bound value
#[derive(Clone)]
pub enum Binding {
    Value(Value),
    Module(Arc<dyn Module>),
}

impl Binding {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Binding::Value(value) => Some(value),
            Binding::Module(_) => None,
        }
    }

    pub fn as_module(&self) -> Option<&Arc<dyn Module>> {
        match self {
            Binding::Module(module) => Some(module),
            Binding::Value(_) => None,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Binding::Module(module) => f.debug_tuple("Module").field(&module.name()).finish(),
        }
    }
}

#[derive(Debug, Default)]
struct Frame {
    parent: Option<usize>,
    entries: HashMap<BindingSpace, HashMap<String, Binding>>,
}

/// Chain of scopes from the innermost block out to the script root
#[derive(Debug)]
pub struct BindingsManager {
    frames: Vec<Frame>,
    current: usize,
}

impl Default for BindingsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingsManager {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
            current: 0,
        }
    }

    /// Number of scopes entered above the root
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut index = self.frames.get(self.current).and_then(|frame| frame.parent);
        while let Some(i) = index {
            depth += 1;
            index = self.frames.get(i).and_then(|frame| frame.parent);
        }
        depth
    }

    /// Open a new innermost scope
    pub fn enter_scope(&mut self) {
        self.frames.push(Frame {
            parent: Some(self.current),
            entries: HashMap::new(),
        });
        self.current = self.frames.len() - 1;
    }

    /// Drop the innermost scope and every binding it holds
    pub fn exit_scope(&mut self) -> Result<()> {
        let parent = self
            .frames
            .get(self.current)
            .and_then(|frame| frame.parent)
            .ok_or_else(|| InterpreterError::binding("cannot exit the root scope"))?;
        self.frames.truncate(self.current);
        self.current = parent;
        Ok(())
    }

    /// Nearest binding for `identifier`, searching from the innermost scope outward
    pub fn get_binding(&self, space: BindingSpace, identifier: &str) -> Option<&Binding> {
        let mut index = Some(self.current);
        while let Some(i) = index {
            let frame = self.frames.get(i)?;
            if let Some(binding) = frame.entries.get(&space).and_then(|m| m.get(identifier)) {
                return Some(binding);
            }
            index = frame.parent;
        }
        None
    }

    /// Bind `identifier` in the current scope, replacing any binding it already holds there
    pub fn set_binding(&mut self, space: BindingSpace, identifier: &str, binding: Binding) {
        if let Some(frame) = self.frames.get_mut(self.current) {
            frame
                .entries
                .entry(space)
                .or_default()
                .insert(identifier.to_string(), binding);
        }
    }

    pub fn get_value(&self, space: BindingSpace, identifier: &str) -> Option<&Value> {
        self.get_binding(space, identifier).and_then(Binding::as_value)
    }

    pub fn set_value(&mut self, space: BindingSpace, identifier: &str, value: Value) {
        self.set_binding(space, identifier, Binding::Value(value));
    }

    pub fn get_module(&self, alias: &str) -> Option<Arc<dyn Module>> {
        self.get_binding(BindingSpace::Module, alias)
            .and_then(Binding::as_module)
            .cloned()
    }

    pub fn set_module(&mut self, alias: &str, module: Arc<dyn Module>) {
        self.set_binding(BindingSpace::Module, alias, Binding::Module(module));
    }

    /// Every identifier visible from the current scope in the given spaces
    pub fn get_all_identifiers(&self, spaces: &[BindingSpace]) -> BTreeSet<String> {
        let mut identifiers = BTreeSet::new();
        let mut index = Some(self.current);
        while let Some(i) = index {
            let Some(frame) = self.frames.get(i) else { break };
            for space in spaces {
                if let Some(entries) = frame.entries.get(space) {
                    identifiers.extend(entries.keys().cloned());
                }
            }
            index = frame.parent;
        }
        identifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daoscript_common::Address;

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn test_inner_scope_shadows_without_mutating_outer() {
        let mut bindings = BindingsManager::new();
        bindings.set_value(BindingSpace::User, "x", text("outer"));

        bindings.enter_scope();
        assert_eq!(bindings.get_value(BindingSpace::User, "x"), Some(&text("outer")));
        bindings.set_value(BindingSpace::User, "x", text("inner"));
        assert_eq!(bindings.get_value(BindingSpace::User, "x"), Some(&text("inner")));

        bindings.exit_scope().unwrap();
        assert_eq!(bindings.get_value(BindingSpace::User, "x"), Some(&text("outer")));
    }

    #[test]
    fn test_spaces_are_independent() {
        let mut bindings = BindingsManager::new();
        bindings.set_value(BindingSpace::Addr, "vault", Value::Address(Address::ZERO));
        assert!(bindings.get_value(BindingSpace::User, "vault").is_none());
        assert!(bindings.get_value(BindingSpace::Addr, "vault").is_some());
    }

    #[test]
    fn test_inner_bindings_disappear_on_exit() {
        let mut bindings = BindingsManager::new();
        bindings.enter_scope();
        bindings.enter_scope();
        assert_eq!(bindings.depth(), 2);
        bindings.set_value(BindingSpace::User, "tmp", Value::Bool(true));
        bindings.exit_scope().unwrap();
        assert_eq!(bindings.depth(), 1);
        assert!(bindings.get_value(BindingSpace::User, "tmp").is_none());

        // A fresh scope must not see the bindings of the one just dropped
        bindings.enter_scope();
        assert!(bindings.get_value(BindingSpace::User, "tmp").is_none());
    }

    #[test]
    fn test_last_write_wins_within_a_scope() {
        let mut bindings = BindingsManager::new();
        bindings.set_value(BindingSpace::User, "x", text("a"));
        bindings.set_value(BindingSpace::User, "x", text("b"));
        assert_eq!(bindings.get_value(BindingSpace::User, "x"), Some(&text("b")));
    }

    #[test]
    fn test_exiting_root_scope_fails() {
        let mut bindings = BindingsManager::new();
        assert!(matches!(bindings.exit_scope(), Err(InterpreterError::Binding(_))));
    }

    #[test]
    fn test_get_all_identifiers_merges_visible_scopes() {
        let mut bindings = BindingsManager::new();
        bindings.set_value(BindingSpace::User, "a", Value::Bool(true));
        bindings.set_value(BindingSpace::Addr, "vault", Value::Address(Address::ZERO));
        bindings.enter_scope();
        bindings.set_value(BindingSpace::User, "b", Value::Bool(false));

        let users: Vec<_> = bindings
            .get_all_identifiers(&[BindingSpace::User])
            .into_iter()
            .collect();
        assert_eq!(users, vec!["a".to_string(), "b".to_string()]);

        let all = bindings.get_all_identifiers(&[BindingSpace::User, BindingSpace::Addr]);
        assert_eq!(all.len(), 3);
    }
}
