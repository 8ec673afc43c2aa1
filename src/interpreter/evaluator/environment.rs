use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::interpreter::value::core::Value;

/// A shared handle to a scope.
pub type Env = Rc<Scope>;

/// One level of variable bindings.
///
/// Scopes form a chain through their parent pointers. Lookups walk from the
/// innermost scope outwards; definitions always land in the scope they are
/// made on.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: RefCell<HashMap<String, Value>>,
    parent:   Option<Env>,
}

impl Scope {
    /// Creates a scope without a parent.
    #[must_use]
    pub fn global() -> Env {
        Rc::new(Self::default())
    }

    /// Creates a scope nested in `parent`.
    #[must_use]
    pub fn child(parent: &Env) -> Env {
        Rc::new(Self { bindings: RefCell::default(),
                       parent:   Some(Rc::clone(parent)), })
    }

    /// Looks a name up, innermost scope first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref()?.get(name)
    }

    /// Binds a name in this scope, shadowing outer bindings.
    pub fn define(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// Rebinds the nearest existing binding of a name.
    ///
    /// Returns `false`, changing nothing, when no scope binds the name.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.bindings.borrow_mut().get_mut(name) {
            *slot = value;
            return true;
        }
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.assign(name, value))
    }

    /// Rebinds the nearest binding of a name, or defines it here.
    pub fn assign_or_define(&self, name: &str, value: Value) {
        if !self.contains(name) {
            self.define(name, value);
            return;
        }
        self.assign(name, value);
    }

    /// Returns `true` if the name is bound in this scope or an outer one.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
        || self.parent.as_ref().is_some_and(|parent| parent.contains(name))
    }

    /// Number of bindings made directly in this scope.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// Returns `true` if this scope has no bindings of its own.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outwards() {
        let global = Scope::global();
        global.define("x", Value::Number(1.0));
        let inner = Scope::child(&global);
        assert_eq!(inner.get("x"), Some(Value::Number(1.0)));
        assert_eq!(inner.get("y"), None);
    }

    #[test]
    fn define_shadows_without_touching_the_parent() {
        let global = Scope::global();
        global.define("x", Value::Number(1.0));
        let inner = Scope::child(&global);
        inner.define("x", Value::Number(2.0));
        assert_eq!(inner.get("x"), Some(Value::Number(2.0)));
        assert_eq!(global.get("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn assignment_rebinds_the_nearest_binding() {
        let global = Scope::global();
        global.define("x", Value::Number(1.0));
        let inner = Scope::child(&global);
        inner.assign_or_define("x", Value::Number(5.0));
        assert_eq!(global.get("x"), Some(Value::Number(5.0)));
        assert!(inner.is_empty());

        inner.assign_or_define("y", Value::Bool(true));
        assert_eq!(inner.len(), 1);
        assert!(!global.contains("y"));
        assert!(!global.assign("y", Value::Unit));
    }
}
