//! Lexically-scoped name bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::interpreter::object::Object;

/// Shared handle to an environment. Function values hold one of these for
/// their defining scope, so an environment lives as long as any closure
/// that captured it. Closure graphs may be cyclic and are left in place
/// for the lifetime of the program run.
pub type Env = Rc<RefCell<Environment>>;

/// Name-to-value mapping with an optional parent. Lookup walks the chain
/// innermost-to-outermost; declarations always land in the current scope.
#[derive(Debug)]
pub struct Environment {
    store: HashMap<String, Object>,
    parent: Option<Env>,
}

impl Environment {
    pub fn new(parent: Option<Env>) -> Env {
        Rc::new(RefCell::new(Self {
            store: HashMap::new(),
            parent,
        }))
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(object) = self.store.get(name) {
            return Some(object.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        if self.store.contains_key(name) {
            return true;
        }
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.borrow().contains(name))
    }

    pub fn declare(&mut self, name: &str, object: Object) {
        self.store.insert(name.to_string(), object);
    }
}
