use std::cell::RefCell;
use std::rc::Rc;

use crate::value::{Record, SymbolTable, Value};

/// A parent-chained symbol table.
///
/// `resolve` returns the nearest definition walking child to parent. A
/// *transient* scope shares its symbol table with an entity record, so
/// writing a field into the record publishes it for sibling deferred
/// resolution.
#[derive(Debug)]
pub struct Scope {
    parent: Option<Rc<Scope>>,
    symbols: Record,
}

impl Scope {
    pub fn root() -> Rc<Scope> {
        Rc::new(Scope {
            parent: None,
            symbols: Rc::new(RefCell::new(SymbolTable::new())),
        })
    }

    /// Child scope with a fresh symbol table.
    pub fn extend(parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            parent: Some(Rc::clone(parent)),
            symbols: Rc::new(RefCell::new(SymbolTable::new())),
        })
    }

    /// Child scope backed by `record` itself.
    pub fn transient(parent: &Rc<Scope>, record: Record) -> Rc<Scope> {
        Rc::new(Scope {
            parent: Some(Rc::clone(parent)),
            symbols: record,
        })
    }

    pub fn resolve(&self, identifier: &str) -> Option<Value> {
        if let Some(value) = self.symbols.borrow().get(identifier) {
            return Some(value.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.resolve(identifier))
    }

    pub fn set(&self, identifier: &str, value: Value) {
        self.symbols
            .borrow_mut()
            .insert(identifier.to_string(), value);
    }
}
