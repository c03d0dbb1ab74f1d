// SPDX-License-Identifier: GPL-3.0-or-later

//! Maps directive names to their handlers.
//!
//! Registries are layered: a flavor registry names the common registry as its
//! parent, adds its own directives and may override common ones. Lookup walks
//! from the most specific layer to the least specific one and returns the
//! first match.

use super::interpreter::{DirectiveError, Interpreter};
use super::variables::Variables;
use std::collections::HashMap;

/// A directive handler: receives the interpreter, the active environment and
/// the substituted arguments.
pub type Handler = fn(&mut Interpreter<'_>, &mut Variables, &[String]) -> Result<(), DirectiveError>;

#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Handler>,
    parent: Option<&'static CommandRegistry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: &'static CommandRegistry) -> Self {
        Self { handlers: HashMap::new(), parent: Some(parent) }
    }

    /// Registers the handler under every given (lower-case) name.
    ///
    /// Within one layer the last registration of a name wins.
    pub fn register(&mut self, names: &[&'static str], handler: Handler) -> &mut Self {
        for &name in names {
            if self.handlers.insert(name, handler).is_some() {
                log::debug!("Handler of '{name}' registered twice, keeping the last one");
            }
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Handler> {
        match self.handlers.get(name) {
            Some(handler) => Some(*handler),
            None => self.parent.and_then(|parent| parent.lookup(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("CommandRegistry")
            .field("handlers", &names)
            .field("parent", &self.parent)
            .finish()
    }
}
