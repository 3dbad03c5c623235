//! Handler tables.
//!
//! Game commands resolve through three layers, in fixed order:
//!
//! 1. **override**: namespace -> full command key -> handler. Lets a
//!    subsystem claim specific keys regardless of the general tables.
//! 2. **namespaced**: namespace -> action -> handler.
//! 3. **flat**: action -> handler.
//!
//! A key without a namespace goes to the flat layer only. A namespaced key
//! falls back to the flat layer only when no namespaced table exists for its
//! namespace. Tables are built once at startup and never mutated afterwards.

use super::traits::{GameHandler, HandshakeHandler};
use crate::handlers::handshake::{LoginHandler, RandomKeyHandler, VersionHandler};
use onyx_proto::{CommandKey, HandshakeAction};
use std::collections::HashMap;
use std::fmt;

/// Layer a command resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerLayer {
    Override,
    Namespaced,
    Flat,
}

impl HandlerLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Namespaced => "namespaced",
            Self::Flat => "flat",
        }
    }
}

/// A resolved handler.
pub struct Resolved<'a> {
    pub layer: HandlerLayer,
    pub handler: &'a dyn GameHandler,
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved").field("layer", &self.layer).finish()
    }
}

type HandlerMap<K> = HashMap<K, Box<dyn GameHandler>>;

/// Three-layer game handler table.
#[derive(Default)]
pub struct HandlerTable {
    overrides: HashMap<String, HandlerMap<String>>,
    namespaced: HashMap<String, HandlerMap<String>>,
    flat: HandlerMap<String>,
}

impl HandlerTable {
    pub fn builder() -> HandlerTableBuilder {
        HandlerTableBuilder::default()
    }

    /// A table that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up the handler for `key`. First match wins.
    pub fn resolve(&self, key: &CommandKey) -> Option<Resolved<'_>> {
        let Some(namespace) = key.namespace() else {
            return self.flat_lookup(key.action());
        };

        if let Some(handler) = self
            .overrides
            .get(namespace)
            .and_then(|claims| claims.get(key.as_str()))
        {
            return Some(Resolved {
                layer: HandlerLayer::Override,
                handler: handler.as_ref(),
            });
        }

        match self.namespaced.get(namespace) {
            Some(actions) => actions.get(key.action()).map(|handler| Resolved {
                layer: HandlerLayer::Namespaced,
                handler: handler.as_ref(),
            }),
            None => self.flat_lookup(key.action()),
        }
    }

    fn flat_lookup(&self, action: &str) -> Option<Resolved<'_>> {
        self.flat.get(action).map(|handler| Resolved {
            layer: HandlerLayer::Flat,
            handler: handler.as_ref(),
        })
    }

    /// Keys from `keys` that resolve to nothing.
    pub fn missing<'k>(&self, keys: impl IntoIterator<Item = &'k str>) -> Vec<&'k str> {
        let mut missing: Vec<&str> = keys
            .into_iter()
            .filter(|key| self.resolve(&CommandKey::parse(key)).is_none())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    /// Total registered handlers across all layers.
    pub fn len(&self) -> usize {
        self.overrides.values().map(HashMap::len).sum::<usize>()
            + self.namespaced.values().map(HashMap::len).sum::<usize>()
            + self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for [`HandlerTable`]. Later registrations replace earlier ones.
#[derive(Default)]
pub struct HandlerTableBuilder {
    table: HandlerTable,
}

impl HandlerTableBuilder {
    /// Claim a full command key (e.g. `z#zo`) in the override layer.
    pub fn claim(mut self, key: &str, handler: impl GameHandler + 'static) -> Self {
        let key = CommandKey::parse(key);
        let namespace = key.namespace().unwrap_or_default().to_string();
        self.table
            .overrides
            .entry(namespace)
            .or_default()
            .insert(key.as_str().to_string(), Box::new(handler));
        self
    }

    /// Register `namespace#action`.
    pub fn namespaced(
        mut self,
        namespace: &str,
        action: &str,
        handler: impl GameHandler + 'static,
    ) -> Self {
        self.table
            .namespaced
            .entry(namespace.to_string())
            .or_default()
            .insert(action.to_string(), Box::new(handler));
        self
    }

    /// Register an action in the flat layer.
    pub fn flat(mut self, action: &str, handler: impl GameHandler + 'static) -> Self {
        self.table
            .flat
            .insert(action.to_string(), Box::new(handler));
        self
    }

    pub fn build(self) -> HandlerTable {
        self.table
    }
}

/// Static mapping of handshake actions to bootstrap handlers.
pub struct HandshakeTable {
    handlers: HashMap<HandshakeAction, Box<dyn HandshakeHandler>>,
}

impl HandshakeTable {
    /// Table with the version check, random key and login handlers.
    pub fn new() -> Self {
        let mut handlers: HashMap<HandshakeAction, Box<dyn HandshakeHandler>> = HashMap::new();
        handlers.insert(HandshakeAction::VersionCheck, Box::new(VersionHandler));
        handlers.insert(HandshakeAction::RandomKey, Box::new(RandomKeyHandler));
        handlers.insert(HandshakeAction::Login, Box::new(LoginHandler));
        Self { handlers }
    }

    /// Handler for `action`; `None` for unmapped actions.
    pub fn get(&self, action: &HandshakeAction) -> Option<&dyn HandshakeHandler> {
        self.handlers.get(action).map(Box::as_ref)
    }
}

impl Default for HandshakeTable {
    fn default() -> Self {
        Self::new()
    }
}
