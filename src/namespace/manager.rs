//! Namespace catalog.
//!
//! Routing domains are registered here by name. Lookups on the query path
//! are wait-free through the same copy-on-write idiom the topology uses;
//! registration and deregistration are serialized by their own write lock.

use arc_swap::ArcSwap;
use im::HashMap;
use log::info;
use std::sync::{Arc, Mutex};

use super::Namespace;
use crate::core::Result;

/// Catalog of independent routing domains, keyed by namespace name.
///
/// The catalog is an owned value: embed one wherever the surrounding system
/// needs it rather than reaching for process-wide state. Deregistering a
/// namespace only drops the catalog entry; backend teardown stays the
/// business of the commands applied to that namespace.
pub struct NamespaceManager {
    namespaces: ArcSwap<HashMap<String, Arc<Namespace>>>,
    write_lock: Mutex<()>,
}

impl NamespaceManager {
    pub fn new() -> Self {
        Self {
            namespaces: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Register a namespace under its name, replacing any previous
    /// registration with the same name.
    pub fn register(&self, namespace: Namespace) -> Result<Arc<Namespace>> {
        let _guard = self.write_lock.lock()?;

        let namespace = Arc::new(namespace);
        let current = self.namespaces.load();
        self.namespaces.store(Arc::new(
            current.update(namespace.name().to_string(), Arc::clone(&namespace)),
        ));

        info!("[{}] namespace registered", namespace.name());

        Ok(namespace)
    }

    /// Drop the catalog entry for `name`. No-op with success if absent.
    pub fn deregister(&self, name: &str) -> Result<()> {
        let _guard = self.write_lock.lock()?;

        let current = self.namespaces.load();
        if !current.contains_key(name) {
            return Ok(());
        }
        self.namespaces.store(Arc::new(current.without(name)));

        info!("[{}] namespace deregistered", name);

        Ok(())
    }

    /// The namespace registered under `name`, if any. Wait-free.
    pub fn get(&self, name: &str) -> Option<Arc<Namespace>> {
        self.namespaces.load().get(name).cloned()
    }

    /// Registered names, sorted for stable diagnostics.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.load().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.namespaces.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.load().is_empty()
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}
