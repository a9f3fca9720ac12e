// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module registry
//!
//! Resolves a logical module name to a freshly constructed instance.
//! Registration is explicit: embedders (and the builtin set) register a
//! constructor per qualified name at startup; there is no runtime
//! scanning. Resolution tries the short name first and falls back to
//! the fully qualified one; ambiguous short names keep the last
//! registration and log a warning.

use crate::module::{ActionModule, SystemModule};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type ActionFactory = Arc<dyn Fn() -> Box<dyn ActionModule> + Send + Sync>;
type SystemFactory = Arc<dyn Fn() -> Box<dyn SystemModule> + Send + Sync>;

struct FactoryIndex<F> {
    qualified: HashMap<String, F>,
    short: HashMap<String, F>,
}

impl<F> Default for FactoryIndex<F> {
    fn default() -> Self {
        Self {
            qualified: HashMap::new(),
            short: HashMap::new(),
        }
    }
}

impl<F: Clone> FactoryIndex<F> {
    fn insert(&mut self, qualified_name: &str, factory: F) {
        let short_name = short_name(qualified_name);
        if short_name != qualified_name && self.short.contains_key(short_name) {
            tracing::warn!(
                short_name,
                qualified_name,
                "ambiguous short module name, last registration wins"
            );
        }
        self.short.insert(short_name.to_string(), factory.clone());
        self.qualified
            .insert(qualified_name.to_string(), factory);
    }

    fn get(&self, name: &str) -> Option<&F> {
        self.short.get(name).or_else(|| self.qualified.get(name))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.qualified.keys().cloned().collect();
        names.sort();
        names
    }
}

fn short_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Registry of module constructors, keyed by logical name
#[derive(Default)]
pub struct ModuleRegistry {
    actions: RwLock<FactoryIndex<ActionFactory>>,
    systems: RwLock<FactoryIndex<SystemFactory>>,
}

impl ModuleRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the builtin module set
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::modules::register_builtins(&registry);
        registry
    }

    pub fn register_action<F, M>(&self, qualified_name: &str, factory: F)
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: ActionModule + 'static,
    {
        let factory: ActionFactory = Arc::new(move || Box::new(factory()));
        let mut actions = self.actions.write().unwrap_or_else(|e| e.into_inner());
        actions.insert(qualified_name, factory);
    }

    pub fn register_system<F, M>(&self, qualified_name: &str, factory: F)
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: SystemModule + 'static,
    {
        let factory: SystemFactory = Arc::new(move || Box::new(factory()));
        let mut systems = self.systems.write().unwrap_or_else(|e| e.into_inner());
        systems.insert(qualified_name, factory);
    }

    /// Construct a fresh instance of an action module
    pub fn resolve_action(&self, name: &str) -> Option<Box<dyn ActionModule>> {
        let actions = self.actions.read().unwrap_or_else(|e| e.into_inner());
        actions.get(name).map(|factory| factory())
    }

    /// Construct a fresh instance of a system module
    pub fn resolve_system(&self, name: &str) -> Option<Box<dyn SystemModule>> {
        let systems = self.systems.read().unwrap_or_else(|e| e.into_inner());
        systems.get(name).map(|factory| factory())
    }

    /// Qualified names of all registered action modules
    pub fn action_names(&self) -> Vec<String> {
        self.actions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .names()
    }

    /// Qualified names of all registered system modules
    pub fn system_names(&self) -> Vec<String> {
        self.systems
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .names()
    }

    /// Registration jobs declared by system modules
    pub fn system_registration_jobs(&self) -> Vec<cogwork_core::Job> {
        let names = self.system_names();
        names
            .iter()
            .filter_map(|name| self.resolve_system(name))
            .filter_map(|module| module.registration_job())
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
