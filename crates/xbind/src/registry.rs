// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! The cross-boundary type registry.
//!
//! Maps native type identity to the exposed-wrapper descriptor. Populated
//! during module initialization, read-mostly afterwards: every resolution
//! request takes the read lock only. Dynamic re-registration is permitted
//! (the write path takes the same lock), which is also what lets tests build
//! isolated registries instead of sharing the process-wide one.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::type_id::TypeId;

/// Registry of exposed types, keyed by native type identity.
pub struct Registry {
    types: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Get the process-wide registry instance.
    ///
    /// Modules that want their classes visible to every boundary crossing in
    /// the process register here; embedders that want isolation build their
    /// own `Arc<Registry>` instead.
    pub fn global() -> Arc<Registry> {
        static REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();
        REGISTRY.get_or_init(|| Arc::new(Registry::new())).clone()
    }

    /// Register a descriptor.
    ///
    /// Fails with [`Error::DuplicateType`] if the native type identity is
    /// already registered, and with [`Error::UnknownType`] if the descriptor
    /// names a parent that is not registered yet. Requiring parents to be
    /// registered first keeps the parent-link graph an acyclic forest by
    /// construction: a descriptor can never link to itself or to a type
    /// registered after it.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<Arc<TypeDescriptor>> {
        let mut types = self.types.write().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = types.get(&descriptor.type_id) {
            return Err(Error::DuplicateType(
                descriptor.type_id,
                existing.exposed_name.clone(),
            ));
        }
        if let Some(parent) = descriptor.parent {
            if !types.contains_key(&parent) {
                return Err(Error::UnknownType(parent));
            }
        }

        log::debug!(
            "[Registry] Registered '{}' (identity {}, parent: {}, polymorphic: {})",
            descriptor.exposed_name,
            descriptor.type_id,
            descriptor
                .parent
                .map(|p| p.to_string())
                .unwrap_or_else(|| "none".to_string()),
            descriptor.polymorphic,
        );

        let descriptor = Arc::new(descriptor);
        types.insert(descriptor.type_id, descriptor.clone());
        Ok(descriptor)
    }

    /// Look up the descriptor for a native type identity.
    pub fn lookup(&self, id: TypeId) -> Result<Arc<TypeDescriptor>> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.get(&id).cloned().ok_or(Error::UnknownType(id))
    }

    /// Whether an identity is registered.
    pub fn contains(&self, id: TypeId) -> bool {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.contains_key(&id)
    }

    /// Parent identity of a registered type, if any.
    pub fn parent_of(&self, id: TypeId) -> Option<TypeId> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.get(&id).and_then(|d| d.parent)
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.len())
            .finish()
    }
}
