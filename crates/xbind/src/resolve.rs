// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! Resolution policy: which descriptor does an instance get at the boundary?
//!
//! Given an instance produced behind a declared (static) type `S`:
//!
//! - If `S` is **not** polymorphic-enabled, the handle binds to `S`'s own
//!   descriptor, regardless of the instance's most-derived type. A derived
//!   instance returned through a non-polymorphic base handle is presented to
//!   the host as the base type, and derived-only operations are unreachable.
//!   This reproduces the classic binding-layer pitfall on purpose.
//! - If `S` **is** polymorphic-enabled, the instance's runtime identity is
//!   looked up in the registry, falling back along the instance's base
//!   subobject chain to the nearest registered ancestor. If nothing on the
//!   chain is registered, the crossing fails with
//!   [`Error::UnresolvedType`] — the object cannot be represented.

use std::ptr::NonNull;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::instance::Exposed;
use crate::registry::Registry;
use crate::type_id::TypeId;

impl Registry {
    /// Apply the resolution policy without adopting the instance.
    ///
    /// Exposed separately so the policy is testable in isolation from
    /// ownership transfer.
    pub fn resolve_descriptor(
        &self,
        static_type: TypeId,
        instance: &dyn Exposed,
    ) -> Result<Arc<TypeDescriptor>> {
        let static_desc = self.lookup(static_type)?;
        if !static_desc.polymorphic {
            // Static binding: the declared type carries no runtime type
            // identification, so the actual most-derived type is invisible.
            return Ok(static_desc);
        }

        let runtime = instance.runtime_type_id();
        let mut cur = Some(instance);
        while let Some(obj) = cur {
            if let Ok(desc) = self.lookup(obj.runtime_type_id()) {
                if desc.type_id != static_desc.type_id {
                    log::debug!(
                        "[Resolve] '{}' instance behind polymorphic '{}' resolved to '{}'",
                        runtime,
                        static_desc.exposed_name,
                        desc.exposed_name,
                    );
                }
                return Ok(desc);
            }
            cur = obj.base();
        }
        Err(Error::UnresolvedType(runtime))
    }

    /// Resolve an owned instance into a [`Handle`].
    ///
    /// The adapter takes ownership: the native instance is dropped exactly
    /// once, when the handle's host-side reference count reaches zero.
    pub fn resolve(
        self: &Arc<Self>,
        static_type: TypeId,
        instance: Box<dyn Exposed>,
    ) -> Result<Handle> {
        let descriptor = self.resolve_descriptor(static_type, &*instance)?;
        Ok(Handle::adopt(self.clone(), descriptor, instance))
    }

    /// Resolve a borrowed instance into a [`Handle`].
    ///
    /// # Safety
    ///
    /// `instance` must point to a live object and remain valid for as long
    /// as any clone of the returned handle can reach it; the handle never
    /// drops it. See [`Handle::adopt_borrowed_raw`].
    pub unsafe fn resolve_borrowed(
        self: &Arc<Self>,
        static_type: TypeId,
        instance: NonNull<dyn Exposed>,
    ) -> Result<Handle> {
        let descriptor = self.resolve_descriptor(static_type, instance.as_ref())?;
        Ok(Handle::adopt_borrowed_raw(self.clone(), descriptor, instance))
    }
}
