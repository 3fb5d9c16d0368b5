// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! Ownership transfer adapter.
//!
//! A [`Handle`] is the host-visible reference to one native instance,
//! created each time a pointer crosses into host-visible space. It carries
//! the descriptor chosen at crossing time plus an ownership tag:
//!
//! - **Owned**: the adapter invokes the native destructor exactly once, when
//!   the host-side reference count reaches zero. The slot is swapped out
//!   before the drop, so double-release degrades to a logged no-op and
//!   use-after-release surfaces as [`Error::InstanceReleased`], never as a
//!   dangling access.
//! - **Borrowed**: the adapter never releases; the caller retains ownership.
//!   The handle must not outlive the borrowed object's validity — a
//!   documented precondition of [`Handle::adopt_borrowed_raw`], not a
//!   runtime check.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::instance::Exposed;
use crate::registry::Registry;
use crate::value::Value;

/// Who is responsible for destroying the native instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The handle owns the instance and drops it when the host refcount
    /// reaches zero.
    Owned,
    /// The caller retains ownership; the handle never drops the instance.
    Borrowed,
}

/// Storage for the adapted native instance.
enum Slot {
    /// Owned instance.
    Live(Box<dyn Exposed>),
    /// Borrowed instance; validity is the adopter's precondition.
    Foreign(NonNull<dyn Exposed>),
    /// Instance released (owned path) or detached.
    Released,
}

struct HandleState {
    descriptor: Arc<TypeDescriptor>,
    registry: Arc<Registry>,
    ownership: Ownership,
    /// Host-side reference count. Starts at 1 on adoption.
    refs: AtomicUsize,
    slot: Mutex<Slot>,
}

// Slot::Foreign holds a raw pointer, which strips the auto impls. Access is
// serialized by the slot mutex, and `dyn Exposed` is `Send`; the borrowed
// pointer's validity is the adopter's precondition.
unsafe impl Send for HandleState {}
unsafe impl Sync for HandleState {}

impl HandleState {
    /// Drop the native instance if owned. Idempotent.
    fn dispose(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match std::mem::replace(&mut *slot, Slot::Released) {
            Slot::Live(instance) => {
                log::debug!(
                    "[Handle] releasing owned '{}' instance",
                    self.descriptor.exposed_name
                );
                drop(instance);
            }
            // Borrowed: the caller keeps ownership.
            Slot::Foreign(_) | Slot::Released => {}
        }
    }
}

/// Host-visible reference to a native instance.
///
/// Cloning shares the same underlying state; the host-side reference count
/// is managed explicitly through [`retain`](Handle::retain) and
/// [`release`](Handle::release).
#[derive(Clone)]
pub struct Handle {
    state: Arc<HandleState>,
}

impl Handle {
    /// Adopt an owned native instance under the given descriptor.
    pub fn adopt(
        registry: Arc<Registry>,
        descriptor: Arc<TypeDescriptor>,
        instance: Box<dyn Exposed>,
    ) -> Handle {
        Handle {
            state: Arc::new(HandleState {
                descriptor,
                registry,
                ownership: Ownership::Owned,
                refs: AtomicUsize::new(1),
                slot: Mutex::new(Slot::Live(instance)),
            }),
        }
    }

    /// Adopt a borrowed native instance under the given descriptor.
    ///
    /// # Safety
    ///
    /// `instance` must point to a live object and remain valid for as long
    /// as any clone of the returned handle can reach it. The handle never
    /// drops the object.
    pub unsafe fn adopt_borrowed_raw(
        registry: Arc<Registry>,
        descriptor: Arc<TypeDescriptor>,
        instance: NonNull<dyn Exposed>,
    ) -> Handle {
        Handle {
            state: Arc::new(HandleState {
                descriptor,
                registry,
                ownership: Ownership::Borrowed,
                refs: AtomicUsize::new(1),
                slot: Mutex::new(Slot::Foreign(instance)),
            }),
        }
    }

    /// The descriptor chosen for this instance at crossing time.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.state.descriptor
    }

    /// Exposed name of the resolved descriptor (what the host sees as the
    /// object's type).
    pub fn type_name(&self) -> &str {
        &self.state.descriptor.exposed_name
    }

    /// Ownership tag.
    pub fn ownership(&self) -> Ownership {
        self.state.ownership
    }

    /// Current host-side reference count.
    pub fn ref_count(&self) -> usize {
        self.state.refs.load(Ordering::Acquire)
    }

    /// Whether the native instance has been released.
    pub fn is_released(&self) -> bool {
        let slot = self.state.slot.lock().unwrap_or_else(|e| e.into_inner());
        matches!(*slot, Slot::Released)
    }

    /// Increment the host-side reference count.
    pub fn retain(&self) {
        let prev = self
            .state
            .refs
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                if n == 0 {
                    None
                } else {
                    Some(n + 1)
                }
            });
        if prev.is_err() {
            log::warn!(
                "[Handle] retain on released '{}' handle ignored",
                self.state.descriptor.exposed_name
            );
        }
    }

    /// Decrement the host-side reference count. When it reaches zero and the
    /// handle is Owned, the native instance is dropped exactly once.
    /// Idempotent: further releases are no-ops.
    pub fn release(&self) {
        let prev = self
            .state
            .refs
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                if n == 0 {
                    None
                } else {
                    Some(n - 1)
                }
            });
        match prev {
            Ok(1) => self.state.dispose(),
            Ok(_) => {}
            Err(_) => {
                log::debug!(
                    "[Handle] double release of '{}' handle (no-op)",
                    self.state.descriptor.exposed_name
                );
            }
        }
    }

    /// Pointer identity: two handles are equal when they share state.
    pub fn ptr_eq(a: &Handle, b: &Handle) -> bool {
        Arc::ptr_eq(&a.state, &b.state)
    }

    // ========================================================================
    // Attribute dispatch
    // ========================================================================

    /// Invoke a method by exposed name.
    ///
    /// The method is looked up on the resolved descriptor first, then up the
    /// registered parent chain. This is where the non-polymorphic pitfall
    /// becomes observable: a derived instance bound to a base descriptor has
    /// no reachable derived-only methods.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let Some(method) = self.find_in_chain(|d| d.methods.get(name).cloned()) else {
            return Err(self.attribute_not_found(name));
        };
        let (thunk, bound) = method.select(args)?;
        let thunk = thunk.clone();
        self.with_instance_mut(|instance| thunk(instance, &bound))
    }

    /// Read a property by exposed name.
    pub fn get(&self, name: &str) -> Result<Value> {
        let Some(property) = self.find_in_chain(|d| d.properties.get(name).cloned()) else {
            return Err(self.attribute_not_found(name));
        };
        let getter = property.getter.clone();
        self.with_instance(|instance| getter(instance))
    }

    /// Write a property by exposed name.
    pub fn set(&self, name: &str, value: Value) -> Result<()> {
        let Some(property) = self.find_in_chain(|d| d.properties.get(name).cloned()) else {
            return Err(self.attribute_not_found(name));
        };
        let Some(setter) = property.setter.clone() else {
            return Err(Error::PropertyReadOnly {
                type_name: self.type_name().to_string(),
                property: name.to_string(),
            });
        };
        self.with_instance_mut(|instance| setter(instance, value))
    }

    fn attribute_not_found(&self, name: &str) -> Error {
        Error::AttributeNotFound {
            type_name: self.type_name().to_string(),
            attribute: name.to_string(),
        }
    }

    /// Walk the descriptor chain (resolved descriptor, then registered
    /// ancestors) until `select` yields something.
    fn find_in_chain<T>(&self, select: impl Fn(&TypeDescriptor) -> Option<T>) -> Option<T> {
        let mut cur = Some(self.state.descriptor.clone());
        while let Some(desc) = cur {
            if let Some(found) = select(&desc) {
                return Some(found);
            }
            cur = desc.parent.and_then(|p| self.state.registry.lookup(p).ok());
        }
        None
    }

    /// Run `f` against the native instance, shared access.
    pub fn with_instance<R>(&self, f: impl FnOnce(&dyn Exposed) -> Result<R>) -> Result<R> {
        let slot = self.state.slot.lock().unwrap_or_else(|e| e.into_inner());
        match &*slot {
            Slot::Live(instance) => f(&**instance),
            Slot::Foreign(ptr) => {
                let ptr = *ptr;
                // Validity is the adopter's precondition (borrowed adoption).
                f(unsafe { ptr.as_ref() })
            }
            Slot::Released => Err(Error::InstanceReleased),
        }
    }

    /// Run `f` against the native instance, exclusive access.
    pub fn with_instance_mut<R>(
        &self,
        f: impl FnOnce(&mut dyn Exposed) -> Result<R>,
    ) -> Result<R> {
        let mut slot = self.state.slot.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *slot {
            Slot::Live(instance) => f(&mut **instance),
            Slot::Foreign(ptr) => {
                let mut ptr = *ptr;
                // Validity is the adopter's precondition (borrowed adoption).
                f(unsafe { ptr.as_mut() })
            }
            Slot::Released => Err(Error::InstanceReleased),
        }
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        Handle::ptr_eq(self, other)
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("type", &self.type_name())
            .field("ownership", &self.state.ownership)
            .field("refs", &self.ref_count())
            .field("released", &self.is_released())
            .finish()
    }
}
