// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! The native object model seam.
//!
//! Native types that cross the boundary implement [`Exposed`]. The trait is
//! the runtime-type-identification hook: `runtime_type_id` plays the role a
//! virtual destructor plays in C++ binding layers, and `base`/`base_mut`
//! model the upcast to a base subobject so that methods registered on an
//! ancestor descriptor can run against a derived receiver.

use std::any::Any;

use crate::error::{Error, Result};
use crate::type_id::TypeId;

/// A native instance visible to the binding layer.
///
/// # Implementing for a hierarchy
///
/// A derived type embeds its base and forwards `base`/`base_mut` to it:
///
/// ```rust
/// use std::any::Any;
/// use xbind::{Exposed, TypeId};
///
/// struct Pet { name: String }
/// struct Dog { pet: Pet }
///
/// impl Exposed for Pet {
///     fn runtime_type_id(&self) -> TypeId { TypeId::from_type_name("example.Pet") }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
///
/// impl Exposed for Dog {
///     fn runtime_type_id(&self) -> TypeId { TypeId::from_type_name("example.Dog") }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
///     fn base(&self) -> Option<&dyn Exposed> { Some(&self.pet) }
///     fn base_mut(&mut self) -> Option<&mut dyn Exposed> { Some(&mut self.pet) }
/// }
/// ```
pub trait Exposed: Any + Send {
    /// Identity of the instance's most-derived native type.
    fn runtime_type_id(&self) -> TypeId;

    /// Upcast to `Any` for receiver downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast to `Any` for receiver downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Base subobject, if this type has an exposed parent.
    fn base(&self) -> Option<&dyn Exposed> {
        None
    }

    /// Mutable base subobject, if this type has an exposed parent.
    fn base_mut(&mut self) -> Option<&mut dyn Exposed> {
        None
    }
}

/// Downcast a receiver to the concrete native type a thunk was written for,
/// walking up the base-subobject chain.
///
/// Fails with [`Error::TypeMismatch`] when neither the receiver nor any of
/// its base subobjects is a `T` — the descriptor was wired against the wrong
/// native type.
pub fn receiver_ref<'a, T: Any>(obj: &'a dyn Exposed, expected: &'static str) -> Result<&'a T> {
    let got = obj.runtime_type_id();
    let mut cur = Some(obj);
    while let Some(o) = cur {
        if let Some(t) = o.as_any().downcast_ref::<T>() {
            return Ok(t);
        }
        cur = o.base();
    }
    Err(Error::TypeMismatch { expected, got })
}

/// Mutable variant of [`receiver_ref`].
pub fn receiver_mut<'a, T: Any>(
    obj: &'a mut dyn Exposed,
    expected: &'static str,
) -> Result<&'a mut T> {
    let got = obj.runtime_type_id();
    if obj.as_any().is::<T>() {
        // Checked just above; the second lookup keeps the borrow simple.
        return obj
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(Error::TypeMismatch { expected, got });
    }
    match obj.base_mut() {
        Some(base) => receiver_mut(base, expected),
        None => Err(Error::TypeMismatch { expected, got }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Animal {
        legs: i64,
    }

    #[derive(Debug)]
    struct Spider {
        animal: Animal,
    }

    impl Exposed for Animal {
        fn runtime_type_id(&self) -> TypeId {
            TypeId::from_type_name("test.Animal")
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl Exposed for Spider {
        fn runtime_type_id(&self) -> TypeId {
            TypeId::from_type_name("test.Spider")
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
        fn base(&self) -> Option<&dyn Exposed> {
            Some(&self.animal)
        }
        fn base_mut(&mut self) -> Option<&mut dyn Exposed> {
            Some(&mut self.animal)
        }
    }

    #[test]
    fn test_receiver_exact_type() {
        let a = Animal { legs: 4 };
        let r: &Animal = receiver_ref(&a, "test.Animal").unwrap();
        assert_eq!(r.legs, 4);
    }

    #[test]
    fn test_receiver_walks_to_base() {
        let mut s = Spider {
            animal: Animal { legs: 8 },
        };
        // A thunk written for Animal runs against a Spider receiver.
        let r: &mut Animal = receiver_mut(&mut s, "test.Animal").unwrap();
        r.legs = 6;
        assert_eq!(s.animal.legs, 6);
    }

    #[test]
    fn test_receiver_mismatch() {
        let a = Animal { legs: 4 };
        let err = receiver_ref::<Spider>(&a, "test.Spider").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}
