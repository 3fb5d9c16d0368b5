// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! Error taxonomy for boundary crossings.

use crate::type_id::TypeId;

/// Errors returned by xbind operations.
///
/// Registration errors are reported at module-initialization time and are
/// fatal to module load. Resolution and dispatch errors are surfaced to the
/// host as boundary-crossing failures and are recoverable by the caller.
/// No operation is retried; every error is a deterministic function of the
/// current registry state and the supplied arguments.
///
/// # Example
///
/// ```rust
/// use xbind::{Registry, TypeId, Error};
///
/// let registry = Registry::new();
/// match registry.lookup(TypeId::from_type_name("example.Missing")) {
///     Err(Error::UnknownType(id)) => println!("not registered: {}", id),
///     Err(e) => println!("other error: {}", e),
///     Ok(_) => println!("found"),
/// }
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Registration Errors (module initialization)
    // ========================================================================
    /// A descriptor with the same native type identity is already registered.
    DuplicateType(TypeId, String),
    /// No descriptor registered for the given type identity.
    UnknownType(TypeId),

    // ========================================================================
    // Resolution Errors (boundary crossing)
    // ========================================================================
    /// The instance's runtime type and all of its ancestors are unregistered;
    /// the native object cannot be represented at the boundary.
    UnresolvedType(TypeId),

    // ========================================================================
    // Dispatch Errors (host-side attribute access)
    // ========================================================================
    /// The host invoked a method or property absent from the resolved
    /// descriptor and all of its registered ancestors.
    AttributeNotFound {
        /// Exposed name of the resolved descriptor.
        type_name: String,
        /// Attribute the host asked for.
        attribute: String,
    },
    /// An overload set was found but no overload accepts the supplied
    /// argument kinds and arity.
    NoMatchingOverload {
        /// Exposed name of the function or method.
        name: String,
        /// Number of arguments the host supplied.
        arity: usize,
    },
    /// Assignment to a property exposed without a setter.
    PropertyReadOnly {
        /// Exposed name of the owning type.
        type_name: String,
        /// Property name.
        property: String,
    },

    // ========================================================================
    // Instance Errors
    // ========================================================================
    /// Operation through a Handle whose native object was already released.
    InstanceReleased,
    /// A native thunk received a receiver or argument of the wrong concrete
    /// type. Indicates a descriptor wired against the wrong native type.
    TypeMismatch {
        /// Native type the thunk expected.
        expected: &'static str,
        /// Runtime identity of what it received.
        got: TypeId,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DuplicateType(id, name) => {
                write!(f, "type '{}' already registered (identity {})", name, id)
            }
            Error::UnknownType(id) => write!(f, "no descriptor registered for identity {}", id),
            Error::UnresolvedType(id) => write!(
                f,
                "runtime type {} has no registered descriptor or ancestor",
                id
            ),
            Error::AttributeNotFound {
                type_name,
                attribute,
            } => write!(f, "'{}' object has no attribute '{}'", type_name, attribute),
            Error::NoMatchingOverload { name, arity } => {
                write!(f, "no overload of '{}' accepts {} argument(s)", name, arity)
            }
            Error::PropertyReadOnly {
                type_name,
                property,
            } => write!(f, "property '{}.{}' is read-only", type_name, property),
            Error::InstanceReleased => write!(f, "native instance was already released"),
            Error::TypeMismatch { expected, got } => {
                write!(f, "receiver mismatch: expected {}, got identity {}", expected, got)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_attribute_not_found() {
        let err = Error::AttributeNotFound {
            type_name: "example.Pet".to_string(),
            attribute: "bark".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'example.Pet' object has no attribute 'bark'"
        );
    }

    #[test]
    fn test_display_duplicate() {
        let id = TypeId::from_type_name("example.Pet");
        let err = Error::DuplicateType(id, "Pet".to_string());
        assert!(err.to_string().contains("already registered"));
    }
}
