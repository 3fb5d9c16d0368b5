// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! # xbind — cross-boundary type resolution for native/host interop
//!
//! xbind is the type-resolution core of a binding layer: it decides, when a
//! native object crosses into a dynamic host runtime through a non-concrete
//! (base-class) handle, which exposed wrapper type the host sees, and who is
//! responsible for destroying the object.
//!
//! # Architecture
//!
//! ```text
//! Registry (per module, or process-global)
//! +-- types: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>
//!
//! TypeDescriptor (one per exposed type)
//! +-- identity, exposed name, parent link, polymorphic flag
//! +-- constructors / methods (overload sets) / properties / enums
//!
//! Handle (one per boundary crossing)
//! +-- resolved descriptor + ownership tag (Owned | Borrowed)
//! +-- atomic host-side refcount; owned instance dropped exactly once
//! ```
//!
//! # Resolution policy
//!
//! Types exposed without the polymorphic flag bind statically: a derived
//! instance returned behind such a base type is presented as the base, and
//! derived-only attributes are unreachable. Polymorphic-enabled types bind
//! to the instance's most-derived registered descriptor, falling back along
//! the base subobject chain to the nearest registered ancestor.
//!
//! # Example
//!
//! ```rust
//! use std::any::Any;
//! use xbind::{Exposed, Module, TypeDescriptorBuilder, TypeId, Value};
//!
//! struct Pet;
//! impl Exposed for Pet {
//!     fn runtime_type_id(&self) -> TypeId { TypeId::from_type_name("example.Pet") }
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//! }
//!
//! let module = Module::builder("example")
//!     .class(
//!         TypeDescriptorBuilder::new("example.Pet", "Pet")
//!             .constructor(vec![], |_| Ok(Box::new(Pet) as Box<dyn Exposed>))
//!             .build(),
//!     )
//!     .unwrap()
//!     .build();
//!
//! let pet = module.instantiate("Pet", &[]).unwrap();
//! assert_eq!(pet.type_name(), "Pet");
//! pet.release();
//! ```

pub mod descriptor;
pub mod error;
pub mod handle;
pub mod instance;
pub mod module;
pub mod registry;
pub mod resolve;
pub mod type_id;
pub mod value;

pub use descriptor::{
    CtorThunk, EnumDescriptor, FreeThunk, FunctionDescriptor, GetterThunk, MethodDescriptor,
    MethodThunk, Overload, OverloadSet, Param, PropertyDescriptor, SetterThunk, TypeDescriptor,
    TypeDescriptorBuilder,
};
pub use error::{Error, Result};
pub use handle::{Handle, Ownership};
pub use instance::{receiver_mut, receiver_ref, Exposed};
pub use module::{Module, ModuleBuilder};
pub use registry::Registry;
pub use type_id::TypeId;
pub use value::{Value, ValueKind};
