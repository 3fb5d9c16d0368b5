// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! # xbind Sample: Pet Store
//!
//! The classic binding-layer walkthrough - a module exposing classes with
//! **inheritance**, **overloads**, **properties** and **enums**, and two
//! store functions that return a derived instance behind a base-typed
//! handle.
//!
//! ## What You'll Learn
//!
//! - Building a module with `ModuleBuilder` (attrs, functions, classes)
//! - Constructor and method overload sets with default arguments
//! - The static-binding pitfall: a non-polymorphic base slices the handle
//! - Polymorphic resolution: the host sees the most-derived registered type
//! - Handle ownership: retain/release, idempotent release
//!
//! ## Resolution in One Picture
//!
//! ```text
//!  pet_store()  returns Dog            pet_store2() returns PolymorphicDog
//!  behind Pet (non-polymorphic)        behind PolymorphicPet (polymorphic)
//!
//!  ┌───────────────┐                   ┌───────────────────────┐
//!  │ handle: "Pet" │  bark() fails     │ handle:               │
//!  │  (static)     │ ────────────▶     │  "PolymorphicDog"     │ bark() ok
//!  └───────────────┘                   └───────────────────────┘
//! ```
//!
//! ## Running the Sample
//!
//! ```bash
//! RUST_LOG=xbind=debug cargo run --bin pet_store
//! ```

use std::any::Any;
use std::sync::Arc;

use xbind::{
    receiver_mut, receiver_ref, EnumDescriptor, Exposed, Module, Param, Registry,
    TypeDescriptorBuilder, TypeId, Value, ValueKind,
};

// =============================================================================
// Native types
// =============================================================================
//
// These are the types the module exposes. Exposed is the boundary trait:
// runtime_type_id() names the concrete type, and base()/base_mut() link a
// derived instance to its base subobject so inherited thunks can reach it.

const KIND_DOG: i64 = 0;

struct Pet {
    name: String,
    owner: String,
    kind: i64,
    age: i64,
}

impl Pet {
    fn new(name: &str, kind: i64, owner: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            kind,
            age: 0,
        }
    }
}

impl Exposed for Pet {
    fn runtime_type_id(&self) -> TypeId {
        TypeId::from_type_name("petstore.Pet")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Derived from Pet, exposed WITHOUT the polymorphic flag.
struct Dog {
    pet: Pet,
}

impl Exposed for Dog {
    fn runtime_type_id(&self) -> TypeId {
        TypeId::from_type_name("petstore.Dog")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn base(&self) -> Option<&dyn Exposed> {
        Some(&self.pet)
    }
    fn base_mut(&mut self) -> Option<&mut dyn Exposed> {
        Some(&mut self.pet)
    }
}

/// Base exposed WITH the polymorphic flag.
struct PolymorphicPet;

impl Exposed for PolymorphicPet {
    fn runtime_type_id(&self) -> TypeId {
        TypeId::from_type_name("petstore.PolymorphicPet")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct PolymorphicDog {
    base: PolymorphicPet,
}

impl Exposed for PolymorphicDog {
    fn runtime_type_id(&self) -> TypeId {
        TypeId::from_type_name("petstore.PolymorphicDog")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn base(&self) -> Option<&dyn Exposed> {
        Some(&self.base)
    }
    fn base_mut(&mut self) -> Option<&mut dyn Exposed> {
        Some(&mut self.base)
    }
}

fn pet_id() -> TypeId {
    TypeId::from_type_name("petstore.Pet")
}

fn poly_pet_id() -> TypeId {
    TypeId::from_type_name("petstore.PolymorphicPet")
}

// =============================================================================
// Module construction
// =============================================================================

fn build_module() -> Result<Module, xbind::Error> {
    // The store functions need to resolve instances against the same
    // registry the classes were registered into, so build it up front and
    // move clones into the closures.
    let registry = Arc::new(Registry::new());

    let pet = TypeDescriptorBuilder::new("petstore.Pet", "Pet")
        .doc("A pet.")
        .constructor(
            vec![
                Param::new("name", ValueKind::Str),
                Param::with_default("owner", ValueKind::Str, Value::Str(String::new())),
            ],
            |args| {
                let name = args[0].as_str().unwrap_or_default();
                let owner = args[1].as_str().unwrap_or_default();
                Ok(Box::new(Pet::new(name, KIND_DOG, owner)) as Box<dyn Exposed>)
            },
        )
        .method(
            "setName",
            "Set pet name.",
            vec![Param::new("name", ValueKind::Str)],
            |recv, args| {
                let pet = receiver_mut::<Pet>(recv, "petstore.Pet")?;
                pet.name = args[0].as_str().unwrap_or_default().to_string();
                Ok(Value::Null)
            },
        )
        .method("getName", "Get pet name.", vec![], |recv, _args| {
            let pet = receiver_ref::<Pet>(recv, "petstore.Pet")?;
            Ok(Value::Str(pet.name.clone()))
        })
        // Overload set: set(Int) targets the age, set(Str) the name.
        .method(
            "set",
            "Set the pet's age",
            vec![Param::new("age", ValueKind::Int)],
            |recv, args| {
                let pet = receiver_mut::<Pet>(recv, "petstore.Pet")?;
                pet.age = args[0].as_int().unwrap_or(0);
                Ok(Value::Null)
            },
        )
        .method(
            "set",
            "Set the pet's name",
            vec![Param::new("name", ValueKind::Str)],
            |recv, args| {
                let pet = receiver_mut::<Pet>(recv, "petstore.Pet")?;
                pet.name = args[0].as_str().unwrap_or_default().to_string();
                Ok(Value::Null)
            },
        )
        .method("__repr__", "Return repr(self).", vec![], |recv, _args| {
            let pet = receiver_ref::<Pet>(recv, "petstore.Pet")?;
            Ok(Value::Str(format!(
                "<petstore.Pet named '{}' owned by '{}'>",
                pet.name, pet.owner
            )))
        })
        .property(
            "owner",
            "Owner name.",
            |recv| {
                let pet = receiver_ref::<Pet>(recv, "petstore.Pet")?;
                Ok(Value::Str(pet.owner.clone()))
            },
            |recv, value| {
                let pet = receiver_mut::<Pet>(recv, "petstore.Pet")?;
                pet.owner = value.as_str().unwrap_or_default().to_string();
                Ok(())
            },
        )
        .readonly_property("kind", "Pet kind.", |recv| {
            let pet = receiver_ref::<Pet>(recv, "petstore.Pet")?;
            Ok(Value::Enum(TypeId::from_type_name("Pet.Kind"), pet.kind))
        })
        .enumeration(
            EnumDescriptor::new("Kind")
                .variant("Dog", 0)
                .variant("Cat", 1)
                .export_values(),
        )
        .build();

    let dog = TypeDescriptorBuilder::new("petstore.Dog", "Dog")
        .parent(pet_id())
        .constructor(vec![Param::new("name", ValueKind::Str)], |args| {
            let name = args[0].as_str().unwrap_or_default();
            Ok(Box::new(Dog {
                pet: Pet::new(name, KIND_DOG, ""),
            }) as Box<dyn Exposed>)
        })
        .method("bark", "Bark like a dog.", vec![], |_recv, _args| {
            Ok(Value::Str("woof!".to_string()))
        })
        .build();

    let poly_pet = TypeDescriptorBuilder::new("petstore.PolymorphicPet", "PolymorphicPet")
        .polymorphic()
        .build();

    let poly_dog = TypeDescriptorBuilder::new("petstore.PolymorphicDog", "PolymorphicDog")
        .parent(poly_pet_id())
        .polymorphic()
        .constructor(vec![], |_args| {
            Ok(Box::new(PolymorphicDog {
                base: PolymorphicPet,
            }) as Box<dyn Exposed>)
        })
        .method("bark", "", vec![], |_recv, _args| {
            Ok(Value::Str("woof!".to_string()))
        })
        .build();

    let store_registry = registry.clone();
    let store2_registry = registry.clone();

    let module = Module::builder("petstore")
        .with_registry(registry)
        .doc("Pet store sample module.")
        .attr("the_answer", Value::Int(42))
        .attr("what", Value::Str("World".to_string()))
        .class(pet)?
        .class(dog)?
        .class(poly_pet)?
        .class(poly_dog)?
        .function(
            "pet_store",
            "Returns a Dog behind a Pet handle.",
            vec![],
            move |_args| {
                let dog = Box::new(Dog {
                    pet: Pet::new("Rocky", KIND_DOG, ""),
                });
                let handle = store_registry.resolve(pet_id(), dog)?;
                Ok(Value::Object(handle))
            },
        )
        .function(
            "pet_store2",
            "Returns a PolymorphicDog behind a PolymorphicPet handle.",
            vec![],
            move |_args| {
                let dog = Box::new(PolymorphicDog {
                    base: PolymorphicPet,
                });
                let handle = store2_registry.resolve(poly_pet_id(), dog)?;
                Ok(Value::Object(handle))
            },
        )
        .build();

    Ok(module)
}

// =============================================================================
// Walkthrough
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let module = build_module()?;
    println!("module '{}': {}", module.name(), module.doc());
    println!(
        "  the_answer = {}",
        module.attr("the_answer").unwrap_or(&Value::Null)
    );

    // --- Classes, overloads, properties ---------------------------------
    let pet = module.instantiate("Pet", &[Value::Str("Rocky".to_string())])?;
    println!("\ninstantiated: {}", pet.call("__repr__", &[])?);

    pet.call("set", &[Value::Int(5)])?; // age overload
    pet.call("set", &[Value::Str("Brutus".to_string())])?; // name overload
    pet.set("owner", Value::Str("someone".to_string()))?;
    println!("after set():  {}", pet.call("__repr__", &[])?);

    for sig in module.signatures("pet_store").unwrap_or_default() {
        println!("usage: {sig}");
    }
    pet.release();

    // --- Static binding pitfall -----------------------------------------
    // Pet is not polymorphic, so the Dog comes back sliced down to Pet and
    // bark() is unreachable.
    let sliced = module.call("pet_store", &[])?;
    let handle = sliced.as_object().ok_or("pet_store returned a non-object")?;
    println!("\npet_store():  handle type = {}", handle.type_name());
    match handle.call("bark", &[]) {
        Ok(v) => println!("  bark() = {v}"),
        Err(e) => println!("  bark() fails: {e}"),
    }
    println!("  getName() = {}", handle.call("getName", &[])?);
    handle.release();

    // --- Polymorphic resolution -----------------------------------------
    let resolved = module.call("pet_store2", &[])?;
    let handle = resolved
        .as_object()
        .ok_or("pet_store2 returned a non-object")?;
    println!("\npet_store2(): handle type = {}", handle.type_name());
    println!("  bark() = {}", handle.call("bark", &[])?);

    // Release is idempotent; the owned instance drops exactly once.
    handle.release();
    handle.release();
    println!("  released: {}", handle.is_released());

    // --- Enums ----------------------------------------------------------
    let cat = module.enum_value("Pet", "Kind", "Cat")?;
    println!("\nPet.Kind.Cat = {cat}");
    println!("Pet.Cat      = {}", module.class_attr("Pet", "Cat")?);

    Ok(())
}
