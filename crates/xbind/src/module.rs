// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! Module surface: what one native extension exposes to the host.
//!
//! A [`Module`] bundles module-level functions (with named parameters,
//! default arguments and overload sets), exported attributes, and the
//! classes it registered. Classes go into the module's [`Registry`], which
//! by default is a fresh isolated one; embedders that want process-wide
//! visibility build against [`Registry::global()`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{FreeThunk, FunctionDescriptor, Overload, Param, TypeDescriptor};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::registry::Registry;
use crate::type_id::TypeId;
use crate::value::Value;

/// A built module, ready to serve host calls.
pub struct Module {
    name: String,
    doc: String,
    attrs: HashMap<String, Value>,
    functions: HashMap<String, FunctionDescriptor>,
    classes: HashMap<String, TypeId>,
    registry: Arc<Registry>,
}

impl Module {
    /// Start building a module with an isolated registry.
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder::new(name)
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module docstring.
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Read an exported module attribute.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// The registry this module's classes live in.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Identity of a class exposed by this module.
    pub fn class_id(&self, exposed_name: &str) -> Option<TypeId> {
        self.classes.get(exposed_name).copied()
    }

    /// Descriptor of a class exposed by this module.
    pub fn class(&self, exposed_name: &str) -> Result<Arc<TypeDescriptor>> {
        let id = self
            .class_id(exposed_name)
            .ok_or_else(|| Error::AttributeNotFound {
                type_name: self.name.clone(),
                attribute: exposed_name.to_string(),
            })?;
        self.registry.lookup(id)
    }

    /// Call a module-level function.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| Error::AttributeNotFound {
                type_name: self.name.clone(),
                attribute: name.to_string(),
            })?;
        let (thunk, bound) = function.select(args)?;
        thunk(&bound)
    }

    /// Instantiate an exposed class.
    ///
    /// Runs the matching constructor overload and crosses the new instance
    /// back through [`Registry::resolve`] with the class itself as the
    /// static type.
    pub fn instantiate(&self, exposed_name: &str, args: &[Value]) -> Result<Handle> {
        let descriptor = self.class(exposed_name)?;
        let (ctor, bound) = crate::descriptor::select_overload(
            &descriptor.exposed_name,
            &descriptor.constructors,
            args,
        )?;
        let instance = ctor(&bound)?;
        self.registry.resolve(descriptor.type_id, instance)
    }

    /// Class-scope attribute (exported enum variants, `Pet.Dog` style).
    pub fn class_attr(&self, exposed_name: &str, attr: &str) -> Result<Value> {
        let descriptor = self.class(exposed_name)?;
        descriptor
            .class_attr(attr)
            .ok_or_else(|| Error::AttributeNotFound {
                type_name: descriptor.exposed_name.clone(),
                attribute: attr.to_string(),
            })
    }

    /// Value of `<Class>.<Enum>.<Variant>`.
    pub fn enum_value(&self, exposed_name: &str, enum_name: &str, variant: &str) -> Result<Value> {
        let descriptor = self.class(exposed_name)?;
        descriptor
            .enum_value(enum_name, variant)
            .ok_or_else(|| Error::AttributeNotFound {
                type_name: descriptor.exposed_name.clone(),
                attribute: format!("{}.{}", enum_name, variant),
            })
    }

    /// Rendered signatures of a module-level function (usage info).
    pub fn signatures(&self, name: &str) -> Option<Vec<String>> {
        self.functions.get(name).map(|f| f.signatures())
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("functions", &self.functions.len())
            .field("classes", &self.classes.len())
            .field("attrs", &self.attrs.len())
            .finish()
    }
}

/// Builder for [`Module`].
///
/// # Example
///
/// ```rust
/// use xbind::{Module, Param, Value, ValueKind};
///
/// let module = Module::builder("example")
///     .doc("An example module.")
///     .attr("the_answer", Value::Int(42))
///     .function(
///         "add",
///         "A function to add two integers.",
///         vec![
///             Param::with_default("i", ValueKind::Int, Value::Int(0)),
///             Param::with_default("j", ValueKind::Int, Value::Int(0)),
///         ],
///         |args| {
///             let (i, j) = (args[0].as_int().unwrap_or(0), args[1].as_int().unwrap_or(0));
///             Ok(Value::Int(i + j))
///         },
///     )
///     .build();
///
/// assert_eq!(module.call("add", &[Value::Int(2), Value::Int(3)]).unwrap(), Value::Int(5));
/// assert_eq!(module.call("add", &[]).unwrap(), Value::Int(0));
/// ```
pub struct ModuleBuilder {
    name: String,
    doc: String,
    attrs: HashMap<String, Value>,
    functions: HashMap<String, FunctionDescriptor>,
    classes: HashMap<String, TypeId>,
    registry: Arc<Registry>,
}

impl ModuleBuilder {
    /// Start a module with a fresh isolated registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            attrs: HashMap::new(),
            functions: HashMap::new(),
            classes: HashMap::new(),
            registry: Arc::new(Registry::new()),
        }
    }

    /// Register classes into an existing registry (e.g.
    /// [`Registry::global()`]) instead of an isolated one.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Set the module docstring.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Export a module-level attribute.
    pub fn attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    /// Register a module-level function overload. Repeated calls with the
    /// same name accumulate an overload set; the first non-empty docstring
    /// wins.
    pub fn function<F>(
        mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
        params: Vec<Param>,
        thunk: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let doc = doc.into();
        let set = self
            .functions
            .entry(name.clone())
            .or_insert_with(|| FunctionDescriptor::new(name, String::new()));
        if set.doc.is_empty() {
            set.doc = doc;
        }
        set.push(Overload::new(params, Arc::new(thunk) as FreeThunk));
        self
    }

    /// Register an exposed class.
    ///
    /// Fails with [`Error::DuplicateType`] on identity collision — a
    /// registration conflict is fatal to module load, so it surfaces here
    /// rather than being deferred.
    pub fn class(mut self, descriptor: TypeDescriptor) -> Result<Self> {
        let exposed = descriptor.exposed_name.clone();
        let registered = self.registry.register(descriptor)?;
        self.classes.insert(exposed, registered.type_id);
        Ok(self)
    }

    /// Finish the module.
    pub fn build(self) -> Module {
        log::debug!(
            "[Module] '{}' built: {} function(s), {} class(es)",
            self.name,
            self.functions.len(),
            self.classes.len(),
        );
        Module {
            name: self.name,
            doc: self.doc,
            attrs: self.attrs,
            functions: self.functions,
            classes: self.classes,
            registry: self.registry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn adder() -> Module {
        Module::builder("example")
            .doc("An example module.")
            .attr("the_answer", Value::Int(42))
            .attr("what", Value::Str("World".to_string()))
            .function(
                "add",
                "A function to add two integers.",
                vec![
                    Param::new("i", ValueKind::Int),
                    Param::new("j", ValueKind::Int),
                ],
                |args| {
                    let i = args[0].as_int().unwrap_or(0);
                    let j = args[1].as_int().unwrap_or(0);
                    Ok(Value::Int(i + j))
                },
            )
            .build()
    }

    #[test]
    fn test_module_attrs() {
        let module = adder();
        assert_eq!(module.attr("the_answer"), Some(&Value::Int(42)));
        assert_eq!(module.attr("what"), Some(&Value::Str("World".to_string())));
        assert_eq!(module.attr("missing"), None);
        assert_eq!(module.doc(), "An example module.");
    }

    #[test]
    fn test_function_call() {
        let module = adder();
        assert_eq!(
            module.call("add", &[Value::Int(2), Value::Int(3)]).unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn test_unknown_function() {
        let module = adder();
        let err = module.call("sub", &[]).unwrap_err();
        assert!(matches!(err, Error::AttributeNotFound { .. }));
    }

    #[test]
    fn test_wrong_arity() {
        let module = adder();
        let err = module.call("add", &[Value::Int(1)]).unwrap_err();
        assert!(matches!(err, Error::NoMatchingOverload { arity: 1, .. }));
    }

    #[test]
    fn test_signatures() {
        let module = adder();
        assert_eq!(
            module.signatures("add").unwrap(),
            vec!["add(i: Int, j: Int)"]
        );
    }
}
