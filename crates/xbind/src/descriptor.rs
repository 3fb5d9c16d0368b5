// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! Exposed-type descriptors.
//!
//! A [`TypeDescriptor`] is the boundary-side picture of one native type:
//! its identity, exposed name, optional parent link, polymorphic capability
//! flag, and the attribute tables (constructors, methods with overload sets
//! and default arguments, properties, in-class enumerations) the host is
//! allowed to touch. Descriptors are built once with
//! [`TypeDescriptorBuilder`] and live in the registry behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::instance::Exposed;
use crate::type_id::TypeId;
use crate::value::{Value, ValueKind};

/// Native thunk for a free function.
pub type FreeThunk = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Native thunk for an instance method. The receiver arrives as
/// `&mut dyn Exposed`; thunks downcast it with
/// [`receiver_mut`](crate::instance::receiver_mut).
pub type MethodThunk = Arc<dyn Fn(&mut dyn Exposed, &[Value]) -> Result<Value> + Send + Sync>;

/// Native thunk for a constructor.
pub type CtorThunk = Arc<dyn Fn(&[Value]) -> Result<Box<dyn Exposed>> + Send + Sync>;

/// Native thunk for a property getter.
pub type GetterThunk = Arc<dyn Fn(&dyn Exposed) -> Result<Value> + Send + Sync>;

/// Native thunk for a property setter.
pub type SetterThunk = Arc<dyn Fn(&mut dyn Exposed, Value) -> Result<()> + Send + Sync>;

/// One named parameter of an overload.
#[derive(Debug, Clone)]
pub struct Param {
    /// Parameter name (shown in signatures, usage info).
    pub name: String,
    /// Expected value kind.
    pub kind: ValueKind,
    /// Default value, filled when the caller omits trailing arguments.
    pub default: Option<Value>,
}

impl Param {
    /// Required parameter.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Parameter with a default value.
    pub fn with_default(name: impl Into<String>, kind: ValueKind, default: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default),
        }
    }

    fn render(&self) -> String {
        match &self.default {
            Some(d) => format!("{}: {} = {}", self.name, self.kind, d),
            None => format!("{}: {}", self.name, self.kind),
        }
    }
}

/// One overload: a parameter list plus the native thunk it binds to.
#[derive(Clone)]
pub struct Overload<F> {
    /// Parameters, in call order. Defaults may only trail required params.
    pub params: Vec<Param>,
    /// The native entry point.
    pub run: F,
}

impl<F> Overload<F> {
    /// Create an overload from a parameter list and a thunk.
    pub fn new(params: Vec<Param>, run: F) -> Self {
        Self { params, run }
    }

    /// Try to bind positional arguments against this overload.
    ///
    /// Returns the full bound argument vector (defaults filled) on success.
    /// With `widen`, an `Int` argument is accepted for a `Float` parameter —
    /// the second-pass conversion used when no exact overload matched.
    fn bind(&self, args: &[Value], widen: bool) -> Option<Vec<Value>> {
        if args.len() > self.params.len() {
            return None;
        }
        let mut bound = Vec::with_capacity(self.params.len());
        for (i, param) in self.params.iter().enumerate() {
            if i < args.len() {
                let arg = &args[i];
                if arg.kind() == param.kind {
                    bound.push(arg.clone());
                } else if widen && param.kind == ValueKind::Float {
                    match arg {
                        Value::Int(v) => bound.push(Value::Float(*v as f64)),
                        _ => return None,
                    }
                } else {
                    return None;
                }
            } else {
                match &param.default {
                    Some(d) => bound.push(d.clone()),
                    None => return None,
                }
            }
        }
        Some(bound)
    }

    fn render(&self, name: &str) -> String {
        let params: Vec<String> = self.params.iter().map(Param::render).collect();
        format!("{}({})", name, params.join(", "))
    }
}

impl<F> std::fmt::Debug for Overload<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overload")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Pick the overload matching `args`: exact kind match first, then one pass
/// with `Int` -> `Float` widening. Returns the thunk and the bound arguments.
pub(crate) fn select_overload<'a, F>(
    name: &str,
    overloads: &'a [Overload<F>],
    args: &[Value],
) -> Result<(&'a F, Vec<Value>)> {
    for ov in overloads {
        if let Some(bound) = ov.bind(args, false) {
            return Ok((&ov.run, bound));
        }
    }
    for ov in overloads {
        if let Some(bound) = ov.bind(args, true) {
            return Ok((&ov.run, bound));
        }
    }
    Err(Error::NoMatchingOverload {
        name: name.to_string(),
        arity: args.len(),
    })
}

/// A named overload set (a method, or a module-level function).
#[derive(Clone)]
pub struct OverloadSet<F> {
    /// Exposed name.
    pub name: String,
    /// Docstring shown in usage info.
    pub doc: String,
    /// Registered overloads, tried in registration order.
    pub overloads: Vec<Overload<F>>,
}

impl<F> OverloadSet<F> {
    pub fn new(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: doc.into(),
            overloads: Vec::new(),
        }
    }

    pub fn push(&mut self, overload: Overload<F>) {
        self.overloads.push(overload);
    }

    /// Dispatch against this set.
    pub fn select(&self, args: &[Value]) -> Result<(&F, Vec<Value>)> {
        select_overload(&self.name, &self.overloads, args)
    }

    /// Rendered signatures, one per overload (the `help()` analog).
    pub fn signatures(&self) -> Vec<String> {
        self.overloads
            .iter()
            .map(|ov| ov.render(&self.name))
            .collect()
    }
}

impl<F> std::fmt::Debug for OverloadSet<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverloadSet")
            .field("name", &self.name)
            .field("overloads", &self.overloads.len())
            .finish()
    }
}

/// An instance method exposed on a type.
pub type MethodDescriptor = OverloadSet<MethodThunk>;

/// A module-level function.
pub type FunctionDescriptor = OverloadSet<FreeThunk>;

/// A property exposed with a getter and an optional setter.
///
/// A property without a setter is read-only (the `def_readonly` analog);
/// assigning to it fails with [`Error::PropertyReadOnly`].
#[derive(Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub doc: String,
    pub getter: GetterThunk,
    pub setter: Option<SetterThunk>,
}

impl PropertyDescriptor {
    pub fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

/// An enumeration exported in the scope of its enclosing class.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    /// Exposed name (e.g. `Kind`).
    pub name: String,
    /// Identity of the enum type itself. Assigned when the enum is attached
    /// to its enclosing class (`<class>.<name>`).
    pub type_id: TypeId,
    /// Variant names and discriminants, in declaration order.
    pub variants: Vec<(String, i64)>,
    /// Whether variants are also visible directly at class scope.
    pub export_values: bool,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: TypeId::zero(),
            variants: Vec::new(),
            export_values: false,
        }
    }

    /// Add a variant.
    pub fn variant(mut self, name: impl Into<String>, discriminant: i64) -> Self {
        self.variants.push((name.into(), discriminant));
        self
    }

    /// Export variant names into the enclosing class scope.
    pub fn export_values(mut self) -> Self {
        self.export_values = true;
        self
    }

    /// Look up a variant by name.
    pub fn value(&self, variant: &str) -> Option<Value> {
        self.variants
            .iter()
            .find(|(name, _)| name == variant)
            .map(|(_, disc)| Value::Enum(self.type_id, *disc))
    }
}

/// The boundary-side description of one exposed native type.
pub struct TypeDescriptor {
    /// Native type identity (md5-14 of the qualified native type name).
    pub type_id: TypeId,
    /// Qualified native type name the identity was derived from.
    pub native_name: String,
    /// Name the host sees.
    pub exposed_name: String,
    /// Docstring.
    pub doc: String,
    /// Parent descriptor identity, if the type has an exposed base.
    /// Parent links form a forest; the registry rejects links to
    /// unregistered parents, which keeps the graph acyclic by construction.
    pub parent: Option<TypeId>,
    /// Whether the type participates in dynamic (most-derived) resolution.
    ///
    /// The analog of carrying a virtual destructor: without it, an instance
    /// returned behind this static type binds to this descriptor no matter
    /// what its actual runtime type is.
    pub polymorphic: bool,
    /// Constructor overload set.
    pub constructors: Vec<Overload<CtorThunk>>,
    /// Instance methods by exposed name.
    pub methods: HashMap<String, MethodDescriptor>,
    /// Properties by exposed name.
    pub properties: HashMap<String, PropertyDescriptor>,
    /// In-class enumerations.
    pub enums: Vec<EnumDescriptor>,
}

impl TypeDescriptor {
    /// Look up a method declared directly on this type (no ancestor walk —
    /// that happens at dispatch time, against the registry).
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Look up a property declared directly on this type.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    /// Look up an enumeration by exposed name.
    pub fn enumeration(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Value of `<Enum>.<Variant>` in this class's scope.
    pub fn enum_value(&self, enum_name: &str, variant: &str) -> Option<Value> {
        self.enumeration(enum_name).and_then(|e| e.value(variant))
    }

    /// Class-scope attribute lookup: variants of `export_values` enums are
    /// visible directly on the class (`Pet.Dog` as well as `Pet.Kind.Dog`).
    pub fn class_attr(&self, name: &str) -> Option<Value> {
        self.enums
            .iter()
            .filter(|e| e.export_values)
            .find_map(|e| e.value(name))
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("exposed_name", &self.exposed_name)
            .field("type_id", &self.type_id)
            .field("parent", &self.parent)
            .field("polymorphic", &self.polymorphic)
            .field("methods", &self.methods.len())
            .field("properties", &self.properties.len())
            .finish()
    }
}

/// Fluent builder for [`TypeDescriptor`].
///
/// # Example
///
/// ```rust
/// use xbind::{Param, TypeDescriptorBuilder, Value, ValueKind};
///
/// let pet = TypeDescriptorBuilder::new("example.Pet", "Pet")
///     .doc("A pet.")
///     .method(
///         "set",
///         "Set the pet's age",
///         vec![Param::new("age", ValueKind::Int)],
///         |_recv, _args| Ok(Value::Null),
///     )
///     .build();
/// assert_eq!(pet.exposed_name, "Pet");
/// ```
pub struct TypeDescriptorBuilder {
    inner: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    /// Start a descriptor for the given native type, exposed under `exposed_name`.
    pub fn new(native_name: impl Into<String>, exposed_name: impl Into<String>) -> Self {
        let native_name = native_name.into();
        Self {
            inner: TypeDescriptor {
                type_id: TypeId::from_type_name(&native_name),
                native_name,
                exposed_name: exposed_name.into(),
                doc: String::new(),
                parent: None,
                polymorphic: false,
                constructors: Vec::new(),
                methods: HashMap::new(),
                properties: HashMap::new(),
                enums: Vec::new(),
            },
        }
    }

    /// Set the docstring.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.inner.doc = doc.into();
        self
    }

    /// Declare an exposed parent type.
    pub fn parent(mut self, parent: TypeId) -> Self {
        self.inner.parent = Some(parent);
        self
    }

    /// Enable dynamic (most-derived) resolution for instances returned
    /// behind this static type.
    pub fn polymorphic(mut self) -> Self {
        self.inner.polymorphic = true;
        self
    }

    /// Add a constructor overload.
    pub fn constructor<F>(mut self, params: Vec<Param>, ctor: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Box<dyn Exposed>> + Send + Sync + 'static,
    {
        self.inner
            .constructors
            .push(Overload::new(params, Arc::new(ctor) as CtorThunk));
        self
    }

    /// Add a method overload. Repeated calls with the same name accumulate
    /// an overload set; the first non-empty docstring wins.
    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
        params: Vec<Param>,
        thunk: F,
    ) -> Self
    where
        F: Fn(&mut dyn Exposed, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let doc = doc.into();
        let set = self
            .inner
            .methods
            .entry(name.clone())
            .or_insert_with(|| MethodDescriptor::new(name, String::new()));
        if set.doc.is_empty() {
            set.doc = doc;
        }
        set.push(Overload::new(params, Arc::new(thunk) as MethodThunk));
        self
    }

    /// Add a read/write property.
    pub fn property<G, S>(
        mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
        getter: G,
        setter: S,
    ) -> Self
    where
        G: Fn(&dyn Exposed) -> Result<Value> + Send + Sync + 'static,
        S: Fn(&mut dyn Exposed, Value) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        self.inner.properties.insert(
            name.clone(),
            PropertyDescriptor {
                name,
                doc: doc.into(),
                getter: Arc::new(getter),
                setter: Some(Arc::new(setter)),
            },
        );
        self
    }

    /// Add a read-only property.
    pub fn readonly_property<G>(
        mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
        getter: G,
    ) -> Self
    where
        G: Fn(&dyn Exposed) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        self.inner.properties.insert(
            name.clone(),
            PropertyDescriptor {
                name,
                doc: doc.into(),
                getter: Arc::new(getter),
                setter: None,
            },
        );
        self
    }

    /// Attach an in-class enumeration. The enum's own identity is derived
    /// from the enclosing class scope (`<class>.<enum>`).
    pub fn enumeration(mut self, mut desc: EnumDescriptor) -> Self {
        desc.type_id =
            TypeId::from_type_name(&format!("{}.{}", self.inner.exposed_name, desc.name));
        self.inner.enums.push(desc);
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> TypeDescriptor {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_exact_and_defaults() {
        let ov: Overload<()> = Overload::new(
            vec![
                Param::new("i", ValueKind::Int),
                Param::with_default("j", ValueKind::Int, Value::Int(0)),
            ],
            (),
        );

        let bound = ov.bind(&[Value::Int(1), Value::Int(2)], false).unwrap();
        assert_eq!(bound, vec![Value::Int(1), Value::Int(2)]);

        // Omitted trailing argument filled from default.
        let bound = ov.bind(&[Value::Int(1)], false).unwrap();
        assert_eq!(bound, vec![Value::Int(1), Value::Int(0)]);

        // Missing required argument.
        assert!(ov.bind(&[], false).is_none());
        // Too many arguments.
        assert!(ov
            .bind(&[Value::Int(1), Value::Int(2), Value::Int(3)], false)
            .is_none());
    }

    #[test]
    fn test_bind_widening_is_second_pass_only() {
        let ov: Overload<()> = Overload::new(vec![Param::new("x", ValueKind::Float)], ());
        assert!(ov.bind(&[Value::Int(3)], false).is_none());
        let bound = ov.bind(&[Value::Int(3)], true).unwrap();
        assert_eq!(bound, vec![Value::Float(3.0)]);
    }

    #[test]
    fn test_select_overload_prefers_exact() {
        // set(Int) vs set(Str): the tagged argument picks the overload.
        let overloads = vec![
            Overload::new(vec![Param::new("age", ValueKind::Int)], 1u8),
            Overload::new(vec![Param::new("name", ValueKind::Str)], 2u8),
        ];

        let (tag, _) = select_overload("set", &overloads, &[Value::Int(5)]).unwrap();
        assert_eq!(*tag, 1);
        let (tag, _) = select_overload("set", &overloads, &[Value::Str("Rocky".into())]).unwrap();
        assert_eq!(*tag, 2);

        let err = select_overload("set", &overloads, &[Value::Bool(true)]).unwrap_err();
        assert!(matches!(
            err,
            Error::NoMatchingOverload { arity: 1, .. }
        ));
    }

    #[test]
    fn test_signatures_render_defaults() {
        let mut set: OverloadSet<()> = OverloadSet::new("add5", "adds with defaults");
        set.push(Overload::new(
            vec![
                Param::with_default("i", ValueKind::Int, Value::Int(0)),
                Param::with_default("j", ValueKind::Int, Value::Int(0)),
            ],
            (),
        ));
        assert_eq!(set.signatures(), vec!["add5(i: Int = 0, j: Int = 0)"]);
    }

    #[test]
    fn test_enum_descriptor_scoped_identity() {
        let pet = TypeDescriptorBuilder::new("example.Pet", "Pet")
            .enumeration(
                EnumDescriptor::new("Kind")
                    .variant("Dog", 0)
                    .variant("Cat", 1)
                    .export_values(),
            )
            .build();

        let kind = pet.enumeration("Kind").unwrap();
        assert_eq!(kind.type_id, TypeId::from_type_name("Pet.Kind"));
        assert_eq!(
            pet.enum_value("Kind", "Cat"),
            Some(Value::Enum(kind.type_id, 1))
        );
        // export_values: variants visible at class scope too.
        assert_eq!(pet.class_attr("Dog"), Some(Value::Enum(kind.type_id, 0)));
        assert_eq!(pet.class_attr("Pig"), None);
    }
}
