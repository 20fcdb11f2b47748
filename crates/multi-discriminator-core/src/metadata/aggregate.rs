//! Aggregate descriptors: constructors, methods, fields, records, builders.

use std::any::Any;
use std::sync::Arc;

use super::{Reflect, TypeRef};
use crate::error::BoxError;
use crate::value::{Args, DynValue};

pub type CallFn = Arc<dyn Fn(&mut Args) -> Result<DynValue, BoxError> + Send + Sync>;
pub type InstanceFn =
    Arc<dyn Fn(&mut DynValue, &mut Args) -> Result<DynValue, BoxError> + Send + Sync>;
pub type FieldFn = Arc<dyn Fn(&mut DynValue, DynValue) -> Result<(), BoxError> + Send + Sync>;

// ---------------------------------------------------------------------------
// Hints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nullability {
    Nullable,
    NonNull,
    #[default]
    Unspecified,
}

impl Nullability {
    /// Nullable from any source wins, then NonNull, else Unspecified.
    pub fn merge(self, other: Nullability) -> Nullability {
        match (self, other) {
            (Nullability::Nullable, _) | (_, Nullability::Nullable) => Nullability::Nullable,
            (Nullability::NonNull, _) | (_, Nullability::NonNull) => Nullability::NonNull,
            _ => Nullability::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatorMode {
    /// Parameters are bound to node properties.
    Properties,
    /// The single parameter receives the whole node.
    Delegating,
}

/// Declarative hints attached to a member, parameter, accessor or storage
/// slot.
#[derive(Debug, Clone, Default)]
pub struct MemberHints {
    pub rename: Option<String>,
    pub aliases: Vec<String>,
    pub nullability: Nullability,
    pub required: bool,
    pub ignored: bool,
    pub creator: Option<CreatorMode>,
}

impl MemberHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullability = Nullability::Nullable;
        self
    }

    pub fn non_null(mut self) -> Self {
        self.nullability = Nullability::NonNull;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn creator(mut self, mode: CreatorMode) -> Self {
        self.creator = Some(mode);
        self
    }

    /// The explicit rename, when it is non-empty.
    pub(crate) fn explicit_name(&self) -> Option<&str> {
        self.rename.as_deref().filter(|name| !name.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Parameters and constructors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Param {
    /// Preserved source name, if any.
    pub name: Option<String>,
    pub ty: TypeRef,
    pub hints: MemberHints,
}

impl Param {
    pub fn named<T: Reflect>(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ty: TypeRef::of::<T>(),
            hints: MemberHints::default(),
        }
    }

    pub fn unnamed<T: Reflect>() -> Self {
        Self {
            name: None,
            ty: TypeRef::of::<T>(),
            hints: MemberHints::default(),
        }
    }

    pub fn hints(mut self, hints: MemberHints) -> Self {
        self.hints = hints;
        self
    }
}

#[derive(Clone)]
pub struct Constructor {
    pub params: Vec<Param>,
    pub hints: MemberHints,
    call: CallFn,
}

impl Constructor {
    pub fn new<T, F>(params: Vec<Param>, call: F) -> Self
    where
        T: Any,
        F: Fn(&mut Args) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            params,
            hints: MemberHints::default(),
            call: Arc::new(move |args: &mut Args| -> Result<DynValue, BoxError> {
                Ok(DynValue::new(call(args)?))
            }),
        }
    }

    /// Zero-argument constructor producing `T::default()`.
    pub fn default_of<T: Any + Default>() -> Self {
        Self::new(Vec::new(), |_| Ok(T::default()))
    }

    pub fn hints(mut self, hints: MemberHints) -> Self {
        self.hints = hints;
        self
    }

    /// Mark as the designated property-based creator.
    pub fn tagged(mut self) -> Self {
        self.hints.creator = Some(CreatorMode::Properties);
        self
    }

    pub fn delegating(mut self) -> Self {
        self.hints.creator = Some(CreatorMode::Delegating);
        self
    }

    pub fn is_default(&self) -> bool {
        self.params.is_empty()
    }

    pub fn creator_mode(&self) -> Option<CreatorMode> {
        self.hints.creator
    }

    pub fn invoke(&self, args: &mut Args) -> Result<DynValue, BoxError> {
        (self.call)(args)
    }
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum MethodCall {
    Static(CallFn),
    /// Invoked on a receiver, which it may mutate or consume.
    Instance(InstanceFn),
}

#[derive(Clone)]
pub struct Method {
    pub name: String,
    pub params: Vec<Param>,
    /// Declared return type; `None` for methods returning nothing.
    pub returns: Option<TypeRef>,
    pub hints: MemberHints,
    call: MethodCall,
}

impl Method {
    /// Static method returning a `T`, such as a creator factory or a
    /// builder factory.
    pub fn factory<T, F>(name: impl Into<String>, params: Vec<Param>, call: F) -> Self
    where
        T: Reflect,
        F: Fn(&mut Args) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params,
            returns: Some(TypeRef::of::<T>()),
            hints: MemberHints::default(),
            call: MethodCall::Static(Arc::new(
                move |args: &mut Args| -> Result<DynValue, BoxError> {
                    Ok(DynValue::new(call(args)?))
                },
            )),
        }
    }

    /// Single-argument method mutating its receiver in place.
    pub fn setter<O, V, F>(name: impl Into<String>, call: F) -> Self
    where
        O: Any,
        V: Reflect,
        F: Fn(&mut O, V) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: vec![Param::unnamed::<V>()],
            returns: None,
            hints: MemberHints::default(),
            call: MethodCall::Instance(Arc::new(
                move |receiver: &mut DynValue, args: &mut Args| -> Result<DynValue, BoxError> {
                    let value = args.take::<V>()?;
                    call(receiver.downcast_mut::<O>()?, value);
                    Ok(DynValue::absent())
                },
            )),
        }
    }

    /// Single-argument method consuming its receiver and returning it.
    pub fn fluent<O, V, F>(name: impl Into<String>, call: F) -> Self
    where
        O: Reflect,
        V: Reflect,
        F: Fn(O, V) -> O + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: vec![Param::unnamed::<V>()],
            returns: Some(TypeRef::of::<O>()),
            hints: MemberHints::default(),
            call: MethodCall::Instance(Arc::new(
                move |receiver: &mut DynValue, args: &mut Args| -> Result<DynValue, BoxError> {
                    let value = args.take::<V>()?;
                    receiver.replace_with(|owner: O| Ok(call(owner, value)))?;
                    Ok(DynValue::absent())
                },
            )),
        }
    }

    /// Zero-argument method consuming a builder `B` to produce a `T`.
    pub fn build<B, T, F>(name: impl Into<String>, call: F) -> Self
    where
        B: Any,
        T: Reflect,
        F: Fn(B) -> T + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: Some(TypeRef::of::<T>()),
            hints: MemberHints::default(),
            call: MethodCall::Instance(Arc::new(
                move |receiver: &mut DynValue, _: &mut Args| -> Result<DynValue, BoxError> {
                    let builder = std::mem::replace(receiver, DynValue::absent()).take::<B>()?;
                    Ok(DynValue::new(call(builder)))
                },
            )),
        }
    }

    /// Override the declared return type.
    pub fn returning<R: Reflect>(mut self) -> Self {
        self.returns = Some(TypeRef::of::<R>());
        self
    }

    pub fn hints(mut self, hints: MemberHints) -> Self {
        self.hints = hints;
        self
    }

    /// Hints on the first parameter.
    pub fn param_hints(mut self, hints: MemberHints) -> Self {
        if let Some(param) = self.params.first_mut() {
            param.hints = hints;
        }
        self
    }

    pub fn tagged(mut self) -> Self {
        self.hints.creator = Some(CreatorMode::Properties);
        self
    }

    pub fn delegating(mut self) -> Self {
        self.hints.creator = Some(CreatorMode::Delegating);
        self
    }

    pub fn is_static(&self) -> bool {
        matches!(self.call, MethodCall::Static(_))
    }

    pub fn creator_mode(&self) -> Option<CreatorMode> {
        self.hints.creator
    }

    pub fn call(&self) -> &MethodCall {
        &self.call
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
    pub hints: MemberHints,
    /// `None` for immutable fields.
    assign: Option<FieldFn>,
}

impl Field {
    pub fn new<O, V, F>(name: impl Into<String>, assign: F) -> Self
    where
        O: Any,
        V: Reflect,
        F: Fn(&mut O, V) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ty: TypeRef::of::<V>(),
            is_static: false,
            hints: MemberHints::default(),
            assign: Some(Arc::new(
                move |target: &mut DynValue, value: DynValue| -> Result<(), BoxError> {
                    assign(target.downcast_mut::<O>()?, value.take::<V>()?);
                    Ok(())
                },
            )),
        }
    }

    /// A field that can only be set at construction.
    pub fn immutable<V: Reflect>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeRef::of::<V>(),
            is_static: false,
            hints: MemberHints::default(),
            assign: None,
        }
    }

    /// A type-level constant, never bound.
    pub fn constant<V: Reflect>(name: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::immutable::<V>(name)
        }
    }

    pub fn hints(mut self, hints: MemberHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn is_final(&self) -> bool {
        self.assign.is_none()
    }

    pub(crate) fn assigner(&self) -> Option<&FieldFn> {
        self.assign.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One component of a record-like aggregate.
///
/// Hints come from three sources: the component itself, its accessor and its
/// backing storage.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub ty: TypeRef,
    pub hints: MemberHints,
    pub accessor: MemberHints,
    pub storage: MemberHints,
}

impl Component {
    pub fn new<T: Reflect>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeRef::of::<T>(),
            hints: MemberHints::default(),
            accessor: MemberHints::default(),
            storage: MemberHints::default(),
        }
    }

    pub fn hints(mut self, hints: MemberHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn accessor(mut self, hints: MemberHints) -> Self {
        self.accessor = hints;
        self
    }

    pub fn storage(mut self, hints: MemberHints) -> Self {
        self.storage = hints;
        self
    }
}

/// Fixed, ordered, named components and the canonical constructor taking
/// them positionally.
#[derive(Clone)]
pub struct RecordDef {
    pub components: Vec<Component>,
    construct: CallFn,
}

impl RecordDef {
    pub fn new<T, F>(components: Vec<Component>, construct: F) -> Self
    where
        T: Any,
        F: Fn(&mut Args) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            components,
            construct: Arc::new(move |args: &mut Args| -> Result<DynValue, BoxError> {
                Ok(DynValue::new(construct(args)?))
            }),
        }
    }

    pub fn construct(&self, args: &mut Args) -> Result<DynValue, BoxError> {
        (self.construct)(args)
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Build-method name and setter prefix of a builder type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    pub build_method_name: String,
    /// Empty means setter names are used verbatim.
    pub with_prefix: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            build_method_name: "build".to_string(),
            with_prefix: "with".to_string(),
        }
    }
}

impl BuilderConfig {
    pub fn new(build_method_name: impl Into<String>, with_prefix: impl Into<String>) -> Self {
        let build_method_name = build_method_name.into();
        Self {
            build_method_name: if build_method_name.is_empty() {
                "build".to_string()
            } else {
                build_method_name
            },
            with_prefix: with_prefix.into(),
        }
    }
}

#[derive(Clone, Default)]
pub struct AggregateDef {
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
    pub fields: Vec<Field>,
    /// Explicitly designated builder type.
    pub builder: Option<TypeRef>,
    /// Types declared inside this one, inspected for builder naming
    /// conventions.
    pub nested: Vec<TypeRef>,
    pub record: Option<RecordDef>,
    /// Settings that apply when this type is itself used as a builder.
    pub builder_config: Option<BuilderConfig>,
}

impl AggregateDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(record: RecordDef) -> Self {
        Self {
            record: Some(record),
            ..Self::default()
        }
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn builder<B: Reflect>(mut self) -> Self {
        self.builder = Some(TypeRef::of::<B>());
        self
    }

    pub fn nested<N: Reflect>(mut self) -> Self {
        self.nested.push(TypeRef::of::<N>());
        self
    }

    pub fn builder_config(mut self, config: BuilderConfig) -> Self {
        self.builder_config = Some(config);
        self
    }
}
