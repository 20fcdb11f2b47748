//! Instantiation strategy selection for aggregate types.
//!
//! ## Priority
//!
//! 1. Delegating creator (constructor or factory)
//! 2. Record definition (structurally transparent, default-plus-binding)
//! 3. Builder: explicit designation, then builder factory, then nested type
//! 4. Tagged creator
//! 5. Default constructor
//! 6. Sole untagged non-default constructor
//!
//! Selection only reads metadata; it never touches the node.

use std::fmt;

use crate::error::{BoxError, MapError, SlotKind};
use crate::metadata::{
    AggregateDef, BuilderConfig, Constructor, CreatorMode, Method, MethodCall, Param, RecordDef,
    TypeRef,
};
use crate::provider::MetadataProvider;
use crate::value::{Args, DynValue};

/// Static factory names recognised as builder factories.
const BUILDER_FACTORY_NAMES: &[&str] = &["builder", "new_builder", "newBuilder"];

/// Public classification of the strategy an aggregate type uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Delegating,
    Builder,
    TaggedCreator,
    SoleImplicitConstructor,
    DefaultPlusBinding,
}

impl StrategyKind {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::Delegating => "delegating",
            StrategyKind::Builder => "builder",
            StrategyKind::TaggedCreator => "tagged_creator",
            StrategyKind::SoleImplicitConstructor => "sole_implicit_constructor",
            StrategyKind::DefaultPlusBinding => "default_plus_binding",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A constructor or static factory acting as a creator.
#[derive(Clone)]
pub(crate) enum Creator {
    Constructor(Constructor),
    Factory(Method),
}

impl Creator {
    pub(crate) fn params(&self) -> &[Param] {
        match self {
            Creator::Constructor(ctor) => &ctor.params,
            Creator::Factory(method) => &method.params,
        }
    }

    pub(crate) fn slot(&self) -> SlotKind {
        match self {
            Creator::Constructor(_) => SlotKind::ConstructorParameter,
            Creator::Factory(_) => SlotKind::FactoryParameter,
        }
    }

    pub(crate) fn invoke(&self, args: &mut Args) -> Result<DynValue, BoxError> {
        match self {
            Creator::Constructor(ctor) => ctor.invoke(args),
            Creator::Factory(method) => invoke_static(method, args),
        }
    }
}

/// How an instance is obtained before its properties are bound.
#[derive(Clone)]
pub(crate) enum Construction {
    ZeroArg(Constructor),
    Record(RecordDef),
}

/// Everything needed to drive a builder for one target type.
#[derive(Clone)]
pub(crate) struct BuilderPlan {
    pub(crate) builder: TypeRef,
    pub(crate) def: AggregateDef,
    /// Static factory on the target producing the builder instance.
    pub(crate) factory: Option<Method>,
    pub(crate) build: Method,
    pub(crate) config: BuilderConfig,
}

#[derive(Clone)]
pub(crate) enum Strategy {
    Delegating(Creator),
    Builder(BuilderPlan),
    TaggedCreator(Creator),
    SoleImplicitConstructor(Constructor),
    DefaultPlusBinding(Construction),
}

impl Strategy {
    pub(crate) fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Delegating(_) => StrategyKind::Delegating,
            Strategy::Builder(_) => StrategyKind::Builder,
            Strategy::TaggedCreator(_) => StrategyKind::TaggedCreator,
            Strategy::SoleImplicitConstructor(_) => StrategyKind::SoleImplicitConstructor,
            Strategy::DefaultPlusBinding(_) => StrategyKind::DefaultPlusBinding,
        }
    }
}

/// Select the instantiation strategy for aggregate `ty`.
pub(crate) fn select(
    provider: &dyn MetadataProvider,
    ty: TypeRef,
    def: &AggregateDef,
) -> Result<Strategy, MapError> {
    if let Some(creator) = delegating_creator(ty, def)? {
        return Ok(Strategy::Delegating(creator));
    }

    if let Some(record) = &def.record {
        return Ok(Strategy::DefaultPlusBinding(Construction::Record(record.clone())));
    }

    if let Some(plan) = discover_builder(provider, ty, def)? {
        return Ok(Strategy::Builder(plan));
    }

    if let Some(creator) = tagged_creator(ty, def)? {
        return Ok(match creator {
            Creator::Constructor(ctor) if ctor.is_default() => {
                Strategy::DefaultPlusBinding(Construction::ZeroArg(ctor))
            }
            creator => Strategy::TaggedCreator(creator),
        });
    }

    if let Some(ctor) = def.constructors.iter().find(|c| c.is_default()) {
        return Ok(Strategy::DefaultPlusBinding(Construction::ZeroArg(ctor.clone())));
    }

    let mut non_default = def.constructors.iter().filter(|c| !c.is_default());
    match (non_default.next(), non_default.next()) {
        (Some(ctor), None) => Ok(Strategy::SoleImplicitConstructor(ctor.clone())),
        _ => Err(MapError::NoSuitableConstructor {
            type_name: ty.name().to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Creators
// ---------------------------------------------------------------------------

/// Static methods on `def` that produce `ty` and carry creator mode `mode`.
fn factories(ty: TypeRef, def: &AggregateDef, mode: CreatorMode) -> Vec<&Method> {
    def.methods
        .iter()
        .filter(|m| m.is_static() && m.returns == Some(ty) && m.creator_mode() == Some(mode))
        .collect()
}

fn delegating_creator(ty: TypeRef, def: &AggregateDef) -> Result<Option<Creator>, MapError> {
    let ctors: Vec<&Constructor> = def
        .constructors
        .iter()
        .filter(|c| c.creator_mode() == Some(CreatorMode::Delegating))
        .collect();
    let factories = factories(ty, def, CreatorMode::Delegating);

    let creator = match (ctors.as_slice(), factories.as_slice()) {
        ([], []) => return Ok(None),
        ([ctor], []) => Creator::Constructor((*ctor).clone()),
        ([], [factory]) => Creator::Factory((*factory).clone()),
        _ => {
            return Err(MapError::AmbiguousCreator {
                type_name: ty.name().to_string(),
                detail: "multiple delegating creators",
            })
        }
    };

    if creator.params().len() != 1 {
        return Err(MapError::InvalidCreator {
            type_name: ty.name().to_string(),
            detail: format!(
                "delegating creator must have exactly one parameter, found {}",
                creator.params().len()
            ),
        });
    }
    Ok(Some(creator))
}

fn tagged_creator(ty: TypeRef, def: &AggregateDef) -> Result<Option<Creator>, MapError> {
    let ctors: Vec<&Constructor> = def
        .constructors
        .iter()
        .filter(|c| c.creator_mode() == Some(CreatorMode::Properties))
        .collect();
    let factories = factories(ty, def, CreatorMode::Properties);

    let ambiguous = |detail: &'static str| MapError::AmbiguousCreator {
        type_name: ty.name().to_string(),
        detail,
    };
    match (ctors.as_slice(), factories.as_slice()) {
        ([], []) => Ok(None),
        ([ctor], []) => Ok(Some(Creator::Constructor((*ctor).clone()))),
        ([], [factory]) => Ok(Some(Creator::Factory((*factory).clone()))),
        (_, [_, _, ..]) => Err(ambiguous("multiple tagged factory methods")),
        ([_, _, ..], _) => Err(ambiguous("multiple tagged constructors")),
        _ => Err(ambiguous("tagged factory method and tagged constructor")),
    }
}

pub(crate) fn invoke_static(method: &Method, args: &mut Args) -> Result<DynValue, BoxError> {
    match method.call() {
        MethodCall::Static(call) => call(args),
        MethodCall::Instance(_) => Err(format!("method '{}' is not static", method.name).into()),
    }
}

// ---------------------------------------------------------------------------
// Builder discovery
// ---------------------------------------------------------------------------

fn discover_builder(
    provider: &dyn MetadataProvider,
    ty: TypeRef,
    def: &AggregateDef,
) -> Result<Option<BuilderPlan>, MapError> {
    // 1. Explicitly designated builder: a missing build method is fatal.
    if let Some(builder) = def.builder {
        let bdef = provider.aggregate_of(builder).unwrap_or_default();
        let config = bdef.builder_config.clone().unwrap_or_default();
        let build = match build_methods(&bdef, &config, ty).as_slice() {
            [build] => (*build).clone(),
            [] => {
                return Err(MapError::MissingBuildMethod {
                    builder: builder.name().to_string(),
                    method: config.build_method_name,
                })
            }
            _ => {
                return Err(MapError::AmbiguousBuilder {
                    type_name: builder.name().to_string(),
                    detail: "multiple build methods",
                })
            }
        };
        let factory = builder_factories(def)
            .into_iter()
            .find(|m| m.returns == Some(builder))
            .cloned();
        tracing::trace!(target_type = ty.name(), builder = builder.name(), "designated builder");
        return Ok(Some(BuilderPlan {
            builder,
            def: bdef,
            factory,
            build,
            config,
        }));
    }

    // 2. Builder factory method on the target.
    let factories = builder_factories(def);
    if factories.len() > 1 {
        return Err(MapError::AmbiguousBuilder {
            type_name: ty.name().to_string(),
            detail: "multiple builder factory methods",
        });
    }
    if let Some(factory) = factories.first() {
        if let Some(builder) = factory.returns {
            if let Some(plan) = conventional_plan(provider, ty, builder, Some((*factory).clone())) {
                tracing::trace!(target_type = ty.name(), builder = builder.name(), "builder factory");
                return Ok(Some(plan));
            }
        }
    }

    // 3. Nested type following the builder naming convention.
    let own_name = format!("{}Builder", ty.short_name());
    let nested: Vec<TypeRef> = def
        .nested
        .iter()
        .copied()
        .filter(|n| n.short_name() == "Builder" || n.short_name() == own_name)
        .collect();
    match nested.as_slice() {
        [] => Ok(None),
        [builder] => {
            let plan = conventional_plan(provider, ty, *builder, None);
            if plan.is_some() {
                tracing::trace!(target_type = ty.name(), builder = builder.name(), "nested builder");
            }
            Ok(plan)
        }
        _ => Err(MapError::AmbiguousBuilder {
            type_name: ty.name().to_string(),
            detail: "multiple nested builder types",
        }),
    }
}

/// A builder found by convention only counts when it has exactly one
/// matching build method.
fn conventional_plan(
    provider: &dyn MetadataProvider,
    ty: TypeRef,
    builder: TypeRef,
    factory: Option<Method>,
) -> Option<BuilderPlan> {
    let bdef = provider.aggregate_of(builder)?;
    let config = bdef.builder_config.clone().unwrap_or_default();
    let build = match build_methods(&bdef, &config, ty).as_slice() {
        [build] => (*build).clone(),
        _ => return None,
    };
    Some(BuilderPlan {
        builder,
        def: bdef,
        factory,
        build,
        config,
    })
}

fn builder_factories(def: &AggregateDef) -> Vec<&Method> {
    def.methods
        .iter()
        .filter(|m| {
            m.is_static()
                && m.params.is_empty()
                && m.returns.is_some()
                && BUILDER_FACTORY_NAMES.contains(&m.name.as_str())
        })
        .collect()
}

fn build_methods<'d>(bdef: &'d AggregateDef, config: &BuilderConfig, ty: TypeRef) -> Vec<&'d Method> {
    bdef.methods
        .iter()
        .filter(|m| {
            !m.is_static()
                && m.params.is_empty()
                && m.name == config.build_method_name
                && m.returns == Some(ty)
        })
        .collect()
}
