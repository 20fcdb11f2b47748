//! Property binding: member discovery, name resolution and nullability.
//!
//! A binding ties a set of candidate node keys to one slot (setter, field,
//! creator parameter, record component or builder setter). Each node key is
//! consumed by at most one binding per mapping call.

use std::collections::HashSet;

use serde_json::Value;

use super::Walker;
use crate::error::{BoxError, MapError, SlotKind};
use crate::metadata::{
    AggregateDef, Component, FieldFn, InstanceFn, Method, MethodCall, Nullability, Param, Shape,
    TypeRef,
};
use crate::node::{build_path, display_path};
use crate::value::{Args, DynValue};

/// Keys already claimed by a binding during one aggregate mapping.
pub(crate) type Consumed = HashSet<String>;

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Primary node key plus aliases, tried in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PropertyNames {
    pub(crate) primary: String,
    pub(crate) aliases: Vec<String>,
}

impl PropertyNames {
    /// Aliases are deduplicated; empty ones and the primary are dropped.
    pub(crate) fn new<'a>(
        primary: impl Into<String>,
        aliases: impl IntoIterator<Item = &'a String>,
    ) -> Self {
        let primary = primary.into();
        let mut unique: Vec<String> = Vec::new();
        for alias in aliases {
            if !alias.is_empty() && *alias != primary && !unique.contains(alias) {
                unique.push(alias.clone());
            }
        }
        Self {
            primary,
            aliases: unique,
        }
    }

    pub(crate) fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// First candidate present in `node` and not yet consumed. Claims the key.
pub(crate) fn find_property_node<'n>(
    node: &'n Value,
    names: &PropertyNames,
    consumed: &mut Consumed,
) -> Option<(&'n str, &'n Value)> {
    let obj = node.as_object()?;
    for candidate in names.candidates() {
        if consumed.contains(candidate) {
            continue;
        }
        if let Some((key, value)) = obj.get_key_value(candidate) {
            consumed.insert(key.clone());
            return Some((key.as_str(), value));
        }
    }
    None
}

/// Lowercase the first character unless the name starts with two capitals
/// (`URL` stays `URL`, `Color` becomes `color`).
pub(crate) fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (None, _) => String::new(),
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => first.to_lowercase().chain(name.chars().skip(1)).collect(),
    }
}

/// `set_color`/`setColor` → `color`. A bare prefix (`set`, `settle`) is not
/// a setter name.
fn strip_accessor_prefix(name: &str, prefix: &str) -> Option<String> {
    let rest = name.strip_prefix(prefix)?;
    if let Some(snake) = rest.strip_prefix('_') {
        return (!snake.is_empty()).then(|| snake.to_string());
    }
    rest.chars()
        .next()
        .filter(|c| c.is_uppercase())
        .map(|_| decapitalize(rest))
}

/// Property name implied by an aggregate method, or `""`.
pub(crate) fn setter_property_name(method: &Method, owner: TypeRef) -> String {
    for prefix in ["set", "with"] {
        if let Some(name) = strip_accessor_prefix(&method.name, prefix) {
            return name;
        }
    }
    // Fluent setters keep their own name.
    if method.returns == Some(owner) {
        return method.name.clone();
    }
    String::new()
}

/// Property name implied by a builder method under `prefix`, or `""`.
pub(crate) fn builder_property_name(method: &Method, prefix: &str) -> String {
    if prefix.is_empty() {
        return method.name.clone();
    }
    match method.name.strip_prefix(prefix) {
        Some(rest) => decapitalize(rest.strip_prefix('_').unwrap_or(rest)),
        None => String::new(),
    }
}

/// Method rename, then parameter rename, then `fallback`.
fn method_names(method: &Method, fallback: String) -> Option<PropertyNames> {
    let param = method.params.first()?;
    let primary = method
        .hints
        .explicit_name()
        .or_else(|| param.hints.explicit_name())
        .map(str::to_string)
        .unwrap_or(fallback);
    if primary.is_empty() {
        return None;
    }
    Some(PropertyNames::new(
        primary,
        method.hints.aliases.iter().chain(&param.hints.aliases),
    ))
}

pub(crate) fn param_names(
    owner: TypeRef,
    index: usize,
    param: &Param,
) -> Result<PropertyNames, MapError> {
    let primary = param
        .hints
        .explicit_name()
        .or_else(|| param.name.as_deref().filter(|n| !n.is_empty()))
        .ok_or_else(|| MapError::MissingParameterName {
            type_name: owner.name().to_string(),
            index,
        })?;
    Ok(PropertyNames::new(primary, &param.hints.aliases))
}

/// First explicit rename in component, accessor, storage order.
pub(crate) fn component_names(component: &Component) -> PropertyNames {
    let sources = [&component.hints, &component.accessor, &component.storage];
    let primary = sources
        .into_iter()
        .find_map(|hints| hints.explicit_name())
        .unwrap_or(&component.name)
        .to_string();
    PropertyNames::new(primary, sources.into_iter().flat_map(|hints| hints.aliases.iter()))
}

// ---------------------------------------------------------------------------
// Slots and bindings
// ---------------------------------------------------------------------------

/// Everything the binder needs to fill one slot.
#[derive(Debug, Clone)]
pub(crate) struct SlotSpec {
    pub(crate) names: PropertyNames,
    pub(crate) ty: TypeRef,
    /// Declared nullability, already merged across sources.
    pub(crate) nullability: Nullability,
    pub(crate) required: bool,
    pub(crate) kind: SlotKind,
}

impl SlotSpec {
    pub(crate) fn param(names: PropertyNames, param: &Param, kind: SlotKind) -> Self {
        Self {
            names,
            ty: param.ty,
            nullability: param.hints.nullability,
            required: param.hints.required,
            kind,
        }
    }

    /// Nullability merges all three sources; `required` comes from the
    /// component alone.
    pub(crate) fn component(component: &Component) -> Self {
        Self {
            names: component_names(component),
            ty: component.ty,
            nullability: component
                .hints
                .nullability
                .merge(component.accessor.nullability)
                .merge(component.storage.nullability),
            required: component.hints.required,
            kind: SlotKind::RecordComponent,
        }
    }
}

#[derive(Clone)]
enum Apply {
    Method(InstanceFn),
    Field(FieldFn),
}

/// A mutable member (setter, fluent setter, field) bound to node keys.
#[derive(Clone)]
pub(crate) struct PropertyBinding {
    pub(crate) slot: SlotSpec,
    apply: Apply,
}

impl PropertyBinding {
    fn from_method(method: &Method, names: PropertyNames, kind: SlotKind) -> Option<Self> {
        let MethodCall::Instance(call) = method.call() else {
            return None;
        };
        let param = method.params.first()?;
        Some(Self {
            slot: SlotSpec {
                names,
                ty: param.ty,
                nullability: method.hints.nullability.merge(param.hints.nullability),
                required: method.hints.required || param.hints.required,
                kind,
            },
            apply: Apply::Method(call.clone()),
        })
    }

    fn apply(&self, target: &mut DynValue, value: DynValue) -> Result<(), BoxError> {
        match &self.apply {
            Apply::Method(call) => call(target, &mut Args::new(vec![value])).map(drop),
            Apply::Field(assign) => assign(target, value),
        }
    }
}

fn insert_binding(bindings: &mut Vec<PropertyBinding>, binding: PropertyBinding) {
    if !bindings
        .iter()
        .any(|b| b.slot.names.primary == binding.slot.names.primary)
    {
        bindings.push(binding);
    }
}

/// Setters first, then fields not already covered by a setter. The first
/// binding for a primary name wins.
pub(crate) fn collect_property_bindings(owner: TypeRef, def: &AggregateDef) -> Vec<PropertyBinding> {
    let mut bindings = Vec::new();
    let mut setter_targets: HashSet<String> = HashSet::new();

    for method in &def.methods {
        if method.is_static() || method.hints.ignored {
            continue;
        }
        let fallback = setter_property_name(method, owner);
        if !fallback.is_empty() {
            setter_targets.insert(fallback.clone());
        }
        if method.params.len() != 1 {
            continue;
        }
        let binding = method_names(method, fallback)
            .and_then(|names| PropertyBinding::from_method(method, names, SlotKind::Property));
        if let Some(binding) = binding {
            insert_binding(&mut bindings, binding);
        }
    }

    for field in &def.fields {
        if field.is_static || field.hints.ignored || setter_targets.contains(&field.name) {
            continue;
        }
        let Some(assign) = field.assigner() else {
            continue;
        };
        let primary = field.hints.explicit_name().unwrap_or(&field.name);
        let binding = PropertyBinding {
            slot: SlotSpec {
                names: PropertyNames::new(primary, &field.hints.aliases),
                ty: field.ty,
                nullability: field.hints.nullability,
                required: field.hints.required,
                kind: SlotKind::Property,
            },
            apply: Apply::Field(assign.clone()),
        };
        insert_binding(&mut bindings, binding);
    }

    bindings
}

/// Single-argument builder methods other than the build method.
pub(crate) fn collect_builder_bindings(
    builder: &AggregateDef,
    prefix: &str,
    build_method: &str,
) -> Vec<PropertyBinding> {
    let mut bindings = Vec::new();
    for method in &builder.methods {
        if method.is_static()
            || method.hints.ignored
            || method.params.len() != 1
            || method.name == build_method
        {
            continue;
        }
        let fallback = builder_property_name(method, prefix);
        let binding = method_names(method, fallback).and_then(|names| {
            PropertyBinding::from_method(method, names, SlotKind::BuilderProperty)
        });
        if let Some(binding) = binding {
            insert_binding(&mut bindings, binding);
        }
    }
    bindings
}

// ---------------------------------------------------------------------------
// Binding values
// ---------------------------------------------------------------------------

/// Failures inside a setter or field assignment name the member. Mapping
/// errors that already point at a node pass through unchanged.
fn binding_error(owner: TypeRef, binding: &PropertyBinding, path: &str, err: BoxError) -> MapError {
    let source: BoxError = match err.downcast::<MapError>() {
        Ok(err) if err.path().is_some() => return *err,
        Ok(err) => err,
        Err(source) => source,
    };
    MapError::Binding {
        path: build_path(path, &binding.slot.names.primary),
        owner: owner.name().to_string(),
        member: binding.slot.names.primary.clone(),
        slot: binding.slot.kind,
        source,
    }
}

impl Walker<'_> {
    /// Whether `spec` may hold absence. `required` overrides every
    /// nullability source; `Option` storage is itself a nullable source.
    pub(crate) fn slot_is_nullable(&self, spec: &SlotSpec, shape: &Shape) -> bool {
        if spec.required {
            return false;
        }
        let declared = match shape {
            Shape::Optional(_) => spec.nullability.merge(Nullability::Nullable),
            _ => spec.nullability,
        };
        match declared {
            Nullability::Nullable => true,
            Nullability::NonNull => false,
            Nullability::Unspecified => self.options.treats_unspecified_as_nullable(),
        }
    }

    /// Resolve the value for one slot from the object `node`.
    ///
    /// Missing and explicit null follow the same policy: primitive slots
    /// always fail, nullable slots receive the representation of absence,
    /// anything else fails.
    pub(crate) fn bind_slot(
        &self,
        node: &Value,
        spec: &SlotSpec,
        owner: TypeRef,
        path: &str,
        depth: usize,
        consumed: &mut Consumed,
    ) -> Result<DynValue, MapError> {
        let shape = self.provider.shape_of(spec.ty);
        let nullable = self.slot_is_nullable(spec, &shape);
        let value_error = |child_path: &str, missing: bool| {
            let (path, owner, member, slot) = (
                display_path(child_path),
                owner.name().to_string(),
                spec.names.primary.clone(),
                spec.kind,
            );
            if shape.is_primitive() {
                MapError::MissingPrimitive {
                    path,
                    type_name: spec.ty.name().to_string(),
                }
            } else if missing {
                MapError::MissingValue {
                    path,
                    owner,
                    member,
                    slot,
                }
            } else {
                MapError::NullValue {
                    path,
                    owner,
                    member,
                    slot,
                }
            }
        };

        let Some((key, child)) = find_property_node(node, &spec.names, consumed) else {
            let child_path = build_path(path, &spec.names.primary);
            if nullable && !shape.is_primitive() {
                tracing::trace!(path = %display_path(&child_path), "missing nullable slot");
                return self.absence(&shape, spec.ty, &child_path);
            }
            return Err(value_error(&child_path, true));
        };

        let child_path = build_path(path, key);
        if child.is_null() {
            if nullable && !shape.is_primitive() {
                return self.absence(&shape, spec.ty, &child_path);
            }
            return Err(value_error(&child_path, false));
        }

        let value = self.map_node(child, spec.ty, &child_path, depth + 1)?;
        if value.is_absent() && !nullable {
            return Err(value_error(&child_path, false));
        }
        Ok(value)
    }

    /// Apply `bindings` to `target`. Absent values leave the member at the
    /// value the target was constructed with.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn apply_bindings(
        &self,
        target: &mut DynValue,
        node: &Value,
        bindings: &[PropertyBinding],
        owner: TypeRef,
        path: &str,
        depth: usize,
        consumed: &mut Consumed,
    ) -> Result<(), MapError> {
        for binding in bindings {
            let value = self.bind_slot(node, &binding.slot, owner, path, depth, consumed)?;
            if value.is_absent() {
                continue;
            }
            tracing::trace!(
                path = %display_path(path),
                owner = owner.name(),
                member = %binding.slot.names.primary,
                slot = %binding.slot.kind,
                "binding property"
            );
            binding
                .apply(target, value)
                .map_err(|err| binding_error(owner, binding, path, err))?;
        }
        Ok(())
    }
}
