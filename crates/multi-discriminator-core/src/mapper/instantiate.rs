//! Executing the selected instantiation strategy.

use serde_json::Value;

use super::binder::{
    collect_builder_bindings, collect_property_bindings, param_names, Consumed, PropertyNames,
    SlotSpec,
};
use super::collections::mismatch;
use super::strategy::{self, invoke_static, BuilderPlan, Construction, Creator, Strategy};
use super::Walker;
use crate::error::{BoxError, MapError, SlotKind};
use crate::metadata::{AggregateDef, MethodCall, RecordDef, TypeRef};
use crate::node::display_path;
use crate::value::{Args, DynValue};

/// Errors raised by descriptor callbacks: mapping errors pass through, any
/// other failure is wrapped with the identity of the type being built.
pub(super) fn lift_error(ty: TypeRef, err: BoxError) -> MapError {
    match err.downcast::<MapError>() {
        Ok(err) => *err,
        Err(source) => MapError::instantiation(ty.name(), source),
    }
}

impl Walker<'_> {
    pub(super) fn map_aggregate(
        &self,
        node: &Value,
        ty: TypeRef,
        def: &AggregateDef,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let strategy = strategy::select(self.provider, ty, def)?;
        tracing::debug!(
            path = %display_path(path),
            target = ty.name(),
            strategy = %strategy.kind(),
            "selected instantiation strategy"
        );

        if !matches!(strategy, Strategy::Delegating(_)) && !node.is_object() {
            return Err(mismatch(ty, "object", node, path));
        }

        match strategy {
            Strategy::Delegating(creator) => self.delegate(node, ty, &creator, path, depth),
            Strategy::Builder(plan) => self.build(node, ty, def, &plan, path, depth),
            Strategy::TaggedCreator(creator) => self.create(node, ty, def, &creator, path, depth),
            Strategy::SoleImplicitConstructor(ctor) => {
                self.create(node, ty, def, &Creator::Constructor(ctor), path, depth)
            }
            Strategy::DefaultPlusBinding(Construction::ZeroArg(ctor)) => {
                let mut instance = ctor
                    .invoke(&mut Args::empty())
                    .map_err(|err| lift_error(ty, err))?;
                let bindings = collect_property_bindings(ty, def);
                let mut consumed = Consumed::new();
                self.apply_bindings(&mut instance, node, &bindings, ty, path, depth, &mut consumed)?;
                Ok(instance)
            }
            Strategy::DefaultPlusBinding(Construction::Record(record)) => {
                self.construct_record(node, ty, &record, path, depth)
            }
        }
    }

    /// Map the whole node onto the single parameter and hand it over.
    fn delegate(
        &self,
        node: &Value,
        ty: TypeRef,
        creator: &Creator,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let param = creator
            .params()
            .first()
            .ok_or_else(|| MapError::InvalidCreator {
                type_name: ty.name().to_string(),
                detail: "delegating creator has no parameter".to_string(),
            })?;

        let value = self.map_node(node, param.ty, path, depth + 1)?;
        if value.is_absent() {
            let member = param.name.clone().unwrap_or_default();
            let spec = SlotSpec::param(
                PropertyNames::new(member.clone(), &param.hints.aliases),
                param,
                SlotKind::DelegatingParameter,
            );
            if !self.slot_is_nullable(&spec, &self.provider.shape_of(param.ty)) {
                return Err(MapError::NullValue {
                    path: display_path(path),
                    owner: ty.name().to_string(),
                    member,
                    slot: SlotKind::DelegatingParameter,
                });
            }
        }
        creator
            .invoke(&mut Args::new(vec![value]))
            .map_err(|err| lift_error(ty, err))
    }

    /// Bind creator parameters, construct, then apply the remaining keys
    /// through the type's mutable members.
    fn create(
        &self,
        node: &Value,
        ty: TypeRef,
        def: &AggregateDef,
        creator: &Creator,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let mut consumed = Consumed::new();
        let mut args = Vec::with_capacity(creator.params().len());
        for (index, param) in creator.params().iter().enumerate() {
            let spec = SlotSpec::param(param_names(ty, index, param)?, param, creator.slot());
            args.push(self.bind_slot(node, &spec, ty, path, depth, &mut consumed)?);
        }

        let mut instance = creator
            .invoke(&mut Args::new(args))
            .map_err(|err| lift_error(ty, err))?;
        if instance.is_absent() {
            return Err(MapError::instantiation(ty.name(), "creator returned no value".into()));
        }

        let bindings = collect_property_bindings(ty, def);
        self.apply_bindings(&mut instance, node, &bindings, ty, path, depth, &mut consumed)?;
        Ok(instance)
    }

    fn construct_record(
        &self,
        node: &Value,
        ty: TypeRef,
        record: &RecordDef,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let mut consumed = Consumed::new();
        let args = record
            .components
            .iter()
            .map(|component| {
                let spec = SlotSpec::component(component);
                self.bind_slot(node, &spec, ty, path, depth, &mut consumed)
            })
            .collect::<Result<Vec<_>, MapError>>()?;
        record
            .construct(&mut Args::new(args))
            .map_err(|err| lift_error(ty, err))
    }

    /// Builder setters first, then the build step, then whatever the builder
    /// left unconsumed goes to the built value's own mutable members.
    fn build(
        &self,
        node: &Value,
        ty: TypeRef,
        def: &AggregateDef,
        plan: &BuilderPlan,
        path: &str,
        depth: usize,
    ) -> Result<DynValue, MapError> {
        let mut builder = self.builder_instance(ty, plan)?;

        let mut consumed = Consumed::new();
        let builder_bindings = collect_builder_bindings(
            &plan.def,
            &plan.config.with_prefix,
            &plan.build.name,
        );
        self.apply_bindings(
            &mut builder,
            node,
            &builder_bindings,
            plan.builder,
            path,
            depth,
            &mut consumed,
        )?;

        let MethodCall::Instance(build) = plan.build.call() else {
            return Err(MapError::MissingBuildMethod {
                builder: plan.builder.name().to_string(),
                method: plan.build.name.clone(),
            });
        };
        let mut instance = build(&mut builder, &mut Args::empty()).map_err(|err| lift_error(ty, err))?;
        if instance.is_absent() {
            return Err(MapError::instantiation(ty.name(), "build method returned no value".into()));
        }

        let bindings = collect_property_bindings(ty, def);
        self.apply_bindings(&mut instance, node, &bindings, ty, path, depth, &mut consumed)?;
        Ok(instance)
    }

    fn builder_instance(&self, ty: TypeRef, plan: &BuilderPlan) -> Result<DynValue, MapError> {
        let builder = match &plan.factory {
            Some(factory) => {
                invoke_static(factory, &mut Args::empty()).map_err(|err| lift_error(ty, err))?
            }
            None => {
                let ctor = plan
                    .def
                    .constructors
                    .iter()
                    .find(|c| c.is_default())
                    .ok_or_else(|| MapError::NoSuitableConstructor {
                        type_name: plan.builder.name().to_string(),
                    })?;
                ctor.invoke(&mut Args::empty())
                    .map_err(|err| lift_error(plan.builder, err))?
            }
        };
        if builder.is_absent() {
            return Err(MapError::instantiation(
                ty.name(),
                "builder factory returned no value".into(),
            ));
        }
        Ok(builder)
    }
}
