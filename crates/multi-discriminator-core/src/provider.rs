//! Metadata provider: the mapper's only view of target types.

use std::any::TypeId;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::metadata::{
    AggregateDef, DiscriminatorConfig, Reflect, Shape, Subtype, TypeInfo, TypeRef,
};

/// Answers structural questions about target types.
///
/// Every lookup must be a pure function of the type: the mapper may ask the
/// same question many times during one call and expects the same answer.
pub trait MetadataProvider: Send + Sync {
    /// Full description of a type.
    fn describe(&self, ty: TypeRef) -> TypeInfo {
        ty.describe()
    }

    /// Subtypes registered against `base` outside the type's own description.
    fn registered_subtypes(&self, base: TypeRef) -> Vec<Subtype>;

    fn shape_of(&self, ty: TypeRef) -> Shape {
        self.describe(ty).shape
    }

    fn discriminator_config_of(&self, ty: TypeRef) -> Option<DiscriminatorConfig> {
        self.describe(ty).discriminator
    }

    /// Members, creators and builder declarations of an aggregate type.
    fn aggregate_of(&self, ty: TypeRef) -> Option<AggregateDef> {
        match self.shape_of(ty) {
            Shape::Aggregate(def) => Some(def),
            _ => None,
        }
    }

    /// Discriminator name → subtype, first match wins.
    ///
    /// Precedence: explicit name and aliases declared with each subtype, the
    /// subtype's self-declared name, then subtypes registered on the provider.
    /// The short type name is used only when a declared subtype has no name
    /// anywhere.
    fn subtype_table_of(&self, ty: TypeRef) -> IndexMap<String, Subtype> {
        let mut table = IndexMap::new();

        for subtype in self.describe(ty).subtypes {
            let explicit = subtype.name.clone().filter(|n| !n.is_empty());
            let declared = self
                .describe(subtype.ty)
                .type_name
                .filter(|n| !n.is_empty());

            if let Some(name) = &explicit {
                add_candidate(&mut table, name, &subtype);
            }
            for alias in &subtype.aliases {
                add_candidate(&mut table, alias, &subtype);
            }
            if let Some(name) = &declared {
                add_candidate(&mut table, name, &subtype);
            }
            if explicit.is_none() && declared.is_none() {
                add_candidate(&mut table, subtype.ty.short_name(), &subtype);
            }
        }

        for subtype in self.registered_subtypes(ty) {
            let name = subtype
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| self.describe(subtype.ty).type_name.filter(|n| !n.is_empty()))
                .unwrap_or_else(|| subtype.ty.short_name().to_string());
            add_candidate(&mut table, &name, &subtype);
        }

        table
    }
}

fn add_candidate(table: &mut IndexMap<String, Subtype>, name: &str, subtype: &Subtype) {
    if name.is_empty() {
        return;
    }
    table
        .entry(name.to_string())
        .or_insert_with(|| subtype.clone());
}

/// Default provider: reads [`Reflect`] descriptors and holds subtypes
/// registered against base types.
#[derive(Clone, Default)]
pub struct Introspector {
    registered: HashMap<TypeId, Vec<Subtype>>,
}

impl Introspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `S` as a subtype of `B`, optionally under an explicit name.
    pub fn register_subtype<B, S>(
        &mut self,
        name: Option<&str>,
        upcast: impl Fn(S) -> B + Send + Sync + 'static,
    ) -> &mut Self
    where
        B: Reflect,
        S: Reflect,
    {
        let mut subtype = Subtype::of::<S, B>(upcast);
        if let Some(name) = name {
            subtype = subtype.named(name);
        }
        self.register(TypeRef::of::<B>(), subtype)
    }

    pub fn register(&mut self, base: TypeRef, subtype: Subtype) -> &mut Self {
        tracing::debug!(
            base = base.name(),
            subtype = subtype.ty.name(),
            name = subtype.name.as_deref().unwrap_or(""),
            "registered subtype"
        );
        self.registered.entry(base.id()).or_default().push(subtype);
        self
    }
}

impl MetadataProvider for Introspector {
    fn registered_subtypes(&self, base: TypeRef) -> Vec<Subtype> {
        self.registered.get(&base.id()).cloned().unwrap_or_default()
    }
}
