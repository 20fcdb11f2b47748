//! Discriminator configuration and subtype declarations.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::{Reflect, TypeRef};
use crate::error::MapError;
use crate::value::DynValue;

/// Property name used when a discriminator declares none.
pub const DEFAULT_PROPERTY: &str = "@type";

/// Where the discriminator lives relative to the concrete type's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// A synthetic property, stripped before mapping unless visible.
    Property,
    /// A regular member of the concrete type, never stripped.
    ExistingProperty,
}

/// Discriminator settings for one polymorphic level.
#[derive(Debug, Clone)]
pub struct DiscriminatorConfig {
    pub property: Option<String>,
    pub inclusion: Inclusion,
    pub visible: bool,
    /// Used when the property is absent, empty or names no known subtype.
    pub default_subtype: Option<Subtype>,
}

impl DiscriminatorConfig {
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            property: Some(name.into()),
            inclusion: Inclusion::Property,
            visible: false,
            default_subtype: None,
        }
    }

    /// Discriminator stored under [`DEFAULT_PROPERTY`].
    pub fn default_property() -> Self {
        Self {
            property: None,
            inclusion: Inclusion::Property,
            visible: false,
            default_subtype: None,
        }
    }

    pub fn existing_property(name: impl Into<String>) -> Self {
        Self {
            inclusion: Inclusion::ExistingProperty,
            ..Self::property(name)
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn default_subtype(mut self, subtype: Subtype) -> Self {
        self.default_subtype = Some(subtype);
        self
    }

    /// The effective property name.
    pub fn property_name(&self) -> &str {
        match self.property.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_PROPERTY,
        }
    }

    /// Whether the property is removed from the node once resolved.
    pub fn strips(&self) -> bool {
        self.inclusion == Inclusion::Property && !self.visible
    }
}

pub type UpcastFn = Arc<dyn Fn(DynValue) -> Result<DynValue, MapError> + Send + Sync>;

/// A candidate subtype of a polymorphic type.
///
/// The upcast lifts a mapped subtype value into the base type, e.g. wrapping
/// a struct into the enum variant that carries it.
#[derive(Clone)]
pub struct Subtype {
    pub ty: TypeRef,
    pub name: Option<String>,
    pub aliases: Vec<String>,
    upcast: UpcastFn,
}

impl Subtype {
    pub fn of<S, B>(upcast: impl Fn(S) -> B + Send + Sync + 'static) -> Self
    where
        S: Reflect,
        B: Any,
    {
        Self {
            ty: TypeRef::of::<S>(),
            name: None,
            aliases: Vec::new(),
            upcast: Arc::new(move |value: DynValue| -> Result<DynValue, MapError> {
                Ok(DynValue::new(upcast(value.take::<S>()?)))
            }),
        }
    }

    /// A subtype that is its own base, for concrete types carrying a
    /// discriminator.
    pub fn itself<T: Reflect>() -> Self {
        Self {
            ty: TypeRef::of::<T>(),
            name: None,
            aliases: Vec::new(),
            upcast: Arc::new(|value: DynValue| -> Result<DynValue, MapError> { Ok(value) }),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn upcast(&self, value: DynValue) -> Result<DynValue, MapError> {
        (self.upcast)(value)
    }
}

impl fmt::Debug for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subtype")
            .field("ty", &self.ty)
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_name_falls_back_to_default() {
        assert_eq!(DiscriminatorConfig::default_property().property_name(), "@type");
        assert_eq!(DiscriminatorConfig::property("").property_name(), "@type");
        assert_eq!(DiscriminatorConfig::property("kind").property_name(), "kind");
    }

    #[test]
    fn test_strip_rules() {
        assert!(DiscriminatorConfig::property("kind").strips());
        assert!(!DiscriminatorConfig::property("kind").visible(true).strips());
        assert!(!DiscriminatorConfig::existing_property("kind").strips());
    }

    #[test]
    fn test_upcast_wraps_value() {
        let subtype = Subtype::of::<String, Option<String>>(Some).named("text");
        let lifted = subtype.upcast(DynValue::new("x".to_string())).unwrap();
        assert_eq!(lifted.take::<Option<String>>().unwrap(), Some("x".to_string()));
        assert_eq!(subtype.name.as_deref(), Some("text"));
    }
}
