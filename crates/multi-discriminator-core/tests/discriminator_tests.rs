//! Integration tests for multi-level discriminator resolution: subtype
//! naming precedence, hidden vs. visible discriminators, default subtypes and
//! the errors raised at each level.

mod common;

use common::{Alpaca, Artiodactyla, Huacaya, Llama, Move, Run, Spits, Suri, Vicugna};
use indexmap::IndexMap;
use multi_discriminator_core::{
    AggregateDef, Component, DiscriminatorConfig, ErrorCode, Introspector, Mapper, MapperOptions,
    RecordDef, Reflect, Subtype, TypeInfo, TypeRef,
};
use pretty_assertions::assert_eq;
use serde_json::json;

// ---------------------------------------------------------------------------
// Camelid family
// ---------------------------------------------------------------------------

#[test]
fn test_llama_with_moves() {
    let node = json!({
        "species": "llama",
        "color": "brown",
        "weightCapacityKg": 150.5,
        "moves": [{"move": "run", "speed": 12.3}, {"move": "spits"}]
    });

    let actual: Artiodactyla = Mapper::new().map(&node).unwrap();

    assert_eq!(
        actual,
        Artiodactyla::Llama(Llama {
            color: "brown".to_string(),
            weight_capacity_kg: 150.5,
            moves: Some(vec![Move::Run(Run { speed: 12.3 }), Move::Spits(Spits)]),
        })
    );
}

#[test]
fn test_two_level_alpaca_resolution() {
    let node = json!({"species": "alpaca", "kind": "suri", "color": "gray", "hairLength": 14});

    let actual: Artiodactyla = Mapper::new().map(&node).unwrap();

    assert_eq!(
        actual,
        Artiodactyla::Alpaca(Alpaca::Suri(Suri {
            color: "gray".to_string(),
            hair_length: 14,
            moves: None,
        }))
    );
}

#[test]
fn test_mid_level_type_as_target() {
    let node = json!({"kind": "huacaya", "color": "white", "hairLength": 9, "fluffiness": 7});

    let actual: Alpaca = Mapper::new().map(&node).unwrap();

    assert_eq!(
        actual,
        Alpaca::Huacaya(Huacaya {
            color: "white".to_string(),
            hair_length: 9,
            fluffiness: 7,
            moves: None,
        })
    );
}

#[test]
fn test_concrete_subtype_as_target_ignores_discriminators() {
    let node = json!({"species": "vicugna", "color": "beige"});

    let actual: Vicugna = Mapper::new().map(&node).unwrap();

    assert_eq!(
        actual,
        Vicugna {
            color: "beige".to_string(),
            moves: None,
        }
    );
}

#[test]
fn test_resolve_reports_levels_and_stripped_keys() {
    let node = json!({"color": "gray", "kind": "suri", "species": "alpaca"});

    let resolved = Mapper::new()
        .resolve(&node, TypeRef::of::<Artiodactyla>())
        .unwrap();

    assert!(resolved.concrete.is::<Suri>());
    assert_eq!(resolved.depth(), 2);
    assert_eq!(
        resolved.strip.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["species", "kind"]
    );
}

#[test]
fn test_polymorphic_elements_in_containers() {
    let node = json!({
        "pen": {"species": "vicugna", "color": "beige"},
        "barn": {"species": "alpaca", "kind": "suri", "color": "black", "hairLength": 3}
    });

    let actual: IndexMap<String, Artiodactyla> = Mapper::new().map(&node).unwrap();

    assert_eq!(actual.keys().collect::<Vec<_>>(), vec!["pen", "barn"]);
    assert!(matches!(actual["pen"], Artiodactyla::Vicugna(_)));
    assert!(matches!(actual["barn"], Artiodactyla::Alpaca(Alpaca::Suri(_))));
}

#[test]
fn test_missing_outer_discriminator() {
    let err = Mapper::new()
        .map::<Artiodactyla>(&json!({"color": "brown"}))
        .unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::MissingDiscriminator);
    assert_eq!(err.discriminator(), Some("species"));
    assert_eq!(err.path(), Some("/"));
}

#[test]
fn test_inner_level_errors_name_inner_property() {
    let mapper = Mapper::new();

    let missing = mapper
        .map::<Artiodactyla>(&json!({"species": "alpaca", "color": "gray"}))
        .unwrap_err();
    assert_eq!(missing.error_code(), ErrorCode::MissingDiscriminator);
    assert_eq!(missing.discriminator(), Some("kind"));

    let unknown = mapper
        .map::<Artiodactyla>(&json!({"species": "alpaca", "kind": "woolly"}))
        .unwrap_err();
    assert_eq!(unknown.error_code(), ErrorCode::UnknownSubtype);
    assert_eq!(unknown.discriminator(), Some("kind"));
}

#[test]
fn test_empty_discriminator() {
    let err = Mapper::new()
        .map::<Artiodactyla>(&json!({"species": "", "color": "brown"}))
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::EmptyDiscriminator);
}

#[test]
fn test_nested_discriminator_error_carries_path() {
    let node = json!({
        "species": "vicugna",
        "color": "beige",
        "moves": [{"move": "bite"}, {"move": "fly"}]
    });

    let err = Mapper::new().map::<Artiodactyla>(&node).unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::UnknownSubtype);
    assert_eq!(err.discriminator(), Some("move"));
    assert_eq!(err.path(), Some("/moves/1"));
}

#[test]
fn test_scalar_where_polymorphic_object_expected() {
    let node = json!({"species": "vicugna", "color": "beige", "moves": ["run"]});

    let err = Mapper::new().map::<Artiodactyla>(&node).unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::StructuralMismatch);
    assert_eq!(err.path(), Some("/moves/0"));
}

#[test]
fn test_missing_primitive_inside_subtype() {
    let node = json!({"species": "llama", "color": "brown"});

    let err = Mapper::new().map::<Artiodactyla>(&node).unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::MissingPrimitive);
    assert_eq!(err.path(), Some("/weightCapacityKg"));
}

// ---------------------------------------------------------------------------
// Naming precedence and default subtypes
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Signal {
    Beep(Beep),
    Flash(Flash),
    Buzz(Buzz),
}

#[derive(Debug, PartialEq)]
struct Beep {
    volume: Option<i32>,
}

#[derive(Debug, PartialEq)]
struct Flash {
    color: String,
}

#[derive(Debug, PartialEq)]
struct Buzz;

impl Reflect for Signal {
    fn type_info() -> TypeInfo {
        TypeInfo::polymorphic(
            DiscriminatorConfig::property("signal")
                .default_subtype(Subtype::of::<Beep, Signal>(Signal::Beep)),
        )
        .subtype(Subtype::of::<Beep, Signal>(Signal::Beep))
        .subtype(Subtype::of::<Flash, Signal>(Signal::Flash).alias("strobe"))
    }
}

impl Reflect for Beep {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![Component::new::<Option<i32>>("volume")],
            |args| Ok(Beep { volume: args.take()? }),
        )))
    }
}

impl Reflect for Flash {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![Component::new::<String>("color")],
            |args| Ok(Flash { color: args.take()? }),
        )))
        .named("flash")
    }
}

impl Reflect for Buzz {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(Vec::new(), |_| Ok(Buzz))))
    }
}

#[test]
fn test_short_type_name_when_subtype_is_unnamed() {
    let actual: Signal = Mapper::new()
        .map(&json!({"signal": "Beep", "volume": 3}))
        .unwrap();
    assert_eq!(actual, Signal::Beep(Beep { volume: Some(3) }));
}

#[test]
fn test_self_declared_name_and_alias() {
    let mapper = Mapper::new();
    let expected = Signal::Flash(Flash {
        color: "red".to_string(),
    });

    let by_name: Signal = mapper.map(&json!({"signal": "flash", "color": "red"})).unwrap();
    let by_alias: Signal = mapper.map(&json!({"signal": "strobe", "color": "red"})).unwrap();

    assert_eq!(by_name, expected);
    assert_eq!(by_alias, expected);
}

#[test]
fn test_default_subtype_covers_missing_empty_and_unknown() {
    let mapper = Mapper::new();
    let expected = Signal::Beep(Beep { volume: Some(2) });

    for node in [
        json!({"volume": 2}),
        json!({"signal": null, "volume": 2}),
        json!({"signal": "", "volume": 2}),
        json!({"signal": "buzz", "volume": 2}),
    ] {
        let actual: Signal = mapper.map(&node).unwrap();
        assert_eq!(actual, expected, "node: {node}");
    }
}

#[test]
fn test_registered_subtype() {
    let mut provider = Introspector::new();
    provider.register_subtype::<Signal, Buzz>(Some("buzz"), Signal::Buzz);
    let mapper = Mapper::with_provider(provider, MapperOptions::default());

    let actual: Signal = mapper.map(&json!({"signal": "buzz"})).unwrap();

    assert_eq!(actual, Signal::Buzz(Buzz));
}

// ---------------------------------------------------------------------------
// Visibility and inclusion
// ---------------------------------------------------------------------------

/// Concrete subtype with a member named like the discriminator.
#[derive(Debug, PartialEq)]
struct Labelled {
    kind: Option<String>,
    text: String,
}

impl Reflect for Labelled {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![
                Component::new::<Option<String>>("kind"),
                Component::new::<String>("text"),
            ],
            |args| {
                Ok(Labelled {
                    kind: args.take()?,
                    text: args.take()?,
                })
            },
        )))
    }
}

macro_rules! label_family {
    ($name:ident, $config:expr) => {
        #[derive(Debug, PartialEq)]
        struct $name(Labelled);

        impl Reflect for $name {
            fn type_info() -> TypeInfo {
                TypeInfo::polymorphic($config)
                    .subtype(Subtype::of::<Labelled, $name>($name).named("label"))
            }
        }
    };
}

label_family!(HiddenLabel, DiscriminatorConfig::property("kind"));
label_family!(VisibleLabel, DiscriminatorConfig::property("kind").visible(true));
label_family!(ExistingLabel, DiscriminatorConfig::existing_property("kind"));

#[test]
fn test_hidden_discriminator_is_not_bound() {
    let node = json!({"kind": "label", "text": "hello"});

    let HiddenLabel(actual) = Mapper::new().map(&node).unwrap();

    assert_eq!(actual.kind, None);
    assert_eq!(actual.text, "hello");
}

#[test]
fn test_visible_and_existing_discriminators_are_bound() {
    let node = json!({"kind": "label", "text": "hello"});
    let mapper = Mapper::new();

    let VisibleLabel(visible) = mapper.map(&node).unwrap();
    let ExistingLabel(existing) = mapper.map(&node).unwrap();

    assert_eq!(visible.kind.as_deref(), Some("label"));
    assert_eq!(existing.kind.as_deref(), Some("label"));
}

/// A concrete type that carries its own discriminator.
#[derive(Debug, PartialEq)]
struct Note {
    text: String,
}

impl Reflect for Note {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![Component::new::<String>("text")],
            |args| Ok(Note { text: args.take()? }),
        )))
        .discriminator(DiscriminatorConfig::property("type"))
        .subtype(Subtype::itself::<Note>().named("note"))
    }
}

#[test]
fn test_concrete_base_resolving_to_itself() {
    let mapper = Mapper::new();

    let note: Note = mapper.map(&json!({"type": "note", "text": "x"})).unwrap();
    assert_eq!(note.text, "x");

    let err = mapper
        .map::<Note>(&json!({"type": "memo", "text": "x"}))
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::UnknownSubtype);
}

#[test]
fn test_default_property_name() {
    #[derive(Debug, PartialEq)]
    struct Tagged(Buzz);

    impl Reflect for Tagged {
        fn type_info() -> TypeInfo {
            TypeInfo::polymorphic(DiscriminatorConfig::default_property())
                .subtype(Subtype::of::<Buzz, Tagged>(Tagged).named("buzz"))
        }
    }

    let actual: Tagged = Mapper::new().map(&json!({"@type": "buzz"})).unwrap();
    assert_eq!(actual, Tagged(Buzz));

    let err = Mapper::new().map::<Tagged>(&json!({"type": "buzz"})).unwrap_err();
    assert_eq!(err.discriminator(), Some("@type"));
}
