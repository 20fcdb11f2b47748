//! Shared test model: a three-level camelid family with discriminated moves.
//!
//! `Artiodactyla` is selected by `species`; the `alpaca` branch is itself
//! polymorphic and selected by `kind`. Every concrete type is record-like.

#![allow(dead_code)]

use multi_discriminator_core::{
    AggregateDef, Component, DiscriminatorConfig, MemberHints, RecordDef, Reflect, Subtype,
    TypeInfo,
};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Artiodactyla {
    Llama(Llama),
    Vicugna(Vicugna),
    Alpaca(Alpaca),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alpaca {
    Huacaya(Huacaya),
    Suri(Suri),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Llama {
    pub color: String,
    pub weight_capacity_kg: f32,
    pub moves: Option<Vec<Move>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vicugna {
    pub color: String,
    pub moves: Option<Vec<Move>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Huacaya {
    pub color: String,
    pub hair_length: i32,
    pub fluffiness: i32,
    pub moves: Option<Vec<Move>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suri {
    pub color: String,
    pub hair_length: i32,
    pub moves: Option<Vec<Move>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Move {
    Run(Run),
    Bite(Bite),
    Spits(Spits),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bite;

#[derive(Debug, Clone, PartialEq)]
pub struct Spits;

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

fn renamed<T: Reflect>(name: &str, wire: &str) -> Component {
    Component::new::<T>(name).hints(MemberHints::new().rename(wire))
}

impl Reflect for Artiodactyla {
    fn type_info() -> TypeInfo {
        TypeInfo::polymorphic(DiscriminatorConfig::property("species"))
            .subtype(Subtype::of::<Llama, Artiodactyla>(Artiodactyla::Llama).named("llama"))
            .subtype(Subtype::of::<Vicugna, Artiodactyla>(Artiodactyla::Vicugna).named("vicugna"))
            .subtype(Subtype::of::<Alpaca, Artiodactyla>(Artiodactyla::Alpaca).named("alpaca"))
    }
}

impl Reflect for Alpaca {
    fn type_info() -> TypeInfo {
        TypeInfo::polymorphic(DiscriminatorConfig::property("kind"))
            .subtype(Subtype::of::<Huacaya, Alpaca>(Alpaca::Huacaya).named("huacaya"))
            .subtype(Subtype::of::<Suri, Alpaca>(Alpaca::Suri).named("suri"))
    }
}

impl Reflect for Llama {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![
                Component::new::<String>("color"),
                renamed::<f32>("weight_capacity_kg", "weightCapacityKg"),
                Component::new::<Option<Vec<Move>>>("moves"),
            ],
            |args| {
                Ok(Llama {
                    color: args.take()?,
                    weight_capacity_kg: args.take()?,
                    moves: args.take()?,
                })
            },
        )))
    }
}

impl Reflect for Vicugna {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![
                Component::new::<String>("color"),
                Component::new::<Option<Vec<Move>>>("moves"),
            ],
            |args| {
                Ok(Vicugna {
                    color: args.take()?,
                    moves: args.take()?,
                })
            },
        )))
    }
}

impl Reflect for Huacaya {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![
                Component::new::<String>("color"),
                renamed::<i32>("hair_length", "hairLength"),
                Component::new::<i32>("fluffiness"),
                Component::new::<Option<Vec<Move>>>("moves"),
            ],
            |args| {
                Ok(Huacaya {
                    color: args.take()?,
                    hair_length: args.take()?,
                    fluffiness: args.take()?,
                    moves: args.take()?,
                })
            },
        )))
    }
}

impl Reflect for Suri {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![
                Component::new::<String>("color"),
                renamed::<i32>("hair_length", "hairLength"),
                Component::new::<Option<Vec<Move>>>("moves"),
            ],
            |args| {
                Ok(Suri {
                    color: args.take()?,
                    hair_length: args.take()?,
                    moves: args.take()?,
                })
            },
        )))
    }
}

impl Reflect for Move {
    fn type_info() -> TypeInfo {
        TypeInfo::polymorphic(DiscriminatorConfig::property("move"))
            .subtype(Subtype::of::<Run, Move>(Move::Run).named("run"))
            .subtype(Subtype::of::<Bite, Move>(Move::Bite).named("bite"))
            .subtype(Subtype::of::<Spits, Move>(Move::Spits).named("spits"))
    }
}

impl Reflect for Run {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(
            vec![Component::new::<f32>("speed")],
            |args| Ok(Run { speed: args.take()? }),
        )))
    }
}

impl Reflect for Bite {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(Vec::new(), |_| Ok(Bite))))
    }
}

impl Reflect for Spits {
    fn type_info() -> TypeInfo {
        TypeInfo::aggregate(AggregateDef::record(RecordDef::new(Vec::new(), |_| Ok(Spits))))
    }
}

// ---------------------------------------------------------------------------
// Serialization back to nodes (discriminators preserved)
// ---------------------------------------------------------------------------

fn moves_node(moves: &Option<Vec<Move>>) -> Value {
    match moves {
        None => Value::Null,
        Some(moves) => Value::Array(moves.iter().map(Move::to_node).collect()),
    }
}

impl Move {
    pub fn to_node(&self) -> Value {
        match self {
            Move::Run(run) => json!({"move": "run", "speed": run.speed}),
            Move::Bite(_) => json!({"move": "bite"}),
            Move::Spits(_) => json!({"move": "spits"}),
        }
    }
}

impl Artiodactyla {
    pub fn to_node(&self) -> Value {
        match self {
            Artiodactyla::Llama(llama) => json!({
                "species": "llama",
                "color": llama.color,
                "weightCapacityKg": llama.weight_capacity_kg,
                "moves": moves_node(&llama.moves),
            }),
            Artiodactyla::Vicugna(vicugna) => json!({
                "species": "vicugna",
                "color": vicugna.color,
                "moves": moves_node(&vicugna.moves),
            }),
            Artiodactyla::Alpaca(Alpaca::Huacaya(huacaya)) => json!({
                "species": "alpaca",
                "kind": "huacaya",
                "color": huacaya.color,
                "hairLength": huacaya.hair_length,
                "fluffiness": huacaya.fluffiness,
                "moves": moves_node(&huacaya.moves),
            }),
            Artiodactyla::Alpaca(Alpaca::Suri(suri)) => json!({
                "species": "alpaca",
                "kind": "suri",
                "color": suri.color,
                "hairLength": suri.hair_length,
                "moves": moves_node(&suri.moves),
            }),
        }
    }
}
