#![no_main]

use libfuzzer_sys::fuzz_target;
use multi_discriminator_core::{Mapper, Untyped};

#[path = "../../crates/multi-discriminator-core/tests/common/mod.rs"]
mod common;

// Accepts arbitrary bytes, attempts to parse as JSON, maps the tree onto a
// polymorphic family, a container type and the generic value.
// Goal: no panics, only `MapError`s.
fuzz_target!(|data: &[u8]| {
    if let Ok(node) = serde_json::from_slice::<serde_json::Value>(data) {
        let mapper = Mapper::new();
        let _ = mapper.map::<common::Artiodactyla>(&node);
        let _ = mapper.map::<Vec<Option<common::Move>>>(&node);
        let _ = mapper.map::<Untyped>(&node);
    }
});
