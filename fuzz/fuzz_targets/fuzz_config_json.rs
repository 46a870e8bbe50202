//! Fuzz target: JSON deserialization of `DrapesConfig`.
//!
//! Arbitrary bytes fed to the parser must never panic; a config that does
//! parse must survive re-serialization.

#![no_main]

use drapes_core::DrapesConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<DrapesConfig>(data) else {
        return;
    };
    let json = serde_json::to_string(&config).expect("DrapesConfig serialization must not fail");
    let again: DrapesConfig =
        serde_json::from_str(&json).expect("DrapesConfig deserialization must not fail");
    assert_eq!(config, again);
});
