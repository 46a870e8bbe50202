//! Fuzz target: the bounded integer validator.
//!
//! Arbitrary strings must either convert to an in-range integer, convert
//! to null when blank, or be rejected with the input preserved. No panics.

#![no_main]

use drapes_controller::validate::Validator;
use drapes_controller::validators::Int;
use drapes_core::Value;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data).into_owned();
    let value = Value::from(input.clone());

    match Int::new().min(-1000).max(1000).convert(&value) {
        Ok(Value::Int(n)) => assert!((-1000..=1000).contains(&n)),
        Ok(Value::Null) => assert!(input.trim().is_empty()),
        Ok(other) => panic!("unexpected conversion result: {other:?}"),
        Err(error) => assert_eq!(error.value, value, "rejection must carry the input"),
    }
});
