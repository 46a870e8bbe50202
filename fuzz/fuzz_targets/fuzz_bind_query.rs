//! Fuzz target: binding a GET query string into controller arguments.
//!
//! Input is split into `key=value` pairs on `&`. Binding must never panic,
//! must never bind the json switch, and must never let the query override
//! an explicitly supplied keyword.

#![no_main]

use drapes_controller::binder::bind_request;
use drapes_controller::{Call, Signature};
use drapes_core::{DrapesConfig, Request, Value};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let request = text.split('&').fold(Request::get(), |request, pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        request.query(key, value)
    });

    let config = DrapesConfig::default();
    let signature = Signature::new(["request", "id", "page"]);
    let call = Call::new().arg(Value::object(request)).kwarg("page", 1);
    let bound = bind_request(&signature, &call, &config);

    assert!(!bound.contains_key("json"), "json switch must never be bound");
    assert_eq!(bound.get("page"), Some(&Value::Int(1)), "explicit keyword must win");
});
