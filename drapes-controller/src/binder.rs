//! Merging call-time arguments into one named set.
//!
//! Precedence, highest first: explicit keyword, positional, query string.
//! Binding never rejects input; arity problems are left to the controller.

use drapes_core::{DrapesConfig, Request, Value};

use crate::signature::{BoundArguments, Call, Signature};

/// Zip declared names against positional values, then overlay keywords.
///
/// Positional values beyond the declared parameters are dropped. Keywords
/// the signature does not declare are kept as extras.
#[must_use]
pub fn bind(signature: &Signature, call: &Call) -> BoundArguments {
    let mut bound: BoundArguments = signature
        .params()
        .iter()
        .cloned()
        .zip(call.positional.iter().cloned())
        .collect();
    for (name, value) in &call.keyword {
        bound.insert(name.clone(), value.clone());
    }
    bound
}

/// [`bind`], plus the query string of GET calls to HTTP-entry controllers.
///
/// Query parameters fill only names not already bound, and the reserved
/// `json_key` is never bound.
#[must_use]
pub fn bind_request(signature: &Signature, call: &Call, config: &DrapesConfig) -> BoundArguments {
    let mut bound = bind(signature, call);
    let query = request_of(signature, &bound, config)
        .filter(|request| request.is_get())
        .map(|request| request.query.clone());

    if let Some(query) = query {
        for (name, value) in query {
            if name == config.json_key {
                continue;
            }
            bound.entry(name).or_insert(Value::Str(value));
        }
    }
    bound
}

/// Returns `true` if the first declared parameter is the request parameter.
#[must_use]
pub fn is_request_controller(signature: &Signature, config: &DrapesConfig) -> bool {
    signature.first() == Some(config.request_param.as_str())
}

/// The request an HTTP-entry controller was called with, if any.
#[must_use]
pub fn request_of<'a>(
    signature: &Signature,
    bound: &'a BoundArguments,
    config: &DrapesConfig,
) -> Option<&'a Request> {
    if !is_request_controller(signature, config) {
        return None;
    }
    bound.get(&config.request_param)?.downcast_ref::<Request>()
}
