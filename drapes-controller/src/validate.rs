//! The validation cascade.
//!
//! Every bound argument with a registered validator is converted; failures
//! are collected rather than stopping at the first one. One failure
//! propagates as itself, several as an ordered aggregate.

use std::fmt;
use std::sync::Arc;

use drapes_core::{DrapesConfig, Value};
use indexmap::IndexMap;

use crate::binder;
use crate::controller::Controller;
use crate::error::{ControllerError, ValidationError};
use crate::signature::{BoundArguments, Call, Signature};

/// Converts one argument value, or rejects it.
pub trait Validator: Send + Sync {
    /// Convert `value` into its usable form.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when `value` is unacceptable.
    fn convert(&self, value: &Value) -> Result<Value, ValidationError>;

    /// Absorb context from the whole argument set before conversion.
    ///
    /// Validators that depend on sibling arguments return a per-call
    /// validator carrying that context; the rest return `Ok(None)` and are
    /// used as they are.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when the context needed is missing.
    fn with_context(
        &self,
        arguments: &BoundArguments,
    ) -> Result<Option<Box<dyn Validator + '_>>, ValidationError> {
        let _ = arguments;
        Ok(None)
    }
}

/// Validators keyed by the argument they convert.
pub type Validators = IndexMap<String, Arc<dyn Validator>>;

/// Validate every argument in `bound`.
///
/// Arguments without a validator pass through unchanged.
///
/// # Errors
/// Returns [`ControllerError::Validation`] if exactly one argument fails, or
/// [`ControllerError::MultipleValidation`] with every failure in argument
/// order if more than one does.
pub fn validate(bound: &BoundArguments, validators: &Validators) -> Result<BoundArguments, ControllerError> {
    let mut validated = BoundArguments::with_capacity(bound.len());
    let mut errors = Vec::new();

    for (name, value) in bound {
        let Some(validator) = validators.get(name) else {
            validated.insert(name.clone(), value.clone());
            continue;
        };
        match convert_in_context(validator.as_ref(), value, bound) {
            Ok(converted) => {
                validated.insert(name.clone(), converted);
            }
            Err(error) => errors.push(error.for_argument(name.clone())),
        }
    }

    match errors.len() {
        0 => Ok(validated),
        1 => {
            let error = errors.remove(0);
            tracing::debug!(argument = ?error.argument, %error, "argument failed validation");
            Err(ControllerError::Validation(error))
        }
        count => {
            tracing::debug!(count, "arguments failed validation");
            Err(ControllerError::MultipleValidation(errors))
        }
    }
}

fn convert_in_context(
    validator: &dyn Validator,
    value: &Value,
    bound: &BoundArguments,
) -> Result<Value, ValidationError> {
    match validator.with_context(bound)? {
        Some(contextual) => contextual.convert(value),
        None => validator.convert(value),
    }
}

/// Builder for the validating wrapper.
#[derive(Default)]
pub struct ValidateArgs {
    validators: Validators,
    config: DrapesConfig,
}

impl ValidateArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert `argument` with `validator`.
    #[must_use]
    pub fn arg(mut self, argument: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.validators.insert(argument.into(), Arc::new(validator));
        self
    }

    /// Use non-default reserved names.
    #[must_use]
    pub fn config(mut self, config: DrapesConfig) -> Self {
        self.config = config;
        self
    }

    /// Wrap `inner` so its arguments are validated before every call.
    pub fn wrap<C: Controller>(self, inner: C) -> Validated<C> {
        Validated { inner, validators: self.validators, config: self.config }
    }
}

impl fmt::Debug for ValidateArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateArgs")
            .field("arguments", &self.validators.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// A controller whose arguments are bound, validated and converted first.
pub struct Validated<C> {
    inner: C,
    validators: Validators,
    config: DrapesConfig,
}

impl<C: Controller> Controller for Validated<C> {
    fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    fn call(&self, call: Call) -> Result<Value, ControllerError> {
        let signature = self.inner.signature();
        let bound = binder::bind_request(signature, &call, &self.config);
        let validated = validate(&bound, &self.validators)?;
        self.inner.call(Call::from_bound(signature, validated))
    }
}
