//! Error types for the controller crate.

use drapes_core::{CoreError, Value};
use serde::Serialize;

/// Why a single argument failed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidReason {
    /// The validator rejected the value.
    #[error("{0}")]
    Message(String),

    /// A model lookup matched nothing.
    #[error("no instance could be found")]
    NoInstance,

    /// A model lookup matched more than one entity.
    #[error("multiple entries for validator ({count} matches)")]
    MultipleInstances { count: usize },

    /// A lookup filter names a sibling argument that was not supplied.
    #[error("lookup argument '{argument}' was not supplied")]
    MissingContext { argument: String },
}

/// A single argument failed conversion.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("invalid {}: {reason}", .argument.as_deref().unwrap_or("value"))]
pub struct ValidationError {
    /// The argument being validated, filled in by the cascade.
    pub argument: Option<String>,
    /// The rejected input.
    pub value: Value,
    pub reason: InvalidReason,
}

impl ValidationError {
    /// A failure for `value` with the given reason.
    #[must_use]
    pub fn new(value: Value, reason: InvalidReason) -> Self {
        Self { argument: None, value, reason }
    }

    /// A failure with a free-form message.
    #[must_use]
    pub fn invalid(value: &Value, message: impl Into<String>) -> Self {
        Self::new(value.clone(), InvalidReason::Message(message.into()))
    }

    /// Attach the argument name this failure belongs to.
    #[must_use]
    pub fn for_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    /// Returns `true` for model-lookup failures (zero or multiple matches).
    #[must_use]
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self.reason,
            InvalidReason::NoInstance | InvalidReason::MultipleInstances { .. }
        )
    }
}

/// Programmer or setup mistakes. These should fail loudly and early.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// No resolution strategy applies to this permission and subject.
    #[error("permission '{permission}' is not applicable to {subject_type}")]
    PermissionNotApplicable { permission: String, subject_type: String },

    /// A permission names an argument the controller was not called with.
    #[error("permission target '{argument}' is not an argument of this call")]
    MissingArgument { argument: String },

    /// The first argument exposes no acting user.
    #[error("first argument of type {type_name} has no '{member}' member")]
    MissingUser { member: String, type_name: String },

    /// A multi-form submission lacks the discriminator field.
    #[error("submission has no '{field}' field to select a form")]
    MissingDiscriminator { field: String },

    /// The discriminator names a form that is not configured.
    #[error("no form named '{name}' is configured")]
    UnknownForm { name: String },

    /// A handler lacks the parameter a form is passed under.
    #[error("{handler} has no '{slot}' parameter")]
    MissingFormSlot { handler: &'static str, slot: String },

    /// The controller and a valid-form handler disagree on parameters.
    #[error("controller parameters {controller:?} do not match handler parameters {handler:?}")]
    NonmatchingHandlers { controller: Vec<String>, handler: Vec<String> },
}

/// Errors surfaced by a wrapped controller.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ControllerError {
    /// A permission check evaluated to false.
    #[error("{argument} is not allowed to {permission}")]
    Authorization { argument: String, permission: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Exactly one argument failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Several arguments failed validation, in the order they were checked.
    #[error("{} arguments failed validation", .0.len())]
    MultipleValidation(Vec<ValidationError>),

    /// A companion could not be resolved.
    #[error(transparent)]
    Companion(#[from] CoreError),

    /// The controller itself failed.
    #[error("controller failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ControllerError {
    /// Wrap an error raised by controller code.
    pub fn handler(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler(error.into())
    }

    /// Every validation failure carried by this error, single or aggregate.
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(error) => std::slice::from_ref(error),
            Self::MultipleValidation(errors) => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_serializes_for_error_bodies() {
        let error = ValidationError::invalid(&Value::from("HE MAN"), "please enter an integer value").for_argument("an_arg");
        let json = match serde_json::to_value(&error) {
            Ok(json) => json,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(
            json,
            serde_json::json!({
                "argument": "an_arg",
                "value": "HE MAN",
                "reason": { "Message": "please enter an integer value" },
            })
        );
        assert_eq!(error.to_string(), "invalid an_arg: please enter an integer value");
    }

    #[test]
    fn validation_errors_flattens_single_and_aggregate() {
        let one = ValidationError::new(Value::Null, InvalidReason::NoInstance);
        assert_eq!(ControllerError::Validation(one.clone()).validation_errors(), [one.clone()]);

        let many = ControllerError::MultipleValidation(vec![one.clone(), one]);
        assert_eq!(many.validation_errors().len(), 2);
        assert_eq!(many.to_string(), "2 arguments failed validation");

        let denied = ControllerError::Authorization { argument: "user".to_owned(), permission: "edit".to_owned() };
        assert!(denied.validation_errors().is_empty());
        assert_eq!(denied.to_string(), "user is not allowed to edit");
    }
}
