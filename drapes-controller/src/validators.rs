//! Built-in validators.
//!
//! The plain converters treat empty input (`Null` or `""`) as absent and
//! yield `Null`; wrap them in [`Required`] to reject it instead.

use std::fmt;
use std::sync::{Arc, LazyLock};

use drapes_core::Value;
use indexmap::IndexMap;
use regex::Regex;

use crate::error::{InvalidReason, ValidationError};
use crate::signature::BoundArguments;
use crate::validate::Validator;

/// Integers, from `Int` values or trimmed decimal strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Int {
    min: Option<i64>,
    max: Option<i64>,
}

impl Int {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values below `min`.
    #[must_use]
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Reject values above `max`.
    #[must_use]
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

impl Validator for Int {
    fn convert(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_empty() {
            return Ok(Value::Null);
        }
        let parsed = match value {
            Value::Int(i) => *i,
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::invalid(value, "please enter an integer value"))?,
            _ => return Err(ValidationError::invalid(value, "please enter an integer value")),
        };
        if let Some(min) = self.min.filter(|min| parsed < *min) {
            return Err(ValidationError::invalid(value, format!("please enter a number that is {min} or greater")));
        }
        if let Some(max) = self.max.filter(|max| parsed > *max) {
            return Err(ValidationError::invalid(value, format!("please enter a number that is {max} or smaller")));
        }
        Ok(Value::Int(parsed))
    }
}

/// Strings of at least `n` characters.
#[derive(Debug, Clone, Copy)]
pub struct MinLength(usize);

impl MinLength {
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self(min)
    }
}

impl Validator for MinLength {
    fn convert(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_empty() {
            return Ok(Value::Null);
        }
        let Some(s) = value.as_str() else {
            return Err(ValidationError::invalid(value, "expected text"));
        };
        if s.chars().count() < self.0 {
            return Err(ValidationError::invalid(
                value,
                format!("enter a value at least {} characters long", self.0),
            ));
        }
        Ok(value.clone())
    }
}

#[expect(clippy::expect_used, reason = "the pattern is a valid literal")]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$").expect("email pattern compiles")
});

/// E-mail addresses, trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Email {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator for Email {
    fn convert(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_empty() {
            return Ok(Value::Null);
        }
        let Some(address) = value.as_str().map(str::trim) else {
            return Err(ValidationError::invalid(value, "expected an email address"));
        };
        if address.matches('@').count() != 1 {
            return Err(ValidationError::invalid(value, "an email address must contain a single @"));
        }
        if !EMAIL.is_match(address) {
            return Err(ValidationError::invalid(value, "the email address is not valid"));
        }
        Ok(Value::from(address))
    }
}

/// Rejects empty input, then delegates to the wrapped validator.
#[derive(Debug, Clone, Copy)]
pub struct Required<V>(pub V);

impl<V: Validator> Validator for Required<V> {
    fn convert(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::invalid(value, "please enter a value"));
        }
        self.0.convert(value)
    }

    fn with_context(
        &self,
        arguments: &BoundArguments,
    ) -> Result<Option<Box<dyn Validator + '_>>, ValidationError> {
        let Some(inner) = self.0.with_context(arguments)? else {
            return Ok(None);
        };
        Ok(Some(Box::new(Required(inner))))
    }
}

impl Validator for Box<dyn Validator + '_> {
    fn convert(&self, value: &Value) -> Result<Value, ValidationError> {
        (**self).convert(value)
    }

    fn with_context(
        &self,
        arguments: &BoundArguments,
    ) -> Result<Option<Box<dyn Validator + '_>>, ValidationError> {
        (**self).with_context(arguments)
    }
}

/// Lookup filter: field name to required value.
pub type Filter = IndexMap<String, Value>;

/// A queryable set of entities, supplied by the application.
pub trait Collection: Send + Sync {
    /// Every entity matching all entries of `filter`.
    fn filter(&self, filter: &Filter) -> Vec<Value>;
}

/// Converts a key into the single entity it identifies.
///
/// By default the supplied value is matched against the `id` field. With
/// [`ModelLookup::by_arguments`] the filter is instead drawn from sibling
/// arguments, for entities identified by a composite key.
#[derive(Clone)]
pub struct ModelLookup {
    collection: Arc<dyn Collection>,
    get_by: String,
    arguments: IndexMap<String, String>,
}

impl ModelLookup {
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self { collection, get_by: "id".to_owned(), arguments: IndexMap::new() }
    }

    /// Match the supplied value against `field` instead of `id`.
    #[must_use]
    pub fn by(mut self, field: impl Into<String>) -> Self {
        self.get_by = field.into();
        self
    }

    /// Build the filter from `(field, argument)` pairs, each field taking the
    /// value of the named argument of the same call.
    #[must_use]
    pub fn by_arguments<I, F, A>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, A)>,
        F: Into<String>,
        A: Into<String>,
    {
        self.arguments = pairs.into_iter().map(|(f, a)| (f.into(), a.into())).collect();
        self
    }

    fn fetch(&self, filter: &Filter, value: &Value) -> Result<Value, ValidationError> {
        let mut rows = self.collection.filter(filter);
        match rows.len() {
            0 => Err(ValidationError::new(value.clone(), InvalidReason::NoInstance)),
            1 => Ok(rows.remove(0)),
            count => Err(ValidationError::new(value.clone(), InvalidReason::MultipleInstances { count })),
        }
    }
}

impl Validator for ModelLookup {
    fn convert(&self, value: &Value) -> Result<Value, ValidationError> {
        let mut filter = Filter::new();
        filter.insert(self.get_by.clone(), value.clone());
        self.fetch(&filter, value)
    }

    fn with_context(
        &self,
        arguments: &BoundArguments,
    ) -> Result<Option<Box<dyn Validator + '_>>, ValidationError> {
        if self.arguments.is_empty() {
            return Ok(None);
        }
        let mut filter = Filter::new();
        for (field, argument) in &self.arguments {
            let value = arguments.get(argument).ok_or_else(|| {
                ValidationError::new(
                    Value::Null,
                    InvalidReason::MissingContext { argument: argument.clone() },
                )
            })?;
            filter.insert(field.clone(), value.clone());
        }
        Ok(Some(Box::new(ContextualLookup { lookup: self, filter })))
    }
}

impl fmt::Debug for ModelLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelLookup")
            .field("get_by", &self.get_by)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// A [`ModelLookup`] with its filter already drawn from the call.
struct ContextualLookup<'a> {
    lookup: &'a ModelLookup,
    filter: Filter,
}

impl Validator for ContextualLookup<'_> {
    fn convert(&self, value: &Value) -> Result<Value, ValidationError> {
        self.lookup.fetch(&self.filter, value)
    }
}
