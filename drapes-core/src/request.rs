//! The HTTP request as seen by controller wrappers.
//!
//! The surrounding framework builds a [`Request`] and passes it as the first
//! argument of an HTTP-entry controller. Wrappers read the method, the acting
//! user, the query parameters of GET calls and the submission of POST calls.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::subject::{Member, Subject};
use crate::value::Value;

/// Ordered string parameters: a query string or a form submission.
pub type Params = IndexMap<String, String>;

/// HTTP method of a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    /// Any other verb, upper-cased.
    Other(String),
}

impl HttpMethod {
    /// Parse a method name, case-insensitively.
    #[must_use]
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Other(method) => method,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming request.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct Request {
    /// The request method.
    pub method: HttpMethod,
    /// The acting user; `Null` for anonymous requests.
    pub user: Value,
    /// Query-string parameters.
    pub query: Params,
    /// Submitted form fields.
    pub form: Params,
}

impl Request {
    /// An anonymous GET request with no parameters.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// An anonymous POST request with an empty submission.
    #[must_use]
    pub fn post() -> Self {
        Self { method: HttpMethod::Post, ..Self::default() }
    }

    /// A request with an arbitrary method.
    #[must_use]
    pub fn with_method(method: HttpMethod) -> Self {
        Self { method, ..Self::default() }
    }

    /// Set the acting user.
    #[must_use]
    pub fn user(mut self, user: impl Into<Value>) -> Self {
        self.user = user.into();
        self
    }

    /// Add a query-string parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a submitted form field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_get(&self) -> bool {
        self.method == HttpMethod::Get
    }

    #[must_use]
    pub fn is_post(&self) -> bool {
        self.method == HttpMethod::Post
    }

    /// The parameters relevant to this method: the submission for POST,
    /// the query string otherwise.
    #[must_use]
    pub fn data(&self) -> &Params {
        if self.is_post() {
            &self.form
        } else {
            &self.query
        }
    }

    /// Whether the caller asked for a JSON response through `json_key`.
    #[must_use]
    pub fn wants_json(&self, json_key: &str) -> bool {
        self.data().get(json_key).is_some_and(|v| !v.is_empty())
    }
}

impl Subject for Request {
    fn member(&self, name: &str) -> Option<Member<'_>> {
        match name {
            "user" => Some(Member::attribute(self.user.clone())),
            "method" => Some(Member::attribute(self.method.as_str())),
            _ => None,
        }
    }
}
