//! Declared parameter lists and call-time arguments.

use drapes_core::Value;
use indexmap::IndexMap;

/// The merged named-argument set for one invocation.
pub type BoundArguments = IndexMap<String, Value>;

/// A controller's declared parameter names, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    params: Vec<String>,
}

impl Signature {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { params: params.into_iter().map(Into::into).collect() }
    }

    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The first declared parameter, conventionally the request.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }

    /// The same signature with every parameter in `names` removed.
    #[must_use]
    pub fn without(&self, names: &[&str]) -> Self {
        Self {
            params: self
                .params
                .iter()
                .filter(|p| !names.contains(&p.as_str()))
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Arguments as supplied at call time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    pub positional: Vec<Value>,
    pub keyword: IndexMap<String, Value>,
}

impl Call {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Rebuild a call from named arguments.
    ///
    /// Declared parameters become positional, in order, up to the first one
    /// that is absent; everything after that, and every name the signature
    /// does not declare, is passed by keyword.
    #[must_use]
    pub fn from_bound(signature: &Signature, mut bound: BoundArguments) -> Self {
        let mut positional = Vec::with_capacity(signature.len());
        for param in signature.params() {
            match bound.shift_remove(param) {
                Some(value) => positional.push(value),
                None => break,
            }
        }
        Self { positional, keyword: bound }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_removes_named_slots_only() {
        let sig = Signature::new(["request", "id", "invalid_form"]);
        assert_eq!(sig.without(&["invalid_form"]), Signature::new(["request", "id"]));
        assert_eq!(sig.without(&["absent"]), sig);
        assert_eq!(sig.first(), Some("request"));
        assert!(sig.contains("id") && !sig.contains("form"));
    }

    #[test]
    fn from_bound_splits_declared_and_extra_names() {
        let sig = Signature::new(["x", "y", "z"]);
        let mut bound = BoundArguments::new();
        bound.insert("z".to_owned(), Value::Int(15));
        bound.insert("extra".to_owned(), Value::from("e"));
        bound.insert("y".to_owned(), Value::Int(2));
        bound.insert("x".to_owned(), Value::Int(1));

        let call = Call::from_bound(&sig, bound);
        assert_eq!(call.positional, vec![Value::Int(1), Value::Int(2), Value::Int(15)]);
        assert_eq!(call.keyword.len(), 1);
        assert_eq!(call.keyword.get("extra"), Some(&Value::from("e")));
    }

    #[test]
    fn from_bound_stops_positional_at_first_gap() {
        let sig = Signature::new(["a", "b", "c"]);
        let mut bound = BoundArguments::new();
        bound.insert("a".to_owned(), Value::Int(1));
        bound.insert("c".to_owned(), Value::Int(3));

        let call = Call::from_bound(&sig, bound);
        assert_eq!(call.positional, vec![Value::Int(1)]);
        assert_eq!(call.keyword.get("c"), Some(&Value::Int(3)), "c must move to keywords");
    }
}
