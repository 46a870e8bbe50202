//! The subject capability interface.
//!
//! A subject is any business object that wrappers inspect at call time:
//! permission checks read its members, registries key companions by its
//! runtime type. Members are looked up by name through [`Subject::member`]
//! rather than by reflection, so every subject states exactly which names it
//! answers to.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::value::Value;

/// Runtime type access for subjects.
///
/// Blanket-implemented for every sized `Any + Send + Sync` type; never
/// implement it by hand.
pub trait AsAny: Any + Send + Sync {
    /// Borrow as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle into an `Arc<dyn Any>` for owned downcasting.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// The concrete type's name, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A business object that companions attach to and permissions inspect.
pub trait Subject: AsAny + fmt::Debug {
    /// Look up an attribute or method by name.
    ///
    /// Return `None` for names this subject does not expose.
    fn member(&self, name: &str) -> Option<Member<'_>> {
        let _ = name;
        None
    }

    /// JSON rendition used when a value holding this subject is serialized.
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::String(self.type_name().to_owned())
    }
}

/// A named member of a subject or companion.
pub enum Member<'a> {
    /// A plain value.
    Attribute(Value),
    /// Something invocable. Subject methods are called with no arguments,
    /// permission-companion methods with the acting user.
    Method(Box<dyn Fn(&[Value]) -> Value + 'a>),
}

impl<'a> Member<'a> {
    /// Wrap a plain value.
    pub fn attribute(value: impl Into<Value>) -> Self {
        Self::Attribute(value.into())
    }

    /// Wrap an invocable member.
    pub fn method(f: impl Fn(&[Value]) -> Value + 'a) -> Self {
        Self::Method(Box::new(f))
    }

    /// Returns `true` for methods.
    #[must_use]
    pub fn is_invocable(&self) -> bool {
        matches!(self, Self::Method(_))
    }

    /// Yield an attribute's value, or invoke a method with `args`.
    #[must_use]
    pub fn resolve(self, args: &[Value]) -> Value {
        match self {
            Self::Attribute(value) => value,
            Self::Method(f) => f(args),
        }
    }
}

impl fmt::Debug for Member<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(value) => f.debug_tuple("Attribute").field(value).finish(),
            Self::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// The exact runtime type of a subject, as used for registry keys.
#[derive(Debug, Clone, Copy)]
pub struct SubjectType {
    id: TypeId,
    name: &'static str,
}

impl SubjectType {
    /// The key for a statically known type.
    #[must_use]
    pub fn of<S: Subject>() -> Self {
        Self { id: TypeId::of::<S>(), name: std::any::type_name::<S>() }
    }

    /// The key for the concrete type behind a trait object.
    #[must_use]
    pub fn of_subject(subject: &dyn Subject) -> Self {
        Self { id: AsAny::as_any(subject).type_id(), name: AsAny::type_name(subject) }
    }

    /// The type's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for SubjectType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubjectType {}

impl Hash for SubjectType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Door {
        open: bool,
    }

    impl Subject for Door {
        fn member(&self, name: &str) -> Option<Member<'_>> {
            match name {
                "open" => Some(Member::attribute(self.open)),
                "is_closed" => Some(Member::method(move |_| Value::Bool(!self.open))),
                _ => None,
            }
        }
    }

    #[derive(Debug)]
    struct Window;

    impl Subject for Window {}

    #[test]
    fn subject_type_of_trait_object_matches_static_type() {
        let door: Arc<dyn Subject> = Arc::new(Door { open: true });
        assert_eq!(SubjectType::of_subject(&*door), SubjectType::of::<Door>());
        assert_ne!(SubjectType::of_subject(&*door), SubjectType::of::<Window>());
        assert!(SubjectType::of_subject(&*door).name().ends_with("Door"));
    }

    #[test]
    fn member_resolves_attribute_and_method() {
        let door = Door { open: false };
        let attr = door.member("open").unwrap_or_else(|| panic!("open must exist"));
        assert!(!attr.is_invocable());
        assert_eq!(attr.resolve(&[]), Value::Bool(false));

        let method = door.member("is_closed").unwrap_or_else(|| panic!("is_closed must exist"));
        assert!(method.is_invocable());
        assert_eq!(method.resolve(&[]), Value::Bool(true));

        assert!(door.member("missing").is_none());
        assert!(Window.member("open").is_none(), "default member lookup exposes nothing");
    }

    #[test]
    fn default_to_json_is_type_name() {
        let json = Window.to_json();
        assert!(json.as_str().is_some_and(|s| s.ends_with("Window")));
    }
}
