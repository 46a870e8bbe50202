//! Companion objects: per-type helpers constructed around a subject.
//!
//! A view companion adds presentation members to an entity; a permission
//! companion adds class-wide policy methods that take the acting user.
//! Member lookup is two-step: the companion's own members first, then the
//! subject's.

use std::fmt;
use std::sync::Arc;

use crate::error::CoreError;
use crate::subject::{AsAny, Member, Subject};
use crate::value::Value;

/// Behavior attached to one subject type.
///
/// Implementors usually hold an `Arc` of their subject, received from the
/// constructor passed to [`CompanionRegistry::register`](crate::CompanionRegistry::register).
pub trait Companion: Send + Sync + 'static {
    /// Look up a member defined on the companion itself.
    fn member(&self, name: &str) -> Option<Member<'_>>;
}

/// A constructed companion together with the subject it was built around.
pub struct CompanionObject {
    companion: Box<dyn Companion>,
    subject: Arc<dyn Subject>,
    companion_type: &'static str,
}

impl CompanionObject {
    pub(crate) fn new(
        companion: Box<dyn Companion>,
        subject: Arc<dyn Subject>,
        companion_type: &'static str,
    ) -> Self {
        Self { companion, subject, companion_type }
    }

    /// The subject this companion wraps.
    #[must_use]
    pub fn subject(&self) -> &Arc<dyn Subject> {
        &self.subject
    }

    /// Name of the companion's concrete type.
    #[must_use]
    pub fn companion_type(&self) -> &'static str {
        self.companion_type
    }

    /// Resolve `name` on the companion, falling back to the subject.
    ///
    /// # Errors
    /// Returns [`CoreError::NoSuchMember`] naming both types when neither
    /// exposes `name`.
    pub fn member(&self, name: &str) -> Result<Member<'_>, CoreError> {
        self.companion
            .member(name)
            .or_else(|| self.subject.member(name))
            .ok_or_else(|| CoreError::NoSuchMember {
                member: name.to_owned(),
                subject_type: AsAny::type_name(&*self.subject),
                companion_type: self.companion_type,
            })
    }

    /// Resolve `name` and produce its value, invoking methods with `args`.
    ///
    /// # Errors
    /// Returns [`CoreError::NoSuchMember`] when `name` does not resolve.
    pub fn resolve(&self, name: &str, args: &[Value]) -> Result<Value, CoreError> {
        Ok(self.member(name)?.resolve(args))
    }
}

impl fmt::Debug for CompanionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanionObject")
            .field("companion_type", &self.companion_type)
            .field("subject", &self.subject)
            .finish()
    }
}
