//! Permission resolution and the `Require` guard.
//!
//! A permission is resolved against a subject by the first strategy that
//! applies, most specific first:
//!
//! 1. a predicate permission is called with the subject;
//! 2. a member of the subject with the permission's name is read, or
//!    invoked with no arguments;
//! 3. a member of the permission companion registered for the subject's
//!    type is read, or invoked with the acting user.
//!
//! When none applies the permission is misconfigured for that subject,
//! which is reported as a [`ConfigurationError`], never as a denial. A
//! registered companion that lacks the member (as does its subject) does not
//! apply either.

use std::fmt;
use std::sync::Arc;

use drapes_core::{permissions, CompanionRegistry, DrapesConfig, Value};
use indexmap::IndexMap;

use crate::binder;
use crate::controller::Controller;
use crate::error::{ConfigurationError, ControllerError};
use crate::signature::{BoundArguments, Call, Signature};

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// What to check on a subject.
#[derive(Clone)]
pub enum Permission {
    /// A member name, resolved on the subject or its permission companion.
    Named(String),
    /// A predicate over the subject. The name is for diagnostics only.
    Predicate { name: String, check: Predicate },
}

impl Permission {
    /// A predicate permission.
    pub fn predicate(name: impl Into<String>, check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate { name: name.into(), check: Arc::new(check) }
    }

    /// The member name, or the predicate's diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Predicate { name, .. } => name,
        }
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl fmt::Debug for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Predicate { name, .. } => f.debug_struct("Predicate").field("name", name).finish_non_exhaustive(),
        }
    }
}

/// Which rule produced a permission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Predicate,
    SubjectAttribute,
    SubjectMethod,
    CompanionAttribute,
    CompanionMethod,
}

/// A permission decision and the rule that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionOutcome {
    pub allowed: bool,
    pub rule: Rule,
}

#[derive(Debug, Clone, Copy)]
enum Strategy {
    Predicate,
    Subject,
    Companion,
}

const RESOLUTION_ORDER: [Strategy; 3] = [Strategy::Predicate, Strategy::Subject, Strategy::Companion];

/// Resolves permissions against subjects, consulting a companion registry.
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'r> {
    registry: &'r CompanionRegistry,
}

impl PermissionResolver<'static> {
    /// A resolver over the process-wide permission registry.
    #[must_use]
    pub fn global() -> Self {
        Self::new(permissions())
    }
}

impl<'r> PermissionResolver<'r> {
    #[must_use]
    pub fn new(registry: &'r CompanionRegistry) -> Self {
        Self { registry }
    }

    /// Decide whether `user` may exercise `permission` on `subject`.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::PermissionNotApplicable`] when no
    /// strategy applies.
    pub fn check(&self, subject: &Value, user: &Value, permission: &Permission) -> Result<bool, ControllerError> {
        self.resolve(subject, user, permission).map(|outcome| outcome.allowed)
    }

    /// [`check`](Self::check), reporting which rule decided.
    ///
    /// # Errors
    /// As [`check`](Self::check).
    pub fn resolve(
        &self,
        subject: &Value,
        user: &Value,
        permission: &Permission,
    ) -> Result<PermissionOutcome, ControllerError> {
        for strategy in RESOLUTION_ORDER {
            let outcome = match strategy {
                Strategy::Predicate => Self::by_predicate(subject, permission),
                Strategy::Subject => Self::by_subject(subject, permission),
                Strategy::Companion => self.by_companion(subject, user, permission)?,
            };
            if let Some(outcome) = outcome {
                return Ok(outcome);
            }
        }
        Err(ConfigurationError::PermissionNotApplicable {
            permission: permission.name().to_owned(),
            subject_type: subject.type_name().to_owned(),
        }
        .into())
    }

    /// Evaluate `name` on the permission companion of `subject` directly.
    ///
    /// # Errors
    /// Returns [`ControllerError::Companion`] if no companion is registered
    /// for the subject's type or neither it nor the subject has `name`, and
    /// a configuration error if `subject` is not an object at all.
    pub fn companion_allows(&self, subject: &Value, user: &Value, name: &str) -> Result<bool, ControllerError> {
        let Some(object) = subject.as_object() else {
            return Err(ConfigurationError::PermissionNotApplicable {
                permission: name.to_owned(),
                subject_type: subject.type_name().to_owned(),
            }
            .into());
        };
        let companion = self.registry.get(object)?;
        let allowed = companion.member(name)?.resolve(std::slice::from_ref(user));
        Ok(allowed.is_truthy())
    }

    fn by_predicate(subject: &Value, permission: &Permission) -> Option<PermissionOutcome> {
        let Permission::Predicate { check, .. } = permission else {
            return None;
        };
        Some(PermissionOutcome { allowed: check(subject), rule: Rule::Predicate })
    }

    fn by_subject(subject: &Value, permission: &Permission) -> Option<PermissionOutcome> {
        let Permission::Named(name) = permission else {
            return None;
        };
        let member = subject.as_object()?.member(name)?;
        let rule = if member.is_invocable() { Rule::SubjectMethod } else { Rule::SubjectAttribute };
        Some(PermissionOutcome { allowed: member.resolve(&[]).is_truthy(), rule })
    }

    fn by_companion(
        &self,
        subject: &Value,
        user: &Value,
        permission: &Permission,
    ) -> Result<Option<PermissionOutcome>, ControllerError> {
        let (Permission::Named(name), Some(object)) = (permission, subject.as_object()) else {
            return Ok(None);
        };
        if !self.registry.is_registered(&**object) {
            return Ok(None);
        }
        let companion = self.registry.get(object)?;
        let Ok(member) = companion.member(name) else {
            return Ok(None);
        };
        let rule = if member.is_invocable() { Rule::CompanionMethod } else { Rule::CompanionAttribute };
        let allowed = member.resolve(std::slice::from_ref(user)).is_truthy();
        Ok(Some(PermissionOutcome { allowed, rule }))
    }
}

/// Builder for the permission guard.
pub struct Require {
    permissions: IndexMap<String, Permission>,
    registry: &'static CompanionRegistry,
    config: DrapesConfig,
}

impl Require {
    /// A guard over the process-wide permission registry.
    #[must_use]
    pub fn new() -> Self {
        Self { permissions: IndexMap::new(), registry: permissions(), config: DrapesConfig::default() }
    }

    /// Require `permission` on the argument named `argument`. The acting
    /// user is available as the argument `user`.
    #[must_use]
    pub fn permission(mut self, argument: impl Into<String>, permission: impl Into<Permission>) -> Self {
        self.permissions.insert(argument.into(), permission.into());
        self
    }

    /// Consult `registry` instead of the process-wide one.
    #[must_use]
    pub fn registry(mut self, registry: &'static CompanionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use non-default reserved names.
    #[must_use]
    pub fn config(mut self, config: DrapesConfig) -> Self {
        self.config = config;
        self
    }

    /// Wrap `inner` so every call is checked before it runs.
    pub fn wrap<C: Controller>(self, inner: C) -> Guarded<C> {
        Guarded { inner, permissions: self.permissions, registry: self.registry, config: self.config }
    }
}

impl Default for Require {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Require {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Require").field("permissions", &self.permissions).finish_non_exhaustive()
    }
}

/// A controller that only runs when every required permission holds.
pub struct Guarded<C> {
    inner: C,
    permissions: IndexMap<String, Permission>,
    registry: &'static CompanionRegistry,
    config: DrapesConfig,
}

impl<C> Guarded<C> {
    fn acting_user(&self, signature: &Signature, bound: &BoundArguments) -> Result<Value, ConfigurationError> {
        let member = &self.config.user_member;
        let first = signature.first().and_then(|name| bound.get(name)).unwrap_or(&Value::Null);
        first
            .as_object()
            .and_then(|subject| subject.member(member))
            .map(|user| user.resolve(&[]))
            .ok_or_else(|| ConfigurationError::MissingUser {
                member: member.clone(),
                type_name: first.type_name().to_owned(),
            })
    }
}

impl<C: Controller> Controller for Guarded<C> {
    fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    fn call(&self, call: Call) -> Result<Value, ControllerError> {
        let signature = self.inner.signature();
        let mut bound = binder::bind_request(signature, &call, &self.config);
        let user = self.acting_user(signature, &bound)?;
        bound.insert(self.config.user_member.clone(), user.clone());

        let resolver = PermissionResolver::new(self.registry);
        for (argument, permission) in &self.permissions {
            let subject = bound
                .get(argument)
                .ok_or_else(|| ConfigurationError::MissingArgument { argument: argument.clone() })?;
            let outcome = resolver.resolve(subject, &user, permission)?;
            if !outcome.allowed {
                tracing::warn!(
                    argument = %argument,
                    permission = permission.name(),
                    rule = ?outcome.rule,
                    "permission denied"
                );
                return Err(ControllerError::Authorization {
                    argument: argument.clone(),
                    permission: permission.name().to_owned(),
                });
            }
            tracing::debug!(
                argument = %argument,
                permission = permission.name(),
                rule = ?outcome.rule,
                "permission granted"
            );
        }
        self.inner.call(call)
    }
}
