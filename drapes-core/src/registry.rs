//! Type-keyed companion registries.
//!
//! A registry maps the exact runtime type of a subject to a companion class.
//! There is no ancestor matching: a companion registered for `Article` does
//! not apply to a wrapper type around `Article`.
//!
//! Two process-wide registries exist, one for view companions and one for
//! permission companions. Register companions during start-up, before
//! request traffic begins; lookups afterwards only take the read lock.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use crate::companion::{Companion, CompanionObject};
use crate::error::CoreError;
use crate::subject::{AsAny, Subject, SubjectType};

type Constructor = Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Companion>> + Send + Sync>;

/// A registered companion class: its name and how to build it.
#[derive(Clone)]
pub struct CompanionClass {
    companion_type: &'static str,
    construct: Constructor,
}

impl CompanionClass {
    /// Name of the companion's concrete type.
    #[must_use]
    pub fn companion_type(&self) -> &'static str {
        self.companion_type
    }

    /// Build the companion around `subject`.
    ///
    /// Returns `None` if `subject` is not of the type this class was
    /// registered for.
    #[must_use]
    pub fn construct(&self, subject: &Arc<dyn Subject>) -> Option<CompanionObject> {
        let any = AsAny::into_any(Arc::clone(subject));
        let companion = (self.construct)(any)?;
        Some(CompanionObject::new(companion, Arc::clone(subject), self.companion_type))
    }
}

impl fmt::Debug for CompanionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanionClass").field("companion_type", &self.companion_type).finish()
    }
}

/// Thread-safe table from subject type to companion class.
pub struct CompanionRegistry {
    kind: &'static str,
    entries: RwLock<HashMap<SubjectType, CompanionClass>>,
}

impl CompanionRegistry {
    /// Create an empty registry. `kind` names it in errors and logs.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self { kind, entries: RwLock::new(HashMap::new()) }
    }

    /// What this registry holds, e.g. `"view"` or `"permission"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Register `C` as the companion for subjects of type `S`.
    ///
    /// A later registration for the same `S` replaces the earlier one.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn register<S, C, F>(&self, construct: F)
    where
        S: Subject,
        C: Companion,
        F: Fn(Arc<S>) -> C + Send + Sync + 'static,
    {
        let key = SubjectType::of::<S>();
        let companion_type = std::any::type_name::<C>();
        let construct: Constructor = Arc::new(move |any: Arc<dyn Any + Send + Sync>| {
            let subject = any.downcast::<S>().ok()?;
            Some(Box::new(construct(subject)) as Box<dyn Companion>)
        });

        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let previous = self
            .entries
            .write()
            .expect("companion registry write lock poisoned")
            .insert(key, CompanionClass { companion_type, construct });

        match previous {
            Some(old) => tracing::debug!(
                registry = self.kind,
                subject = %key,
                companion = companion_type,
                replaced = old.companion_type,
                "companion registration replaced"
            ),
            None => tracing::debug!(
                registry = self.kind,
                subject = %key,
                companion = companion_type,
                "companion registered"
            ),
        }
    }

    /// Return `true` if a companion is registered for the subject's type.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn is_registered(&self, subject: &dyn Subject) -> bool {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.entries
            .read()
            .expect("companion registry read lock poisoned")
            .contains_key(&SubjectType::of_subject(subject))
    }

    /// Find the companion class registered for the subject's exact type.
    ///
    /// # Errors
    /// Returns [`CoreError::NoCompanion`] if nothing is registered.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn resolve(&self, subject: &dyn Subject) -> Result<CompanionClass, CoreError> {
        let key = SubjectType::of_subject(subject);
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let entries = self.entries.read().expect("companion registry read lock poisoned");
        entries
            .get(&key)
            .cloned()
            .ok_or(CoreError::NoCompanion { registry: self.kind, subject_type: key.name() })
    }

    /// Construct the companion registered for the subject's type.
    ///
    /// # Errors
    /// Returns [`CoreError::NoCompanion`] if nothing is registered.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn get(&self, subject: &Arc<dyn Subject>) -> Result<CompanionObject, CoreError> {
        let class = self.resolve(&**subject)?;
        class.construct(subject).ok_or(CoreError::NoCompanion {
            registry: self.kind,
            subject_type: AsAny::type_name(&**subject),
        })
    }

    /// Number of registered subject types.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.entries.read().expect("companion registry read lock poisoned").len()
    }

    /// Return `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CompanionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanionRegistry").field("kind", &self.kind).finish_non_exhaustive()
    }
}

static VIEWS: LazyLock<CompanionRegistry> = LazyLock::new(|| CompanionRegistry::new("view"));

static PERMISSIONS: LazyLock<CompanionRegistry> =
    LazyLock::new(|| CompanionRegistry::new("permission"));

/// The process-wide view companion registry.
#[must_use]
pub fn views() -> &'static CompanionRegistry {
    &VIEWS
}

/// The process-wide permission companion registry.
#[must_use]
pub fn permissions() -> &'static CompanionRegistry {
    &PERMISSIONS
}

/// Build the view companion registered for `subject`'s type.
///
/// # Errors
/// Returns [`CoreError::NoCompanion`] if no view is registered.
pub fn view(subject: &Arc<dyn Subject>) -> Result<CompanionObject, CoreError> {
    views().get(subject)
}
