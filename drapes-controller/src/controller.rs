//! The controller abstraction every wrapper consumes and produces.

use std::fmt;
use std::sync::Arc;

use drapes_core::Value;

use crate::binder;
use crate::error::ControllerError;
use crate::signature::{BoundArguments, Call, Signature};

/// A request-handling function with a declared parameter list.
///
/// The output is either a named-argument mapping for a renderer
/// ([`Value::Map`]) or a pass-through response object; wrappers never
/// inspect it.
pub trait Controller: Send + Sync {
    /// The declared parameters, in order.
    fn signature(&self) -> &Signature;

    /// Invoke the controller.
    ///
    /// # Errors
    /// Whatever the controller, or a wrapper around it, rejects the call with.
    fn call(&self, call: Call) -> Result<Value, ControllerError>;
}

impl<C: Controller + ?Sized> Controller for Arc<C> {
    fn signature(&self) -> &Signature {
        (**self).signature()
    }

    fn call(&self, call: Call) -> Result<Value, ControllerError> {
        (**self).call(call)
    }
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn signature(&self) -> &Signature {
        (**self).signature()
    }

    fn call(&self, call: Call) -> Result<Value, ControllerError> {
        (**self).call(call)
    }
}

/// A controller backed by a closure over its bound arguments.
pub struct FnController<F> {
    signature: Signature,
    handler: F,
}

impl<F> Controller for FnController<F>
where
    F: Fn(BoundArguments) -> Result<Value, ControllerError> + Send + Sync,
{
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, call: Call) -> Result<Value, ControllerError> {
        (self.handler)(binder::bind(&self.signature, &call))
    }
}

impl<F> fmt::Debug for FnController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnController").field("signature", &self.signature).finish_non_exhaustive()
    }
}

/// Build a controller from its parameter names and a handler.
///
/// The handler receives the call's arguments merged by name; parameters the
/// caller did not supply are simply absent.
pub fn controller<I, S, F>(params: I, handler: F) -> FnController<F>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: Fn(BoundArguments) -> Result<Value, ControllerError> + Send + Sync,
{
    FnController { signature: Signature::new(params), handler }
}
