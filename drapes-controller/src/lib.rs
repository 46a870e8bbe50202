//! Controller wrappers for drapes.
//!
//! A [`Controller`] declares its parameters in a [`Signature`] and is called
//! with a [`Call`]. The wrappers in this crate produce controllers of their
//! own, so they stack in any order:
//!
//! - [`ValidateArgs`] converts arguments through [`Validator`]s, drawing
//!   missing ones from the query string of GET requests;
//! - [`Require`] checks permissions on arguments before the call;
//! - [`FormRouting`] sends POST submissions through forms.
//!
//! ```
//! use drapes_controller::{controller, validators::Int, Call, Controller, ValidateArgs};
//! use drapes_core::{Request, Value};
//!
//! let show = ValidateArgs::new()
//!     .arg("id", Int::new())
//!     .wrap(controller(["request", "id"], |args| Ok(args["id"].clone())));
//!
//! let request = Request::get().query("id", "5");
//! let out = show.call(Call::new().arg(Value::object(request)));
//! assert!(matches!(out, Ok(Value::Int(5))));
//! ```

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod binder;
pub mod controller;
pub mod error;
pub mod forms;
pub mod permission;
pub mod signature;
pub mod validate;
pub mod validators;

pub use controller::{controller, Controller, FnController};
pub use error::{ConfigurationError, ControllerError, InvalidReason, ValidationError};
pub use forms::{Form, FormRoute, FormRouting, Routed};
pub use permission::{Guarded, Permission, PermissionOutcome, PermissionResolver, Require, Rule};
pub use signature::{BoundArguments, Call, Signature};
pub use validate::{validate, ValidateArgs, Validated, Validator, Validators};
