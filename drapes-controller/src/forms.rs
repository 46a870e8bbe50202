//! Routing POST submissions through forms.
//!
//! A routed controller handles GET (and every other non-POST call) itself.
//! The request is the first argument, whatever the parameter is named.
//! On POST the submission is bound into a form: a valid form goes to the
//! route's handler under `form_slot`, an invalid one goes back to the
//! original controller so it can re-render with errors.

use std::fmt;

use drapes_core::{DrapesConfig, Params, Request, Value};
use indexmap::IndexMap;

use crate::binder;
use crate::controller::Controller;
use crate::error::{ConfigurationError, ControllerError};
use crate::signature::{Call, Signature};

/// A form bound from a submission.
pub trait Form: drapes_core::Subject + Sized {
    /// Bind `data`. `user` is the acting user when the route asks for it.
    fn from_submission(data: &Params, user: Option<&Value>) -> Self;

    /// Returns `true` if the bound data is acceptable.
    fn is_valid(&self) -> bool;
}

type Build = Box<dyn Fn(&Params, Option<&Value>) -> (bool, Value) + Send + Sync>;

/// A form type paired with the handler that receives it when valid.
pub struct FormRoute {
    form_type: &'static str,
    build: Build,
    handler: Box<dyn Controller>,
    pass_user: bool,
}

impl FormRoute {
    /// Route valid `F` submissions to `handler`.
    pub fn new<F: Form>(handler: impl Controller + 'static) -> Self {
        Self {
            form_type: std::any::type_name::<F>(),
            build: Box::new(|data: &Params, user: Option<&Value>| {
                let form = F::from_submission(data, user);
                (form.is_valid(), Value::object(form))
            }),
            handler: Box::new(handler),
            pass_user: false,
        }
    }

    /// Bind the form with the acting user as well as the submission.
    #[must_use]
    pub fn pass_user(mut self) -> Self {
        self.pass_user = true;
        self
    }

    fn checked_handler_params(&self, form_slot: &str) -> Result<Signature, ConfigurationError> {
        let signature = self.handler.signature();
        if !signature.contains(form_slot) {
            return Err(ConfigurationError::MissingFormSlot { handler: "valid-form handler", slot: form_slot.to_owned() });
        }
        Ok(signature.without(&[form_slot]))
    }
}

impl fmt::Debug for FormRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormRoute")
            .field("form_type", &self.form_type)
            .field("handler", self.handler.signature())
            .field("pass_user", &self.pass_user)
            .finish()
    }
}

#[derive(Debug)]
enum Routes {
    Single(FormRoute),
    Multi(IndexMap<String, FormRoute>),
}

/// Builder for form routing.
#[derive(Debug)]
pub struct FormRouting {
    routes: Routes,
    config: DrapesConfig,
}

impl FormRouting {
    /// One form. An invalid submission reaches the controller under
    /// `invalid_form_slot`.
    #[must_use]
    pub fn single(route: FormRoute) -> Self {
        Self { routes: Routes::Single(route), config: DrapesConfig::default() }
    }

    /// Several named forms, selected by the submission's discriminator
    /// field. An invalid submission reaches the controller under the
    /// form's own name.
    pub fn multi<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = (S, FormRoute)>,
        S: Into<String>,
    {
        let routes = routes.into_iter().map(|(name, route)| (name.into(), route)).collect();
        Self { routes: Routes::Multi(routes), config: DrapesConfig::default() }
    }

    /// Use non-default reserved names.
    #[must_use]
    pub fn config(mut self, config: DrapesConfig) -> Self {
        self.config = config;
        self
    }

    /// Wrap `inner`, checking once that its parameters line up with every
    /// handler's.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::MissingFormSlot`] if a form slot is not
    /// declared, or [`ConfigurationError::NonmatchingHandlers`] if the
    /// remaining parameters differ.
    pub fn wrap<C: Controller>(self, inner: C) -> Result<Routed<C>, ConfigurationError> {
        let signature = inner.signature();
        let slots: Vec<&str> = match &self.routes {
            Routes::Single(_) => vec![self.config.invalid_form_slot.as_str()],
            Routes::Multi(routes) => routes.keys().map(String::as_str).collect(),
        };
        if let Some(slot) = slots.iter().find(|slot| !signature.contains(slot)) {
            return Err(ConfigurationError::MissingFormSlot { handler: "controller", slot: (*slot).to_owned() });
        }
        let expected = signature.without(&slots);

        let routes: Vec<&FormRoute> = match &self.routes {
            Routes::Single(route) => vec![route],
            Routes::Multi(routes) => routes.values().collect(),
        };
        for route in routes {
            let handler = route.checked_handler_params(&self.config.form_slot)?;
            if handler != expected {
                return Err(ConfigurationError::NonmatchingHandlers {
                    controller: expected.params().to_vec(),
                    handler: handler.params().to_vec(),
                });
            }
        }
        Ok(Routed { inner, routes: self.routes, config: self.config })
    }
}

/// A controller whose POST submissions are routed through forms.
pub struct Routed<C> {
    inner: C,
    routes: Routes,
    config: DrapesConfig,
}

impl<C> Routed<C> {
    /// The route for this submission and the slot an invalid form is passed
    /// back under.
    fn select(&self, request: &Request) -> Result<(&FormRoute, String), ConfigurationError> {
        match &self.routes {
            Routes::Single(route) => Ok((route, self.config.invalid_form_slot.clone())),
            Routes::Multi(routes) => {
                let field = &self.config.form_discriminator;
                let name = request
                    .form
                    .get(field)
                    .ok_or_else(|| ConfigurationError::MissingDiscriminator { field: field.clone() })?;
                let route = routes.get(name).ok_or_else(|| ConfigurationError::UnknownForm { name: name.clone() })?;
                Ok((route, name.clone()))
            }
        }
    }
}

impl<C: Controller> Controller for Routed<C> {
    fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    fn call(&self, call: Call) -> Result<Value, ControllerError> {
        let signature = self.inner.signature();
        let mut bound = binder::bind(signature, &call);
        let request = signature
            .first()
            .and_then(|first| bound.get(first))
            .and_then(Value::downcast_ref::<Request>);
        let Some(request) = request.filter(|r| r.is_post()) else {
            return self.inner.call(call);
        };

        let (route, invalid_slot) = self.select(request)?;
        let user = route.pass_user.then_some(&request.user);
        let (valid, form) = (route.build)(&request.form, user);
        tracing::debug!(form_type = route.form_type, valid, "submission routed");

        if valid {
            bound.insert(self.config.form_slot.clone(), form);
            route.handler.call(Call::from_bound(route.handler.signature(), bound))
        } else {
            bound.insert(invalid_slot, form);
            self.inner.call(Call::from_bound(signature, bound))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::controller;
    use drapes_core::{Member, Subject};

    #[derive(Debug)]
    struct Signup {
        name: String,
    }

    impl Subject for Signup {
        fn member(&self, name: &str) -> Option<Member<'_>> {
            (name == "name").then(|| Member::attribute(self.name.as_str()))
        }
    }

    impl Form for Signup {
        fn from_submission(data: &Params, _user: Option<&Value>) -> Self {
            Self { name: data.get("name").cloned().unwrap_or_default() }
        }

        fn is_valid(&self) -> bool {
            !self.name.is_empty()
        }
    }

    fn handler(params: &'static [&'static str]) -> impl Controller {
        controller(params.to_vec(), |_| Ok(Value::from("handled")))
    }

    #[test]
    fn setup_accepts_matching_parameters() {
        let routed = FormRouting::single(FormRoute::new::<Signup>(handler(&["request", "id", "form"])))
            .wrap(controller(["request", "id", "invalid_form"], |_| Ok(Value::Null)));
        assert!(routed.is_ok());
    }

    #[test]
    fn setup_rejects_mismatched_parameters() {
        let routed = FormRouting::single(FormRoute::new::<Signup>(handler(&["request", "form"])))
            .wrap(controller(["request", "id", "invalid_form"], |_| Ok(Value::Null)));
        match routed {
            Err(ConfigurationError::NonmatchingHandlers { controller, handler }) => {
                assert_eq!(controller, ["request", "id"]);
                assert_eq!(handler, ["request"]);
            }
            Err(other) => panic!("expected NonmatchingHandlers, got {other:?}"),
            Ok(_) => panic!("mismatched handlers were accepted"),
        }
    }

    #[test]
    fn setup_requires_form_slots() {
        let no_invalid_slot = FormRouting::single(FormRoute::new::<Signup>(handler(&["request", "form"])))
            .wrap(controller(["request"], |_| Ok(Value::Null)));
        assert!(matches!(
            no_invalid_slot,
            Err(ConfigurationError::MissingFormSlot { handler: "controller", .. })
        ));

        let no_form_slot = FormRouting::single(FormRoute::new::<Signup>(handler(&["request"])))
            .wrap(controller(["request", "invalid_form"], |_| Ok(Value::Null)));
        assert!(matches!(no_form_slot, Err(ConfigurationError::MissingFormSlot { .. })));
    }

    #[test]
    fn multi_setup_strips_every_form_name() {
        let routed = FormRouting::multi([
            ("signup", FormRoute::new::<Signup>(handler(&["request", "form"]))),
            ("login", FormRoute::new::<Signup>(handler(&["request", "form"]))),
        ])
        .wrap(controller(["request", "signup", "login"], |_| Ok(Value::Null)));
        assert!(routed.is_ok());
    }

    #[test]
    fn non_post_calls_bypass_routing() {
        let routed = match FormRouting::single(FormRoute::new::<Signup>(handler(&["request", "form"])))
            .wrap(controller(["request", "invalid_form"], |args| {
                Ok(Value::Bool(args.contains_key("invalid_form")))
            })) {
            Ok(routed) => routed,
            Err(e) => panic!("setup failed: {e}"),
        };
        let out = routed.call(Call::new().arg(Value::object(Request::get().field("name", "x"))));
        assert!(matches!(out, Ok(Value::Bool(false))));
    }

    #[test]
    fn post_is_routed_whatever_the_request_parameter_is_named() {
        let routed = match FormRouting::single(FormRoute::new::<Signup>(handler(&["req", "form"])))
            .wrap(controller(["req", "invalid_form"], |_| Ok(Value::from("original"))))
        {
            Ok(routed) => routed,
            Err(e) => panic!("setup failed: {e}"),
        };

        let valid = routed.call(Call::new().arg(Value::object(Request::post().field("name", "Adora"))));
        assert!(matches!(valid, Ok(Value::Str(ref s)) if s == "handled"), "got {valid:?}");

        let get = routed.call(Call::new().arg(Value::object(Request::get().field("name", "Adora"))));
        assert!(matches!(get, Ok(Value::Str(ref s)) if s == "original"), "got {get:?}");
    }
}
