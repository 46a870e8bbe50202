//! Integration tests: POST submissions routed through single and named forms.

use drapes_controller::{
    controller, BoundArguments, Call, ConfigurationError, Controller, ControllerError, Form, FormRoute,
    FormRouting,
};
use drapes_core::{DrapesConfig, Member, Params, Request, Subject, Value};

/// Valid when the submission says so.
#[derive(Debug)]
struct FakeForm {
    valid: bool,
    user: Value,
}

impl Subject for FakeForm {
    fn member(&self, name: &str) -> Option<Member<'_>> {
        match name {
            "user" => Some(Member::attribute(self.user.clone())),
            "is_valid" => Some(Member::method(|_: &[Value]| Value::Bool(self.valid))),
            _ => None,
        }
    }
}

impl Form for FakeForm {
    fn from_submission(data: &Params, user: Option<&Value>) -> Self {
        Self {
            valid: data.get("valid").is_some_and(|v| v == "true"),
            user: user.cloned().unwrap_or_default(),
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

#[derive(Debug)]
struct Named(&'static str);

impl Subject for Named {
    fn member(&self, name: &str) -> Option<Member<'_>> {
        (name == "username").then(|| Member::attribute(self.0))
    }
}

fn reply(text: &'static str) -> impl Fn(BoundArguments) -> Result<Value, ControllerError> + Send + Sync {
    move |_| Ok(Value::from(text))
}

fn form_member(args: &BoundArguments, slot: &str, member: &str) -> Value {
    args.get(slot)
        .and_then(Value::as_object)
        .and_then(|form| form.member(member))
        .map(|m| m.resolve(&[]))
        .unwrap_or_default()
}

fn post(fields: &[(&str, &str)]) -> Request {
    fields.iter().fold(Request::post(), |request, (k, v)| request.field(*k, *v))
}

fn call_with(request: Request) -> Call {
    Call::new().arg(Value::object(request))
}

fn single() -> impl Controller {
    let valid = controller(["request", "form"], |args| {
        assert_eq!(form_member(&args, "form", "is_valid"), Value::Bool(true));
        Ok(Value::from("Valid controller"))
    });
    match FormRouting::single(FormRoute::new::<FakeForm>(valid))
        .wrap(controller(["request", "invalid_form"], |args| {
            let rejected = args.get("invalid_form").is_some();
            Ok(Value::from(if rejected { "Original controller, rejected" } else { "Original controller" }))
        })) {
        Ok(routed) => routed,
        Err(e) => panic!("setup failed: {e}"),
    }
}

#[test]
fn get_reaches_original_controller() {
    let out = single().call(call_with(Request::get()));
    assert!(matches!(out, Ok(Value::Str(ref s)) if s == "Original controller"), "got {out:?}");
}

#[test]
fn valid_post_reaches_handler() {
    let out = single().call(call_with(post(&[("valid", "true")])));
    assert!(matches!(out, Ok(Value::Str(ref s)) if s == "Valid controller"), "got {out:?}");
}

#[test]
fn invalid_post_returns_form_to_original() {
    let out = single().call(call_with(post(&[("valid", "false")])));
    assert!(matches!(out, Ok(Value::Str(ref s)) if s == "Original controller, rejected"), "got {out:?}");
}

#[test]
fn pass_user_binds_acting_user() {
    let valid = controller(["request", "form"], |args| {
        let user = form_member(&args, "form", "user");
        let name = user
            .as_object()
            .and_then(|u| u.member("username"))
            .map(|m| m.resolve(&[]))
            .unwrap_or_default();
        Ok(Value::from(format!("The name is {name}")))
    });
    let routed = match FormRouting::single(FormRoute::new::<FakeForm>(valid).pass_user())
        .wrap(controller(["request", "invalid_form"], reply("Original controller")))
    {
        Ok(routed) => routed,
        Err(e) => panic!("setup failed: {e}"),
    };

    let request = post(&[("valid", "true")]).user(Value::object(Named("Skeletor")));
    let out = routed.call(call_with(request));
    assert!(matches!(out, Ok(Value::Str(ref s)) if s == "The name is Skeletor"), "got {out:?}");
}

#[test]
fn mismatched_handler_fails_at_setup() {
    let routed = FormRouting::single(FormRoute::new::<FakeForm>(controller(["request", "form"], reply("unused"))))
        .wrap(controller(["request", "controller_arg", "invalid_form"], reply("Response")));
    assert!(matches!(routed, Err(ConfigurationError::NonmatchingHandlers { .. })));
}

fn multi() -> impl Controller {
    let routes = [
        ("form1", FormRoute::new::<FakeForm>(controller(["request", "form"], reply("Valid controller")))),
        (
            "form2",
            FormRoute::new::<FakeForm>(controller(["request", "form"], reply("Not the valid controller")))
                .pass_user(),
        ),
    ];
    match FormRouting::multi(routes).wrap(controller(["request", "form1", "form2"], |args| {
        let rejected: Vec<Value> = ["form1", "form2"]
            .into_iter()
            .filter(|slot| args.contains_key(*slot))
            .map(Value::from)
            .collect();
        Ok(Value::from(rejected))
    })) {
        Ok(routed) => routed,
        Err(e) => panic!("setup failed: {e}"),
    }
}

#[test]
fn discriminator_selects_the_form() {
    let out = multi().call(call_with(post(&[("valid", "true"), ("drape_form_name", "form1")])));
    assert!(matches!(out, Ok(Value::Str(ref s)) if s == "Valid controller"), "got {out:?}");

    let out = multi().call(call_with(post(&[("valid", "true"), ("drape_form_name", "form2")])));
    assert!(matches!(out, Ok(Value::Str(ref s)) if s == "Not the valid controller"), "got {out:?}");
}

#[test]
fn invalid_named_form_is_passed_under_its_name() {
    let out = multi().call(call_with(post(&[("valid", "false"), ("drape_form_name", "form1")])));
    assert_eq!(out.ok(), Some(Value::from(vec![Value::from("form1")])));
}

#[test]
fn bad_discriminator_is_a_configuration_error() {
    let out = multi().call(call_with(post(&[("valid", "true"), ("drape_form_name", "form3")])));
    assert!(matches!(
        out,
        Err(ControllerError::Configuration(ConfigurationError::UnknownForm { ref name })) if name == "form3"
    ));

    let out = multi().call(call_with(post(&[("valid", "true")])));
    assert!(matches!(
        out,
        Err(ControllerError::Configuration(ConfigurationError::MissingDiscriminator { .. }))
    ));
}

#[test]
fn discriminator_field_is_configurable() {
    let mut config = DrapesConfig::default();
    config.form_discriminator = "which".to_owned();
    let routed = match FormRouting::multi([(
        "only",
        FormRoute::new::<FakeForm>(controller(["request", "form"], reply("handled"))),
    )])
    .config(config)
    .wrap(controller(["request", "only"], reply("original")))
    {
        Ok(routed) => routed,
        Err(e) => panic!("setup failed: {e}"),
    };
    let out = routed.call(call_with(post(&[("valid", "true"), ("which", "only")])));
    assert!(matches!(out, Ok(Value::Str(ref s)) if s == "handled"), "got {out:?}");
}
