//! Core types for drapes: request-controller augmentation.
//!
//! Defines the dynamic [`Value`] that flows through bound arguments, the
//! [`Subject`] capability interface, companion objects and the type-keyed
//! registries that attach them to subjects, the [`Request`] abstraction
//! consumed from the surrounding HTTP framework, and configuration.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod companion;
pub mod config;
pub mod error;
pub mod registry;
pub mod request;
pub mod subject;
pub mod value;

pub use companion::{Companion, CompanionObject};
pub use config::DrapesConfig;
pub use error::CoreError;
pub use registry::{permissions, view, views, CompanionClass, CompanionRegistry};
pub use request::{HttpMethod, Params, Request};
pub use subject::{AsAny, Member, Subject, SubjectType};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_display_names_types() {
        let err = CoreError::NoCompanion { registry: "view", subject_type: "blog::Article" };
        assert_eq!(err.to_string(), "no view companion registered for blog::Article");

        let err = CoreError::NoSuchMember {
            member: "colour".to_owned(),
            subject_type: "blog::Article",
            companion_type: "blog::ArticleView",
        };
        let msg = err.to_string();
        assert!(msg.contains("blog::Article") && msg.contains("blog::ArticleView"));
        assert!(msg.contains("colour"), "Display must include the member name");
    }

    #[test]
    fn request_round_trips_through_value() {
        let value = Value::object(Request::get().query("id", "5"));
        let request = value.downcast_ref::<Request>().map(|r| r.query.get("id").cloned());
        assert_eq!(request, Some(Some("5".to_owned())));
    }
}
