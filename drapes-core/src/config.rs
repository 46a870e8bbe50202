//! Reserved names used by the controller wrappers.

use serde::{Deserialize, Serialize};

/// Names the wrappers treat specially.
///
/// Every wrapper carries its own copy; the defaults match the conventions
/// controllers are normally written against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct DrapesConfig {
    /// A controller whose first parameter has this name is an HTTP entry
    /// point and may draw arguments from the query string.
    pub request_param: String,

    /// Query key that switches the response format; never bound as an argument.
    pub json_key: String,

    /// Submission field naming which of several forms was posted.
    pub form_discriminator: String,

    /// Parameter a valid-form handler receives the form under.
    pub form_slot: String,

    /// Parameter the original controller receives a rejected single form under.
    pub invalid_form_slot: String,

    /// Member of the first argument holding the acting user.
    pub user_member: String,
}

impl Default for DrapesConfig {
    fn default() -> Self {
        Self {
            request_param: "request".to_owned(),
            json_key: "json".to_owned(),
            form_discriminator: "drape_form_name".to_owned(),
            form_slot: "form".to_owned(),
            invalid_form_slot: "invalid_form".to_owned(),
            user_member: "user".to_owned(),
        }
    }
}

impl DrapesConfig {
    /// Defaults, overridden by `DRAPES_JSON_KEY` and
    /// `DRAPES_FORM_DISCRIMINATOR` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("DRAPES_JSON_KEY") {
            config.json_key = key;
        }
        if let Ok(field) = std::env::var("DRAPES_FORM_DISCRIMINATOR") {
            config.form_discriminator = field;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_controller_conventions() {
        let config = DrapesConfig::default();
        assert_eq!(config.request_param, "request");
        assert_eq!(config.json_key, "json");
        assert_eq!(config.form_discriminator, "drape_form_name");
        assert_eq!(config.form_slot, "form");
        assert_eq!(config.invalid_form_slot, "invalid_form");
        assert_eq!(config.user_member, "user");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: DrapesConfig = match serde_json::from_str(r#"{"json_key": "format"}"#) {
            Ok(c) => c,
            Err(e) => panic!("config must deserialize: {e}"),
        };
        assert_eq!(config.json_key, "format");
        assert_eq!(config.form_slot, "form", "unspecified fields must keep defaults");
    }

    #[test]
    fn environment_overrides_json_key_and_discriminator() {
        std::env::set_var("DRAPES_JSON_KEY", "format");
        std::env::set_var("DRAPES_FORM_DISCRIMINATOR", "which_form");
        let config = DrapesConfig::from_env();
        std::env::remove_var("DRAPES_JSON_KEY");
        std::env::remove_var("DRAPES_FORM_DISCRIMINATOR");

        assert_eq!(config.json_key, "format");
        assert_eq!(config.form_discriminator, "which_form");
        assert_eq!(config.form_slot, "form", "other names keep their defaults");

        let unset = DrapesConfig::from_env();
        assert_eq!(unset, DrapesConfig::default());
    }
}
