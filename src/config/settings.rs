use crate::utils::error::{FormsError, Result};
use crate::utils::validation::{
    validate_class_name, validate_non_empty_string, validate_positive_number, validate_range,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Everything the controller needs to know about the page's conventions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub forms: FormsSection,
    pub classes: ClassNames,
    pub messages: Messages,
    pub banner: BannerTiming,
    pub contact: ContactSection,
    pub http: HttpSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsSection {
    pub newsletter_form_id: String,
    /// Forms carrying this class also get the native validation overlay.
    pub native_validation_class: String,
}

impl Default for FormsSection {
    fn default() -> Self {
        Self {
            newsletter_form_id: "newsletter-form".to_string(),
            native_validation_class: "needs-validation".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub invalid: String,
    pub valid: String,
    pub feedback: String,
    pub validated: String,
    pub alert: String,
    pub show: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            invalid: "is-invalid".to_string(),
            valid: "is-valid".to_string(),
            feedback: "invalid-feedback".to_string(),
            validated: "was-validated".to_string(),
            alert: "alert".to_string(),
            show: "show".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub required: String,
    pub invalid_email: String,
    pub submitting: String,
    pub contact_success: String,
    pub contact_failure: String,
    pub newsletter_success: String,
    pub newsletter_failure: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required: "This field is required".to_string(),
            invalid_email: "Please enter a valid email address".to_string(),
            submitting: "Submitting...".to_string(),
            contact_success: "Your message has been sent successfully!".to_string(),
            contact_failure: "There was a problem sending your message. Please try again."
                .to_string(),
            newsletter_success: "Thank you for subscribing to our newsletter!".to_string(),
            newsletter_failure: "There was a problem with your subscription. Please try again."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerTiming {
    pub visible_ms: u64,
    pub fade_ms: u64,
}

impl Default for BannerTiming {
    fn default() -> Self {
        Self {
            visible_ms: 5000,
            fade_ms: 150,
        }
    }
}

impl BannerTiming {
    pub fn visible(&self) -> Duration {
        Duration::from_millis(self.visible_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSection {
    /// When false (the default) a non-2xx reply to the contact form still counts as sent.
    pub http_errors_are_failures: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub requested_with: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            requested_with: "XMLHttpRequest".to_string(),
            timeout_seconds: None,
        }
    }
}

impl FormSettings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FormsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// Replaces `${VAR_NAME}` with the environment value; unknown variables are an error.
pub(crate) fn substitute_env_vars(content: &str) -> Result<String> {
    use regex::Regex;
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
        FormsError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: format!("Invalid substitution pattern: {}", e),
        }
    })?;

    let mut missing = None;
    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        match std::env::var(var_name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| var_name.to_string());
                caps[0].to_string()
            }
        }
    });

    match missing {
        Some(field) => Err(FormsError::MissingConfigError { field }),
        None => Ok(result.into_owned()),
    }
}

impl Validate for FormSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("forms.newsletter_form_id", &self.forms.newsletter_form_id)?;
        validate_class_name(
            "forms.native_validation_class",
            &self.forms.native_validation_class,
        )?;

        for (field, value) in [
            ("classes.invalid", &self.classes.invalid),
            ("classes.valid", &self.classes.valid),
            ("classes.feedback", &self.classes.feedback),
            ("classes.validated", &self.classes.validated),
            ("classes.alert", &self.classes.alert),
            ("classes.show", &self.classes.show),
        ] {
            validate_class_name(field, value)?;
        }

        for (field, value) in [
            ("messages.required", &self.messages.required),
            ("messages.invalid_email", &self.messages.invalid_email),
            ("messages.contact_success", &self.messages.contact_success),
            ("messages.contact_failure", &self.messages.contact_failure),
            ("messages.newsletter_success", &self.messages.newsletter_success),
            ("messages.newsletter_failure", &self.messages.newsletter_failure),
        ] {
            validate_non_empty_string(field, value)?;
        }

        validate_range("banner.visible_ms", self.banner.visible_ms, 0, 600_000)?;
        validate_range("banner.fade_ms", self.banner.fade_ms, 0, 10_000)?;
        validate_non_empty_string("http.requested_with", &self.http.requested_with)?;
        if let Some(timeout) = self.http.timeout_seconds {
            validate_positive_number("http.timeout_seconds", timeout, 1)?;
        }

        Ok(())
    }
}
