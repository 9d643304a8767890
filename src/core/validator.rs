use crate::config::settings::FormSettings;
use crate::core::{FieldError, FieldKind, NewElement, NodeId, Page, Query};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s\x{FEFF}@]+@[^\s\x{FEFF}@]+\.[^\s\x{FEFF}@]+$")
        .expect("email pattern is a valid regex")
});

/// Whitespace as browsers trim it, which includes the byte order mark.
fn trim_blank(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Pure check of a single value against a field's constraints.
pub fn check_value(value: &str, required: bool, kind: &FieldKind) -> Result<(), FieldError> {
    let value = trim_blank(value);

    if required && value.is_empty() {
        return Err(FieldError::RequiredFieldMissing);
    }

    if *kind == FieldKind::Email && !value.is_empty() && !EMAIL_PATTERN.is_match(value) {
        return Err(FieldError::InvalidEmailFormat);
    }

    Ok(())
}

/// Validates one input and reflects the result on the page: validity classes plus an
/// inline feedback element next to the field.
pub struct FieldValidator<'a, P: Page> {
    page: &'a P,
    settings: &'a FormSettings,
}

impl<'a, P: Page> FieldValidator<'a, P> {
    pub fn new(page: &'a P, settings: &'a FormSettings) -> Self {
        Self { page, settings }
    }

    pub fn validate(&self, field: NodeId) -> bool {
        self.check(field).is_ok()
    }

    pub fn check(&self, field: NodeId) -> Result<(), FieldError> {
        self.clear_feedback(field);

        let required = self.page.has_attribute(field, "required");
        let kind = FieldKind::from_type_attr(self.page.attribute(field, "type").as_deref());
        let result = check_value(&self.page.value(field), required, &kind);

        let classes = &self.settings.classes;
        match result {
            Err(error) => {
                tracing::debug!(
                    "Field {:?} ({}) failed validation: {}",
                    field,
                    self.page.attribute(field, "name").unwrap_or_default(),
                    error
                );
                self.page.add_class(field, &classes.invalid);
                if let Some(parent) = self.page.parent(field) {
                    let feedback = self.page.create_element(
                        NewElement::new("div")
                            .class(classes.feedback.as_str())
                            .text(self.message_for(error)),
                    );
                    self.page.append_child(parent, feedback);
                }
            }
            Ok(()) => {
                self.page.remove_class(field, &classes.invalid);
                self.page.add_class(field, &classes.valid);
            }
        }

        result
    }

    /// Runs every input and textarea of the form; all of them get marked, even after a failure.
    pub fn validate_all(&self, form: NodeId) -> bool {
        self.page
            .query_all(form, Query::FormControls)
            .into_iter()
            .fold(true, |all_valid, field| self.validate(field) && all_valid)
    }

    pub fn message_for(&self, error: FieldError) -> &str {
        match error {
            FieldError::RequiredFieldMissing => &self.settings.messages.required,
            FieldError::InvalidEmailFormat => &self.settings.messages.invalid_email,
        }
    }

    fn clear_feedback(&self, field: NodeId) {
        self.page.remove_class(field, &self.settings.classes.invalid);
        if let Some(parent) = self.page.parent(field) {
            if let Some(existing) = self
                .page
                .query_first(parent, Query::Class(&self.settings.classes.feedback))
            {
                self.page.remove(existing);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field() {
        let text = FieldKind::Other("text".to_string());
        assert_eq!(check_value("", true, &text), Err(FieldError::RequiredFieldMissing));
        assert_eq!(check_value("   \t", true, &text), Err(FieldError::RequiredFieldMissing));
        assert_eq!(check_value(" Ada ", true, &text), Ok(()));
        assert_eq!(check_value("", false, &text), Ok(()));
    }

    #[test]
    fn test_email_format() {
        let email = FieldKind::Email;
        assert_eq!(check_value("user@example.com", false, &email), Ok(()));
        assert_eq!(check_value("  user@example.com  ", true, &email), Ok(()));
        assert_eq!(
            check_value("not-an-email", false, &email),
            Err(FieldError::InvalidEmailFormat)
        );
        assert_eq!(check_value("user@", false, &email), Err(FieldError::InvalidEmailFormat));
        assert_eq!(check_value("user.com", false, &email), Err(FieldError::InvalidEmailFormat));
        assert_eq!(
            check_value("us er@example.com", false, &email),
            Err(FieldError::InvalidEmailFormat)
        );
        assert_eq!(check_value("", false, &email), Ok(()));
        assert_eq!(check_value("", true, &email), Err(FieldError::RequiredFieldMissing));
    }

    #[test]
    fn test_byte_order_mark_counts_as_blank() {
        let text = FieldKind::Other("text".to_string());
        assert_eq!(check_value("\u{FEFF}", true, &text), Err(FieldError::RequiredFieldMissing));
        assert_eq!(check_value("\u{FEFF}Ada\u{FEFF}", true, &text), Ok(()));

        let email = FieldKind::Email;
        assert_eq!(
            check_value("a\u{FEFF}b@example.com", true, &email),
            Err(FieldError::InvalidEmailFormat)
        );
        assert_eq!(check_value("\u{FEFF}ab@example.com", true, &email), Ok(()));
    }

    #[test]
    fn test_email_rules_only_apply_to_email_fields() {
        let text = FieldKind::Other("text".to_string());
        assert_eq!(check_value("not-an-email", true, &text), Ok(()));
    }
}
