//! Field validation.
//!
//! Rules run in a fixed order and the first failure wins:
//! required, email, minimum length, maximum length.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{FieldId, FormField, FormSchema};
use crate::value::{FieldValue, FieldValues};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

pub const INVALID_EMAIL: &str = "Please enter a valid email address";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(reason) => Some(reason),
        }
    }
}

/// Validation failure of one field, as reported on submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    pub field_id: FieldId,
    pub message: String,
}

/// Check `value` against `field`. `None` means the field has no value yet.
pub fn validate(field: &FormField, value: Option<&FieldValue>) -> ValidationResult {
    let present = value.filter(|v| !v.is_empty());

    if field.required && present.is_none() {
        return ValidationResult::Invalid(format!("{} is required", field.label));
    }

    let (Some(value), Some(rules)) = (present, field.validation.as_ref()) else {
        return ValidationResult::Valid;
    };

    if rules.email && !EMAIL.is_match(&value.to_string()) {
        return ValidationResult::Invalid(INVALID_EMAIL.to_string());
    }

    if let Some(len) = value.len() {
        if let Some(min) = rules.min_length.filter(|&min| len < min) {
            return ValidationResult::Invalid(format!(
                "{} must be at least {min} characters",
                field.label
            ));
        }
        if let Some(max) = rules.max_length.filter(|&max| len > max) {
            return ValidationResult::Invalid(format!(
                "{} must be no more than {max} characters",
                field.label
            ));
        }
    }

    ValidationResult::Valid
}

/// Validate every user-entered field of `schema`, in field order. Derived
/// fields are skipped.
pub fn validate_submission(schema: &FormSchema, values: &FieldValues) -> Vec<FieldIssue> {
    schema
        .fields
        .iter()
        .filter(|field| !field.is_derived)
        .filter_map(|field| match validate(field, values.get(&field.id)) {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(message) => Some(FieldIssue {
                field_id: field.id,
                message,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldSpec, FieldType, ValidationRules};
    use chrono::Utc;

    fn field(spec: FieldSpec) -> FormField {
        spec.into_field(FieldId::new())
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::text(s)
    }

    #[test]
    fn required_rejects_missing_and_empty_values() {
        let f = field(FieldSpec::new(FieldType::Text).with_label("Name").required(true));

        let expected = ValidationResult::Invalid("Name is required".into());
        assert_eq!(validate(&f, None), expected);
        assert_eq!(validate(&f, Some(&text(""))), expected);
        assert_eq!(validate(&f, Some(&FieldValue::Selection(vec![]))), expected);
        assert!(validate(&f, Some(&text("Ada"))).is_valid());
    }

    #[test]
    fn optional_empty_value_skips_other_rules() {
        let f = field(FieldSpec::new(FieldType::Text).with_validation(ValidationRules {
            min_length: Some(3),
            email: true,
            ..ValidationRules::default()
        }));
        assert!(validate(&f, Some(&text(""))).is_valid());
        assert!(validate(&f, None).is_valid());
    }

    #[test]
    fn email_rule() {
        let f = field(FieldSpec::new(FieldType::Text).with_validation(ValidationRules {
            email: true,
            ..ValidationRules::default()
        }));
        assert!(validate(&f, Some(&text("a@b.com"))).is_valid());
        assert_eq!(
            validate(&f, Some(&text("not-an-email"))).reason(),
            Some(INVALID_EMAIL)
        );
        assert!(!validate(&f, Some(&text("a@b"))).is_valid());
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let f = field(
            FieldSpec::new(FieldType::Textarea)
                .with_label("Bio")
                .with_validation(ValidationRules {
                    min_length: Some(2),
                    max_length: Some(4),
                    ..ValidationRules::default()
                }),
        );
        assert_eq!(
            validate(&f, Some(&text("a"))).reason(),
            Some("Bio must be at least 2 characters")
        );
        assert!(validate(&f, Some(&text("ab"))).is_valid());
        assert!(validate(&f, Some(&text("abcd"))).is_valid());
        assert_eq!(
            validate(&f, Some(&text("abcde"))).reason(),
            Some("Bio must be no more than 4 characters")
        );
    }

    #[test]
    fn required_wins_over_later_rules() {
        let f = field(
            FieldSpec::new(FieldType::Text)
                .with_label("Mail")
                .required(true)
                .with_validation(ValidationRules {
                    email: true,
                    min_length: Some(50),
                    ..ValidationRules::default()
                }),
        );
        assert_eq!(validate(&f, None).reason(), Some("Mail is required"));
        // email is checked before length
        assert_eq!(validate(&f, Some(&text("x"))).reason(), Some(INVALID_EMAIL));
    }

    #[test]
    fn selection_length_counts_checked_options() {
        let f = field(
            FieldSpec::new(FieldType::Checkbox)
                .with_label("Toppings")
                .with_validation(ValidationRules {
                    max_length: Some(1),
                    ..ValidationRules::default()
                }),
        );
        let two = FieldValue::Selection(vec!["Option 1".into(), "Option 2".into()]);
        assert!(!validate(&f, Some(&two)).is_valid());
    }

    #[test]
    fn numbers_skip_length_rules() {
        let f = field(FieldSpec::new(FieldType::Number).with_validation(ValidationRules {
            min_length: Some(5),
            ..ValidationRules::default()
        }));
        assert!(validate(&f, Some(&FieldValue::Number(1.0))).is_valid());
    }

    #[test]
    fn submission_skips_derived_fields_and_keeps_field_order() {
        let mut schema = FormSchema::new("Order", Utc::now());
        let qty = field(FieldSpec::new(FieldType::Number).with_label("Qty").required(true));
        let total = field(
            FieldSpec::new(FieldType::Number)
                .with_label("Total")
                .required(true)
                .derived(vec![qty.id], "qty*price"),
        );
        let name = field(FieldSpec::new(FieldType::Text).with_label("Name").required(true));
        schema.fields = vec![qty.clone(), total, name.clone()];

        let issues = validate_submission(&schema, &FieldValues::new());
        let ids: Vec<_> = issues.iter().map(|i| i.field_id).collect();
        assert_eq!(ids, vec![qty.id, name.id]);

        let mut values = FieldValues::new();
        values.insert(qty.id, text("2"));
        values.insert(name.id, text("Ada"));
        assert!(validate_submission(&schema, &values).is_empty());
    }
}
