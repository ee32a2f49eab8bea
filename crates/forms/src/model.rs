//! Form schema data model.
//!
//! A [`FormSchema`] is a named, ordered list of [`FormField`]s. The serde
//! representation is the persisted one: camelCase keys, ids as UUID strings
//! and timestamps as ISO-8601 strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Fresh random (v4) id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

id_type!(
    /// Identifier of a [`FormSchema`].
    FormId
);
id_type!(
    /// Identifier of a [`FormField`], unique within its schema.
    FieldId
);

/// Closed set of input kinds a field can have.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldType {
    /// Whether fields of this type carry an option list.
    pub fn has_options(self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }

    /// Human readable name, e.g. `"Textarea"`.
    pub fn title(self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Textarea => "Textarea",
            FieldType::Select => "Select",
            FieldType::Radio => "Radio",
            FieldType::Checkbox => "Checkbox",
            FieldType::Date => "Date",
        }
    }

    /// Options a freshly added (or retyped) field of this type starts with.
    pub fn seed_options(self) -> Option<Vec<String>> {
        self.has_options()
            .then(|| vec!["Option 1".to_string(), "Option 2".to_string()])
    }
}

/// Label for the next option appended to `options`.
pub fn next_option_label(options: &[String]) -> String {
    format!("Option {}", options.len() + 1)
}

/// Optional rule set checked by the validator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub email: bool,
    /// Stored but never evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Operands and formula of a derived field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedConfig {
    pub parent_fields: Vec<FieldId>,
    pub formula: String,
}

impl DerivedConfig {
    pub fn new(parent_fields: Vec<FieldId>, formula: impl Into<String>) -> Self {
        Self {
            parent_fields,
            formula: formula.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_config: Option<DerivedConfig>,
}

impl FormField {
    /// The derived config, only when the field is actually marked derived.
    pub fn derived(&self) -> Option<&DerivedConfig> {
        if self.is_derived {
            self.derived_config.as_ref()
        } else {
            None
        }
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }
}

/// Everything needed to add a field, minus the id the store assigns.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
    pub default_value: Option<String>,
    pub options: Option<Vec<String>>,
    pub validation: Option<ValidationRules>,
    pub is_derived: bool,
    pub derived_config: Option<DerivedConfig>,
}

impl FieldSpec {
    /// Spec as the builder UI creates it: `"<Type> Field"`, optional, and
    /// seeded with two options for option-bearing types.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            label: format!("{} Field", field_type.title()),
            required: false,
            default_value: None,
            options: field_type.seed_options(),
            validation: None,
            is_derived: false,
            derived_config: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn without_options(mut self) -> Self {
        self.options = None;
        self
    }

    pub fn with_validation(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }

    /// Marks the field as computed from `parents` using `formula`.
    pub fn derived(mut self, parents: Vec<FieldId>, formula: impl Into<String>) -> Self {
        self.is_derived = true;
        self.derived_config = Some(DerivedConfig::new(parents, formula));
        self
    }

    pub fn into_field(self, id: FieldId) -> FormField {
        FormField {
            id,
            field_type: self.field_type,
            label: self.label,
            required: self.required,
            default_value: self.default_value,
            options: self.options,
            validation: self.validation,
            is_derived: self.is_derived,
            derived_config: self.derived_config,
        }
    }
}

/// Partial update merged onto an existing field. `None` leaves an attribute
/// alone; for nullable attributes `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldUpdate {
    pub field_type: Option<FieldType>,
    pub label: Option<String>,
    pub required: Option<bool>,
    pub default_value: Option<Option<String>>,
    pub options: Option<Option<Vec<String>>>,
    pub validation: Option<Option<ValidationRules>>,
    pub is_derived: Option<bool>,
    pub derived_config: Option<Option<DerivedConfig>>,
}

impl FieldUpdate {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Type change as done in the field editor: options are reseeded for
    /// option-bearing types and dropped otherwise.
    pub fn retype(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            options: Some(field_type.seed_options()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Shallow merge; set attributes win.
    pub fn apply_to(self, field: &mut FormField) {
        if let Some(field_type) = self.field_type {
            field.field_type = field_type;
        }
        if let Some(label) = self.label {
            field.label = label;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(default_value) = self.default_value {
            field.default_value = default_value;
        }
        if let Some(options) = self.options {
            field.options = options;
        }
        if let Some(validation) = self.validation {
            field.validation = validation;
        }
        if let Some(is_derived) = self.is_derived {
            field.is_derived = is_derived;
        }
        if let Some(derived_config) = self.derived_config {
            field.derived_config = derived_config;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: FormId,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSchema {
    /// Empty schema with both timestamps set to `now`.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: FormId::new(),
            name: name.into(),
            fields: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn field(&self, id: FieldId) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn position(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn derived_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.derived().is_some())
    }

    /// Refresh `updated_at`; never moves it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn field_spec_seeds_options_for_choice_types() {
        for field_type in FieldType::iter() {
            let spec = FieldSpec::new(field_type);
            assert_eq!(spec.options.is_some(), field_type.has_options());
            assert!(!spec.required);
        }
        let spec = FieldSpec::new(FieldType::Radio);
        assert_eq!(spec.label, "Radio Field");
        assert_eq!(
            spec.options,
            Some(vec!["Option 1".to_string(), "Option 2".to_string()])
        );
    }

    #[test]
    fn field_type_round_trips_through_strings() {
        assert_eq!(FieldType::Textarea.to_string(), "textarea");
        assert_eq!("checkbox".parse::<FieldType>().ok(), Some(FieldType::Checkbox));
        assert!("slider".parse::<FieldType>().is_err());
    }

    #[test]
    fn update_merges_only_set_attributes() {
        let mut field = FieldSpec::new(FieldType::Select)
            .required(true)
            .with_default("Option 2")
            .into_field(FieldId::new());
        let before = field.clone();

        FieldUpdate::label("Country").apply_to(&mut field);

        assert_eq!(field.label, "Country");
        assert_eq!(field.id, before.id);
        assert_eq!(field.required, before.required);
        assert_eq!(field.options, before.options);
        assert_eq!(field.default_value, before.default_value);
    }

    #[test]
    fn update_can_clear_nullable_attributes() {
        let mut field = FieldSpec::new(FieldType::Text)
            .with_default("x")
            .into_field(FieldId::new());

        FieldUpdate {
            default_value: Some(None),
            ..FieldUpdate::default()
        }
        .apply_to(&mut field);

        assert_eq!(field.default_value, None);
    }

    #[test]
    fn retype_reseeds_or_drops_options() {
        let mut field = FieldSpec::new(FieldType::Checkbox)
            .with_options(["a", "b", "c"])
            .into_field(FieldId::new());

        FieldUpdate::retype(FieldType::Number).apply_to(&mut field);
        assert_eq!(field.field_type, FieldType::Number);
        assert_eq!(field.options, None);

        FieldUpdate::retype(FieldType::Select).apply_to(&mut field);
        assert_eq!(field.options().len(), 2);
    }

    #[test]
    fn next_option_label_counts_from_one() {
        assert_eq!(next_option_label(&[]), "Option 1");
        let options = vec!["Red".to_string(), "Blue".to_string()];
        assert_eq!(next_option_label(&options), "Option 3");
    }

    #[test]
    fn derived_requires_flag() {
        let parent = FieldId::new();
        let mut field = FieldSpec::new(FieldType::Number)
            .derived(vec![parent], "a+b")
            .into_field(FieldId::new());
        assert!(field.derived().is_some());

        field.is_derived = false;
        assert!(field.derived().is_none());
    }

    #[test]
    fn schema_serializes_with_camel_case_keys() {
        let now = Utc::now();
        let mut schema = FormSchema::new("Signup", now);
        schema.fields.push(
            FieldSpec::new(FieldType::Text)
                .with_validation(ValidationRules {
                    min_length: Some(3),
                    ..ValidationRules::default()
                })
                .into_field(FieldId::new()),
        );

        let json = serde_json::to_value(&schema).expect("serialize");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        let field = &json["fields"][0];
        assert_eq!(field["type"], "text");
        assert_eq!(field["validation"]["minLength"], 3);
        assert_eq!(field["isDerived"], false);

        let back: FormSchema = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, schema);
    }

    #[test]
    fn schema_accepts_records_without_optional_keys() {
        let json = r#"{
            "id": "6f1c1e4e-8d1b-4d0e-9a57-0c2b1f7d2a10",
            "name": "Legacy",
            "fields": [
                {"id": "0e5d9a3c-4b8f-4f2e-8f71-2a6f0f5b9c11", "type": "date", "label": "Birthday", "required": false}
            ],
            "createdAt": "2024-03-15T12:00:00.000Z",
            "updatedAt": "2024-03-15T12:00:00.000Z"
        }"#;
        let schema: FormSchema = serde_json::from_str(json).expect("deserialize");
        assert_eq!(schema.fields[0].field_type, FieldType::Date);
        assert!(!schema.fields[0].is_derived);
        assert_eq!(schema.created_at, schema.updated_at);
    }

    #[test]
    fn touch_never_moves_backwards() {
        let now = Utc::now();
        let mut schema = FormSchema::new("f", now);
        schema.touch(now - chrono::Duration::seconds(5));
        assert_eq!(schema.updated_at, now);
        let later = now + chrono::Duration::seconds(5);
        schema.touch(later);
        assert_eq!(schema.updated_at, later);
    }
}
