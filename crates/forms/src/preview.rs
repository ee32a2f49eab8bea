//! Interactive preview of a form: entered values, derived values and the
//! errors of the last submit.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::derived::{evaluate_all, DerivedValue, Evaluator, OperatorEvaluator};
use crate::model::{FieldId, FieldType, FormSchema};
use crate::validation::{validate_submission, FieldIssue};
use crate::value::{FieldValue, FieldValues};

/// Result of a successful submit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Submission {
    pub values: FieldValues,
    /// Derived values in display form (`"Error"` for failed computations).
    pub derived: HashMap<FieldId, String>,
}

pub struct PreviewSession<E = OperatorEvaluator> {
    schema: FormSchema,
    evaluator: E,
    values: FieldValues,
    derived: HashMap<FieldId, DerivedValue>,
    errors: Vec<FieldIssue>,
}

impl PreviewSession<OperatorEvaluator> {
    pub fn new(schema: &FormSchema) -> Self {
        Self::with_evaluator(schema, OperatorEvaluator)
    }
}

impl<E: Evaluator> PreviewSession<E> {
    /// Start a preview of `schema`. Default values are applied once here.
    pub fn with_evaluator(schema: &FormSchema, evaluator: E) -> Self {
        let values = schema
            .fields
            .iter()
            .filter_map(|field| match field.default_value.as_deref() {
                Some(default) if !default.is_empty() => {
                    Some((field.id, FieldValue::text(default)))
                }
                _ if field.field_type == FieldType::Checkbox => {
                    Some((field.id, FieldValue::Selection(Vec::new())))
                }
                _ => None,
            })
            .collect();

        let mut session = Self {
            schema: schema.clone(),
            evaluator,
            values,
            derived: HashMap::new(),
            errors: Vec::new(),
        };
        session.recompute();
        session
    }

    fn recompute(&mut self) {
        self.derived = evaluate_all(&self.evaluator, &self.schema, &self.values);
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn value(&self, id: FieldId) -> Option<&FieldValue> {
        self.values.get(&id)
    }

    pub fn derived_value(&self, id: FieldId) -> Option<&DerivedValue> {
        self.derived.get(&id)
    }

    /// What the field shows: its computed value for derived fields, the
    /// entered value otherwise, empty text if there is none.
    pub fn display_value(&self, id: FieldId) -> String {
        match self.derived.get(&id) {
            Some(derived) => derived.to_string(),
            None => self
                .values
                .get(&id)
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }

    /// Enter `value` for field `id`. Derived and unknown fields are not
    /// editable; returns whether the value was taken.
    pub fn set_value(&mut self, id: FieldId, value: impl Into<FieldValue>) -> bool {
        match self.schema.field(id) {
            Some(field) if !field.is_derived => {}
            _ => return false,
        }
        self.values.insert(id, value.into());
        self.errors.retain(|issue| issue.field_id != id);
        self.recompute();
        true
    }

    /// Check or uncheck `option` of a checkbox field.
    pub fn toggle_option(&mut self, id: FieldId, option: &str, checked: bool) -> bool {
        let mut selected = match self.values.get(&id) {
            Some(FieldValue::Selection(items)) => items.clone(),
            _ => Vec::new(),
        };
        if checked {
            if !selected.iter().any(|o| o == option) {
                selected.push(option.to_string());
            }
        } else {
            selected.retain(|o| o != option);
        }
        self.set_value(id, FieldValue::Selection(selected))
    }

    pub fn errors(&self) -> &[FieldIssue] {
        &self.errors
    }

    pub fn error(&self, id: FieldId) -> Option<&str> {
        self.errors
            .iter()
            .find(|issue| issue.field_id == id)
            .map(|issue| issue.message.as_str())
    }

    /// Validate all user-entered fields. On failure the errors are kept on
    /// the session and returned.
    pub fn submit(&mut self) -> Result<Submission, Vec<FieldIssue>> {
        self.errors = validate_submission(&self.schema, &self.values);
        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }

        let submission = Submission {
            values: self.values.clone(),
            derived: self
                .derived
                .iter()
                .map(|(id, value)| (*id, value.to_string()))
                .collect(),
        };
        info!(
            form = %self.schema.id,
            "form submitted: {}",
            serde_json::to_string(&submission).unwrap_or_default()
        );
        Ok(submission)
    }
}
