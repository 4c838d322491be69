//! Form-state store that input fields bind to

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::models::ServerError;

/// Value, error and touched flag of one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub value: String,
    pub error: Option<String>,
    pub touched: bool,
}

/// Collaborator that owns field state and receives input events.
///
/// Renderers read through `field` and forward events; they never store values.
pub trait FieldBinding {
    fn field(&self, name: &str) -> FieldState;

    fn handle_change(&mut self, name: &str, value: String);

    fn handle_blur(&mut self, name: &str);
}

/// Returns an error message for an invalid value
pub type Validator = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Field states in declaration order, with optional per-field validators
#[derive(Default)]
pub struct FormState {
    fields: Vec<(String, FieldState)>,
    validators: HashMap<String, Validator>,
}

impl FormState {
    pub fn new(names: &[&str]) -> Self {
        Self {
            fields: names
                .iter()
                .map(|name| (name.to_string(), FieldState::default()))
                .collect(),
            validators: HashMap::new(),
        }
    }

    pub fn with_validator(mut self, name: &str, validator: Validator) -> Self {
        self.validators.insert(name.to_string(), validator);
        self
    }

    pub fn with_value(mut self, name: &str, value: &str) -> Self {
        self.set_value(name, value.to_string());
        self
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut FieldState> {
        self.fields
            .iter_mut()
            .find(|(field, _)| field == name)
            .map(|(_, state)| state)
    }

    fn run_validator(&self, name: &str, value: &str) -> Option<String> {
        self.validators.get(name).and_then(|validate| validate(value))
    }

    /// Set a value and re-run that field's validator
    pub fn set_value(&mut self, name: &str, value: String) {
        let error = self.run_validator(name, &value);
        if let Some(field) = self.get_mut(name) {
            field.value = value;
            field.error = error;
        }
    }

    pub fn set_touched(&mut self, name: &str, touched: bool) {
        if let Some(field) = self.get_mut(name) {
            field.touched = touched;
        }
    }

    /// Validate every field and mark all of them touched, as a submit does
    pub fn validate_all(&mut self) -> bool {
        let errors: Vec<Option<String>> = self
            .fields
            .iter()
            .map(|(name, state)| self.run_validator(name, &state.value))
            .collect();

        let mut all_valid = true;
        for ((_, state), error) in self.fields.iter_mut().zip(errors) {
            if error.is_some() {
                all_valid = false;
            }
            state.error = error;
            state.touched = true;
        }
        all_valid
    }

    /// Copy field-keyed server validation messages onto the matching fields.
    ///
    /// Returns how many fields received an error.
    pub fn apply_server_errors(&mut self, error: &ServerError) -> usize {
        let mut applied = 0;
        for (name, state) in self.fields.iter_mut() {
            let messages = error.field_messages(name);
            if !messages.is_empty() {
                state.error = Some(messages.join("; "));
                state.touched = true;
                applied += 1;
            }
        }
        applied
    }

    /// Field values as a JSON object suitable for a request body
    pub fn values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(name, state)| (name.clone(), Value::String(state.value.clone())))
            .collect()
    }

    pub fn reset(&mut self) {
        for (_, state) in self.fields.iter_mut() {
            *state = FieldState::default();
        }
    }
}

impl FieldBinding for FormState {
    fn field(&self, name: &str) -> FieldState {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, state)| state.clone())
            .unwrap_or_default()
    }

    fn handle_change(&mut self, name: &str, value: String) {
        self.set_value(name, value);
    }

    fn handle_blur(&mut self, name: &str) {
        self.set_touched(name, true);
    }
}

/// Common validators
pub mod validators {
    use super::Validator;

    pub fn required(message: &str) -> Validator {
        let message = message.to_string();
        Box::new(move |value: &str| {
            if value.trim().is_empty() {
                Some(message.clone())
            } else {
                None
            }
        })
    }

    pub fn min_length(length: usize) -> Validator {
        Box::new(move |value: &str| {
            if !value.is_empty() && value.chars().count() < length {
                Some(format!("Must be at least {} characters", length))
            } else {
                None
            }
        })
    }

    /// Empty values pass; use `required` to reject them
    pub fn date() -> Validator {
        Box::new(|value: &str| {
            if value.is_empty() {
                return None;
            }
            match chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                Ok(_) => None,
                Err(_) => Some("Invalid date format (YYYY-MM-DD)".to_string()),
            }
        })
    }
}
