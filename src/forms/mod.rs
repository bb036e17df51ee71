// Form binding, validation and redisplay state
pub mod user;
pub mod word;

use axum::http::StatusCode;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

pub use user::{EditUserForm, LoginForm, RegisterUserForm, SearchUserForm};
pub use word::{DeleteForm, WordForm};

/// Field name → messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

/// Runs the derive-based constraints of a form.
pub fn validate_form<F: Validate>(form: &F) -> FormErrors {
    match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(errors) => FormErrors::from(&errors),
    }
}

/// What a view needs to (re)display a form.
#[derive(Clone)]
pub struct FormState<F> {
    pub data: F,
    pub errors: FormErrors,
    pub submitted: bool,
}

impl<F> FormState<F> {
    pub fn fresh(data: F) -> Self {
        Self {
            data,
            errors: FormErrors::new(),
            submitted: false,
        }
    }

    pub fn bound(data: F, errors: FormErrors) -> Self {
        Self {
            data,
            errors,
            submitted: true,
        }
    }

    /// 422 for a submitted form that failed validation, 200 otherwise.
    pub fn status(&self) -> StatusCode {
        if self.submitted && !self.errors.is_empty() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::OK
        }
    }
}

/// Either the form to show again, or the result of a successful submission.
pub enum FormOutcome<F, T> {
    Render(FormState<F>),
    Success(T),
}
