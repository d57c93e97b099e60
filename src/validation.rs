//! Declarative field constraints.
//!
//! A payload type lists, per field, the [`Constraint`]s it must satisfy and
//! hands them to a [`Validator`], which collects every violation as a
//! [`BindingError`] instead of stopping at the first one.

use chrono::NaiveDate;

use crate::error::{BindingError, BindingErrors};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constraint {
    Required,
    NotBlank,
    MaxLength(usize),
}

/// Borrowed view of a field value, as seen by the constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Missing,
    Text(&'a str),
    Date(NaiveDate),
    Integer(i32),
}

impl FieldValue<'_> {
    fn render(&self) -> Option<String> {
        match self {
            FieldValue::Missing => None,
            FieldValue::Text(text) => Some(escape_controls(text)),
            FieldValue::Date(date) => Some(date.to_string()),
            FieldValue::Integer(value) => Some(value.to_string()),
        }
    }
}

/// Control characters are echoed escaped so the value can travel in a header.
fn escape_controls(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::Text)
    }
}

impl From<Option<NaiveDate>> for FieldValue<'_> {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::Date)
    }
}

impl From<Option<i32>> for FieldValue<'_> {
    fn from(value: Option<i32>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::Integer)
    }
}

impl Constraint {
    /// Returns the violation message, or `None` when `value` satisfies the
    /// constraint. Only `Required` rejects a missing value.
    pub fn check(&self, value: &FieldValue<'_>) -> Option<String> {
        match (self, value) {
            (Constraint::Required, FieldValue::Missing) => Some("must not be null".to_string()),
            (Constraint::NotBlank, FieldValue::Text(text)) if text.trim().is_empty() => {
                Some("must not be blank".to_string())
            }
            (Constraint::MaxLength(max), FieldValue::Text(text)) if text.chars().count() > *max => {
                Some(format!("size must be between 0 and {}", max))
            }
            _ => None,
        }
    }
}

pub struct Validator {
    object_name: &'static str,
    errors: BindingErrors,
}

impl Validator {
    pub fn new(object_name: &'static str) -> Self {
        Self {
            object_name,
            errors: BindingErrors::default(),
        }
    }

    pub fn field(
        mut self,
        field_name: &str,
        value: FieldValue<'_>,
        constraints: &[Constraint],
    ) -> Self {
        for constraint in constraints {
            if let Some(message) = constraint.check(&value) {
                self.errors.push(BindingError {
                    object_name: self.object_name.to_string(),
                    field_name: field_name.to_string(),
                    field_value: value.render().unwrap_or_default(),
                    error_message: message,
                });
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), BindingErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Unwraps a field that must be present, reporting it as null otherwise.
pub fn require<T>(
    object_name: &'static str,
    field_name: &str,
    value: Option<T>,
) -> Result<T, BindingErrors> {
    value.ok_or_else(|| {
        BindingErrors::from(BindingError {
            object_name: object_name.to_string(),
            field_name: field_name.to_string(),
            field_value: String::new(),
            error_message: "must not be null".to_string(),
        })
    })
}
