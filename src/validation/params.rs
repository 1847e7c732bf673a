use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::board::FlagsPatch;

/// Field -> messages map, rendered as `{"errors": {...}}` with status 422.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Single-field shorthand.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{} {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Length bounds and the reserved placeholder-name list both come from the
/// `[queue]` section of the config.
pub fn validate_username(
    username: &str,
    max_len: usize,
    reserved: &[String],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let len = username.chars().count();
    if len < 1 || len > max_len {
        errors.add(
            "username",
            &format!("must be between 1 and {} characters", max_len),
        );
    }
    if reserved.iter().any(|r| r == username) {
        errors.add("username", "Please choose a different username");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Board creation fields as received from the wire.
#[derive(Debug, Deserialize)]
pub struct BoardParams {
    pub title: String,
    pub class_id: String,
    pub password: String,
    #[serde(default)]
    pub question_based: bool,
}

#[derive(Debug)]
pub struct ValidatedBoardParams {
    pub title: String,
    /// Normalized to uppercase.
    pub class_id: String,
    pub password: String,
    pub question_based: bool,
}

impl BoardParams {
    pub fn validate(self) -> Result<ValidatedBoardParams, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().is_empty() {
            errors.add("title", "can't be blank");
        }
        if self.class_id.is_empty() {
            errors.add("class_id", "can't be blank");
        } else if !self
            .class_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.add(
                "class_id",
                "Must contain only letters, numbers, and underscores.",
            );
        }
        if self.password.is_empty() {
            errors.add("password", "can't be blank");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedBoardParams {
            title: self.title,
            class_id: self.class_id.to_uppercase(),
            password: self.password,
            question_based: self.question_based,
        })
    }
}

/// The queue flags patch accepts loosely-typed JSON so a client sending
/// `{"frozen": "hello"}` gets a per-field 422 instead of a blanket body
/// rejection.
#[derive(Debug, Default, Deserialize)]
pub struct QueuePatch {
    pub active: Option<Value>,
    pub frozen: Option<Value>,
    pub status: Option<Value>,
}

impl QueuePatch {
    pub fn validate(self) -> Result<FlagsPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let active = match self.active {
            Some(Value::Bool(b)) => Some(b),
            Some(_) => {
                errors.add("active", "must be a true/false value");
                None
            }
            None => None,
        };
        let frozen = match self.frozen {
            Some(Value::Bool(b)) => Some(b),
            Some(_) => {
                errors.add("frozen", "must be a true/false value");
                None
            }
            None => None,
        };
        let status = match self.status {
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                errors.add("status", "must be a string");
                None
            }
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(FlagsPatch {
            active,
            frozen,
            status,
        })
    }
}
