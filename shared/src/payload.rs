//! Command payloads delivered by the control surface

use std::collections::BTreeMap;

use serde_json::Value;

use crate::frame::ValidationError;

/// Typed value carried by a control message
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Payload>),
    Object(BTreeMap<String, Payload>),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Payload::Int(i),
                None => Payload::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Payload::Str(s),
            Value::Array(items) => Payload::List(items.into_iter().map(Payload::from).collect()),
            Value::Object(map) => Payload::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Payload::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Payload {
    pub fn as_bool(&self, field: &'static str) -> Result<bool, ValidationError> {
        match self {
            Payload::Bool(b) => Ok(*b),
            _ => Err(wrong_type(field, "a boolean")),
        }
    }

    pub fn as_int(&self, field: &'static str) -> Result<i64, ValidationError> {
        match self {
            Payload::Int(i) => Ok(*i),
            _ => Err(wrong_type(field, "an integer")),
        }
    }

    /// Integers are accepted where a float is expected
    pub fn as_float(&self, field: &'static str) -> Result<f64, ValidationError> {
        match self {
            Payload::Float(f) => Ok(*f),
            Payload::Int(i) => Ok(*i as f64),
            _ => Err(wrong_type(field, "a number")),
        }
    }

    pub fn as_str(&self, field: &'static str) -> Result<&str, ValidationError> {
        match self {
            Payload::Str(s) => Ok(s),
            _ => Err(wrong_type(field, "a string")),
        }
    }

    pub fn as_list(&self, field: &'static str) -> Result<&[Payload], ValidationError> {
        match self {
            Payload::List(items) => Ok(items),
            _ => Err(wrong_type(field, "a list")),
        }
    }

    /// Index of the string value within `variants`
    pub fn as_enum(
        &self,
        field: &'static str,
        variants: &[&str],
    ) -> Result<usize, ValidationError> {
        let value = self.as_str(field)?;
        variants
            .iter()
            .position(|v| *v == value)
            .ok_or_else(|| ValidationError::UnknownVariant {
                field,
                value: value.to_string(),
            })
    }

    /// Member of an object payload; `None` if absent or not an object
    pub fn get(&self, key: &str) -> Option<&Payload> {
        match self {
            Payload::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Required object member
    pub fn field(&self, key: &'static str) -> Result<&Payload, ValidationError> {
        if !matches!(self, Payload::Object(_)) {
            return Err(wrong_type("payload", "an object"));
        }
        self.get(key).ok_or(ValidationError::MissingField(key))
    }

    pub fn key_int(&self, key: &'static str) -> Result<i64, ValidationError> {
        self.field(key)?.as_int(key)
    }

    pub fn key_float(&self, key: &'static str) -> Result<f64, ValidationError> {
        self.field(key)?.as_float(key)
    }

    pub fn key_str(&self, key: &'static str) -> Result<&str, ValidationError> {
        self.field(key)?.as_str(key)
    }

    /// Optional member with a fallback when it is absent. A present member of
    /// the wrong type is still an error.
    pub fn key_int_or(&self, key: &'static str, default: i64) -> Result<i64, ValidationError> {
        match self.get(key) {
            Some(value) => value.as_int(key),
            None => Ok(default),
        }
    }

    pub fn key_bool_or(&self, key: &'static str, default: bool) -> Result<bool, ValidationError> {
        match self.get(key) {
            Some(value) => value.as_bool(key),
            None => Ok(default),
        }
    }
}

fn wrong_type(field: &'static str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType { field, expected }
}
