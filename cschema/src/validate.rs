//! Validation of JSON values against declared shapes.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ArrayRules, FieldType, NumberRules, ObjectSchema, StringRules};

/// Field path to messages. The root value uses the empty path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(path, message);
        errors
    }

    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.errors.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(path, messages)| (path.as_str(), messages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.errors
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (path, messages) in &self.errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;

                if path.is_empty() {
                    f.write_str(message)?;
                } else {
                    write!(f, "{path}: {message}")?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// Coerced value: unknown keys stripped, absent or null optionals dropped.
    Valid(Value),
    Invalid(FieldErrors),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn into_result(self) -> Result<Value, FieldErrors> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

impl ObjectSchema {
    pub fn validate(&self, value: &Value) -> Validation {
        let mut errors = FieldErrors::new();
        let coerced = check_object(self, value, "", &mut errors);

        match coerced {
            Some(value) if errors.is_empty() => Validation::Valid(value),
            _ => Validation::Invalid(errors),
        }
    }

    /// Validates, then deserializes the coerced value into `T`.
    pub fn validate_as<T>(&self, value: &Value) -> Result<T, FieldErrors>
    where
        T: DeserializeOwned,
    {
        let coerced = self.validate(value).into_result()?;
        serde_json::from_value(coerced).map_err(|err| FieldErrors::single("", err.to_string()))
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, got {}", value_kind(value))
}

fn check_object(
    schema: &ObjectSchema,
    value: &Value,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Some(object) = value.as_object() else {
        errors.add(path, mismatch("object", value));
        return None;
    };

    let mut coerced = Map::new();
    for field in schema.fields() {
        let field_path = join(path, &field.name);
        match object.get(&field.name) {
            None | Some(Value::Null) => {
                if !field.optional {
                    errors.add(field_path, "is required");
                }
            }
            Some(candidate) => {
                if let Some(valid) =
                    check_value(&field.field_type, candidate, &field_path, !field.optional, errors)
                {
                    coerced.insert(field.name.clone(), valid);
                }
            }
        }
    }

    Some(Value::Object(coerced))
}

fn check_value(
    field_type: &FieldType,
    value: &Value,
    path: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<Value> {
    match field_type {
        FieldType::String(rules) => check_string(rules, value, path, required, errors),
        FieldType::Number(rules) => check_number(rules, value, path, errors),
        FieldType::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            _ => {
                errors.add(path, mismatch("boolean", value));
                None
            }
        },
        FieldType::Enum(variants) => check_enum(variants, value, path, errors),
        FieldType::Array(rules) => check_array(rules, value, path, errors),
        FieldType::Object(schema) => {
            let before = errors.len();
            let coerced = check_object(schema, value, path, errors);
            if errors.len() == before { coerced } else { None }
        }
    }
}

fn check_string(
    rules: &StringRules,
    value: &Value,
    path: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Some(text) = value.as_str() else {
        errors.add(path, mismatch("string", value));
        return None;
    };

    let before = errors.len();
    let length = text.chars().count();

    if required && length == 0 {
        errors.add(path, "must not be empty");
    }

    if let Some(min) = rules.min_length
        && length < min
        && length > 0
    {
        errors.add(path, format!("must be at least {min} characters"));
    }

    if let Some(max) = rules.max_length
        && length > max
    {
        errors.add(path, format!("must be at most {max} characters"));
    }

    if let Some(format) = rules.format
        && length > 0
        && !format.matches(text)
    {
        errors.add(path, format.failure_message());
    }

    (errors.len() == before).then(|| value.clone())
}

fn check_number(
    rules: &NumberRules,
    value: &Value,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Some(number) = value.as_f64() else {
        let expected = if rules.integer { "integer" } else { "number" };
        errors.add(path, mismatch(expected, value));
        return None;
    };

    let before = errors.len();

    if rules.integer && number.fract() != 0.0 {
        errors.add(path, "must be an integer");
    }

    if let Some(min) = rules.minimum
        && number < min
    {
        errors.add(path, format!("must be >= {min}"));
    }

    if let Some(max) = rules.maximum
        && number > max
    {
        errors.add(path, format!("must be <= {max}"));
    }

    if let Some(floor) = rules.exclusive_minimum
        && number <= floor
    {
        errors.add(path, format!("must be greater than {floor}"));
    }

    (errors.len() == before).then(|| value.clone())
}

fn check_enum(variants: &[String], value: &Value, path: &str, errors: &mut FieldErrors) -> Option<Value> {
    match value.as_str() {
        Some(text) if variants.iter().any(|variant| variant == text) => Some(value.clone()),
        Some(_) => {
            errors.add(path, format!("must be one of: {}", variants.join(", ")));
            None
        }
        None => {
            errors.add(path, mismatch("string", value));
            None
        }
    }
}

fn check_array(
    rules: &ArrayRules,
    value: &Value,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<Value> {
    let Some(items) = value.as_array() else {
        errors.add(path, mismatch("array", value));
        return None;
    };

    let before = errors.len();

    if let Some(min) = rules.min_items
        && items.len() < min
    {
        errors.add(path, format!("must contain at least {min} item(s)"));
    }

    if let Some(max) = rules.max_items
        && items.len() > max
    {
        errors.add(path, format!("must contain at most {max} item(s)"));
    }

    let mut coerced = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{index}]");
        if item.is_null() {
            errors.add(item_path, "must not be null");
            continue;
        }

        if let Some(valid) = check_value(&rules.items, item, &item_path, true, errors) {
            coerced.push(valid);
        }
    }

    (errors.len() == before).then_some(Value::Array(coerced))
}
