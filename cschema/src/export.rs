//! JSON Schema rendering for tool declarations and structured output.

use serde_json::{Map, Value, json};

use crate::{FieldType, ObjectSchema};

impl ObjectSchema {
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in self.fields() {
            let mut property = field.field_type.to_json_schema();
            if let (Some(description), Value::Object(map)) = (&field.description, &mut property) {
                map.insert("description".to_string(), Value::String(description.clone()));
            }

            properties.insert(field.name.clone(), property);
            if !field.optional {
                required.push(Value::String(field.name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        if let Some(description) = self.description() {
            schema.insert("description".to_string(), json!(description));
        }

        Value::Object(schema)
    }
}

impl FieldType {
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::String(rules) => {
                let mut schema = Map::new();
                schema.insert("type".to_string(), json!("string"));
                if let Some(min) = rules.min_length {
                    schema.insert("minLength".to_string(), json!(min));
                }
                if let Some(max) = rules.max_length {
                    schema.insert("maxLength".to_string(), json!(max));
                }
                if let Some(format) = rules.format {
                    if let Some(name) = format.json_schema_format() {
                        schema.insert("format".to_string(), json!(name));
                    }
                    schema.insert("pattern".to_string(), json!(format.pattern()));
                }
                Value::Object(schema)
            }
            Self::Number(rules) => {
                let mut schema = Map::new();
                let kind = if rules.integer { "integer" } else { "number" };
                schema.insert("type".to_string(), json!(kind));
                if let Some(min) = rules.minimum {
                    schema.insert("minimum".to_string(), json!(min));
                }
                if let Some(max) = rules.maximum {
                    schema.insert("maximum".to_string(), json!(max));
                }
                if let Some(floor) = rules.exclusive_minimum {
                    schema.insert("exclusiveMinimum".to_string(), json!(floor));
                }
                Value::Object(schema)
            }
            Self::Boolean => json!({"type": "boolean"}),
            Self::Enum(variants) => json!({"type": "string", "enum": variants}),
            Self::Array(rules) => {
                let mut schema = Map::new();
                schema.insert("type".to_string(), json!("array"));
                schema.insert("items".to_string(), rules.items.to_json_schema());
                if let Some(min) = rules.min_items {
                    schema.insert("minItems".to_string(), json!(min));
                }
                if let Some(max) = rules.max_items {
                    schema.insert("maxItems".to_string(), json!(max));
                }
                Value::Object(schema)
            }
            Self::Object(schema) => schema.to_json_schema(),
        }
    }
}
