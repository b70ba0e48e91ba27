//! Declared shapes: field types, constraints, and the object schema builder.

use crate::StringFormat;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringRules {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub format: Option<StringFormat>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberRules {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub integer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRules {
    pub items: Box<FieldType>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String(StringRules),
    Number(NumberRules),
    Boolean,
    Enum(Vec<String>),
    Array(ArrayRules),
    Object(ObjectSchema),
}

impl FieldType {
    pub fn string() -> Self {
        Self::String(StringRules::default())
    }

    pub fn number() -> Self {
        Self::Number(NumberRules::default())
    }

    pub fn integer() -> Self {
        Self::Number(NumberRules {
            integer: true,
            ..NumberRules::default()
        })
    }

    pub fn boolean() -> Self {
        Self::Boolean
    }

    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(variants.into_iter().map(Into::into).collect())
    }

    pub fn array_of(items: FieldType) -> Self {
        Self::Array(ArrayRules {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        })
    }

    pub fn object(schema: ObjectSchema) -> Self {
        Self::Object(schema)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(rules) if rules.integer => "integer",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Enum(_) => "enum",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub optional: bool,
    pub description: Option<String>,
}

/// Fluent constructor for a [`FieldSpec`].
///
/// Constraint setters only apply to field types they make sense for; for
/// example `min_length` on a number field is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    spec: FieldSpec,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            spec: FieldSpec {
                name: name.into(),
                field_type,
                optional: false,
                description: None,
            },
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::string())
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::number())
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::integer())
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::boolean())
    }

    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, FieldType::enumeration(variants))
    }

    pub fn array(name: impl Into<String>, items: FieldType) -> Self {
        Self::new(name, FieldType::array_of(items))
    }

    pub fn object(name: impl Into<String>, schema: ObjectSchema) -> Self {
        Self::new(name, FieldType::object(schema))
    }

    pub fn optional(mut self) -> Self {
        self.spec.optional = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        if let FieldType::String(rules) = &mut self.spec.field_type {
            rules.min_length = Some(length);
        }
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        if let FieldType::String(rules) = &mut self.spec.field_type {
            rules.max_length = Some(length);
        }
        self
    }

    pub fn format(mut self, format: StringFormat) -> Self {
        if let FieldType::String(rules) = &mut self.spec.field_type {
            rules.format = Some(format);
        }
        self
    }

    pub fn min(mut self, minimum: f64) -> Self {
        if let FieldType::Number(rules) = &mut self.spec.field_type {
            rules.minimum = Some(minimum);
        }
        self
    }

    pub fn max(mut self, maximum: f64) -> Self {
        if let FieldType::Number(rules) = &mut self.spec.field_type {
            rules.maximum = Some(maximum);
        }
        self
    }

    /// Strictly greater than zero.
    pub fn positive(mut self) -> Self {
        if let FieldType::Number(rules) = &mut self.spec.field_type {
            rules.exclusive_minimum = Some(0.0);
        }
        self
    }

    pub fn min_items(mut self, count: usize) -> Self {
        if let FieldType::Array(rules) = &mut self.spec.field_type {
            rules.min_items = Some(count);
        }
        self
    }

    pub fn max_items(mut self, count: usize) -> Self {
        if let FieldType::Array(rules) = &mut self.spec.field_type {
            rules.max_items = Some(count);
        }
        self
    }

    pub fn into_spec(self) -> FieldSpec {
        self.spec
    }
}

impl From<Field> for FieldSpec {
    fn from(value: Field) -> Self {
        value.into_spec()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    fields: Vec<FieldSpec>,
    description: Option<String>,
}

impl ObjectSchema {
    pub fn builder() -> ObjectSchemaBuilder {
        ObjectSchemaBuilder::default()
    }

    /// Schema with no declared fields. Any object validates to `{}`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| !field.optional)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchemaBuilder {
    fields: Vec<FieldSpec>,
    description: Option<String>,
}

impl ObjectSchemaBuilder {
    /// Adds a field. A later field with the same name replaces the earlier one.
    pub fn field(mut self, field: impl Into<FieldSpec>) -> Self {
        let field = field.into();
        self.fields.retain(|existing| existing.name != field.name);
        self.fields.push(field);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn build(self) -> ObjectSchema {
        ObjectSchema {
            fields: self.fields,
            description: self.description,
        }
    }
}
