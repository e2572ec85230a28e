//! Declarative description of the node types a connector produces.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Text,
    Datetime,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub list: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,
}

impl FieldSchema {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            list: false,
            required: true,
            fields: Vec::new(),
        }
    }

    pub fn object(name: &str, fields: Vec<FieldSchema>) -> Self {
        Self {
            fields,
            ..Self::new(name, FieldType::Object)
        }
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl NodeSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}
