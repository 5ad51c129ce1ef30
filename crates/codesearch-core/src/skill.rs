//! Schema types shared by the skill framework and the workflow engine's
//! interpolation evaluator.
//!
//! Per the design notes, skill inputs/outputs are a tagged, schema-validated
//! structure rather than a free-form map, and step outputs are modeled as a
//! small value variant so interpolation is an expression evaluator over a
//! known shape instead of string-key lookups on untyped JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Record,
}

/// One field in a skill's input or output schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<StepValue>,
    pub description: String,
}

/// A skill's declared capability surface: name, description, schemas, and
/// the external capability handles it expects from the host (e.g. "search
/// engine", "active LLM session"). The `execute` operation itself lives on
/// the `Skill` trait in `codesearch-skills`, which depends on this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Vec<SchemaField>,
    pub output_schema: Vec<SchemaField>,
    pub required_capabilities: Vec<String>,
}

/// The value variant used for step inputs/outputs and interpolation.
///
/// Two operations are defined over it: field access (`Record` lookup) and
/// index access (`List` indexing), plus a "render as string" coercion used
/// when a reference is substituted into a string-typed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Null,
    Scalar(ScalarValue),
    List(Vec<StepValue>),
    Record(BTreeMap<String, StepValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl StepValue {
    pub fn string(s: impl Into<String>) -> Self {
        StepValue::Scalar(ScalarValue::String(s.into()))
    }

    pub fn integer(v: i64) -> Self {
        StepValue::Scalar(ScalarValue::Integer(v))
    }

    pub fn float(v: f64) -> Self {
        StepValue::Scalar(ScalarValue::Float(v))
    }

    pub fn boolean(v: bool) -> Self {
        StepValue::Scalar(ScalarValue::Boolean(v))
    }

    pub fn record(fields: impl IntoIterator<Item = (String, StepValue)>) -> Self {
        StepValue::Record(fields.into_iter().collect())
    }

    /// Field access, the first of the two interpolation operations.
    pub fn field(&self, name: &str) -> Option<&StepValue> {
        match self {
            StepValue::Record(map) => map.get(name),
            _ => None,
        }
    }

    /// Index access, the second of the two interpolation operations.
    pub fn index(&self, i: usize) -> Option<&StepValue> {
        match self {
            StepValue::List(items) => items.get(i),
            _ => None,
        }
    }

    /// Render-whole-value-as-string coercion, used when a reference resolves
    /// to a non-scalar but is substituted into a string-typed input.
    pub fn render_as_string(&self) -> String {
        match self {
            StepValue::Null => String::new(),
            StepValue::Scalar(ScalarValue::String(s)) => s.clone(),
            StepValue::Scalar(ScalarValue::Integer(i)) => i.to_string(),
            StepValue::Scalar(ScalarValue::Float(f)) => f.to_string(),
            StepValue::Scalar(ScalarValue::Boolean(b)) => b.to_string(),
            StepValue::List(_) | StepValue::Record(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StepValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_access_on_record() {
        let v = StepValue::record([("a".to_string(), StepValue::string("hi"))]);
        assert_eq!(v.field("a"), Some(&StepValue::string("hi")));
        assert_eq!(v.field("missing"), None);
    }

    #[test]
    fn index_access_on_list() {
        let v = StepValue::List(vec![StepValue::integer(1), StepValue::integer(2)]);
        assert_eq!(v.index(1), Some(&StepValue::integer(2)));
        assert_eq!(v.index(5), None);
    }

    #[test]
    fn render_scalar_as_string() {
        assert_eq!(StepValue::integer(42).render_as_string(), "42");
        assert_eq!(StepValue::string("hi").render_as_string(), "hi");
    }
}
