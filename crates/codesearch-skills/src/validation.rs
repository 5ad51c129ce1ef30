//! Input-contract checks every skill's `execute` performs before doing work
//! (§4.8): required fields present, types conform, declared-non-empty
//! strings are non-empty.

use codesearch_core::{FieldType, SchemaField, ScalarValue, StepValue};

use crate::error::SkillExecutionError;

/// Validates `input` (expected to be a [`StepValue::Record`]) against
/// `schema`. Fields absent from the schema are ignored; fields the schema
/// marks `required: false` may be absent or [`StepValue::Null`].
pub fn validate_input(schema: &[SchemaField], input: &StepValue) -> Result<(), SkillExecutionError> {
    for field in schema {
        let value = input.field(&field.name);
        match value {
            None | Some(StepValue::Null) => {
                if field.required {
                    return Err(SkillExecutionError::MissingField(field.name.clone()));
                }
            }
            Some(v) => {
                if !type_matches(field.field_type, v) {
                    return Err(SkillExecutionError::TypeMismatch {
                        field: field.name.clone(),
                        expected: format!("{:?}", field.field_type),
                    });
                }
                if field.field_type == FieldType::String {
                    if let StepValue::Scalar(ScalarValue::String(s)) = v {
                        if s.trim().is_empty() {
                            return Err(SkillExecutionError::EmptyField(field.name.clone()));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn type_matches(expected: FieldType, value: &StepValue) -> bool {
    match (expected, value) {
        (FieldType::String, StepValue::Scalar(ScalarValue::String(_))) => true,
        (FieldType::Integer, StepValue::Scalar(ScalarValue::Integer(_))) => true,
        (FieldType::Float, StepValue::Scalar(ScalarValue::Float(_) | ScalarValue::Integer(_))) => true,
        (FieldType::Boolean, StepValue::Scalar(ScalarValue::Boolean(_))) => true,
        (FieldType::List, StepValue::List(_)) => true,
        (FieldType::Record, StepValue::Record(_)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: FieldType, required: bool) -> SchemaField {
        SchemaField {
            name: name.to_string(),
            field_type,
            required,
            default: None,
            description: String::new(),
        }
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let schema = vec![field("query", FieldType::String, true)];
        let input = StepValue::record([]);
        assert!(matches!(
            validate_input(&schema, &input),
            Err(SkillExecutionError::MissingField(f)) if f == "query"
        ));
    }

    #[test]
    fn optional_field_may_be_absent() {
        let schema = vec![field("limit", FieldType::Integer, false)];
        let input = StepValue::record([]);
        assert!(validate_input(&schema, &input).is_ok());
    }

    #[test]
    fn empty_required_string_is_rejected() {
        let schema = vec![field("query", FieldType::String, true)];
        let input = StepValue::record([("query".to_string(), StepValue::string("  "))]);
        assert!(matches!(
            validate_input(&schema, &input),
            Err(SkillExecutionError::EmptyField(f)) if f == "query"
        ));
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let schema = vec![field("limit", FieldType::Integer, true)];
        let input = StepValue::record([("limit".to_string(), StepValue::string("ten"))]);
        assert!(matches!(
            validate_input(&schema, &input),
            Err(SkillExecutionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn well_formed_input_passes() {
        let schema = vec![
            field("query", FieldType::String, true),
            field("limit", FieldType::Integer, false),
        ];
        let input = StepValue::record([
            ("query".to_string(), StepValue::string("hybrid search")),
            ("limit".to_string(), StepValue::integer(10)),
        ]);
        assert!(validate_input(&schema, &input).is_ok());
    }
}
