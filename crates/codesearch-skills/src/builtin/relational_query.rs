//! Relational query skill placeholder (§4.8): declared with its safety
//! constraints up front so workflows may reference it before a backend
//! exists. `execute` always fails with a typed `NotImplemented` error; the
//! registry accepts it without special-casing, same as any other skill.

use async_trait::async_trait;
use codesearch_core::{FieldType, SchemaField, SkillDescriptor, StepValue};

use crate::error::SkillExecutionError;
use crate::skill::Skill;
use crate::validation::validate_input;

pub struct RelationalQuerySkill {
    descriptor: SkillDescriptor,
}

impl Default for RelationalQuerySkill {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationalQuerySkill {
    pub fn new() -> Self {
        let descriptor = SkillDescriptor {
            name: "relational_query".to_string(),
            description: "Run a read-only relational query (row-capped, time-limited). No backend is wired yet.".to_string(),
            input_schema: vec![
                SchemaField {
                    name: "query".to_string(),
                    field_type: FieldType::String,
                    required: true,
                    default: None,
                    description: "A read-only SQL statement.".to_string(),
                },
                SchemaField {
                    name: "row_limit".to_string(),
                    field_type: FieldType::Integer,
                    required: false,
                    default: Some(StepValue::integer(1000)),
                    description: "Maximum rows returned.".to_string(),
                },
                SchemaField {
                    name: "timeout_ms".to_string(),
                    field_type: FieldType::Integer,
                    required: false,
                    default: Some(StepValue::integer(5000)),
                    description: "Query timeout in milliseconds.".to_string(),
                },
            ],
            output_schema: vec![SchemaField {
                name: "rows".to_string(),
                field_type: FieldType::List,
                required: true,
                default: None,
                description: "Result rows.".to_string(),
            }],
            required_capabilities: vec!["relational database".to_string()],
        };
        Self { descriptor }
    }
}

#[async_trait]
impl Skill for RelationalQuerySkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: StepValue) -> Result<StepValue, SkillExecutionError> {
        validate_input(&self.descriptor.input_schema, &input)?;
        Err(SkillExecutionError::NotImplemented {
            skill: self.descriptor.name.clone(),
            reason: "no relational backend is configured for this deployment".to_string(),
        })
    }
}
