//! LLM skill (§4.8): invokes the currently active LLM through a
//! host-provided capability. The LLM is treated as an external
//! collaborator — this skill never embeds a provider client directly.

use async_trait::async_trait;
use codesearch_core::{FieldType, SchemaField, ScalarValue, SkillDescriptor, StepValue};

use crate::error::SkillExecutionError;
use crate::skill::Skill;
use crate::validation::validate_input;

/// The host-provided capability this skill depends on. Concrete
/// implementations live outside this crate (e.g. wrapping a provider SDK);
/// this trait is the seam the skill framework requires.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        context: Option<&str>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, SkillExecutionError>;
}

pub struct LlmSkill {
    client: Option<std::sync::Arc<dyn LlmClient>>,
    descriptor: SkillDescriptor,
}

impl LlmSkill {
    /// `client: None` models a host that has not wired an active LLM
    /// session; `execute` then fails with [`SkillExecutionError::CapabilityUnavailable`]
    /// rather than panicking.
    pub fn new(client: Option<std::sync::Arc<dyn LlmClient>>) -> Self {
        let descriptor = SkillDescriptor {
            name: "llm".to_string(),
            description: "Invoke the active LLM session with a prompt and optional context.".to_string(),
            input_schema: vec![
                SchemaField {
                    name: "prompt".to_string(),
                    field_type: FieldType::String,
                    required: true,
                    default: None,
                    description: "The prompt to send.".to_string(),
                },
                SchemaField {
                    name: "context".to_string(),
                    field_type: FieldType::String,
                    required: false,
                    default: None,
                    description: "Additional context to prepend.".to_string(),
                },
                SchemaField {
                    name: "temperature".to_string(),
                    field_type: FieldType::Float,
                    required: false,
                    default: Some(StepValue::float(0.7)),
                    description: "Sampling temperature.".to_string(),
                },
                SchemaField {
                    name: "max_tokens".to_string(),
                    field_type: FieldType::Integer,
                    required: false,
                    default: Some(StepValue::integer(1024)),
                    description: "Maximum tokens to generate.".to_string(),
                },
            ],
            output_schema: vec![SchemaField {
                name: "completion".to_string(),
                field_type: FieldType::String,
                required: true,
                default: None,
                description: "The model's response text.".to_string(),
            }],
            required_capabilities: vec!["active LLM session".to_string()],
        };
        Self { client, descriptor }
    }
}

#[async_trait]
impl Skill for LlmSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: StepValue) -> Result<StepValue, SkillExecutionError> {
        validate_input(&self.descriptor.input_schema, &input)?;

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| SkillExecutionError::CapabilityUnavailable("active LLM session".to_string()))?;

        let prompt = match input.field("prompt") {
            Some(StepValue::Scalar(ScalarValue::String(s))) => s.clone(),
            _ => return Err(SkillExecutionError::MissingField("prompt".to_string())),
        };
        let context = match input.field("context") {
            Some(StepValue::Scalar(ScalarValue::String(s))) => Some(s.clone()),
            _ => None,
        };
        let temperature = match input.field("temperature") {
            Some(StepValue::Scalar(ScalarValue::Float(f))) => *f as f32,
            Some(StepValue::Scalar(ScalarValue::Integer(i))) => *i as f32,
            _ => 0.7,
        };
        let max_tokens = match input.field("max_tokens") {
            Some(StepValue::Scalar(ScalarValue::Integer(i))) => (*i).max(0) as u32,
            _ => 1024,
        };

        let completion = client
            .complete(&prompt, context.as_deref(), temperature, max_tokens)
            .await?;

        Ok(StepValue::record([(
            "completion".to_string(),
            StepValue::string(completion),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn complete(
            &self,
            prompt: &str,
            _context: Option<&str>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, SkillExecutionError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    #[tokio::test]
    async fn invokes_the_provided_client() {
        let skill = LlmSkill::new(Some(Arc::new(EchoClient)));
        let input = StepValue::record([("prompt".to_string(), StepValue::string("hello"))]);
        let output = skill.execute(input).await.unwrap();
        assert_eq!(
            output.field("completion").unwrap().render_as_string(),
            "echo: hello"
        );
    }

    #[tokio::test]
    async fn fails_cleanly_without_a_wired_client() {
        let skill = LlmSkill::new(None);
        let input = StepValue::record([("prompt".to_string(), StepValue::string("hello"))]);
        assert!(matches!(
            skill.execute(input).await,
            Err(SkillExecutionError::CapabilityUnavailable(_))
        ));
    }
}
