//! Skill registry (§4.8): register, look up, list, and validate a proposed
//! workflow's skill references and interpolation targets before execution.
//!
//! A process-wide name -> entry map with register/get/list operations,
//! holding typed [`Skill`] trait objects directly rather than scanning
//! markdown files from disk.

use std::collections::HashMap;
use std::sync::Arc;

use codesearch_core::{SkillDescriptor, WorkflowStep};
use parking_lot::RwLock;

use crate::error::SkillExecutionError;
use crate::skill::Skill;

#[derive(Default)]
pub struct SkillRegistry {
    skills: RwLock<HashMap<String, Arc<dyn Skill>>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, skill: Arc<dyn Skill>) {
        let name = skill.descriptor().name.clone();
        self.skills.write().insert(name, skill);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Skill>> {
        self.skills.read().get(name).cloned()
    }

    pub fn list(&self) -> Vec<SkillDescriptor> {
        self.skills
            .read()
            .values()
            .map(|s| s.descriptor().clone())
            .collect()
    }

    /// Validates that every step in `steps` references a registered skill,
    /// and that every `{{ step_id.path }}` reference in a step's raw input
    /// targets a step_id that appears earlier in the sequence. Does not
    /// validate interpolated values against the target skill's declared
    /// output schema — that check happens at execution time, once the
    /// referenced step has actually produced a [`StepValue`].
    pub fn validate_composition(&self, steps: &[WorkflowStep]) -> Result<(), SkillExecutionError> {
        let mut seen_step_ids: Vec<&str> = Vec::new();

        for step in steps {
            if self.get(&step.skill).is_none() {
                return Err(SkillExecutionError::NotFound(step.skill.clone()));
            }

            for value in step.input.values() {
                if let Some(text) = value.as_str() {
                    for reference in extract_references(text) {
                        let step_id = reference.split('.').next().unwrap_or(reference);
                        if !seen_step_ids.contains(&step_id) {
                            return Err(SkillExecutionError::Failed(format!(
                                "step '{}' references undeclared or not-yet-run step '{}'",
                                step.step_id, step_id
                            )));
                        }
                    }
                }
            }

            seen_step_ids.push(&step.step_id);
        }

        Ok(())
    }
}

/// Extracts the inner text of every `{{ ... }}` placeholder in `text`.
fn extract_references(text: &str) -> Vec<&str> {
    let mut refs = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        if let Some(end) = after.find("}}") {
            refs.push(after[..end].trim());
            rest = &after[end + 2..];
        } else {
            break;
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_core::{FieldType, OnError, SchemaField, StepValue};
    use std::collections::BTreeMap;

    struct NoopSkill(SkillDescriptor);

    #[async_trait::async_trait]
    impl Skill for NoopSkill {
        fn descriptor(&self) -> &SkillDescriptor {
            &self.0
        }

        async fn execute(&self, _input: StepValue) -> Result<StepValue, SkillExecutionError> {
            Ok(StepValue::Null)
        }
    }

    fn descriptor(name: &str) -> SkillDescriptor {
        SkillDescriptor {
            name: name.to_string(),
            description: String::new(),
            input_schema: vec![SchemaField {
                name: "query".to_string(),
                field_type: FieldType::String,
                required: true,
                default: None,
                description: String::new(),
            }],
            output_schema: vec![],
            required_capabilities: vec![],
        }
    }

    fn step(step_id: &str, skill: &str, input: BTreeMap<String, serde_json::Value>) -> WorkflowStep {
        WorkflowStep {
            step_id: step_id.to_string(),
            skill: skill.to_string(),
            description: String::new(),
            input,
            on_error: OnError::Stop,
        }
    }

    #[test]
    fn register_and_get_round_trips() {
        let registry = SkillRegistry::new();
        registry.register(Arc::new(NoopSkill(descriptor("search"))));
        assert!(registry.get("search").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn list_returns_every_registered_descriptor() {
        let registry = SkillRegistry::new();
        registry.register(Arc::new(NoopSkill(descriptor("search"))));
        registry.register(Arc::new(NoopSkill(descriptor("report"))));
        let names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"search".to_string()));
    }

    #[test]
    fn composition_rejects_unknown_skill() {
        let registry = SkillRegistry::new();
        let steps = vec![step("s1", "nonexistent", BTreeMap::new())];
        assert!(matches!(
            registry.validate_composition(&steps),
            Err(SkillExecutionError::NotFound(_))
        ));
    }

    #[test]
    fn composition_rejects_forward_reference() {
        let registry = SkillRegistry::new();
        registry.register(Arc::new(NoopSkill(descriptor("search"))));
        registry.register(Arc::new(NoopSkill(descriptor("report"))));

        let mut input = BTreeMap::new();
        input.insert(
            "title".to_string(),
            serde_json::Value::String("{{ later_step.title }}".to_string()),
        );
        let steps = vec![
            step("s1", "search", BTreeMap::new()),
            step("s2", "report", input),
        ];
        assert!(registry.validate_composition(&steps).is_err());
    }

    #[test]
    fn composition_accepts_reference_to_earlier_step() {
        let registry = SkillRegistry::new();
        registry.register(Arc::new(NoopSkill(descriptor("search"))));
        registry.register(Arc::new(NoopSkill(descriptor("report"))));

        let mut input = BTreeMap::new();
        input.insert(
            "title".to_string(),
            serde_json::Value::String("{{ s1.hits.0.path }}".to_string()),
        );
        let steps = vec![
            step("s1", "search", BTreeMap::new()),
            step("s2", "report", input),
        ];
        assert!(registry.validate_composition(&steps).is_ok());
    }
}
