//! Sequential workflow execution (§4.9): resolve declared parameters, then
//! run each step in order — interpolate its input against resolved
//! parameters and prior step outputs, look up and invoke the named skill,
//! record the outcome, and apply the step's `on_error` policy.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use codesearch_core::{
    InlineWorkflow, OnError, StepRecord, StepStatus, StepValue, WorkflowExecution, WorkflowParameter, WorkflowStatus,
    WorkflowStep, WorkflowTemplate,
};
use codesearch_skills::SkillRegistry;

use crate::error::WorkflowError;
use crate::interpolation::{input_as_json, resolve_strict, substitute_lenient};

pub struct WorkflowEngine {
    registry: Arc<SkillRegistry>,
}

impl WorkflowEngine {
    pub fn new(registry: Arc<SkillRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute_template(
        &self,
        template: &WorkflowTemplate,
        provided_parameters: BTreeMap<String, StepValue>,
    ) -> Result<WorkflowExecution, WorkflowError> {
        let resolved_parameters = resolve_parameters(&template.parameters, provided_parameters)?;
        self.run(Some(template.id.clone()), resolved_parameters, &template.steps)
            .await
    }

    pub async fn execute_inline(
        &self,
        workflow: &InlineWorkflow,
        provided_parameters: BTreeMap<String, StepValue>,
    ) -> Result<WorkflowExecution, WorkflowError> {
        let resolved_parameters = resolve_parameters(&workflow.parameters, provided_parameters)?;
        self.run(None, resolved_parameters, &workflow.steps).await
    }

    async fn run(
        &self,
        template_id: Option<String>,
        resolved_parameters: BTreeMap<String, StepValue>,
        steps: &[WorkflowStep],
    ) -> Result<WorkflowExecution, WorkflowError> {
        self.registry
            .validate_composition(steps)
            .map_err(WorkflowError::Skill)?;

        let started_at = Utc::now();
        let mut step_outputs: BTreeMap<String, StepValue> = BTreeMap::new();
        let mut records = Vec::with_capacity(steps.len());
        let mut aborted = false;

        for step in steps {
            let start = Instant::now();
            let record = self.run_step(step, &resolved_parameters, &step_outputs).await;
            let elapsed = start.elapsed().as_millis() as u64;

            let failed = record.status == StepStatus::Failed;
            step_outputs.insert(step.step_id.clone(), record.output.clone());
            records.push(StepRecord { duration_ms: elapsed, ..record });

            if failed && step.on_error == OnError::Stop {
                aborted = true;
                break;
            }
        }

        Ok(WorkflowExecution {
            template_id,
            resolved_parameters,
            steps: records,
            status: if aborted { WorkflowStatus::Failed } else { WorkflowStatus::Ok },
            started_at,
            ended_at: Utc::now(),
        })
    }

    async fn run_step(
        &self,
        step: &WorkflowStep,
        resolved_parameters: &BTreeMap<String, StepValue>,
        step_outputs: &BTreeMap<String, StepValue>,
    ) -> StepRecord {
        let raw = input_as_json(&step.input);
        let param_substituted = substitute_lenient(&raw, resolved_parameters);

        let resolved_input = match resolve_strict(&param_substituted, step_outputs) {
            Ok(input) => input,
            Err(reference) => {
                return StepRecord {
                    step_id: step.step_id.clone(),
                    resolved_input: StepValue::Null,
                    output: StepValue::Null,
                    status: StepStatus::Failed,
                    error: Some(
                        WorkflowError::UnresolvedReference {
                            step_id: step.step_id.clone(),
                            reference,
                        }
                        .to_string(),
                    ),
                    duration_ms: 0,
                };
            }
        };

        let skill = match self.registry.get(&step.skill) {
            Some(skill) => skill,
            None => {
                return StepRecord {
                    step_id: step.step_id.clone(),
                    resolved_input,
                    output: StepValue::Null,
                    status: StepStatus::Failed,
                    error: Some(
                        WorkflowError::SkillNotFound {
                            step_id: step.step_id.clone(),
                            skill: step.skill.clone(),
                        }
                        .to_string(),
                    ),
                    duration_ms: 0,
                };
            }
        };

        match skill.execute(resolved_input.clone()).await {
            Ok(output) => StepRecord {
                step_id: step.step_id.clone(),
                resolved_input,
                output,
                status: StepStatus::Ok,
                error: None,
                duration_ms: 0,
            },
            Err(e) => StepRecord {
                step_id: step.step_id.clone(),
                resolved_input,
                output: StepValue::Null,
                status: StepStatus::Failed,
                error: Some(e.to_string()),
                duration_ms: 0,
            },
        }
    }
}

/// Resolves every declared parameter against the caller-supplied values,
/// falling back to declared defaults. A required parameter with neither a
/// supplied value nor a default fails resolution before any step runs.
fn resolve_parameters(
    declared: &[WorkflowParameter],
    mut provided: BTreeMap<String, StepValue>,
) -> Result<BTreeMap<String, StepValue>, WorkflowError> {
    let mut resolved = BTreeMap::new();
    for param in declared {
        let value = provided.remove(&param.name).or_else(|| param.default.clone());
        match value {
            Some(v) => {
                resolved.insert(param.name.clone(), v);
            }
            None if param.required => {
                return Err(WorkflowError::MissingParameter(param.name.clone()));
            }
            None => {
                resolved.insert(param.name.clone(), StepValue::Null);
            }
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codesearch_core::{FieldType, SchemaField, SkillDescriptor};
    use codesearch_skills::{Skill, SkillExecutionError};

    struct EchoSkill(SkillDescriptor);

    #[async_trait]
    impl Skill for EchoSkill {
        fn descriptor(&self) -> &SkillDescriptor {
            &self.0
        }

        async fn execute(&self, input: StepValue) -> Result<StepValue, SkillExecutionError> {
            Ok(input)
        }
    }

    struct AlwaysFailsSkill(SkillDescriptor);

    #[async_trait]
    impl Skill for AlwaysFailsSkill {
        fn descriptor(&self) -> &SkillDescriptor {
            &self.0
        }

        async fn execute(&self, _input: StepValue) -> Result<StepValue, SkillExecutionError> {
            Err(SkillExecutionError::Failed("boom".to_string()))
        }
    }

    fn descriptor(name: &str) -> SkillDescriptor {
        SkillDescriptor {
            name: name.to_string(),
            description: String::new(),
            input_schema: vec![],
            output_schema: vec![],
            required_capabilities: vec![],
        }
    }

    fn step(step_id: &str, skill: &str, input: BTreeMap<String, serde_json::Value>, on_error: OnError) -> WorkflowStep {
        WorkflowStep {
            step_id: step_id.to_string(),
            skill: skill.to_string(),
            description: String::new(),
            input,
            on_error,
        }
    }

    fn engine_with(skills: Vec<Arc<dyn Skill>>) -> WorkflowEngine {
        let registry = Arc::new(SkillRegistry::new());
        for skill in skills {
            registry.register(skill);
        }
        WorkflowEngine::new(registry)
    }

    #[tokio::test]
    async fn resolves_parameter_into_step_input_before_running() {
        let engine = engine_with(vec![Arc::new(EchoSkill(descriptor("echo")))]);
        let mut input = BTreeMap::new();
        input.insert("value".to_string(), serde_json::json!("{{ name }}"));
        let workflow = InlineWorkflow {
            parameters: vec![WorkflowParameter {
                name: "name".to_string(),
                param_type: "string".to_string(),
                required: true,
                default: None,
                description: String::new(),
            }],
            steps: vec![step("s1", "echo", input, OnError::Stop)],
        };
        let mut provided = BTreeMap::new();
        provided.insert("name".to_string(), StepValue::string("widget"));

        let execution = engine.execute_inline(&workflow, provided).await.unwrap();
        assert_eq!(execution.status, WorkflowStatus::Ok);
        assert_eq!(
            execution.steps[0].output.field("value").unwrap(),
            &StepValue::string("widget")
        );
    }

    #[tokio::test]
    async fn missing_required_parameter_fails_before_any_step_runs() {
        let engine = engine_with(vec![Arc::new(EchoSkill(descriptor("echo")))]);
        let workflow = InlineWorkflow {
            parameters: vec![WorkflowParameter {
                name: "name".to_string(),
                param_type: "string".to_string(),
                required: true,
                default: None,
                description: String::new(),
            }],
            steps: vec![step("s1", "echo", BTreeMap::new(), OnError::Stop)],
        };
        let result = engine.execute_inline(&workflow, BTreeMap::new()).await;
        assert!(matches!(result, Err(WorkflowError::MissingParameter(p)) if p == "name"));
    }

    #[tokio::test]
    async fn later_step_reads_earlier_steps_output() {
        let engine = engine_with(vec![Arc::new(EchoSkill(descriptor("echo")))]);
        let mut first_input = BTreeMap::new();
        first_input.insert("value".to_string(), serde_json::json!("hi"));
        let mut second_input = BTreeMap::new();
        second_input.insert("value".to_string(), serde_json::json!("{{ s1.value }}"));
        let workflow = InlineWorkflow {
            parameters: vec![],
            steps: vec![
                step("s1", "echo", first_input, OnError::Stop),
                step("s2", "echo", second_input, OnError::Stop),
            ],
        };
        let execution = engine.execute_inline(&workflow, BTreeMap::new()).await.unwrap();
        assert_eq!(
            execution.steps[1].output.field("value").unwrap(),
            &StepValue::string("hi")
        );
    }

    #[tokio::test]
    async fn on_error_stop_aborts_the_remaining_steps() {
        let engine = engine_with(vec![
            Arc::new(AlwaysFailsSkill(descriptor("fails"))),
            Arc::new(EchoSkill(descriptor("echo"))),
        ]);
        let workflow = InlineWorkflow {
            parameters: vec![],
            steps: vec![
                step("s1", "fails", BTreeMap::new(), OnError::Stop),
                step("s2", "echo", BTreeMap::new(), OnError::Stop),
            ],
        };
        let execution = engine.execute_inline(&workflow, BTreeMap::new()).await.unwrap();
        assert_eq!(execution.status, WorkflowStatus::Failed);
        assert_eq!(execution.steps.len(), 1);
    }

    #[tokio::test]
    async fn on_error_continue_runs_remaining_steps_and_stays_ok() {
        let engine = engine_with(vec![
            Arc::new(AlwaysFailsSkill(descriptor("fails"))),
            Arc::new(EchoSkill(descriptor("echo"))),
        ]);
        let workflow = InlineWorkflow {
            parameters: vec![],
            steps: vec![
                step("s1", "fails", BTreeMap::new(), OnError::Continue),
                step("s2", "echo", BTreeMap::new(), OnError::Stop),
            ],
        };
        let execution = engine.execute_inline(&workflow, BTreeMap::new()).await.unwrap();
        assert_eq!(execution.status, WorkflowStatus::Ok);
        assert_eq!(execution.steps.len(), 2);
        assert_eq!(execution.steps[0].status, StepStatus::Failed);
        assert_eq!(execution.steps[1].status, StepStatus::Ok);
    }

    #[tokio::test]
    async fn step_referencing_a_continued_failure_fails_itself() {
        let engine = engine_with(vec![
            Arc::new(AlwaysFailsSkill(descriptor("fails"))),
            Arc::new(EchoSkill(descriptor("echo"))),
        ]);
        let mut input = BTreeMap::new();
        input.insert("value".to_string(), serde_json::json!("{{ s1.value }}"));
        let workflow = InlineWorkflow {
            parameters: vec![],
            steps: vec![
                step("s1", "fails", BTreeMap::new(), OnError::Continue),
                step("s2", "echo", input, OnError::Continue),
            ],
        };
        let execution = engine.execute_inline(&workflow, BTreeMap::new()).await.unwrap();
        assert_eq!(execution.steps[1].status, StepStatus::Failed);
    }

    #[tokio::test]
    async fn primary_result_is_the_final_steps_output() {
        let engine = engine_with(vec![Arc::new(EchoSkill(descriptor("echo")))]);
        let mut input = BTreeMap::new();
        input.insert("value".to_string(), serde_json::json!("last"));
        let workflow = InlineWorkflow {
            parameters: vec![],
            steps: vec![step("s1", "echo", input, OnError::Stop)],
        };
        let execution = engine.execute_inline(&workflow, BTreeMap::new()).await.unwrap();
        assert_eq!(
            execution.primary_result().field("value").unwrap(),
            &StepValue::string("last")
        );
    }
}
