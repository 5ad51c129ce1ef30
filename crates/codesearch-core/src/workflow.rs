//! Workflow template and execution-record entities.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::skill::StepValue;

/// A parameter declared on a workflow template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    pub default: Option<StepValue>,
    #[serde(default)]
    pub description: String,
}

/// What to do when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    Stop,
    Continue,
}

impl Default for OnError {
    fn default() -> Self {
        OnError::Stop
    }
}

/// One step in a workflow template: which skill to invoke, with which
/// (possibly interpolated) input, and what to do on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_id: String,
    pub skill: String,
    #[serde(default)]
    pub description: String,
    /// Raw, uninterpolated input. Interpolation happens at execution time
    /// against resolved parameters and prior step outputs.
    pub input: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub on_error: OnError,
}

/// A named, reusable workflow: parameters plus an ordered step list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub parameters: Vec<WorkflowParameter>,
    pub steps: Vec<WorkflowStep>,
}

/// An unnamed workflow supplied inline with a request (`/agent/execute-workflow`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineWorkflow {
    #[serde(default)]
    pub parameters: Vec<WorkflowParameter>,
    pub steps: Vec<WorkflowStep>,
}

/// The outcome of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Failed,
    Skipped,
}

/// One entry in an execution's append-only step log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_id: String,
    pub resolved_input: StepValue,
    pub output: StepValue,
    pub status: StepStatus,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Overall workflow execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Ok,
    Failed,
}

/// The full, append-only record of one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub template_id: Option<String>,
    pub resolved_parameters: BTreeMap<String, StepValue>,
    pub steps: Vec<StepRecord>,
    pub status: WorkflowStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl WorkflowExecution {
    /// The final step's output, the workflow's primary result.
    pub fn primary_result(&self) -> StepValue {
        self.steps
            .last()
            .map(|s| s.output.clone())
            .unwrap_or(StepValue::Null)
    }
}
