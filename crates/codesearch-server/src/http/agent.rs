//! Workflow orchestration routes (§6): template and inline execution,
//! template CRUD, and read-only skill/agent introspection.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use codesearch_core::{InlineWorkflow, SkillDescriptor, StepValue, WorkflowExecution, WorkflowTemplate};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteTemplateRequest {
    pub template_id: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, StepValue>,
}

pub async fn execute(
    State(state): State<AppState>,
    Json(request): Json<ExecuteTemplateRequest>,
) -> ServerResult<Json<WorkflowExecution>> {
    let template = state
        .template_store
        .get(&request.template_id)
        .ok_or_else(|| ServerError::NotFound(format!("unknown template '{}'", request.template_id)))?;
    let execution = state
        .workflow_engine
        .execute_template(&template, request.parameters)
        .await?;
    Ok(Json(execution))
}

#[derive(Debug, Deserialize)]
pub struct ExecuteInlineRequest {
    pub workflow: InlineWorkflow,
    #[serde(default)]
    pub parameters: BTreeMap<String, StepValue>,
}

pub async fn execute_workflow(
    State(state): State<AppState>,
    Json(request): Json<ExecuteInlineRequest>,
) -> ServerResult<Json<WorkflowExecution>> {
    let execution = state
        .workflow_engine
        .execute_inline(&request.workflow, request.parameters)
        .await?;
    Ok(Json(execution))
}

pub async fn list_templates(State(state): State<AppState>) -> Json<Vec<WorkflowTemplate>> {
    Json(state.template_store.list())
}

pub async fn register_template(
    State(state): State<AppState>,
    Json(template): Json<WorkflowTemplate>,
) -> ServerResult<Json<WorkflowTemplate>> {
    state.template_store.register(template.clone(), &state.skill_registry)?;
    Ok(Json(template))
}

pub async fn get_template(State(state): State<AppState>, Path(id): Path<String>) -> ServerResult<Json<WorkflowTemplate>> {
    state
        .template_store
        .get(&id)
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("unknown template '{id}'")))
}

pub async fn list_skills(State(state): State<AppState>) -> Json<Vec<SkillDescriptor>> {
    Json(state.skill_registry.list())
}

pub async fn get_skill(State(state): State<AppState>, Path(name): Path<String>) -> ServerResult<Json<SkillDescriptor>> {
    state
        .skill_registry
        .get(&name)
        .map(|skill| Json(skill.descriptor().clone()))
        .ok_or_else(|| ServerError::NotFound(format!("unknown skill '{name}'")))
}

#[derive(Debug, Serialize)]
pub struct AgentInfo {
    pub skills: usize,
    pub templates: usize,
    pub uptime_seconds: u64,
}

pub async fn info(State(state): State<AppState>) -> Json<AgentInfo> {
    Json(AgentInfo {
        skills: state.skill_registry.list().len(),
        templates: state.template_store.list().len(),
        uptime_seconds: state.uptime_seconds(),
    })
}

#[derive(Debug, Serialize)]
pub struct AgentHealth {
    pub status: &'static str,
}

pub async fn health() -> Json<AgentHealth> {
    Json(AgentHealth { status: "healthy" })
}
