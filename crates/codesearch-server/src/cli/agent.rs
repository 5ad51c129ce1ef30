//! `codesearch agent` (§6): execute a registered template or an inline
//! workflow read from a JSON file, manage templates, and introspect the
//! skill registry — the same operations the HTTP `/agent/*` routes expose.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use codesearch_core::{InlineWorkflow, StepValue, WorkflowTemplate};

use crate::error::{ServerError, ServerResult};
use crate::AppContext;

#[derive(Subcommand, Debug)]
pub enum AgentCommand {
    /// Execute a registered workflow template by id
    Execute(ExecuteArgs),

    /// Execute an inline workflow read from a JSON file
    Workflow(WorkflowArgs),

    /// List registered workflow templates
    Templates,

    /// Show one registered template's definition
    TemplateInfo {
        #[arg(value_name = "TEMPLATE_ID")]
        id: String,
    },

    /// Register a workflow template from a JSON file
    TemplateRegister {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List registered skills
    Skills,

    /// Show one skill's descriptor
    SkillInfo {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Print agent subsystem status (skill/template counts, uptime)
    Info,
}

#[derive(Args, Debug)]
pub struct ExecuteArgs {
    #[arg(value_name = "TEMPLATE_ID")]
    pub template_id: String,

    /// JSON file of `{ "param_name": <StepValue-shaped JSON> }`
    #[arg(long)]
    pub parameters: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WorkflowArgs {
    /// JSON file holding an inline workflow: `{ "parameters": [...], "steps": [...] }`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long)]
    pub parameters: Option<PathBuf>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> ServerResult<T> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ServerError::InvalidInput(format!("could not read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| ServerError::InvalidInput(format!("could not parse {}: {e}", path.display())))
}

fn read_parameters(path: &Option<PathBuf>) -> ServerResult<BTreeMap<String, StepValue>> {
    match path {
        Some(path) => read_json(path),
        None => Ok(BTreeMap::new()),
    }
}

pub async fn run(ctx: AppContext, action: AgentCommand) -> ServerResult<()> {
    match action {
        AgentCommand::Execute(args) => {
            let template = ctx
                .template_store
                .get(&args.template_id)
                .ok_or_else(|| ServerError::NotFound(format!("unknown template '{}'", args.template_id)))?;
            let parameters = read_parameters(&args.parameters)?;
            let execution = ctx.workflow_engine.execute_template(&template, parameters).await?;
            println!("{}", serde_json::to_string_pretty(&execution).unwrap());
        }
        AgentCommand::Workflow(args) => {
            let workflow: InlineWorkflow = read_json(&args.file)?;
            let parameters = read_parameters(&args.parameters)?;
            let execution = ctx.workflow_engine.execute_inline(&workflow, parameters).await?;
            println!("{}", serde_json::to_string_pretty(&execution).unwrap());
        }
        AgentCommand::Templates => {
            println!("{}", serde_json::to_string_pretty(&ctx.template_store.list()).unwrap());
        }
        AgentCommand::TemplateInfo { id } => {
            let template = ctx
                .template_store
                .get(&id)
                .ok_or_else(|| ServerError::NotFound(format!("unknown template '{id}'")))?;
            println!("{}", serde_json::to_string_pretty(&template).unwrap());
        }
        AgentCommand::TemplateRegister { file } => {
            let template: WorkflowTemplate = read_json(&file)?;
            ctx.template_store.register(template.clone(), &ctx.skill_registry)?;
            println!("registered template '{}'", template.id);
        }
        AgentCommand::Skills => {
            println!("{}", serde_json::to_string_pretty(&ctx.skill_registry.list()).unwrap());
        }
        AgentCommand::SkillInfo { name } => {
            let skill = ctx
                .skill_registry
                .get(&name)
                .ok_or_else(|| ServerError::NotFound(format!("unknown skill '{name}'")))?;
            println!("{}", serde_json::to_string_pretty(skill.descriptor()).unwrap());
        }
        AgentCommand::Info => {
            println!(
                "{}",
                serde_json::json!({
                    "skills": ctx.skill_registry.list().len(),
                    "templates": ctx.template_store.list().len(),
                })
            );
        }
    }
    Ok(())
}
