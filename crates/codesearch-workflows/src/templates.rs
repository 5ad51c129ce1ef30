//! Workflow template storage (§6): templates are YAML files with
//! `name`, `description`, `category`, `parameters`, `steps` fields, loaded
//! from a configured directory at startup and registrable at runtime
//! through the same path.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use codesearch_core::{SkillDescriptor, WorkflowTemplate};
use codesearch_skills::SkillRegistry;
use parking_lot::RwLock;

use crate::error::WorkflowError;

#[derive(Default)]
pub struct TemplateStore {
    templates: RwLock<HashMap<String, WorkflowTemplate>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.yaml`/`*.yml` file in `dir` as a [`WorkflowTemplate`],
    /// validating each against `registry` before it is kept. A malformed or
    /// uncomposable file is reported but does not stop the remaining files
    /// from loading — startup should surface every template it can.
    pub fn load_dir(&self, dir: &Path, registry: &SkillRegistry) -> Result<Vec<WorkflowError>, WorkflowError> {
        let mut failures = Vec::new();
        if !dir.exists() {
            return Ok(failures);
        }
        let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yaml" || e == "yml")
                .unwrap_or(false);
            if !is_yaml {
                continue;
            }
            match self.load_file(&path, registry) {
                Ok(()) => {}
                Err(e) => failures.push(e),
            }
        }
        Ok(failures)
    }

    fn load_file(&self, path: &Path, registry: &SkillRegistry) -> Result<(), WorkflowError> {
        let contents = std::fs::read_to_string(path)?;
        let template: WorkflowTemplate =
            serde_yaml::from_str(&contents).map_err(|e| WorkflowError::TemplateParse(format!("{}: {e}", path.display())))?;
        self.register(template, registry)
    }

    /// Registers a template after validating it composes against `registry`
    /// (every referenced skill exists, every interpolation reference targets
    /// an earlier step). Replaces any existing template with the same id.
    pub fn register(&self, template: WorkflowTemplate, registry: &SkillRegistry) -> Result<(), WorkflowError> {
        registry.validate_composition(&template.steps).map_err(WorkflowError::Skill)?;
        self.templates.write().insert(template.id.clone(), template);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<WorkflowTemplate> {
        self.templates.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<WorkflowTemplate> {
        let mut templates: Vec<_> = self.templates.read().values().cloned().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }
}

/// Convenience used by the HTTP/CLI surfaces to describe which skills a
/// given template set actually exercises.
pub fn referenced_skills(template: &WorkflowTemplate, registry: &SkillRegistry) -> Vec<SkillDescriptor> {
    let mut seen = Vec::new();
    for step in &template.steps {
        if let Some(skill) = registry.get(&step.skill) {
            let descriptor = skill.descriptor().clone();
            if !seen.iter().any(|d: &SkillDescriptor| d.name == descriptor.name) {
                seen.push(descriptor);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codesearch_core::{OnError, StepValue, WorkflowStep};
    use codesearch_skills::{Skill, SkillExecutionError};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    struct NoopSkill(SkillDescriptor);

    #[async_trait]
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
            input_schema: vec![],
            output_schema: vec![],
            required_capabilities: vec![],
        }
    }

    fn registry_with(names: &[&str]) -> SkillRegistry {
        let registry = SkillRegistry::new();
        for name in names {
            registry.register(Arc::new(NoopSkill(descriptor(name))));
        }
        registry
    }

    fn template(id: &str, skill: &str) -> WorkflowTemplate {
        WorkflowTemplate {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: String::new(),
            parameters: vec![],
            steps: vec![WorkflowStep {
                step_id: "s1".to_string(),
                skill: skill.to_string(),
                description: String::new(),
                input: BTreeMap::new(),
                on_error: OnError::Stop,
            }],
        }
    }

    #[test]
    fn register_and_get_round_trips() {
        let registry = registry_with(&["search"]);
        let store = TemplateStore::new();
        store.register(template("t1", "search"), &registry).unwrap();
        assert!(store.get("t1").is_some());
    }

    #[test]
    fn register_rejects_a_template_referencing_an_unknown_skill() {
        let registry = registry_with(&["search"]);
        let store = TemplateStore::new();
        assert!(store.register(template("t1", "nonexistent"), &registry).is_err());
    }

    #[test]
    fn load_dir_reads_every_yaml_file_and_reports_per_file_failures() {
        let registry = registry_with(&["search"]);
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("good.yaml"),
            r#"
id: good
name: Good
steps:
  - step_id: s1
    skill: search
    input: {}
"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("bad.yaml"),
            r#"
id: bad
name: Bad
steps:
  - step_id: s1
    skill: nonexistent
    input: {}
"#,
        )
        .unwrap();

        let store = TemplateStore::new();
        let failures = store.load_dir(dir.path(), &registry).unwrap();
        assert_eq!(failures.len(), 1);
        assert!(store.get("good").is_some());
        assert!(store.get("bad").is_none());
    }

    #[test]
    fn load_dir_on_a_missing_directory_returns_no_failures() {
        let store = TemplateStore::new();
        let registry = registry_with(&[]);
        let failures = store.load_dir(Path::new("/nonexistent/path"), &registry).unwrap();
        assert!(failures.is_empty());
    }

    #[test]
    fn list_is_sorted_by_id() {
        let registry = registry_with(&["search"]);
        let store = TemplateStore::new();
        store.register(template("zeta", "search"), &registry).unwrap();
        store.register(template("alpha", "search"), &registry).unwrap();
        let ids: Vec<String> = store.list().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
