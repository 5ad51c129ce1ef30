//! Search skill (§4.8): wraps the hybrid search engine.

use std::sync::Arc;

use async_trait::async_trait;
use codesearch_core::{FieldType, SchemaField, ScalarValue, SkillDescriptor, StepValue};
use codesearch_search::{HybridSearchEngine, SearchFilters, SearchMode, SearchQuery};

use crate::error::SkillExecutionError;
use crate::skill::Skill;
use crate::validation::validate_input;

pub struct SearchSkill {
    engine: Arc<HybridSearchEngine>,
    descriptor: SkillDescriptor,
}

impl SearchSkill {
    pub fn new(engine: Arc<HybridSearchEngine>) -> Self {
        let descriptor = SkillDescriptor {
            name: "search".to_string(),
            description: "Search indexed repositories and directories by keyword, semantic similarity, or both.".to_string(),
            input_schema: vec![
                SchemaField {
                    name: "query".to_string(),
                    field_type: FieldType::String,
                    required: true,
                    default: None,
                    description: "The search text.".to_string(),
                },
                SchemaField {
                    name: "mode".to_string(),
                    field_type: FieldType::String,
                    required: false,
                    default: Some(StepValue::string("hybrid")),
                    description: "One of keyword, semantic, hybrid.".to_string(),
                },
                SchemaField {
                    name: "limit".to_string(),
                    field_type: FieldType::Integer,
                    required: false,
                    default: Some(StepValue::integer(20)),
                    description: "Maximum number of results.".to_string(),
                },
                SchemaField {
                    name: "filters".to_string(),
                    field_type: FieldType::Record,
                    required: false,
                    default: None,
                    description: "repositories, directories, folder, extension.".to_string(),
                },
            ],
            output_schema: vec![SchemaField {
                name: "results".to_string(),
                field_type: FieldType::List,
                required: true,
                default: None,
                description: "path, source, score, snippet per hit.".to_string(),
            }],
            required_capabilities: vec!["search engine".to_string()],
        };
        Self { engine, descriptor }
    }
}

#[async_trait]
impl Skill for SearchSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: StepValue) -> Result<StepValue, SkillExecutionError> {
        validate_input(&self.descriptor.input_schema, &input)?;

        let query_text = as_string(input.field("query"))
            .ok_or_else(|| SkillExecutionError::MissingField("query".to_string()))?;
        let mode = parse_mode(as_string(input.field("mode")).as_deref().unwrap_or("hybrid"));
        let limit = as_i64(input.field("limit")).unwrap_or(20).max(0) as usize;
        let filters = input.field("filters").map(parse_filters).unwrap_or_default();

        let query = SearchQuery {
            text: query_text,
            mode,
            limit,
            min_score: 0.0,
            filters,
        };

        let response = self
            .engine
            .search(&query)
            .await
            .map_err(|e| SkillExecutionError::Failed(e.to_string()))?;

        let results = response
            .hits
            .into_iter()
            .map(|hit| {
                StepValue::record([
                    ("doc_id".to_string(), StepValue::string(hit.doc_id)),
                    ("path".to_string(), StepValue::string(hit.path)),
                    ("source".to_string(), StepValue::string(hit.source_name)),
                    ("score".to_string(), StepValue::float(hit.score)),
                    (
                        "snippet".to_string(),
                        hit.snippet.map(StepValue::string).unwrap_or(StepValue::Null),
                    ),
                ])
            })
            .collect();

        Ok(StepValue::record([
            ("results".to_string(), StepValue::List(results)),
            ("degraded".to_string(), StepValue::boolean(response.degraded)),
        ]))
    }
}

fn parse_mode(mode: &str) -> SearchMode {
    match mode {
        "keyword" => SearchMode::Keyword,
        "semantic" => SearchMode::Semantic,
        _ => SearchMode::Hybrid,
    }
}

fn parse_filters(value: &StepValue) -> SearchFilters {
    SearchFilters {
        repositories: as_string_list(value.field("repositories")),
        directory_source_ids: as_i64_list(value.field("directories")),
        folder_prefix: as_string(value.field("folder")),
        extensions: as_string_list(value.field("extension")),
    }
}

fn as_string(value: Option<&StepValue>) -> Option<String> {
    match value {
        Some(StepValue::Scalar(ScalarValue::String(s))) => Some(s.clone()),
        _ => None,
    }
}

fn as_i64(value: Option<&StepValue>) -> Option<i64> {
    match value {
        Some(StepValue::Scalar(ScalarValue::Integer(i))) => Some(*i),
        _ => None,
    }
}

fn as_string_list(value: Option<&StepValue>) -> Vec<String> {
    match value {
        Some(StepValue::List(items)) => items.iter().filter_map(as_string_item).collect(),
        Some(StepValue::Scalar(ScalarValue::String(s))) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn as_string_item(value: &StepValue) -> Option<String> {
    match value {
        StepValue::Scalar(ScalarValue::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn as_i64_list(value: Option<&StepValue>) -> Vec<i64> {
    match value {
        Some(StepValue::List(items)) => items
            .iter()
            .filter_map(|v| match v {
                StepValue::Scalar(ScalarValue::Integer(i)) => Some(*i),
                _ => None,
            })
            .collect(),
        Some(StepValue::Scalar(ScalarValue::Integer(i))) => vec![*i],
        _ => Vec::new(),
    }
}
