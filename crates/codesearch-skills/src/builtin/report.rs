//! Report skill (§4.8): formats a title + ordered sections as markdown,
//! json, or plain text. Pure and deterministic — no external capability.

use async_trait::async_trait;
use codesearch_core::{FieldType, SchemaField, ScalarValue, SkillDescriptor, StepValue};

use crate::error::SkillExecutionError;
use crate::skill::Skill;
use crate::validation::validate_input;

pub struct ReportSkill {
    descriptor: SkillDescriptor,
}

impl Default for ReportSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSkill {
    pub fn new() -> Self {
        let descriptor = SkillDescriptor {
            name: "report".to_string(),
            description: "Format a title and ordered sections as markdown, json, or plain text.".to_string(),
            input_schema: vec![
                SchemaField {
                    name: "title".to_string(),
                    field_type: FieldType::String,
                    required: true,
                    default: None,
                    description: "Report title.".to_string(),
                },
                SchemaField {
                    name: "sections".to_string(),
                    field_type: FieldType::List,
                    required: true,
                    default: None,
                    description: "Each section is {heading, prose} or {heading, items}.".to_string(),
                },
                SchemaField {
                    name: "format".to_string(),
                    field_type: FieldType::String,
                    required: false,
                    default: Some(StepValue::string("markdown")),
                    description: "One of markdown, json, plain.".to_string(),
                },
            ],
            output_schema: vec![SchemaField {
                name: "rendered".to_string(),
                field_type: FieldType::String,
                required: true,
                default: None,
                description: "The formatted report.".to_string(),
            }],
            required_capabilities: vec![],
        };
        Self { descriptor }
    }
}

enum Section {
    Prose { heading: String, prose: String },
    Items { heading: String, items: Vec<String> },
}

#[async_trait]
impl Skill for ReportSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: StepValue) -> Result<StepValue, SkillExecutionError> {
        validate_input(&self.descriptor.input_schema, &input)?;

        let title = match input.field("title") {
            Some(StepValue::Scalar(ScalarValue::String(s))) => s.clone(),
            _ => return Err(SkillExecutionError::MissingField("title".to_string())),
        };

        let sections = match input.field("sections") {
            Some(StepValue::List(items)) => items
                .iter()
                .map(parse_section)
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(SkillExecutionError::MissingField("sections".to_string())),
        };

        let format = match input.field("format") {
            Some(StepValue::Scalar(ScalarValue::String(s))) => s.as_str(),
            _ => "markdown",
        };

        let rendered = match format {
            "json" => render_json(&title, &sections),
            "plain" => render_plain(&title, &sections),
            _ => render_markdown(&title, &sections),
        };

        Ok(StepValue::record([(
            "rendered".to_string(),
            StepValue::string(rendered),
        )]))
    }
}

fn parse_section(value: &StepValue) -> Result<Section, SkillExecutionError> {
    let heading = match value.field("heading") {
        Some(StepValue::Scalar(ScalarValue::String(s))) => s.clone(),
        _ => return Err(SkillExecutionError::MissingField("sections[].heading".to_string())),
    };

    if let Some(StepValue::Scalar(ScalarValue::String(prose))) = value.field("prose") {
        return Ok(Section::Prose {
            heading,
            prose: prose.clone(),
        });
    }

    if let Some(StepValue::List(items)) = value.field("items") {
        let items = items.iter().map(|v| v.render_as_string()).collect();
        return Ok(Section::Items { heading, items });
    }

    Err(SkillExecutionError::MissingField(
        "sections[] must have either 'prose' or 'items'".to_string(),
    ))
}

fn render_markdown(title: &str, sections: &[Section]) -> String {
    let mut out = format!("# {title}\n");
    for section in sections {
        match section {
            Section::Prose { heading, prose } => {
                out.push_str(&format!("\n## {heading}\n\n{prose}\n"));
            }
            Section::Items { heading, items } => {
                out.push_str(&format!("\n## {heading}\n\n"));
                for item in items {
                    out.push_str(&format!("- {item}\n"));
                }
            }
        }
    }
    out
}

fn render_plain(title: &str, sections: &[Section]) -> String {
    let mut out = format!("{title}\n{}\n", "=".repeat(title.len()));
    for section in sections {
        match section {
            Section::Prose { heading, prose } => {
                out.push_str(&format!("\n{heading}\n{prose}\n"));
            }
            Section::Items { heading, items } => {
                out.push_str(&format!("\n{heading}\n"));
                for item in items {
                    out.push_str(&format!("  * {item}\n"));
                }
            }
        }
    }
    out
}

fn render_json(title: &str, sections: &[Section]) -> String {
    let sections_json: Vec<serde_json::Value> = sections
        .iter()
        .map(|section| match section {
            Section::Prose { heading, prose } => serde_json::json!({ "heading": heading, "prose": prose }),
            Section::Items { heading, items } => serde_json::json!({ "heading": heading, "items": items }),
        })
        .collect();
    serde_json::json!({ "title": title, "sections": sections_json }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(format: &str) -> StepValue {
        StepValue::record([
            ("title".to_string(), StepValue::string("Weekly summary")),
            (
                "sections".to_string(),
                StepValue::List(vec![
                    StepValue::record([
                        ("heading".to_string(), StepValue::string("Overview")),
                        ("prose".to_string(), StepValue::string("Everything is green.")),
                    ]),
                    StepValue::record([
                        ("heading".to_string(), StepValue::string("Action items")),
                        (
                            "items".to_string(),
                            StepValue::List(vec![StepValue::string("Review PR #42")]),
                        ),
                    ]),
                ]),
            ),
            ("format".to_string(), StepValue::string(format)),
        ])
    }

    #[tokio::test]
    async fn renders_markdown_with_headings_and_lists() {
        let skill = ReportSkill::new();
        let output = skill.execute(sample_input("markdown")).await.unwrap();
        let rendered = output.field("rendered").unwrap().render_as_string();
        assert!(rendered.contains("# Weekly summary"));
        assert!(rendered.contains("## Overview"));
        assert!(rendered.contains("- Review PR #42"));
    }

    #[tokio::test]
    async fn renders_valid_json() {
        let skill = ReportSkill::new();
        let output = skill.execute(sample_input("json")).await.unwrap();
        let rendered = output.field("rendered").unwrap().render_as_string();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["title"], "Weekly summary");
    }

    #[tokio::test]
    async fn rejects_section_without_prose_or_items() {
        let input = StepValue::record([
            ("title".to_string(), StepValue::string("t")),
            (
                "sections".to_string(),
                StepValue::List(vec![StepValue::record([(
                    "heading".to_string(),
                    StepValue::string("h"),
                )])]),
            ),
        ]);
        let skill = ReportSkill::new();
        assert!(skill.execute(input).await.is_err());
    }
}
