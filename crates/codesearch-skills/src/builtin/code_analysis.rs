//! Code analysis skill (§4.8): structural extraction (functions, classes,
//! imports) and a simple cyclomatic-complexity heuristic for a recognized
//! code kind.
//!
//! Uses the same function/class/import vocabulary a tree-sitter-based
//! analyzer would, but implemented with per-language regex heuristics
//! rather than a full grammar — a regex pass needs no grammar crate per
//! language and the required complexity heuristics stay simple.

use async_trait::async_trait;
use codesearch_core::{FieldType, SchemaField, ScalarValue, SkillDescriptor, StepValue};
use regex::Regex;

use crate::error::SkillExecutionError;
use crate::skill::Skill;
use crate::validation::validate_input;

pub struct CodeAnalysisSkill {
    descriptor: SkillDescriptor,
}

impl Default for CodeAnalysisSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeAnalysisSkill {
    pub fn new() -> Self {
        let descriptor = SkillDescriptor {
            name: "code_analysis".to_string(),
            description: "Extract functions, classes, and imports from a code snippet, with a complexity heuristic.".to_string(),
            input_schema: vec![
                SchemaField {
                    name: "text".to_string(),
                    field_type: FieldType::String,
                    required: true,
                    default: None,
                    description: "Source text to analyze.".to_string(),
                },
                SchemaField {
                    name: "language".to_string(),
                    field_type: FieldType::String,
                    required: false,
                    default: Some(StepValue::string("rust")),
                    description: "rust, python, javascript, or typescript.".to_string(),
                },
            ],
            output_schema: vec![
                SchemaField {
                    name: "functions".to_string(),
                    field_type: FieldType::List,
                    required: true,
                    default: None,
                    description: "Function/method names found.".to_string(),
                },
                SchemaField {
                    name: "classes".to_string(),
                    field_type: FieldType::List,
                    required: true,
                    default: None,
                    description: "Class/struct/trait names found.".to_string(),
                },
                SchemaField {
                    name: "imports".to_string(),
                    field_type: FieldType::List,
                    required: true,
                    default: None,
                    description: "Import/use statements found.".to_string(),
                },
                SchemaField {
                    name: "complexity".to_string(),
                    field_type: FieldType::Integer,
                    required: true,
                    default: None,
                    description: "Branch-keyword count, a cyclomatic-complexity proxy.".to_string(),
                },
            ],
            required_capabilities: vec![],
        };
        Self { descriptor }
    }
}

#[derive(Debug, Clone, Copy)]
struct LanguagePatterns {
    function: &'static str,
    class: &'static str,
    import: &'static str,
}

fn patterns_for(language: &str) -> LanguagePatterns {
    match language {
        "python" => LanguagePatterns {
            function: r"(?m)^\s*def\s+([A-Za-z_][A-Za-z0-9_]*)",
            class: r"(?m)^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)",
            import: r"(?m)^\s*(?:import|from)\s+.+$",
        },
        "javascript" | "typescript" => LanguagePatterns {
            function: r"(?m)^\s*(?:export\s+)?(?:async\s+)?function\s+([A-Za-z_$][A-Za-z0-9_$]*)",
            class: r"(?m)^\s*(?:export\s+)?class\s+([A-Za-z_$][A-Za-z0-9_$]*)",
            import: r"(?m)^\s*import\s+.+$",
        },
        _ => LanguagePatterns {
            function: r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?fn\s+([A-Za-z_][A-Za-z0-9_]*)",
            class: r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait)\s+([A-Za-z_][A-Za-z0-9_]*)",
            import: r"(?m)^\s*use\s+.+;$",
        },
    }
}

const BRANCH_KEYWORDS: &[&str] = &[
    "if ", "else", "for ", "while ", "match ", "case ", "catch", "except", "elif", "&&", "||",
];

fn count_complexity(text: &str) -> i64 {
    BRANCH_KEYWORDS
        .iter()
        .map(|kw| text.matches(kw).count() as i64)
        .sum::<i64>()
        + 1
}

#[async_trait]
impl Skill for CodeAnalysisSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, input: StepValue) -> Result<StepValue, SkillExecutionError> {
        validate_input(&self.descriptor.input_schema, &input)?;

        let text = match input.field("text") {
            Some(StepValue::Scalar(ScalarValue::String(s))) => s.clone(),
            _ => return Err(SkillExecutionError::MissingField("text".to_string())),
        };
        let language = match input.field("language") {
            Some(StepValue::Scalar(ScalarValue::String(s))) => s.clone(),
            _ => "rust".to_string(),
        };

        let patterns = patterns_for(&language);
        let functions = capture_names(patterns.function, &text);
        let classes = capture_names(patterns.class, &text);
        let imports = capture_whole_lines(patterns.import, &text);
        let complexity = count_complexity(&text);

        Ok(StepValue::record([
            ("functions".to_string(), StepValue::List(functions.into_iter().map(StepValue::string).collect())),
            ("classes".to_string(), StepValue::List(classes.into_iter().map(StepValue::string).collect())),
            ("imports".to_string(), StepValue::List(imports.into_iter().map(StepValue::string).collect())),
            ("complexity".to_string(), StepValue::integer(complexity)),
        ]))
    }
}

fn capture_names(pattern: &str, text: &str) -> Vec<String> {
    let re = Regex::new(pattern).expect("static pattern is valid");
    re.captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn capture_whole_lines(pattern: &str, text: &str) -> Vec<String> {
    let re = Regex::new(pattern).expect("static pattern is valid");
    re.find_iter(text).map(|m| m.as_str().trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_rust_functions_and_structs() {
        let skill = CodeAnalysisSkill::new();
        let input = StepValue::record([
            ("text".to_string(), StepValue::string("pub struct Foo;\n\npub fn bar() -> i32 {\n    if true { 1 } else { 2 }\n}\n")),
            ("language".to_string(), StepValue::string("rust")),
        ]);
        let output = skill.execute(input).await.unwrap();
        let functions = output.field("functions").unwrap();
        assert_eq!(functions.index(0).unwrap().render_as_string(), "bar");
        let classes = output.field("classes").unwrap();
        assert_eq!(classes.index(0).unwrap().render_as_string(), "Foo");
    }

    #[tokio::test]
    async fn extracts_python_imports() {
        let skill = CodeAnalysisSkill::new();
        let input = StepValue::record([
            ("text".to_string(), StepValue::string("import os\nfrom sys import argv\n\ndef main():\n    pass\n")),
            ("language".to_string(), StepValue::string("python")),
        ]);
        let output = skill.execute(input).await.unwrap();
        let imports = output.field("imports").unwrap();
        if let StepValue::List(items) = imports {
            assert_eq!(items.len(), 2);
        } else {
            panic!("expected a list");
        }
    }

    #[test]
    fn complexity_counts_branch_keywords_plus_one() {
        assert_eq!(count_complexity("no branches here"), 1);
        assert_eq!(count_complexity("if x { } else { }"), 3);
    }
}
