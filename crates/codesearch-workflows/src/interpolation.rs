//! The `{{ ... }}` interpolation evaluator (§4.9).
//!
//! Used in two passes over the same kind of raw step input
//! (`BTreeMap<String, serde_json::Value>`): a lenient pass that substitutes
//! `{{ param_name }}` references during template resolution and leaves any
//! other placeholder untouched, and a strict pass during step execution that
//! resolves `{{ step_id.path }}` references against completed step outputs
//! and fails on anything left unresolved. `path` supports dot-separated
//! field access and `[n]` index access, built on `StepValue::field`/`index`.

use std::collections::BTreeMap;

use codesearch_core::StepValue;

/// Splits one dotted path segment like `results[0][1]` into its field name
/// (empty if the segment is a bare index) and its index chain.
fn parse_segment(segment: &str) -> (&str, Vec<usize>) {
    let mut indices = Vec::new();
    let name_end = segment.find('[').unwrap_or(segment.len());
    let name = &segment[..name_end];
    let mut rest = &segment[name_end..];
    while let Some(close) = rest.find(']') {
        if let Some(idx) = rest.get(1..close).and_then(|s| s.parse::<usize>().ok()) {
            indices.push(idx);
        }
        rest = &rest[close + 1..];
    }
    (name, indices)
}

/// Resolves a dotted path like `s1.results[0].path` against a map of named
/// roots (parameters or step outputs). The first segment names the root;
/// subsequent segments navigate field/index access in sequence.
pub fn resolve_reference(path: &str, roots: &BTreeMap<String, StepValue>) -> Option<StepValue> {
    let mut segments = path.split('.');
    let (root_name, root_indices) = parse_segment(segments.next()?);
    let mut current = roots.get(root_name)?.clone();
    for idx in root_indices {
        current = current.index(idx)?.clone();
    }
    for segment in segments {
        let (name, indices) = parse_segment(segment);
        if !name.is_empty() {
            current = current.field(name)?.clone();
        }
        for idx in indices {
            current = current.index(idx)?.clone();
        }
    }
    Some(current)
}

fn is_whole_placeholder(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.len() == s.len() && trimmed.starts_with("{{") && trimmed.ends_with("}}") {
        Some(trimmed[2..trimmed.len() - 2].trim())
    } else {
        None
    }
}

/// Lenient substitution pass: resolves what it can against `roots`, leaves
/// any reference it can't resolve as a literal `{{ reference }}` string so a
/// later strict pass can resolve it against a different root set.
pub fn substitute_lenient(value: &serde_json::Value, roots: &BTreeMap<String, StepValue>) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => substitute_lenient_string(s, roots),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(|v| substitute_lenient(v, roots)).collect())
        }
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_lenient(v, roots)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute_lenient_string(s: &str, roots: &BTreeMap<String, StepValue>) -> serde_json::Value {
    if let Some(reference) = is_whole_placeholder(s) {
        return match resolve_reference(reference, roots) {
            Some(v) => serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
            None => serde_json::Value::String(s.to_string()),
        };
    }

    let mut result = String::new();
    let mut rest = s;
    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let reference = after[..end].trim();
                match resolve_reference(reference, roots) {
                    Some(v) => result.push_str(&v.render_as_string()),
                    None => result.push_str(&format!("{{{{ {reference} }}}}")),
                }
                rest = &after[end + 2..];
            }
            None => {
                result.push_str("{{");
                rest = after;
                break;
            }
        }
    }
    result.push_str(rest);
    serde_json::Value::String(result)
}

/// Strict resolution pass: every `{{ ... }}` placeholder must resolve
/// against `roots`, or this returns the unresolved reference text.
pub fn resolve_strict(value: &serde_json::Value, roots: &BTreeMap<String, StepValue>) -> Result<StepValue, String> {
    match value {
        serde_json::Value::String(s) => resolve_strict_string(s, roots),
        serde_json::Value::Null => Ok(StepValue::Null),
        serde_json::Value::Bool(b) => Ok(StepValue::boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(StepValue::integer(i))
            } else {
                Ok(StepValue::float(n.as_f64().unwrap_or(0.0)))
            }
        }
        serde_json::Value::Array(items) => {
            let resolved = items
                .iter()
                .map(|v| resolve_strict(v, roots))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(StepValue::List(resolved))
        }
        serde_json::Value::Object(map) => {
            let mut record = BTreeMap::new();
            for (k, v) in map {
                record.insert(k.clone(), resolve_strict(v, roots)?);
            }
            Ok(StepValue::Record(record))
        }
    }
}

fn resolve_strict_string(s: &str, roots: &BTreeMap<String, StepValue>) -> Result<StepValue, String> {
    if let Some(reference) = is_whole_placeholder(s) {
        return resolve_reference(reference, roots).ok_or_else(|| reference.to_string());
    }

    let mut result = String::new();
    let mut rest = s;
    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| s.to_string())?;
        let reference = after[..end].trim();
        let value = resolve_reference(reference, roots).ok_or_else(|| reference.to_string())?;
        result.push_str(&value.render_as_string());
        rest = &after[end + 2..];
    }
    result.push_str(rest);
    Ok(StepValue::string(result))
}

/// Converts a step's raw input map into a single `serde_json::Value::Object`
/// for uniform tree-walking.
pub fn input_as_json(input: &BTreeMap<String, serde_json::Value>) -> serde_json::Value {
    serde_json::Value::Object(input.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}
