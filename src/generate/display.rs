use crate::schema::{FieldType, GeneratedRecord, ModelDefinition};
use serde_json::Value;

const DESCRIPTIVE_HINTS: [&str; 6] = ["title", "label", "description", "species", "type", "category"];

/// Fields used to summarize a record of `model` when it is referenced from
/// elsewhere. Declared `displayFields` win; otherwise the choice is a pure
/// function of field names and types in declaration order.
pub fn resolve_display_fields(model: &ModelDefinition) -> Vec<String> {
    if !model.display_fields.is_empty() {
        return model.display_fields.clone();
    }

    let mut out: Vec<String> = Vec::new();

    let primary = model.fields.iter().find(|f| {
        let n = f.name.to_lowercase();
        n.contains("name") || n.contains("title")
    });
    if let Some(f) = primary {
        out.push(f.name.clone());
    }

    for f in &model.fields {
        if f.field_type != FieldType::Text || out.contains(&f.name) {
            continue;
        }
        let n = f.name.to_lowercase();
        if DESCRIPTIVE_HINTS.iter().any(|h| n.contains(h)) {
            out.push(f.name.clone());
        }
    }

    if out.is_empty() {
        if let Some(f) = model.fields.iter().find(|f| f.field_type == FieldType::Text) {
            out.push(f.name.clone());
        }
    }

    if out.is_empty() {
        out.push("id".to_string());
    }
    out
}

/// Working copy of `model` with display fields filled in.
pub fn with_display_fields(model: &ModelDefinition) -> ModelDefinition {
    let mut m = model.clone();
    m.display_fields = resolve_display_fields(model);
    m
}

/// Display fields' values joined by " - ". Falls back to the record id.
pub fn display_string(record: &GeneratedRecord, display_fields: &[String]) -> String {
    let parts: Vec<String> = display_fields
        .iter()
        .filter_map(|f| {
            if f == "id" {
                return Some(record.id.clone());
            }
            match record.get(f)? {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        })
        .collect();
    if parts.is_empty() {
        record.id.clone()
    } else {
        parts.join(" - ")
    }
}
