use crate::generate::context::GenerationContext;
use crate::schema::{FieldDefinition, FieldType, ModelDefinition, ReferenceType};
use serde_json::{json, Map, Value};

/// JSON schema for one field plus whether it is required. Reference fields
/// whose target has no ids yet are optional and unconstrained.
pub fn field_schema(field: &FieldDefinition, ctx: &GenerationContext) -> (Value, bool) {
    let mut schema = match field.field_type {
        FieldType::Text => json!({"type": "string"}),
        FieldType::Number => json!({"type": "number"}),
        FieldType::Boolean => json!({"type": "boolean"}),
        FieldType::Date => json!({"type": "string", "format": "date"}),
        FieldType::Enum if !field.enum_values.is_empty() => {
            json!({"type": "string", "enum": field.enum_values})
        }
        FieldType::Enum => json!({"type": "string"}),
        FieldType::Reference => return reference_schema(field, ctx),
    };
    if let Some(desc) = field.description.as_deref().filter(|d| !d.trim().is_empty()) {
        schema["description"] = json!(desc);
    }
    (schema, field.required)
}

fn reference_schema(field: &FieldDefinition, ctx: &GenerationContext) -> (Value, bool) {
    let Some((target, rt)) = field.reference_target() else {
        return (json!({"type": "string"}), false);
    };
    let known = ctx.known_ids(target);
    let id_schema = if known.is_empty() {
        json!({"type": "string"})
    } else {
        json!({"type": "string", "enum": known})
    };
    let mut schema = match rt {
        ReferenceType::ToOne => id_schema,
        ReferenceType::ToMany => json!({"type": "array", "items": id_schema}),
    };
    schema["description"] = json!(format!(
        "{} id(s) of {}{}",
        rt.as_str(),
        target,
        field
            .description
            .as_deref()
            .map(|d| format!(": {d}"))
            .unwrap_or_default()
    ));
    (schema, field.required && !known.is_empty())
}

/// Output schema for a whole batch: `{"records": [...]}` holding exactly
/// `count` objects. `id` is never part of it.
pub fn model_output_schema(model: &ModelDefinition, ctx: &GenerationContext, count: usize) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in model.fields.iter().filter(|f| f.name != "id") {
        let (schema, is_required) = field_schema(field, ctx);
        properties.insert(field.name.clone(), schema);
        if is_required {
            required.push(Value::String(field.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": {
            "records": {
                "type": "array",
                "minItems": count,
                "maxItems": count,
                "items": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false
                }
            }
        },
        "required": ["records"],
        "additionalProperties": false
    })
}
