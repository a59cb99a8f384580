use crate::generate::context::GenerationContext;
use crate::ids::IdSource;
use crate::schema::{FieldDefinition, FieldType, GeneratedRecord, ModelDefinition, ReferenceType};
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Value};

/// Local stand-in for the AI path. Always yields `count` records with every
/// field filled according to its type.
pub fn synthesize_records(
    model: &ModelDefinition,
    ctx: &GenerationContext,
    count: usize,
    ids: &dyn IdSource,
) -> Vec<GeneratedRecord> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let mut values = Map::new();
            for field in model.fields.iter().filter(|f| f.name != "id") {
                values.insert(field.name.clone(), synth_value(field, i, ctx, &mut rng));
            }
            GeneratedRecord::new(ids.next_id(), values)
        })
        .collect()
}

fn synth_value<R: Rng>(
    field: &FieldDefinition,
    index: usize,
    ctx: &GenerationContext,
    rng: &mut R,
) -> Value {
    match field.field_type {
        FieldType::Text => Value::String(format!("{} {}", field.label(), index + 1)),
        FieldType::Number => Value::from(rng.gen_range(0..1000)),
        FieldType::Boolean => Value::Bool(rng.gen_bool(0.5)),
        FieldType::Date => {
            let day = Utc::now() - Duration::days(rng.gen_range(0..365));
            Value::String(day.format("%Y-%m-%d").to_string())
        }
        FieldType::Enum => match field.enum_values.choose(rng) {
            Some(v) => Value::String(v.clone()),
            None => Value::String(format!("{} {}", field.label(), index + 1)),
        },
        FieldType::Reference => {
            let Some((target, rt)) = field.reference_target() else {
                return Value::Null;
            };
            let known = ctx.known_ids(target);
            match rt {
                ReferenceType::ToOne => match known.choose(rng) {
                    Some(id) => Value::String(id.clone()),
                    None => Value::String(placeholder_id()),
                },
                ReferenceType::ToMany => {
                    if known.is_empty() {
                        return Value::Array(vec![Value::String(placeholder_id())]);
                    }
                    let n = rng.gen_range(1..=known.len().min(3));
                    Value::Array(
                        known
                            .choose_multiple(rng, n)
                            .map(|id| Value::String(id.clone()))
                            .collect(),
                    )
                }
            }
        }
    }
}

/// Stands in for a reference whose target has no records yet. Kept apart
/// from the record id source so record numbering is not disturbed.
fn placeholder_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
