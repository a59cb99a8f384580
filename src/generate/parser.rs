use crate::generate::context::GenerationContext;
use crate::generate::error::ModelGenerationError;
use crate::schema::{FieldType, GeneratedRecord, ModelDefinition, ReferenceType};
use log::debug;
use serde_json::{Map, Value};

/// Pulls the record objects out of a structured reply. The batch must hold
/// exactly `count` objects.
pub fn extract_records(
    output: &Value,
    count: usize,
) -> Result<Vec<Map<String, Value>>, ModelGenerationError> {
    let items = match output {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("records") {
            Some(Value::Array(items)) => items,
            _ => {
                let mut arrays = obj.values().filter_map(|v| v.as_array());
                match (arrays.next(), arrays.next()) {
                    (Some(items), None) => items,
                    _ => {
                        return Err(ModelGenerationError::InvalidOutput(
                            "missing records array".to_string(),
                        ))
                    }
                }
            }
        },
        _ => {
            return Err(ModelGenerationError::InvalidOutput(
                "reply is neither an object nor an array".to_string(),
            ))
        }
    };

    if items.len() != count {
        return Err(ModelGenerationError::CountMismatch {
            expected: count,
            actual: items.len(),
        });
    }

    items
        .iter()
        .map(|it| match it {
            Value::Object(m) => Ok(m.clone()),
            other => Err(ModelGenerationError::InvalidOutput(format!(
                "record is not an object: {other}"
            ))),
        })
        .collect()
}

/// Checks scalar fields against their declared types, coercing the obvious
/// cases (numeric strings, "true"/"false", enum casing). Keys the model does
/// not declare are dropped. Reference fields are left to
/// [`repair_references`].
pub fn conform_record(
    values: &mut Map<String, Value>,
    model: &ModelDefinition,
) -> Result<(), ModelGenerationError> {
    values.retain(|key, _| key != "id" && model.fields.iter().any(|f| &f.name == key));
    for field in &model.fields {
        if field.field_type == FieldType::Reference || field.name == "id" {
            continue;
        }
        let mismatch = |expected: &str| ModelGenerationError::FieldMismatch {
            field: field.name.clone(),
            expected: expected.to_string(),
        };

        let current = match values.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(mismatch("required value"));
                }
                continue;
            }
            Some(v) => v.clone(),
        };

        let fixed = match (field.field_type, current) {
            (FieldType::Number, Value::Number(n)) => Value::Number(n),
            (FieldType::Number, Value::String(s)) => parse_number(s.trim()).ok_or_else(|| mismatch("number"))?,
            (FieldType::Number, _) => return Err(mismatch("number")),

            (FieldType::Boolean, Value::Bool(b)) => Value::Bool(b),
            (FieldType::Boolean, Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(mismatch("boolean")),
            },
            (FieldType::Boolean, _) => return Err(mismatch("boolean")),

            (FieldType::Enum, Value::String(s)) if !field.enum_values.is_empty() => field
                .enum_values
                .iter()
                .find(|v| v.eq_ignore_ascii_case(s.trim()))
                .map(|v| Value::String(v.clone()))
                .ok_or_else(|| mismatch("enum value"))?,
            (FieldType::Enum, Value::String(s)) => Value::String(s),
            (FieldType::Enum, _) => return Err(mismatch("enum value")),

            (_, Value::String(s)) => Value::String(s),
            (_, v @ (Value::Number(_) | Value::Bool(_))) => Value::String(v.to_string()),
            (_, _) => return Err(mismatch("string")),
        };
        values.insert(field.name.clone(), fixed);
    }
    Ok(())
}

/// Integers stay integers; anything else numeric becomes a float.
fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

/// Points every reference at an id the target model actually has. Targets
/// with no known ids are left untouched. Returns the number of repaired
/// values.
pub fn repair_references(
    records: &mut [GeneratedRecord],
    model: &ModelDefinition,
    ctx: &GenerationContext,
) -> usize {
    let mut repaired = 0usize;
    for (field, target, rt) in model.reference_fields() {
        let known = ctx.known_ids(target);
        let Some(first) = known.first() else {
            continue;
        };
        let is_known = |id: &str| known.iter().any(|k| k == id);

        for rec in records.iter_mut() {
            match rt {
                ReferenceType::ToOne => {
                    let valid = rec
                        .get(&field.name)
                        .and_then(|v| v.as_str())
                        .map(is_known)
                        .unwrap_or(false);
                    if !valid {
                        rec.set(&field.name, Value::String(first.clone()));
                        repaired += 1;
                    }
                }
                ReferenceType::ToMany => {
                    let produced: Vec<Value> = match rec.get(&field.name) {
                        None | Some(Value::Null) => continue,
                        Some(Value::Array(items)) => items.clone(),
                        Some(single) => vec![single.clone()],
                    };
                    let mut kept: Vec<Value> = Vec::new();
                    for v in &produced {
                        if let Some(id) = v.as_str() {
                            if is_known(id) && !kept.iter().any(|k| k.as_str() == Some(id)) {
                                kept.push(Value::String(id.to_string()));
                            }
                        }
                    }
                    if kept.is_empty() && !produced.is_empty() {
                        kept.push(Value::String(first.clone()));
                    }
                    if kept.len() != produced.len() || !rec.get(&field.name).is_some_and(Value::is_array) {
                        repaired += 1;
                    }
                    rec.set(&field.name, Value::Array(kept));
                }
            }
        }
    }
    if repaired > 0 {
        debug!("{}: repaired {} reference values", model.name, repaired);
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDefinition;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn ctx_with(model: &str, ids: &[&str]) -> GenerationContext {
        let m = ModelDefinition::new(model, vec![]);
        let mut ctx = GenerationContext::new();
        ctx.record_model(
            &m,
            ids.iter().map(|id| GeneratedRecord::new(*id, Map::new())).collect(),
        );
        ctx
    }

    #[test]
    fn extracts_exact_count() {
        let out = json!({"records": [{"a": 1}, {"a": 2}]});
        assert_eq!(extract_records(&out, 2).unwrap().len(), 2);
        assert!(matches!(
            extract_records(&out, 3),
            Err(ModelGenerationError::CountMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn accepts_single_unnamed_array() {
        let out = json!({"pets": [{"a": 1}]});
        assert_eq!(extract_records(&out, 1).unwrap().len(), 1);
        assert!(extract_records(&json!({"x": 1}), 0).is_err());
        assert!(extract_records(&json!({"records": [1]}), 1).is_err());
    }

    #[test]
    fn conform_coerces_and_rejects() {
        let model = ModelDefinition::new(
            "Pet",
            vec![
                FieldDefinition::new("age", FieldType::Number),
                FieldDefinition::new("vaccinated", FieldType::Boolean),
                FieldDefinition::new("kind", FieldType::Enum).with_enum_values(&["Cat", "Dog"]),
                FieldDefinition::new("name", FieldType::Text).required(),
            ],
        );
        let mut v = obj(json!({
            "id": "x", "age": "3", "vaccinated": "TRUE", "kind": "dog", "name": 7, "colour": "red"
        }));
        conform_record(&mut v, &model).unwrap();
        assert_eq!(v["age"], json!(3));
        assert!(v["age"].is_i64());
        assert!(!v.contains_key("colour"));
        assert!(!v.contains_key("id"));
        assert_eq!(v["vaccinated"], json!(true));
        assert_eq!(v["kind"], json!("Dog"));
        assert_eq!(v["name"], json!("7"));

        let mut bad = obj(json!({"kind": "hamster", "name": "x"}));
        assert!(matches!(
            conform_record(&mut bad, &model),
            Err(ModelGenerationError::FieldMismatch { .. })
        ));

        let mut weight = obj(json!({"age": " 2.5 ", "name": "x"}));
        conform_record(&mut weight, &model).unwrap();
        assert_eq!(weight["age"], json!(2.5));

        let mut missing = obj(json!({"age": 1}));
        assert!(conform_record(&mut missing, &model).is_err());
    }

    #[test]
    fn to_one_repaired_to_first_known_id() {
        let model = ModelDefinition::new(
            "Pet",
            vec![FieldDefinition::reference("owner", "Owner", ReferenceType::ToOne)],
        );
        let ctx = ctx_with("Owner", &["o1", "o2"]);
        let mut recs = vec![
            GeneratedRecord::new("p1", obj(json!({"owner": "o2"}))),
            GeneratedRecord::new("p2", obj(json!({"owner": "ghost"}))),
            GeneratedRecord::new("p3", Map::new()),
        ];
        assert_eq!(repair_references(&mut recs, &model, &ctx), 2);
        assert_eq!(recs[0].get("owner"), Some(&json!("o2")));
        assert_eq!(recs[1].get("owner"), Some(&json!("o1")));
        assert_eq!(recs[2].get("owner"), Some(&json!("o1")));
    }

    #[test]
    fn to_many_filtered_with_first_id_fallback() {
        let model = ModelDefinition::new(
            "Owner",
            vec![FieldDefinition::reference("pets", "Pet", ReferenceType::ToMany)],
        );
        let ctx = ctx_with("Pet", &["p1", "p2"]);
        let mut recs = vec![
            GeneratedRecord::new("o1", obj(json!({"pets": ["p2", "bogus", "p2"]}))),
            GeneratedRecord::new("o2", obj(json!({"pets": ["bogus"]}))),
            GeneratedRecord::new("o3", obj(json!({"pets": []}))),
        ];
        repair_references(&mut recs, &model, &ctx);
        assert_eq!(recs[0].get("pets"), Some(&json!(["p2"])));
        assert_eq!(recs[1].get("pets"), Some(&json!(["p1"])));
        assert_eq!(recs[2].get("pets"), Some(&json!([])));
    }

    #[test]
    fn no_known_ids_means_no_repair() {
        let model = ModelDefinition::new(
            "Employee",
            vec![FieldDefinition::reference("manager", "Employee", ReferenceType::ToOne)],
        );
        let ctx = GenerationContext::new();
        let mut recs = vec![GeneratedRecord::new("e1", obj(json!({"manager": "anyone"})))];
        assert_eq!(repair_references(&mut recs, &model, &ctx), 0);
        assert_eq!(recs[0].get("manager"), Some(&json!("anyone")));
    }
}
