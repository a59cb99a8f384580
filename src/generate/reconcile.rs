use crate::schema::{GeneratedRecord, ModelDefinition, ReferenceType};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

struct MirrorLink {
    target_model: String,
    target_id: String,
    mirror_field: String,
    mirror_type: ReferenceType,
    source_id: String,
}

/// Reference field on `target` pointing back at `source`. A self-referencing
/// field is never its own mirror.
fn find_mirror<'m>(
    models: &'m [ModelDefinition],
    source: &str,
    source_field: &str,
    target: &str,
) -> Option<(&'m str, ReferenceType)> {
    let target_model = models.iter().find(|m| m.name == target)?;
    target_model
        .reference_fields()
        .find(|(f, refs, _)| *refs == source && !(target == source && f.name == source_field))
        .map(|(f, _, rt)| (f.name.as_str(), rt))
}

/// Back-fills the other side of every reference pair that has a mirror field.
/// to_many mirrors gain the source id once; to_one mirrors are overwritten,
/// so the last source record wins.
pub fn reconcile_references(
    models: &[ModelDefinition],
    records: &mut BTreeMap<String, Vec<GeneratedRecord>>,
) -> usize {
    let mut applied = 0usize;
    for model in models {
        for (field, target, _) in model.reference_fields() {
            let Some((mirror_field, mirror_type)) = find_mirror(models, &model.name, &field.name, target)
            else {
                continue;
            };

            let mut links = Vec::new();
            for rec in records.get(&model.name).map(|v| v.as_slice()).unwrap_or(&[]) {
                let referenced: Vec<String> = match rec.get(&field.name) {
                    Some(Value::String(id)) if !id.is_empty() => vec![id.clone()],
                    Some(Value::Array(_)) => rec.id_list(&field.name),
                    _ => continue,
                };
                for target_id in referenced {
                    links.push(MirrorLink {
                        target_model: target.to_string(),
                        target_id,
                        mirror_field: mirror_field.to_string(),
                        mirror_type,
                        source_id: rec.id.clone(),
                    });
                }
            }

            for link in links {
                if apply_link(records, &link) {
                    applied += 1;
                }
            }
        }
    }
    debug!("reconciled {applied} reference links");
    applied
}

fn apply_link(records: &mut BTreeMap<String, Vec<GeneratedRecord>>, link: &MirrorLink) -> bool {
    let Some(target) = records
        .get_mut(&link.target_model)
        .and_then(|recs| recs.iter_mut().find(|r| r.id == link.target_id))
    else {
        return false;
    };

    match link.mirror_type {
        ReferenceType::ToMany => {
            let mut ids = match target.get(&link.mirror_field) {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            if ids.iter().any(|v| v.as_str() == Some(link.source_id.as_str())) {
                return false;
            }
            ids.push(Value::String(link.source_id.clone()));
            target.set(&link.mirror_field, Value::Array(ids));
        }
        ReferenceType::ToOne => {
            target.set(&link.mirror_field, Value::String(link.source_id.clone()));
        }
    }
    true
}
