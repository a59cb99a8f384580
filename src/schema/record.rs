use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One synthesized record: a locally assigned id plus field values keyed by
/// field name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeneratedRecord {
    pub id: String,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl GeneratedRecord {
    pub fn new(id: impl Into<String>, mut values: Map<String, Value>) -> Self {
        values.remove("id");
        Self {
            id: id.into(),
            values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        if field == "id" {
            return None;
        }
        self.values.get(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
    }

    /// String ids held by a to_many field; non-string entries are skipped.
    pub fn id_list(&self, field: &str) -> Vec<String> {
        match self.values.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }
}
