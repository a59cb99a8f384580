use crate::generate::display::display_string;
use crate::schema::{GeneratedRecord, ModelDefinition};
use std::collections::{BTreeMap, HashMap};

/// Per-run state shared between model generation steps. Dropped when the
/// run ends.
#[derive(Debug, Default)]
pub struct GenerationContext {
    record_ids: HashMap<String, Vec<String>>,
    record_display: HashMap<String, HashMap<String, String>>,
    records: BTreeMap<String, Vec<GeneratedRecord>>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a finished model: its ids, display strings and records.
    pub fn record_model(&mut self, model: &ModelDefinition, records: Vec<GeneratedRecord>) {
        let ids = self.record_ids.entry(model.name.clone()).or_default();
        let display = self.record_display.entry(model.name.clone()).or_default();
        for r in &records {
            ids.push(r.id.clone());
            display.insert(r.id.clone(), display_string(r, &model.display_fields));
        }
        self.records
            .entry(model.name.clone())
            .or_default()
            .extend(records);
    }

    pub fn known_ids(&self, model: &str) -> &[String] {
        self.record_ids.get(model).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn display_of(&self, model: &str, id: &str) -> Option<&str> {
        self.record_display
            .get(model)
            .and_then(|m| m.get(id))
            .map(|s| s.as_str())
    }

    pub fn into_records(self) -> BTreeMap<String, Vec<GeneratedRecord>> {
        self.records
    }
}
