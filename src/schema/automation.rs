use serde::{Deserialize, Serialize};

/// An agent action that reads from and/or writes to a model. Only used to
/// enrich generation prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AutomationAction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reads_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writes_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSchedule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cron expression or free-form interval, e.g. "every 15 minutes".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reads_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writes_model: Option<String>,
}

fn touches(reads: &Option<String>, writes: &Option<String>, model: &str) -> bool {
    reads.as_deref() == Some(model) || writes.as_deref() == Some(model)
}

impl AutomationAction {
    pub fn touches(&self, model: &str) -> bool {
        touches(&self.reads_model, &self.writes_model, model)
    }
}

impl AutomationSchedule {
    pub fn touches(&self, model: &str) -> bool {
        touches(&self.reads_model, &self.writes_model, model)
    }
}
