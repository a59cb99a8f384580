use crate::generate::context::GenerationContext;
use crate::schema::{
    AutomationAction, AutomationSchedule, FieldDefinition, FieldType, ModelDefinition,
};

pub const SYSTEM_PROMPT: &str = "You generate realistic sample data for an AI agent's data models. \
Respond only with JSON matching the provided schema.";

pub struct PromptBuilder<'a> {
    agent_name: &'a str,
    agent_description: &'a str,
    actions: Vec<&'a AutomationAction>,
    schedules: Vec<&'a AutomationSchedule>,
    sample_size: usize,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(agent_name: &'a str, agent_description: &'a str, sample_size: usize) -> Self {
        Self {
            agent_name,
            agent_description,
            actions: Vec::new(),
            schedules: Vec::new(),
            sample_size,
        }
    }

    /// Keeps only the automation that reads or writes `model`.
    pub fn with_automation(
        mut self,
        model: &str,
        actions: &'a [AutomationAction],
        schedules: &'a [AutomationSchedule],
    ) -> Self {
        self.actions = actions.iter().filter(|a| a.touches(model)).collect();
        self.schedules = schedules.iter().filter(|s| s.touches(model)).collect();
        self
    }

    pub fn build(&self, model: &ModelDefinition, ctx: &GenerationContext, count: usize) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "Generate exactly {count} realistic records for the \"{}\" model.",
            model.name
        ));
        if !self.agent_name.is_empty() {
            lines.push(format!("These records belong to the AI agent \"{}\".", self.agent_name));
        }
        if !self.agent_description.is_empty() {
            lines.push(format!("Agent description: {}", self.agent_description));
        }
        lines.push("".to_string());

        lines.push("Fields:".to_string());
        for f in &model.fields {
            lines.push(describe_field(f));
        }
        lines.push("".to_string());

        for f in &model.fields {
            let Some((target, rt)) = f.reference_target() else {
                continue;
            };
            let known = ctx.known_ids(target);
            if known.is_empty() {
                lines.push(format!(
                    "Field \"{}\" references {target} ({}), which has no records yet; leave it empty or omit it.",
                    f.name,
                    rt.as_str()
                ));
                continue;
            }
            lines.push(format!(
                "Available {target} records for field \"{}\" ({}):",
                f.name,
                rt.as_str()
            ));
            for id in known.iter().take(self.sample_size) {
                let label = ctx.display_of(target, id).unwrap_or(id.as_str());
                lines.push(format!("- {id}: {label}"));
            }
            if known.len() > self.sample_size {
                lines.push(format!("... and {} more.", known.len() - self.sample_size));
            }
            lines.push(format!("Valid {target} IDs: {}", known.join(", ")));
            lines.push("Only use IDs from this list.".to_string());
            lines.push("".to_string());
        }

        if !model.display_fields.is_empty() {
            lines.push(format!(
                "Records are displayed by: {}. Make these values distinct and descriptive.",
                model.display_fields.join(", ")
            ));
        }

        if !self.actions.is_empty() || !self.schedules.is_empty() {
            lines.push("".to_string());
            lines.push("This model is used by the agent's automation:".to_string());
            for a in &self.actions {
                lines.push(format!(
                    "- action \"{}\"{}",
                    a.name,
                    a.description
                        .as_deref()
                        .map(|d| format!(": {d}"))
                        .unwrap_or_default()
                ));
            }
            for s in &self.schedules {
                lines.push(format!(
                    "- schedule \"{}\"{}{}",
                    s.name,
                    s.interval
                        .as_deref()
                        .map(|i| format!(" ({i})"))
                        .unwrap_or_default(),
                    s.description
                        .as_deref()
                        .map(|d| format!(": {d}"))
                        .unwrap_or_default()
                ));
            }
            lines.push(
                "Include realistic status and timestamp values that this automation could act on, \
                 mixing records that are pending, in progress and completed."
                    .to_string(),
            );
        }

        lines.push("".to_string());
        lines.push("Rules:".to_string());
        lines.push(format!("1. Return exactly {count} records in the \"records\" array."));
        lines.push("2. Do not include an \"id\" field; ids are assigned later.".to_string());
        lines.push("3. Dates use the YYYY-MM-DD format.".to_string());
        lines.push("4. Vary the values; avoid placeholders like \"Sample 1\".".to_string());

        lines.join("\n")
    }
}

fn describe_field(f: &FieldDefinition) -> String {
    let mut line = format!("- {} ({}): {}", f.name, f.label(), type_hint(f));
    if f.required {
        line.push_str(", required");
    }
    if let Some(desc) = f.description.as_deref().filter(|d| !d.trim().is_empty()) {
        line.push_str(" - ");
        line.push_str(desc);
    }
    line
}

fn type_hint(f: &FieldDefinition) -> String {
    match f.field_type {
        FieldType::Text => "text".to_string(),
        FieldType::Number => "number".to_string(),
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Date => "date (YYYY-MM-DD)".to_string(),
        FieldType::Enum if f.enum_values.is_empty() => "text".to_string(),
        FieldType::Enum => format!("one of [{}]", f.enum_values.join(", ")),
        FieldType::Reference => match f.reference_target() {
            Some((target, rt)) => format!("reference to {target} ({})", rt.as_str()),
            None => "reference".to_string(),
        },
    }
}
