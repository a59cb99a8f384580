use crate::ai::{generate_structured, ChatRequest, LlmError, LlmProvider};
use crate::config::GenerateConfig;
use crate::generate::context::GenerationContext;
use crate::generate::dependency::{analyze_dependencies, sequence_models};
use crate::generate::display::with_display_fields;
use crate::generate::error::{GenerateError, ModelGenerationError};
use crate::generate::fallback::synthesize_records;
use crate::generate::output_schema::model_output_schema;
use crate::generate::parser::{conform_record, extract_records, repair_references};
use crate::generate::prompt::{PromptBuilder, SYSTEM_PROMPT};
use crate::generate::reconcile::reconcile_references;
use crate::ids::{IdSource, UuidSource};
use crate::schema::{AutomationAction, AutomationSchedule, GeneratedRecord, ModelDefinition};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Everything one run needs from the caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub agent_description: String,
    pub models: Vec<ModelDefinition>,
    #[serde(default)]
    pub actions: Vec<AutomationAction>,
    #[serde(default)]
    pub schedules: Vec<AutomationSchedule>,
    /// Overrides `GenerateConfig::records_per_model` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordSource {
    Ai,
    Fallback,
}

#[derive(Clone, Debug)]
pub struct ModelBatch {
    pub records: Vec<GeneratedRecord>,
    pub source: RecordSource,
}

pub struct GeneratorService<P: LlmProvider> {
    provider: P,
    cfg: GenerateConfig,
    ids: Arc<dyn IdSource>,
}

impl<P: LlmProvider> GeneratorService<P> {
    pub fn new(provider: P, cfg: GenerateConfig) -> Self {
        Self {
            provider,
            cfg,
            ids: Arc::new(UuidSource),
        }
    }

    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Generates every model in dependency order, then back-fills mirror
    /// references. Per-model failures fall back to synthetic data and never
    /// fail the run.
    pub async fn generate_sequential_records(
        &self,
        req: &GenerationRequest,
    ) -> Result<BTreeMap<String, Vec<GeneratedRecord>>, GenerateError> {
        validate_models(&req.models)?;
        let count = req.count.unwrap_or(self.cfg.records_per_model);

        let edges = analyze_dependencies(&req.models);
        let order = sequence_models(&req.models, &edges);
        info!(
            "generating {} records each for {} models: {}",
            count,
            order.models.len(),
            order.names().join(" -> ")
        );

        let working: Vec<ModelDefinition> = order.models.iter().map(with_display_fields).collect();
        let mut ctx = GenerationContext::new();
        let mut fallbacks = 0usize;
        for model in &working {
            let batch = self.generate_model_records(model, &ctx, req, count).await;
            if batch.source == RecordSource::Fallback {
                fallbacks += 1;
            }
            info!("{}: {} records ({:?})", model.name, batch.records.len(), batch.source);
            ctx.record_model(model, batch.records);
        }

        let mut records = ctx.into_records();
        reconcile_references(&working, &mut records);
        if fallbacks > 0 {
            warn!("{fallbacks} of {} models used synthetic fallback data", working.len());
        }
        Ok(records)
    }

    /// Generates `count` records for one model. Falls back to local
    /// synthesis when the AI call or its output is unusable; references are
    /// repaired either way.
    pub async fn generate_model_records(
        &self,
        model: &ModelDefinition,
        ctx: &GenerationContext,
        req: &GenerationRequest,
        count: usize,
    ) -> ModelBatch {
        if count == 0 {
            return ModelBatch {
                records: Vec::new(),
                source: RecordSource::Ai,
            };
        }

        let (mut records, source) = match self.generate_with_ai(model, ctx, req, count).await {
            Ok(records) => (records, RecordSource::Ai),
            Err(e) => {
                warn!("{}: AI generation failed, using synthetic records: {}", model.name, e);
                (
                    synthesize_records(model, ctx, count, self.ids.as_ref()),
                    RecordSource::Fallback,
                )
            }
        };
        repair_references(&mut records, model, ctx);
        ModelBatch { records, source }
    }

    async fn generate_with_ai(
        &self,
        model: &ModelDefinition,
        ctx: &GenerationContext,
        req: &GenerationRequest,
        count: usize,
    ) -> Result<Vec<GeneratedRecord>, ModelGenerationError> {
        let prompt = PromptBuilder::new(
            &req.agent_name,
            &req.agent_description,
            self.cfg.reference_sample_size,
        )
        .with_automation(&model.name, &req.actions, &req.schedules)
        .build(model, ctx, count);
        let schema = model_output_schema(model, ctx, count);

        let chat = ChatRequest {
            model: self.cfg.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            user: prompt,
            temperature: self.cfg.temperature,
            max_tokens: self.cfg.max_tokens,
            response_format: None,
        };
        let name = schema_name(&model.name);
        let call = generate_structured(&self.provider, chat, &name, schema);
        let output = tokio::time::timeout(self.cfg.request_timeout, call)
            .await
            .map_err(|_| LlmError::Timeout)??;

        let mut records = Vec::with_capacity(count);
        for mut values in extract_records(&output, count)? {
            conform_record(&mut values, model)?;
            records.push(GeneratedRecord::new(self.ids.next_id(), values));
        }
        Ok(records)
    }
}

fn validate_models(models: &[ModelDefinition]) -> Result<(), GenerateError> {
    let mut seen = HashSet::new();
    for m in models {
        if m.name.trim().is_empty() {
            return Err(GenerateError::EmptyModelName);
        }
        if !seen.insert(m.name.as_str()) {
            return Err(GenerateError::DuplicateModel(m.name.clone()));
        }
    }
    Ok(())
}

/// Provider schema names allow `[A-Za-z0-9_-]` only.
fn schema_name(model: &str) -> String {
    let cleaned: String = model
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{cleaned}_records")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatResponse;
    use crate::ids::SequentialIds;
    use crate::schema::{FieldDefinition, FieldType, ReferenceType};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replies with queued texts in order; an empty queue is an error.
    struct Scripted {
        replies: Mutex<Vec<Result<String, LlmError>>>,
    }

    impl Scripted {
        fn new(mut replies: Vec<Result<String, LlmError>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse, LlmError> {
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(LlmError::Unavailable("script exhausted".to_string())));
            next.map(|text| ChatResponse { text, raw: None })
        }
    }

    fn service(replies: Vec<Result<String, LlmError>>) -> GeneratorService<Scripted> {
        GeneratorService::new(Scripted::new(replies), GenerateConfig::default())
            .with_id_source(Arc::new(SequentialIds::new("r")))
    }

    fn pet() -> ModelDefinition {
        ModelDefinition::new(
            "Pet",
            vec![
                FieldDefinition::new("name", FieldType::Text).required(),
                FieldDefinition::new("age", FieldType::Number),
                FieldDefinition::reference("owner", "Owner", ReferenceType::ToOne),
            ],
        )
    }

    #[tokio::test]
    async fn ai_records_get_local_ids() {
        let reply = json!({"records": [
            {"id": "model-made", "name": "Rex", "age": 3},
            {"name": "Tom", "age": 5}
        ]})
        .to_string();
        let svc = service(vec![Ok(reply)]);
        let req = GenerationRequest::default();
        let batch = svc
            .generate_model_records(&pet(), &GenerationContext::new(), &req, 2)
            .await;
        assert_eq!(batch.source, RecordSource::Ai);
        assert_eq!(batch.records[0].id, "r-1");
        assert_eq!(batch.records[1].id, "r-2");
        assert_eq!(batch.records[0].get("name"), Some(&json!("Rex")));
    }

    #[tokio::test]
    async fn wrong_count_falls_back_entirely() {
        let reply = json!({"records": [{"name": "Rex"}]}).to_string();
        let svc = service(vec![Ok(reply)]);
        let batch = svc
            .generate_model_records(&pet(), &GenerationContext::new(), &GenerationRequest::default(), 3)
            .await;
        assert_eq!(batch.source, RecordSource::Fallback);
        assert_eq!(batch.records.len(), 3);
        assert!(batch.records.iter().all(|r| r.get("name") != Some(&json!("Rex"))));
    }

    #[tokio::test]
    async fn provider_error_falls_back() {
        let svc = service(vec![Err(LlmError::RateLimited)]);
        let batch = svc
            .generate_model_records(&pet(), &GenerationContext::new(), &GenerationRequest::default(), 4)
            .await;
        assert_eq!(batch.source, RecordSource::Fallback);
        assert_eq!(batch.records.len(), 4);
    }

    /// Accepts the call and never answers.
    struct Stalled;

    #[async_trait]
    impl LlmProvider for Stalled {
        async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse, LlmError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn stalled_provider_falls_back_after_timeout() {
        let cfg = GenerateConfig {
            request_timeout: Duration::from_millis(50),
            ..GenerateConfig::default()
        };
        let svc = GeneratorService::new(Stalled, cfg).with_id_source(Arc::new(SequentialIds::new("s")));
        let started = std::time::Instant::now();
        let batch = svc
            .generate_model_records(&pet(), &GenerationContext::new(), &GenerationRequest::default(), 3)
            .await;
        assert_eq!(batch.source, RecordSource::Fallback);
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.records[0].id, "s-1");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn zero_count_skips_the_provider() {
        let svc = service(vec![]);
        let batch = svc
            .generate_model_records(&pet(), &GenerationContext::new(), &GenerationRequest::default(), 0)
            .await;
        assert!(batch.records.is_empty());
    }

    #[tokio::test]
    async fn duplicate_models_fail_the_run() {
        let svc = service(vec![]);
        let req = GenerationRequest {
            models: vec![pet(), pet()],
            ..Default::default()
        };
        let err = svc.generate_sequential_records(&req).await.unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateModel(name) if name == "Pet"));
    }

    #[test]
    fn schema_names_are_sanitized() {
        assert_eq!(schema_name("Line Item"), "Line_Item_records");
    }
}
