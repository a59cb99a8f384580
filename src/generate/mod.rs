pub mod context;
pub mod dependency;
pub mod display;
pub mod error;
pub mod fallback;
pub mod output_schema;
pub mod parser;
pub mod prompt;
pub mod reconcile;
pub mod service;

pub use dependency::{analyze_dependencies, sequence_models, DependencyEdge, GenerationOrder};
pub use display::resolve_display_fields;
pub use error::{GenerateError, ModelGenerationError};
pub use reconcile::reconcile_references;
pub use service::{GenerationRequest, GeneratorService, ModelBatch, RecordSource};
