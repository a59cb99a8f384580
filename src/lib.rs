pub mod ai;
pub mod config;
pub mod generate;
pub mod ids;
pub mod schema;

pub use config::GenerateConfig;
pub use generate::{GenerateError, GenerationRequest, GeneratorService};
pub use schema::{GeneratedRecord, ModelDefinition};
