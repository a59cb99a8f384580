pub mod automation;
pub mod model;
pub mod record;

pub use automation::{AutomationAction, AutomationSchedule};
pub use model::{FieldDefinition, FieldType, ModelDefinition, ReferenceType};
pub use record::GeneratedRecord;
