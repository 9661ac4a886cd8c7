//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod evaluation;
pub mod logging;
pub mod migration;
mod requirement;

pub use evaluation::{EvaluationRequest, EvaluationService};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use requirement::{
    RemoveResult, RequirementModel, RequirementService, RequirementSummary, SaveResult,
    UninstallResult,
};
