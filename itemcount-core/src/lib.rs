//! Item-count discount requirement
//!
//! A discount requirement that passes when the shopper's cart holds the
//! configured number of units of the configured products, optionally
//! limited to a set of working currencies. Laid out as hexagonal
//! architecture:
//!
//! - **domain**: Settings keys, configuration codec and the pure evaluator
//! - **ports**: Trait definitions for the settings store and catalogs
//! - **services**: Authoring and evaluation orchestration
//! - **adapters**: Concrete implementations (DuckDB, in-memory, config file)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::catalog::ConfigCatalog;
use adapters::duckdb::DuckDbStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    evaluate, CartLine, EvaluationContext, RuleConfiguration, UnsatisfiedReason, VerdictResult,
};
pub use services::{EntryPoint, EvaluationRequest, LogEvent, LoggingService};

/// Name of the settings database inside the data directory
pub const DB_FILE: &str = "itemcount.duckdb";

/// Main context for item-count operations
///
/// Holds the settings store, configuration, and the services built on top
/// of them. At most one `LoggingService` is attached, and everything that
/// logs through the context shares it.
pub struct ItemCountContext {
    pub config: Config,
    pub store: Arc<DuckDbStore>,
    pub requirement_service: RequirementService,
    pub evaluation_service: EvaluationService,
    logger: Option<Arc<LoggingService>>,
}

impl ItemCountContext {
    /// Create a new context over the data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let store = Arc::new(DuckDbStore::new(&data_dir.join(DB_FILE))?);
        store.ensure_schema()?;

        let catalog = Arc::new(ConfigCatalog::from_config(&config));

        let requirement_service = RequirementService::new(
            store.clone(),
            store.clone(),
            catalog.clone(),
            catalog,
        );
        let evaluation_service = EvaluationService::new(store.clone());

        Ok(Self {
            config,
            store,
            requirement_service,
            evaluation_service,
            logger: None,
        })
    }

    /// Attach the event logger used by the evaluation service and callers
    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.evaluation_service =
            EvaluationService::new(self.store.clone()).with_logger(logger.clone());
        self.logger = Some(logger);
        self
    }

    /// The attached event logger, if any
    pub fn logger(&self) -> Option<&Arc<LoggingService>> {
        self.logger.as_ref()
    }

    /// Evaluate a request against its stored configuration
    pub fn check(&self, request: &EvaluationRequest) -> VerdictResult {
        self.evaluation_service.check_requirement(request)
    }
}
