//! Evaluation service - checkout-time requirement checks
//!
//! Loads the stored configuration for a requirement and hands it to the pure
//! evaluator. Evaluation never fails: any problem reading the configuration
//! yields a "not satisfied" verdict so a broken store can never grant a
//! discount.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::keys::{FRIENDLY_NAME, SYSTEM_NAME};
use crate::domain::{evaluate, EvaluationContext, RuleConfiguration, UnsatisfiedReason, VerdictResult};
use crate::ports::SettingStore;
use crate::services::LoggingService;

/// One evaluation request as supplied by the discount engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub requirement_id: i64,
    #[serde(flatten)]
    pub context: EvaluationContext,
}

impl EvaluationRequest {
    pub fn new(requirement_id: i64, context: EvaluationContext) -> Self {
        Self {
            requirement_id,
            context,
        }
    }
}

/// Requirement rule as seen by the discount engine
pub struct EvaluationService {
    settings: Arc<dyn SettingStore>,
    logger: Option<Arc<LoggingService>>,
}

impl EvaluationService {
    pub fn new(settings: Arc<dyn SettingStore>) -> Self {
        Self {
            settings,
            logger: None,
        }
    }

    /// Record configuration read failures in the event log
    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Check whether the request satisfies its requirement
    pub fn check_requirement(&self, request: &EvaluationRequest) -> VerdictResult {
        if request.requirement_id <= 0 {
            return VerdictResult::unsatisfied(UnsatisfiedReason::InvalidRequirement);
        }

        match self.settings.load_requirement_settings(request.requirement_id) {
            Ok(raw) => {
                let config = RuleConfiguration::decode(request.requirement_id, &raw);
                evaluate(&config, &request.context)
            }
            Err(e) => {
                if let Some(logger) = &self.logger {
                    let detail = format!("requirement {}", request.requirement_id);
                    // A logging failure must not change the verdict
                    let _ = logger.log_error("configuration_unavailable", &e.to_string(), Some(&detail));
                }
                VerdictResult::unsatisfied(UnsatisfiedReason::ConfigurationUnavailable)
            }
        }
    }

    pub fn is_satisfied(&self, request: &EvaluationRequest) -> bool {
        self.check_requirement(request).is_satisfied
    }

    pub fn friendly_name(&self) -> &'static str {
        FRIENDLY_NAME
    }

    pub fn system_name(&self) -> &'static str {
        SYSTEM_NAME
    }
}
