//! Core domain entities
//!
//! Pure data structures plus the eligibility evaluator - no I/O or
//! external dependencies.

mod cart;
mod catalog;
pub mod configuration;
pub mod eligibility;
pub mod keys;
mod requirement;
pub mod result;

pub use cart::{CartLine, EvaluationContext};
pub use catalog::{Currency, Discount};
pub use configuration::{RawSettings, RuleConfiguration};
pub use eligibility::{evaluate, UnsatisfiedReason, VerdictResult};
pub use requirement::DiscountRequirement;
