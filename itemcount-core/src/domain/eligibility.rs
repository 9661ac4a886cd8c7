//! Eligibility evaluation
//!
//! `evaluate` is a pure function over a decoded configuration and an
//! evaluation context. It performs no I/O and holds no state, so it can be
//! called concurrently from any number of threads.
//!
//! Gates run in a fixed order and the first failing gate decides the
//! verdict:
//!
//! 1. valid rule instance id and identifiable customer
//! 2. working currency allowed
//! 3. cart not empty
//! 4. at least one line passes the product filter
//! 5. eligible quantity within `[min, max]` (inclusive, `<= 0` = unbounded)

use serde::{Deserialize, Serialize};

use super::cart::{CartLine, EvaluationContext};
use super::configuration::RuleConfiguration;

/// Why a requirement was not satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsatisfiedReason {
    InvalidRequirement,
    MissingCustomer,
    CurrencyNotAllowed,
    EmptyCart,
    NoEligibleLines,
    BelowMinimum,
    AboveMaximum,
    ConfigurationUnavailable,
}

impl UnsatisfiedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnsatisfiedReason::InvalidRequirement => "invalid_requirement",
            UnsatisfiedReason::MissingCustomer => "missing_customer",
            UnsatisfiedReason::CurrencyNotAllowed => "currency_not_allowed",
            UnsatisfiedReason::EmptyCart => "empty_cart",
            UnsatisfiedReason::NoEligibleLines => "no_eligible_lines",
            UnsatisfiedReason::BelowMinimum => "below_minimum",
            UnsatisfiedReason::AboveMaximum => "above_maximum",
            UnsatisfiedReason::ConfigurationUnavailable => "configuration_unavailable",
        }
    }
}

/// Outcome of one evaluation. The default is "not satisfied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictResult {
    pub is_satisfied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnsatisfiedReason>,
    /// Sum of quantities over the eligible lines (0 if evaluation stopped earlier)
    pub eligible_quantity: i64,
}

impl VerdictResult {
    pub fn satisfied(eligible_quantity: i64) -> Self {
        Self {
            is_satisfied: true,
            reason: None,
            eligible_quantity,
        }
    }

    pub fn unsatisfied(reason: UnsatisfiedReason) -> Self {
        Self {
            is_satisfied: false,
            reason: Some(reason),
            eligible_quantity: 0,
        }
    }

    fn unsatisfied_with_quantity(reason: UnsatisfiedReason, eligible_quantity: i64) -> Self {
        Self {
            eligible_quantity,
            ..Self::unsatisfied(reason)
        }
    }
}

/// Decide whether the cart satisfies the configured requirement
pub fn evaluate(config: &RuleConfiguration, ctx: &EvaluationContext) -> VerdictResult {
    if config.rule_instance_id <= 0 {
        return VerdictResult::unsatisfied(UnsatisfiedReason::InvalidRequirement);
    }
    if !ctx.has_customer() {
        return VerdictResult::unsatisfied(UnsatisfiedReason::MissingCustomer);
    }

    if !config.currency_ids.is_empty() && !config.currency_ids.contains(&ctx.working_currency_id) {
        return VerdictResult::unsatisfied(UnsatisfiedReason::CurrencyNotAllowed);
    }

    if ctx.cart_lines.is_empty() {
        return VerdictResult::unsatisfied(UnsatisfiedReason::EmptyCart);
    }

    let eligible: Vec<&CartLine> = ctx
        .cart_lines
        .iter()
        .filter(|line| config.product_ids.is_empty() || config.product_ids.contains(&line.product_id))
        .collect();

    if eligible.is_empty() {
        return VerdictResult::unsatisfied(UnsatisfiedReason::NoEligibleLines);
    }

    let total: i64 = eligible.iter().map(|line| i64::from(line.quantity)).sum();

    let min = i64::from(config.min_quantity);
    let max = i64::from(config.max_quantity);

    if min > 0 && total < min {
        return VerdictResult::unsatisfied_with_quantity(UnsatisfiedReason::BelowMinimum, total);
    }
    if max > 0 && total > max {
        return VerdictResult::unsatisfied_with_quantity(UnsatisfiedReason::AboveMaximum, total);
    }

    VerdictResult::satisfied(total)
}
