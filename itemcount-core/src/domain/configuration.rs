//! Rule configuration domain model
//!
//! A `RuleConfiguration` is the decoded view of the four raw settings stored
//! for one rule instance. Decoding never fails: anything missing or
//! malformed degrades to "unconstrained".

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Raw values as they sit in the key/value settings store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSettings {
    pub product_ids: Option<String>,
    pub min_qty: Option<String>,
    pub max_qty: Option<String>,
    pub currency_ids: Option<String>,
}

/// Decoded configuration for one rule instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfiguration {
    pub rule_instance_id: i64,
    /// Allowed products; empty means every cart line counts
    pub product_ids: BTreeSet<i64>,
    /// Lower bound on the eligible quantity; `0` means no lower bound
    pub min_quantity: i32,
    /// Upper bound on the eligible quantity; `0` means no upper bound
    pub max_quantity: i32,
    /// Allowed working currencies; empty means any currency
    pub currency_ids: BTreeSet<i64>,
}

impl RuleConfiguration {
    /// Configuration with no constraints at all
    pub fn unconstrained(rule_instance_id: i64) -> Self {
        Self {
            rule_instance_id,
            product_ids: BTreeSet::new(),
            min_quantity: 0,
            max_quantity: 0,
            currency_ids: BTreeSet::new(),
        }
    }

    pub fn with_product_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.product_ids = ids.into_iter().collect();
        self
    }

    pub fn with_quantity_range(mut self, min_quantity: i32, max_quantity: i32) -> Self {
        self.min_quantity = min_quantity;
        self.max_quantity = max_quantity;
        self
    }

    pub fn with_currency_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.currency_ids = ids.into_iter().collect();
        self
    }

    /// Decode raw stored values
    ///
    /// Absent lists become empty sets, absent or unparseable quantities
    /// become `0`.
    pub fn decode(rule_instance_id: i64, raw: &RawSettings) -> Self {
        Self {
            rule_instance_id,
            product_ids: parse_id_list(raw.product_ids.as_deref()),
            min_quantity: parse_quantity(raw.min_qty.as_deref()),
            max_quantity: parse_quantity(raw.max_qty.as_deref()),
            currency_ids: parse_id_list(raw.currency_ids.as_deref()),
        }
    }

    /// Encode back into the canonical stored form
    pub fn encode(&self) -> RawSettings {
        RawSettings {
            product_ids: Some(format_id_list(&self.product_ids)),
            min_qty: Some(self.min_quantity.to_string()),
            max_qty: Some(self.max_quantity.to_string()),
            currency_ids: Some(format_id_list(&self.currency_ids)),
        }
    }

    /// True when no field restricts eligibility
    pub fn is_unconstrained(&self) -> bool {
        self.product_ids.is_empty()
            && self.currency_ids.is_empty()
            && self.min_quantity <= 0
            && self.max_quantity <= 0
    }
}

/// Parse a comma-separated id list
///
/// Tokens are trimmed; empty tokens and tokens that are not integers are
/// dropped without error. Duplicates collapse.
pub fn parse_id_list(raw: Option<&str>) -> BTreeSet<i64> {
    let Some(raw) = raw else {
        return BTreeSet::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<i64>().ok())
        .collect()
}

/// Join ids as comma-separated decimal integers (empty set -> empty string)
pub fn format_id_list(ids: &BTreeSet<i64>) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_quantity(raw: Option<&str>) -> i32 {
    raw.and_then(|s| s.trim().parse::<i32>().ok()).unwrap_or(0)
}
