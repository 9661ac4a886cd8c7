//! Cart snapshot supplied by the hosting discount engine

use serde::{Deserialize, Serialize};

/// One line of the shopper's cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i32,
}

impl CartLine {
    pub fn new(product_id: i64, quantity: i32) -> Self {
        Self { product_id, quantity }
    }

    /// Parse the compact `product:qty` form, e.g. `"5:2"`
    ///
    /// A bare product id means a quantity of one.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token.split_once(':') {
            Some((product, qty)) => {
                let product_id = product.trim().parse().ok()?;
                let quantity = qty.trim().parse().ok()?;
                Some(Self::new(product_id, quantity))
            }
            None => token.parse().ok().map(|product_id| Self::new(product_id, 1)),
        }
    }
}

/// Everything the evaluator needs to know about the current checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Cart owner; `None` when evaluated outside a real checkout
    #[serde(default)]
    pub customer_id: Option<i64>,
    pub working_currency_id: i64,
    #[serde(default)]
    pub cart_lines: Vec<CartLine>,
}

impl EvaluationContext {
    pub fn new(customer_id: i64, working_currency_id: i64, cart_lines: Vec<CartLine>) -> Self {
        Self {
            customer_id: Some(customer_id),
            working_currency_id,
            cart_lines,
        }
    }

    /// Whether the context carries an identifiable cart owner
    pub fn has_customer(&self) -> bool {
        matches!(self.customer_id, Some(id) if id > 0)
    }
}
