//! Catalog ports - currencies and discounts resolved by the host store

use crate::domain::result::Result;
use crate::domain::{Currency, Discount};

/// Source of the currencies offered by the store
pub trait CurrencyCatalog: Send + Sync {
    fn all_currencies(&self) -> Result<Vec<Currency>>;
}

/// Source of discounts that requirements attach to
pub trait DiscountCatalog: Send + Sync {
    fn get_discount(&self, id: i64) -> Result<Option<Discount>>;
}
