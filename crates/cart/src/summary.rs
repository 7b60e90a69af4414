//! Order summary shown next to the cart.
//!
//! Tax here is a display figure only: a single flat rate applied to the
//! subtotal, with no jurisdiction logic.

use serde::{Deserialize, Serialize};

use storefront_catalog::ProductLookup;
use storefront_core::Money;

use crate::cart::Cart;

/// 10%, the storefront's flat display tax.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Tax rate in basis points (1000 = 10%).
    pub tax_rate_bps: u32,
    /// Flat shipping charge for a non-empty cart.
    pub shipping: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            shipping: Money::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub item_count: u64,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderSummary {
    pub fn compute(subtotal: Money, item_count: u64, policy: &PricingPolicy) -> Self {
        let shipping = if item_count == 0 { Money::ZERO } else { policy.shipping };
        let tax = subtotal.percent_bps(policy.tax_rate_bps);
        let total = subtotal.saturating_add(shipping).saturating_add(tax);
        Self {
            item_count,
            subtotal,
            shipping,
            tax,
            total,
        }
    }

    pub fn for_cart<L: ProductLookup + ?Sized>(cart: &Cart, lookup: &L, policy: &PricingPolicy) -> Self {
        Self::compute(cart.total_amount(lookup), cart.total_item_count(), policy)
    }
}
