use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::Cart;

/// Flat reduction applied to every unit price while the discount flag is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    percent: u8,
}

impl Discount {
    pub const STANDARD: Self = Self { percent: 20 };

    /// Clamped to 100.
    pub fn percent(percent: u8) -> Self {
        Self { percent: percent.min(100) }
    }

    pub fn as_percent(&self) -> u8 {
        self.percent
    }

    /// Multiplier applied to a unit price, e.g. 0.8 for 20% off.
    pub fn factor(&self) -> Decimal {
        Decimal::ONE - Decimal::new(i64::from(self.percent), 2)
    }

    pub fn apply(&self, unit_price: Decimal) -> Decimal {
        unit_price * self.factor()
    }
}

impl Default for Discount {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSummary {
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
    pub discount_applied: bool,
    pub item_count: u64,
}

pub trait PricingEngine {
    fn price(&self, cart: &Cart, discount_applied: bool) -> PricingSummary;
}

#[derive(Clone, Debug, Default)]
pub struct FlatDiscountPricing {
    discount: Discount,
}

impl FlatDiscountPricing {
    pub fn new(discount: Discount) -> Self {
        Self { discount }
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }
}

impl PricingEngine for FlatDiscountPricing {
    fn price(&self, cart: &Cart, discount_applied: bool) -> PricingSummary {
        price_cart(cart, discount_applied, self.discount)
    }
}

/// Sum of `(discounted?) unit price * quantity` over every line, with the standard 20% rate.
pub fn compute_total(cart: &Cart, discount_applied: bool) -> Decimal {
    compute_total_with(cart, discount_applied, Discount::STANDARD)
}

pub fn compute_total_with(cart: &Cart, discount_applied: bool, discount: Discount) -> Decimal {
    cart.lines()
        .iter()
        .map(|line| {
            let unit_price =
                if discount_applied { discount.apply(line.item.price) } else { line.item.price };
            unit_price * Decimal::from(line.quantity)
        })
        .sum()
}

pub fn price_cart(cart: &Cart, discount_applied: bool, discount: Discount) -> PricingSummary {
    let subtotal = compute_total_with(cart, false, discount);
    let total = compute_total_with(cart, discount_applied, discount);

    PricingSummary {
        subtotal,
        discount_total: subtotal - total,
        total,
        discount_applied,
        item_count: cart.item_count(),
    }
}
