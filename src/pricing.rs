//! Order arithmetic. All amounts are integer minor units.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::OrderType;

#[derive(Debug, Clone, Copy)]
pub struct PricingRules {
    /// Basis points, 1250 = 12.5%.
    pub tax_rate_bps: i64,
    pub delivery_fee: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub delivery_fee: i64,
    pub final_amount: i64,
}

/// Price of one line; `None` on overflow.
pub fn line_total(unit_price: i64, quantity: i32) -> Option<i64> {
    unit_price.checked_mul(i64::from(quantity))
}

/// Tax on `subtotal`, rounded half-up to the minor unit.
pub fn tax_for(subtotal: i64, tax_rate_bps: i64) -> Option<i64> {
    let scaled = subtotal.checked_mul(tax_rate_bps)?;
    Some((scaled + 5_000) / 10_000)
}

/// Compute order totals from `(unit_price, quantity)` lines; `None` on overflow.
pub fn price_order(
    lines: &[(i64, i32)],
    order_type: OrderType,
    rules: PricingRules,
) -> Option<OrderTotals> {
    let subtotal = lines.iter().try_fold(0i64, |acc, (price, qty)| {
        acc.checked_add(line_total(*price, *qty)?)
    })?;
    let tax_amount = tax_for(subtotal, rules.tax_rate_bps)?;
    let delivery_fee = match order_type {
        OrderType::Delivery => rules.delivery_fee,
        OrderType::Pickup | OrderType::DineIn => 0,
    };
    let final_amount = subtotal.checked_add(tax_amount)?.checked_add(delivery_fee)?;
    Some(OrderTotals {
        subtotal,
        tax_amount,
        delivery_fee,
        final_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: PricingRules = PricingRules {
        tax_rate_bps: 1250,
        delivery_fee: 500,
    };

    #[test]
    fn delivery_order_adds_tax_and_fee() {
        // 2 x 25.00 + 1 x 10.00 = 60.00; tax 7.50; fee 5.00
        let totals = price_order(&[(2500, 2), (1000, 1)], OrderType::Delivery, RULES).unwrap();
        assert_eq!(
            totals,
            OrderTotals {
                subtotal: 6000,
                tax_amount: 750,
                delivery_fee: 500,
                final_amount: 7250,
            }
        );
    }

    #[test]
    fn pickup_and_dine_in_skip_the_fee() {
        let pickup = price_order(&[(1000, 1)], OrderType::Pickup, RULES).unwrap();
        assert_eq!(pickup.delivery_fee, 0);
        assert_eq!(pickup.final_amount, 1125);

        let dine_in = price_order(&[(1000, 1)], OrderType::DineIn, RULES).unwrap();
        assert_eq!(dine_in.final_amount, 1125);
    }

    #[test]
    fn tax_rounds_half_up() {
        // 12.5% of 0.04 = 0.005 -> 0.01
        assert_eq!(tax_for(4, 1250), Some(1));
        // 12.5% of 0.03 = 0.00375 -> 0.00
        assert_eq!(tax_for(3, 1250), Some(0));
        assert_eq!(tax_for(0, 1250), Some(0));
    }

    #[test]
    fn overflow_is_reported() {
        assert!(price_order(&[(i64::MAX, 2)], OrderType::Pickup, RULES).is_none());
        assert!(line_total(i64::MAX, 2).is_none());
    }
}
