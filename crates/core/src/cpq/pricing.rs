use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::line_item::{BillingUnit, LineItem};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub item_id: String,
    pub billing: BillingUnit,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTotals {
    pub monthly_total: Decimal,
    pub one_time_total: Decimal,
    pub first_payment_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub totals: PricingTotals,
    pub trace: Vec<PricingTraceStep>,
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, items: &[LineItem]) -> PricingResult;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, items: &[LineItem]) -> PricingResult {
        price_items_with_trace(items)
    }
}

pub fn bucket_total(items: &[LineItem], billing: BillingUnit) -> Decimal {
    items.iter().filter(|item| item.billing == billing).map(LineItem::contribution).sum()
}

pub fn price_items(items: &[LineItem]) -> PricingTotals {
    let monthly_total = bucket_total(items, BillingUnit::Monthly);
    let one_time_total = bucket_total(items, BillingUnit::OneTime);

    PricingTotals {
        monthly_total,
        one_time_total,
        first_payment_total: monthly_total + one_time_total,
    }
}

pub fn price_items_with_trace(items: &[LineItem]) -> PricingResult {
    let trace = items
        .iter()
        .filter(|item| item.is_active())
        .map(|item| PricingTraceStep {
            item_id: item.id.0.clone(),
            billing: item.billing,
            detail: format!("{} rule", item.kind.type_name()),
            amount: item.contribution(),
        })
        .collect();

    PricingResult { totals: price_items(items), trace }
}

/// Renders an amount with exactly two fractional digits, e.g. `₺3071.00`.
pub fn format_amount(amount: Decimal, currency_symbol: &str) -> String {
    format!("{currency_symbol}{:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        format_amount, price_items, price_items_with_trace, DeterministicPricingEngine,
        PricingEngine,
    };
    use crate::cpq::catalog::Catalog;
    use crate::domain::line_item::{BillingUnit, LineItem, LineItemKind};

    fn reference_items(one_time_enabled: bool) -> Vec<LineItem> {
        vec![
            LineItem::new(
                "base",
                "Base",
                Decimal::new(3_500, 2),
                BillingUnit::Monthly,
                LineItemKind::Toggle { enabled: true },
            ),
            LineItem::new(
                "numbers",
                "Numbers",
                Decimal::new(1_800, 2),
                BillingUnit::Monthly,
                LineItemKind::Quantity { quantity: 2 },
            ),
            LineItem::new(
                "setup",
                "Setup",
                Decimal::new(300_000, 2),
                BillingUnit::OneTime,
                LineItemKind::Toggle { enabled: one_time_enabled },
            ),
        ]
    }

    #[test]
    fn totals_split_by_billing_unit() {
        let totals = price_items(&reference_items(true));

        assert_eq!(totals.monthly_total, Decimal::new(7_100, 2));
        assert_eq!(totals.one_time_total, Decimal::new(300_000, 2));
        assert_eq!(totals.first_payment_total, Decimal::new(307_100, 2));
    }

    #[test]
    fn disabling_one_time_toggle_leaves_monthly_untouched() {
        let enabled = price_items(&reference_items(true));
        let disabled = price_items(&reference_items(false));

        assert_eq!(disabled.one_time_total, Decimal::ZERO);
        assert_eq!(disabled.first_payment_total, Decimal::new(7_100, 2));
        assert_eq!(disabled.monthly_total, enabled.monthly_total);
    }

    #[test]
    fn seeded_catalog_totals() {
        let result = DeterministicPricingEngine.price(Catalog::seeded().items());

        assert_eq!(result.totals.monthly_total, Decimal::new(6_800, 2));
        assert_eq!(result.totals.one_time_total, Decimal::new(450_000, 2));
        assert_eq!(result.totals.first_payment_total, Decimal::new(456_800, 2));
        assert_eq!(result.trace.len(), 5, "unselected voice package is not traced");
    }

    #[test]
    fn trace_lists_active_items_only() {
        let result = price_items_with_trace(&reference_items(false));
        let traced: Vec<&str> = result.trace.iter().map(|step| step.item_id.as_str()).collect();

        assert_eq!(traced, vec!["base", "numbers"]);
        assert_eq!(result.trace[1].amount, Decimal::new(3_600, 2));
        assert_eq!(result.trace[1].detail, "quantity rule");
    }

    #[test]
    fn many_small_amounts_sum_without_drift() {
        let items: Vec<LineItem> = (0..10)
            .map(|index| {
                LineItem::new(
                    format!("cent-{index}"),
                    "Ten cents",
                    Decimal::new(10, 2),
                    BillingUnit::Monthly,
                    LineItemKind::Service,
                )
            })
            .collect();

        assert_eq!(price_items(&items).monthly_total, Decimal::ONE);
        assert_eq!(format_amount(price_items(&items).monthly_total, "₺"), "₺1.00");
    }

    #[test]
    fn amounts_format_with_two_decimals() {
        assert_eq!(format_amount(Decimal::new(71, 0), "₺"), "₺71.00");
        assert_eq!(format_amount(Decimal::ZERO, "$"), "$0.00");
        assert_eq!(format_amount(Decimal::new(307_100, 2), ""), "3071.00");
    }
}
