use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::line_item::{
    BillingUnit, LineItem, LineItemId, LineItemKind, NumericInput, MAX_ITEM_QUANTITY,
};
use crate::domain::service::CampaignId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown catalog item `{0}`")]
    UnknownItem(LineItemId),
    #[error("catalog item `{item}` is a {actual} item, not {expected}")]
    KindMismatch { item: LineItemId, expected: &'static str, actual: &'static str },
    #[error("option `{option}` is not offered by catalog item `{item}`")]
    UnknownOption { item: LineItemId, option: String },
    #[error("unknown campaign `{0}`")]
    UnknownCampaign(CampaignId),
}

/// Line items on the products step, in display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<LineItem>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Catalog {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    /// The fixed defaults the products step starts from.
    pub fn seeded() -> Self {
        Self::new(vec![
            LineItem::new(
                "virtual-pbx",
                "Virtual PBX",
                Decimal::new(3_500, 2),
                BillingUnit::Monthly,
                LineItemKind::Service,
            ),
            LineItem::new(
                "outbound-number",
                "Outbound number",
                Decimal::new(1_800, 2),
                BillingUnit::Monthly,
                LineItemKind::Quantity { quantity: 1 },
            ),
            // Packages carry no price yet; selection still gates inclusion.
            LineItem::new(
                "voice-package",
                "Voice package",
                Decimal::ZERO,
                BillingUnit::Monthly,
                LineItemKind::choice(&["basic", "standard", "premium"]),
            ),
            LineItem::new(
                "internal-number",
                "Internal extension number",
                Decimal::new(1_500, 2),
                BillingUnit::Monthly,
                LineItemKind::Quantity { quantity: 1 },
            ),
            LineItem::new(
                "welcome-announcement",
                "Welcome announcement",
                Decimal::new(150_000, 2),
                BillingUnit::OneTime,
                LineItemKind::Toggle { enabled: true },
            ),
            LineItem::new(
                "activation-fee",
                "Activation fee",
                Decimal::new(300_000, 2),
                BillingUnit::OneTime,
                LineItemKind::Toggle { enabled: true },
            ),
        ])
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn find(&self, item_id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    fn find_mut(&mut self, item_id: &LineItemId) -> Result<&mut LineItem, CatalogError> {
        self.items
            .iter_mut()
            .find(|item| &item.id == item_id)
            .ok_or_else(|| CatalogError::UnknownItem(item_id.clone()))
    }

    /// Sets a quantity item, clamping into `0..=99`. Returns the stored value.
    pub fn set_quantity(
        &mut self,
        item_id: &LineItemId,
        input: &NumericInput,
    ) -> Result<u32, CatalogError> {
        let item = self.find_mut(item_id)?;
        match &mut item.kind {
            LineItemKind::Quantity { quantity } => {
                *quantity = input.coerce(MAX_ITEM_QUANTITY);
                Ok(*quantity)
            }
            other => Err(kind_mismatch(item_id, "quantity", other)),
        }
    }

    /// Flips a toggle item. Returns the new enabled flag.
    pub fn toggle(&mut self, item_id: &LineItemId) -> Result<bool, CatalogError> {
        let item = self.find_mut(item_id)?;
        match &mut item.kind {
            LineItemKind::Toggle { enabled } => {
                *enabled = !*enabled;
                Ok(*enabled)
            }
            other => Err(kind_mismatch(item_id, "toggle", other)),
        }
    }

    pub fn select_option(
        &mut self,
        item_id: &LineItemId,
        option: &str,
    ) -> Result<(), CatalogError> {
        let item = self.find_mut(item_id)?;
        match &mut item.kind {
            LineItemKind::Choice { options, selected } => {
                if !options.iter().any(|candidate| candidate == option) {
                    return Err(CatalogError::UnknownOption {
                        item: item_id.clone(),
                        option: option.to_owned(),
                    });
                }
                *selected = option.to_owned();
                Ok(())
            }
            other => Err(kind_mismatch(item_id, "choice", other)),
        }
    }

    /// Snapshot of the items that take part in the order, in catalog order.
    pub fn active_items(&self) -> Vec<LineItem> {
        self.items.iter().filter(|item| item.is_active()).cloned().collect()
    }
}

fn kind_mismatch(
    item_id: &LineItemId,
    expected: &'static str,
    actual: &LineItemKind,
) -> CatalogError {
    CatalogError::KindMismatch { item: item_id.clone(), expected, actual: actual.type_name() }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, CatalogError};
    use crate::domain::line_item::{LineItemId, LineItemKind, NumericInput};

    fn id(value: &str) -> LineItemId {
        LineItemId::new(value)
    }

    #[test]
    fn seeded_catalog_has_fixed_defaults() {
        let catalog = Catalog::seeded();
        let ids: Vec<&str> = catalog.items().iter().map(|item| item.id.0.as_str()).collect();

        assert_eq!(
            ids,
            vec![
                "virtual-pbx",
                "outbound-number",
                "voice-package",
                "internal-number",
                "welcome-announcement",
                "activation-fee",
            ]
        );
        assert_eq!(catalog, Catalog::default());
    }

    #[test]
    fn set_quantity_clamps_and_reports_stored_value() {
        let mut catalog = Catalog::seeded();
        let outbound = id("outbound-number");

        assert_eq!(catalog.set_quantity(&outbound, &NumericInput::from(-5)), Ok(0));
        assert_eq!(catalog.set_quantity(&outbound, &NumericInput::from(150)), Ok(99));
        assert_eq!(catalog.set_quantity(&outbound, &NumericInput::from(7)), Ok(7));
        assert_eq!(catalog.set_quantity(&outbound, &NumericInput::from("two")), Ok(0));
        assert_eq!(
            catalog.find(&outbound).map(|item| item.kind.clone()),
            Some(LineItemKind::Quantity { quantity: 0 })
        );
    }

    #[test]
    fn unknown_item_leaves_catalog_unchanged() {
        let mut catalog = Catalog::seeded();
        let before = catalog.clone();

        let error = catalog.toggle(&id("fax-gateway")).expect_err("unknown id must be rejected");

        assert_eq!(error, CatalogError::UnknownItem(id("fax-gateway")));
        assert_eq!(catalog, before);
    }

    #[test]
    fn mutation_of_wrong_kind_is_rejected() {
        let mut catalog = Catalog::seeded();
        let before = catalog.clone();

        let error = catalog
            .set_quantity(&id("activation-fee"), &NumericInput::from(3))
            .expect_err("toggle item has no quantity");

        assert!(matches!(
            error,
            CatalogError::KindMismatch { expected: "quantity", actual: "toggle", .. }
        ));
        assert_eq!(catalog, before);
    }

    #[test]
    fn select_option_accepts_only_offered_values() {
        let mut catalog = Catalog::seeded();
        let package = id("voice-package");

        catalog.select_option(&package, "premium").expect("premium is offered");
        assert!(catalog.find(&package).is_some_and(|item| item.is_active()));

        let error = catalog.select_option(&package, "platinum").expect_err("not offered");
        assert!(matches!(error, CatalogError::UnknownOption { .. }));

        catalog.select_option(&package, "unselected").expect("sentinel is always offered");
        assert!(catalog.find(&package).is_some_and(|item| !item.is_active()));
    }

    #[test]
    fn active_items_filter_by_type_rule() {
        let mut catalog = Catalog::seeded();
        catalog.toggle(&id("welcome-announcement")).expect("toggle");
        catalog.set_quantity(&id("internal-number"), &NumericInput::from(0)).expect("quantity");

        let active: Vec<String> =
            catalog.active_items().into_iter().map(|item| item.id.0).collect();

        assert_eq!(active, vec!["virtual-pbx", "outbound-number", "activation-fee"]);
    }
}
