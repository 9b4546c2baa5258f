use std::path::Path;

use santral_core::cpq::{format_amount, price_items, Catalog};
use santral_core::domain::{campaign_title, known_campaigns, BillingUnit, LineItem, LineItemKind};
use serde::Serialize;
use serde_json::json;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "catalog";

#[derive(Debug, Serialize)]
struct CatalogRow {
    id: String,
    title: String,
    #[serde(rename = "type")]
    kind: &'static str,
    billing: BillingUnit,
    active: bool,
    price: String,
    display_price: String,
}

#[derive(Debug, Serialize)]
struct CampaignRow {
    id: String,
    title: &'static str,
}

pub fn run(config_path: Option<&Path>, json: bool) -> CommandResult {
    let config = match load_config(COMMAND, config_path) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let symbol = config.catalog.currency_symbol.as_str();

    let catalog = Catalog::seeded();
    let totals = price_items(catalog.items());

    if json {
        let rows: Vec<CatalogRow> =
            catalog.items().iter().map(|item| catalog_row(item, symbol)).collect();
        let details = json!({
            "currency": config.catalog.currency,
            "items": rows,
            "campaigns": campaign_rows(),
            "totals": {
                "monthly": format_amount(totals.monthly_total, symbol),
                "one_time": format_amount(totals.one_time_total, symbol),
                "first_payment": format_amount(totals.first_payment_total, symbol),
            },
        });
        return CommandResult::success(
            COMMAND,
            format!("{} catalog items", catalog.items().len()),
            Some(details),
        );
    }

    let mut lines = vec![format!("seeded catalog ({}):", config.catalog.currency)];
    for item in catalog.items() {
        lines.push(format!(
            "- {} [{}] {} {} ({})",
            item.id,
            control_label(&item.kind),
            format_amount(item.display_price(), symbol),
            billing_label(item.billing),
            item.title,
        ));
    }
    lines.push("campaigns:".to_string());
    for campaign in campaign_rows() {
        lines.push(format!("- {} ({})", campaign.id, campaign.title));
    }
    lines.push(format!("monthly total: {}", format_amount(totals.monthly_total, symbol)));
    lines.push(format!("one-time total: {}", format_amount(totals.one_time_total, symbol)));
    lines.push(format!(
        "first payment total: {}",
        format_amount(totals.first_payment_total, symbol)
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn catalog_row(item: &LineItem, symbol: &str) -> CatalogRow {
    CatalogRow {
        id: item.id.to_string(),
        title: item.title.clone(),
        kind: item.kind.type_name(),
        billing: item.billing,
        active: item.is_active(),
        price: format_amount(item.price, symbol),
        display_price: format_amount(item.display_price(), symbol),
    }
}

fn campaign_rows() -> Vec<CampaignRow> {
    known_campaigns()
        .into_iter()
        .map(|campaign| CampaignRow {
            title: campaign_title(&campaign).unwrap_or_default(),
            id: campaign.0,
        })
        .collect()
}

fn control_label(kind: &LineItemKind) -> String {
    match kind {
        LineItemKind::Service => "service".to_string(),
        LineItemKind::Toggle { enabled } => {
            format!("toggle {}", if *enabled { "on" } else { "off" })
        }
        LineItemKind::Quantity { quantity } => format!("quantity x{quantity}"),
        LineItemKind::Choice { selected, .. } => format!("choice {selected}"),
    }
}

fn billing_label(billing: BillingUnit) -> &'static str {
    match billing {
        BillingUnit::Monthly => "monthly",
        BillingUnit::OneTime => "one-time",
    }
}
