//! Per-step gates for the continue action.
//!
//! Each predicate returns the requirement names that are still unmet; an
//! empty list means the step may advance.

use std::collections::BTreeSet;

use crate::domain::line_item::LineItem;
use crate::domain::service::{CampaignId, PaymentPlan, ServiceKind};
use crate::flows::states::StepPayload;

pub fn start_requirements(service: Option<&ServiceKind>) -> Vec<String> {
    missing_if(service.is_none(), "selected_service")
}

pub fn line_requirements(external_lines: u32, internal_lines: u32) -> Vec<String> {
    missing_if(external_lines == 0 && internal_lines == 0, "external_lines|internal_lines")
}

pub fn payment_plan_requirements(plan: Option<&PaymentPlan>) -> Vec<String> {
    missing_if(plan.is_none(), "payment_plan")
}

pub fn campaign_requirements(campaigns: &BTreeSet<CampaignId>) -> Vec<String> {
    missing_if(campaigns.is_empty(), "selected_campaigns")
}

/// The products step is a summary and never blocks checkout.
pub fn product_requirements(_products: &[LineItem]) -> Vec<String> {
    Vec::new()
}

pub fn unmet_requirements(payload: &StepPayload) -> Vec<String> {
    match payload {
        StepPayload::Start { service } => start_requirements(service.as_ref()),
        StepPayload::LineRequirements { external_lines, internal_lines } => {
            line_requirements(*external_lines, *internal_lines)
        }
        StepPayload::PaymentPlan { plan } => payment_plan_requirements(plan.as_ref()),
        StepPayload::Campaigns { campaigns } => campaign_requirements(campaigns),
        StepPayload::Products { products, .. } => product_requirements(products),
    }
}

pub fn is_valid(payload: &StepPayload) -> bool {
    unmet_requirements(payload).is_empty()
}

fn missing_if(condition: bool, requirement: &str) -> Vec<String> {
    if condition {
        vec![requirement.to_owned()]
    } else {
        Vec::new()
    }
}
