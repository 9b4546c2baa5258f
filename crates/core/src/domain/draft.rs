use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::line_item::LineItem;
use crate::domain::service::{CampaignId, NumberAcquisition, PaymentPlan, ServiceKind};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(format!("WZ-{}", Uuid::new_v4().simple()))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selections gathered across wizard steps. A field stays `None` until the
/// step that owns it advances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_service: Option<ServiceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<PaymentPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_campaigns: Option<BTreeSet<CampaignId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_products: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_acquisition: Option<NumberAcquisition>,
}

/// Output of one step's advance. Only the keys a step owns are `Some`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPatch {
    pub selected_service: Option<ServiceKind>,
    pub external_lines: Option<u32>,
    pub internal_lines: Option<u32>,
    pub payment_plan: Option<PaymentPlan>,
    pub selected_campaigns: Option<BTreeSet<CampaignId>>,
    pub selected_products: Option<Vec<LineItem>>,
    pub number_acquisition: Option<NumberAcquisition>,
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Names of the draft keys this patch writes.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.selected_service.is_some() {
            keys.push("selected_service");
        }
        if self.external_lines.is_some() {
            keys.push("external_lines");
        }
        if self.internal_lines.is_some() {
            keys.push("internal_lines");
        }
        if self.payment_plan.is_some() {
            keys.push("payment_plan");
        }
        if self.selected_campaigns.is_some() {
            keys.push("selected_campaigns");
        }
        if self.selected_products.is_some() {
            keys.push("selected_products");
        }
        if self.number_acquisition.is_some() {
            keys.push("number_acquisition");
        }
        keys
    }
}

/// Shallow per-key overwrite: keys present in `partial` replace the draft's
/// value, every other key is carried over untouched.
pub fn merge(draft: &OrderDraft, partial: &DraftPatch) -> OrderDraft {
    OrderDraft {
        selected_service: partial.selected_service.or(draft.selected_service),
        external_lines: partial.external_lines.or(draft.external_lines),
        internal_lines: partial.internal_lines.or(draft.internal_lines),
        payment_plan: partial.payment_plan.or(draft.payment_plan),
        selected_campaigns: partial
            .selected_campaigns
            .clone()
            .or_else(|| draft.selected_campaigns.clone()),
        selected_products: partial
            .selected_products
            .clone()
            .or_else(|| draft.selected_products.clone()),
        number_acquisition: partial.number_acquisition.or(draft.number_acquisition),
    }
}

impl OrderDraft {
    pub fn merge(&self, partial: &DraftPatch) -> Self {
        merge(self, partial)
    }
}
