pub mod draft;
pub mod line_item;
pub mod service;

pub use draft::{merge, DraftPatch, OrderDraft, SessionId};
pub use line_item::{
    BillingUnit, LineItem, LineItemId, LineItemKind, NumericInput, MAX_ITEM_QUANTITY,
    UNSELECTED_OPTION,
};
pub use service::{
    campaign_title, known_campaigns, CampaignId, NumberAcquisition, PaymentPlan, ServiceKind,
};
