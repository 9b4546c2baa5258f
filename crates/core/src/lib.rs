pub mod audit;
pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod wizard;

pub use audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
};
pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use cpq::{Catalog, CatalogError, DeterministicPricingEngine, PricingEngine, PricingTotals};
pub use domain::{
    CampaignId, LineItem, LineItemId, LineItemKind, NumericInput, OrderDraft, PaymentPlan,
    ServiceKind, SessionId,
};
pub use errors::{ApplicationError, DomainError};
pub use flows::{FlowEngine, FlowTransitionError, StepProgress, WizardStep};
pub use wizard::{
    apply_intent, IntentOutcome, WizardController, WizardIntent, WizardSettings, WizardSnapshot,
    WizardState,
};
