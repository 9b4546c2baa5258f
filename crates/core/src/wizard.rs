//! The wizard state container and the intents that drive it.
//!
//! Every intent is applied to a copy of [`WizardState`]; the copy replaces the
//! current state only when the intent is accepted, so a rejected intent never
//! leaves a partially updated wizard behind.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::config::WizardConfig;
use crate::cpq::catalog::Catalog;
use crate::cpq::pricing::{
    DeterministicPricingEngine, PricingEngine, PricingResult, PricingTotals, PricingTraceStep,
};
use crate::domain::draft::{OrderDraft, SessionId};
use crate::domain::line_item::{LineItem, LineItemId, NumericInput};
use crate::domain::service::{
    ensure_known_campaign, CampaignId, NumberAcquisition, PaymentPlan, ServiceKind,
};
use crate::errors::DomainError;
use crate::flows::engine::{FlowDefinition, FlowEngine, FlowTransitionError, SalesWizardFlow};
use crate::flows::states::{StepPayload, StepProgress, TransitionOutcome, WizardStep};

pub const DEFAULT_MAX_LINE_COUNT: u32 = 999;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum WizardIntent {
    SelectService { service: ServiceKind },
    SetExternalLines { count: NumericInput },
    SetInternalLines { count: NumericInput },
    SelectPaymentPlan { plan: PaymentPlan },
    ToggleCampaign { campaign: CampaignId },
    SetQuantity { item: LineItemId, quantity: NumericInput },
    ToggleItem { item: LineItemId },
    SelectOption { item: LineItemId, option: String },
    SelectNumberAcquisition { acquisition: NumberAcquisition },
    Advance { from: WizardStep },
    Retreat { to: WizardStep },
}

impl WizardIntent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectService { .. } => "select_service",
            Self::SetExternalLines { .. } => "set_external_lines",
            Self::SetInternalLines { .. } => "set_internal_lines",
            Self::SelectPaymentPlan { .. } => "select_payment_plan",
            Self::ToggleCampaign { .. } => "toggle_campaign",
            Self::SetQuantity { .. } => "set_quantity",
            Self::ToggleItem { .. } => "toggle_item",
            Self::SelectOption { .. } => "select_option",
            Self::SelectNumberAcquisition { .. } => "select_number_acquisition",
            Self::Advance { .. } => "advance",
            Self::Retreat { .. } => "retreat",
        }
    }

    /// Step whose form owns this input; `None` for navigation intents.
    pub fn input_step(&self) -> Option<WizardStep> {
        match self {
            Self::SelectService { .. } => Some(WizardStep::Start),
            Self::SetExternalLines { .. } | Self::SetInternalLines { .. } => {
                Some(WizardStep::LineRequirements)
            }
            Self::SelectPaymentPlan { .. } => Some(WizardStep::PaymentPlan),
            Self::ToggleCampaign { .. } => Some(WizardStep::Campaigns),
            Self::SetQuantity { .. }
            | Self::ToggleItem { .. }
            | Self::SelectOption { .. }
            | Self::SelectNumberAcquisition { .. } => Some(WizardStep::Products),
            Self::Advance { .. } | Self::Retreat { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSettings {
    pub max_line_count: u32,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self { max_line_count: DEFAULT_MAX_LINE_COUNT }
    }
}

impl From<&WizardConfig> for WizardSettings {
    fn from(config: &WizardConfig) -> Self {
        Self { max_line_count: config.max_line_count }
    }
}

/// Form values of the steps, kept while the user moves back and forth. They
/// reach the draft only through an advance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInputs {
    pub service: Option<ServiceKind>,
    pub external_lines: u32,
    pub internal_lines: u32,
    pub payment_plan: Option<PaymentPlan>,
    pub campaigns: BTreeSet<CampaignId>,
    pub number_acquisition: Option<NumberAcquisition>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub progress: StepProgress,
    pub draft: OrderDraft,
    pub inputs: StepInputs,
    /// Present once the products step has been entered.
    pub catalog: Option<Catalog>,
    pub settings: WizardSettings,
}

impl WizardState {
    pub fn new(settings: WizardSettings) -> Self {
        Self { settings, ..Self::default() }
    }

    pub fn current_step(&self) -> WizardStep {
        self.progress.current
    }

    /// Payload the step would hand over if it advanced now. `None` for the
    /// placeholder steps after products.
    pub fn payload_for(&self, step: WizardStep) -> Result<Option<StepPayload>, DomainError> {
        let payload = match step {
            WizardStep::Start => StepPayload::Start { service: self.inputs.service },
            WizardStep::LineRequirements => StepPayload::LineRequirements {
                external_lines: self.inputs.external_lines,
                internal_lines: self.inputs.internal_lines,
            },
            WizardStep::PaymentPlan => StepPayload::PaymentPlan { plan: self.inputs.payment_plan },
            WizardStep::Campaigns => {
                StepPayload::Campaigns { campaigns: self.inputs.campaigns.clone() }
            }
            WizardStep::Products => {
                let catalog = self.catalog.as_ref().ok_or_else(|| {
                    DomainError::InvariantViolation(
                        "products step is active without a catalog".to_owned(),
                    )
                })?;
                StepPayload::Products {
                    products: catalog.active_items(),
                    number_acquisition: self.inputs.number_acquisition,
                }
            }
            WizardStep::Application | WizardStep::PaymentMethod | WizardStep::Confirmation => {
                return Ok(None)
            }
        };
        Ok(Some(payload))
    }

    fn catalog_mut(&mut self) -> Result<&mut Catalog, DomainError> {
        self.catalog.as_mut().ok_or_else(|| {
            DomainError::InvariantViolation("products step is active without a catalog".to_owned())
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentOutcome {
    pub intent: String,
    pub current_step: WizardStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionOutcome>,
}

/// Applies one intent to `state`, returning the successor state. `state` is
/// never modified.
pub fn apply_intent<F>(
    engine: &FlowEngine<F>,
    state: &WizardState,
    intent: &WizardIntent,
) -> Result<(WizardState, IntentOutcome), DomainError>
where
    F: FlowDefinition,
{
    let current = state.current_step();
    if let Some(step) = intent.input_step() {
        if step != current {
            return Err(FlowTransitionError::StepNotActive { step, current }.into());
        }
    }

    let mut next = state.clone();
    let mut transition = None;

    match intent {
        WizardIntent::SelectService { service } => next.inputs.service = Some(*service),
        WizardIntent::SetExternalLines { count } => {
            next.inputs.external_lines = count.coerce(state.settings.max_line_count);
        }
        WizardIntent::SetInternalLines { count } => {
            next.inputs.internal_lines = count.coerce(state.settings.max_line_count);
        }
        WizardIntent::SelectPaymentPlan { plan } => next.inputs.payment_plan = Some(*plan),
        WizardIntent::ToggleCampaign { campaign } => {
            ensure_known_campaign(campaign)?;
            if !next.inputs.campaigns.remove(campaign) {
                next.inputs.campaigns.insert(campaign.clone());
            }
        }
        WizardIntent::SetQuantity { item, quantity } => {
            next.catalog_mut()?.set_quantity(item, quantity)?;
        }
        WizardIntent::ToggleItem { item } => {
            next.catalog_mut()?.toggle(item)?;
        }
        WizardIntent::SelectOption { item, option } => {
            next.catalog_mut()?.select_option(item, option)?;
        }
        WizardIntent::SelectNumberAcquisition { acquisition } => {
            next.inputs.number_acquisition = Some(*acquisition);
        }
        WizardIntent::Advance { from } => {
            if *from != current {
                return Err(FlowTransitionError::OutOfOrder { current, requested: *from }.into());
            }
            let payload = state
                .payload_for(*from)?
                .ok_or(FlowTransitionError::NoForwardTransition { step: *from })?;
            let outcome = engine.advance(&state.progress, *from, &payload)?;
            next.draft = state.draft.merge(&payload.into_patch());
            next.progress = outcome.progress.clone();
            transition = Some(outcome);
        }
        WizardIntent::Retreat { to } => {
            let outcome = engine.retreat(&state.progress, *to)?;
            next.progress = outcome.progress.clone();
            transition = Some(outcome);
        }
    }

    if next.current_step() == WizardStep::Products && current != WizardStep::Products {
        next.catalog = Some(Catalog::seeded());
    }

    let outcome = IntentOutcome {
        intent: intent.name().to_owned(),
        current_step: next.current_step(),
        transition,
    };
    Ok((next, outcome))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepperEntry {
    pub step: WizardStep,
    pub number: u8,
    pub status: StepStatus,
}

pub fn stepper(progress: &StepProgress) -> Vec<StepperEntry> {
    WizardStep::ALL
        .into_iter()
        .map(|step| {
            let status = if progress.completed.contains(&step) {
                StepStatus::Completed
            } else if step == progress.current {
                StepStatus::Current
            } else {
                StepStatus::Upcoming
            };
            StepperEntry { step, number: step.number(), status }
        })
        .collect()
}

/// Read-only view handed to the presentation layer after each intent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub session_id: SessionId,
    pub current_step: WizardStep,
    pub completed_steps: Vec<WizardStep>,
    pub draft: OrderDraft,
    pub inputs: StepInputs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<PricingTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_trace: Option<Vec<PricingTraceStep>>,
    pub stepper: Vec<StepperEntry>,
}

pub struct WizardController<F = SalesWizardFlow, P = DeterministicPricingEngine> {
    session_id: SessionId,
    engine: FlowEngine<F>,
    pricing: P,
    state: WizardState,
}

impl WizardController {
    pub fn new(settings: WizardSettings) -> Self {
        Self::with_engines(
            SessionId::generate(),
            FlowEngine::default(),
            DeterministicPricingEngine,
            settings,
        )
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new(WizardSettings::default())
    }
}

impl<F, P> WizardController<F, P>
where
    F: FlowDefinition,
    P: PricingEngine,
{
    pub fn with_engines(
        session_id: SessionId,
        engine: FlowEngine<F>,
        pricing: P,
        settings: WizardSettings,
    ) -> Self {
        let mut state = WizardState::new(settings);
        state.progress = engine.initial_progress();
        Self { session_id, engine, pricing, state }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn dispatch(&mut self, intent: WizardIntent) -> Result<IntentOutcome, DomainError> {
        match apply_intent(&self.engine, &self.state, &intent) {
            Ok((next, outcome)) => {
                self.state = next;
                match &outcome.transition {
                    Some(transition) => info!(
                        event_name = "wizard.transition_applied",
                        session_id = %self.session_id,
                        from = %transition.from,
                        to = %transition.to,
                        direction = ?transition.direction,
                        "wizard step changed"
                    ),
                    None => debug!(
                        event_name = "wizard.input_recorded",
                        session_id = %self.session_id,
                        intent = intent.name(),
                        step = %outcome.current_step,
                        "step input recorded"
                    ),
                }
                Ok(outcome)
            }
            Err(error) => {
                debug!(
                    event_name = "wizard.intent_rejected",
                    session_id = %self.session_id,
                    intent = intent.name(),
                    step = %self.state.current_step(),
                    reason = error.reason_code(),
                    error = %error,
                    "wizard intent rejected"
                );
                Err(error)
            }
        }
    }

    pub fn dispatch_with_audit<S>(
        &mut self,
        intent: WizardIntent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<IntentOutcome, DomainError>
    where
        S: AuditSink,
    {
        let intent_name = intent.name();
        let navigation = intent.input_step().is_none();
        let step_before = self.state.current_step();
        let result = self.dispatch(intent);

        let (event_type, category) = audit_event_type(navigation, step_before, result.is_ok());

        let event = match &result {
            Ok(outcome) => {
                let event = AuditEvent::new(audit, event_type, category, AuditOutcome::Success)
                    .with_metadata("intent", intent_name)
                    .with_metadata("step", outcome.current_step.to_string());
                match &outcome.transition {
                    Some(transition) => event
                        .with_metadata("from", transition.from.to_string())
                        .with_metadata("to", transition.to.to_string()),
                    None => event,
                }
            }
            Err(error) => AuditEvent::new(audit, event_type, category, AuditOutcome::Rejected)
                .with_metadata("intent", intent_name)
                .with_metadata("step", step_before.to_string())
                .with_metadata("reason", error.reason_code())
                .with_metadata("error", error.to_string()),
        };
        sink.emit(event);

        result
    }

    pub fn pricing(&self) -> Option<PricingResult> {
        self.state.catalog.as_ref().map(|catalog| self.pricing.price(catalog.items()))
    }

    pub fn totals(&self) -> Option<PricingTotals> {
        self.pricing().map(|result| result.totals)
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let pricing = self.pricing();
        WizardSnapshot {
            session_id: self.session_id.clone(),
            current_step: self.state.progress.current,
            completed_steps: self.state.progress.completed.iter().copied().collect(),
            draft: self.state.draft.clone(),
            inputs: self.state.inputs.clone(),
            catalog: self.state.catalog.as_ref().map(|catalog| catalog.items().to_vec()),
            totals: pricing.as_ref().map(|result| result.totals.clone()),
            pricing_trace: pricing.map(|result| result.trace),
            stepper: stepper(&self.state.progress),
        }
    }
}

fn audit_event_type(
    navigation: bool,
    step: WizardStep,
    accepted: bool,
) -> (&'static str, AuditCategory) {
    match (navigation, step == WizardStep::Products, accepted) {
        (true, _, true) => ("wizard.transition_applied", AuditCategory::Flow),
        (true, _, false) => ("wizard.transition_rejected", AuditCategory::Flow),
        (false, true, true) => ("wizard.catalog_updated", AuditCategory::Catalog),
        (false, true, false) => ("wizard.intent_rejected", AuditCategory::Catalog),
        (false, false, true) => ("wizard.input_recorded", AuditCategory::Input),
        (false, false, false) => ("wizard.intent_rejected", AuditCategory::Input),
    }
}
