use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::draft::DraftPatch;
use crate::domain::line_item::LineItem;
use crate::domain::service::{CampaignId, NumberAcquisition, PaymentPlan, ServiceKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Start,
    LineRequirements,
    PaymentPlan,
    Campaigns,
    Products,
    Application,
    PaymentMethod,
    Confirmation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 8] = [
        WizardStep::Start,
        WizardStep::LineRequirements,
        WizardStep::PaymentPlan,
        WizardStep::Campaigns,
        WizardStep::Products,
        WizardStep::Application,
        WizardStep::PaymentMethod,
        WizardStep::Confirmation,
    ];

    /// One-based position in the wizard.
    pub fn number(self) -> u8 {
        match self {
            Self::Start => 1,
            Self::LineRequirements => 2,
            Self::PaymentPlan => 3,
            Self::Campaigns => 4,
            Self::Products => 5,
            Self::Application => 6,
            Self::PaymentMethod => 7,
            Self::Confirmation => 8,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    /// Steps strictly before `self`, in order.
    pub fn predecessors(self) -> BTreeSet<Self> {
        Self::ALL.into_iter().filter(|step| *step < self).collect()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Sequencer position: where the user is and which steps show as completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub current: WizardStep,
    pub completed: BTreeSet<WizardStep>,
}

impl StepProgress {
    pub fn at(current: WizardStep) -> Self {
        Self { current, completed: current.predecessors() }
    }
}

impl Default for StepProgress {
    fn default() -> Self {
        Self::at(WizardStep::Start)
    }
}

/// Data a step hands over when it advances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepPayload {
    Start {
        service: Option<ServiceKind>,
    },
    LineRequirements {
        external_lines: u32,
        internal_lines: u32,
    },
    PaymentPlan {
        plan: Option<PaymentPlan>,
    },
    Campaigns {
        campaigns: BTreeSet<CampaignId>,
    },
    Products {
        products: Vec<LineItem>,
        number_acquisition: Option<NumberAcquisition>,
    },
}

impl StepPayload {
    pub fn step(&self) -> WizardStep {
        match self {
            Self::Start { .. } => WizardStep::Start,
            Self::LineRequirements { .. } => WizardStep::LineRequirements,
            Self::PaymentPlan { .. } => WizardStep::PaymentPlan,
            Self::Campaigns { .. } => WizardStep::Campaigns,
            Self::Products { .. } => WizardStep::Products,
        }
    }

    pub fn into_patch(self) -> DraftPatch {
        match self {
            Self::Start { service } => {
                DraftPatch { selected_service: service, ..DraftPatch::default() }
            }
            Self::LineRequirements { external_lines, internal_lines } => DraftPatch {
                external_lines: Some(external_lines),
                internal_lines: Some(internal_lines),
                ..DraftPatch::default()
            },
            Self::PaymentPlan { plan } => {
                DraftPatch { payment_plan: plan, ..DraftPatch::default() }
            }
            Self::Campaigns { campaigns } => {
                DraftPatch { selected_campaigns: Some(campaigns), ..DraftPatch::default() }
            }
            Self::Products { products, number_acquisition } => DraftPatch {
                selected_products: Some(products),
                number_acquisition,
                ..DraftPatch::default()
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    Advanced,
    Retreated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: WizardStep,
    pub to: WizardStep,
    pub direction: TransitionDirection,
    pub progress: StepProgress,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{StepPayload, StepProgress, WizardStep};
    use crate::domain::service::PaymentPlan;

    #[test]
    fn steps_are_numbered_in_fixed_linear_order() {
        let numbers: Vec<u8> = WizardStep::ALL.iter().map(|step| step.number()).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<u8>>());
        assert_eq!(WizardStep::Start.previous(), None);
        assert_eq!(WizardStep::Confirmation.next(), None);
        assert_eq!(WizardStep::Campaigns.next(), Some(WizardStep::Products));
        assert_eq!(WizardStep::from_number(0), None);
    }

    #[test]
    fn progress_at_step_marks_all_predecessors_completed() {
        let progress = StepProgress::at(WizardStep::PaymentPlan);
        assert_eq!(
            progress.completed,
            BTreeSet::from([WizardStep::Start, WizardStep::LineRequirements])
        );
        assert!(StepProgress::default().completed.is_empty());
    }

    #[test]
    fn payload_patch_writes_only_owned_keys() {
        let patch = StepPayload::PaymentPlan { plan: Some(PaymentPlan::Yearly) }.into_patch();
        assert_eq!(patch.keys(), vec!["payment_plan"]);

        let patch =
            StepPayload::LineRequirements { external_lines: 0, internal_lines: 3 }.into_patch();
        assert_eq!(patch.keys(), vec!["external_lines", "internal_lines"]);
    }

    #[test]
    fn step_names_serialize_snake_case() {
        let json = serde_json::to_string(&WizardStep::LineRequirements).expect("serialize step");
        assert_eq!(json, "\"line_requirements\"");
    }
}
