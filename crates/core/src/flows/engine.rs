use thiserror::Error;

use crate::flows::states::{
    StepPayload, StepProgress, TransitionDirection, TransitionOutcome, WizardStep,
};
use crate::flows::validity;

pub trait FlowDefinition {
    fn initial_step(&self) -> WizardStep;
    /// Last step with forward transition rules.
    fn last_modeled_step(&self) -> WizardStep;
    fn unmet_requirements(&self, payload: &StepPayload) -> Vec<String>;
}

#[derive(Clone, Debug, Default)]
pub struct SalesWizardFlow;

impl FlowDefinition for SalesWizardFlow {
    fn initial_step(&self) -> WizardStep {
        WizardStep::Start
    }

    fn last_modeled_step(&self) -> WizardStep {
        WizardStep::Products
    }

    fn unmet_requirements(&self, payload: &StepPayload) -> Vec<String> {
        validity::unmet_requirements(payload)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("cannot advance from {requested:?} while the wizard is on {current:?}")]
    OutOfOrder { current: WizardStep, requested: WizardStep },
    #[error("step {step:?} received a payload for {payload_step:?}")]
    PayloadMismatch { step: WizardStep, payload_step: WizardStep },
    #[error("step {step:?} requirements not met: {missing:?}")]
    RequirementsNotMet { step: WizardStep, missing: Vec<String> },
    #[error("no forward transition is defined from {step:?}")]
    NoForwardTransition { step: WizardStep },
    #[error("cannot retreat from {current:?} to {target:?}")]
    InvalidRetreat { current: WizardStep, target: WizardStep },
    #[error("input for {step:?} is not accepted while the wizard is on {current:?}")]
    StepNotActive { step: WizardStep, current: WizardStep },
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_progress(&self) -> StepProgress {
        StepProgress::at(self.flow.initial_step())
    }

    /// Forward transition out of `from`. The caller merges the payload into
    /// the draft only when this returns `Ok`.
    pub fn advance(
        &self,
        progress: &StepProgress,
        from: WizardStep,
        payload: &StepPayload,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        if from != progress.current {
            return Err(FlowTransitionError::OutOfOrder {
                current: progress.current,
                requested: from,
            });
        }
        if from > self.flow.last_modeled_step() {
            return Err(FlowTransitionError::NoForwardTransition { step: from });
        }
        let Some(to) = from.next() else {
            return Err(FlowTransitionError::NoForwardTransition { step: from });
        };
        if payload.step() != from {
            return Err(FlowTransitionError::PayloadMismatch {
                step: from,
                payload_step: payload.step(),
            });
        }

        let missing = self.flow.unmet_requirements(payload);
        if !missing.is_empty() {
            return Err(FlowTransitionError::RequirementsNotMet { step: from, missing });
        }

        let mut completed = progress.completed.clone();
        completed.extend(WizardStep::ALL.into_iter().filter(|step| *step <= from));

        Ok(TransitionOutcome {
            from,
            to,
            direction: TransitionDirection::Advanced,
            progress: StepProgress { current: to, completed },
        })
    }

    /// Back-navigation to an earlier step. Completed steps rewind to those
    /// strictly before `to`.
    pub fn retreat(
        &self,
        progress: &StepProgress,
        to: WizardStep,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        if to >= progress.current {
            return Err(FlowTransitionError::InvalidRetreat {
                current: progress.current,
                target: to,
            });
        }

        Ok(TransitionOutcome {
            from: progress.current,
            to,
            direction: TransitionDirection::Retreated,
            progress: StepProgress::at(to),
        })
    }
}

impl Default for FlowEngine<SalesWizardFlow> {
    fn default() -> Self {
        Self::new(SalesWizardFlow)
    }
}
