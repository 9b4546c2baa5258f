pub mod engine;
pub mod states;
pub mod validity;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, SalesWizardFlow};
pub use states::{StepPayload, StepProgress, TransitionDirection, TransitionOutcome, WizardStep};
