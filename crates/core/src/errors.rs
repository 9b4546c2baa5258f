use thiserror::Error;

use crate::{cpq::CatalogError, flows::FlowTransitionError};

/// Rejections of a requested wizard transition. None of these are fatal: the
/// wizard state is unchanged whenever one is returned.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::FlowTransition(FlowTransitionError::OutOfOrder { .. }) => "out_of_order",
            Self::FlowTransition(FlowTransitionError::PayloadMismatch { .. }) => "payload_mismatch",
            Self::FlowTransition(FlowTransitionError::RequirementsNotMet { .. }) => {
                "requirements_not_met"
            }
            Self::FlowTransition(FlowTransitionError::NoForwardTransition { .. }) => {
                "no_forward_transition"
            }
            Self::FlowTransition(FlowTransitionError::InvalidRetreat { .. }) => "invalid_retreat",
            Self::FlowTransition(FlowTransitionError::StepNotActive { .. }) => "step_not_active",
            Self::Catalog(CatalogError::UnknownItem(_)) => "unknown_item",
            Self::Catalog(CatalogError::KindMismatch { .. }) => "kind_mismatch",
            Self::Catalog(CatalogError::UnknownOption { .. }) => "unknown_option",
            Self::Catalog(CatalogError::UnknownCampaign(_)) => "unknown_campaign",
            Self::InvariantViolation(_) => "invariant_violation",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid input: {0}")]
    Input(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "transition_rejected",
            Self::Input(_) => "invalid_input",
            Self::Configuration(_) => "config_validation",
        }
    }
}
