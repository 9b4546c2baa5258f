use std::fs;
use std::path::Path;

use santral_core::audit::{AuditContext, AuditEvent, InMemoryAuditSink};
use santral_core::cpq::{format_amount, PricingTotals};
use santral_core::errors::ApplicationError;
use santral_core::flows::WizardStep;
use santral_core::wizard::{WizardController, WizardIntent, WizardSettings, WizardSnapshot};
use serde::Serialize;
use tracing::info;

use crate::commands::{load_config, CommandResult, EXIT_INVALID_INPUT};

const COMMAND: &str = "run";

#[derive(Debug, Serialize)]
struct IntentReport {
    index: usize,
    intent: &'static str,
    accepted: bool,
    current_step: WizardStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct FormattedTotals {
    monthly: String,
    one_time: String,
    first_payment: String,
}

#[derive(Debug, Serialize)]
struct RunReport {
    intents: Vec<IntentReport>,
    snapshot: WizardSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    totals: Option<FormattedTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audit: Option<Vec<AuditEvent>>,
}

pub fn run(script_path: &Path, config_path: Option<&Path>, audit: bool) -> CommandResult {
    let config = match load_config(COMMAND, config_path) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let intents = match read_script(script_path) {
        Ok(intents) => intents,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                error.error_class(),
                error.to_string(),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let mut controller = WizardController::new(WizardSettings::from(&config.wizard));
    let sink = InMemoryAuditSink::default();
    let context =
        AuditContext::new(Some(controller.session_id().clone()), script_label(script_path), "cli");

    let mut reports = Vec::with_capacity(intents.len());
    for (index, intent) in intents.into_iter().enumerate() {
        let name = intent.name();
        let result = if audit {
            controller.dispatch_with_audit(intent, &sink, &context)
        } else {
            controller.dispatch(intent)
        };

        reports.push(match result {
            Ok(outcome) => IntentReport {
                index,
                intent: name,
                accepted: true,
                current_step: outcome.current_step,
                reason: None,
                error: None,
            },
            Err(error) => IntentReport {
                index,
                intent: name,
                accepted: false,
                current_step: controller.state().current_step(),
                reason: Some(error.reason_code()),
                error: Some(error.to_string()),
            },
        });
    }

    let accepted = reports.iter().filter(|report| report.accepted).count();
    let rejected = reports.len() - accepted;
    info!(
        event_name = "cli.run.completed",
        session_id = %controller.session_id(),
        accepted,
        rejected,
        "wizard script replayed"
    );

    let symbol = config.catalog.currency_symbol.as_str();
    let report = RunReport {
        intents: reports,
        totals: controller.totals().map(|totals| formatted_totals(&totals, symbol)),
        snapshot: controller.snapshot(),
        audit: audit.then(|| sink.events()),
    };

    let total = accepted + rejected;
    let message = format!("replayed {total} intents ({accepted} accepted, {rejected} rejected)");
    match serde_json::to_value(report) {
        Ok(details) => CommandResult::success(COMMAND, message, Some(details)),
        Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 1),
    }
}

fn read_script(path: &Path) -> Result<Vec<WizardIntent>, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Input(format!("could not read script `{}`: {error}", path.display()))
    })?;

    serde_json::from_str::<Vec<WizardIntent>>(&raw).map_err(|error| {
        ApplicationError::Input(format!("could not parse script `{}`: {error}", path.display()))
    })
}

fn script_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string())
}

fn formatted_totals(totals: &PricingTotals, symbol: &str) -> FormattedTotals {
    FormattedTotals {
        monthly: format_amount(totals.monthly_total, symbol),
        one_time: format_amount(totals.one_time_total, symbol),
        first_payment: format_amount(totals.first_payment_total, symbol),
    }
}
