pub mod catalog;
pub mod config;
pub mod run;

use std::path::Path;

use santral_core::config::{AppConfig, LoadOptions};
use santral_core::errors::ApplicationError;
use serde::Serialize;

pub const EXIT_CONFIG_VALIDATION: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(
        command: &str,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            details,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            details: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

pub(crate) fn load_config(
    command: &str,
    config_path: Option<&Path>,
) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        ..LoadOptions::default()
    })
    .map_err(|error| {
        let error = ApplicationError::Configuration(error.to_string());
        CommandResult::failure(
            command,
            error.error_class(),
            error.to_string(),
            EXIT_CONFIG_VALIDATION,
        )
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
