use std::env;
use std::fs;
use std::path::Path;

use santral_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run(config_path: Option<&Path>) -> String {
    let config = match AppConfig::load(LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(config_path);
    let sources = SourceLookup {
        doc: load_config_file_doc(config_file_path.as_deref()),
        path: config_file_path.as_deref(),
    };

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    lines.push(render_line(
        "catalog.currency",
        &config.catalog.currency,
        sources.field_source("catalog.currency", &["SANTRAL_CATALOG_CURRENCY"]),
    ));
    lines.push(render_line(
        "catalog.currency_symbol",
        &config.catalog.currency_symbol,
        sources.field_source("catalog.currency_symbol", &["SANTRAL_CATALOG_CURRENCY_SYMBOL"]),
    ));
    lines.push(render_line(
        "wizard.max_line_count",
        &config.wizard.max_line_count.to_string(),
        sources.field_source("wizard.max_line_count", &["SANTRAL_WIZARD_MAX_LINE_COUNT"]),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        sources.field_source("logging.level", &["SANTRAL_LOGGING_LEVEL", "SANTRAL_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        sources.field_source("logging.format", &["SANTRAL_LOGGING_FORMAT", "SANTRAL_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

struct SourceLookup<'a> {
    doc: Option<Value>,
    path: Option<&'a Path>,
}

impl SourceLookup<'_> {
    fn field_source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
