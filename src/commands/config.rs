//! Configuration commands for managing marketdesk settings.
//!
//! - `config show`: Display current configuration
//! - `config get`: Read a single value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::config::{Config, TOKEN_ENV};
use crate::error::{DeskError, Result};
use crate::resources::ResourceKind;

const VALID_KEYS: &str =
    "api.base_url, api.timeout, auth.token, search.debounce_ms, page_size.<resource>";

/// Validate a config key and convert underscore notation to dot notation suggestion
fn validate_config_key(key: &str) -> Result<&str> {
    if key.contains('.') {
        return Ok(key);
    }

    // Only the first underscore becomes a dot (e.g., api_base_url -> api.base_url)
    if let Some(pos) = key.find('_') {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        return Err(DeskError::Config(format!(
            "invalid config key '{key}'. Use dot notation: '{dot_version}'"
        )));
    }
    Err(unknown_key(key))
}

fn unknown_key(key: &str) -> DeskError {
    DeskError::Config(format!(
        "unknown config key '{key}'. Valid keys: {VALID_KEYS}"
    ))
}

/// Resource name from a `page_size.<resource>` key
fn page_size_resource(key: &str) -> Result<Option<&'static str>> {
    let Some(name) = key.strip_prefix("page_size.") else {
        return Ok(None);
    };
    <ResourceKind as clap::ValueEnum>::value_variants()
        .iter()
        .map(|kind| kind.name())
        .find(|known| *known == name)
        .map(Some)
        .ok_or_else(|| DeskError::Config(format!("unknown resource '{name}' in '{key}'")))
}

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

/// Show current configuration
pub fn cmd_config_show(json_mode: bool) -> Result<()> {
    let config = Config::load()?;
    let token_configured = config.token().is_some();
    let token_from_env = std::env::var(TOKEN_ENV).is_ok_and(|t| !t.is_empty());

    let json_output = json!({
        "api": {
            "base_url": config.api.base_url,
            "timeout": config.api.timeout,
        },
        "auth": {
            "token_configured": token_configured,
            "token_from_env": token_from_env,
        },
        "search": {
            "debounce_ms": config.search.debounce_ms,
        },
        "page_sizes": config.page_sizes,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!("{}:\n", "api".cyan()));
    match &config.api.base_url {
        Some(url) => text_output.push_str(&format!("  base_url: {url}\n")),
        None => text_output.push_str(&format!("  base_url: {}\n", "not configured".dimmed())),
    }
    text_output.push_str(&format!("  timeout: {}s\n\n", config.api.timeout));

    // Never print the token itself
    text_output.push_str(&format!("{}:\n", "auth".cyan()));
    let token_status = match (token_configured, token_from_env) {
        (true, true) => format!("{} (from {TOKEN_ENV})", "configured".green()),
        (true, false) => "configured".green().to_string(),
        _ => "not configured".dimmed().to_string(),
    };
    text_output.push_str(&format!("  token: {token_status}\n\n"));

    text_output.push_str(&format!("{}:\n", "search".cyan()));
    text_output.push_str(&format!("  debounce_ms: {}\n", config.search.debounce_ms));

    if !config.page_sizes.is_empty() {
        text_output.push_str(&format!("\n{}:\n", "page_size".cyan()));
        for (resource, size) in &config.page_sizes {
            text_output.push_str(&format!("  {resource}: {size}\n"));
        }
    }

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json_mode)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, json_mode: bool) -> Result<()> {
    validate_config_key(key)?;

    let mut config = Config::load()?;

    let (json_value, text_value) = match key {
        "api.base_url" => {
            config.set_base_url(value)?;
            let stored = config.api.base_url.clone().unwrap_or_default();
            (json!(stored), stored)
        }
        "api.timeout" => {
            let secs = parse_positive(key, value)?;
            config.api.timeout = secs;
            (json!(secs), format!("{secs}s"))
        }
        "auth.token" => {
            if value.trim().is_empty() {
                return Err(DeskError::Config("auth.token cannot be empty".to_string()));
            }
            config.set_token(value.trim().to_string());
            let masked = mask_sensitive_value(value.trim());
            (json!(masked), masked)
        }
        "search.debounce_ms" => {
            let ms = parse_positive(key, value)?;
            config.search.debounce_ms = ms;
            (json!(ms), format!("{ms}ms"))
        }
        other => match page_size_resource(other)? {
            Some(resource) => {
                let size = u32::try_from(parse_positive(key, value)?).map_err(|_| {
                    DeskError::Config(format!("page size '{value}' is too large"))
                })?;
                config.page_sizes.insert(resource.to_string(), size);
                (json!(size), size.to_string())
            }
            None => return Err(unknown_key(key)),
        },
    };

    config.save()?;

    let json_output = json!({
        "action": "config_set",
        "key": key,
        "value": json_value,
        "success": true,
    });
    let text_output = format!("Set {} to {}", key.cyan(), text_value);

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json_mode)
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(DeskError::Config(format!(
            "invalid value '{value}' for {key}. Expected a positive integer"
        ))),
    }
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, json_mode: bool) -> Result<()> {
    validate_config_key(key)?;

    let config = Config::load()?;

    let (json_output, text_output) = match key {
        "api.base_url" => {
            let url = config
                .api
                .base_url
                .clone()
                .ok_or_else(|| DeskError::Config("api.base_url not set".to_string()))?;
            (json!({"key": key, "value": url}), url)
        }
        "api.timeout" => (
            json!({"key": key, "value": config.api.timeout}),
            config.api.timeout.to_string(),
        ),
        "auth.token" => {
            let token = config
                .token()
                .ok_or_else(|| DeskError::Config("auth.token not set".to_string()))?;
            let masked = mask_sensitive_value(&token);
            let json = json!({
                "key": key,
                "value": masked,
                "configured": true,
                "masked": true,
            });
            let text = format!("{masked} (masked - showing first 2 and last 2 characters)");
            (json, text)
        }
        "search.debounce_ms" => (
            json!({"key": key, "value": config.search.debounce_ms}),
            config.search.debounce_ms.to_string(),
        ),
        other => match page_size_resource(other)? {
            Some(resource) => {
                let size = config
                    .page_sizes
                    .get(resource)
                    .copied()
                    .ok_or_else(|| DeskError::Config(format!("{key} not set")))?;
                (json!({"key": key, "value": size}), size.to_string())
            }
            None => return Err(unknown_key(key)),
        },
    };

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json_mode)
}
