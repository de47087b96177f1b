/// `load_config` module: loads the plaintext `.r2syncrc` configuration file
/// (KEY=VALUE lines) and adapts it into a strongly-typed [`CliConfig`].
///
/// Resolution order:
/// 1. An explicit `--config <file>` path, when given.
/// 2. The file named by the `R2SYNC_CONFIG` environment variable.
/// 3. `./.r2syncrc` in the working directory.
/// 4. When no file exists, `R2SYNC_`-prefixed environment variables
///    (`R2SYNC_R2_ACCESS_KEY`, `R2SYNC_R2_BUCKET`, ...).
///
/// All required fields are validated here, before any I/O happens; a missing
/// field is a fatal configuration error surfaced through `anyhow` at the CLI
/// boundary.
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use r2sync_core::config::DEFAULT_CONCURRENCY;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".r2syncrc";

/// Keys recognised in the config file, and their environment fallbacks.
const CONFIG_KEYS: [(&str, &str); 6] = [
    ("R2_ACCESS_KEY", "R2SYNC_R2_ACCESS_KEY"),
    ("R2_SECRET_KEY", "R2SYNC_R2_SECRET_KEY"),
    ("CF_ACCOUNT_ID", "R2SYNC_CF_ACCOUNT_ID"),
    ("R2_BUCKET", "R2SYNC_R2_BUCKET"),
    ("LOCAL_BACKUP", "R2SYNC_LOCAL_BACKUP"),
    ("CONCURRENCY_SPEED", "R2SYNC_CONCURRENCY_SPEED"),
];

const REQUIRED_KEYS: [&str; 4] = ["R2_ACCESS_KEY", "R2_SECRET_KEY", "CF_ACCOUNT_ID", "R2_BUCKET"];

const DEFAULT_LOCAL_BACKUP: &str = "./r2-backup";

/// Validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub access_key: String,
    pub secret_key: String,
    pub account_id: String,
    pub bucket: String,
    pub local_backup: PathBuf,
    pub concurrency: usize,
}

/// Load and validate configuration, preferring the config file and falling
/// back to `R2SYNC_`-prefixed environment variables.
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig> {
    let path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => env::var("R2SYNC_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
    };

    let (raw, source) = if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        info!(config_path = %path.display(), "Loaded configuration file");
        (parse_plaintext(&content), format!("file {}", path.display()))
    } else {
        warn!(
            config_path = %path.display(),
            "Config file not found, falling back to R2SYNC_ environment variables"
        );
        let mut raw = HashMap::new();
        for (key, env_key) in CONFIG_KEYS {
            if let Ok(value) = env::var(env_key) {
                raw.insert(key.to_string(), value);
            }
        }
        (raw, "environment variables".to_string())
    };

    for key in REQUIRED_KEYS {
        if raw.get(key).map_or(true, |v| v.is_empty()) {
            return Err(anyhow!(
                "missing required configuration field {key:?} (source: {source}); \
                 set it in {DEFAULT_CONFIG_FILE} or export R2SYNC_{key}"
            ));
        }
    }

    let concurrency = match raw.get("CONCURRENCY_SPEED") {
        Some(value) => value
            .parse::<usize>()
            .with_context(|| format!("CONCURRENCY_SPEED must be a positive integer, got {value:?}"))?,
        None => DEFAULT_CONCURRENCY,
    };

    Ok(CliConfig {
        access_key: raw["R2_ACCESS_KEY"].clone(),
        secret_key: raw["R2_SECRET_KEY"].clone(),
        account_id: raw["CF_ACCOUNT_ID"].clone(),
        bucket: raw["R2_BUCKET"].clone(),
        local_backup: raw
            .get("LOCAL_BACKUP")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_BACKUP)),
        concurrency,
    })
}

/// Parse KEY=VALUE lines: comments and blank lines are ignored, the value is
/// split at the first `=` and surrounding quotes are trimmed.
fn parse_plaintext(content: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
            config.insert(key.trim().to_string(), value.to_string());
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_lines_with_comments_and_quotes() {
        let raw = "# credentials\nR2_ACCESS_KEY=abc\nR2_SECRET_KEY = \"s=cr=et\"\n\nR2_BUCKET='my-bucket'\n";
        let parsed = parse_plaintext(raw);
        assert_eq!(parsed["R2_ACCESS_KEY"], "abc");
        // Values keep everything after the first '='.
        assert_eq!(parsed["R2_SECRET_KEY"], "s=cr=et");
        assert_eq!(parsed["R2_BUCKET"], "my-bucket");
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let parsed = parse_plaintext("no equals sign here\nKEY=ok\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["KEY"], "ok");
    }
}
