use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::LedgerError;

/// Contract address the dataset was deployed at; overridable via --contract.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x3B7410b19BF8a16E380c6269E88405687916B811";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Read/write client for the on-chain investment casting dataset
#[derive(Parser, Debug, Clone)]
#[command(
    name = "casting-ledger",
    about = "Read/write client for the on-chain investment casting dataset",
    version
)]
pub struct Settings {
    /// Wallet JSON-RPC endpoint (the wallet runtime that authorizes and signs)
    #[arg(long, env = "CASTING_WALLET_RPC")]
    pub rpc_url: Option<String>,

    /// Dataset contract address
    #[arg(long, default_value = DEFAULT_CONTRACT_ADDRESS)]
    pub contract: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.casting-ledger/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".casting-ledger").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and merge with last-used params where no explicit
    /// value was provided (CLI and environment always win), then persist the
    /// result for the next run.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        let mut settings = Settings::parse_from(args);

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return settings;
        }

        let last = LastUsedParams::load_from(config_path);

        // An endpoint from the flag or CASTING_WALLET_RPC wins over the
        // persisted one; absence of all three is reported later by
        // wallet_endpoint().
        if settings.rpc_url.is_none() {
            settings.rpc_url = last.rpc_url;
        }
        // NOTE: clap stores the arg id using the field name (underscores).
        if !is_arg_explicitly_set(&matches, "contract") {
            if let Some(v) = last.contract {
                settings.contract = v;
            }
        }

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// The wallet endpoint this process must use, or `EnvironmentUnavailable`
    /// when no wallet runtime is discoverable.
    pub fn wallet_endpoint(&self) -> Result<&str, LedgerError> {
        self.rpc_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(LedgerError::EnvironmentUnavailable)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            rpc_url: s.rpc_url.clone(),
            contract: Some(s.contract.clone()),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            rpc_url: Some("http://localhost:8545".to_string()),
            contract: Some(DEFAULT_CONTRACT_ADDRESS.to_string()),
        };

        params.save_to(&path).expect("save");
        let loaded = LastUsedParams::load_from(&path);

        assert_eq!(loaded.rpc_url, Some("http://localhost:8545".to_string()));
        assert_eq!(loaded.contract, Some(DEFAULT_CONTRACT_ADDRESS.to_string()));
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.rpc_url.is_none());
        assert!(loaded.contract.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["casting-ledger"]);
        assert_eq!(settings.contract, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_wallet_endpoint_absent_is_environment_unavailable() {
        let settings = Settings {
            rpc_url: None,
            contract: DEFAULT_CONTRACT_ADDRESS.to_string(),
            log_level: "INFO".to_string(),
            log_file: None,
            debug: false,
            clear: false,
        };
        assert!(matches!(
            settings.wallet_endpoint(),
            Err(LedgerError::EnvironmentUnavailable)
        ));
    }

    #[test]
    fn test_wallet_endpoint_blank_is_environment_unavailable() {
        let settings = Settings {
            rpc_url: Some("   ".to_string()),
            contract: DEFAULT_CONTRACT_ADDRESS.to_string(),
            log_level: "INFO".to_string(),
            log_file: None,
            debug: false,
            clear: false,
        };
        assert!(settings.wallet_endpoint().is_err());
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_rpc_url() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            rpc_url: Some("http://wallet.local:8545".to_string()),
            contract: None,
        };
        params.save_to(&config_path).expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["casting-ledger".into()], &config_path);
        assert_eq!(settings.rpc_url.as_deref(), Some("http://wallet.local:8545"));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            rpc_url: Some("http://stale:8545".to_string()),
            contract: Some("0x0000000000000000000000000000000000000001".to_string()),
        };
        params.save_to(&config_path).expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec![
                "casting-ledger".into(),
                "--rpc-url".into(),
                "http://fresh:8545".into(),
                "--contract".into(),
                "0x0000000000000000000000000000000000000002".into(),
            ],
            &config_path,
        );
        assert_eq!(settings.rpc_url.as_deref(), Some("http://fresh:8545"));
        assert_eq!(
            settings.contract,
            "0x0000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            rpc_url: Some("http://wallet.local:8545".to_string()),
            contract: None,
        };
        params.save_to(&config_path).expect("save");
        assert!(config_path.exists());

        Settings::load_with_last_used_impl(
            vec!["casting-ledger".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["casting-ledger".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec![
                "casting-ledger".into(),
                "--rpc-url".into(),
                "http://wallet.local:8545".into(),
            ],
            &config_path,
        );

        assert!(config_path.exists(), "config file must be persisted");
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.rpc_url, Some("http://wallet.local:8545".to_string()));
    }
}
