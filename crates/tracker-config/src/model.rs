use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "BILL_TRACKER_HOME";
const DEFAULT_DIR_NAME: &str = ".bill_tracker";

/// Stores user preferences for formatting, storage and ledger behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for bill data. Defaults to `$BILL_TRACKER_HOME` or `~/.bill_tracker`.
    pub data_root: Option<PathBuf>,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    /// `absorb_in_last` or `lossy`.
    #[serde(default = "Config::default_remainder_policy")]
    pub remainder_policy: String,
    #[serde(default)]
    pub remember_session: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "pt-BR".into(),
            currency: "BRL".into(),
            data_root: None,
            backup_retention: Self::default_backup_retention(),
            remainder_policy: Self::default_remainder_policy(),
            remember_session: false,
        }
    }
}

impl Config {
    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_remainder_policy() -> String {
        "absorb_in_last".into()
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }
        default_data_root()
    }
}

/// Application data directory: `$BILL_TRACKER_HOME`, else `~/.bill_tracker`.
pub fn default_data_root() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
