use std::{fs, path::Path, path::PathBuf, time::Duration};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use serde_with::{DurationMilliSeconds, serde_as};

use crate::error::{Context, Error, Result};
use crate::exporter::CsvDialect;

pub const CONFIG_FILE: &str = "weifilter/config.json";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filtered_users_url: String,
    pub profile_info_url: String,
    pub referer: String,
    pub client_version: String,
    pub server_version: String,
    pub accept_language: String,
    pub cookie: Option<String>,
    pub cookie_file: Option<PathBuf>,
    pub cookie_domain: String,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub initial_backoff: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub page_interval: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub profile_interval: Duration,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub request_timeout: Option<Duration>,
    pub terminal_error_types: Vec<String>,
    pub csv_dialect: CsvDialect,
    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filtered_users_url: "https://weibo.com/ajax/setting/getFilteredUsers".into(),
            profile_info_url: "https://weibo.com/ajax/profile/info".into(),
            referer: "https://weibo.com/set/shield?type=user".into(),
            client_version: "v2.40.44".into(),
            server_version: "v2023.04.27.3".into(),
            accept_language: "en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7,zh-TW;q=0.6".into(),
            cookie: None,
            cookie_file: None,
            cookie_domain: "weibo.com".into(),
            initial_backoff: Duration::from_millis(1000),
            page_interval: Duration::from_millis(1000),
            profile_interval: Duration::from_millis(1000),
            request_timeout: None,
            terminal_error_types: vec!["link".into(), "toast".into()],
            csv_dialect: CsvDialect::default(),
            output_path: PathBuf::from("filtered-users.csv"),
        }
    }
}

impl Config {
    /// Reads a config file. Keys missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from {path:?}");
        let content = fs::read_to_string(path).context("reading config file")?;
        let config: Config = from_str(&content).context("parsing config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Looks for `weifilter/config.json` in the usual places and falls back
    /// to the defaults when none exists.
    pub fn find_and_load() -> Result<Self> {
        match find_config_file()? {
            Some(path) => {
                info!("Using config file {path:?}");
                Self::load(path)
            }
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_backoff.is_zero() {
            return Err(Error::Config("initial_backoff must be positive".into()));
        }
        if self.cookie_domain.is_empty() {
            return Err(Error::Config("cookie_domain must not be empty".into()));
        }
        Ok(())
    }
}

// Lookup order: local config dir, config dir, then the executable's dir.
fn find_config_file() -> Result<Option<PathBuf>> {
    let exe_path = std::env::current_exe()?;
    let exe_dir = exe_path.parent().unwrap_or(&exe_path);

    let paths = [
        dirs::config_local_dir().unwrap_or_default().join(CONFIG_FILE),
        dirs::config_dir().unwrap_or_default().join(CONFIG_FILE),
        exe_dir.join(CONFIG_FILE),
    ];

    Ok(paths.into_iter().find(|p| p.exists()))
}
