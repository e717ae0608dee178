//! Client settings.
//!
//! Precedence: command-line flags > YAML config file > built-in defaults.
//! The config file is looked up at `--config PATH`, then `./miqcli.yml`
//! (or `.yaml`), then `/etc/miqcli/miqcli.yml` (or `.yaml`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::{CliError, Result};

/// Crate name as published; used by the version check.
pub const PACKAGE: &str = env!("CARGO_PKG_NAME");

/// Installed version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CFG_DIR: &str = "/etc/miqcli";
pub const CFG_NAME: &str = "miqcli";
pub const CFG_FILE_EXT: [&str; 2] = ["yml", "yaml"];

pub const DEFAULT_URL: &str = "https://localhost:8443";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "smartvm";

/// Provider-specific VM type naming; `{}` is replaced by the `--vtype` value.
pub const DEFAULT_VM_TYPE_TEMPLATE: &str = "ManageIQ::Providers::{}::CloudManager::Vm";

/// Raw shape of the YAML config file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub enable_ssl_verify: Option<bool>,
    pub vm_type_template: Option<String>,
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub enable_ssl_verify: Option<bool>,
}

/// Fully resolved settings handed to the transport and collections.
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: Url,
    pub username: String,
    pub password: String,
    pub token: Option<String>,
    pub verify_ssl: bool,
    pub vm_type_template: String,
}

impl Settings {
    /// Find and read the config file, then apply `overrides` on top.
    pub fn load(overrides: &Overrides, explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => Some(read_config(path)?),
            None => match discover_config_file() {
                Some(path) => {
                    crate::log_debug!("using config file {}", path.display());
                    Some(read_config(&path)?)
                }
                None => None,
            },
        };
        Self::resolve(file.unwrap_or_default(), overrides)
    }

    /// Merge a parsed config file with command-line overrides.
    pub fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Self> {
        let raw_url = overrides
            .url
            .clone()
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let url = Url::parse(&raw_url)
            .map_err(|e| CliError::Config(format!("invalid url '{raw_url}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CliError::Config(format!(
                "unsupported url scheme '{}' (expected http or https)",
                url.scheme()
            )));
        }

        let vm_type_template = file
            .vm_type_template
            .unwrap_or_else(|| DEFAULT_VM_TYPE_TEMPLATE.to_string());
        if !vm_type_template.contains("{}") {
            return Err(CliError::Config(
                "vm_type_template must contain a '{}' placeholder".into(),
            ));
        }

        Ok(Settings {
            url,
            username: overrides
                .username
                .clone()
                .or(file.username)
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: overrides
                .password
                .clone()
                .or(file.password)
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            token: overrides.token.clone().or(file.token),
            verify_ssl: overrides
                .enable_ssl_verify
                .or(file.enable_ssl_verify)
                .unwrap_or(false),
            vm_type_template,
        })
    }

    /// Expand the VM type template for one provider type (e.g. "Openstack").
    pub fn vm_type(&self, vtype: &str) -> String {
        self.vm_type_template.replacen("{}", vtype, 1)
    }
}

fn read_config(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&raw)
        .map_err(|e| CliError::Config(format!("invalid config file {}: {e}", path.display())))
}

fn discover_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok();
    let dirs = cwd.into_iter().chain(std::iter::once(PathBuf::from(CFG_DIR)));
    for dir in dirs {
        for ext in CFG_FILE_EXT {
            let candidate = dir.join(format!("{CFG_NAME}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}
