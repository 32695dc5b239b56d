//! Account configuration
//!
//! Resolution order:
//! 1. Config path: `--config` / `CLOUDCTL_CONFIG`, else `$XDG_CONFIG_HOME/cloudctl/config.yaml`
//!    (platform equivalent on macOS and Windows)
//! 2. Account: `--account` / `CLOUDCTL_ACCOUNT`, else the first configured entry
//! 3. Field overrides on the selected account: `CLOUDCTL_TOKEN`, `CLOUDCTL_URL`, `CLOUDCTL_USER_ID`

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::infrastructure::{InfraError, InfraResult};

/// File name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "CLOUDCTL";

/// Commands that run without a valid configuration.
pub const BYPASS_COMMANDS: &[&str] = &["make-config", "version", "completion"];

/// One set of remote credentials plus the endpoint they are valid for.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub name: String,
    #[serde(rename = "userId", alias = "userid", alias = "user_id")]
    pub user_id: String,
    pub token: String,
    pub url: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

impl Account {
    /// Fail if fields needed to reach the remote API are empty.
    pub fn validate(&self) -> InfraResult<()> {
        for (field, value) in [("url", &self.url), ("token", &self.token)] {
            if value.trim().is_empty() {
                return Err(InfraError::IncompleteAccount {
                    name: self.name.clone(),
                    field,
                });
            }
        }
        Ok(())
    }

    /// Apply `CLOUDCTL_*` process environment overrides.
    pub fn apply_env_overrides(self) -> InfraResult<Self> {
        self.apply_env_overrides_from(None)
    }

    /// Apply overrides from `env`, or from the process environment when `None`.
    ///
    /// Overrides replace values; they never merge.
    pub fn apply_env_overrides_from(
        mut self,
        env: Option<config::Map<String, String>>,
    ) -> InfraResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .build()
            .map_err(|e| config_err(Path::new("<environment>"), e))?;

        if let Ok(val) = config.get_string("token") {
            debug!("token overridden from environment");
            self.token = val;
        }
        if let Ok(val) = config.get_string("url") {
            debug!(url = %val, "url overridden from environment");
            self.url = val;
        }
        if let Ok(val) = config.get_string("user_id") {
            self.user_id = val;
        }
        Ok(self)
    }
}

/// All settings parsed from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub accounts: Vec<Account>,
}

/// Get the platform config directory for cloudctl.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cloudctl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Resolve the config file path.
///
/// An explicit path wins and has `~` and `$VAR` expanded. Does not touch the filesystem.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => {
            let raw = path.to_string_lossy();
            match shellexpand::full(&raw) {
                Ok(expanded) => PathBuf::from(expanded.as_ref()),
                Err(_) => path.to_path_buf(),
            }
        }
        None => config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
    }
}

/// True unless the invocation contains a command that manages configuration itself.
///
/// Scans raw arguments because configuration is loaded before dispatch.
pub fn requires_config<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    !args
        .into_iter()
        .any(|arg| BYPASS_COMMANDS.contains(&arg.as_ref()))
}

impl Settings {
    /// Read and parse the config file at `path`.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> InfraResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => InfraError::ConfigNotFound(path.to_path_buf()),
            _ => InfraError::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Self::parse(&content, path)
    }

    /// Parse YAML config content; `path` is used for error messages only.
    pub fn parse(content: &str, path: &Path) -> InfraResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(content, FileFormat::Yaml))
            .build()
            .map_err(|e| config_err(path, e))?;
        let settings: Self = config.try_deserialize().map_err(|e| config_err(path, e))?;
        debug!(accounts = settings.accounts.len(), "parsed config");
        Ok(settings)
    }

    /// Select the account by name, else the first one.
    pub fn select(&self, name: Option<&str>) -> InfraResult<&Account> {
        match name {
            Some(name) => self
                .accounts
                .iter()
                .find(|a| a.name == name)
                .ok_or_else(|| InfraError::UnknownAccount(name.to_string())),
            None => self.accounts.first().ok_or(InfraError::NoAccounts),
        }
    }

    /// Load the file, select the account and apply environment overrides.
    pub fn resolve_account(path: &Path, name: Option<&str>) -> InfraResult<Account> {
        let settings = Self::load(path)?;
        let account = settings.select(name)?.clone();
        debug!(account = %account.name, "selected account");
        account.apply_env_overrides()
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cloudctl configuration
#
# The first account is used unless --account (or CLOUDCTL_ACCOUNT) names another.
# CLOUDCTL_TOKEN, CLOUDCTL_URL and CLOUDCTL_USER_ID override fields of the selected account.

accounts:
  - name: default
    userId: "00000000-0000-0000-0000-000000000000"
    token: "replace-with-api-token"
    url: "https://api.example.com"

#  - name: staging
#    userId: "..."
#    token: "..."
#    url: "https://api.staging.example.com"
"#
        .to_string()
    }
}

fn config_err(path: &Path, e: ConfigError) -> InfraError {
    InfraError::ConfigUnparseable {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
