//! Layered application configuration.
//!
//! Values are resolved lowest to highest:
//! built-in defaults < TOML file < `RMDUPES_*` environment < CLI flags.
//!
//! The TOML file is the one passed with `--config`, or `config.toml` in the
//! platform configuration directory when present.
//!
//! ```toml
//! io_threads = 4
//! verify = false
//! skip_hidden = false
//! action = "quarantine"
//! quarantine_dir = "/data/dupes"
//! output = "text"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::RemovalAction;
use crate::cli::{ActionArg, Cli};
use crate::error::UsageError;
use crate::output::OutputFormat;
use crate::scanner::WalkerConfig;

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "RMDUPES_";

/// Name of the configuration file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Resolved configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of I/O threads for hashing.
    pub io_threads: usize,
    /// Byte-compare same-digest files before grouping them.
    pub verify: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// How redundant copies are removed.
    pub action: ActionArg,
    /// Destination of the quarantine action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarantine_dir: Option<PathBuf>,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            verify: false,
            skip_hidden: false,
            action: ActionArg::Delete,
            quarantine_dir: None,
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Load the configuration for a CLI invocation, with the CLI flags merged.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError`] if an explicit `--config` file does not exist,
    /// if a layer cannot be parsed, or if the result is invalid.
    pub fn for_cli(cli: &Cli) -> Result<Self, UsageError> {
        let mut config = match &cli.config {
            Some(path) => {
                if !path.is_file() {
                    return Err(UsageError::InvalidOption(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from_path(path)?
            }
            None => Self::load()?,
        };
        config.merge_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Report format an invocation resolves to, without validating the rest.
    ///
    /// Used to choose how fatal errors are printed, so it never fails: a
    /// configuration that cannot be loaded means text.
    #[must_use]
    pub fn output_for_cli(cli: &Cli) -> OutputFormat {
        if let Some(output) = cli.output {
            return output;
        }
        let loaded = match &cli.config {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        };
        loaded.map_or(OutputFormat::Text, |config| config.output)
    }

    /// Load from the default platform-specific path and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Config`] if a layer cannot be parsed.
    pub fn load() -> Result<Self, UsageError> {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No platform config directory, using defaults and environment");
                Self::extract(Self::base().merge(Env::prefixed(ENV_PREFIX)))
            }
        }
    }

    /// Load from a TOML file and the environment.
    ///
    /// A missing file contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Config`] if the file or the environment holds
    /// a value of the wrong type.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, UsageError> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        Self::extract(
            Self::base()
                .merge(Toml::file(path))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    /// Default configuration file location, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rmdupes").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    fn extract(figment: Figment) -> Result<Self, UsageError> {
        figment.extract().map_err(UsageError::from)
    }

    /// Apply CLI flags on top of the loaded values.
    ///
    /// Only flags that were given override; boolean flags can enable but not
    /// disable a configured value. `--quarantine-dir` selects the quarantine
    /// action unless `--action` names another one.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        self.verify |= cli.verify;
        self.skip_hidden |= cli.skip_hidden;
        if let Some(output) = cli.output {
            self.output = output;
        }
        if let Some(dir) = &cli.quarantine_dir {
            self.quarantine_dir = Some(dir.clone());
            self.action = ActionArg::Quarantine;
        }
        if let Some(action) = cli.action {
            self.action = action;
        }
    }

    /// Check value ranges and option combinations.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidOption`] describing the first problem.
    pub fn validate(&self) -> Result<(), UsageError> {
        if self.io_threads == 0 {
            return Err(UsageError::InvalidOption(
                "io_threads must be at least 1".to_string(),
            ));
        }
        if self.action == ActionArg::Quarantine && self.quarantine_dir.is_none() {
            return Err(UsageError::InvalidOption(
                "The quarantine action requires --quarantine-dir".to_string(),
            ));
        }
        Ok(())
    }

    /// Walker settings; the quarantine directory is never scanned.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        let config = WalkerConfig::default().with_skip_hidden(self.skip_hidden);
        match (&self.action, &self.quarantine_dir) {
            (ActionArg::Quarantine, Some(dir)) => config.with_excluded_dir(dir.clone()),
            _ => config,
        }
    }

    /// Removal action for a scan of `root`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidOption`] if the quarantine action has no
    /// directory or the directory cannot be made absolute.
    pub fn removal_action(&self, root: &Path) -> Result<RemovalAction, UsageError> {
        Ok(match self.action {
            ActionArg::Delete => RemovalAction::Delete,
            ActionArg::Trash => RemovalAction::Trash,
            ActionArg::Quarantine => {
                let dir = self.quarantine_dir.as_deref().ok_or_else(|| {
                    UsageError::InvalidOption(
                        "The quarantine action requires --quarantine-dir".to_string(),
                    )
                })?;
                let dir = std::path::absolute(dir).map_err(|e| {
                    UsageError::InvalidOption(format!(
                        "Invalid quarantine directory {}: {e}",
                        dir.display()
                    ))
                })?;
                RemovalAction::Quarantine {
                    dir,
                    root: root.to_path_buf(),
                }
            }
        })
    }
}
