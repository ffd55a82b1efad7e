//! Configuration file handling for caixa.
//!
//! The configuration file is stored at `$CAIXA_HOME/config.json` and contains the locations of the
//! two data files and the rules for reading interactive table edits.

use crate::error::Res;
use crate::model::{Coercion, InvalidEdit, DEFAULT_CURRENCY, DISPLAY_DATE_FORMAT};
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "caixa";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA: &str = "data";
const TRANSACTIONS_CSV: &str = "transactions.csv";
const BILLS_CSV: &str = "bills.csv";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CAIXA_HOME` and from there it loads `$CAIXA_HOME/config.json`. It provides the
/// resolved paths of the data files.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its `data` subdirectory and an initial `config.json` with
    /// default settings.
    ///
    /// # Errors
    /// - Returns an error if a `config.json` already exists in `dir`.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the caixa home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            config_path,
            config_file,
        };
        config.make_data_dirs().await?;
        Ok(config)
    }

    /// This will
    /// - validate that `caixa_home` exists and that the config file exists
    /// - load the config file
    /// - create the directories holding the data files if they are missing
    /// - return the loaded configuration object
    pub async fn load(caixa_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = caixa_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The caixa home directory is missing '{}', run 'caixa init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'caixa init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root,
            config_path,
            config_file,
        };
        config.make_data_dirs().await?;
        Ok(config)
    }

    async fn make_data_dirs(&self) -> Res<()> {
        for file in [self.transactions_path(), self.bills_path()] {
            if let Some(parent) = file.parent() {
                utils::make_dir(parent).await?;
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the transactions file path, resolved against the home directory if relative.
    pub fn transactions_path(&self) -> PathBuf {
        self.resolve(&self.config_file.transactions_file)
    }

    /// Returns the bills file path, resolved against the home directory if relative.
    pub fn bills_path(&self) -> PathBuf {
        self.resolve(&self.config_file.bills_file)
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    /// The coercion rules for interactive table edits.
    pub fn edit_coercion(&self) -> Coercion {
        Coercion::new(
            self.config_file.edit_date_format.clone(),
            self.config_file.invalid_edit,
        )
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            return p.to_path_buf();
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "caixa",
///   "config_version": 1,
///   "transactions_file": "data/transactions.csv",
///   "bills_file": "data/bills.csv",
///   "edit_date_format": "%d/%m/%Y",
///   "invalid_edit": "drop_row",
///   "currency_symbol": "R$"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "caixa"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the transactions CSV (relative to the home directory or absolute)
    #[serde(default = "default_transactions_file")]
    transactions_file: PathBuf,

    /// Path to the bills CSV (relative to the home directory or absolute)
    #[serde(default = "default_bills_file")]
    bills_file: PathBuf,

    /// The chrono format of dates in interactive table edits
    #[serde(default = "default_edit_date_format")]
    edit_date_format: String,

    /// What to do with an edited value that cannot be coerced
    #[serde(default)]
    invalid_edit: InvalidEdit,

    /// The symbol shown in front of amounts
    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            transactions_file: default_transactions_file(),
            bills_file: default_bills_file(),
            edit_date_format: default_edit_date_format(),
            invalid_edit: InvalidEdit::default(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_transactions_file() -> PathBuf {
    PathBuf::from(DATA).join(TRANSACTIONS_CSV)
}

fn default_bills_file() -> PathBuf {
    PathBuf::from(DATA).join(BILLS_CSV)
}

fn default_edit_date_format() -> String {
    DISPLAY_DATE_FORMAT.to_string()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
