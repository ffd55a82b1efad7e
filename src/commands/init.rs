use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Creates the home directory, its data directory and an initial `config.json` with default
/// settings.
///
/// # Arguments
/// - `caixa_home` - The directory that will be the root of the data directory, e.g. `$HOME/caixa`
///
/// # Errors
/// - Returns an error if a configuration already exists in `caixa_home`.
/// - Returns an error if any file operations fail.
pub async fn init(caixa_home: &Path) -> Result<Out<PathBuf>> {
    let config = Config::create(caixa_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(Out::new(
        format!(
            "Successfully created the caixa directory at {}",
            config.root().display()
        ),
        config.config_path().to_path_buf(),
    ))
}
