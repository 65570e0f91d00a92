//! `lockbox keyfile-generate`: create a new random keyfile.
//!
//! A vault created with `--keyfile` needs both the passphrase and the
//! keyfile to open.

use std::path::{Path, PathBuf};

use crate::cli::output;
use crate::cli::{load_settings, vault_path, Cli};
use crate::errors::Result;

/// Default keyfile name, placed beside the vault file.
const DEFAULT_KEYFILE_NAME: &str = "lockbox.keyfile";

/// Execute the `keyfile-generate` command.
pub fn execute(cli: &Cli, keyfile_path: Option<&Path>) -> Result<()> {
    let path = match keyfile_path {
        Some(p) => p.to_path_buf(),
        None => default_keyfile_path(cli)?,
    };

    crate::crypto::keyfile::generate_keyfile(&path)?;

    output::success(&format!("Keyfile generated at {}", path.display()));
    output::warning("Keep this file secret! Anyone with it can help unlock your vault.");
    output::tip(&format!(
        "Create a vault with it: lockbox --keyfile {} init",
        path.display()
    ));

    Ok(())
}

fn default_keyfile_path(cli: &Cli) -> Result<PathBuf> {
    let settings = load_settings()?;
    let vault = vault_path(cli, &settings)?;
    Ok(crate::fs::parent_dir(&vault).join(DEFAULT_KEYFILE_NAME))
}
