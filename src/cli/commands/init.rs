//! `lockbox init`: create a new, empty vault file.

use crate::cli::output;
use crate::cli::{load_settings, vault_path, Cli, Session};
use crate::errors::{LockboxError, Result};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let path = vault_path(cli, &settings)?;

    if path.exists() {
        output::tip("Use `lockbox add` to add entries to the existing vault.");
        return Err(LockboxError::VaultAlreadyExists(path));
    }

    let mut session = Session::open_at(cli, &settings, &path)?;
    session.save()?;

    if cli.keyfile.is_some() {
        output::info("Vault created with keyfile, you must pass --keyfile on every command.");
    }
    output::success(&format!("Vault created at {}", path.display()));
    session.audit("init", None, Some("vault created"));

    output::tip("Run `lockbox add <name>` to store a secret.");
    output::tip("Run `lockbox shell` for the interactive menu.");

    Ok(())
}
