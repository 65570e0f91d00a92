//! `lockbox edit`: replace an entry's secret.

use crate::cli::output;
use crate::cli::{read_secret, Cli, Session};
use crate::errors::{LockboxError, Result};

/// Execute the `edit` command.
pub fn execute(cli: &Cli, name: &str, secret: Option<&str>) -> Result<()> {
    let mut session = Session::open_existing(cli)?;

    if session.vault.find(name).is_none() {
        return Err(LockboxError::NotFound(name.to_string()));
    }

    let new_secret = read_secret(secret, &format!("Enter new secret for {name}"))?;
    session.vault.edit_secret(name, &new_secret)?;
    session.save()?;

    session.audit("edit", Some(name), None);
    output::success(&format!("Secret for '{name}' updated."));

    Ok(())
}
