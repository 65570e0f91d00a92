//! `lockbox delete`: remove every entry with a given name.

use crate::cli::output;
use crate::cli::{confirm, Cli, Session};
use crate::errors::{LockboxError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    if !force && !confirm(&format!("Delete every entry named '{name}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    let mut session = Session::open_existing(cli)?;

    let removed = session.vault.delete_by_name(name);
    if removed.is_empty() {
        return Err(LockboxError::NotFound(name.to_string()));
    }
    session.save()?;

    let details = format!("{} entr{}", removed.len(), if removed.len() == 1 { "y" } else { "ies" });
    session.audit("delete", Some(name), Some(&details));

    output::success(&format!("Deleted {details} named '{name}':"));
    output::print_entries_table(&removed, false);

    Ok(())
}
