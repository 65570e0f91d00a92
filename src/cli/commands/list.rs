//! `lockbox list`: display every entry in a table.

use crate::cli::output;
use crate::cli::{load_settings, reveal_secrets, Cli, Session};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let session = Session::open_existing(cli)?;
    let vault = &session.vault;

    let count = vault.iter().filter(|e| !e.is_placeholder()).count();
    if count == 0 {
        output::info("No passwords found in the vault.");
        output::tip("Run `lockbox add <name>` to add your first entry.");
        return Ok(());
    }

    output::info(&format!(
        "{count} entr{} in {} categor{}",
        if count == 1 { "y" } else { "ies" },
        vault.categories().len(),
        if vault.categories().len() == 1 { "y" } else { "ies" },
    ));
    output::print_entries_table(vault, reveal_secrets(cli, &settings));

    Ok(())
}
