//! `lockbox category`: add, delete, or list categories.

use crate::cli::output;
use crate::cli::{confirm, Cli, Session};
use crate::errors::Result;

/// Execute `lockbox category add`.
pub fn execute_add(cli: &Cli, name: &str) -> Result<()> {
    let mut session = Session::open(cli)?;

    session.vault.add_category(name)?;
    session.save()?;

    session.audit("category-add", None, Some(name));
    output::success(&format!("Category '{name}' added."));

    Ok(())
}

/// Execute `lockbox category delete`.
///
/// Removes the category and every entry in it.
pub fn execute_delete(cli: &Cli, name: &str, force: bool) -> Result<()> {
    if !force
        && !confirm(&format!(
            "Delete category '{name}' and every entry in it?"
        ))?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    let mut session = Session::open_existing(cli)?;

    let removed = session.vault.delete_category(name);
    if removed.is_empty() {
        output::info(&format!("No entries found in category '{name}'."));
        return Ok(());
    }
    session.save()?;

    let real = removed.iter().filter(|e| !e.is_placeholder()).count();
    session.audit(
        "category-delete",
        None,
        Some(&format!("{name}: {real} entries")),
    );

    output::success(&format!("Deleted category '{name}' ({real} entries)."));
    output::print_entries_table(&removed, false);

    Ok(())
}

/// Execute `lockbox category list`.
pub fn execute_list(cli: &Cli) -> Result<()> {
    let session = Session::open_existing(cli)?;
    output::print_categories_table(&session.vault.partition_by_category());
    Ok(())
}
