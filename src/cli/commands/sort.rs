//! `lockbox sort`: list entries ordered by name or category.
//!
//! The order is a view for this command only; the file keeps insertion
//! order.

use crate::cli::output;
use crate::cli::{load_settings, reveal_secrets, Cli, Session, SortArg};
use crate::errors::Result;
use crate::vault::SortField;

/// Execute the `sort` command.
pub fn execute(cli: &Cli, by: SortArg) -> Result<()> {
    let settings = load_settings()?;
    let session = Session::open_existing(cli)?;

    let field = SortField::from(by);
    output::info(&format!("Entries sorted by {field}"));
    output::print_entries_table(session.vault.sort_by(field), reveal_secrets(cli, &settings));

    Ok(())
}
