//! `lockbox search`: find entries by substring.

use crate::cli::output;
use crate::cli::{load_settings, reveal_secrets, Cli, Session};
use crate::errors::Result;

/// Execute the `search` command.
pub fn execute(cli: &Cli, term: &str) -> Result<()> {
    let settings = load_settings()?;
    let session = Session::open_existing(cli)?;

    let hits = session.vault.search(term);
    if hits.is_empty() {
        output::info(&format!("No entries match '{term}'."));
        return Ok(());
    }

    output::info(&format!("{} match(es) for '{term}'", hits.len()));
    output::print_entries_table(hits, reveal_secrets(cli, &settings));

    Ok(())
}
