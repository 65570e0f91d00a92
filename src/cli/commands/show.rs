//! `lockbox show`: print or copy one entry's secret.

use crate::cli::output;
use crate::cli::{Cli, Session};
use crate::errors::{LockboxError, Result};

/// Execute the `show` command.
pub fn execute(cli: &Cli, name: &str, copy: bool) -> Result<()> {
    let session = Session::open_existing(cli)?;

    let entry = session
        .vault
        .find(name)
        .ok_or_else(|| LockboxError::NotFound(name.to_string()))?;

    if copy {
        copy_to_clipboard(&entry.secret)?;
        output::success(&format!("Secret for '{name}' copied to clipboard."));
    } else {
        println!("{}", entry.secret);
    }

    Ok(())
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| LockboxError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| LockboxError::ClipboardError(e.to_string()))
}
