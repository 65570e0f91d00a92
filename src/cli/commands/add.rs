//! `lockbox add`: store a new entry.

use crate::cli::output;
use crate::cli::{read_secret, Cli, Session};
use crate::errors::Result;
use crate::vault::Entry;

/// Fields of a new entry as given on the command line.
pub struct NewEntry<'a> {
    pub name: &'a str,
    pub category: &'a str,
    pub site: Option<&'a str>,
    pub login: Option<&'a str>,
    pub secret: Option<&'a str>,
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, new: &NewEntry<'_>) -> Result<()> {
    let secret = read_secret(new.secret, &format!("Enter secret for {}", new.name))?;

    let mut entry = Entry::new(new.name, secret.as_str(), new.category);
    if let Some(site) = new.site {
        entry = entry.with_site(site);
    }
    if let Some(login) = new.login {
        entry = entry.with_login(login);
    }

    let mut session = Session::open(cli)?;
    session.vault.add_entry(entry)?;
    session.save()?;

    session.audit("add", Some(new.name), non_empty(new.category));
    output::success(&format!(
        "Added '{}' to {} ({} entries)",
        new.name,
        session.path().display(),
        session.vault.iter().filter(|e| !e.is_placeholder()).count()
    ));

    Ok(())
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
