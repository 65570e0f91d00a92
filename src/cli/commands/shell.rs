//! `lockbox shell`: interactive menu over one unlocked vault.
//!
//! The vault is opened once, the passphrase is kept for the session, and
//! every command that changes the vault is saved before the menu is
//! shown again.  Sorting only changes what is printed.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_settings, reveal_secrets, Cli, Session};
use crate::errors::{LockboxError, Result};
use crate::vault::{Entry, SortField};

/// Menu entries, in the order they are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Search,
    Sort,
    Add,
    Edit,
    Delete,
    AddCategory,
    DeleteCategory,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 8] = [
        MenuAction::Search,
        MenuAction::Sort,
        MenuAction::Add,
        MenuAction::Edit,
        MenuAction::Delete,
        MenuAction::AddCategory,
        MenuAction::DeleteCategory,
        MenuAction::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Search => "Search passwords",
            MenuAction::Sort => "Sort passwords",
            MenuAction::Add => "Add password",
            MenuAction::Edit => "Edit password",
            MenuAction::Delete => "Delete password(s)",
            MenuAction::AddCategory => "Add category",
            MenuAction::DeleteCategory => "Delete category",
            MenuAction::Exit => "Exit",
        }
    }
}

/// Where the shell gets its input from.
pub trait Prompter {
    /// Pick one of `items`; `None` if the user backs out.
    fn choose(&mut self, prompt: &str, items: &[&str]) -> Result<Option<usize>>;

    /// A line of visible text, possibly empty.
    fn text(&mut self, prompt: &str) -> Result<String>;

    /// A hidden secret.
    fn secret(&mut self, prompt: &str) -> Result<Zeroizing<String>>;
}

/// `Prompter` backed by `dialoguer` on the terminal.
struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn choose(&mut self, prompt: &str, items: &[&str]) -> Result<Option<usize>> {
        dialoguer::Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(|e| LockboxError::CommandFailed(format!("menu prompt: {e}")))
    }

    fn text(&mut self, prompt: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| LockboxError::CommandFailed(format!("input prompt: {e}")))
    }

    fn secret(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| LockboxError::CommandFailed(format!("input prompt: {e}")))
    }
}

/// A saved change, recorded in the audit log.
struct Change {
    op: &'static str,
    entry: Option<String>,
    details: Option<String>,
}

/// Execute the `shell` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let mut session = Session::open(cli)?;

    if session.vault.is_empty() {
        output::info("No passwords found in the file.");
    }

    run(&mut session, &mut TerminalPrompter, reveal_secrets(cli, &settings))
}

/// Drive the menu until the user exits.
///
/// Errors from a single action (duplicate entry, unknown name, ...) are
/// printed and the menu continues.  A failed save ends the session.
pub fn run(session: &mut Session, prompter: &mut dyn Prompter, reveal: bool) -> Result<()> {
    let labels: Vec<&str> = MenuAction::ALL.iter().map(|a| a.label()).collect();

    loop {
        let action = prompter
            .choose("Lockbox", &labels)?
            .and_then(|i| MenuAction::ALL.get(i).copied())
            .unwrap_or(MenuAction::Exit);

        if action == MenuAction::Exit {
            output::info("Exiting.");
            return Ok(());
        }

        match perform(session, prompter, action, reveal) {
            Ok(Some(change)) => {
                session.save()?;
                session.audit(change.op, change.entry.as_deref(), change.details.as_deref());
            }
            Ok(None) => {}
            Err(e) => output::error(&e.to_string()),
        }
    }
}

fn perform(
    session: &mut Session,
    prompter: &mut dyn Prompter,
    action: MenuAction,
    reveal: bool,
) -> Result<Option<Change>> {
    let vault = &mut session.vault;

    match action {
        MenuAction::Search => {
            let term = prompter.text("Search term")?;
            let hits = vault.search(&term);
            if hits.is_empty() {
                output::info("No passwords found matching the search term.");
            } else {
                output::print_entries_table(hits, reveal);
            }
            Ok(None)
        }

        MenuAction::Sort => {
            let Some(choice) = prompter.choose("Sort by", &["name", "category"])? else {
                return Ok(None);
            };
            let field = if choice == 0 {
                SortField::Name
            } else {
                SortField::Category
            };
            output::print_entries_table(vault.sort_by(field), reveal);
            Ok(None)
        }

        MenuAction::Add => {
            let name = prompter.text("Name")?;
            let secret = prompter.secret("Password")?;
            let category = prompter.text("Category")?;
            let site = prompter.text("Website (optional)")?;
            let login = prompter.text("Login (optional)")?;

            let entry = Entry::new(name.as_str(), secret.as_str(), category.as_str())
                .with_site(site)
                .with_login(login);
            vault.add_entry(entry)?;

            output::success("Password added successfully.");
            Ok(Some(Change {
                op: "add",
                entry: Some(name),
                details: (!category.is_empty()).then_some(category),
            }))
        }

        MenuAction::Edit => {
            let name = prompter.text("Name of the password to edit")?;
            if vault.find(&name).is_none() {
                return Err(LockboxError::NotFound(name));
            }
            let secret = prompter.secret("New password")?;
            vault.edit_secret(&name, &secret)?;

            output::success("Password updated successfully.");
            Ok(Some(Change {
                op: "edit",
                entry: Some(name),
                details: None,
            }))
        }

        MenuAction::Delete => {
            let name = prompter.text("Name of the password(s) to delete")?;
            let removed = vault.delete_by_name(&name);
            if removed.is_empty() {
                return Err(LockboxError::NotFound(name));
            }

            output::success("Deleted password(s):");
            output::print_entries_table(&removed, false);
            Ok(Some(Change {
                op: "delete",
                entry: Some(name),
                details: Some(format!("{} entries", removed.len())),
            }))
        }

        MenuAction::AddCategory => {
            let category = prompter.text("Category name")?;
            vault.add_category(&category)?;

            output::success("Category added successfully.");
            Ok(Some(Change {
                op: "category-add",
                entry: None,
                details: Some(category),
            }))
        }

        MenuAction::DeleteCategory => {
            let category = prompter.text("Category to delete")?;
            let removed = vault.delete_category(&category);
            if removed.is_empty() {
                output::info("No passwords found in the given category.");
                return Ok(None);
            }

            output::success("Deleted passwords in the category:");
            output::print_entries_table(&removed, false);
            Ok(Some(Change {
                op: "category-delete",
                entry: None,
                details: Some(category),
            }))
        }

        MenuAction::Exit => Ok(None),
    }
}
