//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::Entry;

/// Shown in place of a secret unless revealing is turned on.
const MASK: &str = "********";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print entries as a table (Name, Category, Site, Login, Secret).
///
/// Placeholder entries are skipped.  Secrets are masked unless `reveal`.
pub fn print_entries_table<'a>(entries: impl IntoIterator<Item = &'a Entry>, reveal: bool) {
    let rows: Vec<Vec<String>> = entries
        .into_iter()
        .filter(|e| !e.is_placeholder())
        .map(|e| entry_row(e, reveal))
        .collect();

    if rows.is_empty() {
        info("No entries to show.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Category", "Site", "Login", "Secret"]);
    for row in rows {
        table.add_row(row);
    }

    println!("{table}");
}

/// Print categories with their entry counts.
pub fn print_categories_table(groups: &[(&str, Vec<&Entry>)]) {
    if groups.is_empty() {
        info("No categories yet.");
        tip("Run `lockbox category add <name>` to create one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Entries"]);
    for (category, members) in groups {
        table.add_row(vec![display_category(category), members.len().to_string()]);
    }

    println!("{table}");
}

fn entry_row(entry: &Entry, reveal: bool) -> Vec<String> {
    vec![
        entry.name.clone(),
        display_category(&entry.category),
        entry.site.clone().unwrap_or_else(|| "-".into()),
        entry.login.clone().unwrap_or_else(|| "-".into()),
        if reveal {
            entry.secret.clone()
        } else {
            MASK.to_string()
        },
    ]
}

fn display_category(category: &str) -> String {
    if category.is_empty() {
        "(none)".to_string()
    } else {
        category.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_mask_secret_unless_revealed() {
        let entry = Entry::new("gmail", "hunter22", "mail").with_site("google.com");

        let masked = entry_row(&entry, false);
        assert_eq!(masked[4], MASK);
        assert_eq!(masked[2], "google.com");
        assert_eq!(masked[3], "-");

        assert_eq!(entry_row(&entry, true)[4], "hunter22");
    }

    #[test]
    fn empty_category_is_labelled() {
        assert_eq!(display_category(""), "(none)");
        assert_eq!(display_category("mail"), "mail");
    }
}
