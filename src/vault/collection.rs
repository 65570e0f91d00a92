//! The in-memory `Vault` and its mutating operations.
//!
//! A `Vault` is the decrypted, ordered list of entries for one session.
//! It never touches disk; `RecordStore` loads and saves it.

use zeroize::Zeroize;

use super::entry::Entry;
use crate::errors::{LockboxError, Result};

/// Ordered collection of entries.  Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vault {
    entries: Vec<Entry>,
}

impl Vault {
    /// An empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vault from entries in the given order.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in vault order, placeholders included.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// First entry with exactly this name.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        if name.is_empty() {
            return None;
        }
        self.entries.iter().find(|e| e.name == name)
    }

    /// Append an entry.
    ///
    /// Rejects an entry whose name, category, and secret all equal an
    /// existing entry's; the vault is left unchanged.
    pub fn add_entry(&mut self, entry: Entry) -> Result<()> {
        if entry.name.is_empty() {
            return Err(LockboxError::InvalidEntry("name cannot be empty".into()));
        }

        let duplicate = self.entries.iter().any(|e| {
            e.name == entry.name && e.category == entry.category && e.secret == entry.secret
        });
        if duplicate {
            return Err(LockboxError::DuplicateEntry {
                name: entry.name.clone(),
                category: entry.category.clone(),
            });
        }

        self.entries.push(entry);
        Ok(())
    }

    /// Replace the secret of the first entry named `name`.
    pub fn edit_secret(&mut self, name: &str, new_secret: &str) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| !name.is_empty() && e.name == name)
            .ok_or_else(|| LockboxError::NotFound(name.to_string()))?;

        let mut old = std::mem::replace(&mut entry.secret, new_secret.to_string());
        old.zeroize();
        Ok(())
    }

    /// Remove every entry named `name` and return them in vault order.
    pub fn delete_by_name(&mut self, name: &str) -> Vec<Entry> {
        if name.is_empty() {
            return Vec::new();
        }
        self.remove_where(|e| e.name == name)
    }

    /// Create an empty category by inserting its placeholder entry.
    ///
    /// Fails if any entry (placeholder or not) already uses the category.
    pub fn add_category(&mut self, category: &str) -> Result<()> {
        if category.is_empty() {
            return Err(LockboxError::InvalidEntry(
                "category name cannot be empty".into(),
            ));
        }
        if self.entries.iter().any(|e| e.category == category) {
            return Err(LockboxError::DuplicateCategory(category.to_string()));
        }

        self.entries.push(Entry::placeholder(category));
        Ok(())
    }

    /// Remove every entry whose category equals `category` exactly,
    /// placeholders included, and return them in vault order.
    pub fn delete_category(&mut self, category: &str) -> Vec<Entry> {
        self.remove_where(|e| e.category == category)
    }

    /// Split the entries into removed and kept without mutating while
    /// iterating.
    fn remove_where(&mut self, predicate: impl Fn(&Entry) -> bool) -> Vec<Entry> {
        let (removed, kept): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(predicate);
        self.entries = kept;
        removed
    }
}

impl<'a> IntoIterator for &'a Vault {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vault {
        Vault::from_entries(vec![
            Entry::new("gmail", "p1", "mail"),
            Entry::new("bank", "p2", "finance"),
            Entry::new("gmail", "p3", "work"),
            Entry::placeholder("travel"),
        ])
    }

    #[test]
    fn add_rejects_exact_duplicate_only() {
        let mut vault = sample();

        let err = vault.add_entry(Entry::new("gmail", "p1", "mail")).unwrap_err();
        assert!(matches!(err, LockboxError::DuplicateEntry { .. }));
        assert_eq!(vault, sample());

        // Same name and category, different secret: allowed.
        vault.add_entry(Entry::new("gmail", "other", "mail")).unwrap();
        assert_eq!(vault.len(), 5);
    }

    #[test]
    fn add_rejects_empty_name() {
        let mut vault = Vault::new();
        assert!(matches!(
            vault.add_entry(Entry::new("", "x", "mail")),
            Err(LockboxError::InvalidEntry(_))
        ));
        assert!(vault.is_empty());
    }

    #[test]
    fn edit_changes_first_match_only() {
        let mut vault = sample();
        vault.edit_secret("gmail", "new").unwrap();

        assert_eq!(vault.entries()[0].secret, "new");
        assert_eq!(vault.entries()[2].secret, "p3");
    }

    #[test]
    fn edit_missing_is_not_found() {
        let mut vault = sample();
        assert!(matches!(
            vault.edit_secret("nope", "x"),
            Err(LockboxError::NotFound(_))
        ));
        // Placeholders have empty names and are never edit targets.
        assert!(vault.edit_secret("", "x").is_err());
        assert_eq!(vault, sample());
    }

    #[test]
    fn delete_by_name_removes_all_matches_in_order() {
        let mut vault = sample();
        let removed = vault.delete_by_name("gmail");

        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].category, "mail");
        assert_eq!(removed[1].category, "work");
        assert_eq!(vault.len(), 2);
        assert!(vault.delete_by_name("gmail").is_empty());
    }

    #[test]
    fn delete_by_empty_name_keeps_placeholders() {
        let mut vault = sample();
        assert!(vault.delete_by_name("").is_empty());
        assert_eq!(vault.len(), 4);
    }

    #[test]
    fn add_category_inserts_placeholder_once() {
        let mut vault = sample();
        vault.add_category("games").unwrap();
        assert!(vault.entries().last().unwrap().is_placeholder());

        assert!(matches!(
            vault.add_category("games"),
            Err(LockboxError::DuplicateCategory(_))
        ));
        assert!(matches!(
            vault.add_category("mail"),
            Err(LockboxError::DuplicateCategory(_))
        ));
        assert!(vault.add_category("").is_err());
    }

    #[test]
    fn delete_category_includes_placeholders() {
        let mut vault = sample();
        let removed = vault.delete_category("travel");
        assert_eq!(removed.len(), 1);
        assert!(removed[0].is_placeholder());
        assert_eq!(vault.len(), 3);
    }

    #[test]
    fn find_returns_first_named_entry() {
        let vault = sample();
        assert_eq!(vault.find("gmail").unwrap().secret, "p1");
        assert!(vault.find("").is_none());
        assert!(vault.find("missing").is_none());
    }
}
