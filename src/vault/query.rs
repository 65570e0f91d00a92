//! Read-only queries over a `Vault`: search, sorted views, categories.
//!
//! Nothing here mutates the vault.  Sorting returns a view; the vault
//! keeps its insertion order and that is the order written to disk.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::collection::Vault;
use super::entry::Entry;

/// Fields a sorted view can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Category,
}

impl SortField {
    fn key(self, entry: &Entry) -> &str {
        match self {
            SortField::Name => &entry.name,
            SortField::Category => &entry.category,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Name => f.write_str("name"),
            SortField::Category => f.write_str("category"),
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(SortField::Name),
            "category" => Ok(SortField::Category),
            other => Err(format!("unknown sort field '{other}', use name or category")),
        }
    }
}

impl Vault {
    /// Entries with `term` in their name, category, site, or login.
    ///
    /// Literal, case-sensitive substring match; results keep vault order.
    pub fn search(&self, term: &str) -> Vec<&Entry> {
        self.iter().filter(|e| e.matches(term)).collect()
    }

    /// All entries ordered by `field`, ascending.
    ///
    /// The sort is stable: entries with equal keys keep their vault order.
    pub fn sort_by(&self, field: SortField) -> Vec<&Entry> {
        let mut view: Vec<&Entry> = self.iter().collect();
        view.sort_by(|a, b| field.key(a).cmp(field.key(b)));
        view
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.iter()
            .map(|entry| entry.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    /// Group real entries by category, in order of first appearance.
    ///
    /// Every category appears, even one that only has a placeholder;
    /// placeholders themselves are left out of the groups.
    pub fn partition_by_category(&self) -> Vec<(&str, Vec<&Entry>)> {
        self.categories()
            .into_iter()
            .map(|category| {
                let members = self
                    .iter()
                    .filter(|e| e.category == category && !e.is_placeholder())
                    .collect();
                (category, members)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vault {
        Vault::from_entries(vec![
            Entry::new("gmail", "p1", "mail").with_site("google.com"),
            Entry::new("bank", "p2", "finance").with_login("alice"),
            Entry::new("amazon", "p3", "shopping"),
            Entry::new("outlook", "p4", "mail"),
            Entry::placeholder("travel"),
        ])
    }

    #[test]
    fn search_matches_any_public_field_in_order() {
        let vault = sample();

        let names: Vec<&str> = vault
            .search("mail")
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["gmail", "outlook"]);

        assert_eq!(vault.search("google")[0].name, "gmail");
        assert_eq!(vault.search("alice")[0].name, "bank");
        assert!(vault.search("p1").is_empty());
        assert!(vault.search("Mail").is_empty());
    }

    #[test]
    fn search_treats_term_literally() {
        let vault = Vault::from_entries(vec![
            Entry::new("a.b", "x", ""),
            Entry::new("axb", "x", ""),
        ]);
        let hits = vault.search("a.b");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "a.b");
    }

    #[test]
    fn sort_by_name_leaves_vault_untouched() {
        let vault = sample();
        let before = vault.clone();

        let names: Vec<&str> = vault
            .sort_by(SortField::Name)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["", "amazon", "bank", "gmail", "outlook"]);
        assert_eq!(vault, before);
    }

    #[test]
    fn sort_by_category_is_stable() {
        let vault = sample();
        let sorted = vault.sort_by(SortField::Category);
        let pairs: Vec<(&str, &str)> = sorted
            .iter()
            .map(|e| (e.category.as_str(), e.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("finance", "bank"),
                ("mail", "gmail"),
                ("mail", "outlook"),
                ("shopping", "amazon"),
                ("travel", ""),
            ]
        );
    }

    #[test]
    fn categories_in_first_appearance_order() {
        assert_eq!(
            sample().categories(),
            vec!["mail", "finance", "shopping", "travel"]
        );
    }

    #[test]
    fn categories_dedupe_interleaved_repeats() {
        let vault = Vault::from_entries(vec![
            Entry::new("a", "1", "work"),
            Entry::new("b", "2", "home"),
            Entry::new("c", "3", "work"),
            Entry::new("d", "4", "home"),
            Entry::new("e", "5", "work"),
        ]);
        assert_eq!(vault.categories(), vec!["work", "home"]);
    }

    #[test]
    fn partition_skips_placeholders_but_keeps_category() {
        let vault = sample();
        let groups = vault.partition_by_category();

        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].0, "mail");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[3].0, "travel");
        assert!(groups[3].1.is_empty());
    }

    #[test]
    fn sort_field_parses() {
        assert_eq!("name".parse::<SortField>().unwrap(), SortField::Name);
        assert_eq!(" category ".parse::<SortField>().unwrap(), SortField::Category);
        assert!("site".parse::<SortField>().is_err());
        assert_eq!(SortField::Category.to_string(), "category");
    }
}
