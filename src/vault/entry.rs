//! The `Entry` type and its record encoding.
//!
//! Before encryption an entry is serialized as five length-prefixed
//! UTF-8 fields, in this order:
//!
//! ```text
//! [name_len u32 LE][name][secret_len u32 LE][secret][category_len u32 LE][category]
//! [site_len u32 LE][site][login_len u32 LE][login]
//! ```
//!
//! Absent `site` / `login` are encoded as empty strings.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::format::ByteReader;
use crate::errors::{LockboxError, Result};

/// Number of fields in an encoded entry.
const FIELD_COUNT: usize = 5;

/// One stored secret.
///
/// An entry with an empty `name` and `secret` is a category placeholder:
/// it keeps an otherwise empty category alive.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Entry {
    pub name: String,
    pub secret: String,
    pub category: String,
    pub site: Option<String>,
    pub login: Option<String>,
}

impl Entry {
    /// Create an entry without site or login.
    pub fn new(
        name: impl Into<String>,
        secret: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
            category: category.into(),
            site: None,
            login: None,
        }
    }

    /// Create the placeholder entry that represents an empty category.
    pub fn placeholder(category: impl Into<String>) -> Self {
        Self::new("", "", category)
    }

    /// Set the site; an empty string clears it.
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = non_empty(site.into());
        self
    }

    /// Set the login; an empty string clears it.
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = non_empty(login.into());
        self
    }

    /// Whether this entry only marks a category.
    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty() && self.secret.is_empty()
    }

    /// Literal, case-sensitive substring match over every non-secret field.
    pub fn matches(&self, term: &str) -> bool {
        self.name.contains(term)
            || self.category.contains(term)
            || self.site.as_deref().is_some_and(|s| s.contains(term))
            || self.login.as_deref().is_some_and(|l| l.contains(term))
    }

    /// Serialize into the plaintext record format.
    pub fn encode(&self) -> Result<Zeroizing<Vec<u8>>> {
        let fields = [
            self.name.as_str(),
            self.secret.as_str(),
            self.category.as_str(),
            self.site.as_deref().unwrap_or(""),
            self.login.as_deref().unwrap_or(""),
        ];

        let total = fields.iter().map(|f| 4 + f.len()).sum();
        let mut buf = Zeroizing::new(Vec::with_capacity(total));

        for field in fields {
            let len = u32::try_from(field.len()).map_err(|_| {
                LockboxError::InvalidEntry(format!(
                    "field of {} bytes is too large to store",
                    field.len()
                ))
            })?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.extend_from_slice(field.as_bytes());
        }

        Ok(buf)
    }

    /// Parse a decrypted record.  Trailing bytes are rejected.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let mut fields: Vec<String> = Vec::with_capacity(FIELD_COUNT);

        for _ in 0..FIELD_COUNT {
            let len = reader.u32().ok_or_else(truncated)? as usize;
            let bytes = reader.take(len).ok_or_else(truncated)?;
            let field = String::from_utf8(bytes.to_vec()).map_err(|e| {
                let mut bad = e.into_bytes();
                bad.zeroize();
                LockboxError::InvalidVaultFormat("record field is not valid UTF-8".into())
            })?;
            fields.push(field);
        }

        if !reader.is_empty() {
            fields.zeroize();
            return Err(LockboxError::InvalidVaultFormat(
                "trailing bytes after record fields".into(),
            ));
        }

        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        let entry = Self {
            name: next(),
            secret: next(),
            category: next(),
            site: non_empty(next()),
            login: non_empty(next()),
        };
        Ok(entry)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .field("category", &self.category)
            .field("site", &self.site)
            .field("login", &self.login)
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn truncated() -> LockboxError {
    LockboxError::InvalidVaultFormat("record ends before all fields were read".into())
}
