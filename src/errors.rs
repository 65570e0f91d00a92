use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Lockbox.
#[derive(Debug, Error)]
pub enum LockboxError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authentication failed on load. A wrong passphrase and a corrupted
    /// file are deliberately reported the same way.
    #[error("Wrong passphrase or corrupted vault file")]
    WrongPassphraseOrCorrupt,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault file errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Vault at {0} is already open in another session")]
    VaultLocked(PathBuf),

    // --- Entry errors ---
    #[error("Entry '{name}' already exists in category '{category}' with the same password")]
    DuplicateEntry { name: String, category: String },

    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("No entry named '{0}'")]
    NotFound(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    // --- Keyfile errors ---
    #[error("Keyfile error: {0}")]
    KeyfileError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for Lockbox results.
pub type Result<T> = std::result::Result<T, LockboxError>;
