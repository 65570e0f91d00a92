//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{LockboxError, Result};
use crate::vault::{RecordStore, SortField, Vault};

/// Minimum passphrase length for new vaults.
const MIN_PASSPHRASE_LEN: usize = 8;

/// Environment variable checked for the passphrase before prompting.
pub const PASSPHRASE_ENV: &str = "LOCKBOX_PASSPHRASE";

/// Lockbox CLI: encrypted local password store.
#[derive(Parser)]
#[command(name = "lockbox", about = "Encrypted local password store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file (default: `vault_file` from .lockbox.toml)
    #[arg(long, env = "LOCKBOX_VAULT", global = true)]
    pub vault: Option<PathBuf>,

    /// Path to a keyfile for two-factor vault access
    #[arg(long, global = true)]
    pub keyfile: Option<PathBuf>,

    /// Show secret values in listings
    #[arg(long, global = true)]
    pub reveal: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault file
    Init,

    /// List every entry, grouped by category
    List,

    /// Find entries whose name, category, site, or login contain a term
    Search {
        /// Case-sensitive substring to look for
        term: String,
    },

    /// List entries ordered by a field (the vault itself is not reordered)
    Sort {
        /// Field to order by
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        by: SortArg,
    },

    /// Add an entry
    Add {
        /// Entry name (e.g. gmail)
        name: String,
        /// Category the entry belongs to
        #[arg(short, long, default_value = "")]
        category: String,
        /// Website the secret is for
        #[arg(long)]
        site: Option<String>,
        /// Login or username
        #[arg(long)]
        login: Option<String>,
        /// Secret value (omit for stdin or interactive prompt)
        secret: Option<String>,
    },

    /// Print an entry's secret
    Show {
        /// Entry name
        name: String,
        /// Copy the secret to the clipboard instead of printing it
        #[arg(long)]
        copy: bool,
    },

    /// Replace the secret of the first entry with this name
    Edit {
        /// Entry name
        name: String,
        /// New secret value (omit for stdin or interactive prompt)
        secret: Option<String>,
    },

    /// Delete every entry with this name
    Delete {
        /// Entry name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Manage categories (add, delete, list)
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Interactive menu session over one unlocked vault
    Shell,

    /// Generate a new random keyfile
    KeyfileGenerate {
        /// Path for the keyfile (default: lockbox.keyfile next to the vault)
        path: Option<PathBuf>,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Category subcommands.
#[derive(clap::Subcommand)]
pub enum CategoryAction {
    /// Create an empty category
    Add {
        /// Category name
        name: String,
    },

    /// Delete a category and every entry in it
    Delete {
        /// Category name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List categories and how many entries each holds
    List,
}

/// Sort fields accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SortArg {
    Name,
    Category,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortField::Name,
            SortArg::Category => SortField::Category,
        }
    }
}

// ---------------------------------------------------------------------------
// Session: one unlocked vault for the length of a command
// ---------------------------------------------------------------------------

/// An open vault together with the credentials needed to save it.
///
/// The passphrase and keyfile are wiped when the session is dropped, and
/// the vault lock is released with the store.
pub struct Session {
    pub store: RecordStore,
    pub vault: Vault,
    passphrase: Zeroizing<String>,
    keyfile: Option<Zeroizing<Vec<u8>>>,
}

impl Session {
    /// Resolve the vault path, ask for the passphrase, and open the vault.
    ///
    /// A vault file that does not exist yet opens empty; its passphrase is
    /// asked for with confirmation since it will be fixed on first save.
    pub fn open(cli: &Cli) -> Result<Self> {
        let settings = load_settings()?;
        let path = vault_path(cli, &settings)?;
        Self::open_at(cli, &settings, &path)
    }

    /// Like `open`, but fails with `VaultNotFound` instead of starting a
    /// new vault.  Used by commands that only make sense on existing data.
    pub fn open_existing(cli: &Cli) -> Result<Self> {
        let settings = load_settings()?;
        let path = vault_path(cli, &settings)?;
        if !path.exists() {
            output::tip("Run `lockbox init` to create a vault.");
            return Err(LockboxError::VaultNotFound(path));
        }
        Self::open_at(cli, &settings, &path)
    }

    /// Same as `open`, for an already resolved path.
    pub fn open_at(cli: &Cli, settings: &Settings, path: &Path) -> Result<Self> {
        let keyfile = load_keyfile(cli)?;
        let passphrase = if path.exists() {
            prompt_passphrase()?
        } else {
            prompt_new_passphrase()?
        };

        Self::with_credentials(path, passphrase, keyfile, settings)
    }

    /// Open `path` with credentials that are already in hand.
    pub fn with_credentials(
        path: &Path,
        passphrase: Zeroizing<String>,
        keyfile: Option<Zeroizing<Vec<u8>>>,
        settings: &Settings,
    ) -> Result<Self> {
        let (store, vault) = RecordStore::open_with_params(
            path,
            passphrase.as_bytes(),
            keyfile.as_ref().map(|k| k.as_slice()),
            &settings.argon2_params(),
        )?;

        Ok(Self {
            store,
            vault,
            passphrase,
            keyfile,
        })
    }

    /// Encrypt and atomically write the vault back to disk.
    pub fn save(&mut self) -> Result<()> {
        self.store.save(
            self.passphrase.as_bytes(),
            self.keyfile.as_ref().map(|k| k.as_slice()),
            &self.vault,
        )
    }

    /// Path of the vault file.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Record an operation in the audit log for this vault.
    pub fn audit(&self, op: &str, entry_name: Option<&str>, details: Option<&str>) {
        crate::audit::log_audit(self.path(), op, entry_name, details);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.lockbox.toml` from the working directory.
pub fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// Whether listings should show secret values.
pub fn reveal_secrets(cli: &Cli, settings: &Settings) -> bool {
    cli.reveal || settings.reveal_secrets
}

/// Get the passphrase for an existing vault, trying in order:
/// 1. `LOCKBOX_PASSPHRASE` env var (scripts, tests)
/// 2. Interactive hidden prompt
pub fn prompt_passphrase() -> Result<Zeroizing<String>> {
    if let Some(pw) = passphrase_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault passphrase")
        .interact()
        .map_err(|e| LockboxError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new passphrase with confirmation.
///
/// Also respects `LOCKBOX_PASSPHRASE`.  Enforces a minimum length.
pub fn prompt_new_passphrase() -> Result<Zeroizing<String>> {
    if let Some(pw) = passphrase_from_env() {
        if pw.len() < MIN_PASSPHRASE_LEN {
            return Err(LockboxError::CommandFailed(format!(
                "passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let pw = dialoguer::Password::new()
            .with_prompt("Choose vault passphrase")
            .with_confirmation(
                "Confirm vault passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map_err(|e| LockboxError::CommandFailed(format!("passphrase prompt: {e}")))?;

        if pw.len() < MIN_PASSPHRASE_LEN {
            output::warning(&format!(
                "Passphrase must be at least {MIN_PASSPHRASE_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(pw));
    }
}

fn passphrase_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSPHRASE_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Resolve the vault file: `--vault` / `LOCKBOX_VAULT`, else the config.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &cli.vault {
        Some(path) => cwd.join(path),
        None => settings.vault_path(&cwd),
    })
}

/// Load the keyfile bytes from `--keyfile`, if given.
pub fn load_keyfile(cli: &Cli) -> Result<Option<Zeroizing<Vec<u8>>>> {
    match &cli.keyfile {
        Some(path) => Ok(Some(crate::crypto::keyfile::load_keyfile(path)?)),
        None => Ok(None),
    }
}

/// Read a secret from, in order: the argument, piped stdin, or a hidden
/// prompt.
pub fn read_secret(value: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    use std::io::{self, IsTerminal, Read};

    if let Some(v) = value {
        output::warning("Secret provided on command line, it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']);
        return Ok(Zeroizing::new(trimmed.to_string()));
    }

    let secret = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| LockboxError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| LockboxError::CommandFailed(format!("confirm prompt: {e}")))
}
