//! `RecordStore`: the only component that reads or writes a vault file.
//!
//! `open` turns a file plus passphrase into a decrypted `Vault`; `save`
//! re-encrypts every entry and replaces the file atomically.  The
//! passphrase (and keyfile) are supplied on each call and never stored;
//! derived keys live only for the duration of that call.

use std::fs;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto::encryption::Cipher;
use crate::crypto::kdf::{derive_master_key_with_params, generate_salt, Argon2Params};
use crate::crypto::keyfile;
use crate::crypto::keys::MasterKey;
use crate::errors::{LockboxError, Result};

use super::collection::Vault;
use super::entry::Entry;
use super::format::{self, VaultHeader};
use super::lock::VaultLock;

/// Handle on one vault file for the length of a session.
///
/// Holding a `RecordStore` holds the vault's advisory lock, except for a
/// new vault whose directory does not exist yet; that lock is taken by the
/// first `save`.
pub struct RecordStore {
    /// Path to the `.lockbox` file on disk.
    path: PathBuf,

    /// KDF params used if this store writes a brand-new file.
    new_params: Argon2Params,

    state: FileState,

    lock: Option<VaultLock>,
}

/// What the store knows about the file on disk.
enum FileState {
    /// No file yet; nothing is written and no salt exists until `save`.
    New,
    /// The last header and check block read from or written to disk.
    Existing {
        header: VaultHeader,
        header_bytes: Vec<u8>,
        check_block: Vec<u8>,
    },
}

impl RecordStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the vault at `path` with the default Argon2 params for new files.
    ///
    /// See `open_with_params`.
    pub fn open(path: &Path, passphrase: &[u8], keyfile_bytes: Option<&[u8]>) -> Result<(Self, Vault)> {
        Self::open_with_params(path, passphrase, keyfile_bytes, &Argon2Params::default())
    }

    /// Open the vault at `path`.
    ///
    /// - If the file does not exist, returns an empty vault and a store
    ///   marked new.  `params` are used when it is first saved.
    /// - Otherwise reads the file, derives the key with the params stored
    ///   in its header, verifies the check block, and decrypts every
    ///   record.  Any authentication failure aborts the whole load with
    ///   `WrongPassphraseOrCorrupt`.
    pub fn open_with_params(
        path: &Path,
        passphrase: &[u8],
        keyfile_bytes: Option<&[u8]>,
        params: &Argon2Params,
    ) -> Result<(Self, Vault)> {
        params.validate()?;

        if !crate::fs::parent_dir(path).is_dir() {
            tracing::debug!(path = %path.display(), "vault directory missing, starting empty");
            let store = Self {
                path: path.to_path_buf(),
                new_params: *params,
                state: FileState::New,
                lock: None,
            };
            return Ok((store, Vault::new()));
        }
        let lock = VaultLock::acquire(path)?;

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no vault file yet, starting empty");
            let store = Self {
                path: path.to_path_buf(),
                new_params: *params,
                state: FileState::New,
                lock: Some(lock),
            };
            return Ok((store, Vault::new()));
        }

        let raw = format::read_vault(path)?;
        let cipher = unlock(&raw.header, passphrase, keyfile_bytes)?;
        verify_check_block(cipher.as_ref(), &raw.header_bytes, &raw.check_block)?;

        let mut entries = Vec::with_capacity(raw.records.len());
        for (index, block) in (0u32..).zip(&raw.records) {
            let plaintext = Zeroizing::new(
                cipher.decrypt(block, &format::record_aad(&raw.header_bytes, index))?,
            );
            entries.push(Entry::decode(&plaintext)?);
        }

        tracing::debug!(
            path = %path.display(),
            records = entries.len(),
            "vault loaded"
        );

        let store = Self {
            path: path.to_path_buf(),
            new_params: *params,
            state: FileState::Existing {
                header: raw.header,
                header_bytes: raw.header_bytes,
                check_block: raw.check_block,
            },
            lock: Some(lock),
        };
        Ok((store, Vault::from_entries(entries)))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encrypt every entry of `vault` and atomically replace the file.
    ///
    /// For a new store this generates the salt and writes the first
    /// header.  For an existing file the passphrase must match the one
    /// the file was written with; a mismatch fails with
    /// `WrongPassphraseOrCorrupt` and leaves the file untouched.
    pub fn save(&mut self, passphrase: &[u8], keyfile_bytes: Option<&[u8]>, vault: &Vault) -> Result<()> {
        let record_count = u32::try_from(vault.len()).map_err(|_| {
            LockboxError::InvalidEntry(format!("{} entries exceed the file limit", vault.len()))
        })?;

        let (mut header, cipher) = match &self.state {
            FileState::New => {
                let fingerprint = keyfile_bytes.map(keyfile::fingerprint);
                let header = VaultHeader::new(generate_salt(), self.new_params, fingerprint);
                let cipher = unlock(&header, passphrase, keyfile_bytes)?;
                (header, cipher)
            }
            FileState::Existing {
                header,
                header_bytes,
                check_block,
            } => {
                let cipher = unlock(header, passphrase, keyfile_bytes)?;
                verify_check_block(cipher.as_ref(), header_bytes, check_block)?;
                (header.clone(), cipher)
            }
        };
        header.record_count = record_count;

        if self.lock.is_none() {
            self.lock = Some(self.lock_new_file()?);
        }

        let header_bytes = header.to_bytes();
        let check_block = cipher.encrypt(&[], &format::check_aad(&header_bytes))?;

        let mut records = Vec::with_capacity(vault.len());
        for (index, entry) in (0u32..).zip(vault.iter()) {
            let plaintext = entry.encode()?;
            records.push(cipher.encrypt(&plaintext, &format::record_aad(&header_bytes, index))?);
        }

        let bytes = format::encode_vault(&header_bytes, &check_block, &records)?;
        crate::fs::write_atomic(&self.path, &bytes)?;

        tracing::debug!(
            path = %self.path.display(),
            records = record_count,
            bytes = bytes.len(),
            "vault saved"
        );

        self.state = FileState::Existing {
            header,
            header_bytes,
            check_block,
        };
        Ok(())
    }

    /// Create the vault's directory and take the lock that `open` could
    /// not.  Fails if another session wrote the file in the meantime.
    fn lock_new_file(&self) -> Result<VaultLock> {
        fs::create_dir_all(crate::fs::parent_dir(&self.path))?;
        let lock = VaultLock::acquire(&self.path)?;
        if self.path.exists() {
            return Err(LockboxError::VaultAlreadyExists(self.path.clone()));
        }
        Ok(lock)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` until the first successful `save` of a vault that did not
    /// exist when opened.
    pub fn is_new(&self) -> bool {
        matches!(self.state, FileState::New)
    }

    /// The header of the file on disk, if there is one.
    pub fn header(&self) -> Option<&VaultHeader> {
        match &self.state {
            FileState::New => None,
            FileState::Existing { header, .. } => Some(header),
        }
    }

    /// Whether opening or saving this vault needs a keyfile.
    pub fn requires_keyfile(&self) -> bool {
        self.header()
            .is_some_and(|h| h.keyfile_fingerprint.is_some())
    }
}

/// Derive the record cipher for `header` from the passphrase and keyfile.
fn unlock(
    header: &VaultHeader,
    passphrase: &[u8],
    keyfile_bytes: Option<&[u8]>,
) -> Result<Box<dyn Cipher>> {
    let effective = match (&header.keyfile_fingerprint, keyfile_bytes) {
        (Some(expected), Some(kf)) => {
            keyfile::verify_fingerprint(kf, expected)?;
            keyfile::combine_passphrase_keyfile(passphrase, kf)?
        }
        (Some(_), None) => {
            return Err(LockboxError::KeyfileError(
                "this vault requires a keyfile, use --keyfile <path>".into(),
            ))
        }
        (None, Some(_)) => {
            return Err(LockboxError::KeyfileError(
                "this vault was not created with a keyfile".into(),
            ))
        }
        (None, None) => Zeroizing::new(passphrase.to_vec()),
    };

    let master = MasterKey::new(derive_master_key_with_params(
        &effective,
        &header.salt,
        &header.argon2_params,
    )?);
    let record_key = master.derive_record_key()?;
    header.cipher.build(record_key.as_bytes())
}

fn verify_check_block(cipher: &dyn Cipher, header_bytes: &[u8], check_block: &[u8]) -> Result<()> {
    let plaintext = cipher.decrypt(check_block, &format::check_aad(header_bytes))?;
    if plaintext.is_empty() {
        Ok(())
    } else {
        Err(LockboxError::WrongPassphraseOrCorrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn open_missing_file_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        let path = nested.join("passwords.lockbox");

        let (store, vault) = RecordStore::open_with_params(&path, b"pw", None, &fast()).unwrap();
        assert!(store.is_new());
        assert!(store.header().is_none());
        assert!(vault.is_empty());
        assert!(!path.exists());
        assert!(!nested.exists());
    }

    #[test]
    fn first_save_creates_directory_and_takes_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("passwords.lockbox");

        let (mut store, vault) =
            RecordStore::open_with_params(&path, b"pw", None, &fast()).unwrap();
        store.save(b"pw", None, &vault).unwrap();
        assert!(path.exists());

        assert!(matches!(
            RecordStore::open_with_params(&path, b"pw", None, &fast()),
            Err(LockboxError::VaultLocked(_))
        ));
    }

    #[test]
    fn first_save_refuses_a_file_created_meanwhile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("passwords.lockbox");

        let (mut first, vault) =
            RecordStore::open_with_params(&path, b"pw", None, &fast()).unwrap();
        let (mut second, _) =
            RecordStore::open_with_params(&path, b"pw", None, &fast()).unwrap();
        second.save(b"pw", None, &vault).unwrap();
        drop(second);

        assert!(matches!(
            first.save(b"pw", None, &vault),
            Err(LockboxError::VaultAlreadyExists(_))
        ));
    }

    #[test]
    fn first_save_fixes_salt_and_params() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passwords.lockbox");

        let (mut store, mut vault) =
            RecordStore::open_with_params(&path, b"pw", None, &fast()).unwrap();
        vault.add_entry(Entry::new("gmail", "s3cret", "mail")).unwrap();
        store.save(b"pw", None, &vault).unwrap();

        assert!(!store.is_new());
        let salt = store.header().unwrap().salt;
        assert_eq!(store.header().unwrap().argon2_params, fast());
        assert_eq!(store.header().unwrap().record_count, 1);

        store.save(b"pw", None, &vault).unwrap();
        assert_eq!(store.header().unwrap().salt, salt);
    }

    #[test]
    fn rejects_weak_params_before_touching_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passwords.lockbox");
        let weak = Argon2Params {
            memory_kib: 64,
            ..fast()
        };

        assert!(RecordStore::open_with_params(&path, b"pw", None, &weak).is_err());
        assert!(!crate::vault::lock::lock_path(&path).exists());
    }
}
