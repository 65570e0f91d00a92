//! Keyfile second factor.
//!
//! A keyfile is a 32-byte random file.  When a vault is created with a
//! keyfile, both the passphrase and the keyfile are required to derive
//! the master key.
//!
//! The combination is: `HMAC-SHA256(keyfile_bytes, passphrase_bytes)`.
//! This combined value is then fed into Argon2id as the "password".

use std::fs;
use std::path::Path;

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::errors::{LockboxError, Result};

/// Expected length of a keyfile in bytes (256 bits).
pub const KEYFILE_LEN: usize = 32;

/// Length of the keyfile fingerprint stored in the vault header.
pub const FINGERPRINT_LEN: usize = 32;

/// Generate a new random keyfile and write it to `path`.
///
/// The file is written with owner-only permissions on Unix.
pub fn generate_keyfile(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    if path.exists() {
        return Err(LockboxError::KeyfileError(format!(
            "keyfile already exists at {}",
            path.display()
        )));
    }

    let mut keyfile = Zeroizing::new(vec![0u8; KEYFILE_LEN]);
    rand::rng().fill_bytes(keyfile.as_mut_slice());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                LockboxError::KeyfileError(format!("cannot create keyfile directory: {e}"))
            })?;
        }
    }

    fs::write(path, keyfile.as_slice())
        .map_err(|e| LockboxError::KeyfileError(format!("failed to write keyfile: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).map_err(|e| {
            LockboxError::KeyfileError(format!("failed to set keyfile permissions: {e}"))
        })?;
    }

    Ok(keyfile)
}

/// Load a keyfile from disk and validate its length.
pub fn load_keyfile(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    if !path.exists() {
        return Err(LockboxError::KeyfileError(format!(
            "keyfile not found at {}",
            path.display()
        )));
    }

    let data = Zeroizing::new(
        fs::read(path)
            .map_err(|e| LockboxError::KeyfileError(format!("failed to read keyfile: {e}")))?,
    );

    if data.len() != KEYFILE_LEN {
        return Err(LockboxError::KeyfileError(format!(
            "keyfile must be exactly {} bytes, got {}",
            KEYFILE_LEN,
            data.len()
        )));
    }

    Ok(data)
}

/// Combine a passphrase and keyfile into a single effective passphrase.
pub fn combine_passphrase_keyfile(
    passphrase: &[u8],
    keyfile_bytes: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(keyfile_bytes)
        .map_err(|e| LockboxError::KeyfileError(format!("HMAC init failed: {e}")))?;

    mac.update(passphrase);

    Ok(Zeroizing::new(mac.finalize().into_bytes().to_vec()))
}

/// SHA-256 fingerprint of a keyfile, stored in the vault header so the
/// wrong keyfile is reported as such instead of as a bad passphrase.
pub fn fingerprint(keyfile_bytes: &[u8]) -> [u8; FINGERPRINT_LEN] {
    let mut out = [0u8; FINGERPRINT_LEN];
    out.copy_from_slice(&Sha256::digest(keyfile_bytes));
    out
}

/// Verify that a keyfile matches the fingerprint stored in the header.
pub fn verify_fingerprint(keyfile_bytes: &[u8], expected: &[u8; FINGERPRINT_LEN]) -> Result<()> {
    let actual = fingerprint(keyfile_bytes);

    if actual[..].ct_eq(&expected[..]).into() {
        Ok(())
    } else {
        Err(LockboxError::KeyfileError(
            "wrong keyfile: fingerprint does not match the vault".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generate_and_load_keyfile_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.keyfile");

        let generated = generate_keyfile(&path).unwrap();
        assert_eq!(generated.len(), KEYFILE_LEN);

        let loaded = load_keyfile(&path).unwrap();
        assert_eq!(*generated, *loaded);
    }

    #[test]
    fn generate_keyfile_fails_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.keyfile");

        generate_keyfile(&path).unwrap();
        assert!(generate_keyfile(&path).is_err());
    }

    #[test]
    fn load_keyfile_fails_if_missing() {
        let dir = TempDir::new().unwrap();
        assert!(load_keyfile(&dir.path().join("nonexistent.keyfile")).is_err());
    }

    #[test]
    fn load_keyfile_fails_on_wrong_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.keyfile");
        fs::write(&path, [0u8; 16]).unwrap();

        assert!(load_keyfile(&path).is_err());
    }

    #[test]
    fn combine_is_deterministic_and_keyed() {
        let keyfile1 = [0xABu8; 32];
        let keyfile2 = [0xCDu8; 32];

        let a = combine_passphrase_keyfile(b"pw", &keyfile1).unwrap();
        let b = combine_passphrase_keyfile(b"pw", &keyfile1).unwrap();
        let c = combine_passphrase_keyfile(b"pw", &keyfile2).unwrap();
        let d = combine_passphrase_keyfile(b"other", &keyfile1).unwrap();

        assert_eq!(*a, *b);
        assert_ne!(*a, *c);
        assert_ne!(*a, *d);
    }

    #[test]
    fn verify_fingerprint_accepts_only_matching_keyfile() {
        let keyfile = [0x42u8; 32];
        let print = fingerprint(&keyfile);

        assert!(verify_fingerprint(&keyfile, &print).is_ok());
        assert!(verify_fingerprint(&[0x43u8; 32], &print).is_err());
    }
}
