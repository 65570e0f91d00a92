//! Sub-key derivation using HKDF-SHA256.
//!
//! The Argon2id output is never used directly as a cipher key.  Instead
//! HKDF (RFC 5869) expands it with a context string (`info`) so every
//! purpose gets an independent key.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{LockboxError, Result};

/// Length of derived sub-keys (256 bits).
const KEY_LEN: usize = 32;

/// HKDF context for the key that encrypts vault records.
const RECORD_KEY_INFO: &[u8] = b"lockbox-record-key";

/// Derive the record-encryption key from the master key.
pub fn derive_record_key(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, RECORD_KEY_INFO)
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The extract step uses no salt: the master key already came out of
/// Argon2id with a per-vault salt.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| LockboxError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Wrap raw key bytes, zeroing the caller's copy.
    pub fn new(mut bytes: [u8; KEY_LEN]) -> Self {
        let key = Self { bytes };
        bytes.zeroize();
        key
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the record-encryption key from this master key.
    pub fn derive_record_key(&self) -> Result<MasterKey> {
        derive_record_key(&self.bytes).map(MasterKey::new)
    }
}
