//! Authenticated encryption behind a pluggable `Cipher` boundary.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting and verifying the tag.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! Callers may bind associated data (AAD) to a payload; the same AAD must
//! be supplied on decryption or authentication fails.

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{LockboxError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// An authenticated symmetric cipher bound to one key.
///
/// Implementations must generate a fresh nonce per `encrypt` call, return
/// it prefixed to the ciphertext, and fail `decrypt` with
/// `WrongPassphraseOrCorrupt` on any tampering.
pub trait Cipher {
    /// The identifier written to the vault header for this cipher.
    fn suite(&self) -> CipherSuite;

    /// Encrypt and authenticate `plaintext`, binding `aad`.
    fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;

    /// Verify and decrypt a blob produced by `encrypt`.
    fn decrypt(&self, nonce_and_ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>>;
}

/// Cipher suites a vault file can name in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherSuite {
    Aes256Gcm,
}

impl CipherSuite {
    /// Header byte for this suite.
    pub fn id(self) -> u8 {
        match self {
            CipherSuite::Aes256Gcm => 1,
        }
    }

    /// Look up a suite by its header byte.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(CipherSuite::Aes256Gcm),
            _ => None,
        }
    }

    /// Build a cipher for this suite from raw key bytes.
    pub fn build(self, key: &[u8]) -> Result<Box<dyn Cipher>> {
        match self {
            CipherSuite::Aes256Gcm => Ok(Box::new(Aes256GcmCipher::new(key)?)),
        }
    }
}

/// AES-256-GCM with random 96-bit nonces.
pub struct Aes256GcmCipher {
    inner: Aes256Gcm,
}

impl Aes256GcmCipher {
    /// Build the cipher from a 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self> {
        let inner = Aes256Gcm::new_from_slice(key)
            .map_err(|e| LockboxError::EncryptionFailed(format!("invalid key length: {e}")))?;
        Ok(Self { inner })
    }
}

impl Cipher for Aes256GcmCipher {
    fn suite(&self) -> CipherSuite {
        CipherSuite::Aes256Gcm
    }

    fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        // OsRng panics if the OS cannot supply randomness; there is no
        // safe way to continue without a fresh nonce.
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .inner
            .encrypt(&nonce, Payload { msg: plaintext, aad })
            .map_err(|e| LockboxError::EncryptionFailed(format!("encryption error: {e}")))?;

        let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    fn decrypt(&self, nonce_and_ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if nonce_and_ciphertext.len() < NONCE_LEN + TAG_LEN {
            return Err(LockboxError::WrongPassphraseOrCorrupt);
        }

        let (nonce_bytes, ciphertext) = nonce_and_ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.inner
            .decrypt(nonce, Payload { msg: ciphertext, aad })
            .map_err(|_| LockboxError::WrongPassphraseOrCorrupt)
    }
}

/// Encrypt `plaintext` with a 32-byte `key` and no associated data.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    Aes256GcmCipher::new(key)?.encrypt(plaintext, &[])
}

/// Decrypt data that was produced by `encrypt`.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    let cipher =
        Aes256GcmCipher::new(key).map_err(|_| LockboxError::WrongPassphraseOrCorrupt)?;
    cipher.decrypt(ciphertext_with_nonce, &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aad_mismatch_fails() {
        let cipher = Aes256GcmCipher::new(&[0x42u8; 32]).unwrap();
        let blob = cipher.encrypt(b"secret", b"record:0").unwrap();

        assert_eq!(cipher.decrypt(&blob, b"record:0").unwrap(), b"secret");
        assert!(matches!(
            cipher.decrypt(&blob, b"record:1"),
            Err(LockboxError::WrongPassphraseOrCorrupt)
        ));
    }

    #[test]
    fn suite_ids_roundtrip() {
        let suite = CipherSuite::Aes256Gcm;
        assert_eq!(CipherSuite::from_id(suite.id()), Some(suite));
        assert_eq!(CipherSuite::from_id(0), None);
        assert_eq!(CipherSuite::from_id(99), None);
    }

    #[test]
    fn built_cipher_reports_its_suite() {
        let cipher = CipherSuite::Aes256Gcm.build(&[7u8; 32]).unwrap();
        assert_eq!(cipher.suite(), CipherSuite::Aes256Gcm);
    }

    #[test]
    fn empty_plaintext_still_authenticates() {
        let cipher = Aes256GcmCipher::new(&[1u8; 32]).unwrap();
        let blob = cipher.encrypt(b"", b"check").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + TAG_LEN);

        let other = Aes256GcmCipher::new(&[2u8; 32]).unwrap();
        assert!(other.decrypt(&blob, b"check").is_err());
    }

    #[test]
    fn rejects_short_key() {
        assert!(Aes256GcmCipher::new(&[0u8; 16]).is_err());
    }
}
