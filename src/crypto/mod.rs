//! Cryptographic primitives for Lockbox.
//!
//! This module provides:
//! - The `Cipher` boundary and AES-256-GCM implementation (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - HKDF sub-key derivation and the zeroizing `MasterKey` (`keys`)
//! - Optional keyfile second factor (`keyfile`)

pub mod encryption;
pub mod kdf;
pub mod keyfile;
pub mod keys;

pub use encryption::{decrypt, encrypt, Aes256GcmCipher, Cipher, CipherSuite};
pub use kdf::{derive_master_key, derive_master_key_with_params, generate_salt, Argon2Params};
pub use keyfile::{combine_passphrase_keyfile, generate_keyfile, load_keyfile};
pub use keys::{derive_record_key, MasterKey};
