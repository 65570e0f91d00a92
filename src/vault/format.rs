//! Binary vault file format.
//!
//! A `.lockbox` file has this layout (all integers little-endian):
//!
//! ```text
//! [LKBX: 4][version: 1][cipher id: 1]
//! [argon2 memory_kib: 4][argon2 iterations: 4][argon2 parallelism: 4]
//! [salt: 32][keyfile flag: 1][keyfile sha256: 32, only if flag = 1]
//! [record count: 4]
//! [check block]
//! [record block] x record count
//! ```
//!
//! Every block is `[nonce: 12][ciphertext_len: 4][ciphertext + tag]`.
//! The check block encrypts the empty string; it lets the passphrase be
//! verified even when the vault holds no entries.
//!
//! Each block's associated data starts with the exact header bytes, so
//! any edit to the header (salt, params, record count) fails
//! authentication.  Record blocks also bind their index, which catches
//! reordered, dropped, or duplicated records.

use std::fs;
use std::path::Path;

use crate::crypto::encryption::{CipherSuite, NONCE_LEN, TAG_LEN};
use crate::crypto::kdf::{Argon2Params, SALT_LEN};
use crate::crypto::keyfile::FINGERPRINT_LEN;
use crate::errors::{LockboxError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"LKBX";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Domain tags appended to the header bytes in associated data.
const CHECK_AAD_TAG: &[u8] = b"lockbox-check";
const RECORD_AAD_TAG: &[u8] = b"lockbox-record";

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Metadata stored at the beginning of a vault file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultHeader {
    /// Format version.
    pub version: u8,

    /// Cipher used for every block in the file.
    pub cipher: CipherSuite,

    /// Argon2 params used at vault creation.
    pub argon2_params: Argon2Params,

    /// Salt for Argon2id, generated once when the file is first written.
    pub salt: [u8; SALT_LEN],

    /// SHA-256 of the keyfile, if the vault was created with one.
    pub keyfile_fingerprint: Option<[u8; FINGERPRINT_LEN]>,

    /// Number of record blocks following the check block.
    pub record_count: u32,
}

impl VaultHeader {
    /// Header for a vault file that is about to be written for the first time.
    pub fn new(
        salt: [u8; SALT_LEN],
        argon2_params: Argon2Params,
        keyfile_fingerprint: Option<[u8; FINGERPRINT_LEN]>,
    ) -> Self {
        Self {
            version: CURRENT_VERSION,
            cipher: CipherSuite::Aes256Gcm,
            argon2_params,
            salt,
            keyfile_fingerprint,
            record_count: 0,
        }
    }

    /// Serialize the header exactly as it appears on disk.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + 2 + 12 + SALT_LEN + 1 + FINGERPRINT_LEN + 4);
        buf.extend_from_slice(MAGIC);
        buf.push(self.version);
        buf.push(self.cipher.id());
        buf.extend_from_slice(&self.argon2_params.memory_kib.to_le_bytes());
        buf.extend_from_slice(&self.argon2_params.iterations.to_le_bytes());
        buf.extend_from_slice(&self.argon2_params.parallelism.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        match &self.keyfile_fingerprint {
            Some(fp) => {
                buf.push(1);
                buf.extend_from_slice(fp);
            }
            None => buf.push(0),
        }
        buf.extend_from_slice(&self.record_count.to_le_bytes());
        buf
    }

    fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let magic = reader.take(MAGIC.len()).ok_or_else(short_header)?;
        if magic != MAGIC {
            return Err(LockboxError::InvalidVaultFormat(
                "missing LKBX magic bytes".into(),
            ));
        }

        let version = reader.u8().ok_or_else(short_header)?;
        if version != CURRENT_VERSION {
            return Err(LockboxError::InvalidVaultFormat(format!(
                "unsupported version {version}, expected {CURRENT_VERSION}"
            )));
        }

        let cipher_id = reader.u8().ok_or_else(short_header)?;
        let cipher = CipherSuite::from_id(cipher_id).ok_or_else(|| {
            LockboxError::InvalidVaultFormat(format!("unknown cipher id {cipher_id}"))
        })?;

        let argon2_params = Argon2Params {
            memory_kib: reader.u32().ok_or_else(short_header)?,
            iterations: reader.u32().ok_or_else(short_header)?,
            parallelism: reader.u32().ok_or_else(short_header)?,
        };
        // Stored params run before anything is authenticated.
        argon2_params.validate().map_err(|_| {
            LockboxError::InvalidVaultFormat(format!(
                "stored Argon2 params are out of range ({} KiB, {} iterations, {} lanes)",
                argon2_params.memory_kib, argon2_params.iterations, argon2_params.parallelism
            ))
        })?;

        let salt = reader.array::<SALT_LEN>().ok_or_else(short_header)?;

        let keyfile_fingerprint = match reader.u8().ok_or_else(short_header)? {
            0 => None,
            1 => Some(reader.array::<FINGERPRINT_LEN>().ok_or_else(short_header)?),
            other => {
                return Err(LockboxError::InvalidVaultFormat(format!(
                    "invalid keyfile flag {other}"
                )))
            }
        };

        let record_count = reader.u32().ok_or_else(short_header)?;

        Ok(Self {
            version,
            cipher,
            argon2_params,
            salt,
            keyfile_fingerprint,
            record_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Encoding / decoding
// ---------------------------------------------------------------------------

/// A vault file split into its parts, with the header bytes kept exactly
/// as read so associated data can be rebuilt without re-serializing.
#[derive(Debug, Clone)]
pub struct RawVault {
    pub header: VaultHeader,
    pub header_bytes: Vec<u8>,
    /// Check block as `nonce || ciphertext`.
    pub check_block: Vec<u8>,
    /// Record blocks as `nonce || ciphertext`, in file order.
    pub records: Vec<Vec<u8>>,
}

/// Assemble a complete vault file.
///
/// `check_block` and `records` are `nonce || ciphertext` blobs as
/// returned by `Cipher::encrypt`.
pub fn encode_vault(header_bytes: &[u8], check_block: &[u8], records: &[Vec<u8>]) -> Result<Vec<u8>> {
    let blocks_len: usize = records.iter().map(|r| r.len() + 4).sum();
    let mut buf = Vec::with_capacity(header_bytes.len() + check_block.len() + 4 + blocks_len);

    buf.extend_from_slice(header_bytes);
    write_block(&mut buf, check_block)?;
    for record in records {
        write_block(&mut buf, record)?;
    }
    Ok(buf)
}

/// Split a vault file into header, check block, and record blocks.
///
/// Header problems (bad magic, unknown version or cipher) are reported
/// as `InvalidVaultFormat`.  Anything wrong in the block region is
/// reported as `WrongPassphraseOrCorrupt`, the same as a failed tag.
pub fn decode_vault(data: &[u8]) -> Result<RawVault> {
    let mut reader = ByteReader::new(data);
    let header = VaultHeader::parse(&mut reader)?;
    let header_bytes = data[..reader.position()].to_vec();

    let check_block = read_block(&mut reader)?;

    let mut records = Vec::new();
    for _ in 0..header.record_count {
        records.push(read_block(&mut reader)?);
    }

    if !reader.is_empty() {
        return Err(LockboxError::WrongPassphraseOrCorrupt);
    }

    Ok(RawVault {
        header,
        header_bytes,
        check_block,
        records,
    })
}

/// Read and decode a vault file from disk.
pub fn read_vault(path: &Path) -> Result<RawVault> {
    let data = fs::read(path)?;
    decode_vault(&data)
}

/// Associated data for the check block.
pub fn check_aad(header_bytes: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(header_bytes.len() + CHECK_AAD_TAG.len());
    aad.extend_from_slice(header_bytes);
    aad.extend_from_slice(CHECK_AAD_TAG);
    aad
}

/// Associated data for the record block at `index`.
pub fn record_aad(header_bytes: &[u8], index: u32) -> Vec<u8> {
    let mut aad = Vec::with_capacity(header_bytes.len() + RECORD_AAD_TAG.len() + 4);
    aad.extend_from_slice(header_bytes);
    aad.extend_from_slice(RECORD_AAD_TAG);
    aad.extend_from_slice(&index.to_le_bytes());
    aad
}

fn write_block(buf: &mut Vec<u8>, nonce_and_ciphertext: &[u8]) -> Result<()> {
    if nonce_and_ciphertext.len() < NONCE_LEN + TAG_LEN {
        return Err(LockboxError::EncryptionFailed(
            "cipher output is shorter than nonce and tag".into(),
        ));
    }
    let (nonce, ciphertext) = nonce_and_ciphertext.split_at(NONCE_LEN);
    let len = u32::try_from(ciphertext.len()).map_err(|_| {
        LockboxError::EncryptionFailed(format!(
            "record of {} bytes exceeds u32::MAX",
            ciphertext.len()
        ))
    })?;

    buf.extend_from_slice(nonce);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(ciphertext);
    Ok(())
}

fn read_block(reader: &mut ByteReader<'_>) -> Result<Vec<u8>> {
    let corrupt = || LockboxError::WrongPassphraseOrCorrupt;

    let nonce = reader.take(NONCE_LEN).ok_or_else(corrupt)?;
    let len = reader.u32().ok_or_else(corrupt)? as usize;
    if len < TAG_LEN {
        return Err(corrupt());
    }
    let ciphertext = reader.take(len).ok_or_else(corrupt)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + len);
    blob.extend_from_slice(nonce);
    blob.extend_from_slice(ciphertext);
    Ok(blob)
}

fn short_header() -> LockboxError {
    LockboxError::InvalidVaultFormat("file too small to hold a vault header".into())
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Bounds-checked cursor over a byte slice.  Every read returns `None`
/// instead of panicking when the data runs out.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    pub(crate) fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub(crate) fn u32(&mut self) -> Option<u32> {
        self.array::<4>().map(u32::from_le_bytes)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N).and_then(|b| b.try_into().ok())
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }
}
