//! Integration tests for `RecordStore`: persistence, authentication,
//! tamper detection, and crash safety.

use std::fs;
use std::path::{Path, PathBuf};

use lockbox::crypto::{generate_keyfile, Argon2Params};
use lockbox::errors::LockboxError;
use lockbox::vault::{Entry, RecordStore, Vault};
use tempfile::TempDir;

const PASSPHRASE: &[u8] = b"correct-horse";

fn fast() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

fn vault_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("passwords.lockbox");
    (dir, path)
}

fn open(path: &Path, passphrase: &[u8]) -> lockbox::errors::Result<(RecordStore, Vault)> {
    RecordStore::open_with_params(path, passphrase, None, &fast())
}

fn sample() -> Vault {
    Vault::from_entries(vec![
        Entry::new("gmail", "p1", "mail"),
        Entry::new("bank", "p2", "finance"),
    ])
}

/// Write `vault` to a fresh file and release the lock.
fn write(path: &Path, vault: &Vault) {
    let (mut store, _) = open(path, PASSPHRASE).unwrap();
    store.save(PASSPHRASE, None, vault).unwrap();
}

/// Length of the header for a vault without keyfile.
const HEADER_LEN: usize = 4 + 1 + 1 + 12 + 32 + 1 + 4;
/// Length of the check block: nonce + len + tag (empty plaintext).
const CHECK_BLOCK_LEN: usize = 12 + 4 + 16;

// ---------------------------------------------------------------------------
// Round-trip
// ---------------------------------------------------------------------------

#[test]
fn concrete_roundtrip_and_wrong_passphrase() {
    let (_dir, path) = vault_path();
    write(&path, &sample());

    let (_store, loaded) = open(&path, b"correct-horse").unwrap();
    assert_eq!(loaded, sample());
    drop(_store);

    assert!(matches!(
        open(&path, b"wrong"),
        Err(LockboxError::WrongPassphraseOrCorrupt)
    ));
}

#[test]
fn roundtrip_preserves_order_optional_fields_and_placeholders() {
    let (_dir, path) = vault_path();
    let vault = Vault::from_entries(vec![
        Entry::new("zeta", "z", "b").with_site("z.example"),
        Entry::new("alpha", "a", "a").with_login("alice"),
        Entry::placeholder("travel"),
        Entry::new("ünïcødé", "pässwörd", "カテゴリ"),
    ]);
    write(&path, &vault);

    let (_store, loaded) = open(&path, PASSPHRASE).unwrap();
    assert_eq!(loaded, vault);
}

#[test]
fn empty_vault_roundtrips_and_still_checks_passphrase() {
    let (_dir, path) = vault_path();
    write(&path, &Vault::new());

    let (store, loaded) = open(&path, PASSPHRASE).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(store.header().unwrap().record_count, 0);
    drop(store);

    assert!(matches!(
        open(&path, b"wrong"),
        Err(LockboxError::WrongPassphraseOrCorrupt)
    ));
}

#[test]
fn open_missing_file_is_empty_and_new() {
    let (_dir, path) = vault_path();
    let (store, vault) = open(&path, PASSPHRASE).unwrap();
    assert!(store.is_new());
    assert!(vault.is_empty());
    assert!(!path.exists());
}

// ---------------------------------------------------------------------------
// Passphrase and salt handling across saves
// ---------------------------------------------------------------------------

#[test]
fn salt_is_preserved_and_ciphertext_refreshed_across_saves() {
    let (_dir, path) = vault_path();
    write(&path, &sample());
    let first = fs::read(&path).unwrap();

    let (mut store, vault) = open(&path, PASSPHRASE).unwrap();
    store.save(PASSPHRASE, None, &vault).unwrap();
    let second = fs::read(&path).unwrap();

    // Salt sits after magic, version, cipher id, and the three params.
    assert_eq!(first[18..50], second[18..50]);
    assert_ne!(first, second, "fresh nonces on every save");
}

#[test]
fn save_with_different_passphrase_is_rejected() {
    let (_dir, path) = vault_path();
    write(&path, &sample());
    let before = fs::read(&path).unwrap();

    let (mut store, mut vault) = open(&path, PASSPHRASE).unwrap();
    vault.add_entry(Entry::new("extra", "x", "")).unwrap();

    assert!(matches!(
        store.save(b"typo-horse", None, &vault),
        Err(LockboxError::WrongPassphraseOrCorrupt)
    ));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn stored_params_are_used_on_open() {
    let (_dir, path) = vault_path();
    let custom = Argon2Params {
        memory_kib: 16_384,
        iterations: 2,
        parallelism: 1,
    };

    let (mut store, _) = RecordStore::open_with_params(&path, PASSPHRASE, None, &custom).unwrap();
    store.save(PASSPHRASE, None, &sample()).unwrap();
    drop(store);

    // Opening with different "new vault" params still uses the header's.
    let (store, loaded) = open(&path, PASSPHRASE).unwrap();
    assert_eq!(store.header().unwrap().argon2_params, custom);
    assert_eq!(loaded, sample());
}

// ---------------------------------------------------------------------------
// Tamper detection
// ---------------------------------------------------------------------------

#[test]
fn flipping_any_block_byte_fails_authentication() {
    let (_dir, path) = vault_path();
    write(&path, &sample());
    let pristine = fs::read(&path).unwrap();

    for i in HEADER_LEN..pristine.len() {
        let mut tampered = pristine.clone();
        tampered[i] ^= 0x01;
        fs::write(&path, &tampered).unwrap();

        assert!(
            matches!(open(&path, PASSPHRASE), Err(LockboxError::WrongPassphraseOrCorrupt)),
            "flip at byte {i} was not detected"
        );
    }
}

#[test]
fn flipping_any_header_byte_is_a_clean_error() {
    let (_dir, path) = vault_path();
    write(&path, &sample());
    let pristine = fs::read(&path).unwrap();

    // Everything after magic and version: cipher id, Argon2 params, salt,
    // keyfile flag, record count.  Params pushed past the caps must be
    // refused before Argon2 runs, not attempted.
    for i in 5..HEADER_LEN {
        for mask in [0x01u8, 0x3F, 0xFF] {
            let mut tampered = pristine.clone();
            tampered[i] ^= mask;
            fs::write(&path, &tampered).unwrap();

            let result = open(&path, PASSPHRASE);
            assert!(
                matches!(
                    result,
                    Err(LockboxError::WrongPassphraseOrCorrupt)
                        | Err(LockboxError::InvalidVaultFormat(_))
                ),
                "flip {mask:#04x} at header byte {i} gave {:?}",
                result.err()
            );
        }
    }
}

#[test]
fn oversized_stored_params_are_invalid_format() {
    let (_dir, path) = vault_path();
    write(&path, &sample());
    let mut tampered = fs::read(&path).unwrap();

    // memory_kib 8192 -> ~3.9 GiB
    tampered[8] ^= 0x3F;
    fs::write(&path, &tampered).unwrap();

    assert!(matches!(
        open(&path, PASSPHRASE),
        Err(LockboxError::InvalidVaultFormat(_))
    ));
}

#[test]
fn reordered_records_are_rejected() {
    let (_dir, path) = vault_path();
    write(&path, &sample());
    let data = fs::read(&path).unwrap();

    let records_start = HEADER_LEN + CHECK_BLOCK_LEN;
    let first_len = 16 + u32::from_le_bytes(
        data[records_start + 12..records_start + 16].try_into().unwrap(),
    ) as usize;
    let (first, second) = data[records_start..].split_at(first_len);

    let mut swapped = data[..records_start].to_vec();
    swapped.extend_from_slice(second);
    swapped.extend_from_slice(first);
    fs::write(&path, &swapped).unwrap();

    assert!(matches!(
        open(&path, PASSPHRASE),
        Err(LockboxError::WrongPassphraseOrCorrupt)
    ));
}

#[test]
fn truncated_or_extended_file_is_rejected() {
    let (_dir, path) = vault_path();
    write(&path, &sample());
    let data = fs::read(&path).unwrap();

    fs::write(&path, &data[..data.len() - 1]).unwrap();
    assert!(matches!(
        open(&path, PASSPHRASE),
        Err(LockboxError::WrongPassphraseOrCorrupt)
    ));

    let mut extended = data.clone();
    extended.push(0);
    fs::write(&path, &extended).unwrap();
    assert!(matches!(
        open(&path, PASSPHRASE),
        Err(LockboxError::WrongPassphraseOrCorrupt)
    ));
}

#[test]
fn bad_magic_is_invalid_format() {
    let (_dir, path) = vault_path();
    fs::write(&path, b"NOPE and then some bytes that are not a vault").unwrap();

    assert!(matches!(
        open(&path, PASSPHRASE),
        Err(LockboxError::InvalidVaultFormat(_))
    ));
}

// ---------------------------------------------------------------------------
// Crash safety and locking
// ---------------------------------------------------------------------------

#[test]
fn leftover_temp_file_does_not_affect_vault() {
    let (dir, path) = vault_path();
    write(&path, &sample());

    // Simulate a crash mid-write: garbage in the temp file.
    let tmp = dir.path().join(".passwords.lockbox.tmp");
    fs::write(&tmp, b"half-written garbage").unwrap();

    let (mut store, mut vault) = open(&path, PASSPHRASE).unwrap();
    assert_eq!(vault, sample());

    vault.add_entry(Entry::new("amazon", "p3", "shopping")).unwrap();
    store.save(PASSPHRASE, None, &vault).unwrap();
    drop(store);

    assert!(!tmp.exists());
    let (_store, loaded) = open(&path, PASSPHRASE).unwrap();
    assert_eq!(loaded.len(), 3);
}

#[test]
fn second_open_of_same_vault_is_locked() {
    let (_dir, path) = vault_path();
    write(&path, &sample());

    let (_first, _) = open(&path, PASSPHRASE).unwrap();
    assert!(matches!(
        open(&path, PASSPHRASE),
        Err(LockboxError::VaultLocked(_))
    ));
}

#[test]
fn lock_left_by_killed_session_does_not_block_open() {
    let (dir, path) = vault_path();
    write(&path, &sample());
    fs::write(dir.path().join(".passwords.lockbox.lock"), "4194303999\n").unwrap();

    let (_store, loaded) = open(&path, PASSPHRASE).unwrap();
    assert_eq!(loaded.len(), 2);
}

#[cfg(unix)]
#[test]
fn vault_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = vault_path();
    write(&path, &sample());

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

// ---------------------------------------------------------------------------
// Keyfile
// ---------------------------------------------------------------------------

#[test]
fn keyfile_vault_requires_matching_keyfile() {
    let (dir, path) = vault_path();
    let keyfile = generate_keyfile(&dir.path().join("lockbox.keyfile")).unwrap();

    let (mut store, _) = RecordStore::open_with_params(&path, PASSPHRASE, None, &fast()).unwrap();
    store.save(PASSPHRASE, Some(keyfile.as_slice()), &sample()).unwrap();
    assert!(store.requires_keyfile());
    drop(store);

    assert!(matches!(
        open(&path, PASSPHRASE),
        Err(LockboxError::KeyfileError(_))
    ));
    assert!(matches!(
        RecordStore::open_with_params(&path, PASSPHRASE, Some(&[0u8; 32][..]), &fast()),
        Err(LockboxError::KeyfileError(_))
    ));

    let (_store, loaded) =
        RecordStore::open_with_params(&path, PASSPHRASE, Some(keyfile.as_slice()), &fast()).unwrap();
    assert_eq!(loaded, sample());
}

#[test]
fn keyfile_rejected_for_vault_created_without_one() {
    let (_dir, path) = vault_path();
    write(&path, &sample());

    assert!(matches!(
        RecordStore::open_with_params(&path, PASSPHRASE, Some(&[1u8; 32][..]), &fast()),
        Err(LockboxError::KeyfileError(_))
    ));
}
