//! Numeric PIN generation, retrieval and storage.

use crate::entry::PinEntry;
use crate::error::{Error, Result};
use crate::sampler;
use crate::store::{Record, Store};

/// Generate a PIN of `length` digits and upsert it for (name, account).
/// Returns the stored entry and whether an existing one was replaced.
pub fn add(
    store: &Store<PinEntry>,
    name: &str,
    account: &str,
    length: i64,
) -> Result<(PinEntry, bool)> {
    if name.is_empty() || account.is_empty() {
        return Err(Error::Validation(
            "name and account cannot be empty".to_string(),
        ));
    }
    let pin = sampler::generate_pin(length)?;
    let entry = PinEntry {
        name: name.to_string(),
        account: account.to_string(),
        pin,
    };
    let replaced = store.upsert(entry.clone())?;
    Ok((entry, replaced))
}

pub fn get(store: &Store<PinEntry>, name: &str, account: &str) -> Result<PinEntry> {
    store.find((name, account))?.ok_or_else(|| Error::NotFound {
        kind: PinEntry::KIND,
        name: name.to_string(),
        account: account.to_string(),
    })
}

pub fn list(store: &Store<PinEntry>) -> Result<Vec<PinEntry>> {
    store.list()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> Store<PinEntry> {
        Store::open(dir.path())
    }

    #[test]
    fn add_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let (entry, replaced) = add(&store, "bank", "alice", 6).unwrap();
        assert!(!replaced);
        assert_eq!(entry.pin.len(), 6);

        let got = get(&store, "bank", "alice").unwrap();
        assert_eq!(got.pin, entry.pin);
    }

    #[test]
    fn add_replaces_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        add(&store, "bank", "alice", 4).unwrap();
        let (_, replaced) = add(&store, "bank", "alice", 8).unwrap();
        assert!(replaced);

        let entries = list(&store).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pin.len(), 8);
    }

    #[test]
    fn get_for_unknown_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(matches!(
            get(&store, "bank", "nobody"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn invalid_length_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        for bad in [0, -4] {
            assert!(matches!(
                add(&store, "bank", "alice", bad),
                Err(Error::Validation(_))
            ));
        }
        assert!(list(&store).unwrap().is_empty());
    }
}
