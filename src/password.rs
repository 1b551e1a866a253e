//! Password generation and storage.

use crate::entry::PasswordEntry;
use crate::error::{Error, Result};
use crate::sampler::{self, CharsetSpec};
use crate::store::Store;

/// Generate a password under `spec` and upsert it for (name, account).
/// Returns the stored entry and whether an existing one was replaced.
pub fn add(
    store: &Store<PasswordEntry>,
    name: &str,
    account: &str,
    length: i64,
    spec: &CharsetSpec,
) -> Result<(PasswordEntry, bool)> {
    if name.is_empty() || account.is_empty() {
        return Err(Error::Validation(
            "name and account are required".to_string(),
        ));
    }
    let (password, config) = sampler::generate_password(spec, length)?;
    let entry = PasswordEntry {
        name: name.to_string(),
        account: account.to_string(),
        password,
        length: length as u32,
        config,
    };
    let replaced = store.upsert(entry.clone())?;
    Ok((entry, replaced))
}

pub fn list(store: &Store<PasswordEntry>) -> Result<Vec<PasswordEntry>> {
    store.list()
}
