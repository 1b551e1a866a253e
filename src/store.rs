use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Error, Result};

/// A persisted record type: the file its collection lives in and the
/// composite key that makes an entry unique within that collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const FILE_NAME: &'static str;
    /// Shown in messages, e.g. "MFA" or "PIN".
    const KIND: &'static str;

    fn key(&self) -> (&str, &str);
}

#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "R: Serialize", deserialize = "R: DeserializeOwned"))]
struct Collection<R> {
    entries: Vec<R>,
}

/// File-backed repository for one credential class. The whole collection is
/// loaded on every operation and rewritten on every mutation. There is no
/// locking: concurrent invocations racing on the same file are last-write-
/// wins, and a reader can observe a partial write. The tool assumes a
/// single instance per file.
pub struct Store<R> {
    path: PathBuf,
    _record: PhantomData<R>,
}

impl<R: Record> Store<R> {
    pub fn open(dir: &Path) -> Self {
        Store {
            path: dir.join(R::FILE_NAME),
            _record: PhantomData,
        }
    }

    /// Missing or empty file means an empty collection; anything else that
    /// cannot be read or parsed is a storage error.
    pub fn load(&self) -> Result<Vec<R>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path).map_err(|source| Error::ReadStore {
            path: self.path.clone(),
            source,
        })?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        let collection: Collection<R> =
            serde_json::from_str(&data).map_err(|source| Error::MalformedStore {
                path: self.path.clone(),
                source,
            })?;
        Ok(collection.entries)
    }

    /// Serialize with the field order fixed by the record structs and
    /// rewrite the whole file, creating the parent directory on demand.
    pub fn save(&self, entries: Vec<R>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            config::ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(&Collection { entries }).map_err(|source| {
            Error::SerializeStore {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|source| Error::WriteStore {
            path: self.path.clone(),
            source,
        })?;
        let _ = set_perms_restrictive(&self.path);
        Ok(())
    }

    /// Replace the entry with a matching key in place (keeping its position
    /// in the enumeration order) or append, then persist. On failure the
    /// file is left as it was. Returns whether an entry was replaced.
    pub fn upsert(&self, entry: R) -> Result<bool> {
        let (k0, k1) = {
            let (a, b) = entry.key();
            (a.to_string(), b.to_string())
        };
        let mut entries = self.load()?;
        let replaced = match entries.iter_mut().find(|e| e.key() == (&k0[..], &k1[..])) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => {
                entries.push(entry);
                false
            }
        };
        self.save(entries)?;
        Ok(replaced)
    }

    /// Linear scan by key. Absence is not an error at this layer.
    pub fn find(&self, key: (&str, &str)) -> Result<Option<R>> {
        Ok(self.load()?.into_iter().find(|e| e.key() == key))
    }

    /// All entries in stored (insertion) order.
    pub fn list(&self) -> Result<Vec<R>> {
        self.load()
    }
}

#[cfg(unix)]
fn set_perms_restrictive(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_perms_restrictive(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
