//! LMDB-backed [`KeyValueStore`].
//!
//! One environment directory, one named database, string keys and UTF-8 JSON
//! values. Every call runs in its own transaction and write transactions are
//! committed before returning, so a value handed to [`KeyValueStore::set`]
//! survives a process restart.
//!
//! LMDB forbids opening the same environment twice in one process. Hosts
//! that may reopen a path without closing it first (a Flutter hot restart
//! does this) should go through [`LmdbStorage::open_shared`], which hands
//! back the live handle for that path instead of opening a second one.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info};

use crate::error::StorageError;
use crate::storage::KeyValueStore;

const DB_NAME: &str = "anugya_patra";

type OpenEnvironments = Mutex<HashMap<PathBuf, Weak<LmdbStorage>>>;

fn open_environments() -> &'static OpenEnvironments {
    static OPEN: OnceLock<OpenEnvironments> = OnceLock::new();
    OPEN.get_or_init(|| Mutex::new(HashMap::new()))
}

pub struct LmdbStorage {
    env: Environment,
    db: Database,
    path: PathBuf,
}

impl LmdbStorage {
    /// Opens (creating if needed) the environment directory at `path`.
    ///
    /// `map_size` is the LMDB map size in bytes and caps how much the
    /// environment can hold.
    pub fn open(path: impl AsRef<Path>, map_size: usize) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(&path)?;
        let db = env.create_db(Some(DB_NAME), DatabaseFlags::empty())?;

        info!("LMDB storage opened at {}", path.display());
        Ok(Self { env, db, path })
    }

    /// Like [`open`](Self::open), but returns the handle already open for
    /// the same directory in this process, if one is still alive.
    ///
    /// The environment closes once the last clone of the returned `Arc` is
    /// dropped.
    pub fn open_shared(path: impl AsRef<Path>, map_size: usize) -> Result<Arc<Self>, StorageError> {
        fs::create_dir_all(path.as_ref())?;
        let canonical = fs::canonicalize(path.as_ref())?;

        let mut open = open_environments()
            .lock()
            .map_err(|_| StorageError::Poisoned)?;
        if let Some(storage) = open.get(&canonical).and_then(Weak::upgrade) {
            info!("Reusing LMDB storage already open at {}", canonical.display());
            return Ok(storage);
        }

        let storage = Arc::new(Self::open(&canonical, map_size)?);
        open.retain(|_, handle| handle.strong_count() > 0);
        open.insert(canonical, Arc::downgrade(&storage));
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for LmdbStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let txn = self.env.begin_ro_txn()?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Some(text.to_string()),
                Err(_) => {
                    return Err(StorageError::InvalidUtf8 {
                        key: key.to_string(),
                    })
                }
            },
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        debug!("LMDB put {key} ({} bytes)", value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut txn = self.env.begin_rw_txn()?;
        match txn.del(self.db, &key, None) {
            Ok(()) | Err(lmdb::Error::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;
        debug!("LMDB del {key}");
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.env.sync(true)?;
        Ok(())
    }
}
