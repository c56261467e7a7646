//! Per-user permit documents.
//!
//! The store keeps the signed-in user's whole collection in memory and
//! writes it back wholesale under [`documents_key`] after every mutation.
//! There are no deltas or cross-key transactions, and the last writer wins.
//! A read or write that fails at the storage layer is logged and the store
//! carries on with what it has in memory.
//!
//! Loading is record by record. An entry that does not deserialize (or a
//! blob that is not an array at all) is moved under [`quarantine_key`]
//! before anything is written back, so a later save never erases it. If
//! that move fails, or the collection could not be read, saves for the user
//! are held back until the next successful load.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, StorageError};
use crate::model::{Document, PermitFields, PermitPatch, User};
use crate::storage::{documents_key, quarantine_key, KeyValueStore};

pub struct DocumentStore {
    storage: Arc<dyn KeyValueStore>,
    owner: Option<String>,
    documents: Vec<Document>,
    /// Set when the stored collection may hold data we failed to set aside.
    persist_blocked: bool,
}

impl DocumentStore {
    /// Empty store with nobody signed in. Call [`switch_user`](Self::switch_user)
    /// to load a collection.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            owner: None,
            documents: Vec::new(),
            persist_blocked: false,
        }
    }

    /// Reloads for `user`, or empties the store when `None`.
    ///
    /// Records in the blob that belong to someone else, or that no longer
    /// deserialize, are left out and quarantined.
    pub fn switch_user(&mut self, user: Option<&User>) {
        self.persist_blocked = false;
        let Some(user) = user else {
            self.owner = None;
            self.documents.clear();
            return;
        };

        self.owner = Some(user.id.clone());
        let key = documents_key(&user.id);
        let (documents, mut rejected) = match self.read_collection(&key) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Failed to read {key}, starting empty with saves held back: {e}");
                self.documents = Vec::new();
                self.persist_blocked = true;
                return;
            }
        };

        let (documents, foreign): (Vec<Document>, Vec<Document>) =
            documents.into_iter().partition(|doc| doc.user_id == user.id);
        if !foreign.is_empty() {
            warn!(
                "Dropped {} document(s) not owned by {} from its collection",
                foreign.len(),
                user.id
            );
            rejected.extend(foreign.iter().filter_map(|doc| serde_json::to_value(doc).ok()));
        }

        if !rejected.is_empty() {
            if let Err(e) = self.quarantine(&user.id, rejected) {
                error!("Failed to quarantine records for {}, holding back saves: {e}", user.id);
                self.persist_blocked = true;
            }
        }

        info!("Loaded {} document(s) for {}", documents.len(), user.id);
        self.documents = documents;
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The current user's documents in stored order.
    pub fn list(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Result<&Document, AppError> {
        let index = self.position(id)?;
        Ok(&self.documents[index])
    }

    pub fn create(&mut self, fields: PermitFields) -> Result<Document, AppError> {
        let owner = self.owner.clone().ok_or(AppError::NotAuthenticated)?;
        let now = Utc::now();
        let document = Document {
            id: format!("doc_{}", Uuid::new_v4().simple()),
            user_id: owner,
            fields,
            created_at: now,
            updated_at: now,
        };

        self.documents.push(document.clone());
        self.persist();
        debug!("Created document {}", document.id);
        Ok(document)
    }

    /// Overwrites the fields present in `patch` and stamps `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn update(&mut self, id: &str, patch: PermitPatch) -> Result<Document, AppError> {
        let index = self.position(id)?;
        let document = &mut self.documents[index];
        patch.apply_to(&mut document.fields);
        document.updated_at = Utc::now().max(document.updated_at);

        let updated = document.clone();
        self.persist();
        debug!("Updated document {id}");
        Ok(updated)
    }

    /// Removes `id` if present. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        if self.owner.is_none() {
            return Err(AppError::NotAuthenticated);
        }
        let before = self.documents.len();
        self.documents.retain(|doc| doc.id != id);
        if self.documents.len() != before {
            debug!("Deleted document {id}");
        }
        self.persist();
        Ok(())
    }

    /// Documents whose title contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&Document> {
        filter_by_title(&self.documents, query)
    }

    fn position(&self, id: &str) -> Result<usize, AppError> {
        let owner = self.owner.as_deref().ok_or(AppError::NotAuthenticated)?;
        self.documents
            .iter()
            .position(|doc| doc.id == id && doc.user_id == owner)
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    /// Splits the blob under `key` into readable documents and the raw
    /// entries that failed to deserialize.
    fn read_collection(&self, key: &str) -> Result<(Vec<Document>, Vec<Value>), StorageError> {
        let Some(json) = self.storage.get(key)? else {
            return Ok((Vec::new(), Vec::new()));
        };

        let records: Vec<Value> = match serde_json::from_str(&json) {
            Ok(records) => records,
            Err(e) => {
                warn!("Corrupt document collection under {key}, starting empty: {e}");
                return Ok((Vec::new(), vec![Value::String(json)]));
            }
        };

        let mut documents = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();
        for record in records {
            match Document::deserialize(&record) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    let id = record.get("id").and_then(Value::as_str).unwrap_or("<no id>");
                    warn!("Skipping unreadable record {id} under {key}: {e}");
                    rejected.push(record);
                }
            }
        }
        Ok((documents, rejected))
    }

    /// Appends `rejected` to the user's quarantine list.
    fn quarantine(&self, user_id: &str, rejected: Vec<Value>) -> Result<(), StorageError> {
        let key = quarantine_key(user_id);
        let mut entries: Vec<Value> = match self.storage.get(&key)? {
            Some(json) => match serde_json::from_str(&json) {
                Ok(entries) => entries,
                Err(_) => vec![Value::String(json)],
            },
            None => Vec::new(),
        };
        let count = rejected.len();
        entries.extend(rejected);

        let json = Value::Array(entries).to_string();
        self.storage.set(&key, &json)?;
        warn!("Moved {count} record(s) for {user_id} to {key}");
        Ok(())
    }

    fn persist(&self) {
        let Some(owner) = self.owner.as_deref() else {
            return;
        };
        let key = documents_key(owner);
        if self.persist_blocked {
            warn!("Not writing {key}: its stored contents were not set aside safely");
            return;
        }
        let json = match serde_json::to_string(&self.documents) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize documents for {owner}: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(&key, &json) {
            warn!("Failed to persist documents under {key}: {e}");
        }
    }
}

/// Case-insensitive substring match against `title`. An empty query
/// matches everything.
pub fn filter_by_title<'a>(documents: &'a [Document], query: &str) -> Vec<&'a Document> {
    let needle = query.to_lowercase();
    documents
        .iter()
        .filter(|doc| doc.fields.title.to_lowercase().contains(&needle))
        .collect()
}
