//! Startup wiring.
//!
//! [`App`] is built once, owns both stores and the language selection, and
//! keeps the document store pointed at whoever the session says is signed in.
//! Hosts hold it directly (Rust) or behind the opaque pointer returned by
//! [`create_app`](crate::create_app).

use std::sync::Arc;

use log::info;

use crate::config::AppConfig;
use crate::documents::DocumentStore;
use crate::error::AppError;
use crate::local_storage::LmdbStorage;
use crate::localization::{Language, Localizer};
use crate::model::User;
use crate::session::SessionStore;
use crate::storage::KeyValueStore;

pub struct App {
    storage: Arc<dyn KeyValueStore>,
    session: SessionStore,
    documents: DocumentStore,
    localizer: Localizer,
}

impl App {
    /// Opens the LMDB environment named by `config` and restores the last
    /// session.
    ///
    /// A second `App` opened on the same path while the first is still alive
    /// shares its environment (see [`LmdbStorage::open_shared`]).
    pub fn open(config: &AppConfig) -> Result<Self, AppError> {
        let storage = LmdbStorage::open_shared(&config.storage_path, config.map_size)?;
        Ok(Self::with_storage(storage, config.language))
    }

    pub fn with_storage(storage: Arc<dyn KeyValueStore>, language: Language) -> Self {
        let session = SessionStore::load(Arc::clone(&storage));
        let mut documents = DocumentStore::new(Arc::clone(&storage));
        documents.switch_user(session.current_user());

        Self {
            storage,
            session,
            documents,
            localizer: Localizer::new(language),
        }
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self.session.sign_in(email, password)?;
        self.documents.switch_user(Some(&user));
        Ok(user)
    }

    pub fn sign_up(&mut self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self.session.sign_up(email, password)?;
        self.documents.switch_user(Some(&user));
        Ok(user)
    }

    pub fn sign_out(&mut self) {
        self.session.sign_out();
        self.documents.switch_user(None);
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Observes session changes made through this `App`.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(Option<&User>) + Send + Sync + 'static,
    {
        self.session.subscribe(listener);
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut DocumentStore {
        &mut self.documents
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn localizer_mut(&mut self) -> &mut Localizer {
        &mut self.localizer
    }

    /// Flushes storage. The app is dropped afterwards.
    pub fn close(self) -> Result<(), AppError> {
        self.storage.flush()?;
        info!("App closed");
        Ok(())
    }
}
