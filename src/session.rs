//! Who is signed in.
//!
//! Authentication is a mock: any non-empty email/password pair is accepted.
//! The store exists to hold the current [`User`], mirror it into storage so
//! it survives a restart, and tell observers when it changes.

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::User;
use crate::storage::{KeyValueStore, SESSION_KEY};

type Listener = Box<dyn Fn(Option<&User>) + Send + Sync>;

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: Option<User>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SessionStore {
    /// Restores the persisted session, if any.
    ///
    /// An unreadable or corrupt record leaves the store anonymous.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let current = match storage.get(SESSION_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<User>(&json) {
                Ok(user) => {
                    info!("Restored session for {}", user.email);
                    Some(user)
                }
                Err(e) => {
                    warn!("Discarding corrupt session record: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read session record: {e}");
                None
            }
        };

        Self {
            storage,
            current,
            listeners: Vec::new(),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Signs in with a user id derived from the email, so the same email
    /// always maps to the same id (and therefore the same documents).
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<User, AppError> {
        let email = validate_credentials(email, password)?;
        let user = User {
            id: derive_user_id(email),
            email: email.to_string(),
        };
        self.establish(user.clone());
        Ok(user)
    }

    /// Registers a new account. Every sign-up gets a fresh id.
    pub fn sign_up(&mut self, email: &str, password: &str) -> Result<User, AppError> {
        let email = validate_credentials(email, password)?;
        let user = User {
            id: format!("user-{}", Uuid::new_v4()),
            email: email.to_string(),
        };
        self.establish(user.clone());
        Ok(user)
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            warn!("Failed to clear persisted session: {e}");
        }
        if let Some(user) = self.current.take() {
            info!("Signed out {}", user.email);
        }
        self.notify();
    }

    /// Registers an observer called after every sign-in, sign-up and
    /// sign-out with the new current user.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(Option<&User>) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn establish(&mut self, user: User) {
        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.storage.set(SESSION_KEY, &json) {
                    warn!("Failed to persist session for {}: {e}", user.email);
                }
            }
            Err(e) => warn!("Failed to serialize session: {e}"),
        }
        info!("Signed in {} as {}", user.email, user.id);
        self.current = Some(user);
        self.notify();
    }

    fn notify(&self) {
        let current = self.current.as_ref();
        for listener in &self.listeners {
            listener(current);
        }
    }
}

fn validate_credentials<'a>(email: &'a str, password: &str) -> Result<&'a str, AppError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }
    Ok(email)
}

fn derive_user_id(email: &str) -> String {
    let normalized = email.to_lowercase();
    let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, normalized.as_bytes());
    format!("user-{id}")
}
