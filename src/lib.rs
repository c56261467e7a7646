//! # Anugya-Patra Core
//!
//! Local-first core for the agricultural transport permit ("Anugya-Patra")
//! application. It keeps a mock signed-in user, the user's permit documents
//! and the English/Hindi UI strings. Everything is persisted to a local
//! LMDB environment, so the UI host needs no server.
//!
//! ## Layout
//!
//! - [`storage`] / [`local_storage`]: string-keyed persistence (in-memory and LMDB)
//! - [`session`]: sign-in, sign-up, sign-out
//! - [`documents`]: per-user permit CRUD and title search
//! - [`localization`]: `(language, key) -> text`
//! - [`preview`]: printable permit layout
//! - [`app`]: wires the above together from an [`AppConfig`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use anugya_patra_core::{App, AppConfig};
//! use anugya_patra_core::model::PermitFields;
//!
//! let config = AppConfig::from_env();
//! let mut app = App::open(&config)?;
//! app.sign_in("trader@example.com", "secret")?;
//!
//! let doc = app.documents_mut().create(PermitFields {
//!     title: "Wheat to Jhansi".to_string(),
//!     ..PermitFields::blank_form()
//! })?;
//! assert_eq!(app.documents().get(&doc.id)?.fields.title, "Wheat to Jhansi");
//! # Ok::<(), anugya_patra_core::AppError>(())
//! ```
//!
//! ## FFI Functions
//!
//! Every function below returns a JSON-encoded [`AppResponse`] as an owned C
//! string. Release it with [`free_string`].
//!
//! - [`create_app`] / [`close_app`]: open and close the app instance
//! - [`sign_in`], [`sign_up`], [`sign_out`], [`current_user`]
//! - [`create_document`], [`get_document`], [`list_documents`],
//!   [`search_documents`], [`update_document`], [`delete_document`]
//! - [`set_language`], [`translate`]
//! - [`render_preview`]

pub mod app;
pub mod config;
pub mod documents;
pub mod error;
pub mod local_storage;
pub mod localization;
pub mod model;
pub mod preview;
pub mod session;
pub mod storage;
mod app_response;

pub use crate::app::App;
pub use crate::app_response::AppResponse;
pub use crate::config::AppConfig;
pub use crate::error::{AppError, StorageError};

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

use crate::localization::Language;
use crate::model::{PermitFields, PermitPatch};
use crate::preview::PermitPreview;

/// Opens the app with its LMDB environment at `path`.
///
/// Map size and startup language come from the environment (see
/// [`AppConfig::from_env`]). The previous session, if any, is restored.
/// Calling this again for a path that is still open (say, after a hot
/// restart that skipped [`close_app`]) shares the open environment instead
/// of failing.
///
/// # Parameters
///
/// * `path` - A null-terminated C string with the environment directory
///
/// # Returns
///
/// A pointer to the [`App`], or null on failure. Release it with [`close_app`].
///
/// # Safety
///
/// `path` must be null or point to a valid null-terminated string that stays
/// alive for the duration of the call.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use anugya_patra_core::{create_app, close_app, free_string};
///
/// let path = CString::new("permits.lmdb").unwrap();
/// let app = create_app(path.as_ptr());
/// if !app.is_null() {
///     free_string(close_app(app) as *mut _);
/// }
/// ```
///
/// # Errors
///
/// Returns null if:
/// - `path` is null
/// - `path` is not valid UTF-8
/// - The environment cannot be created or opened
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_app(path: *const c_char) -> *mut App {
    if path.is_null() {
        warn!("Null path pointer passed to create_app");
        return std::ptr::null_mut();
    }

    let path_str = match unsafe { CStr::from_ptr(path).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in path parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = AppConfig::from_env().with_storage_path(path_str);
    info!("Opening app storage at: {}", config.storage_path.display());

    match App::open(&config) {
        Ok(app) => Box::into_raw(Box::new(app)),
        Err(e) => {
            warn!("Failed to open app storage at {path_str}: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Flushes storage and frees the app.
///
/// The environment itself stays open while another [`App`] created for the
/// same path is still alive.
///
/// # Returns
///
/// `Ok("App closed")`, the storage error if the flush failed, or
/// `BadRequest` for a null pointer. The app is freed in every non-null case.
///
/// # Safety
///
/// `app` must be null or a pointer returned by [`create_app`] that has not
/// been closed yet. It must not be used after this call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_app(app: *mut App) -> *const c_char {
    if app.is_null() {
        return response_to_c_string(&AppResponse::BadRequest(
            "Null app pointer passed to close_app".to_string(),
        ));
    }

    let app = unsafe { Box::from_raw(app) };
    match app.close() {
        Ok(()) => response_to_c_string(&AppResponse::Ok("App closed".to_string())),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Releases a string returned by any function of this library.
///
/// # Safety
///
/// `ptr` must be null or a string returned by this library that has not
/// been freed already. Strings from other allocators must not be passed in.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Signs in with `email`/`password`. Any non-empty pair is accepted and the
/// same email always yields the same user id.
///
/// # Parameters
///
/// * `app` - Pointer returned by [`create_app`]
/// * `email` - Null-terminated UTF-8 email
/// * `password` - Null-terminated UTF-8 password
///
/// # Returns
///
/// `Ok` with the user JSON (`{"id":..,"email":..}`), `ValidationError` when
/// either credential is empty, or `BadRequest` for a null or non-UTF-8
/// argument.
///
/// # Safety
///
/// `app` must be null or a live pointer from [`create_app`], not used from
/// another thread during the call. The string pointers must be null or
/// valid null-terminated strings.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn sign_in(
    app: *mut App,
    email: *const c_char,
    password: *const c_char,
) -> *const c_char {
    let app = match app_mut(app, "sign_in") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let (email, password) = match credentials(email, password) {
        Ok(pair) => pair,
        Err(err) => return err,
    };

    match app.sign_in(&email, &password) {
        Ok(user) => json_response(&user),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Registers a new account with a fresh user id. Same parameters and
/// responses as [`sign_in`].
///
/// # Safety
///
/// Same requirements as [`sign_in`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn sign_up(
    app: *mut App,
    email: *const c_char,
    password: *const c_char,
) -> *const c_char {
    let app = match app_mut(app, "sign_up") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let (email, password) = match credentials(email, password) {
        Ok(pair) => pair,
        Err(err) => return err,
    };

    match app.sign_up(&email, &password) {
        Ok(user) => json_response(&user),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Clears the session and empties the in-memory document list. Stored
/// documents are kept for the next sign-in.
///
/// # Safety
///
/// `app` must be null or a live pointer from [`create_app`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn sign_out(app: *mut App) -> *const c_char {
    let app = match app_mut(app, "sign_out") {
        Ok(app) => app,
        Err(err) => return err,
    };

    app.sign_out();
    response_to_c_string(&AppResponse::Ok("Signed out".to_string()))
}

/// Responds `Ok` with the user JSON, or `Ok("null")` when nobody is signed in.
///
/// # Safety
///
/// `app` must be null or a live pointer from [`create_app`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn current_user(app: *mut App) -> *const c_char {
    let app = match app_mut(app, "current_user") {
        Ok(app) => app,
        Err(err) => return err,
    };

    json_response(&app.session().current_user())
}

/// Creates a document from form-field JSON (camelCase keys; missing keys
/// take their defaults). Identity fields in the input are ignored.
///
/// # Parameters
///
/// * `app` - Pointer returned by [`create_app`]
/// * `json_ptr` - Null-terminated JSON object of permit fields
///
/// # Returns
///
/// `Ok` with the stored document JSON, `SerializationError` for malformed
/// JSON, `Unauthorized` when nobody is signed in, or `BadRequest` for a
/// null or non-UTF-8 argument.
///
/// # Safety
///
/// `app` must be null or a live pointer from [`create_app`], and `json_ptr`
/// null or a valid null-terminated string.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use anugya_patra_core::{create_app, create_document, sign_in};
///
/// let path = CString::new("permits.lmdb").unwrap();
/// let app = create_app(path.as_ptr());
/// let email = CString::new("trader@example.com").unwrap();
/// let password = CString::new("secret").unwrap();
/// sign_in(app, email.as_ptr(), password.as_ptr());
///
/// let json = CString::new(r#"{"title":"Soybean lot 7","cropName":"Soybean","totalWeight":42.5}"#).unwrap();
/// let result = create_document(app, json.as_ptr());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_document(app: *mut App, json_ptr: *const c_char) -> *const c_char {
    let app = match app_mut(app, "create_document") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let fields: PermitFields = match serde_json::from_str(&json_str) {
        Ok(fields) => fields,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    match app.documents_mut().create(fields) {
        Ok(document) => json_response(&document),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Fetches one of the signed-in user's documents.
///
/// # Returns
///
/// `Ok` with the document JSON, or `NotFound` when `id` is unknown or
/// belongs to another user.
///
/// # Safety
///
/// Both parameters must be null or valid pointers. The id must be valid UTF-8.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_document(app: *mut App, id: *const c_char) -> *const c_char {
    let app = match app_mut(app, "get_document") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match app.documents().get(&id_str) {
        Ok(document) => json_response(document),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Responds `Ok` with a JSON array of the signed-in user's documents (empty
/// when signed out).
///
/// # Safety
///
/// `app` must be null or a live pointer from [`create_app`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn list_documents(app: *mut App) -> *const c_char {
    let app = match app_mut(app, "list_documents") {
        Ok(app) => app,
        Err(err) => return err,
    };

    json_response(&app.documents().list())
}

/// Title search, case-insensitive. An empty query lists everything.
///
/// # Safety
///
/// Both parameters must be null or valid pointers. The query must be valid
/// UTF-8.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn search_documents(app: *mut App, query: *const c_char) -> *const c_char {
    let app = match app_mut(app, "search_documents") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let query = match c_ptr_to_string(query, "query") {
        Ok(query) => query,
        Err(err) => return err,
    };

    json_response(&app.documents().search(&query))
}

/// Applies a partial field map to document `id`. Keys absent from the JSON
/// are left unchanged and `updatedAt` is restamped.
///
/// # Parameters
///
/// * `app` - Pointer returned by [`create_app`]
/// * `id` - Null-terminated document id
/// * `json_ptr` - Null-terminated JSON object with the fields to overwrite
///
/// # Returns
///
/// `Ok` with the updated document JSON, `NotFound` for an unknown id, or
/// `SerializationError` for malformed JSON.
///
/// # Safety
///
/// All pointers must be null or valid. The strings must be null-terminated
/// UTF-8.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_document(
    app: *mut App,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let app = match app_mut(app, "update_document") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let patch: PermitPatch = match serde_json::from_str(&json_str) {
        Ok(patch) => patch,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Error deserializing JSON: {e:?}"));
            return response_to_c_string(&error);
        }
    };

    match app.documents_mut().update(&id_str, patch) {
        Ok(document) => json_response(&document),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Deletes document `id`. Unknown ids still answer `Ok`.
///
/// # Safety
///
/// Both parameters must be null or valid pointers.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_document(app: *mut App, id: *const c_char) -> *const c_char {
    let app = match app_mut(app, "delete_document") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match app.documents_mut().delete(&id_str) {
        Ok(()) => response_to_c_string(&AppResponse::Ok(format!("Deleted {id_str}"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Switches the UI language (`"en"` or `"hi"`).
///
/// # Returns
///
/// `Ok` with the language tag now in effect, or `ValidationError` for an
/// unknown tag.
///
/// # Safety
///
/// Both parameters must be null or valid pointers. The tag must be valid UTF-8.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_language(app: *mut App, tag: *const c_char) -> *const c_char {
    let app = match app_mut(app, "set_language") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let tag = match c_ptr_to_string(tag, "language") {
        Ok(tag) => tag,
        Err(err) => return err,
    };

    match tag.parse::<Language>() {
        Ok(language) => {
            app.localizer_mut().set_language(language);
            response_to_c_string(&AppResponse::Ok(language.tag().to_string()))
        }
        Err(e) => response_to_c_string(&AppResponse::ValidationError(e.to_string())),
    }
}

/// Responds `Ok` with the text for `key` in the current language, or the
/// key itself when there is no entry.
///
/// # Safety
///
/// Both parameters must be null or valid pointers.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn translate(app: *mut App, key: *const c_char) -> *const c_char {
    let app = match app_mut(app, "translate") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let key = match c_ptr_to_string(key, "key") {
        Ok(key) => key,
        Err(err) => return err,
    };

    let text = app.localizer().t(&key).to_string();
    response_to_c_string(&AppResponse::Ok(text))
}

/// Responds `Ok` with the plain-text permit layout of document `id`.
///
/// # Safety
///
/// Both parameters must be null or valid pointers. The id must be valid UTF-8.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn render_preview(app: *mut App, id: *const c_char) -> *const c_char {
    let app = match app_mut(app, "render_preview") {
        Ok(app) => app,
        Err(err) => return err,
    };
    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match app.documents().get(&id_str) {
        Ok(document) => {
            let preview = PermitPreview::build(document);
            response_to_c_string(&AppResponse::Ok(preview.to_string()))
        }
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Serializes `value` and wraps it in [`AppResponse::Ok`].
fn json_response<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Converts an [`AppResponse`] to a C-compatible string.
///
/// Returns a null pointer if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust String.
///
/// * `Ok(String)` - If conversion was successful
/// * `Err(*const c_char)` - A ready-to-return `BadRequest` response
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn app_mut<'a>(app: *mut App, fn_name: &str) -> Result<&'a mut App, *const c_char> {
    match unsafe { app.as_mut() } {
        Some(app) => Ok(app),
        None => {
            let error = AppResponse::BadRequest(format!("Null app pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn credentials(
    email: *const c_char,
    password: *const c_char,
) -> Result<(String, String), *const c_char> {
    let email = c_ptr_to_string(email, "email")?;
    let password = c_ptr_to_string(password, "password")?;
    Ok((email, password))
}
