#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Lingo web client: session and request orchestration.
//!
//! Layout:
//! - `core/`: DOM-free state machines (token store, session cache, access
//!   guard, auth and translation orchestrators, batch inputs) tested natively.
//! - `services/`: transport and credential-storage backends (reqwest on
//!   native targets, gloo on `wasm32`).
//! - `app/`: the yew shell (routes, protected-route gate), `wasm32` only.

pub mod core;
pub mod services;

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
pub use app::run_app;

pub use crate::core::auth::AuthOrchestrator;
pub use crate::core::batch::{BatchInputManager, TranslationResult};
pub use crate::core::cache::{QuerySnapshot, QueryStatus, SESSION_KEY, SessionCache, TRANSLATIONS_KEY};
pub use crate::core::config::{ClientConfig, ConfigError};
pub use crate::core::context::SessionContext;
pub use crate::core::error::{ApiError, RequestError};
pub use crate::core::guard::{AccessGuard, GuardState, Redirect};
pub use crate::core::navigation::{AppRoute, HistoryNavigator, NavigationMode, Navigator};
pub use crate::core::status::{CombinedStatus, RequestStatus};
pub use crate::core::token::{CredentialStorage, MemoryStorage, TokenStore};
pub use crate::core::transport::{ApiClient, ApiRequest, BodyEncoding, Method, RequestBody, Transport};
pub use crate::core::translate::{TranslationOptions, TranslationOrchestrator};

#[cfg(not(target_arch = "wasm32"))]
pub use crate::services::http::HttpTransport;
#[cfg(target_arch = "wasm32")]
pub use crate::services::browser::{BrowserTransport, LocalStorageCredentials};
