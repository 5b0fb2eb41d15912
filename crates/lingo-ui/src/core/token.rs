//! Bearer credential holder.
//!
//! # Design
//! - Exactly zero or one credential; replaced or cleared, never mutated.
//! - Backed by a pluggable storage so the browser build persists it across
//!   reloads while native code and tests keep it in memory.
//! - Blank values are treated as absent.

use std::cell::RefCell;

/// Durable backing store for the credential.
pub trait CredentialStorage {
    /// Read the stored value.
    fn load(&self) -> Option<String>;
    /// Replace the stored value.
    fn store(&self, token: &str);
    /// Remove the stored value.
    fn remove(&self);
}

/// Process-local storage used outside the browser.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: RefCell<Option<String>>,
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    fn store(&self, token: &str) {
        *self.slot.borrow_mut() = Some(token.to_string());
    }

    fn remove(&self) {
        self.slot.borrow_mut().take();
    }
}

/// Holder of the single bearer credential, read by transports on every call.
pub struct TokenStore {
    storage: Box<dyn CredentialStorage>,
}

impl TokenStore {
    /// Wrap a storage backend.
    #[must_use]
    pub fn new(storage: impl CredentialStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Token store backed by [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// Replace the held credential.
    pub fn set(&self, token: &str) {
        self.storage.store(token);
    }

    /// Current credential, if one is held.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.storage
            .load()
            .filter(|token| !token.trim().is_empty())
    }

    /// Drop the held credential.
    pub fn clear(&self) {
        self.storage.remove();
    }

    /// Whether a credential is currently held.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.get().is_some()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TokenStore")
            .field("has_credential", &self.has_credential())
            .finish()
    }
}
