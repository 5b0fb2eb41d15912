//! Core, DOM-free primitives and orchestration for the web client.
pub mod auth;
pub mod batch;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod status;
pub mod token;
pub mod translate;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
