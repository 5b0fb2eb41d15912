//! Transport and credential-storage backends for the core orchestrators.

#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(not(target_arch = "wasm32"))]
pub mod http;
