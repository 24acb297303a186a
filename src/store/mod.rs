//! Storage adapters behind the fallback client.
//!
//! - [`HttpRemote`]: the KV Edge Function, reached over HTTPS with a bearer token
//! - [`LocalStore`]: a namespaced SQLite table standing in for browser local storage
//!
//! The two are alternatives, not replicas: nothing is copied between them.

mod local;
mod remote;
mod types;

pub use local::{LocalSettings, LocalStore, DEFAULT_NAMESPACE, DEFAULT_QUOTA_BYTES};
pub use remote::{HttpRemote, RemoteSettings, RemoteStore};
pub use types::{StoreStats, DEFAULT_PREFIXES};
