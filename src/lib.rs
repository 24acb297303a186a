//! Dual-mode key-value client for CrewTech application records.
//!
//! [`KvClient`] sends every operation to the KV Edge Function and, when that
//! fails for any reason, serves it from a local SQLite store instead. Callers
//! only see an error when both stores fail.

pub mod client;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod notify;
pub mod store;

pub use client::{ClientOptions, KvClient};
pub use config::Config;
pub use connectivity::{ConnectivityStatus, Mode};
pub use error::{KvError, KvResult, LocalError, RemoteError};
pub use store::StoreStats;
