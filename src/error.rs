//! Error types for the remote adapter, the local adapter and the public client.

use std::time::Duration;
use thiserror::Error;

/// Failure talking to the remote Edge Function store.
///
/// Every variant is recoverable by the local fallback; none of these reach
/// the caller of [`crate::KvClient`] on their own.
#[derive(Debug, Error)]
pub enum RemoteError {
  #[error("remote request timed out after {0:?}")]
  Timeout(Duration),

  #[error("remote transport error: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("remote returned HTTP {status}")]
  Status { status: u16 },

  #[error("remote rejected request: {message}")]
  Application { message: String },

  #[error("failed to decode remote response: {0}")]
  Decode(String),

  /// The cached probe result says the remote is down; no request was sent.
  #[error("remote marked unavailable")]
  Unavailable,

  #[error("invalid remote url: {0}")]
  InvalidUrl(String),
}

impl RemoteError {
  pub(crate) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
    if e.is_timeout() {
      RemoteError::Timeout(timeout)
    } else if let Some(status) = e.status() {
      RemoteError::Status {
        status: status.as_u16(),
      }
    } else if e.is_decode() {
      RemoteError::Decode(e.to_string())
    } else {
      RemoteError::Transport(e)
    }
  }
}

/// Failure of the SQLite-backed local store.
#[derive(Debug, Error)]
pub enum LocalError {
  #[error("failed to serialize value for {key}: {source}")]
  Serialize {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to decode stored value for {key}: {source}")]
  Deserialize {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("local storage quota exceeded: {requested} bytes requested, limit is {limit}")]
  QuotaExceeded { limit: u64, requested: u64 },

  #[error("local storage error: {0}")]
  Storage(#[from] rusqlite::Error),

  #[error("failed to prepare local storage: {0}")]
  Io(#[from] std::io::Error),

  #[error("local storage lock poisoned")]
  Poisoned,

  #[error("local storage self-test read back a different value")]
  SelfTestMismatch,
}

/// Error surfaced by [`crate::KvClient`].
#[derive(Debug, Error)]
pub enum KvError {
  /// Rejected before any I/O was attempted.
  #[error("invalid request: {0}")]
  Validation(String),

  #[error("failed to encode value: {0}")]
  Encode(#[source] serde_json::Error),

  #[error("failed to decode value: {0}")]
  Decode(#[source] serde_json::Error),

  /// Both the remote and the local store failed.
  #[error("kv operation `{operation}` failed, local storage: {source}")]
  Failed {
    operation: &'static str,
    #[source]
    source: LocalError,
  },
}

pub type KvResult<T> = std::result::Result<T, KvError>;
