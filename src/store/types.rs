//! Types shared by the remote and local adapters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate view over the known application prefixes.
///
/// Computed on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
  pub total_keys: u64,
  /// Estimated size in bytes (key + serialized value)
  pub total_size: u64,
  #[serde(default)]
  pub prefixes: BTreeMap<String, u64>,
}

/// Response envelope returned by every remote endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
  pub success: bool,
  pub data: Option<T>,
  #[serde(default)]
  pub error: Option<String>,
}

/// Application record prefixes used by CrewTech.
pub const DEFAULT_PREFIXES: &[&str] = &[
  "crewtech:missions:",
  "crewtech:crew:",
  "crewtech:notifications:",
  "crewtech:settings:",
  "crewtech:aircraft:",
  "crewtech:schedules:",
];
