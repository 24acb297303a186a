//! Cached view of whether the remote store is reachable.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Which backend is currently serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  Server,
  Local,
  Unknown,
}

impl Mode {
  fn from_availability(available: Option<bool>) -> Self {
    match available {
      Some(true) => Mode::Server,
      Some(false) => Mode::Local,
      None => Mode::Unknown,
    }
  }
}

impl std::fmt::Display for Mode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Mode::Server => "server",
      Mode::Local => "local",
      Mode::Unknown => "unknown",
    };
    f.write_str(s)
  }
}

/// Snapshot returned by `KvClient::get_connectivity_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityStatus {
  pub server_available: Option<bool>,
  /// Serialized as epoch milliseconds
  #[serde(with = "chrono::serde::ts_milliseconds_option")]
  pub last_check: Option<DateTime<Utc>>,
  pub mode: Mode,
}

/// Result of recording an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
  pub from: Mode,
  pub to: Mode,
}

impl Transition {
  pub fn is_change(&self) -> bool {
    self.from != self.to
  }
}

/// Connectivity state owned by a single client.
///
/// Callers pass `now` explicitly so the cooldown can be exercised without sleeping.
#[derive(Debug)]
pub struct ConnectivityTracker {
  server_available: Option<bool>,
  last_probe: Option<Instant>,
  last_check_at: Option<DateTime<Utc>>,
  cooldown: Duration,
  /// Serving from local storage because a remote call failed
  degraded: bool,
}

impl ConnectivityTracker {
  pub fn new(cooldown: Duration) -> Self {
    Self {
      server_available: None,
      last_probe: None,
      last_check_at: None,
      cooldown,
      degraded: false,
    }
  }

  /// The last observation, if it is younger than the cooldown.
  pub fn cached(&self, now: Instant) -> Option<bool> {
    let available = self.server_available?;
    let at = self.last_probe?;
    (now.saturating_duration_since(at) < self.cooldown).then_some(available)
  }

  /// Record the outcome of a probe or a remote operation.
  ///
  /// Failures reset the timestamp too, so a down service is not re-probed
  /// until the cooldown has passed.
  pub fn record(&mut self, available: bool, now: Instant) -> Transition {
    let from = self.mode();
    self.server_available = Some(available);
    self.last_probe = Some(now);
    self.last_check_at = Some(Utc::now());
    Transition {
      from,
      to: self.mode(),
    }
  }

  /// Returns true if this call entered the degraded state.
  pub fn mark_degraded(&mut self) -> bool {
    !std::mem::replace(&mut self.degraded, true)
  }

  /// Returns true if the tracker was degraded before this call.
  pub fn clear_degraded(&mut self) -> bool {
    std::mem::replace(&mut self.degraded, false)
  }

  pub fn is_degraded(&self) -> bool {
    self.degraded
  }

  pub fn mode(&self) -> Mode {
    Mode::from_availability(self.server_available)
  }

  pub fn status(&self) -> ConnectivityStatus {
    ConnectivityStatus {
      server_available: self.server_available,
      last_check: self.last_check_at,
      mode: self.mode(),
    }
  }
}
