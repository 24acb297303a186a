//! Rate limiting for "operating locally" notices.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Decides whether a fallback notice should be logged for an operation.
///
/// The first failure of each operation is always reported, later ones only
/// once `cooldown` has elapsed since the previous notice for that operation.
#[derive(Debug)]
pub struct FailureNotifier {
  cooldown: Duration,
  last_notice: HashMap<&'static str, Instant>,
}

impl FailureNotifier {
  pub fn new(cooldown: Duration) -> Self {
    Self {
      cooldown,
      last_notice: HashMap::new(),
    }
  }

  pub fn should_notify(&mut self, operation: &'static str, now: Instant) -> bool {
    let due = match self.last_notice.get(operation) {
      Some(last) => now.saturating_duration_since(*last) >= self.cooldown,
      None => true,
    };
    if due {
      self.last_notice.insert(operation, now);
    }
    due
  }

  /// Forget previous notices so the next outage is reported immediately.
  pub fn reset(&mut self) {
    self.last_notice.clear();
  }
}
