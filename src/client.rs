//! Key-value client that prefers the remote store and falls back to local storage.

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::connectivity::{ConnectivityStatus, ConnectivityTracker, Mode, Transition};
use crate::error::{KvError, KvResult, LocalError, RemoteError};
use crate::notify::FailureNotifier;
use crate::store::{HttpRemote, LocalStore, RemoteStore, StoreStats};

/// Cooldowns used by [`KvClient`].
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
  /// How long a probe result is trusted
  pub probe_cooldown: Duration,
  /// Minimum gap between "operating locally" notices per operation
  pub notify_cooldown: Duration,
}

impl Default for ClientOptions {
  fn default() -> Self {
    Self {
      probe_cooldown: Duration::from_secs(30),
      notify_cooldown: Duration::from_secs(60),
    }
  }
}

/// Dual-mode key-value client.
///
/// Every operation is tried against the remote store first. Any remote
/// failure is absorbed by running the same operation on the local store;
/// only a failure of both reaches the caller, as [`KvError::Failed`].
pub struct KvClient<R: RemoteStore = HttpRemote> {
  remote: R,
  local: LocalStore,
  connectivity: Mutex<ConnectivityTracker>,
  notifier: Mutex<FailureNotifier>,
}

impl KvClient<HttpRemote> {
  /// Build a client from configuration, reading the token from the environment.
  pub fn from_config(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    let remote = HttpRemote::new(&config.remote.url, token, config.remote_settings())
      .map_err(|e| eyre!("Failed to create remote kv client: {}", e))?;

    let path = match &config.local.path {
      Some(p) => p.clone(),
      None => LocalStore::default_path().ok_or_else(|| eyre!("Could not determine data directory"))?,
    };
    let local = LocalStore::open(&path, config.local_settings())
      .map_err(|e| eyre!("Failed to open local store at {}: {}", path.display(), e))?;

    Ok(Self::new(
      remote,
      local,
      ClientOptions {
        probe_cooldown: config.probe_cooldown(),
        notify_cooldown: config.notify_cooldown(),
      },
    ))
  }
}

impl<R: RemoteStore> KvClient<R> {
  pub fn new(remote: R, local: LocalStore, options: ClientOptions) -> Self {
    Self {
      remote,
      local,
      connectivity: Mutex::new(ConnectivityTracker::new(options.probe_cooldown)),
      notifier: Mutex::new(FailureNotifier::new(options.notify_cooldown)),
    }
  }

  pub fn remote(&self) -> &R {
    &self.remote
  }

  pub fn local(&self) -> &LocalStore {
    &self.local
  }

  // State is only touched between awaits, so a poisoned lock still holds consistent data
  fn tracker(&self) -> MutexGuard<'_, ConnectivityTracker> {
    self
      .connectivity
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
  }

  fn notifier(&self) -> MutexGuard<'_, FailureNotifier> {
    self.notifier.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Record a reachability observation and log mode flips.
  fn observe(&self, available: bool) {
    let transition = self.tracker().record(available, Instant::now());
    log_transition(transition);
  }

  /// Whether the remote store should be tried, probing at most once per cooldown.
  pub async fn is_remote_available(&self) -> bool {
    let cached = self.tracker().cached(Instant::now());
    if let Some(available) = cached {
      return available;
    }

    let available = match self.remote.ping().await {
      Ok(()) => true,
      Err(e) => {
        debug!(error = %e, "remote kv probe failed");
        false
      }
    };
    self.observe(available);
    available
  }

  /// Run `remote` if the remote store looks reachable, otherwise (or on failure) `local`.
  async fn run<T>(
    &self,
    operation: &'static str,
    remote: impl Future<Output = Result<T, RemoteError>>,
    local: impl FnOnce(&LocalStore) -> Result<T, LocalError>,
  ) -> KvResult<T> {
    let remote_result = if self.is_remote_available().await {
      remote.await
    } else {
      Err(RemoteError::Unavailable)
    };

    match remote_result {
      Ok(value) => {
        self.on_remote_success();
        Ok(value)
      }
      Err(remote_err) => self.fall_back(operation, remote_err, local),
    }
  }

  fn on_remote_success(&self) {
    self.observe(true);
    if self.tracker().clear_degraded() {
      info!("remote kv store recovered, serving from server again");
      self.notifier().reset();
    }
  }

  fn fall_back<T>(
    &self,
    operation: &'static str,
    remote_err: RemoteError,
    local: impl FnOnce(&LocalStore) -> Result<T, LocalError>,
  ) -> KvResult<T> {
    if !matches!(remote_err, RemoteError::Unavailable) {
      debug!(operation, error = %remote_err, "remote kv operation failed");
      self.observe(false);
    }

    match local(&self.local) {
      Ok(value) => {
        self.tracker().mark_degraded();
        if self.notifier().should_notify(operation, Instant::now()) {
          info!(operation, reason = %remote_err, "remote kv store unavailable, operating locally");
        }
        Ok(value)
      }
      Err(source) => {
        warn!(
          operation,
          remote_error = %remote_err,
          local_error = %source,
          "kv operation failed on both remote and local storage"
        );
        Err(KvError::Failed { operation, source })
      }
    }
  }

  pub async fn set(&self, key: &str, value: &Value) -> KvResult<()> {
    validate_key(key)?;
    self
      .run("set", self.remote.set(key, value), |local| local.set(key, value))
      .await
  }

  /// Serialize `value` to JSON and store it.
  pub async fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> KvResult<()> {
    let value = serde_json::to_value(value).map_err(KvError::Encode)?;
    self.set(key, &value).await
  }

  pub async fn get(&self, key: &str) -> KvResult<Option<Value>> {
    validate_key(key)?;
    self
      .run("get", self.remote.get(key), |local| local.get(key))
      .await
  }

  /// Fetch `key` and deserialize it into `T`.
  pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>> {
    self
      .get(key)
      .await?
      .map(|value| serde_json::from_value(value).map_err(KvError::Decode))
      .transpose()
  }

  pub async fn del(&self, key: &str) -> KvResult<()> {
    validate_key(key)?;
    self
      .run("del", self.remote.del(key), |local| local.del(key))
      .await
  }

  pub async fn mset(&self, keys: &[String], values: &[Value]) -> KvResult<()> {
    if keys.len() != values.len() {
      return Err(KvError::Validation(format!(
        "mset got {} keys but {} values",
        keys.len(),
        values.len()
      )));
    }
    validate_keys(keys)?;
    if keys.is_empty() {
      return Ok(());
    }

    self
      .run("mset", self.remote.mset(keys, values), |local| {
        local.mset(keys, values)
      })
      .await
  }

  /// Values in the same order as `keys`, `None` for missing keys.
  pub async fn mget(&self, keys: &[String]) -> KvResult<Vec<Option<Value>>> {
    validate_keys(keys)?;
    if keys.is_empty() {
      return Ok(Vec::new());
    }

    self
      .run("mget", self.remote.mget(keys), |local| local.mget(keys))
      .await
  }

  pub async fn mdel(&self, keys: &[String]) -> KvResult<()> {
    validate_keys(keys)?;
    if keys.is_empty() {
      return Ok(());
    }

    self
      .run("mdel", self.remote.mdel(keys), |local| local.mdel(keys))
      .await
  }

  pub async fn get_by_prefix(&self, prefix: &str) -> KvResult<Vec<Value>> {
    self
      .run("getByPrefix", self.remote.get_by_prefix(prefix), |local| {
        local.get_by_prefix(prefix)
      })
      .await
  }

  pub async fn get_stats(&self) -> KvResult<StoreStats> {
    self
      .run("getStats", self.remote.stats(), |local| local.stats())
      .await
  }

  /// Remove keys under `prefix`, or under every known application prefix.
  pub async fn clear(&self, prefix: Option<&str>) -> KvResult<()> {
    self
      .run("clear", self.remote.clear(prefix), |local| {
        local.clear(prefix).map(|removed| {
          debug!(removed, "cleared local kv entries");
        })
      })
      .await
  }

  /// True if the remote answers a fresh probe or the local store passes its self-test.
  pub async fn test_connection(&self) -> bool {
    let available = self.remote.ping().await.is_ok();
    self.observe(available);
    if available {
      return true;
    }

    match self.local.self_test() {
      Ok(()) => true,
      Err(e) => {
        warn!(error = %e, "local kv self-test failed");
        false
      }
    }
  }

  pub fn get_connectivity_status(&self) -> ConnectivityStatus {
    self.tracker().status()
  }
}

fn log_transition(transition: Transition) {
  if !transition.is_change() {
    return;
  }
  match transition.to {
    Mode::Server => info!(from = %transition.from, "remote kv store reachable"),
    Mode::Local => info!(from = %transition.from, "remote kv store unreachable, using local storage"),
    Mode::Unknown => {}
  }
}

fn validate_key(key: &str) -> KvResult<()> {
  if key.is_empty() {
    return Err(KvError::Validation("key must not be empty".to_string()));
  }
  Ok(())
}

fn validate_keys(keys: &[String]) -> KvResult<()> {
  keys.iter().try_for_each(|key| validate_key(key))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::{LocalSettings, DEFAULT_PREFIXES};
  use serde::Deserialize;
  use serde_json::json;
  use std::collections::BTreeMap;
  use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

  /// In-process remote with switchable failures and call counters.
  #[derive(Default)]
  struct FakeRemote {
    data: Mutex<BTreeMap<String, Value>>,
    ping_fails: AtomicBool,
    ops_fail: AtomicBool,
    pings: AtomicUsize,
    ops: AtomicUsize,
  }

  impl FakeRemote {
    fn set_down(&self, down: bool) {
      self.ping_fails.store(down, Ordering::SeqCst);
      self.ops_fail.store(down, Ordering::SeqCst);
    }

    fn pings(&self) -> usize {
      self.pings.load(Ordering::SeqCst)
    }

    fn ops(&self) -> usize {
      self.ops.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RemoteError> {
      self.ops.fetch_add(1, Ordering::SeqCst);
      if self.ops_fail.load(Ordering::SeqCst) {
        Err(RemoteError::Status { status: 503 })
      } else {
        Ok(())
      }
    }

    fn data(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
      self.data.lock().unwrap()
    }
  }

  impl RemoteStore for FakeRemote {
    async fn ping(&self) -> Result<(), RemoteError> {
      self.pings.fetch_add(1, Ordering::SeqCst);
      if self.ping_fails.load(Ordering::SeqCst) {
        Err(RemoteError::Timeout(Duration::from_secs(3)))
      } else {
        Ok(())
      }
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, RemoteError> {
      self.check()?;
      Ok(self.data().get(key).filter(|v| !v.is_null()).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), RemoteError> {
      self.check()?;
      self.data().insert(key.to_string(), value.clone());
      Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), RemoteError> {
      self.check()?;
      self.data().remove(key);
      Ok(())
    }

    async fn mset(&self, keys: &[String], values: &[Value]) -> Result<(), RemoteError> {
      self.check()?;
      let mut data = self.data();
      for (k, v) in keys.iter().zip(values) {
        data.insert(k.clone(), v.clone());
      }
      Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Value>>, RemoteError> {
      self.check()?;
      let data = self.data();
      Ok(
        keys
          .iter()
          .map(|k| data.get(k).filter(|v| !v.is_null()).cloned())
          .collect(),
      )
    }

    async fn mdel(&self, keys: &[String]) -> Result<(), RemoteError> {
      self.check()?;
      let mut data = self.data();
      for k in keys {
        data.remove(k);
      }
      Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, RemoteError> {
      self.check()?;
      Ok(
        self
          .data()
          .iter()
          .filter(|(k, v)| k.starts_with(prefix) && !v.is_null())
          .map(|(_, v)| v.clone())
          .collect(),
      )
    }

    async fn stats(&self) -> Result<StoreStats, RemoteError> {
      self.check()?;
      let data = self.data();
      let mut stats = StoreStats::default();
      for prefix in DEFAULT_PREFIXES {
        let count = data.keys().filter(|k| k.starts_with(prefix)).count() as u64;
        stats.total_keys += count;
        stats.prefixes.insert(prefix.to_string(), count);
      }
      Ok(stats)
    }

    async fn clear(&self, prefix: Option<&str>) -> Result<(), RemoteError> {
      self.check()?;
      let mut data = self.data();
      match prefix {
        Some(p) => data.retain(|k, _| !k.starts_with(p)),
        None => data.retain(|k, _| !DEFAULT_PREFIXES.iter().any(|p| k.starts_with(p))),
      }
      Ok(())
    }
  }

  fn client_with(options: ClientOptions, settings: LocalSettings) -> KvClient<FakeRemote> {
    KvClient::new(
      FakeRemote::default(),
      LocalStore::open_in_memory(settings).unwrap(),
      options,
    )
  }

  fn client() -> KvClient<FakeRemote> {
    client_with(ClientOptions::default(), LocalSettings::default())
  }

  /// Client whose probe result is never cached, so every call re-probes.
  fn uncached_client() -> KvClient<FakeRemote> {
    client_with(
      ClientOptions {
        probe_cooldown: Duration::ZERO,
        ..ClientOptions::default()
      },
      LocalSettings::default(),
    )
  }

  fn offline_client() -> KvClient<FakeRemote> {
    let client = client();
    client.remote().set_down(true);
    client
  }

  fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|k| k.to_string()).collect()
  }

  #[tokio::test]
  async fn test_set_get_roundtrip_both_modes() {
    let value = json!({"callsign": "F-HCTA", "legs": [1, 2], "crew": {"captain": "Jean"}});

    let online = client();
    online.set("crewtech:missions:1", &value).await.unwrap();
    assert_eq!(online.get("crewtech:missions:1").await.unwrap(), Some(value.clone()));
    assert_eq!(online.local().get("crewtech:missions:1").unwrap(), None);
    assert_eq!(online.get_connectivity_status().mode, Mode::Server);

    let offline = offline_client();
    offline.set("crewtech:missions:1", &value).await.unwrap();
    assert_eq!(offline.get("crewtech:missions:1").await.unwrap(), Some(value));
    assert!(offline.remote().data().is_empty());
    assert_eq!(offline.get_connectivity_status().mode, Mode::Local);
  }

  #[tokio::test]
  async fn test_missing_and_deleted_keys_are_none() {
    for client in [client(), offline_client()] {
      assert_eq!(client.get("crewtech:crew:never").await.unwrap(), None);

      client.set("crewtech:crew:1", &json!(1)).await.unwrap();
      client.del("crewtech:crew:1").await.unwrap();
      assert_eq!(client.get("crewtech:crew:1").await.unwrap(), None);
    }
  }

  #[tokio::test]
  async fn test_null_value_reads_as_none_in_both_modes() {
    for client in [client(), offline_client()] {
      let ks = keys(&["crewtech:crew:1"]);
      client.set("crewtech:crew:1", &Value::Null).await.unwrap();
      assert_eq!(client.get("crewtech:crew:1").await.unwrap(), None);
      assert_eq!(client.mget(&ks).await.unwrap(), vec![None]);
    }
  }

  #[tokio::test]
  async fn test_mset_mget_order() {
    for client in [client(), offline_client()] {
      let ks = keys(&["crewtech:crew:1", "crewtech:crew:2"]);
      client
        .mset(&ks, &[json!({"name": "A"}), json!({"name": "B"})])
        .await
        .unwrap();
      assert_eq!(
        client.mget(&ks).await.unwrap(),
        vec![Some(json!({"name": "A"})), Some(json!({"name": "B"}))]
      );

      client.mdel(&ks).await.unwrap();
      assert_eq!(client.mget(&ks).await.unwrap(), vec![None, None]);
    }
  }

  #[tokio::test]
  async fn test_mset_length_mismatch_fails_before_io() {
    let client = client();
    let err = client
      .mset(&keys(&["crewtech:crew:1", "crewtech:crew:2"]), &[json!(1)])
      .await
      .unwrap_err();

    assert!(matches!(err, KvError::Validation(_)));
    assert_eq!(client.remote().pings(), 0);
    assert_eq!(client.remote().ops(), 0);
    assert!(client.remote().data().is_empty());
    assert_eq!(client.local().get("crewtech:crew:1").unwrap(), None);
    assert_eq!(client.get_connectivity_status().mode, Mode::Unknown);
  }

  #[tokio::test]
  async fn test_empty_key_rejected() {
    let client = client();
    assert!(matches!(
      client.get("").await,
      Err(KvError::Validation(_))
    ));
    assert_eq!(client.remote().pings(), 0);
  }

  #[tokio::test]
  async fn test_empty_batches_skip_io() {
    let client = client();
    assert!(client.mget(&[]).await.unwrap().is_empty());
    client.mset(&[], &[]).await.unwrap();
    client.mdel(&[]).await.unwrap();
    assert_eq!(client.remote().pings(), 0);
  }

  #[tokio::test]
  async fn test_mode_follows_latest_outcome() {
    let client = uncached_client();
    assert_eq!(client.get_connectivity_status().mode, Mode::Unknown);

    client.remote().set_down(true);
    assert!(!client.is_remote_available().await);
    assert_eq!(client.get_connectivity_status().mode, Mode::Local);
    assert_eq!(client.get_connectivity_status().server_available, Some(false));

    client.remote().set_down(false);
    client.set("crewtech:crew:1", &json!(1)).await.unwrap();
    let status = client.get_connectivity_status();
    assert_eq!(status.mode, Mode::Server);
    assert!(status.last_check.is_some());
  }

  #[tokio::test]
  async fn test_failed_probes_are_cached() {
    let client = offline_client();
    for i in 0..5 {
      client
        .set(&format!("crewtech:crew:{}", i), &json!(i))
        .await
        .unwrap();
      client.get("crewtech:crew:0").await.unwrap();
    }

    assert_eq!(client.remote().pings(), 1);
    assert_eq!(client.remote().ops(), 0);
  }

  #[tokio::test]
  async fn test_successful_probe_is_cached() {
    let client = client();
    client.set("crewtech:crew:1", &json!(1)).await.unwrap();
    client.get("crewtech:crew:1").await.unwrap();
    client.del("crewtech:crew:1").await.unwrap();

    assert_eq!(client.remote().pings(), 1);
    assert_eq!(client.remote().ops(), 3);
  }

  #[tokio::test]
  async fn test_remote_operation_failure_falls_back() {
    let client = client();
    client.remote().ops_fail.store(true, Ordering::SeqCst);

    client.set("crewtech:crew:1", &json!("local")).await.unwrap();
    assert_eq!(client.local().get("crewtech:crew:1").unwrap(), Some(json!("local")));
    assert_eq!(client.get_connectivity_status().mode, Mode::Local);
    assert!(client.tracker().is_degraded());

    // The failure is cached, so the next call goes straight to local storage
    assert_eq!(client.get("crewtech:crew:1").await.unwrap(), Some(json!("local")));
    assert_eq!(client.remote().ops(), 1);
  }

  #[tokio::test]
  async fn test_recovery_clears_degraded() {
    let client = uncached_client();
    client.remote().set_down(true);
    client.set("crewtech:crew:1", &json!(1)).await.unwrap();
    assert!(client.tracker().is_degraded());

    client.remote().set_down(false);
    client.get("crewtech:crew:1").await.unwrap();
    assert!(!client.tracker().is_degraded());
    assert_eq!(client.get_connectivity_status().mode, Mode::Server);
  }

  #[tokio::test]
  async fn test_local_writes_are_not_migrated() {
    let client = uncached_client();
    client.remote().set_down(true);
    client.set("crewtech:crew:7", &json!("offline")).await.unwrap();

    client.remote().set_down(false);
    assert_eq!(client.get("crewtech:crew:7").await.unwrap(), None);
    assert_eq!(
      client.local().get("crewtech:crew:7").unwrap(),
      Some(json!("offline"))
    );
  }

  #[tokio::test]
  async fn test_get_by_prefix_isolates_prefixes() {
    for client in [client(), offline_client()] {
      client.set("crewtech:missions:1", &json!({"id": 1})).await.unwrap();
      client.set("crewtech:missions:2", &json!({"id": 2})).await.unwrap();
      client.set("crewtech:crew:1", &json!({"id": "c1"})).await.unwrap();

      let mut missions = client.get_by_prefix("crewtech:missions:").await.unwrap();
      missions.sort_by_key(|v| v["id"].as_i64());
      assert_eq!(missions, vec![json!({"id": 1}), json!({"id": 2})]);
    }
  }

  #[tokio::test]
  async fn test_clear_prefix_and_all() {
    for client in [client(), offline_client()] {
      client.set("crewtech:missions:1", &json!(1)).await.unwrap();
      client.set("crewtech:crew:1", &json!(2)).await.unwrap();

      client.clear(Some("crewtech:missions:")).await.unwrap();
      assert_eq!(client.get("crewtech:missions:1").await.unwrap(), None);
      assert_eq!(client.get("crewtech:crew:1").await.unwrap(), Some(json!(2)));

      client.clear(None).await.unwrap();
      assert_eq!(client.get("crewtech:crew:1").await.unwrap(), None);

      // Already empty
      client.clear(None).await.unwrap();
    }
  }

  #[tokio::test]
  async fn test_stats_both_modes() {
    for client in [client(), offline_client()] {
      client.set("crewtech:missions:1", &json!(1)).await.unwrap();
      client.set("crewtech:notifications:1", &json!(2)).await.unwrap();

      let stats = client.get_stats().await.unwrap();
      assert_eq!(stats.total_keys, 2);
      assert_eq!(stats.prefixes.get("crewtech:missions:"), Some(&1));
    }
  }

  #[tokio::test]
  async fn test_double_failure_surfaces_local_reason() {
    let client = client_with(
      ClientOptions::default(),
      LocalSettings {
        quota_bytes: Some(8),
        ..LocalSettings::default()
      },
    );
    client.remote().set_down(true);

    let err = client
      .set("crewtech:crew:1", &json!({"name": "Jean"}))
      .await
      .unwrap_err();
    match err {
      KvError::Failed { operation, source } => {
        assert_eq!(operation, "set");
        assert!(matches!(source, LocalError::QuotaExceeded { .. }));
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_test_connection() {
    let client = client();
    assert!(client.test_connection().await);
    assert_eq!(client.get_connectivity_status().mode, Mode::Server);

    let client = offline_client();
    assert!(client.test_connection().await);
    assert_eq!(client.get_connectivity_status().mode, Mode::Local);
  }

  #[tokio::test]
  async fn test_typed_helpers() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct CrewMember {
      name: String,
      base: String,
    }

    let client = offline_client();
    let jean = CrewMember {
      name: "Jean".to_string(),
      base: "LFPG".to_string(),
    };
    client.set_as("crewtech:crew:1", &jean).await.unwrap();
    assert_eq!(
      client.get_as::<CrewMember>("crewtech:crew:1").await.unwrap(),
      Some(jean)
    );

    client.set("crewtech:crew:2", &json!(42)).await.unwrap();
    assert!(matches!(
      client.get_as::<CrewMember>("crewtech:crew:2").await,
      Err(KvError::Decode(_))
    ));
  }

  #[tokio::test]
  async fn test_outage_scenario() {
    let client = client();
    client.remote().set_down(true);

    client
      .set("crewtech:crew:1", &json!({"name": "Jean"}))
      .await
      .unwrap();
    assert_eq!(
      client.get("crewtech:crew:1").await.unwrap(),
      Some(json!({"name": "Jean"}))
    );
    assert_eq!(client.get_connectivity_status().mode, Mode::Local);
  }
}
