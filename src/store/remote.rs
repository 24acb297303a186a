//! Remote store backed by the KV Edge Function.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::types::{Envelope, StoreStats};
use crate::error::RemoteError;

type Result<T> = std::result::Result<T, RemoteError>;

/// Operations the orchestrator can run against the remote service.
pub trait RemoteStore: Send + Sync {
  /// Lightweight reachability check.
  fn ping(&self) -> impl Future<Output = Result<()>> + Send;

  /// `Ok(None)` when the key does not exist.
  fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>>> + Send;

  fn set(&self, key: &str, value: &Value) -> impl Future<Output = Result<()>> + Send;

  fn del(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

  fn mset(&self, keys: &[String], values: &[Value]) -> impl Future<Output = Result<()>> + Send;

  fn mget(&self, keys: &[String]) -> impl Future<Output = Result<Vec<Option<Value>>>> + Send;

  fn mdel(&self, keys: &[String]) -> impl Future<Output = Result<()>> + Send;

  fn get_by_prefix(&self, prefix: &str) -> impl Future<Output = Result<Vec<Value>>> + Send;

  fn stats(&self) -> impl Future<Output = Result<StoreStats>> + Send;

  fn clear(&self, prefix: Option<&str>) -> impl Future<Output = Result<()>> + Send;
}

/// Timeouts for [`HttpRemote`].
#[derive(Debug, Clone, Copy)]
pub struct RemoteSettings {
  pub probe_timeout: Duration,
  pub request_timeout: Duration,
}

impl Default for RemoteSettings {
  fn default() -> Self {
    Self {
      probe_timeout: Duration::from_secs(3),
      request_timeout: Duration::from_secs(10),
    }
  }
}

/// HTTP client for the KV Edge Function.
#[derive(Clone)]
pub struct HttpRemote {
  client: reqwest::Client,
  base: Url,
  token: String,
  settings: RemoteSettings,
}

impl HttpRemote {
  pub fn new(base_url: &str, token: impl Into<String>, settings: RemoteSettings) -> Result<Self> {
    // A trailing slash makes `join` append instead of replacing the last segment
    let normalized = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };
    let base = Url::parse(&normalized).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;

    let client = reqwest::Client::builder()
      .build()
      .map_err(RemoteError::Transport)?;

    Ok(Self {
      client,
      base,
      token: token.into(),
      settings,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| RemoteError::InvalidUrl(e.to_string()))
  }

  /// Send one request and unwrap the `{success, data, error}` envelope.
  async fn call<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<Option<T>>
  where
    T: DeserializeOwned + Send,
  {
    let url = self.endpoint(path)?;
    let timeout = self.settings.request_timeout;
    debug!(%method, %url, "remote kv request");

    let mut request = self
      .client
      .request(method, url)
      .bearer_auth(&self.token)
      .header(CONTENT_TYPE, "application/json")
      .timeout(timeout);
    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request
      .send()
      .await
      .map_err(|e| RemoteError::from_reqwest(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
      return Err(RemoteError::Status {
        status: status.as_u16(),
      });
    }

    let envelope: Envelope<T> = response
      .json()
      .await
      .map_err(|e| RemoteError::from_reqwest(e, timeout))?;

    if !envelope.success {
      return Err(RemoteError::Application {
        message: envelope
          .error
          .unwrap_or_else(|| "request failed without an error message".to_string()),
      });
    }

    Ok(envelope.data)
  }

  async fn call_required<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
  where
    T: DeserializeOwned + Send,
  {
    self
      .call(method, path, body)
      .await?
      .ok_or_else(|| RemoteError::Decode(format!("`{}` response carried no data", path)))
  }
}

impl RemoteStore for HttpRemote {
  async fn ping(&self) -> Result<()> {
    let url = self.endpoint("ping")?;
    let timeout = self.settings.probe_timeout;

    let response = self
      .client
      .get(url)
      .bearer_auth(&self.token)
      .header(CONTENT_TYPE, "application/json")
      .timeout(timeout)
      .send()
      .await
      .map_err(|e| RemoteError::from_reqwest(e, timeout))?;

    let status = response.status();
    if status.is_success() {
      Ok(())
    } else {
      Err(RemoteError::Status {
        status: status.as_u16(),
      })
    }
  }

  async fn get(&self, key: &str) -> Result<Option<Value>> {
    match self
      .call::<Value>(Method::POST, "get", Some(json!({ "key": key })))
      .await
    {
      Ok(Some(Value::Null)) | Ok(None) => Ok(None),
      Ok(Some(value)) => Ok(Some(value)),
      Err(RemoteError::Status { status }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn set(&self, key: &str, value: &Value) -> Result<()> {
    self
      .call::<Value>(Method::POST, "set", Some(json!({ "key": key, "value": value })))
      .await?;
    Ok(())
  }

  async fn del(&self, key: &str) -> Result<()> {
    self
      .call::<Value>(Method::POST, "delete", Some(json!({ "key": key })))
      .await?;
    Ok(())
  }

  async fn mset(&self, keys: &[String], values: &[Value]) -> Result<()> {
    self
      .call::<Value>(
        Method::POST,
        "mset",
        Some(json!({ "keys": keys, "values": values })),
      )
      .await?;
    Ok(())
  }

  async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Value>>> {
    let values: Vec<Value> = self
      .call_required(Method::POST, "mget", Some(json!({ "keys": keys })))
      .await?;

    if values.len() != keys.len() {
      return Err(RemoteError::Decode(format!(
        "mget returned {} values for {} keys",
        values.len(),
        keys.len()
      )));
    }

    Ok(
      values
        .into_iter()
        .map(|v| if v.is_null() { None } else { Some(v) })
        .collect(),
    )
  }

  async fn mdel(&self, keys: &[String]) -> Result<()> {
    self
      .call::<Value>(Method::POST, "mdel", Some(json!({ "keys": keys })))
      .await?;
    Ok(())
  }

  async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
    let values: Option<Vec<Value>> = self
      .call(Method::POST, "prefix", Some(json!({ "prefix": prefix })))
      .await?;
    Ok(values.unwrap_or_default())
  }

  async fn stats(&self) -> Result<StoreStats> {
    self.call_required(Method::GET, "stats", None).await
  }

  async fn clear(&self, prefix: Option<&str>) -> Result<()> {
    self
      .call::<Value>(Method::POST, "clear", Some(json!({ "prefix": prefix })))
      .await?;
    Ok(())
  }
}
