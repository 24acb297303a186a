//! CLI subcommands and their execution.

use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use crewtech_kv::store::RemoteStore;
use crewtech_kv::KvClient;
use serde_json::{json, Value};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Read one key
  #[command(visible_alias = "g")]
  Get { key: String },

  /// Store a JSON value under a key
  #[command(visible_alias = "s")]
  Set {
    key: String,
    /// JSON value, e.g. '{"name":"Jean"}'
    value: String,
  },

  /// Delete one key
  #[command(visible_aliases = ["d", "delete"])]
  Del { key: String },

  /// Read several keys, in order
  Mget {
    #[arg(required = true)]
    keys: Vec<String>,
  },

  /// Store several KEY=JSON pairs
  Mset {
    #[arg(required = true)]
    pairs: Vec<String>,
  },

  /// Delete several keys
  Mdel {
    #[arg(required = true)]
    keys: Vec<String>,
  },

  /// List values whose key starts with PREFIX
  #[command(visible_alias = "p")]
  Prefix { prefix: String },

  /// Key counts and size per application prefix
  Stats,

  /// Remove keys under a prefix, or under every application prefix
  Clear {
    #[arg(long)]
    prefix: Option<String>,
  },

  /// Check that the remote store or the local store is usable
  Test,

  /// Probe the remote store and show the resulting mode
  Status,
}

/// Parse a value argument as JSON, treating anything unparseable as a plain string.
pub fn parse_value(raw: &str) -> Value {
  serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Split `KEY=JSON` arguments into parallel key and value lists.
pub fn parse_pairs(pairs: &[String]) -> Result<(Vec<String>, Vec<Value>)> {
  let mut keys = Vec::with_capacity(pairs.len());
  let mut values = Vec::with_capacity(pairs.len());

  for pair in pairs {
    let (key, raw) = pair
      .split_once('=')
      .ok_or_else(|| eyre!("Expected KEY=JSON, got '{}'", pair))?;
    keys.push(key.to_string());
    values.push(parse_value(raw));
  }

  Ok((keys, values))
}

/// Run a command and return the JSON to print.
pub async fn execute<R: RemoteStore>(client: &KvClient<R>, command: Command) -> Result<Value> {
  let output = match command {
    Command::Get { key } => client.get(&key).await?.unwrap_or(Value::Null),
    Command::Set { key, value } => {
      client.set(&key, &parse_value(&value)).await?;
      json!({ "ok": true })
    }
    Command::Del { key } => {
      client.del(&key).await?;
      json!({ "ok": true })
    }
    Command::Mget { keys } => {
      let values = client.mget(&keys).await?;
      Value::Array(
        values
          .into_iter()
          .map(|v| v.unwrap_or(Value::Null))
          .collect(),
      )
    }
    Command::Mset { pairs } => {
      let (keys, values) = parse_pairs(&pairs)?;
      client.mset(&keys, &values).await?;
      json!({ "ok": true, "count": keys.len() })
    }
    Command::Mdel { keys } => {
      client.mdel(&keys).await?;
      json!({ "ok": true, "count": keys.len() })
    }
    Command::Prefix { prefix } => Value::Array(client.get_by_prefix(&prefix).await?),
    Command::Stats => serde_json::to_value(client.get_stats().await?)?,
    Command::Clear { prefix } => {
      client.clear(prefix.as_deref()).await?;
      json!({ "ok": true })
    }
    Command::Test => {
      let ok = client.test_connection().await;
      json!({ "ok": ok, "status": client.get_connectivity_status() })
    }
    Command::Status => {
      client.is_remote_available().await;
      serde_json::to_value(client.get_connectivity_status())?
    }
  };

  Ok(output)
}
