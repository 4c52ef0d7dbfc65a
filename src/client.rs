//! Census API client and the pluggable HTTP transport boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::census::Query;
use crate::config::Config;
use crate::error::Result;
use crate::ps2::{Character, Faction, Item, Outfit, Title, World, Zone};
use crate::repository::Repository;

/// Pluggable fetch boundary: executes a serialized query string and returns
/// the raw records for `collection`.
///
/// An empty result is `Ok(vec![])`, never an error. Transport failures are
/// propagated opaquely; the core does not interpret them.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn fetch(&self, query: &str, collection: &str) -> Result<Vec<Value>>;
}

/// HTTP transport for the live Census endpoint.
///
/// Requests go to `{base}/s:{service_id}/get/{namespace}/{query}`. The
/// service id is an opaque token passed through as part of the path.
pub struct CensusRest {
  http: reqwest::Client,
  base_url: String,
  service_id: String,
  namespace: String,
}

impl CensusRest {
  pub fn new(config: &Config) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: config.rest_endpoint.trim_end_matches('/').to_string(),
      service_id: config.service_id.clone(),
      namespace: config.namespace.clone(),
    }
  }

  fn url_for(&self, query: &str) -> String {
    format!(
      "{}/s:{}/get/{}/{}",
      self.base_url, self.service_id, self.namespace, query
    )
  }
}

#[async_trait]
impl Transport for CensusRest {
  async fn fetch(&self, query: &str, collection: &str) -> Result<Vec<Value>> {
    let url = self.url_for(query);
    debug!(%url, "census request");

    let body: Value = self
      .http
      .get(&url)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    // Responses wrap the records in "{collection}_list"
    let list_key = format!("{}_list", collection);
    let list = body
      .get(list_key.as_str())
      .and_then(Value::as_array)
      .cloned()
      .unwrap_or_default();
    debug!(collection, returned = list.len(), "census response");
    Ok(list)
  }
}

/// Client bundling the transport with one repository (cache included) per
/// entity type.
///
/// The registry is explicit: every repository owns its own cache with its own
/// capacity and TTL, configured here. Cloning shares the transport and all
/// caches.
#[derive(Clone)]
pub struct Client {
  transport: Arc<dyn Transport>,
  pub characters: Repository<Character>,
  pub titles: Repository<Title>,
  pub factions: Repository<Faction>,
  pub items: Repository<Item>,
  pub outfits: Repository<Outfit>,
  pub worlds: Repository<World>,
  pub zones: Repository<Zone>,
}

impl Client {
  /// Create a client against the live Census endpoint.
  pub fn new(config: &Config) -> Self {
    Self::with_transport(Arc::new(CensusRest::new(config)))
  }

  /// Create a client over a custom transport. This is the seam tests use to
  /// substitute a canned fetch function.
  pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
    let t = &transport;
    // Capacity and TTL tuned per collection: characters change often and are
    // numerous, static data (factions, zones) barely changes at all.
    Self {
      characters: Repository::new(Arc::clone(t), 256, Duration::from_secs(30)),
      titles: Repository::new(Arc::clone(t), 300, Duration::from_secs(300)),
      factions: Repository::new(Arc::clone(t), 10, Duration::from_secs(3600)),
      items: Repository::new(Arc::clone(t), 1024, Duration::from_secs(3600)),
      outfits: Repository::new(Arc::clone(t), 100, Duration::from_secs(300)),
      worlds: Repository::new(Arc::clone(t), 25, Duration::from_secs(3600)),
      zones: Repository::new(Arc::clone(t), 32, Duration::from_secs(3600)),
      transport,
    }
  }

  /// The transport behind this client.
  pub fn transport(&self) -> Arc<dyn Transport> {
    Arc::clone(&self.transport)
  }

  /// Execute an arbitrary query and return the raw records. Bypasses the
  /// per-type caches.
  pub async fn run(&self, query: &Query) -> Result<Vec<Value>> {
    self
      .transport
      .fetch(&query.serialize(), query.collection())
      .await
  }
}
