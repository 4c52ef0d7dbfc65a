//! Lazy handles for related entities.
//!
//! Relation accessors on entities return proxies instead of fetching
//! eagerly. A proxy holds no memoized result: every [`resolve`] call goes
//! through the repository's fetch-or-cache-hit decision, so the cache is the
//! only memoization boundary.
//!
//! [`resolve`]: InstanceProxy::resolve

use std::sync::Arc;

use crate::census::Query;
use crate::client::Transport;
use crate::error::Result;
use crate::ps2::Ps2Object;
use crate::repository::Repository;

/// Handle to a single related entity, resolved on demand by id.
pub struct InstanceProxy<T: Ps2Object> {
  repository: Repository<T>,
  id: u64,
}

impl<T: Ps2Object> InstanceProxy<T> {
  pub fn new(repository: Repository<T>, id: u64) -> Self {
    Self { repository, id }
  }

  /// The id this proxy points at.
  pub fn id(&self) -> u64 {
    self.id
  }

  /// Fetch the entity, or return it from the repository's cache.
  pub async fn resolve(&self) -> Result<Option<Arc<T>>> {
    self.repository.get_by_id(self.id).await
  }
}

/// Handle to a sequence of related entities, resolved on demand from a
/// prebuilt query. Results are not cached; the query runs on every call.
pub struct SequenceProxy<T: Ps2Object> {
  transport: Arc<dyn Transport>,
  query: Query,
  _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Ps2Object> SequenceProxy<T> {
  pub fn new(transport: Arc<dyn Transport>, query: Query) -> Self {
    Self {
      transport,
      query,
      _marker: std::marker::PhantomData,
    }
  }

  /// Execute the query and map every record into `T`. An empty result is an
  /// empty vector.
  pub async fn resolve(&self) -> Result<Vec<T>> {
    let records = self
      .transport
      .fetch(&self.query.serialize(), self.query.collection())
      .await?;
    records
      .into_iter()
      .map(|record| serde_json::from_value::<T>(record).map_err(Into::into))
      .collect()
  }
}
