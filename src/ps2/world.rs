//! World (server) entity.

use serde::Deserialize;

use crate::census::Query;
use crate::error::Result;
use crate::ps2::{
  localized_name_filter, string_as_u64, HasLocalizedName, LocaleData, Named, Ps2Object,
};

/// A game server.
#[derive(Debug, Clone, Deserialize)]
pub struct World {
  #[serde(deserialize_with = "string_as_u64")]
  pub world_id: u64,
  /// Server state as reported by the API, e.g. "online" or "locked".
  #[serde(default)]
  pub state: String,
  pub name: LocaleData,
}

impl Ps2Object for World {
  const COLLECTION: &'static str = "world";
  const ID_FIELD: &'static str = "world_id";

  fn id(&self) -> u64 {
    self.world_id
  }
}

impl HasLocalizedName for World {
  fn locale_name(&self) -> &LocaleData {
    &self.name
  }
}

impl Named for World {
  fn name(&self) -> &str {
    self.locale_name().en()
  }

  fn name_filter(query: &mut Query, name: &str) -> Result<()> {
    localized_name_filter(query, name)
  }
}
