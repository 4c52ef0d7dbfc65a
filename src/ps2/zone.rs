//! Zone (continent) entity.

use serde::Deserialize;

use crate::census::Query;
use crate::error::Result;
use crate::ps2::{
  localized_name_filter, string_as_u64, HasLocalizedName, LocaleData, Named, Ps2Object,
};

/// A continent.
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
  #[serde(deserialize_with = "string_as_u64")]
  pub zone_id: u64,
  pub code: String,
  #[serde(deserialize_with = "string_as_u64")]
  pub hex_size: u64,
  pub name: LocaleData,
  #[serde(default)]
  pub description: LocaleData,
}

impl Ps2Object for Zone {
  const COLLECTION: &'static str = "zone";
  const ID_FIELD: &'static str = "zone_id";

  fn id(&self) -> u64 {
    self.zone_id
  }
}

impl HasLocalizedName for Zone {
  fn locale_name(&self) -> &LocaleData {
    &self.name
  }
}

impl Named for Zone {
  fn name(&self) -> &str {
    self.locale_name().en()
  }

  fn name_filter(query: &mut Query, name: &str) -> Result<()> {
    localized_name_filter(query, name)
  }
}
