//! Faction entity.

use serde::Deserialize;

use crate::census::Query;
use crate::error::Result;
use crate::ps2::{
  localized_name_filter, string_as_bool, string_as_u64, HasLocalizedName, LocaleData, Named,
  Ps2Object,
};

/// One of the game's factions. Static data; a handful of rows that almost
/// never change.
#[derive(Debug, Clone, Deserialize)]
pub struct Faction {
  #[serde(deserialize_with = "string_as_u64")]
  pub faction_id: u64,
  pub name: LocaleData,
  pub code_tag: String,
  #[serde(deserialize_with = "string_as_bool")]
  pub user_selectable: bool,
}

impl Faction {
  /// Short tag shown next to player names (e.g. "VS").
  pub fn tag(&self) -> &str {
    &self.code_tag
  }
}

impl Ps2Object for Faction {
  const COLLECTION: &'static str = "faction";
  const ID_FIELD: &'static str = "faction_id";

  fn id(&self) -> u64 {
    self.faction_id
  }
}

impl HasLocalizedName for Faction {
  fn locale_name(&self) -> &LocaleData {
    &self.name
  }
}

impl Named for Faction {
  fn name(&self) -> &str {
    self.locale_name().en()
  }

  fn name_filter(query: &mut Query, name: &str) -> Result<()> {
    localized_name_filter(query, name)
  }
}
