//! Item entity.

use serde::Deserialize;

use crate::census::Query;
use crate::client::Client;
use crate::error::Result;
use crate::proxy::InstanceProxy;
use crate::ps2::{
  localized_name_filter, opt_string_as_u64, string_as_bool, string_as_u64, Faction,
  HasLocalizedName, LocaleData, Named, Ps2Object,
};

/// A weapon, attachment, cosmetic or other inventory item.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
  #[serde(deserialize_with = "string_as_u64")]
  pub item_id: u64,
  #[serde(default, deserialize_with = "opt_string_as_u64")]
  pub item_type_id: Option<u64>,
  #[serde(default, deserialize_with = "opt_string_as_u64")]
  pub item_category_id: Option<u64>,
  #[serde(deserialize_with = "string_as_bool")]
  pub is_vehicle_weapon: bool,
  #[serde(default)]
  pub name: LocaleData,
  #[serde(default)]
  pub description: LocaleData,
  // NS items carry no faction
  #[serde(default, deserialize_with = "opt_string_as_u64")]
  pub faction_id: Option<u64>,
  #[serde(deserialize_with = "string_as_u64")]
  pub max_stack_size: u64,
}

impl Item {
  /// The faction this item is restricted to, if any.
  pub fn faction(&self, client: &Client) -> Option<InstanceProxy<Faction>> {
    self
      .faction_id
      .map(|id| InstanceProxy::new(client.factions.clone(), id))
  }
}

impl Ps2Object for Item {
  const COLLECTION: &'static str = "item";
  const ID_FIELD: &'static str = "item_id";

  fn id(&self) -> u64 {
    self.item_id
  }
}

impl HasLocalizedName for Item {
  fn locale_name(&self) -> &LocaleData {
    &self.name
  }
}

impl Named for Item {
  fn name(&self) -> &str {
    self.locale_name().en()
  }

  fn name_filter(query: &mut Query, name: &str) -> Result<()> {
    localized_name_filter(query, name)
  }
}
