//! Outfit and outfit membership entities.

use serde::Deserialize;

use crate::census::Query;
use crate::client::Client;
use crate::error::Result;
use crate::proxy::{InstanceProxy, SequenceProxy};
use crate::ps2::{string_as_u64, Character, Named, Ps2Object};

/// A player-run outfit (guild).
#[derive(Debug, Clone, Deserialize)]
pub struct Outfit {
  #[serde(deserialize_with = "string_as_u64")]
  pub outfit_id: u64,
  pub name: String,
  pub name_lower: String,
  pub alias: String,
  pub alias_lower: String,
  #[serde(deserialize_with = "string_as_u64")]
  pub leader_character_id: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub member_count: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub time_created: u64,
}

impl Ps2Object for Outfit {
  const COLLECTION: &'static str = "outfit";
  const ID_FIELD: &'static str = "outfit_id";

  fn id(&self) -> u64 {
    self.outfit_id
  }
}

impl Named for Outfit {
  fn name(&self) -> &str {
    &self.name
  }

  fn name_filter(query: &mut Query, name: &str) -> Result<()> {
    query.filter("name_lower", name.to_lowercase())?;
    Ok(())
  }
}

impl Outfit {
  /// Build the lookup query for an outfit tag (alias). Tags are indexed
  /// lowercase, so this is case-insensitive.
  pub fn alias_query(alias: &str) -> Result<Query> {
    let mut query = Query::new(Self::COLLECTION);
    query.filter("alias_lower", alias.to_lowercase())?.limit(1);
    Ok(query)
  }

  /// The outfit's leader.
  pub fn leader(&self, client: &Client) -> InstanceProxy<Character> {
    InstanceProxy::new(client.characters.clone(), self.leader_character_id)
  }

  /// The outfit's member roster.
  pub fn members(&self, client: &Client) -> Result<SequenceProxy<OutfitMember>> {
    let mut query = Query::new(OutfitMember::COLLECTION);
    query.filter("outfit_id", self.outfit_id)?.limit(5000);
    Ok(SequenceProxy::new(client.transport(), query))
  }
}

/// One row of an outfit's roster.
#[derive(Debug, Clone, Deserialize)]
pub struct OutfitMember {
  #[serde(deserialize_with = "string_as_u64")]
  pub outfit_id: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub character_id: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub member_since: u64,
  #[serde(default)]
  pub rank: String,
  #[serde(default, deserialize_with = "crate::ps2::opt_string_as_u64")]
  pub rank_ordinal: Option<u64>,
}

impl Ps2Object for OutfitMember {
  const COLLECTION: &'static str = "outfit_member";
  const ID_FIELD: &'static str = "character_id";

  fn id(&self) -> u64 {
    self.character_id
  }
}

impl OutfitMember {
  /// The member's character.
  pub fn character(&self, client: &Client) -> InstanceProxy<Character> {
    InstanceProxy::new(client.characters.clone(), self.character_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_outfit_from_census_payload() {
    let outfit: Outfit = serde_json::from_value(serde_json::json!({
      "outfit_id": "37509488620602936",
      "name": "Mums Outfit",
      "name_lower": "mums outfit",
      "alias": "MUMS",
      "alias_lower": "mums",
      "leader_character_id": "5428010618035323201",
      "member_count": "128",
      "time_created": "1356439182"
    }))
    .unwrap();
    assert_eq!(outfit.id(), 37509488620602936);
    assert_eq!(outfit.member_count, 128);
  }

  #[test]
  fn test_alias_query_folds_case() {
    let query = Outfit::alias_query("MUMS").unwrap();
    assert_eq!(query.serialize(), "outfit/?c:limit=1&alias_lower=mums");
  }
}
