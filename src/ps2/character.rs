//! Character and title entities.

use serde::Deserialize;

use crate::census::Query;
use crate::client::Client;
use crate::error::Result;
use crate::proxy::InstanceProxy;
use crate::ps2::{
  localized_name_filter, string_as_f64, string_as_u64, HasLocalizedName, LocaleData, Named,
  Ps2Object,
};

/// A title selectable by a character.
#[derive(Debug, Clone, Deserialize)]
pub struct Title {
  #[serde(deserialize_with = "string_as_u64")]
  pub title_id: u64,
  pub name: LocaleData,
}

impl Ps2Object for Title {
  const COLLECTION: &'static str = "title";
  const ID_FIELD: &'static str = "title_id";

  fn id(&self) -> u64 {
    self.title_id
  }
}

impl HasLocalizedName for Title {
  fn locale_name(&self) -> &LocaleData {
    &self.name
  }
}

impl Named for Title {
  fn name(&self) -> &str {
    self.locale_name().en()
  }

  fn name_filter(query: &mut Query, name: &str) -> Result<()> {
    localized_name_filter(query, name)
  }
}

/// A player-controlled fighter.
#[derive(Debug, Clone, Deserialize)]
pub struct Character {
  #[serde(deserialize_with = "string_as_u64")]
  pub character_id: u64,
  pub name: CharacterName,
  #[serde(deserialize_with = "string_as_u64")]
  pub faction_id: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub head_id: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub title_id: u64,
  pub times: Times,
  pub certs: Certs,
  pub battle_rank: BattleRank,
  #[serde(deserialize_with = "string_as_u64")]
  pub profile_id: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub prestige_level: u64,
}

/// The "name" sub-key. Character names are not localized.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterName {
  pub first: String,
  pub first_lower: String,
}

/// The "times" sub-key.
#[derive(Debug, Clone, Deserialize)]
pub struct Times {
  #[serde(deserialize_with = "string_as_u64")]
  pub creation: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub last_save: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub last_login: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub login_count: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub minutes_played: u64,
}

/// The "certs" sub-key.
#[derive(Debug, Clone, Deserialize)]
pub struct Certs {
  #[serde(deserialize_with = "string_as_u64")]
  pub earned_points: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub gifted_points: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub spent_points: u64,
  #[serde(deserialize_with = "string_as_u64")]
  pub available_points: u64,
  #[serde(deserialize_with = "string_as_f64")]
  pub percent_to_next: f64,
}

/// The "battle_rank" sub-key.
#[derive(Debug, Clone, Deserialize)]
pub struct BattleRank {
  #[serde(deserialize_with = "string_as_u64")]
  pub value: u64,
  #[serde(deserialize_with = "string_as_f64")]
  pub percent_to_next: f64,
}

impl Ps2Object for Character {
  const COLLECTION: &'static str = "character";
  const ID_FIELD: &'static str = "character_id";

  fn id(&self) -> u64 {
    self.character_id
  }
}

impl Named for Character {
  /// The capitalized in-game name.
  fn name(&self) -> &str {
    &self.name.first
  }

  fn name_filter(query: &mut Query, name: &str) -> Result<()> {
    // Character names are indexed lowercase, so the lookup is always
    // case-insensitive
    query.filter("name.first_lower", name.to_lowercase())?;
    Ok(())
  }
}

impl Character {
  /// The character's faction.
  pub fn faction(&self, client: &Client) -> InstanceProxy<crate::ps2::Faction> {
    InstanceProxy::new(client.factions.clone(), self.faction_id)
  }

  /// The character's selected title, if any.
  pub fn title(&self, client: &Client) -> Option<InstanceProxy<Title>> {
    if self.title_id == 0 {
      return None;
    }
    Some(InstanceProxy::new(client.titles.clone(), self.title_id))
  }
}
