//! Typed PlanetSide 2 entities mapped from Census payloads.
//!
//! Every entity mirrors the payload returned by its collection. Census
//! encodes all scalars as strings, so numeric fields use the
//! `deserialize_with` helpers below.

mod character;
mod faction;
mod item;
mod outfit;
mod world;
mod zone;

pub use character::{BattleRank, Certs, Character, CharacterName, Times, Title};
pub use faction::Faction;
pub use item::Item;
pub use outfit::{Outfit, OutfitMember};
pub use world::World;
pub use zone::Zone;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::census::Query;
use crate::error::Result;

/// A data-mapped Census entity backed by a single collection.
pub trait Ps2Object: DeserializeOwned + Send + Sync + 'static {
  /// The collection this entity is fetched from.
  const COLLECTION: &'static str;
  /// The field holding the entity's unique id.
  const ID_FIELD: &'static str;

  /// The entity's unique id.
  fn id(&self) -> u64;
}

/// An entity that can be looked up by name.
pub trait Named: Ps2Object {
  /// The entity's display name.
  fn name(&self) -> &str;

  /// Add the name-lookup filter for this entity type to `query`. Lookups are
  /// case-insensitive.
  fn name_filter(query: &mut Query, name: &str) -> Result<()>;
}

/// Capability trait for entities whose name is a localized string bundle.
///
/// Name lookups for these entities go through the `name.en` field; the
/// relevant types implement this statically instead of being checked against
/// a runtime list.
pub trait HasLocalizedName {
  fn locale_name(&self) -> &LocaleData;
}

/// Add a case-insensitive `name.en` lookup filter. Shared by the
/// [`HasLocalizedName`] entities' [`Named`] implementations.
pub(crate) fn localized_name_filter(query: &mut Query, name: &str) -> Result<()> {
  query.filter("name.en", name)?.case_sensitive(false);
  Ok(())
}

/// Localized name or description bundle as returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleData {
  pub en: Option<String>,
  pub de: Option<String>,
  pub es: Option<String>,
  pub fr: Option<String>,
  pub it: Option<String>,
  pub tr: Option<String>,
}

impl LocaleData {
  /// The English name, or an empty string when the locale is missing.
  pub fn en(&self) -> &str {
    self.en.as_deref().unwrap_or("")
  }
}

pub(crate) fn string_as_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  s.parse().map_err(serde::de::Error::custom)
}

pub(crate) fn string_as_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  s.parse().map_err(serde::de::Error::custom)
}

/// Census encodes booleans as "0"/"1".
pub(crate) fn string_as_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  match s.as_str() {
    "0" => Ok(false),
    "1" => Ok(true),
    other => Err(serde::de::Error::custom(format!(
      "expected \"0\" or \"1\", got {:?}",
      other
    ))),
  }
}

pub(crate) fn opt_string_as_u64<'de, D>(
  deserializer: D,
) -> std::result::Result<Option<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  let s: Option<String> = Option::deserialize(deserializer)?;
  match s {
    Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    None => Ok(None),
  }
}
