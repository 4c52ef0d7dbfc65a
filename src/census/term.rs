//! Filter terms and their comparison modifiers.

use std::fmt;

use crate::error::{Error, Result};

/// Comparison modifier attached to a filter term.
///
/// Each modifier maps to the URL prefix documented by the Census API. The
/// prefix is attached directly to the field name when the term is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchModifier {
  EqualTo,
  NotEqual,
  LessThan,
  LessThanOrEqual,
  GreaterThan,
  GreaterThanOrEqual,
  StartsWith,
  Contains,
}

impl SearchModifier {
  /// The URL prefix for this modifier.
  pub fn prefix(self) -> &'static str {
    match self {
      SearchModifier::EqualTo => "",
      SearchModifier::NotEqual => "!",
      SearchModifier::LessThan => "<",
      SearchModifier::LessThanOrEqual => "[",
      SearchModifier::GreaterThan => ">",
      SearchModifier::GreaterThanOrEqual => "]",
      SearchModifier::StartsWith => "^",
      SearchModifier::Contains => "*",
    }
  }
}

/// A filter value as understood by the Census API.
///
/// The API compares everything as strings, so this is mostly a convenience
/// for call sites: any primitive converts into it.
#[derive(Debug, Clone, PartialEq)]
pub enum CensusValue {
  Str(String),
  Int(i64),
  UInt(u64),
  Float(f64),
  Bool(bool),
}

impl fmt::Display for CensusValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CensusValue::Str(s) => write!(f, "{}", s),
      CensusValue::Int(i) => write!(f, "{}", i),
      CensusValue::UInt(u) => write!(f, "{}", u),
      CensusValue::Float(v) => write!(f, "{}", v),
      // The API expects 1/0 for booleans
      CensusValue::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
    }
  }
}

impl From<&str> for CensusValue {
  fn from(s: &str) -> Self {
    CensusValue::Str(s.to_string())
  }
}

impl From<String> for CensusValue {
  fn from(s: String) -> Self {
    CensusValue::Str(s)
  }
}

impl From<i64> for CensusValue {
  fn from(i: i64) -> Self {
    CensusValue::Int(i)
  }
}

impl From<i32> for CensusValue {
  fn from(i: i32) -> Self {
    CensusValue::Int(i64::from(i))
  }
}

impl From<u64> for CensusValue {
  fn from(u: u64) -> Self {
    CensusValue::UInt(u)
  }
}

impl From<u32> for CensusValue {
  fn from(u: u32) -> Self {
    CensusValue::UInt(u64::from(u))
  }
}

impl From<f64> for CensusValue {
  fn from(v: f64) -> Self {
    CensusValue::Float(v)
  }
}

impl From<bool> for CensusValue {
  fn from(b: bool) -> Self {
    CensusValue::Bool(b)
  }
}

/// Translate `parent__child` field shorthand into the `parent.child` form the
/// API expects for nested field access.
pub(crate) fn normalize_field(field: &str) -> String {
  field.replace("__", ".")
}

/// A single filter condition: field, value and comparison modifier.
///
/// Terms are immutable once constructed and owned by the query or join they
/// are attached to. Order is significant: the server applies them in sequence
/// as AND-combined filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
  field: String,
  value: CensusValue,
  modifier: SearchModifier,
}

impl Term {
  /// Create a new term. The field name must be non-empty; `__` is folded to
  /// `.` for nested field access.
  pub fn new<V>(field: &str, value: V, modifier: SearchModifier) -> Result<Self>
  where
    V: Into<CensusValue>,
  {
    let field = normalize_field(field);
    if field.is_empty() {
      return Err(Error::MalformedFilter("empty field name".to_string()));
    }
    Ok(Self {
      field,
      value: value.into(),
      modifier,
    })
  }

  /// Shorthand for an equal-to term.
  pub fn equals<V>(field: &str, value: V) -> Result<Self>
  where
    V: Into<CensusValue>,
  {
    Self::new(field, value, SearchModifier::EqualTo)
  }

  pub fn field(&self) -> &str {
    &self.field
  }

  /// Serialize into the `<prefix><field>=<escaped value>` URL fragment.
  ///
  /// This is a pure function of the term's state.
  pub fn serialize(&self) -> String {
    let escaped: String = url::form_urlencoded::byte_serialize(self.value.to_string().as_bytes())
      .collect();
    format!("{}{}={}", self.modifier.prefix(), self.field, escaped)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_equal_to_has_no_prefix() {
    let term = Term::equals("faction_id", 1).unwrap();
    assert_eq!(term.serialize(), "faction_id=1");
  }

  #[test]
  fn test_modifier_prefixes() {
    let cases = [
      (SearchModifier::NotEqual, "!battle_rank=10"),
      (SearchModifier::LessThan, "<battle_rank=10"),
      (SearchModifier::LessThanOrEqual, "[battle_rank=10"),
      (SearchModifier::GreaterThan, ">battle_rank=10"),
      (SearchModifier::GreaterThanOrEqual, "]battle_rank=10"),
      (SearchModifier::StartsWith, "^battle_rank=10"),
      (SearchModifier::Contains, "*battle_rank=10"),
    ];
    for (modifier, expected) in cases {
      let term = Term::new("battle_rank", 10, modifier).unwrap();
      assert_eq!(term.serialize(), expected);
    }
  }

  #[test]
  fn test_double_underscore_folds_to_dot() {
    let term = Term::equals("name__first_lower", "wrel").unwrap();
    assert_eq!(term.serialize(), "name.first_lower=wrel");
  }

  #[test]
  fn test_empty_field_is_rejected() {
    let err = Term::equals("", "x").unwrap_err();
    assert!(matches!(err, Error::MalformedFilter(_)));
  }

  #[test]
  fn test_value_is_url_escaped() {
    let term = Term::equals("name.en", "NS-11 Platinum").unwrap();
    assert_eq!(term.serialize(), "name.en=NS-11+Platinum");
  }

  #[test]
  fn test_serialize_is_pure() {
    let term = Term::equals("name.first_lower", "higby").unwrap();
    assert_eq!(term.serialize(), term.serialize());
  }

  #[test]
  fn test_bool_value_serializes_as_numeric() {
    let term = Term::equals("user_selectable", true).unwrap();
    assert_eq!(term.serialize(), "user_selectable=1");
  }
}
