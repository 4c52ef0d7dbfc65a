//! Top-level query construction and serialization.

use tracing::warn;

use crate::census::join::Join;
use crate::census::term::{CensusValue, SearchModifier, Term};
use crate::error::Result;

/// A query against a single Census collection.
///
/// Built up fluently, serialized exactly once at execution time and then
/// discarded. Reusing a query whose state was mutated after execution is not
/// supported.
///
/// All builder methods return `&mut Self`, with one deliberate exception:
/// [`Query::join`] returns the newly created child [`Join`] so the caller can
/// configure the join or nest further joins onto it.
#[derive(Debug, Clone)]
pub struct Query {
  collection: String,
  terms: Vec<Term>,
  joins: Vec<Join>,
  show: Vec<String>,
  hide: Vec<String>,
  sort: Vec<String>,
  limit: Option<u32>,
  start: Option<u32>,
  lang: Option<String>,
  case_sensitive: bool,
  exact_match_first: bool,
}

impl Query {
  /// Create a query against the given collection.
  pub fn new(collection: &str) -> Self {
    Self {
      collection: collection.to_string(),
      terms: Vec::new(),
      joins: Vec::new(),
      show: Vec::new(),
      hide: Vec::new(),
      sort: Vec::new(),
      limit: None,
      start: None,
      lang: None,
      case_sensitive: true,
      exact_match_first: false,
    }
  }

  pub fn collection(&self) -> &str {
    &self.collection
  }

  /// Append a pre-built term. Duplicates by field and modifier are legal and
  /// meaningful; the server applies terms in sequence.
  pub fn add_term(&mut self, term: Term) -> &mut Self {
    self.terms.push(term);
    self
  }

  /// Shorthand for adding an equal-to term. `__` in the field name is folded
  /// to `.` for nested field access.
  pub fn filter<V>(&mut self, field: &str, value: V) -> Result<&mut Self>
  where
    V: Into<CensusValue>,
  {
    let term = Term::new(field, value, SearchModifier::EqualTo)?;
    self.terms.push(term);
    Ok(self)
  }

  /// Only include the given field names in the response.
  ///
  /// If a hide list is already set, show takes precedence at serialization
  /// time; this logs a warning rather than failing.
  pub fn set_show<I, S>(&mut self, fields: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.show = fields.into_iter().map(Into::into).collect();
    if !self.show.is_empty() && !self.hide.is_empty() {
      warn!(collection = %self.collection, "\"show\" will take precedence over \"hide\"");
    }
    self
  }

  /// Hide the given field names from the response.
  pub fn set_hide<I, S>(&mut self, fields: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.hide = fields.into_iter().map(Into::into).collect();
    if !self.show.is_empty() && !self.hide.is_empty() {
      warn!(collection = %self.collection, "\"show\" will take precedence over \"hide\"");
    }
    self
  }

  /// Add a sort key. Descending keys are encoded as `field:-1`.
  pub fn sort(&mut self, field: &str, descending: bool) -> &mut Self {
    if descending {
      self.sort.push(format!("{}:-1", field));
    } else {
      self.sort.push(field.to_string());
    }
    self
  }

  /// Cap the number of records returned.
  pub fn limit(&mut self, limit: u32) -> &mut Self {
    self.limit = Some(limit);
    self
  }

  /// Skip the first `start` records (pagination).
  pub fn start(&mut self, start: u32) -> &mut Self {
    self.start = Some(start);
    self
  }

  /// Restrict localized fields to a single locale (e.g. `en`).
  pub fn lang(&mut self, locale: &str) -> &mut Self {
    self.lang = Some(locale.to_string());
    self
  }

  /// Toggle case-sensitive matching. Defaults to true; only the insensitive
  /// case is emitted on serialization.
  pub fn case_sensitive(&mut self, case_sensitive: bool) -> &mut Self {
    self.case_sensitive = case_sensitive;
    self
  }

  /// Force exact matches to sort before partial matches.
  pub fn exact_match_first(&mut self, enabled: bool) -> &mut Self {
    self.exact_match_first = enabled;
    self
  }

  /// Attach a top-level join and return the CHILD join for further
  /// configuration or nesting. This intentionally does not return `self`.
  pub fn join(&mut self, collection: &str) -> Result<&mut Join> {
    let join = Join::new(collection)?;
    self.joins.push(join);
    Ok(self.joins.last_mut().unwrap())
  }

  /// Serialize into the query string handed to the transport.
  ///
  /// A pure function of the builder state: calling it twice yields identical
  /// output. Show/hide precedence is resolved here, not when the lists are
  /// set.
  pub fn serialize(&self) -> String {
    let mut segments: Vec<String> = Vec::new();
    if !self.show.is_empty() {
      segments.push(format!("c:show={}", self.show.join("'")));
      if !self.hide.is_empty() {
        warn!(collection = %self.collection, "\"c:show\" overrides \"c:hide\"");
      }
    } else if !self.hide.is_empty() {
      segments.push(format!("c:hide={}", self.hide.join("'")));
    }
    if let Some(limit) = self.limit {
      segments.push(format!("c:limit={}", limit));
    }
    if let Some(start) = self.start {
      segments.push(format!("c:start={}", start));
    }
    if !self.sort.is_empty() {
      segments.push(format!("c:sort={}", self.sort.join(",")));
    }
    if let Some(lang) = &self.lang {
      segments.push(format!("c:lang={}", lang));
    }
    if !self.case_sensitive {
      segments.push("c:case=0".to_string());
    }
    if self.exact_match_first {
      segments.push("c:exactMatchFirst=1".to_string());
    }
    for term in &self.terms {
      segments.push(term.serialize());
    }
    if !self.joins.is_empty() {
      let joins: Vec<String> = self.joins.iter().map(Join::serialize).collect();
      segments.push(format!("c:join={}", joins.join(",")));
    }
    format!("{}/?{}", self.collection, segments.join("&"))
  }
}
