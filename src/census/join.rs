//! Joined (inner) queries and their positional-flag serialization.

use tracing::warn;

use crate::census::term::{CensusValue, SearchModifier, Term};
use crate::error::{Error, Result};

/// A relational join attached to a [`Query`](crate::census::Query) or to
/// another join.
///
/// The joined collection's matching rows are embedded in the parent record,
/// under `inject_at` if set. Joins nest to unbounded depth via [`Join::join`].
#[derive(Debug, Clone)]
pub struct Join {
  collection: String,
  is_list: bool,
  is_outer: bool,
  inject_at: String,
  /// Join predicate field on the parent collection (`on`).
  parent_field: String,
  /// Join predicate field on the joined collection (`to`).
  child_field: String,
  show: Vec<String>,
  hide: Vec<String>,
  terms: Vec<Term>,
  inner_joins: Vec<Join>,
}

impl Join {
  /// Create a join against the given collection. An empty collection name is
  /// rejected up front: it could never serialize into a valid join segment.
  pub fn new(collection: &str) -> Result<Self> {
    if collection.is_empty() {
      return Err(Error::MalformedFilter(
        "join requires a collection name".to_string(),
      ));
    }
    Ok(Self {
      collection: collection.to_string(),
      is_list: false,
      is_outer: true,
      inject_at: String::new(),
      parent_field: String::new(),
      child_field: String::new(),
      show: Vec::new(),
      hide: Vec::new(),
      terms: Vec::new(),
      inner_joins: Vec::new(),
    })
  }

  /// Mark this join as returning a list of rows rather than a single row.
  pub fn list(&mut self, is_list: bool) -> &mut Self {
    self.is_list = is_list;
    self
  }

  /// Set outer-join semantics. Defaults to true (left outer join); only the
  /// non-default false case is emitted on serialization.
  pub fn outer(&mut self, is_outer: bool) -> &mut Self {
    self.is_outer = is_outer;
    self
  }

  /// Field name under which the joined rows are embedded in the parent.
  pub fn inject_at(&mut self, field: &str) -> &mut Self {
    self.inject_at = field.to_string();
    self
  }

  /// Join predicate field on the parent collection.
  pub fn on(&mut self, field: &str) -> &mut Self {
    self.parent_field = field.to_string();
    self
  }

  /// Join predicate field on the joined collection.
  pub fn to(&mut self, field: &str) -> &mut Self {
    self.child_field = field.to_string();
    self
  }

  /// Only include the given field names in the joined rows.
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

  /// Hide the given field names from the joined rows.
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

  /// Append a pre-built term restricting the joined rows.
  pub fn add_term(&mut self, term: Term) -> &mut Self {
    self.terms.push(term);
    self
  }

  /// Shorthand for adding an equal-to term.
  pub fn filter<V>(&mut self, field: &str, value: V) -> Result<&mut Self>
  where
    V: Into<CensusValue>,
  {
    let term = Term::new(field, value, SearchModifier::EqualTo)?;
    self.terms.push(term);
    Ok(self)
  }

  /// Create an inner join on this join and return the new CHILD join, so the
  /// caller can keep configuring it or nest further. Note the asymmetry with
  /// the other builder methods, which return `self`.
  pub fn join(&mut self, collection: &str) -> Result<&mut Join> {
    let inner = Join::new(collection)?;
    self.inner_joins.push(inner);
    Ok(self.inner_joins.last_mut().unwrap())
  }

  /// Serialize this join (and recursively its inner joins) into the compact
  /// `key:value` syntax the API expects.
  ///
  /// Flags are emitted only when non-default, in a fixed order; the API's
  /// parser is positional-by-key, so the key names and the `^`/`'` separators
  /// must not change.
  pub fn serialize(&self) -> String {
    let mut out = self.collection.clone();
    if self.is_list {
      out.push_str("^list:1");
    }
    if !self.is_outer {
      out.push_str("^outer:0");
    }
    if !self.inject_at.is_empty() {
      out.push_str("^inject_at:");
      out.push_str(&self.inject_at);
    }
    if !self.parent_field.is_empty() {
      out.push_str("^on:");
      out.push_str(&self.parent_field);
    }
    if !self.child_field.is_empty() {
      out.push_str("^to:");
      out.push_str(&self.child_field);
    }
    if !self.show.is_empty() {
      out.push_str("^show:");
      out.push_str(&self.show.join("'"));
      if !self.hide.is_empty() {
        warn!(collection = %self.collection, "\"show\" overrides \"hide\"");
      }
    } else if !self.hide.is_empty() {
      out.push_str("^hide:");
      out.push_str(&self.hide.join("'"));
    }
    if !self.terms.is_empty() {
      let terms: Vec<String> = self.terms.iter().map(Term::serialize).collect();
      out.push_str("^terms:");
      out.push_str(&terms.join("'"));
    }
    if !self.inner_joins.is_empty() {
      let inner: Vec<String> = self.inner_joins.iter().map(Join::serialize).collect();
      out.push('(');
      out.push_str(&inner.join(","));
      out.push(')');
    }
    out
  }
}
