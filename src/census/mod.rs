//! Query construction for the Census REST API.
//!
//! This module builds the hierarchical query strings the API consumes:
//! filter [`Term`]s, result-shaping options on [`Query`], and recursively
//! nested [`Join`]s with their compact positional-flag encoding.

mod join;
mod query;
mod term;

pub use join::Join;
pub use query::Query;
pub use term::{CensusValue, SearchModifier, Term};
