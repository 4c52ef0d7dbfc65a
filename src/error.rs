//! Error types for the library.
//!
//! The crate leans towards graceful degradation: show/hide conflicts are
//! warnings, empty results are empty sequences, and cache operations never
//! fail. Errors are reserved for malformed filters, transport failures and
//! undecodable payloads.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A filter term was constructed with an empty field name, or a join was
  /// created without a collection.
  #[error("malformed filter: {0}")]
  MalformedFilter(String),

  /// Opaque passthrough from the HTTP transport. Not interpreted here.
  #[error("transport failure: {0}")]
  Transport(#[from] reqwest::Error),

  /// The response payload could not be decoded into the expected shape.
  #[error("failed to decode payload: {0}")]
  Decode(#[from] serde_json::Error),

  /// The event feed failed to send or receive a message.
  #[error("event feed failure: {0}")]
  Feed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
