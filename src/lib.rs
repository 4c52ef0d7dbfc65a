//! Async client library for the Daybreak Games Census API.
//!
//! Three layers:
//! - [`census`]: fluent query construction (terms, options, nested joins)
//!   serialized into the API's exact query-string syntax.
//! - [`client`] / [`repository`] / [`cache`]: a pluggable HTTP transport and
//!   one TTL+LRU-cached repository per entity type.
//! - [`event`]: push event subscription with typed callback dispatch.
//!
//! ```no_run
//! use auraxis::{Client, Config};
//!
//! # async fn example() -> auraxis::error::Result<()> {
//! let client = Client::new(&Config::default());
//! if let Some(character) = client.characters.get_by_name("wrel").await? {
//!     println!("{} is BR {}", character.name.first, character.battle_rank.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod census;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod proxy;
pub mod ps2;
pub mod repository;

pub use census::{Join, Query, SearchModifier, Term};
pub use client::{CensusRest, Client, Transport};
pub use config::Config;
pub use error::Error;
pub use event::{Event, EventClient, EventFeed};
