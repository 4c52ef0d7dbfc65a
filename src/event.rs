//! Push event subscription and typed dispatch.
//!
//! The event streaming endpoint delivers service messages over a long-lived
//! connection. The connection itself is a pluggable [`EventFeed`]; this
//! module owns subscription bookkeeping, payload decoding and callback
//! dispatch. A failing callback is logged and never stops the receive loop.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::Result;
use crate::ps2::{string_as_bool, string_as_u64};

/// Pluggable push transport: sends subscription messages and yields inbound
/// messages until the connection closes.
#[async_trait]
pub trait EventFeed: Send {
  async fn send(&mut self, message: Value) -> Result<()>;
  /// The next inbound message, or `None` once the feed is closed.
  async fn next(&mut self) -> Option<Result<Value>>;
  /// Release the underlying connection promptly.
  async fn close(&mut self);
}

/// Event timestamps arrive as unix-second strings.
fn string_as_datetime<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  let secs: i64 = s.parse().map_err(serde::de::Error::custom)?;
  Utc
    .timestamp_opt(secs, 0)
    .single()
    .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", secs)))
}

/// A typed push event, decoded from a service message's payload by its
/// `event_name`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event_name")]
pub enum Event {
  Death {
    #[serde(deserialize_with = "string_as_u64")]
    character_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    attacker_character_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    attacker_weapon_id: u64,
    #[serde(deserialize_with = "string_as_bool")]
    is_headshot: bool,
    #[serde(deserialize_with = "string_as_u64")]
    world_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    zone_id: u64,
    #[serde(deserialize_with = "string_as_datetime")]
    timestamp: DateTime<Utc>,
  },
  PlayerLogin {
    #[serde(deserialize_with = "string_as_u64")]
    character_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    world_id: u64,
    #[serde(deserialize_with = "string_as_datetime")]
    timestamp: DateTime<Utc>,
  },
  PlayerLogout {
    #[serde(deserialize_with = "string_as_u64")]
    character_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    world_id: u64,
    #[serde(deserialize_with = "string_as_datetime")]
    timestamp: DateTime<Utc>,
  },
  GainExperience {
    #[serde(deserialize_with = "string_as_u64")]
    character_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    experience_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    amount: u64,
    #[serde(deserialize_with = "string_as_u64")]
    world_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    zone_id: u64,
    #[serde(deserialize_with = "string_as_datetime")]
    timestamp: DateTime<Utc>,
  },
  VehicleDestroy {
    #[serde(deserialize_with = "string_as_u64")]
    character_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    attacker_character_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    vehicle_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    world_id: u64,
    #[serde(deserialize_with = "string_as_u64")]
    zone_id: u64,
    #[serde(deserialize_with = "string_as_datetime")]
    timestamp: DateTime<Utc>,
  },
}

impl Event {
  /// The wire name of this event, as used for subscription and dispatch.
  pub fn name(&self) -> &'static str {
    match self {
      Event::Death { .. } => "Death",
      Event::PlayerLogin { .. } => "PlayerLogin",
      Event::PlayerLogout { .. } => "PlayerLogout",
      Event::GainExperience { .. } => "GainExperience",
      Event::VehicleDestroy { .. } => "VehicleDestroy",
    }
  }
}

type Handler = Box<dyn Fn(&Event) -> Result<()> + Send + Sync>;

/// Subscribes to push events and dispatches registered callbacks per event
/// type.
pub struct EventClient<F: EventFeed> {
  feed: F,
  handlers: HashMap<String, Vec<Handler>>,
}

impl<F: EventFeed> EventClient<F> {
  pub fn new(feed: F) -> Self {
    Self {
      feed,
      handlers: HashMap::new(),
    }
  }

  /// Subscribe to the given event names, optionally filtered to specific
  /// characters and worlds. Empty filter lists subscribe to all.
  pub async fn subscribe(
    &mut self,
    events: &[&str],
    characters: &[u64],
    worlds: &[u64],
  ) -> Result<()> {
    let mut message = json!({
      "service": "event",
      "action": "subscribe",
      "eventNames": events,
    });
    if characters.is_empty() {
      message["characters"] = json!(["all"]);
    } else {
      let ids: Vec<String> = characters.iter().map(u64::to_string).collect();
      message["characters"] = json!(ids);
    }
    if worlds.is_empty() {
      message["worlds"] = json!(["all"]);
    } else {
      let ids: Vec<String> = worlds.iter().map(u64::to_string).collect();
      message["worlds"] = json!(ids);
    }
    self.feed.send(message).await
  }

  /// Register a callback for one event type. Multiple callbacks per type are
  /// invoked in registration order.
  pub fn on<H>(&mut self, event_name: &str, handler: H) -> &mut Self
  where
    H: Fn(&Event) -> Result<()> + Send + Sync + 'static,
  {
    self
      .handlers
      .entry(event_name.to_string())
      .or_default()
      .push(Box::new(handler));
    self
  }

  /// Receive and dispatch messages until the feed closes.
  ///
  /// Feed errors and failing callbacks are logged and the loop continues;
  /// only the feed ending terminates it.
  pub async fn run(&mut self) {
    while let Some(message) = self.feed.next().await {
      match message {
        Ok(message) => self.dispatch(&message),
        Err(e) => error!("event feed error: {}", e),
      }
    }
    debug!("event feed closed, receive loop ending");
  }

  /// Close the feed, releasing the connection.
  pub async fn close(&mut self) {
    self.feed.close().await;
  }

  fn dispatch(&self, message: &Value) {
    // Heartbeats, echoes and subscription confirmations are not service
    // messages and carry no payload
    if message.get("type").and_then(Value::as_str) != Some("serviceMessage") {
      debug!("ignoring non-service message");
      return;
    }
    let Some(payload) = message.get("payload") else {
      debug!("service message without payload");
      return;
    };
    let Some(name) = payload.get("event_name").and_then(Value::as_str) else {
      debug!("service message payload without event_name");
      return;
    };
    let event = match serde_json::from_value::<Event>(payload.clone()) {
      Ok(event) => event,
      Err(e) => {
        debug!(event = name, "undecodable event payload: {}", e);
        return;
      }
    };
    for handler in self.handlers.get(event.name()).into_iter().flatten() {
      if let Err(e) = handler(&event) {
        // A failing callback must never stop the receive loop
        error!(event = event.name(), "event handler failed: {}", e);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};
  use tokio::sync::mpsc;

  /// In-memory feed driven by a channel; stands in for the websocket.
  struct ChannelFeed {
    incoming: mpsc::UnboundedReceiver<Value>,
    sent: Arc<Mutex<Vec<Value>>>,
    closed: bool,
  }

  impl ChannelFeed {
    fn new() -> (mpsc::UnboundedSender<Value>, Arc<Mutex<Vec<Value>>>, Self) {
      let (tx, rx) = mpsc::unbounded_channel();
      let sent = Arc::new(Mutex::new(Vec::new()));
      let feed = Self {
        incoming: rx,
        sent: Arc::clone(&sent),
        closed: false,
      };
      (tx, sent, feed)
    }
  }

  #[async_trait]
  impl EventFeed for ChannelFeed {
    async fn send(&mut self, message: Value) -> Result<()> {
      if self.closed {
        return Err(Error::Feed("feed is closed".to_string()));
      }
      self.sent.lock().unwrap().push(message);
      Ok(())
    }

    async fn next(&mut self) -> Option<Result<Value>> {
      if self.closed {
        return None;
      }
      self.incoming.recv().await.map(Ok)
    }

    async fn close(&mut self) {
      self.closed = true;
      self.incoming.close();
    }
  }

  fn death_message(character_id: u64) -> Value {
    json!({
      "service": "event",
      "type": "serviceMessage",
      "payload": {
        "event_name": "Death",
        "character_id": character_id.to_string(),
        "attacker_character_id": "0",
        "attacker_weapon_id": "21",
        "is_headshot": "1",
        "world_id": "13",
        "zone_id": "2",
        "timestamp": "1600000000"
      }
    })
  }

  #[test]
  fn test_event_name_matches_the_wire_tag() {
    let payload = death_message(1)["payload"].clone();
    let event: Event = serde_json::from_value(payload).unwrap();
    assert_eq!(event.name(), "Death");

    let login: Event = serde_json::from_value(json!({
      "event_name": "PlayerLogin",
      "character_id": "7",
      "world_id": "13",
      "timestamp": "1600000000"
    }))
    .unwrap();
    assert_eq!(login.name(), "PlayerLogin");
  }

  #[tokio::test]
  async fn test_subscribe_message_shape() {
    let (_tx, sent, feed) = ChannelFeed::new();
    let mut client = EventClient::new(feed);
    client
      .subscribe(&["Death", "PlayerLogin"], &[5428010618035323201], &[])
      .await
      .unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(
      sent[0],
      json!({
        "service": "event",
        "action": "subscribe",
        "eventNames": ["Death", "PlayerLogin"],
        "characters": ["5428010618035323201"],
        "worlds": ["all"]
      })
    );
  }

  #[tokio::test]
  async fn test_typed_event_is_dispatched() {
    let (tx, _sent, feed) = ChannelFeed::new();
    let mut client = EventClient::new(feed);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_handler = Arc::clone(&seen);
    client.on("Death", move |event| {
      if let Event::Death {
        character_id,
        is_headshot,
        ..
      } = event
      {
        seen_by_handler
          .lock()
          .unwrap()
          .push((*character_id, *is_headshot));
      }
      Ok(())
    });

    tx.send(death_message(42)).unwrap();
    drop(tx);
    client.run().await;

    assert_eq!(&*seen.lock().unwrap(), &[(42, true)]);
  }

  #[tokio::test]
  async fn test_failing_handler_does_not_stop_the_loop() {
    let (tx, _sent, feed) = ChannelFeed::new();
    let mut client = EventClient::new(feed);

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_by_handler = Arc::clone(&calls);
    client.on("Death", move |_| {
      calls_by_handler.fetch_add(1, Ordering::SeqCst);
      Err(Error::Feed("handler exploded".to_string()))
    });

    tx.send(death_message(1)).unwrap();
    tx.send(death_message(2)).unwrap();
    drop(tx);
    client.run().await;

    // Both events reached the handler despite the first failure
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_heartbeats_and_echoes_are_ignored() {
    let (tx, _sent, feed) = ChannelFeed::new();
    let mut client = EventClient::new(feed);

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_by_handler = Arc::clone(&calls);
    client.on("Death", move |_| {
      calls_by_handler.fetch_add(1, Ordering::SeqCst);
      Ok(())
    });

    tx.send(json!({"service": "event", "type": "heartbeat", "online": {}}))
      .unwrap();
    tx.send(json!({"subscription": {"eventNames": ["Death"]}}))
      .unwrap();
    tx.send(death_message(3)).unwrap();
    drop(tx);
    client.run().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_unregistered_event_is_skipped() {
    let (tx, _sent, feed) = ChannelFeed::new();
    let mut client = EventClient::new(feed);

    tx.send(json!({
      "service": "event",
      "type": "serviceMessage",
      "payload": {
        "event_name": "PlayerLogin",
        "character_id": "7",
        "world_id": "13",
        "timestamp": "1600000000"
      }
    }))
    .unwrap();
    drop(tx);
    // No handlers registered; the loop must still drain and end cleanly
    client.run().await;
  }

  #[tokio::test]
  async fn test_closed_feed_ends_the_loop_immediately() {
    let (_tx, _sent, feed) = ChannelFeed::new();
    let mut client = EventClient::new(feed);
    client.close().await;
    // A closed feed yields nothing, so run returns at once
    client.run().await;
    assert!(client.subscribe(&["Death"], &[], &[]).await.is_err());
  }
}
