//! # Event Bus System
//!
//! Broadcasts typed playback and engine events to any number of observers
//! using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: `PlaybackEvent` (transport, queue, provider switches)
//!   and `EngineEvent` (vendor engine lifecycle), wrapped in `CoreEvent`
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     emit      ┌───────────┐
//! │ Orchestrator ├──────────────>│           │     subscribe    ┌────────────┐
//! └──────────────┘               │ EventBus  ├─────────────────>│ UI / Hosts │
//! ┌──────────────┐     emit      │ (broadcast│                  └────────────┘
//! │   Adapters   ├──────────────>│  channel) │     subscribe    ┌────────────┐
//! └──────────────┘               │           ├─────────────────>│ Telemetry  │
//!                                └───────────┘                  └────────────┘
//! ```
//!
//! Events are notifications only. The authoritative "now playing" state is
//! published separately by the orchestrator on a watch channel.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Playback(PlaybackEvent::Stopped { track_id: None }))
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "Playback stopped");
//! # }
//! ```
//!
//! ### Filtering Events
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, EventStream};
//!
//! let event_bus = EventBus::new(100);
//! let engine_events = EventStream::new(event_bus.subscribe())
//!     .filter(|event| matches!(event, CoreEvent::Engine(_)));
//! ```

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

pub use crate::config::DEFAULT_EVENT_BUFFER_SIZE;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Transport, queue and provider events
    Playback(PlaybackEvent),
    /// Vendor engine lifecycle events
    Engine(EngineEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Engine(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Engine(EngineEvent::CredentialsUnavailable { .. }) => {
                EventSeverity::Warning
            }
            CoreEvent::Playback(PlaybackEvent::Started { .. })
            | CoreEvent::Playback(PlaybackEvent::ProviderSwitched { .. })
            | CoreEvent::Engine(EngineEvent::Ready { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events describing the logical "now playing" transport.
///
/// `provider` values are provider keys (`"spotify"`, `"youtube"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A track was handed to a provider for playback.
    Started {
        track_id: Option<String>,
        provider: String,
        provider_track_id: String,
        /// Requested start offset (milliseconds).
        start_ms: Option<u64>,
    },
    Paused {
        track_id: Option<String>,
    },
    Resumed {
        track_id: Option<String>,
    },
    /// Playback was stopped and the active engine torn down.
    Stopped {
        track_id: Option<String>,
    },
    /// Track finished playing naturally.
    Completed {
        track_id: Option<String>,
    },
    /// The active provider changed.
    ProviderSwitched {
        from: Option<String>,
        to: String,
        track_id: Option<String>,
    },
    /// Engine-reported position (natural progression or after a seek).
    PositionChanged {
        track_id: Option<String>,
        position_ms: u64,
        duration_ms: Option<u64>,
    },
    /// Queue contents or cursor changed.
    QueueChanged {
        length: usize,
        index: Option<usize>,
    },
    /// Playback did not start or an engine failed.
    Error {
        track_id: Option<String>,
        provider: Option<String>,
        message: String,
        /// Whether trying again may succeed.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::Completed { .. } => "Track completed",
            PlaybackEvent::ProviderSwitched { .. } => "Playback provider switched",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::QueueChanged { .. } => "Queue changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Engine Events
// ============================================================================

/// Vendor engine lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum EngineEvent {
    /// SDK script or player is loading.
    Loading { provider: String },
    /// Engine signalled readiness.
    Ready { provider: String },
    /// Engine resources were released.
    TornDown { provider: String },
    /// No credentials for this provider; it is disabled for the session.
    CredentialsUnavailable { provider: String },
}

impl EngineEvent {
    fn description(&self) -> &str {
        match self {
            EngineEvent::Loading { .. } => "Engine loading",
            EngineEvent::Ready { .. } => "Engine ready",
            EngineEvent::TornDown { .. } => "Engine torn down",
            EngineEvent::CredentialsUnavailable { .. } => "Engine credentials unavailable",
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            EngineEvent::Loading { provider }
            | EngineEvent::Ready { provider }
            | EngineEvent::TornDown { provider }
            | EngineEvent::CredentialsUnavailable { provider } => provider,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Publishes an event, ignoring the absence of subscribers.
    pub fn publish(&self, event: CoreEvent) {
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
