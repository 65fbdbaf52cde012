//! # Playback Orchestration
//!
//! One logical "now playing" rendered by one of two vendor engines.
//!
//! ## Overview
//!
//! This module handles:
//! - The provider adapter contract and engine notifications
//! - Per-engine readiness with buffer-and-replay of the latest command
//! - One-time SDK bootstrapping per engine
//! - The playback queue
//! - The orchestrator that owns playback state and serializes provider switches

pub mod adapter;
pub mod bootstrap;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod queue;
pub mod registry;
pub mod resolution;
pub mod state;
pub mod types;

pub use adapter::{
    AdapterContext, AdapterNotification, AdapterNotifier, CueRequest, Delivery,
    NotificationKind, NotificationReceiver, NotificationSender, ProviderAdapter,
};
pub use bootstrap::EngineBootstrapper;
pub use error::{BootstrapError, PlaybackError, Result};
pub use lifecycle::{AutoplayGate, CommandSlot, EngineControl, EngineLifecycle, PendingCommand};
pub use orchestrator::{OrchestratorBuilder, OrchestratorConfig, PlaybackOrchestrator};
pub use queue::QueueManager;
pub use registry::{AdapterFactory, AdapterRegistry};
pub use resolution::{resolve_provider, ResolutionContext};
pub use state::{PlaybackPhase, PlaybackState, StateStore};
pub use types::{OpenPlayerRequest, ProviderKind, ProviderMap, Track};
