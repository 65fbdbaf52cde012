//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Configuration management (bridges, timings, feature flags)
//! - Event bus system
//!
//! ## Overview
//!
//! Every other core crate depends on this one. It fixes the logging
//! conventions, the fail-fast configuration contract and the broadcast
//! events observers subscribe to.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, EngineTimings, FeatureFlags, SessionConfig};
pub use error::{Error, Result};
pub use events::{CoreEvent, EngineEvent, EventBus, EventStream, PlaybackEvent};
