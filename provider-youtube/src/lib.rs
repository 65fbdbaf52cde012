//! # YouTube Provider
//!
//! Implements `ProviderAdapter` for the YouTube IFrame player.
//!
//! ## Overview
//!
//! This module provides:
//! - One-time IFrame API bootstrap and lazy player creation
//! - Reuse of the live player for later videos (`loadVideoById` / `cueVideoById`)
//! - Buffer-and-replay of play/seek issued before the player is ready
//! - Muted programmatic start followed by a delayed unmute
//! - Mapping of raw player state codes to adapter notifications

pub mod adapter;
pub mod error;
pub mod types;

pub use adapter::{adapter_factory, YouTubeAdapter, YouTubeBridges};
pub use error::{Result, YouTubeError};
pub use types::{parse_video_id, volume_percent, PlayerState};
