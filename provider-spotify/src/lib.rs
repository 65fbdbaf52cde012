//! # Spotify Provider
//!
//! Implements `ProviderAdapter` for the Spotify Web Playback SDK.
//!
//! ## Overview
//!
//! This module provides:
//! - SDK bootstrap and local player connection with the user's access token
//! - Device handoff and track start through the Connect Web API
//! - Buffer-and-replay of play/seek issued before the device is ready
//! - Muted programmatic start followed by a delayed volume restore

pub mod adapter;
pub mod api;
pub mod error;
pub mod types;

pub use adapter::{adapter_factory, SpotifyAdapter, SpotifyBridges};
pub use api::{ConnectApi, SPOTIFY_API_BASE};
pub use error::{Result, SpotifyError};
