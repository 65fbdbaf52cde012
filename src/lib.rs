//! Workspace umbrella crate.
//!
//! Exposes feature flags that map onto the individual workspace crates
//! (`core-service`, `core-playback`). Host applications can depend on
//! `duet-workspace` and enable the documented features without wiring each
//! crate individually.

#[cfg(any(feature = "desktop-shims", feature = "spotify", feature = "youtube"))]
pub use core_service;

#[cfg(feature = "orchestrator-only")]
pub use core_playback;
