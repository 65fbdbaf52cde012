//! # Engine Lifecycle
//!
//! Per-adapter readiness tracking with a single-slot pending command.
//!
//! Engines report readiness asynchronously. Until they do, `play` and
//! `seek` requests are parked in a [`CommandSlot`]; only the latest request
//! survives and it is replayed exactly once when the engine becomes ready.
//!
//! ```text
//! Uninitialized ──begin_loading──▶ Loading ──mark_ready──▶ Ready
//!       ▲                             ▲                      │
//!       └──────────reset──────────────┴─────mark_not_ready───┘
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use core_async::task::spawn_detached;
use core_async::time::sleep;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Readiness of one vendor engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineLifecycle {
    /// Nothing created yet (or torn down).
    #[default]
    Uninitialized,
    /// SDK loading or player created but not yet reporting ready.
    Loading,
    Ready,
}

/// A command that could not be delivered because the engine was not ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCommand {
    Play { start: Option<Duration> },
    Seek(Duration),
}

/// Single-slot buffer: the newest request replaces the older one.
///
/// A seek issued after a buffered play keeps the intent to play and moves
/// the start position, so a `play` followed by `seek(30s)` replays as a
/// single play from 30s.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandSlot {
    pending: Option<PendingCommand>,
}

impl CommandSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self, start: Option<Duration>) {
        let start = match (start, self.pending) {
            (None, Some(PendingCommand::Seek(position))) => Some(position),
            (None, Some(PendingCommand::Play { start })) => start,
            (start, _) => start,
        };
        self.pending = Some(PendingCommand::Play { start });
    }

    pub fn seek(&mut self, position: Duration) {
        self.pending = Some(match self.pending {
            Some(PendingCommand::Play { .. }) => PendingCommand::Play {
                start: Some(position),
            },
            _ => PendingCommand::Seek(position),
        });
    }

    /// Drops the intent to play but keeps a buffered position.
    pub fn pause(&mut self) {
        self.pending = match self.pending {
            Some(PendingCommand::Play {
                start: Some(position),
            }) => Some(PendingCommand::Seek(position)),
            Some(PendingCommand::Play { start: None }) => None,
            other => other,
        };
    }

    pub fn take(&mut self) -> Option<PendingCommand> {
        self.pending.take()
    }

    pub fn peek(&self) -> Option<PendingCommand> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[derive(Debug, Default)]
struct ControlState {
    lifecycle: EngineLifecycle,
    slot: CommandSlot,
}

/// Lifecycle plus pending command for one adapter.
///
/// Every transport command bumps a generation counter. Delayed work (seek
/// retries) captures the generation and becomes a no-op once a newer
/// command has been issued.
#[derive(Debug, Default)]
pub struct EngineControl {
    state: Mutex<ControlState>,
    generation: AtomicU64,
}

impl EngineControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> EngineLifecycle {
        self.state.lock().lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle() == EngineLifecycle::Ready
    }

    /// Moves `Uninitialized` to `Loading`. Returns `false` if loading had
    /// already started.
    pub fn begin_loading(&self) -> bool {
        let mut state = self.state.lock();
        if state.lifecycle == EngineLifecycle::Uninitialized {
            state.lifecycle = EngineLifecycle::Loading;
            true
        } else {
            false
        }
    }

    /// Marks the engine ready and hands back the command to replay, if any.
    pub fn mark_ready(&self) -> Option<PendingCommand> {
        let mut state = self.state.lock();
        state.lifecycle = EngineLifecycle::Ready;
        state.slot.take()
    }

    /// Engine lost its backend session; commands buffer again.
    pub fn mark_not_ready(&self) {
        let mut state = self.state.lock();
        if state.lifecycle == EngineLifecycle::Ready {
            state.lifecycle = EngineLifecycle::Loading;
        }
    }

    /// Back to `Uninitialized` with an empty slot.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.lifecycle = EngineLifecycle::Uninitialized;
        state.slot.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns `true` when the caller should deliver the play now; otherwise
    /// the request was buffered.
    pub fn play(&self, start: Option<Duration>) -> bool {
        self.command(|slot| slot.play(start))
    }

    /// Returns `true` when the caller should deliver the seek now.
    pub fn seek(&self, position: Duration) -> bool {
        self.command(|slot| slot.seek(position))
    }

    /// Returns `true` when the caller should deliver the pause now.
    pub fn pause(&self) -> bool {
        self.command(|slot| slot.pause())
    }

    /// Drops whatever is buffered without touching the lifecycle.
    pub fn clear_pending(&self) {
        self.state.lock().slot.clear();
    }

    pub fn pending(&self) -> Option<PendingCommand> {
        self.state.lock().slot.peek()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    fn command(&self, buffer: impl FnOnce(&mut CommandSlot)) -> bool {
        let mut state = self.state.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if state.lifecycle == EngineLifecycle::Ready {
            true
        } else {
            buffer(&mut state.slot);
            false
        }
    }
}

/// Retries a failed engine call once after `delay`, unless a newer command
/// was issued in the meantime.
pub fn retry_once_after<F, Fut, E>(
    control: Arc<EngineControl>,
    generation: u64,
    delay: Duration,
    label: &'static str,
    attempt: F,
) where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    spawn_detached(async move {
        sleep(delay).await;
        if !control.is_current(generation) {
            debug!(command = label, "Retry superseded by a newer command");
            return;
        }
        if let Err(e) = attempt().await {
            warn!(command = label, error = %e, "Retry failed, giving up");
        }
    });
}

/// Epoch guard for the muted-autoplay workaround.
///
/// Starting playback programmatically arms the gate and schedules an
/// unmute. A user pause, seek or explicit mute in between cancels the gate,
/// so the delayed unmute never overrides the user.
#[derive(Debug, Clone, Default)]
pub struct AutoplayGate {
    epoch: Arc<AtomicU64>,
}

impl AutoplayGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new autoplay attempt, invalidating any earlier one.
    pub fn arm(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// Runs `unmute` after `delay` if the attempt `epoch` is still current.
    pub fn schedule_unmute<F, Fut, E>(&self, epoch: u64, delay: Duration, unmute: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let gate = self.clone();
        spawn_detached(async move {
            sleep(delay).await;
            if !gate.is_current(epoch) {
                debug!("Autoplay unmute cancelled");
                return;
            }
            if let Err(e) = unmute().await {
                warn!(error = %e, "Autoplay unmute failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_latest_seek_wins() {
        let control = EngineControl::new();
        control.begin_loading();

        assert!(!control.seek(secs(42)));
        assert!(!control.seek(secs(77)));

        assert_eq!(control.mark_ready(), Some(PendingCommand::Seek(secs(77))));
        assert_eq!(control.mark_ready(), None);
    }

    #[test]
    fn test_seek_after_play_keeps_play_intent() {
        let mut slot = CommandSlot::new();
        slot.play(None);
        slot.seek(secs(30));
        assert_eq!(slot.peek(), Some(PendingCommand::Play { start: Some(secs(30)) }));
    }

    #[test]
    fn test_play_after_seek_starts_from_seek_position() {
        let mut slot = CommandSlot::new();
        slot.seek(secs(12));
        slot.play(None);
        assert_eq!(slot.take(), Some(PendingCommand::Play { start: Some(secs(12)) }));
        assert!(slot.peek().is_none());
    }

    #[test]
    fn test_pause_drops_play_but_keeps_position() {
        let mut slot = CommandSlot::new();
        slot.play(Some(secs(5)));
        slot.pause();
        assert_eq!(slot.peek(), Some(PendingCommand::Seek(secs(5))));

        slot.clear();
        slot.play(None);
        slot.pause();
        assert_eq!(slot.peek(), None);
    }

    #[test]
    fn test_ready_engine_delivers_directly() {
        let control = EngineControl::new();
        assert!(control.begin_loading());
        assert!(!control.begin_loading());
        control.mark_ready();

        assert!(control.play(None));
        assert!(control.pending().is_none());

        control.mark_not_ready();
        assert_eq!(control.lifecycle(), EngineLifecycle::Loading);
        assert!(!control.seek(secs(3)));
        assert_eq!(control.pending(), Some(PendingCommand::Seek(secs(3))));
    }

    #[test]
    fn test_reset_clears_slot_and_bumps_generation() {
        let control = EngineControl::new();
        control.play(Some(secs(1)));
        let generation = control.generation();

        control.reset();
        assert_eq!(control.lifecycle(), EngineLifecycle::Uninitialized);
        assert!(control.pending().is_none());
        assert!(!control.is_current(generation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_skipped_when_superseded() {
        let control = Arc::new(EngineControl::new());
        control.begin_loading();
        control.mark_ready();
        let attempts = Arc::new(AtomicUsize::new(0));

        control.seek(secs(10));
        let generation = control.generation();
        let counter = attempts.clone();
        retry_once_after(control.clone(), generation, Duration::from_millis(500), "seek", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });
        control.seek(secs(20));

        sleep(Duration::from_secs(1)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmute_runs_only_for_current_epoch() {
        let gate = AutoplayGate::new();
        let unmuted = Arc::new(AtomicUsize::new(0));

        let epoch = gate.arm();
        let counter = unmuted.clone();
        gate.schedule_unmute(epoch, Duration::from_millis(150), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });
        sleep(Duration::from_millis(200)).await;
        assert_eq!(unmuted.load(Ordering::SeqCst), 1);

        let epoch = gate.arm();
        let counter = unmuted.clone();
        gate.schedule_unmute(epoch, Duration::from_millis(150), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });
        gate.cancel();
        sleep(Duration::from_millis(200)).await;
        assert_eq!(unmuted.load(Ordering::SeqCst), 1);
    }
}
