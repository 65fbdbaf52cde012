//! # Queue Manager
//!
//! Ordered tracks plus a cursor. The cursor is `None` exactly when the queue
//! is empty; otherwise it always points inside the queue. Every edit keeps
//! the cursor on the same logical track where that track still exists.
//!
//! Out-of-range indices and navigation on an empty queue are no-ops.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::Track;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueManager {
    tracks: Vec<Track>,
    index: Option<usize>,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue holding `tracks` with the cursor on `start` (clamped).
    pub fn from_tracks(tracks: Vec<Track>, start: usize) -> Self {
        let mut queue = Self::new();
        queue.replace(tracks, start);
        queue
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&Track> {
        self.index.and_then(|i| self.tracks.get(i))
    }

    /// `true` when the cursor is on the last entry.
    pub fn is_at_end(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 == self.tracks.len())
    }

    pub fn append(&mut self, track: Track) {
        self.tracks.push(track);
        if self.index.is_none() {
            self.index = Some(0);
        }
    }

    /// Removes the entry at `index`.
    ///
    /// Removing before the cursor shifts the cursor back by one. Removing
    /// the current entry leaves the cursor on the same position, which now
    /// holds the following track (or the new last track).
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);

        self.index = match self.index {
            _ if self.tracks.is_empty() => None,
            Some(current) if index < current => Some(current - 1),
            Some(current) => Some(current.min(self.tracks.len() - 1)),
            None => None,
        };
        Some(removed)
    }

    /// Reorders the queue so position `i` holds the track previously at
    /// `order[i]`. `order` must be a permutation of `0..len`; anything else
    /// is rejected and leaves the queue untouched.
    pub fn reorder(&mut self, order: &[usize]) -> bool {
        if order.len() != self.tracks.len() {
            return false;
        }
        let mut seen = vec![false; order.len()];
        for &from in order {
            if from >= seen.len() || seen[from] {
                return false;
            }
            seen[from] = true;
        }

        let mut slots: Vec<Option<Track>> = self.tracks.drain(..).map(Some).collect();
        self.tracks = order.iter().filter_map(|&from| slots[from].take()).collect();
        self.index = self
            .index
            .and_then(|current| order.iter().position(|&from| from == current));
        true
    }

    /// Moves one entry from `from` to `to`, keeping the cursor on its track.
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }

        let mut order: Vec<usize> = (0..len).collect();
        let moved = order.remove(from);
        order.insert(to, moved);
        self.reorder(&order)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.index = None;
    }

    /// Replaces the contents, putting the cursor on `start` (clamped).
    pub fn replace(&mut self, tracks: Vec<Track>, start: usize) {
        self.index = if tracks.is_empty() {
            None
        } else {
            Some(start.min(tracks.len() - 1))
        };
        self.tracks = tracks;
    }

    /// Advances the cursor, wrapping to the first entry after the last.
    pub fn next(&mut self) -> Option<&Track> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        let next = self.index.map_or(0, |i| (i + 1) % len);
        self.index = Some(next);
        self.tracks.get(next)
    }

    /// Moves the cursor back, wrapping to the last entry from the first.
    pub fn previous(&mut self) -> Option<&Track> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        let previous = match self.index {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.index = Some(previous);
        self.tracks.get(previous)
    }

    pub fn jump_to(&mut self, index: usize) -> Option<&Track> {
        if index >= self.tracks.len() {
            return None;
        }
        self.index = Some(index);
        self.tracks.get(index)
    }

    /// Randomly permutes the entries after the cursor. Entries up to and
    /// including the cursor keep their positions.
    pub fn shuffle_from_current(&mut self) {
        self.shuffle_from_current_with(&mut rand::thread_rng());
    }

    pub fn shuffle_from_current_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let fixed = self.index.map_or(0, |i| i + 1);
        if fixed < self.tracks.len() {
            self.tracks[fixed..].shuffle(rng);
        }
    }
}
