//! IFrame player value types

use serde::{Deserialize, Serialize};

use crate::error::{Result, YouTubeError};

/// Length of every YouTube video id.
const VIDEO_ID_LEN: usize = 11;

/// Path prefixes that are followed directly by a video id.
const ID_PATH_MARKERS: [&str; 5] = ["youtu.be/", "/embed/", "/shorts/", "/live/", "/v/"];

/// IFrame player states as reported by `onStateChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(PlayerState::Unstarted),
            0 => Some(PlayerState::Ended),
            1 => Some(PlayerState::Playing),
            2 => Some(PlayerState::Paused),
            3 => Some(PlayerState::Buffering),
            5 => Some(PlayerState::Cued),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            PlayerState::Unstarted => -1,
            PlayerState::Ended => 0,
            PlayerState::Playing => 1,
            PlayerState::Paused => 2,
            PlayerState::Buffering => 3,
            PlayerState::Cued => 5,
        }
    }
}

/// Extract a video id from a bare id or a watch, share, embed or shorts URL.
pub fn parse_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    let candidate = if is_video_id(input) {
        Some(input)
    } else {
        id_from_url(input)
    };

    candidate
        .filter(|id| is_video_id(id))
        .map(str::to_string)
        .ok_or_else(|| YouTubeError::InvalidVideoId(input.to_string()))
}

fn id_from_url(url: &str) -> Option<&str> {
    for marker in ["?v=", "&v="] {
        if let Some(at) = url.find(marker) {
            return Some(take_segment(&url[at + marker.len()..]));
        }
    }
    ID_PATH_MARKERS.iter().find_map(|marker| {
        url.find(marker)
            .map(|at| take_segment(&url[at + marker.len()..]))
    })
}

fn take_segment(rest: &str) -> &str {
    let end = rest
        .find(|c: char| matches!(c, '?' | '&' | '#' | '/'))
        .unwrap_or(rest.len());
    &rest[..end]
}

fn is_video_id(value: &str) -> bool {
    value.len() == VIDEO_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Map a 0.0..=1.0 level to the player's 0..=100 percent scale.
pub fn volume_percent(level: f32) -> u8 {
    if level.is_nan() {
        return 0;
    }
    (level.clamp(0.0, 1.0) * 100.0).round() as u8
}
