//! Playback state and queue cursor arithmetic.

use tokio_util::sync::DropGuard;

/// Where a player is in its queue and whether its clock is running.
///
/// `Playing` owns the clock's drop guard: leaving the state by any path
/// cancels the tick task.
pub(crate) enum Playback {
    /// The queue is empty.
    Empty,
    Paused {
        cursor: usize,
        position_ms: u64,
    },
    Playing {
        cursor: usize,
        position_ms: u64,
        clock: DropGuard,
    },
}

impl Playback {
    pub(crate) fn cursor(&self) -> Option<usize> {
        match self {
            Playback::Empty => None,
            Playback::Paused { cursor, .. } | Playback::Playing { cursor, .. } => Some(*cursor),
        }
    }

    pub(crate) fn position_ms(&self) -> u64 {
        match self {
            Playback::Empty => 0,
            Playback::Paused { position_ms, .. } | Playback::Playing { position_ms, .. } => {
                *position_ms
            }
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        matches!(self, Playback::Playing { .. })
    }

    pub(crate) fn set_position(&mut self, value: u64) {
        match self {
            Playback::Empty => {}
            Playback::Paused { position_ms, .. } | Playback::Playing { position_ms, .. } => {
                *position_ms = value
            }
        }
    }

    pub(crate) fn set_cursor(&mut self, value: usize) {
        match self {
            Playback::Empty => {}
            Playback::Paused { cursor, .. } | Playback::Playing { cursor, .. } => *cursor = value,
        }
    }

    /// `Playing` becomes `Paused` at the same cursor and position.
    pub(crate) fn stop(&mut self) {
        if let Playback::Playing {
            cursor,
            position_ms,
            ..
        } = *self
        {
            *self = Playback::Paused {
                cursor,
                position_ms,
            };
        }
    }
}

/// Cursor after `cursor` in a queue of `len` songs, wrapping to the start.
pub(crate) fn next_cursor(cursor: usize, len: usize) -> usize {
    if cursor + 1 >= len {
        0
    } else {
        cursor + 1
    }
}

/// Cursor before `cursor`, clamped at the first song.
pub(crate) fn previous_cursor(cursor: usize) -> usize {
    cursor.saturating_sub(1)
}
