//! The per-lobby virtual player.
//!
//! # Module Structure
//!
//! - `song` - Immutable queue entries
//! - `playback` - Playback state enum and cursor arithmetic
//! - `snapshot` - Published read-only view of a player
//! - `virtual_player` - The state machine and its background tasks

mod playback;
mod snapshot;
mod song;
mod virtual_player;

pub use snapshot::PlayerSnapshot;
pub use song::QueuedSong;
pub use virtual_player::{PlayerContext, VirtualPlayer};
