//! Streaming provider access.
//!
//! # Module Structure
//!
//! - `types` - Domain types for devices and tracks
//! - `traits` - Trait abstractions for testability
//! - `spotify` - `SpotifyClient` concrete trait implementation
//! - `retry` - Bounded retry with backoff
//! - `error` - Provider error type

pub mod error;
pub(crate) mod retry;
pub mod spotify;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{ProviderError, ProviderResult};
pub use spotify::SpotifyClient;
pub use traits::{PlaybackProvider, StreamingAccount, TrackCatalog};
pub use types::{Device, Track};
