//! TCP push/pull transport for live-view frame streaming.
//!
//! The producer binds a [`PushListener`] and streams frames to the one
//! viewer that connects; the viewer holds a non-blocking [`PullSocket`]
//! and drains it from its host event loop. This is the lowest layer of
//! the workspace — everything else builds on the [`PollRead`] readiness
//! contract defined here.

pub mod endpoint;
pub mod error;
pub mod traits;

pub mod tcp;

pub use endpoint::{Endpoint, DEFAULT_ENDPOINT};
pub use error::{Result, TransportError};
pub use tcp::{PullSocket, PushListener, PushStream};
pub use traits::PollRead;
