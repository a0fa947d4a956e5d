//! Live detector frame streaming demo.
//!
//! A producer process generates synthetic detector images and pushes them
//! over a `tcp://` endpoint; a viewer process pulls and drains frames
//! from its event loop without ever blocking it.
//!
//! # Crate Structure
//!
//! - [`transport`] — endpoint URLs, push/pull TCP sockets, readiness polling
//! - [`frame`] — two-part wire codec (JSON header + raw payload)
//! - [`pipeline`] — producer and viewer cores with the presentation seam

/// Re-export transport types.
pub mod transport {
    pub use liveview_transport::*;
}

/// Re-export frame codec types.
pub mod frame {
    pub use liveview_frame::*;
}

/// Re-export pipeline types.
pub mod pipeline {
    pub use liveview_pipeline::*;
}
