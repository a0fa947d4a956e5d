//! Producer and viewer cores for the live-view frame pipeline.
//!
//! The producer side binds a push endpoint, generates synthetic detector
//! images, and streams them at a fixed rate. The viewer side owns the
//! pull channel and drains every buffered frame each time its host event
//! loop signals readability, forwarding decoded frames to a registered
//! [`FrameSink`]. Both sides are single-threaded and cooperative; the
//! only blocking operation anywhere is the producer's pacing sleep.

pub mod error;
pub mod receiver;
pub mod sender;
pub mod sink;
pub mod source;
pub mod viewer;

pub use error::{PipelineError, Result};
pub use receiver::{DrainReport, FrameReceiver};
pub use sender::{run_producer, FrameSender, Pacer, ProducerConfig};
pub use sink::FrameSink;
pub use source::SyntheticSource;
pub use viewer::Viewer;
