use std::io::{self, Read};
use std::time::Duration;

/// A readable source that can report readiness without blocking.
///
/// The viewer's drain loop only moves past a poll check when data is
/// already buffered, so readiness is exposed as a side-effect-free query
/// on the handle rather than by attempting a read and interpreting
/// `WouldBlock`.
pub trait PollRead: Read {
    /// Whether at least one byte is readable right now (zero-timeout poll).
    fn poll_readable(&self) -> io::Result<bool>;

    /// Block up to `timeout` waiting for readability.
    ///
    /// `None` waits indefinitely. Returns `false` on timeout. This is the
    /// primitive a host event loop uses to schedule drain passes.
    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool>;
}
