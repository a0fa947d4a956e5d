use liveview_frame::ImageFrame;

/// Presentation-layer observer.
///
/// The GUI (plot canvas, statistics bar) lives outside this crate; the
/// viewer core only ever talks to it through this seam. Registered at
/// construction, invoked from the single event-loop thread.
pub trait FrameSink {
    /// One decoded frame, ready for display.
    fn on_frame(&mut self, frame: &ImageFrame);

    /// Counters changed: frames received off the wire, frames handed to
    /// the display. Fired after a non-empty drain pass and after a reset.
    fn on_stats_changed(&mut self, frames_received: u64, frames_shown: u64) {
        let _ = (frames_received, frames_shown);
    }
}
