use liveview_frame::Dtype;

/// Synthetic detector image generator.
///
/// Produces `rows × cols` images of uniformly random `uint16` pixels in
/// `[val_min, val_max]` (both inclusive), standing in for a detector
/// readout. Seedable so a demo run is reproducible.
pub struct SyntheticSource {
    rows: u32,
    cols: u32,
    val_min: u16,
    val_max: u16,
    rng: fastrand::Rng,
}

impl SyntheticSource {
    pub const DEFAULT_ROWS: u32 = 256;
    pub const DEFAULT_COLS: u32 = 256;
    pub const DEFAULT_VAL_MIN: u16 = 0;
    pub const DEFAULT_VAL_MAX: u16 = 4096;

    /// Create a source with an OS-seeded generator.
    pub fn new(rows: u32, cols: u32, val_min: u16, val_max: u16) -> Self {
        Self {
            rows,
            cols,
            val_min,
            val_max,
            rng: fastrand::Rng::new(),
        }
    }

    /// Create a source with a fixed seed for reproducible frames.
    pub fn with_seed(rows: u32, cols: u32, val_min: u16, val_max: u16, seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            ..Self::new(rows, cols, val_min, val_max)
        }
    }

    /// Element type of generated payloads.
    pub fn dtype(&self) -> Dtype {
        Dtype::Uint16
    }

    /// (rows, cols) of generated payloads.
    pub fn shape(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    /// Generate one image payload, row-major, little-endian elements.
    pub fn next_payload(&mut self) -> Vec<u8> {
        let pixels = self.rows as usize * self.cols as usize;
        let mut payload = Vec::with_capacity(pixels * 2);
        for _ in 0..pixels {
            let value = self.rng.u16(self.val_min..=self.val_max);
            payload.extend_from_slice(&value.to_le_bytes());
        }
        payload
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_ROWS,
            Self::DEFAULT_COLS,
            Self::DEFAULT_VAL_MIN,
            Self::DEFAULT_VAL_MAX,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_has_shape_times_element_size_bytes() {
        let mut source = SyntheticSource::new(4, 8, 0, 100);
        assert_eq!(source.next_payload().len(), 4 * 8 * 2);
        assert_eq!(source.shape(), (4, 8));
        assert_eq!(source.dtype(), Dtype::Uint16);
    }

    #[test]
    fn values_stay_inside_configured_range() {
        let mut source = SyntheticSource::with_seed(16, 16, 100, 200, 1);
        let payload = source.next_payload();
        for chunk in payload.chunks_exact(2) {
            let value = u16::from_le_bytes([chunk[0], chunk[1]]);
            assert!((100..=200).contains(&value));
        }
    }

    #[test]
    fn same_seed_reproduces_frames() {
        let mut a = SyntheticSource::with_seed(8, 8, 0, 4096, 42);
        let mut b = SyntheticSource::with_seed(8, 8, 0, 4096, 42);
        assert_eq!(a.next_payload(), b.next_payload());
        assert_eq!(a.next_payload(), b.next_payload());
    }

    #[test]
    fn default_matches_demo_detector_geometry() {
        let source = SyntheticSource::default();
        assert_eq!(source.shape(), (256, 256));
    }
}
