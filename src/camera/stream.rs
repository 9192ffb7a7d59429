//! Stream advertisement and frame-size resolution
//!
//! Each camera component advertises one video stream built from the device's
//! capture formats. A stream may carry a selected frame size, stored as an
//! index pair into its own format list so the stream stays movable.

/// Discrete (width, height) pair a device can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One pixel format with its advertised frame sizes, in advertisement order.
#[derive(Debug, Clone)]
pub struct VideoFormat {
    pub fourcc: [u8; 4],
    pub frame_sizes: Vec<FrameSize>,
}

impl VideoFormat {
    pub fn new(fourcc: [u8; 4], frame_sizes: Vec<FrameSize>) -> Self {
        Self { fourcc, frame_sizes }
    }
}

/// Advertised video stream for one camera component.
#[derive(Debug, Clone)]
pub struct VideoStream {
    pub id: u8,
    pub is_streaming: bool,
    formats: Vec<VideoFormat>,
    /// (format index, frame-size index) into `formats`; None means
    /// "no explicit selection".
    selection: Option<(usize, usize)>,
}

impl VideoStream {
    pub fn new(id: u8, formats: Vec<VideoFormat>) -> Self {
        Self {
            id,
            is_streaming: false,
            formats,
            selection: None,
        }
    }

    pub fn formats(&self) -> &[VideoFormat] {
        &self.formats
    }

    pub fn selected_frame_size(&self) -> Option<FrameSize> {
        let (fi, si) = self.selection?;
        Some(self.formats[fi].frame_sizes[si])
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Select the best advertised match for the requested dimensions.
    pub fn select(&mut self, width: u32, height: u32) {
        self.selection = self.resolve(width, height);
    }

    /// Best advertised match for the requested dimensions, by value.
    pub fn best_frame_size(&self, width: u32, height: u32) -> Option<FrameSize> {
        self.resolve(width, height)
            .map(|(fi, si)| self.formats[fi].frame_sizes[si])
    }

    /// Scan all (format, frame size) pairs in advertisement order. An exact
    /// match wins immediately. Otherwise the largest pair fitting under the
    /// requested ceiling wins; with nothing under the ceiling, the last
    /// examined pair is returned. Yields None only when no format advertises
    /// any size.
    fn resolve(&self, width: u32, height: u32) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        let mut best_size = FrameSize::new(0, 0);
        let mut last: Option<(usize, usize)> = None;

        for (fi, format) in self.formats.iter().enumerate() {
            for (si, &fs) in format.frame_sizes.iter().enumerate() {
                if fs.width == width && fs.height == height {
                    return Some((fi, si));
                }
                if fs.width <= width
                    && fs.height <= height
                    && (best.is_none() || (fs.width, fs.height) > (best_size.width, best_size.height))
                {
                    best = Some((fi, si));
                    best_size = fs;
                }
                last = Some((fi, si));
            }
        }

        best.or(last)
    }
}
