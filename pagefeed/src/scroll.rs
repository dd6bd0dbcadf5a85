/// Geometry reported by the scroll surface, all on the scroll axis.
///
/// `offset` is the scroll position, `viewport` the visible extent, `content` the rendered
/// content extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub offset: u64,
    pub viewport: u32,
    pub content: u64,
}

impl ScrollMetrics {
    pub fn new(offset: u64, viewport: u32, content: u64) -> Self {
        Self {
            offset,
            viewport,
            content,
        }
    }

    /// Bottom edge of the viewport.
    pub fn viewport_end(&self) -> u64 {
        self.offset.saturating_add(self.viewport as u64)
    }

    /// `true` once the viewport's bottom edge reaches `threshold_percent` of the content.
    pub fn is_near_end(&self, threshold_percent: u8) -> bool {
        let threshold = self.content.saturating_mul(threshold_percent.min(100) as u64);
        self.viewport_end().saturating_mul(100) >= threshold
    }

    /// `true` when the content does not exceed the visible extent.
    pub fn is_underflowing(&self) -> bool {
        self.content <= self.viewport as u64
    }
}
