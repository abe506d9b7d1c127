pub mod controller;
pub mod sections;
pub mod store;

pub use controller::{NavKey, ScrollController, WheelDelta, WheelOutcome};
pub use sections::{SectionThresholds, ThresholdError};
pub use store::{ScrollSnapshot, ScrollStore, SubscriptionId};

/// Logical width below which the panel strip stacks vertically.
pub const LAYOUT_BREAKPOINT: f32 = 768.0;

/// Axis along which the panel strip scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAxis {
    #[default]
    Horizontal,
    Vertical,
}

impl ScrollAxis {
    /// Layout rule: wide viewports scroll sideways, narrow ones stack.
    pub fn for_viewport_width(width: f32) -> Self {
        if width < LAYOUT_BREAKPOINT {
            ScrollAxis::Vertical
        } else {
            ScrollAxis::Horizontal
        }
    }

    /// Picks the component of a 2D size that runs along this axis.
    pub fn extent_of(self, size: [f32; 2]) -> f32 {
        match self {
            ScrollAxis::Horizontal => size[0],
            ScrollAxis::Vertical => size[1],
        }
    }
}

/// Normalised scroll position, always inside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ScrollProgress(f32);

impl ScrollProgress {
    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

/// Raw measurements of a scrollable container along its active axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub scroll_extent: f32,
    pub viewport_extent: f32,
}

impl ScrollMetrics {
    pub fn max_offset(&self) -> f32 {
        (self.scroll_extent - self.viewport_extent).max(0.0)
    }
}

/// Progress sampler: `offset / (scroll_extent - viewport_extent)`, or 0 when
/// there is no overflow to scroll through.
pub fn sample_progress(metrics: &ScrollMetrics) -> f32 {
    let range = metrics.scroll_extent - metrics.viewport_extent;
    if range <= 0.0 {
        return 0.0;
    }
    metrics.offset / range
}

/// The virtual scroll container: a strip of content larger than the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollContainer {
    axis: ScrollAxis,
    offset: f32,
    content_extent: f32,
    viewport_extent: f32,
}

impl ScrollContainer {
    pub fn new(axis: ScrollAxis, content_extent: f32, viewport_extent: f32) -> Self {
        Self {
            axis,
            offset: 0.0,
            content_extent: content_extent.max(0.0),
            viewport_extent: viewport_extent.max(0.0),
        }
    }

    /// A strip of `panel_count` panels, each one viewport long.
    pub fn from_panels(axis: ScrollAxis, panel_count: usize, viewport_size: [f32; 2]) -> Self {
        let viewport_extent = axis.extent_of(viewport_size);
        Self::new(axis, viewport_extent * panel_count as f32, viewport_extent)
    }

    pub fn axis(&self) -> ScrollAxis {
        self.axis
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn content_extent(&self) -> f32 {
        self.content_extent
    }

    pub fn viewport_extent(&self) -> f32 {
        self.viewport_extent
    }

    pub fn max_offset(&self) -> f32 {
        self.metrics().max_offset()
    }

    /// Sets the offset, clamped the way a browser clamps `scrollLeft`.
    pub fn set_offset(&mut self, offset: f32) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        self.offset = offset.clamp(0.0, self.max_offset());
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.set_offset(self.offset + delta);
    }

    /// Re-lays out the strip after a resize or axis switch, keeping the
    /// same relative position.
    pub fn relayout(&mut self, axis: ScrollAxis, content_extent: f32, viewport_extent: f32) {
        let progress = sample_progress(&self.metrics());
        self.axis = axis;
        self.content_extent = content_extent.max(0.0);
        self.viewport_extent = viewport_extent.max(0.0);
        self.set_offset(progress * self.max_offset());
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.offset,
            scroll_extent: self.content_extent,
            viewport_extent: self.viewport_extent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_divides_offset_by_scrollable_range() {
        let metrics = ScrollMetrics {
            offset: 2000.0,
            scroll_extent: 4000.0,
            viewport_extent: 1000.0,
        };
        assert!((sample_progress(&metrics) - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn progress_is_zero_without_overflow() {
        let metrics = ScrollMetrics {
            offset: 0.0,
            scroll_extent: 800.0,
            viewport_extent: 800.0,
        };
        assert_eq!(sample_progress(&metrics), 0.0);
        let shrunk = ScrollMetrics {
            offset: 10.0,
            scroll_extent: 500.0,
            viewport_extent: 800.0,
        };
        assert_eq!(sample_progress(&shrunk), 0.0);
    }

    #[test]
    fn scroll_progress_clamps_and_rejects_nan() {
        assert_eq!(ScrollProgress::new(-0.5).get(), 0.0);
        assert_eq!(ScrollProgress::new(1.5).get(), 1.0);
        assert_eq!(ScrollProgress::new(f32::NAN).get(), 0.0);
        assert_eq!(ScrollProgress::new(0.25).get(), 0.25);
    }

    #[test]
    fn container_clamps_offset_to_scrollable_range() {
        let mut container = ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0);
        container.set_offset(5000.0);
        assert_eq!(container.offset(), 3000.0);
        container.scroll_by(-4000.0);
        assert_eq!(container.offset(), 0.0);
    }

    #[test]
    fn relayout_preserves_relative_position() {
        let mut container = ScrollContainer::from_panels(ScrollAxis::Horizontal, 5, [1000.0, 600.0]);
        container.set_offset(2000.0);
        container.relayout(ScrollAxis::Vertical, 3000.0, 600.0);
        assert_eq!(container.axis(), ScrollAxis::Vertical);
        assert!((container.offset() - 1200.0).abs() < 1e-3);
    }

    #[test]
    fn breakpoint_selects_axis() {
        assert_eq!(ScrollAxis::for_viewport_width(1280.0), ScrollAxis::Horizontal);
        assert_eq!(ScrollAxis::for_viewport_width(768.0), ScrollAxis::Horizontal);
        assert_eq!(ScrollAxis::for_viewport_width(400.0), ScrollAxis::Vertical);
    }
}
