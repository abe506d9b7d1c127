use super::{
    sample_progress, ScrollAxis, ScrollContainer, ScrollProgress, ScrollSnapshot, ScrollStore,
    SectionThresholds, SubscriptionId,
};
use std::time::{Duration, Instant};

/// Layout may not have settled when the controller is created, so attaching
/// to the container is deferred by this much.
pub const ATTACH_DELAY: Duration = Duration::from_millis(500);

const SMOOTH_SCROLL_RATE: f32 = 10.0;
const SMOOTH_SCROLL_SNAP_PX: f32 = 0.5;
const NESTED_BOTTOM_TOLERANCE_PX: f32 = 1.0;

/// Wheel movement in page pixels. Positive `y` scrolls down (forward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelDelta {
    pub x: f32,
    pub y: f32,
}

impl WheelDelta {
    pub fn vertical(y: f32) -> Self {
        Self { x: 0.0, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Vertical scroll state of a region nested inside a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NestedScroll {
    pub offset: f32,
    pub content_extent: f32,
    pub viewport_extent: f32,
}

impl NestedScroll {
    pub fn at_top(&self) -> bool {
        self.offset <= 0.0
    }

    pub fn at_bottom(&self) -> bool {
        self.offset + self.viewport_extent >= self.content_extent - NESTED_BOTTOM_TOLERANCE_PX
    }

    /// True when the region still has room to move in the wheel's direction.
    pub fn can_scroll(&self, delta_y: f32) -> bool {
        (delta_y < 0.0 && !self.at_top()) || (delta_y > 0.0 && !self.at_bottom())
    }
}

/// What the controller did with a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Controller is not attached, or the event carried no movement.
    Ignored,
    /// Left for the nested region under the pointer.
    Nested,
    /// Vertical wheel turned into horizontal strip movement.
    Redirected,
    /// Applied along the strip's own axis.
    Native,
}

impl WheelOutcome {
    /// Whether the event must be kept away from the UI's own scrolling.
    pub fn suppresses_native(self) -> bool {
        matches!(self, WheelOutcome::Redirected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Forward,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attachment {
    Detached,
    Pending { deadline: Instant },
    Attached,
}

pub struct ScrollController {
    attachment: Attachment,
    container: Option<ScrollContainer>,
    thresholds: SectionThresholds,
    store: ScrollStore,
    subscriptions: Vec<SubscriptionId>,
    smooth_target: Option<f32>,
}

impl ScrollController {
    pub fn new(thresholds: SectionThresholds) -> Self {
        Self {
            attachment: Attachment::Detached,
            container: None,
            thresholds,
            store: ScrollStore::new(),
            subscriptions: Vec::new(),
            smooth_target: None,
        }
    }

    /// Subscribes through the controller; the subscription ends at [`detach`](Self::detach).
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ScrollSnapshot) + 'static) -> SubscriptionId {
        let id = self.store.subscribe(subscriber);
        self.subscriptions.push(id);
        id
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        self.store.snapshot()
    }

    pub fn scroll_progress(&self) -> ScrollProgress {
        self.store.select(|snapshot| snapshot.progress)
    }

    pub fn current_section(&self) -> usize {
        self.store.select(|snapshot| snapshot.section)
    }

    pub fn section_count(&self) -> usize {
        self.thresholds.section_count()
    }

    pub fn container(&self) -> Option<&ScrollContainer> {
        self.container.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attachment == Attachment::Attached
    }

    /// Arms the deferred attach. Does nothing once attached.
    pub fn schedule_attach(&mut self, now: Instant) {
        if self.is_attached() {
            return;
        }
        self.attachment = Attachment::Pending {
            deadline: now + ATTACH_DELAY,
        };
        log::debug!("Scroll controller attach scheduled in {:?}", ATTACH_DELAY);
    }

    /// Completes a pending attach once its deadline has passed. A missing
    /// container is logged and leaves progress and section at zero.
    pub fn poll_attach(&mut self, now: Instant, container: Option<ScrollContainer>) -> bool {
        let Attachment::Pending { deadline } = self.attachment else {
            return false;
        };
        if now < deadline {
            return false;
        }
        match container {
            Some(container) => {
                log::info!(
                    "Scroll container attached: {:?} extent {:.0} / viewport {:.0}",
                    container.axis(),
                    container.content_extent(),
                    container.viewport_extent()
                );
                self.container = Some(container);
                self.attachment = Attachment::Attached;
                self.publish_current();
                true
            }
            None => {
                log::warn!("Scroll container not found; scroll tracking disabled");
                self.attachment = Attachment::Detached;
                false
            }
        }
    }

    /// Teardown: cancels a pending attach and any in-flight smooth scroll,
    /// drops subscriptions made through the controller and stops reacting to
    /// input.
    pub fn detach(&mut self) {
        let was_detached = self.attachment == Attachment::Detached;
        self.attachment = Attachment::Detached;
        self.container = None;
        self.smooth_target = None;
        for id in self.subscriptions.drain(..) {
            self.store.unsubscribe(id);
        }
        if !was_detached {
            log::info!(
                "Scroll controller detached ({} store subscribers remain)",
                self.store.subscriber_count()
            );
        }
    }

    /// Applies a layout change. The axis is always supplied by the layout
    /// logic, never inferred from the container's measurements.
    pub fn relayout(&mut self, axis: ScrollAxis, viewport_size: [f32; 2]) {
        let panels = self.section_count();
        let Some(container) = self.container.as_mut() else {
            return;
        };
        let viewport_extent = axis.extent_of(viewport_size);
        container.relayout(axis, viewport_extent * panels as f32, viewport_extent);
        self.smooth_target = None;
        self.publish_current();
    }

    /// Starts a smooth scroll to `index × viewport_extent`. Returns the
    /// target offset, or `None` when no container is attached.
    pub fn scroll_to_section(&mut self, index: usize) -> Option<f32> {
        let last = self.section_count() - 1;
        let container = self.container.as_ref()?;
        let index = index.min(last);
        let target = (index as f32 * container.viewport_extent()).clamp(0.0, container.max_offset());
        log::debug!("Scrolling to section {} (offset {:.0})", index, target);
        self.smooth_target = Some(target);
        Some(target)
    }

    pub fn handle_wheel(&mut self, delta: WheelDelta, nested: Option<NestedScroll>) -> WheelOutcome {
        if !self.is_attached() || delta.is_zero() {
            return WheelOutcome::Ignored;
        }
        let Some(container) = self.container.as_mut() else {
            return WheelOutcome::Ignored;
        };
        if let Some(region) = nested {
            if region.can_scroll(delta.y) {
                return WheelOutcome::Nested;
            }
        }

        self.smooth_target = None;
        let outcome = match container.axis() {
            ScrollAxis::Horizontal if delta.y.abs() >= delta.x.abs() => {
                container.scroll_by(delta.y);
                WheelOutcome::Redirected
            }
            ScrollAxis::Horizontal => {
                container.scroll_by(delta.x);
                WheelOutcome::Native
            }
            ScrollAxis::Vertical => {
                container.scroll_by(delta.y);
                WheelOutcome::Native
            }
        };
        self.publish_current();
        outcome
    }

    /// Arrow-key paging by one viewport. Returns whether the key was used.
    pub fn handle_key(&mut self, key: NavKey, text_input_focused: bool) -> bool {
        if text_input_focused || !self.is_attached() {
            return false;
        }
        let Some(container) = self.container.as_ref() else {
            return false;
        };
        let base = self.smooth_target.unwrap_or(container.offset());
        let step = container.viewport_extent();
        let target = match key {
            NavKey::Forward => base + step,
            NavKey::Back => base - step,
        };
        self.smooth_target = Some(target.clamp(0.0, container.max_offset()));
        true
    }

    /// Advances the smooth scroll animation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let Some(target) = self.smooth_target else {
            return;
        };
        let Some(container) = self.container.as_mut() else {
            self.smooth_target = None;
            return;
        };
        let diff = target - container.offset();
        if diff.abs() <= SMOOTH_SCROLL_SNAP_PX {
            container.set_offset(target);
            self.smooth_target = None;
        } else {
            let blend = 1.0 - (-SMOOTH_SCROLL_RATE * dt.max(0.0)).exp();
            container.set_offset(container.offset() + diff * blend);
        }
        self.publish_current();
    }

    fn publish_current(&mut self) {
        let Some(container) = self.container.as_ref() else {
            return;
        };
        let progress = ScrollProgress::new(sample_progress(&container.metrics()));
        let section = self.thresholds.classify(progress);
        self.store.publish(ScrollSnapshot { progress, section });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached(container: ScrollContainer, sections: usize) -> ScrollController {
        let mut controller = ScrollController::new(SectionThresholds::uniform(sections).unwrap());
        let start = Instant::now();
        controller.schedule_attach(start);
        assert!(controller.poll_attach(start + ATTACH_DELAY, Some(container)));
        controller
    }

    /// Positions the strip directly, as a scrollbar drag would.
    fn jump(controller: &mut ScrollController, offset: f32) {
        controller.container.as_mut().unwrap().set_offset(offset);
        controller.smooth_target = None;
        controller.publish_current();
    }

    fn settle(controller: &mut ScrollController) {
        for _ in 0..600 {
            controller.tick(1.0 / 60.0);
            if controller.smooth_target.is_none() {
                break;
            }
        }
    }

    #[test]
    fn scrolled_container_reports_progress_and_section() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        jump(&mut controller, 2000.0);
        assert!((controller.scroll_progress().get() - 0.6667).abs() < 1e-3);
        assert_eq!(controller.current_section(), 2);
    }

    #[test]
    fn scroll_to_section_targets_viewport_multiple_and_converges() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 800.0), 4);
        assert_eq!(controller.scroll_to_section(3), Some(2400.0));
        settle(&mut controller);
        assert!(controller.smooth_target.is_none());
        let expected = 2400.0 / (4000.0 - 800.0);
        assert!((controller.scroll_progress().get() - expected).abs() < 1e-4);
        assert_eq!(controller.container().unwrap().offset(), 2400.0);
    }

    #[test]
    fn smooth_scroll_is_animated_not_instant() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 800.0), 4);
        controller.scroll_to_section(2);
        controller.tick(1.0 / 60.0);
        let offset = controller.container().unwrap().offset();
        assert!(offset > 0.0 && offset < 1600.0);
    }

    #[test]
    fn vertical_wheel_is_redirected_on_horizontal_strip() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        let outcome = controller.handle_wheel(WheelDelta::vertical(120.0), None);
        assert_eq!(outcome, WheelOutcome::Redirected);
        assert!(outcome.suppresses_native());
        assert_eq!(controller.container().unwrap().offset(), 120.0);
    }

    #[test]
    fn horizontal_dominant_wheel_scrolls_natively() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        let outcome = controller.handle_wheel(WheelDelta { x: 80.0, y: 10.0 }, None);
        assert_eq!(outcome, WheelOutcome::Native);
        assert_eq!(controller.container().unwrap().offset(), 80.0);
    }

    #[test]
    fn vertical_strip_scrolls_natively() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Vertical, 3000.0, 600.0), 5);
        let outcome = controller.handle_wheel(WheelDelta::vertical(300.0), None);
        assert_eq!(outcome, WheelOutcome::Native);
        assert!(!outcome.suppresses_native());
        assert_eq!(controller.container().unwrap().offset(), 300.0);
    }

    #[test]
    fn nested_region_with_room_keeps_the_wheel() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        let middle = NestedScroll {
            offset: 100.0,
            content_extent: 900.0,
            viewport_extent: 400.0,
        };
        let outcome = controller.handle_wheel(WheelDelta::vertical(50.0), Some(middle));
        assert_eq!(outcome, WheelOutcome::Nested);
        assert!(!outcome.suppresses_native());
        assert_eq!(controller.handle_wheel(WheelDelta::vertical(-50.0), Some(middle)), WheelOutcome::Nested);
        assert_eq!(controller.container().unwrap().offset(), 0.0);
    }

    #[test]
    fn nested_region_at_boundary_is_hijacked() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        let bottom = NestedScroll {
            offset: 499.5,
            content_extent: 900.0,
            viewport_extent: 400.0,
        };
        assert_eq!(controller.handle_wheel(WheelDelta::vertical(60.0), Some(bottom)), WheelOutcome::Redirected);
        assert_eq!(controller.handle_wheel(WheelDelta::vertical(-30.0), Some(bottom)), WheelOutcome::Nested);

        let top = NestedScroll {
            offset: 0.0,
            content_extent: 900.0,
            viewport_extent: 400.0,
        };
        assert_eq!(controller.handle_wheel(WheelDelta::vertical(-30.0), Some(top)), WheelOutcome::Redirected);

        let no_overflow = NestedScroll {
            offset: 0.0,
            content_extent: 300.0,
            viewport_extent: 400.0,
        };
        assert_eq!(controller.handle_wheel(WheelDelta::vertical(30.0), Some(no_overflow)), WheelOutcome::Redirected);
    }

    #[test]
    fn wheel_cancels_smooth_scroll() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        controller.scroll_to_section(3);
        controller.handle_wheel(WheelDelta::vertical(10.0), None);
        assert!(controller.smooth_target.is_none());
    }

    #[test]
    fn arrow_keys_page_by_one_viewport() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        assert!(controller.handle_key(NavKey::Forward, false));
        assert!(controller.handle_key(NavKey::Forward, false));
        assert_eq!(controller.smooth_target, Some(2000.0));
        settle(&mut controller);
        assert_eq!(controller.container().unwrap().offset(), 2000.0);

        assert!(controller.handle_key(NavKey::Back, false));
        assert_eq!(controller.smooth_target, Some(1000.0));
    }

    #[test]
    fn arrow_keys_ignored_while_typing() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        assert!(!controller.handle_key(NavKey::Forward, true));
        assert!(controller.smooth_target.is_none());
    }

    #[test]
    fn attach_waits_for_deadline() {
        let mut controller = ScrollController::new(SectionThresholds::uniform(4).unwrap());
        let start = Instant::now();
        controller.schedule_attach(start);
        let container = ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0);
        assert!(!controller.poll_attach(start + Duration::from_millis(100), Some(container)));
        assert!(!controller.is_attached());
        assert!(controller.poll_attach(start + ATTACH_DELAY, Some(container)));
        assert!(controller.is_attached());
    }

    #[test]
    fn missing_container_is_a_no_op() {
        let mut controller = ScrollController::new(SectionThresholds::uniform(4).unwrap());
        let start = Instant::now();
        controller.schedule_attach(start);
        assert!(!controller.poll_attach(start + ATTACH_DELAY, None));
        assert_eq!(controller.scroll_progress().get(), 0.0);
        assert_eq!(controller.current_section(), 0);
        assert_eq!(controller.handle_wheel(WheelDelta::vertical(100.0), None), WheelOutcome::Ignored);
        assert_eq!(controller.scroll_to_section(2), None);
    }

    #[test]
    fn detach_cancels_pending_attach_and_input() {
        let mut controller = ScrollController::new(SectionThresholds::uniform(4).unwrap());
        let start = Instant::now();
        controller.schedule_attach(start);
        controller.detach();
        let container = ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0);
        assert!(!controller.poll_attach(start + ATTACH_DELAY, Some(container)));

        let mut attached = attached(container, 4);
        attached.scroll_to_section(2);
        attached.detach();
        assert!(attached.smooth_target.is_none());
        assert_eq!(attached.handle_wheel(WheelDelta::vertical(10.0), None), WheelOutcome::Ignored);
        assert!(!attached.handle_key(NavKey::Forward, false));
    }

    #[test]
    fn relayout_switches_axis_and_keeps_progress() {
        let mut controller = attached(ScrollContainer::from_panels(ScrollAxis::Horizontal, 4, [1000.0, 700.0]), 4);
        jump(&mut controller, 1500.0);
        let before = controller.scroll_progress().get();
        controller.relayout(ScrollAxis::Vertical, [500.0, 700.0]);
        let container = controller.container().unwrap();
        assert_eq!(container.axis(), ScrollAxis::Vertical);
        assert_eq!(container.viewport_extent(), 700.0);
        assert!((controller.scroll_progress().get() - before).abs() < 1e-4);
    }

    #[test]
    fn publishes_section_changes_to_subscribers() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        let sections = Rc::new(RefCell::new(Vec::new()));
        let sink = sections.clone();
        controller
            .store
            .subscribe(move |snap| sink.borrow_mut().push(snap.section));
        jump(&mut controller, 800.0);
        jump(&mut controller, 2900.0);
        assert_eq!(*sections.borrow(), vec![1, 3]);
    }

    #[test]
    fn detach_drops_controller_subscriptions_only() {
        let mut controller = attached(ScrollContainer::new(ScrollAxis::Horizontal, 4000.0, 1000.0), 4);
        controller.subscribe(|_| {});
        controller.store.subscribe(|_| {});
        assert_eq!(controller.store.subscriber_count(), 2);
        controller.detach();
        assert_eq!(controller.store.subscriber_count(), 1);
    }
}
