//! Drag state machine: Idle → Dragging → (committed | cancelled) → Idle.

use std::time::Instant;

use crate::render::transition::{
    ActiveTransition, TRANSITION_DURATION, TransitionDirection, ease_in_out, progress_between,
};

/// Minimum drag distance for a whole-card drag to move the deck.
pub const CARD_DRAG_THRESHOLD: f32 = 120.0;
/// Minimum travel for a quick swipe started outside the card.
pub const SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { start_x: f32, offset_x: f32 },
}

/// Outcome of ending a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Threshold passed and a neighbor exists: a transition has started.
    Committed(TransitionDirection),
    /// Under threshold or no neighbor: the card snaps back.
    Cancelled,
    /// There was no drag in progress.
    Ignored,
}

/// A cancelled drag animating back to rest. Purely visual: it does not lock input.
#[derive(Debug, Clone, Copy)]
pub struct Settle {
    pub from_offset: f32,
    pub start: Instant,
}

#[derive(Debug)]
pub struct GestureController {
    threshold: f32,
    drag: DragState,
    transition: Option<ActiveTransition>,
    settle: Option<Settle>,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(CARD_DRAG_THRESHOLD)
    }
}

impl GestureController {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            drag: DragState::Idle,
            transition: None,
            settle: None,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Live drag offset, if dragging.
    pub fn drag_offset(&self) -> Option<f32> {
        match self.drag {
            DragState::Dragging { offset_x, .. } => Some(offset_x),
            DragState::Idle => None,
        }
    }

    pub fn transition(&self) -> Option<&ActiveTransition> {
        self.transition.as_ref()
    }

    /// Held from commit until [`GestureController::poll`] observes the transition finishing.
    pub fn is_locked(&self) -> bool {
        self.transition.is_some()
    }

    /// Offset of a card still snapping back after a cancelled drag.
    pub fn settle_offset(&self, now: Instant) -> Option<f32> {
        let settle = self.settle?;
        let t = progress_between(settle.start, now, TRANSITION_DURATION);
        if t >= 1.0 {
            return None;
        }
        Some(settle.from_offset * (1.0 - ease_in_out(t)))
    }

    /// Pointer or touch down. Rejected while a transition is in flight.
    pub fn begin(&mut self, x: f32) -> bool {
        if self.is_locked() {
            tracing::trace!("drag ignored during transition");
            return false;
        }
        self.settle = None;
        self.drag = DragState::Dragging {
            start_x: x,
            offset_x: 0.0,
        };
        true
    }

    pub fn update(&mut self, x: f32) {
        if let DragState::Dragging { start_x, offset_x } = &mut self.drag {
            *offset_x = x - *start_x;
        }
    }

    /// Pointer up, touch end, or pointer leaving the card area.
    pub fn release(&mut self, now: Instant, index: usize, len: usize) -> Release {
        let DragState::Dragging { offset_x, .. } = self.drag else {
            return Release::Ignored;
        };
        self.drag = DragState::Idle;

        if offset_x.abs() > self.threshold {
            let direction = if offset_x > 0.0 {
                TransitionDirection::Backward
            } else {
                TransitionDirection::Forward
            };
            if self.start_transition(direction, offset_x, now, index, len) {
                return Release::Committed(direction);
            }
        }

        if offset_x != 0.0 {
            self.settle = Some(Settle {
                from_offset: offset_x,
                start: now,
            });
        }
        tracing::trace!(offset = offset_x, "drag cancelled");
        Release::Cancelled
    }

    /// Abandon a drag without judging it; the card snaps back to rest.
    pub fn cancel(&mut self, now: Instant) -> bool {
        let DragState::Dragging { offset_x, .. } = self.drag else {
            return false;
        };
        self.drag = DragState::Idle;
        if offset_x != 0.0 {
            self.settle = Some(Settle {
                from_offset: offset_x,
                start: now,
            });
        }
        tracing::trace!(offset = offset_x, "drag abandoned");
        true
    }

    /// Keyboard or swipe move without a drag.
    pub fn step(
        &mut self,
        direction: TransitionDirection,
        now: Instant,
        index: usize,
        len: usize,
    ) -> bool {
        if self.is_locked() || self.is_dragging() {
            return false;
        }
        self.start_transition(direction, 0.0, now, index, len)
    }

    fn start_transition(
        &mut self,
        direction: TransitionDirection,
        release_offset: f32,
        now: Instant,
        index: usize,
        len: usize,
    ) -> bool {
        let Some(to) = direction.target(index, len) else {
            return false;
        };
        tracing::debug!(from = index, to, "committing move");
        self.settle = None;
        self.transition = Some(ActiveTransition::new(
            index,
            to,
            direction,
            release_offset,
            now,
        ));
        true
    }

    /// Finish an elapsed transition, returning the index it lands on.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        if let Some(settle) = self.settle {
            if progress_between(settle.start, now, TRANSITION_DURATION) >= 1.0 {
                self.settle = None;
            }
        }
        if self.transition.as_ref().is_some_and(|t| t.is_complete(now)) {
            return self.transition.take().map(|t| t.to);
        }
        None
    }

    /// Drop every in-flight drag, settle and transition.
    pub fn reset(&mut self) {
        self.drag = DragState::Idle;
        self.transition = None;
        self.settle = None;
    }

    /// Next instant at which something animated changes state, for repaint scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.transition
            .as_ref()
            .map(|t| t.ends_at())
            .or_else(|| self.settle.map(|s| s.start + TRANSITION_DURATION))
    }
}

/// Quick horizontal swipe detection for gestures started outside the card.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    pub fn finish(&mut self, x: f32, y: f32) -> Option<TransitionDirection> {
        let (sx, sy) = self.start.take()?;
        classify_swipe(x - sx, y - sy, SWIPE_THRESHOLD)
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

/// A swipe counts when horizontal travel dominates and exceeds `threshold`.
pub fn classify_swipe(dx: f32, dy: f32, threshold: f32) -> Option<TransitionDirection> {
    if dx.abs() > dy.abs() && dx.abs() > threshold {
        Some(if dx > 0.0 {
            TransitionDirection::Backward
        } else {
            TransitionDirection::Forward
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drag(g: &mut GestureController, dx: f32, now: Instant, index: usize, len: usize) -> Release {
        assert!(g.begin(500.0));
        g.update(500.0 + dx);
        g.release(now, index, len)
    }

    #[test]
    fn test_begin_update_offset() {
        let mut g = GestureController::default();
        assert!(!g.is_dragging());
        assert!(g.begin(200.0));
        g.update(150.0);
        assert_eq!(g.drag_offset(), Some(-50.0));
        g.update(260.0);
        assert_eq!(g.drag_offset(), Some(60.0));
    }

    #[test]
    fn test_threshold_boundary() {
        let now = Instant::now();
        let t = CARD_DRAG_THRESHOLD;

        let mut g = GestureController::default();
        assert_eq!(drag(&mut g, -(t - 1.0), now, 2, 5), Release::Cancelled);
        assert!(g.transition().is_none());
        assert_eq!(drag(&mut g, t - 1.0, now, 2, 5), Release::Cancelled);
        assert!(g.transition().is_none());

        let mut g = GestureController::default();
        assert_eq!(
            drag(&mut g, -(t + 1.0), now, 2, 5),
            Release::Committed(TransitionDirection::Forward)
        );
        assert_eq!(g.transition().map(|t| t.to), Some(3));

        let mut g = GestureController::default();
        assert_eq!(
            drag(&mut g, t + 1.0, now, 2, 5),
            Release::Committed(TransitionDirection::Backward)
        );
        assert_eq!(g.transition().map(|t| t.to), Some(1));
    }

    #[test]
    fn test_no_overshoot_at_edges() {
        let now = Instant::now();
        let mut g = GestureController::default();
        assert_eq!(drag(&mut g, 400.0, now, 0, 5), Release::Cancelled);
        assert!(!g.is_locked());
        assert_eq!(drag(&mut g, -400.0, now, 4, 5), Release::Cancelled);
        assert!(!g.is_locked());
        assert!(!g.step(TransitionDirection::Backward, now, 0, 5));
        assert!(!g.step(TransitionDirection::Forward, now, 4, 5));
        assert_eq!(drag(&mut g, -400.0, now, 0, 0), Release::Cancelled);
    }

    #[test]
    fn test_cancel_never_commits() {
        let now = Instant::now();
        let mut g = GestureController::default();
        assert!(!g.cancel(now));
        assert!(g.begin(400.0));
        g.update(400.0 - CARD_DRAG_THRESHOLD - 50.0);
        assert!(g.cancel(now));
        assert!(!g.is_dragging());
        assert!(!g.is_locked());
        assert!(g.settle_offset(now).is_some());
        assert_eq!(g.release(now, 0, 5), Release::Ignored);
    }

    #[test]
    fn test_release_without_drag_is_ignored() {
        let mut g = GestureController::default();
        assert_eq!(g.release(Instant::now(), 0, 3), Release::Ignored);
    }

    #[test]
    fn test_lock_rejects_new_gestures_until_polled() {
        let start = Instant::now();
        let mut g = GestureController::default();
        assert!(g.step(TransitionDirection::Forward, start, 0, 3));
        assert!(g.is_locked());
        assert!(!g.begin(10.0));
        assert!(!g.step(TransitionDirection::Forward, start, 0, 3));

        assert_eq!(g.poll(start + Duration::from_millis(100)), None);
        assert!(g.is_locked());
        assert_eq!(g.poll(start + Duration::from_millis(300)), Some(1));
        assert!(!g.is_locked());
        assert_eq!(g.poll(start + Duration::from_millis(400)), None);
        assert!(g.begin(10.0));
    }

    #[test]
    fn test_cancelled_drag_settles_back() {
        let start = Instant::now();
        let mut g = GestureController::default();
        assert_eq!(drag(&mut g, 80.0, start, 1, 3), Release::Cancelled);
        assert_eq!(g.settle_offset(start), Some(80.0));
        let mid = g.settle_offset(start + Duration::from_millis(150)).unwrap();
        assert!(mid > 0.0 && mid < 80.0);
        assert_eq!(g.settle_offset(start + Duration::from_millis(300)), None);
        assert!(!g.is_locked());
        assert_eq!(g.next_deadline(), Some(start + TRANSITION_DURATION));
    }

    #[test]
    fn test_reset_clears_everything() {
        let now = Instant::now();
        let mut g = GestureController::default();
        g.step(TransitionDirection::Forward, now, 0, 3);
        g.reset();
        assert!(!g.is_locked());
        assert!(g.begin(1.0));
        g.reset();
        assert!(!g.is_dragging());
    }

    #[test]
    fn test_classify_swipe() {
        assert_eq!(
            classify_swipe(-60.0, 10.0, SWIPE_THRESHOLD),
            Some(TransitionDirection::Forward)
        );
        assert_eq!(
            classify_swipe(60.0, -10.0, SWIPE_THRESHOLD),
            Some(TransitionDirection::Backward)
        );
        assert_eq!(classify_swipe(50.0, 0.0, SWIPE_THRESHOLD), None);
        assert_eq!(classify_swipe(80.0, 90.0, SWIPE_THRESHOLD), None);

        let mut tracker = SwipeTracker::default();
        assert_eq!(tracker.finish(0.0, 0.0), None);
        tracker.begin(100.0, 100.0);
        assert_eq!(tracker.finish(20.0, 110.0), Some(TransitionDirection::Forward));
        assert_eq!(tracker.finish(0.0, 0.0), None);
    }
}
