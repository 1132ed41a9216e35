use std::collections::BTreeSet;
use std::time::Instant;

use rand::Rng;

use super::gesture::{GestureController, Release, SwipeTracker};
use super::layout::{self, LayoutInput, Motion, PlacedCard};
use crate::deck::Slide;
use crate::deck::sequencer::{Mode, Sequencer};
use crate::render::transition::TransitionDirection;
use crate::theme::{self, ColorPair};

/// The sequencer and the gesture controller, driven from one thread.
///
/// Only two things change the current index: a rebuild of the sequence (resets to 0) and a
/// finished transition (moves by exactly one). Every input entry point polls the gesture
/// controller first so a finished transition lands before new input is interpreted.
pub struct Session {
    sequencer: Sequencer,
    gesture: GestureController,
    swipe: SwipeTracker,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(mut sequencer: Sequencer, rng: &mut R) -> Self {
        sequencer.rebuild(rng);
        Self {
            sequencer,
            gesture: GestureController::default(),
            swipe: SwipeTracker::default(),
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn index(&self) -> usize {
        self.sequencer.index()
    }

    pub fn len(&self) -> usize {
        self.sequencer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequencer.is_empty()
    }

    pub fn gesture(&self) -> &GestureController {
        &self.gesture
    }

    /// Land a finished transition. Returns true if the index changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let from = self.gesture.transition().map(|t| t.from);
        match self.gesture.poll(now) {
            Some(to) => {
                let landed = self.sequencer.set_index(to);
                tracing::debug!(?from, index = to, landed, "transition finished");
                landed
            }
            None => false,
        }
    }

    pub fn pointer_down(&mut self, x: f32, now: Instant) -> bool {
        self.tick(now);
        if self.sequencer.is_empty() {
            return false;
        }
        self.gesture.begin(x)
    }

    pub fn pointer_move(&mut self, x: f32) {
        self.gesture.update(x);
    }

    pub fn pointer_up(&mut self, now: Instant) -> Release {
        self.tick(now);
        self.gesture
            .release(now, self.sequencer.index(), self.sequencer.len())
    }

    /// Leaving the card area is judged against the threshold, like a release.
    pub fn pointer_leave(&mut self, now: Instant) -> Release {
        self.swipe.cancel();
        self.pointer_up(now)
    }

    /// Drop a drag or pending swipe without moving, e.g. when a dialog takes the pointer.
    pub fn cancel_drag(&mut self, now: Instant) -> bool {
        self.swipe.cancel();
        self.gesture.cancel(now)
    }

    /// Arrow keys and swipes.
    pub fn step(&mut self, direction: TransitionDirection, now: Instant) -> bool {
        self.tick(now);
        self.gesture.step(
            direction,
            now,
            self.sequencer.index(),
            self.sequencer.len(),
        )
    }

    pub fn swipe_down(&mut self, x: f32, y: f32) {
        self.swipe.begin(x, y);
    }

    pub fn swipe_up(&mut self, x: f32, y: f32, now: Instant) -> bool {
        match self.swipe.finish(x, y) {
            Some(direction) => self.step(direction, now),
            None => false,
        }
    }

    pub fn set_mode<R: Rng + ?Sized>(&mut self, mode: Mode, rng: &mut R) -> bool {
        let changed = self.sequencer.set_mode(mode, rng);
        if changed {
            self.gesture.reset();
            tracing::debug!(
                actions_first = mode == Mode::Mixed && self.sequencer.mode_toggled(),
                "deck reshuffled for new mode"
            );
        }
        changed
    }

    pub fn set_selected<R: Rng + ?Sized>(
        &mut self,
        selected: BTreeSet<String>,
        rng: &mut R,
    ) -> bool {
        let changed = self.sequencer.set_selected(selected, rng);
        if changed {
            self.gesture.reset();
        }
        changed
    }

    pub fn motion(&self, now: Instant) -> Motion {
        if let Some(offset) = self.gesture.drag_offset() {
            return Motion::Dragging { offset };
        }
        if let Some(t) = self.gesture.transition() {
            return Motion::Transitioning {
                direction: t.direction,
                progress: t.progress(now),
                raw_progress: t.raw_progress(now),
                release_offset: t.release_offset,
            };
        }
        match self.gesture.settle_offset(now) {
            Some(offset) => Motion::Settling { offset },
            None => Motion::Resting,
        }
    }

    pub fn layout_input(&self, now: Instant, card_width: f32, gutter: f32) -> LayoutInput {
        LayoutInput {
            index: self.sequencer.index(),
            len: self.sequencer.len(),
            motion: self.motion(now),
            card_width,
            gutter,
        }
    }

    pub fn place_cards(&self, now: Instant, card_width: f32, gutter: f32) -> Vec<PlacedCard> {
        layout::place_cards(&self.layout_input(now, card_width, gutter))
    }

    /// Colors of the slide at `index`. Intro slides get the neutral pair.
    pub fn colors_for(&self, index: usize) -> Option<ColorPair> {
        match self.sequencer.slide(index)? {
            Slide::Intro(_) => Some(ColorPair::NEUTRAL),
            Slide::Question(q) => {
                let position = self.sequencer.category_position(&q.category).unwrap_or(0);
                Some(theme::category_colors(&q.category, position))
            }
        }
    }

    pub fn chrome_colors(&self, now: Instant) -> ColorPair {
        let input = self.layout_input(now, 0.0, 0.0);
        layout::chrome_colors(&input, |i| self.colors_for(i))
    }

    /// Signed fraction of a full turn the live drag adds to the logo. Committed moves are
    /// counted by the logo itself.
    pub fn drag_fraction(&self, viewport_width: f32) -> f32 {
        match self.gesture.drag_offset() {
            Some(offset) if viewport_width > 0.0 => -offset / viewport_width,
            _ => 0.0,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.gesture.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::gesture::CARD_DRAG_THRESHOLD;
    use crate::deck::{Deck, PromptKind, Question};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn session(n: usize) -> Session {
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    format!("q{i}"),
                    if i % 2 == 0 { "A" } else { "B" },
                    PromptKind::Question,
                )
            })
            .collect();
        let deck = Deck {
            questions,
            intro: None,
        };
        let mut rng = StdRng::seed_from_u64(1);
        Session::new(Sequencer::new(deck, Mode::Mixed), &mut rng)
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_drag_commit_lands_after_transition() {
        let t0 = Instant::now();
        let mut s = session(5);
        assert!(s.pointer_down(400.0, t0));
        s.pointer_move(200.0);
        assert_eq!(
            s.pointer_up(t0),
            Release::Committed(TransitionDirection::Forward)
        );
        assert_eq!(s.index(), 0);
        assert!(!s.tick(ms(t0, 299)));
        assert!(s.tick(ms(t0, 300)));
        assert_eq!(s.index(), 1);
    }

    #[test]
    fn test_transition_lock_swallows_second_gesture() {
        let t0 = Instant::now();
        let mut s = session(5);
        let initial = s.index();

        assert!(s.pointer_down(400.0, t0));
        s.pointer_move(400.0 - CARD_DRAG_THRESHOLD - 30.0);
        assert!(matches!(s.pointer_up(ms(t0, 10)), Release::Committed(_)));

        // Second drag and key press inside the 300 ms window are ignored.
        assert!(!s.pointer_down(400.0, ms(t0, 50)));
        s.pointer_move(100.0);
        assert_eq!(s.pointer_up(ms(t0, 60)), Release::Ignored);
        assert!(!s.step(TransitionDirection::Forward, ms(t0, 100)));

        s.tick(ms(t0, 400));
        s.tick(ms(t0, 900));
        assert_eq!(s.index(), initial + 1);
    }

    #[test]
    fn test_new_gesture_after_lock_starts_from_landed_index() {
        let t0 = Instant::now();
        let mut s = session(5);
        assert!(s.step(TransitionDirection::Forward, t0));
        // The landing is applied by the next input itself.
        assert!(s.step(TransitionDirection::Forward, ms(t0, 310)));
        assert_eq!(s.index(), 1);
        s.tick(ms(t0, 700));
        assert_eq!(s.index(), 2);
    }

    #[test]
    fn test_keyboard_back_at_start_is_noop() {
        let t0 = Instant::now();
        let mut s = session(3);
        assert!(!s.step(TransitionDirection::Backward, t0));
        assert!(!s.gesture().is_locked());
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn test_pointer_leave_commits_past_threshold() {
        let t0 = Instant::now();
        let mut s = session(3);
        s.step(TransitionDirection::Forward, t0);
        s.tick(ms(t0, 300));
        assert_eq!(s.index(), 1);

        assert!(s.pointer_down(100.0, ms(t0, 400)));
        s.pointer_move(100.0 + CARD_DRAG_THRESHOLD + 1.0);
        assert_eq!(
            s.pointer_leave(ms(t0, 450)),
            Release::Committed(TransitionDirection::Backward)
        );
        s.tick(ms(t0, 800));
        assert_eq!(s.index(), 0);

        assert!(s.pointer_down(100.0, ms(t0, 900)));
        s.pointer_move(100.0 - CARD_DRAG_THRESHOLD + 1.0);
        assert_eq!(s.pointer_leave(ms(t0, 950)), Release::Cancelled);
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn test_cancelled_drag_does_not_block_keys() {
        let t0 = Instant::now();
        let mut s = session(4);
        assert!(s.pointer_down(400.0, t0));
        s.pointer_move(300.0);
        assert!(s.cancel_drag(ms(t0, 10)));
        assert!(!s.gesture().is_dragging());
        assert_eq!(s.index(), 0);

        assert!(s.step(TransitionDirection::Forward, ms(t0, 2000)));
        s.tick(ms(t0, 2300));
        assert_eq!(s.index(), 1);
        assert!(!s.cancel_drag(ms(t0, 2400)));
    }

    #[test]
    fn test_swipe_outside_card() {
        let t0 = Instant::now();
        let mut s = session(3);
        s.swipe_down(300.0, 20.0);
        assert!(s.swipe_up(240.0, 25.0, t0));
        s.tick(ms(t0, 300));
        assert_eq!(s.index(), 1);

        s.swipe_down(300.0, 20.0);
        assert!(!s.swipe_up(260.0, 25.0, ms(t0, 400)));
    }

    #[test]
    fn test_filter_change_cancels_transition() {
        let t0 = Instant::now();
        let mut s = session(6);
        let mut rng = StdRng::seed_from_u64(2);
        assert!(s.step(TransitionDirection::Forward, t0));
        let only_a: BTreeSet<String> = ["A".to_string()].into_iter().collect();
        assert!(s.set_selected(only_a, &mut rng));
        assert!(!s.gesture().is_locked());
        s.tick(ms(t0, 500));
        assert_eq!(s.index(), 0);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_empty_session_ignores_input() {
        let t0 = Instant::now();
        let mut s = session(0);
        assert!(s.is_empty());
        assert!(!s.pointer_down(10.0, t0));
        assert_eq!(s.pointer_up(t0), Release::Ignored);
        assert!(!s.step(TransitionDirection::Forward, t0));
        assert!(s.place_cards(t0, 300.0, 16.0).is_empty());
        assert_eq!(s.chrome_colors(t0), ColorPair::NEUTRAL);
    }

    #[test]
    fn test_motion_reflects_gesture_state() {
        let t0 = Instant::now();
        let mut s = session(4);
        assert_eq!(s.motion(t0), Motion::Resting);
        s.pointer_down(50.0, t0);
        s.pointer_move(20.0);
        assert_eq!(s.motion(t0), Motion::Dragging { offset: -30.0 });
        s.pointer_up(t0);
        assert!(matches!(s.motion(t0), Motion::Settling { .. }));
        assert_eq!(s.motion(ms(t0, 300)), Motion::Resting);
    }

    #[test]
    fn test_colors_follow_categories() {
        let s = session(4);
        let current = s.colors_for(s.index()).unwrap();
        assert_eq!(s.chrome_colors(Instant::now()), current);
        assert!(s.colors_for(99).is_none());
    }
}
