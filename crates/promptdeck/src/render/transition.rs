use std::time::{Duration, Instant};

/// Duration of a committed card move and of the snap-back after a cancelled drag.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(300);

/// Which way the deck moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDirection {
    /// Toward the next slide (card leaves to the left).
    Forward,
    /// Toward the previous slide (card leaves to the right).
    Backward,
}

impl TransitionDirection {
    /// Sign of the horizontal travel of the outgoing card.
    pub fn exit_sign(&self) -> f32 {
        match self {
            Self::Forward => -1.0,
            Self::Backward => 1.0,
        }
    }

    /// Slide index this direction leads to from `index`, if one exists.
    pub fn target(&self, index: usize, len: usize) -> Option<usize> {
        match self {
            Self::Forward if index + 1 < len => Some(index + 1),
            Self::Backward if index > 0 && index < len => Some(index - 1),
            _ => None,
        }
    }
}

/// A committed move in flight.
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    pub from: usize,
    pub to: usize,
    pub direction: TransitionDirection,
    /// Drag offset at the moment of release; 0 for keyboard moves.
    pub release_offset: f32,
    pub start: Instant,
}

impl ActiveTransition {
    pub fn new(
        from: usize,
        to: usize,
        direction: TransitionDirection,
        release_offset: f32,
        start: Instant,
    ) -> Self {
        Self {
            from,
            to,
            direction,
            release_offset,
            start,
        }
    }

    /// Linear progress in 0..=1.
    pub fn raw_progress(&self, now: Instant) -> f32 {
        progress_between(self.start, now, TRANSITION_DURATION)
    }

    /// Eased progress in 0..=1.
    pub fn progress(&self, now: Instant) -> f32 {
        ease_in_out(self.raw_progress(now))
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= TRANSITION_DURATION
    }

    pub fn ends_at(&self) -> Instant {
        self.start + TRANSITION_DURATION
    }
}

pub fn progress_between(start: Instant, now: Instant, duration: Duration) -> f32 {
    let elapsed = now.saturating_duration_since(start).as_secs_f32();
    (elapsed / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// Cubic ease-in-out.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// `1 - (1 - t)^3`: front-loads the change.
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for ease in [ease_in_out, ease_out_cubic] {
            assert_eq!(ease(0.0), 0.0);
            assert!((ease(1.0) - 1.0).abs() < 1e-6);
            assert_eq!(ease(-3.0), 0.0);
            assert!((ease(7.0) - 1.0).abs() < 1e-6);
        }
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_out_cubic_leads_linear() {
        for i in 1..10 {
            let t = i as f32 / 10.0;
            assert!(ease_out_cubic(t) > t);
        }
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_direction_target() {
        assert_eq!(TransitionDirection::Forward.target(0, 3), Some(1));
        assert_eq!(TransitionDirection::Forward.target(2, 3), None);
        assert_eq!(TransitionDirection::Backward.target(0, 3), None);
        assert_eq!(TransitionDirection::Backward.target(2, 3), Some(1));
        assert_eq!(TransitionDirection::Forward.target(0, 0), None);
        assert_eq!(TransitionDirection::Backward.target(5, 3), None);
    }

    #[test]
    fn test_transition_progress() {
        let start = Instant::now();
        let t = ActiveTransition::new(0, 1, TransitionDirection::Forward, 0.0, start);
        assert_eq!(t.raw_progress(start), 0.0);
        assert!((t.raw_progress(start + Duration::from_millis(150)) - 0.5).abs() < 1e-3);
        assert!(!t.is_complete(start + Duration::from_millis(299)));
        assert!(t.is_complete(start + Duration::from_millis(300)));
        assert_eq!(t.raw_progress(start + Duration::from_secs(2)), 1.0);
    }
}
