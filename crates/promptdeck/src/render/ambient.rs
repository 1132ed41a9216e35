//! Cosmetic timers: blinking eyes and wandering pupils.
//!
//! Each timer is a deadline owned by the element it animates. It is checked once per frame
//! and disappears with its owner, so there is nothing to cancel by hand.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

const BLINK_DURATION: Duration = Duration::from_millis(150);

fn random_delay<R: Rng + ?Sized>(rng: &mut R, (min_ms, max_ms): (u64, u64)) -> Duration {
    Duration::from_millis(rng.random_range(min_ms..max_ms))
}

#[derive(Debug, Clone)]
pub struct Blinker {
    next_blink: Instant,
    reopen_at: Option<Instant>,
    interval_ms: (u64, u64),
}

impl Blinker {
    pub fn new<R: Rng + ?Sized>(
        now: Instant,
        first_ms: (u64, u64),
        interval_ms: (u64, u64),
        rng: &mut R,
    ) -> Self {
        Self {
            next_blink: now + random_delay(rng, first_ms),
            reopen_at: None,
            interval_ms,
        }
    }

    /// Header logo: every 3 to 7 seconds.
    pub fn logo<R: Rng + ?Sized>(now: Instant, rng: &mut R) -> Self {
        Self::new(now, (3_000, 7_000), (3_000, 7_000), rng)
    }

    /// Card monster: first after 5 to 10 seconds, then every 8 to 20.
    pub fn card<R: Rng + ?Sized>(now: Instant, rng: &mut R) -> Self {
        Self::new(now, (5_000, 10_000), (8_000, 20_000), rng)
    }

    /// Advance to `now`. Returns true while the eyes are closed.
    pub fn update<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> bool {
        if let Some(reopen) = self.reopen_at {
            if now < reopen {
                return true;
            }
            self.reopen_at = None;
        }
        if now >= self.next_blink {
            self.reopen_at = Some(now + BLINK_DURATION);
            self.next_blink = now + random_delay(rng, self.interval_ms);
            return true;
        }
        false
    }

    pub fn next_deadline(&self) -> Instant {
        self.reopen_at.unwrap_or(self.next_blink)
    }
}

#[derive(Debug, Clone)]
pub struct PupilWander {
    offset: (f32, f32),
    next_move: Instant,
    max_offset: f32,
}

impl PupilWander {
    pub fn new<R: Rng + ?Sized>(now: Instant, movement_factor: f32, rng: &mut R) -> Self {
        let mut wander = Self {
            offset: (0.0, 0.0),
            next_move: now,
            max_offset: 4.0 * movement_factor,
        };
        wander.update(now, rng);
        wander
    }

    /// Advance to `now` and return the current pupil offset in points.
    pub fn update<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> (f32, f32) {
        if now >= self.next_move {
            let m = self.max_offset;
            self.offset = (rng.random_range(-m..=m), rng.random_range(-m..=m));
            self.next_move = now + random_delay(rng, (10_000, 20_000));
        }
        self.offset
    }

    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_move
    }
}

/// Deterministic look of a card's monster, derived from the prompt text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonsterShape {
    /// Body diameter as a fraction of the nominal size (0.8..=1.0).
    pub size: f32,
    pub width_factor: f32,
    pub height_factor: f32,
    /// Horizontal overflow past the card edge as a fraction of the body width; sign picks
    /// the side.
    pub overflow: f32,
    pub eye_shift: (f32, f32),
    pub eye_stretch: f32,
    pub pupil_scale: f32,
    pub pupil_movement: f32,
}

impl MonsterShape {
    pub fn from_text(text: &str) -> Self {
        let hash = text
            .encode_utf16()
            .fold(0i32, |acc, unit| {
                (unit as i32).wrapping_add(acc.wrapping_shl(5).wrapping_sub(acc))
            }) as f64;
        let r = |salt: f64| {
            let x = (hash + salt).sin() * 10_000.0;
            (x - x.floor()) as f32
        };

        let size = 1.0 - r(0.0) * 0.2;
        let ellipse = r(1.0) * 0.2;
        let squished = r(2.0) > 0.5;
        let side = if r(11.0) > 0.5 { 1.0 } else { -1.0 };
        let stretch = if r(5.0) > 0.6 {
            if r(7.0) > 0.5 { 1.5 } else { 0.7 }
        } else {
            1.0
        };

        Self {
            size,
            width_factor: if squished { 1.0 - ellipse } else { 1.0 + ellipse },
            height_factor: if squished { 1.0 + ellipse } else { 1.0 - ellipse },
            overflow: side * (0.2 + r(12.0) * 0.1),
            eye_shift: ((r(3.0) - 0.5) * 10.0, (r(4.0) - 0.5) * 3.0),
            eye_stretch: stretch,
            pupil_scale: 1.0 + r(9.0) * 0.3,
            pupil_movement: 0.8 + r(10.0) * 0.4,
        }
    }
}

/// Everything animated on one card.
#[derive(Debug, Clone)]
pub struct CardAmbience {
    pub shape: MonsterShape,
    pub blinker: Blinker,
    pub pupils: PupilWander,
    pub eyes_closed: bool,
}

impl CardAmbience {
    pub fn new<R: Rng + ?Sized>(text: &str, now: Instant, rng: &mut R) -> Self {
        let shape = MonsterShape::from_text(text);
        Self {
            blinker: Blinker::card(now, rng),
            pupils: PupilWander::new(now, shape.pupil_movement, rng),
            shape,
            eyes_closed: false,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        self.eyes_closed = self.blinker.update(now, rng);
        self.pupils.update(now, rng);
    }

    pub fn next_deadline(&self) -> Instant {
        self.blinker.next_deadline().min(self.pupils.next_deadline())
    }
}

/// Ambience for the cards currently on screen, keyed by prompt text.
#[derive(Debug, Default)]
pub struct AmbienceCache {
    cards: HashMap<String, CardAmbience>,
}

impl AmbienceCache {
    /// Keep entries for `visible` texts only, creating missing ones, and advance them all.
    pub fn sync<'a, R: Rng + ?Sized>(
        &mut self,
        visible: impl IntoIterator<Item = &'a str>,
        now: Instant,
        rng: &mut R,
    ) {
        let visible: Vec<&str> = visible.into_iter().collect();
        self.cards.retain(|text, _| visible.contains(&text.as_str()));
        for text in visible {
            self.cards
                .entry(text.to_string())
                .or_insert_with(|| CardAmbience::new(text, now, rng))
                .update(now, rng);
        }
    }

    pub fn get(&self, text: &str) -> Option<&CardAmbience> {
        self.cards.get(text)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.cards.values().map(|c| c.next_deadline()).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_blinker_closes_then_reopens() {
        let mut rng = StdRng::seed_from_u64(1);
        let t0 = Instant::now();
        let mut b = Blinker::logo(t0, &mut rng);
        assert!(!b.update(t0, &mut rng));

        let first = b.next_deadline();
        assert!(first >= t0 + Duration::from_secs(3));
        assert!(first < t0 + Duration::from_secs(7));

        assert!(b.update(first, &mut rng));
        assert!(b.update(first + Duration::from_millis(100), &mut rng));
        assert!(!b.update(first + BLINK_DURATION, &mut rng));
        assert!(b.next_deadline() >= first + Duration::from_secs(3));
    }

    #[test]
    fn test_pupils_move_within_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let t0 = Instant::now();
        let mut p = PupilWander::new(t0, 1.2, &mut rng);
        let first = p.offset();
        assert!(first.0.abs() <= 4.8 && first.1.abs() <= 4.8);
        assert_eq!(p.update(t0 + Duration::from_secs(5), &mut rng), first);
        assert!(p.next_deadline() >= t0 + Duration::from_secs(10));
    }

    #[test]
    fn test_monster_shape_deterministic_and_bounded() {
        let a = MonsterShape::from_text("Was hast du heute gelernt?");
        let b = MonsterShape::from_text("Was hast du heute gelernt?");
        assert_eq!(a, b);
        for text in ["", "x", "Ein längerer Text mit Umlauten äöü", "Aktion!"] {
            let s = MonsterShape::from_text(text);
            assert!((0.8..=1.0).contains(&s.size));
            assert!((0.2..=0.3).contains(&s.overflow.abs()));
            assert!((0.8..=1.2).contains(&s.pupil_movement));
            assert!((1.0..=1.3).contains(&s.pupil_scale));
        }
    }

    #[test]
    fn test_cache_drops_offscreen_cards() {
        let mut rng = StdRng::seed_from_u64(3);
        let t0 = Instant::now();
        let mut cache = AmbienceCache::default();
        cache.sync(["a", "b", "c"], t0, &mut rng);
        assert_eq!(cache.cards.len(), 3);
        let b_shape = cache.get("b").map(|c| c.shape);
        cache.sync(["b", "d"], t0, &mut rng);
        assert_eq!(cache.cards.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").map(|c| c.shape), b_shape);
        assert!(cache.next_deadline().is_some());
    }
}
