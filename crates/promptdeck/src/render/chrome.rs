//! Header bar: logo, categories button and mode toggle.

use std::time::{Duration, Instant};

use eframe::egui;
use rand::Rng;

use crate::deck::sequencer::Mode;
use crate::render::ambient::Blinker;
use crate::render::transition::{TransitionDirection, ease_in_out, lerp, progress_between};
use crate::theme::{ColorPair, Theme};

const SPIN_DURATION: Duration = Duration::from_millis(600);
pub const HEADER_HEIGHT: f32 = 72.0;
const TITLE: &str = "Journaling";

/// The smiley in the header. Spins a full turn per committed slide and follows drags.
#[derive(Debug, Clone)]
pub struct Logo {
    blinker: Blinker,
    eyes_closed: bool,
    resting_deg: f32,
    spin_from: f32,
    spin_start: Option<Instant>,
}

impl Logo {
    pub fn new<R: Rng + ?Sized>(now: Instant, rng: &mut R) -> Self {
        Self {
            blinker: Blinker::logo(now, rng),
            eyes_closed: false,
            resting_deg: 0.0,
            spin_from: 0.0,
            spin_start: None,
        }
    }

    pub fn spin(&mut self, direction: TransitionDirection, now: Instant) {
        self.spin_from = self.rotation_deg(now, 0.0);
        self.resting_deg -= direction.exit_sign() * 360.0;
        self.spin_start = Some(now);
    }

    /// Current rotation. `drag_turns` is the extra fraction of a turn from a live drag.
    pub fn rotation_deg(&self, now: Instant, drag_turns: f32) -> f32 {
        let base = match self.spin_start {
            Some(start) => {
                let t = ease_in_out(progress_between(start, now, SPIN_DURATION));
                lerp(self.spin_from, self.resting_deg, t)
            }
            None => self.resting_deg,
        };
        base + drag_turns * 360.0
    }

    pub fn is_spinning(&self) -> bool {
        self.spin_start.is_some()
    }

    pub fn eyes_closed(&self) -> bool {
        self.eyes_closed
    }

    pub fn update<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        self.eyes_closed = self.blinker.update(now, rng);
        if self
            .spin_start
            .is_some_and(|start| now.duration_since(start) >= SPIN_DURATION)
        {
            self.spin_start = None;
        }
    }

    /// Next instant the logo changes on its own.
    pub fn next_deadline(&self) -> Instant {
        let blink = self.blinker.next_deadline();
        match self.spin_start {
            Some(start) => blink.min(start + SPIN_DURATION),
            None => blink,
        }
    }
}

pub fn draw_logo(
    painter: &egui::Painter,
    center: egui::Pos2,
    radius: f32,
    rotation_deg: f32,
    eyes_closed: bool,
    theme: &Theme,
) {
    let rot = egui::emath::Rot2::from_angle(rotation_deg.to_radians());
    let at = |v: egui::Vec2| center + rot * (v * radius);
    let ink = egui::Color32::BLACK;

    painter.circle_filled(center, radius, theme.logo_face);
    for x in [-0.35, 0.35] {
        if eyes_closed {
            painter.line_segment(
                [at(egui::vec2(x - 0.12, -0.25)), at(egui::vec2(x + 0.12, -0.25))],
                egui::Stroke::new(radius * 0.1, ink),
            );
        } else {
            painter.circle_filled(at(egui::vec2(x, -0.25)), radius * 0.12, ink);
        }
    }
    let mouth: Vec<egui::Pos2> = (0..=12)
        .map(|i| {
            let a = std::f32::consts::PI * (0.15 + 0.7 * i as f32 / 12.0);
            at(egui::vec2(a.cos() * 0.55, 0.05 + a.sin() * 0.45))
        })
        .collect();
    painter.add(egui::Shape::line(
        mouth,
        egui::Stroke::new(radius * 0.1, ink),
    ));
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeaderResponse {
    pub categories_clicked: bool,
    pub mode_clicked: bool,
}

/// Draw the header across the top of `rect` and report clicks on its buttons.
#[allow(clippy::too_many_arguments)]
pub fn draw_header(
    ui: &egui::Ui,
    rect: egui::Rect,
    colors: ColorPair,
    theme: &Theme,
    scale: f32,
    logo: &Logo,
    logo_rotation: f32,
    mode: Mode,
) -> HeaderResponse {
    let painter = ui.painter();
    let height = HEADER_HEIGHT * scale;
    let pad = 24.0 * scale;
    let mid_y = rect.top() + height / 2.0;

    let radius = 18.0 * scale;
    let logo_center = egui::pos2(rect.left() + pad + radius, mid_y);
    draw_logo(
        painter,
        logo_center,
        radius,
        logo_rotation,
        logo.eyes_closed(),
        theme,
    );

    let title = painter.layout_no_wrap(
        TITLE.to_string(),
        egui::FontId::proportional(theme.header_size * scale),
        colors.accent,
    );
    let title_pos = egui::pos2(
        logo_center.x + radius + 12.0 * scale,
        mid_y - title.rect.height() / 2.0,
    );
    painter.galley(title_pos, title, colors.accent);

    let mut right = rect.right() - pad;
    let mut button = |label: &str, id: &str, active: bool| -> bool {
        let fg = if active { colors.background } else { colors.accent };
        let galley = painter.layout_no_wrap(
            label.to_string(),
            egui::FontId::proportional(theme.label_size * scale),
            fg,
        );
        let size = galley.rect.size() + egui::vec2(28.0, 14.0) * scale;
        let button_rect =
            egui::Rect::from_min_size(egui::pos2(right - size.x, mid_y - size.y / 2.0), size);
        right = button_rect.left() - 12.0 * scale;

        let response = ui.interact(button_rect, ui.id().with(id), egui::Sense::click());
        let fill = if active {
            colors.accent
        } else if response.hovered() {
            Theme::with_opacity(colors.accent, 0.15)
        } else {
            egui::Color32::TRANSPARENT
        };
        painter.rect_filled(button_rect, size.y / 2.0, fill);
        painter.rect_stroke(
            button_rect,
            size.y / 2.0,
            egui::Stroke::new(1.5 * scale, colors.accent),
            egui::StrokeKind::Inside,
        );
        painter.galley(
            button_rect.min + egui::vec2(14.0, 7.0) * scale,
            galley,
            fg,
        );
        response.clicked()
    };

    let categories_clicked = button("Kategorien", "categories", false);
    let mode_clicked = button("Nur Fragen", "mode", mode == Mode::QuestionsOnly);

    HeaderResponse {
        categories_clicked,
        mode_clicked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_logo_spins_one_turn_per_commit() {
        let mut rng = StdRng::seed_from_u64(4);
        let t0 = Instant::now();
        let mut logo = Logo::new(t0, &mut rng);
        assert_eq!(logo.rotation_deg(t0, 0.0), 0.0);

        logo.spin(TransitionDirection::Forward, t0);
        assert_eq!(logo.rotation_deg(t0, 0.0), 0.0);
        let done = t0 + SPIN_DURATION;
        assert_eq!(logo.rotation_deg(done, 0.0), 360.0);

        logo.update(done, &mut rng);
        logo.spin(TransitionDirection::Backward, done);
        assert_eq!(logo.rotation_deg(done + SPIN_DURATION, 0.0), 0.0);
    }

    #[test]
    fn test_logo_follows_drag() {
        let mut rng = StdRng::seed_from_u64(5);
        let t0 = Instant::now();
        let logo = Logo::new(t0, &mut rng);
        assert_eq!(logo.rotation_deg(t0, 0.25), 90.0);
        assert_eq!(logo.rotation_deg(t0, -0.5), -180.0);
    }

    #[test]
    fn test_logo_deadline_includes_spin_end() {
        let mut rng = StdRng::seed_from_u64(6);
        let t0 = Instant::now();
        let mut logo = Logo::new(t0, &mut rng);
        logo.spin(TransitionDirection::Forward, t0);
        assert!(logo.next_deadline() <= t0 + SPIN_DURATION);
    }
}
