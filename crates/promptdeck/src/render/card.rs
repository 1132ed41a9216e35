//! Painting a single prompt card at an arbitrary pose.

use eframe::egui;
use egui::emath::Rot2;
use egui::{Pos2, Rect, Stroke, Vec2};

use crate::carousel::layout::CardTransform;
use crate::render::ambient::CardAmbience;
use crate::theme::{ColorPair, Theme};

const CORNER_SEGMENTS: usize = 6;
const PADDING: f32 = 40.0;
const MONSTER_SIZE: f32 = 120.0;

/// Where a card ends up on screen: its rest rect moved, scaled and rotated by a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardGeometry {
    pub center: Pos2,
    pub size: Vec2,
    pub rotation: Rot2,
    pub scale: f32,
}

impl CardGeometry {
    pub fn new(rest: Rect, transform: &CardTransform) -> Self {
        Self {
            center: rest.center() + egui::vec2(transform.translate_x, 0.0),
            size: rest.size() * transform.scale,
            rotation: Rot2::from_angle(transform.rotation_deg.to_radians()),
            scale: transform.scale,
        }
    }

    pub fn angle(&self) -> f32 {
        self.rotation.angle()
    }

    /// Map a point given relative to the unscaled card center.
    pub fn to_screen(&self, local: Vec2) -> Pos2 {
        self.center + self.rotation * (local * self.scale)
    }

    pub fn half_extent(&self) -> Vec2 {
        self.size / (2.0 * self.scale.max(f32::EPSILON))
    }

    /// Whether a screen point lies on the card in its current pose.
    pub fn contains(&self, pos: Pos2) -> bool {
        let local = self.rotation.inverse() * (pos - self.center);
        local.x.abs() <= self.size.x / 2.0 && local.y.abs() <= self.size.y / 2.0
    }
}

/// Outline of a rounded rectangle centered on the origin, clockwise from the top-left arc.
pub fn rounded_rect_outline(size: Vec2, radius: f32) -> Vec<Vec2> {
    let half = size / 2.0;
    let r = radius.min(half.x).min(half.y).max(0.0);
    let corners = [
        (egui::vec2(-half.x + r, -half.y + r), std::f32::consts::PI),
        (egui::vec2(half.x - r, -half.y + r), 1.5 * std::f32::consts::PI),
        (egui::vec2(half.x - r, half.y - r), 0.0),
        (egui::vec2(-half.x + r, half.y - r), 0.5 * std::f32::consts::PI),
    ];
    let mut points = Vec::with_capacity(corners.len() * (CORNER_SEGMENTS + 1));
    for (center, start) in corners {
        for step in 0..=CORNER_SEGMENTS {
            let a = start + step as f32 / CORNER_SEGMENTS as f32 * std::f32::consts::FRAC_PI_2;
            points.push(center + egui::vec2(a.cos(), a.sin()) * r);
        }
    }
    points
}

fn ellipse_outline(center: Vec2, radii: Vec2) -> Vec<Vec2> {
    (0..24)
        .map(|i| {
            let a = i as f32 / 24.0 * std::f32::consts::TAU;
            center + egui::vec2(a.cos() * radii.x, a.sin() * radii.y)
        })
        .collect()
}

/// What goes on a card face.
pub struct CardFace<'a> {
    pub text: &'a str,
    pub category: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub colors: ColorPair,
    pub ambience: Option<&'a CardAmbience>,
}

pub fn draw_card(painter: &egui::Painter, geometry: &CardGeometry, face: &CardFace, theme: &Theme) {
    let local_size = geometry.half_extent() * 2.0;
    let outline: Vec<Pos2> = rounded_rect_outline(local_size, theme.card_radius)
        .into_iter()
        .map(|p| geometry.to_screen(p))
        .collect();
    painter.add(egui::Shape::convex_polygon(
        outline,
        face.colors.accent,
        Stroke::NONE,
    ));

    let half = geometry.half_extent();
    let angle = geometry.angle();
    let mut top = -half.y + PADDING;

    // Category and kind labels share the top line.
    let label_font = egui::FontId::proportional(theme.label_size * geometry.scale);
    let label_color = Theme::with_opacity(theme.card_text, 0.6);
    if let Some(category) = face.category {
        let galley = painter.layout_no_wrap(category.to_string(), label_font.clone(), label_color);
        let height = galley.rect.height() / geometry.scale.max(f32::EPSILON);
        let pos = geometry.to_screen(egui::vec2(-half.x + PADDING, top));
        painter.add(egui::epaint::TextShape::new(pos, galley, label_color).with_angle(angle));
        if let Some(kind) = face.kind {
            let galley = painter.layout_no_wrap(kind.to_uppercase(), label_font, label_color);
            let width = galley.rect.width() / geometry.scale.max(f32::EPSILON);
            let pos = geometry.to_screen(egui::vec2(half.x - PADDING - width, top));
            painter.add(egui::epaint::TextShape::new(pos, galley, label_color).with_angle(angle));
        }
        top += height + PADDING / 2.0;
    }

    let wrap = (local_size.x - PADDING * 2.0) * geometry.scale;
    let galley = painter.layout(
        face.text.to_string(),
        egui::FontId::proportional(theme.prompt_size * geometry.scale),
        theme.card_text,
        wrap.max(1.0),
    );
    let pos = geometry.to_screen(egui::vec2(-half.x + PADDING, top));
    painter.add(egui::epaint::TextShape::new(pos, galley, theme.card_text).with_angle(angle));

    if let Some(ambience) = face.ambience {
        draw_monster(painter, geometry, ambience, face.colors);
    }
}

/// The little creature peeking over the bottom edge of a card.
fn draw_monster(
    painter: &egui::Painter,
    geometry: &CardGeometry,
    ambience: &CardAmbience,
    colors: ColorPair,
) {
    let shape = &ambience.shape;
    let half = geometry.half_extent();
    let radii = egui::vec2(
        MONSTER_SIZE * shape.size * shape.width_factor,
        MONSTER_SIZE * shape.size * shape.height_factor,
    ) / 2.0;
    let side = shape.overflow.signum();
    let body = egui::vec2(
        side * (half.x - radii.x + shape.overflow.abs() * radii.x * 2.0),
        half.y - radii.y * 0.6,
    );

    let to_screen = |points: Vec<Vec2>| -> Vec<Pos2> {
        points.into_iter().map(|p| geometry.to_screen(p)).collect()
    };
    painter.add(egui::Shape::convex_polygon(
        to_screen(ellipse_outline(body, radii)),
        colors.background,
        Stroke::NONE,
    ));

    let eye_radius = egui::vec2(10.0, 10.0 * shape.eye_stretch);
    let pupil_radius = 4.5 * shape.pupil_scale;
    let (px, py) = ambience.pupils.offset();
    let spacing = radii.x * 0.35;
    let eye_line = body + egui::vec2(shape.eye_shift.0, -radii.y * 0.35 + shape.eye_shift.1);

    for dx in [-spacing, spacing] {
        let eye = eye_line + egui::vec2(dx, 0.0);
        if ambience.eyes_closed {
            painter.line_segment(
                [
                    geometry.to_screen(eye - egui::vec2(eye_radius.x, 0.0)),
                    geometry.to_screen(eye + egui::vec2(eye_radius.x, 0.0)),
                ],
                Stroke::new(2.5 * geometry.scale, egui::Color32::WHITE),
            );
            continue;
        }
        painter.add(egui::Shape::convex_polygon(
            to_screen(ellipse_outline(eye, eye_radius)),
            egui::Color32::WHITE,
            Stroke::NONE,
        ));
        painter.circle_filled(
            geometry.to_screen(eye + egui::vec2(px, py)),
            pupil_radius * geometry.scale,
            egui::Color32::BLACK,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest() -> Rect {
        Rect::from_center_size(egui::pos2(500.0, 400.0), egui::vec2(400.0, 600.0))
    }

    #[test]
    fn test_neutral_geometry_matches_rest_rect() {
        let g = CardGeometry::new(rest(), &CardTransform::NEUTRAL);
        assert_eq!(g.center, egui::pos2(500.0, 400.0));
        assert_eq!(g.size, egui::vec2(400.0, 600.0));
        let corner = g.to_screen(egui::vec2(-200.0, -300.0));
        assert!((corner.x - 300.0).abs() < 1e-3);
        assert!((corner.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_parked_geometry_is_scaled_and_shifted() {
        let t = CardTransform {
            translate_x: 416.0,
            scale: 0.8,
            ..CardTransform::NEUTRAL
        };
        let g = CardGeometry::new(rest(), &t);
        assert_eq!(g.center, egui::pos2(916.0, 400.0));
        assert_eq!(g.size, egui::vec2(320.0, 480.0));
        assert_eq!(g.half_extent(), egui::vec2(200.0, 300.0));
        let edge = g.to_screen(egui::vec2(200.0, 0.0));
        assert!((edge.x - 1076.0).abs() < 1e-3);
    }

    #[test]
    fn test_contains_follows_pose() {
        let t = CardTransform {
            translate_x: -150.0,
            rotation_deg: 10.0,
            ..CardTransform::NEUTRAL
        };
        let g = CardGeometry::new(rest(), &t);
        assert!(g.contains(egui::pos2(350.0, 400.0)));
        assert!(!g.contains(egui::pos2(350.0, 750.0)));
        // Inside the rest rect but left behind by the shift.
        assert!(!g.contains(egui::pos2(690.0, 400.0)));
        // The rotated bottom-right corner reaches past the unrotated one.
        let corner = g.to_screen(egui::vec2(195.0, 295.0));
        assert!(g.contains(corner));
    }

    #[test]
    fn test_rotation_tilts_top_edge() {
        let t = CardTransform {
            rotation_deg: 5.0,
            ..CardTransform::NEUTRAL
        };
        let g = CardGeometry::new(rest(), &t);
        let left = g.to_screen(egui::vec2(-200.0, -300.0));
        let right = g.to_screen(egui::vec2(200.0, -300.0));
        // Clockwise tilt in screen space drops the right corner.
        assert!(right.y > left.y);
    }

    #[test]
    fn test_rounded_outline_stays_inside_bounds() {
        let size = egui::vec2(200.0, 100.0);
        let points = rounded_rect_outline(size, 30.0);
        assert_eq!(points.len(), 4 * (CORNER_SEGMENTS + 1));
        for p in &points {
            assert!(p.x.abs() <= 100.0 + 1e-3);
            assert!(p.y.abs() <= 50.0 + 1e-3);
        }
        assert!(points.iter().any(|p| (p.y + 50.0).abs() < 1e-3));
        assert!(points.iter().any(|p| (p.x - 100.0).abs() < 1e-3));
    }

    #[test]
    fn test_radius_clamped_to_half_size() {
        let points = rounded_rect_outline(egui::vec2(40.0, 40.0), 100.0);
        for p in &points {
            assert!((p.length() - 20.0).abs() < 1e-3);
        }
    }
}
