//! Per-frame card transforms and chrome colors for the carousel.
//!
//! Only slides within two positions of the current one are ever placed, so the work per
//! frame is constant no matter how long the deck is.

use crate::render::transition::{TransitionDirection, ease_out_cubic, lerp};
use crate::theme::ColorPair;

/// Drag distance at which the stack animation is complete.
pub const DRAG_NORMALIZATION: f32 = 300.0;
/// Scale of parked neighbor cards.
pub const PARKED_SCALE: f32 = 0.8;
/// Rotation of a card at full drag progress, in degrees.
pub const MAX_ROTATION: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Prev2,
    Prev,
    Current,
    Next,
    Next2,
}

impl Slot {
    pub const ALL: [Slot; 5] = [Slot::Prev2, Slot::Prev, Slot::Current, Slot::Next, Slot::Next2];

    pub fn offset(&self) -> isize {
        match self {
            Slot::Prev2 => -2,
            Slot::Prev => -1,
            Slot::Current => 0,
            Slot::Next => 1,
            Slot::Next2 => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub translate_x: f32,
    pub scale: f32,
    pub rotation_deg: f32,
    pub z_index: u8,
    pub visible: bool,
}

impl CardTransform {
    pub const NEUTRAL: CardTransform = CardTransform {
        translate_x: 0.0,
        scale: 1.0,
        rotation_deg: 0.0,
        z_index: 2,
        visible: true,
    };

    fn parked(translate_x: f32, visible: bool) -> Self {
        Self {
            translate_x,
            scale: PARKED_SCALE,
            rotation_deg: 0.0,
            z_index: 1,
            visible,
        }
    }

    fn lerp(&self, to: &CardTransform, t: f32) -> CardTransform {
        CardTransform {
            translate_x: lerp(self.translate_x, to.translate_x, t),
            scale: lerp(self.scale, to.scale, t),
            rotation_deg: lerp(self.rotation_deg, to.rotation_deg, t),
            z_index: self.z_index.max(to.z_index),
            visible: self.visible || to.visible,
        }
    }
}

/// What the deck is doing this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Resting,
    /// Live drag, offset in pixels.
    Dragging { offset: f32 },
    /// Cancelled drag easing back to rest.
    Settling { offset: f32 },
    /// Committed move. `progress` is eased, `raw_progress` linear.
    Transitioning {
        direction: TransitionDirection,
        progress: f32,
        raw_progress: f32,
        release_offset: f32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutInput {
    pub index: usize,
    pub len: usize,
    pub motion: Motion,
    pub card_width: f32,
    pub gutter: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedCard {
    pub index: usize,
    pub slot: Slot,
    pub transform: CardTransform,
}

/// Normalized drag progress in 0..=1.
pub fn drag_progress(offset: f32) -> f32 {
    (offset.abs() / DRAG_NORMALIZATION).min(1.0)
}

/// Pose of the current card while held at `offset`.
fn held_pose(offset: f32) -> CardTransform {
    let p = drag_progress(offset);
    CardTransform {
        translate_x: offset,
        scale: (1.0 - p * (1.0 - PARKED_SCALE)).max(PARKED_SCALE),
        rotation_deg: offset.signum() * p * MAX_ROTATION,
        z_index: 2,
        visible: true,
    }
}

/// Pose of a neighbor while the current card is held at `offset`.
fn neighbor_pose(parked_x: f32, offset: f32, arriving: bool) -> CardTransform {
    let scale = if arriving {
        (PARKED_SCALE + drag_progress(offset) * (1.0 - PARKED_SCALE)).min(1.0)
    } else {
        PARKED_SCALE
    };
    CardTransform {
        translate_x: parked_x + offset,
        scale,
        rotation_deg: 0.0,
        z_index: 1,
        visible: true,
    }
}

/// Place the slides at relative positions -2..=2 around the current index.
pub fn place_cards(input: &LayoutInput) -> Vec<PlacedCard> {
    let stride = input.card_width + input.gutter;
    let mut cards = Vec::with_capacity(Slot::ALL.len());

    for slot in Slot::ALL {
        let Some(index) = input.index.checked_add_signed(slot.offset()) else {
            continue;
        };
        if index >= input.len {
            continue;
        }
        let side = slot.offset().signum() as f32;
        let parked_x = slot.offset() as f32 * stride;

        let transform = match (slot, input.motion) {
            (Slot::Prev2 | Slot::Next2, _) => CardTransform::parked(parked_x, false),
            (Slot::Current, Motion::Resting) => CardTransform::NEUTRAL,
            (_, Motion::Resting) => CardTransform::parked(parked_x, true),
            (Slot::Current, Motion::Dragging { offset } | Motion::Settling { offset }) => {
                held_pose(offset)
            }
            (_, Motion::Dragging { offset } | Motion::Settling { offset }) => {
                // Dragging left (negative) brings in the next card.
                let arriving = offset != 0.0 && side == -offset.signum();
                neighbor_pose(parked_x, offset, arriving)
            }
            (
                slot,
                Motion::Transitioning {
                    direction,
                    progress,
                    release_offset,
                    ..
                },
            ) => {
                let exit = direction.exit_sign();
                match slot {
                    Slot::Current => {
                        let end = CardTransform {
                            translate_x: exit * stride,
                            scale: PARKED_SCALE,
                            rotation_deg: exit * MAX_ROTATION,
                            z_index: 2,
                            visible: true,
                        };
                        held_pose(release_offset).lerp(&end, progress)
                    }
                    _ if side == -exit => {
                        neighbor_pose(parked_x, release_offset, true)
                            .lerp(&CardTransform::NEUTRAL, progress)
                    }
                    _ => CardTransform::parked(parked_x, true),
                }
            }
        };

        cards.push(PlacedCard {
            index,
            slot,
            transform,
        });
    }

    cards.sort_by_key(|c| c.transform.z_index);
    cards
}

/// Background and accent colors for the window chrome this frame.
pub fn chrome_colors(
    input: &LayoutInput,
    colors_for: impl Fn(usize) -> Option<ColorPair>,
) -> ColorPair {
    let current = colors_for(input.index).unwrap_or(ColorPair::NEUTRAL);
    let toward = |direction: TransitionDirection| {
        direction
            .target(input.index, input.len)
            .and_then(&colors_for)
    };

    match input.motion {
        Motion::Resting => current,
        Motion::Dragging { offset } | Motion::Settling { offset } => {
            if offset == 0.0 {
                return current;
            }
            let direction = if offset < 0.0 {
                TransitionDirection::Forward
            } else {
                TransitionDirection::Backward
            };
            match toward(direction) {
                Some(target) => current.blend(&target, ease_out_cubic(drag_progress(offset))),
                None => current,
            }
        }
        Motion::Transitioning {
            direction,
            raw_progress,
            release_offset,
            ..
        } => match toward(direction) {
            Some(target) => {
                let t = lerp(drag_progress(release_offset), 1.0, raw_progress);
                current.blend(&target, ease_out_cubic(t))
            }
            None => current,
        },
    }
}
