use eframe::egui::Color32;

/// Card accent and page background for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub accent: Color32,
    pub background: Color32,
}

impl ColorPair {
    /// Used for intro slides and when nothing is shown.
    pub const NEUTRAL: ColorPair = ColorPair {
        accent: Color32::WHITE,
        background: Color32::BLACK,
    };

    const fn hsl(accent: (f32, f32, f32), background: (f32, f32, f32)) -> HslPair {
        HslPair { accent, background }
    }

    /// sRGB blend toward `other` by `t` in 0..=1.
    pub fn blend(&self, other: &ColorPair, t: f32) -> ColorPair {
        ColorPair {
            accent: mix(self.accent, other.accent, t),
            background: mix(self.background, other.background, t),
        }
    }
}

struct HslPair {
    accent: (f32, f32, f32),
    background: (f32, f32, f32),
}

impl HslPair {
    fn to_pair(&self) -> ColorPair {
        ColorPair {
            accent: hsl(self.accent),
            background: hsl(self.background),
        }
    }
}

const PALETTE: [HslPair; 11] = [
    ColorPair::hsl((335.0, 100.0, 81.0), (347.0, 95.0, 12.0)),
    ColorPair::hsl((182.0, 87.0, 68.0), (250.0, 95.0, 12.0)),
    ColorPair::hsl((259.0, 45.0, 72.0), (0.0, 65.0, 10.0)),
    ColorPair::hsl((335.0, 100.0, 90.0), (14.0, 100.0, 25.0)),
    ColorPair::hsl((289.0, 100.0, 79.0), (281.0, 100.0, 10.0)),
    ColorPair::hsl((76.0, 100.0, 75.0), (159.0, 100.0, 10.0)),
    ColorPair::hsl((307.0, 100.0, 80.0), (23.0, 98.0, 18.0)),
    ColorPair::hsl((157.0, 100.0, 87.0), (178.0, 93.0, 12.0)),
    ColorPair::hsl((157.0, 100.0, 50.0), (170.0, 100.0, 10.0)),
    ColorPair::hsl((200.0, 100.0, 77.0), (205.0, 100.0, 14.0)),
    ColorPair::hsl((70.0, 100.0, 49.0), (187.0, 94.0, 10.0)),
];

/// Known categories and their palette slot.
const KNOWN_CATEGORIES: &[(&str, usize)] = &[
    ("Körperliche Intimität", 0),
    ("Emotionale Intimität", 1),
    ("Kreative Intimität", 2),
    ("Geistige Intimität", 3),
    ("Alltagsintimität", 4),
    ("Spielerische Intimität", 5),
    ("Spirituelle Intimität", 6),
    ("Gemeinsame Abenteuer", 7),
];

/// Colors for a category. Unknown names use their first-appearance `position` modulo the
/// palette size.
pub fn category_colors(category: &str, position: usize) -> ColorPair {
    let slot = KNOWN_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, slot)| *slot)
        .unwrap_or(position % PALETTE.len());
    PALETTE[slot].to_pair()
}

/// Convert HSL (degrees, percent, percent) to an opaque color.
pub fn hsl((h, s, l): (f32, f32, f32)) -> Color32 {
    let s = s / 100.0;
    let l = l / 100.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}

/// Mix two colors in gamma (sRGB) space.
pub fn mix(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let channel = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        channel(a.r(), b.r()),
        channel(a.g(), b.g()),
        channel(a.b(), b.b()),
        channel(a.a(), b.a()),
    )
}

/// Text colors and sizes for the window chrome.
#[derive(Debug, Clone)]
pub struct Theme {
    pub card_text: Color32,
    pub panel: Color32,
    pub logo_face: Color32,
    pub prompt_size: f32,
    pub label_size: f32,
    pub header_size: f32,
    pub card_radius: f32,
    pub gutter: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            card_text: Color32::BLACK,
            panel: Color32::from_rgb(0x12, 0x12, 0x12),
            logo_face: Color32::from_rgb(0xFF, 0xFF, 0x33),
            prompt_size: 34.0,
            label_size: 15.0,
            header_size: 22.0,
            card_radius: 28.0,
            gutter: 16.0,
        }
    }
}

impl Theme {
    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }
}
