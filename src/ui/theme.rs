//! Color themes and styling utilities.
//!
//! Surfaces go from the app background (`surface[0]`) up to popovers
//! (`surface[4]`). Semantic colors cover accents, dividers and status.

use eframe::egui::{self, Color32, FontFamily, FontId, TextStyle};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct MurmurTheme {
    pub surface: [Color32; 5],
    pub accent: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,
    pub border_subtle: Color32,
    pub border_medium: Color32,
}

impl MurmurTheme {
    pub fn dark() -> Self {
        Self {
            surface: [
                Color32::from_rgb(10, 10, 15),  // app background
                Color32::from_rgb(19, 19, 26),  // panels
                Color32::from_rgb(28, 28, 38),  // message area
                Color32::from_rgb(37, 37, 50),  // hover
                Color32::from_rgb(56, 56, 74),  // popovers
            ],
            accent: Color32::from_rgb(88, 101, 242),
            success: Color32::from_rgb(67, 181, 129),
            warning: Color32::from_rgb(250, 166, 26),
            error: Color32::from_rgb(240, 71, 71),
            text_primary: Color32::WHITE,
            text_secondary: Color32::from_rgb(185, 187, 190),
            text_muted: Color32::from_rgb(114, 118, 125),
            border_subtle: Color32::from_rgb(32, 34, 37),
            border_medium: Color32::from_rgb(47, 49, 54),
        }
    }

    pub fn light() -> Self {
        Self {
            surface: [
                Color32::from_rgb(255, 255, 255),
                Color32::from_rgb(246, 246, 247),
                Color32::from_rgb(242, 243, 245),
                Color32::from_rgb(227, 229, 232),
                Color32::from_rgb(196, 201, 208),
            ],
            accent: Color32::from_rgb(88, 101, 242),
            success: Color32::from_rgb(67, 181, 129),
            warning: Color32::from_rgb(250, 166, 26),
            error: Color32::from_rgb(240, 71, 71),
            text_primary: Color32::from_rgb(6, 6, 7),
            text_secondary: Color32::from_rgb(79, 86, 96),
            text_muted: Color32::from_rgb(116, 127, 141),
            border_subtle: Color32::from_rgb(230, 232, 236),
            border_medium: Color32::from_rgb(210, 213, 219),
        }
    }

    /// Theme by settings name; anything but "light" is dark.
    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.surface[0] == Self::dark().surface[0]
    }
}

pub fn configure_text_styles() -> BTreeMap<TextStyle, FontId> {
    use FontFamily::{Monospace, Proportional};

    [
        (TextStyle::Small, FontId::new(10.0, Proportional)),
        (TextStyle::Body, FontId::new(14.0, Proportional)),
        (TextStyle::Button, FontId::new(13.0, Proportional)),
        (TextStyle::Heading, FontId::new(16.0, Proportional)),
        (TextStyle::Monospace, FontId::new(13.0, Monospace)),
        (TextStyle::Name("timestamp".into()), FontId::new(11.0, Monospace)),
        (TextStyle::Name("author".into()), FontId::new(13.0, Proportional)),
    ]
    .into()
}

pub fn apply_app_style(ctx: &egui::Context, theme: &MurmurTheme) {
    ctx.set_visuals(if theme.is_dark() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });

    let mut style = (*ctx.style()).clone();
    style.text_styles = configure_text_styles();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(12);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);

    for widget in [
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
    ] {
        widget.corner_radius = egui::CornerRadius::same(6);
        widget.bg_stroke = egui::Stroke::NONE;
    }
    style.visuals.widgets.active.bg_fill = theme.accent;
    style.visuals.widgets.active.weak_bg_fill = theme.accent;
    style.visuals.selection.bg_fill = theme.accent.linear_multiply(0.4);

    ctx.set_style(style);
}

const AUTHOR_COLORS: [Color32; 12] = [
    Color32::from_rgb(231, 76, 60),
    Color32::from_rgb(46, 204, 113),
    Color32::from_rgb(52, 152, 219),
    Color32::from_rgb(155, 89, 182),
    Color32::from_rgb(241, 196, 15),
    Color32::from_rgb(230, 126, 34),
    Color32::from_rgb(26, 188, 156),
    Color32::from_rgb(236, 100, 166),
    Color32::from_rgb(41, 128, 185),
    Color32::from_rgb(39, 174, 96),
    Color32::from_rgb(211, 84, 0),
    Color32::from_rgb(102, 178, 255),
];

/// Stable per-author color (FNV-1a over the id).
pub fn author_color(author_id: &str) -> Color32 {
    let mut hash: u64 = 1469598103934665603u64;
    for b in author_id.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(1099511628211u64);
    }
    AUTHOR_COLORS[(hash as usize) % AUTHOR_COLORS.len()]
}
