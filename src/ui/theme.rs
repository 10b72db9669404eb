//! Theme for DramaTUI
//!
//! Dark cinema palette: near-black background, a single red brand color and
//! grays for secondary text.

use ratatui::style::{Color, Modifier, Style};

/// Color palette and style helpers
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // CORE PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Background: #0f0f0f
    pub const BACKGROUND: Color = Color::Rgb(0x0f, 0x0f, 0x0f);

    /// Primary: #e50914 (brand red)
    pub const PRIMARY: Color = Color::Rgb(0xe5, 0x09, 0x14);

    /// Accent: #facc15 (yellow, scores and key hints)
    pub const ACCENT: Color = Color::Rgb(0xfa, 0xcc, 0x15);

    /// Text: #e5e7eb
    pub const TEXT: Color = Color::Rgb(0xe5, 0xe7, 0xeb);

    /// Muted: #9ca3af
    pub const MUTED: Color = Color::Rgb(0x9c, 0xa3, 0xaf);

    /// Dim: #4b5563
    pub const DIM: Color = Color::Rgb(0x4b, 0x55, 0x63);

    /// Error: #ef4444
    pub const ERROR: Color = Color::Rgb(0xef, 0x44, 0x44);

    /// Panels and the progress track: #1f2937
    pub const PANEL: Color = Color::Rgb(0x1f, 0x29, 0x37);

    // ═══════════════════════════════════════════════════════════════════════
    // STYLE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND)
    }

    /// Secondary text
    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED)
    }

    /// Dimmed text
    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Title/header style
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Error style
    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    /// Accent text style
    pub fn accent() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Normal border
    pub fn border() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Loading/spinner indicator
    pub fn loading() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Progress bar filled portion
    pub fn progress_bar() -> Style {
        Style::default().fg(Self::PRIMARY).bg(Self::PANEL)
    }

    /// Keybinding hint style
    pub fn keybind() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    /// Keybinding description style
    pub fn keybind_desc() -> Style {
        Style::default().fg(Self::MUTED)
    }

    /// Status bar style
    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::PANEL)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// COLOR UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Relative luminance of an sRGB color (WCAG 2.0)
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// Contrast ratio between two colors, 1 to 21
pub fn contrast_ratio(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> f64 {
    let l1 = relative_luminance(fg.0, fg.1, fg.2);
    let l2 = relative_luminance(bg.0, bg.1, bg.2);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Extract RGB tuple from ratatui Color (only works for Rgb variant)
pub fn color_to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    match color {
        Color::Rgb(r, g, b) => Some((r, g, b)),
        _ => None,
    }
}
