//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Value stored in the local state store.
    pub fn key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Category strip --
    pub category_normal: Style,
    pub category_active: Style,

    // -- Search bar --
    pub search_input: Style,
    pub search_placeholder: Style,

    // -- Article list --
    pub article_title: Style,
    pub article_selected: Style,
    pub article_meta: Style,
    pub article_category: Style,
    pub bookmark_marker: Style,
    pub sentiment_positive: Style,
    pub sentiment_negative: Style,
    pub sentiment_neutral: Style,

    // -- Reader --
    pub reader_heading: Style,
    pub reader_body: Style,
    pub reader_metadata: Style,
    pub reader_code_block: Style,
    pub reader_inline_code: Style,
    pub reader_emphasis: Style,
    pub reader_strong: Style,
    pub reader_link: Style,

    // -- Chat --
    pub chat_user: Style,
    pub chat_assistant: Style,
    pub chat_pending: Style,
    pub chat_suggestion: Style,
    pub chat_topic: Style,

    // -- Trending --
    pub trending_label: Style,
    pub trending_bar: Style,

    // -- Error panel --
    pub error_title: Style,
    pub error_text: Style,
    pub error_hint: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub muted: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            category_normal: Style::default().fg(Color::Gray),
            category_active: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            search_input: Style::default().fg(Color::White),
            search_placeholder: Style::default().fg(Color::DarkGray),

            article_title: Style::default().add_modifier(Modifier::BOLD),
            article_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            article_meta: Style::default().fg(Color::DarkGray),
            article_category: Style::default().fg(Color::Cyan),
            bookmark_marker: Style::default().fg(Color::Yellow),
            sentiment_positive: Style::default().fg(Color::Green),
            sentiment_negative: Style::default().fg(Color::Red),
            sentiment_neutral: Style::default().fg(Color::Gray),

            reader_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            reader_body: Style::default(),
            reader_metadata: Style::default().fg(Color::DarkGray),
            reader_code_block: Style::default().fg(Color::Yellow).bg(Color::Black),
            reader_inline_code: Style::default().fg(Color::Yellow),
            reader_emphasis: Style::default().add_modifier(Modifier::ITALIC),
            reader_strong: Style::default().add_modifier(Modifier::BOLD),
            reader_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            chat_user: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            chat_assistant: Style::default(),
            chat_pending: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            chat_suggestion: Style::default().fg(Color::Magenta),
            chat_topic: Style::default().fg(Color::Black).bg(Color::Gray),

            trending_label: Style::default().add_modifier(Modifier::BOLD),
            trending_bar: Style::default().fg(Color::Cyan),

            error_title: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            error_text: Style::default().fg(Color::LightRed),
            error_hint: Style::default().fg(Color::Gray),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            muted: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light palette, adapted for light terminal backgrounds.
    fn light() -> Self {
        Self {
            category_normal: Style::default().fg(Color::DarkGray),
            category_active: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            search_input: Style::default().fg(Color::Black),
            search_placeholder: Style::default().fg(Color::Gray),

            article_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            article_selected: Style::default().bg(Color::Blue).fg(Color::White),
            article_meta: Style::default().fg(Color::DarkGray),
            article_category: Style::default().fg(Color::Blue),
            bookmark_marker: Style::default().fg(Color::Magenta),
            sentiment_positive: Style::default().fg(Color::Green),
            sentiment_negative: Style::default().fg(Color::Red),
            sentiment_neutral: Style::default().fg(Color::DarkGray),

            reader_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            reader_body: Style::default().fg(Color::Black),
            reader_metadata: Style::default().fg(Color::DarkGray),
            reader_code_block: Style::default().fg(Color::DarkGray).bg(Color::White),
            reader_inline_code: Style::default().fg(Color::DarkGray),
            reader_emphasis: Style::default().add_modifier(Modifier::ITALIC),
            reader_strong: Style::default().add_modifier(Modifier::BOLD),
            reader_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            chat_user: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            chat_assistant: Style::default().fg(Color::Black),
            chat_pending: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            chat_suggestion: Style::default().fg(Color::Magenta),
            chat_topic: Style::default().fg(Color::White).bg(Color::DarkGray),

            trending_label: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            trending_bar: Style::default().fg(Color::Blue),

            error_title: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            error_text: Style::default().fg(Color::Red),
            error_hint: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            muted: Style::default().fg(Color::Gray),
        }
    }

    /// Style for an article's sentiment badge.
    pub fn sentiment(&self, sentiment: crate::api::Sentiment) -> Style {
        use crate::api::Sentiment;
        match sentiment {
            Sentiment::Positive => self.sentiment_positive,
            Sentiment::Negative => self.sentiment_negative,
            Sentiment::Neutral => self.sentiment_neutral,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Sentiment;

    #[test]
    fn dark_focus_border_is_cyan() {
        let palette = ThemeVariant::Dark.palette();
        assert_eq!(
            palette.panel_border_focused,
            Style::default().fg(Color::Cyan)
        );
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.article_selected, light.article_selected);
        assert_ne!(dark.category_active, light.category_active);
        assert_ne!(dark.status_bar, light.status_bar);
    }

    #[test]
    fn sentiment_styles_are_distinct() {
        let palette = ThemeVariant::Dark.palette();
        assert_ne!(
            palette.sentiment(Sentiment::Positive),
            palette.sentiment(Sentiment::Negative)
        );
        assert_eq!(
            palette.sentiment(Sentiment::Neutral),
            palette.sentiment_neutral
        );
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("dark"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name(" Light "), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name("DARK"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn key_round_trips_through_parser() {
        for variant in [ThemeVariant::Dark, ThemeVariant::Light] {
            assert_eq!(ThemeVariant::from_str_name(variant.key()), Some(variant));
            assert_eq!(variant.next().next(), variant);
        }
    }
}
