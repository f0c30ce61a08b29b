//! Colours for the dump, the status line, and the progress gauge.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Whether colour output is enabled.
///
/// Determined by:
/// - `--no-color` CLI flag (disables colors)
/// - `NO_COLOR` environment variable (any value disables colors)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Explicit colour setting.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colour setting from the `--no-color` flag and the environment.
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== HexStyles =====

/// Styles used when drawing a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexStyles {
    /// Regular text.
    pub normal: Style,
    /// Leading zero digits, zero bits, control-byte glyphs, status decorations.
    pub dim: Style,
    /// Error messages.
    pub error: Style,
    /// Filled part of the progress gauge.
    pub gauge: Style,
    /// Character under the prompt cursor.
    pub cursor: Style,
}

impl HexStyles {
    /// Styles for the given colour setting.
    ///
    /// Without colour, dimmed text and errors use the default style. The gauge and the
    /// prompt cursor use modifiers only and look the same either way.
    pub fn with_color_config(config: ColorConfig) -> Self {
        let gauge = Style::default().add_modifier(Modifier::REVERSED);
        let cursor = Style::default().add_modifier(Modifier::UNDERLINED);
        if config.colors_enabled() {
            Self {
                normal: Style::default(),
                dim: Style::default().fg(Color::DarkGray),
                error: Style::default().fg(Color::Red),
                gauge,
                cursor,
            }
        } else {
            Self {
                normal: Style::default(),
                dim: Style::default(),
                error: Style::default(),
                gauge,
                cursor,
            }
        }
    }
}

impl Default for HexStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}

// ===== Tests =====
