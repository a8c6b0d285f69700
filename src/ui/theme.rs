use ratatui::style::Color;

use crate::config::ColorsConfig;
use crate::reconcile::{Parity, Severity};
use crate::system::history::MetricKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Auto,
    Truecolor,
    Color256,
    Mono,
}

impl ColorSupport {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "truecolor" | "24bit" => ColorSupport::Truecolor,
            "256" | "256color" => ColorSupport::Color256,
            "mono" | "monochrome" => ColorSupport::Mono,
            _ => ColorSupport::Auto,
        }
    }
}

pub fn detect_color_support() -> ColorSupport {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::Truecolor;
    }
    ColorSupport::Color256
}

pub fn resolve_color_support(config: &str) -> ColorSupport {
    let parsed = ColorSupport::from_config_str(config);
    if parsed == ColorSupport::Auto {
        detect_color_support()
    } else {
        parsed
    }
}

/// Severity colors from config, applied over whichever theme is active.
#[derive(Debug, Clone)]
pub struct SeverityOverrides {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl SeverityOverrides {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        Self {
            high: colors.severity_high.clone(),
            medium: colors.severity_medium.clone(),
            low: colors.severity_low.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub focus_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub row_even_bg: Color,
    pub row_odd_bg: Color,
    pub selection_bg: Color,
    /// cpu, memory, disk, gpu, gpu memory
    pub chart_colors: [Color; 5],
    /// high, medium, low
    pub severity_colors: [Color; 3],
}

impl Theme {
    pub fn from_config(theme_name: &str, severity: &SeverityOverrides, support: ColorSupport) -> Self {
        let mut theme = match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        };

        if support == ColorSupport::Mono {
            theme = Self::mono();
        } else {
            theme.apply_severity_overrides(severity);
        }
        theme.apply_color_support(support);
        theme
    }

    pub fn next(&self, severity: &SeverityOverrides, support: ColorSupport) -> Self {
        if support == ColorSupport::Mono {
            return Self::mono();
        }
        let next_name = match self.name {
            "dark" => "light",
            _ => "dark",
        };
        Theme::from_config(next_name, severity, support)
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::High => self.severity_colors[0],
            Severity::Medium => self.severity_colors[1],
            Severity::Low => self.severity_colors[2],
        }
    }

    pub fn row_bg(&self, parity: Parity) -> Color {
        match parity {
            Parity::Even => self.row_even_bg,
            Parity::Odd => self.row_odd_bg,
        }
    }

    pub fn chart_color(&self, kind: MetricKind) -> Color {
        let idx = MetricKind::ALL
            .iter()
            .position(|&k| k == kind)
            .unwrap_or(0);
        self.chart_colors[idx]
    }

    fn apply_severity_overrides(&mut self, severity: &SeverityOverrides) {
        let high = parse_hex_color(&severity.high);
        let medium = parse_hex_color(&severity.medium);
        let low = parse_hex_color(&severity.low);

        if let (Some(high), Some(medium), Some(low)) = (high, medium, low) {
            self.severity_colors = [high, medium, low];
        }
    }

    fn apply_color_support(&mut self, support: ColorSupport) {
        let map = |c: Color| adapt_color(c, support);

        self.header_accent_bg = map(self.header_accent_bg);
        self.header_accent_fg = map(self.header_accent_fg);
        self.status_ok = map(self.status_ok);
        self.status_err = map(self.status_err);
        self.statusbar_bg = map(self.statusbar_bg);
        self.overlay_border = map(self.overlay_border);
        self.focus_border = map(self.focus_border);
        self.text_primary = map(self.text_primary);
        self.text_secondary = map(self.text_secondary);
        self.pill_key_bg = map(self.pill_key_bg);
        self.pill_key_fg = map(self.pill_key_fg);
        self.pill_desc_fg = map(self.pill_desc_fg);
        self.surface_bg = map(self.surface_bg);
        self.row_even_bg = map(self.row_even_bg);
        self.row_odd_bg = map(self.row_odd_bg);
        self.selection_bg = map(self.selection_bg);

        self.chart_colors = self.chart_colors.map(map);
        self.severity_colors = self.severity_colors.map(map);
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            focus_border: Color::Green,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            row_even_bg: Color::Rgb(30, 34, 42),
            row_odd_bg: Color::Rgb(22, 25, 31),
            selection_bg: Color::Rgb(60, 70, 95),
            chart_colors: [
                Color::Rgb(231, 76, 60),
                Color::Rgb(52, 152, 219),
                Color::Rgb(255, 140, 0),
                Color::Rgb(119, 25, 170),
                Color::Rgb(209, 52, 56),
            ],
            severity_colors: [
                Color::Rgb(231, 76, 60),
                Color::Rgb(243, 156, 18),
                Color::Rgb(39, 174, 96),
            ],
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            status_ok: Color::Rgb(0, 120, 0),
            status_err: Color::Red,
            statusbar_bg: Color::Rgb(220, 220, 220),
            overlay_border: Color::Rgb(150, 150, 150),
            focus_border: Color::Blue,
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            row_even_bg: Color::Rgb(240, 240, 240),
            row_odd_bg: Color::Rgb(255, 255, 255),
            selection_bg: Color::Rgb(190, 210, 240),
            chart_colors: [
                Color::Rgb(0, 120, 212),
                Color::Rgb(0, 166, 81),
                Color::Rgb(255, 140, 0),
                Color::Rgb(119, 25, 170),
                Color::Rgb(209, 52, 56),
            ],
            severity_colors: [
                Color::Rgb(192, 57, 43),
                Color::Rgb(211, 84, 0),
                Color::Rgb(30, 132, 73),
            ],
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::Black,
            header_accent_fg: Color::White,
            status_ok: Color::White,
            status_err: Color::White,
            statusbar_bg: Color::Black,
            overlay_border: Color::White,
            focus_border: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            row_even_bg: Color::Black,
            row_odd_bg: Color::Black,
            selection_bg: Color::DarkGray,
            chart_colors: [Color::White; 5],
            severity_colors: [Color::White, Color::Gray, Color::DarkGray],
        }
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn adapt_color(color: Color, support: ColorSupport) -> Color {
    match support {
        ColorSupport::Truecolor | ColorSupport::Auto => color,
        ColorSupport::Color256 => match color {
            Color::Rgb(r, g, b) => Color::Indexed(rgb_to_ansi256(r, g, b)),
            _ => color,
        },
        ColorSupport::Mono => match color {
            Color::Rgb(r, g, b) => {
                let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                if luminance > 128.0 {
                    Color::White
                } else {
                    Color::Black
                }
            }
            Color::White | Color::Black | Color::Gray | Color::DarkGray => color,
            _ => Color::White,
        },
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let r = (r as f32 / 255.0 * 5.0).round() as u8;
    let g = (g as f32 / 255.0 * 5.0).round() as u8;
    let b = (b as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * r + 6 * g + b
}
