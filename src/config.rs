use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub operator: OperatorConfig,
    pub colors: ColorsConfig,
    pub keybinds: KeybindsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Cadence of the metric charts.
    pub metrics_interval_ms: u64,
    /// Cadence of the process tables.
    pub table_interval_ms: u64,
    pub history_length: usize,
    pub default_sort: String,
    pub color_support: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            metrics_interval_ms: 500,
            table_interval_ms: 1000,
            history_length: 60,
            default_sort: "name".to_string(),
            color_support: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorRole {
    #[default]
    Viewer,
    Admin,
}

impl OperatorRole {
    pub fn can_signal(self) -> bool {
        self == OperatorRole::Admin
    }

    pub fn label(self) -> &'static str {
        match self {
            OperatorRole::Viewer => "viewer",
            OperatorRole::Admin => "admin",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => OperatorRole::Admin,
            _ => OperatorRole::Viewer,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub role: OperatorRole,
    /// Shown in the header and recorded in audit events.
    pub name: Option<String>,
}

impl OperatorConfig {
    /// Configured name, else `$USER`, else "unknown".
    pub fn resolved_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub theme: String,
    pub severity_high: String,
    pub severity_medium: String,
    pub severity_low: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            theme: "dark".to_string(),
            severity_high: "#e74c3c".to_string(),
            severity_medium: "#f39c12".to_string(),
            severity_low: "#27ae60".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub terminate: String,
    pub pause: String,
    pub filter: String,
    pub switch_table: String,
    pub cycle_sort: String,
    pub cycle_theme: String,
    pub refresh: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            terminate: "x".to_string(),
            pause: "p".to_string(),
            filter: "/".to_string(),
            switch_table: "Tab".to_string(),
            cycle_sort: "s".to_string(),
            cycle_theme: "t".to_string(),
            refresh: "r".to_string(),
            help: "?".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: None,
            level: "info".to_string(),
            json: false,
        }
    }
}

pub fn parse_key(s: &str) -> Option<KeyCode> {
    match s {
        "Enter" => Some(KeyCode::Enter),
        "Escape" | "Esc" => Some(KeyCode::Esc),
        "Tab" => Some(KeyCode::Tab),
        "Backspace" => Some(KeyCode::Backspace),
        "Delete" | "Del" => Some(KeyCode::Delete),
        "Space" => Some(KeyCode::Char(' ')),
        s if s.chars().count() == 1 => s.chars().next().map(KeyCode::Char),
        _ => None,
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("procwatch").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
