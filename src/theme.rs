//! LED palette: btop-style `theme[key]="value"` files and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Colours for the emulated LED matrix and the status column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Lit LED.
    pub lit: Color,
    /// Dark LED (still faintly visible, like a real module).
    pub unlit: Color,
    /// Panel frame.
    pub bezel: Color,
    /// Labels in the status column.
    pub title: Color,
    /// Values in the status column.
    pub main_fg: Color,
    /// Lit LED while completed rows blink.
    pub flash: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::max7219_red()
    }
}

impl Theme {
    /// Red 8x8 modules on a dark PCB.
    pub fn max7219_red() -> Self {
        Self {
            lit: Color::Rgb(0xFF, 0x30, 0x20),
            unlit: Color::Rgb(0x3A, 0x14, 0x12),
            bezel: Color::Rgb(0x3F, 0x44, 0x4F),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            flash: Color::Rgb(0xFF, 0xD0, 0x60),
        }
    }

    /// Load a theme file; missing keys keep their defaults. No path means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let s = std::fs::read_to_string(path)?;
        Self::from_map(&parse_theme_file(&s))
    }

    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let defaults = Self::default();
        let get = |key: &str, fallback: Color| -> Result<Color, ThemeError> {
            map.get(key).map_or(Ok(fallback), |v| parse_hex(v))
        };
        Ok(Self {
            lit: get("led_on", defaults.lit)?,
            unlit: get("led_off", defaults.unlit)?,
            bezel: get("div_line", defaults.bezel)?,
            title: get("title", defaults.title)?,
            main_fg: get("main_fg", defaults.main_fg)?,
            flash: get("led_flash", defaults.flash)?,
        })
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.trim().to_string());
    if !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    match hex.len() {
        6 => Ok(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => Ok(Color::Rgb(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        _ => Err(invalid()),
    }
}
