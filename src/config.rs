//! Tunables for every effect.
//!
//! Loaded from an optional JSON file; every field falls back to its default,
//! so a file only needs the keys it wants to change.

use crate::canvas::Color;
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    /// Chance of an automatic launch each frame (0..1)
    pub spawn_probability: f32,
    pub projectile_speed_min: f32,
    pub projectile_speed_max: f32,
    /// Downward acceleration on projectiles, per frame
    pub gravity: f32,
    /// Chance per frame that a projectile bursts early
    pub premature_detonation: f32,
    pub fragment_friction: f32,
    pub fragment_gravity: f32,
    pub fragment_count_min: u32,
    pub fragment_count_max: u32,
    pub max_projectiles: usize,
    pub max_fragments: usize,
    /// Opacity of the background wash painted every frame
    pub trail_alpha: f32,
    pub frames_per_second: f32,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            spawn_probability: 0.75,
            projectile_speed_min: 6.0,
            projectile_speed_max: 12.0,
            gravity: 0.08,
            premature_detonation: 0.004,
            fragment_friction: 0.985,
            fragment_gravity: 0.04,
            fragment_count_min: 60,
            fragment_count_max: 100,
            max_projectiles: 10,
            max_fragments: 1200,
            trail_alpha: 0.25,
            frames_per_second: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    pub enabled: bool,
    /// Local wall-clock target; `None` means the next New Year
    pub target: Option<NaiveDateTime>,
    pub completion_message: String,
    pub text_color: Color,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: None,
            completion_message: "Happy New Year!".to_string(),
            text_color: (255, 236, 160),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerConfig {
    pub enabled: bool,
    pub spawn_period_min_ms: f32,
    pub spawn_period_max_ms: f32,
    pub tick_ms: f32,
    pub speed_min: f32,
    pub speed_max: f32,
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_period_min_ms: 500.0,
            spawn_period_max_ms: 1000.0,
            tick_ms: 16.0,
            speed_min: 2.0,
            speed_max: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logical pixels per terminal sub-pixel
    pub pixel_scale: f32,
    pub background: Color,
    pub fireworks: FireworksConfig,
    pub countdown: CountdownConfig,
    pub stickers: StickerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pixel_scale: 6.0,
            background: (0, 0, 0),
            fireworks: FireworksConfig::default(),
            countdown: CountdownConfig::default(),
            stickers: StickerConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fw = &self.fireworks;
        let st = &self.stickers;

        if !(self.pixel_scale > 0.0) {
            return Err(invalid("pixel_scale must be positive"));
        }
        for (name, p) in [
            ("fireworks.spawn_probability", fw.spawn_probability),
            ("fireworks.premature_detonation", fw.premature_detonation),
            ("fireworks.fragment_friction", fw.fragment_friction),
            ("fireworks.trail_alpha", fw.trail_alpha),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(&format!("{name} must be within 0..1, got {p}")));
            }
        }
        if fw.projectile_speed_min > fw.projectile_speed_max {
            return Err(invalid("fireworks.projectile_speed_min exceeds projectile_speed_max"));
        }
        if fw.fragment_count_min > fw.fragment_count_max {
            return Err(invalid("fireworks.fragment_count_min exceeds fragment_count_max"));
        }
        if !(fw.frames_per_second > 0.0) {
            return Err(invalid("fireworks.frames_per_second must be positive"));
        }
        if st.spawn_period_min_ms > st.spawn_period_max_ms || !(st.spawn_period_min_ms > 0.0) {
            return Err(invalid("stickers spawn period must be a positive, ordered range"));
        }
        if !(st.tick_ms > 0.0) {
            return Err(invalid("stickers.tick_ms must be positive"));
        }
        if st.speed_min > st.speed_max {
            return Err(invalid("stickers.speed_min exceeds speed_max"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Error {
    Error::InvalidConfig(msg.to_string())
}

/// Parses `RRGGBB`, with or without a leading `#`.
pub fn parse_hex_color(hex: &str) -> Result<Color> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(Error::InvalidColor(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| Error::InvalidColor(hex.to_string()))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
