//! ledtris: falling-block puzzle for a chain of four 8x8 LED modules (8 columns x 32 rows).
//!
//! The [`engine::Engine`] owns the game state and knows nothing about buses or
//! sockets: it takes [`input::Command`]s and `tick` calls, and hands
//! [`render::Frame`]s to whatever [`render::RenderSink`] is attached.

pub mod engine;
pub mod grid;
pub mod input;
pub mod piece;
pub mod render;
pub mod theme;
pub mod ticker;
pub mod ui;

/// Engine tunables (gravity speed, speed-up rule, blink timing, seed).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub initial_interval_ms: u64,
    pub min_interval_ms: u64,
    pub speedup_per_line_ms: u64,
    pub points_per_line: u32,
    pub blink_phase_ms: u64,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 1000,
            min_interval_ms: 300,
            speedup_per_line_ms: 10,
            points_per_line: 10,
            blink_phase_ms: 500,
            seed: None,
        }
    }
}
