//! Astro Blitz - a 3D arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, session state)
//! - `renderer`: WebGPU presentation layer
//! - `audio`: Procedural sound cues via Web Audio
//! - `highscores`: LocalStorage leaderboard
//! - `debrief`: Post-session flavor text from an LLM, with graceful fallback

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod debrief;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Base forward speed of asteroids/diamonds, units per tick
    pub const BASE_SPEED: f32 = 0.6;
    /// Bullet speed toward -z, units per tick (level independent)
    pub const BULLET_SPEED: f32 = 2.5;

    /// Per-tick spawn probabilities
    pub const ASTEROID_SPAWN_RATE: f64 = 0.08;
    pub const DIAMOND_SPAWN_RATE: f64 = 0.006;
    /// Weighted coin flip for gold asteroids
    pub const GOLD_CHANCE: f64 = 0.12;

    /// Asteroid radius range [min, min + span)
    pub const ASTEROID_RADIUS_MIN: f32 = 0.8;
    pub const ASTEROID_RADIUS_SPAN: f32 = 1.7;

    /// Collision margins added to the asteroid radius
    pub const SHIP_COLLISION_MARGIN: f32 = 0.6;
    pub const BULLET_COLLISION_MARGIN: f32 = 0.4;
    /// Diamond pickup threshold (fixed, not radius-based)
    pub const DIAMOND_PICKUP_RANGE: f32 = 2.0;

    /// Depth-axis boundaries in view space
    pub const SPAWN_DEPTH: f32 = -120.0;
    pub const FAR_EXIT_Z: f32 = 20.0;
    pub const BULLET_EXIT_Z: f32 = -130.0;

    /// Scoring
    pub const DIAMOND_SCORE: u64 = 200;
    pub const GOLD_SCORE: u64 = 500;
    pub const STANDARD_SCORE: u64 = 100;
    /// Score per level step
    pub const LEVEL_STEP: u64 = 1000;

    /// Combo expires this many wall-clock ms after the last hit
    pub const COMBO_EXPIRY_MS: f64 = 1500.0;

    /// Power-up countdown: reset value and per-tick decay
    pub const POWERUP_DURATION: f32 = 10.0;
    pub const POWERUP_DECAY: f32 = 0.016;
    /// Lateral offset of the double-fire bullet pair
    pub const DOUBLE_FIRE_OFFSET: f32 = 0.6;

    /// Ship steering
    pub const SHIP_LERP: f32 = 0.15;
    pub const SHIP_BANK_FACTOR: f32 = 0.1;
    pub const SHIP_PITCH_FACTOR: f32 = 0.08;
    /// Padding subtracted from the visible half-extents when aiming
    pub const AIM_PADDING: f32 = 2.0;

    /// Camera (drives the visible-rectangle computation each tick)
    pub const CAMERA_FOV_DEG: f32 = 75.0;
    pub const CAMERA_Z: f32 = 12.0;

    /// Starfield
    pub const STAR_COUNT: usize = 3000;
    pub const STAR_SCATTER: f32 = 1000.0;
    pub const STAR_DEPTH: f32 = 1000.0;
    /// Stars wrap once they pass this near-side threshold
    pub const STAR_NEAR_WRAP: f32 = 15.0;
    /// Starfield scrolls at this multiple of the current entity speed
    pub const STAR_SPEED_FACTOR: f32 = 3.0;

    /// Particles
    pub const PARTICLE_LIFE_DECAY: f32 = 0.03;
    pub const PARTICLE_VEL_SPREAD: f32 = 1.5;

    /// Starting lives
    pub const START_LIVES: u8 = 3;
}

/// Convert a screen-space pointer position to normalized device coordinates,
/// clamped to [-1, 1] on both axes. Y is flipped (screen grows downward).
#[inline]
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        ((x / width) * 2.0 - 1.0).clamp(-1.0, 1.0),
        (-(y / height) * 2.0 + 1.0).clamp(-1.0, 1.0),
    )
}
