//! Bug Knight - A tile-based side-scrolling platformer simulation
//!
//! Core modules:
//! - `sim`: Deterministic level simulation (compiler, spawning, objects, combat, bosses)
//! - `scene`: Menu / Play / Pause / Boss arena state machine
//! - `persistence`: Key-value storage collaborator
//! - `progression`: Persisted score and unlock record
//! - `tuning`: Data-driven game balance
//! - `settings`: Runtime configuration

pub mod error;
pub mod persistence;
pub mod progression;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use progression::ProgressionRecord;
pub use scene::{Game, SceneKind, Snapshot};
pub use settings::Settings;
pub use tuning::{Difficulty, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Tile edge length in pixels
    pub const TILE: f32 = 40.0;
    /// Default world size in pixels
    pub const WORLD_WIDTH: f32 = 6200.0;
    pub const WORLD_HEIGHT: f32 = 4000.0;

    /// World gravity (pixels/s²)
    pub const GRAVITY: f32 = 1200.0;

    /// Enemies this far below the floor line are removed
    pub const DESPAWN_MARGIN: f32 = 60.0;

    /// Door opening delay and message duration
    pub const DOOR_OPEN_MS: f32 = 2000.0;
    pub const TOAST_MS: f32 = 2000.0;
    /// Hidden passage network re-trigger lock
    pub const TELEPORT_LOCK_MS: f32 = 350.0;
    /// Invulnerability after a kill zone respawn
    pub const RESPAWN_INVULN_MS: f32 = 1500.0;
    /// Invulnerability after contact damage
    pub const CONTACT_INVULN_MS: f32 = 800.0;
    /// Floating reward cue lifetime
    pub const REWARD_CUE_MS: f32 = 450.0;
}

/// Sign of `x` with zero mapped to +1 (a facing direction)
#[inline]
pub fn facing_sign(x: f32) -> f32 {
    if x < 0.0 { -1.0 } else { 1.0 }
}

/// Horizontal direction from `from` toward `to`, defaulting to +1 when aligned
#[inline]
pub fn direction_toward(from: Vec2, to: Vec2) -> f32 {
    let dx = to.x - from.x;
    if dx == 0.0 { 1.0 } else { dx.signum() }
}
