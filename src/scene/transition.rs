//! Scene transition payloads
//!
//! The only data that crosses a scene boundary. Stages never share
//! references with each other.

use glam::Vec2;

use crate::tuning::Difficulty;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneTransition {
    Play {
        difficulty: Difficulty,
    },
    Pause,
    Resume,
    /// Fresh level instance, same difficulty
    Restart,
    /// Leave to the menu, recording the run
    ToMenu {
        last_score: u64,
        difficulty: Difficulty,
    },
    EnterBossGate {
        difficulty: Difficulty,
        coins: u64,
        hp: i32,
        checkpoint: Vec2,
        gate_ordinal: usize,
        gate_position: Vec2,
    },
    ReturnFromBoss {
        boss_cleared: bool,
        gate_position: Vec2,
        checkpoint: Vec2,
        difficulty: Difficulty,
        coins: u64,
        hp: i32,
    },
    GameOver {
        last_score: u64,
        difficulty: Difficulty,
    },
}

/// Carried through the arena so the level can be restored on return
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaEntry {
    pub checkpoint: Vec2,
    pub gate_ordinal: usize,
    pub gate_position: Vec2,
}
