//! Persisted progression record
//!
//! Last/best score, chosen difficulty, and the boss-clear unlocks. Read when
//! the menu is entered and written only at scene transitions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::persistence::Storage;
use crate::tuning::Difficulty;

pub const KEY_LAST_SCORE: &str = "bk_lastScore";
pub const KEY_BEST_SCORE: &str = "bk_bestScore";
pub const KEY_DIFFICULTY: &str = "bk_difficulty";
pub const KEY_BOSS_CLEARED: &str = "bk_boss_cleared";
pub const KEY_BOSS_GATE_POS: &str = "bk_boss_gate_pos";

/// Stored form of a cleared gate position
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct GatePos {
    x: f32,
    y: f32,
}

/// The gate key holds a list; older profiles stored a single position
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredGates {
    List(Vec<GatePos>),
    Single(GatePos),
}

/// Two gate positions closer than this are the same gate
const GATE_MATCH_PX: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressionRecord {
    pub last_score: u64,
    pub best_score: u64,
    pub difficulty: Difficulty,
    pub boss_cleared: bool,
    /// Every gate cleared on this profile, in clear order
    pub boss_gate_positions: Vec<Vec2>,
}

impl ProgressionRecord {
    /// Read the record, substituting defaults for anything absent or corrupt
    pub fn load(storage: &dyn Storage) -> Self {
        let last_score = read_score(storage, KEY_LAST_SCORE).unwrap_or(0);
        let best_score = read_score(storage, KEY_BEST_SCORE).unwrap_or(0);
        let difficulty = Difficulty::parse_or_default(storage.get(KEY_DIFFICULTY).as_deref());
        let boss_cleared = storage.get(KEY_BOSS_CLEARED).as_deref() == Some("1");
        let boss_gate_positions = storage
            .get(KEY_BOSS_GATE_POS)
            .and_then(|json| serde_json::from_str::<StoredGates>(&json).ok())
            .map(|stored| match stored {
                StoredGates::List(list) => list,
                StoredGates::Single(pos) => vec![pos],
            })
            .unwrap_or_default()
            .into_iter()
            .map(|p| Vec2::new(p.x, p.y))
            .collect();

        Self {
            last_score,
            best_score,
            difficulty,
            boss_cleared,
            boss_gate_positions,
        }
    }

    /// Record the end of a run (game over or quitting to the menu)
    pub fn record_run(&mut self, storage: &mut dyn Storage, score: u64, difficulty: Difficulty) {
        let stored_best = read_score(storage, KEY_BEST_SCORE).unwrap_or(self.best_score);
        self.last_score = score;
        self.best_score = stored_best.max(self.best_score);
        self.difficulty = difficulty;

        storage.set(KEY_LAST_SCORE, &score.to_string());
        if score > self.best_score {
            self.best_score = score;
            storage.set(KEY_BEST_SCORE, &score.to_string());
        }
        storage.set(KEY_DIFFICULTY, difficulty.as_str());
        log::info!(
            "Run recorded: last={} best={} difficulty={}",
            self.last_score,
            self.best_score,
            difficulty
        );
    }

    /// Record a boss clear, adding its gate to the cleared set
    pub fn record_boss_clear(
        &mut self,
        storage: &mut dyn Storage,
        gate_position: Vec2,
        difficulty: Difficulty,
    ) {
        self.boss_cleared = true;
        let known = self
            .boss_gate_positions
            .iter()
            .any(|p| p.distance(gate_position) < GATE_MATCH_PX);
        if !known {
            self.boss_gate_positions.push(gate_position);
        }
        self.difficulty = difficulty;

        storage.set(KEY_BOSS_CLEARED, "1");
        let stored: Vec<GatePos> = self
            .boss_gate_positions
            .iter()
            .map(|p| GatePos { x: p.x, y: p.y })
            .collect();
        match serde_json::to_string(&stored) {
            Ok(json) => storage.set(KEY_BOSS_GATE_POS, &json),
            Err(e) => log::warn!("Could not encode cleared gates: {}", e),
        }
        storage.set(KEY_DIFFICULTY, difficulty.as_str());
        log::info!("Boss cleared at gate ({}, {})", gate_position.x, gate_position.y);
    }

    /// Persist a difficulty change made in the menu
    pub fn record_difficulty(&mut self, storage: &mut dyn Storage, difficulty: Difficulty) {
        self.difficulty = difficulty;
        storage.set(KEY_DIFFICULTY, difficulty.as_str());
    }

    /// Gate positions that are permanently open for this profile
    pub fn cleared_gates(&self) -> &[Vec2] {
        if self.boss_cleared {
            &self.boss_gate_positions
        } else {
            &[]
        }
    }
}

fn read_score(storage: &dyn Storage, key: &str) -> Option<u64> {
    storage.get(key).and_then(|v| v.trim().parse::<u64>().ok())
}
