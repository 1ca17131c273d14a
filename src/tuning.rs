//! Data-driven game balance
//!
//! Built-in tables for difficulty profiles, enemy types, and the per-level
//! boss registry. Any subset can be overridden from a JSON document.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Difficulty setting chosen in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a stored value, falling back to `Easy`
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// Next setting (easy -> normal -> hard -> easy)
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    /// Previous setting (hard -> normal -> easy -> hard)
    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Normal => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Normal,
        }
    }
}

impl FromStr for Difficulty {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(SimError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviour variant driving an enemy or boss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiKind {
    Patrol,
    HoverChase,
    Sentinel,
    Mantis,
    Warden,
}

/// One entry of a weighted enemy pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyWeight {
    pub kind: String,
    pub weight: u32,
}

impl EnemyWeight {
    fn new(kind: &str, weight: u32) -> Self {
        Self {
            kind: kind.to_string(),
            weight,
        }
    }
}

/// Spawn tuning for one difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub spawn_interval_ms: f32,
    pub max_active_enemies: usize,
    /// Upper bound; the director uses min(this, discovered anchors)
    pub active_anchor_count: usize,
    pub enemy_weights: Vec<EnemyWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: DifficultyProfile,
    pub normal: DifficultyProfile,
    pub hard: DifficultyProfile,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyProfile {
                spawn_interval_ms: 1800.0,
                max_active_enemies: 4,
                active_anchor_count: 1,
                enemy_weights: vec![EnemyWeight::new("slug", 3), EnemyWeight::new("beetle", 1)],
            },
            normal: DifficultyProfile {
                spawn_interval_ms: 1200.0,
                max_active_enemies: 8,
                active_anchor_count: 2,
                enemy_weights: vec![
                    EnemyWeight::new("slug", 1),
                    EnemyWeight::new("beetle", 2),
                    EnemyWeight::new("wisp", 1),
                ],
            },
            hard: DifficultyProfile {
                spawn_interval_ms: 800.0,
                max_active_enemies: 16,
                active_anchor_count: 5,
                enemy_weights: vec![
                    EnemyWeight::new("slug", 1),
                    EnemyWeight::new("beetle", 2),
                    EnemyWeight::new("wisp", 2),
                ],
            },
        }
    }
}

/// Enemy archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyType {
    pub key: String,
    pub hp: i32,
    pub coin_value: u32,
    pub speed: f32,
    pub ai: AiKind,
    /// Per-body gravity; `None` floats
    pub gravity: Option<f32>,
    pub size: Vec2,
    pub collide_world_bounds: bool,
}

/// A speed that scales with difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledSpeed {
    pub easy: f32,
    pub normal: f32,
    pub hard: f32,
}

impl ScaledSpeed {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> f32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Boss archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossType {
    pub key: String,
    pub hp: i32,
    /// Idle drift / approach speed
    pub speed: f32,
    pub ai: AiKind,
    pub size: Vec2,
    pub telegraph_ms: f32,
    /// Charge duration (sentinel/warden) or slash pause (mantis)
    pub attack_ms: f32,
    pub cooldown_ms: f32,
    pub charge_speed: ScaledSpeed,
    pub trailing_drift: f32,
    /// Chance per step of leaving idle once the cooldown is clear
    pub charge_chance: f32,
    /// Horizontal distance that arms the warden's dash
    pub trigger_range: f32,
    /// Upward launch speed of the mantis hop
    pub hop_velocity: f32,
}

/// Bosses available behind one level's gates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossLevel {
    /// Gate n resolves to order[n % len]; empty falls back to `bosses`
    #[serde(default)]
    pub order: Vec<String>,
    pub bosses: Vec<BossType>,
}

/// Player controller constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: i32,
    pub body_size: Vec2,
    pub max_velocity: Vec2,
    pub drag_x: f32,
    pub run_speed: f32,
    pub jump_velocity: f32,
    pub air_jump_velocity: f32,
    pub max_jumps: u32,
    pub dash_speed: f32,
    pub dash_ms: f32,
    pub dash_cooldown_ms: f32,
    pub attack_size: Vec2,
    pub attack_reach: f32,
    pub attack_window_ms: f32,
    pub arena_attack_window_ms: f32,
    /// Brief invulnerability granted by swinging in the boss arena
    pub arena_attack_invuln_ms: f32,
    pub enemy_knockback: Vec2,
    pub boss_knockback: Vec2,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: 5,
            body_size: Vec2::new(26.0, 40.0),
            max_velocity: Vec2::new(450.0, 1200.0),
            drag_x: 1800.0,
            run_speed: 320.0,
            jump_velocity: 470.0,
            air_jump_velocity: 450.0,
            max_jumps: 2,
            dash_speed: 680.0,
            dash_ms: 140.0,
            dash_cooldown_ms: 500.0,
            attack_size: Vec2::new(52.0, 24.0),
            attack_reach: 28.0,
            attack_window_ms: 120.0,
            arena_attack_window_ms: 110.0,
            arena_attack_invuln_ms: 100.0,
            enemy_knockback: Vec2::new(240.0, 200.0),
            boss_knockback: Vec2::new(260.0, 220.0),
        }
    }
}

/// Complete balance bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulties: DifficultyTable,
    pub enemies: Vec<EnemyType>,
    pub boss_levels: BTreeMap<u32, BossLevel>,
    pub player: PlayerTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        let enemies = vec![
            EnemyType {
                key: "slug".to_string(),
                hp: 1,
                coin_value: 1,
                speed: 70.0,
                ai: AiKind::Patrol,
                gravity: Some(1100.0),
                size: Vec2::new(25.0, 20.0),
                collide_world_bounds: true,
            },
            EnemyType {
                key: "beetle".to_string(),
                hp: 3,
                coin_value: 2,
                speed: 110.0,
                ai: AiKind::Patrol,
                gravity: Some(1200.0),
                size: Vec2::new(38.0, 27.0),
                collide_world_bounds: true,
            },
            EnemyType {
                key: "wisp".to_string(),
                hp: 2,
                coin_value: 3,
                speed: 80.0,
                ai: AiKind::HoverChase,
                gravity: None,
                size: Vec2::new(25.0, 27.0),
                collide_world_bounds: false,
            },
        ];

        let level_one = BossLevel {
            order: vec![
                "sentinel".to_string(),
                "mantis".to_string(),
                "warden".to_string(),
            ],
            bosses: vec![
                BossType {
                    key: "sentinel".to_string(),
                    hp: 30,
                    speed: 60.0,
                    ai: AiKind::Sentinel,
                    size: Vec2::new(56.0, 56.0),
                    telegraph_ms: 350.0,
                    attack_ms: 300.0,
                    cooldown_ms: 900.0,
                    charge_speed: ScaledSpeed {
                        easy: 380.0,
                        normal: 440.0,
                        hard: 520.0,
                    },
                    trailing_drift: 80.0,
                    charge_chance: 8.0 / 1001.0,
                    trigger_range: f32::MAX,
                    hop_velocity: 0.0,
                },
                BossType {
                    key: "mantis".to_string(),
                    hp: 24,
                    speed: 220.0,
                    ai: AiKind::Mantis,
                    size: Vec2::new(54.0, 54.0),
                    telegraph_ms: 0.0,
                    attack_ms: 220.0,
                    cooldown_ms: 500.0,
                    charge_speed: ScaledSpeed {
                        easy: 320.0,
                        normal: 320.0,
                        hard: 320.0,
                    },
                    trailing_drift: 0.0,
                    charge_chance: 1.0,
                    trigger_range: f32::MAX,
                    hop_velocity: 420.0,
                },
                BossType {
                    key: "warden".to_string(),
                    hp: 40,
                    speed: 90.0,
                    ai: AiKind::Warden,
                    size: Vec2::new(61.0, 61.0),
                    telegraph_ms: 250.0,
                    attack_ms: 200.0,
                    cooldown_ms: 800.0,
                    charge_speed: ScaledSpeed {
                        easy: 520.0,
                        normal: 520.0,
                        hard: 640.0,
                    },
                    trailing_drift: 90.0,
                    charge_chance: 1.0,
                    trigger_range: 200.0,
                    hop_velocity: 0.0,
                },
            ],
        };

        let mut boss_levels = BTreeMap::new();
        boss_levels.insert(1, level_one);

        Self {
            difficulties: DifficultyTable::default(),
            enemies,
            boss_levels,
            player: PlayerTuning::default(),
        }
    }
}

impl Tuning {
    /// Overlay a JSON document on the built-in tables
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn profile(&self, difficulty: Difficulty) -> &DifficultyProfile {
        match difficulty {
            Difficulty::Easy => &self.difficulties.easy,
            Difficulty::Normal => &self.difficulties.normal,
            Difficulty::Hard => &self.difficulties.hard,
        }
    }

    pub fn enemy(&self, key: &str) -> Result<&EnemyType, SimError> {
        self.enemies
            .iter()
            .find(|e| e.key == key)
            .ok_or_else(|| SimError::UnknownEnemyType(key.to_string()))
    }

    /// Resolve the boss behind gate `ordinal` of `level`, wrapping past the end of the order list
    pub fn boss_for_gate(&self, level: u32, ordinal: usize) -> Result<&BossType, SimError> {
        let entry = self
            .boss_levels
            .get(&level)
            .ok_or(SimError::UnknownLevel(level))?;

        let key = if entry.order.is_empty() {
            entry
                .bosses
                .get(ordinal % entry.bosses.len().max(1))
                .map(|b| b.key.as_str())
        } else {
            entry.order.get(ordinal % entry.order.len()).map(String::as_str)
        }
        .ok_or(SimError::UnknownLevel(level))?;

        entry
            .bosses
            .iter()
            .find(|b| b.key == key)
            .ok_or_else(|| SimError::UnknownBossType(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse_and_cycle() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(
            "impossible".parse::<Difficulty>(),
            Err(SimError::UnknownDifficulty("impossible".to_string()))
        );
        assert_eq!(Difficulty::parse_or_default(None), Difficulty::Easy);
        assert_eq!(Difficulty::parse_or_default(Some("garbage")), Difficulty::Easy);

        let d = Difficulty::Easy;
        assert_eq!(d.next().next().next(), d);
        assert_eq!(d.prev(), Difficulty::Hard);
        assert_eq!(d.next().prev(), d);
    }

    #[test]
    fn test_easy_profile_matches_table() {
        let tuning = Tuning::default();
        let easy = tuning.profile(Difficulty::Easy);
        assert_eq!(easy.spawn_interval_ms, 1800.0);
        assert_eq!(easy.max_active_enemies, 4);
        assert_eq!(easy.active_anchor_count, 1);
    }

    #[test]
    fn test_boss_order_wraps() {
        let tuning = Tuning::default();
        assert_eq!(tuning.boss_for_gate(1, 0).unwrap().key, "sentinel");
        assert_eq!(tuning.boss_for_gate(1, 1).unwrap().key, "mantis");
        assert_eq!(tuning.boss_for_gate(1, 2).unwrap().key, "warden");
        assert_eq!(tuning.boss_for_gate(1, 3).unwrap().key, "sentinel");
        assert_eq!(tuning.boss_for_gate(7, 0), Err(SimError::UnknownLevel(7)));
    }

    #[test]
    fn test_unknown_enemy_is_an_error() {
        let tuning = Tuning::default();
        assert!(tuning.enemy("slug").is_ok());
        assert_eq!(
            tuning.enemy("dragon"),
            Err(SimError::UnknownEnemyType("dragon".to_string()))
        );
    }

    #[test]
    fn test_json_overlay_keeps_defaults() {
        let json = r#"{ "player": { "max_hp": 9, "max_jumps": 3 } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.player.max_hp, 9);
        assert_eq!(tuning.player.max_jumps, 3);
        assert_eq!(tuning.player.run_speed, PlayerTuning::default().run_speed);
        assert_eq!(tuning.player.body_size, Vec2::new(26.0, 40.0));
        assert_eq!(tuning.enemies.len(), 3);
        assert_eq!(tuning.profile(Difficulty::Hard).max_active_enemies, 16);
    }

    #[test]
    fn test_partial_difficulty_table_keeps_other_profiles() {
        let json = r#"{ "difficulties": { "hard": {
            "spawn_interval_ms": 500.0, "max_active_enemies": 20,
            "active_anchor_count": 6, "enemy_weights": [{ "kind": "wisp", "weight": 1 }] } } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.profile(Difficulty::Hard).max_active_enemies, 20);
        assert_eq!(tuning.profile(Difficulty::Easy).spawn_interval_ms, 1800.0);
        assert_eq!(tuning.profile(Difficulty::Normal).max_active_enemies, 8);
    }
}
