//! Boss encounter controller
//!
//! One boss per arena, driven by a per-type state machine. Damage arrives
//! through the shared attack window; defeat disables the body and opens a
//! return waypoint.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::collision::{Aabb, Body, Kinematics};
use super::state::{Stage, StageEvent};
use crate::consts::GRAVITY;
use crate::direction_toward;
use crate::tuning::{AiKind, BossType};

const BOSS_FLASH_MS: f32 = 80.0;

pub const MSG_BOSS_DEFEATED: &str = "Boss defeated! A monument appears...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BossAiState {
    Idle,
    Telegraph,
    Charge,
    Hop,
    Slash,
    Defeated,
}

#[derive(Debug, Clone)]
pub struct Boss {
    pub kind: String,
    pub ai: AiKind,
    pub hp: i32,
    pub max_hp: i32,
    pub state: BossAiState,
    pub cooldown_ms: f32,
    pub body: Body,
    pub facing: f32,
    /// Direction locked in when a charge starts
    pub charge_dir: f32,
    pub flash: bool,
    pub config: BossType,
}

impl Boss {
    pub fn new(config: &BossType, pos: Vec2) -> Self {
        Self {
            kind: config.key.clone(),
            ai: config.ai,
            hp: config.hp,
            max_hp: config.hp,
            state: BossAiState::Idle,
            cooldown_ms: 0.0,
            body: Body::new(pos, config.size).with_gravity(Some(GRAVITY)),
            facing: 1.0,
            charge_dir: 1.0,
            flash: false,
            config: config.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != BossAiState::Defeated
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        (self.hp as f32 / self.max_hp as f32).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct BossEncounter {
    pub boss: Boss,
    /// Gate in the main level that led here
    pub gate_ordinal: usize,
    pub gate_position: Vec2,
    /// Where the return waypoint appears
    pub return_position: Vec2,
    pub waypoint: Option<Aabb>,
}

impl BossEncounter {
    pub fn new(config: &BossType, spawn: Vec2, gate_ordinal: usize, gate_position: Vec2) -> Self {
        log::info!("Boss {} placed at ({}, {})", config.key, spawn.x, spawn.y);
        Self {
            boss: Boss::new(config, spawn),
            gate_ordinal,
            gate_position,
            return_position: spawn,
            waypoint: None,
        }
    }
}

impl Stage {
    /// Apply damage through the attack contract
    pub(crate) fn hurt_boss(&mut self, damage: i32) {
        let Some(encounter) = self.boss.as_mut() else {
            return;
        };
        let boss = &mut encounter.boss;
        if !boss.is_active() {
            return;
        }
        boss.hp = (boss.hp - damage).max(0);
        boss.flash = true;
        let defeated = boss.hp <= 0;
        self.timers.after(BOSS_FLASH_MS, StageEvent::BossFlashEnd);
        if defeated {
            self.defeat_boss();
        }
    }

    fn defeat_boss(&mut self) {
        let tile = self.level.tile;
        let Some(encounter) = self.boss.as_mut() else {
            return;
        };
        let boss = &mut encounter.boss;
        boss.state = BossAiState::Defeated;
        boss.body.enabled = false;
        boss.body.vel = Vec2::ZERO;
        encounter.waypoint = Some(Aabb::new(
            encounter.return_position - Vec2::new(0.0, 10.0),
            Vec2::new(tile * 0.8, tile * 1.2),
        ));
        log::info!("Boss {} defeated", boss.kind);
        self.pin_toast(MSG_BOSS_DEFEATED);
    }

    /// Player reached the return waypoint
    pub(crate) fn waypoint_reached(&self, kin: &dyn Kinematics) -> bool {
        self.boss
            .as_ref()
            .and_then(|b| b.waypoint)
            .is_some_and(|w| kin.overlaps(&self.player.body.aabb(), &w))
    }

    /// Advance the boss AI by one step
    pub(crate) fn update_boss(&mut self, dt_ms: f32) {
        let target = self.player.body.pos;
        let Some(encounter) = self.boss.as_mut() else {
            return;
        };
        let boss = &mut encounter.boss;
        boss.cooldown_ms = (boss.cooldown_ms - dt_ms).max(0.0);
        if !boss.is_active() {
            return;
        }

        let scheduled = match boss.ai {
            AiKind::Sentinel => sentinel(boss, target, &mut self.rng),
            AiKind::Warden => warden(boss, target),
            AiKind::Mantis => mantis(boss, target),
            AiKind::Patrol | AiKind::HoverChase => {
                drift(boss, target);
                None
            }
        };
        if let Some((delay, event)) = scheduled {
            self.timers.after(delay, event);
        }
    }

    /// Timer callbacks owned by the boss
    pub(crate) fn on_boss_event(&mut self, event: StageEvent) {
        let target = self.player.body.pos;
        let difficulty = self.difficulty;
        let Some(encounter) = self.boss.as_mut() else {
            return;
        };
        let boss = &mut encounter.boss;

        match event {
            StageEvent::BossFlashEnd => boss.flash = false,
            StageEvent::BossTelegraphEnd if boss.state == BossAiState::Telegraph => {
                let dir = direction_toward(boss.body.pos, target);
                boss.state = BossAiState::Charge;
                boss.charge_dir = dir;
                boss.facing = dir;
                boss.body.vel.x = dir * boss.config.charge_speed.for_difficulty(difficulty);
                if boss.ai == AiKind::Sentinel {
                    boss.cooldown_ms = boss.config.cooldown_ms;
                }
                let attack_ms = boss.config.attack_ms;
                log::debug!("Boss {} charging", boss.kind);
                self.timers.after(attack_ms, StageEvent::BossChargeEnd);
            }
            StageEvent::BossChargeEnd if boss.state == BossAiState::Charge => {
                boss.body.vel.x = boss.charge_dir * boss.config.trailing_drift;
                boss.state = BossAiState::Idle;
            }
            StageEvent::BossSlashEnd if boss.state == BossAiState::Slash => {
                boss.state = BossAiState::Idle;
                boss.cooldown_ms = boss.config.cooldown_ms;
            }
            _ => {}
        }
    }
}

type Scheduled = Option<(f32, StageEvent)>;

fn drift(boss: &mut Boss, target: Vec2) {
    let dir = direction_toward(boss.body.pos, target);
    boss.body.vel.x = dir * boss.config.speed;
    boss.facing = dir;
}

fn telegraph(boss: &mut Boss) -> Scheduled {
    boss.state = BossAiState::Telegraph;
    boss.body.vel.x = 0.0;
    log::debug!("Boss {} telegraphing", boss.kind);
    Some((boss.config.telegraph_ms, StageEvent::BossTelegraphEnd))
}

/// Drift, then randomly telegraph and charge
fn sentinel<R: Rng>(boss: &mut Boss, target: Vec2, rng: &mut R) -> Scheduled {
    match boss.state {
        BossAiState::Idle => {
            drift(boss, target);
            if boss.cooldown_ms == 0.0 && rng.random::<f32>() < boss.config.charge_chance {
                return telegraph(boss);
            }
        }
        BossAiState::Telegraph => boss.body.vel.x = 0.0,
        _ => {}
    }
    None
}

/// Approach, then dash when the player is close
fn warden(boss: &mut Boss, target: Vec2) -> Scheduled {
    match boss.state {
        BossAiState::Idle => {
            drift(boss, target);
            let close = (target.x - boss.body.pos.x).abs() < boss.config.trigger_range;
            if boss.cooldown_ms == 0.0 && close {
                boss.cooldown_ms = boss.config.cooldown_ms;
                return telegraph(boss);
            }
        }
        BossAiState::Telegraph => boss.body.vel.x = 0.0,
        _ => {}
    }
    None
}

/// Hop toward the player, slash on landing
fn mantis(boss: &mut Boss, target: Vec2) -> Scheduled {
    match boss.state {
        BossAiState::Idle => {
            let dir = direction_toward(boss.body.pos, target);
            boss.facing = dir;
            if boss.body.blocked.down && boss.cooldown_ms == 0.0 {
                boss.state = BossAiState::Hop;
                boss.body.vel = Vec2::new(
                    dir * (boss.config.speed + 100.0),
                    -boss.config.hop_velocity,
                );
            }
        }
        BossAiState::Hop if boss.body.blocked.down => {
            boss.state = BossAiState::Slash;
            boss.body.vel.x = 0.0;
            return Some((boss.config.attack_ms, StageEvent::BossSlashEnd));
        }
        BossAiState::Slash => boss.body.vel.x = 0.0,
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::{ArcadeKinematics, Blocked};
    use crate::sim::level::LevelDescriptor;
    use crate::sim::state::StageKind;
    use crate::tuning::{Difficulty, Tuning};

    fn arena(ordinal: usize, difficulty: Difficulty) -> Stage {
        let tuning = Tuning::default();
        let level = LevelDescriptor::compile_arena(None, 20, 10, 40.0);
        let mut stage = Stage::empty(
            StageKind::BossArena,
            level,
            difficulty,
            1,
            &tuning.player,
            11,
        );
        let config = tuning.boss_for_gate(1, ordinal).unwrap();
        stage.boss = Some(BossEncounter::new(
            config,
            Vec2::new(600.0, 300.0),
            ordinal,
            Vec2::new(1000.0, 1000.0),
        ));
        stage
    }

    fn fire(stage: &mut Stage, ms: f32) {
        for event in stage.timers.advance(ms) {
            stage.on_boss_event(event);
        }
    }

    fn boss(stage: &Stage) -> &Boss {
        &stage.boss.as_ref().unwrap().boss
    }

    #[test]
    fn test_thirty_hits_defeat_sentinel() {
        let kin = ArcadeKinematics::default();
        let mut stage = arena(0, Difficulty::Easy);
        assert_eq!(boss(&stage).max_hp, 30);

        for hit in 1..=30 {
            stage.hurt_boss(1);
            assert_eq!(boss(&stage).hp, 30 - hit);
            if hit < 30 {
                assert!(boss(&stage).is_active());
                assert!(stage.boss.as_ref().unwrap().waypoint.is_none());
            }
        }
        assert_eq!(boss(&stage).state, BossAiState::Defeated);
        assert!(!boss(&stage).body.enabled);
        assert_eq!(stage.toast_text(), Some(MSG_BOSS_DEFEATED));

        let waypoint = stage.boss.as_ref().unwrap().waypoint.unwrap();
        stage.hurt_boss(1);
        assert_eq!(stage.boss.as_ref().unwrap().waypoint, Some(waypoint));
        assert_eq!(boss(&stage).hp, 0);

        assert!(!stage.waypoint_reached(&kin));
        stage.player.body.pos = waypoint.center;
        assert!(stage.waypoint_reached(&kin));
    }

    #[test]
    fn test_sentinel_telegraph_then_charge() {
        let mut stage = arena(0, Difficulty::Hard);
        stage.player.body.pos = Vec2::new(100.0, 300.0);
        if let Some(b) = stage.boss.as_mut() {
            b.boss.config.charge_chance = 1.0;
        }

        stage.update_boss(16.0);
        assert_eq!(boss(&stage).state, BossAiState::Telegraph);
        assert_eq!(boss(&stage).body.vel.x, 0.0);

        fire(&mut stage, 350.0);
        assert_eq!(boss(&stage).state, BossAiState::Charge);
        assert_eq!(boss(&stage).body.vel.x, -520.0);
        assert_eq!(boss(&stage).cooldown_ms, 900.0);

        fire(&mut stage, 300.0);
        assert_eq!(boss(&stage).state, BossAiState::Idle);
        assert_eq!(boss(&stage).body.vel.x, -80.0);

        // Cooldown holds the next charge off
        stage.update_boss(16.0);
        assert_eq!(boss(&stage).state, BossAiState::Idle);
        assert_eq!(boss(&stage).body.vel.x, -60.0);
    }

    #[test]
    fn test_warden_dashes_when_close() {
        let mut stage = arena(2, Difficulty::Hard);
        stage.player.body.pos = Vec2::new(900.0, 300.0);
        stage.update_boss(16.0);
        assert_eq!(boss(&stage).state, BossAiState::Idle);
        assert_eq!(boss(&stage).body.vel.x, 90.0);

        stage.player.body.pos = Vec2::new(700.0, 300.0);
        stage.update_boss(16.0);
        assert_eq!(boss(&stage).state, BossAiState::Telegraph);
        assert_eq!(boss(&stage).cooldown_ms, 800.0);

        fire(&mut stage, 250.0);
        assert_eq!(boss(&stage).body.vel.x, 640.0);
        fire(&mut stage, 200.0);
        assert_eq!(boss(&stage).state, BossAiState::Idle);
        assert_eq!(boss(&stage).body.vel.x, 90.0);
    }

    #[test]
    fn test_mantis_hop_and_slash() {
        let mut stage = arena(1, Difficulty::Normal);
        stage.player.body.pos = Vec2::new(100.0, 300.0);

        // Airborne: waits
        stage.update_boss(16.0);
        assert_eq!(boss(&stage).state, BossAiState::Idle);

        let grounded = Blocked {
            down: true,
            ..Blocked::default()
        };
        stage.boss.as_mut().unwrap().boss.body.blocked = grounded;
        stage.update_boss(16.0);
        assert_eq!(boss(&stage).state, BossAiState::Hop);
        assert_eq!(boss(&stage).body.vel, Vec2::new(-320.0, -420.0));

        stage.update_boss(16.0);
        assert_eq!(boss(&stage).state, BossAiState::Slash);
        assert_eq!(boss(&stage).body.vel.x, 0.0);

        fire(&mut stage, 220.0);
        assert_eq!(boss(&stage).state, BossAiState::Idle);
        assert_eq!(boss(&stage).cooldown_ms, 500.0);
        stage.update_boss(16.0);
        assert_eq!(boss(&stage).state, BossAiState::Idle);
    }

    #[test]
    fn test_flash_clears() {
        let mut stage = arena(0, Difficulty::Easy);
        stage.hurt_boss(1);
        assert!(boss(&stage).flash);
        fire(&mut stage, BOSS_FLASH_MS);
        assert!(!boss(&stage).flash);
        assert!((boss(&stage).hp_ratio() - 29.0 / 30.0).abs() < 1e-6);
    }
}
