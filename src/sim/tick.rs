//! Fixed timestep stage tick
//!
//! Advances one stage deterministically. Order per step: timers, input,
//! physics, attack sync, triggers, combat, AI, cleanup.

use glam::Vec2;

use super::boss::BossEncounter;
use super::collision::Kinematics;
use super::level::{LevelDescriptor, MarkerKind};
use super::state::{Stage, StageEvent, StageKind, StageOutcome, StageSolids};
use crate::direction_toward;
use crate::error::SimError;
use crate::settings::Settings;
use crate::tuning::{AiKind, Difficulty, PlayerTuning, Tuning};

/// Below this horizontal speed a grounded patroller is re-pushed
const PATROL_STALL_SPEED: f32 = 5.0;
/// Hover bob amplitude (px/s) and period divisor (ms)
const HOVER_BOB: f32 = 25.0;
const HOVER_PERIOD_MS: f32 = 400.0;

/// Menu navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuNav {
    Up,
    Down,
    Left,
    Right,
}

/// Input sampled for a single step (deterministic)
///
/// Movement fields are held state; the rest are edge-triggered.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub jump: bool,
    pub dash: bool,
    pub attack: bool,
    pub pause: bool,
    pub confirm: bool,
    pub menu_nav: Option<MenuNav>,
}

/// Collaborators a stage step needs
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub tuning: &'a Tuning,
    pub kinematics: &'a dyn Kinematics,
}

impl Stage {
    /// Build the main level with its objects and an armed director
    pub fn level(
        text: Option<&str>,
        settings: &Settings,
        tuning: &Tuning,
        difficulty: Difficulty,
        cleared_gates: &[Vec2],
        seed: u64,
    ) -> Self {
        let level = LevelDescriptor::compile(
            text,
            settings.cols(),
            settings.rows(),
            settings.tile,
            difficulty,
        );
        let mut stage = Stage::empty(
            StageKind::Level,
            level,
            difficulty,
            settings.level_id,
            &tuning.player,
            seed,
        );
        stage.attach_objects(cleared_gates);
        stage.arm_director(tuning);
        stage
    }

    /// Build the arena for the boss behind gate `ordinal`
    pub fn boss_arena(
        text: Option<&str>,
        settings: &Settings,
        tuning: &Tuning,
        difficulty: Difficulty,
        gate_ordinal: usize,
        gate_position: Vec2,
        seed: u64,
    ) -> Result<Self, SimError> {
        let config = tuning.boss_for_gate(settings.level_id, gate_ordinal)?;
        let level = LevelDescriptor::compile_arena(
            text,
            settings.boss_arena_cols,
            settings.boss_arena_rows,
            settings.tile,
        );
        let spawn = match level.markers(MarkerKind::BossGate).first() {
            Some(marker) => marker.position - Vec2::new(0.0, 20.0),
            None => Vec2::new(level.width() * 0.75, level.floor_y() - config.size.y),
        };

        let mut stage = Stage::empty(
            StageKind::BossArena,
            level,
            difficulty,
            settings.level_id,
            &tuning.player,
            seed,
        );
        stage.boss = Some(BossEncounter::new(config, spawn, gate_ordinal, gate_position));
        Ok(stage)
    }

    /// Advance the stage by one fixed timestep
    pub fn step(&mut self, input: &TickInput, dt_ms: f32, ctx: &StepContext) -> StageOutcome {
        let kin = ctx.kinematics;
        self.time_ms += dt_ms;
        self.player.tick_timers(dt_ms);
        self.objects.tick(dt_ms);

        for event in self.timers.advance(dt_ms) {
            self.dispatch(event, ctx.tuning);
        }

        self.control_player(input, &ctx.tuning.player);
        self.integrate(kin, dt_ms);
        self.sync_attack(&ctx.tuning.player);

        let outcome = match self.kind {
            StageKind::Level => self.resolve_objects(kin),
            StageKind::BossArena if self.waypoint_reached(kin) => StageOutcome::ReturnFromBoss,
            StageKind::BossArena => StageOutcome::Continue,
        };
        if outcome != StageOutcome::Continue {
            return outcome;
        }

        self.resolve_attack_hits(kin);
        let outcome = self.resolve_contacts(kin, &ctx.tuning.player);
        if outcome != StageOutcome::Continue {
            return outcome;
        }

        self.update_enemies();
        self.update_boss(dt_ms);
        self.despawn_fallen();
        self.tick_cues(dt_ms);
        StageOutcome::Continue
    }

    fn dispatch(&mut self, event: StageEvent, tuning: &Tuning) {
        match event {
            StageEvent::SpawnTick => self.spawn_tick(tuning),
            StageEvent::DoorOpened(id) => self.open_door(id),
            StageEvent::ToastExpired(generation) => self.expire_toast(generation),
            StageEvent::AttackWindowEnd(window) => self.end_attack(window),
            StageEvent::EnemyFlashEnd(id) => self.end_enemy_flash(id),
            StageEvent::BossFlashEnd
            | StageEvent::BossTelegraphEnd
            | StageEvent::BossChargeEnd
            | StageEvent::BossSlashEnd => self.on_boss_event(event),
        }
    }

    /// Run, jump, dash and attack input
    fn control_player(&mut self, input: &TickInput, tuning: &PlayerTuning) {
        let player = &mut self.player;

        if input.dash && !player.is_dashing() && player.dash_cooldown_ms == 0.0 {
            player.dash_ms = tuning.dash_ms;
            player.dash_cooldown_ms = tuning.dash_cooldown_ms;
        }

        if player.is_dashing() {
            player.body.vel.x = player.facing * tuning.dash_speed;
        } else if input.left != input.right {
            player.facing = if input.left { -1.0 } else { 1.0 };
            player.body.vel.x = player.facing * tuning.run_speed;
        }

        if player.body.blocked.down {
            player.jump_count = 0;
        }
        if input.jump {
            if player.body.blocked.down {
                player.body.vel.y = -tuning.jump_velocity;
                player.jump_count = 1;
            } else if player.jump_count < tuning.max_jumps {
                player.body.vel.y = -tuning.air_jump_velocity;
                player.jump_count += 1;
            }
        }

        if input.attack {
            self.begin_attack(tuning);
        }
    }

    /// Step every body through the kinematics backend
    fn integrate(&mut self, kin: &dyn Kinematics, dt_ms: f32) {
        let solids = StageSolids {
            level: &self.level,
            objects: &self.objects,
        };
        kin.step(&mut self.player.body, &solids, dt_ms);
        for enemy in &mut self.enemies {
            kin.step(&mut enemy.body, &solids, dt_ms);
        }
        if let Some(encounter) = self.boss.as_mut() {
            kin.step(&mut encounter.boss.body, &solids, dt_ms);
        }
    }

    /// One AI update per enemy, selected by its kind
    fn update_enemies(&mut self) {
        let target = self.player.body.pos;
        let t = self.time_ms;
        for enemy in &mut self.enemies {
            let body = &mut enemy.body;
            match enemy.ai {
                AiKind::HoverChase => {
                    body.vel.x = direction_toward(body.pos, target) * enemy.speed;
                    body.vel.y = HOVER_BOB * (t / HOVER_PERIOD_MS + body.pos.x * 0.01).sin();
                }
                _ => {
                    if body.blocked.left {
                        enemy.dir = 1.0;
                        body.vel.x = enemy.speed;
                    } else if body.blocked.right {
                        enemy.dir = -1.0;
                        body.vel.x = -enemy.speed;
                    } else if body.blocked.down && body.vel.x.abs() < PATROL_STALL_SPEED {
                        body.vel.x = enemy.dir * enemy.speed;
                    }
                }
            }
        }
    }
}
