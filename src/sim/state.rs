//! Stage state and core simulation types
//!
//! A `Stage` is one running scene instance (the main level or a boss arena).
//! It owns every entity, its timers and its RNG; nothing in it outlives a
//! scene switch.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::boss::BossEncounter;
use super::collision::{Aabb, Body, SolidQuery};
use super::level::LevelDescriptor;
use super::objects::ObjectRegistry;
use super::spawn::SpawnDirector;
use super::timers::Timers;
use crate::consts::*;
use crate::tuning::{AiKind, Difficulty, EnemyType, PlayerTuning};

pub type EntityId = u32;

/// Which kind of scene a stage simulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Level,
    BossArena,
}

/// Deferred work scheduled on the stage's timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    SpawnTick,
    DoorOpened(EntityId),
    ToastExpired(u32),
    AttackWindowEnd(u32),
    EnemyFlashEnd(EntityId),
    BossFlashEnd,
    BossTelegraphEnd,
    BossChargeEnd,
    BossSlashEnd,
}

/// What a step asks the scene machine to do next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageOutcome {
    Continue,
    GameOver,
    EnterBossGate { ordinal: usize, position: Vec2 },
    ReturnFromBoss,
}

/// The player's actor
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub hp: i32,
    pub max_hp: i32,
    /// +1 right, -1 left
    pub facing: f32,
    pub invuln_ms: f32,
    pub dash_ms: f32,
    pub dash_cooldown_ms: f32,
    pub jump_count: u32,
    pub coins: u64,
    pub has_key: bool,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            body: Body::new(pos, tuning.body_size)
                .with_gravity(Some(GRAVITY))
                .with_max_velocity(tuning.max_velocity)
                .with_drag_x(tuning.drag_x),
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            facing: 1.0,
            invuln_ms: 0.0,
            dash_ms: 0.0,
            dash_cooldown_ms: 0.0,
            jump_count: 0,
            coins: 0,
            has_key: false,
        }
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_ms > 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_ms > 0.0
    }

    /// Move to `pos` and stop
    pub fn place(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.vel = Vec2::ZERO;
    }

    /// Decrement every countdown, never past zero
    pub(crate) fn tick_timers(&mut self, dt_ms: f32) {
        self.invuln_ms = (self.invuln_ms - dt_ms).max(0.0);
        self.dash_ms = (self.dash_ms - dt_ms).max(0.0);
        self.dash_cooldown_ms = (self.dash_cooldown_ms - dt_ms).max(0.0);
    }
}

/// A live enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: String,
    pub hp: i32,
    pub max_hp: i32,
    pub coin_value: u32,
    pub speed: f32,
    pub ai: AiKind,
    pub body: Body,
    /// Stored patrol direction
    pub dir: f32,
    /// Hit tint active
    pub flash: bool,
}

impl Enemy {
    pub fn spawn(id: EntityId, config: &EnemyType, pos: Vec2, dir: f32) -> Self {
        let mut body = Body::new(pos, config.size)
            .with_gravity(config.gravity)
            .with_world_bounds(config.collide_world_bounds);
        if config.ai == AiKind::Patrol {
            body.vel.x = dir * config.speed;
            body.bounce_x = true;
        }
        Self {
            id,
            kind: config.key.clone(),
            hp: config.hp,
            max_hp: config.hp,
            coin_value: config.coin_value,
            speed: config.speed,
            ai: config.ai,
            body,
            dir,
            flash: false,
        }
    }

    pub fn facing(&self) -> f32 {
        crate::facing_sign(self.body.vel.x)
    }
}

/// The player's melee hitbox
#[derive(Debug, Clone)]
pub struct AttackState {
    /// Incremented on every activation
    pub window: u32,
    pub active: bool,
    pub hitbox: Aabb,
    /// Enemies already struck by the current window
    pub hit_enemies: Vec<EntityId>,
    pub hit_boss: bool,
}

impl AttackState {
    pub fn new(size: Vec2) -> Self {
        Self {
            window: 0,
            active: false,
            hitbox: Aabb::new(Vec2::ZERO, size),
            hit_enemies: Vec::new(),
            hit_boss: false,
        }
    }
}

/// On-screen transient message
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub generation: u32,
}

/// Floating "+n" cue after a coin award
#[derive(Debug, Clone, PartialEq)]
pub struct RewardCue {
    pub origin: Vec2,
    pub amount: u64,
    pub remaining_ms: f32,
}

impl RewardCue {
    /// Current position, rising over the cue's lifetime
    pub fn position(&self) -> Vec2 {
        let t = 1.0 - (self.remaining_ms / REWARD_CUE_MS).clamp(0.0, 1.0);
        self.origin - Vec2::new(0.0, 24.0 * t)
    }
}

/// Level tiles plus dynamic blockers, as seen by the kinematics backend
pub struct StageSolids<'a> {
    pub level: &'a LevelDescriptor,
    pub objects: &'a ObjectRegistry,
}

impl SolidQuery for StageSolids<'_> {
    fn solids_near(&self, area: &Aabb, out: &mut Vec<Aabb>) {
        let tile = self.level.tile;
        let area = area.expanded(1.0);
        let (min, max) = (area.min(), area.max());

        let c0 = (min.x / tile).floor().max(0.0) as usize;
        let r0 = (min.y / tile).floor().max(0.0) as usize;
        let c1 = ((max.x / tile).floor().max(0.0) as usize).min(self.level.cols.saturating_sub(1));
        let r1 = ((max.y / tile).floor().max(0.0) as usize).min(self.level.rows.saturating_sub(1));

        if max.x >= 0.0 && max.y >= 0.0 {
            for r in r0..=r1 {
                for c in c0..=c1 {
                    if self.level.is_solid(c, r) {
                        let center = Vec2::new(
                            c as f32 * tile + tile / 2.0,
                            r as f32 * tile + tile / 2.0,
                        );
                        out.push(Aabb::new(center, Vec2::splat(tile)));
                    }
                }
            }
        }

        out.extend(self.objects.blockers().filter(|b| b.overlaps(&area)));
    }

    fn bounds(&self) -> Vec2 {
        self.level.world_size()
    }
}

/// One running scene instance
pub struct Stage {
    pub kind: StageKind,
    pub difficulty: Difficulty,
    pub level_id: u32,
    pub level: LevelDescriptor,
    pub player: Player,
    pub attack: AttackState,
    pub enemies: Vec<Enemy>,
    pub objects: ObjectRegistry,
    pub director: Option<SpawnDirector>,
    pub boss: Option<BossEncounter>,
    pub timers: Timers<StageEvent>,
    pub toast: Option<Toast>,
    pub cues: Vec<RewardCue>,
    /// Elapsed simulation time
    pub time_ms: f32,
    pub(crate) rng: Pcg32,
    pub(crate) next_id: EntityId,
    toast_generation: u32,
}

impl Stage {
    /// Bare stage around a compiled level; objects, director and boss are attached by the caller
    pub(crate) fn empty(
        kind: StageKind,
        level: LevelDescriptor,
        difficulty: Difficulty,
        level_id: u32,
        player_tuning: &PlayerTuning,
        seed: u64,
    ) -> Self {
        let player = Player::new(level.start, player_tuning);
        Self {
            kind,
            difficulty,
            level_id,
            level,
            player,
            attack: AttackState::new(player_tuning.attack_size),
            enemies: Vec::new(),
            objects: ObjectRegistry::default(),
            director: None,
            boss: None,
            timers: Timers::new(),
            toast: None,
            cues: Vec::new(),
            time_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            toast_generation: 0,
        }
    }

    pub(crate) fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn solids(&self) -> StageSolids<'_> {
        StageSolids {
            level: &self.level,
            objects: &self.objects,
        }
    }

    /// Replace the toast slot; it clears itself after `duration_ms`
    pub fn show_toast(&mut self, text: impl Into<String>, duration_ms: f32) {
        let generation = self.pin_toast(text);
        self.timers.after(duration_ms, StageEvent::ToastExpired(generation));
    }

    /// Replace the toast slot with a message that stays until replaced
    pub fn pin_toast(&mut self, text: impl Into<String>) -> u32 {
        self.toast_generation += 1;
        self.toast = Some(Toast {
            text: text.into(),
            generation: self.toast_generation,
        });
        self.toast_generation
    }

    pub(crate) fn expire_toast(&mut self, generation: u32) {
        if self.toast.as_ref().is_some_and(|t| t.generation == generation) {
            self.toast = None;
        }
    }

    pub fn toast_text(&self) -> Option<&str> {
        self.toast.as_ref().map(|t| t.text.as_str())
    }

    /// Credit coins and float a cue at `at`
    pub fn award_coins(&mut self, amount: u64, at: Vec2) {
        self.player.coins += amount;
        self.cues.push(RewardCue {
            origin: at,
            amount,
            remaining_ms: REWARD_CUE_MS,
        });
    }

    pub(crate) fn tick_cues(&mut self, dt_ms: f32) {
        for cue in &mut self.cues {
            cue.remaining_ms = (cue.remaining_ms - dt_ms).max(0.0);
        }
        self.cues.retain(|c| c.remaining_ms > 0.0);
    }

    pub fn enemy_index(&self, id: EntityId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    /// Drop enemies that fell out of the world
    pub(crate) fn despawn_fallen(&mut self) {
        let threshold = self.level.floor_y() + DESPAWN_MARGIN;
        let before = self.enemies.len();
        self.enemies.retain(|e| e.body.pos.y < threshold);
        let dropped = before - self.enemies.len();
        if dropped > 0 {
            log::debug!("Despawned {} fallen enemies", dropped);
        }
    }

    /// Cancel everything this stage scheduled and drop its entities
    pub fn teardown(&mut self) {
        if let Some(director) = self.director.take() {
            director.cancel(&mut self.timers);
        }
        self.timers.clear();
        self.enemies.clear();
        self.objects.clear();
        self.boss = None;
        self.attack.active = false;
        log::debug!("Stage torn down ({:?})", self.kind);
    }
}
