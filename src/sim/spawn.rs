//! Spawn director
//!
//! Keeps the level populated under a difficulty profile. A fixed subset of
//! the level's anchors is chosen when the director is armed; every interval
//! one enemy appears at one of the anchors nearest the player, unless the
//! population cap is reached.

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::IndexedRandom;

use super::state::{Enemy, Stage, StageEvent};
use super::timers::{TimerId, Timers};
use crate::error::SimError;
use crate::tuning::{Difficulty, DifficultyProfile, EnemyWeight, Tuning};

/// Spawns pick among this many of the nearest anchors
const NEAREST_ANCHORS: usize = 3;

/// Toast lifetime for the arming message
const ARM_TOAST_MS: f32 = 1200.0;

#[derive(Debug, Clone)]
pub struct SpawnDirector {
    pub active_anchors: Vec<Vec2>,
    pub max_active: usize,
    pub interval_ms: f32,
    pool: Vec<EnemyWeight>,
    weights: Option<WeightedIndex<u32>>,
    timer: TimerId,
}

impl SpawnDirector {
    /// Choose the active anchors and start the repeating spawn timer
    pub fn arm<R: Rng>(
        anchors: &[Vec2],
        profile: &DifficultyProfile,
        difficulty: Difficulty,
        timers: &mut Timers<StageEvent>,
        rng: &mut R,
    ) -> Self {
        let amount = profile.active_anchor_count.min(anchors.len());
        let active_anchors: Vec<Vec2> = rand::seq::index::sample(rng, anchors.len(), amount)
            .into_iter()
            .map(|i| anchors[i])
            .collect();

        let weights = match WeightedIndex::new(profile.enemy_weights.iter().map(|w| w.weight)) {
            Ok(weights) => Some(weights),
            Err(_) => {
                log::warn!("{}", SimError::EmptyEnemyPool(difficulty));
                None
            }
        };

        let timer = timers.every(profile.spawn_interval_ms, StageEvent::SpawnTick);
        log::info!(
            "Spawn director armed: {} anchors, cap {}, every {} ms",
            active_anchors.len(),
            profile.max_active_enemies,
            profile.spawn_interval_ms
        );

        Self {
            active_anchors,
            max_active: profile.max_active_enemies,
            interval_ms: profile.spawn_interval_ms,
            pool: profile.enemy_weights.clone(),
            weights,
            timer,
        }
    }

    /// Stop the spawn timer
    pub fn cancel(&self, timers: &mut Timers<StageEvent>) {
        timers.cancel(self.timer);
    }

    /// Anchor for the next spawn: uniform among the nearest few to `player_x`
    pub fn pick_anchor<R: Rng>(&self, player_x: f32, rng: &mut R) -> Option<Vec2> {
        let mut ranked = self.active_anchors.clone();
        ranked.sort_by(|a, b| {
            (a.x - player_x)
                .abs()
                .partial_cmp(&(b.x - player_x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(NEAREST_ANCHORS);
        ranked.choose(rng).copied()
    }

    /// Weighted draw from the enemy pool
    pub fn pick_type<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        let weights = self.weights.as_ref()?;
        self.pool.get(weights.sample(rng)).map(|w| w.kind.as_str())
    }
}

impl Stage {
    /// Arm the director for this stage's level and announce it
    pub(crate) fn arm_director(&mut self, tuning: &Tuning) {
        let profile = tuning.profile(self.difficulty);
        let director = SpawnDirector::arm(
            &self.level.spawn_anchors,
            profile,
            self.difficulty,
            &mut self.timers,
            &mut self.rng,
        );
        let message = format!(
            "Mode: {} \u{2014} spawns: {}",
            self.difficulty,
            director.active_anchors.len()
        );
        self.director = Some(director);
        self.show_toast(message, ARM_TOAST_MS);
    }

    /// One spawn attempt; every failure is a silent no-op
    pub(crate) fn spawn_tick(&mut self, tuning: &Tuning) {
        let Some(director) = &self.director else {
            return;
        };
        if self.enemies.len() >= director.max_active {
            return;
        }
        let Some(anchor) = director.pick_anchor(self.player.body.pos.x, &mut self.rng) else {
            return;
        };
        let Some(key) = director.pick_type(&mut self.rng) else {
            return;
        };
        let config = match tuning.enemy(key) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Spawn skipped: {}", e);
                return;
            }
        };

        let dir = if self.rng.random_bool(0.5) { -1.0 } else { 1.0 };
        let id = self.allocate_id();
        self.enemies.push(Enemy::spawn(id, config, anchor, dir));
        log::debug!("Spawned {} #{} at ({}, {})", config.key, id, anchor.x, anchor.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelDescriptor;
    use crate::sim::state::StageKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn level_stage(text: Option<&str>, difficulty: Difficulty) -> Stage {
        let tuning = Tuning::default();
        let level = LevelDescriptor::compile(text, 155, 100, 40.0, difficulty);
        let mut stage = Stage::empty(StageKind::Level, level, difficulty, 1, &tuning.player, 99);
        stage.arm_director(&tuning);
        stage
    }

    fn run_ticks(stage: &mut Stage, tuning: &Tuning, ms: f32) {
        for event in stage.timers.advance(ms) {
            if event == StageEvent::SpawnTick {
                stage.spawn_tick(tuning);
            }
        }
    }

    #[test]
    fn test_easy_procedural_scenario() {
        let tuning = Tuning::default();
        let mut stage = level_stage(None, Difficulty::Easy);
        let director = stage.director.as_ref().unwrap();
        assert_eq!(stage.level.spawn_anchors.len(), 1);
        assert_eq!(director.active_anchors.len(), 1);
        assert_eq!(director.max_active, 4);
        assert_eq!(director.interval_ms, 1800.0);

        run_ticks(&mut stage, &tuning, 1799.0);
        assert!(stage.enemies.is_empty());
        run_ticks(&mut stage, &tuning, 1.0);
        assert_eq!(stage.enemies.len(), 1);

        run_ticks(&mut stage, &tuning, 1800.0 * 20.0);
        assert_eq!(stage.enemies.len(), 4);
        assert!(stage.enemies.iter().all(|e| e.kind == "slug" || e.kind == "beetle"));
    }

    #[test]
    fn test_arm_message() {
        let stage = level_stage(None, Difficulty::Hard);
        assert_eq!(stage.toast_text(), Some("Mode: hard \u{2014} spawns: 5"));
    }

    #[test]
    fn test_anchors_drawn_without_replacement() {
        let anchors: Vec<Vec2> = (0..7).map(|i| Vec2::new(i as f32 * 100.0, 0.0)).collect();
        let tuning = Tuning::default();
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            for seed in 0..20 {
                let mut rng = Pcg32::seed_from_u64(seed);
                let mut timers = Timers::new();
                let profile = tuning.profile(difficulty);
                let director =
                    SpawnDirector::arm(&anchors, profile, difficulty, &mut timers, &mut rng);

                assert_eq!(director.active_anchors.len(), profile.active_anchor_count);
                let mut xs: Vec<i32> = director.active_anchors.iter().map(|a| a.x as i32).collect();
                xs.sort();
                xs.dedup();
                assert_eq!(xs.len(), profile.active_anchor_count);
            }
        }

        // Fewer anchors than the profile asks for
        let mut rng = Pcg32::seed_from_u64(1);
        let mut timers = Timers::new();
        let director = SpawnDirector::arm(
            &anchors[..2],
            tuning.profile(Difficulty::Hard),
            Difficulty::Hard,
            &mut timers,
            &mut rng,
        );
        assert_eq!(director.active_anchors.len(), 2);
    }

    #[test]
    fn test_pick_anchor_prefers_nearest_three() {
        let tuning = Tuning::default();
        let anchors: Vec<Vec2> = [0.0, 1000.0, 2000.0, 3000.0, 4000.0]
            .iter()
            .map(|&x| Vec2::new(x, 0.0))
            .collect();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut timers = Timers::new();
        let director = SpawnDirector::arm(
            &anchors,
            tuning.profile(Difficulty::Hard),
            Difficulty::Hard,
            &mut timers,
            &mut rng,
        );
        for _ in 0..100 {
            let pick = director.pick_anchor(3900.0, &mut rng).unwrap();
            assert!(pick.x >= 2000.0);
        }
    }

    #[test]
    fn test_unknown_enemy_type_is_skipped() {
        let mut tuning = Tuning::default();
        tuning.difficulties.easy.enemy_weights = vec![EnemyWeight {
            kind: "dragon".to_string(),
            weight: 1,
        }];
        let mut stage = level_stage(None, Difficulty::Easy);
        stage.director = None;
        stage.timers.clear();
        stage.arm_director(&tuning);

        run_ticks(&mut stage, &tuning, 1800.0 * 3.0);
        assert!(stage.enemies.is_empty());
        assert!(stage.director.is_some());
    }

    #[test]
    fn test_empty_pool_never_spawns() {
        let mut tuning = Tuning::default();
        tuning.difficulties.easy.enemy_weights.clear();
        let mut stage = level_stage(None, Difficulty::Easy);
        stage.teardown();
        stage.arm_director(&tuning);
        run_ticks(&mut stage, &tuning, 1800.0 * 3.0);
        assert!(stage.enemies.is_empty());
    }

    #[test]
    fn test_teardown_cancels_spawn_timer() {
        let tuning = Tuning::default();
        let mut stage = level_stage(None, Difficulty::Normal);
        run_ticks(&mut stage, &tuning, 1200.0);
        assert_eq!(stage.enemies.len(), 1);

        stage.teardown();
        assert!(stage.timers.is_empty());
        assert!(stage.director.is_none());
        run_ticks(&mut stage, &tuning, 10_000.0);
        assert!(stage.enemies.is_empty());
    }
}
