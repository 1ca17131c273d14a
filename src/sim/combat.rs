//! Combat resolution
//!
//! Melee windows against enemies and the boss, plus contact damage to the
//! player. One activation of the attack window strikes each target at most
//! once.

use glam::Vec2;

use super::collision::Kinematics;
use super::state::{EntityId, Stage, StageEvent, StageKind, StageOutcome};
use crate::consts::*;
use crate::tuning::PlayerTuning;

/// Enemy hit tint duration
const ENEMY_FLASH_MS: f32 = 100.0;
/// Knock applied to a struck enemy (x along facing, y upward)
const ENEMY_HIT_KNOCK: Vec2 = Vec2::new(100.0, 180.0);

impl Stage {
    /// Open a new attack window; refused while dashing in the level
    pub(crate) fn begin_attack(&mut self, tuning: &PlayerTuning) -> bool {
        if self.kind == StageKind::Level && self.player.is_dashing() {
            return false;
        }
        let window_ms = match self.kind {
            StageKind::Level => tuning.attack_window_ms,
            StageKind::BossArena => {
                self.player.invuln_ms = self.player.invuln_ms.max(tuning.arena_attack_invuln_ms);
                tuning.arena_attack_window_ms
            }
        };

        self.attack.window += 1;
        self.attack.active = true;
        self.attack.hit_enemies.clear();
        self.attack.hit_boss = false;
        self.sync_attack(tuning);
        self.timers
            .after(window_ms, StageEvent::AttackWindowEnd(self.attack.window));
        true
    }

    /// Close the window if it is still the current one
    pub(crate) fn end_attack(&mut self, window: u32) {
        if self.attack.window == window {
            self.attack.active = false;
        }
    }

    /// Keep the hitbox glued ahead of the player
    pub(crate) fn sync_attack(&mut self, tuning: &PlayerTuning) {
        let offset = Vec2::new(self.player.facing * tuning.attack_reach, 2.0);
        self.attack.hitbox.center = self.player.body.pos + offset;
    }

    /// Apply the active window to everything it overlaps
    pub(crate) fn resolve_attack_hits(&mut self, kin: &dyn Kinematics) {
        if !self.attack.active {
            return;
        }
        let hitbox = self.attack.hitbox;

        let struck: Vec<EntityId> = self
            .enemies
            .iter()
            .filter(|e| !self.attack.hit_enemies.contains(&e.id))
            .filter(|e| kin.overlaps(&hitbox, &e.body.aabb()))
            .map(|e| e.id)
            .collect();
        for id in struck {
            self.attack.hit_enemies.push(id);
            self.hit_enemy(id);
        }

        let boss_struck = !self.attack.hit_boss
            && self
                .boss
                .as_ref()
                .is_some_and(|b| b.boss.is_active() && kin.overlaps(&hitbox, &b.boss.body.aabb()));
        if boss_struck {
            self.attack.hit_boss = true;
            self.hurt_boss(1);
        }
    }

    fn hit_enemy(&mut self, id: EntityId) {
        let Some(idx) = self.enemy_index(id) else {
            return;
        };
        let facing = self.player.facing;
        let enemy = &mut self.enemies[idx];
        enemy.hp -= 1;
        enemy.flash = true;
        enemy.body.vel = Vec2::new(facing * ENEMY_HIT_KNOCK.x, -ENEMY_HIT_KNOCK.y);

        if enemy.hp <= 0 {
            let reward = u64::from(enemy.coin_value);
            let at = enemy.body.pos - Vec2::new(0.0, 10.0);
            log::debug!("Enemy {} #{} defeated (+{})", enemy.kind, id, reward);
            self.enemies.remove(idx);
            self.award_coins(reward, at);
        } else {
            self.timers.after(ENEMY_FLASH_MS, StageEvent::EnemyFlashEnd(id));
        }
    }

    pub(crate) fn end_enemy_flash(&mut self, id: EntityId) {
        if let Some(idx) = self.enemy_index(id) {
            self.enemies[idx].flash = false;
        }
    }

    /// Enemy and boss bodies touching the player
    pub(crate) fn resolve_contacts(
        &mut self,
        kin: &dyn Kinematics,
        tuning: &PlayerTuning,
    ) -> StageOutcome {
        let player_box = self.player.body.aabb();

        let enemy_contact = self
            .enemies
            .iter()
            .any(|e| kin.overlaps(&player_box, &e.body.aabb()));
        if enemy_contact && self.hurt_player(tuning.enemy_knockback) {
            return StageOutcome::GameOver;
        }

        let boss_contact = self
            .boss
            .as_ref()
            .is_some_and(|b| b.boss.is_active() && kin.overlaps(&player_box, &b.boss.body.aabb()));
        if boss_contact && self.hurt_player(tuning.boss_knockback) {
            return StageOutcome::GameOver;
        }

        StageOutcome::Continue
    }

    /// One point of contact damage; returns true when the player died
    pub(crate) fn hurt_player(&mut self, knockback: Vec2) -> bool {
        let player = &mut self.player;
        if player.is_invulnerable() {
            return false;
        }
        player.hp = (player.hp - 1).max(0);
        player.invuln_ms = CONTACT_INVULN_MS;
        player.body.vel = Vec2::new(-player.facing * knockback.x, -knockback.y);
        log::debug!("Player hit, hp={}", player.hp);
        player.hp <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::ArcadeKinematics;
    use crate::sim::level::LevelDescriptor;
    use crate::sim::state::Enemy;
    use crate::tuning::{Difficulty, Tuning};

    fn stage(kind: StageKind) -> Stage {
        let level =
            LevelDescriptor::compile(Some("........\nxxxxxxxx"), 8, 2, 40.0, Difficulty::Easy);
        let mut stage = Stage::empty(
            kind,
            level,
            Difficulty::Easy,
            1,
            &Tuning::default().player,
            3,
        );
        stage.player.body.pos = Vec2::new(100.0, 20.0);
        stage
    }

    fn close_windows(stage: &mut Stage) {
        for event in stage.timers.advance(1000.0) {
            match event {
                StageEvent::AttackWindowEnd(w) => stage.end_attack(w),
                StageEvent::EnemyFlashEnd(id) => stage.end_enemy_flash(id),
                _ => {}
            }
        }
    }

    /// Put `enemy` back where the hitbox is, undoing knockback
    fn pin_to_hitbox(stage: &mut Stage, id: EntityId) {
        let at = stage.attack.hitbox.center;
        if let Some(idx) = stage.enemy_index(id) {
            stage.enemies[idx].body.pos = at;
        }
    }

    #[test]
    fn test_hp_two_enemy_needs_two_windows() {
        let tuning = Tuning::default();
        let kin = ArcadeKinematics::default();
        let mut stage = stage(StageKind::Level);
        let wisp = tuning.enemy("wisp").unwrap().clone();
        stage.sync_attack(&tuning.player);
        let at = stage.attack.hitbox.center;
        stage.enemies.push(Enemy::spawn(7, &wisp, at, 1.0));

        assert!(stage.begin_attack(&tuning.player));
        for _ in 0..5 {
            pin_to_hitbox(&mut stage, 7);
            stage.resolve_attack_hits(&kin);
        }
        assert_eq!(stage.enemies[0].hp, 1);
        assert!(stage.enemies[0].flash);
        close_windows(&mut stage);
        assert!(!stage.attack.active);
        assert!(!stage.enemies[0].flash);

        assert!(stage.begin_attack(&tuning.player));
        pin_to_hitbox(&mut stage, 7);
        stage.resolve_attack_hits(&kin);
        assert!(stage.enemies.is_empty());
        assert_eq!(stage.player.coins, u64::from(wisp.coin_value));
        assert_eq!(stage.cues.len(), 1);
    }

    #[test]
    fn test_knockback_follows_facing() {
        let tuning = Tuning::default();
        let kin = ArcadeKinematics::default();
        let mut stage = stage(StageKind::Level);
        stage.player.facing = -1.0;
        stage.sync_attack(&tuning.player);
        let beetle = tuning.enemy("beetle").unwrap().clone();
        stage
            .enemies
            .push(Enemy::spawn(1, &beetle, stage.attack.hitbox.center, 1.0));

        stage.begin_attack(&tuning.player);
        stage.resolve_attack_hits(&kin);
        assert_eq!(stage.enemies[0].body.vel, Vec2::new(-100.0, -180.0));
    }

    #[test]
    fn test_restarted_window_ignores_stale_end() {
        let tuning = Tuning::default();
        let mut stage = stage(StageKind::Level);
        stage.begin_attack(&tuning.player);
        let first = stage.attack.window;
        let _ = stage.timers.advance(60.0);
        stage.begin_attack(&tuning.player);
        stage.end_attack(first);
        assert!(stage.attack.active);
    }

    #[test]
    fn test_no_attack_while_dashing_in_level() {
        let tuning = Tuning::default();
        let mut stage = stage(StageKind::Level);
        stage.player.dash_ms = 50.0;
        assert!(!stage.begin_attack(&tuning.player));
        assert!(!stage.attack.active);

        let mut arena = stage_arena();
        arena.player.dash_ms = 50.0;
        assert!(arena.begin_attack(&tuning.player));
        assert_eq!(arena.player.invuln_ms, tuning.player.arena_attack_invuln_ms);
    }

    fn stage_arena() -> Stage {
        stage(StageKind::BossArena)
    }

    #[test]
    fn test_contact_damage_respects_invulnerability() {
        let tuning = Tuning::default();
        let kin = ArcadeKinematics::default();
        let mut stage = stage(StageKind::Level);
        let slug = tuning.enemy("slug").unwrap().clone();
        stage
            .enemies
            .push(Enemy::spawn(1, &slug, stage.player.body.pos, 1.0));

        assert_eq!(stage.resolve_contacts(&kin, &tuning.player), StageOutcome::Continue);
        assert_eq!(stage.player.hp, 4);
        assert_eq!(stage.player.invuln_ms, CONTACT_INVULN_MS);
        assert_eq!(stage.player.body.vel, Vec2::new(-240.0, -200.0));

        stage.resolve_contacts(&kin, &tuning.player);
        assert_eq!(stage.player.hp, 4);
    }

    #[test]
    fn test_last_hit_is_game_over() {
        let tuning = Tuning::default();
        let kin = ArcadeKinematics::default();
        let mut stage = stage(StageKind::Level);
        stage.player.hp = 1;
        let slug = tuning.enemy("slug").unwrap().clone();
        stage
            .enemies
            .push(Enemy::spawn(1, &slug, stage.player.body.pos, 1.0));
        assert_eq!(stage.resolve_contacts(&kin, &tuning.player), StageOutcome::GameOver);
        assert_eq!(stage.player.hp, 0);
    }
}
