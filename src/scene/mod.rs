//! Scene state machine
//!
//! `Game` owns the active scene and every collaborator (storage, kinematics,
//! tuning). Scenes hand data to each other only through `SceneTransition`
//! payloads; the outgoing stage is torn down before the next one compiles.
//! Storage is written only at transitions and menu difficulty changes.

mod menu;
mod snapshot;
mod transition;

use glam::Vec2;
use serde::Serialize;

pub use menu::{MainMenu, MenuAction, MenuOption, PauseMenu, PauseOption};
pub use snapshot::{
    BossView, CueView, DoorView, EnemyView, GateView, MenuView, PauseView, PlayerView, ScorePanel,
    Snapshot, StageView, TileView,
};
pub use transition::{ArenaEntry, SceneTransition};

use crate::persistence::Storage;
use crate::progression::ProgressionRecord;
use crate::settings::Settings;
use crate::sim::{ArcadeKinematics, Kinematics, Stage, StageOutcome, StepContext, TickInput};
use crate::tuning::{Difficulty, Tuning};

/// Knuth's multiplicative constant, spreads stage seeds apart
const SEED_STRIDE: u64 = 2_654_435_761;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    Menu,
    Playing,
    Paused,
    BossArena,
}

pub enum SceneState {
    Menu(MainMenu),
    Playing(Box<Stage>),
    /// Overlay; the stage is suspended, not destroyed
    Paused {
        stage: Box<Stage>,
        menu: PauseMenu,
        /// Set when the suspended stage is a boss arena
        arena: Option<ArenaEntry>,
    },
    BossArena {
        stage: Box<Stage>,
        entry: ArenaEntry,
    },
}

impl SceneState {
    pub fn kind(&self) -> SceneKind {
        match self {
            SceneState::Menu(_) => SceneKind::Menu,
            SceneState::Playing(_) => SceneKind::Playing,
            SceneState::Paused { .. } => SceneKind::Paused,
            SceneState::BossArena { .. } => SceneKind::BossArena,
        }
    }

    fn stage_mut(&mut self) -> Option<&mut Stage> {
        match self {
            SceneState::Menu(_) => None,
            SceneState::Playing(stage)
            | SceneState::Paused { stage, .. }
            | SceneState::BossArena { stage, .. } => Some(stage.as_mut()),
        }
    }
}

pub struct Game {
    settings: Settings,
    tuning: Tuning,
    storage: Box<dyn Storage>,
    kinematics: Box<dyn Kinematics>,
    progression: ProgressionRecord,
    scene: SceneState,
    level_text: Option<String>,
    arena_text: Option<String>,
    stage_counter: u64,
}

impl Game {
    /// Start at the menu with the stored progression
    pub fn new(settings: Settings, tuning: Tuning, storage: Box<dyn Storage>) -> Self {
        let progression = ProgressionRecord::load(storage.as_ref());
        log::info!(
            "Progression loaded: last={} best={} difficulty={} boss_cleared={}",
            progression.last_score,
            progression.best_score,
            progression.difficulty,
            progression.boss_cleared
        );
        Self {
            settings,
            tuning,
            storage,
            kinematics: Box::new(ArcadeKinematics::default()),
            scene: SceneState::Menu(MainMenu::new(progression.difficulty)),
            progression,
            level_text: None,
            arena_text: None,
            stage_counter: 0,
        }
    }

    /// Authored level texts; `None` falls back to the procedural layouts
    pub fn with_levels(mut self, level_text: Option<String>, arena_text: Option<String>) -> Self {
        self.level_text = level_text;
        self.arena_text = arena_text;
        self
    }

    pub fn with_kinematics(mut self, kinematics: Box<dyn Kinematics>) -> Self {
        self.kinematics = kinematics;
        self
    }

    pub fn scene_kind(&self) -> SceneKind {
        self.scene.kind()
    }

    pub fn progression(&self) -> &ProgressionRecord {
        &self.progression
    }

    /// The stage being simulated or suspended, if any
    pub fn stage(&self) -> Option<&Stage> {
        match &self.scene {
            SceneState::Menu(_) => None,
            SceneState::Playing(stage)
            | SceneState::Paused { stage, .. }
            | SceneState::BossArena { stage, .. } => Some(stage.as_ref()),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match &self.scene {
            SceneState::Menu(menu) => menu.difficulty,
            _ => self.stage().map_or(self.progression.difficulty, |s| s.difficulty),
        }
    }

    /// Advance the active scene by one fixed timestep
    pub fn step(&mut self, input: &TickInput, dt_ms: f32) {
        if let Some(transition) = self.update_scene(input, dt_ms) {
            self.apply(transition);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let (menu, pause, stage) = match &self.scene {
            SceneState::Menu(menu) => (Some(MenuView::new(menu, &self.progression)), None, None),
            SceneState::Playing(stage) | SceneState::BossArena { stage, .. } => {
                (None, None, Some(StageView::new(stage)))
            }
            SceneState::Paused { stage, menu, .. } => {
                (None, Some(PauseView::new(menu)), Some(StageView::new(stage)))
            }
        };
        Snapshot {
            scene: self.scene.kind(),
            difficulty: self.difficulty(),
            menu,
            pause,
            stage,
        }
    }

    /// Decorated solid tiles of the active stage
    pub fn tile_map(&self) -> Vec<TileView> {
        self.stage()
            .map(|stage| snapshot::tile_map(&stage.level))
            .unwrap_or_default()
    }

    fn update_scene(&mut self, input: &TickInput, dt_ms: f32) -> Option<SceneTransition> {
        let ctx = StepContext {
            tuning: &self.tuning,
            kinematics: self.kinematics.as_ref(),
        };

        match &mut self.scene {
            SceneState::Menu(menu) => match menu.handle(input)? {
                MenuAction::Play(difficulty) => Some(SceneTransition::Play { difficulty }),
                MenuAction::DifficultyChanged(difficulty) => {
                    self.progression
                        .record_difficulty(self.storage.as_mut(), difficulty);
                    None
                }
            },
            SceneState::Playing(stage) => {
                if input.pause {
                    return Some(SceneTransition::Pause);
                }
                match stage.step(input, dt_ms, &ctx) {
                    StageOutcome::GameOver => Some(SceneTransition::GameOver {
                        last_score: stage.player.coins,
                        difficulty: stage.difficulty,
                    }),
                    StageOutcome::EnterBossGate { ordinal, position } => {
                        Some(SceneTransition::EnterBossGate {
                            difficulty: stage.difficulty,
                            coins: stage.player.coins,
                            hp: stage.player.hp,
                            checkpoint: stage.player.body.pos,
                            gate_ordinal: ordinal,
                            gate_position: position,
                        })
                    }
                    StageOutcome::Continue | StageOutcome::ReturnFromBoss => None,
                }
            }
            SceneState::Paused { stage, menu, .. } => match menu.handle(input)? {
                PauseOption::Resume => Some(SceneTransition::Resume),
                PauseOption::Restart => Some(SceneTransition::Restart),
                PauseOption::MainMenu => Some(SceneTransition::ToMenu {
                    last_score: stage.player.coins,
                    difficulty: stage.difficulty,
                }),
            },
            SceneState::BossArena { stage, entry } => {
                if input.pause {
                    return Some(SceneTransition::Pause);
                }
                match stage.step(input, dt_ms, &ctx) {
                    StageOutcome::GameOver => Some(SceneTransition::GameOver {
                        last_score: stage.player.coins,
                        difficulty: stage.difficulty,
                    }),
                    StageOutcome::ReturnFromBoss => Some(SceneTransition::ReturnFromBoss {
                        boss_cleared: stage.boss.as_ref().is_some_and(|b| !b.boss.is_active()),
                        gate_position: entry.gate_position,
                        checkpoint: entry.checkpoint,
                        difficulty: stage.difficulty,
                        coins: stage.player.coins,
                        hp: stage.player.hp,
                    }),
                    StageOutcome::Continue | StageOutcome::EnterBossGate { .. } => None,
                }
            }
        }
    }

    fn apply(&mut self, transition: SceneTransition) {
        log::info!("Scene {:?}: {:?}", self.scene.kind(), transition);

        match transition {
            SceneTransition::Play { difficulty } => {
                self.progression
                    .record_difficulty(self.storage.as_mut(), difficulty);
                self.teardown_current();
                let stage = self.build_level(difficulty);
                self.scene = SceneState::Playing(Box::new(stage));
            }
            SceneTransition::Pause => {
                self.scene = match self.take_scene() {
                    SceneState::Playing(stage) => SceneState::Paused {
                        stage,
                        menu: PauseMenu::new(),
                        arena: None,
                    },
                    SceneState::BossArena { stage, entry } => SceneState::Paused {
                        stage,
                        menu: PauseMenu::new(),
                        arena: Some(entry),
                    },
                    other => other,
                };
            }
            SceneTransition::Resume => {
                self.scene = match self.take_scene() {
                    SceneState::Paused {
                        stage,
                        arena: Some(entry),
                        ..
                    } => SceneState::BossArena { stage, entry },
                    SceneState::Paused { stage, .. } => SceneState::Playing(stage),
                    other => other,
                };
            }
            SceneTransition::Restart => {
                let difficulty = self.difficulty();
                self.teardown_current();
                let stage = self.build_level(difficulty);
                self.scene = SceneState::Playing(Box::new(stage));
            }
            SceneTransition::ToMenu {
                last_score,
                difficulty,
            }
            | SceneTransition::GameOver {
                last_score,
                difficulty,
            } => {
                self.teardown_current();
                self.progression
                    .record_run(self.storage.as_mut(), last_score, difficulty);
                self.scene = SceneState::Menu(MainMenu::new(difficulty));
            }
            SceneTransition::EnterBossGate {
                difficulty,
                coins,
                hp,
                checkpoint,
                gate_ordinal,
                gate_position,
            } => self.enter_arena(difficulty, coins, hp, checkpoint, gate_ordinal, gate_position),
            SceneTransition::ReturnFromBoss {
                boss_cleared,
                gate_position,
                checkpoint,
                difficulty,
                coins,
                hp,
            } => {
                self.teardown_current();
                if boss_cleared {
                    self.progression
                        .record_boss_clear(self.storage.as_mut(), gate_position, difficulty);
                }
                let mut stage = self.build_level(difficulty);
                restore_player(&mut stage, checkpoint, coins, hp);
                self.scene = SceneState::Playing(Box::new(stage));
            }
        }
    }

    fn enter_arena(
        &mut self,
        difficulty: Difficulty,
        coins: u64,
        hp: i32,
        checkpoint: Vec2,
        gate_ordinal: usize,
        gate_position: Vec2,
    ) {
        // Refuse before tearing anything down
        if let Err(e) = self.tuning.boss_for_gate(self.settings.level_id, gate_ordinal) {
            log::warn!("Boss gate {} refused: {}", gate_ordinal, e);
            if let Some(stage) = self.scene.stage_mut() {
                stage.objects.seal_gate(gate_ordinal);
            }
            return;
        }

        self.teardown_current();
        let seed = self.next_seed();
        let arena = Stage::boss_arena(
            self.arena_text.as_deref(),
            &self.settings,
            &self.tuning,
            difficulty,
            gate_ordinal,
            gate_position,
            seed,
        );
        self.scene = match arena {
            Ok(mut stage) => {
                stage.player.coins = coins;
                stage.player.hp = hp;
                SceneState::BossArena {
                    stage: Box::new(stage),
                    entry: ArenaEntry {
                        checkpoint,
                        gate_ordinal,
                        gate_position,
                    },
                }
            }
            Err(e) => {
                log::warn!("Boss arena unavailable: {}", e);
                let mut stage = self.build_level(difficulty);
                restore_player(&mut stage, checkpoint, coins, hp);
                stage.objects.seal_gate(gate_ordinal);
                SceneState::Playing(Box::new(stage))
            }
        };
    }

    /// Fresh main level with every profile-cleared gate already open
    fn build_level(&mut self, difficulty: Difficulty) -> Stage {
        let seed = self.next_seed();
        Stage::level(
            self.level_text.as_deref(),
            &self.settings,
            &self.tuning,
            difficulty,
            self.progression.cleared_gates(),
            seed,
        )
    }

    fn next_seed(&mut self) -> u64 {
        self.stage_counter += 1;
        self.settings
            .seed
            .wrapping_add(self.stage_counter.wrapping_mul(SEED_STRIDE))
    }

    fn take_scene(&mut self) -> SceneState {
        let placeholder = SceneState::Menu(MainMenu::new(self.progression.difficulty));
        std::mem::replace(&mut self.scene, placeholder)
    }

    /// Cancel timers and drop entities of whatever stage is live
    fn teardown_current(&mut self) {
        if let Some(stage) = self.scene.stage_mut() {
            stage.teardown();
        }
    }
}

fn restore_player(stage: &mut Stage, checkpoint: Vec2, coins: u64, hp: i32) {
    stage.player.place(checkpoint);
    stage.player.coins = coins;
    stage.player.hp = hp;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::progression::{KEY_BEST_SCORE, KEY_BOSS_CLEARED, KEY_DIFFICULTY, KEY_LAST_SCORE};
    use crate::sim::{Enemy, MenuNav, ObjectKind};

    const DT: f32 = 1000.0 / 60.0;
    const GATE_ROOM: &str = "..........\n..........\n..........\n.S..B.....\nxxxxxxxxxx\n";
    const TWO_GATE_ROOM: &str = "..........\n..........\n..........\n.S.B...B..\nxxxxxxxxxx\n";

    fn settings() -> Settings {
        Settings {
            world_width: 400.0,
            world_height: 200.0,
            ..Settings::default()
        }
    }

    fn game_with(settings: Settings, storage: MemoryStorage) -> Game {
        Game::new(settings, Tuning::default(), Box::new(storage))
            .with_levels(Some(GATE_ROOM.to_string()), None)
    }

    fn game() -> Game {
        game_with(settings(), MemoryStorage::new())
    }

    fn press(game: &mut Game, input: TickInput) {
        game.step(&input, DT);
    }

    fn confirm() -> TickInput {
        TickInput {
            confirm: true,
            ..TickInput::default()
        }
    }

    fn pause() -> TickInput {
        TickInput {
            pause: true,
            ..TickInput::default()
        }
    }

    fn nav(dir: MenuNav) -> TickInput {
        TickInput {
            menu_nav: Some(dir),
            ..TickInput::default()
        }
    }

    fn live_stage(game: &mut Game) -> &mut Stage {
        game.scene.stage_mut().unwrap()
    }

    /// Hold right until the scene changes or `max` steps pass
    fn walk_right(game: &mut Game, max: usize) {
        let start = game.scene_kind();
        let right = TickInput {
            right: true,
            ..TickInput::default()
        };
        for _ in 0..max {
            game.step(&right, DT);
            if game.scene_kind() != start {
                break;
            }
        }
    }

    /// Defeat the arena boss, step onto the waypoint and return
    fn beat_boss_and_return(game: &mut Game) {
        let arena = live_stage(game);
        for _ in 0..500 {
            if !arena.boss.as_ref().unwrap().boss.is_active() {
                break;
            }
            arena.hurt_boss(1);
        }
        let waypoint = arena.boss.as_ref().unwrap().waypoint.unwrap();
        arena.player.place(waypoint.center);
        arena.player.body.gravity = None;
        press(game, TickInput::default());
    }

    fn gate_flags(game: &Game) -> Vec<(usize, bool)> {
        let mut gates: Vec<(usize, bool)> = game
            .stage()
            .unwrap()
            .objects
            .objects
            .iter()
            .filter_map(|o| match o.kind {
                ObjectKind::BossGate { ordinal, cleared } => Some((ordinal, cleared)),
                _ => None,
            })
            .collect();
        gates.sort();
        gates
    }

    #[test]
    fn test_play_uses_stored_difficulty() {
        let mut game = game_with(settings(), MemoryStorage::new().with(KEY_DIFFICULTY, "normal"));
        assert_eq!(game.scene_kind(), SceneKind::Menu);
        assert_eq!(game.difficulty(), Difficulty::Normal);

        press(&mut game, confirm());
        assert_eq!(game.scene_kind(), SceneKind::Playing);
        assert_eq!(game.stage().unwrap().difficulty, Difficulty::Normal);
        assert!(game.stage().unwrap().director.is_some());
    }

    #[test]
    fn test_menu_difficulty_is_written_immediately() {
        let mut game = game();
        press(&mut game, nav(MenuNav::Up));
        press(&mut game, confirm());
        assert_eq!(game.difficulty(), Difficulty::Normal);
        assert_eq!(game.storage.get(KEY_DIFFICULTY).as_deref(), Some("normal"));
        assert_eq!(game.scene_kind(), SceneKind::Menu);
    }

    #[test]
    fn test_pause_suspends_and_resumes() {
        let mut game = game();
        press(&mut game, confirm());
        for _ in 0..10 {
            press(&mut game, TickInput::default());
        }
        let t = game.stage().unwrap().time_ms;

        press(&mut game, pause());
        assert_eq!(game.scene_kind(), SceneKind::Paused);
        for _ in 0..10 {
            press(&mut game, TickInput::default());
        }
        assert_eq!(game.stage().unwrap().time_ms, t);

        press(&mut game, pause());
        assert_eq!(game.scene_kind(), SceneKind::Playing);
        assert_eq!(game.stage().unwrap().time_ms, t);
    }

    #[test]
    fn test_restart_builds_fresh_stage() {
        let mut game = game();
        press(&mut game, confirm());
        for _ in 0..10 {
            press(&mut game, TickInput::default());
        }
        live_stage(&mut game).player.coins = 9;

        press(&mut game, pause());
        press(&mut game, nav(MenuNav::Down));
        press(&mut game, confirm());
        assert_eq!(game.scene_kind(), SceneKind::Playing);
        let stage = game.stage().unwrap();
        assert_eq!(stage.time_ms, 0.0);
        assert_eq!(stage.player.coins, 0);
        assert_eq!(stage.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_main_menu_from_pause_records_run() {
        let mut game = game();
        press(&mut game, confirm());
        live_stage(&mut game).player.coins = 7;

        press(&mut game, pause());
        press(&mut game, nav(MenuNav::Up));
        press(&mut game, confirm());
        assert_eq!(game.scene_kind(), SceneKind::Menu);
        assert_eq!(game.progression().last_score, 7);
        assert_eq!(game.storage.get(KEY_LAST_SCORE).as_deref(), Some("7"));
        assert_eq!(game.storage.get(KEY_BEST_SCORE).as_deref(), Some("7"));
    }

    #[test]
    fn test_game_over_keeps_best() {
        let mut game = game_with(settings(), MemoryStorage::new().with(KEY_BEST_SCORE, "10"));
        press(&mut game, confirm());
        let tuning = Tuning::default();
        let stage = live_stage(&mut game);
        stage.player.coins = 5;
        stage.player.hp = 1;
        let at = stage.player.body.pos;
        stage
            .enemies
            .push(Enemy::spawn(500, tuning.enemy("slug").unwrap(), at, 1.0));

        press(&mut game, TickInput::default());
        assert_eq!(game.scene_kind(), SceneKind::Menu);
        assert_eq!(game.progression().last_score, 5);
        assert_eq!(game.progression().best_score, 10);
        assert_eq!(game.storage.get(KEY_LAST_SCORE).as_deref(), Some("5"));
        assert_eq!(game.storage.get(KEY_BEST_SCORE).as_deref(), Some("10"));
    }

    #[test]
    fn test_boss_round_trip_clears_gate() {
        let mut game = game();
        press(&mut game, confirm());
        live_stage(&mut game).player.coins = 4;

        walk_right(&mut game, 120);
        assert_eq!(game.scene_kind(), SceneKind::BossArena);
        let checkpoint = match &game.scene {
            SceneState::BossArena { entry, .. } => {
                assert_eq!(entry.gate_position, Vec2::new(180.0, 140.0));
                entry.checkpoint
            }
            _ => unreachable!(),
        };
        let arena = live_stage(&mut game);
        assert_eq!(arena.player.coins, 4);
        assert_eq!(arena.boss.as_ref().unwrap().boss.kind, "sentinel");

        for _ in 0..30 {
            arena.hurt_boss(1);
        }
        let waypoint = arena.boss.as_ref().unwrap().waypoint.unwrap();
        arena.player.place(waypoint.center);
        arena.player.body.gravity = None;
        press(&mut game, TickInput::default());

        assert_eq!(game.scene_kind(), SceneKind::Playing);
        assert!(game.progression().boss_cleared);
        assert_eq!(game.storage.get(KEY_BOSS_CLEARED).as_deref(), Some("1"));
        let stage = game.stage().unwrap();
        assert_eq!(stage.player.body.pos, checkpoint);
        assert_eq!(stage.player.coins, 4);
        assert!(stage.objects.objects.iter().any(|o| matches!(
            o.kind,
            ObjectKind::BossGate { cleared: true, .. }
        )));

        for _ in 0..5 {
            press(&mut game, TickInput::default());
        }
        assert_eq!(game.scene_kind(), SceneKind::Playing);
    }

    #[test]
    fn test_clearing_second_gate_keeps_first_cleared() {
        let mut game = Game::new(settings(), Tuning::default(), Box::new(MemoryStorage::new()))
            .with_levels(Some(TWO_GATE_ROOM.to_string()), None);
        press(&mut game, confirm());

        walk_right(&mut game, 120);
        assert_eq!(game.scene_kind(), SceneKind::BossArena);
        beat_boss_and_return(&mut game);
        assert_eq!(game.scene_kind(), SceneKind::Playing);
        assert_eq!(gate_flags(&game), vec![(0, true), (1, false)]);

        walk_right(&mut game, 120);
        assert_eq!(game.scene_kind(), SceneKind::BossArena);
        beat_boss_and_return(&mut game);
        assert_eq!(game.scene_kind(), SceneKind::Playing);
        assert_eq!(gate_flags(&game), vec![(0, true), (1, true)]);
        assert_eq!(game.progression().cleared_gates().len(), 2);

        // A fresh run on the same profile starts with both open
        let storage = MemoryStorage::new()
            .with(KEY_BOSS_CLEARED, "1")
            .with(
                crate::progression::KEY_BOSS_GATE_POS,
                &game.storage.get(crate::progression::KEY_BOSS_GATE_POS).unwrap(),
            );
        let mut next = Game::new(settings(), Tuning::default(), Box::new(storage))
            .with_levels(Some(TWO_GATE_ROOM.to_string()), None);
        press(&mut next, confirm());
        assert_eq!(gate_flags(&next), vec![(0, true), (1, true)]);
    }

    #[test]
    fn test_pause_in_arena_resumes_arena() {
        let mut game = game();
        press(&mut game, confirm());
        walk_right(&mut game, 120);
        assert_eq!(game.scene_kind(), SceneKind::BossArena);
        let t = game.stage().unwrap().time_ms;

        press(&mut game, pause());
        assert_eq!(game.scene_kind(), SceneKind::Paused);
        for _ in 0..10 {
            press(&mut game, TickInput::default());
        }
        assert_eq!(game.stage().unwrap().time_ms, t);
        assert!(game.stage().unwrap().boss.is_some());

        press(&mut game, confirm());
        assert_eq!(game.scene_kind(), SceneKind::BossArena);
        assert_eq!(game.stage().unwrap().time_ms, t);
        assert!(matches!(
            &game.scene,
            SceneState::BossArena { entry, .. } if entry.gate_position == Vec2::new(180.0, 140.0)
        ));
    }

    #[test]
    fn test_cleared_gate_persists_into_new_run() {
        let storage = MemoryStorage::new()
            .with(KEY_BOSS_CLEARED, "1")
            .with(crate::progression::KEY_BOSS_GATE_POS, r#"{"x":180.0,"y":140.0}"#);
        let mut game = game_with(settings(), storage);
        press(&mut game, confirm());
        walk_right(&mut game, 60);
        assert_eq!(game.scene_kind(), SceneKind::Playing);
    }

    #[test]
    fn test_missing_boss_config_seals_gate() {
        let settings = Settings {
            level_id: 9,
            ..settings()
        };
        let mut game = game_with(settings, MemoryStorage::new());
        press(&mut game, confirm());
        walk_right(&mut game, 60);
        assert_eq!(game.scene_kind(), SceneKind::Playing);
        let sealed = game
            .stage()
            .unwrap()
            .objects
            .count(|k| matches!(k, ObjectKind::BossGate { cleared: true, .. }));
        assert_eq!(sealed, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = game();
        let menu = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(menu["scene"], "menu");
        assert_eq!(menu["menu"]["selected"], "play");
        assert!(menu.get("stage").is_none());

        press(&mut game, confirm());
        let playing = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(playing["scene"], "playing");
        assert_eq!(playing["difficulty"], "easy");
        assert_eq!(playing["stage"]["gates"].as_array().unwrap().len(), 1);
        assert_eq!(playing["stage"]["player"]["hp"], 5);
        assert_eq!(game.tile_map().len(), 10);
    }
}
