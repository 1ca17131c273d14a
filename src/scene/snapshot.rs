//! Read-only presentation snapshot
//!
//! Everything a renderer needs for one frame, serializable as JSON.

use glam::Vec2;
use serde::Serialize;

use super::SceneKind;
use super::menu::{MainMenu, MenuOption, PauseMenu, PauseOption};
use crate::progression::ProgressionRecord;
use crate::sim::{BossAiState, DoorState, LevelDescriptor, ObjectKind, Stage, StageKind, TileEdge};
use crate::tuning::Difficulty;

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub scene: SceneKind,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause: Option<PauseView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuView {
    pub options: Vec<MenuOption>,
    pub selected: MenuOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScorePanel>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScorePanel {
    pub last: u64,
    pub best: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PauseView {
    pub options: Vec<PauseOption>,
    pub selected: PauseOption,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub arena: bool,
    pub time_ms: f32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub boss: Option<BossView>,
    pub coins: u64,
    pub toast: Option<String>,
    pub doors: Vec<DoorView>,
    pub keys: Vec<Vec2>,
    pub passages: Vec<Vec2>,
    pub hidden_blocks: Vec<Vec2>,
    pub treasures: Vec<Vec2>,
    pub gates: Vec<GateView>,
    pub waypoint: Option<Vec2>,
    pub cues: Vec<CueView>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlayerView {
    pub position: Vec2,
    pub facing: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub invulnerable: bool,
    pub has_key: bool,
    pub attacking: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub kind: String,
    pub position: Vec2,
    pub facing: f32,
    pub hp: i32,
    pub flash: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub kind: String,
    pub position: Vec2,
    pub facing: f32,
    pub state: BossAiState,
    pub hp_ratio: f32,
    pub flash: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DoorView {
    pub position: Vec2,
    pub state: DoorState,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GateView {
    pub position: Vec2,
    pub ordinal: usize,
    pub cleared: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CueView {
    pub position: Vec2,
    pub amount: u64,
}

/// One decorated solid tile
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TileView {
    pub col: usize,
    pub row: usize,
    pub edge: TileEdge,
}

impl MenuView {
    pub fn new(menu: &MainMenu, progression: &ProgressionRecord) -> Self {
        Self {
            options: MenuOption::ALL.to_vec(),
            selected: menu.selected_option(),
            scores: menu.show_scores.then_some(ScorePanel {
                last: progression.last_score,
                best: progression.best_score,
            }),
        }
    }
}

impl PauseView {
    pub fn new(menu: &PauseMenu) -> Self {
        Self {
            options: PauseOption::ALL.to_vec(),
            selected: menu.selected_option(),
        }
    }
}

impl StageView {
    pub fn new(stage: &Stage) -> Self {
        let player = &stage.player;
        let mut view = Self {
            arena: stage.kind == StageKind::BossArena,
            time_ms: stage.time_ms,
            player: PlayerView {
                position: player.body.pos,
                facing: player.facing,
                hp: player.hp,
                max_hp: player.max_hp,
                invulnerable: player.is_invulnerable(),
                has_key: player.has_key,
                attacking: stage.attack.active,
            },
            enemies: stage
                .enemies
                .iter()
                .map(|e| EnemyView {
                    kind: e.kind.clone(),
                    position: e.body.pos,
                    facing: e.facing(),
                    hp: e.hp,
                    flash: e.flash,
                })
                .collect(),
            boss: stage.boss.as_ref().map(|encounter| {
                let boss = &encounter.boss;
                BossView {
                    kind: boss.kind.clone(),
                    position: boss.body.pos,
                    facing: boss.facing,
                    state: boss.state,
                    hp_ratio: boss.hp_ratio(),
                    flash: boss.flash,
                }
            }),
            coins: player.coins,
            toast: stage.toast_text().map(str::to_string),
            doors: Vec::new(),
            keys: Vec::new(),
            passages: Vec::new(),
            hidden_blocks: Vec::new(),
            treasures: Vec::new(),
            gates: Vec::new(),
            waypoint: stage.boss.as_ref().and_then(|b| b.waypoint).map(|w| w.center),
            cues: stage
                .cues
                .iter()
                .map(|c| CueView {
                    position: c.position(),
                    amount: c.amount,
                })
                .collect(),
        };

        for object in &stage.objects.objects {
            let position = object.area.center;
            match object.kind {
                ObjectKind::Door { state, .. } => view.doors.push(DoorView { position, state }),
                ObjectKind::Key => view.keys.push(position),
                ObjectKind::HiddenPassage => view.passages.push(position),
                ObjectKind::HiddenBlock => view.hidden_blocks.push(position),
                ObjectKind::Treasure => view.treasures.push(position),
                ObjectKind::BossGate { ordinal, cleared } => view.gates.push(GateView {
                    position,
                    ordinal,
                    cleared,
                }),
                ObjectKind::KillZone => {}
            }
        }
        view
    }
}

/// Static tile layer of a compiled level, column by column
pub fn tile_map(level: &LevelDescriptor) -> Vec<TileView> {
    level
        .solids
        .iter()
        .filter_map(|&(col, row)| level.tile_edge(col, row).map(|edge| TileView { col, row, edge }))
        .collect()
}
