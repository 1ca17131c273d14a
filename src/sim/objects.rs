//! Interactive object registry
//!
//! Doors, keys, passages, hidden blocks, kill zones, treasure and boss gates.
//! Each object is created from a level marker and resolved against the
//! player (and enemies, for kill zones) once per step after physics.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use super::collision::{Aabb, Kinematics};
use super::level::{LevelDescriptor, MarkerKind};
use super::state::{EntityId, Stage, StageEvent, StageOutcome};
use crate::consts::*;

/// Toast lifetime for the passage message
const PASSAGE_TOAST_MS: f32 = 1200.0;

pub const MSG_KEY: &str = "You got the key! Find the door.";
pub const MSG_DOOR_LOCKED: &str = "The door is locked. Find the key.";
pub const MSG_DOOR_OPENING: &str = "The door is opening...";
pub const MSG_PASSAGE: &str = "You found a hidden passage!";
pub const MSG_HIDDEN_TREASURE: &str = "You found a hidden treasure!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Locked,
    Opening,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectKind {
    Door {
        state: DoorState,
        /// Player was in contact last step
        contact: bool,
    },
    Key,
    HiddenPassage,
    HiddenBlock,
    KillZone,
    Treasure,
    BossGate {
        ordinal: usize,
        cleared: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveObject {
    pub id: EntityId,
    pub kind: ObjectKind,
    pub area: Aabb,
}

impl InteractiveObject {
    /// Whether this object currently blocks movement
    pub fn is_solid(&self) -> bool {
        match self.kind {
            ObjectKind::Door { state, .. } => state != DoorState::Open,
            ObjectKind::HiddenBlock => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    pub objects: Vec<InteractiveObject>,
    /// Set by the first hidden block reveal; no other block triggers after it
    pub hidden_block_revealed: bool,
    /// Network-wide passage re-trigger lock
    pub teleport_lock_ms: f32,
}

impl ObjectRegistry {
    /// Instantiate every marker of a compiled level
    ///
    /// Gates within a pixel of any `cleared_gates` entry start out cleared.
    pub fn from_level(
        level: &LevelDescriptor,
        cleared_gates: &[Vec2],
        mut next_id: impl FnMut() -> EntityId,
    ) -> Self {
        let t = level.tile;
        let mut objects = Vec::new();

        for (&marker_kind, markers) in &level.markers {
            for marker in markers {
                let (kind, size) = match marker_kind {
                    MarkerKind::Door => (
                        ObjectKind::Door {
                            state: DoorState::Locked,
                            contact: false,
                        },
                        Vec2::new(t, t * 2.0),
                    ),
                    MarkerKind::Key => (ObjectKind::Key, Vec2::splat(t * 0.75)),
                    MarkerKind::HiddenPassage => (ObjectKind::HiddenPassage, Vec2::splat(t)),
                    MarkerKind::HiddenBlock => (ObjectKind::HiddenBlock, Vec2::splat(t)),
                    MarkerKind::KillZone => (ObjectKind::KillZone, Vec2::splat(t)),
                    MarkerKind::Treasure => (ObjectKind::Treasure, Vec2::splat(12.0)),
                    MarkerKind::BossGate => (
                        ObjectKind::BossGate {
                            ordinal: marker.ordinal,
                            cleared: cleared_gates
                                .iter()
                                .any(|p| p.distance(marker.position) < 1.0),
                        },
                        Vec2::new(t, t * 2.0),
                    ),
                };
                objects.push(InteractiveObject {
                    id: next_id(),
                    kind,
                    area: Aabb::new(marker.position, size),
                });
            }
        }

        Self {
            objects,
            hidden_block_revealed: false,
            teleport_lock_ms: 0.0,
        }
    }

    /// Solid boxes contributed by objects
    pub fn blockers(&self) -> impl Iterator<Item = Aabb> + '_ {
        self.objects.iter().filter(|o| o.is_solid()).map(|o| o.area)
    }

    pub fn get(&self, id: EntityId) -> Option<&InteractiveObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn remove(&mut self, id: EntityId) {
        self.objects.retain(|o| o.id != id);
    }

    pub fn count(&self, pred: impl Fn(&ObjectKind) -> bool) -> usize {
        self.objects.iter().filter(|o| pred(&o.kind)).count()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Stop a gate from triggering for the rest of this stage
    pub fn seal_gate(&mut self, ordinal: usize) {
        for object in &mut self.objects {
            if let ObjectKind::BossGate { ordinal: o, cleared } = &mut object.kind {
                if *o == ordinal {
                    *cleared = true;
                }
            }
        }
    }

    pub(crate) fn tick(&mut self, dt_ms: f32) {
        self.teleport_lock_ms = (self.teleport_lock_ms - dt_ms).max(0.0);
    }
}

impl Stage {
    /// Instantiate this stage's level markers as objects
    pub(crate) fn attach_objects(&mut self, cleared_gates: &[Vec2]) {
        let mut next = self.next_id;
        self.objects = ObjectRegistry::from_level(&self.level, cleared_gates, || {
            let id = next;
            next += 1;
            id
        });
        self.next_id = next;
    }

    /// Resolve the player (and enemies) against every interactive object
    pub(crate) fn resolve_objects(&mut self, kin: &dyn Kinematics) -> StageOutcome {
        let ids: Vec<EntityId> = self.objects.objects.iter().map(|o| o.id).collect();
        for id in ids {
            let Some(object) = self.objects.get(id).cloned() else {
                continue;
            };
            let player_box = self.player.body.aabb();
            let overlapping = kin.overlaps(&player_box, &object.area);

            match object.kind {
                ObjectKind::Door { state, contact } => {
                    let touching = overlapping || kin.touching(&player_box, &object.area).any();
                    self.resolve_door(id, state, contact, touching);
                }
                ObjectKind::Key if overlapping => {
                    self.player.has_key = true;
                    self.objects.remove(id);
                    self.show_toast(MSG_KEY, TOAST_MS);
                }
                ObjectKind::HiddenPassage if overlapping => self.enter_passage(id),
                ObjectKind::HiddenBlock => {
                    if self.player.body.blocked.up && kin.touching(&player_box, &object.area).up {
                        self.reveal_hidden_block(&object);
                    }
                }
                ObjectKind::KillZone => {
                    if overlapping {
                        self.respawn_player();
                    }
                    self.enemies
                        .retain(|e| !kin.overlaps(&e.body.aabb(), &object.area));
                }
                ObjectKind::Treasure if overlapping => {
                    let amount = self.rng.random_range(1..=5u64);
                    self.award_coins(amount, object.area.center - Vec2::new(0.0, 10.0));
                    self.objects.remove(id);
                }
                ObjectKind::BossGate { ordinal, cleared } if overlapping && !cleared => {
                    return StageOutcome::EnterBossGate {
                        ordinal,
                        position: object.area.center,
                    };
                }
                _ => {}
            }
        }
        StageOutcome::Continue
    }

    fn set_door(&mut self, id: EntityId, state: DoorState, contact: bool) {
        if let Some(object) = self.objects.objects.iter_mut().find(|o| o.id == id) {
            object.kind = ObjectKind::Door { state, contact };
        }
    }

    fn resolve_door(&mut self, id: EntityId, state: DoorState, was_touching: bool, touching: bool) {
        if state != DoorState::Locked || !touching {
            self.set_door(id, state, touching);
            return;
        }
        if self.player.has_key {
            self.player.has_key = false;
            self.set_door(id, DoorState::Opening, touching);
            self.show_toast(MSG_DOOR_OPENING, DOOR_OPEN_MS + TOAST_MS);
            self.timers.after(DOOR_OPEN_MS, StageEvent::DoorOpened(id));
            log::info!("Door {} opening", id);
        } else {
            self.set_door(id, DoorState::Locked, touching);
            if !was_touching {
                self.player.body.vel = Vec2::ZERO;
                self.player.body.blocked.left = false;
                self.player.body.blocked.right = false;
                self.show_toast(MSG_DOOR_LOCKED, TOAST_MS);
            }
        }
    }

    pub(crate) fn open_door(&mut self, id: EntityId) {
        if let Some(ObjectKind::Door {
            state: DoorState::Opening,
            contact,
        }) = self.objects.get(id).map(|o| o.kind)
        {
            self.set_door(id, DoorState::Open, contact);
            log::info!("Door {} open", id);
        }
    }

    fn enter_passage(&mut self, entry: EntityId) {
        if self.objects.teleport_lock_ms > 0.0 {
            return;
        }
        let exits: Vec<Vec2> = self
            .objects
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::HiddenPassage && o.id != entry)
            .map(|o| o.area.center)
            .collect();
        let Some(&dest) = exits.choose(&mut self.rng) else {
            return;
        };

        let lift = self.player.body.size.y / 2.0;
        self.player.body.pos = dest - Vec2::new(0.0, lift);
        self.player.body.vel = Vec2::ZERO;
        self.objects.teleport_lock_ms = TELEPORT_LOCK_MS;
        self.objects.remove(entry);
        self.show_toast(MSG_PASSAGE, PASSAGE_TOAST_MS);
        log::debug!("Passage {} -> ({}, {})", entry, dest.x, dest.y);
    }

    fn reveal_hidden_block(&mut self, block: &InteractiveObject) {
        if self.objects.hidden_block_revealed {
            return;
        }
        self.objects.hidden_block_revealed = true;
        let id = self.allocate_id();
        self.objects.objects.push(InteractiveObject {
            id,
            kind: ObjectKind::Treasure,
            area: Aabb::new(block.area.center - Vec2::new(0.0, 30.0), Vec2::splat(12.0)),
        });
        self.objects.remove(block.id);
        self.show_toast(MSG_HIDDEN_TREASURE, TOAST_MS);
    }

    /// Kill zone penalty: one damage (never fatal) and back to the start
    fn respawn_player(&mut self) {
        self.player.hp = (self.player.hp - 1).max(1);
        let start = self.level.start;
        self.player.place(start);
        self.player.invuln_ms = RESPAWN_INVULN_MS;
        log::debug!("Player respawned, hp={}", self.player.hp);
    }
}
