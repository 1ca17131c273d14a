//! Deterministic stage simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entities and markers in insertion order)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod combat;
pub mod level;
pub mod objects;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use boss::{Boss, BossAiState, BossEncounter};
pub use collision::{Aabb, ArcadeKinematics, Blocked, Body, Kinematics, SolidQuery};
pub use level::{LevelDescriptor, Marker, MarkerKind, TileEdge};
pub use objects::{DoorState, InteractiveObject, ObjectKind, ObjectRegistry};
pub use spawn::SpawnDirector;
pub use state::{
    AttackState, Enemy, EntityId, Player, RewardCue, Stage, StageEvent, StageKind, StageOutcome,
    Toast,
};
pub use tick::{MenuNav, StepContext, TickInput};
pub use timers::{TimerId, Timers};
