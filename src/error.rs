//! Configuration-reference errors
//!
//! Only lookups into the tuning tables can fail. Callers refuse the single
//! spawn or placement that asked for the bad key and keep going.

use crate::tuning::Difficulty;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("unknown enemy type: {0}")]
    UnknownEnemyType(String),

    #[error("unknown boss type: {0}")]
    UnknownBossType(String),

    #[error("no boss registry for level {0}")]
    UnknownLevel(u32),

    #[error("enemy pool for {0} difficulty is empty")]
    EmptyEnemyPool(Difficulty),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}
