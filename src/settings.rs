//! Runtime settings
//!
//! Loaded from a JSON file next to the binary. Every field has a default so
//! a partial (or missing) file still yields a playable configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{TILE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World size in pixels (rounded down to whole tiles)
    pub world_width: f32,
    pub world_height: f32,
    /// Tile edge length in pixels
    pub tile: f32,
    /// Boss arena grid size in tiles
    pub boss_arena_cols: usize,
    pub boss_arena_rows: usize,
    /// Level id used to look up the boss registry
    pub level_id: u32,
    /// Directory holding level text files
    pub levels_dir: PathBuf,
    pub level_file: String,
    pub boss_arena_file: String,
    /// Optional tuning override document
    pub tuning_file: Option<PathBuf>,
    /// Progression store
    pub storage_path: PathBuf,
    /// Run seed for reproducibility
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            tile: TILE,
            boss_arena_cols: 56,
            boss_arena_rows: 18,
            level_id: 1,
            levels_dir: PathBuf::from("levels"),
            level_file: "level1.txt".to_string(),
            boss_arena_file: "boss_arena.txt".to_string(),
            tuning_file: None,
            storage_path: PathBuf::from("bug_knight_save.json"),
            seed: 0x5EED_B0C5,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Grid columns of the main level
    pub fn cols(&self) -> usize {
        (self.world_width / self.tile).floor().max(1.0) as usize
    }

    /// Grid rows of the main level
    pub fn rows(&self) -> usize {
        (self.world_height / self.tile).floor().max(1.0) as usize
    }

    /// Main level text, if one is authored
    pub fn level_text(&self) -> Option<String> {
        read_optional(&self.levels_dir.join(&self.level_file))
    }

    /// Boss arena text, if one is authored
    pub fn boss_arena_text(&self) -> Option<String> {
        read_optional(&self.levels_dir.join(&self.boss_arena_file))
    }

    /// Built-in tuning with the optional override applied
    pub fn load_tuning(&self) -> Tuning {
        let Some(path) = &self.tuning_file else {
            return Tuning::default();
        };
        match std::fs::read_to_string(path).map(|json| Tuning::from_json(&json)) {
            Ok(Ok(tuning)) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Ok(Err(e)) => {
                log::warn!("Ignoring malformed tuning {}: {}", path.display(), e);
                Tuning::default()
            }
            Err(e) => {
                log::warn!("Tuning file {} unavailable: {}", path.display(), e);
                Tuning::default()
            }
        }
    }
}

fn read_optional(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            log::debug!("Read level text {}", path.display());
            Some(text)
        }
        Err(_) => {
            log::info!("No level text at {}, using procedural layout", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_size() {
        let settings = Settings::default();
        assert_eq!(settings.cols(), 155);
        assert_eq!(settings.rows(), 100);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "seed": 7, "tile": 20.0 }"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.cols(), 310);
        assert_eq!(settings.boss_arena_cols, 56);
        assert_eq!(settings.level_file, "level1.txt");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load(Path::new("/definitely/not/here.json"));
        assert_eq!(settings.level_id, 1);
    }
}
