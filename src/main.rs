//! Bug Knight headless driver
//!
//! Runs a scripted session through the scene machine and prints the final
//! presentation snapshot as JSON.
//!
//! Usage: `bug-knight [settings.json] [frames]`

#[cfg(not(target_arch = "wasm32"))]
mod driver {
    use std::path::PathBuf;

    use bug_knight::consts::{MAX_SUBSTEPS, SIM_DT_MS};
    use bug_knight::persistence::FileStorage;
    use bug_knight::sim::TickInput;
    use bug_knight::{Game, SceneKind, Settings};

    /// Simulated display frame length (30 Hz, two sim steps each)
    const FRAME_MS: f32 = 1000.0 / 30.0;
    const DEFAULT_FRAMES: u32 = 900;

    /// Fixed-step loop that feeds scripted input to the game
    struct Driver {
        game: Game,
        accumulator: f32,
        input: TickInput,
        frame: u32,
    }

    impl Driver {
        fn new(game: Game) -> Self {
            Self {
                game,
                accumulator: 0.0,
                input: TickInput::default(),
                frame: 0,
            }
        }

        /// Run simulation steps for one display frame
        fn update(&mut self, frame_ms: f32) {
            self.accumulator += frame_ms.min(100.0);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                self.game.step(&input, SIM_DT_MS);
                self.accumulator -= SIM_DT_MS;
                substeps += 1;

                // Edge-triggered actions fire once
                self.input.jump = false;
                self.input.dash = false;
                self.input.attack = false;
                self.input.pause = false;
                self.input.confirm = false;
                self.input.menu_nav = None;
            }
            self.frame += 1;
        }

        /// Scripted player: start from the menu, run right, jump and swing
        fn script(&mut self) {
            let f = self.frame;
            match self.game.scene_kind() {
                SceneKind::Menu => self.input.confirm = f % 15 == 0,
                SceneKind::Paused => self.input.pause = true,
                SceneKind::Playing | SceneKind::BossArena => {
                    let phase = f % 120;
                    self.input.right = phase < 80;
                    self.input.left = phase >= 100;
                    self.input.jump |= f % 20 == 0;
                    self.input.attack |= f % 6 == 0;
                    self.input.dash |= f % 45 == 0;
                    self.input.pause |= f == 300;
                }
            }
        }
    }

    pub fn run() {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let settings_path = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("bug_knight.json"));
        let frames = args
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_FRAMES);

        let settings = Settings::load(&settings_path);
        let tuning = settings.load_tuning();
        let storage = FileStorage::open(&settings.storage_path);
        let levels = (settings.level_text(), settings.boss_arena_text());
        log::info!(
            "Bug Knight starting: {}x{} tiles, seed {:#x}",
            settings.cols(),
            settings.rows(),
            settings.seed
        );

        let game = Game::new(settings, tuning, Box::new(storage)).with_levels(levels.0, levels.1);
        let mut driver = Driver::new(game);

        for _ in 0..frames {
            driver.script();
            driver.update(FRAME_MS);

            if driver.frame % 150 == 0 {
                let snapshot = driver.game.snapshot();
                match &snapshot.stage {
                    Some(stage) => log::info!(
                        "frame {}: {:?} hp={} coins={} enemies={} pos=({:.0}, {:.0})",
                        driver.frame,
                        snapshot.scene,
                        stage.player.hp,
                        stage.coins,
                        stage.enemies.len(),
                        stage.player.position.x,
                        stage.player.position.y
                    ),
                    None => log::info!("frame {}: {:?}", driver.frame, snapshot.scene),
                }
            }
        }

        let progression = driver.game.progression();
        log::info!(
            "Session over: last={} best={}",
            progression.last_score,
            progression.best_score
        );
        match serde_json::to_string_pretty(&driver.game.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not encode snapshot: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    driver::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless driver on the web target
}
