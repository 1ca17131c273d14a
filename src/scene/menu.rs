//! Main and pause menus

use serde::Serialize;

use crate::sim::{MenuNav, TickInput};
use crate::tuning::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuOption {
    Play,
    Score,
    Settings,
}

impl MenuOption {
    pub const ALL: [MenuOption; 3] = [MenuOption::Play, MenuOption::Score, MenuOption::Settings];
}

/// What the main menu asks for after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Play(Difficulty),
    DifficultyChanged(Difficulty),
}

#[derive(Debug, Clone)]
pub struct MainMenu {
    pub selected: usize,
    pub difficulty: Difficulty,
    /// Last/best panel toggled by confirming Score
    pub show_scores: bool,
}

impl MainMenu {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            selected: 0,
            difficulty,
            show_scores: false,
        }
    }

    pub fn selected_option(&self) -> MenuOption {
        MenuOption::ALL[self.selected % MenuOption::ALL.len()]
    }

    pub fn handle(&mut self, input: &TickInput) -> Option<MenuAction> {
        let on_settings = self.selected_option() == MenuOption::Settings;
        match input.menu_nav {
            Some(MenuNav::Up) => self.selected = wrap(self.selected, -1, MenuOption::ALL.len()),
            Some(MenuNav::Down) => self.selected = wrap(self.selected, 1, MenuOption::ALL.len()),
            Some(MenuNav::Left) if on_settings => {
                return Some(self.set_difficulty(self.difficulty.prev()));
            }
            Some(MenuNav::Right) if on_settings => {
                return Some(self.set_difficulty(self.difficulty.next()));
            }
            _ => {}
        }

        if !input.confirm {
            return None;
        }
        match self.selected_option() {
            MenuOption::Play => Some(MenuAction::Play(self.difficulty)),
            MenuOption::Score => {
                self.show_scores = !self.show_scores;
                None
            }
            MenuOption::Settings => Some(self.set_difficulty(self.difficulty.next())),
        }
    }

    fn set_difficulty(&mut self, difficulty: Difficulty) -> MenuAction {
        self.difficulty = difficulty;
        MenuAction::DifficultyChanged(difficulty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseOption {
    Resume,
    Restart,
    MainMenu,
}

impl PauseOption {
    pub const ALL: [PauseOption; 3] = [
        PauseOption::Resume,
        PauseOption::Restart,
        PauseOption::MainMenu,
    ];
}

#[derive(Debug, Clone, Default)]
pub struct PauseMenu {
    pub selected: usize,
}

impl PauseMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_option(&self) -> PauseOption {
        PauseOption::ALL[self.selected % PauseOption::ALL.len()]
    }

    /// Pause pressed again resumes
    pub fn handle(&mut self, input: &TickInput) -> Option<PauseOption> {
        if input.pause {
            return Some(PauseOption::Resume);
        }
        match input.menu_nav {
            Some(MenuNav::Up) => self.selected = wrap(self.selected, -1, PauseOption::ALL.len()),
            Some(MenuNav::Down) => self.selected = wrap(self.selected, 1, PauseOption::ALL.len()),
            _ => {}
        }
        input.confirm.then(|| self.selected_option())
    }
}

fn wrap(index: usize, delta: isize, len: usize) -> usize {
    (index as isize + delta).rem_euclid(len as isize) as usize
}
