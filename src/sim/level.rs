//! ASCII level compiler
//!
//! Turns a text grid into solid tiles plus typed markers. The grid size is
//! fixed by the caller; source text is bottom-aligned into it (extra leading
//! rows cropped, missing rows prepended empty) and every row is cut or padded
//! to the exact column count.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::Serialize;

use crate::tuning::Difficulty;

/// Empty-tile character
pub const EMPTY: char = '.';
pub const SOLID: char = 'x';

/// Object markers the compiler records for the stage to instantiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Key,
    Door,
    HiddenPassage,
    HiddenBlock,
    KillZone,
    Treasure,
    BossGate,
}

/// Classification of one grid character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Solid,
    Start,
    Anchor,
    Marker(MarkerKind),
}

impl Cell {
    pub fn from_char(ch: char) -> Self {
        match ch {
            'x' => Cell::Solid,
            'S' => Cell::Start,
            'E' => Cell::Anchor,
            'T' => Cell::Marker(MarkerKind::Treasure),
            '_' => Cell::Marker(MarkerKind::KillZone),
            'K' => Cell::Marker(MarkerKind::Key),
            'D' => Cell::Marker(MarkerKind::Door),
            'H' => Cell::Marker(MarkerKind::HiddenPassage),
            'Q' => Cell::Marker(MarkerKind::HiddenBlock),
            'B' => Cell::Marker(MarkerKind::BossGate),
            _ => Cell::Empty,
        }
    }
}

/// A marker instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// World position (tile center plus the kind's offset)
    pub position: Vec2,
    /// (col, row)
    pub cell: (usize, usize),
    /// Discovery index among markers of the same kind (row-major)
    pub ordinal: usize,
}

/// Cosmetic decoration of a solid tile, from its 4-neighbourhood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileEdge {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Interior,
}

/// Compiled, immutable level
#[derive(Debug, Clone)]
pub struct LevelDescriptor {
    pub cols: usize,
    pub rows: usize,
    pub tile: f32,
    pub solids: BTreeSet<(usize, usize)>,
    pub start: Vec2,
    pub spawn_anchors: Vec<Vec2>,
    pub markers: BTreeMap<MarkerKind, Vec<Marker>>,
}

impl LevelDescriptor {
    /// Compile `text` into a `cols × rows` level; `None` builds the procedural layout
    pub fn compile(
        text: Option<&str>,
        cols: usize,
        rows: usize,
        tile: f32,
        difficulty: Difficulty,
    ) -> Self {
        let lines = match text {
            Some(text) => normalize(text, cols, rows),
            None => procedural_layout(cols, rows, difficulty),
        };
        Self::from_lines(&lines, tile)
    }

    /// Compile an arena; `None` builds the procedural arena
    pub fn compile_arena(text: Option<&str>, cols: usize, rows: usize, tile: f32) -> Self {
        let lines = match text {
            Some(text) => normalize(text, cols, rows),
            None => procedural_boss_arena(cols, rows),
        };
        Self::from_lines(&lines, tile)
    }

    /// Build from already-normalized rows
    fn from_lines(lines: &[Vec<char>], tile: f32) -> Self {
        let rows = lines.len();
        let cols = lines.first().map_or(0, Vec::len);

        let mut solids = BTreeSet::new();
        let mut start = None;
        let mut spawn_anchors = Vec::new();
        let mut markers: BTreeMap<MarkerKind, Vec<Marker>> = BTreeMap::new();

        for (r, line) in lines.iter().enumerate() {
            let y = r as f32 * tile + tile / 2.0;
            for (c, &ch) in line.iter().enumerate() {
                let x = c as f32 * tile + tile / 2.0;
                match Cell::from_char(ch) {
                    Cell::Empty => {}
                    Cell::Solid => {
                        solids.insert((c, r));
                    }
                    Cell::Start => start = Some(Vec2::new(x, y - 20.0)),
                    Cell::Anchor => spawn_anchors.push(Vec2::new(x, y - tile * 2.0)),
                    Cell::Marker(kind) => {
                        let position = Vec2::new(x, y + marker_offset(kind));
                        let list = markers.entry(kind).or_default();
                        let ordinal = list.len();
                        list.push(Marker {
                            position,
                            cell: (c, r),
                            ordinal,
                        });
                    }
                }
            }
        }

        let start = start.unwrap_or(Vec2::new(tile * 2.0 + 20.0, tile * 2.0));
        if spawn_anchors.is_empty() {
            spawn_anchors.push(Vec2::new(cols as f32 * tile * 0.6, tile * 3.0));
        }

        log::info!(
            "Compiled level {}x{}: {} solids, {} anchors, {} markers",
            cols,
            rows,
            solids.len(),
            spawn_anchors.len(),
            markers.values().map(Vec::len).sum::<usize>()
        );

        Self {
            cols,
            rows,
            tile,
            solids,
            start,
            spawn_anchors,
            markers,
        }
    }

    pub fn markers(&self, kind: MarkerKind) -> &[Marker] {
        self.markers.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn is_solid(&self, col: usize, row: usize) -> bool {
        self.solids.contains(&(col, row))
    }

    pub fn width(&self) -> f32 {
        self.cols as f32 * self.tile
    }

    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    /// Top of the two ground rows
    pub fn floor_y(&self) -> f32 {
        self.height() - self.tile * 2.0
    }

    /// Grid cell containing a world position, if inside the grid
    pub fn cell_at(&self, pos: Vec2) -> Option<(usize, usize)> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let c = (pos.x / self.tile) as usize;
        let r = (pos.y / self.tile) as usize;
        (c < self.cols && r < self.rows).then_some((c, r))
    }

    /// Decoration for a solid tile (grid borders count as open)
    pub fn tile_edge(&self, col: usize, row: usize) -> Option<TileEdge> {
        if !self.is_solid(col, row) {
            return None;
        }
        let left = col == 0 || !self.is_solid(col - 1, row);
        let right = col + 1 >= self.cols || !self.is_solid(col + 1, row);
        let top = row == 0 || !self.is_solid(col, row - 1);
        let bottom = row + 1 >= self.rows || !self.is_solid(col, row + 1);

        Some(match (top, bottom, left, right) {
            (true, _, true, _) => TileEdge::TopLeft,
            (true, _, _, true) => TileEdge::TopRight,
            (_, true, true, _) => TileEdge::BottomLeft,
            (_, true, _, true) => TileEdge::BottomRight,
            (true, _, _, _) => TileEdge::Top,
            (_, true, _, _) => TileEdge::Bottom,
            _ => TileEdge::Interior,
        })
    }
}

fn marker_offset(kind: MarkerKind) -> f32 {
    match kind {
        MarkerKind::Key
        | MarkerKind::Treasure
        | MarkerKind::HiddenPassage
        | MarkerKind::HiddenBlock => -20.0,
        MarkerKind::KillZone => 30.0,
        MarkerKind::Door | MarkerKind::BossGate => 0.0,
    }
}

/// Fit arbitrary text to exactly `cols × rows` characters
pub fn normalize(text: &str, cols: usize, rows: usize) -> Vec<Vec<char>> {
    let clean = text.replace('\r', "");
    let mut raw: Vec<&str> = clean.split('\n').collect();
    if raw.last().is_some_and(|l| l.is_empty()) {
        raw.pop();
    }

    // Bottom-align: keep the last rows, or prepend empty ones
    let skip = raw.len().saturating_sub(rows);
    let missing = rows.saturating_sub(raw.len());

    let mut lines = Vec::with_capacity(rows);
    lines.extend(std::iter::repeat_n(vec![EMPTY; cols], missing));
    for line in &raw[skip..] {
        let mut row: Vec<char> = line
            .chars()
            .map(|ch| if ch == '\t' { ' ' } else { ch })
            .take(cols)
            .collect();
        row.resize(cols, EMPTY);
        lines.push(row);
    }
    lines
}

/// Neutral fallback layout with difficulty-scaled anchors
pub fn procedural_layout(cols: usize, rows: usize, difficulty: Difficulty) -> Vec<Vec<char>> {
    let mut grid = vec![vec![EMPTY; cols]; rows];
    if cols == 0 || rows == 0 {
        return grid;
    }
    let last_col = cols - 1;

    let mut fill = |row: Option<usize>, c1: usize, c2: usize| {
        let Some(r) = row else { return };
        for c in c1..=c2.min(last_col) {
            grid[r][c] = SOLID;
        }
    };
    let up = |n: usize| rows.checked_sub(n);

    fill(up(1), 0, last_col);
    fill(up(2), 0, last_col);
    fill(up(6), 10, 25);
    fill(up(9), 35, 55);
    fill(up(12), 60, 75);
    fill(up(10), 2, 6);

    let mut put = |c: usize, row: Option<usize>, ch: char| {
        if let Some(r) = row {
            if c < cols {
                grid[r][c] = ch;
            }
        }
    };
    put(3, up(4), 'S');

    let anchors: &[(f32, usize)] = match difficulty {
        Difficulty::Easy => &[(0.45, 7)],
        Difficulty::Normal => &[(0.40, 7), (0.70, 10)],
        Difficulty::Hard => &[(0.25, 7), (0.45, 10), (0.60, 9), (0.75, 12), (0.85, 7)],
    };
    for &(fx, from_bottom) in anchors {
        put((cols as f32 * fx).floor() as usize, up(from_bottom), 'E');
    }
    grid
}

/// Fallback boss arena: floor, side walls, start at the left, one gate at the right
pub fn procedural_boss_arena(cols: usize, rows: usize) -> Vec<Vec<char>> {
    let mut grid = vec![vec![EMPTY; cols]; rows];
    if cols < 4 || rows < 4 {
        return grid;
    }
    for row in grid.iter_mut() {
        row[0] = SOLID;
        row[cols - 1] = SOLID;
    }
    for row in grid.iter_mut().skip(rows - 2) {
        row.fill(SOLID);
    }
    grid[rows - 4][2] = 'S';
    grid[rows - 3][cols - 3] = 'B';
    grid
}
