use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 24;
pub const DEFAULT_MINES: usize = 99;

/// Rows and columns are addressed by letters 'A'.., which caps the extent.
pub const MAX_EXTENT: usize = 26;

const SPAWN_RADIUS: usize = 1;

const HIDDEN_CHAR: char = '.';
const FLAGGED_CHAR: char = '*';
const WRONG_FLAG_CHAR: char = '#';
const CORNER_CHAR: char = '+';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board dimensions must be positive")]
    EmptyBoard,
    #[error("board dimensions cannot exceed {MAX_EXTENT} (coordinates are letters)")]
    TooLarge,
    #[error("at least one mine is required")]
    NoMines,
    #[error("{mines} mines cannot fit a {rows}x{cols} board with a protected opening block")]
    TooManyMines { rows: usize, cols: usize, mines: usize },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("you cannot restart or quit on your first move")]
    EarlyExit,
    #[error("the coordinates are not in the range of the board")]
    OutOfRange,
    #[error("you cannot sweep a number tile or a flagged tile")]
    SweepTarget,
    #[error("you cannot ring-sweep a non-number tile")]
    RingSweepTarget,
    #[error("you cannot flag an uncovered number tile")]
    FlagTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Hidden,
    Flagged,
    Revealed(u8),
    /// A flag that turned out to sit on a safe tile, marked when the answer
    /// is shown at the end of a game.
    WrongFlag,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Sweep,
    RingSweep,
    Flag,
    Restart,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub action: Action,
    pub row: usize,
    pub col: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Lost,
    /// The flag budget hit zero; call `show_answer` to find out whether every
    /// flag was right.
    TentativeWin,
    Restarted,
    Quit,
}

#[derive(Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    mines: usize,
    tiles: Vec<Tile>,
    mine_map: Vec<bool>,
    hints: Vec<u8>,
    flags_remaining: usize,
    started: bool,
    rng: StdRng,
}

impl Board {
    pub fn new(rows: usize, cols: usize, mines: usize, seed: u64) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        if rows > MAX_EXTENT || cols > MAX_EXTENT {
            return Err(ConfigError::TooLarge);
        }
        if mines == 0 {
            return Err(ConfigError::NoMines);
        }
        // The opening move protects up to a full 3x3 block from mines, so that
        // many cells must be left over. Checked here once; generation itself
        // cannot fail.
        if mines + 9 > rows * cols {
            return Err(ConfigError::TooManyMines { rows, cols, mines });
        }

        let rng = if seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(seed)
        };

        Ok(Self {
            rows,
            cols,
            mines,
            tiles: vec![Tile::Hidden; rows * cols],
            mine_map: vec![false; rows * cols],
            hints: vec![0; rows * cols],
            flags_remaining: mines,
            started: false,
            rng,
        })
    }

    /// Validates and applies one move. Rejected moves leave the board
    /// untouched so the caller can re-prompt.
    pub fn apply(&mut self, mv: Move) -> Result<Outcome, MoveError> {
        self.validate(mv)?;

        if !self.started {
            // The opening move acts as a sweep whatever its action char.
            // Mines are scattered only now, keeping the opening block safe.
            self.scatter_mines(mv.row, mv.col);
            self.prepare_hints();
            self.started = true;
            self.reveal(mv.row, mv.col);
            return Ok(Outcome::Continue);
        }

        match mv.action {
            Action::Restart => Ok(Outcome::Restarted),
            Action::Quit => Ok(Outcome::Quit),
            Action::Sweep => {
                if self.mine_map[self.idx(mv.row, mv.col)] {
                    return Ok(Outcome::Lost);
                }
                self.reveal(mv.row, mv.col);
                Ok(Outcome::Continue)
            }
            Action::RingSweep => {
                let flagged = ring(self.rows, self.cols, mv.row, mv.col)
                    .filter(|&(r, c)| self.tiles[r * self.cols + c] == Tile::Flagged)
                    .count();
                let mined = ring(self.rows, self.cols, mv.row, mv.col)
                    .filter(|&(r, c)| self.mine_map[r * self.cols + c])
                    .count();
                if mined > flagged {
                    // An unflagged mine is adjacent; the ring-sweep sets it off.
                    return Ok(Outcome::Lost);
                }
                for (r, c) in ring(self.rows, self.cols, mv.row, mv.col) {
                    if self.tiles[r * self.cols + c] == Tile::Hidden {
                        self.reveal(r, c);
                    }
                }
                Ok(Outcome::Continue)
            }
            Action::Flag => {
                let i = self.idx(mv.row, mv.col);
                match self.tiles[i] {
                    Tile::Hidden => {
                        self.tiles[i] = Tile::Flagged;
                        self.flags_remaining -= 1;
                        if self.flags_remaining == 0 {
                            return Ok(Outcome::TentativeWin);
                        }
                    }
                    Tile::Flagged => {
                        self.tiles[i] = Tile::Hidden;
                        self.flags_remaining += 1;
                    }
                    // validate() rejects every other target
                    _ => {}
                }
                Ok(Outcome::Continue)
            }
        }
    }

    fn validate(&self, mv: Move) -> Result<(), MoveError> {
        if !self.started && matches!(mv.action, Action::Restart | Action::Quit) {
            return Err(MoveError::EarlyExit);
        }
        // Bounds come first: no tile is read until the coordinate is known good.
        if mv.row >= self.rows || mv.col >= self.cols {
            return Err(MoveError::OutOfRange);
        }
        let tile = self.tiles[self.idx(mv.row, mv.col)];
        match mv.action {
            Action::Sweep if tile != Tile::Hidden => Err(MoveError::SweepTarget),
            Action::RingSweep if !matches!(tile, Tile::Revealed(_)) => {
                Err(MoveError::RingSweepTarget)
            }
            Action::Flag if !matches!(tile, Tile::Hidden | Tile::Flagged) => {
                Err(MoveError::FlagTarget)
            }
            _ => Ok(()),
        }
    }

    fn scatter_mines(&mut self, safe_row: usize, safe_col: usize) {
        let mut placed = 0;
        while placed < self.mines {
            let row = self.rng.gen_range(0..self.rows);
            let col = self.rng.gen_range(0..self.cols);
            let i = row * self.cols + col;
            if in_spawn_block(row, col, safe_row, safe_col) || self.mine_map[i] {
                continue;
            }
            self.mine_map[i] = true;
            placed += 1;
        }
    }

    fn prepare_hints(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                // The center cell counts too: a mine's own hint includes itself.
                let count = ring(self.rows, self.cols, row, col)
                    .filter(|&(r, c)| self.mine_map[r * self.cols + c])
                    .count();
                self.hints[row * self.cols + col] = count as u8;
            }
        }
    }

    fn reveal(&mut self, row: usize, col: usize) {
        let i = self.idx(row, col);
        self.tiles[i] = Tile::Revealed(self.hints[i]);
    }

    /// Reconciles the visible board with the mine map once a game is over.
    /// Unflagged mines get flagged and counted; stray flags are marked wrong.
    /// Returns how many mines the player had not flagged; zero means a true win.
    pub fn show_answer(&mut self) -> usize {
        let mut missed = 0;
        for i in 0..self.tiles.len() {
            if self.mine_map[i] && self.tiles[i] != Tile::Flagged {
                self.tiles[i] = Tile::Flagged;
                missed += 1;
            }
            if self.tiles[i] == Tile::Flagged && !self.mine_map[i] {
                self.tiles[i] = Tile::WrongFlag;
            }
        }
        missed
    }

    pub fn render(&self) -> String {
        let mut s = String::with_capacity((self.rows + 2) * (self.cols + 3));
        self.render_border_row(&mut s);
        for row in 0..self.rows {
            s.push(letter(row));
            for col in 0..self.cols {
                s.push(self.tile_char(row, col));
            }
            s.push(letter(row));
            s.push('\n');
        }
        self.render_border_row(&mut s);
        s
    }

    fn render_border_row(&self, s: &mut String) {
        s.push(CORNER_CHAR);
        for col in 0..self.cols {
            s.push(letter(col));
        }
        s.push(CORNER_CHAR);
        s.push('\n');
    }

    fn tile_char(&self, row: usize, col: usize) -> char {
        match self.tiles[self.idx(row, col)] {
            Tile::Hidden => HIDDEN_CHAR,
            Tile::Flagged => FLAGGED_CHAR,
            Tile::WrongFlag => WRONG_FLAG_CHAR,
            Tile::Revealed(n) => char::from_digit(n as u32, 10).unwrap_or('?'),
        }
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// Public getters for encapsulation
impl Board {
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn mines(&self) -> usize {
        self.mines
    }
    pub fn flags_remaining(&self) -> usize {
        self.flags_remaining
    }
    pub fn started(&self) -> bool {
        self.started
    }
    pub fn tile(&self, row: usize, col: usize) -> Option<Tile> {
        if row < self.rows && col < self.cols {
            Some(self.tiles[self.idx(row, col)])
        } else {
            None
        }
    }
    pub fn is_mine(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.mine_map[row * self.cols + col]
    }
    pub fn hint(&self, row: usize, col: usize) -> u8 {
        if row < self.rows && col < self.cols {
            self.hints[row * self.cols + col]
        } else {
            0
        }
    }
}

/// Letter label for a row or column index; `MAX_EXTENT` keeps this in 'A'..='Z'.
pub fn letter(i: usize) -> char {
    (b'A' + i as u8) as char
}

fn in_spawn_block(row: usize, col: usize, safe_row: usize, safe_col: usize) -> bool {
    row.abs_diff(safe_row) <= SPAWN_RADIUS && col.abs_diff(safe_col) <= SPAWN_RADIUS
}

/// In-bounds cells of the 3x3 block centered at (row, col), center included.
/// Clipping at the edges stands in for a border that never holds a mine.
fn ring(rows: usize, cols: usize, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    let row = row as isize;
    let col = col as isize;
    let rows = rows as isize;
    let cols = cols as isize;
    let mut out = Vec::with_capacity(9);
    for dr in -1..=1 {
        for dc in -1..=1 {
            let nr = row + dr;
            let nc = col + dc;
            if nr >= 0 && nc >= 0 && nr < rows && nc < cols {
                out.push((nr as usize, nc as usize));
            }
        }
    }
    out.into_iter()
}
