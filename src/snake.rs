use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ROWS: usize = 20;
pub const COLS: usize = 25;
/// The snake wins one segment short of this; the body then fills
/// `MAX_LENGTH` cells counting the starting one.
pub const MAX_LENGTH: usize = 52;
pub const BASE_PERIOD: Duration = Duration::from_millis(200);

const START: (usize, usize) = (5, 5);

pub const WALL_CHAR: char = '#';
pub const BODY_CHAR: char = 'O';
pub const APPLE_CHAR: char = '@';
pub const FLOOR_CHAR: char = ' ';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
        }
    }

    fn is_reverse_of(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Floor,
    Body,
    Apple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    Ate,
    Lost,
    Won,
}

pub struct SnakeGame {
    grid: Vec<Cell>,
    /// Head at the front, tail at the back.
    body: VecDeque<(usize, usize)>,
    head: (usize, usize),
    direction: Option<Direction>,
    apple: (usize, usize),
    length: usize,
    hard: bool,
    rng: StdRng,
}

impl SnakeGame {
    pub fn new(hard: bool, seed: u64) -> Self {
        let mut grid = vec![Cell::Floor; ROWS * COLS];
        grid[START.0 * COLS + START.1] = Cell::Body;
        let mut body = VecDeque::with_capacity(MAX_LENGTH);
        body.push_front(START);
        let rng = if seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(seed)
        };
        let mut game = SnakeGame {
            grid,
            body,
            head: START,
            direction: None,
            apple: START,
            length: 0,
            hard,
            rng,
        };
        game.spawn_apple();
        game
    }

    /// Ignored when it would reverse the current course. The first call sets
    /// the starting direction.
    pub fn steer(&mut self, dir: Direction) {
        match self.direction {
            Some(current) if dir.is_reverse_of(current) => {}
            _ => self.direction = Some(dir),
        }
    }

    /// Advances one tick. A no-op until the first direction is set.
    pub fn step(&mut self) -> StepOutcome {
        let Some(dir) = self.direction else {
            return StepOutcome::Advanced;
        };
        let (dr, dc) = dir.delta();
        let row = self.head.0 as isize + dr;
        let col = self.head.1 as isize + dc;
        if row < 0 || col < 0 || row >= ROWS as isize || col >= COLS as isize {
            return StepOutcome::Lost;
        }
        let target = (row as usize, col as usize);

        match self.grid[target.0 * COLS + target.1] {
            Cell::Body => StepOutcome::Lost,
            Cell::Apple => {
                // The apple becomes the new head; the tail stays put.
                self.length += 1;
                self.push_head(target);
                if self.length == MAX_LENGTH - 1 {
                    return StepOutcome::Won;
                }
                self.spawn_apple();
                StepOutcome::Ate
            }
            Cell::Floor => {
                if let Some(tail) = self.body.pop_back() {
                    self.grid[tail.0 * COLS + tail.1] = Cell::Floor;
                }
                self.push_head(target);
                StepOutcome::Advanced
            }
        }
    }

    fn push_head(&mut self, pos: (usize, usize)) {
        self.grid[pos.0 * COLS + pos.1] = Cell::Body;
        self.body.push_front(pos);
        self.head = pos;
    }

    fn spawn_apple(&mut self) {
        // Floor cells outnumber body cells until the win condition fires,
        // so rejection sampling terminates.
        loop {
            let row = self.rng.gen_range(0..ROWS);
            let col = self.rng.gen_range(0..COLS);
            if self.grid[row * COLS + col] == Cell::Floor {
                self.grid[row * COLS + col] = Cell::Apple;
                self.apple = (row, col);
                return;
            }
        }
    }

    pub fn tick_period(&self) -> Duration {
        period_for(self.hard, self.length)
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Some(Direction::Up) => '^',
            Some(Direction::Left) => '<',
            Some(Direction::Down) => 'v',
            Some(Direction::Right) => '>',
            None => BODY_CHAR,
        }
    }

    pub fn render(&self) -> String {
        let mut s = String::with_capacity((ROWS + 2) * (COLS + 3));
        let border: String = std::iter::repeat(WALL_CHAR).take(COLS + 2).collect();
        s.push_str(&border);
        s.push('\n');
        for row in 0..ROWS {
            s.push(WALL_CHAR);
            for col in 0..COLS {
                s.push(match self.grid[row * COLS + col] {
                    Cell::Floor => FLOOR_CHAR,
                    Cell::Apple => APPLE_CHAR,
                    Cell::Body if (row, col) == self.head => self.head_char(),
                    Cell::Body => BODY_CHAR,
                });
            }
            s.push(WALL_CHAR);
            s.push('\n');
        }
        s.push_str(&border);
        s.push('\n');
        s
    }
}

impl fmt::Display for SnakeGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// Public getters for encapsulation
impl SnakeGame {
    pub fn head(&self) -> (usize, usize) {
        self.head
    }
    pub fn apple(&self) -> (usize, usize) {
        self.apple
    }
    /// Apples eaten so far; the body occupies `length() + 1` cells.
    pub fn length(&self) -> usize {
        self.length
    }
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row < ROWS && col < COLS {
            Some(self.grid[row * COLS + col])
        } else {
            None
        }
    }
    pub fn body(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.body.iter().copied()
    }
}

/// Hard mode shrinks the tick period linearly as the snake approaches full
/// length, bottoming out at half the base period. Casual mode keeps it fixed.
pub fn period_for(hard: bool, length: usize) -> Duration {
    if !hard {
        return BASE_PERIOD;
    }
    let base = BASE_PERIOD.as_millis() as u64;
    let cut = base * length as u64 / (2 * MAX_LENGTH as u64);
    Duration::from_millis((base - cut).max(base / 2))
}
