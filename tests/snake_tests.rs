use minesnake::snake::{
    period_for, Cell, Direction, SnakeGame, StepOutcome, BASE_PERIOD, COLS, MAX_LENGTH, ROWS,
};

const SEED: u64 = 42;

fn is_reverse(a: Direction, b: Direction) -> bool {
    matches!(
        (a, b),
        (Direction::Up, Direction::Down)
            | (Direction::Down, Direction::Up)
            | (Direction::Left, Direction::Right)
            | (Direction::Right, Direction::Left)
    )
}

fn sidestep(current: Direction, head: (usize, usize)) -> Direction {
    // Perpendicular to the current course, biased toward the grid center so
    // the detour never runs into a wall.
    match current {
        Direction::Up | Direction::Down => {
            if head.1 < COLS / 2 {
                Direction::Right
            } else {
                Direction::Left
            }
        }
        Direction::Left | Direction::Right => {
            if head.0 < ROWS / 2 {
                Direction::Down
            } else {
                Direction::Up
            }
        }
    }
}

/// Walks the head to `target` one axis at a time, detouring when the direct
/// course would reverse the current direction.
fn walk_to(game: &mut SnakeGame, target: (usize, usize)) {
    for _ in 0..10_000 {
        let head = game.head();
        if head == target {
            return;
        }
        let wanted = if head.0 < target.0 {
            Direction::Down
        } else if head.0 > target.0 {
            Direction::Up
        } else if head.1 < target.1 {
            Direction::Right
        } else {
            Direction::Left
        };
        let dir = match game.direction() {
            Some(current) if is_reverse(wanted, current) => sidestep(current, head),
            _ => wanted,
        };
        game.steer(dir);
        let out = game.step();
        assert!(
            matches!(out, StepOutcome::Advanced | StepOutcome::Ate),
            "unexpected {:?} while walking to {:?}",
            out,
            target
        );
    }
    panic!("never reached {:?}", target);
}

fn rotate_left(d: Direction) -> Direction {
    match d {
        Direction::Right => Direction::Up,
        Direction::Up => Direction::Left,
        Direction::Left => Direction::Down,
        Direction::Down => Direction::Right,
    }
}

#[test]
fn new_game_has_a_single_segment_and_an_apple_on_floor() {
    let game = SnakeGame::new(false, SEED);
    assert_eq!(game.head(), (5, 5));
    assert_eq!(game.length(), 0);
    assert_eq!(game.body().count(), 1);
    assert_eq!(game.direction(), None);
    assert_eq!(game.cell(5, 5), Some(Cell::Body));
    let apple = game.apple();
    assert_ne!(apple, (5, 5));
    assert_eq!(game.cell(apple.0, apple.1), Some(Cell::Apple));
}

#[test]
fn same_seed_spawns_the_same_apple() {
    let a = SnakeGame::new(false, 7);
    let b = SnakeGame::new(false, 7);
    assert_eq!(a.apple(), b.apple());
}

#[test]
fn ticking_before_the_first_direction_is_a_no_op() {
    let mut game = SnakeGame::new(false, SEED);
    assert_eq!(game.step(), StepOutcome::Advanced);
    assert_eq!(game.head(), (5, 5));
    assert_eq!(game.cell(5, 5), Some(Cell::Body));
}

#[test]
fn first_tick_moves_the_head_right() {
    let mut game = SnakeGame::new(false, SEED);
    game.steer(Direction::Right);
    let out = game.step();
    assert_eq!(game.head(), (5, 6));
    if out == StepOutcome::Ate {
        assert_eq!(game.length(), 1);
        assert_eq!(game.body().count(), 2);
        assert_ne!(game.apple(), (5, 6));
    } else {
        assert_eq!(out, StepOutcome::Advanced);
        assert_eq!(game.length(), 0);
        assert_eq!(game.cell(5, 5), Some(Cell::Floor));
    }
}

#[test]
fn reversing_the_course_is_ignored() {
    let mut game = SnakeGame::new(false, SEED);
    game.steer(Direction::Right);
    game.step();
    game.steer(Direction::Left);
    assert_eq!(game.direction(), Some(Direction::Right));
    game.step();
    assert_eq!(game.head(), (5, 7));
}

#[test]
fn advancing_keeps_length_and_clears_the_vacated_tail() {
    let mut game = SnakeGame::new(false, SEED);
    // Step away from the apple so the move is a plain advance.
    let dir = if game.apple() == (6, 5) { Direction::Up } else { Direction::Down };
    game.steer(dir);
    assert_eq!(game.step(), StepOutcome::Advanced);
    assert_eq!(game.length(), 0);
    assert_eq!(game.body().count(), 1);
    assert_eq!(game.cell(5, 5), Some(Cell::Floor));
}

#[test]
fn eating_grows_without_moving_the_tail() {
    let mut game = SnakeGame::new(false, SEED);
    let apple = game.apple();
    walk_to(&mut game, apple);
    assert_eq!(game.length(), 1);
    assert_eq!(game.body().count(), 2);
    assert_eq!(game.head(), apple);
    let respawned = game.apple();
    assert_ne!(respawned, apple);
    assert_eq!(game.cell(respawned.0, respawned.1), Some(Cell::Apple));
    // Both segments are on the grid as body cells.
    for (r, c) in game.body().collect::<Vec<_>>() {
        assert_eq!(game.cell(r, c), Some(Cell::Body));
    }
}

#[test]
fn running_into_the_wall_loses() {
    let mut game = SnakeGame::new(false, SEED);
    game.steer(Direction::Up);
    let mut out = game.step();
    for _ in 0..ROWS {
        if out == StepOutcome::Lost {
            break;
        }
        out = game.step();
    }
    assert_eq!(out, StepOutcome::Lost);
    assert_eq!(game.head().0, 0);
}

#[test]
fn turning_into_the_body_loses() {
    let mut game = SnakeGame::new(false, SEED);
    for _ in 0..3 {
        let apple = game.apple();
        walk_to(&mut game, apple);
    }
    assert!(game.length() >= 3);

    // Away from the walls, keep turning the same way: the head curls back
    // onto the body within four steps.
    walk_to(&mut game, (10, 12));
    let mut lost = false;
    for _ in 0..6 {
        let dir = rotate_left(game.direction().expect("direction set"));
        game.steer(dir);
        if game.step() == StepOutcome::Lost {
            lost = true;
            break;
        }
    }
    assert!(lost);
}

#[test]
fn casual_period_is_constant() {
    assert_eq!(period_for(false, 0), BASE_PERIOD);
    assert_eq!(period_for(false, MAX_LENGTH - 1), BASE_PERIOD);
}

#[test]
fn hard_period_shrinks_toward_half_the_base() {
    assert_eq!(period_for(true, 0), BASE_PERIOD);
    let mut last = period_for(true, 0);
    for length in 1..MAX_LENGTH {
        let p = period_for(true, length);
        assert!(p <= last, "period grew at length {}", length);
        assert!(p >= BASE_PERIOD / 2, "period fell below the floor at {}", length);
        last = p;
    }
    assert!(period_for(true, MAX_LENGTH - 1) < BASE_PERIOD);
}

#[test]
fn render_draws_walls_around_the_grid() {
    let game = SnakeGame::new(false, SEED);
    let text = game.render();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), ROWS + 2);
    assert_eq!(lines[0].len(), COLS + 2);
    assert!(lines[0].chars().all(|c| c == '#'));
    assert!(lines[ROWS + 1].chars().all(|c| c == '#'));
    for line in &lines[1..=ROWS] {
        assert!(line.starts_with('#') && line.ends_with('#'));
    }
    // A head with no direction yet renders as a plain body segment.
    let head_row: Vec<char> = lines[6].chars().collect();
    assert_eq!(head_row[6], 'O');
}
