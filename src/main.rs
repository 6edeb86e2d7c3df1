use std::fs::File;
use std::io::{self, Write};
use std::time::Instant;

use clap::Parser;
use minesnake::mines::{self, Action, Board, Move, Outcome};
use minesnake::tui;

const SWEEP_CHAR: char = 'S';
const RING_SWEEP_CHAR: char = 'D';
const FLAG_CHAR: char = 'F';
const RESTART_CHAR: char = 'R';
const QUIT_CHAR: char = 'Q';
const HELP_CHAR: char = 'H';
const SUPPRESS_CHAR: char = 'X';

#[derive(Parser, Debug)]
#[command(name = "minesnake", about = "Minesweeper and Snake for the terminal", version)]
struct Args {
    /// Play the snake game (TUI) instead of minesweeper
    #[arg(long)]
    snake: bool,
    /// Snake: speed up as the snake grows
    #[arg(long)]
    hard: bool,
    /// Minesweeper board rows (letter coordinates, max 26)
    #[arg(long, default_value_t = mines::DEFAULT_ROWS)]
    rows: usize,
    /// Minesweeper board columns (letter coordinates, max 26)
    #[arg(long, default_value_t = mines::DEFAULT_COLS)]
    cols: usize,
    /// Number of mines
    #[arg(long, default_value_t = mines::DEFAULT_MINES)]
    mines: usize,
    /// Seed (0 = random)
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    let args = Args::parse();
    if args.snake {
        if let Err(e) = tui::run_snake(args.hard, args.seed) {
            eprintln!("TUI error: {}", e);
        }
        return;
    }
    if let Err(e) = run_mines(&args) {
        eprintln!("{}", e);
    }
}

fn print_help() {
    println!("Controls:");
    println!("A move is one token: an action letter, a row letter, and a column letter.");
    println!(
        "  {}rc  - sweep the tile at row r, column c (example: {}BB)",
        SWEEP_CHAR, SWEEP_CHAR
    );
    println!(
        "  {}rc  - ring-sweep: uncover every hidden tile around a numbered tile",
        RING_SWEEP_CHAR
    );
    println!("  {}rc  - flag a hidden tile, or unflag it again", FLAG_CHAR);
    println!(
        "  {}rc  - restart with a fresh board (after the first move)",
        RESTART_CHAR
    );
    println!("  {}rc  - quit (after the first move)", QUIT_CHAR);
    println!("  {}    - show this help", HELP_CHAR);
    println!(
        "Append {} to a move to skip printing the board once.\n",
        SUPPRESS_CHAR
    );
}

fn run_mines(args: &Args) -> io::Result<()> {
    let mut high_score: Option<u64> = None;

    loop {
        let mut board = match Board::new(args.rows, args.cols, args.mines, args.seed) {
            Ok(b) => b,
            Err(e) => {
                // A board that cannot be generated is the one fatal condition.
                eprintln!("{}", e);
                return Ok(());
            }
        };

        println!("Welcome to minesweeper!");
        match high_score {
            Some(best) => println!("Session best so far: {} seconds.", best),
            None => println!("No finished games this session yet."),
        }
        println!("\n{}", board);
        print_help();

        // The opening coordinate decides where mines may not land.
        println!("Enter a starting coordinate for this game!");
        loop {
            let Some((mv, _)) = read_move()? else {
                return Ok(());
            };
            match board.apply(mv) {
                Ok(_) => break,
                Err(e) => println!("Error: {}. Please try again.", e),
            }
        }
        let start = Instant::now();
        println!("Good luck!\n");

        let mut suppress_once = false;
        let end = loop {
            if !suppress_once {
                println!("{}", board);
            }
            suppress_once = false;
            println!("Bombs apparently remaining: {}", board.flags_remaining());

            let outcome = loop {
                let Some((mv, suppress)) = read_move()? else {
                    return Ok(());
                };
                match board.apply(mv) {
                    Ok(o) => {
                        suppress_once = suppress;
                        break o;
                    }
                    Err(e) => println!("Error: {}. Please try again.", e),
                }
            };
            match outcome {
                Outcome::Continue => {}
                other => break other,
            }
        };

        match end {
            Outcome::Quit => return Ok(()),
            Outcome::Restarted => {
                println!("\nStarting over with a fresh board.\n");
                continue;
            }
            Outcome::Lost | Outcome::TentativeWin => {
                let missed = board.show_answer();
                let won = end == Outcome::TentativeWin && missed == 0;
                let score = start.elapsed().as_secs();

                println!("\n{}", board);
                if won {
                    println!("Hey, nice! You cleared the board in {} seconds.", score);
                    if high_score.map_or(true, |best| score < best) {
                        high_score = Some(score);
                        println!("That's a new session best!");
                    }
                } else {
                    println!("Boom! That was a mine. Better luck next time.");
                    println!("This run lasted {} seconds.", score);
                }

                if prompt_yes_no("Save the final board to a text file?")? {
                    save_board(&board, score, missed)?;
                }
                if !prompt_yes_no("Play another game?")? {
                    return Ok(());
                }
                println!();
            }
            Outcome::Continue => {}
        }
    }
}

enum ParsedInput {
    Help,
    Move(Move, bool),
}

/// Prompts until a well-formed move token arrives, or stdin closes (None).
/// `H` prints the help text and re-prompts; range checking is the board's job.
fn read_move() -> io::Result<Option<(Move, bool)>> {
    loop {
        print!("Your move! (enter {} for help): ", HELP_CHAR);
        io::stdout().flush()?;
        let Some(line) = read_line_trimmed()? else {
            return Ok(None);
        };
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        match parse_move(token) {
            Ok(ParsedInput::Help) => print_help(),
            Ok(ParsedInput::Move(mv, suppress)) => return Ok(Some((mv, suppress))),
            Err(msg) => println!("Error: {}. Please try again.", msg),
        }
    }
}

fn parse_move(token: &str) -> Result<ParsedInput, String> {
    let upper = token.to_ascii_uppercase();
    let mut chars = upper.chars();
    let action = match chars.next() {
        Some(SWEEP_CHAR) => Action::Sweep,
        Some(RING_SWEEP_CHAR) => Action::RingSweep,
        Some(FLAG_CHAR) => Action::Flag,
        Some(RESTART_CHAR) => Action::Restart,
        Some(QUIT_CHAR) => Action::Quit,
        Some(HELP_CHAR) => return Ok(ParsedInput::Help),
        _ => {
            return Err(format!(
                "the action was neither {}, {}, {}, {}, nor {}",
                SWEEP_CHAR, RING_SWEEP_CHAR, FLAG_CHAR, RESTART_CHAR, QUIT_CHAR
            ))
        }
    };
    let row = coord(chars.next())?;
    let col = coord(chars.next())?;
    let suppress = chars.next() == Some(SUPPRESS_CHAR);
    Ok(ParsedInput::Move(Move { action, row, col }, suppress))
}

fn coord(ch: Option<char>) -> Result<usize, String> {
    match ch {
        Some(c) if c.is_ascii_uppercase() => Ok((c as u8 - b'A') as usize),
        _ => Err(format!(
            "moves look like {}BB: an action letter, a row letter, and a column letter",
            SWEEP_CHAR
        )),
    }
}

fn prompt_yes_no(msg: &str) -> io::Result<bool> {
    print!("{} (1 = yes, 0 = no): ", msg);
    io::stdout().flush()?;
    let Some(line) = read_line_trimmed()? else {
        return Ok(false);
    };
    Ok(matches!(line.as_str(), "1" | "y" | "Y" | "yes"))
}

/// Saving is best effort: a failed save is reported and the session goes on.
fn save_board(board: &Board, score: u64, missed: usize) -> io::Result<()> {
    print!("File name for the saved board: ");
    io::stdout().flush()?;
    let Some(name) = read_line_trimmed()? else {
        return Ok(());
    };
    if name.is_empty() {
        println!("No name given; skipping the save.");
        return Ok(());
    }
    let result = File::create(&name).and_then(|mut f| {
        write!(
            f,
            "{}\nScore: {} seconds\nBombs remaining: {}\n",
            board.render(),
            score,
            missed
        )
    });
    match result {
        Ok(()) => println!("Saved the final board to '{}'.", name),
        Err(e) => println!("Could not save '{}': {}", name, e),
    }
    Ok(())
}

/// None means stdin was closed.
fn read_line_trimmed() -> io::Result<Option<String>> {
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
