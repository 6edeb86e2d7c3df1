use std::io;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;

use crate::snake::{self, Cell, Direction, SnakeGame, StepOutcome};

pub fn run_snake(hard: bool, seed: u64) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let _guard = TermGuard;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut game = SnakeGame::new(hard, seed);
    let mut over: Option<StepOutcome> = None;
    let mut high_score: usize = 0;
    // One buffered direction change per tick; the latest keypress wins.
    let mut pending: Option<Direction> = None;
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, &game, over, high_score, hard))?;

        let timeout = game.tick_period().saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('n') if over.is_some() => {
                        high_score = high_score.max(game.length());
                        game = SnakeGame::new(hard, seed);
                        over = None;
                        pending = None;
                        last_tick = Instant::now();
                    }
                    KeyCode::Char('w') | KeyCode::Up => pending = Some(Direction::Up),
                    KeyCode::Char('a') | KeyCode::Left => pending = Some(Direction::Left),
                    KeyCode::Char('s') | KeyCode::Down => pending = Some(Direction::Down),
                    KeyCode::Char('d') | KeyCode::Right => pending = Some(Direction::Right),
                    _ => {}
                },
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= game.tick_period() {
            last_tick = Instant::now();
            if over.is_none() {
                if let Some(dir) = pending.take() {
                    game.steer(dir);
                }
                if game.direction().is_some() {
                    match game.step() {
                        StepOutcome::Lost => over = Some(StepOutcome::Lost),
                        StepOutcome::Won => over = Some(StepOutcome::Won),
                        StepOutcome::Advanced | StepOutcome::Ate => {}
                    }
                }
            }
        }
    }

    terminal.show_cursor()?;
    Ok(())
}

fn ui(f: &mut ratatui::Frame, game: &SnakeGame, over: Option<StepOutcome>, high_score: usize, hard: bool) {
    let root = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(f.size());

    let status = match over {
        Some(StepOutcome::Won) => "You beat the game! n restarts, q quits",
        Some(_) => "The snake got wrecked! n restarts, q quits",
        None if game.direction().is_none() => "Arrows/WASD pick a starting direction",
        None => "Arrows/WASD steer - q quits",
    };
    let header = Paragraph::new(status)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Snake"));
    f.render_widget(header, root[0]);

    let area = centered_grid_area(root[1], snake::COLS as u16, snake::ROWS as u16);
    let dead = matches!(over, Some(StepOutcome::Lost));
    draw_board(f, game, dead, area);

    let footer = Paragraph::new(format!(
        "Length: {}  Session best: {}  Mode: {}",
        game.length(),
        high_score.max(game.length()),
        if hard { "hard" } else { "casual" }
    ))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, root[2]);
}

fn centered_grid_area(parent: Rect, cols: u16, rows: u16) -> Rect {
    // One char per cell, plus the wall border on each side.
    let grid_w = cols + 2;
    let grid_h = rows + 2;
    let x = parent.x.saturating_add(parent.width.saturating_sub(grid_w) / 2);
    let y = parent.y.saturating_add(parent.height.saturating_sub(grid_h) / 2);
    Rect {
        x,
        y,
        width: grid_w.min(parent.width),
        height: grid_h.min(parent.height),
    }
}

fn draw_board(f: &mut ratatui::Frame, game: &SnakeGame, dead: bool, area: Rect) {
    let mut lines: Vec<Line> = Vec::with_capacity(snake::ROWS);
    for row in 0..snake::ROWS {
        let mut spans: Vec<Span> = Vec::with_capacity(snake::COLS);
        for col in 0..snake::COLS {
            let (ch, style) = match game.cell(row, col) {
                Some(Cell::Apple) => (snake::APPLE_CHAR, Style::default().fg(Color::Red)),
                Some(Cell::Body) if dead => ('X', Style::default().fg(Color::Red)),
                Some(Cell::Body) if (row, col) == game.head() => (
                    game.head_char(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Some(Cell::Body) => (snake::BODY_CHAR, Style::default().fg(Color::Green)),
                _ => (snake::FLOOR_CHAR, Style::default()),
            };
            spans.push(Span::styled(ch.to_string(), style));
        }
        lines.push(Line::from(spans));
    }

    // The block border doubles as the wall.
    let board_block = Block::default().borders(Borders::ALL).title("Board");
    f.render_widget(Paragraph::new(lines).block(board_block), area);
}

struct TermGuard;
impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}
