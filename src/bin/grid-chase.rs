use std::fs::OpenOptions;
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute, queue};
use grid_chase::config::SessionArgs;
use grid_chase::error::GameError;
use grid_chase::runtime::SessionRuntime;
use grid_chase::score_store::ScoreStore;
use grid_chase::session::GameSession;
use grid_chase::types::{
    Cell, Direction, EffectsView, InputCommand, SessionEndReason, SessionSnapshot, SessionSummary,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const INPUT_POLL: Duration = Duration::from_millis(50);
const BOARD_TOP: u16 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Grid chase in the terminal")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,
    /// Append logs here; nothing is logged without it while the board is drawn.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum FrontEndError {
    #[error("terminal: {0}")]
    Terminal(#[from] io::Error),
    #[error(transparent)]
    Game(#[from] GameError),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Some(path) = cli.log_file.as_deref() {
        if let Err(error) = init_logging(path) {
            eprintln!("cannot open log file {}: {error}", path.display());
            std::process::exit(2);
        }
    }

    let config = match cli.session.session_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("invalid configuration: {error}");
            std::process::exit(2);
        }
    };
    let store = ScoreStore::new(cli.session.scores_path());
    let session = match GameSession::new(config) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("cannot start session: {error}");
            std::process::exit(2);
        }
    };

    let mut screen = Screen::new();
    if let Err(error) = screen.init() {
        eprintln!("terminal init failed: {error}");
        return;
    }
    let result = play(session, store.clone(), &mut screen).await;
    if let Err(error) = screen.cleanup() {
        eprintln!("terminal cleanup failed: {error}");
    }

    match result {
        Ok(summary) => print_summary(&summary, &store),
        Err(error) => {
            eprintln!("session error: {error}");
            std::process::exit(1);
        }
    }
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
    Ok(())
}

async fn play(
    session: GameSession,
    store: ScoreStore,
    screen: &mut Screen,
) -> Result<SessionSummary, FrontEndError> {
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let runtime = SessionRuntime::launch(session, store, update_tx);

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let stop_input = Arc::new(AtomicBool::new(false));
    let input_task = tokio::task::spawn_blocking({
        let stop = stop_input.clone();
        move || read_input(input_tx, stop)
    });

    let mut view = BoardView::default();
    let mut draw_error = None;
    loop {
        tokio::select! {
            snapshot = update_rx.recv() => {
                let Some(snapshot) = snapshot else {
                    break;
                };
                view.apply(&snapshot);
                if let Err(error) = screen.draw(&view) {
                    draw_error = Some(error);
                    runtime.send(InputCommand::Quit).await;
                    break;
                }
                if snapshot.ended {
                    break;
                }
            }
            Some(command) = input_rx.recv() => runtime.send(command).await,
        }
    }

    stop_input.store(true, Ordering::Relaxed);
    if let Err(error) = input_task.await {
        tracing::warn!("input reader failed: {error}");
    }
    let summary = runtime.finished().await?;
    if let Some(error) = draw_error {
        return Err(error.into());
    }
    Ok(summary)
}

/// Blocking key reader; exits when `stop` is set or the game side hangs up.
fn read_input(tx: mpsc::UnboundedSender<InputCommand>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        let ready = match event::poll(INPUT_POLL) {
            Ok(ready) => ready,
            Err(error) => {
                tracing::warn!("input poll failed: {error}");
                let _ = tx.send(InputCommand::Quit);
                return;
            }
        };
        if !ready {
            continue;
        }
        match event::read() {
            Ok(Event::Key(key)) => {
                if let Some(command) = key_command(key) {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!("input read failed: {error}");
                let _ = tx.send(InputCommand::Quit);
                return;
            }
        }
    }
}

fn key_command(key: KeyEvent) -> Option<InputCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(InputCommand::Quit);
    }
    let dir = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(InputCommand::Quit),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Direction::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Direction::Down,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Direction::Left,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Direction::Right,
        _ => return None,
    };
    Some(InputCommand::Move(dir))
}

/// Client-side copy of the board rebuilt from snapshots.
#[derive(Debug, Default)]
struct BoardView {
    size: usize,
    cells: Vec<Cell>,
    lives: u32,
    score: u64,
    elapsed_secs: u64,
    effects: EffectsView,
    ended: bool,
}

impl BoardView {
    fn apply(&mut self, snapshot: &SessionSnapshot) {
        if let Some(full) = snapshot.full_grid.as_ref() {
            self.size = snapshot.size;
            self.cells = full.clone();
        }
        for change in &snapshot.changes {
            let (row, col) = (change.position.row, change.position.col);
            if row < 0 || col < 0 || row as usize >= self.size || col as usize >= self.size {
                continue;
            }
            if let Some(slot) = self.cells.get_mut(row as usize * self.size + col as usize) {
                *slot = change.cell;
            }
        }
        self.lives = snapshot.lives;
        self.score = snapshot.score;
        self.elapsed_secs = snapshot.elapsed_secs;
        self.effects = snapshot.effects;
        self.ended = snapshot.ended;
    }

    fn status_line(&self) -> String {
        let mut active = Vec::new();
        if self.effects.speed_boost {
            active.push("speed");
        }
        if self.effects.invincibility {
            active.push("invincible");
        }
        if self.effects.wall_break {
            active.push("wall-break");
        }
        let effects = if active.is_empty() {
            "-".to_string()
        } else {
            active.join(",")
        };
        format!(
            "Lives {}  Score {}  Time {}s  Effects {}",
            self.lives, self.score, self.elapsed_secs, effects
        )
    }
}

fn glyph(cell: Cell) -> (char, Color) {
    match cell {
        Cell::Empty => ('.', Color::DarkGrey),
        Cell::Wall => ('#', Color::Blue),
        Cell::Player | Cell::PlayerOpenMouth => ('C', Color::Yellow),
        Cell::PlayerClosedMouth => ('O', Color::Yellow),
        Cell::Adversary => ('M', Color::Red),
        Cell::SpeedBoost => ('>', Color::Cyan),
        Cell::Invincibility => ('*', Color::Magenta),
        Cell::WallBreak => ('%', Color::DarkYellow),
        Cell::ExtraLife => ('+', Color::Green),
        Cell::ExtraScore => ('$', Color::White),
    }
}

struct Screen {
    writer: Stdout,
}

impl Screen {
    fn new() -> Self {
        Self {
            writer: io::stdout(),
        }
    }

    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )
    }

    fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn draw(&mut self, view: &BoardView) -> io::Result<()> {
        queue!(
            self.writer,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::White),
            Print(view.status_line()),
            terminal::Clear(ClearType::UntilNewLine),
            cursor::MoveTo(0, 1),
            Print("arrows/WASD move, q quits"),
        )?;

        if view.size > 0 {
            for (row, cells) in view.cells.chunks(view.size).enumerate() {
                queue!(self.writer, cursor::MoveTo(0, BOARD_TOP + row as u16))?;
                for &cell in cells {
                    let (ch, color) = glyph(cell);
                    queue!(self.writer, SetForegroundColor(color), Print(ch), Print(' '))?;
                }
            }
        }
        if view.ended {
            let row = BOARD_TOP + view.size as u16 + 1;
            queue!(
                self.writer,
                cursor::MoveTo(0, row),
                SetForegroundColor(Color::White),
                Print("session over"),
            )?;
        }
        queue!(self.writer, ResetColor)?;
        self.writer.flush()
    }
}

fn print_summary(summary: &SessionSummary, store: &ScoreStore) {
    let reason = match summary.reason {
        SessionEndReason::LivesExhausted => "out of lives",
        SessionEndReason::Quit => "quit",
    };
    println!();
    println!(
        "{}: {} points in {}s ({reason}, seed {})",
        summary.name, summary.score, summary.elapsed_secs, summary.seed
    );

    let board = store.build_board(Some(10));
    if board.entries.is_empty() {
        return;
    }
    println!("Top scores ({})", store.path().display());
    for (rank, record) in board.entries.iter().enumerate() {
        println!("{:>3}. {:<16} {:>8}", rank + 1, record.name, record.score);
    }
}
