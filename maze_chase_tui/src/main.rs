use anyhow::{Context, Result};
use clap::Parser;
use maze_chase_core::{
    Direction as Heading, GameState, Level, Position, Snapshot, Status,
    animation::display_frame, load_level_from_string, map::Cell,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

/// Player glyphs, indexed by `display_frame`: mouth open, then closed.
const PLAYER_FRAMES: [&str; 8] = ["v", "|", "^", "|", ">", "-", "<", "-"];
const PURSUER_COLORS: [Color; 4] = [Color::Red, Color::Magenta, Color::Cyan, Color::LightYellow];
const ANIMATION_RATE: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Level file to load (`.json` or the whitespace grid format); the
    /// built-in maze is used when omitted
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,

    /// Seed for pursuer movement
    #[arg(short, long)]
    seed: Option<u64>,

    /// Milliseconds between simulation ticks
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Directory the log file is written to
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

struct App {
    level: Level,
    game: GameState,
    /// Latest snapshot returned by the simulation.
    snapshot: Snapshot,
    /// Direction the player is steering toward; kept until another key.
    desired: Heading,
    started: Instant,
    should_quit: bool,
}

impl App {
    fn new(level: Level, seed: u64) -> Result<Self> {
        let game = GameState::with_seed(&level, seed).context("Failed to start game")?;
        tracing::info!("New game with seed {}", seed);
        Ok(App {
            snapshot: game.snapshot(),
            desired: level.player.direction,
            level,
            game,
            started: Instant::now(),
            should_quit: false,
        })
    }

    /// Handles one step of the simulation.
    fn tick(&mut self) {
        self.snapshot = self.game.tick(self.desired);
    }

    fn restart(&mut self) -> Result<()> {
        *self = App::new(self.level.clone(), rand::random())?;
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') => self.restart()?,
            KeyCode::Up | KeyCode::Char('w') => self.desired = Heading::Up,
            KeyCode::Down | KeyCode::Char('s') => self.desired = Heading::Down,
            KeyCode::Left | KeyCode::Char('a') => self.desired = Heading::Left,
            KeyCode::Right | KeyCode::Char('d') => self.desired = Heading::Right,
            _ => {}
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = setup_logging(&args.log_dir)?;

    let level = match &args.map {
        Some(path) => load_level(path)?,
        None => Level::classic(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut app = App::new(level, seed)?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, Duration::from_millis(args.tick_ms));
    restore_terminal(&mut terminal)?;

    if let Status::Won | Status::Lost = app.snapshot.status {
        println!("{} Score: {}", status_message(app.snapshot.status), app.snapshot.score);
    }
    result
}

/// Sends tracing output to `<log_dir>/maze_chase.log`; the terminal belongs to the UI.
fn setup_logging(log_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(log_dir, "maze_chase.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    tracing::info!("Logging to {}", log_dir.join("maze_chase.log").display());
    Ok(guard)
}

fn load_level(path: &Path) -> Result<Level> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read level file {}", path.display()))?;
    let level = if path.extension().is_some_and(|ext| ext == "json") {
        let level: Level = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse level JSON {}", path.display()))?;
        level.validate()?;
        level
    } else {
        load_level_from_string(&text)
            .with_context(|| format!("Failed to load level {}", path.display()))?
    };
    tracing::info!("Loaded level from {}", path.display());
    Ok(level)
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code)?;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Maze
            Constraint::Length(3), // Score line
            Constraint::Length(2), // Help
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], app);
    render_status(frame, main_layout[1], &app.snapshot);

    let help_text = Paragraph::new("Arrows/WASD steer, 'r' restarts, 'q' or 'Esc' quits.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);

    if app.snapshot.status.is_terminal() {
        render_game_over(frame, main_layout[0], &app.snapshot);
    }
}

fn status_message(status: Status) -> &'static str {
    match status {
        Status::Won => "You win!",
        Status::Lost => "Game over!",
        Status::InProgress => "",
    }
}

fn render_status(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let text = Line::from(vec![
        Span::styled(
            format!("Score: {}", snapshot.score),
            Style::default().fg(Color::Yellow).bold(),
        ),
        Span::raw(format!(
            "   Pickups left: {}   Tick: {}",
            snapshot.remaining_pickups, snapshot.tick
        )),
    ]);
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_game_over(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let popup = Rect {
        x: area.x + area.width.saturating_sub(24) / 2,
        y: area.y + area.height.saturating_sub(4) / 2,
        width: area.width.min(24),
        height: area.height.min(4),
    };
    let color = if snapshot.status == Status::Won {
        Color::Green
    } else {
        Color::Red
    };
    let text = vec![
        Line::from(Span::styled(
            status_message(snapshot.status),
            Style::default().fg(color).bold(),
        )),
        Line::from(format!("Score: {}", snapshot.score)),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        popup,
    );
}

/// Renders the maze and agents onto the frame.
fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let map = app.game.map();
    let snapshot = &app.snapshot;
    let elapsed = app.started.elapsed();

    let mut lines: Vec<Line> = Vec::with_capacity(map.height());
    for y in 0..map.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(map.width());
        for x in 0..map.width() {
            let pos = Position::new(x, y);
            let pursuer = snapshot
                .pursuers
                .iter()
                .position(|pursuer| pursuer.position == pos);

            let span = if let Some(index) = pursuer {
                Span::styled(
                    "M",
                    Style::default()
                        .fg(PURSUER_COLORS[index % PURSUER_COLORS.len()])
                        .bold(),
                )
            } else if snapshot.player.position == pos {
                let frame_index = display_frame(snapshot.player.direction, elapsed, ANIMATION_RATE);
                Span::styled(
                    PLAYER_FRAMES[frame_index],
                    Style::default().fg(Color::Yellow).bold(),
                )
            } else {
                match map.cell_kind(pos) {
                    Ok(Cell::Wall) => Span::styled("#", Style::default().fg(Color::Blue)),
                    Ok(Cell::Pickup) => Span::styled(".", Style::default().fg(Color::White)),
                    _ => Span::raw(" "),
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Maze Chase").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}
