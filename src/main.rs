use std::fs::File;
use std::io;
use std::io::Write;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor;
use crossterm::event;
use crossterm::event::Event as CtEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use toroid::GridOffset;
use toroid::config::Cli;
use toroid::config::Config;
use toroid::input::GridPoint;
use toroid::input::Press;
use toroid::patterns;
use toroid::render;
use toroid::render::Canvas;
use toroid::rle;
use toroid::session::Session;
use toroid::stamp::PatternStamp;

const FRAMERATE: u32 = 120;
const FRAMETIME: Duration = Duration::from_millis(((1f64 / FRAMERATE as f64) * 1_000f64) as u64);

enum Event {
    Toggle,
    Stop,
    Randomize,
    Select(usize),
    MoveCursor { dx: GridOffset, dy: GridOffset },
    Paint,
    PointerDown { column: u16, row: u16 },
    PointerDrag { column: u16, row: u16 },
    PointerUp,
    PointerMoved { column: u16, row: u16 },
    Resize { cols: u16, rows: u16 },
    Exit,
}

fn handle_event(event: CtEvent) -> Option<Event> {
    match event {
        CtEvent::Key(key_event) => match key_event {
            KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => Some(Event::Exit),
            KeyEvent {
                code: KeyCode::Char(' '),
                ..
            } => Some(Event::Toggle),
            KeyEvent {
                code: KeyCode::Char('s'),
                ..
            } => Some(Event::Stop),
            KeyEvent {
                code: KeyCode::Char('r'),
                ..
            } => Some(Event::Randomize),
            KeyEvent {
                code: KeyCode::Char(c @ '1'..='9'),
                ..
            } => Some(Event::Select(c as usize - '1' as usize)),
            KeyEvent {
                code: KeyCode::Left | KeyCode::Char('h'),
                ..
            } => Some(Event::MoveCursor { dx: -1, dy: 0 }),
            KeyEvent {
                code: KeyCode::Down | KeyCode::Char('j'),
                ..
            } => Some(Event::MoveCursor { dx: 0, dy: 1 }),
            KeyEvent {
                code: KeyCode::Up | KeyCode::Char('k'),
                ..
            } => Some(Event::MoveCursor { dx: 0, dy: -1 }),
            KeyEvent {
                code: KeyCode::Right | KeyCode::Char('l'),
                ..
            } => Some(Event::MoveCursor { dx: 1, dy: 0 }),
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => Some(Event::Paint),
            _ => None,
        },
        CtEvent::Mouse(MouseEvent {
            kind, column, row, ..
        }) => match kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Event::PointerDown { column, row }),
            MouseEventKind::Drag(MouseButton::Left) => Some(Event::PointerDrag { column, row }),
            MouseEventKind::Up(MouseButton::Left) => Some(Event::PointerUp),
            MouseEventKind::Moved => Some(Event::PointerMoved { column, row }),
            _ => None,
        },
        CtEvent::FocusLost => Some(Event::PointerUp),
        CtEvent::Resize(cols, rows) => Some(Event::Resize { cols, rows }),
        _ => None,
    }
}

/// Grid cell under the terminal character at `(column, row)`, using the middle of its dots.
fn pointer(canvas: &Canvas, column: u16, row: u16) -> GridPoint {
    let px = column as f64 * 2.0 + 1.0;
    let py = row as f64 * 4.0 + 2.0;

    canvas.viewport().to_grid(px, py)
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("Failed to create log file {:?}", config.log_file))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// The stamp selected at startup, and a name for it.
fn startup_stamp(config: &Config) -> anyhow::Result<(String, PatternStamp)> {
    if let Some(path) = &config.pattern_file {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {path:?}"))?;
        let file = rle::read_rle(&bytes).with_context(|| format!("Failed to parse {path:?}"))?;

        let name = file
            .name
            .clone()
            .unwrap_or_else(|| path.display().to_string());

        info!(%name, cells = file.stamp.len(), "loaded pattern file");

        return Ok((name, file.stamp.centered()));
    }

    let pattern = patterns::by_name(&config.stamp)
        .with_context(|| format!("No built-in stamp named \"{}\"", config.stamp))?;

    Ok((pattern.name.to_string(), pattern.stamp()?))
}

fn run(config: &Config, stdout: &mut io::Stdout) -> anyhow::Result<()> {
    let (mut stamp_name, stamp) = startup_stamp(config)?;

    // The last row holds the status line
    let (cols, rows) = terminal::size()?;
    let mut canvas = Canvas::new(cols, rows.saturating_sub(1), config.axis_size);

    let (columns, rows) = (canvas.viewport().columns, canvas.viewport().rows);
    let mut session = Session::from_config(config, columns, rows)?;
    session.select_stamp(stamp);

    let mut press = Press::new(config.press_interval);
    let mut target: GridPoint = (columns / 2, rows / 2);
    let mut last_step = Instant::now();

    loop {
        let t = Instant::now();

        // Poll event for as long as FRAMETIME
        let event = if event::poll(FRAMETIME)? {
            handle_event(event::read()?)
        } else {
            None
        };

        match event {
            None => {}
            Some(Event::Exit) => break,
            Some(Event::Toggle) => {
                session.toggle();
                last_step = Instant::now();
            }
            Some(Event::Stop) => session.stop(),
            Some(Event::Randomize) => {
                session.randomize();
            }
            Some(Event::Select(i)) => {
                if let Some(pattern) = patterns::PATTERNS.get(i) {
                    session.select_stamp(pattern.stamp()?);
                    stamp_name = pattern.name.to_string();
                }
            }
            Some(Event::MoveCursor { dx, dy }) => {
                let (w, h) = (session.automaton().width(), session.automaton().height());
                target = (
                    (target.0 + dx).rem_euclid(w as GridOffset),
                    (target.1 + dy).rem_euclid(h as GridOffset),
                );
            }
            Some(Event::Paint) => {
                session.paint(target.0, target.1);
            }
            Some(Event::PointerDown { column, row }) => {
                target = press.press(pointer(&canvas, column, row), Instant::now());
                session.paint(target.0, target.1);
            }
            Some(Event::PointerDrag { column, row }) => {
                target = pointer(&canvas, column, row);
                press.move_to(target);
            }
            Some(Event::PointerUp) => press.release(),
            Some(Event::PointerMoved { column, row }) => target = pointer(&canvas, column, row),
            Some(Event::Resize { cols, rows }) => {
                canvas = Canvas::new(cols, rows.saturating_sub(1), config.axis_size);
                press.release();

                let (columns, rows) = (canvas.viewport().columns, canvas.viewport().rows);
                match session.rebuild(columns, rows) {
                    Ok(()) => target = (target.0.min(columns - 1), target.1.min(rows - 1)),
                    Err(e) => warn!("Keeping the old grid: {e}"),
                }
            }
        }

        let now = Instant::now();

        if let Some((x, y)) = press.poll(now) {
            session.paint(x, y);
        }

        if now.saturating_duration_since(last_step) >= config.step_interval() {
            session.tick();
            last_step = now;
        }

        let preview = session.preview(target.0, target.1).unwrap_or_default();
        render::render(session.automaton(), &preview, &mut canvas);

        queue!(stdout, cursor::MoveTo(0, 0))?;

        for line in canvas.render().lines() {
            queue!(stdout, style::Print(line), cursor::MoveToNextLine(1))?;
        }

        let a = session.automaton();
        let status = format!(
            "{:?} | gen {} | pop {} | {} | {}",
            session.state(),
            a.generation(),
            a.population(),
            a.rule(),
            stamp_name,
        );

        queue!(
            stdout,
            style::Print(status),
            terminal::Clear(terminal::ClearType::UntilNewLine),
        )?;
        stdout.flush()?;

        let time_left = FRAMETIME.saturating_sub(t.elapsed());
        thread::sleep(time_left);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = Config::from(Cli::parse());
    init_logging(&config)?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();

    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        event::EnableMouseCapture,
        cursor::Hide,
    )?;

    let res = run(&config, &mut stdout);

    execute!(
        stdout,
        cursor::Show,
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen,
    )?;
    terminal::disable_raw_mode()?;

    res
}
