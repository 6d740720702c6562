//! A snap-to-verse terminal Bible reader.
//!
//! Run the binary to open the reader.  `tiny-scroll convert <in> <out>`
//! turns a flat verse export into the translation format the reader loads.

mod app;
mod config;
mod core;
mod store;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    style::Print,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use crate::app::{
    boot,
    event::{spawn_event_reader, AppEvent},
    handler,
    loader::{self, Loader},
    state::{ActiveView, AppState, LoadStatus},
};
use crate::core::context::Preferences;
use crate::core::location::Location;
use crate::core::session::ReadingSession;
use crate::store::FileStore;
use crate::ui::{
    popup, reader_widget::ReaderWidget, spinner::LoadingIndicator, theme::Theme,
};

/// Animation frame interval.
const FRAME: Duration = Duration::from_millis(16);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Snap-to-verse terminal Bible reader")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Translation to open (KJV, WEB, ASV, BBE).
    #[arg(long, short)]
    translation: Option<String>,

    /// Flattened unit index to open at.
    #[arg(long, short, allow_hyphen_values = true)]
    verse: Option<String>,

    /// A location string such as `?t=WEB&v=120&theme=dark`.
    #[arg(long)]
    location: Option<String>,

    /// Directory holding the translation JSON files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Preference and position store (defaults to the user data directory).
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Write logs here instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a flat verse export into a translation file.
    Convert { input: PathBuf, output: PathBuf },
}

impl Cli {
    /// The location string with `--translation`/`--verse` folded in.
    fn location(&self) -> Location {
        let mut location = Location::parse(self.location.as_deref().unwrap_or_default());
        if let Some(t) = &self.translation {
            location.translation = Some(t.clone());
        }
        if let Some(v) = &self.verse {
            location.index = v.trim().parse().ok();
        }
        location
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &AppState) {
    let prefs = state.session.prefs();
    let theme = Theme::new(prefs.theme, prefs.serif);
    let layout = state.layout();
    frame.render_widget(Paragraph::new("").style(theme.page_style()), frame.area());

    // ── header: selectors + indicator ─────────────────────────
    if layout.header_area.height > 0 {
        let selectors = state.session.reactor().selectors();
        let book = selectors
            .book
            .and_then(|b| state.session.document().book(b))
            .map_or("—", |b| b.name.as_str());
        let chapter = selectors
            .chapter
            .and_then(|c| selectors.chapter_options.get(c))
            .map_or("—", String::as_str);
        let mut spans = vec![
            Span::styled(format!(" {} ", state.session.translation()), theme.selector_style()),
            Span::styled("  ", theme.header_style()),
            Span::styled(format!(" {book} ▾ "), theme.selector_style()),
            Span::styled("  ", theme.header_style()),
            Span::styled(format!(" {chapter} ▾ "), theme.selector_style()),
        ];
        if let Some(indicator) = state.session.reactor().indicator() {
            spans.push(Span::styled(format!("   {indicator}"), theme.header_style()));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(theme.header_style()),
            layout.header_area,
        );
    }

    // ── reading column ────────────────────────────────────────
    match &state.load_status {
        LoadStatus::Loading { translation } => frame.render_widget(
            LoadingIndicator {
                translation,
                tick: state.tick,
                style: theme.dim_style(),
            },
            layout.reading_area,
        ),
        LoadStatus::Failed { message } => {
            popup::message(message, theme.dim_style(), layout.reading_area, frame.buffer_mut());
        }
        LoadStatus::Ready if state.session.flat().is_empty() => {
            popup::message(
                "This translation has no books",
                theme.dim_style(),
                layout.reading_area,
                frame.buffer_mut(),
            );
        }
        LoadStatus::Ready => frame.render_widget(
            ReaderWidget::new(&state.column, state.session.flat(), state.session.cursor(), theme),
            state.column_area(),
        ),
    }

    // ── status bar ────────────────────────────────────────────
    if layout.status_area.height > 0 {
        let hint = state.config.status_bar_hint();
        let text = match &state.status_message {
            Some(message) => message.clone(),
            None => {
                let announcement = state.session.reactor().announcement();
                if announcement.is_empty() {
                    hint
                } else {
                    format!(" {announcement}  │  {hint}")
                }
            }
        };
        frame.render_widget(
            Paragraph::new(text).style(theme.status_bar_style()),
            layout.status_area,
        );
    }

    // ── popups ────────────────────────────────────────────────
    let area = frame.area();
    match state.active_view {
        ActiveView::Reader => {}
        ActiveView::Settings => frame.render_widget(popup::SettingsPopup { state, theme }, area),
        ActiveView::Help => frame.render_widget(
            popup::HelpPopup {
                config: &state.config,
                theme,
            },
            area,
        ),
        ActiveView::QuickJump => frame.render_widget(
            popup::JumpPopup {
                jump: &state.jump,
                theme,
            },
            area,
        ),
        ActiveView::BookPicker => frame.render_widget(
            popup::PickerPopup {
                title: "Book",
                items: state
                    .session
                    .document()
                    .books()
                    .iter()
                    .map(|b| b.name.clone())
                    .collect(),
                picker: &state.picker,
                theme,
            },
            area,
        ),
        ActiveView::ChapterPicker => frame.render_widget(
            popup::PickerPopup {
                title: "Chapter",
                items: state.session.reactor().selectors().chapter_options.clone(),
                picker: &state.picker,
                theme,
            },
            area,
        ),
        ActiveView::ContinuePrompt => {
            if let Some(offer) = &state.continue_offer {
                frame.render_widget(
                    popup::ContinuePopup {
                        label: offer.label(),
                        theme,
                    },
                    area,
                );
            }
        }
    }
}

/// Hand a pending translation request to the loader.
fn dispatch_request(state: &mut AppState, loader: &mut Loader) {
    let Some(requested) = state.requested_translation.take() else {
        return;
    };
    match loader.request(&requested) {
        Ok(Some(document)) => {
            let id = loader::find(&requested).map_or(requested.as_str(), |t| t.id);
            state.install(id, document);
        }
        Ok(None) => state.loading(&requested),
        Err(err) => state.load_failed(&requested, &err),
    }
}

// ───────────────────────────────────────── main ──────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    // ── converter mode ────────────────────────────────────────
    if let Some(Command::Convert { input, output }) = &cli.command {
        let stats = core::convert::convert_file(input, output)
            .with_context(|| format!("converting {}", input.display()))?;
        println!(
            "wrote {} ({} books, {} verses)",
            output.display(),
            stats.books,
            stats.verses
        );
        return Ok(());
    }

    // ── boot ──────────────────────────────────────────────────
    let store = match &cli.state_file {
        Some(path) => FileStore::open(path),
        None => FileStore::open_default(),
    };
    tracing::debug!("state file: {}", store.path().display());
    let boot = boot::resolve(&cli.location(), &store, Utc::now());
    let mut prefs = Preferences::load(&store);
    prefs.theme = boot.theme;
    let config = config::AppConfig::load();
    let session = ReadingSession::new(config.tuning(), prefs);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;

    let mut state = AppState::new(
        config,
        session,
        Box::new(store),
        Rect::new(0, 0, size.width, size.height),
    );
    state.pending_start = Some(boot.index.unwrap_or(0));
    state.continue_offer = boot.offer;
    state.request_translation(boot.translation);

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(Duration::from_millis(100));
    let (load_tx, mut load_rx) = tokio::sync::mpsc::unbounded_channel();
    let mut loader = Loader::new(cli.data_dir.clone(), load_tx);
    let mut title_revision = 0;
    let mut next_frame = Instant::now();

    // ── event loop ────────────────────────────────────────────
    loop {
        dispatch_request(&mut state, &mut loader);

        let now = Instant::now();
        if state.column.is_animating() && now >= next_frame {
            state.animation_frame(now);
            next_frame = now + FRAME;
        }
        state.poll(now);

        terminal.draw(|frame| draw(frame, &state))?;

        let address = state.session.address();
        if address.replacements() != title_revision {
            title_revision = address.replacements();
            if let Some(location) = address.current() {
                execute!(
                    terminal.backend_mut(),
                    SetTitle(format!("{} {location}", env!("CARGO_PKG_NAME")))
                )?;
            }
        }
        if state.bell_pending {
            state.bell_pending = false;
            execute!(terminal.backend_mut(), Print("\x07"))?;
        }

        let deadline = if state.column.is_animating() {
            Some(state.next_deadline().map_or(next_frame, |d| d.min(next_frame)))
        } else {
            state.next_deadline()
        };
        let wake = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at.into()).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                let now = Instant::now();
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k, now),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m, now),
                    AppEvent::Resize(w, h) => state.resize(w, h),
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(update) = load_rx.recv() => {
                if let Some((id, result)) = loader.accept(update) {
                    match result {
                        Ok(document) => state.install(&id, document),
                        Err(err) => state.load_failed(&id, &err),
                    }
                }
            }

            _ = wake => {}
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
