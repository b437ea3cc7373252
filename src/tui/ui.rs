use std::{
    io::{self, Stdout},
    sync::Arc,
    time::Duration,
};

use crossterm::{
    event::KeyEventKind,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::info;

use crate::{
    config::Config,
    error::Result,
    gateway::{HttpGateway, VerificationGateway},
    review::{Phase, ReviewSession},
    storage::Database,
    tui::{
        app::{App, Screen},
        components,
        event::{Event, EventHandler},
        screens, theme,
    },
};

/// Open the review screen for `batch_id` and run until the user quits.
pub async fn run_tui(config: Config, batch_id: String) -> Result<()> {
    let gateway: Arc<dyn VerificationGateway> = Arc::new(HttpGateway::new(&config)?);
    let session = Arc::new(ReviewSession::new(gateway));
    let db = Database::new(&config.database.path)?;
    let tick_rate = config.tick_rate();
    let mut app = App::new(config, session, db, batch_id);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_loop(&mut terminal, &mut app, tick_rate).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("Review screen closed");

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut events = EventHandler::new(tick_rate);
    app.start();

    while !app.should_quit {
        app.sync();
        terminal.draw(|frame| render_ui(frame, app))?;

        match events.next().await {
            Some(Event::Key(key)) if key.kind == KeyEventKind::Press => app.handle_key(key),
            Some(Event::Key(_)) | Some(Event::Tick) | Some(Event::Resize(..)) => {}
            None => break,
        }
    }

    Ok(())
}

pub fn render_ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(frame.size());

    components::header::render(frame, chunks[0], app);

    match app.screen {
        Screen::Review => screens::review::render(frame, chunks[1], app),
        Screen::History => screens::history::render(frame, chunks[1], app),
        Screen::Settings => screens::settings::render(frame, chunks[1], app),
    }

    render_status_bar(frame, chunks[2], app);

    if app.show_help {
        let area = centered_rect(60, 70, frame.size());
        frame.render_widget(Clear, area);
        components::help::render(frame, area);
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let screen_indicator = match app.screen {
        Screen::Review => "Review",
        Screen::History => "History",
        Screen::Settings => "Settings",
    };

    let status_text = match &app.status_message {
        Some(msg) => msg.clone(),
        None => phase_hint(app.snapshot.phase()).to_string(),
    };

    let text = Line::from(vec![
        Span::styled(
            format!(" {} ", screen_indicator),
            Style::default()
                .fg(Color::Black)
                .bg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(status_text, Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::styled("?: Help", Style::default().fg(Color::Yellow)),
        Span::raw(" | "),
        Span::styled("q: Quit", Style::default().fg(Color::Red)),
    ]);

    let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

fn phase_hint(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Ready",
        Phase::ListLoading => "Loading documents...",
        Phase::ListLoaded => "Enter: open document",
        Phase::ListError => "R: retry loading the batch",
        Phase::DetailLoading => "Loading document...",
        Phase::DetailLoaded => "a: approve  d: decline  Tab: indicators  Esc: back",
        Phase::DetailError => "R: retry  Esc: back",
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
