use std::{future::Future, sync::Arc};

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::Result,
    gateway::VerificationGateway,
    review::{collect_stats, BatchStats, Completion, Phase, ReviewSession, SessionSnapshot},
    storage::{Database, Decision, ReviewDecision},
};

pub type SharedSession = Arc<ReviewSession<dyn VerificationGateway>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Review,
    History,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Overview,
    Indicators,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One line of the review activity pane.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Document the entry is about, if any.
    pub document_id: Option<String>,
    pub message: String,
}

/// Results of background tasks, drained on every tick.
#[derive(Debug)]
pub enum AppMessage {
    Stats(Result<BatchStats>),
    Finished {
        action: &'static str,
        outcome: Result<Option<Completion>>,
    },
}

pub struct App {
    // UI State
    pub batch_id: String,
    pub screen: Screen,
    pub should_quit: bool,
    pub show_help: bool,
    pub cursor: usize,
    pub detail_tab: DetailTab,
    pub status_message: Option<String>,

    // Data
    pub snapshot: SessionSnapshot,
    pub stats: Option<BatchStats>,
    pub stats_loading: bool,
    pub decision: Option<ReviewDecision>,
    pub history: Vec<ReviewDecision>,
    pub logs: Vec<LogEntry>,

    // Backend
    pub config: Config,
    session: SharedSession,
    updates: watch::Receiver<SessionSnapshot>,
    messages_tx: mpsc::UnboundedSender<AppMessage>,
    messages_rx: mpsc::UnboundedReceiver<AppMessage>,
    db: Database,
}

impl App {
    pub fn new(config: Config, session: SharedSession, db: Database, batch_id: String) -> Self {
        let updates = session.subscribe();
        let snapshot = updates.borrow().clone();
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();

        Self {
            batch_id,
            screen: Screen::Review,
            should_quit: false,
            show_help: false,
            cursor: 0,
            detail_tab: DetailTab::Overview,
            status_message: None,
            snapshot,
            stats: None,
            stats_loading: false,
            decision: None,
            history: Vec::new(),
            logs: Vec::new(),
            config,
            session,
            updates,
            messages_tx,
            messages_rx,
            db,
        }
    }

    /// Kick off loading the batch this App was opened for.
    pub fn start(&mut self) {
        let batch_id = self.batch_id.clone();
        self.add_log(LogLevel::Info, &format!("Opening batch {}", batch_id));
        self.spawn_session_task("load", move |session| async move {
            Ok(Some(session.load_batch(&batch_id).await))
        });
    }

    /// Pull the latest session snapshot and any finished background work.
    pub fn sync(&mut self) {
        if self.updates.has_changed().unwrap_or(false) {
            let snapshot = self.updates.borrow_and_update().clone();
            self.apply_snapshot(snapshot);
        }

        while let Ok(message) = self.messages_rx.try_recv() {
            self.handle_message(message);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('1') => self.screen = Screen::Review,
            KeyCode::Char('2') => {
                self.screen = Screen::History;
                self.refresh_history();
            }
            KeyCode::Char('3') => self.screen = Screen::Settings,
            _ if self.screen != Screen::Review => {}
            KeyCode::Up | KeyCode::Char('k') => self.previous_item(),
            KeyCode::Down | KeyCode::Char('j') => self.next_item(),
            KeyCode::Enter => self.select_current(),
            KeyCode::Esc | KeyCode::Backspace => self.clear_selection(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('R') => self.retry(),
            KeyCode::Char('s') => self.refresh_stats(),
            KeyCode::Char('a') => self.decide(Decision::Approved),
            KeyCode::Char('d') => self.decide(Decision::Declined),
            KeyCode::Tab => self.toggle_detail_tab(),
            _ => {}
        }
    }

    // Navigation
    pub fn next_item(&mut self) {
        let len = self.snapshot.documents().len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    pub fn previous_item(&mut self) {
        let len = self.snapshot.documents().len();
        if len > 0 {
            if self.cursor == 0 {
                self.cursor = len - 1;
            } else {
                self.cursor -= 1;
            }
        }
    }

    pub fn toggle_detail_tab(&mut self) {
        self.detail_tab = match self.detail_tab {
            DetailTab::Overview => DetailTab::Indicators,
            DetailTab::Indicators => DetailTab::Overview,
        };
    }

    /// Statistics to show: fetched ones when available, else counts over the list.
    pub fn current_stats(&self) -> BatchStats {
        self.stats
            .clone()
            .unwrap_or_else(|| self.snapshot.summary_stats())
    }

    // Actions
    fn select_current(&mut self) {
        let Some(document) = self.snapshot.documents().get(self.cursor) else {
            self.status_message = Some("No document to select".to_string());
            return;
        };
        let id = document.id.clone();
        self.detail_tab = DetailTab::Overview;
        self.spawn_session_task("select", move |session| async move {
            session.select_document(&id).await.map(Some)
        });
    }

    fn clear_selection(&mut self) {
        if self.session.clear_selection() {
            self.status_message = Some("Selection cleared".to_string());
        }
    }

    fn reload(&mut self) {
        self.add_log(LogLevel::Info, &format!("Reloading batch {}", self.batch_id));
        self.spawn_session_task("reload", |session| async move {
            session.reload_batch().await.map(Some)
        });
    }

    fn retry(&mut self) {
        self.spawn_session_task("retry", |session| async move { session.retry().await });
    }

    fn refresh_stats(&mut self) {
        if self.stats_loading {
            return;
        }
        self.stats_loading = true;
        self.status_message = Some("Refreshing statistics...".to_string());

        let session = Arc::clone(&self.session);
        let tx = self.messages_tx.clone();
        let batch_id = self.batch_id.clone();
        let source = self.config.ui.default_stats_source;
        tokio::spawn(async move {
            let result = collect_stats(session.gateway().as_ref(), &batch_id, source).await;
            let _ = tx.send(AppMessage::Stats(result));
        });
    }

    fn decide(&mut self, decision: Decision) {
        let record = match self.snapshot.detail() {
            Some(detail) => ReviewDecision::new(detail.id(), &self.batch_id, decision, detail.score()),
            None => {
                self.status_message = Some("Open a document before deciding".to_string());
                return;
            }
        };

        match self.db.save_decision(&record) {
            Ok(_) => {
                self.add_document_log(
                    LogLevel::Success,
                    &record.document_id,
                    &format!("{} at score {}", decision, record.score),
                );
                self.status_message = Some(format!("Recorded: {}", decision));
                self.refresh_decision();
                if self.screen == Screen::History {
                    self.refresh_history();
                }
            }
            Err(e) => {
                self.add_log(LogLevel::Error, &format!("Failed to save decision: {}", e));
            }
        }
    }

    fn refresh_decision(&mut self) {
        self.decision = match self.snapshot.selected_id() {
            Some(id) => match self.db.latest_decision(id) {
                Ok(decision) => decision,
                Err(e) => {
                    warn!("Failed to read decision for {}: {}", id, e);
                    None
                }
            },
            None => None,
        };
    }

    fn refresh_history(&mut self) {
        match self.db.get_decisions(Some(&self.batch_id), Some(50)) {
            Ok(history) => self.history = history,
            Err(e) => self.add_log(LogLevel::Error, &format!("Failed to load history: {}", e)),
        }
    }

    fn spawn_session_task<F, Fut>(&self, action: &'static str, task: F)
    where
        F: FnOnce(SharedSession) -> Fut,
        Fut: Future<Output = Result<Option<Completion>>> + Send + 'static,
    {
        let future = task(Arc::clone(&self.session));
        let tx = self.messages_tx.clone();
        tokio::spawn(async move {
            let outcome = future.await;
            let _ = tx.send(AppMessage::Finished { action, outcome });
        });
    }

    fn apply_snapshot(&mut self, snapshot: SessionSnapshot) {
        let before = self.snapshot.phase();
        let after = snapshot.phase();
        let selection_changed = self.snapshot.selected_id() != snapshot.selected_id();

        if before != after {
            match after {
                Phase::ListLoading => {
                    self.stats = None;
                }
                Phase::ListLoaded if before == Phase::ListLoading => {
                    if snapshot.no_documents_found() {
                        self.add_log(LogLevel::Warning, "No documents found");
                    } else {
                        self.add_log(
                            LogLevel::Success,
                            &format!("Loaded {} documents", snapshot.documents().len()),
                        );
                    }
                }
                Phase::ListError => {
                    let reason = snapshot.list_error().unwrap_or_default().to_string();
                    self.add_log(LogLevel::Error, &format!("Batch failed to load: {}", reason));
                }
                Phase::DetailLoaded => {
                    let id = snapshot.selected_id().unwrap_or_default().to_string();
                    self.add_document_log(LogLevel::Success, &id, "Detail loaded");
                }
                Phase::DetailError => {
                    let id = snapshot.selected_id().unwrap_or_default().to_string();
                    let reason = snapshot.detail_error().unwrap_or_default().to_string();
                    self.add_document_log(LogLevel::Error, &id, &format!("Failed to load: {}", reason));
                }
                _ => {}
            }
        }

        let len = snapshot.documents().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
        self.snapshot = snapshot;

        if selection_changed {
            self.refresh_decision();
        }
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Stats(Ok(stats)) => {
                self.stats_loading = false;
                self.status_message = Some(format!(
                    "Statistics refreshed: overall {}",
                    stats.overall_status.label()
                ));
                self.stats = Some(stats);
            }
            AppMessage::Stats(Err(e)) => {
                self.stats_loading = false;
                self.add_log(LogLevel::Error, &format!("Statistics failed: {}", e));
            }
            AppMessage::Finished { action, outcome } => match outcome {
                Ok(Some(Completion::Superseded)) => {
                    debug!("{} superseded by a newer request", action);
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    self.status_message = Some("Nothing to retry".to_string());
                }
                Err(e) => {
                    self.status_message = Some(if e.is_recoverable() {
                        format!("{} (R to retry)", e)
                    } else {
                        e.to_string()
                    });
                    self.add_log(LogLevel::Warning, &format!("{}: {}", action, e));
                }
            },
        }
    }

    pub fn add_log(&mut self, level: LogLevel, message: &str) {
        self.push_log(level, None, message);
    }

    pub fn add_document_log(&mut self, level: LogLevel, document_id: &str, message: &str) {
        self.push_log(level, Some(document_id.to_string()), message);
    }

    fn push_log(&mut self, level: LogLevel, document_id: Option<String>, message: &str) {
        self.logs.push(LogEntry {
            level,
            timestamp: Utc::now(),
            document_id,
            message: message.to_string(),
        });
        if self.logs.len() > 100 {
            self.logs.remove(0);
        }
    }
}
