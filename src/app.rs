// App state and main event loop.
// Drives the stats dashboard: background loads, retry, and keyboard input handling.

use std::io;
use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::stats::{AggregatedStats, Aggregator, StatsSource};
use crate::ui;

/// Loading state for async data.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> LoadingState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }
}

/// Main application state.
pub struct App<S> {
    aggregator: Arc<Aggregator<S>>,
    /// Current stats panel contents.
    pub stats: LoadingState<AggregatedStats>,
    /// When the panel last received data.
    pub loaded_at: Option<DateTime<Local>>,
    /// Whether the app should exit.
    pub should_quit: bool,
    tx: mpsc::UnboundedSender<Result<AggregatedStats>>,
    rx: mpsc::UnboundedReceiver<Result<AggregatedStats>>,
}

impl<S> App<S> {
    pub fn username(&self) -> &str {
        self.aggregator.username()
    }
}

impl<S: StatsSource + 'static> App<S> {
    pub fn new(aggregator: Aggregator<S>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            aggregator: Arc::new(aggregator),
            stats: LoadingState::Idle,
            loaded_at: None,
            should_quit: false,
            tx,
            rx,
        }
    }

    /// Main event loop. `force_refresh` skips the cache for the first load.
    pub fn run(&mut self, terminal: &mut DefaultTerminal, force_refresh: bool) -> io::Result<()> {
        if force_refresh {
            self.refresh();
        } else {
            self.reload();
        }
        while !self.should_quit {
            self.poll_results();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Load in the background, serving the cache when fresh.
    pub fn reload(&mut self) {
        self.spawn_load(false);
    }

    /// Fetch fresh data in the background; the cached entry survives a failure.
    pub fn refresh(&mut self) {
        self.spawn_load(true);
    }

    /// Start a load unless one is already running.
    fn spawn_load(&mut self, bypass_cache: bool) {
        if self.stats.is_loading() {
            return;
        }
        self.stats = LoadingState::Loading;

        let aggregator = Arc::clone(&self.aggregator);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = if bypass_cache {
                aggregator.refresh().await
            } else {
                aggregator.load().await
            };
            // Receiver is gone only when the app has exited.
            let _ = tx.send(result);
        });
    }

    /// Apply any finished loads to the state.
    pub fn poll_results(&mut self) {
        while let Ok(result) = self.rx.try_recv() {
            self.apply(result);
        }
    }

    fn apply(&mut self, result: Result<AggregatedStats>) {
        match result {
            Ok(stats) => {
                self.stats = LoadingState::Loaded(stats);
                self.loaded_at = Some(Local::now());
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching GitHub data");
                self.stats = LoadingState::Error(e.to_string());
            }
        }
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('R') => self.refresh(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, write_entry};
    use crate::github::GitHubClient;
    use crate::stats::CACHE_KEY;

    fn offline_app_with(store: Arc<MemoryStore>) -> App<GitHubClient> {
        // No token: loads fail fast with MissingToken and never touch the network.
        App::new(Aggregator::new(None, store, "someone"))
    }

    fn offline_app() -> App<GitHubClient> {
        offline_app_with(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = offline_app();
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = offline_app();
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_retry_surfaces_error() {
        let mut app = offline_app();
        app.handle_key(KeyCode::Char('r'));
        assert!(app.stats.is_loading());

        let result = app.rx.recv().await.unwrap();
        app.apply(result);

        match &app.stats {
            LoadingState::Error(message) => assert!(message.contains("token")),
            other => panic!("unexpected state: {:?}", other),
        }
        assert!(app.loaded_at.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cached_stats() {
        let store = Arc::new(MemoryStore::new());
        let cached = AggregatedStats {
            languages: [("Rust".to_string(), 10)].into_iter().collect(),
            ..Default::default()
        };
        write_entry(&*store, CACHE_KEY, &cached, chrono::Utc::now()).unwrap();
        let mut app = offline_app_with(store.clone());

        app.handle_key(KeyCode::Char('R'));
        let result = app.rx.recv().await.unwrap();
        app.apply(result);
        assert!(matches!(app.stats, LoadingState::Error(_)));
        assert_eq!(store.len(), 1);

        app.handle_key(KeyCode::Char('r'));
        let result = app.rx.recv().await.unwrap();
        app.apply(result);
        match &app.stats {
            LoadingState::Loaded(stats) => assert_eq!(stats, &cached),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reload_ignored_while_loading() {
        let mut app = offline_app();
        app.stats = LoadingState::Loading;
        app.reload();
        assert!(app.rx.try_recv().is_err());
    }
}
