use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use jobscout::api::{JobId, JobsClient, PageDirection};
use jobscout::bookmarks::Bookmarks;
use jobscout::cache::QueryClient;
use jobscout::config::Config;
use jobscout::jobs::JobItemsController;
use jobscout::location::{ActiveIdTracker, Location};
use jobscout::queries::JobQueries;
use jobscout::storage::{KeyValueStore, SqliteStore};

use crate::event::{Event, EventHandler};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::{self, BookmarksPopover, Screen};

const TICK_RATE: Duration = Duration::from_millis(250);
const TOAST_TTL: Duration = Duration::from_secs(5);

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Search,
}

/// Main application state
pub struct App {
  api_url: String,
  queries: JobQueries,
  controller: JobItemsController,
  bookmarks: Bookmarks,
  location: Location,
  active: ActiveIdTracker,

  /// Current input mode
  mode: Mode,

  /// Search box contents (after pressing /)
  search: TextInput,

  /// Highlighted row on the current page
  selected: usize,

  /// Highlighted row in the bookmarks popover, when it is open
  bookmark_selected: Option<usize>,

  /// Failures reported by the cache error hook
  toasts: mpsc::UnboundedReceiver<String>,
  toast: Option<(String, Instant)>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  /// Wire up the cache, API client and stores. Must run inside the runtime.
  pub fn new(config: &Config, search: Option<String>, job: Option<JobId>) -> Result<Self> {
    let api_url = config.api_url()?;
    let source = JobsClient::new(api_url.clone(), config.request_timeout())?;

    let client = QueryClient::new();
    let (toast_tx, toasts) = mpsc::unbounded_channel();
    client.on_error(move |key, error| {
      let _ = toast_tx.send(format!("Failed to load {}: {}", key.description(), error));
    });

    let queries = JobQueries::new(client, Arc::new(source), config.query_options());

    let storage_path = config.storage_path()?;
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(&storage_path)?);
    let bookmarks = Bookmarks::load(store, queries.clone());

    let mut controller =
      JobItemsController::new(queries.clone(), config.debounce(), config.search.page_size);
    let search = match search {
      Some(text) => {
        controller.set_search_text(text.clone());
        TextInput::with_value(&text)
      }
      None => TextInput::new(),
    };

    let location = Location::new(job.map(|id| format!("#{}", id)).unwrap_or_default());
    let active = ActiveIdTracker::new(&location);

    info!(api = %api_url, storage = %storage_path.display(), "app initialised");

    Ok(Self {
      api_url: api_url.to_string(),
      queries,
      controller,
      bookmarks,
      location,
      active,
      mode: Mode::Normal,
      search,
      selected: 0,
      bookmark_selected: None,
      toasts,
      toast: None,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    self.queries.client().shutdown();

    result
  }

  async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);
    let mut cache_changes = self.queries.client().subscribe();
    let mut settled_search = self.controller.settled_search();

    while !self.should_quit {
      let screen = self.screen();
      terminal.draw(|frame| ui::draw(frame, &screen))?;

      // Redraw on input, on cache settlement, or when typed text settles
      tokio::select! {
        event = events.next() => match event {
          Some(event) => self.handle_event(event),
          None => break,
        },
        _ = cache_changes.changed() => {}
        _ = settled_search.changed() => {}
      }
    }

    Ok(())
  }

  /// Gather the frame contents, triggering any fetches the view needs.
  fn screen(&mut self) -> Screen {
    self.drain_toasts();

    let jobs = self.controller.view();
    self.selected = self
      .selected
      .min(jobs.job_items_sorted_and_sliced.len().saturating_sub(1));

    let active_id = self.active.active_id();
    let active_job = active_id.map(|id| self.queries.job_item(id));

    let bookmarks = match self.bookmark_selected {
      Some(selected) => {
        let batch = self.bookmarks.bookmarked_job_items();
        let selected = selected.min(batch.items.len().saturating_sub(1));
        self.bookmark_selected = Some(selected);
        Some(BookmarksPopover {
          items: batch.items,
          is_loading: batch.is_loading,
          selected,
        })
      }
      None => None,
    };

    Screen {
      api_url: self.api_url.clone(),
      mode: self.mode,
      search: self.search.split_at_cursor(),
      jobs,
      selected: self.selected,
      active_id,
      active_job,
      active_bookmarked: active_id.is_some_and(|id| self.bookmarks.contains(id)),
      bookmark_count: self.bookmarks.len(),
      bookmarks,
      toast: self.toast.as_ref().map(|(message, _)| message.clone()),
    }
  }

  fn drain_toasts(&mut self) {
    while let Ok(message) = self.toasts.try_recv() {
      self.toast = Some((message, Instant::now()));
    }
    if matches!(&self.toast, Some((_, shown)) if shown.elapsed() > TOAST_TTL) {
      self.toast = None;
    }
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // Redraw picks up settled fetches and expires toasts
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.mode {
      Mode::Normal if self.bookmark_selected.is_some() => self.handle_bookmarks_key(key),
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Search => self.handle_search_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') => self.should_quit = true,

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
      KeyCode::Down | KeyCode::Char('j') => self.selected += 1,
      KeyCode::Enter => {
        if let Some(id) = self.highlighted_id() {
          self.open(id);
        }
      }
      KeyCode::Char('n') | KeyCode::Right => {
        self.controller.handle_change_page(PageDirection::Next);
        self.selected = 0;
      }
      KeyCode::Char('p') | KeyCode::Left => {
        self.controller.handle_change_page(PageDirection::Previous);
        self.selected = 0;
      }
      KeyCode::Char('s') => {
        let sort_by = self.controller.state().sort_by.toggled();
        self.controller.handle_change_sort_by(sort_by);
        self.selected = 0;
      }

      // Bookmarks
      KeyCode::Char('b') => self.toggle_bookmark(),
      KeyCode::Char('B') => self.bookmark_selected = Some(0),

      KeyCode::Char('r') => self.retry(),
      KeyCode::Char('/') => self.mode = Mode::Search,
      _ => {}
    }
  }

  fn handle_search_mode_key(&mut self, key: KeyEvent) {
    match self.search.handle_key(key) {
      InputResult::Changed(text) => {
        self.controller.set_search_text(text);
        self.selected = 0;
      }
      InputResult::Submitted | InputResult::Cancelled => self.mode = Mode::Normal,
      InputResult::Moved | InputResult::NotHandled => {}
    }
  }

  fn handle_bookmarks_key(&mut self, key: KeyEvent) {
    let Some(selected) = self.bookmark_selected else {
      return;
    };

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('B') => self.bookmark_selected = None,
      KeyCode::Up | KeyCode::Char('k') => {
        self.bookmark_selected = Some(selected.saturating_sub(1));
      }
      KeyCode::Down | KeyCode::Char('j') => self.bookmark_selected = Some(selected + 1),
      KeyCode::Char('r') => {
        self.queries.retry_failed_job_items(&self.bookmarks.ids());
        self.toast = None;
      }
      KeyCode::Enter => {
        let items = self.bookmarks.bookmarked_job_items().items;
        if let Some(job) = items.get(selected) {
          self.open(job.id());
        }
        self.bookmark_selected = None;
      }
      _ => {}
    }
  }

  fn highlighted_id(&mut self) -> Option<JobId> {
    self
      .controller
      .view()
      .job_items_sorted_and_sliced
      .get(self.selected)
      .map(|job| job.id)
  }

  /// Make `id` the active job by writing it to the location fragment.
  fn open(&self, id: JobId) {
    self.location.set_fragment(format!("#{}", id));
  }

  /// Bookmark the active job, or the highlighted one when nothing is open.
  fn toggle_bookmark(&mut self) {
    let Some(id) = self.active.active_id().or_else(|| self.highlighted_id()) else {
      return;
    };

    match self.bookmarks.toggle(id) {
      Ok(true) => info!(id, "bookmarked"),
      Ok(false) => info!(id, "bookmark removed"),
      Err(e) => {
        warn!(id, error = %e, "failed to save bookmarks");
        self.toast = Some((format!("Failed to save bookmarks: {}", e), Instant::now()));
      }
    }
  }

  /// Request failed queries again.
  fn retry(&mut self) {
    self.controller.retry();
    if let Some(id) = self.active.active_id() {
      self.queries.retry_failed_job_items(&[id]);
    }
    self.toast = None;
  }
}
