pub mod components;
mod renderfns;
mod views;

use jobscout::api::{JobDetail, JobId};
use jobscout::cache::CacheEntry;
use jobscout::jobs::JobItemsView;
use ratatui::prelude::*;
use std::sync::Arc;

use crate::app::Mode;

/// Everything one frame needs, gathered by the app before drawing
pub struct Screen {
  pub api_url: String,
  pub mode: Mode,
  /// Search text split at the cursor
  pub search: (String, String),
  pub jobs: JobItemsView,
  /// Highlighted row on the current page
  pub selected: usize,
  pub active_id: Option<JobId>,
  pub active_job: Option<CacheEntry<JobDetail>>,
  pub active_bookmarked: bool,
  pub bookmark_count: usize,
  pub bookmarks: Option<BookmarksPopover>,
  pub toast: Option<String>,
}

impl Screen {
  pub fn search_text(&self) -> String {
    format!("{}{}", self.search.0, self.search.1)
  }
}

pub struct BookmarksPopover {
  pub items: Vec<Arc<JobDetail>>,
  pub is_loading: bool,
  pub selected: usize,
}

/// Main draw function
pub fn draw(frame: &mut Frame, screen: &Screen) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Length(3), // Search
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], screen);
  views::draw_search_bar(frame, chunks[1], screen);

  let body = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(chunks[2]);

  views::draw_job_list(frame, body[0], screen);
  views::draw_job_detail(frame, body[1], screen);

  if let Some(popover) = &screen.bookmarks {
    views::draw_bookmarks(frame, chunks[2], popover);
  }

  components::draw_footer(frame, chunks[3], &screen.mode, screen.toast.as_deref());
}
