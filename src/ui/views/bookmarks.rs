use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

use crate::ui::renderfns::{centered_rect, truncate};
use crate::ui::BookmarksPopover;

/// Draw the bookmarks popover over the content area
pub fn draw_bookmarks(frame: &mut Frame, area: Rect, popover: &BookmarksPopover) {
  let height = popover.items.len().clamp(1, 12) as u16 + 2;
  let overlay = centered_rect(60, height, area);
  frame.render_widget(Clear, overlay);

  let title = if popover.is_loading {
    " Bookmarks (loading...) "
  } else {
    " Bookmarks "
  };
  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Magenta));

  if popover.items.is_empty() {
    let content = if popover.is_loading {
      "Loading..."
    } else {
      "No bookmarks yet. Press 'b' on a job to add one."
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, overlay);
    return;
  }

  let width = overlay.width.saturating_sub(8) as usize;
  let items: Vec<ListItem> = popover
    .items
    .iter()
    .map(|job| {
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{:<3}", job.summary.badge_letters),
          Style::default().fg(Color::Magenta).bold(),
        ),
        Span::raw(" "),
        Span::raw(truncate(
          &format!("{} · {}", job.summary.title, job.summary.company),
          width,
        )),
      ]))
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray).bold())
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(popover.selected));
  frame.render_stateful_widget(list, overlay, &mut state);
}
