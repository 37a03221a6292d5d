use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::Mode;
use crate::ui::Screen;

/// Draw the search box; the cursor is shown while editing
pub fn draw_search_bar(frame: &mut Frame, area: Rect, screen: &Screen) {
  let editing = screen.mode == Mode::Search;
  let border = if editing { Color::Yellow } else { Color::DarkGray };

  let block = Block::default()
    .title(" Search ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let (before, after) = &screen.search;
  let mut spans = vec![
    Span::styled("/", Style::default().fg(Color::Yellow)),
    Span::raw(before.as_str()),
  ];
  if editing {
    spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
  }
  spans.push(Span::raw(after.as_str()));

  let paragraph = Paragraph::new(Line::from(spans)).block(block);
  frame.render_widget(paragraph, area);
}
