use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Mode;

const NORMAL_SHORTCUTS: &[(&str, &str)] = &[
  ("/", "search"),
  ("j/k", "nav"),
  ("Enter", "open"),
  ("n/p", "page"),
  ("s", "sort"),
  ("b", "bookmark"),
  ("B", "bookmarks"),
  ("r", "retry"),
  ("q", "quit"),
];

/// Draw the footer with shortcuts, or the latest notification if there is one
pub fn draw_footer(frame: &mut Frame, area: Rect, mode: &Mode, toast: Option<&str>) {
  let line = if let Some(message) = toast {
    Line::from(vec![
      Span::styled(" ! ", Style::default().fg(Color::Black).bg(Color::Red)),
      Span::styled(format!(" {}", message), Style::default().fg(Color::Red)),
    ])
  } else {
    match mode {
      Mode::Search => Line::from(vec![
        Span::styled(" <Enter/Esc>", Style::default().fg(Color::Cyan)),
        Span::styled(" done", Style::default().fg(Color::DarkGray)),
      ]),
      Mode::Normal => {
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in NORMAL_SHORTCUTS {
          spans.push(Span::styled(format!("<{}>", key), Style::default().fg(Color::Cyan)));
          spans.push(Span::styled(
            format!(" {}  ", label),
            Style::default().fg(Color::DarkGray),
          ));
        }
        Line::from(spans)
      }
    }
  };

  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
