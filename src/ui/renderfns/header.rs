use jobscout::api::SortBy;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::Screen;

/// Draw the header bar with logo, API host, result count, sort order and bookmarks
pub fn draw_header(frame: &mut Frame, area: Rect, screen: &Screen) {
  let domain = extract_domain(&screen.api_url);

  let sort_span = |label: &'static str, active: bool| {
    if active {
      Span::styled(label, Style::default().fg(Color::Yellow).bold())
    } else {
      Span::styled(label, Style::default().fg(Color::DarkGray))
    }
  };

  let header = Line::from(vec![
    Span::styled(" jobscout ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", domain), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} results ", screen.jobs.total_number_of_results),
      Style::default().fg(Color::White).bold(),
    ),
    Span::styled("│ ", Style::default().fg(Color::DarkGray)),
    sort_span(SortBy::Relevant.label(), screen.jobs.sort_by == SortBy::Relevant),
    Span::raw(" "),
    sort_span(SortBy::Recent.label(), screen.jobs.sort_by == SortBy::Recent),
    Span::styled(" │", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" Bookmarks ({}) ", screen.bookmark_count),
      Style::default().fg(Color::Magenta),
    ),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Extract host from the API URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
