use jobscout::jobs::JobItemsView;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::ui::renderfns::{relevance_color, truncate};
use crate::ui::Screen;

/// Draw the current page of search results
pub fn draw_job_list(frame: &mut Frame, area: Rect, screen: &Screen) {
  let jobs = &screen.jobs;

  let block = Block::default()
    .title(list_title(jobs))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if jobs.is_loading || jobs.job_items_sorted_and_sliced.is_empty() {
    let content = if jobs.is_loading {
      "Loading jobs...".to_string()
    } else if let Some(error) = &jobs.error {
      format!("Error: {}\n\nPress 'r' to retry.", error)
    } else if screen.search_text().is_empty() {
      "Press '/' and type to search for jobs.".to_string()
    } else {
      "No jobs found.".to_string()
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let title_width = area.width.saturating_sub(24) as usize;
  let items: Vec<ListItem> = jobs
    .job_items_sorted_and_sliced
    .iter()
    .map(|job| {
      let marker = if screen.active_id == Some(job.id) {
        Span::styled("● ", Style::default().fg(Color::Cyan))
      } else {
        Span::raw("  ")
      };
      let line = Line::from(vec![
        marker,
        Span::styled(
          format!("{:<3}", job.badge_letters),
          Style::default()
            .fg(relevance_color(job.relevance_score))
            .bold(),
        ),
        Span::raw(" "),
        Span::raw(truncate(
          &format!("{} · {}", job.title, job.company),
          title_width.max(10),
        )),
        Span::styled(
          format!("  {}", job.date),
          Style::default().fg(Color::DarkGray),
        ),
      ]);
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(screen.selected));
  frame.render_stateful_widget(list, area, &mut state);
}

fn list_title(jobs: &JobItemsView) -> String {
  if jobs.total_number_of_pages > 1 {
    format!(
      " Jobs (page {}/{}) ",
      jobs.current_page, jobs.total_number_of_pages
    )
  } else {
    " Jobs ".to_string()
  }
}
