use jobscout::api::JobDetail;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::ui::Screen;

/// Draw the active job's details
pub fn draw_job_detail(frame: &mut Frame, area: Rect, screen: &Screen) {
  let title = match (screen.active_id, &screen.active_job) {
    (Some(id), Some(entry)) if entry.is_loading() => format!(" Job {} (loading...) ", id),
    (Some(id), _) if screen.active_bookmarked => format!(" Job {} ★ ", id),
    (Some(id), _) => format!(" Job {} ", id),
    (None, _) => " Details ".to_string(),
  };

  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let inner = block.inner(area);
  frame.render_widget(block, area);

  let Some(entry) = &screen.active_job else {
    let paragraph = Paragraph::new("Select a job and press Enter to see its details.")
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, inner);
    return;
  };

  if entry.is_loading() {
    let paragraph =
      Paragraph::new("Loading job details...").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, inner);
    return;
  }

  if let Some(error) = &entry.error {
    let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
      .style(Style::default().fg(Color::Red));
    frame.render_widget(paragraph, inner);
    return;
  }

  if let Some(job) = entry.data() {
    let paragraph = Paragraph::new(detail_lines(job)).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
  }
}

fn detail_lines(job: &JobDetail) -> Vec<Line<'_>> {
  let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::DarkGray));

  let mut lines = vec![
    Line::from(Span::styled(
      job.summary.title.as_str(),
      Style::default().fg(Color::Cyan).bold(),
    )),
    Line::from(vec![
      Span::raw(job.summary.company.as_str()),
      Span::styled(
        format!("  {}", job.summary.date),
        Style::default().fg(Color::DarkGray),
      ),
    ]),
    Line::from(vec![
      label("Duration: "),
      Span::raw(job.duration.as_str()),
      label("  Salary: "),
      Span::styled(job.salary.as_str(), Style::default().fg(Color::Green)),
      label("  Location: "),
      Span::raw(job.location.as_str()),
    ]),
    Line::default(),
    Line::from(job.description.as_str()),
  ];

  if !job.qualifications.is_empty() {
    lines.push(Line::default());
    lines.push(Line::from(label("Qualifications")));
    lines.extend(
      job
        .qualifications
        .iter()
        .map(|q| Line::from(format!("  • {}", q))),
    );
  }

  if !job.reviews.is_empty() {
    lines.push(Line::default());
    lines.push(Line::from(label("Company reviews")));
    lines.extend(job.reviews.iter().map(|r| Line::from(format!("  “{}”", r))));
  }

  if !job.company_url.is_empty() {
    lines.push(Line::default());
    lines.push(Line::from(vec![
      label("Website: "),
      Span::styled(
        job.company_url.as_str(),
        Style::default().fg(Color::Blue).underlined(),
      ),
    ]));
  }

  lines
}
