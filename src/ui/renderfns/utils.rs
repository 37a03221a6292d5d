use ratatui::prelude::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for a relevance score in 0.0..=1.0
pub fn relevance_color(score: f64) -> Color {
  if score >= 0.8 {
    Color::Green
  } else if score >= 0.5 {
    Color::Yellow
  } else {
    Color::White
  }
}

/// Rect of `percent_x` x `height` centered in `area`
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
  let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
  let width = width.max(20).min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Développeur Rust", 8), "Déve...");
  }

  #[test]
  fn test_relevance_color() {
    assert_eq!(relevance_color(0.95), Color::Green);
    assert_eq!(relevance_color(0.6), Color::Yellow);
    assert_eq!(relevance_color(0.1), Color::White);
  }

  #[test]
  fn test_centered_rect_fits_area() {
    let area = Rect::new(0, 0, 100, 40);
    let rect = centered_rect(60, 10, area);
    assert_eq!(rect, Rect::new(20, 15, 60, 10));

    let tiny = Rect::new(0, 0, 10, 4);
    let rect = centered_rect(60, 10, tiny);
    assert!(rect.width <= tiny.width && rect.height <= tiny.height);
  }
}
