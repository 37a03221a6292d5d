use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in the search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Text was edited, here's the new value
  Changed(String),
  /// Key was handled without editing (cursor movement)
  Moved,
  /// Enter pressed
  Submitted,
  /// Escape pressed
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Single-line text input with a character cursor
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  chars: Vec<char>,
  cursor: usize,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_value(value: &str) -> Self {
    let chars: Vec<char> = value.chars().collect();
    let cursor = chars.len();
    Self { chars, cursor }
  }

  /// Get the current input value
  pub fn value(&self) -> String {
    self.chars.iter().collect()
  }

  /// Text before and after the cursor, for rendering
  pub fn split_at_cursor(&self) -> (String, String) {
    (
      self.chars[..self.cursor].iter().collect(),
      self.chars[self.cursor..].iter().collect(),
    )
  }

  /// Handle a key event, returning the result
  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter => InputResult::Submitted,
      KeyCode::Backspace => {
        if self.cursor == 0 {
          return InputResult::Moved;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        self.changed()
      }
      KeyCode::Delete => {
        if self.cursor >= self.chars.len() {
          return InputResult::Moved;
        }
        self.chars.remove(self.cursor);
        self.changed()
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        InputResult::Moved
      }
      KeyCode::Right => {
        self.cursor = (self.cursor + 1).min(self.chars.len());
        InputResult::Moved
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputResult::Moved
      }
      KeyCode::End => {
        self.cursor = self.chars.len();
        InputResult::Moved
      }
      KeyCode::Char('a') if ctrl => {
        self.cursor = 0;
        InputResult::Moved
      }
      KeyCode::Char('e') if ctrl => {
        self.cursor = self.chars.len();
        InputResult::Moved
      }
      KeyCode::Char('u') if ctrl => {
        // Clear line before cursor
        self.chars.drain(..self.cursor);
        self.cursor = 0;
        self.changed()
      }
      KeyCode::Char('w') if ctrl => {
        // Delete word before cursor
        let mut start = self.cursor;
        while start > 0 && self.chars[start - 1] == ' ' {
          start -= 1;
        }
        while start > 0 && self.chars[start - 1] != ' ' {
          start -= 1;
        }
        self.chars.drain(start..self.cursor);
        self.cursor = start;
        self.changed()
      }
      KeyCode::Char(_) if ctrl => InputResult::NotHandled,
      KeyCode::Char(c) => {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
        self.changed()
      }
      _ => InputResult::NotHandled,
    }
  }

  fn changed(&self) -> InputResult {
    InputResult::Changed(self.value())
  }
}
