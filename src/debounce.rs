//! Settle a rapidly changing value before acting on it.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

/// Propagates its input only after it has stopped changing for `delay`.
///
/// Every new input restarts the timer and intermediate values are dropped, so
/// typing `"a"`, `"ab"`, `"abc"` within the delay publishes only `"abc"`.
/// Dropping the debouncer cancels a pending timer; nothing is published
/// afterwards.
pub struct Debouncer<T> {
  input: watch::Sender<T>,
  output: watch::Receiver<T>,
  task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
  T: Clone + PartialEq + Send + Sync + 'static,
{
  /// Must be called from within a tokio runtime.
  pub fn new(initial: T, delay: Duration) -> Self {
    let (input, mut input_rx) = watch::channel(initial.clone());
    let (output_tx, output) = watch::channel(initial);

    let task = tokio::spawn(async move {
      // Outer loop: wait for the first change of a burst
      while input_rx.changed().await.is_ok() {
        loop {
          tokio::select! {
            _ = tokio::time::sleep(delay) => {
              let settled = input_rx.borrow_and_update().clone();
              output_tx.send_if_modified(|current| {
                if *current == settled {
                  false
                } else {
                  *current = settled;
                  true
                }
              });
              break;
            }
            changed = input_rx.changed() => {
              if changed.is_err() {
                return;
              }
              trace!("debounce timer restarted");
            }
          }
        }
      }
    });

    Self {
      input,
      output,
      task,
    }
  }

  /// Feed a new input value.
  pub fn set(&self, value: T) {
    self.input.send_replace(value);
  }

  /// The latest raw input.
  pub fn input(&self) -> T {
    self.input.borrow().clone()
  }

  /// The latest settled value.
  pub fn value(&self) -> T {
    self.output.borrow().clone()
  }

  /// Receiver for settled values.
  pub fn subscribe(&self) -> watch::Receiver<T> {
    self.output.clone()
  }
}

impl<T> Drop for Debouncer<T> {
  fn drop(&mut self) {
    self.task.abort();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DELAY: Duration = Duration::from_millis(500);

  #[tokio::test(start_paused = true)]
  async fn test_publishes_after_quiet_period() {
    let debouncer = Debouncer::new(String::new(), DELAY);
    debouncer.set("rust".to_string());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(debouncer.value(), "");
    assert_eq!(debouncer.input(), "rust");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(debouncer.value(), "rust");
  }

  #[tokio::test(start_paused = true)]
  async fn test_burst_publishes_only_last_value() {
    let debouncer = Debouncer::new(String::new(), DELAY);
    let mut settled = debouncer.subscribe();
    settled.borrow_and_update();

    for text in ["a", "ab", "abc"] {
      debouncer.set(text.to_string());
      tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(debouncer.value(), "");
    assert!(!settled.has_changed().unwrap());

    settled.changed().await.unwrap();
    assert_eq!(*settled.borrow_and_update(), "abc");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!settled.has_changed().unwrap());
  }

  #[tokio::test(start_paused = true)]
  async fn test_drop_cancels_pending_update() {
    let debouncer = Debouncer::new(0u32, DELAY);
    let settled = debouncer.subscribe();

    debouncer.set(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(debouncer);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(*settled.borrow(), 0);
  }
}
