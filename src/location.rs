//! Addressable location fragment and the active job derived from it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tracing::debug;

use crate::api::JobId;

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct LocationInner {
  fragment: Mutex<String>,
  listeners: Mutex<Vec<(u64, Listener)>>,
  next_id: AtomicU64,
}

impl LocationInner {
  fn listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
    self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Externally owned location holding a `#<id>` fragment.
///
/// Clones share the same fragment and listener list.
#[derive(Clone, Default)]
pub struct Location {
  inner: Arc<LocationInner>,
}

impl Location {
  pub fn new(fragment: impl Into<String>) -> Self {
    let location = Self::default();
    *location.inner.fragment.lock().unwrap_or_else(PoisonError::into_inner) = fragment.into();
    location
  }

  pub fn fragment(&self) -> String {
    self
      .inner
      .fragment
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Replace the fragment and notify listeners if it changed.
  pub fn set_fragment(&self, fragment: impl Into<String>) {
    let fragment = fragment.into();
    {
      let mut current = self
        .inner
        .fragment
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
      if *current == fragment {
        return;
      }
      current.clone_from(&fragment);
    }

    debug!(fragment = %fragment, "location fragment changed");
    let listeners: Vec<Listener> = self
      .inner
      .listeners()
      .iter()
      .map(|(_, l)| Arc::clone(l))
      .collect();
    for listener in listeners {
      listener(&fragment);
    }
  }

  /// Register `listener`, calling it once right away with the current fragment
  /// and then on every change until the returned [`Subscription`] is dropped.
  pub fn subscribe(&self, listener: impl Fn(&str) + Send + Sync + 'static) -> Subscription {
    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
    let listener: Listener = Arc::new(listener);
    self.inner.listeners().push((id, Arc::clone(&listener)));

    listener(&self.fragment());

    Subscription {
      location: Arc::downgrade(&self.inner),
      id,
    }
  }
}

/// Keeps a location listener registered while alive.
pub struct Subscription {
  location: Weak<LocationInner>,
  id: u64,
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(inner) = self.location.upgrade() {
      inner.listeners().retain(|(id, _)| *id != self.id);
    }
  }
}

/// Parse `#<id>` into a job id.
///
/// An empty, non-numeric or zero fragment means nothing is selected. Job ids
/// start at 1, so `#0` is never fetched.
pub fn parse_active_id(fragment: &str) -> Option<JobId> {
  fragment
    .trim()
    .trim_start_matches('#')
    .trim()
    .parse::<JobId>()
    .ok()
    .filter(|id| *id != 0)
}

/// Follows the location fragment and exposes the currently selected job.
pub struct ActiveIdTracker {
  active: watch::Receiver<Option<JobId>>,
  _subscription: Subscription,
}

impl ActiveIdTracker {
  pub fn new(location: &Location) -> Self {
    let (tx, active) = watch::channel(None);
    let subscription = location.subscribe(move |fragment| {
      let id = parse_active_id(fragment);
      tx.send_if_modified(|current| {
        if *current == id {
          false
        } else {
          *current = id;
          true
        }
      });
    });

    Self {
      active,
      _subscription: subscription,
    }
  }

  pub fn active_id(&self) -> Option<JobId> {
    *self.active.borrow()
  }

  /// Receiver that changes whenever the active id does.
  pub fn subscribe(&self) -> watch::Receiver<Option<JobId>> {
    self.active.clone()
  }
}
