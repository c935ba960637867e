//! In-memory navigation stack.
//!
//! Each history entry is the path of one screen, split into segments. Only
//! the top entry's first segment is published, already classified as a
//! [`RouteSegment`], so observers never compare raw strings.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::events::{Broadcast, Subscription};
use crate::route::{RouteSegment, Screen, Tab, split_path};

/// Stack-replacing navigation, the only operation the route guard needs.
pub trait Navigator: Send + Sync {
    fn replace(&self, screen: Screen);
}

pub struct Navigation {
    history: Mutex<Vec<Vec<String>>>,
    segments: Broadcast<RouteSegment>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigation {
    /// Empty stack, reported as [`RouteSegment::Root`].
    #[must_use]
    pub fn new() -> Self {
        Self { history: Mutex::new(Vec::new()), segments: Broadcast::with_latest(RouteSegment::Root) }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<String>>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_top(&self, history: &[Vec<String>]) {
        let segment = history.last().map_or(RouteSegment::Root, |top| RouteSegment::classify(top.as_slice()));
        self.segments.publish(segment);
    }

    pub fn push(&self, screen: Screen) {
        self.push_segments(vec![screen.segment().to_owned()]);
    }

    /// Open a tab inside the tab group.
    pub fn open_tab(&self, tab: Tab) {
        self.push_segments(vec![Screen::TabGroup.segment().to_owned(), tab.segment().to_owned()]);
    }

    /// Push an arbitrary path such as a deep link.
    pub fn push_path(&self, path: &str) {
        self.push_segments(split_path(path));
    }

    fn push_segments(&self, entry: Vec<String>) {
        let mut history = self.lock();
        debug!(path = %entry.join("/"), "navigation push");
        history.push(entry);
        self.publish_top(&history);
    }

    /// Pop the top entry. Returns `false` when the stack was already empty.
    pub fn back(&self) -> bool {
        let mut history = self.lock();
        if history.pop().is_none() {
            return false;
        }
        self.publish_top(&history);
        true
    }

    /// Segments of the top entry.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        self.lock().last().cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn current(&self) -> RouteSegment {
        self.segments.latest().unwrap_or(RouteSegment::Root)
    }

    /// Classified top segment, starting with the current one.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<RouteSegment> {
        self.segments.subscribe()
    }
}

impl Navigator for Navigation {
    /// Swap the top entry for `screen`, or push it onto an empty stack.
    fn replace(&self, screen: Screen) {
        let mut history = self.lock();
        let entry = vec![screen.segment().to_owned()];
        match history.last_mut() {
            Some(top) => *top = entry,
            None => history.push(entry),
        }
        debug!(%screen, "navigation replace");
        self.publish_top(&history);
    }
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;
