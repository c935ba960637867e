//! Route guard: keeps the active screen consistent with the session.
//!
//! DESIGN
//! ======
//! `RouteGuard` is a small synchronous state machine. It remembers the
//! latest session status, the latest route segment and the last pair it
//! evaluated. A pair is evaluated once; re-emitting the same pair cannot
//! produce a second redirect, which rules out login/tabs redirect storms.
//!
//! `spawn_route_guard` runs that state machine in one task fed by both
//! ordered streams. Session events win ties (`biased` select), so a
//! Loading -> Authenticated -> Unauthenticated burst is applied in order
//! before the guard reacts to the segment its own redirect produced. Every
//! redirect is a `replace`.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::events::Subscription;
use crate::navigation::Navigator;
use crate::route::{RouteSegment, Screen, redirect_for};
use crate::session::{Session, SessionStatus};

#[derive(Debug, Default)]
pub struct RouteGuard {
    status: Option<SessionStatus>,
    segment: Option<RouteSegment>,
    last: Option<(SessionStatus, RouteSegment)>,
}

impl RouteGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session status; returns the redirect it calls for, if any.
    pub fn observe_session(&mut self, status: SessionStatus) -> Option<Screen> {
        self.status = Some(status);
        self.evaluate()
    }

    /// Record a route segment; returns the redirect it calls for, if any.
    pub fn observe_segment(&mut self, segment: RouteSegment) -> Option<Screen> {
        self.segment = Some(segment);
        self.evaluate()
    }

    fn evaluate(&mut self) -> Option<Screen> {
        // Nothing to decide until both streams have reported.
        let (Some(status), Some(segment)) = (self.status, self.segment.as_ref()) else {
            return None;
        };
        if self.last.as_ref().is_some_and(|(s, seg)| *s == status && seg == segment) {
            return None;
        }
        let redirect = redirect_for(status, segment);
        self.last = Some((status, segment.clone()));
        redirect
    }
}

// =============================================================================
// TASK
// =============================================================================

/// Running guard task. Dropping the handle stops it.
pub struct GuardHandle {
    task: JoinHandle<()>,
}

impl GuardHandle {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the guard on the current Tokio runtime. It runs until either
/// stream ends or the handle is dropped.
#[must_use]
pub fn spawn_route_guard(
    mut sessions: Subscription<Session>,
    mut segments: Subscription<RouteSegment>,
    navigator: Arc<dyn Navigator>,
) -> GuardHandle {
    let task = tokio::spawn(async move {
        let mut guard = RouteGuard::new();
        loop {
            let redirect = tokio::select! {
                biased;
                session = sessions.recv() => match session {
                    Some(session) => guard.observe_session(session.status()),
                    None => break,
                },
                segment = segments.recv() => match segment {
                    Some(segment) => guard.observe_segment(segment),
                    None => break,
                },
            };
            if let Some(screen) = redirect {
                info!(%screen, "route guard redirect");
                navigator.replace(screen);
            }
        }
        debug!("route guard stopped");
    });
    GuardHandle { task }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
