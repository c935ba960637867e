//! Typed routes and the redirect rule.
//!
//! SYSTEM CONTEXT
//! ==============
//! Raw path segments are classified once, at the navigation boundary, into a
//! `RouteSegment`. The guard and the CLI only ever see the typed variant, so
//! "is this screen protected?" is a match, not a string comparison.

use std::fmt;

use crate::session::SessionStatus;

// =============================================================================
// SCREENS
// =============================================================================

/// Navigable top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// The main tab group, `(tabs)`.
    TabGroup,
    Login,
    Signup,
    BpLog,
    FoodLog,
    AddMedication,
    SymptomLog,
    Quiz,
    Pharmacy,
    Report,
    Emergency,
    Profile,
    SodiumGame,
    NotFound,
}

impl Screen {
    pub const ALL: [Self; 14] = [
        Self::TabGroup,
        Self::Login,
        Self::Signup,
        Self::BpLog,
        Self::FoodLog,
        Self::AddMedication,
        Self::SymptomLog,
        Self::Quiz,
        Self::Pharmacy,
        Self::Report,
        Self::Emergency,
        Self::Profile,
        Self::SodiumGame,
        Self::NotFound,
    ];

    /// Top-level path segment for this screen.
    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Self::TabGroup => "(tabs)",
            Self::Login => "login",
            Self::Signup => "signup",
            Self::BpLog => "bp-log",
            Self::FoodLog => "food-log",
            Self::AddMedication => "add-med",
            Self::SymptomLog => "symptom-log",
            Self::Quiz => "quiz",
            Self::Pharmacy => "pharmacy",
            Self::Report => "report",
            Self::Emergency => "emergency",
            Self::Profile => "profile",
            Self::SodiumGame => "sodium-game",
            Self::NotFound => "+not-found",
        }
    }

    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.segment() == segment)
    }

    /// Reachable only by a signed-in user: the tab group and every modal
    /// opened from it.
    #[must_use]
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login | Self::Signup | Self::NotFound)
    }

    #[must_use]
    pub fn is_auth_form(self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Tabs inside the `(tabs)` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Home,
    Tracker,
    Medications,
    Learn,
    Journal,
    Chat,
}

impl Tab {
    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Self::Home => "index",
            Self::Tracker => "tracker",
            Self::Medications => "medications",
            Self::Learn => "learn",
            Self::Journal => "journal",
            Self::Chat => "chat",
        }
    }
}

// =============================================================================
// ROUTE SEGMENT
// =============================================================================

/// Classified top segment of the navigation stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteSegment {
    /// Empty stack.
    Root,
    Protected(Screen),
    AuthForm(Screen),
    Other(String),
}

impl RouteSegment {
    /// Classify a path, given as its segments. Only the first one matters.
    #[must_use]
    pub fn classify<S: AsRef<str>>(segments: &[S]) -> Self {
        let Some(first) = segments.first().map(AsRef::as_ref) else {
            return Self::Root;
        };
        match Screen::from_segment(first) {
            Some(screen) if screen.is_auth_form() => Self::AuthForm(screen),
            Some(screen) if screen.is_protected() => Self::Protected(screen),
            _ => Self::Other(first.to_owned()),
        }
    }

    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected(_))
    }

    /// `login`, `signup`, or the empty stack.
    #[must_use]
    pub fn is_auth_entry(&self) -> bool {
        matches!(self, Self::Root | Self::AuthForm(_))
    }
}

impl From<Screen> for RouteSegment {
    fn from(screen: Screen) -> Self {
        Self::classify(&[screen.segment()])
    }
}

/// Split `/bp-log/details` into `["bp-log", "details"]`.
#[must_use]
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

// =============================================================================
// REDIRECT RULE
// =============================================================================

/// Where the guard must send the user, if anywhere.
///
/// The unauthenticated check runs first, so an inconsistent pair resolves
/// toward the login screen.
#[must_use]
pub fn redirect_for(status: SessionStatus, segment: &RouteSegment) -> Option<Screen> {
    match status {
        SessionStatus::Loading => None,
        SessionStatus::Unauthenticated if segment.is_protected() => Some(Screen::Login),
        SessionStatus::Authenticated if segment.is_auth_entry() => Some(Screen::TabGroup),
        _ => None,
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
