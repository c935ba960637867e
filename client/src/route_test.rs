use super::*;

// =============================================================================
// classify
// =============================================================================

#[test]
fn empty_stack_is_root() {
    let empty: [&str; 0] = [];
    assert_eq!(RouteSegment::classify(&empty), RouteSegment::Root);
}

#[test]
fn tab_group_and_children_are_protected() {
    assert_eq!(RouteSegment::classify(&["(tabs)"]), RouteSegment::Protected(Screen::TabGroup));
    assert_eq!(
        RouteSegment::classify(&["(tabs)", "tracker"]),
        RouteSegment::Protected(Screen::TabGroup)
    );
}

#[test]
fn modal_screens_are_protected() {
    for segment in ["bp-log", "food-log", "add-med", "symptom-log", "quiz", "pharmacy", "report", "emergency"] {
        assert!(RouteSegment::classify(&[segment]).is_protected(), "{segment}");
    }
}

#[test]
fn login_and_signup_are_auth_forms() {
    assert_eq!(RouteSegment::classify(&["login"]), RouteSegment::AuthForm(Screen::Login));
    assert_eq!(RouteSegment::classify(&["signup"]), RouteSegment::AuthForm(Screen::Signup));
}

#[test]
fn unknown_and_not_found_are_other() {
    assert_eq!(RouteSegment::classify(&["+not-found"]), RouteSegment::Other("+not-found".into()));
    assert_eq!(RouteSegment::classify(&["settings"]), RouteSegment::Other("settings".into()));
}

#[test]
fn screen_segments_round_trip() {
    for screen in Screen::ALL {
        assert_eq!(Screen::from_segment(screen.segment()), Some(screen));
    }
}

#[test]
fn split_path_drops_empty_parts() {
    assert_eq!(split_path("/(tabs)//chat/"), vec!["(tabs)".to_owned(), "chat".to_owned()]);
    assert!(split_path("/").is_empty());
}

// =============================================================================
// redirect_for
// =============================================================================

#[test]
fn loading_never_redirects() {
    for segment in [
        RouteSegment::Root,
        RouteSegment::Protected(Screen::TabGroup),
        RouteSegment::AuthForm(Screen::Login),
        RouteSegment::Other("x".into()),
    ] {
        assert_eq!(redirect_for(SessionStatus::Loading, &segment), None);
    }
}

#[test]
fn unauthenticated_on_protected_goes_to_login() {
    assert_eq!(
        redirect_for(SessionStatus::Unauthenticated, &RouteSegment::Protected(Screen::TabGroup)),
        Some(Screen::Login)
    );
    assert_eq!(
        redirect_for(SessionStatus::Unauthenticated, &RouteSegment::Protected(Screen::Report)),
        Some(Screen::Login)
    );
}

#[test]
fn unauthenticated_on_auth_entry_stays() {
    assert_eq!(redirect_for(SessionStatus::Unauthenticated, &RouteSegment::Root), None);
    assert_eq!(redirect_for(SessionStatus::Unauthenticated, &RouteSegment::AuthForm(Screen::Signup)), None);
}

#[test]
fn authenticated_on_auth_entry_goes_to_tabs() {
    for segment in [RouteSegment::Root, RouteSegment::AuthForm(Screen::Login), RouteSegment::AuthForm(Screen::Signup)] {
        assert_eq!(redirect_for(SessionStatus::Authenticated, &segment), Some(Screen::TabGroup));
    }
}

#[test]
fn authenticated_on_protected_or_other_stays() {
    assert_eq!(redirect_for(SessionStatus::Authenticated, &RouteSegment::Protected(Screen::Quiz)), None);
    assert_eq!(redirect_for(SessionStatus::Authenticated, &RouteSegment::Other("+not-found".into())), None);
}

#[test]
fn other_segments_never_redirect() {
    let other = RouteSegment::Other("+not-found".into());
    assert_eq!(redirect_for(SessionStatus::Unauthenticated, &other), None);
}
