use super::*;

#[test]
fn empty_stack_is_root() {
    let nav = Navigation::new();
    assert_eq!(nav.current(), RouteSegment::Root);
    assert!(nav.segments().is_empty());
    assert!(!nav.back());
}

#[test]
fn push_and_back_publish_classified_segments() {
    let nav = Navigation::new();
    let mut sub = nav.subscribe();
    nav.push(Screen::Login);
    nav.open_tab(Tab::Tracker);
    assert!(nav.back());

    let seen: Vec<_> = std::iter::from_fn(|| sub.try_recv()).collect();
    assert_eq!(
        seen,
        vec![
            RouteSegment::Root,
            RouteSegment::AuthForm(Screen::Login),
            RouteSegment::Protected(Screen::TabGroup),
            RouteSegment::AuthForm(Screen::Login),
        ]
    );
}

#[test]
fn open_tab_keeps_tab_as_second_segment() {
    let nav = Navigation::new();
    nav.open_tab(Tab::Home);
    assert_eq!(nav.segments(), vec!["(tabs)".to_owned(), "index".to_owned()]);
}

#[test]
fn replace_swaps_top_entry() {
    let nav = Navigation::new();
    nav.push(Screen::TabGroup);
    nav.push(Screen::BpLog);
    nav.replace(Screen::Login);

    assert_eq!(nav.depth(), 2);
    assert_eq!(nav.current(), RouteSegment::AuthForm(Screen::Login));
    assert!(nav.back());
    assert_eq!(nav.current(), RouteSegment::Protected(Screen::TabGroup));
}

#[test]
fn replace_on_empty_stack_pushes() {
    let nav = Navigation::new();
    nav.replace(Screen::TabGroup);
    assert_eq!(nav.depth(), 1);
    assert_eq!(nav.current(), RouteSegment::Protected(Screen::TabGroup));
}

#[test]
fn unknown_deep_link_is_other() {
    let nav = Navigation::new();
    nav.push_path("/settings/advanced");
    assert_eq!(nav.current(), RouteSegment::Other("settings".into()));
    nav.push_path("/bp-log");
    assert_eq!(nav.current(), RouteSegment::Protected(Screen::BpLog));
}
