//! Tests for session storage and route gating.
use flowboard::prelude::*;
use flowboard::session::SESSION_COOKIE;

#[test]
fn test_sign_in_sets_cookie() {
    let session = SessionStore::new();
    assert!(session.token().is_none());
    assert!(!session.has_cookie());

    session.sign_in("token-1");
    let cookie = session.cookie().unwrap();
    assert_eq!(cookie.name, SESSION_COOKIE);
    assert_eq!(cookie.value, "token-1");
    assert_eq!(session.token().as_deref(), Some("token-1"));

    session.sign_out();
    assert!(session.token().is_none());
    assert!(session.cookie().is_none());
}

#[test]
fn test_clones_share_state() {
    let session = SessionStore::from_cookie("restored");
    let clone = session.clone();
    clone.sign_out();
    assert!(!session.has_cookie());
}

#[test]
fn test_anonymous_visitors_are_sent_to_login() {
    let guard = RouteGuard::default();
    assert_eq!(guard.check("/dashboard", false), RouteDecision::Redirect("/login"));
    assert_eq!(guard.check("/workflows/3", false), RouteDecision::Redirect("/login"));
    assert_eq!(guard.check("/login", false), RouteDecision::Allow);
    assert_eq!(guard.check("/register/", false), RouteDecision::Allow);
    assert_eq!(guard.check("/", false), RouteDecision::Allow);
}

#[test]
fn test_signed_in_visitors_skip_public_pages() {
    let guard = RouteGuard::default();
    let session = SessionStore::from_cookie("t");
    assert_eq!(
        guard.check_session("/login", &session),
        RouteDecision::Redirect("/dashboard")
    );
    assert_eq!(guard.check_session("/", &session), RouteDecision::Redirect("/dashboard"));
    assert_eq!(guard.check_session("/dashboard", &session), RouteDecision::Allow);
}

#[test]
fn test_query_and_fragment_do_not_affect_gating() {
    let guard = RouteGuard::default();
    assert_eq!(guard.check("/login?next=/workflows/3", false), RouteDecision::Allow);
    assert_eq!(guard.check("/register#terms", false), RouteDecision::Allow);
    assert_eq!(guard.check("/?ref=mail", true), RouteDecision::Redirect("/dashboard"));
    assert_eq!(
        guard.check("/dashboard?tab=stats", false),
        RouteDecision::Redirect("/login")
    );
}
