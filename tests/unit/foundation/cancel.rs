use super::*;

#[test]
fn fresh_token_passes_checks() {
    let token = CancelToken::new();
    assert!(!token.is_cancelled());
    assert!(token.check().is_ok());
}

#[test]
fn cancel_is_seen_by_clones() {
    let token = CancelToken::new();
    let worker = token.clone();
    token.cancel();
    assert!(worker.is_cancelled());
    let err = worker.check().unwrap_err();
    assert!(matches!(err, LogoError::Render(ref m) if m == "cancelled"));
    assert!(err.is_transient());
}

#[test]
fn drop_guard_cancels_on_scope_exit() {
    let token = CancelToken::new();
    {
        let _guard = token.cancel_on_drop();
        assert!(!token.is_cancelled());
    }
    assert!(token.is_cancelled());
}
