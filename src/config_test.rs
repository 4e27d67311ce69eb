use super::*;

/// # Safety
/// Env mutation is process-wide; every env test lives in this single
/// function so they cannot race each other.
unsafe fn clear_sheet_env() {
    unsafe {
        std::env::remove_var("SHEET_USER_NAME");
        std::env::remove_var("SHEET_DOCUMENT");
        std::env::remove_var("SHEET_SERVER");
        std::env::remove_var("SHEET_POLL_INTERVAL_MS");
        std::env::remove_var("SHEET_CHAT_URL");
        std::env::remove_var("SHEET_CHAT_POLL_MS");
        std::env::remove_var("SHEET_LOCATION");
    }
}

#[test]
fn from_env_defaults_then_overrides() {
    unsafe { clear_sheet_env() };

    let cfg = ClientConfig::from_env();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.poll_interval, Duration::from_millis(50));
    assert_eq!(cfg.location, "http://localhost:3000/untitled");
    assert!(cfg.chat_url.is_none());

    unsafe {
        std::env::set_var("SHEET_USER_NAME", "alice");
        std::env::set_var("SHEET_DOCUMENT", "budget");
        std::env::set_var("SHEET_SERVER", "renderhost");
        std::env::set_var("SHEET_POLL_INTERVAL_MS", "20");
        std::env::set_var("SHEET_CHAT_URL", "http://relay.test/");
        std::env::set_var("SHEET_CHAT_POLL_MS", "not-a-number");
    }

    let cfg = ClientConfig::from_env();
    assert_eq!(cfg.user_name, "alice");
    assert_eq!(cfg.document_name, "budget");
    assert_eq!(cfg.server, "renderhost");
    assert_eq!(cfg.poll_interval, Duration::from_millis(20));
    assert_eq!(cfg.chat_url.as_deref(), Some("http://relay.test"));
    assert_eq!(cfg.chat_poll_interval, Duration::from_millis(DEFAULT_CHAT_POLL_MS));
    assert_eq!(cfg.location, "http://localhost:3000/budget");

    unsafe { clear_sheet_env() };
}

#[test]
fn default_location_appends_document() {
    assert_eq!(default_location("q3"), "http://localhost:3000/q3");
}
