//! Best-effort "current screen" and "current user" inference
//!
//! Both scan the retained window from newest to oldest. Once the event
//! that set the value has been evicted, the answer falls back to the
//! default.

use crate::event::{Category, LogEvent, ANONYMOUS_USER};
use crate::store::Snapshot;

pub const UNKNOWN_SCREEN: &str = "Unknown";
pub const ANONYMOUS: &str = "Anonymous";

const USER_DETAIL_KEYS: [&str; 3] = ["user", "userId", "user_id"];

fn navigation_target(event: &LogEvent) -> Option<String> {
    if let Some(to) = event.detail_text("to") {
        return Some(to);
    }
    let is_tab_event = event.event.contains("Tab selected") || event.details.contains_key("tab");
    if is_tab_event {
        let tab = event.detail_text("tab").unwrap_or_else(|| UNKNOWN_SCREEN.to_string());
        return Some(format!("Tab: {}", tab));
    }
    None
}

fn appeared_view(event: &LogEvent) -> Option<String> {
    let (view, _) = event.event.split_once("appeared")?;
    let view = view.trim().trim_end_matches(|c: char| !c.is_alphanumeric());
    (!view.is_empty()).then(|| view.to_string())
}

/// Screen the user is most likely looking at
pub fn current_screen(snapshot: &Snapshot) -> String {
    snapshot
        .newest_first()
        .filter(|e| e.category == Category::Navigation)
        .find_map(|e| navigation_target(e))
        .or_else(|| {
            snapshot
                .newest_first()
                .filter(|e| e.category == Category::Ui)
                .find_map(|e| appeared_view(e))
        })
        .unwrap_or_else(|| UNKNOWN_SCREEN.to_string())
}

/// User named by the most recent authentication event
pub fn current_user(snapshot: &Snapshot) -> String {
    snapshot
        .newest_first()
        .filter(|e| e.category == Category::Auth)
        .find_map(|e| {
            USER_DETAIL_KEYS
                .iter()
                .find_map(|key| e.detail_text(key))
                .or_else(|| (e.user_id != ANONYMOUS_USER).then(|| e.user_id.clone()))
        })
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PendingEvent;
    use crate::store::LogStore;

    fn navigation(to: &str) -> PendingEvent {
        PendingEvent::new(Category::Navigation, "Screen changed").with_detail("to", to)
    }

    #[test]
    fn test_defaults_on_empty_store() {
        let snapshot = Snapshot::default();
        assert_eq!(current_screen(&snapshot), "Unknown");
        assert_eq!(current_user(&snapshot), "Anonymous");
    }

    #[test]
    fn test_latest_navigation_wins() {
        let store = LogStore::new(10).unwrap();
        store.append(navigation("Feed"));
        store.append(navigation("Profile"));
        store.append(PendingEvent::new(Category::Ui, "Button tapped"));
        assert_eq!(current_screen(&store.snapshot()), "Profile");
    }

    #[test]
    fn test_tab_selection() {
        let store = LogStore::new(10).unwrap();
        store.append(
            PendingEvent::new(Category::Navigation, "Tab selected").with_detail("tab", "Courses"),
        );
        assert_eq!(current_screen(&store.snapshot()), "Tab: Courses");
    }

    #[test]
    fn test_ui_appeared_fallback() {
        let store = LogStore::new(10).unwrap();
        store.append(PendingEvent::new(Category::Ui, "SettingsView appeared"));
        store.append(PendingEvent::new(Category::Ui, "Toggle changed"));
        assert_eq!(current_screen(&store.snapshot()), "SettingsView");
    }

    #[test]
    fn test_navigation_preferred_over_newer_ui() {
        let store = LogStore::new(10).unwrap();
        store.append(navigation("Settings"));
        store.append(PendingEvent::new(Category::Ui, "FeedView appeared"));
        assert_eq!(current_screen(&store.snapshot()), "Settings");
    }

    #[test]
    fn test_current_user_from_auth_details() {
        let store = LogStore::new(10).unwrap();
        store.append(
            PendingEvent::new(Category::Auth, "Login succeeded")
                .with_detail("user", "alice@example.com"),
        );
        store.append(PendingEvent::new(Category::Auth, "Token refreshed"));
        assert_eq!(current_user(&store.snapshot()), "alice@example.com");
    }

    #[test]
    fn test_current_user_from_event_identifier() {
        let store = LogStore::new(10).unwrap();
        let mut login = PendingEvent::new(Category::Auth, "Login succeeded");
        login.user_id = "u-42".to_string();
        store.append(login);
        assert_eq!(current_user(&store.snapshot()), "u-42");
    }

    #[test]
    fn test_evicted_screen_falls_back() {
        let store = LogStore::new(1).unwrap();
        store.append(navigation("Feed"));
        store.append(PendingEvent::new(Category::Data, "Cache loaded"));
        assert_eq!(current_screen(&store.snapshot()), "Unknown");
    }
}
