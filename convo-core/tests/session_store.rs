use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use convo_core::config::SessionConfig;
use convo_core::session::{ContextEntry, ManualClock, Role, SessionStore};

fn session_config(max_history: usize, timeout_secs: u64, context_window: usize) -> SessionConfig {
    SessionConfig {
        max_history,
        session_timeout_secs: timeout_secs,
        context_window,
        reap_interval_secs: 0,
    }
}

fn contents(store: &SessionStore, key: &str) -> Vec<String> {
    store.history(key).into_iter().map(|m| m.content).collect()
}

#[test]
fn test_history_length_is_min_of_adds_and_cap() {
    for cap in [1usize, 3, 20] {
        for adds in [0usize, 1, cap, cap + 7] {
            let store = SessionStore::new(session_config(cap, 3600, 10));
            for i in 0..adds {
                store.add_message("s", Role::User, format!("m{}", i));
            }

            let expected: Vec<String> = (adds.saturating_sub(cap)..adds)
                .map(|i| format!("m{}", i))
                .collect();
            assert_eq!(contents(&store, "s"), expected, "cap={} adds={}", cap, adds);
        }
    }
}

#[test]
fn test_context_is_suffix_of_history() {
    let store = SessionStore::new(session_config(8, 3600, 10));
    for i in 0..12 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        store.add_message("s", role, format!("m{}", i));
    }

    let history = store.history("s");
    for window in 0..12 {
        let context = store.context("s", window);
        let take = window.min(history.len());
        let expected: Vec<ContextEntry> = history[history.len() - take..]
            .iter()
            .map(|m| ContextEntry::new(m.role, m.content.clone()))
            .collect();
        assert_eq!(context, expected, "window={}", window);
    }
}

#[test]
fn test_expired_session_absent_after_next_operation() {
    let clock = ManualClock::new(Utc::now());
    let store = SessionStore::with_clock(session_config(20, 1, 10), Arc::new(clock.clone()));
    store.add_message("expiring", Role::User, "hello");
    assert_eq!(store.list_active_sessions(), vec!["expiring".to_string()]);

    clock.advance(Duration::from_secs(2));

    assert!(!store
        .list_active_sessions()
        .contains(&"expiring".to_string()));
    assert!(store.history("expiring").is_empty());
    assert!(store.context("expiring", 10).is_empty());
}

#[test]
fn test_clear_is_idempotent() {
    let store = SessionStore::default();
    store.clear_session("never-existed");
    assert!(store.history("never-existed").is_empty());

    store.add_message("s", Role::User, "hello");
    store.clear_session("s");
    store.clear_session("s");
    assert!(store.history("s").is_empty());
}

#[test]
fn test_concurrent_adds_respect_cap_and_isolation() {
    let store = SessionStore::new(session_config(50, 3600, 10));
    let threads = 8;
    let per_thread = 200;

    std::thread::scope(|scope| {
        for t in 0..threads {
            let store = &store;
            scope.spawn(move || {
                let own = format!("session-{}", t);
                for i in 0..per_thread {
                    store.add_message(&own, Role::User, format!("{}-{}", t, i));
                    store.add_message("shared", Role::User, format!("{}-{}", t, i));
                    let _ = store.context(&own, 10);
                    let _ = store.list_active_sessions();
                }
            });
        }
    });

    let active: HashSet<String> = store.list_active_sessions().into_iter().collect();
    assert_eq!(active.len(), threads + 1);
    assert_eq!(store.history("shared").len(), 50);

    for t in 0..threads {
        let own = format!("session-{}", t);
        let expected: Vec<String> = (per_thread - 50..per_thread)
            .map(|i| format!("{}-{}", t, i))
            .collect();
        assert_eq!(contents(&store, &own), expected);
    }
}

#[test]
fn test_new_sessions_survive_concurrent_reaping() {
    let clock = ManualClock::new(Utc::now());
    let store = SessionStore::with_clock(session_config(20, 10, 10), Arc::new(clock.clone()));
    for i in 0..100 {
        store.add_message(&format!("stale-{}", i), Role::User, "old");
    }
    clock.advance(Duration::from_secs(30));

    std::thread::scope(|scope| {
        let store = &store;
        scope.spawn(move || {
            for i in 0..100 {
                store.add_message(&format!("fresh-{}", i), Role::User, "new");
            }
        });
        scope.spawn(move || {
            for _ in 0..100 {
                store.reap_expired();
                let _ = store.list_active_sessions();
            }
        });
    });

    let active = store.list_active_sessions();
    assert_eq!(active.len(), 100);
    assert!(active.iter().all(|key| key.starts_with("fresh-")));
}
