// Integration cases for the callback -> refresh -> lookup flow.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::manager::{CacheError, CacheManager, RefreshOutcome};
use crate::parser::{feed_lines, CallbackMessage};
use crate::workers::Refresher;

const TABLE_CFG: &str = r#"
workercache:
  env: test
  workers:
    - { name: A, capacity: 2 }
    - { name: B, capacity: 2 }
  refresh:
    interval: 5ms
  callbacks:
    update_types: [4]
    separator: "="
  routing:
    mode: table
    table:
      user: A
      session: B
"#;

/// Two workers with capacity 2; three updates to A leave only the newest two.
#[test]
fn test_scenario_capacity_two_keeps_newest_two() {
    let cfg = Config::from_yaml_str(
        r#"
workercache:
  env: test
  workers:
    - { name: A, capacity: 2 }
    - { name: B, capacity: 2 }
  refresh:
    interval: 1s
  callbacks:
    update_types: [1]
"#,
    )
    .expect("valid config");
    let manager = CacheManager::new(&cfg);

    for (k, v) in [("A:k1", "v1"), ("A:k2", "v2"), ("A:k3", "v3")] {
        manager.handle_parsers_callback(&CallbackMessage::new(1, format!("{}\t{}", k, v)));
    }
    assert!(matches!(manager.periodic_update_caches(), RefreshOutcome::Completed(_)));

    let a = manager.key_cache("A").expect("A");
    assert_eq!(a.peek("k2"), Some("v2"));
    assert_eq!(a.peek("k3"), Some("v3"));
    assert!(!a.contains("k1"));
}

/// Table routing stores the full key; keys outside the table are dropped.
#[test]
fn test_table_routing_end_to_end() {
    let cfg = Config::from_yaml_str(TABLE_CFG).expect("valid config");
    let manager = CacheManager::new(&cfg);

    manager.handle_parsers_callback(&CallbackMessage::new(4, "user=alice"));
    manager.handle_parsers_callback(&CallbackMessage::new(4, "unknown=x"));
    manager.handle_parsers_callback(&CallbackMessage::new(4, "session=s-1"));

    match manager.periodic_update_caches() {
        RefreshOutcome::Completed(report) => {
            assert_eq!(report.applied, 2);
            assert_eq!(report.dropped, 1);
        }
        RefreshOutcome::Skipped => panic!("refresh skipped"),
    }

    assert_eq!(manager.key_cache("A").expect("A").peek("user"), Some("alice"));
    assert_eq!(manager.key_cache("B").expect("B").peek("session"), Some("s-1"));
    assert!(matches!(manager.key_cache("C"), Err(CacheError::UnknownWorker(_))));
}

/// Feed and refresher running together deliver every update.
#[tokio::test]
async fn test_feed_and_refresher_together() {
    let cfg = Config::from_yaml_str(TABLE_CFG).expect("valid config");
    let manager = Arc::new(CacheManager::new(&cfg));
    let token = CancellationToken::new();
    let refresher = Refresher::new(token.clone(), manager.clone()).start();

    let input: &[u8] = b"4\tuser=bob\n4\tsession=s-2\n7\tignored=1\n";
    let stats = feed_lines(token.clone(), manager.clone(), input).await;
    assert_eq!(stats.queued, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();
    refresher.await.expect("refresher task panicked");

    assert_eq!(manager.pending_len(), 0);
    assert_eq!(manager.key_cache("A").expect("A").peek("user"), Some("bob"));
    assert_eq!(manager.key_cache("B").expect("B").peek("session"), Some("s-2"));
}
