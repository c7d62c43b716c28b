use super::{CacheBox, Callbacks, Config, Logs, Refresh, Routing, Runtime, Worker};
use std::time::Duration;

/// Update message type used by the test configuration.
pub const TEST_UPDATE_MSGTYPE: i32 = 1;

/// Creates a new test configuration: workers `A` and `B`, capacity 2 each,
/// prefix routing on `:` and tab-separated payloads.
pub fn new_test_config() -> Config {
    Config {
        cache: CacheBox {
            env: super::TEST.to_string(),
            logs: Some(Logs {
                level: Some("debug".to_string()),
            }),
            runtime: Some(Runtime {
                shutdown_timeout: Some(Duration::from_secs(1)),
            }),
            workers: vec![
                Worker {
                    name: "A".to_string(),
                    capacity: 2,
                },
                Worker {
                    name: "B".to_string(),
                    capacity: 2,
                },
            ],
            refresh: Refresh {
                interval: Duration::from_millis(10),
            },
            callbacks: Callbacks {
                update_types: vec![TEST_UPDATE_MSGTYPE],
                separator: super::DEFAULT_PAYLOAD_SEPARATOR.to_string(),
            },
            routing: Routing::default(),
        },
    }
}
