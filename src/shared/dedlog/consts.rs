pub const COMPONENT: &str = "dedlog";
/// Aggregation window; identical reasons inside it become one log line.
pub const FLUSH_INTERVAL_SECS: u64 = 5;
pub const CHANNEL_CAPACITY: usize = 1024;
