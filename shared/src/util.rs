/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC timestamp in seconds (used for archive name prefixes)
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
