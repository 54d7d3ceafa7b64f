//! Time helpers
//!
//! All rows carry epoch millis timestamps; repositories only ever see `i64`.

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
