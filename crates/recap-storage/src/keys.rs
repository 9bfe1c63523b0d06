//! The object store key-layout contract (spec §4.1). Time-partitioned keys
//! use UTC components of the associated timestamp so that prefix listing is
//! range listing.

use chrono::{DateTime, Datelike, Utc};

pub fn clip_key(clip_id: &str) -> String {
    format!("clips/{clip_id}.json")
}

pub fn audio_key(clip_id: &str) -> String {
    format!("audio/{clip_id}.wav")
}

pub fn transcript_key(clip_id: &str) -> String {
    format!("transcripts/{clip_id}.json")
}

pub fn github_context_key(clip_id: &str) -> String {
    format!("github-context/{clip_id}.json")
}

pub fn github_event_prefix_for_day(day: DateTime<Utc>) -> String {
    format!(
        "github-events/{:04}/{:02}/{:02}/",
        day.year(),
        day.month(),
        day.day()
    )
}

pub fn github_event_key(timestamp: DateTime<Utc>, epoch_ms: i64, delivery_id: &str) -> String {
    format!(
        "{}{epoch_ms}-{delivery_id}.json",
        github_event_prefix_for_day(timestamp)
    )
}

pub fn content_item_month_prefix(year: i32, month: u32) -> String {
    format!("recaps/content-items/{year:04}/{month:02}/")
}

pub fn content_item_key(created_at: DateTime<Utc>, clip_id: &str) -> String {
    format!(
        "{}{clip_id}.json",
        content_item_month_prefix(created_at.year(), created_at.month())
    )
}

pub fn run_status_key(run_id: &str) -> String {
    format!("runs/{run_id}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_item_key_uses_utc_components() {
        let created_at: DateTime<Utc> = "2025-08-29T10:00:00Z".parse().unwrap();
        assert_eq!(
            content_item_key(created_at, "abcDEF_12"),
            "recaps/content-items/2025/08/abcDEF_12.json"
        );
    }

    #[test]
    fn github_event_key_is_time_partitioned() {
        let ts: DateTime<Utc> = "2025-08-29T09:30:00Z".parse().unwrap();
        let key = github_event_key(ts, ts.timestamp_millis(), "abc123");
        assert!(key.starts_with("github-events/2025/08/29/"));
        assert!(key.ends_with("-abc123.json"));
    }
}
