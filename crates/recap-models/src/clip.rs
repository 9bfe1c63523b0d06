use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque clip identifier: 1-50 chars of `[A-Za-z0-9_-]`.
pub fn is_valid_clip_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 50
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Immutable highlight clip fetched from the upstream broadcast catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub clip_id: String,
    pub title: String,
    pub url: String,
    pub embed_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: u32,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub broadcaster: String,
    pub creator: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClipValidationError {
    #[error("invalid clip_id: {0}")]
    InvalidClipId(String),
    #[error("duration_seconds out of range (0..=3600): {0}")]
    DurationOutOfRange(u32),
}

impl Clip {
    /// Validates the structural invariants listed in the data model: clip_id
    /// shape and the duration bound. View counts have no upper bound.
    pub fn validate(&self) -> Result<(), ClipValidationError> {
        if !is_valid_clip_id(&self.clip_id) {
            return Err(ClipValidationError::InvalidClipId(self.clip_id.clone()));
        }
        if self.duration_seconds > 3600 {
            return Err(ClipValidationError::DurationOutOfRange(self.duration_seconds));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Clip {
        Clip {
            clip_id: "abcDEF_12".to_string(),
            title: "Nice save".to_string(),
            url: "https://clips.example/abcDEF_12".to_string(),
            embed_url: "https://clips.example/embed/abcDEF_12".to_string(),
            thumbnail_url: "https://clips.example/thumb/abcDEF_12.jpg".to_string(),
            duration_seconds: 42,
            view_count: 10,
            created_at: "2025-08-29T10:00:00Z".parse().unwrap(),
            broadcaster: "broadcaster".to_string(),
            creator: "creator".to_string(),
        }
    }

    #[test]
    fn valid_clip_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_bad_clip_id() {
        let mut c = sample();
        c.clip_id = "has a space".to_string();
        assert_eq!(
            c.validate(),
            Err(ClipValidationError::InvalidClipId(c.clip_id.clone()))
        );
    }

    #[test]
    fn rejects_empty_clip_id() {
        let mut c = sample();
        c.clip_id = String::new();
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_duration_over_bound() {
        let mut c = sample();
        c.duration_seconds = 3601;
        assert!(c.validate().is_err());
    }

    #[test]
    fn accepts_duration_at_bound() {
        let mut c = sample();
        c.duration_seconds = 3600;
        assert!(c.validate().is_ok());
    }
}
