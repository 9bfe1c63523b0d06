use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptSegment {
    pub start_s: f64,
    pub end_s: f64,
    pub text: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TranscriptValidationError {
    #[error("segment {index}: start_s ({start}) must be <= end_s ({end})")]
    BadSegmentBounds { index: usize, start: f64, end: f64 },
    #[error("segment {index}: start_s ({start}) must be >= previous end_s ({prev_end})")]
    NonMonotonicSegments {
        index: usize,
        start: f64,
        prev_end: f64,
    },
}

/// Speech-to-text transcript for one clip. Created once; a re-transcription
/// (admin-only) overwrites the previous version wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub clip_id: String,
    pub language: String,
    pub redacted: bool,
    pub full_text: String,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Verifies `0 <= start_s <= end_s` per segment and monotonicity across
    /// segments (each segment starts no earlier than the previous one ends).
    pub fn validate(&self) -> Result<(), TranscriptValidationError> {
        let mut prev_end = 0.0_f64;
        for (index, seg) in self.segments.iter().enumerate() {
            if seg.start_s > seg.end_s {
                return Err(TranscriptValidationError::BadSegmentBounds {
                    index,
                    start: seg.start_s,
                    end: seg.end_s,
                });
            }
            if index > 0 && seg.start_s < prev_end {
                return Err(TranscriptValidationError::NonMonotonicSegments {
                    index,
                    start: seg.start_s,
                    prev_end,
                });
            }
            prev_end = seg.end_s;
        }
        Ok(())
    }

    pub fn word_count(&self) -> usize {
        self.full_text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment {
            start_s: start,
            end_s: end,
            text: "x".to_string(),
        }
    }

    #[test]
    fn accepts_monotonic_segments() {
        let t = Transcript {
            clip_id: "c".to_string(),
            language: "en-US".to_string(),
            redacted: false,
            full_text: "one two three".to_string(),
            segments: vec![seg(0.0, 1.0), seg(1.0, 2.5)],
        };
        assert!(t.validate().is_ok());
        assert_eq!(t.word_count(), 3);
    }

    #[test]
    fn rejects_inverted_segment() {
        let t = Transcript {
            clip_id: "c".to_string(),
            language: "en-US".to_string(),
            redacted: false,
            full_text: String::new(),
            segments: vec![seg(2.0, 1.0)],
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn rejects_non_monotonic_segments() {
        let t = Transcript {
            clip_id: "c".to_string(),
            language: "en-US".to_string(),
            redacted: false,
            full_text: String::new(),
            segments: vec![seg(0.0, 2.0), seg(1.0, 1.5)],
        };
        assert!(t.validate().is_err());
    }
}
