//! Weighted scoring and top-N selection over scored candidates.

use chrono::{DateTime, Utc};

const DEV_SIGNAL_TOKENS: &[&str] = &["test pass", "commit", "fix", "deploy"];
const DEV_SIGNAL_BONUS: f64 = 0.1;

const MAX_DURATION_SECONDS: f64 = 600.0;
const MAX_VIEW_COUNT: f64 = 1000.0;
const MAX_TRANSCRIPT_WORDS: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub content_score: f64,
    pub github_confidence: f64,
    pub views: f64,
    pub transcript_length: f64,
    pub duration: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            content_score: 0.40,
            github_confidence: 0.25,
            views: 0.15,
            transcript_length: 0.10,
            duration: 0.10,
        }
    }
}

impl ScoreWeights {
    /// Weights must sum to 1.0 within floating-point tolerance.
    pub fn validate(&self) -> Result<(), String> {
        let sum = self.content_score + self.github_confidence + self.views + self.transcript_length + self.duration;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("score weights must sum to 1.0, got {sum}"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScoreInput<'a> {
    /// Already normalized to `[0, 1]` by the AI scoring stage.
    pub content_score: f64,
    pub github_confidence: f64,
    pub views: u64,
    pub transcript_words: usize,
    pub duration_seconds: u32,
    pub transcript_sample: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<T> {
    pub item: T,
    pub score: f64,
}

pub struct Scorer {
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new(weights: ScoreWeights) -> Result<Self, String> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Weighted sum of the five normalized components, clamped to `[0, 1]`
    /// before weighting, plus a dev-signal bonus of up to `+0.1` when the
    /// transcript mentions development activity.
    pub fn score(&self, input: &ScoreInput) -> f64 {
        let content = input.content_score.clamp(0.0, 1.0);
        let github = input.github_confidence.clamp(0.0, 1.0);
        let views = (input.views as f64 / MAX_VIEW_COUNT).clamp(0.0, 1.0);
        let words = (input.transcript_words as f64 / MAX_TRANSCRIPT_WORDS).clamp(0.0, 1.0);
        let duration = (input.duration_seconds as f64 / MAX_DURATION_SECONDS).clamp(0.0, 1.0);

        let base = content * self.weights.content_score
            + github * self.weights.github_confidence
            + views * self.weights.views
            + words * self.weights.transcript_length
            + duration * self.weights.duration;

        let bonus = dev_signal_bonus(input.transcript_sample);
        (base + bonus).clamp(0.0, 1.0)
    }
}

fn dev_signal_bonus(transcript_sample: Option<&str>) -> f64 {
    let Some(text) = transcript_sample else {
        return 0.0;
    };
    let lower = text.to_lowercase();
    let hits = DEV_SIGNAL_TOKENS.iter().filter(|token| lower.contains(*token)).count();
    if hits == 0 {
        return 0.0;
    }
    (hits as f64 * 0.025).min(DEV_SIGNAL_BONUS)
}

/// Stable-sorts descending by score, ties broken by `created_at` ascending,
/// and takes the top `clamp(|candidates|, 5, 12)`.
pub fn select_top<T: Clone>(
    mut candidates: Vec<ScoredCandidate<T>>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<ScoredCandidate<T>> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| created_at(&a.item).cmp(&created_at(&b.item)))
    });
    let n = candidates.len().clamp(5, 12).min(candidates.len());
    candidates.truncate(n);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!(ScoreWeights::default().validate().is_ok());
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let weights = ScoreWeights {
            content_score: 0.5,
            ..ScoreWeights::default()
        };
        assert!(Scorer::new(weights).is_err());
    }

    #[test]
    fn weighted_sum_matches_formula() {
        let scorer = Scorer::new(ScoreWeights::default()).unwrap();
        let input = ScoreInput {
            content_score: 0.8,
            github_confidence: 0.75,
            views: 500,
            transcript_words: 100,
            duration_seconds: 120,
            transcript_sample: None,
        };
        let expected = 0.8 * 0.40 + 0.75 * 0.25 + 0.5 * 0.15 + 0.5 * 0.10 + 0.2 * 0.10;
        assert!((scorer.score(&input) - expected).abs() < 1e-9);
    }

    #[test]
    fn dev_signal_tokens_add_bonus() {
        let scorer = Scorer::new(ScoreWeights::default()).unwrap();
        let base_input = ScoreInput {
            content_score: 0.0,
            github_confidence: 0.0,
            views: 0,
            transcript_words: 0,
            duration_seconds: 0,
            transcript_sample: None,
        };
        let with_signal = ScoreInput {
            transcript_sample: Some("we shipped the fix and will deploy after tests pass"),
            ..base_input
        };
        assert!(scorer.score(&with_signal) > scorer.score(&base_input));
    }

    #[test]
    fn select_top_clamps_between_five_and_twelve() {
        let now = Utc::now();
        let candidates: Vec<ScoredCandidate<u32>> = (0..20)
            .map(|i| ScoredCandidate { item: i, score: i as f64 })
            .collect();
        let selected = select_top(candidates, |_| now);
        assert_eq!(selected.len(), 12);
        assert_eq!(selected[0].item, 19);
    }

    #[test]
    fn select_top_keeps_all_when_fewer_than_five() {
        let now = Utc::now();
        let candidates = vec![
            ScoredCandidate { item: 1u32, score: 0.1 },
            ScoredCandidate { item: 2u32, score: 0.2 },
        ];
        let selected = select_top(candidates, |_| now);
        assert_eq!(selected.len(), 2);
    }
}
