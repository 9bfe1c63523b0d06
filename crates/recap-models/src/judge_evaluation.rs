use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JudgeAxes {
    pub coherence: f64,
    pub correctness: f64,
    pub dev_signal: f64,
    pub narrative_flow: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_axis_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_axis_b: Option<f64>,
}

impl JudgeAxes {
    /// Clamps every present axis into `[0,100]`.
    pub fn clamped(&self) -> Self {
        let c = |v: f64| v.clamp(0.0, 100.0);
        Self {
            coherence: c(self.coherence),
            correctness: c(self.correctness),
            dev_signal: c(self.dev_signal),
            narrative_flow: c(self.narrative_flow),
            sub_axis_a: self.sub_axis_a.map(c),
            sub_axis_b: self.sub_axis_b.map(c),
        }
    }

    pub fn required_axes(&self) -> [f64; 4] {
        [
            self.coherence,
            self.correctness,
            self.dev_signal,
            self.narrative_flow,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JudgeEvaluation {
    pub overall: f64,
    pub per_axis: JudgeAxes,
    pub reasoning: String,
    pub recommendations: Vec<String>,
    pub version: u32,
}

impl JudgeEvaluation {
    pub const CURRENT_VERSION: u32 = 1;

    /// A well-formed neutral-default evaluation for when the AI response
    /// could not be parsed: all axes at 50, overall at 50, with a
    /// manual-review recommendation.
    pub fn neutral_default() -> Self {
        Self {
            overall: 50.0,
            per_axis: JudgeAxes {
                coherence: 50.0,
                correctness: 50.0,
                dev_signal: 50.0,
                narrative_flow: 50.0,
                sub_axis_a: None,
                sub_axis_b: None,
            },
            reasoning: "judge response could not be parsed; using neutral default".to_string(),
            recommendations: vec!["review manually".to_string()],
            version: Self::CURRENT_VERSION,
        }
    }

    /// `meetsThreshold`: approved iff overall >= judge_overall_min and every
    /// required axis >= judge_axis_min. Returns the list of axes (or
    /// "overall") that failed, for the check-run body.
    pub fn meets_threshold(&self, overall_min: f64, axis_min: f64) -> (bool, Vec<String>) {
        let mut reasons = Vec::new();
        if self.overall < overall_min {
            reasons.push(format!("overall {:.1} < {:.1}", self.overall, overall_min));
        }
        let axes = [
            ("coherence", self.per_axis.coherence),
            ("correctness", self.per_axis.correctness),
            ("dev_signal", self.per_axis.dev_signal),
            ("narrative_flow", self.per_axis.narrative_flow),
        ];
        for (name, score) in axes {
            if score < axis_min {
                reasons.push(format!("{name} {score:.1} < {axis_min:.1}"));
            }
        }
        (reasons.is_empty(), reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approved_when_all_axes_clear_threshold() {
        let eval = JudgeEvaluation {
            overall: 90.0,
            per_axis: JudgeAxes {
                coherence: 80.0,
                correctness: 80.0,
                dev_signal: 80.0,
                narrative_flow: 80.0,
                sub_axis_a: None,
                sub_axis_b: None,
            },
            reasoning: "good".to_string(),
            recommendations: vec![],
            version: 1,
        };
        let (approved, reasons) = eval.meets_threshold(80.0, 60.0);
        assert!(approved);
        assert!(reasons.is_empty());
    }

    #[test]
    fn rejected_when_overall_just_under() {
        let eval = JudgeEvaluation {
            overall: 79.0,
            per_axis: JudgeAxes {
                coherence: 80.0,
                correctness: 80.0,
                dev_signal: 80.0,
                narrative_flow: 80.0,
                sub_axis_a: None,
                sub_axis_b: None,
            },
            reasoning: String::new(),
            recommendations: vec![],
            version: 1,
        };
        let (approved, reasons) = eval.meets_threshold(80.0, 60.0);
        assert!(!approved);
        assert_eq!(reasons.len(), 1);
    }

    #[test]
    fn clamps_out_of_range_axes() {
        let axes = JudgeAxes {
            coherence: 150.0,
            correctness: -10.0,
            dev_signal: 50.0,
            narrative_flow: 50.0,
            sub_axis_a: Some(200.0),
            sub_axis_b: None,
        };
        let clamped = axes.clamped();
        assert_eq!(clamped.coherence, 100.0);
        assert_eq!(clamped.correctness, 0.0);
        assert_eq!(clamped.sub_axis_a, Some(100.0));
    }
}
