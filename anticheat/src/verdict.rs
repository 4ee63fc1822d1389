use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    RejectedImpossible,
    RejectedSuspiciousBehavior,
    RejectedSkillJump,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Accepted => "accepted",
            Outcome::RejectedImpossible => "rejected_impossible",
            Outcome::RejectedSuspiciousBehavior => "rejected_suspicious_behavior",
            Outcome::RejectedSkillJump => "rejected_skill_jump",
        }
    }
}

/// Wire names match what the manual-review tooling filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuspicionFlag {
    ImpossibleReactionTime,
    RoboticInputPattern,
    PerfectAccuracy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub outcome: Outcome,
    /// Confidence in [0, 1] that the session is genuine.
    pub trust_score: f64,
    pub flags: Vec<SuspicionFlag>,
    /// Present only when the violation is correctable (impossible score
    /// clamped to the plausible maximum, skill jump clamped to 2x baseline).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_score: Option<i64>,
}

impl ValidationVerdict {
    pub fn accepted(trust_score: f64) -> ValidationVerdict {
        ValidationVerdict {
            outcome: Outcome::Accepted,
            trust_score,
            flags: Vec::new(),
            corrected_score: None,
        }
    }

    pub fn impossible(corrected_score: i64) -> ValidationVerdict {
        ValidationVerdict {
            outcome: Outcome::RejectedImpossible,
            trust_score: 0.0,
            flags: Vec::new(),
            corrected_score: Some(corrected_score),
        }
    }

    pub fn suspicious(flags: Vec<SuspicionFlag>, trust_score: f64) -> ValidationVerdict {
        ValidationVerdict {
            outcome: Outcome::RejectedSuspiciousBehavior,
            trust_score,
            flags,
            corrected_score: None,
        }
    }

    pub fn skill_jump(corrected_score: i64, trust_score: f64) -> ValidationVerdict {
        ValidationVerdict {
            outcome: Outcome::RejectedSkillJump,
            trust_score,
            flags: Vec::new(),
            corrected_score: Some(corrected_score),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }
}
