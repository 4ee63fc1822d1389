use crate::behavior::InputStats;
use crate::session::{PlayerBaseline, PlaySession};
use crate::verdict::{SuspicionFlag, ValidationVerdict};

/// Scoring rate of the game itself: 10 points per survived second plus 10
/// per apple. A submission above this bound cannot have been played.
pub const PER_SECOND_CAP: i64 = 10;
pub const PER_APPLE_BONUS: i64 = 10;

pub const MIN_REACTION_TIME_MS: f64 = 50.0;
pub const MIN_INPUT_VARIATION: f64 = 0.05;
pub const MAX_ACCURACY: f64 = 0.98;
pub const MAX_SKILL_JUMP: f64 = 3.0;

const REACTION_TIME_PENALTY: f64 = 0.5;
const ROBOTIC_PATTERN_PENALTY: f64 = 0.3;
const PERFECT_ACCURACY_PENALTY: f64 = 0.4;

/// Maximum score achievable in `duration_ms` with `apples_eaten` pickups.
/// Non-positive durations bound at 0: nothing can be scored in no time.
pub fn max_plausible_score(session: &PlaySession) -> i64 {
    if session.duration_ms <= 0 {
        return 0;
    }
    (session.duration_ms / 1000) * PER_SECOND_CAP + session.apples_eaten.max(0) * PER_APPLE_BONUS
}

/// Classify a submitted session against the player's baseline.
///
/// Total function: any input, however malformed, produces a verdict. Checks
/// run in severity order and short-circuit, so an impossible score is not
/// also analyzed for robotic input.
pub fn score_session(session: &PlaySession, baseline: &PlayerBaseline) -> ValidationVerdict {
    let bound = max_plausible_score(session);
    if session.score > bound {
        return ValidationVerdict::impossible(session.score.min(bound));
    }

    let mut trust = 1.0;
    let mut flags = Vec::new();
    if let Some(stats) = InputStats::from_events(&session.input_events) {
        // gap means are meaningless on an unordered timeline; the robotic
        // check below already catches that case at full suspicion
        if stats.monotonic && stats.mean_gap_ms < MIN_REACTION_TIME_MS {
            flags.push(SuspicionFlag::ImpossibleReactionTime);
            trust -= REACTION_TIME_PENALTY;
        }
        if stats.variation < MIN_INPUT_VARIATION {
            flags.push(SuspicionFlag::RoboticInputPattern);
            trust -= ROBOTIC_PATTERN_PENALTY;
        }
        if stats.accuracy > MAX_ACCURACY {
            flags.push(SuspicionFlag::PerfectAccuracy);
            trust -= PERFECT_ACCURACY_PENALTY;
        }
    }
    let trust = trust.clamp(0.0, 1.0);

    if !flags.is_empty() {
        return ValidationVerdict::suspicious(flags, trust);
    }

    if baseline.average_score > 0.0 {
        let jump = session.score as f64 / baseline.average_score;
        if jump > MAX_SKILL_JUMP {
            let cap = (baseline.average_score * 2.0) as i64;
            return ValidationVerdict::skill_jump(session.score.min(cap), trust);
        }
    }

    ValidationVerdict::accepted(trust)
}
