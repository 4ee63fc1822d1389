use crate::session::InputEvent;

/// Sessions shorter than this carry no reliable behavioral signal; the
/// scorer skips the behavioral step instead of rejecting them.
pub const MIN_EVENTS_FOR_ANALYSIS: usize = 10;

/// Summary statistics over a session's input timeline. Total over arbitrary
/// input: out-of-order timestamps degrade to the most suspicious legal
/// interpretation instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputStats {
    /// Mean inter-event gap in milliseconds.
    pub mean_gap_ms: f64,
    /// Coefficient of variation (stddev / mean) of the gaps. 0 when the mean
    /// is 0 or the timeline is non-monotonic.
    pub variation: f64,
    /// Fraction of moves that were not reversal-rejections.
    pub accuracy: f64,
    pub monotonic: bool,
}

impl InputStats {
    pub fn from_events(events: &[InputEvent]) -> Option<InputStats> {
        if events.len() < MIN_EVENTS_FOR_ANALYSIS {
            return None;
        }

        let mut monotonic = true;
        let mut gaps = Vec::with_capacity(events.len() - 1);
        for pair in events.windows(2) {
            let gap = pair[1].timestamp_ms - pair[0].timestamp_ms;
            if gap < 0 {
                monotonic = false;
            }
            gaps.push(gap.max(0) as f64);
        }

        let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
        let variation = if !monotonic || mean <= 0.0 {
            0.0
        } else {
            let variance =
                gaps.iter().map(|gap| (gap - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
            variance.sqrt() / mean
        };

        let reversals = events
            .windows(2)
            .filter(|pair| pair[1].direction.is_opposite(pair[0].direction))
            .count();
        let accuracy = (events.len() - reversals) as f64 / events.len() as f64;

        Some(InputStats {
            mean_gap_ms: mean,
            variation,
            accuracy,
            monotonic,
        })
    }
}
