use serde::{Deserialize, Serialize};

/// Coarse spend-tier classification derived from the identity's salted draw.
/// The thresholds mirror the marketing tiers: top 5% whales, next 20%
/// dolphins, the rest minnows.
pub const WHALE_THRESHOLD: u32 = 5;
pub const DOLPHIN_THRESHOLD: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Whale,
    Dolphin,
    Minnow,
}

impl Segment {
    pub fn derive(identity: &str) -> Segment {
        let draw = bucketing::segment_draw(identity);
        if draw < WHALE_THRESHOLD {
            Segment::Whale
        } else if draw < DOLPHIN_THRESHOLD {
            Segment::Dolphin
        } else {
            Segment::Minnow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Whale => "whale",
            Segment::Dolphin => "dolphin",
            Segment::Minnow => "minnow",
        }
    }
}
