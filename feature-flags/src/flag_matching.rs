use std::collections::HashMap;

use serde::Serialize;

use crate::flag_definitions::{FlagDefinition, FlagTable, FlagValue};
use crate::segments::Segment;

/// Which source decided the evaluation, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    KillSwitch,
    Remote,
    Segment,
    Local,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagMatch {
    pub enabled: bool,
    pub value: FlagValue,
    pub source: MatchSource,
}

/// Fire-and-forget usage telemetry. Not part of the evaluation contract;
/// callers that don't care pass the no-op variant.
pub trait UsageTracker {
    fn track(&self, key: &str, result: &FlagMatch);
}

pub struct NoopUsageTracker;

impl UsageTracker for NoopUsageTracker {
    fn track(&self, _key: &str, _result: &FlagMatch) {}
}

#[derive(Debug, Clone)]
pub struct EvaluationContext {
    /// Stable player id, or the ip+user-agent composite fallback.
    pub identity: String,
    pub segment: Option<String>,
}

/// Pure evaluator over one table snapshot and one context. Stateless; build
/// one per request or share freely across threads.
#[derive(Debug)]
pub struct FlagEvaluator {
    context: EvaluationContext,
}

impl FlagEvaluator {
    pub fn new(context: EvaluationContext) -> FlagEvaluator {
        FlagEvaluator { context }
    }

    /// Resolution order: kill switch, then remote definition (replaces
    /// local), then segment override (merged on top), then local static
    /// definition. Kill switches win unconditionally. Unknown flags resolve
    /// off rather than erroring.
    pub fn evaluate(&self, table: &FlagTable, key: &str) -> FlagMatch {
        if table.kill_switch(key).is_some_and(|switch| switch.active) {
            let value = table
                .remote(key)
                .or_else(|| table.local(key))
                .map(|flag| flag.enabled_value.clone())
                .unwrap_or_default();
            return FlagMatch {
                enabled: false,
                value,
                source: MatchSource::KillSwitch,
            };
        }

        let (definition, source) = match table.remote(key) {
            Some(flag) => (flag.clone(), MatchSource::Remote),
            None => match table.local(key) {
                Some(flag) => (flag.clone(), MatchSource::Local),
                None => {
                    return FlagMatch {
                        enabled: false,
                        value: FlagValue::default(),
                        source: MatchSource::NotFound,
                    }
                }
            },
        };

        let segment = self.segment_label();
        let (definition, source) = match table.segment_override(&segment, key) {
            Some(overridden) => (overridden.apply(&definition), MatchSource::Segment),
            None => (definition, source),
        };

        self.resolve_rollout(&definition, source)
    }

    /// Resolve every flag known to the table, for the bulk boot-time fetch.
    pub fn evaluate_all(&self, table: &FlagTable) -> HashMap<String, FlagMatch> {
        table
            .keys()
            .into_iter()
            .map(|key| (key.to_string(), self.evaluate(table, key)))
            .collect()
    }

    fn resolve_rollout(&self, definition: &FlagDefinition, source: MatchSource) -> FlagMatch {
        let value = definition.enabled_value.clone();
        if !value.is_truthy() {
            return FlagMatch {
                enabled: false,
                value,
                source,
            };
        }

        let rollout = definition.effective_rollout();
        let enabled = if rollout >= 100 {
            true
        } else if rollout <= 0 {
            false
        } else {
            i64::from(bucketing::rollout_bucket(&self.context.identity)) < rollout
        };

        FlagMatch {
            enabled,
            value,
            source,
        }
    }

    /// Explicit segments pass through verbatim; otherwise derive the tier
    /// from the identity's salted draw.
    pub fn segment_label(&self) -> String {
        match &self.context.segment {
            Some(segment) => segment.clone(),
            None => Segment::derive(&self.context.identity).as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag_definitions::{KillSwitch, RemoteFlagPayload, SegmentOverride};

    fn flag(key: &str, rollout: i64) -> FlagDefinition {
        FlagDefinition {
            key: key.to_string(),
            enabled_value: FlagValue::Bool(true),
            rollout_percentage: rollout,
            description: String::new(),
        }
    }

    fn context(identity: &str) -> EvaluationContext {
        EvaluationContext {
            identity: identity.to_string(),
            segment: None,
        }
    }

    fn remote_payload(flags: Vec<FlagDefinition>) -> RemoteFlagPayload {
        RemoteFlagPayload {
            flags: flags
                .into_iter()
                .map(|f| (f.key.clone(), f))
                .collect(),
            kill_switches: HashMap::new(),
        }
    }

    #[test]
    fn full_rollout_is_on_for_every_identity() {
        let table = FlagTable::new(vec![flag("battle_pass", 100)]);
        for i in 0..500 {
            let evaluator = FlagEvaluator::new(context(&format!("player_{i}")));
            let result = evaluator.evaluate(&table, "battle_pass");
            assert!(result.enabled);
            assert_eq!(result.source, MatchSource::Local);
        }
    }

    #[test]
    fn zero_rollout_is_off_for_every_identity() {
        let table = FlagTable::new(vec![flag("clan_wars", 0)]);
        for i in 0..500 {
            let evaluator = FlagEvaluator::new(context(&format!("player_{i}")));
            assert!(!evaluator.evaluate(&table, "clan_wars").enabled);
        }
    }

    #[test]
    fn partial_rollout_follows_the_bucket() {
        let table = FlagTable::new(vec![flag("double_apples", 30)]);
        let mut enabled = 0;
        for i in 0..1_000 {
            let identity = format!("player_{i}");
            let evaluator = FlagEvaluator::new(context(&identity));
            let result = evaluator.evaluate(&table, "double_apples");
            assert_eq!(result.enabled, bucketing::rollout_bucket(&identity) < 30);
            if result.enabled {
                enabled += 1;
            }
        }
        // loose bound; the tight distribution check lives in the bucketing crate
        assert!((200..=400).contains(&enabled), "{enabled} of 1000 enabled");
    }

    #[test]
    fn evaluation_is_deterministic() {
        let table = FlagTable::new(vec![flag("double_apples", 30)]);
        let evaluator = FlagEvaluator::new(context("player_7"));
        assert_eq!(
            evaluator.evaluate(&table, "double_apples"),
            evaluator.evaluate(&table, "double_apples")
        );
    }

    #[test]
    fn falsy_value_is_off_regardless_of_percentage() {
        let table = FlagTable::new(vec![FlagDefinition {
            key: "legacy_ui".to_string(),
            enabled_value: FlagValue::Bool(false),
            rollout_percentage: 100,
            description: String::new(),
        }]);
        let evaluator = FlagEvaluator::new(context("player_1"));
        let result = evaluator.evaluate(&table, "legacy_ui");
        assert!(!result.enabled);
        assert_eq!(result.value, FlagValue::Bool(false));
    }

    #[test]
    fn unknown_flag_resolves_not_found() {
        let evaluator = FlagEvaluator::new(context("player_1"));
        let result = evaluator.evaluate(&FlagTable::default(), "does_not_exist");
        assert!(!result.enabled);
        assert_eq!(result.source, MatchSource::NotFound);
    }

    #[test]
    fn malformed_percentages_are_clamped() {
        let table = FlagTable::new(vec![flag("over", 250), flag("under", -20)]);
        let evaluator = FlagEvaluator::new(context("player_1"));
        assert!(evaluator.evaluate(&table, "over").enabled);
        assert!(!evaluator.evaluate(&table, "under").enabled);
    }

    #[test]
    fn remote_definition_replaces_local() {
        let table = FlagTable::new(vec![flag("clan_wars", 0)])
            .with_remote_payload(remote_payload(vec![flag("clan_wars", 100)]));
        let evaluator = FlagEvaluator::new(context("player_1"));
        let result = evaluator.evaluate(&table, "clan_wars");
        assert!(result.enabled);
        assert_eq!(result.source, MatchSource::Remote);
    }

    #[test]
    fn kill_switch_beats_remote_full_rollout() {
        let table = FlagTable::new(vec![flag("clan_wars", 0)])
            .with_remote_payload(remote_payload(vec![flag("clan_wars", 100)]))
            .with_kill_switch(
                "clan_wars",
                KillSwitch {
                    active: true,
                    reason: "leaderboard outage".to_string(),
                    activated_at: Some(1_700_000_000_000),
                },
            );
        let evaluator = FlagEvaluator::new(context("player_1"));
        let result = evaluator.evaluate(&table, "clan_wars");
        assert!(!result.enabled);
        assert_eq!(result.source, MatchSource::KillSwitch);
    }

    #[test]
    fn inactive_kill_switch_is_ignored() {
        let table = FlagTable::new(vec![flag("clan_wars", 100)]).with_kill_switch(
            "clan_wars",
            KillSwitch {
                active: false,
                reason: String::new(),
                activated_at: None,
            },
        );
        let evaluator = FlagEvaluator::new(context("player_1"));
        assert!(evaluator.evaluate(&table, "clan_wars").enabled);
    }

    #[test]
    fn kill_switch_on_unknown_flag_still_answers_off() {
        let table = FlagTable::default().with_kill_switch(
            "ghost",
            KillSwitch {
                active: true,
                reason: "cleanup".to_string(),
                activated_at: None,
            },
        );
        let evaluator = FlagEvaluator::new(context("player_1"));
        let result = evaluator.evaluate(&table, "ghost");
        assert!(!result.enabled);
        assert_eq!(result.source, MatchSource::KillSwitch);
        assert_eq!(result.value, FlagValue::Bool(false));
    }

    #[test]
    fn explicit_segment_override_wins_over_base_percentage() {
        let table = FlagTable::new(vec![flag("battle_pass", 0)]).with_segment_override(
            "whale",
            "battle_pass",
            SegmentOverride {
                rollout_percentage: Some(100),
                enabled_value: None,
            },
        );

        let whale = FlagEvaluator::new(EvaluationContext {
            identity: "player_1".to_string(),
            segment: Some("whale".to_string()),
        });
        let result = whale.evaluate(&table, "battle_pass");
        assert!(result.enabled);
        assert_eq!(result.source, MatchSource::Segment);

        let minnow = FlagEvaluator::new(EvaluationContext {
            identity: "player_1".to_string(),
            segment: Some("minnow".to_string()),
        });
        assert!(!minnow.evaluate(&table, "battle_pass").enabled);
    }

    #[test]
    fn segment_override_can_disable_a_full_rollout() {
        let table = FlagTable::new(vec![flag("new_skins_shop", 100)]).with_segment_override(
            "dolphin",
            "new_skins_shop",
            SegmentOverride {
                rollout_percentage: Some(0),
                enabled_value: None,
            },
        );
        let evaluator = FlagEvaluator::new(EvaluationContext {
            identity: "player_1".to_string(),
            segment: Some("dolphin".to_string()),
        });
        assert!(!evaluator.evaluate(&table, "new_skins_shop").enabled);
    }

    #[test]
    fn kill_switch_beats_segment_override() {
        let table = FlagTable::new(vec![flag("battle_pass", 0)])
            .with_segment_override(
                "whale",
                "battle_pass",
                SegmentOverride {
                    rollout_percentage: Some(100),
                    enabled_value: None,
                },
            )
            .with_kill_switch(
                "battle_pass",
                KillSwitch {
                    active: true,
                    reason: "payment incident".to_string(),
                    activated_at: None,
                },
            );
        let evaluator = FlagEvaluator::new(EvaluationContext {
            identity: "player_1".to_string(),
            segment: Some("whale".to_string()),
        });
        let result = evaluator.evaluate(&table, "battle_pass");
        assert!(!result.enabled);
        assert_eq!(result.source, MatchSource::KillSwitch);
    }

    #[test]
    fn derived_segment_is_used_when_context_has_none() {
        // find an identity the tier function puts in the whale bucket
        let whale_identity = (0..)
            .map(|i| format!("id_{i}"))
            .find(|id| bucketing::segment_draw(id) < crate::segments::WHALE_THRESHOLD)
            .unwrap();

        let table = FlagTable::new(vec![flag("battle_pass", 0)]).with_segment_override(
            "whale",
            "battle_pass",
            SegmentOverride {
                rollout_percentage: Some(100),
                enabled_value: None,
            },
        );

        let evaluator = FlagEvaluator::new(context(&whale_identity));
        assert_eq!(evaluator.segment_label(), "whale");
        let result = evaluator.evaluate(&table, "battle_pass");
        assert!(result.enabled);
        assert_eq!(result.source, MatchSource::Segment);
    }

    #[test]
    fn evaluate_all_covers_local_and_remote_flags() {
        let table = FlagTable::new(vec![flag("battle_pass", 100)])
            .with_remote_payload(remote_payload(vec![flag("clan_wars", 100)]));
        let evaluator = FlagEvaluator::new(context("player_1"));
        let all = evaluator.evaluate_all(&table);
        assert_eq!(all.len(), 2);
        assert!(all["battle_pass"].enabled);
        assert!(all["clan_wars"].enabled);
    }

    #[test]
    fn string_variant_values_pass_through() {
        let table = FlagTable::new(vec![FlagDefinition {
            key: "shop_layout".to_string(),
            enabled_value: FlagValue::String("carousel".to_string()),
            rollout_percentage: 100,
            description: String::new(),
        }]);
        let evaluator = FlagEvaluator::new(context("player_1"));
        let result = evaluator.evaluate(&table, "shop_layout");
        assert!(result.enabled);
        assert_eq!(result.value, FlagValue::String("carousel".to_string()));
    }
}
