use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::FlagRefreshError;

/// A flag's resolved value. The browser clients historically sent booleans,
/// strings and numbers interchangeably; consumers must branch on the variant
/// instead of relying on implicit truthiness.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    String(String),
    Number(f64),
}

impl FlagValue {
    /// `false`, `""` and `0` disable a flag regardless of rollout percentage.
    pub fn is_truthy(&self) -> bool {
        match self {
            FlagValue::Bool(value) => *value,
            FlagValue::String(value) => !value.is_empty(),
            FlagValue::Number(value) => *value != 0.0,
        }
    }
}

impl Default for FlagValue {
    fn default() -> Self {
        FlagValue::Bool(false)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDefinition {
    #[serde(default)]
    pub key: String,
    pub enabled_value: FlagValue,
    #[serde(default = "default_rollout")]
    pub rollout_percentage: i64,
    #[serde(default)]
    pub description: String,
}

fn default_rollout() -> i64 {
    100
}

impl FlagDefinition {
    /// Percentages outside [0, 100] come from hand-edited config; clamp, never
    /// trust.
    pub fn effective_rollout(&self) -> i64 {
        self.rollout_percentage.clamp(0, 100)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillSwitch {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub reason: String,
    /// Epoch milliseconds, set by the ops tooling that flipped the switch.
    #[serde(default)]
    pub activated_at: Option<i64>,
}

/// Partial patch applied on top of the effective definition for one
/// `(segment, flag)` pair. Fields present here win.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentOverride {
    pub rollout_percentage: Option<i64>,
    pub enabled_value: Option<FlagValue>,
}

impl SegmentOverride {
    pub fn apply(&self, base: &FlagDefinition) -> FlagDefinition {
        FlagDefinition {
            key: base.key.clone(),
            enabled_value: self
                .enabled_value
                .clone()
                .unwrap_or_else(|| base.enabled_value.clone()),
            rollout_percentage: self.rollout_percentage.unwrap_or(base.rollout_percentage),
            description: base.description.clone(),
        }
    }
}

/// Wire shape of the remote flag endpoint. Untrusted: parse and validate
/// before swapping it into the active table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFlagPayload {
    #[serde(default)]
    pub flags: HashMap<String, FlagDefinition>,
    #[serde(default)]
    pub kill_switches: HashMap<String, KillSwitch>,
}

impl RemoteFlagPayload {
    pub fn from_json(payload: &str) -> Result<RemoteFlagPayload, FlagRefreshError> {
        serde_json::from_str::<RemoteFlagPayload>(payload).map_err(|e| {
            tracing::error!("failed to parse remote flag payload: {}", e);
            FlagRefreshError::from(e)
        })
    }
}

/// One immutable snapshot of every source consulted during evaluation.
/// Refresh builds a new table and swaps the whole thing; concurrent
/// evaluations never observe a half-updated registry.
#[derive(Debug, Clone, Default)]
pub struct FlagTable {
    local: HashMap<String, FlagDefinition>,
    remote: HashMap<String, FlagDefinition>,
    kill_switches: HashMap<String, KillSwitch>,
    segment_overrides: HashMap<(String, String), SegmentOverride>,
}

impl FlagTable {
    pub fn new(local: Vec<FlagDefinition>) -> FlagTable {
        FlagTable {
            local: local
                .into_iter()
                .map(|flag| (flag.key.clone(), flag))
                .collect(),
            ..FlagTable::default()
        }
    }

    pub fn with_segment_override(
        mut self,
        segment: &str,
        key: &str,
        overridden: SegmentOverride,
    ) -> FlagTable {
        self.segment_overrides
            .insert((segment.to_string(), key.to_string()), overridden);
        self
    }

    pub fn with_kill_switch(mut self, key: &str, switch: KillSwitch) -> FlagTable {
        self.kill_switches.insert(key.to_string(), switch);
        self
    }

    /// New table with the remote half replaced by `payload`. Local flags and
    /// segment overrides are config-defined and survive the swap. Map keys
    /// are authoritative for flag names; a payload entry with a missing or
    /// mismatched inner key is normalized rather than dropped.
    pub fn with_remote_payload(&self, payload: RemoteFlagPayload) -> FlagTable {
        let remote = payload
            .flags
            .into_iter()
            .map(|(name, mut flag)| {
                flag.key = name.clone();
                (name, flag)
            })
            .collect();

        FlagTable {
            local: self.local.clone(),
            remote,
            kill_switches: payload.kill_switches,
            segment_overrides: self.segment_overrides.clone(),
        }
    }

    pub fn local(&self, key: &str) -> Option<&FlagDefinition> {
        self.local.get(key)
    }

    pub fn remote(&self, key: &str) -> Option<&FlagDefinition> {
        self.remote.get(key)
    }

    pub fn kill_switch(&self, key: &str) -> Option<&KillSwitch> {
        self.kill_switches.get(key)
    }

    pub fn segment_override(&self, segment: &str, key: &str) -> Option<&SegmentOverride> {
        self.segment_overrides
            .get(&(segment.to_string(), key.to_string()))
    }

    /// Every flag name known to any definition source, for bulk evaluation.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .local
            .keys()
            .chain(self.remote.keys())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}
