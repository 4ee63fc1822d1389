use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use anticheat::session::PlaySession;
use feature_flags::flag_matching::EvaluationContext;

use crate::api::ValidationError;

/// Hard cap on the submitted input timeline. A legitimate run sends a few
/// hundred events; anything past this is rejected before it reaches the
/// scorer.
pub const MAX_INPUT_EVENTS: usize = 10_000;

#[derive(Default, Debug, Deserialize, Serialize)]
pub struct FlagsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

impl FlagsRequest {
    #[instrument(skip_all)]
    pub fn from_bytes(bytes: Bytes) -> Result<FlagsRequest, ValidationError> {
        tracing::debug!(len = bytes.len(), "decoding flags request");
        let payload = String::from_utf8(bytes.into()).map_err(|e| {
            tracing::error!("failed to decode body: {}", e);
            ValidationError::RequestDecodingError(String::from("invalid body encoding"))
        })?;

        Ok(serde_json::from_str::<FlagsRequest>(&payload)?)
    }

    /// Anonymous requests fall back to an ip+user-agent composite so their
    /// rollout buckets stay stable across page loads.
    pub fn extract_context(&self, client_ip: &str, user_agent: &str) -> EvaluationContext {
        let identity = match &self.identity {
            Some(identity) if !identity.is_empty() => identity.clone(),
            _ => format!("{client_ip}|{user_agent}"),
        };

        EvaluationContext {
            identity,
            segment: self.segment.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(alias = "player_id")]
    pub player_id: String,
    pub session: PlaySession,
}

impl ValidateRequest {
    #[instrument(skip_all)]
    pub fn from_bytes(bytes: Bytes) -> Result<ValidateRequest, ValidationError> {
        tracing::debug!(len = bytes.len(), "decoding validate request");
        let payload = String::from_utf8(bytes.into()).map_err(|e| {
            tracing::error!("failed to decode body: {}", e);
            ValidationError::RequestDecodingError(String::from("invalid body encoding"))
        })?;

        Ok(serde_json::from_str::<ValidateRequest>(&payload)?)
    }

    /// Shape checks the scorer must not have to care about. The scorer
    /// itself stays total; this is edge hygiene.
    pub fn validate_shape(&self) -> Result<(), ValidationError> {
        if self.player_id.is_empty() {
            return Err(ValidationError::MissingPlayerId);
        }
        if self.session.score < 0 || self.session.apples_eaten < 0 {
            return Err(ValidationError::NegativeCounters);
        }
        if self.session.input_events.len() > MAX_INPUT_EVENTS {
            return Err(ValidationError::InputTimelineTooLong);
        }
        Ok(())
    }
}
