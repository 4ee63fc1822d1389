use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use metrics::counter;
use tracing::instrument;

use anticheat::scorer::score_session;
use anticheat::verdict::ValidationVerdict;

use crate::api::ValidationError;
use crate::requests::ValidateRequest;

#[instrument(skip_all, fields(player_id, score, outcome))]
pub async fn validate(
    state: State<super::State>,
    body: Bytes,
) -> Result<Json<ValidationVerdict>, ValidationError> {
    let request = ValidateRequest::from_bytes(body)?;
    request.validate_shape()?;

    tracing::Span::current().record("player_id", request.player_id.as_str());
    tracing::Span::current().record("score", request.session.score);

    let baseline = state.baselines.get(&request.player_id).await;
    let verdict = score_session(&request.session, &baseline);

    tracing::Span::current().record("outcome", verdict.outcome.as_str());
    counter!("score_validations_total", "outcome" => verdict.outcome.as_str()).increment(1);

    if verdict.is_accepted() {
        state
            .baselines
            .record(&request.player_id, request.session.score)
            .await;
    } else {
        // the manual-review pipeline tails these
        tracing::warn!(
            player_id = %request.player_id,
            outcome = verdict.outcome.as_str(),
            flags = ?verdict.flags,
            "rejected score submission"
        );
    }

    Ok(Json(verdict))
}
