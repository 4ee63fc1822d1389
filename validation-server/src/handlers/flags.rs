use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;
use metrics::counter;
use tracing::instrument;

use feature_flags::flag_matching::FlagEvaluator;

use crate::api::{FlagsResponse, ValidationError};
use crate::requests::FlagsRequest;

#[instrument(skip_all, fields(identity, segment))]
pub async fn evaluate(
    state: State<super::State>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<FlagsResponse>, ValidationError> {
    let request = FlagsRequest::from_bytes(body)?;

    let user_agent = headers
        .get("user-agent")
        .map_or("unknown", |v| v.to_str().unwrap_or("unknown"));
    let client_ip = headers
        .get("x-forwarded-for")
        .map_or("unknown", |v| v.to_str().unwrap_or("unknown"));

    if let Some(segment) = &request.segment {
        tracing::Span::current().record("segment", segment.as_str());
    }

    let context = request.extract_context(client_ip, user_agent);
    tracing::Span::current().record("identity", context.identity.as_str());

    let table = state.flags.snapshot();
    let evaluator = FlagEvaluator::new(context);
    let feature_flags = evaluator.evaluate_all(&table);

    for (key, result) in &feature_flags {
        state.tracker.track(key, result);
    }
    counter!("flag_evaluations_total").increment(feature_flags.len() as u64);

    Ok(Json(FlagsResponse {
        feature_flags,
        error_while_computing_flags: false,
    }))
}
