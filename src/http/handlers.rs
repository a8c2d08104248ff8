use crate::core::image_codec;
use crate::core::session_scorer;
use crate::http::dto::{AnalyzeFrameResponse, HealthResponse, StartSessionResponse};
use crate::http::fault::{ApiFault, Endpoint};
use crate::models::session::SessionId;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};

// ==============================================================================
// Request parsing
// ==============================================================================

/// Body as a non-empty JSON object, or "No data provided"
fn parse_body(body: &Bytes) -> Result<Map<String, Value>, ApiFault> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(ApiFault::InvalidRequest("No data provided")),
    }
}

fn session_id_field(data: &Map<String, Value>) -> Result<SessionId, ApiFault> {
    data.get("session_id")
        .and_then(SessionId::from_json)
        .ok_or(ApiFault::InvalidRequest("Missing session_id"))
}

// ==============================================================================
// Handlers
// ==============================================================================

pub async fn start_session(State(state): State<AppState>) -> Json<StartSessionResponse> {
    let session_id = state.sessions.create().await;
    info!(%session_id, "session started");

    Json(StartSessionResponse {
        session_id,
        message: "Session started successfully",
    })
}

pub async fn analyze_frame(State(state): State<AppState>, body: Bytes) -> Response {
    match analyze(&state, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(fault) => fault.into_response_for(Endpoint::AnalyzeFrame),
    }
}

async fn analyze(state: &AppState, body: &Bytes) -> Result<AnalyzeFrameResponse, ApiFault> {
    let data = parse_body(body)?;
    let session_id = session_id_field(&data)?;
    let image_data = data
        .get("image_data")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(ApiFault::InvalidRequest("Missing image_data"))?
        .to_string();

    if !state.sessions.contains(&session_id).await {
        return Err(ApiFault::SessionNotFound(session_id));
    }

    let analyzer = state.analyzer.clone();
    let jpeg_quality = state.config.jpeg_quality;
    let (processed_image, prediction) = tokio::task::spawn_blocking(move || {
        let frame = image_codec::decode_data_url(&image_data)?;
        let analysis = analyzer.analyze(&frame)?;
        let encoded = image_codec::encode_data_url(&analysis.annotated, jpeg_quality)
            .map_err(|e| ApiFault::FrameProcessing(e.to_string()))?;
        Ok::<_, ApiFault>((encoded, analysis.prediction))
    })
    .await??;

    let frames = state.sessions.append(&session_id, prediction.clone()).await?;
    debug!(%session_id, frames, prediction = ?prediction, "frame analyzed");

    Ok(AnalyzeFrameResponse::processed(processed_image, prediction))
}

pub async fn stop_session(State(state): State<AppState>, body: Bytes) -> Response {
    let result = async {
        let data = parse_body(&body)?;
        let session_id = session_id_field(&data)?;
        let session = state.sessions.finalize(&session_id).await?;
        Ok::<_, ApiFault>(session_scorer::score(&session, Utc::now()))
    }
    .await;

    match result {
        Ok(report) => {
            info!(
                session_id = %report.session_id,
                frames = report.frames_processed,
                score = report.overall_score,
                "session stopped"
            );
            Json(report).into_response()
        }
        Err(fault) => fault.into_response_for(Endpoint::StopSession),
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
        classifier_available: state.analyzer.classifier_available(),
        detector: state.analyzer.detector_info(),
    })
}
