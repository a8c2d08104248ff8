// Request faults and the single table that maps them to HTTP responses

use crate::core::image_codec::ImageCodecError;
use crate::core::session_store::StoreError;
use crate::http::dto::{AnalyzeFrameResponse, ErrorBody, MissingSessionReport, StopSessionError};
use crate::models::gesture::ClassifierError;
use crate::models::pose::PoseError;
use crate::models::session::SessionId;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Map;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    StartSession,
    AnalyzeFrame,
    StopSession,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiFault {
    #[error("{0}")]
    InvalidRequest(&'static str),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Invalid image data: {0}")]
    InvalidImage(#[from] ImageCodecError),

    #[error("Classifier unavailable")]
    ClassifierUnavailable,

    #[error("Classification failed: {0}")]
    ClassificationFailed(String),

    #[error("{0}")]
    FrameProcessing(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ApiFault {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SessionNotFound(id) => ApiFault::SessionNotFound(id),
        }
    }
}

impl From<PoseError> for ApiFault {
    fn from(e: PoseError) -> Self {
        ApiFault::FrameProcessing(e.to_string())
    }
}

impl From<ClassifierError> for ApiFault {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::Unavailable => ApiFault::ClassifierUnavailable,
            ClassifierError::ClassificationFailed(reason) => ApiFault::ClassificationFailed(reason),
        }
    }
}

impl From<tokio::task::JoinError> for ApiFault {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiFault::Internal(format!("frame task aborted: {}", e))
    }
}

impl ApiFault {
    /// Response for this fault on the given endpoint. Streaming clients get
    /// 200 for per-frame and per-session problems so they keep going.
    pub fn into_response_for(self, endpoint: Endpoint) -> Response {
        match (endpoint, self) {
            (Endpoint::AnalyzeFrame, ApiFault::InvalidRequest(message)) => {
                warn!(reason = message, "analyze-frame rejected");
                error_body(StatusCode::BAD_REQUEST, message.to_string())
            }
            (Endpoint::AnalyzeFrame, ApiFault::InvalidImage(ImageCodecError::Decode(e))) => {
                warn!(error = %e, "analyze-frame got undecodable image");
                error_body(StatusCode::BAD_REQUEST, "Invalid image data".to_string())
            }
            (Endpoint::AnalyzeFrame, ApiFault::SessionNotFound(id)) => {
                warn!(session_id = %id, "frame for unknown session");
                Json(AnalyzeFrameResponse::failed("Session not found or expired")).into_response()
            }
            (Endpoint::AnalyzeFrame, fault) => {
                warn!(error = %fault, "frame processing failed");
                Json(AnalyzeFrameResponse::failed(format!(
                    "Error processing frame: {}",
                    fault
                )))
                .into_response()
            }

            (Endpoint::StopSession, ApiFault::InvalidRequest(message)) => {
                warn!(reason = message, "stop-session rejected");
                Json(StopSessionError {
                    error: message.to_string(),
                    metrics: Map::new(),
                })
                .into_response()
            }
            (Endpoint::StopSession, ApiFault::SessionNotFound(id)) => {
                warn!(session_id = %id, "stop requested for unknown session");
                Json(MissingSessionReport::new(id)).into_response()
            }

            (_, fault) => {
                error!(?endpoint, error = %fault, "request failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, fault.to_string())
            }
        }
    }
}

fn error_body(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}
