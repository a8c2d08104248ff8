// Wire shapes of the HTTP API

use crate::models::gesture::Prediction;
use crate::models::session::SessionId;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeFrameResponse {
    pub processed_image: String,
    pub prediction: Option<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeFrameResponse {
    pub fn processed(processed_image: String, prediction: Option<Prediction>) -> Self {
        Self {
            processed_image,
            prediction,
            error: None,
        }
    }

    /// Frame that could not be analyzed; the client keeps streaming
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            processed_image: String::new(),
            prediction: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Stop-session request that never identified a session
#[derive(Debug, Serialize)]
pub struct StopSessionError {
    pub error: String,
    pub metrics: Map<String, Value>,
}

/// Zeroed report for an id the store does not know
#[derive(Debug, Serialize)]
pub struct MissingSessionReport {
    pub error: String,
    pub metrics: Map<String, Value>,
    pub session_id: SessionId,
    pub duration: u64,
    pub frames_processed: u64,
    pub gesture_percentages: Map<String, Value>,
    pub feedback: &'static str,
    pub overall_score: u64,
}

impl MissingSessionReport {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            error: format!("Session ID not found: {}", session_id),
            metrics: Map::new(),
            session_id,
            duration: 0,
            frames_processed: 0,
            gesture_percentages: Map::new(),
            feedback: "No session data available",
            overall_score: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub classifier_available: bool,
    pub detector: String,
}
