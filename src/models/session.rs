// Analysis session state and the report produced when a session ends

use crate::models::gesture::Prediction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ==============================================================================
// Session Identifier
// ==============================================================================

/// Opaque session identifier, compared by its canonical string form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    /// Normalize an id that arrived as any JSON scalar. Clients round-trip
    /// timestamp ids as numbers as often as strings.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::new(s)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self(i.to_string()))
                } else if let Some(u) = n.as_u64() {
                    Some(Self(u.to_string()))
                } else {
                    let f = n.as_f64()?;
                    if f.fract() == 0.0 && f.abs() < 9.0e15 {
                        Some(Self(format!("{}", f as i64)))
                    } else {
                        Some(Self(n.to_string()))
                    }
                }
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==============================================================================
// Session
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    pub frames_processed: u64,
    pub detections: Vec<Prediction>,
}

impl Session {
    pub fn new(id: SessionId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            started_at,
            frames_processed: 0,
            detections: Vec::new(),
        }
    }

    /// Count an analyzed frame; keep the prediction only if there was one
    pub fn record(&mut self, prediction: Option<Prediction>) {
        self.frames_processed += 1;
        if let Some(prediction) = prediction {
            self.detections.push(prediction);
        }
    }
}

// ==============================================================================
// Report
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GesturePercentage {
    pub gesture_name: String,
    pub gesture_count: u64,
    pub gesture_percentage: f64,
}

impl GesturePercentage {
    pub fn zero(gesture_name: &str) -> Self {
        Self {
            gesture_name: gesture_name.to_string(),
            gesture_count: 0,
            gesture_percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub duration: f64, // seconds
    pub frames_processed: u64,
    pub gesture_percentages: BTreeMap<String, GesturePercentage>,
    pub allowed_gestures: BTreeMap<String, GesturePercentage>,
    pub disallowed_gestures: BTreeMap<String, GesturePercentage>,
    pub feedback: String,
    pub overall_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_id_from_string_and_number_match() {
        let minted = SessionId::new("1718000000");
        assert_eq!(SessionId::from_json(&json!("1718000000")), Some(minted.clone()));
        assert_eq!(SessionId::from_json(&json!(1718000000)), Some(minted.clone()));
        assert_eq!(SessionId::from_json(&json!(1718000000.0)), Some(minted.clone()));
        assert_eq!(SessionId::from_json(&json!(" 1718000000 ")), Some(minted));
    }

    #[test]
    fn test_session_id_rejects_non_scalars() {
        assert_eq!(SessionId::from_json(&json!(null)), None);
        assert_eq!(SessionId::from_json(&json!("")), None);
        assert_eq!(SessionId::from_json(&json!(["1"])), None);
        assert_eq!(SessionId::from_json(&json!(true)), None);
    }

    #[test]
    fn test_record_counts_frames_without_prediction() {
        let mut session = Session::new(SessionId::new("s"), Utc::now());
        session.record(None);
        session.record(Some(Prediction::new("Pointing", 0.6)));
        session.record(None);

        assert_eq!(session.frames_processed, 3);
        assert_eq!(session.detections.len(), 1);
        assert_eq!(session.detections[0].class_label, "Pointing");
    }
}
