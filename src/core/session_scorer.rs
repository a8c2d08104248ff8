// Session scoring: turns the recorded detections into percentages, a score and
// coaching feedback

use crate::models::gesture::Gesture;
use crate::models::session::{GesturePercentage, Session, SessionReport};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// ==============================================================================
// Feedback thresholds (percent of frames)
// ==============================================================================

const OPEN_PALM_THRESHOLD: f64 = 20.0;
const THUMBS_UP_THRESHOLD: f64 = 10.0;
const POINTING_THRESHOLD: f64 = 10.0;
const CROSSED_ARMS_THRESHOLD: f64 = 15.0;
const VICTORIOUS_THRESHOLD: f64 = 15.0;

const FEEDBACK_HEADER: &str = "Based on your body language analysis:\n\n";

const GENERAL_RECOMMENDATIONS: [&str; 4] = [
    "• Maintain balanced posture and avoid slouching\n",
    "• Use purposeful hand movements to emphasize points\n",
    "• Keep steady eye contact with your audience\n",
    "• Vary your gestures to maintain audience engagement\n",
];

// ==============================================================================
// Scoring
// ==============================================================================

/// Score a finished session. Pure: the same session and end time always give
/// the same report.
pub fn score(session: &Session, finished_at: DateTime<Utc>) -> SessionReport {
    let duration = ((finished_at - session.started_at).num_milliseconds() as f64 / 1000.0).max(0.0);
    let frames = session.frames_processed;

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for detection in &session.detections {
        *counts.entry(detection.class_label.as_str()).or_default() += 1;
    }

    let gesture_percentages: BTreeMap<String, GesturePercentage> = if frames == 0 {
        BTreeMap::new()
    } else {
        counts
            .iter()
            .map(|(label, count)| {
                (
                    label.to_string(),
                    GesturePercentage {
                        gesture_name: label.to_string(),
                        gesture_count: *count,
                        gesture_percentage: *count as f64 / frames as f64 * 100.0,
                    },
                )
            })
            .collect()
    };

    let allowed_gestures = bucket(&Gesture::ALLOWED, &gesture_percentages);
    let disallowed_gestures = bucket(&Gesture::DISALLOWED, &gesture_percentages);

    let overall_score = if frames == 0 {
        0.0
    } else {
        let allowed: f64 = allowed_gestures.values().map(|g| g.gesture_percentage).sum();
        let disallowed: f64 = disallowed_gestures.values().map(|g| g.gesture_percentage).sum();
        (50.0 + (allowed - disallowed) / 2.0).clamp(0.0, 100.0)
    };

    let feedback = feedback(|gesture| {
        gesture_percentages
            .get(gesture.label())
            .map(|g| g.gesture_percentage)
            .unwrap_or(0.0)
    });

    SessionReport {
        session_id: session.id.clone(),
        duration,
        frames_processed: frames,
        gesture_percentages,
        allowed_gestures,
        disallowed_gestures,
        feedback,
        overall_score,
    }
}

/// Every member of the bucket, zero-filled when it was never observed
fn bucket(
    members: &[Gesture],
    percentages: &BTreeMap<String, GesturePercentage>,
) -> BTreeMap<String, GesturePercentage> {
    members
        .iter()
        .map(|gesture| {
            let label = gesture.label();
            let entry = percentages
                .get(label)
                .cloned()
                .unwrap_or_else(|| GesturePercentage::zero(label));
            (label.to_string(), entry)
        })
        .collect()
}

fn feedback(percentage: impl Fn(Gesture) -> f64) -> String {
    let mut text = String::from(FEEDBACK_HEADER);

    if percentage(Gesture::OpenPalm) > OPEN_PALM_THRESHOLD {
        text.push_str("✓ Your open palm gestures convey openness and honesty.\n");
    } else {
        text.push_str("✗ Try using more open palm gestures to appear more trustworthy.\n");
    }

    if percentage(Gesture::ThumbsUp) > THUMBS_UP_THRESHOLD {
        text.push_str("✓ Your positive gestures like thumbs up help reinforce key points.\n");
    }

    if percentage(Gesture::Pointing) > POINTING_THRESHOLD {
        text.push_str("✓ Your pointing gestures effectively direct attention.\n");
    }

    if percentage(Gesture::CrossedArms) > CROSSED_ARMS_THRESHOLD {
        text.push_str("✗ Reduce crossed arms posture as it can appear defensive or closed off.\n");
    } else {
        text.push_str("✓ You maintained an open posture throughout most of your presentation.\n");
    }

    if percentage(Gesture::Victorious) > VICTORIOUS_THRESHOLD {
        text.push_str(
            "✗ Limit victory signs as they may appear unprofessional in formal settings.\n",
        );
    }

    text.push_str("\nGeneral recommendations:\n");
    for line in GENERAL_RECOMMENDATIONS {
        text.push_str(line);
    }
    text
}
