// Gesture labels, predictions and classifier errors

use serde::{Deserialize, Serialize};

/// Gesture classes the body-language model is trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    OpenPalm,
    ThumbsUp,
    Pointing,
    CrossedArms,
    Victorious,
}

/// Whether a gesture helps or hurts a presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureCategory {
    Allowed,
    Disallowed,
}

impl Gesture {
    pub const ALLOWED: [Gesture; 3] = [Gesture::OpenPalm, Gesture::ThumbsUp, Gesture::Pointing];
    pub const DISALLOWED: [Gesture; 2] = [Gesture::CrossedArms, Gesture::Victorious];

    /// Class label as emitted by the model
    pub fn label(&self) -> &'static str {
        match self {
            Gesture::OpenPalm => "Open Palm",
            Gesture::ThumbsUp => "Thumbs Up",
            Gesture::Pointing => "Pointing",
            Gesture::CrossedArms => "Crossed Arms",
            Gesture::Victorious => "Victorious",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Open Palm" => Some(Gesture::OpenPalm),
            "Thumbs Up" => Some(Gesture::ThumbsUp),
            "Pointing" => Some(Gesture::Pointing),
            "Crossed Arms" => Some(Gesture::CrossedArms),
            "Victorious" => Some(Gesture::Victorious),
            _ => None,
        }
    }

    pub fn category(&self) -> GestureCategory {
        match self {
            Gesture::OpenPalm | Gesture::ThumbsUp | Gesture::Pointing => GestureCategory::Allowed,
            Gesture::CrossedArms | Gesture::Victorious => GestureCategory::Disallowed,
        }
    }
}

/// One classified frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "class")]
    pub class_label: String,
    pub confidence: f32,
}

impl Prediction {
    pub fn new(class_label: impl Into<String>, confidence: f32) -> Self {
        Self {
            class_label: class_label.into(),
            confidence,
        }
    }

    /// Known gesture for this label, if any
    pub fn gesture(&self) -> Option<Gesture> {
        Gesture::from_label(&self.class_label)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: no model loaded")]
    Unavailable,

    #[error("Classification failed: {0}")]
    ClassificationFailed(String),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;
