// Frame analysis pipeline: detect -> feature vector -> classify -> annotate

use crate::core::feature_vector;
use crate::core::frame_annotator::FrameAnnotator;
use crate::core::gesture_classifier::GestureClassifier;
use crate::models::gesture::{ClassifierError, Prediction};
use crate::models::pose::PoseResult;
use crate::platform::pose::MediaPipeBridge;
use image::RgbImage;
use tracing::{debug, warn};

/// Outcome for one frame
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub annotated: RgbImage,
    pub person_detected: bool,
    pub prediction: Option<Prediction>,
}

pub struct FrameAnalyzer {
    detector: Box<dyn MediaPipeBridge>,
    classifier: GestureClassifier,
    annotator: FrameAnnotator,
}

impl FrameAnalyzer {
    pub fn new(detector: Box<dyn MediaPipeBridge>, classifier: GestureClassifier) -> Self {
        Self {
            detector,
            classifier,
            annotator: FrameAnnotator::new(),
        }
    }

    pub fn classifier_available(&self) -> bool {
        self.classifier.is_available()
    }

    pub fn detector_info(&self) -> String {
        self.detector.model_info()
    }

    /// Analyze one frame. Detector failures are returned; classifier failures
    /// only cost the prediction.
    pub fn analyze(&self, frame: &RgbImage) -> PoseResult<FrameAnalysis> {
        let landmarks = self.detector.detect(frame)?;

        let prediction = feature_vector::build(&landmarks).and_then(|features| {
            match self.classifier.classify(&features) {
                Ok(prediction) => Some(prediction),
                Err(ClassifierError::Unavailable) => {
                    debug!("no gesture model loaded, frame left unclassified");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "gesture classification failed");
                    None
                }
            }
        });

        let annotated = self.annotator.annotate(frame, &landmarks, prediction.as_ref());

        Ok(FrameAnalysis {
            annotated,
            person_detected: landmarks.has_pose(),
            prediction,
        })
    }
}
