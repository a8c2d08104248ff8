// Gesture classification: wraps an externally trained model behind a narrow trait

use crate::core::feature_vector::FeatureVector;
use crate::models::gesture::{ClassifierError, ClassifierResult, Prediction};
use std::sync::Arc;

/// A trained probabilistic classifier.
///
/// `predict_proba` returns one probability per entry of `classes()`, in the
/// same order. Implementations report every runtime failure as
/// `ClassifierError::ClassificationFailed`.
pub trait GestureModel: Send + Sync {
    /// Known labels, in the order `predict_proba` uses
    fn classes(&self) -> &[String];

    /// Best label for the features
    fn predict(&self, features: &[f32]) -> ClassifierResult<String>;

    /// Probability per class
    fn predict_proba(&self, features: &[f32]) -> ClassifierResult<Vec<f32>>;

    /// Human-readable model description for logs and health checks
    fn describe(&self) -> String;
}

/// Classifier adapter. Holds no model when loading failed at startup.
#[derive(Clone)]
pub struct GestureClassifier {
    model: Option<Arc<dyn GestureModel>>,
}

impl GestureClassifier {
    pub fn new(model: Arc<dyn GestureModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unavailable() -> Self {
        Self { model: None }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn describe(&self) -> String {
        match &self.model {
            Some(model) => model.describe(),
            None => "unavailable".to_string(),
        }
    }

    /// Classify one frame. The confidence is the probability of the predicted
    /// label, looked up by label rather than by argmax position.
    pub fn classify(&self, features: &FeatureVector) -> ClassifierResult<Prediction> {
        let model = self.model.as_ref().ok_or(ClassifierError::Unavailable)?;

        let label = model.predict(features.as_slice())?;
        let distribution = model.predict_proba(features.as_slice())?;
        let classes = model.classes();

        if distribution.len() != classes.len() {
            return Err(ClassifierError::ClassificationFailed(format!(
                "distribution has {} entries for {} classes",
                distribution.len(),
                classes.len()
            )));
        }

        let index = classes.iter().position(|c| *c == label).ok_or_else(|| {
            ClassifierError::ClassificationFailed(format!(
                "predicted label '{}' is not among the model classes",
                label
            ))
        })?;

        let confidence = distribution[index];
        if !confidence.is_finite() {
            return Err(ClassifierError::ClassificationFailed(format!(
                "non-finite confidence for '{}'",
                label
            )));
        }

        Ok(Prediction::new(label, confidence))
    }
}
