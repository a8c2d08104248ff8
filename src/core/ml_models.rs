// ML model loader for the gesture classifier artifact
// The artifact is read once at startup; failures leave the classifier unavailable

use crate::core::feature_vector::FEATURE_VECTOR_LEN;
use crate::core::gesture_classifier::{GestureClassifier, GestureModel};
use crate::models::gesture::{ClassifierError, ClassifierResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("Model backend '{0}' is not compiled in")]
    BackendDisabled(&'static str),

    #[error("Python error: {0}")]
    Python(String),
}

pub type ModelLoadResult<T> = Result<T, ModelLoadError>;

/// Serialized model formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// `.json` softmax-linear model, native Rust inference
    LinearJson,
    /// `.pkl` / `.pickle` scikit-learn pipeline, needs the `ml-pyo3` feature
    SklearnPickle,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> ModelLoadResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(ArtifactFormat::LinearJson),
            "pkl" | "pickle" => Ok(ArtifactFormat::SklearnPickle),
            other => Err(ModelLoadError::UnsupportedFormat(format!(
                "'{}' ({})",
                other,
                path.display()
            ))),
        }
    }
}

/// Load a gesture model from disk
pub fn load_gesture_model(path: &Path) -> ModelLoadResult<Arc<dyn GestureModel>> {
    if !path.exists() {
        return Err(ModelLoadError::NotFound(path.to_path_buf()));
    }

    match ArtifactFormat::from_path(path)? {
        ArtifactFormat::LinearJson => Ok(Arc::new(LinearGestureModel::load(path)?)),
        ArtifactFormat::SklearnPickle => load_pickle(path),
    }
}

#[cfg(feature = "ml-pyo3")]
fn load_pickle(path: &Path) -> ModelLoadResult<Arc<dyn GestureModel>> {
    Ok(Arc::new(pyo3_backend::SklearnPickleModel::load(path)?))
}

#[cfg(not(feature = "ml-pyo3"))]
fn load_pickle(_path: &Path) -> ModelLoadResult<Arc<dyn GestureModel>> {
    Err(ModelLoadError::BackendDisabled("ml-pyo3"))
}

/// Build the classifier adapter. Never fails: a missing or broken artifact
/// yields an unavailable classifier.
pub fn load_classifier(path: &Path) -> GestureClassifier {
    match load_gesture_model(path) {
        Ok(model) => {
            info!(path = %path.display(), model = %model.describe(), "gesture model loaded");
            GestureClassifier::new(model)
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "gesture model unavailable, predictions disabled"
            );
            GestureClassifier::unavailable()
        }
    }
}

// ==============================================================================
// Softmax-linear model (JSON artifact)
// ==============================================================================

/// Per-feature standardization, as fitted by a standard scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

/// Multinomial logistic regression over the 2004-value feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGestureModel {
    pub classes: Vec<String>,
    #[serde(default)]
    pub scaler: Option<Scaler>,
    pub weights: Vec<Vec<f32>>, // classes x features
    pub bias: Vec<f32>,
}

impl LinearGestureModel {
    pub fn load(path: &Path) -> ModelLoadResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let model: LinearGestureModel = serde_json::from_str(&contents)?;
        model.validate()?;
        Ok(model)
    }

    /// Check dimensions against the feature layout and that every parameter
    /// is finite
    pub fn validate(&self) -> ModelLoadResult<()> {
        if self.classes.is_empty() {
            return Err(ModelLoadError::InvalidModel("no classes".to_string()));
        }
        if self.weights.len() != self.classes.len() || self.bias.len() != self.classes.len() {
            return Err(ModelLoadError::InvalidModel(format!(
                "{} classes but {} weight rows and {} biases",
                self.classes.len(),
                self.weights.len(),
                self.bias.len()
            )));
        }
        if let Some(row) = self.weights.iter().find(|row| row.len() != FEATURE_VECTOR_LEN) {
            return Err(ModelLoadError::InvalidModel(format!(
                "weight row has {} features, expected {}",
                row.len(),
                FEATURE_VECTOR_LEN
            )));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != FEATURE_VECTOR_LEN || scaler.scale.len() != FEATURE_VECTOR_LEN {
                return Err(ModelLoadError::InvalidModel(format!(
                    "scaler has {}/{} entries, expected {}",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    FEATURE_VECTOR_LEN
                )));
            }
        }

        let mut parameters = self
            .weights
            .iter()
            .flatten()
            .chain(self.bias.iter())
            .chain(self.scaler.iter().flat_map(|s| s.mean.iter().chain(s.scale.iter())));
        if parameters.any(|p| !p.is_finite()) {
            return Err(ModelLoadError::InvalidModel(
                "non-finite parameter".to_string(),
            ));
        }
        Ok(())
    }

    fn standardize(&self, features: &[f32]) -> Vec<f32> {
        match &self.scaler {
            Some(scaler) => features
                .iter()
                .zip(scaler.mean.iter().zip(scaler.scale.iter()))
                .map(|(x, (mean, scale))| {
                    // Zero-variance features are left unscaled
                    let scale = if *scale == 0.0 { 1.0 } else { *scale };
                    (x - mean) / scale
                })
                .collect(),
            None => features.to_vec(),
        }
    }
}

impl GestureModel for LinearGestureModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &[f32]) -> ClassifierResult<String> {
        let proba = self.predict_proba(features)?;

        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        Ok(self.classes[best].clone())
    }

    fn predict_proba(&self, features: &[f32]) -> ClassifierResult<Vec<f32>> {
        if features.len() != FEATURE_VECTOR_LEN {
            return Err(ClassifierError::ClassificationFailed(format!(
                "X has {} features, but the model expects {}",
                features.len(),
                FEATURE_VECTOR_LEN
            )));
        }

        let x = self.standardize(features);
        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(self.bias.iter())
            .map(|(row, b)| row.iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f32>() + b)
            .collect();

        // f32::max skips NaN, so check every logit rather than the maximum
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(ClassifierError::ClassificationFailed(
                "non-finite logits".to_string(),
            ));
        }
        let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exp.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ClassifierError::ClassificationFailed(
                "softmax did not normalize".to_string(),
            ));
        }

        Ok(exp.into_iter().map(|e| e / total).collect())
    }

    fn describe(&self) -> String {
        format!(
            "softmax-linear ({} classes, scaler: {})",
            self.classes.len(),
            self.scaler.is_some()
        )
    }
}

// ==============================================================================
// PyO3 Implementation (pickled scikit-learn pipeline)
// ==============================================================================

#[cfg(feature = "ml-pyo3")]
pub mod pyo3_backend {
    use super::*;
    use pyo3::prelude::*;
    use pyo3::types::PyBytes;

    pub struct SklearnPickleModel {
        model: Py<PyAny>,
        classes: Vec<String>,
    }

    impl SklearnPickleModel {
        pub fn load(path: &Path) -> ModelLoadResult<Self> {
            let bytes = std::fs::read(path)?;

            Python::with_gil(|py| {
                let pickle = PyModule::import_bound(py, "pickle").map_err(|e| {
                    ModelLoadError::Python(format!("Failed to import pickle: {}", e))
                })?;

                let model = pickle
                    .call_method1("loads", (PyBytes::new_bound(py, &bytes),))
                    .map_err(|e| {
                        ModelLoadError::Python(format!("Failed to unpickle model: {}", e))
                    })?;

                let classes: Vec<String> = model
                    .getattr("classes_")
                    .and_then(|c| c.call_method0("tolist"))
                    .and_then(|c| c.extract())
                    .map_err(|e| {
                        ModelLoadError::InvalidModel(format!("Missing classes_: {}", e))
                    })?;

                Ok(Self {
                    model: model.unbind(),
                    classes,
                })
            })
        }

        fn call_row<'py>(
            &self,
            py: Python<'py>,
            method: &str,
            features: &[f32],
        ) -> ClassifierResult<Bound<'py, PyAny>> {
            let rows = vec![features.to_vec()];
            self.model
                .bind(py)
                .call_method1(method, (rows,))
                .and_then(|out| out.call_method0("tolist"))
                .map_err(|e| {
                    ClassifierError::ClassificationFailed(format!("{} failed: {}", method, e))
                })
        }
    }

    impl GestureModel for SklearnPickleModel {
        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn predict(&self, features: &[f32]) -> ClassifierResult<String> {
            Python::with_gil(|py| {
                let labels: Vec<String> = self
                    .call_row(py, "predict", features)?
                    .extract()
                    .map_err(|e| ClassifierError::ClassificationFailed(e.to_string()))?;
                labels.into_iter().next().ok_or_else(|| {
                    ClassifierError::ClassificationFailed("empty prediction".to_string())
                })
            })
        }

        fn predict_proba(&self, features: &[f32]) -> ClassifierResult<Vec<f32>> {
            Python::with_gil(|py| {
                let rows: Vec<Vec<f64>> = self
                    .call_row(py, "predict_proba", features)?
                    .extract()
                    .map_err(|e| ClassifierError::ClassificationFailed(e.to_string()))?;
                rows.into_iter()
                    .next()
                    .map(|row| row.into_iter().map(|p| p as f32).collect())
                    .ok_or_else(|| {
                        ClassifierError::ClassificationFailed("empty distribution".to_string())
                    })
            })
        }

        fn describe(&self) -> String {
            format!("scikit-learn pickle via PyO3 ({} classes)", self.classes.len())
        }
    }
}
