// MediaPipe integration bridge
// Abstracts the holistic landmark model behind one trait. The real backend runs
// MediaPipe through PyO3; without it every frame reports no person.

use crate::models::pose::{
    BodyPose, FaceMesh, LandmarkPoint, LandmarkSet, PoseConfig, PoseError, PoseResult,
};
use image::RgbImage;
use serde_json::Value;
use tracing::{info, warn};

/// MediaPipe bridge trait
pub trait MediaPipeBridge: Send + Sync {
    /// Initialize the MediaPipe models
    fn new(config: &PoseConfig) -> PoseResult<Self>
    where
        Self: Sized;

    /// Landmarks for one frame. `pose` is `None` when no person was found.
    fn detect(&self, frame: &RgbImage) -> PoseResult<LandmarkSet>;

    /// Check if models are loaded
    fn is_initialized(&self) -> bool;

    fn model_info(&self) -> String;
}

/// Build the compile-time default backend, falling back to the no-op bridge
/// when it cannot start
pub fn create_detector(config: &PoseConfig) -> Box<dyn MediaPipeBridge> {
    match DefaultMediaPipe::new(config) {
        Ok(detector) => {
            info!(backend = %detector.model_info(), "landmark detector ready");
            Box::new(detector)
        }
        Err(e) => {
            warn!(
                error = %e,
                "landmark detector failed to initialize, frames will report no person"
            );
            Box::new(NoopMediaPipe {
                enable_face_tracking: config.enable_face_tracking,
            })
        }
    }
}

// ==============================================================================
// Result parsing
// ==============================================================================

/// Parse the helper's JSON result:
/// `{"body_pose": {"keypoints": [...]}|null, "face_mesh": {"landmarks": [...]}|null}`
pub fn parse_inference_result(result: &Value, enable_face: bool) -> PoseResult<LandmarkSet> {
    let pose = match result.get("body_pose") {
        Some(data) if !data.is_null() => Some(parse_body_pose(data)?),
        _ => None,
    };

    let face = match result.get("face_mesh") {
        Some(data) if enable_face && !data.is_null() => Some(parse_face_mesh(data)?),
        _ => None,
    };

    Ok(LandmarkSet { pose, face })
}

fn parse_body_pose(data: &Value) -> PoseResult<BodyPose> {
    let keypoints = data
        .get("keypoints")
        .and_then(|k| k.as_array())
        .ok_or_else(|| PoseError::InferenceFailed("Missing body keypoints".to_string()))?;

    BodyPose::new(keypoints.iter().map(|kp| parse_point(kp, true)).collect())
}

fn parse_face_mesh(data: &Value) -> PoseResult<FaceMesh> {
    let landmarks = data
        .get("landmarks")
        .and_then(|l| l.as_array())
        .ok_or_else(|| PoseError::InferenceFailed("Missing face landmarks".to_string()))?;

    FaceMesh::new(landmarks.iter().map(|lm| parse_point(lm, false)).collect())
}

fn parse_point(value: &Value, with_visibility: bool) -> LandmarkPoint {
    let field = |name: &str| value.get(name).and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    let visibility = if with_visibility { field("visibility") } else { 0.0 };
    LandmarkPoint::new(field("x"), field("y"), field("z"), visibility)
}

// ==============================================================================
// PyO3 Implementation (Python MediaPipe)
// ==============================================================================

#[cfg(feature = "ml-pyo3")]
pub mod pyo3_backend {
    use super::*;
    use pyo3::prelude::*;
    use pyo3::types::{PyBytes, PyDict};

    const INSTALL_HINT: &str =
        "Make sure Python dependencies are installed (pip install mediapipe numpy)";

    /// Calls `mediapipe_inference.process_image_bytes` from `python/`
    pub struct PyO3MediaPipe {
        inference_module: Py<PyModule>,
        config: PoseConfig,
    }

    impl MediaPipeBridge for PyO3MediaPipe {
        fn new(config: &PoseConfig) -> PoseResult<Self> {
            Python::with_gil(|py| {
                let sys = PyModule::import_bound(py, "sys").map_err(|e| {
                    PoseError::ModelLoadFailed(format!("Failed to import sys: {}", e))
                })?;

                let path_list = sys.getattr("path").map_err(|e| {
                    PoseError::ModelLoadFailed(format!("Failed to get sys.path: {}", e))
                })?;

                let python_dir = match &config.python_module_dir {
                    Some(dir) => dir.clone(),
                    None => std::env::current_dir()
                        .map_err(|e| PoseError::ModelLoadFailed(e.to_string()))?
                        .join("python"),
                };

                path_list
                    .call_method1("insert", (0, python_dir.to_string_lossy().into_owned()))
                    .map_err(|e| {
                        PoseError::ModelLoadFailed(format!(
                            "Failed to add python dir to path: {}",
                            e
                        ))
                    })?;

                let inference_module = PyModule::import_bound(py, "mediapipe_inference")
                    .map_err(|e| {
                        PoseError::ModelLoadFailed(format!(
                            "Failed to import mediapipe_inference: {}. {}",
                            e, INSTALL_HINT
                        ))
                    })?;

                Ok(Self {
                    inference_module: inference_module.unbind(),
                    config: config.clone(),
                })
            })
        }

        fn detect(&self, frame: &RgbImage) -> PoseResult<LandmarkSet> {
            let (width, height) = frame.dimensions();

            let json_str: String = Python::with_gil(|py| {
                let module = self.inference_module.bind(py);

                let kwargs = PyDict::new_bound(py);
                let set = |key: &str, value: PyObject| {
                    kwargs
                        .set_item(key, value)
                        .map_err(|e| {
                            PoseError::InferenceFailed(format!("Failed to set {}: {}", key, e))
                        })
                };
                set("image_bytes", PyBytes::new_bound(py, frame.as_raw()).into_py(py))?;
                set("width", width.into_py(py))?;
                set("height", height.into_py(py))?;
                set("enable_face", self.config.enable_face_tracking.into_py(py))?;
                set("min_detection_confidence", self.config.min_detection_confidence.into_py(py))?;
                set("min_tracking_confidence", self.config.min_tracking_confidence.into_py(py))?;
                set("static_image_mode", self.config.static_image_mode.into_py(py))?;
                set("model_complexity", (self.config.model_complexity as u8).into_py(py))?;

                module
                    .call_method("process_image_bytes", (), Some(&kwargs))
                    .map_err(|e| {
                        PoseError::InferenceFailed(format!("MediaPipe inference failed: {}", e))
                    })?
                    .extract()
                    .map_err(|e| {
                        PoseError::InferenceFailed(format!("Failed to extract JSON: {}", e))
                    })
            })?;

            let result: Value = serde_json::from_str(&json_str)
                .map_err(|e| PoseError::InferenceFailed(format!("Failed to parse JSON: {}", e)))?;

            parse_inference_result(&result, self.config.enable_face_tracking)
        }

        fn is_initialized(&self) -> bool {
            true
        }

        fn model_info(&self) -> String {
            format!(
                "PyO3 MediaPipe Holistic (complexity {:?}, face: {})",
                self.config.model_complexity, self.config.enable_face_tracking
            )
        }
    }
}

// ==============================================================================
// No-op Implementation
// ==============================================================================

/// Reports no person in every frame. Used when no inference backend is
/// compiled in or the backend failed to start.
pub struct NoopMediaPipe {
    enable_face_tracking: bool,
}

impl MediaPipeBridge for NoopMediaPipe {
    fn new(config: &PoseConfig) -> PoseResult<Self> {
        Ok(Self {
            enable_face_tracking: config.enable_face_tracking,
        })
    }

    fn detect(&self, _frame: &RgbImage) -> PoseResult<LandmarkSet> {
        Ok(LandmarkSet::empty())
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn model_info(&self) -> String {
        format!(
            "No-op MediaPipe (no inference, enable the 'ml-pyo3' feature; face: {})",
            self.enable_face_tracking
        )
    }
}

// ==============================================================================
// Default Backend Selection
// ==============================================================================

#[cfg(feature = "ml-pyo3")]
pub type DefaultMediaPipe = pyo3_backend::PyO3MediaPipe;

#[cfg(not(feature = "ml-pyo3"))]
pub type DefaultMediaPipe = NoopMediaPipe;
