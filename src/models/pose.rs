// Data models for body pose and face landmark tracking

use serde::{Deserialize, Serialize};

/// Number of MediaPipe Pose landmarks
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Number of MediaPipe Face Mesh landmarks
pub const FACE_LANDMARK_COUNT: usize = 468;

// ==============================================================================
// Shared: Landmark Point
// ==============================================================================

/// A normalized 3D landmark with a visibility score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32, // Normalized [0, 1] for image coordinates
    pub y: f32, // Normalized [0, 1] for image coordinates
    pub z: f32, // Depth relative to the hip midpoint (body) or face center
    #[serde(default)]
    pub visibility: f32, // Pose only; always 0 for face landmarks
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }
}

// ==============================================================================
// Body Pose (33 keypoints)
// ==============================================================================

/// Body pose from MediaPipe Pose, always exactly 33 landmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LandmarkPoint>", into = "Vec<LandmarkPoint>")]
pub struct BodyPose {
    landmarks: Vec<LandmarkPoint>,
}

impl BodyPose {
    pub fn new(landmarks: Vec<LandmarkPoint>) -> PoseResult<Self> {
        if landmarks.len() != POSE_LANDMARK_COUNT {
            return Err(PoseError::InvalidLandmarks {
                kind: "pose",
                expected: POSE_LANDMARK_COUNT,
                actual: landmarks.len(),
            });
        }
        Ok(Self { landmarks })
    }

    pub fn landmarks(&self) -> &[LandmarkPoint] {
        &self.landmarks
    }
}

impl TryFrom<Vec<LandmarkPoint>> for BodyPose {
    type Error = PoseError;

    fn try_from(landmarks: Vec<LandmarkPoint>) -> PoseResult<Self> {
        Self::new(landmarks)
    }
}

impl From<BodyPose> for Vec<LandmarkPoint> {
    fn from(pose: BodyPose) -> Self {
        pose.landmarks
    }
}

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

/// Skeleton edges, same set as MediaPipe's POSE_CONNECTIONS
pub const POSE_CONNECTIONS: [(BodyLandmark, BodyLandmark); 35] = {
    use BodyLandmark::*;
    [
        (Nose, LeftEyeInner),
        (LeftEyeInner, LeftEye),
        (LeftEye, LeftEyeOuter),
        (LeftEyeOuter, LeftEar),
        (Nose, RightEyeInner),
        (RightEyeInner, RightEye),
        (RightEye, RightEyeOuter),
        (RightEyeOuter, RightEar),
        (MouthLeft, MouthRight),
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (LeftWrist, LeftPinky),
        (LeftWrist, LeftIndex),
        (LeftWrist, LeftThumb),
        (LeftPinky, LeftIndex),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightWrist, RightPinky),
        (RightWrist, RightIndex),
        (RightWrist, RightThumb),
        (RightPinky, RightIndex),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
        (LeftAnkle, LeftHeel),
        (RightAnkle, RightHeel),
        (LeftHeel, LeftFootIndex),
        (RightHeel, RightFootIndex),
        (LeftAnkle, LeftFootIndex),
        (RightAnkle, RightFootIndex),
    ]
};

// ==============================================================================
// Face Mesh (468 landmarks)
// ==============================================================================

/// Facial landmarks from MediaPipe Face Mesh, always exactly 468 points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LandmarkPoint>", into = "Vec<LandmarkPoint>")]
pub struct FaceMesh {
    landmarks: Vec<LandmarkPoint>,
}

impl FaceMesh {
    pub fn new(landmarks: Vec<LandmarkPoint>) -> PoseResult<Self> {
        if landmarks.len() != FACE_LANDMARK_COUNT {
            return Err(PoseError::InvalidLandmarks {
                kind: "face",
                expected: FACE_LANDMARK_COUNT,
                actual: landmarks.len(),
            });
        }
        Ok(Self { landmarks })
    }

    pub fn landmarks(&self) -> &[LandmarkPoint] {
        &self.landmarks
    }
}

impl TryFrom<Vec<LandmarkPoint>> for FaceMesh {
    type Error = PoseError;

    fn try_from(landmarks: Vec<LandmarkPoint>) -> PoseResult<Self> {
        Self::new(landmarks)
    }
}

impl From<FaceMesh> for Vec<LandmarkPoint> {
    fn from(face: FaceMesh) -> Self {
        face.landmarks
    }
}

// ==============================================================================
// Landmark Set (Unified Result)
// ==============================================================================

/// Everything the landmark detector found in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub pose: Option<BodyPose>,
    pub face: Option<FaceMesh>,
}

impl LandmarkSet {
    /// No person in frame
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_pose(&self) -> bool {
        self.pose.is_some()
    }

    pub fn has_face(&self) -> bool {
        self.face.is_some()
    }
}

// ==============================================================================
// Configuration
// ==============================================================================

/// Landmark detector settings. Detection and tracking thresholds are fixed at
/// 0.5 and are not adjusted per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseConfig {
    pub enable_face_tracking: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub static_image_mode: bool, // false = track across consecutive frames
    pub model_complexity: ModelComplexity,
    pub python_module_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelComplexity {
    Lite = 0,   // Fastest, less accurate
    Full = 1,   // Balanced
    Heavy = 2,  // Slowest, most accurate
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            enable_face_tracking: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            static_image_mode: false,
            model_complexity: ModelComplexity::Full,
            python_module_dir: None,
        }
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Model loading failed: {0}")]
    ModelLoadFailed(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Expected {expected} {kind} landmarks, got {actual}")]
    InvalidLandmarks {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type PoseResult<T> = Result<T, PoseError>;
