// Pose estimation platform integration

pub mod mediapipe_bridge;

pub use mediapipe_bridge::{create_detector, DefaultMediaPipe, MediaPipeBridge, NoopMediaPipe};
