pub mod config;

// Per-frame pipeline
pub mod feature_vector;
pub mod frame_analyzer;
pub mod frame_annotator;
pub mod gesture_classifier;
pub mod image_codec;
pub mod ml_models;

// Sessions
pub mod session_scorer;
pub mod session_store;
