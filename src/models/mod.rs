// Data models for landmark detection, gesture classification and analysis sessions

pub mod gesture;
pub mod pose;
pub mod session;
