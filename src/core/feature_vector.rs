// Feature extraction: flattens a landmark set into the classifier's input layout

use crate::models::pose::{LandmarkSet, FACE_LANDMARK_COUNT, POSE_LANDMARK_COUNT};

/// Values stored per landmark: x, y, z, visibility
pub const VALUES_PER_LANDMARK: usize = 4;

/// 33 * 4 + 468 * 4
pub const FEATURE_VECTOR_LEN: usize =
    (POSE_LANDMARK_COUNT + FACE_LANDMARK_COUNT) * VALUES_PER_LANDMARK;

/// Offset of the first face value
pub const FACE_SLICE_START: usize = POSE_LANDMARK_COUNT * VALUES_PER_LANDMARK;

/// Fixed-length classifier input
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pose_slice(&self) -> &[f32] {
        &self.0[..FACE_SLICE_START]
    }

    pub fn face_slice(&self) -> &[f32] {
        &self.0[FACE_SLICE_START..]
    }
}

/// Build the feature vector for one frame.
///
/// Layout: `[x, y, z, visibility]` for each of the 33 pose landmarks, then
/// `[x, y, z, 0]` for each of the 468 face landmarks. A missing face is
/// zero-filled. Returns `None` without a pose, since there is no person to
/// classify.
pub fn build(landmarks: &LandmarkSet) -> Option<FeatureVector> {
    let pose = landmarks.pose.as_ref()?;

    let mut values = Vec::with_capacity(FEATURE_VECTOR_LEN);
    for point in pose.landmarks() {
        values.extend_from_slice(&[point.x, point.y, point.z, point.visibility]);
    }

    match &landmarks.face {
        Some(face) => {
            for point in face.landmarks() {
                values.extend_from_slice(&[point.x, point.y, point.z, 0.0]);
            }
        }
        None => values.resize(FEATURE_VECTOR_LEN, 0.0),
    }

    debug_assert_eq!(values.len(), FEATURE_VECTOR_LEN);
    Some(FeatureVector(values))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::pose::{BodyPose, FaceMesh, LandmarkPoint};

    pub(crate) fn sample_pose() -> BodyPose {
        let points = (0..POSE_LANDMARK_COUNT)
            .map(|i| {
                let t = i as f32 / POSE_LANDMARK_COUNT as f32;
                LandmarkPoint::new(0.2 + 0.6 * t, 0.1 + 0.8 * t, -0.1 * t, 0.9)
            })
            .collect();
        BodyPose::new(points).unwrap()
    }

    pub(crate) fn sample_face() -> FaceMesh {
        let points = (0..FACE_LANDMARK_COUNT)
            .map(|i| LandmarkPoint::new(0.4 + i as f32 * 1e-4, 0.2, 0.01, 0.7))
            .collect();
        FaceMesh::new(points).unwrap()
    }

    #[test]
    fn test_no_pose_yields_none() {
        assert!(build(&LandmarkSet::empty()).is_none());

        let face_only = LandmarkSet {
            pose: None,
            face: Some(sample_face()),
        };
        assert!(build(&face_only).is_none());
    }

    #[test]
    fn test_missing_face_is_zero_filled() {
        let set = LandmarkSet {
            pose: Some(sample_pose()),
            face: None,
        };
        let vector = build(&set).unwrap();

        assert_eq!(vector.len(), FEATURE_VECTOR_LEN);
        assert_eq!(vector.len(), 2004);
        assert_eq!(vector.face_slice().len(), 1872);
        assert!(vector.face_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_pose_layout_keeps_visibility() {
        let pose = sample_pose();
        let set = LandmarkSet {
            pose: Some(pose.clone()),
            face: None,
        };
        let vector = build(&set).unwrap();

        for (i, point) in pose.landmarks().iter().enumerate() {
            let chunk = &vector.pose_slice()[i * 4..i * 4 + 4];
            assert_eq!(chunk, &[point.x, point.y, point.z, point.visibility]);
        }
    }

    #[test]
    fn test_face_visibility_is_zeroed() {
        let face = sample_face();
        let set = LandmarkSet {
            pose: Some(sample_pose()),
            face: Some(face.clone()),
        };
        let vector = build(&set).unwrap();

        assert_eq!(vector.len(), FEATURE_VECTOR_LEN);
        for (i, point) in face.landmarks().iter().enumerate() {
            let chunk = &vector.face_slice()[i * 4..i * 4 + 4];
            assert_eq!(chunk, &[point.x, point.y, point.z, 0.0]);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let set = LandmarkSet {
            pose: Some(sample_pose()),
            face: Some(sample_face()),
        };
        assert_eq!(build(&set), build(&set));
    }
}
