use serde::{Deserialize, Serialize};

/// Number of points in a full body-landmark set.
pub const LANDMARK_COUNT: usize = 33;

/// Normalized image-space landmark emitted by the pose detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Detector output for one video frame. Empty when no pose was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrameResult {
    pub landmarks: Vec<LandmarkPoint>,
    pub timestamp_ms: u64,
}

impl PoseFrameResult {
    pub fn new(landmarks: Vec<LandmarkPoint>, timestamp_ms: u64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
        }
    }

    pub fn empty(timestamp_ms: u64) -> Self {
        Self::new(Vec::new(), timestamp_ms)
    }

    pub fn has_pose(&self) -> bool {
        !self.landmarks.is_empty()
    }
}

/// Fixed landmark indices of the 33-point body model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum Joint {
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

impl Joint {
    pub const ALL: [Joint; LANDMARK_COUNT] = [
        Joint::Nose,
        Joint::LeftEyeInner,
        Joint::LeftEye,
        Joint::LeftEyeOuter,
        Joint::RightEyeInner,
        Joint::RightEye,
        Joint::RightEyeOuter,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::MouthLeft,
        Joint::MouthRight,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftPinky,
        Joint::RightPinky,
        Joint::LeftIndex,
        Joint::RightIndex,
        Joint::LeftThumb,
        Joint::RightThumb,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Limb whose middle joint angle drives repetition counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedLimb {
    #[default]
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl TrackedLimb {
    /// Proximal joint, vertex joint, distal joint.
    pub fn joints(self) -> (Joint, Joint, Joint) {
        match self {
            TrackedLimb::LeftArm => (Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist),
            TrackedLimb::RightArm => (Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist),
            TrackedLimb::LeftLeg => (Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle),
            TrackedLimb::RightLeg => (Joint::RightHip, Joint::RightKnee, Joint::RightAnkle),
        }
    }
}

/// Typed view over a complete landmark set.
///
/// Construction fails closed: anything other than exactly
/// [`LANDMARK_COUNT`] points is treated as "no pose".
#[derive(Debug, Clone, Copy)]
pub struct PoseLandmarks<'a> {
    points: &'a [LandmarkPoint],
    min_visibility: f32,
}

impl<'a> PoseLandmarks<'a> {
    pub fn from_frame(result: &'a PoseFrameResult, min_visibility: f32) -> Option<Self> {
        if result.landmarks.len() != LANDMARK_COUNT {
            return None;
        }
        Some(Self {
            points: &result.landmarks,
            min_visibility,
        })
    }

    pub fn points(&self) -> &'a [LandmarkPoint] {
        self.points
    }

    /// Returns the landmark for `joint` when it is finite and visible enough.
    pub fn joint(&self, joint: Joint) -> Option<LandmarkPoint> {
        self.points
            .get(joint.index())
            .copied()
            .filter(|point| point.is_finite() && point.visibility >= self.min_visibility)
    }

    pub fn limb(&self, limb: TrackedLimb) -> Option<[LandmarkPoint; 3]> {
        let (proximal, vertex, distal) = limb.joints();
        Some([self.joint(proximal)?, self.joint(vertex)?, self.joint(distal)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame() -> PoseFrameResult {
        let landmarks = (0..LANDMARK_COUNT)
            .map(|idx| LandmarkPoint::new(idx as f32 / 100.0, 0.5, 0.0, 0.9))
            .collect();
        PoseFrameResult::new(landmarks, 10)
    }

    #[test]
    fn joint_indices_match_body_model() {
        assert_eq!(Joint::LeftShoulder.index(), 11);
        assert_eq!(Joint::LeftElbow.index(), 13);
        assert_eq!(Joint::LeftWrist.index(), 15);
        assert_eq!(Joint::RightFootIndex.index(), 32);
        for (idx, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(joint.index(), idx);
        }
        assert_eq!(Joint::from_index(33), None);
    }

    #[test]
    fn default_limb_uses_left_arm_landmarks() {
        let (a, b, c) = TrackedLimb::default().joints();
        assert_eq!((a.index(), b.index(), c.index()), (11, 13, 15));
    }

    #[test]
    fn empty_or_truncated_frames_yield_no_pose() {
        assert!(PoseLandmarks::from_frame(&PoseFrameResult::empty(0), 0.0).is_none());

        let mut truncated = full_frame();
        truncated.landmarks.truncate(20);
        assert!(PoseLandmarks::from_frame(&truncated, 0.0).is_none());
    }

    #[test]
    fn limb_lookup_reads_positional_points() {
        let frame = full_frame();
        let pose = PoseLandmarks::from_frame(&frame, 0.0).unwrap();
        let [shoulder, elbow, wrist] = pose.limb(TrackedLimb::LeftArm).unwrap();
        assert_eq!(shoulder.x, 0.11);
        assert_eq!(elbow.x, 0.13);
        assert_eq!(wrist.x, 0.15);
    }

    #[test]
    fn low_visibility_or_nan_joints_are_missing() {
        let mut frame = full_frame();
        frame.landmarks[13].visibility = 0.1;
        frame.landmarks[26].x = f32::NAN;
        let pose = PoseLandmarks::from_frame(&frame, 0.5).unwrap();
        assert!(pose.limb(TrackedLimb::LeftArm).is_none());
        assert!(pose.limb(TrackedLimb::RightLeg).is_none());
        assert!(pose.limb(TrackedLimb::RightArm).is_some());
    }
}
