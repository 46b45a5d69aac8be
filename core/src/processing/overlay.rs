use crate::pose_interface::{Joint, LandmarkPoint};

/// Bone segments of the 33-point body model.
pub const POSE_CONNECTIONS: [(Joint, Joint); 35] = [
    (Joint::Nose, Joint::LeftEyeInner),
    (Joint::LeftEyeInner, Joint::LeftEye),
    (Joint::LeftEye, Joint::LeftEyeOuter),
    (Joint::LeftEyeOuter, Joint::LeftEar),
    (Joint::Nose, Joint::RightEyeInner),
    (Joint::RightEyeInner, Joint::RightEye),
    (Joint::RightEye, Joint::RightEyeOuter),
    (Joint::RightEyeOuter, Joint::RightEar),
    (Joint::MouthLeft, Joint::MouthRight),
    (Joint::LeftShoulder, Joint::RightShoulder),
    (Joint::LeftShoulder, Joint::LeftElbow),
    (Joint::LeftElbow, Joint::LeftWrist),
    (Joint::LeftWrist, Joint::LeftPinky),
    (Joint::LeftWrist, Joint::LeftIndex),
    (Joint::LeftWrist, Joint::LeftThumb),
    (Joint::LeftPinky, Joint::LeftIndex),
    (Joint::RightShoulder, Joint::RightElbow),
    (Joint::RightElbow, Joint::RightWrist),
    (Joint::RightWrist, Joint::RightPinky),
    (Joint::RightWrist, Joint::RightIndex),
    (Joint::RightWrist, Joint::RightThumb),
    (Joint::RightPinky, Joint::RightIndex),
    (Joint::LeftShoulder, Joint::LeftHip),
    (Joint::RightShoulder, Joint::RightHip),
    (Joint::LeftHip, Joint::RightHip),
    (Joint::LeftHip, Joint::LeftKnee),
    (Joint::RightHip, Joint::RightKnee),
    (Joint::LeftKnee, Joint::LeftAnkle),
    (Joint::RightKnee, Joint::RightAnkle),
    (Joint::LeftAnkle, Joint::LeftHeel),
    (Joint::RightAnkle, Joint::RightHeel),
    (Joint::LeftHeel, Joint::LeftFootIndex),
    (Joint::RightHeel, Joint::RightFootIndex),
    (Joint::LeftAnkle, Joint::LeftFootIndex),
    (Joint::RightAnkle, Joint::RightFootIndex),
];

/// Draw instruction for one frame's skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonOverlay {
    pub landmarks: Vec<LandmarkPoint>,
    pub connections: &'static [(Joint, Joint)],
}

impl SkeletonOverlay {
    pub fn new(landmarks: &[LandmarkPoint]) -> Self {
        Self {
            landmarks: landmarks.to_vec(),
            connections: &POSE_CONNECTIONS,
        }
    }

    /// Endpoint pairs for every connection whose joints are present.
    pub fn segments(&self) -> impl Iterator<Item = (LandmarkPoint, LandmarkPoint)> + '_ {
        self.connections.iter().filter_map(|(from, to)| {
            Some((
                *self.landmarks.get(from.index())?,
                *self.landmarks.get(to.index())?,
            ))
        })
    }
}

/// Rendering collaborator that receives skeleton draw instructions.
pub trait OverlaySink: Send + 'static {
    fn clear(&mut self);
    fn draw(&mut self, overlay: &SkeletonOverlay);
}

/// Sink for headless sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOverlay;

impl OverlaySink for NullOverlay {
    fn clear(&mut self) {}

    fn draw(&mut self, _overlay: &SkeletonOverlay) {}
}
