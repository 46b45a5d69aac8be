use crate::pose_interface::LandmarkPoint;

/// Limb segments shorter than this (in normalized units) have no direction.
const MIN_SEGMENT_LENGTH: f32 = 1e-6;

pub struct AngleHelper;

impl AngleHelper {
    /// Included angle at vertex `b` between the segments `b→a` and `b→c`, in
    /// degrees within `[0, 180]`.
    ///
    /// Returns `None` when either segment collapses onto the vertex or any
    /// coordinate is non-finite.
    pub fn angle_at(a: &LandmarkPoint, b: &LandmarkPoint, c: &LandmarkPoint) -> Option<f32> {
        let (ax, ay) = (a.x - b.x, a.y - b.y);
        let (cx, cy) = (c.x - b.x, c.y - b.y);
        if ![ax, ay, cx, cy].iter().all(|v| v.is_finite()) {
            return None;
        }
        if ax.hypot(ay) < MIN_SEGMENT_LENGTH || cx.hypot(cy) < MIN_SEGMENT_LENGTH {
            return None;
        }

        let radians = cy.atan2(cx) - ay.atan2(ax);
        let mut angle = radians.to_degrees().abs();
        if angle > 180.0 {
            angle = 360.0 - angle;
        }
        Some(angle.clamp(0.0, 180.0))
    }
}
