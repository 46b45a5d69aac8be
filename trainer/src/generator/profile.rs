use rand::{rngs::StdRng, Rng};
use repcore::pose_interface::{Joint, LandmarkPoint, PoseFrameResult, TrackedLimb, LANDMARK_COUNT};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Length of the moving limb segments in normalized image units.
const SEGMENT: f32 = 0.14;
const VISIBILITY: f32 = 0.9;

/// Neutral standing pose, indexed like [`Joint`].
const STANDING: [(f32, f32); LANDMARK_COUNT] = [
    (0.50, 0.15),
    (0.51, 0.13),
    (0.52, 0.13),
    (0.53, 0.13),
    (0.49, 0.13),
    (0.48, 0.13),
    (0.47, 0.13),
    (0.55, 0.14),
    (0.45, 0.14),
    (0.52, 0.18),
    (0.48, 0.18),
    (0.60, 0.28),
    (0.40, 0.28),
    (0.64, 0.42),
    (0.36, 0.42),
    (0.66, 0.55),
    (0.34, 0.55),
    (0.67, 0.58),
    (0.33, 0.58),
    (0.66, 0.59),
    (0.34, 0.59),
    (0.65, 0.57),
    (0.35, 0.57),
    (0.56, 0.58),
    (0.44, 0.58),
    (0.57, 0.75),
    (0.43, 0.75),
    (0.57, 0.92),
    (0.43, 0.92),
    (0.56, 0.94),
    (0.44, 0.94),
    (0.60, 0.95),
    (0.40, 0.95),
];

/// Synthetic joint-angle motion: a cosine sweep between the extended and
/// contracted angles, starting extended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionProfile {
    pub min_angle_deg: f32,
    pub max_angle_deg: f32,
    /// Duration of one full rep.
    pub period_ms: u64,
    /// Peak uniform jitter added to every sample.
    pub noise_deg: f32,
    /// Every n-th frame comes back without a pose. Zero disables dropouts.
    pub dropout_every: u64,
    pub inference_latency_ms: u64,
    pub load_latency_ms: u64,
    pub seed: u64,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            min_angle_deg: 35.0,
            max_angle_deg: 170.0,
            period_ms: 1_600,
            noise_deg: 2.0,
            dropout_every: 0,
            inference_latency_ms: 8,
            load_latency_ms: 250,
            seed: 7,
        }
    }
}

impl MotionProfile {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=180.0).contains(&self.min_angle_deg)
            || !(0.0..=180.0).contains(&self.max_angle_deg)
            || self.min_angle_deg >= self.max_angle_deg
        {
            anyhow::bail!(
                "motion angles must satisfy 0 <= min ({}) < max ({}) <= 180",
                self.min_angle_deg,
                self.max_angle_deg
            );
        }
        if self.period_ms == 0 {
            anyhow::bail!("motion period must be at least 1 ms");
        }
        if !self.noise_deg.is_finite() || self.noise_deg < 0.0 {
            anyhow::bail!("motion noise must be a non-negative number of degrees");
        }
        Ok(())
    }

    /// Noise-free angle at `timestamp_ms`.
    pub fn angle_at(&self, timestamp_ms: u64) -> f32 {
        let mid = (self.max_angle_deg + self.min_angle_deg) / 2.0;
        let amplitude = (self.max_angle_deg - self.min_angle_deg) / 2.0;
        let phase = (timestamp_ms % self.period_ms) as f32 / self.period_ms as f32;
        mid + amplitude * (2.0 * PI * phase).cos()
    }

    pub fn sample(&self, timestamp_ms: u64, rng: &mut StdRng) -> f32 {
        let jitter = if self.noise_deg > 0.0 {
            rng.gen_range(-self.noise_deg..self.noise_deg)
        } else {
            0.0
        };
        (self.angle_at(timestamp_ms) + jitter).clamp(0.0, 180.0)
    }
}

/// Standing pose with `limb` bent to `angle_deg` at its middle joint.
pub fn build_pose(angle_deg: f32, limb: TrackedLimb, timestamp_ms: u64) -> PoseFrameResult {
    let mut landmarks: Vec<LandmarkPoint> = STANDING
        .iter()
        .map(|&(x, y)| LandmarkPoint::new(x, y, 0.0, VISIBILITY))
        .collect();

    let (proximal, vertex, distal) = limb.joints();
    let side = match limb {
        TrackedLimb::LeftArm | TrackedLimb::LeftLeg => 1.0,
        TrackedLimb::RightArm | TrackedLimb::RightLeg => -1.0,
    };
    let (vx, vy) = STANDING[vertex.index()];
    let theta = angle_deg.to_radians();

    set_point(&mut landmarks, proximal, vx, vy - SEGMENT);
    set_point(
        &mut landmarks,
        distal,
        vx + side * SEGMENT * theta.sin(),
        vy - SEGMENT * theta.cos(),
    );

    PoseFrameResult::new(landmarks, timestamp_ms)
}

fn set_point(landmarks: &mut [LandmarkPoint], joint: Joint, x: f32, y: f32) {
    landmarks[joint.index()] = LandmarkPoint::new(x, y, 0.0, VISIBILITY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use repcore::math::AngleHelper;
    use repcore::pose_interface::PoseLandmarks;

    #[test]
    fn sweep_starts_extended_and_bottoms_out_mid_period() {
        let profile = MotionProfile {
            noise_deg: 0.0,
            ..Default::default()
        };
        assert!((profile.angle_at(0) - 170.0).abs() < 1e-3);
        assert!((profile.angle_at(800) - 35.0).abs() < 1e-3);
        assert!((profile.angle_at(1_600) - 170.0).abs() < 1e-3);
    }

    #[test]
    fn noisy_samples_stay_within_bounds() {
        let profile = MotionProfile {
            min_angle_deg: 0.0,
            max_angle_deg: 180.0,
            noise_deg: 10.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        for t in (0..5_000).step_by(16) {
            let angle = profile.sample(t, &mut rng);
            assert!((0.0..=180.0).contains(&angle));
        }
    }

    #[test]
    fn built_pose_measures_requested_angle_for_every_limb() {
        for limb in [
            TrackedLimb::LeftArm,
            TrackedLimb::RightArm,
            TrackedLimb::LeftLeg,
            TrackedLimb::RightLeg,
        ] {
            for angle in [20.0_f32, 60.0, 95.0, 140.0, 175.0] {
                let result = build_pose(angle, limb, 0);
                let pose = PoseLandmarks::from_frame(&result, 0.5).unwrap();
                let [a, b, c] = pose.limb(limb).unwrap();
                let measured = AngleHelper::angle_at(&a, &b, &c).unwrap();
                assert!(
                    (measured - angle).abs() < 0.05,
                    "{limb:?}: expected {angle}, measured {measured}"
                );
            }
        }
    }

    #[test]
    fn inverted_angles_are_rejected() {
        let profile = MotionProfile {
            min_angle_deg: 120.0,
            max_angle_deg: 90.0,
            ..Default::default()
        };
        assert!(profile.validate().is_err());
        assert!(MotionProfile::default().validate().is_ok());
    }
}
