use serde::{Deserialize, Serialize};

/// Phase of the tracked joint between two angle thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepPhase {
    #[default]
    Extended,
    Contracted,
}

/// Hysteresis band for repetition detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepThresholds {
    /// Angle below which an extended joint counts as contracted.
    pub contract_deg: f32,
    /// Angle above which a contracted joint counts as extended again.
    pub extend_deg: f32,
}

impl Default for RepThresholds {
    fn default() -> Self {
        Self {
            contract_deg: 60.0,
            extend_deg: 160.0,
        }
    }
}

/// Emitted once per completed contraction → extension cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepDetected;

/// Two-threshold state machine over joint-angle samples.
#[derive(Debug, Clone)]
pub struct RepDetector {
    phase: RepPhase,
    thresholds: RepThresholds,
}

impl RepDetector {
    pub fn new(thresholds: RepThresholds) -> Self {
        Self {
            phase: RepPhase::Extended,
            thresholds,
        }
    }

    pub fn phase(&self) -> RepPhase {
        self.phase
    }

    pub fn thresholds(&self) -> RepThresholds {
        self.thresholds
    }

    pub fn observe(&mut self, angle_deg: f32) -> Option<RepDetected> {
        match self.phase {
            RepPhase::Extended if angle_deg < self.thresholds.contract_deg => {
                self.phase = RepPhase::Contracted;
                None
            }
            RepPhase::Contracted if angle_deg > self.thresholds.extend_deg => {
                self.phase = RepPhase::Extended;
                Some(RepDetected)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.phase = RepPhase::Extended;
    }
}

impl Default for RepDetector {
    fn default() -> Self {
        Self::new(RepThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(samples: &[f32]) -> Vec<usize> {
        let mut detector = RepDetector::default();
        samples
            .iter()
            .enumerate()
            .filter_map(|(idx, &angle)| detector.observe(angle).map(|_| idx))
            .collect()
    }

    #[test]
    fn single_cycle_fires_on_final_extension() {
        assert_eq!(events(&[170.0, 150.0, 80.0, 40.0, 90.0, 165.0]), vec![5]);
    }

    #[test]
    fn oscillation_inside_band_never_fires() {
        let samples: Vec<f32> = (0..200)
            .map(|i| 110.0 + 50.0 * (i as f32 * 0.3).sin())
            .collect();
        assert!(events(&samples).is_empty());
    }

    #[test]
    fn threshold_values_themselves_do_not_transition() {
        let mut detector = RepDetector::default();
        assert_eq!(detector.observe(60.0), None);
        assert_eq!(detector.phase(), RepPhase::Extended);
        assert_eq!(detector.observe(59.9), None);
        assert_eq!(detector.phase(), RepPhase::Contracted);
        assert_eq!(detector.observe(160.0), None);
        assert_eq!(detector.phase(), RepPhase::Contracted);
        assert_eq!(detector.observe(160.1), Some(RepDetected));
    }

    #[test]
    fn noise_near_one_boundary_counts_once() {
        let samples = [
            170.0, 59.0, 61.0, 58.0, 62.0, 57.0, 159.0, 161.0, 159.0, 162.0, 158.0,
        ];
        assert_eq!(events(&samples), vec![7]);
    }

    #[test]
    fn repeated_cycles_count_each_rep() {
        let cycle = [170.0, 100.0, 45.0, 100.0, 170.0];
        let samples: Vec<f32> = cycle.iter().copied().cycle().take(cycle.len() * 4).collect();
        assert_eq!(events(&samples).len(), 4);
    }

    #[test]
    fn first_event_appears_iff_low_crossing_precedes_high_crossing() {
        // Deterministic pseudo-random angle streams.
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..500 {
            let samples: Vec<f32> = (0..12)
                .map(|_| {
                    seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                    (seed >> 8) as f32 / (1u32 << 24) as f32 * 180.0
                })
                .collect();
            let expected = samples.iter().enumerate().any(|(i, &low)| {
                low < 60.0 && samples[i + 1..].iter().any(|&high| high > 160.0)
            });
            assert_eq!(!events(&samples).is_empty(), expected, "{samples:?}");
        }
    }

    #[test]
    fn reset_returns_to_extended() {
        let mut detector = RepDetector::default();
        detector.observe(30.0);
        assert_eq!(detector.phase(), RepPhase::Contracted);
        detector.reset();
        assert_eq!(detector.phase(), RepPhase::Extended);
        assert_eq!(detector.observe(170.0), None);
    }

    #[test]
    fn custom_thresholds_keep_hysteresis_shape() {
        let mut detector = RepDetector::new(RepThresholds {
            contract_deg: 90.0,
            extend_deg: 160.0,
        });
        assert_eq!(detector.observe(85.0), None);
        assert_eq!(detector.observe(165.0), Some(RepDetected));
    }
}
