use crate::msgs::{DetectedObjects, RadarInput};
use serde::{Deserialize, Serialize};

/// Weight sums below this collapse to a pure median estimate.
pub const WEIGHT_SUM_EPSILON: f64 = 0.01;

/// Fusion configuration. Weights are normalized by
/// [`RadarFusionToDetectedObject::set_param`](crate::fusion::RadarFusionToDetectedObject::set_param).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Param {
    /// Uniform expansion of the object footprint used for association, in metres.
    pub bounding_box_margin: f64,
    /// Velocity disagreement that would justify splitting an object.
    pub split_threshold_velocity: f64,
    pub velocity_weight_median: f64,
    pub velocity_weight_average: f64,
    pub velocity_weight_target_value_average: f64,
    pub velocity_weight_target_value_top: f64,
    /// Classification probability floor for emitted objects.
    pub threshold_probability: f64,
    pub convert_doppler_to_twist: bool,
}

impl Default for Param {
    fn default() -> Self {
        Self {
            bounding_box_margin: 2.0,
            split_threshold_velocity: 5.0,
            velocity_weight_median: 0.5,
            velocity_weight_average: 0.0,
            velocity_weight_target_value_average: 0.0,
            velocity_weight_target_value_top: 0.5,
            threshold_probability: 0.4,
            convert_doppler_to_twist: false,
        }
    }
}

impl Param {
    /// Returns a copy whose velocity weights are non-negative and sum to one.
    ///
    /// Negative and NaN weights count as zero. Infinite weights share the
    /// whole mass equally.
    pub fn normalized(&self) -> Self {
        let mut weights = [
            self.velocity_weight_median,
            self.velocity_weight_average,
            self.velocity_weight_target_value_average,
            self.velocity_weight_target_value_top,
        ]
        .map(|weight| weight.max(0.0));
        if weights.iter().any(|weight| weight.is_infinite()) {
            weights = weights.map(|weight| if weight.is_infinite() { 1.0 } else { 0.0 });
        }

        // may overflow to inf for huge weights, which still passes the check
        let sum_weight: f64 = weights.iter().sum();
        let weights = if sum_weight < WEIGHT_SUM_EPSILON {
            [1.0, 0.0, 0.0, 0.0]
        } else {
            let largest = weights.iter().copied().fold(0.0, f64::max);
            let scaled = weights.map(|weight| weight / largest);
            let scaled_sum: f64 = scaled.iter().sum();
            scaled.map(|weight| weight / scaled_sum)
        };

        let mut normalized = self.clone();
        normalized.velocity_weight_median = weights[0];
        normalized.velocity_weight_average = weights[1];
        normalized.velocity_weight_target_value_average = weights[2];
        normalized.velocity_weight_target_value_top = weights[3];
        normalized
    }

    /// Domain checks for collaborators that accept configuration from outside.
    ///
    /// The fusion core never calls this; it only normalizes weights.
    pub fn validate(&self) -> Result<(), ParamError> {
        let non_negative = [
            ("bounding_box_margin", self.bounding_box_margin),
            ("split_threshold_velocity", self.split_threshold_velocity),
            ("velocity_weight_median", self.velocity_weight_median),
            ("velocity_weight_average", self.velocity_weight_average),
            (
                "velocity_weight_target_value_average",
                self.velocity_weight_target_value_average,
            ),
            (
                "velocity_weight_target_value_top",
                self.velocity_weight_target_value_top,
            ),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() {
                return Err(ParamError::NotFinite { name, value });
            }
            if value < 0.0 {
                return Err(ParamError::Negative { name, value });
            }
        }

        if !(0.0..=1.0).contains(&self.threshold_probability) {
            return Err(ParamError::ProbabilityOutOfRange(
                self.threshold_probability,
            ));
        }
        Ok(())
    }
}

/// Rejected configuration values.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("threshold_probability must lie in [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),
}

/// One frame of detected objects and radar returns in a shared frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Input {
    pub objects: DetectedObjects,
    pub radars: Vec<RadarInput>,
}

/// Qualified objects carrying fused twists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub objects: DetectedObjects,
}
