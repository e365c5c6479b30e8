//! Fuses the twists of matched radars into a single object twist.
//!
//! Four candidate twists are blended with normalized weights:
//! the median by linear speed, the plain average, the twist of the strongest
//! return and the target-value weighted average. A candidate is only
//! computed when its weight is positive.

use crate::fusion::doppler::DopplerConverter;
use crate::msgs::{DetectedObject, RadarInput, Twist, TwistWithCovariance};
use crate::prelude::Param;

type Strategy = fn(&[&RadarInput]) -> Option<Twist>;

/// Blend weights of the four candidate twists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityWeights {
    pub median: f64,
    pub average: f64,
    pub target_value_average: f64,
    pub target_value_top: f64,
}

impl VelocityWeights {
    /// Reads the weights as stored; pass a normalized [`Param`].
    pub fn from_param(param: &Param) -> Self {
        Self {
            median: param.velocity_weight_median,
            average: param.velocity_weight_average,
            target_value_average: param.velocity_weight_target_value_average,
            target_value_top: param.velocity_weight_target_value_top,
        }
    }
}

pub struct TwistEstimator<'a> {
    weights: VelocityWeights,
    doppler: Option<&'a dyn DopplerConverter>,
}

impl<'a> TwistEstimator<'a> {
    pub fn new(weights: VelocityWeights) -> Self {
        Self {
            weights,
            doppler: None,
        }
    }

    /// Routes every non-empty estimate through `converter`.
    pub fn with_doppler_converter(mut self, converter: &'a dyn DopplerConverter) -> Self {
        self.doppler = Some(converter);
        self
    }

    /// Weighted blend of the candidate twists; zero when nothing matched.
    pub fn estimate(
        &self,
        object: &DetectedObject,
        radars: &[&RadarInput],
    ) -> TwistWithCovariance {
        if radars.is_empty() {
            return TwistWithCovariance::default();
        }

        let strategies: [(f64, Strategy); 4] = [
            (self.weights.median, median_twist),
            (self.weights.average, average_twist),
            (self.weights.target_value_top, top_target_value_twist),
            (self.weights.target_value_average, target_value_average_twist),
        ];
        let twist: Twist = strategies
            .iter()
            .filter(|(weight, _)| *weight > 0.0)
            .filter_map(|(weight, strategy)| strategy(radars).map(|twist| twist * *weight))
            .sum();

        let twist_with_covariance = TwistWithCovariance {
            twist,
            ..Default::default()
        };
        match self.doppler {
            Some(converter) => converter.convert(object, twist_with_covariance),
            None => twist_with_covariance,
        }
    }
}

/// Twist of the middle radar by linear speed; mean of the two middle
/// radars for an even count.
pub fn median_twist(radars: &[&RadarInput]) -> Option<Twist> {
    let mut sorted = radars.to_vec();
    sorted.sort_by(|a, b| a.twist().linear_norm().total_cmp(&b.twist().linear_norm()));

    let middle = sorted.len() / 2;
    match sorted.len() {
        0 => None,
        len if len % 2 == 1 => Some(*sorted[middle].twist()),
        _ => Some((*sorted[middle - 1].twist() + *sorted[middle].twist()) * 0.5),
    }
}

pub fn average_twist(radars: &[&RadarInput]) -> Option<Twist> {
    if radars.is_empty() {
        return None;
    }
    let sum: Twist = radars.iter().map(|radar| radar.twist()).sum();
    Some(sum * (1.0 / radars.len() as f64))
}

/// Twist of the radar with the largest target value; the first one wins ties.
pub fn top_target_value_twist(radars: &[&RadarInput]) -> Option<Twist> {
    radars
        .iter()
        .copied()
        .reduce(|best, radar| {
            if radar.target_value > best.target_value {
                radar
            } else {
                best
            }
        })
        .map(|radar| *radar.twist())
}

/// Target-value weighted mean; `None` when the target values sum to zero.
pub fn target_value_average_twist(radars: &[&RadarInput]) -> Option<Twist> {
    let sum_target_value: f64 = radars.iter().map(|radar| radar.target_value).sum();
    if sum_target_value == 0.0 || !sum_target_value.is_finite() {
        return None;
    }
    let weighted: Twist = radars
        .iter()
        .map(|radar| *radar.twist() * radar.target_value)
        .sum();
    Some(weighted * (1.0 / sum_target_value))
}
