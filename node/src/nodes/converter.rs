//! Caches the latest radar tracks and republishes them as fusion radar inputs.

use log::info;
use radarfusion::msgs::{Covariance, Header, RadarInput, Vector3};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const WAIT_LOG_PERIOD: Duration = Duration::from_secs(1);

/// A tracked radar object as reported by the sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarTrack {
    pub id: u64,
    pub position: Vector3,
    pub velocity: Vector3,
    /// Upper triangle of the 3x3 covariance: xx, xy, xz, yy, yz, zz.
    pub position_covariance: [f64; 6],
    /// Same layout as `position_covariance`.
    pub velocity_covariance: [f64; 6],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarTracks {
    pub header: Header,
    pub tracks: Vec<RadarTrack>,
}

pub struct RadarTracksConverter {
    default_target_value: f64,
    radar_data: Option<RadarTracks>,
    last_wait_log: Option<Instant>,
}

impl RadarTracksConverter {
    pub fn new(default_target_value: f64) -> Self {
        Self {
            default_target_value,
            radar_data: None,
            last_wait_log: None,
        }
    }

    pub fn set_default_target_value(&mut self, default_target_value: f64) {
        self.default_target_value = default_target_value;
    }

    pub fn on_data(&mut self, tracks: RadarTracks) {
        self.radar_data = Some(tracks);
    }

    pub fn is_data_ready(&mut self) -> bool {
        if self.radar_data.is_some() {
            return true;
        }
        let now = Instant::now();
        if self
            .last_wait_log
            .map_or(true, |last| now.duration_since(last) >= WAIT_LOG_PERIOD)
        {
            info!("waiting for radar tracks msg...");
            self.last_wait_log = Some(now);
        }
        false
    }

    /// Converts the cached tracks; the same tracks are republished every
    /// cycle until new ones arrive.
    pub fn on_timer(&mut self) -> Option<Vec<RadarInput>> {
        if !self.is_data_ready() {
            return None;
        }
        self.radar_data
            .as_ref()
            .map(|tracks| self.convert(tracks))
    }

    pub fn convert(&self, tracks: &RadarTracks) -> Vec<RadarInput> {
        tracks
            .tracks
            .iter()
            .map(|track| {
                let mut radar = RadarInput {
                    target_value: self.default_target_value,
                    ..Default::default()
                };
                radar.pose_with_covariance.pose.position = track.position;
                radar.pose_with_covariance.covariance =
                    covariance_from_upper_triangle(&track.position_covariance);
                radar.twist_with_covariance.twist.linear = track.velocity;
                radar.twist_with_covariance.covariance =
                    covariance_from_upper_triangle(&track.velocity_covariance);
                radar
            })
            .collect()
    }
}

/// Fills the translational 3x3 block of a 6x6 covariance.
fn covariance_from_upper_triangle(upper: &[f64; 6]) -> Covariance {
    const INDEX: [(usize, usize); 6] = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)];
    let mut covariance = Covariance::default();
    for (&(row, col), &value) in INDEX.iter().zip(upper) {
        covariance.0[[row, col]] = value;
        covariance.0[[col, row]] = value;
    }
    covariance
}
