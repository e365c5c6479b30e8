use anyhow::Context;
use radarfusion::msgs::{
    DetectedObject, DetectedObjects, Header, ObjectClassification, ObjectLabel, Point, Quaternion,
    RadarInput, Vector3,
};
use radarfusion::prelude::Input;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

/// Configuration for generating synthetic fusion frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub objects: usize,
    pub radars_per_object: usize,
    /// Returns scattered away from every object.
    pub clutter_radars: usize,
    /// Distance between neighbouring object centres along x.
    pub spacing: f64,
    pub max_speed: f64,
    pub speed_noise: f64,
    pub seed: u64,
    pub frame_id: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            objects: 4,
            radars_per_object: 3,
            clutter_radars: 2,
            spacing: 15.0,
            max_speed: 20.0,
            speed_noise: 0.3,
            seed: 0,
            frame_id: "base_link".to_string(),
        }
    }
}

fn build_object(rng: &mut StdRng, x: f64) -> DetectedObject {
    let mut object = DetectedObject {
        existence_probability: 1.0,
        classification: vec![ObjectClassification {
            label: ObjectLabel::Car,
            probability: rng.gen_range(0.05..0.95),
        }],
        ..Default::default()
    };
    object.shape.dimensions = Vector3::new(4.5, 1.8, 1.5);
    let pose = &mut object.kinematics.pose_with_covariance.pose;
    pose.position = Point::new(x, rng.gen_range(-3.0..3.0), 0.0);
    pose.orientation = Quaternion::from_yaw(rng.gen_range(-PI..PI));
    object
}

/// Return scattered inside the object's unexpanded footprint.
fn radar_within(
    rng: &mut StdRng,
    object: &DetectedObject,
    velocity: Vector3,
    noise: f64,
) -> RadarInput {
    let dimensions = object.shape.dimensions;
    let pose = &object.kinematics.pose_with_covariance.pose;
    let local_x = rng.gen_range(-0.4..0.4) * dimensions.x;
    let local_y = rng.gen_range(-0.4..0.4) * dimensions.y;
    let (sin, cos) = pose.orientation.yaw().sin_cos();

    let mut radar = RadarInput {
        target_value: rng.gen_range(0.5..10.0),
        ..Default::default()
    };
    radar.pose_with_covariance.pose.position = Point::new(
        pose.position.x + cos * local_x - sin * local_y,
        pose.position.y + sin * local_x + cos * local_y,
        0.0,
    );
    radar.twist_with_covariance.twist.linear = Vector3::new(
        velocity.x + rng.gen_range(-noise..=noise),
        velocity.y + rng.gen_range(-noise..=noise),
        0.0,
    );
    radar
}

pub fn build_input(config: &ScenarioConfig) -> anyhow::Result<Input> {
    let radar_count = config
        .objects
        .checked_mul(config.radars_per_object)
        .and_then(|count| count.checked_add(config.clutter_radars))
        .context("overflow computing radar count for scenario")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut objects = Vec::with_capacity(config.objects);
    let mut radars = Vec::with_capacity(radar_count);

    for index in 0..config.objects {
        let object = build_object(&mut rng, index as f64 * config.spacing);
        let heading = object.kinematics.pose_with_covariance.pose.orientation.yaw();
        let speed = rng.gen_range(0.0..=config.max_speed);
        let velocity = Vector3::new(speed * heading.cos(), speed * heading.sin(), 0.0);
        for _ in 0..config.radars_per_object {
            radars.push(radar_within(&mut rng, &object, velocity, config.speed_noise));
        }
        objects.push(object);
    }

    // clutter lands well beside the row of objects
    for _ in 0..config.clutter_radars {
        let mut radar = RadarInput {
            target_value: rng.gen_range(0.1..1.0),
            ..Default::default()
        };
        radar.pose_with_covariance.pose.position = Point::new(
            rng.gen_range(-50.0..50.0),
            rng.gen_range(30.0..60.0),
            0.0,
        );
        radar.twist_with_covariance.twist.linear =
            Vector3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), 0.0);
        radars.push(radar);
    }

    Ok(Input {
        objects: DetectedObjects {
            header: Header {
                stamp: 0.0,
                frame_id: config.frame_id.clone(),
            },
            objects,
        },
        radars,
    })
}

/// Reads one JSON-encoded input frame.
pub fn load_input<P: AsRef<Path>>(path: P) -> anyhow::Result<Input> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading input frame {}", path_ref.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing input frame {}", path_ref.display()))
}
