use anyhow::{bail, Context};
use radarfusion::prelude::Param;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeParams {
    pub update_rate_hz: f64,
    pub bind_address: SocketAddr,
    /// Target value given to converted radar tracks, which carry no strength.
    pub default_target_value: f64,
}

impl Default for NodeParams {
    fn default() -> Self {
        Self {
            update_rate_hz: 10.0,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 9000)),
            default_target_value: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub node_params: NodeParams,
    pub fusion_params: Param,
}

impl NodeConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading node config {}", path_ref.display()))?;
        let config: NodeConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing node config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("validating node config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let rate = self.node_params.update_rate_hz;
        if !rate.is_finite() || rate <= 0.0 {
            bail!("node_params.update_rate_hz must be positive, got {}", rate);
        }
        if !self.node_params.default_target_value.is_finite() {
            bail!("node_params.default_target_value must be finite");
        }
        self.fusion_params.validate()?;
        Ok(())
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.node_params.update_rate_hz)
    }

    /// Applies named parameter updates to a copy of this config.
    ///
    /// Every name must be known and every value must have the parameter's
    /// type; the copy is returned only if it validates as a whole.
    pub fn apply_updates(&self, updates: &Map<String, Value>) -> anyhow::Result<NodeConfig> {
        let mut p = self.clone();
        for (name, value) in updates {
            match name.as_str() {
                "node_params.update_rate_hz" => {
                    p.node_params.update_rate_hz = as_f64(name, value)?
                }
                "node_params.default_target_value" => {
                    p.node_params.default_target_value = as_f64(name, value)?
                }
                "fusion_params.bounding_box_margin" => {
                    p.fusion_params.bounding_box_margin = as_f64(name, value)?
                }
                "fusion_params.split_threshold_velocity" => {
                    p.fusion_params.split_threshold_velocity = as_f64(name, value)?
                }
                "fusion_params.velocity_weight_median" => {
                    p.fusion_params.velocity_weight_median = as_f64(name, value)?
                }
                "fusion_params.velocity_weight_average" => {
                    p.fusion_params.velocity_weight_average = as_f64(name, value)?
                }
                "fusion_params.velocity_weight_target_value_average" => {
                    p.fusion_params.velocity_weight_target_value_average = as_f64(name, value)?
                }
                "fusion_params.velocity_weight_target_value_top" => {
                    p.fusion_params.velocity_weight_target_value_top = as_f64(name, value)?
                }
                "fusion_params.threshold_probability" => {
                    p.fusion_params.threshold_probability = as_f64(name, value)?
                }
                "fusion_params.convert_doppler_to_twist" => {
                    p.fusion_params.convert_doppler_to_twist = as_bool(name, value)?
                }
                _ => bail!("unknown parameter {}", name),
            }
        }
        p.validate()?;
        Ok(p)
    }
}

fn as_f64(name: &str, value: &Value) -> anyhow::Result<f64> {
    value
        .as_f64()
        .with_context(|| format!("{} expects a number, got {}", name, value))
}

fn as_bool(name: &str, value: &Value) -> anyhow::Result<bool> {
    value
        .as_bool()
        .with_context(|| format!("{} expects a boolean, got {}", name, value))
}
