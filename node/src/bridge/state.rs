use crate::nodes::{FusionNode, RadarTracks, RadarTracksConverter};
use crate::workflow::config::NodeConfig;
use crate::workflow::runner::Runner;
use log::{info, warn};
use radarfusion::msgs::DetectedObjects;
use radarfusion::prelude::Output;
use radarfusion::telemetry::Metrics;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

pub type SharedState = Arc<BridgeState>;

/// Everything the HTTP handlers and the timer loop share.
pub struct BridgeState {
    config: RwLock<NodeConfig>,
    runner: Runner,
    node: Mutex<FusionNode>,
    converter: Mutex<RadarTracksConverter>,
    latest: RwLock<Option<Output>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BridgeState {
    pub fn new(config: NodeConfig, runner: Runner) -> SharedState {
        let converter = RadarTracksConverter::new(config.node_params.default_target_value);
        Arc::new(Self {
            node: Mutex::new(FusionNode::new(runner.clone())),
            converter: Mutex::new(converter),
            runner,
            config: RwLock::new(config),
            latest: RwLock::new(None),
        })
    }

    pub fn config(&self) -> NodeConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_period(&self) -> Duration {
        self.config().update_period()
    }

    pub fn on_objects(&self, objects: DetectedObjects) {
        lock(&self.node).on_objects(objects);
    }

    pub fn on_radar_tracks(&self, tracks: RadarTracks) {
        lock(&self.converter).on_data(tracks);
    }

    /// Validates and commits named parameter updates; nothing changes on error.
    pub fn update_params(&self, updates: &Map<String, Value>) -> anyhow::Result<()> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let updated = config.apply_updates(updates)?;
        self.runner.set_param(&updated.fusion_params)?;
        lock(&self.converter).set_default_target_value(updated.node_params.default_target_value);
        *config = updated;
        info!("applied {} parameter update(s)", updates.len());
        Ok(())
    }

    pub fn latest(&self) -> Option<Output> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn metrics(&self) -> Metrics {
        self.runner.metrics()
    }

    /// One timer cycle: refresh radars from the converter, fuse, publish.
    /// Returns whether a new output was published.
    pub fn tick(&self) -> anyhow::Result<bool> {
        if let Some(radars) = lock(&self.converter).on_timer() {
            lock(&self.node).on_radars(radars);
        }
        let output = lock(&self.node).on_timer()?;
        match output {
            Some(output) => {
                *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(output);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Drives [`BridgeState::tick`] at the configured rate, picking up rate
/// changes between cycles.
pub async fn run_timer(state: SharedState) {
    let mut period = state.update_period();
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if let Err(err) = state.tick() {
            warn!("fusion cycle failed: {:#}", err);
        }

        let current = state.update_period();
        if current != period {
            info!("update period changed to {:?}", current);
            period = current;
            interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }
    }
}
