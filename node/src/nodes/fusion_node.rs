use crate::workflow::runner::Runner;
use log::info;
use radarfusion::msgs::{DetectedObjects, RadarInput};
use radarfusion::prelude::{Input, Output};
use std::time::{Duration, Instant};

const WAIT_LOG_PERIOD: Duration = Duration::from_secs(1);

/// Pairs each incoming objects frame with the most recent radar frame.
///
/// An objects frame is fused once. The radar frame is kept and reused
/// until a newer one replaces it.
pub struct FusionNode {
    runner: Runner,
    objects: Option<DetectedObjects>,
    radars: Option<Vec<RadarInput>>,
    last_wait_log: Option<Instant>,
}

impl FusionNode {
    pub fn new(runner: Runner) -> Self {
        Self {
            runner,
            objects: None,
            radars: None,
            last_wait_log: None,
        }
    }

    pub fn on_objects(&mut self, objects: DetectedObjects) {
        self.objects = Some(objects);
    }

    pub fn on_radars(&mut self, radars: Vec<RadarInput>) {
        self.radars = Some(radars);
    }

    pub fn is_data_ready(&mut self) -> bool {
        let missing = match (&self.objects, &self.radars) {
            (Some(_), Some(_)) => return true,
            (None, _) => "objects",
            (Some(_), None) => "radar",
        };
        let now = Instant::now();
        if self
            .last_wait_log
            .map_or(true, |last| now.duration_since(last) >= WAIT_LOG_PERIOD)
        {
            info!("waiting for {} msg...", missing);
            self.last_wait_log = Some(now);
        }
        false
    }

    /// Fuses the pending objects frame, if any, against the cached radars.
    pub fn on_timer(&mut self) -> anyhow::Result<Option<Output>> {
        if !self.is_data_ready() {
            return Ok(None);
        }
        let (Some(objects), Some(radars)) = (self.objects.take(), self.radars.as_ref()) else {
            return Ok(None);
        };
        let input = Input {
            objects,
            radars: radars.clone(),
        };
        self.runner.execute(&input).map(Some)
    }
}
