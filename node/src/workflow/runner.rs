use anyhow::anyhow;
use radarfusion::prelude::{Input, Output, Param};
use radarfusion::telemetry::{LogManager, Metrics, MetricsRecorder};
use radarfusion::RadarFusionToDetectedObject;
use std::sync::{Arc, RwLock};

/// Shared handle to the fusion core.
///
/// Each `execute` holds a read lock for the whole frame, so a parameter
/// change lands between frames and never inside one.
#[derive(Clone)]
pub struct Runner {
    fusion: Arc<RwLock<RadarFusionToDetectedObject>>,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(param: &Param) -> Self {
        let metrics = Arc::new(MetricsRecorder::new());
        let fusion = RadarFusionToDetectedObject::new(param)
            .with_trace_hook(Arc::new(LogManager::with_target("fusion_node")))
            .with_trace_hook(metrics.clone());
        Self {
            fusion: Arc::new(RwLock::new(fusion)),
            metrics,
        }
    }

    pub fn set_param(&self, param: &Param) -> anyhow::Result<()> {
        let mut fusion = self
            .fusion
            .write()
            .map_err(|_| anyhow!("fusion lock poisoned"))?;
        fusion.set_param(param);
        Ok(())
    }

    /// The active parameters, weights already normalized.
    pub fn param(&self) -> anyhow::Result<Param> {
        let fusion = self
            .fusion
            .read()
            .map_err(|_| anyhow!("fusion lock poisoned"))?;
        Ok(fusion.param().clone())
    }

    pub fn execute(&self, input: &Input) -> anyhow::Result<Output> {
        let fusion = self
            .fusion
            .read()
            .map_err(|_| anyhow!("fusion lock poisoned"))?;
        Ok(fusion.update(input))
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::scenario::{build_input, ScenarioConfig};

    #[test]
    fn runner_executes_scenario() {
        let runner = Runner::new(&Param::default());
        let input = build_input(&ScenarioConfig::default()).unwrap();
        let output = runner.execute(&input).unwrap();
        assert!(output.objects.objects.len() <= input.objects.objects.len());
        assert!(output
            .objects
            .objects
            .iter()
            .all(|o| o.kinematics.has_twist));
        assert_eq!(runner.metrics().frames, 1);
    }

    #[test]
    fn runner_param_updates_are_normalized() {
        let runner = Runner::new(&Param::default());
        runner
            .set_param(&Param {
                velocity_weight_median: 2.0,
                velocity_weight_average: 2.0,
                velocity_weight_target_value_average: 0.0,
                velocity_weight_target_value_top: 0.0,
                ..Default::default()
            })
            .unwrap();
        let param = runner.param().unwrap();
        assert_eq!(param.velocity_weight_median, 0.5);
        assert_eq!(param.velocity_weight_average, 0.5);
    }
}
