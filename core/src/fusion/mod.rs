//! The per-frame fusion pipeline and its components.

pub mod association;
pub mod doppler;
pub mod qualification;
pub mod splitter;
pub mod twist_estimator;

pub use association::ObjectAssociator;
pub use doppler::{DopplerConverter, IdentityDopplerConverter};
pub use qualification::QualificationFilter;
pub use splitter::{ObjectSplitter, PassThroughSplitter};
pub use twist_estimator::{TwistEstimator, VelocityWeights};

use crate::msgs::{DetectedObjects, RadarInput};
use crate::prelude::{Input, Output, Param};
use crate::telemetry::{FusionEvent, TraceHook};
use std::sync::Arc;

/// Attaches radar-derived twists to detected objects.
///
/// Holds only configuration and extension points, so a single instance can
/// serve concurrent `update` calls.
pub struct RadarFusionToDetectedObject {
    param: Param,
    splitter: Option<Box<dyn ObjectSplitter>>,
    doppler: Box<dyn DopplerConverter>,
    hooks: Vec<Arc<dyn TraceHook>>,
}

impl RadarFusionToDetectedObject {
    pub fn new(param: &Param) -> Self {
        let mut fusion = Self {
            param: Param::default(),
            splitter: None,
            doppler: Box::new(IdentityDopplerConverter),
            hooks: Vec::new(),
        };
        fusion.set_param(param);
        fusion
    }

    /// Replaces the default pass-through splitter.
    pub fn with_splitter(mut self, splitter: impl ObjectSplitter + 'static) -> Self {
        self.splitter = Some(Box::new(splitter));
        self
    }

    /// Used only while `convert_doppler_to_twist` is enabled.
    pub fn with_doppler_converter(mut self, converter: impl DopplerConverter + 'static) -> Self {
        self.doppler = Box::new(converter);
        self
    }

    pub fn with_trace_hook(mut self, hook: Arc<dyn TraceHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Installs `param` with its velocity weights normalized.
    pub fn set_param(&mut self, param: &Param) {
        self.param = param.normalized();
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    /// Runs association, splitting, twist estimation and qualification on
    /// every object of the frame.
    pub fn update(&self, input: &Input) -> Output {
        self.trace(FusionEvent::FrameStarted {
            objects: input.objects.objects.len(),
            radars: input.radars.len(),
        });

        let associator = ObjectAssociator::new(self.param.bounding_box_margin);
        let qualification = QualificationFilter::new(self.param.threshold_probability);
        let mut estimator = TwistEstimator::new(VelocityWeights::from_param(&self.param));
        if self.param.convert_doppler_to_twist {
            estimator = estimator.with_doppler_converter(&*self.doppler);
        }
        let default_splitter = PassThroughSplitter::new(self.param.split_threshold_velocity);
        let splitter: &dyn ObjectSplitter = match &self.splitter {
            Some(splitter) => &**splitter,
            None => &default_splitter,
        };

        let mut objects = Vec::with_capacity(input.objects.objects.len());
        for (index, object) in input.objects.objects.iter().enumerate() {
            let radars_within_object = associator.associate(object, &input.radars);
            self.trace(FusionEvent::Associated {
                object: index,
                radars: radars_within_object.len(),
            });

            let mut split_objects = splitter.split(object, &radars_within_object);
            if split_objects.is_empty() {
                split_objects.push(object.clone());
            }
            let is_split = split_objects.len() > 1;
            if is_split {
                self.trace(FusionEvent::Split {
                    object: index,
                    parts: split_objects.len(),
                });
            }

            for mut split_object in split_objects {
                // Sub-objects are re-associated against the footprint of the
                // object they came from, not their own.
                let reassociated: Vec<&RadarInput>;
                let radars_within_split_object = if is_split {
                    reassociated =
                        associator.associate(object, radars_within_object.iter().copied());
                    &reassociated
                } else {
                    &radars_within_object
                };

                split_object.kinematics.has_twist = true;
                split_object.kinematics.twist_with_covariance =
                    estimator.estimate(&split_object, radars_within_split_object);

                let probability = split_object.probability();
                match qualification.qualify(split_object, radars_within_split_object) {
                    Some(qualified) => {
                        self.trace(FusionEvent::Emitted {
                            object: index,
                            probability: qualified.probability(),
                        });
                        objects.push(qualified);
                    }
                    None => self.trace(FusionEvent::Dropped {
                        object: index,
                        probability,
                    }),
                }
            }
        }

        self.trace(FusionEvent::FrameFinished {
            emitted: objects.len(),
        });
        Output {
            objects: DetectedObjects {
                header: input.objects.header.clone(),
                objects,
            },
        }
    }

    fn trace(&self, event: FusionEvent) {
        for hook in &self.hooks {
            hook.record(&event);
        }
    }
}

impl Default for RadarFusionToDetectedObject {
    fn default() -> Self {
        Self::new(&Param::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgs::{
        DetectedObject, Header, ObjectClassification, ObjectLabel, Point, Quaternion,
        TwistWithCovariance, Vector3,
    };
    use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    fn object(x: f64, y: f64, length: f64, width: f64, probability: f64) -> DetectedObject {
        let mut object = DetectedObject {
            classification: vec![ObjectClassification {
                label: ObjectLabel::Car,
                probability,
            }],
            ..Default::default()
        };
        object.shape.dimensions = Vector3::new(length, width, 1.5);
        object.kinematics.pose_with_covariance.pose.position = Point::new(x, y, 0.0);
        object
    }

    fn radar(x: f64, y: f64, linear_x: f64, target_value: f64) -> RadarInput {
        let mut radar = RadarInput {
            target_value,
            ..Default::default()
        };
        radar.pose_with_covariance.pose.position = Point::new(x, y, 0.0);
        radar.twist_with_covariance.twist.linear = Vector3::new(linear_x, 0.0, 0.0);
        radar
    }

    fn median_only(margin: f64, threshold_probability: f64) -> Param {
        Param {
            bounding_box_margin: margin,
            velocity_weight_median: 1.0,
            velocity_weight_average: 0.0,
            velocity_weight_target_value_average: 0.0,
            velocity_weight_target_value_top: 0.0,
            threshold_probability,
            ..Default::default()
        }
    }

    fn frame(objects: Vec<DetectedObject>, radars: Vec<RadarInput>) -> Input {
        Input {
            objects: DetectedObjects {
                header: Header {
                    stamp: 42.5,
                    frame_id: "base_link".into(),
                },
                objects,
            },
            radars,
        }
    }

    #[test]
    fn single_object_end_to_end() {
        let fusion = RadarFusionToDetectedObject::new(&median_only(1.0, 0.3));
        let input = frame(
            vec![object(0.0, 0.0, 4.0, 2.0, 0.2)],
            vec![radar(0.5, 0.0, 1.0, 1.0), radar(4.5, 0.0, 3.0, 1.0)],
        );

        let output = fusion.update(&input);
        assert_eq!(output.objects.header, input.objects.header);
        assert_eq!(output.objects.objects.len(), 1);
        let fused = &output.objects.objects[0];
        assert!(fused.kinematics.has_twist);
        assert_eq!(fused.kinematics.twist_with_covariance.twist.linear.x, 1.0);
        assert_eq!(fused.probability(), 0.3);
    }

    #[test]
    fn objects_without_support_disappear() {
        let fusion = RadarFusionToDetectedObject::new(&median_only(0.0, 0.5));
        let input = frame(
            vec![
                object(0.0, 0.0, 4.0, 2.0, 0.9),
                object(20.0, 0.0, 4.0, 2.0, 0.1),
                object(40.0, 0.0, 4.0, 2.0, 0.1),
            ],
            vec![radar(40.0, 0.0, 8.0, 1.0)],
        );

        let output = fusion.update(&input);
        let kept: Vec<(f64, f64)> = output
            .objects
            .objects
            .iter()
            .map(|o| {
                (
                    o.kinematics.pose_with_covariance.pose.position.x,
                    o.probability(),
                )
            })
            .collect();
        assert_eq!(kept, vec![(0.0, 0.9), (40.0, 0.5)]);

        let unsupported = &output.objects.objects[0];
        assert!(unsupported.kinematics.has_twist);
        assert_eq!(
            unsupported.kinematics.twist_with_covariance,
            Default::default()
        );
        assert_eq!(
            output.objects.objects[1]
                .kinematics
                .twist_with_covariance
                .twist
                .linear
                .x,
            8.0
        );
    }

    #[test]
    fn each_object_is_associated_independently() {
        let fusion = RadarFusionToDetectedObject::new(&median_only(0.5, 0.5));
        let input = frame(
            vec![object(0.0, 0.0, 4.0, 2.0, 0.1), object(2.0, 0.0, 4.0, 2.0, 0.1)],
            vec![radar(1.0, 0.0, 2.0, 1.0), radar(3.5, 0.0, 6.0, 1.0)],
        );

        let output = fusion.update(&input);
        let speeds: Vec<f64> = output
            .objects
            .objects
            .iter()
            .map(|o| o.kinematics.twist_with_covariance.twist.linear.x)
            .collect();
        // the shared radar at x = 1 feeds both objects
        assert_eq!(speeds, vec![2.0, 4.0]);
    }

    #[test]
    fn update_is_repeatable() {
        let param = Param {
            bounding_box_margin: 1.0,
            velocity_weight_median: 0.3,
            velocity_weight_average: 0.2,
            velocity_weight_target_value_average: 0.4,
            velocity_weight_target_value_top: 0.1,
            ..Default::default()
        };
        let fusion = RadarFusionToDetectedObject::new(&param);
        let input = frame(
            vec![object(0.0, 0.0, 4.0, 2.0, 0.2), object(10.0, 3.0, 2.0, 2.0, 0.7)],
            vec![
                radar(0.3, 0.2, 1.3, 0.7),
                radar(-1.0, 0.5, 2.9, 2.1),
                radar(10.2, 3.1, 0.4, 0.0),
                radar(1.1, -0.4, 1.7, 1.3),
            ],
        );

        assert_eq!(fusion.update(&input), fusion.update(&input));
    }

    #[test]
    fn set_param_normalizes_and_replaces() {
        let mut fusion = RadarFusionToDetectedObject::default();
        assert_relative_eq!(fusion.param().velocity_weight_median, 0.5);

        fusion.set_param(&Param {
            velocity_weight_median: 0.0,
            velocity_weight_average: 2.0,
            velocity_weight_target_value_average: 0.0,
            velocity_weight_target_value_top: 6.0,
            ..Default::default()
        });
        assert_eq!(fusion.param().velocity_weight_median, 0.0);
        assert_relative_eq!(fusion.param().velocity_weight_average, 0.25);
        assert_relative_eq!(fusion.param().velocity_weight_target_value_top, 0.75);
    }

    #[test]
    fn huge_weights_still_fuse_the_radar_twist() {
        let fusion = RadarFusionToDetectedObject::new(&Param {
            velocity_weight_median: 1e308,
            velocity_weight_average: 1e308,
            velocity_weight_target_value_average: 0.0,
            velocity_weight_target_value_top: 0.0,
            ..median_only(0.0, 0.5)
        });
        let input = frame(
            vec![object(0.0, 0.0, 4.0, 2.0, 0.9)],
            vec![radar(0.5, 0.0, 5.0, 1.0)],
        );

        let output = fusion.update(&input);
        assert_relative_eq!(
            output.objects.objects[0]
                .kinematics
                .twist_with_covariance
                .twist
                .linear
                .x,
            5.0
        );
    }

    struct TwoWaySplitter;

    impl ObjectSplitter for TwoWaySplitter {
        fn split(&self, object: &DetectedObject, _radars: &[&RadarInput]) -> Vec<DetectedObject> {
            let mut far = object.clone();
            far.kinematics.pose_with_covariance.pose.position.x += 100.0;
            vec![object.clone(), far]
        }
    }

    #[test]
    fn split_objects_reuse_the_original_footprint() {
        let events = Arc::new(EventLog::default());
        let fusion = RadarFusionToDetectedObject::new(&median_only(0.0, 0.5))
            .with_splitter(TwoWaySplitter)
            .with_trace_hook(events.clone());
        let input = frame(
            vec![object(0.0, 0.0, 4.0, 2.0, 0.1)],
            vec![radar(1.0, 0.0, 3.0, 1.0), radar(101.0, 0.0, 9.0, 1.0)],
        );

        let output = fusion.update(&input);
        assert_eq!(output.objects.objects.len(), 2);
        assert!(events
            .events
            .lock()
            .unwrap()
            .contains(&FusionEvent::Split { object: 0, parts: 2 }));
        // the displaced half still sees the radar under the original box
        for split in &output.objects.objects {
            assert_eq!(split.kinematics.twist_with_covariance.twist.linear.x, 3.0);
            assert_eq!(split.probability(), 0.5);
        }
        assert_eq!(
            output.objects.objects[1]
                .kinematics
                .pose_with_covariance
                .pose
                .position
                .x,
            100.0
        );
    }

    struct EmptySplitter;

    impl ObjectSplitter for EmptySplitter {
        fn split(&self, _object: &DetectedObject, _radars: &[&RadarInput]) -> Vec<DetectedObject> {
            Vec::new()
        }
    }

    #[test]
    fn empty_split_falls_back_to_the_object() {
        let fusion =
            RadarFusionToDetectedObject::new(&median_only(0.0, 0.5)).with_splitter(EmptySplitter);
        let input = frame(vec![object(0.0, 0.0, 4.0, 2.0, 0.8)], Vec::new());
        assert_eq!(fusion.update(&input).objects.objects.len(), 1);
    }

    struct ReverseDoppler;

    impl DopplerConverter for ReverseDoppler {
        fn convert(
            &self,
            _object: &DetectedObject,
            mut twist_with_covariance: TwistWithCovariance,
        ) -> TwistWithCovariance {
            twist_with_covariance.twist = twist_with_covariance.twist * -1.0;
            twist_with_covariance
        }
    }

    #[test]
    fn doppler_conversion_follows_the_flag() {
        let input = frame(
            vec![object(0.0, 0.0, 4.0, 2.0, 0.1)],
            vec![radar(0.0, 0.0, 2.0, 1.0)],
        );
        let speed = |fusion: &RadarFusionToDetectedObject| {
            fusion.update(&input).objects.objects[0]
                .kinematics
                .twist_with_covariance
                .twist
                .linear
                .x
        };

        let disabled = RadarFusionToDetectedObject::new(&median_only(0.0, 0.5))
            .with_doppler_converter(ReverseDoppler);
        assert_eq!(speed(&disabled), 2.0);

        let enabled = RadarFusionToDetectedObject::new(&Param {
            convert_doppler_to_twist: true,
            ..median_only(0.0, 0.5)
        })
        .with_doppler_converter(ReverseDoppler);
        assert_eq!(speed(&enabled), -2.0);

        let identity = RadarFusionToDetectedObject::new(&Param {
            convert_doppler_to_twist: true,
            ..median_only(0.0, 0.5)
        });
        assert_eq!(speed(&identity), 2.0);
    }

    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<FusionEvent>>,
    }

    impl TraceHook for EventLog {
        fn record(&self, event: &FusionEvent) {
            self.events.lock().unwrap().push(*event);
        }
    }

    #[test]
    fn trace_hooks_see_each_decision() {
        let events = Arc::new(EventLog::default());
        let metrics = Arc::new(MetricsRecorder::new());
        let fusion = RadarFusionToDetectedObject::new(&median_only(0.0, 0.5))
            .with_trace_hook(events.clone())
            .with_trace_hook(metrics.clone())
            .with_trace_hook(Arc::new(LogManager::new()));
        let input = frame(
            vec![object(0.0, 0.0, 4.0, 2.0, 0.1), object(10.0, 0.0, 4.0, 2.0, 0.1)],
            vec![radar(0.0, 0.0, 2.0, 1.0)],
        );

        fusion.update(&input);
        assert_eq!(
            *events.events.lock().unwrap(),
            vec![
                FusionEvent::FrameStarted {
                    objects: 2,
                    radars: 1
                },
                FusionEvent::Associated {
                    object: 0,
                    radars: 1
                },
                FusionEvent::Emitted {
                    object: 0,
                    probability: 0.5
                },
                FusionEvent::Associated {
                    object: 1,
                    radars: 0
                },
                FusionEvent::Dropped {
                    object: 1,
                    probability: 0.1
                },
                FusionEvent::FrameFinished { emitted: 1 },
            ]
        );
        assert_eq!(
            metrics.snapshot(),
            Metrics {
                frames: 1,
                emitted: 1,
                dropped: 1,
            }
        );
    }

    #[test]
    fn shared_instance_serves_parallel_frames() {
        let fusion = RadarFusionToDetectedObject::new(&median_only(1.0, 0.3));
        let input = frame(
            vec![object(0.0, 0.0, 4.0, 2.0, 0.2)],
            vec![radar(0.5, 0.0, 1.0, 1.0)],
        );
        let expected = fusion.update(&input);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| fusion.update(&input)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn yawed_object_collects_radars_along_heading() {
        let mut heading_north = object(5.0, 5.0, 6.0, 1.0, 0.1);
        heading_north.kinematics.pose_with_covariance.pose.orientation =
            Quaternion::from_yaw(std::f64::consts::FRAC_PI_2);
        let fusion = RadarFusionToDetectedObject::new(&median_only(0.0, 0.5));
        let input = frame(
            vec![heading_north],
            vec![radar(5.0, 7.5, 4.0, 1.0), radar(7.5, 5.0, 9.0, 1.0)],
        );

        let output = fusion.update(&input);
        assert_eq!(
            output.objects.objects[0]
                .kinematics
                .twist_with_covariance
                .twist
                .linear
                .x,
            4.0
        );
    }
}
