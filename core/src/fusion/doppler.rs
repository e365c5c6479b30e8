use crate::msgs::{DetectedObject, TwistWithCovariance};

/// Refines a fused twist from Doppler measurements of the object.
pub trait DopplerConverter: Send + Sync {
    fn convert(
        &self,
        object: &DetectedObject,
        twist_with_covariance: TwistWithCovariance,
    ) -> TwistWithCovariance;
}

/// Leaves the fused twist as is.
///
/// Point-cloud Doppler fusion has no implementation yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityDopplerConverter;

impl DopplerConverter for IdentityDopplerConverter {
    fn convert(
        &self,
        _object: &DetectedObject,
        twist_with_covariance: TwistWithCovariance,
    ) -> TwistWithCovariance {
        twist_with_covariance
    }
}
