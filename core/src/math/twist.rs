//! Component-wise arithmetic over twists.

use crate::msgs::{Twist, Vector3};
use std::iter::Sum;
use std::ops::{Add, Mul};

impl Vector3 {
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, scale: f64) -> Vector3 {
        Vector3::new(self.x * scale, self.y * scale, self.z * scale)
    }
}

impl Twist {
    /// Speed of the linear component; angular motion does not count.
    pub fn linear_norm(&self) -> f64 {
        self.linear.norm()
    }
}

impl Add for Twist {
    type Output = Twist;

    fn add(self, rhs: Twist) -> Twist {
        Twist {
            linear: self.linear + rhs.linear,
            angular: self.angular + rhs.angular,
        }
    }
}

impl Mul<f64> for Twist {
    type Output = Twist;

    fn mul(self, scale: f64) -> Twist {
        Twist {
            linear: self.linear * scale,
            angular: self.angular * scale,
        }
    }
}

impl Sum for Twist {
    fn sum<I: Iterator<Item = Twist>>(iter: I) -> Twist {
        iter.fold(Twist::default(), Add::add)
    }
}

impl<'a> Sum<&'a Twist> for Twist {
    fn sum<I: Iterator<Item = &'a Twist>>(iter: I) -> Twist {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twist(lx: f64, ly: f64, az: f64) -> Twist {
        Twist {
            linear: Vector3::new(lx, ly, 0.0),
            angular: Vector3::new(0.0, 0.0, az),
        }
    }

    #[test]
    fn add_and_scale_are_component_wise() {
        let combined = (twist(1.0, 2.0, 0.5) + twist(3.0, -1.0, 0.25)) * 0.5;
        assert_eq!(combined, twist(2.0, 0.5, 0.375));
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        let total: Twist = Vec::<Twist>::new().into_iter().sum();
        assert_eq!(total, Twist::default());

        let twists = [twist(1.0, 0.0, 0.0), twist(0.0, 1.0, 1.0)];
        assert_eq!(twists.iter().sum::<Twist>(), twist(1.0, 1.0, 1.0));
    }

    #[test]
    fn linear_norm_ignores_angular_velocity() {
        assert_eq!(twist(3.0, 4.0, 100.0).linear_norm(), 5.0);
    }
}
