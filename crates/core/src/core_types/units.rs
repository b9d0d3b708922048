//! Semantic unit types for angles used by the firing geometry
//!
//! Directions are compass bearings: degrees clockwise from north. The newtype
//! keeps bearings from being mixed up with the counter-clockwise radians used
//! by the planar rotation maths.
//!
//! # Usage
//! ```
//! use firing_core::core_types::units::Degrees;
//!
//! let bearing = Degrees::new(-90.0).normalized();
//! assert_eq!(*bearing, 270.0);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
pub(crate) fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Degrees(f64);

impl Eq for Degrees {}

impl PartialOrd for Degrees {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Degrees {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Degrees {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Degrees {
    /// Create a new angle in degrees
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Wrap into `[0, 360)`
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Self {
        let wrapped = self.0.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if wrapped >= 360.0 {
            Degrees(0.0)
        } else {
            Degrees(wrapped)
        }
    }

    /// Convert to radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

impl From<f64> for Degrees {
    fn from(v: f64) -> Self {
        Degrees(v)
    }
}

impl From<Degrees> for f64 {
    fn from(d: Degrees) -> f64 {
        d.0
    }
}

impl Add for Degrees {
    type Output = Degrees;
    fn add(self, rhs: Degrees) -> Degrees {
        Degrees(self.0 + rhs.0)
    }
}

impl Sub for Degrees {
    type Output = Degrees;
    fn sub(self, rhs: Degrees) -> Degrees {
        Degrees(self.0 - rhs.0)
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_wraps_into_compass_range() {
        assert_eq!(*Degrees::new(370.0).normalized(), 10.0);
        assert_eq!(*Degrees::new(-10.0).normalized(), 350.0);
        assert_eq!(*Degrees::new(360.0).normalized(), 0.0);
        assert_eq!(*Degrees::new(-1e-18).normalized(), 0.0);
    }

    #[test]
    fn test_degrees_total_ordering() {
        let a = Degrees::new(45.0);
        let b = Degrees::new(90.0);
        assert_eq!(a.max(b), b);
        assert_eq!(format!("{}", a), "45.0°");
    }
}
