//! Ordered ignition crews with uniformity constraints

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Igniter;
use crate::error::{CrewResolution, IgnitionError, Result};

/// Uniformity requirements checked whenever a crew is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewConstraints {
    /// All igniters must walk at the same velocity
    pub same_velocity: bool,
    /// All igniters must use the same interval kind (line, point or dash)
    pub same_interval_kind: bool,
}

impl Default for CrewConstraints {
    fn default() -> Self {
        Self {
            same_velocity: true,
            same_interval_kind: true,
        }
    }
}

impl CrewConstraints {
    /// No uniformity requirements
    pub fn relaxed() -> Self {
        Self {
            same_velocity: false,
            same_interval_kind: false,
        }
    }
}

/// Ordered, non-empty collection of igniters
///
/// Igniter indices in heats and paths refer to positions in this crew.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgnitionCrew {
    igniters: Vec<Igniter>,
    constraints: CrewConstraints,
}

impl IgnitionCrew {
    /// Build a crew, rejecting constraint violations.
    pub fn new(igniters: Vec<Igniter>, constraints: CrewConstraints) -> Result<Self> {
        let Some(first) = igniters.first() else {
            return Err(IgnitionError::constraint("igniters", "crew must not be empty"));
        };

        if constraints.same_velocity {
            if let Some((i, other)) = igniters
                .iter()
                .enumerate()
                .find(|(_, g)| g.velocity() != first.velocity())
            {
                return Err(IgnitionError::constraint(
                    "same_velocity",
                    format!(
                        "igniter {i} walks at {} m/s but igniter 0 walks at {} m/s",
                        other.velocity(),
                        first.velocity()
                    ),
                ));
            }
        }

        if constraints.same_interval_kind {
            let kind = first.interval().kind();
            if let Some((i, other)) = igniters
                .iter()
                .enumerate()
                .find(|(_, g)| g.interval().kind() != kind)
            {
                return Err(IgnitionError::constraint(
                    "same_interval_kind",
                    format!(
                        "igniter {i} uses {:?} ignition but igniter 0 uses {kind:?}",
                        other.interval().kind()
                    ),
                ));
            }
        }

        Ok(Self {
            igniters,
            constraints,
        })
    }

    /// Crew of `count` copies of one igniter
    pub fn clone_igniter(igniter: Igniter, count: usize) -> Result<Self> {
        Self::new(vec![igniter; count], CrewConstraints::default())
    }

    /// Number of igniters
    #[inline]
    pub fn len(&self) -> usize {
        self.igniters.len()
    }

    /// Always false; crews are never empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.igniters.is_empty()
    }

    #[inline]
    pub fn igniters(&self) -> &[Igniter] {
        &self.igniters
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Igniter> {
        self.igniters.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Igniter> {
        self.igniters.iter()
    }

    #[inline]
    pub fn constraints(&self) -> CrewConstraints {
        self.constraints
    }

    /// Copy with one more igniter at the end
    pub fn with_igniter(&self, igniter: Igniter) -> Result<Self> {
        let mut igniters = self.igniters.clone();
        igniters.push(igniter);
        Self::new(igniters, self.constraints)
    }

    /// Copy with every igniter walking at `velocity`
    pub fn with_velocity(&self, velocity: f64) -> Result<Self> {
        let igniters = self
            .igniters
            .iter()
            .map(|g| g.with_velocity(velocity))
            .collect::<Result<Vec<_>>>()?;
        Self::new(igniters, self.constraints)
    }

    /// Crew of exactly `size` igniters.
    ///
    /// A smaller crew is padded with clones of its first igniter, a larger one
    /// keeps its first `size` igniters. The resolution is returned when the
    /// size had to change.
    pub fn resized(&self, size: usize) -> (Self, Option<CrewResolution>) {
        let size = size.max(1);
        let current = self.len();
        if current == size {
            return (self.clone(), None);
        }

        let mut igniters = self.igniters.clone();
        let resolution = if current < size {
            let first = igniters[0];
            igniters.resize(size, first);
            CrewResolution::ClonedFirst
        } else {
            igniters.truncate(size);
            CrewResolution::Truncated
        };
        debug!(from = current, to = size, ?resolution, "Resized crew");

        (
            Self {
                igniters,
                constraints: self.constraints,
            },
            Some(resolution),
        )
    }
}

impl<'a> IntoIterator for &'a IgnitionCrew {
    type Item = &'a Igniter;
    type IntoIter = std::slice::Iter<'a, Igniter>;

    fn into_iter(self) -> Self::IntoIter {
        self.igniters.iter()
    }
}
