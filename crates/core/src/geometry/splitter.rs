//! Band decomposition of an oriented boundary
//!
//! Cuts the local-frame boundary into parallel bands (heats) and bands into
//! per-igniter lanes. Strip firing cuts along `Y` (the firing direction),
//! flank firing cuts across `X`.

use geo::{coord, Area, BooleanOps, BoundingRect, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::polyline::clip_to_polygon;
use crate::core_types::{Point, Vec2};
use crate::error::{require_positive, Result};

/// Margin added around cutting rectangles and lines so they fully cover the boundary
const CUT_MARGIN: f64 = 1.0;

/// Axis along which successive bands are stacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitAxis {
    /// Bands stacked along the firing direction (local Y)
    Along,
    /// Bands stacked across the firing direction (local X)
    Across,
}

/// One band of the boundary between two cut lines
#[derive(Debug, Clone)]
pub struct Band {
    /// Lower cut coordinate on the split axis
    pub lo: f64,
    /// Upper cut coordinate on the split axis
    pub hi: f64,
    /// Intersection of the boundary with the band, local frame
    pub area: MultiPolygon<f64>,
}

impl Band {
    /// Band thickness on the split axis
    pub fn thickness(&self) -> f64 {
        self.hi - self.lo
    }

    /// Area of the band's geometry
    pub fn area_sq_m(&self) -> f64 {
        self.area.unsigned_area()
    }
}

/// Splits an oriented boundary into ordered parallel bands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonSplitter {
    depth: f64,
    axis: SplitAxis,
}

impl PolygonSplitter {
    /// Splitter cutting every `depth` metres along the firing direction
    pub fn new(depth: f64) -> Result<Self> {
        Ok(Self {
            depth: require_positive("depth", depth)?,
            axis: SplitAxis::Along,
        })
    }

    /// Splitter cutting every `depth` metres across the firing direction
    pub fn across(depth: f64) -> Result<Self> {
        Ok(Self {
            depth: require_positive("depth", depth)?,
            axis: SplitAxis::Across,
        })
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn axis(&self) -> SplitAxis {
        self.axis
    }

    /// Extent `(min, max)` of a polygon on the split axis
    pub fn extent(&self, polygon: &Polygon<f64>) -> Option<(f64, f64)> {
        let rect = polygon.bounding_rect()?;
        Some(match self.axis {
            SplitAxis::Along => (rect.min().y, rect.max().y),
            SplitAxis::Across => (rect.min().x, rect.max().x),
        })
    }

    /// Cut a local-frame polygon into bands ordered by increasing coordinate.
    ///
    /// A depth at least as large as the extent yields a single band holding
    /// the whole boundary.
    pub fn split(&self, polygon: &Polygon<f64>) -> Vec<Band> {
        let Some((lo, hi)) = self.extent(polygon) else {
            return Vec::new();
        };
        let extent = hi - lo;
        if self.depth >= extent {
            return vec![Band {
                lo,
                hi,
                area: MultiPolygon::new(vec![polygon.clone()]),
            }];
        }

        let count = (extent / self.depth).ceil() as usize;
        let bands: Vec<Band> = (0..count)
            .map(|i| {
                let band_lo = lo + i as f64 * self.depth;
                let band_hi = (band_lo + self.depth).min(hi);
                Band {
                    lo: band_lo,
                    hi: band_hi,
                    area: self.cut(polygon, band_lo, band_hi),
                }
            })
            .filter(|band| band.area_sq_m() > 0.0)
            .collect();

        debug!(depth = self.depth, bands = bands.len(), extent, "Split boundary into bands");
        bands
    }

    /// Cut a band into consecutive lanes of the given widths starting at its
    /// lower edge. Lanes are clipped to the band's geometry.
    pub fn split_lanes(&self, band: &Band, widths: &[f64]) -> Vec<Band> {
        let mut lo = band.lo;
        widths
            .iter()
            .map(|&width| {
                let hi = lo + width;
                let lane = Band {
                    lo,
                    hi,
                    area: self.cut_multi(&band.area, lo, hi.min(band.hi)),
                };
                lo = hi;
                lane
            })
            .collect()
    }

    /// Ignition line through the middle of a lane, clipped to the boundary.
    ///
    /// The centre is taken over the part of the lane that overlaps the
    /// boundary. Legs are oriented along `walk_sign` on the cross axis (Along
    /// splits walk on X, Across splits walk on Y) and ordered by travel.
    pub fn ignition_line(
        &self,
        polygon: &Polygon<f64>,
        lane: &Band,
        walk_sign: f64,
    ) -> Vec<Vec<Point>> {
        let (Some(rect), Some((ext_lo, ext_hi))) =
            (polygon.bounding_rect(), self.extent(polygon))
        else {
            return Vec::new();
        };
        let lo = lane.lo.max(ext_lo);
        let hi = lane.hi.min(ext_hi);
        if hi <= lo {
            return Vec::new();
        }
        let centre = 0.5 * (lo + hi);

        let (line, heading) = match self.axis {
            SplitAxis::Along => (
                vec![
                    Point::new(rect.min().x - CUT_MARGIN, centre),
                    Point::new(rect.max().x + CUT_MARGIN, centre),
                ],
                Vec2::new(walk_sign.signum(), 0.0),
            ),
            SplitAxis::Across => (
                vec![
                    Point::new(centre, rect.min().y - CUT_MARGIN),
                    Point::new(centre, rect.max().y + CUT_MARGIN),
                ],
                Vec2::new(0.0, walk_sign.signum()),
            ),
        };
        clip_to_polygon(&line, polygon, heading)
    }

    fn band_rect(&self, bounds: Rect<f64>, lo: f64, hi: f64) -> Polygon<f64> {
        let rect = match self.axis {
            SplitAxis::Along => Rect::new(
                coord! { x: bounds.min().x - CUT_MARGIN, y: lo },
                coord! { x: bounds.max().x + CUT_MARGIN, y: hi },
            ),
            SplitAxis::Across => Rect::new(
                coord! { x: lo, y: bounds.min().y - CUT_MARGIN },
                coord! { x: hi, y: bounds.max().y + CUT_MARGIN },
            ),
        };
        rect.to_polygon()
    }

    fn cut(&self, polygon: &Polygon<f64>, lo: f64, hi: f64) -> MultiPolygon<f64> {
        match polygon.bounding_rect() {
            Some(bounds) => polygon.intersection(&self.band_rect(bounds, lo, hi)),
            None => MultiPolygon::new(vec![]),
        }
    }

    fn cut_multi(&self, area: &MultiPolygon<f64>, lo: f64, hi: f64) -> MultiPolygon<f64> {
        match area.bounding_rect() {
            Some(bounds) if hi > lo => area.intersection(&self.band_rect(bounds, lo, hi)),
            _ => MultiPolygon::new(vec![]),
        }
    }
}
