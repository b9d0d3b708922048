//! Cross-module properties of frames, splitting, kinematics, distance fields
//! and timed patterns.

use approx::assert_relative_eq;
use firing_core::geometry::polyline::length;
use firing_core::{
    BurnUnit, Degrees, DistanceField, ElevationGrid, FiringTechnique, IgnitionCrew,
    IgniterKinematics, Igniter, OrientedFrame, Path, Pattern, Point, PolygonSplitter, StripConfig,
    StripContourConfig, TimingConfig,
};
use geo::{Area, BooleanOps, MultiPolygon};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn square() -> BurnUnit {
    BurnUnit::from_exterior(
        &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
        0.0,
        None,
    )
    .unwrap()
}

/// Irregular concave unit in projected metres far from the origin
fn irregular() -> BurnUnit {
    BurnUnit::from_exterior(
        &[
            (500_000.0, 4_100_000.0),
            (500_180.0, 4_100_020.0),
            (500_210.0, 4_100_150.0),
            (500_120.0, 4_100_110.0),
            (500_060.0, 4_100_190.0),
            (499_980.0, 4_100_090.0),
        ],
        37.0,
        Some(32611),
    )
    .unwrap()
}

fn crew(n: usize, velocity: f64) -> IgnitionCrew {
    IgnitionCrew::clone_igniter(Igniter::line(velocity).unwrap(), n).unwrap()
}

#[test]
fn test_frame_round_trip_any_direction() {
    let unit = irregular();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let direction = Degrees::new(rng.random_range(0.0..360.0));
        let frame = OrientedFrame::new(unit.polygon(), direction).unwrap();
        let p = Point::new(
            rng.random_range(499_000.0..501_000.0),
            rng.random_range(4_099_000.0..4_101_000.0),
        );
        let back = frame.to_world(&frame.to_local(&p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-6);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-6);
    }
}

#[test]
fn test_firing_direction_maps_to_local_y() {
    for direction in [0.0, 45.0, 90.0, 200.0, 359.0] {
        let frame = OrientedFrame::new(irregular().polygon(), Degrees::new(direction)).unwrap();
        let world = frame.world_direction();
        let origin = frame.to_local(&Point::new(0.0, 0.0));
        let tip = frame.to_local(&(Point::new(0.0, 0.0) + world));
        assert_relative_eq!(tip.x - origin.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(tip.y - origin.y, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_splitter_bands_cover_boundary_without_overlap() {
    let unit = irregular();
    let frame = unit.frame();
    let local = frame.polygon_to_local(unit.polygon());

    for depth in [17.0, 40.0, 500.0] {
        let bands = PolygonSplitter::new(depth).unwrap().split(&local);
        let total: f64 = bands.iter().map(|b| b.area_sq_m()).sum();
        assert_relative_eq!(total, local.unsigned_area(), max_relative = 1e-7);

        let union = bands
            .iter()
            .fold(MultiPolygon::new(vec![]), |acc, band| acc.union(&band.area));
        assert_relative_eq!(union.unsigned_area(), local.unsigned_area(), max_relative = 1e-7);

        for (i, a) in bands.iter().enumerate() {
            for b in &bands[i + 1..] {
                assert!(a.area.intersection(&b.area).unsigned_area() < 1e-6);
            }
        }
    }
}

#[test]
fn test_kinematics_interval_shapes() {
    let line = IgniterKinematics::from(&Igniter::line(1.0).unwrap());
    let intervals = line.sample(37.5);
    assert_eq!(intervals.len(), 1);
    assert_eq!((intervals[0].start, intervals[0].end), (0.0, 37.5));

    let dash = IgniterKinematics::from(&Igniter::dash(1.0, 10.0, 10.0).unwrap());
    let bounds: Vec<(f64, f64)> = dash.sample(45.0).iter().map(|i| (i.start, i.end)).collect();
    assert_eq!(bounds, vec![(0.0, 10.0), (20.0, 30.0), (40.0, 45.0)]);
}

#[test]
fn test_strip_square_scenario() {
    let technique = FiringTechnique::Strip(StripConfig {
        depth: 50.0,
        spacing: 0.0,
        ..StripConfig::default()
    });
    let report = technique.generate_pattern(&square(), &crew(1, 1.0)).unwrap();
    let pattern = &report.pattern;
    assert_eq!(pattern.heat_count(), 2);
    assert!(report.warnings.is_empty());

    // Heat 0 is the southern half, heat 1 the northern
    let y0 = pattern.heat(0).next().unwrap().strokes[0][0].point.y;
    let y1 = pattern.heat(1).next().unwrap().strokes[0][0].point.y;
    assert!(y0 < y1);
    assert_relative_eq!(y0, 25.0, epsilon = 1e-9);
    assert_relative_eq!(y1, 75.0, epsilon = 1e-9);
}

#[test]
fn test_timestamps_monotonic_and_heats_respect_delay() {
    let heat_delay = 45.0;
    let technique = FiringTechnique::Strip(StripConfig {
        depth: 15.0,
        spacing: 5.0,
        timing: TimingConfig {
            heat_delay,
            igniter_delay: 2.0,
            ..TimingConfig::default()
        },
        ..StripConfig::default()
    });
    let report = technique.generate_pattern(&irregular(), &crew(3, 0.4)).unwrap();
    let pattern = &report.pattern;
    assert!(pattern.heat_count() > 1);

    for path in &pattern.paths {
        let times: Vec<f64> = path.waypoints().map(|w| w.time).collect();
        assert!(times.windows(2).all(|w| w[1] >= w[0] - 1e-9), "{times:?}");
    }

    let min_time = |k: usize| {
        pattern
            .heat(k)
            .filter_map(|p| p.start_time())
            .fold(f64::INFINITY, f64::min)
    };
    for k in 1..pattern.heat_count() {
        assert!(min_time(k) >= min_time(k - 1) + heat_delay - 1e-9);
    }
}

#[test]
fn test_merge_is_associative_in_offset() {
    let unit = square();
    let crew = crew(2, 0.5);
    let a = FiringTechnique::Strip(StripConfig {
        depth: 30.0,
        ..StripConfig::default()
    })
    .generate_pattern(&unit, &crew)
    .unwrap()
    .pattern;
    let b = FiringTechnique::Ring(Default::default())
        .generate_pattern(&unit, &crew)
        .unwrap()
        .pattern;
    let c = FiringTechnique::Back(Default::default())
        .generate_pattern(&unit, &crew)
        .unwrap()
        .pattern;
    let (t1, t2) = (300.0, 1250.0);

    let left = a.merge(&b, t1).merge(&c, t2);
    let right = a.merge(&b.merge(&c, t2 - t1), t1);

    let flatten = |p: &Pattern| {
        let mut items: Vec<(usize, usize, f64, f64, f64)> = p
            .waypoints()
            .map(|(heat, igniter, w)| (heat, igniter, w.point.x, w.point.y, w.time))
            .collect();
        items.sort_by(|x, y| {
            (x.0, x.1)
                .cmp(&(y.0, y.1))
                .then(x.4.total_cmp(&y.4))
                .then(x.2.total_cmp(&y.2))
                .then(x.3.total_cmp(&y.3))
        });
        items
    };
    let (l, r) = (flatten(&left), flatten(&right));
    assert_eq!(l.len(), r.len());
    for (x, y) in l.iter().zip(&r) {
        assert_eq!((x.0, x.1), (y.0, y.1));
        assert_relative_eq!(x.2, y.2, epsilon = 1e-9);
        assert_relative_eq!(x.3, y.3, epsilon = 1e-9);
        assert_relative_eq!(x.4, y.4, epsilon = 1e-6);
    }
}

#[test]
fn test_distance_field_grows_away_from_source() {
    let grid =
        ElevationGrid::single_hill(Point::new(0.0, 0.0), 80.0, 80.0, 4.0, 100.0, 30.0, 15.0)
            .unwrap();
    let source = [Point::new(0.0, 0.0), Point::new(80.0, 0.0)];
    let field = DistanceField::compute(&grid, &source).unwrap();
    let (nx, ny) = field.dimensions();

    for iy in 0..ny {
        for ix in 0..nx {
            let d = field.distance(ix, iy).unwrap();
            assert!(d.is_finite());
            // Never shorter than the planar distance to the source row
            assert!(d >= iy as f64 * 4.0 - 1e-9);
            if d == 0.0 {
                continue;
            }
            // Every reached cell has a strictly closer neighbour
            let closer = (-1isize..=1).any(|dy| {
                (-1isize..=1).any(|dx| {
                    let (jx, jy) = (ix as isize + dx, iy as isize + dy);
                    jx >= 0
                        && jy >= 0
                        && field
                            .distance(jx as usize, jy as usize)
                            .is_some_and(|n| n < d)
                })
            });
            assert!(closer, "cell ({ix}, {iy}) is a local minimum");
        }
    }

    // Flat terrain: distance increases strictly row by row
    let flat = ElevationGrid::flat(Point::new(0.0, 0.0), 40.0, 40.0, 4.0, 0.0).unwrap();
    let field = DistanceField::compute(&flat, &source).unwrap();
    for iy in 1..11 {
        assert!(field.distance(5, iy).unwrap() > field.distance(5, iy - 1).unwrap());
    }
}

#[test]
fn test_ring_perimeter_split_between_igniters() {
    let unit = irregular();
    let report = FiringTechnique::Ring(Default::default())
        .generate_pattern(&unit, &crew(2, 1.0))
        .unwrap();
    let walked: f64 = report
        .pattern
        .paths
        .iter()
        .map(|p| length(&p.waypoints().map(|w| w.point).collect::<Vec<_>>()))
        .sum();
    let perimeter = length(&unit.segments().perimeter);
    assert_relative_eq!(walked, perimeter, max_relative = 1e-9);
}

fn first_ignition(pattern: &Pattern, heat: usize) -> f64 {
    pattern
        .heat(heat)
        .filter_map(Path::start_time)
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn test_fixed_schedule_orders_heats_when_ends_are_synced() {
    let diamond = BurnUnit::from_exterior(
        &[(50.0, 0.0), (100.0, 50.0), (50.0, 100.0), (0.0, 50.0)],
        0.0,
        None,
    )
    .unwrap();
    let heat_delay = 30.0;
    let technique = FiringTechnique::Strip(StripConfig {
        depth: 10.0,
        timing: TimingConfig {
            heat_delay,
            igniter_delay: 10.0,
            sync_end_time: true,
            ..TimingConfig::default()
        },
        ..StripConfig::default()
    });
    let pattern = technique.generate_pattern(&diamond, &crew(2, 1.0)).unwrap().pattern;
    assert_eq!(pattern.heat_count(), 5);
    assert_relative_eq!(first_ignition(&pattern, 0), 0.0);
    for k in 1..pattern.heat_count() {
        let (previous, current) = (first_ignition(&pattern, k - 1), first_ignition(&pattern, k));
        assert!(
            current >= previous + heat_delay - 1e-9,
            "heat {k}: {current} < {previous} + {heat_delay}"
        );
    }
}

#[test]
fn test_strip_contour_holds_depth_at_oblique_direction() {
    let unit = BurnUnit::from_exterior(
        &[(0.0, 0.0), (200.0, 0.0), (200.0, 200.0), (0.0, 200.0)],
        22.5,
        None,
    )
    .unwrap();
    let grid = ElevationGrid::flat(Point::new(-100.0, -100.0), 400.0, 400.0, 2.0, 0.0).unwrap();
    let unit = unit.with_elevation(grid);
    let technique = FiringTechnique::StripContour(StripContourConfig {
        strip: StripConfig {
            depth: 40.0,
            ..StripConfig::default()
        },
        ..StripContourConfig::default()
    });
    let pattern = technique.generate_pattern(&unit, &crew(1, 1.0)).unwrap().pattern;
    assert!(pattern.heat_count() >= 5);

    let frame = unit.frame();
    for (heat, _, w) in pattern.waypoints() {
        let expected = 20.0 + 40.0 * heat as f64;
        let y = frame.to_local(&w.point).y;
        assert!(
            (y - expected).abs() <= 0.015 * expected + 2.0,
            "heat {heat}: local y {y}, expected {expected}"
        );
    }
}

#[test]
fn test_keep_formation_on_triangle_unit() {
    let triangle =
        BurnUnit::from_exterior(&[(0.0, 0.0), (100.0, 0.0), (50.0, 100.0)], 0.0, None).unwrap();
    let strip = |keep_formation| {
        FiringTechnique::Strip(StripConfig {
            depth: 20.0,
            timing: TimingConfig {
                keep_formation,
                ..TimingConfig::default()
            },
            ..StripConfig::default()
        })
        .generate_pattern(&triangle, &crew(2, 1.0))
        .unwrap()
        .pattern
    };

    // Start lag of igniter 1 and its lead along igniter 0's walk
    let pairs = |pattern: &Pattern| -> Vec<(f64, f64)> {
        (0..pattern.heat_count())
            .filter_map(|k| {
                let lead = pattern.heat(k).find(|p| p.igniter == 0)?;
                let follow = pattern.heat(k).find(|p| p.igniter == 1)?;
                let (a, b) = (lead.strokes[0][0], lead.strokes[0][1]);
                let c = follow.strokes[0][0];
                let along = (c.point - a.point).dot(&(b.point - a.point).normalize());
                Some((c.time - a.time, along))
            })
            .collect()
    };

    let formed = pairs(&strip(true));
    assert!(!formed.is_empty());
    assert!(formed.iter().any(|&(_, along)| along.abs() > 1.0));
    for &(lag, along) in &formed {
        assert_relative_eq!(lag, along, epsilon = 1e-6);
    }

    let loose = pairs(&strip(false));
    assert!(loose.iter().all(|&(lag, _)| lag.abs() < 1e-9));
}

