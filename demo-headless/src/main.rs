use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use firing_core::{
    BurnUnit, CrewConstraints, ElevationGrid, FiringTechnique, IgnitionCrew, Igniter, Pattern,
    PatternWarning, Point,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate prescribed-fire ignition patterns from a JSON scenario
#[derive(Parser, Debug)]
#[command(name = "firing-headless")]
#[command(about = "Headless ignition pattern generator", long_about = None)]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Write the pattern JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a per-heat summary instead of the pattern JSON
    #[arg(short, long)]
    summary: bool,

    /// Seconds between the end of one technique's pattern and the next
    #[arg(short, long, default_value_t = 0.0)]
    gap: f64,

    /// Express coordinates relative to this origin (X Y)
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    origin: Option<Vec<f64>>,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,
}

/// Scenario file contents
#[derive(Debug, Deserialize)]
struct Scenario {
    /// Exterior ring of the burn unit in projected metres
    boundary: Vec<[f64; 2]>,
    /// Firing direction in degrees clockwise from north
    direction: f64,
    #[serde(default)]
    crs: Option<u32>,
    crew: ScenarioCrew,
    /// Techniques to run one after another
    techniques: Vec<FiringTechnique>,
    #[serde(default)]
    terrain: Option<ScenarioTerrain>,
    /// Inward control-line buffer applied before any technique (m)
    #[serde(default)]
    control_line: f64,
}

#[derive(Debug, Deserialize)]
struct ScenarioCrew {
    igniters: Vec<Igniter>,
    #[serde(default)]
    constraints: CrewConstraints,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScenarioTerrain {
    /// Flat terrain covering the unit plus a margin
    Flat {
        cell_size: f64,
        #[serde(default)]
        elevation: f64,
        #[serde(default = "default_margin")]
        margin: f64,
        #[serde(default)]
        z_scale: Option<f64>,
    },
    /// Gaussian hill centred on the unit
    Hill {
        cell_size: f64,
        #[serde(default)]
        base_elevation: f64,
        hill_height: f64,
        hill_radius: f64,
        #[serde(default = "default_margin")]
        margin: f64,
        #[serde(default)]
        z_scale: Option<f64>,
    },
    /// North-up raster, first row northernmost
    Heightmap {
        upper_left: [f64; 2],
        resolution: f64,
        nx: usize,
        ny: usize,
        rows: Vec<f64>,
        #[serde(default)]
        nodata: Option<f64>,
        #[serde(default)]
        z_scale: Option<f64>,
    },
}

fn default_margin() -> f64 {
    20.0
}

#[derive(Debug, Serialize)]
struct Output<'a> {
    pattern: &'a Pattern,
    warnings: &'a [PatternWarning],
}

impl ScenarioTerrain {
    fn build(&self, boundary: &[[f64; 2]]) -> Result<ElevationGrid> {
        let (min, max) = bounds(boundary)?;
        let grid = match *self {
            ScenarioTerrain::Flat {
                cell_size,
                elevation,
                margin,
                z_scale,
            } => with_scale(
                ElevationGrid::flat(
                    Point::new(min[0] - margin, min[1] - margin),
                    max[0] - min[0] + 2.0 * margin,
                    max[1] - min[1] + 2.0 * margin,
                    cell_size,
                    elevation,
                )?,
                z_scale,
            )?,
            ScenarioTerrain::Hill {
                cell_size,
                base_elevation,
                hill_height,
                hill_radius,
                margin,
                z_scale,
            } => with_scale(
                ElevationGrid::single_hill(
                    Point::new(min[0] - margin, min[1] - margin),
                    max[0] - min[0] + 2.0 * margin,
                    max[1] - min[1] + 2.0 * margin,
                    cell_size,
                    base_elevation,
                    hill_height,
                    hill_radius,
                )?,
                z_scale,
            )?,
            ScenarioTerrain::Heightmap {
                upper_left,
                resolution,
                nx,
                ny,
                ref rows,
                nodata,
                z_scale,
            } => with_scale(
                ElevationGrid::from_north_up_raster(
                    Point::new(upper_left[0], upper_left[1]),
                    resolution,
                    nx,
                    ny,
                    rows,
                    nodata,
                )?,
                z_scale,
            )?,
        };
        Ok(grid)
    }
}

fn with_scale(grid: ElevationGrid, z_scale: Option<f64>) -> Result<ElevationGrid> {
    Ok(match z_scale {
        Some(z_scale) => grid.with_z_scale(z_scale)?,
        None => grid,
    })
}

fn bounds(boundary: &[[f64; 2]]) -> Result<([f64; 2], [f64; 2])> {
    if boundary.is_empty() {
        bail!("scenario boundary has no vertices");
    }
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for v in boundary {
        for axis in 0..2 {
            min[axis] = min[axis].min(v[axis]);
            max[axis] = max[axis].max(v[axis]);
        }
    }
    Ok((min, max))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&text).context("parsing scenario")?;
    if scenario.techniques.is_empty() {
        bail!("scenario lists no techniques");
    }

    let vertices: Vec<(f64, f64)> = scenario.boundary.iter().map(|v| (v[0], v[1])).collect();
    let mut unit = BurnUnit::from_exterior(&vertices, scenario.direction, scenario.crs)?;
    if scenario.control_line > 0.0 {
        unit = unit.buffer_control_line(scenario.control_line)?;
    }
    if let Some(terrain) = &scenario.terrain {
        unit = unit.with_elevation(terrain.build(&scenario.boundary)?);
    }
    let crew = IgnitionCrew::new(scenario.crew.igniters, scenario.crew.constraints)?;

    info!(
        area = unit.area(),
        direction = *unit.direction(),
        igniters = crew.len(),
        techniques = scenario.techniques.len(),
        "Loaded scenario"
    );

    let mut pattern = Pattern::default();
    let mut warnings = Vec::new();
    let reports = FiringTechnique::generate_batch(&unit, &crew, &scenario.techniques);
    for (technique, report) in scenario.techniques.iter().zip(reports) {
        let report = report.with_context(|| format!("generating {} pattern", technique.name()))?;
        let offset = pattern.end_time().map_or(0.0, |end| end + args.gap);
        pattern = pattern.merge(&report.pattern, offset);
        warnings.extend(report.warnings);
    }

    if let Some(origin) = &args.origin {
        pattern = pattern.translated(-origin[0], -origin[1]);
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    if args.summary {
        write_summary(&mut out, &pattern, &warnings)?;
    } else {
        let output = Output {
            pattern: &pattern,
            warnings: &warnings,
        };
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, &output)?;
        } else {
            serde_json::to_writer(&mut out, &output)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_summary(
    out: &mut dyn Write,
    pattern: &Pattern,
    warnings: &[PatternWarning],
) -> Result<()> {
    writeln!(out, "=== Ignition Pattern ===")?;
    writeln!(
        out,
        "Heats: {}  Paths: {}  Elapsed: {:.1} s",
        pattern.heat_count(),
        pattern.paths.len(),
        pattern.elapsed_time()
    )?;
    writeln!(out)?;
    writeln!(out, "Heat | Igniters | Start(s) | End(s)  | Waypoints")?;
    writeln!(out, "-----|----------|----------|---------|----------")?;
    for k in 0..pattern.heat_count() {
        let paths: Vec<_> = pattern.heat(k).collect();
        let start = paths
            .iter()
            .filter_map(|p| p.start_time())
            .fold(f64::INFINITY, f64::min);
        let end = paths
            .iter()
            .filter_map(|p| p.end_time())
            .fold(f64::NEG_INFINITY, f64::max);
        let waypoints: usize = paths.iter().map(|p| p.waypoints().count()).sum();
        writeln!(
            out,
            "{:4} | {:8} | {:8.1} | {:7.1} | {:9}",
            k,
            paths.len(),
            start,
            end,
            waypoints
        )?;
    }

    if !warnings.is_empty() {
        writeln!(out, "\nWarnings:")?;
        for warning in warnings {
            writeln!(out, "  - {warning}")?;
        }
    }
    Ok(())
}
