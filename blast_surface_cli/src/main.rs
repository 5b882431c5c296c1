use std::fs::File;

use blast_surface::{build_surface, Surface, SurfaceInput, SurfaceOptions};
use clap::{Parser, Subcommand};
use serde::Deserialize;

mod files;

use files::{read_breaklines, read_points_csv, read_polygon, write_surface};

/// Serialized surface job: the input entities plus build options.
#[derive(Debug, Deserialize)]
struct Job {
    input: SurfaceInput,
    #[serde(default)]
    options: SurfaceOptions,
}

/// Command line driver for the blast surface engine.
#[derive(Parser)]
#[command(name = "blast_surface_cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Triangulate a JSON job file and write the surface as JSON.
    Triangulate { job: String, output: String },
    /// Triangulate a CSV of x,y,z[,tag] points with optional breaklines.
    TriangulateCsv {
        points: String,
        output: String,
        /// Breakline file: blocks of x,y,z rows headed by `open` or `closed`.
        #[arg(long)]
        breaklines: Option<String>,
        /// Clip polygon as x,y rows.
        #[arg(long)]
        clip: Option<String>,
        /// Remove triangles with a smaller internal angle (degrees).
        #[arg(long)]
        min_angle: Option<f64>,
        /// Remove triangles with a longer edge.
        #[arg(long)]
        max_edge: Option<f64>,
        /// Snap distance for duplicate points.
        #[arg(long)]
        tolerance: Option<f64>,
    },
}

fn init_logging() {
    if let Ok(path) = std::env::var("BLAST_SURFACE_LOG") {
        match File::create(&path) {
            Ok(file) => {
                env_logger::Builder::from_default_env()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Failed to create log file {}: {}", path, e);
                env_logger::Builder::from_default_env().init();
            }
        }
    } else {
        env_logger::Builder::from_default_env().init();
    }
}

fn report(surface: &Surface) {
    let d = &surface.diagnostics;
    println!("Vertices: {}", d.canonical_vertex_count);
    println!("Triangles: {}", d.triangles_final);
    for conflict in &d.conflicting_constraints {
        println!(
            "Warning: breakline edge {} conflicts with {}",
            conflict.edge, conflict.blocked_by
        );
    }
    for edge in &d.unplaced_constraints {
        println!("Warning: breakline edge {} could not be placed", edge);
    }
    if !d.constraints_removed_by_filter.is_empty() {
        println!(
            "Warning: {} breakline edges removed by filters",
            d.constraints_removed_by_filter.len()
        );
    }
}

fn run_job(job_path: &str) -> Result<Surface, String> {
    let text = std::fs::read_to_string(job_path)
        .map_err(|e| format!("Error reading {}: {}", job_path, e))?;
    let job: Job =
        serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {}", job_path, e))?;
    log::info!(
        "job {}: {} points, {} breaklines",
        job_path,
        job.input.points.len(),
        job.input.breaklines.len()
    );
    build_surface(&job.input, &job.options).map_err(|e| format!("Error building surface: {}", e))
}

fn run_csv(
    points: &str,
    breaklines: Option<&str>,
    clip: Option<&str>,
    options: SurfaceOptions,
) -> Result<Surface, String> {
    let mut input = SurfaceInput::new();
    input.points =
        read_points_csv(points).map_err(|e| format!("Error reading {}: {}", points, e))?;
    if let Some(path) = breaklines {
        input.breaklines =
            read_breaklines(path).map_err(|e| format!("Error reading {}: {}", path, e))?;
    }
    log::info!(
        "{}: {} points, {} breaklines",
        points,
        input.points.len(),
        input.breaklines.len()
    );
    let mut options = options;
    if let Some(path) = clip {
        options.clip_polygon =
            Some(read_polygon(path).map_err(|e| format!("Error reading {}: {}", path, e))?);
    }
    build_surface(&input, &options).map_err(|e| format!("Error building surface: {}", e))
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let (result, output) = match cli.command {
        Commands::Triangulate { job, output } => (run_job(&job), output),
        Commands::TriangulateCsv {
            points,
            output,
            breaklines,
            clip,
            min_angle,
            max_edge,
            tolerance,
        } => {
            let mut options = SurfaceOptions::default();
            options.min_angle_deg = min_angle;
            options.max_edge_length = max_edge;
            if let Some(t) = tolerance {
                options.dedup_tolerance = t;
            }
            (
                run_csv(&points, breaklines.as_deref(), clip.as_deref(), options),
                output,
            )
        }
    };
    let surface = match result {
        Ok(surface) => surface,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
    };
    if let Err(e) = write_surface(&output, &surface) {
        eprintln!("Error writing {}: {}", output, e);
        std::process::exit(1);
    }
    report(&surface);
    println!("Wrote {}", output);
}
