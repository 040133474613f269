//! Seamweld CLI - border stitching command-line tool.
//!
//! Usage: seamweld <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `seamweld --help` for available commands. Set `RUST_LOG=debug` to see
//! every stitched pair.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use clap::{Parser, Subcommand};

use seamweld::algo::stitch::{self, StitchOptions};
use seamweld::algo::Progress;
use seamweld::io::{self, LoadOptions};
use seamweld::mesh::HalfEdgeMesh;

#[derive(Parser)]
#[command(name = "seamweld")]
#[command(author, version, about = "Border stitching for polygon meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh and border information
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Load every face on its own instead of welding shared corners
        #[arg(long)]
        soup: bool,
    },

    /// Stitch duplicated border edges
    Stitch {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Merge border edges whose endpoints lie within this distance
        #[arg(short, long, default_value = "0.0")]
        tolerance: f64,

        /// Weld shared corners while loading (by default faces are loaded on their own)
        #[arg(long)]
        welded: bool,

        /// Keep removed elements' slots instead of compacting before saving
        #[arg(long)]
        no_compact: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, soup } => {
            cmd_info(&input, soup)?;
        }

        Commands::Stitch {
            input,
            output,
            tolerance,
            welded,
            no_compact,
        } => {
            cmd_stitch(&input, &output, tolerance, welded, no_compact)?;
        }
    }

    Ok(())
}

/// Create a progress reporter for `stitch_mesh_with_progress`.
///
/// The pass reports each of its stages (detection, then stitching) as a block
/// of 1000 steps, so the stage shown is `current / 1000`.
fn create_progress() -> Progress {
    let shown = AtomicUsize::new(usize::MAX);

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let (stage, stages, percent) = stage_position(current, total);

        // Redraw on a new stage or whole percent only
        let key = stage * 1000 + percent;
        if shown.swap(key, Ordering::Relaxed) == key {
            return;
        }

        let filled = (percent * BAR_WIDTH) / 100;
        eprint!(
            "\r[{}{}] {:3}% ({}/{}) {:<40}",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            percent,
            stage,
            stages,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

const STAGE_STEPS: usize = 1000;
const BAR_WIDTH: usize = 30;

/// One-based stage, stage count and overall percent for a progress report.
fn stage_position(current: usize, total: usize) -> (usize, usize, usize) {
    let stages = total.div_ceil(STAGE_STEPS);
    let stage = (current / STAGE_STEPS).min(stages - 1) + 1;
    let percent = (current.min(total) * 100) / total;
    (stage, stages, percent)
}

fn load_options(soup: bool) -> LoadOptions {
    if soup {
        LoadOptions::soup()
    } else {
        LoadOptions::default()
    }
}

fn cmd_info(input: &PathBuf, soup: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: HalfEdgeMesh = io::load_with(input, &load_options(soup))?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    println!("Edges: {} ({} interior)", mesh.num_edges(), mesh.num_interior_edges());
    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some((min, max)) = mesh.bounding_box() {
        println!("Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z);
    }

    let loops = mesh.border_loops();
    if loops.is_empty() {
        println!("Topology: Closed (no border)");
    } else {
        println!(
            "Topology: Open ({} border half-edges in {} loops)",
            mesh.num_border_halfedges(),
            loops.len()
        );
    }
    println!("Euler characteristic: {}", mesh.euler_characteristic());

    let pairs = stitch::detect_duplicate_border_edges(&mut mesh);
    println!("Duplicated border edges: {}", pairs.len());

    Ok(())
}

fn cmd_stitch(
    input: &PathBuf,
    output: &PathBuf,
    tolerance: f64,
    welded: bool,
    no_compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: HalfEdgeMesh = io::load_with(input, &load_options(!welded))?;

    println!(
        "Loaded: {} vertices, {} faces, {} border half-edges",
        mesh.num_vertices(),
        mesh.num_faces(),
        mesh.num_border_halfedges()
    );

    let options = StitchOptions::default().with_tolerance(tolerance);
    let progress = create_progress();

    let start = Instant::now();
    let report = stitch::stitch_mesh_with_progress(&mut mesh, &options, &progress)?;
    let elapsed = start.elapsed();

    println!(
        "Stitched {} pairs, merged {} vertices ({} skipped)",
        report.pairs_stitched, report.vertices_removed, report.pairs_skipped
    );

    if !no_compact {
        mesh.garbage_collection();
    }

    println!(
        "Result: {} vertices, {} faces, {} border loops",
        mesh.num_vertices(),
        mesh.num_faces(),
        mesh.border_loops().len()
    );

    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_position_follows_stitch_stages() {
        assert_eq!(stage_position(0, 2000), (1, 2, 0));
        assert_eq!(stage_position(1000, 2000), (2, 2, 50));
        assert_eq!(stage_position(1500, 2000), (2, 2, 75));
        assert_eq!(stage_position(2000, 2000), (2, 2, 100));
        // A single-stage pass such as `try_stitch_borders_with_progress`
        assert_eq!(stage_position(1000, 1000), (1, 1, 100));
    }
}
