//! Drive RatSLAM around a synthetic loop and export the experience map.
//!
//! The world is a ring of places, each with its own random panorama. The
//! route visits every place in order for a number of laps.
//!
//! Unrelated random panoramas carry no geometry, so their template offsets
//! and distances are not real motion. By default the pose cells ignore
//! translation and the column offset is not turned into rotation. The pose
//! estimate then stays put, and every place on lap two onwards is a revisit
//! of its first-lap experience: `places * (laps - 1)` revisits in total.
//! Pass `--path-integration` to feed the raw template motion through
//! instead; the pose then wanders and revisits become rare.
//!
//! Usage:
//!   cargo run --example synthetic_route -- --laps 3
//!   cargo run --example synthetic_route -- --config configs/ratslam.yaml --output map.yaml

use std::path::{Path, PathBuf};

use clap::Parser;
use rand::prelude::*;

use ratslam::pipeline::SlamWorker;
use ratslam::{Frame, MatchOutcome, RatSlamConfig};

/// Synthetic loop-closure demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (defaults are used if missing)
    #[arg(short, long, default_value = "configs/ratslam.yaml")]
    config: String,

    /// Use a reduced frame and pose grid
    #[arg(long)]
    small: bool,

    /// Number of distinct places on the loop
    #[arg(short, long, default_value_t = 12)]
    places: usize,

    /// Frames captured at each place per visit
    #[arg(long, default_value_t = 3)]
    dwell: usize,

    /// Laps around the loop
    #[arg(short, long, default_value_t = 2)]
    laps: usize,

    /// Per-pixel intensity noise, as a fraction of full scale
    #[arg(short, long, default_value_t = 0.0)]
    noise: f64,

    /// Feed template motion into the pose cells and heading accumulator
    #[arg(long)]
    path_integration: bool,

    /// Random seed for the world and the noise
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Write the final map here as YAML
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// One panorama per place, smooth enough for visual odometry to track.
fn build_world(rng: &mut StdRng, places: usize, width: usize) -> Vec<Vec<f64>> {
    (0..places)
        .map(|_| {
            let phase = rng.random_range(0.0..std::f64::consts::TAU);
            let freq = rng.random_range(0.05..0.3);
            (0..width)
                .map(|c| 120.0 + 80.0 * (c as f64 * freq + phase).sin() + rng.random_range(0.0..30.0))
                .collect()
        })
        .collect()
}

fn capture(rng: &mut StdRng, panorama: &[f64], height: usize, noise: f64) -> Frame {
    if noise <= 0.0 {
        return Frame::from_column_profile(panorama, height);
    }
    let pixels: Vec<f64> = (0..height)
        .flat_map(|_| panorama.iter())
        .map(|&p| (p + rng.random_range(-noise..noise) * 255.0).clamp(0.0, 255.0))
        .collect();
    Frame::new(panorama.len(), height, pixels).expect("frame size matches panorama")
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = if args.small {
        RatSlamConfig::small(48, 8)
    } else {
        let path = Path::new(&args.config);
        if path.exists() {
            RatSlamConfig::load(path).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config: {}, using defaults", e);
                RatSlamConfig::default()
            })
        } else {
            println!("Config not found at {}, using defaults", path.display());
            RatSlamConfig::default()
        }
    };

    if !args.path_integration {
        config.pose_cells.vtrans_scaling = 0.0;
        config.visual_odometry.rotation_scale = 0.0;
    }

    let (width, height) = (config.frame.width, config.frame.height);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let world = build_world(&mut rng, args.places.max(1), width);

    println!(
        "Driving {} laps over {} places ({}x{} frames)",
        args.laps,
        world.len(),
        width,
        height
    );

    let worker = SlamWorker::spawn(config).unwrap_or_else(|e| {
        eprintln!("Failed to start RatSLAM: {}", e);
        std::process::exit(1);
    });
    let results = worker.results();

    // Producer and consumer share this thread; drain as we go so the
    // unbounded result queue stays short.
    let (mut created, mut closures, mut ambiguous) = (0, 0, 0);
    let mut tally = |outcome: &MatchOutcome| match outcome {
        MatchOutcome::Created | MatchOutcome::Unmatched => created += 1,
        MatchOutcome::Revisited => closures += 1,
        MatchOutcome::Ambiguous { .. } => ambiguous += 1,
        MatchOutcome::Unchanged => {}
    };

    for _ in 0..args.laps {
        for panorama in &world {
            for _ in 0..args.dwell.max(1) {
                let frame = capture(&mut rng, panorama, height, args.noise);
                if worker.submit(frame).is_err() {
                    eprintln!("Worker stopped early");
                    break;
                }
            }
            for result in results.try_iter() {
                match result {
                    Ok(output) => tally(&output.map_delta.outcome),
                    Err(e) => eprintln!("Frame rejected: {}", e),
                }
            }
        }
    }

    let slam = worker.join().unwrap_or_else(|e| {
        eprintln!("Worker failed: {}", e);
        std::process::exit(1);
    });
    for output in results.iter().flatten() {
        tally(&output.map_delta.outcome);
    }

    let map = slam.experience_map();
    println!("Frames processed:   {}", slam.ticks());
    println!("View cells:         {}", slam.view_cells().len());
    println!("Experiences:        {} ({} created)", map.len(), created);
    println!("Links:              {}", map.link_count());
    println!("Revisits:           {}", closures);
    println!("Ambiguous matches:  {}", ambiguous);
    println!("Map residual:       {:.6}", map.residual());

    if let Some(path) = args.output {
        match slam.snapshot().to_yaml() {
            Ok(yaml) => match std::fs::write(&path, yaml) {
                Ok(()) => println!("Map written to {}", path.display()),
                Err(e) => eprintln!("Failed to write {}: {}", path.display(), e),
            },
            Err(e) => eprintln!("Failed to serialize map: {}", e),
        }
    }
}
