//! Test utilities for RatSLAM.
//!
//! Helpers for synthetic frames, place signatures and routes.

#![allow(dead_code)]

use std::f64::consts::FRAC_PI_2;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratslam::{Frame, Odometry, PoseEstimate, Signature};

/// Initialise logging once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Random strictly positive column profile.
pub fn random_profile(rng: &mut StdRng, width: usize) -> Vec<f64> {
    (0..width).map(|_| rng.random_range(0.2..1.0)).collect()
}

/// One distinct signature per place.
pub fn place_signatures(count: usize, width: usize, seed: u64) -> Vec<Signature> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Signature::from_profile(random_profile(&mut rng, width)))
        .collect()
}

/// One distinct frame per place; every row repeats the place's profile.
pub fn place_frames(count: usize, width: usize, height: usize, seed: u64) -> Vec<Frame> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Frame::from_column_profile(&random_profile(&mut rng, width), height))
        .collect()
}

/// Random frame with per-pixel noise.
pub fn noise_frame(rng: &mut StdRng, width: usize, height: usize) -> Frame {
    let pixels: Vec<u8> = (0..width * height).map(|_| rng.random_range(0..=255u8)).collect();
    Frame::from_u8(width, height, &pixels).expect("valid frame size")
}

/// One tick of a scripted route.
#[derive(Clone, Copy, Debug)]
pub struct RouteStep {
    /// Index of the place signature seen on this tick
    pub place: usize,
    /// Pose-cell estimate fed to the map
    pub pose: PoseEstimate,
    /// Odometry fed to the map
    pub odometry: Odometry,
}

fn route_step(place: usize, x: f64, y: f64, vtrans: f64, vrot: f64) -> RouteStep {
    RouteStep {
        place,
        pose: PoseEstimate::new(x, y, 0.0),
        odometry: Odometry::new(vtrans, vrot),
    }
}

/// Square loop turning left at every corner, ending back at place 0.
///
/// The second leg's odometry over-reads by 10% and the final approach
/// stops short, so the closing link disagrees with the map by (0.7, 0.4).
pub fn square_route() -> Vec<RouteStep> {
    vec![
        route_step(0, 30.0, 30.0, 0.0, 0.0),
        route_step(1, 32.0, 30.0, 1.0, 0.0),
        route_step(2, 34.0, 30.0, 1.0, 0.0),
        route_step(3, 36.0, 30.0, 1.0, 0.0),
        route_step(4, 36.0, 32.0, 1.0, FRAC_PI_2),
        route_step(5, 36.0, 34.0, 1.1, 0.0),
        route_step(6, 36.0, 36.0, 1.1, 0.0),
        route_step(7, 34.0, 36.0, 1.0, FRAC_PI_2),
        route_step(8, 32.0, 36.0, 1.0, 0.0),
        route_step(9, 30.0, 36.0, 1.0, 0.0),
        route_step(10, 30.0, 34.0, 1.0, FRAC_PI_2),
        route_step(11, 30.0, 32.0, 1.0, 0.0),
        route_step(12, 30.0, 31.0, 0.5, 0.0),
        route_step(0, 30.0, 30.2, 0.4, FRAC_PI_2),
    ]
}
