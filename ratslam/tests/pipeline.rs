//! Background worker against the synchronous estimator.

mod common;

use std::thread;

use ratslam::pipeline::SlamWorker;
use ratslam::{RatSlam, RatSlamConfig};

use common::{init_logging, place_frames};

#[test]
fn test_worker_matches_synchronous_run() {
    init_logging();

    let frames = place_frames(5, 32, 4, 11);
    let route: Vec<usize> = vec![0, 1, 2, 3, 4, 0, 1, 2, 2, 3, 4, 0, 0, 1];

    let mut slam = RatSlam::new(RatSlamConfig::small(32, 4)).unwrap();
    let expected: Vec<_> = route
        .iter()
        .map(|&p| slam.step(&frames[p]).unwrap())
        .collect();

    let mut config = RatSlamConfig::small(32, 4);
    config.pipeline.queue_capacity = 2;
    let worker = SlamWorker::spawn(config).unwrap();
    let results = worker.results();

    let sender = worker.sender();
    let producer_frames: Vec<_> = route.iter().map(|&p| frames[p].clone()).collect();
    let producer = thread::spawn(move || {
        for frame in producer_frames {
            sender.send(frame).unwrap();
        }
    });
    producer.join().unwrap();

    let background = worker.join().unwrap();
    let outputs: Vec<_> = results.iter().map(|r| r.unwrap()).collect();

    assert_eq!(outputs.len(), expected.len());
    for (got, want) in outputs.iter().zip(&expected) {
        assert_eq!(got.tick, want.tick);
        assert_eq!(got.view_cell, want.view_cell);
        assert_eq!(got.map_delta, want.map_delta);
        assert_eq!(got.pose, want.pose);
    }

    assert_eq!(background.ticks(), slam.ticks());
    assert_eq!(
        background.snapshot().to_yaml().unwrap(),
        slam.snapshot().to_yaml().unwrap()
    );
}
