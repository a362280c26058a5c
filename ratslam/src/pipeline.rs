//! Background SLAM worker.
//!
//! Runs a [`RatSlam`] on its own thread:
//! - Frames arrive through a bounded crossbeam channel, so a producer that
//!   outpaces the worker blocks in [`SlamWorker::submit`]
//! - Frames are processed strictly in submission order
//! - One result per frame is sent back on an unbounded channel
//! - Closing the frame channel ends the stream; [`SlamWorker::join`] then
//!   returns the final estimator
//!
//! # Example
//!
//! ```rust
//! use ratslam::{Frame, RatSlamConfig};
//! use ratslam::pipeline::SlamWorker;
//!
//! let worker = SlamWorker::spawn(RatSlamConfig::small(32, 4)).unwrap();
//! let results = worker.results();
//!
//! let profile: Vec<f64> = (0..32).map(|i| 1.0 + (i as f64 * 0.4).sin()).collect();
//! worker.submit(Frame::from_column_profile(&profile, 4)).unwrap();
//!
//! let slam = worker.join().unwrap();
//! assert_eq!(slam.ticks(), 1);
//! assert_eq!(results.iter().count(), 1);
//! ```

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::config::RatSlamConfig;
use crate::core::Frame;
use crate::error::{Result, SlamError};
use crate::{RatSlam, StepOutput};

/// Per-frame result delivered by the worker
pub type StepResult = Result<StepOutput>;

/// Handle to a RatSLAM instance running on a background thread.
pub struct SlamWorker {
    frames: Sender<Frame>,
    results: Receiver<StepResult>,
    handle: JoinHandle<RatSlam>,
}

impl SlamWorker {
    /// Validate the configuration and start the worker thread.
    pub fn spawn(config: RatSlamConfig) -> Result<Self> {
        let capacity = config.pipeline.queue_capacity;
        let slam = RatSlam::new(config)?;

        let (frame_tx, frame_rx) = bounded::<Frame>(capacity);
        let (result_tx, result_rx) = unbounded::<StepResult>();

        let handle = thread::Builder::new()
            .name("ratslam".into())
            .spawn(move || run_loop(slam, frame_rx, result_tx))?;

        Ok(Self {
            frames: frame_tx,
            results: result_rx,
            handle,
        })
    }

    /// Queue a frame, blocking while the queue is full.
    pub fn submit(&self, frame: Frame) -> Result<()> {
        self.frames.send(frame).map_err(|_| SlamError::WorkerStopped)
    }

    /// Extra sender for producers on other threads.
    ///
    /// The stream only ends once every sender is dropped, so clones must
    /// be dropped before [`join`](Self::join).
    pub fn sender(&self) -> Sender<Frame> {
        self.frames.clone()
    }

    /// Receiver of per-frame results, in submission order.
    ///
    /// Stays usable after [`join`](Self::join) to drain pending results.
    pub fn results(&self) -> Receiver<StepResult> {
        self.results.clone()
    }

    /// End the stream and wait for the worker to finish every queued frame.
    pub fn join(self) -> Result<RatSlam> {
        let Self {
            frames, handle, ..
        } = self;
        drop(frames);
        handle.join().map_err(|_| {
            log::error!("RatSLAM worker panicked");
            SlamError::WorkerStopped
        })
    }
}

fn run_loop(mut slam: RatSlam, frames: Receiver<Frame>, results: Sender<StepResult>) -> RatSlam {
    log::info!("RatSLAM worker started");

    for frame in frames.iter() {
        let result = slam.step(&frame);
        if let Err(e) = &result {
            log::warn!("Frame rejected: {}", e);
        }
        if results.send(result).is_err() {
            log::debug!("Result receiver dropped, stopping worker");
            break;
        }
    }

    log::info!("RatSLAM worker finished after {} frames", slam.ticks());
    slam
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(phase: f64) -> Frame {
        let profile: Vec<f64> = (0..32)
            .map(|i| 1.5 + (i as f64 * 0.3 + phase).sin())
            .collect();
        Frame::from_column_profile(&profile, 4)
    }

    #[test]
    fn test_results_in_order() {
        let worker = SlamWorker::spawn(RatSlamConfig::small(32, 4)).unwrap();
        let results = worker.results();

        for i in 0..5 {
            worker.submit(frame(i as f64 * 0.2)).unwrap();
        }
        let slam = worker.join().unwrap();

        let ticks: Vec<u64> = results.iter().map(|r| r.unwrap().tick).collect();
        assert_eq!(ticks, vec![0, 1, 2, 3, 4]);
        assert_eq!(slam.ticks(), 5);
    }

    #[test]
    fn test_bad_frame_reported_not_fatal() {
        let worker = SlamWorker::spawn(RatSlamConfig::small(32, 4)).unwrap();
        let results = worker.results();

        worker.submit(frame(0.0)).unwrap();
        worker
            .submit(Frame::from_column_profile(&[1.0; 8], 4))
            .unwrap();
        worker.submit(frame(0.1)).unwrap();
        let slam = worker.join().unwrap();

        let collected: Vec<StepResult> = results.iter().collect();
        assert_eq!(collected.len(), 3);
        assert!(matches!(collected[1], Err(SlamError::Input { .. })));
        assert_eq!(slam.ticks(), 2);
    }

    #[test]
    fn test_invalid_config_fails_to_spawn() {
        let mut config = RatSlamConfig::small(32, 4);
        config.pipeline.queue_capacity = 0;
        assert!(matches!(
            SlamWorker::spawn(config),
            Err(SlamError::Configuration(_))
        ));
    }
}
