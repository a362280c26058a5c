//! Template matching shared by visual odometry and the view-cell store.
//!
//! ## Overview
//!
//! - [`Signature`]: Unit-mass column profile of a frame
//! - [`compare`]: Brute-force windowed L1 alignment of two profiles
//!
//! ## Example
//!
//! ```rust
//! use ratslam::core::Frame;
//! use ratslam::matching::{Signature, compare};
//!
//! let frame = Frame::from_u8(4, 1, &[1, 2, 3, 4]).unwrap();
//! let sig = Signature::from_frame(&frame);
//! assert!((sig.total() - 1.0).abs() < 1e-12);
//!
//! let result = compare(sig.values(), sig.values(), 2);
//! assert_eq!(result.distance, 0.0);
//! ```

mod template;

pub use template::{Signature, TemplateMatch, compare, signature_of};
