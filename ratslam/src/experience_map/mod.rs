//! Experience map: the topological output of RatSLAM.
//!
//! ## Overview
//!
//! An experience ties a view cell to a pose-cell estimate and a position in
//! map space. Links between experiences store the odometry travelled from
//! one to the next. Each update either:
//!
//! - creates a new experience when the place or pose is new,
//! - switches to an existing experience when a different view cell is
//!   recognised near it (closing a loop), or
//! - leaves the graph alone.
//!
//! After every switch the whole graph is relaxed: each link pulls its two
//! ends toward agreement with the stored measurement.
//!
//! Experiences are never deleted, so an [`ExperienceId`] stays valid until
//! [`ExperienceMap::reset`].

mod config;
mod graph;
mod map;
mod snapshot;

pub use config::ExperienceMapConfig;
pub use graph::{Experience, ExperienceId, ExperienceLink};
pub use map::{ExperienceMap, MapDelta, MatchOutcome, RelaxationReport};
pub use snapshot::{ExperienceSnapshot, LinkSnapshot, MapSnapshot};
