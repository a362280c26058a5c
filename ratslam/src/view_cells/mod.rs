//! View cells: the appearance side of place recognition.
//!
//! ## Overview
//!
//! Every frame signature is scored against all stored cells with the
//! template matcher. A score is the best alignment distance multiplied by
//! the signature length. When the best score exceeds the match threshold
//! the frame is a new place and a cell is appended, anchored at the current
//! pose-cell estimate. Otherwise the best (earliest on ties) cell becomes
//! active again.
//!
//! Cells are never removed or reordered, so a [`ViewCellId`] stays valid
//! for the life of the store.

mod config;
mod store;

pub use config::ViewCellConfig;
pub use store::{ViewCell, ViewCellId, ViewCellMatch, ViewCellStore};
