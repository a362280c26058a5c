//! Appearance memory of visited places.

use serde::{Deserialize, Serialize};

use crate::core::PoseEstimate;
use crate::error::{Result, SlamError};
use crate::experience_map::ExperienceId;
use crate::matching::{Signature, compare};

use super::ViewCellConfig;

/// Stable index of a view cell in its store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewCellId(pub usize);

impl std::fmt::Display for ViewCellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vc{}", self.0)
    }
}

/// A remembered appearance.
#[derive(Clone, Debug)]
pub struct ViewCell {
    id: ViewCellId,
    signature: Signature,
    pose: PoseEstimate,
    decay: f64,
    experiences: Vec<ExperienceId>,
}

impl ViewCell {
    pub(crate) fn new(id: ViewCellId, signature: Signature, pose: PoseEstimate, decay: f64) -> Self {
        Self {
            id,
            signature,
            pose,
            decay,
            experiences: Vec::new(),
        }
    }

    /// Index in the owning store
    #[inline]
    pub fn id(&self) -> ViewCellId {
        self.id
    }

    /// Template this cell recognises
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Pose-cell coordinates at creation
    #[inline]
    pub fn pose(&self) -> PoseEstimate {
        self.pose
    }

    /// Activation accumulator; starts at the active decay and only grows
    #[inline]
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Experiences created while this cell was active
    #[inline]
    pub fn experiences(&self) -> &[ExperienceId] {
        &self.experiences
    }

    pub(crate) fn attach(&mut self, experience: ExperienceId) {
        if !self.experiences.contains(&experience) {
            self.experiences.push(experience);
        }
    }
}

/// Outcome of presenting a signature to the store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewCellMatch {
    /// The active view cell
    pub id: ViewCellId,
    /// True if the cell was created for this signature
    pub created: bool,
    /// Best scaled score over the cells that existed beforehand
    /// (`+inf` when the store was empty)
    pub score: f64,
}

/// Append-only collection of view cells.
///
/// Each store owns its cells; separate stores never share state.
#[derive(Clone, Debug)]
pub struct ViewCellStore {
    config: ViewCellConfig,
    cells: Vec<ViewCell>,
}

impl ViewCellStore {
    /// Create an empty store.
    pub fn new(config: ViewCellConfig) -> Self {
        Self {
            config,
            cells: Vec::new(),
        }
    }

    /// Match a signature against the stored cells, creating a cell when
    /// nothing is close enough.
    ///
    /// A new cell is anchored at `pose`. A re-observed cell has its decay
    /// accumulator raised by the configured active decay.
    pub fn observe(&mut self, signature: &Signature, pose: PoseEstimate) -> ViewCellMatch {
        let scale = signature.len() as f64;

        let mut best: Option<(usize, f64)> = None;
        for (index, cell) in self.cells.iter().enumerate() {
            let distance = compare(
                signature.values(),
                cell.signature.values(),
                self.config.window,
            )
            .distance;
            let score = if distance.is_finite() {
                distance * scale
            } else {
                f64::INFINITY
            };

            if best.is_none_or(|(_, best_score)| score < best_score) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) if score <= self.config.match_threshold => {
                let cell = &mut self.cells[index];
                cell.decay += self.config.active_decay;
                log::trace!(
                    "Matched {} (score {:.4}, decay {:.1})",
                    cell.id,
                    score,
                    cell.decay
                );
                ViewCellMatch {
                    id: cell.id,
                    created: false,
                    score,
                }
            }
            _ => {
                let score = best.map_or(f64::INFINITY, |(_, s)| s);
                let id = ViewCellId(self.cells.len());
                self.cells.push(ViewCell::new(
                    id,
                    signature.clone(),
                    pose,
                    self.config.active_decay,
                ));
                log::debug!(
                    "New view cell {} at ({:.2}, {:.2}, {:.2}), best score {:.4}",
                    id,
                    pose.x,
                    pose.y,
                    pose.th,
                    score
                );
                ViewCellMatch {
                    id,
                    created: true,
                    score,
                }
            }
        }
    }

    /// Record that `experience` was created under `view_cell`.
    pub fn attach_experience(&mut self, view_cell: ViewCellId, experience: ExperienceId) -> Result<()> {
        let cell = self.cells.get_mut(view_cell.0).ok_or_else(|| {
            SlamError::GraphInvariant(format!(
                "experience {} refers to unknown view cell {}",
                experience, view_cell
            ))
        })?;
        cell.attach(experience);
        Ok(())
    }

    /// Get a view cell by id
    pub fn get(&self, id: ViewCellId) -> Option<&ViewCell> {
        self.cells.get(id.0)
    }

    /// Number of view cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check for an empty store
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate cells in creation order
    pub fn iter(&self) -> impl Iterator<Item = &ViewCell> {
        self.cells.iter()
    }

    /// Drop every cell.
    pub fn reset(&mut self) {
        self.cells.clear();
    }

    /// Get the configuration
    pub fn config(&self) -> &ViewCellConfig {
        &self.config
    }
}
