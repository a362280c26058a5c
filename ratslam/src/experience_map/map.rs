//! Experience map: topological graph with incremental relaxation.

use crate::core::{Odometry, PoseEstimate, signed_delta, wrap180};
use crate::error::{Result, SlamError};
use crate::view_cells::ViewCell;

use super::snapshot::{ExperienceSnapshot, LinkSnapshot, MapSnapshot};
use super::{Experience, ExperienceId, ExperienceLink, ExperienceMapConfig};

/// What an update did to the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome {
    /// New place: a node was created and linked from the previous one
    Created,
    /// Loop closure onto the single nearby node of the active view cell
    Revisited,
    /// Several nodes of the view cell were nearby; a new node was created
    /// instead of linking to any of them
    Ambiguous {
        /// Nodes within the distance threshold
        candidates: Vec<ExperienceId>,
    },
    /// The view cell had nodes but none nearby; a new node was created
    Unmatched,
    /// Same view cell and pose as before
    Unchanged,
}

/// Relaxation statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxationReport {
    /// Passes over all links
    pub iterations: usize,
    /// Sum of squared link discrepancies before relaxing
    pub initial_residual: f64,
    /// Sum of squared link discrepancies after relaxing
    pub final_residual: f64,
}

/// Changes made by one [`ExperienceMap::update`].
#[derive(Clone, Debug, PartialEq)]
pub struct MapDelta {
    /// Which branch the update took
    pub outcome: MatchOutcome,
    /// Current node after the update
    pub current: ExperienceId,
    /// Node created this tick
    pub created: Option<ExperienceId>,
    /// Links added this tick as (source, target)
    pub links_added: Vec<(ExperienceId, ExperienceId)>,
    /// Present when the graph was relaxed
    pub relaxation: Option<RelaxationReport>,
}

/// Graph of experiences built from view cells, pose estimates and odometry.
#[derive(Clone, Debug)]
pub struct ExperienceMap {
    config: ExperienceMapConfig,
    dim_xy: usize,
    dim_th: usize,

    experiences: Vec<Experience>,
    current: Option<ExperienceId>,
    history: Vec<ExperienceId>,

    accum_x: f64,
    accum_y: f64,
    accum_facing: f64,
}

impl ExperienceMap {
    /// Create an empty map for a pose cell grid of the given extents.
    pub fn new(config: ExperienceMapConfig, dim_xy: usize, dim_th: usize) -> Self {
        let accum_facing = config.initial_heading;
        Self {
            config,
            dim_xy,
            dim_th,
            experiences: Vec::new(),
            current: None,
            history: Vec::new(),
            accum_x: 0.0,
            accum_y: 0.0,
            accum_facing,
        }
    }

    /// Integrate one tick of odometry and update the graph.
    ///
    /// The caller must record any created experience on `view_cell` before
    /// the next update, see
    /// [`ViewCellStore::attach_experience`](crate::view_cells::ViewCellStore::attach_experience).
    pub fn update(
        &mut self,
        view_cell: &ViewCell,
        odometry: Odometry,
        pose: PoseEstimate,
    ) -> Result<MapDelta> {
        for &id in view_cell.experiences() {
            if id.0 >= self.experiences.len() {
                return Err(SlamError::GraphInvariant(format!(
                    "{} lists unknown experience {}",
                    view_cell.id(),
                    id
                )));
            }
        }
        self.check_links()?;

        self.accum_facing = wrap180(self.accum_facing + odometry.vrot);
        self.accum_x += odometry.vtrans * self.accum_facing.cos();
        self.accum_y += odometry.vtrans * self.accum_facing.sin();

        let delta = match self.current {
            Some(current)
                if !view_cell.experiences().is_empty()
                    && self.pose_distance(&self.experiences[current.0].pose, &pose)
                        <= self.config.delta_pc_threshold =>
            {
                if self.experiences[current.0].view_cell == view_cell.id() {
                    MapDelta {
                        outcome: MatchOutcome::Unchanged,
                        current,
                        created: None,
                        links_added: Vec::new(),
                        relaxation: None,
                    }
                } else {
                    let mut delta = self.match_view_cell(view_cell, pose);
                    delta.relaxation = Some(self.relax()?);
                    delta
                }
            }
            _ => {
                let (id, link) = self.create_experience(view_cell, pose);
                MapDelta {
                    outcome: MatchOutcome::Created,
                    current: id,
                    created: Some(id),
                    links_added: link.into_iter().collect(),
                    relaxation: None,
                }
            }
        };

        self.history.push(delta.current);
        Ok(delta)
    }

    /// Look for the single nearby experience of a revisited view cell.
    fn match_view_cell(&mut self, view_cell: &ViewCell, pose: PoseEstimate) -> MapDelta {
        let candidates: Vec<ExperienceId> = view_cell
            .experiences()
            .iter()
            .copied()
            .filter(|id| {
                self.pose_distance(&self.experiences[id.0].pose, &pose)
                    < self.config.delta_pc_threshold
            })
            .collect();

        match candidates.as_slice() {
            [matched] => {
                let matched = *matched;
                let mut links_added = Vec::new();
                if let Some(from) = self.current
                    && !self.experiences[from.0].links_to(matched)
                {
                    self.link(from, matched);
                    links_added.push((from, matched));
                    log::info!("Loop closure: {} -> {}", from, matched);
                }

                self.current = Some(matched);
                self.reset_accumulators(matched);
                MapDelta {
                    outcome: MatchOutcome::Revisited,
                    current: matched,
                    created: None,
                    links_added,
                    relaxation: None,
                }
            }
            [] => {
                log::debug!(
                    "{} revisited but none of its experiences is near ({:.2}, {:.2}, {:.2})",
                    view_cell.id(),
                    pose.x,
                    pose.y,
                    pose.th
                );
                let (id, link) = self.create_experience(view_cell, pose);
                MapDelta {
                    outcome: MatchOutcome::Unmatched,
                    current: id,
                    created: Some(id),
                    links_added: link.into_iter().collect(),
                    relaxation: None,
                }
            }
            _ => {
                log::debug!(
                    "Ambiguous match for {}: {} candidates within {:.2}",
                    view_cell.id(),
                    candidates.len(),
                    self.config.delta_pc_threshold
                );
                let (id, link) = self.create_experience(view_cell, pose);
                MapDelta {
                    outcome: MatchOutcome::Ambiguous { candidates },
                    current: id,
                    created: Some(id),
                    links_added: link.into_iter().collect(),
                    relaxation: None,
                }
            }
        }
    }

    /// Append an experience at the accumulated offset from the current one,
    /// link to it and make it current.
    fn create_experience(
        &mut self,
        view_cell: &ViewCell,
        pose: PoseEstimate,
    ) -> (ExperienceId, Option<(ExperienceId, ExperienceId)>) {
        let id = ExperienceId(self.experiences.len());
        let (base_x, base_y) = self
            .current
            .map_or((0.0, 0.0), |c| (self.experiences[c.0].x, self.experiences[c.0].y));

        self.experiences.push(Experience {
            id,
            pose,
            x: base_x + self.accum_x,
            y: base_y + self.accum_y,
            facing: wrap180(self.accum_facing),
            view_cell: view_cell.id(),
            links: Vec::new(),
        });

        let link = self.current.map(|from| {
            self.link(from, id);
            (from, id)
        });

        log::debug!(
            "New experience {} under {} at map ({:.2}, {:.2})",
            id,
            view_cell.id(),
            base_x + self.accum_x,
            base_y + self.accum_y
        );

        self.current = Some(id);
        self.reset_accumulators(id);
        (id, link)
    }

    fn link(&mut self, from: ExperienceId, to: ExperienceId) {
        let source = &mut self.experiences[from.0];
        let link = ExperienceLink::from_motion(
            to,
            source.facing,
            self.accum_x,
            self.accum_y,
            self.accum_facing,
        );
        source.links.push(link);
    }

    fn reset_accumulators(&mut self, id: ExperienceId) {
        self.accum_x = 0.0;
        self.accum_y = 0.0;
        self.accum_facing = self.experiences[id.0].facing;
    }

    fn pose_distance(&self, a: &PoseEstimate, b: &PoseEstimate) -> f64 {
        a.toroidal_distance(b, self.dim_xy, self.dim_th)
    }

    /// Pull linked experiences toward the positions their links predict.
    fn relax(&mut self) -> Result<RelaxationReport> {
        self.check_links()?;

        let initial_residual = self.residual();
        let cf = self.config.correction;

        for _ in 0..self.config.loops {
            for i in 0..self.experiences.len() {
                for k in 0..self.experiences[i].links.len() {
                    let link = self.experiences[i].links[k];
                    let j = link.target.0;

                    let (x0, y0, f0) = {
                        let e0 = &self.experiences[i];
                        (e0.x, e0.y, e0.facing)
                    };
                    let (lx, ly) = link.predict(x0, y0, f0);

                    let (x1, y1) = (self.experiences[j].x, self.experiences[j].y);
                    self.experiences[i].x += (x1 - lx) * cf;
                    self.experiences[i].y += (y1 - ly) * cf;

                    let e1 = &mut self.experiences[j];
                    e1.x -= (e1.x - lx) * cf;
                    e1.y -= (e1.y - ly) * cf;

                    let df = signed_delta(f0 + link.facing, self.experiences[j].facing);
                    let e0 = &mut self.experiences[i];
                    e0.facing = wrap180(e0.facing + df * cf);
                    let e1 = &mut self.experiences[j];
                    e1.facing = wrap180(e1.facing - df * cf);
                }
            }
        }

        let report = RelaxationReport {
            iterations: self.config.loops,
            initial_residual,
            final_residual: self.residual(),
        };
        log::trace!(
            "Relaxed {} experiences: residual {:.6} -> {:.6}",
            self.experiences.len(),
            report.initial_residual,
            report.final_residual
        );
        Ok(report)
    }

    pub(crate) fn check_links(&self) -> Result<()> {
        for exp in &self.experiences {
            for link in &exp.links {
                if link.target.0 >= self.experiences.len() {
                    return Err(SlamError::GraphInvariant(format!(
                        "link {} -> {} points past {} experiences",
                        exp.id,
                        link.target,
                        self.experiences.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Sum over links of the squared distance between each target and the
    /// position its link predicts.
    pub fn residual(&self) -> f64 {
        self.experiences
            .iter()
            .flat_map(|e0| {
                e0.links.iter().filter_map(move |link| {
                    let e1 = self.experiences.get(link.target.0)?;
                    let (lx, ly) = link.predict(e0.x, e0.y, e0.facing);
                    Some((e1.x - lx).powi(2) + (e1.y - ly).powi(2))
                })
            })
            .sum()
    }

    /// All experiences in creation order
    #[inline]
    pub fn experiences(&self) -> &[Experience] {
        &self.experiences
    }

    /// Get an experience by id
    pub fn get(&self, id: ExperienceId) -> Option<&Experience> {
        self.experiences.get(id.0)
    }

    /// Current experience
    #[inline]
    pub fn current(&self) -> Option<ExperienceId> {
        self.current
    }

    /// Current experience after every update, oldest first
    #[inline]
    pub fn history(&self) -> &[ExperienceId] {
        &self.history
    }

    /// Number of experiences
    #[inline]
    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    /// Check for an empty map
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }

    /// Total number of links
    pub fn link_count(&self) -> usize {
        self.experiences.iter().map(|e| e.links.len()).sum()
    }

    /// Get the configuration
    pub fn config(&self) -> &ExperienceMapConfig {
        &self.config
    }

    /// Export nodes, links and the current node.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            experiences: self
                .experiences
                .iter()
                .map(|e| ExperienceSnapshot {
                    id: e.id,
                    x: e.x,
                    y: e.y,
                    facing: e.facing,
                    view_cell: e.view_cell,
                })
                .collect(),
            links: self
                .experiences
                .iter()
                .flat_map(|e| {
                    e.links.iter().map(move |l| LinkSnapshot {
                        source: e.id,
                        target: l.target,
                        distance: l.distance,
                        heading: l.heading,
                        facing: l.facing,
                    })
                })
                .collect(),
            current: self.current,
        }
    }

    /// Drop every experience and restart the accumulators.
    pub fn reset(&mut self) {
        self.experiences.clear();
        self.history.clear();
        self.current = None;
        self.accum_x = 0.0;
        self.accum_y = 0.0;
        self.accum_facing = self.config.initial_heading;
    }

    #[cfg(test)]
    pub(crate) fn push_raw(&mut self, experience: Experience) {
        self.experiences.push(experience);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Signature;
    use crate::view_cells::ViewCellId;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn cell(id: usize) -> ViewCell {
        ViewCell::new(
            ViewCellId(id),
            Signature::uniform(8),
            PoseEstimate::default(),
            1.0,
        )
    }

    fn pose(x: f64, y: f64) -> PoseEstimate {
        PoseEstimate::new(x, y, 0.0)
    }

    /// Update and record created experiences on the view cell.
    fn step(map: &mut ExperienceMap, vc: &mut ViewCell, odom: (f64, f64), at: PoseEstimate) -> MapDelta {
        let delta = map
            .update(vc, Odometry::new(odom.0, odom.1), at)
            .unwrap();
        if let Some(id) = delta.created {
            vc.attach(id);
        }
        delta
    }

    fn new_map() -> ExperienceMap {
        ExperienceMap::new(ExperienceMapConfig::default(), 61, 36)
    }

    #[test]
    fn test_first_update_creates() {
        let mut map = new_map();
        let mut a = cell(0);

        let delta = step(&mut map, &mut a, (1.0, 0.0), pose(30.0, 30.0));

        assert_eq!(delta.outcome, MatchOutcome::Created);
        assert_eq!(delta.created, Some(ExperienceId(0)));
        assert!(delta.links_added.is_empty());
        assert!(delta.relaxation.is_none());

        // Initial heading is north
        let e0 = map.get(ExperienceId(0)).unwrap();
        assert_relative_eq!(e0.x(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(e0.y(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(e0.facing(), FRAC_PI_2);
        assert_eq!(map.history(), &[ExperienceId(0)]);
    }

    #[test]
    fn test_same_view_nearby_is_unchanged() {
        let mut map = new_map();
        let mut a = cell(0);
        step(&mut map, &mut a, (0.0, 0.0), pose(30.0, 30.0));

        let delta = step(&mut map, &mut a, (0.5, 0.0), pose(30.5, 30.0));

        assert_eq!(delta.outcome, MatchOutcome::Unchanged);
        assert_eq!(delta.current, ExperienceId(0));
        assert_eq!(map.len(), 1);
        assert_eq!(map.history(), &[ExperienceId(0), ExperienceId(0)]);
    }

    #[test]
    fn test_pose_jump_creates_linked_experience() {
        let mut map = new_map();
        let mut a = cell(0);
        step(&mut map, &mut a, (0.0, 0.0), pose(30.0, 30.0));
        step(&mut map, &mut a, (1.0, 0.0), pose(30.6, 30.0));
        let delta = step(&mut map, &mut a, (1.0, 0.0), pose(31.2, 30.0));

        assert_eq!(delta.outcome, MatchOutcome::Created);
        assert_eq!(delta.links_added, vec![(ExperienceId(0), ExperienceId(1))]);

        // Both ticks of motion accumulated into the link
        let link = map.get(ExperienceId(0)).unwrap().links()[0];
        assert_relative_eq!(link.distance, 2.0, epsilon = 1e-12);
        assert_relative_eq!(link.heading, 0.0, epsilon = 1e-12);

        let e1 = map.get(ExperienceId(1)).unwrap();
        assert_relative_eq!(e1.y(), 2.0, epsilon = 1e-12);
        assert!(map.residual() < 1e-20);
    }

    #[test]
    fn test_unseen_view_cell_creates() {
        let mut map = new_map();
        let mut a = cell(0);
        let mut b = cell(1);
        step(&mut map, &mut a, (0.0, 0.0), pose(30.0, 30.0));

        let delta = step(&mut map, &mut b, (0.2, 0.0), pose(30.2, 30.0));
        assert_eq!(delta.outcome, MatchOutcome::Created);
        assert_eq!(map.get(ExperienceId(1)).unwrap().view_cell(), ViewCellId(1));
    }

    #[test]
    fn test_revisit_links_once() {
        let mut map = new_map();
        let mut a = cell(0);
        let mut b = cell(1);

        step(&mut map, &mut a, (0.0, 0.0), pose(30.0, 30.0));
        step(&mut map, &mut b, (1.0, 0.0), pose(30.5, 30.0));
        let delta = step(&mut map, &mut a, (-1.0, 0.0), pose(30.1, 30.0));

        assert_eq!(delta.outcome, MatchOutcome::Revisited);
        assert_eq!(delta.current, ExperienceId(0));
        assert!(delta.created.is_none());
        assert_eq!(delta.links_added, vec![(ExperienceId(1), ExperienceId(0))]);
        assert!(delta.relaxation.is_some());

        // Back to b reuses its experience, then a again: link already there
        step(&mut map, &mut b, (1.0, 0.0), pose(30.5, 30.0));
        let again = step(&mut map, &mut a, (-1.0, 0.0), pose(30.1, 30.0));
        assert_eq!(again.outcome, MatchOutcome::Revisited);
        assert!(again.links_added.is_empty());

        assert_eq!(map.len(), 2);
        assert_eq!(map.link_count(), 2);
    }

    #[test]
    fn test_ambiguous_match_creates_without_linking_candidates() {
        let mut map = new_map();
        let mut a = cell(0);
        let mut b = cell(1);

        step(&mut map, &mut a, (0.0, 0.0), pose(30.0, 30.0));
        step(&mut map, &mut a, (1.5, 0.0), pose(31.5, 30.0));
        step(&mut map, &mut b, (0.0, 0.0), pose(31.5, 30.0));
        assert_eq!(a.experiences(), &[ExperienceId(0), ExperienceId(1)]);

        let delta = step(&mut map, &mut a, (-0.75, 0.0), pose(30.75, 30.0));

        assert_eq!(
            delta.outcome,
            MatchOutcome::Ambiguous {
                candidates: vec![ExperienceId(0), ExperienceId(1)]
            }
        );
        assert_eq!(delta.created, Some(ExperienceId(3)));
        assert_eq!(delta.links_added, vec![(ExperienceId(2), ExperienceId(3))]);
        assert!(delta.relaxation.is_some());

        let e2 = map.get(ExperienceId(2)).unwrap();
        assert!(!e2.links_to(ExperienceId(0)));
        assert!(!e2.links_to(ExperienceId(1)));
        assert_eq!(map.current(), Some(ExperienceId(3)));
    }

    #[test]
    fn test_unmatched_view_cell_creates() {
        let mut map = new_map();
        let mut a = cell(0);
        let mut b = cell(1);

        step(&mut map, &mut a, (0.0, 0.0), pose(10.0, 10.0));
        step(&mut map, &mut b, (5.0, 0.0), pose(20.0, 20.0));
        let delta = step(&mut map, &mut a, (0.5, 0.0), pose(20.0, 20.5));

        assert_eq!(delta.outcome, MatchOutcome::Unmatched);
        assert_eq!(delta.created, Some(ExperienceId(2)));
        assert_eq!(delta.links_added, vec![(ExperienceId(1), ExperienceId(2))]);
        assert!(delta.relaxation.is_some());
    }

    #[test]
    fn test_relaxation_reduces_residual() {
        let mut map = new_map();
        let mut a = cell(0);
        let mut b = cell(1);
        let mut c = cell(2);
        let mut d = cell(3);

        // Square of side 2 turning left at every corner; the last leg
        // overshoots the start by 0.3
        step(&mut map, &mut a, (0.0, 0.0), pose(30.0, 30.0));
        step(&mut map, &mut b, (2.0, FRAC_PI_2), pose(28.0, 30.0));
        step(&mut map, &mut c, (2.0, FRAC_PI_2), pose(28.0, 28.0));
        step(&mut map, &mut d, (2.0, FRAC_PI_2), pose(30.0, 29.2));
        let delta = step(&mut map, &mut a, (2.3, FRAC_PI_2), pose(30.0, 29.9));

        assert_eq!(delta.outcome, MatchOutcome::Revisited);
        assert_eq!(delta.links_added, vec![(ExperienceId(3), ExperienceId(0))]);

        let report = delta.relaxation.unwrap();
        assert_eq!(report.iterations, 100);
        assert_relative_eq!(report.initial_residual, 0.09, epsilon = 1e-9);
        assert!(report.final_residual < report.initial_residual);
        assert_relative_eq!(report.final_residual, map.residual());
    }

    #[test]
    fn test_unknown_view_cell_experience_is_rejected() {
        let mut map = new_map();
        let mut a = cell(0);
        a.attach(ExperienceId(5));

        let result = map.update(&a, Odometry::new(1.0, 0.0), pose(30.0, 30.0));
        assert!(matches!(result, Err(SlamError::GraphInvariant(_))));
        assert!(map.is_empty());
        assert!(map.history().is_empty());
    }

    #[test]
    fn test_dangling_link_blocks_relaxation() {
        let mut map = new_map();
        map.push_raw(Experience {
            id: ExperienceId(0),
            pose: pose(0.0, 0.0),
            x: 0.0,
            y: 0.0,
            facing: 0.0,
            view_cell: ViewCellId(0),
            links: vec![ExperienceLink {
                target: ExperienceId(9),
                facing: 0.0,
                distance: 1.0,
                heading: 0.0,
            }],
        });

        assert!(matches!(map.relax(), Err(SlamError::GraphInvariant(_))));
        assert_eq!(map.get(ExperienceId(0)).unwrap().x(), 0.0);
    }

    #[test]
    fn test_snapshot_and_reset() {
        let mut map = new_map();
        let mut a = cell(0);
        step(&mut map, &mut a, (0.0, 0.0), pose(30.0, 30.0));
        step(&mut map, &mut a, (2.0, 0.5), pose(33.0, 30.0));

        let snapshot = map.snapshot();
        assert_eq!(snapshot.experiences.len(), 2);
        assert_eq!(snapshot.links.len(), 1);
        assert_eq!(snapshot.links[0].source, ExperienceId(0));
        assert_eq!(snapshot.current, Some(ExperienceId(1)));

        let yaml = snapshot.to_yaml().unwrap();
        let parsed = MapSnapshot::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.experiences.len(), 2);
        assert_eq!(parsed.links[0].target, ExperienceId(1));

        map.reset();
        assert!(map.is_empty());
        assert_eq!(map.current(), None);
        assert_eq!(map.link_count(), 0);
    }
}
