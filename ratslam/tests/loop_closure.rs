//! Loop-closure and ambiguity scenarios on the experience map.

mod common;

use approx::assert_relative_eq;
use ratslam::{
    ExperienceId, ExperienceMap, ExperienceMapConfig, MatchOutcome, Odometry, PoseEstimate,
    RatSlam, RatSlamConfig, ViewCellConfig, ViewCellStore,
};

use common::{RouteStep, init_logging, place_frames, place_signatures, square_route};

/// View cells that only match identical signatures.
fn exact_store() -> ViewCellStore {
    ViewCellStore::new(ViewCellConfig {
        window: 10,
        match_threshold: 0.0,
        active_decay: 1.0,
    })
}

#[test]
fn test_square_loop_closes_on_first_experience() {
    init_logging();

    let places = place_signatures(13, 48, 42);
    let mut store = exact_store();
    let mut map = ExperienceMap::new(ExperienceMapConfig::default(), 61, 36);

    let route = square_route();
    let (last, outbound) = route.split_last().unwrap();

    for step in outbound {
        let matched = store.observe(&places[step.place], step.pose);
        assert!(matched.created);
        let delta = map
            .update(store.get(matched.id).unwrap(), step.odometry, step.pose)
            .unwrap();
        assert_eq!(delta.outcome, MatchOutcome::Created);
        store
            .attach_experience(matched.id, delta.created.unwrap())
            .unwrap();
    }
    assert_eq!(map.len(), 13);
    assert_eq!(map.link_count(), 12);
    assert!(map.residual() < 1e-12);

    let RouteStep { place, pose, odometry } = *last;
    let matched = store.observe(&places[place], pose);
    assert!(!matched.created);

    let delta = map
        .update(store.get(matched.id).unwrap(), odometry, pose)
        .unwrap();

    // Reuses the first node and closes the loop with one link
    assert_eq!(delta.outcome, MatchOutcome::Revisited);
    assert_eq!(delta.current, ExperienceId(0));
    assert!(delta.created.is_none());
    assert_eq!(delta.links_added, vec![(ExperienceId(12), ExperienceId(0))]);
    assert_eq!(map.len(), 13);
    assert_eq!(map.link_count(), 13);
    assert_eq!(map.current(), Some(ExperienceId(0)));
    assert_eq!(map.history().last(), Some(&ExperienceId(0)));

    let report = delta.relaxation.unwrap();
    assert_relative_eq!(report.initial_residual, 0.65, epsilon = 1e-9);
    assert!(report.final_residual < report.initial_residual);
    assert_relative_eq!(report.final_residual, map.residual());
}

#[test]
fn test_ambiguous_candidates_get_new_experience() {
    init_logging();

    let places = place_signatures(2, 48, 7);
    let mut store = exact_store();
    let mut map = ExperienceMap::new(ExperienceMapConfig::default(), 61, 36);

    let mut tick = |place: usize, x: f64, vtrans: f64| {
        let pose = PoseEstimate::new(x, 30.0, 0.0);
        let matched = store.observe(&places[place], pose);
        let delta = map
            .update(
                store.get(matched.id).unwrap(),
                Odometry::new(vtrans, 0.0),
                pose,
            )
            .unwrap();
        if let Some(created) = delta.created {
            store.attach_experience(matched.id, created).unwrap();
        }
        delta
    };

    // Place A seen at two poses 1.5 cells apart, then place B
    tick(0, 30.0, 0.0);
    tick(0, 31.5, 1.5);
    tick(1, 31.5, 0.0);

    // Back at A, halfway between its two experiences
    let delta = tick(0, 30.75, -0.75);

    assert_eq!(
        delta.outcome,
        MatchOutcome::Ambiguous {
            candidates: vec![ExperienceId(0), ExperienceId(1)]
        }
    );
    assert_eq!(delta.created, Some(ExperienceId(3)));
    assert_eq!(delta.links_added, vec![(ExperienceId(2), ExperienceId(3))]);

    let snapshot = map.snapshot();
    assert!(
        !snapshot
            .links
            .iter()
            .any(|l| l.source == ExperienceId(2) && l.target.0 < 2)
    );
    assert_eq!(snapshot.experiences.len(), 4);
}

#[test]
fn test_step_revisits_places_on_second_lap() {
    init_logging();

    // Pose cells hold still, so recognition alone decides where we are
    let mut config = RatSlamConfig::small(64, 4);
    config.pose_cells.vtrans_scaling = 0.0;
    config.visual_odometry.rotation_scale = 0.0;
    let mut slam = RatSlam::new(config).unwrap();

    let places = place_frames(5, 64, 4, 21);

    for (k, frame) in places.iter().enumerate() {
        let output = slam.step(frame).unwrap();
        assert!(output.view_cell_created);
        assert_eq!(output.map_delta.outcome, MatchOutcome::Created);
        assert_eq!(output.map_delta.current, ExperienceId(k));
    }
    assert_eq!(slam.experience_map().link_count(), 4);

    let closing = slam.step(&places[0]).unwrap();
    assert!(!closing.view_cell_created);
    assert_eq!(closing.map_delta.outcome, MatchOutcome::Revisited);
    assert_eq!(closing.map_delta.current, ExperienceId(0));
    assert_eq!(
        closing.map_delta.links_added,
        vec![(ExperienceId(4), ExperienceId(0))]
    );
    let report = closing.map_delta.relaxation.unwrap();
    assert!(report.initial_residual > 0.0);
    assert!(report.final_residual < report.initial_residual);

    for (k, frame) in places.iter().enumerate().skip(1) {
        let output = slam.step(frame).unwrap();
        assert_eq!(output.map_delta.outcome, MatchOutcome::Revisited);
        assert_eq!(output.map_delta.current, ExperienceId(k));
        assert!(output.map_delta.links_added.is_empty());
        assert!(output.anomalies.is_empty());
    }

    assert_eq!(slam.view_cells().len(), 5);
    assert_eq!(slam.experience_map().len(), 5);
    assert_eq!(slam.experience_map().link_count(), 5);
    assert_eq!(slam.experience_map().history().len(), 10);
}
