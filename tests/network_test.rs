//! Road network construction and validation tests

use std::f32::consts::PI;

use segment_sim::simulation::{
    Point, RoadId, SignalState, SimConfig, SimId, SimRoadNetwork, SimWorld,
};

fn error_text(result: anyhow::Result<SimRoadNetwork>) -> String {
    match result {
        Ok(_) => panic!("Expected the network to be rejected"),
        Err(e) => format!("{:#}", e),
    }
}

#[test]
fn test_demo_network_builds() {
    let network = SimWorld::build_demo_network(&SimConfig::default()).unwrap();

    assert_eq!(network.road_count(), 34);
    assert_eq!(network.entry_points().len(), 2);
    assert_eq!(network.car_count(), 0);

    // The demo has no dead ends
    for road in network.roads() {
        assert!(
            !road.successors().is_empty(),
            "Road {:?} has no successors",
            road.id
        );
        assert_eq!(road.signal(), SignalState::Proceed);
    }
}

#[test]
fn test_demo_network_roads_are_connected_end_to_start() {
    let network = SimWorld::build_demo_network(&SimConfig::default()).unwrap();

    for road in network.roads() {
        let end = road.geometry().end_point();
        for successor in road.successors() {
            let start = network.get_road(*successor).unwrap().geometry().start_point();
            assert!(
                end.distance(&start) < 40.0,
                "Road {:?} ends far from successor {:?}",
                road.id,
                successor
            );
        }
    }
}

#[test]
fn test_reachability_queries() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
    let b = builder.add_straight(Point::new(10.0, 0.0), Point::new(20.0, 0.0), 1.0);
    let c = builder.add_straight(Point::new(0.0, 10.0), Point::new(10.0, 10.0), 1.0);
    builder.connect(a, &[b]);
    builder.add_entry_point(a).add_entry_point(c);
    let network = builder.build().unwrap();

    assert!(network.is_reachable(a, b));
    assert!(!network.is_reachable(b, a));
    assert!(!network.is_reachable(a, c));
    assert!(!network.is_reachable(a, RoadId(SimId(99))));
}

#[test]
fn test_empty_network_is_rejected() {
    let text = error_text(SimRoadNetwork::builder().build());
    assert!(text.contains("no roads"), "{}", text);
}

#[test]
fn test_unknown_successor_is_rejected() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
    builder.connect(a, &[RoadId(SimId(5))]).add_entry_point(a);

    let text = error_text(builder.build());
    assert!(text.contains("unknown successor"), "{}", text);
}

#[test]
fn test_successors_for_unknown_road_are_rejected() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
    builder.connect(RoadId(SimId(3)), &[a]).add_entry_point(a);

    let text = error_text(builder.build());
    assert!(text.contains("unknown road"), "{}", text);
}

#[test]
fn test_missing_entry_points_are_rejected() {
    let mut builder = SimRoadNetwork::builder();
    builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);

    let text = error_text(builder.build());
    assert!(text.contains("no entry points"), "{}", text);
}

#[test]
fn test_unknown_entry_point_is_rejected() {
    let mut builder = SimRoadNetwork::builder();
    builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
    builder.add_entry_point(RoadId(SimId(7)));

    let text = error_text(builder.build());
    assert!(text.contains("Entry point"), "{}", text);
}

#[test]
fn test_unreachable_road_is_rejected() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
    let b = builder.add_straight(Point::new(10.0, 0.0), Point::new(20.0, 0.0), 1.0);
    builder.add_straight(Point::new(50.0, 0.0), Point::new(60.0, 0.0), 1.0);
    builder.connect(a, &[b]).add_entry_point(a);

    let text = error_text(builder.build());
    assert!(text.contains("cannot be reached"), "{}", text);
}

#[test]
fn test_nan_coordinates_are_rejected() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_straight(Point::new(f32::NAN, 0.0), Point::new(10.0, 0.0), 1.0);
    builder.add_entry_point(a);

    let text = error_text(builder.build());
    assert!(text.contains("NaN"), "{}", text);
}

#[test]
fn test_infinite_angle_is_rejected() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_arc(Point::new(0.0, 0.0), 10.0, 0.0, f32::INFINITY, false, 1.0);
    builder.add_entry_point(a);

    let text = error_text(builder.build());
    assert!(text.contains("not finite"), "{}", text);
}

#[test]
fn test_non_positive_radius_is_rejected() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_arc(Point::new(0.0, 0.0), -5.0, 0.0, PI, false, 1.0);
    builder.add_entry_point(a);

    let text = error_text(builder.build());
    assert!(text.contains("radius must be positive"), "{}", text);
}

#[test]
fn test_degenerate_roads_are_rejected() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_straight(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 1.0);
    builder.add_entry_point(a);
    let text = error_text(builder.build());
    assert!(text.contains("zero length"), "{}", text);

    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_arc(Point::new(0.0, 0.0), 10.0, PI, PI, false, 1.0);
    builder.add_entry_point(a);
    let text = error_text(builder.build());
    assert!(text.contains("zero angular span"), "{}", text);
}

#[test]
fn test_non_positive_speed_is_rejected() {
    let mut builder = SimRoadNetwork::builder();
    let a = builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 0.0);
    builder.add_entry_point(a);

    let text = error_text(builder.build());
    assert!(text.contains("speed must be positive"), "{}", text);
}

#[test]
fn test_set_signal_on_unknown_road_fails() {
    let mut network = SimWorld::build_demo_network(&SimConfig::default()).unwrap();

    assert!(network.set_signal(RoadId(SimId(0)), SignalState::Stop).is_ok());
    assert_eq!(network.roads()[0].signal(), SignalState::Stop);
    assert!(network.set_signal(RoadId(SimId(500)), SignalState::Stop).is_err());
}

#[test]
fn test_toggle_all_signals_flips_every_road() {
    let mut network = SimWorld::build_demo_network(&SimConfig::default()).unwrap();
    network.set_signal(RoadId(SimId(3)), SignalState::Stop).unwrap();

    network.toggle_all_signals();

    for road in network.roads() {
        let expected = if road.id == RoadId(SimId(3)) {
            SignalState::Proceed
        } else {
            SignalState::Stop
        };
        assert_eq!(road.signal(), expected);
    }
}
