//! Whole-world simulation tests

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use segment_sim::simulation::{
    CarId, Point, RoadGeometry, RoadId, SignalState, SimConfig, SimId, SimRoadNetwork, SimWorld,
};

const EPSILON: f32 = 1e-2;

fn run_with_waves(world: &mut SimWorld, ticks: u32, wave_every: u32) {
    for tick in 1..=ticks {
        world.tick();
        if tick % wave_every == 0 {
            world.spawn_wave().unwrap();
        }
    }
}

fn snapshot(world: &SimWorld) -> HashMap<CarId, (RoadId, Point, f32)> {
    world
        .road_network
        .roads()
        .iter()
        .flat_map(|road| {
            road.cars()
                .iter()
                .map(move |car| (car.id, (road.id, car.position, car.progress())))
        })
        .collect()
}

#[test]
fn test_demo_world_initialization() {
    let world = SimWorld::create_demo_world().unwrap();
    assert_eq!(world.car_count(), 0);
    assert_eq!(world.stats.ticks, 0);
    assert_eq!(world.config, SimConfig::default());
    assert_eq!(world.stopped_road_count(), 0);
}

#[test]
fn test_spawn_wave_uses_every_entry_point() {
    let mut world = SimWorld::create_demo_world_with_seed(11).unwrap();
    let cars = world.spawn_wave().unwrap();

    assert_eq!(cars.len(), 2);
    assert_eq!(world.stats.cars_spawned, 2);
    let entry_points = world.road_network.entry_points().to_vec();
    for (car, entry) in cars.iter().zip(entry_points) {
        let (road, state) = world.find_car(*car).unwrap();
        assert_eq!(road.id, entry);
        assert_eq!(state.length, world.config.default_car_length);
        assert_eq!(state.position, road.geometry().start_point());
    }
}

#[test]
fn test_spawn_rejects_bad_input() {
    let mut world = SimWorld::create_demo_world().unwrap();
    assert!(world.spawn_vehicle(20.0, RoadId(SimId(1000))).is_err());
    assert!(world.spawn_vehicle(0.0, RoadId(SimId(0))).is_err());
    assert!(world.spawn_vehicle(-3.0, RoadId(SimId(0))).is_err());
    assert!(world.spawn_vehicle(f32::NAN, RoadId(SimId(0))).is_err());
    assert_eq!(world.car_count(), 0);
    assert_eq!(world.stats.cars_spawned, 0);
}

#[test]
fn test_spawn_on_any_road() {
    let mut world = SimWorld::create_demo_world().unwrap();
    // Not an entry point
    let car = world.spawn_vehicle(15.0, RoadId(SimId(5))).unwrap();
    let (road, state) = world.find_car(car).unwrap();
    assert_eq!(road.id, RoadId(SimId(5)));
    assert_eq!(state.progress(), 0.0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let network = SimWorld::build_demo_network(&SimConfig::default()).unwrap();
    let config = SimConfig {
        following_distance: -1.0,
        ..SimConfig::default()
    };
    assert!(SimWorld::new(network, config).is_err());

    let network = SimWorld::build_demo_network(&SimConfig::default()).unwrap();
    let config = SimConfig {
        default_car_length: f32::NAN,
        ..SimConfig::default()
    };
    assert!(SimWorld::new(network, config).is_err());
}

#[test]
fn test_toggle_all_signals_twice_restores_proceed() {
    let mut world = SimWorld::create_demo_world().unwrap();

    world.toggle_all_signals();
    assert_eq!(world.stopped_road_count(), world.road_network.road_count());

    world.toggle_all_signals();
    assert_eq!(world.stopped_road_count(), 0);
    assert_eq!(world.stats.signal_toggles, 2);
}

#[test]
fn test_seeded_worlds_are_reproducible() {
    let mut a = SimWorld::create_demo_world_with_seed(42).unwrap();
    let mut b = SimWorld::create_demo_world_with_seed(42).unwrap();

    run_with_waves(&mut a, 800, 40);
    run_with_waves(&mut b, 800, 40);

    assert_eq!(a.stats, b.stats);
    assert_eq!(snapshot(&a), snapshot(&b));
}

#[test]
fn test_injected_rngs_take_the_same_routes() {
    let config = SimConfig::default();
    let network = |config: &SimConfig| SimWorld::build_demo_network(config).unwrap();
    let mut a = SimWorld::new_with_rng(network(&config), config, StdRng::seed_from_u64(7)).unwrap();
    let mut b = SimWorld::new_with_rng(network(&config), config, StdRng::seed_from_u64(7)).unwrap();

    run_with_waves(&mut a, 600, 30);
    run_with_waves(&mut b, 600, 30);

    assert!(a.stats.hand_offs > 0);
    assert_eq!(a.stats, b.stats);
    assert_eq!(snapshot(&a), snapshot(&b));
}

#[test]
fn test_demo_world_never_loses_cars() {
    let mut world = SimWorld::create_demo_world_with_seed(5).unwrap();
    run_with_waves(&mut world, 2000, 50);

    assert_eq!(world.stats.cars_discarded, 0);
    assert_eq!(world.car_count() as u64, world.stats.cars_spawned);
    assert_eq!(world.stats.active_cars(), world.stats.cars_spawned);
    assert!(world.stats.hand_offs > 0);
}

#[test]
fn test_demo_world_cars_stay_on_their_roads() {
    let mut world = SimWorld::create_demo_world_with_seed(9).unwrap();

    for tick in 1..=1500 {
        world.tick();
        if tick % 30 == 0 {
            world.spawn_wave().unwrap();
        }
        if tick % 400 == 0 {
            world.toggle_all_signals();
        }

        for road in world.road_network.roads() {
            for car in road.cars() {
                match road.geometry() {
                    RoadGeometry::Straight(line) => {
                        let along = line.from.distance(&car.position)
                            + car.position.distance(&line.to);
                        assert!((along - line.length()).abs() < EPSILON);
                        assert!(car.progress() <= line.length());
                    }
                    RoadGeometry::Arc(arc) => {
                        let radius = car.position.distance(&arc.center);
                        assert!((radius - arc.radius).abs() < EPSILON);
                    }
                }
            }
        }
    }
}

#[test]
fn test_stopped_straights_never_release_cars() {
    let mut world = SimWorld::create_demo_world_with_seed(3).unwrap();
    run_with_waves(&mut world, 300, 20);
    world.toggle_all_signals();

    for _ in 0..600 {
        let before = snapshot(&world);
        world.tick();
        let after = snapshot(&world);

        for (car, (road, _, _)) in &before {
            if world.road_network.get_road(*road).unwrap().is_straight() {
                assert_eq!(
                    after.get(car).map(|(now, _, _)| *now),
                    Some(*road),
                    "Car {:?} left stopped road {:?}",
                    car,
                    road
                );
            }
        }
    }
}

#[test]
fn test_successor_choice_splits_traffic() {
    let mut builder = SimRoadNetwork::builder();
    let fork = builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 5.0);
    let left = builder.add_straight(Point::new(10.0, 0.0), Point::new(20.0, -10.0), 5.0);
    let right = builder.add_straight(Point::new(10.0, 0.0), Point::new(20.0, 10.0), 5.0);
    builder.connect(fork, &[left, right]).add_entry_point(fork);
    let mut world = SimWorld::new_with_seed(builder.build().unwrap(), SimConfig::default(), 17).unwrap();

    for _ in 0..400 {
        world.spawn_vehicle(5.0, fork).unwrap();
    }
    for _ in 0..3 {
        world.tick();
    }

    let on_left = world.road_network.get_road(left).unwrap().cars().len();
    let on_right = world.road_network.get_road(right).unwrap().cars().len();
    assert_eq!(on_left + on_right, 400);
    assert!(on_left > 100 && on_right > 100, "left {}, right {}", on_left, on_right);
    assert_eq!(world.stats.hand_offs, 400);
}

#[test]
fn test_cars_handed_off_this_tick_move_next_tick() {
    // The successor gets the lower id so it advances before the source
    let mut builder = SimRoadNetwork::builder();
    let after = builder.add_straight(Point::new(10.0, 0.0), Point::new(60.0, 0.0), 5.0);
    let before = builder.add_straight(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 5.0);
    builder.connect(before, &[after]).add_entry_point(before);
    let mut world = SimWorld::new(builder.build().unwrap(), SimConfig::default()).unwrap();
    world.set_signal(after, SignalState::Proceed).unwrap();

    let car = world.spawn_vehicle(10.0, before).unwrap();
    for _ in 0..3 {
        world.tick();
    }
    let (road, state) = world.find_car(car).unwrap();
    assert_eq!(road.id, after);
    assert_eq!(state.progress(), 0.0);

    world.tick();
    let (_, state) = world.find_car(car).unwrap();
    assert_eq!(state.progress(), 5.0);
}
