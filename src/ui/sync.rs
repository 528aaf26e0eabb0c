//! Systems for ticking the simulation and drawing its state

use bevy::prelude::*;

use super::components::{to_screen, to_screen_rotation, SimWorldResource};
use crate::simulation::{ArcGeometry, RoadGeometry};

const ROAD_COLOR: Color = Color::srgb(0.73, 0.73, 0.73);
const EDGE_COLOR: Color = Color::WHITE;
const CAR_COLOR: Color = Color::srgb(1.0, 0.13, 0.27);
const STOP_COLOR: Color = Color::srgb(0.9, 0.1, 0.1);

const ARC_SAMPLES: usize = 16;

/// System to run simulation tick
pub fn tick_simulation(mut sim_world: ResMut<SimWorldResource>) {
    sim_world.0.tick();
}

/// Points along a road shifted `offset` to its side
fn offset_line(geometry: &RoadGeometry, offset: f32) -> Vec<Vec2> {
    match geometry {
        RoadGeometry::Straight(line) => {
            let normal = line.heading() + std::f32::consts::FRAC_PI_2;
            vec![
                to_screen(line.from.offset(normal, offset)),
                to_screen(line.to.offset(normal, offset)),
            ]
        }
        RoadGeometry::Arc(arc) => {
            let shifted = RoadGeometry::Arc(ArcGeometry {
                radius: arc.radius + offset,
                ..*arc
            });
            (0..=ARC_SAMPLES)
                .map(|i| to_screen(shifted.sample(i as f32 / ARC_SAMPLES as f32)))
                .collect()
        }
    }
}

/// System to draw every road with its edges and stop markers
pub fn draw_roads(sim_world: Res<SimWorldResource>, mut gizmos: Gizmos) {
    let world = &sim_world.0;
    let half_width = world.config.road_width / 2.0;

    for road in world.road_network.roads() {
        let geometry = road.geometry();
        gizmos.linestrip_2d(offset_line(geometry, 0.0), ROAD_COLOR);
        gizmos.linestrip_2d(offset_line(geometry, -half_width), EDGE_COLOR);
        gizmos.linestrip_2d(offset_line(geometry, half_width), EDGE_COLOR);

        if road.is_straight() && !road.signal().is_proceed() {
            gizmos.circle_2d(to_screen(geometry.end_point()), half_width / 2.0, STOP_COLOR);
        }
    }
}

/// System to draw car outlines from simulation state
pub fn draw_cars(sim_world: Res<SimWorldResource>, mut gizmos: Gizmos) {
    let world = &sim_world.0;
    let width = world.config.car_width * 2.0;

    for car in world.cars() {
        gizmos.rect_2d(
            Isometry2d::new(to_screen(car.position), to_screen_rotation(car.heading)),
            Vec2::new(car.length, width),
            CAR_COLOR,
        );
    }
}
