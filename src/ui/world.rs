//! World setup systems for the camera

use bevy::prelude::*;

use super::components::{to_screen, MainCamera, SimWorldResource};
use crate::simulation::Point;

/// System to spawn a 2D camera centred on the road network
pub fn setup_world(mut commands: Commands, sim_world: Res<SimWorldResource>) {
    let roads = sim_world.0.road_network.roads();
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for road in roads {
        for point in [road.geometry().start_point(), road.geometry().end_point()] {
            let screen = to_screen(point);
            min = min.min(screen);
            max = max.max(screen);
        }
    }

    let center = if roads.is_empty() {
        to_screen(Point::default())
    } else {
        (min + max) / 2.0
    };

    commands.spawn((
        MainCamera,
        Camera2d,
        Transform::from_xyz(center.x, center.y, 0.0),
    ));
}
