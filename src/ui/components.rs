//! UI components and resources for linking Bevy to simulation state

use bevy::prelude::*;

use crate::simulation::{Point, SimWorld};

/// Resource wrapper for the simulation world
#[derive(Resource)]
pub struct SimWorldResource(pub SimWorld);

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Simulation coordinates grow downwards, Bevy's grow upwards
pub fn to_screen(point: Point) -> Vec2 {
    Vec2::new(point.x, -point.y)
}

/// Screen rotation for a simulation heading
pub fn to_screen_rotation(heading: f32) -> Rot2 {
    Rot2::radians(-heading)
}
