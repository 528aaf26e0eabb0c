//! UI module that visualizes the simulation state using Bevy
//!
//! This module is purely for visualization - all simulation logic is in the `simulation` module.
//! The UI reads state from `SimWorld` and draws it with 2D gizmos.

mod components;
mod input;
mod sync;
mod world;

use bevy::prelude::*;

pub use components::SimWorldResource;

use crate::simulation::TICK_INTERVAL_SECS;
use input::handle_input;
use sync::{draw_cars, draw_roads, tick_simulation};
use world::setup_world;

/// Plugin to register all UI systems
///
/// Expects a [`SimWorldResource`] holding an already validated world.
pub struct SegmentSimUIPlugin;

impl Plugin for SegmentSimUIPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_seconds(TICK_INTERVAL_SECS))
            .insert_resource(ClearColor(Color::srgb(0.93, 0.93, 0.93)))
            .add_systems(Startup, setup_world)
            .add_systems(FixedUpdate, tick_simulation)
            .add_systems(Update, (handle_input, draw_roads, draw_cars));
    }
}
