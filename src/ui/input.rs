//! Input handling systems

use bevy::prelude::*;

use super::components::SimWorldResource;

/// Space toggles every signal, Enter spawns a car at each entry point
pub fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut sim_world: ResMut<SimWorldResource>,
    mut exit: MessageWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }

    if keyboard.just_pressed(KeyCode::Space) {
        sim_world.0.toggle_all_signals();
    }

    if keyboard.just_pressed(KeyCode::Enter) {
        match sim_world.0.spawn_wave() {
            Ok(cars) => bevy::log::info!("Spawned {} car(s)", cars.len()),
            Err(e) => bevy::log::warn!("Failed to spawn cars: {:#}", e),
        }
    }
}
