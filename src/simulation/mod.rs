//! Standalone segment simulation module
//!
//! This module contains all the core simulation logic that can run
//! independently of the Bevy game engine. It can be tested via console
//! without needing to boot up the full game.

mod car;
mod road;
mod road_network;
mod stats;
mod types;
mod world;

pub use car::SimCar;
pub use road::{ArcGeometry, RoadGeometry, SimRoad, StraightGeometry};
pub use road_network::{RoadNetworkBuilder, SimRoadNetwork};
pub use stats::SimStats;
pub use types::{
    CarId, Point, RoadId, SignalState, SimConfig, SimId, CAR_WIDTH, DEFAULT_CAR_LENGTH,
    DEFAULT_ROAD_SPEED, FOLLOWING_DISTANCE, ROAD_WIDTH, TICK_INTERVAL_SECS,
};
pub use world::SimWorld;
