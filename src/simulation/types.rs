//! Core types for the segment simulation
//!
//! These are standalone types that don't depend on Bevy.

use anyhow::{bail, Context, Result};
use ordered_float::NotNan;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for road segment IDs
///
/// The inner id is the segment's index in its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadId(pub SimId);

impl RoadId {
    pub fn index(self) -> usize {
        self.0 .0
    }
}

/// A wrapper type for car IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarId(pub SimId);

/// Stop/proceed signal carried by every segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalState {
    /// Vehicles may not leave the end of a straight segment
    Stop,
    /// Vehicles leave as soon as they reach the end
    #[default]
    Proceed,
}

impl SignalState {
    pub fn toggled(self) -> Self {
        match self {
            SignalState::Stop => SignalState::Proceed,
            SignalState::Proceed => SignalState::Stop,
        }
    }

    pub fn is_proceed(self) -> bool {
        self == SignalState::Proceed
    }
}

/// A 2D point in the simulation plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle of the direction from this point to another, in radians
    pub fn angle_to(&self, other: &Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// The point `distance` away from this one along `angle`
    pub fn offset(&self, angle: f32, distance: f32) -> Point {
        Point {
            x: self.x + distance * angle.cos(),
            y: self.y + distance * angle.sin(),
        }
    }

    /// Rejects NaN and infinite coordinates
    pub fn validate(&self) -> Result<()> {
        finite(self.x).context("Point x coordinate")?;
        finite(self.y).context("Point y coordinate")?;
        Ok(())
    }
}

/// Checks a construction-time scalar before it can reach the tick loop
pub fn finite(value: f32) -> Result<f32> {
    let value = NotNan::new(value).context("Value is NaN")?.into_inner();
    if !value.is_finite() {
        bail!("Value {} is not finite", value);
    }
    Ok(value)
}

/// Process-wide simulation knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Drawn width of every road, not used by kinematics
    pub road_width: f32,
    /// Drawn width of a car
    pub car_width: f32,
    /// Minimum gap kept between consecutive cars on a straight segment
    pub following_distance: f32,
    /// Length of cars spawned without an explicit length
    pub default_car_length: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            road_width: ROAD_WIDTH,
            car_width: CAR_WIDTH,
            following_distance: FOLLOWING_DISTANCE,
            default_car_length: DEFAULT_CAR_LENGTH,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if finite(self.road_width).context("road_width")? <= 0.0 {
            bail!("road_width must be positive, got {}", self.road_width);
        }
        if finite(self.car_width).context("car_width")? <= 0.0 {
            bail!("car_width must be positive, got {}", self.car_width);
        }
        if finite(self.following_distance).context("following_distance")? < 0.0 {
            bail!(
                "following_distance must not be negative, got {}",
                self.following_distance
            );
        }
        if finite(self.default_car_length).context("default_car_length")? <= 0.0 {
            bail!(
                "default_car_length must be positive, got {}",
                self.default_car_length
            );
        }
        Ok(())
    }
}

/// Drawn road width in world units
pub const ROAD_WIDTH: f32 = 16.0;

/// Drawn car width in world units
pub const CAR_WIDTH: f32 = 4.0;

/// Gap kept behind every car on a straight segment
pub const FOLLOWING_DISTANCE: f32 = 20.0;

/// Length of a car in world units
pub const DEFAULT_CAR_LENGTH: f32 = 20.0;

/// Speed of every road in the demo network, in world units per tick
pub const DEFAULT_ROAD_SPEED: f32 = 5.0;

/// Wall-clock time between ticks when driven by a timer
pub const TICK_INTERVAL_SECS: f64 = 0.03;
