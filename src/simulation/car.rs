//! Car state for the segment simulation
//!
//! Standalone implementation that doesn't depend on Bevy.

use ordered_float::OrderedFloat;

use super::types::{CarId, Point};

/// A car in the segment simulation
///
/// A car lives in exactly one segment's queue at a time. Its position and
/// heading are cached by the segment that owns it whenever it moves.
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    /// Physical length, fixed at creation
    pub length: f32,
    /// Distance along the current segment: world units on straights,
    /// radians on arcs
    pub progress: OrderedFloat<f32>,
    pub position: Point,
    /// Heading in radians
    pub heading: f32,
}

impl SimCar {
    pub fn new(id: CarId, length: f32) -> Self {
        Self {
            id,
            length,
            progress: OrderedFloat(0.0),
            position: Point::default(),
            heading: 0.0,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress.into_inner()
    }

    /// Place the car at the start of a segment with the given pose
    pub(crate) fn reset(&mut self, position: Point, heading: f32) {
        self.progress = OrderedFloat(0.0);
        self.position = position;
        self.heading = heading;
    }
}
