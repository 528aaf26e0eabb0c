//! Road segments and their per-tick kinematics
//!
//! Standalone implementation that doesn't depend on Bevy.

use anyhow::{bail, Context, Result};
use ordered_float::OrderedFloat;
use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_2;

use super::car::SimCar;
use super::types::{finite, Point, RoadId, SignalState};

/// A straight segment from one point to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightGeometry {
    pub from: Point,
    pub to: Point,
}

impl StraightGeometry {
    pub fn length(&self) -> f32 {
        self.from.distance(&self.to)
    }

    pub fn heading(&self) -> f32 {
        self.from.angle_to(&self.to)
    }

    pub fn point_at(&self, progress: f32) -> Point {
        self.from.offset(self.heading(), progress)
    }
}

/// A circular arc around `center`
///
/// Progress on an arc is an angular offset from `start_angle`. It grows on
/// clockwise arcs and shrinks on counterclockwise ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: Point,
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub counterclockwise: bool,
}

impl ArcGeometry {
    pub fn angular_span(&self) -> f32 {
        (self.end_angle - self.start_angle).abs()
    }

    /// +1 for clockwise travel, -1 for counterclockwise
    pub fn direction(&self) -> f32 {
        if self.counterclockwise {
            -1.0
        } else {
            1.0
        }
    }

    pub fn point_at(&self, progress: f32) -> Point {
        self.center.offset(self.start_angle + progress, self.radius)
    }

    pub fn heading_at(&self, progress: f32) -> f32 {
        self.start_angle + progress + FRAC_PI_2
    }
}

/// The two kinds of segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoadGeometry {
    Straight(StraightGeometry),
    Arc(ArcGeometry),
}

impl RoadGeometry {
    /// Where and facing which way a car entering the segment is placed
    pub fn start_pose(&self) -> (Point, f32) {
        match self {
            RoadGeometry::Straight(line) => (line.from, line.heading()),
            RoadGeometry::Arc(arc) => (arc.point_at(0.0), arc.heading_at(0.0)),
        }
    }

    pub fn start_point(&self) -> Point {
        self.start_pose().0
    }

    pub fn end_point(&self) -> Point {
        match self {
            RoadGeometry::Straight(line) => line.to,
            RoadGeometry::Arc(arc) => arc.point_at(arc.direction() * arc.angular_span()),
        }
    }

    /// Travelled length in world units
    pub fn length(&self) -> f32 {
        match self {
            RoadGeometry::Straight(line) => line.length(),
            RoadGeometry::Arc(arc) => arc.radius * arc.angular_span(),
        }
    }

    /// Point at fraction `t` (0 to 1) of the way along the segment
    pub fn sample(&self, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        match self {
            RoadGeometry::Straight(line) => line.point_at(t * line.length()),
            RoadGeometry::Arc(arc) => arc.point_at(arc.direction() * t * arc.angular_span()),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            RoadGeometry::Straight(line) => {
                line.from.validate().context("Straight start point")?;
                line.to.validate().context("Straight end point")?;
                if line.length() <= 0.0 {
                    bail!("Straight segment has zero length");
                }
            }
            RoadGeometry::Arc(arc) => {
                arc.center.validate().context("Arc center")?;
                if finite(arc.radius).context("Arc radius")? <= 0.0 {
                    bail!("Arc radius must be positive, got {}", arc.radius);
                }
                finite(arc.start_angle).context("Arc start angle")?;
                finite(arc.end_angle).context("Arc end angle")?;
                if arc.angular_span() <= 0.0 {
                    bail!("Arc segment has zero angular span");
                }
            }
        }
        Ok(())
    }
}

/// A road segment with its queue of cars
///
/// The queue is ordered front to back along the direction of travel: index 0
/// is the car furthest along, and entering cars join at the back.
#[derive(Debug, Clone)]
pub struct SimRoad {
    pub id: RoadId,
    geometry: RoadGeometry,
    /// Straights: world units per tick. Arcs: applied as `speed / radius`
    /// radians per tick.
    pub speed: f32,
    cars: VecDeque<SimCar>,
    successors: Vec<RoadId>,
    signal: SignalState,
}

impl SimRoad {
    pub fn new(id: RoadId, geometry: RoadGeometry, speed: f32) -> Self {
        Self {
            id,
            geometry,
            speed,
            cars: VecDeque::new(),
            successors: Vec::new(),
            signal: SignalState::default(),
        }
    }

    pub fn straight(id: RoadId, from: Point, to: Point, speed: f32) -> Self {
        Self::new(id, RoadGeometry::Straight(StraightGeometry { from, to }), speed)
    }

    pub fn arc(
        id: RoadId,
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        counterclockwise: bool,
        speed: f32,
    ) -> Self {
        Self::new(
            id,
            RoadGeometry::Arc(ArcGeometry {
                center,
                radius,
                start_angle,
                end_angle,
                counterclockwise,
            }),
            speed,
        )
    }

    pub fn geometry(&self) -> &RoadGeometry {
        &self.geometry
    }

    pub fn is_straight(&self) -> bool {
        matches!(self.geometry, RoadGeometry::Straight(_))
    }

    /// Cars on this segment, front first
    pub fn cars(&self) -> &VecDeque<SimCar> {
        &self.cars
    }

    pub fn successors(&self) -> &[RoadId] {
        &self.successors
    }

    pub(crate) fn set_successors(&mut self, successors: Vec<RoadId>) {
        self.successors = successors;
    }

    pub fn signal(&self) -> SignalState {
        self.signal
    }

    pub fn set_signal(&mut self, signal: SignalState) {
        self.signal = signal;
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.geometry
            .validate()
            .with_context(|| format!("Invalid geometry for road {:?}", self.id))?;
        if finite(self.speed).context("Road speed")? <= 0.0 {
            bail!("Road {:?} speed must be positive, got {}", self.id, self.speed);
        }
        Ok(())
    }

    /// Hand a car to this segment: it starts at the beginning with zero
    /// progress and joins the back of the queue
    pub fn receive(&mut self, mut car: SimCar) {
        let (position, heading) = self.geometry.start_pose();
        car.reset(position, heading);
        self.cars.push_back(car);
    }

    /// Advance every car by one tick
    ///
    /// Returns the cars that completed the segment, in the order they left.
    /// The caller routes them to a successor.
    pub fn advance(&mut self, following_distance: f32) -> Vec<SimCar> {
        match self.geometry {
            RoadGeometry::Straight(line) => self.advance_straight(line, following_distance),
            RoadGeometry::Arc(arc) => self.advance_arc(arc),
        }
    }

    /// Front to back, each car may advance only while it stays clear of the
    /// space reserved for the cars ahead of it, unless the signal lets it run
    /// to the end. At the end a car leaves only on PROCEED.
    fn advance_straight(&mut self, line: StraightGeometry, following_distance: f32) -> Vec<SimCar> {
        let length = line.length();
        let heading = line.heading();
        let proceed = self.signal.is_proceed();

        let mut departed = Vec::new();
        let mut waiting_offset = following_distance;
        let mut index = 0;

        while let Some(car) = self.cars.get_mut(index) {
            let car_length = car.length;
            let progress = car.progress();

            if progress < length - waiting_offset || (progress < length && proceed) {
                car.progress = OrderedFloat((progress + self.speed).min(length));
                car.position = line.from.offset(heading, car.progress());
                car.heading = heading;
                index += 1;
            } else if proceed {
                if let Some(car) = self.cars.remove(index) {
                    departed.push(car);
                }
            } else {
                index += 1;
            }

            waiting_offset += car_length + following_distance;
        }

        departed
    }

    /// Arcs keep no spacing and ignore the signal
    fn advance_arc(&mut self, arc: ArcGeometry) -> Vec<SimCar> {
        let span = arc.angular_span();
        let step = arc.direction() * self.speed / arc.radius;

        let mut departed = Vec::new();
        let mut index = 0;

        while let Some(car) = self.cars.get_mut(index) {
            let progress = car.progress();

            if progress.abs() < span {
                car.position = arc.point_at(progress);
                car.heading = arc.heading_at(progress);
                car.progress += step;
                index += 1;
            } else if let Some(car) = self.cars.remove(index) {
                departed.push(car);
            }
        }

        departed
    }
}
