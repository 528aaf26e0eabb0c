//! Main simulation world that ties everything together
//!
//! This is the entry point for running the segment simulation
//! without any Bevy dependencies.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::f32::consts::PI;

use super::car::SimCar;
use super::road::SimRoad;
use super::road_network::SimRoadNetwork;
use super::stats::SimStats;
use super::types::{
    finite, CarId, Point, RoadId, SignalState, SimConfig, SimId, DEFAULT_ROAD_SPEED,
};

/// The main simulation world
pub struct SimWorld {
    /// All roads and the cars on them
    pub road_network: SimRoadNetwork,

    pub config: SimConfig,

    pub stats: SimStats,

    /// Next car ID to assign
    next_id: usize,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl SimWorld {
    fn new_internal(
        road_network: SimRoadNetwork,
        config: SimConfig,
        rng: Option<StdRng>,
    ) -> Result<Self> {
        config.validate().context("Invalid simulation config")?;
        Ok(Self {
            road_network,
            config,
            stats: SimStats::default(),
            next_id: 0,
            rng,
        })
    }

    pub fn new(road_network: SimRoadNetwork, config: SimConfig) -> Result<Self> {
        Self::new_internal(road_network, config, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(road_network: SimRoadNetwork, config: SimConfig, seed: u64) -> Result<Self> {
        Self::new_internal(road_network, config, Some(StdRng::seed_from_u64(seed)))
    }

    /// Create a new SimWorld that routes cars with the given RNG
    pub fn new_with_rng(road_network: SimRoadNetwork, config: SimConfig, rng: StdRng) -> Result<Self> {
        Self::new_internal(road_network, config, Some(rng))
    }

    /// Pick a successor of `road` uniformly at random, using seeded RNG if available
    fn choose_successor(&mut self, road: RoadId) -> Option<RoadId> {
        let successors = self.road_network.get_road(road)?.successors();
        match &mut self.rng {
            Some(rng) => successors.choose(rng).copied(),
            None => successors.choose(&mut rand::rng()).copied(),
        }
    }

    fn next_car_id(&mut self) -> CarId {
        let id = CarId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    /// Create a car of the given length and hand it to `road` as if it had
    /// just completed a previous road
    pub fn spawn_vehicle(&mut self, length: f32, road: RoadId) -> Result<CarId> {
        if finite(length).context("Car length")? <= 0.0 {
            bail!("Car length must be positive, got {}", length);
        }
        if self.road_network.get_road(road).is_none() {
            bail!("Cannot spawn car on unknown road {:?}", road);
        }

        let id = self.next_car_id();
        if let Some(target) = self.road_network.get_road_mut(road) {
            target.receive(SimCar::new(id, length));
        }
        self.stats.cars_spawned += 1;

        debug!("Spawned car {:?} (length {}) on road {:?}", id, length, road);
        Ok(id)
    }

    /// Spawn one car of the default length at every entry point
    pub fn spawn_wave(&mut self) -> Result<Vec<CarId>> {
        let length = self.config.default_car_length;
        let entry_points = self.road_network.entry_points().to_vec();
        entry_points
            .into_iter()
            .map(|road| self.spawn_vehicle(length, road))
            .collect()
    }

    /// Flip the signal on every road
    pub fn toggle_all_signals(&mut self) {
        self.road_network.toggle_all_signals();
        self.stats.signal_toggles += 1;
        info!(
            "Signals toggled, {} road(s) now stopped",
            self.stopped_road_count()
        );
    }

    pub fn set_signal(&mut self, road: RoadId, signal: SignalState) -> Result<()> {
        self.road_network.set_signal(road, signal)
    }

    pub fn stopped_road_count(&self) -> usize {
        self.road_network
            .roads()
            .iter()
            .filter(|road| !road.signal().is_proceed())
            .count()
    }

    /// Every car in the world
    pub fn cars(&self) -> impl Iterator<Item = &SimCar> {
        self.road_network.cars()
    }

    pub fn car_count(&self) -> usize {
        self.road_network.car_count()
    }

    /// Find a car and the road it is on
    pub fn find_car(&self, id: CarId) -> Option<(&SimRoad, &SimCar)> {
        self.road_network.roads().iter().find_map(|road| {
            road.cars()
                .iter()
                .find(|car| car.id == id)
                .map(|car| (road, car))
        })
    }

    /// Advance the whole network by one tick
    ///
    /// Every road moves its cars first. Cars that completed a road are then
    /// handed to a random successor, so they first move on the next tick.
    pub fn tick(&mut self) {
        self.stats.ticks += 1;

        let departures = self
            .road_network
            .advance_roads(self.config.following_distance);

        for (from, car) in departures {
            self.hand_off(from, car);
        }
    }

    fn hand_off(&mut self, from: RoadId, car: SimCar) {
        let Some(next) = self.choose_successor(from) else {
            debug!("Car {:?} reached dead end {:?} and left the network", car.id, from);
            self.stats.cars_discarded += 1;
            return;
        };

        // Successor ids were checked when the network was built
        let road = self.road_network.get_road_mut(next);
        debug_assert!(road.is_some(), "Road {:?} names missing successor {:?}", from, next);
        if let Some(road) = road {
            road.receive(car);
            self.stats.hand_offs += 1;
        }
    }

    /// Create the demo world: a two-lane ring with a crossing lane through
    /// the middle
    pub fn create_demo_world() -> Result<Self> {
        let config = SimConfig::default();
        Self::new(Self::build_demo_network(&config)?, config)
    }

    /// Create the demo world with a seeded RNG for reproducible simulations
    pub fn create_demo_world_with_seed(seed: u64) -> Result<Self> {
        let config = SimConfig::default();
        Self::new_with_seed(Self::build_demo_network(&config)?, config, seed)
    }

    /// Internal helper to build the demo network structure
    ///
    /// Entry points are the top straight of the clockwise lane and the left
    /// straight of the counterclockwise lane.
    pub fn build_demo_network(config: &SimConfig) -> Result<SimRoadNetwork> {
        let speed = DEFAULT_ROAD_SPEED;
        let inner = 12.0 + config.road_width / 2.0;
        let outer = 28.0 + config.road_width / 2.0;
        let p = Point::new;

        let mut b = SimRoadNetwork::builder();

        let road_a = b.add_straight(p(60.0, 40.0), p(272.0, 40.0), speed);
        let road_b = b.add_straight(p(560.0, 60.0), p(560.0, 340.0), speed);
        let road_c = b.add_straight(p(540.0, 360.0), p(328.0, 360.0), speed);
        let road_d = b.add_straight(p(40.0, 340.0), p(40.0, 60.0), speed);
        let road_e = b.add_arc(p(60.0, 340.0), inner, 0.5 * PI, PI, false, speed);
        let road_f = b.add_arc(p(540.0, 60.0), inner, 1.5 * PI, 2.0 * PI, false, speed);
        let road_g = b.add_arc(p(540.0, 340.0), inner, 0.0, 0.5 * PI, false, speed);
        let road_h = b.add_arc(p(60.0, 60.0), inner, PI, 1.5 * PI, false, speed);
        let road_i = b.add_straight(p(540.0, 24.0), p(328.0, 24.0), speed);
        let road_j = b.add_straight(p(576.0, 340.0), p(576.0, 60.0), speed);
        let road_k = b.add_straight(p(60.0, 376.0), p(272.0, 376.0), speed);
        let road_l = b.add_straight(p(24.0, 60.0), p(24.0, 340.0), speed);
        let road_m = b.add_arc(p(540.0, 60.0), outer, 2.0 * PI, 1.5 * PI, true, speed);
        let road_n = b.add_arc(p(540.0, 340.0), outer, 0.5 * PI, 0.0, true, speed);
        let road_o = b.add_arc(p(60.0, 340.0), outer, PI, 0.5 * PI, true, speed);
        let road_p = b.add_arc(p(60.0, 60.0), outer, 1.5 * PI, PI, true, speed);
        let road_q = b.add_straight(p(292.0, 60.0), p(292.0, 340.0), speed);
        let road_r = b.add_straight(p(308.0, 340.0), p(308.0, 60.0), speed);
        let road_s = b.add_arc(p(272.0, 60.0), inner, 1.5 * PI, 2.0 * PI, false, speed);
        let road_t = b.add_straight(p(272.0, 40.0), p(328.0, 40.0), speed);
        let road_u = b.add_arc(p(328.0, 60.0), outer, 1.5 * PI, PI, true, speed);
        let road_v = b.add_straight(p(328.0, 24.0), p(272.0, 24.0), speed);
        let road_w = b.add_straight(p(328.0, 40.0), p(540.0, 40.0), speed);
        let road_x = b.add_straight(p(272.0, 24.0), p(60.0, 24.0), speed);
        let road_y = b.add_straight(p(328.0, 360.0), p(272.0, 360.0), speed);
        let road_z = b.add_straight(p(272.0, 360.0), p(60.0, 360.0), speed);
        let road_0 = b.add_arc(p(272.0, 340.0), inner, 0.0, 0.5 * PI, false, speed);
        let road_1 = b.add_arc(p(328.0, 340.0), outer, PI, 0.5 * PI, true, speed);
        let road_2 = b.add_straight(p(272.0, 376.0), p(328.0, 376.0), speed);
        let road_3 = b.add_straight(p(328.0, 376.0), p(540.0, 376.0), speed);
        let road_4 = b.add_arc(p(328.0, 60.0), inner, PI, 1.5 * PI, false, speed);
        let road_5 = b.add_arc(p(272.0, 340.0), outer, 0.5 * PI, 0.0, true, speed);
        let road_6 = b.add_arc(p(328.0, 340.0), inner, 0.5 * PI, PI, false, speed);
        let road_7 = b.add_arc(p(272.0, 60.0), outer, 2.0 * PI, 1.5 * PI, true, speed);

        // Clockwise lane
        b.connect(road_a, &[road_s, road_t])
            .connect(road_t, &[road_w])
            .connect(road_w, &[road_f])
            .connect(road_s, &[road_q])
            .connect(road_f, &[road_b])
            .connect(road_b, &[road_g])
            .connect(road_g, &[road_c])
            .connect(road_c, &[road_y, road_6])
            .connect(road_6, &[road_r])
            .connect(road_y, &[road_z])
            .connect(road_z, &[road_e])
            .connect(road_e, &[road_d])
            .connect(road_d, &[road_h])
            .connect(road_h, &[road_a])
            .connect(road_r, &[road_4, road_7])
            .connect(road_4, &[road_w])
            .connect(road_7, &[road_x]);

        // Counterclockwise lane
        b.connect(road_i, &[road_v, road_u])
            .connect(road_u, &[road_q])
            .connect(road_v, &[road_x])
            .connect(road_x, &[road_p])
            .connect(road_p, &[road_l])
            .connect(road_l, &[road_o])
            .connect(road_o, &[road_k])
            .connect(road_k, &[road_2, road_5])
            .connect(road_2, &[road_3])
            .connect(road_3, &[road_n])
            .connect(road_n, &[road_j])
            .connect(road_j, &[road_m])
            .connect(road_m, &[road_i])
            .connect(road_q, &[road_0, road_1])
            .connect(road_1, &[road_3])
            .connect(road_0, &[road_z])
            .connect(road_5, &[road_r]);

        b.add_entry_point(road_a).add_entry_point(road_l);

        b.build().context("Failed to build demo network")
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Segment Simulation Summary ===");
        println!("Tick: {}", self.stats.ticks);
        println!(
            "Roads: {} ({} stopped), Entry points: {}",
            self.road_network.road_count(),
            self.stopped_road_count(),
            self.road_network.entry_points().len()
        );
        println!(
            "Cars: {} active, {} spawned, {} discarded",
            self.car_count(),
            self.stats.cars_spawned,
            self.stats.cars_discarded
        );
        println!("Hand-offs: {}", self.stats.hand_offs);
        println!("Signal toggles: {}", self.stats.signal_toggles);

        let busy: Vec<&SimRoad> = self
            .road_network
            .roads()
            .iter()
            .filter(|road| !road.cars().is_empty())
            .collect();
        if !busy.is_empty() {
            println!("--- Occupied Roads ---");
            for road in busy {
                println!(
                    "  Road {:?} ({} of length {:.1}, {:?}): {} car(s), leader progress {:.2}",
                    road.id.0 .0,
                    if road.is_straight() { "straight" } else { "arc" },
                    road.geometry().length(),
                    road.signal(),
                    road.cars().len(),
                    road.cars().front().map(SimCar::progress).unwrap_or(0.0)
                );
            }
        }
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        const SAMPLES_PER_ROAD: usize = 24;
        // Characters per world unit
        let scale = 0.125;

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for road in self.road_network.roads() {
            for i in 0..=SAMPLES_PER_ROAD {
                let point = road.geometry().sample(i as f32 / SAMPLES_PER_ROAD as f32);
                min_x = min_x.min(point.x);
                max_x = max_x.max(point.x);
                min_y = min_y.min(point.y);
                max_y = max_y.max(point.y);
            }
        }

        // Add padding
        min_x -= 8.0;
        max_x += 8.0;
        min_y -= 8.0;
        max_y += 8.0;

        let width = ((max_x - min_x) * scale) as usize + 1;
        let height = ((max_y - min_y) * scale) as usize + 1;
        let mut grid = vec![vec![' '; width]; height];

        // Screen coordinates: y grows downwards
        let to_grid = |point: Point| -> (usize, usize) {
            let col = ((point.x - min_x) * scale).max(0.0) as usize;
            let row = ((point.y - min_y) * scale).max(0.0) as usize;
            (row.min(height - 1), col.min(width - 1))
        };

        for road in self.road_network.roads() {
            for i in 0..=SAMPLES_PER_ROAD {
                let (row, col) = to_grid(road.geometry().sample(i as f32 / SAMPLES_PER_ROAD as f32));
                grid[row][col] = '.';
            }
        }

        // Stopped straights show where cars wait
        for road in self.road_network.roads() {
            if road.is_straight() && !road.signal().is_proceed() {
                let (row, col) = to_grid(road.geometry().end_point());
                grid[row][col] = '#';
            }
        }

        for car in self.cars() {
            let (row, col) = to_grid(car.position);
            grid[row][col] = 'C';
        }

        println!("\n=== World Map ===");
        println!("Legend: .=Road, #=Stopped road end, C=Car");
        println!();
        for row in &grid {
            let line: String = row.iter().collect();
            println!("{}", line.trim_end());
        }
        println!();
    }
}
