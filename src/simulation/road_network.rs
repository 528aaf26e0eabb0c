//! Road network graph and its construction-time validation
//!
//! Standalone implementation that doesn't depend on Bevy.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::BTreeMap;

use super::car::SimCar;
use super::road::SimRoad;
use super::types::{Point, RoadId, SignalState, SimId};

/// The full set of segments plus the successor graph between them
///
/// Only [`RoadNetworkBuilder::build`] creates one, so every successor id
/// refers to a segment in the network and every segment is reachable from an
/// entry point.
#[derive(Debug)]
pub struct SimRoadNetwork {
    /// Segments indexed by their `RoadId`
    roads: Vec<SimRoad>,

    /// Segments where new cars are spawned
    entry_points: Vec<RoadId>,

    /// The successor relation, node `i` is road `i`
    graph: DiGraph<RoadId, ()>,
}

impl SimRoadNetwork {
    pub fn builder() -> RoadNetworkBuilder {
        RoadNetworkBuilder::default()
    }

    /// Gets a road by ID
    pub fn get_road(&self, road_id: RoadId) -> Option<&SimRoad> {
        self.roads.get(road_id.index())
    }

    pub(crate) fn get_road_mut(&mut self, road_id: RoadId) -> Option<&mut SimRoad> {
        self.roads.get_mut(road_id.index())
    }

    /// Get all roads, in id order
    pub fn roads(&self) -> &[SimRoad] {
        &self.roads
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn entry_points(&self) -> &[RoadId] {
        &self.entry_points
    }

    /// Every car on every road
    pub fn cars(&self) -> impl Iterator<Item = &SimCar> {
        self.roads.iter().flat_map(|road| road.cars().iter())
    }

    pub fn car_count(&self) -> usize {
        self.roads.iter().map(|road| road.cars().len()).sum()
    }

    /// Whether a car on `from` can eventually drive onto `to`
    pub fn is_reachable(&self, from: RoadId, to: RoadId) -> bool {
        if from.index() >= self.roads.len() || to.index() >= self.roads.len() {
            return false;
        }
        has_path_connecting(
            &self.graph,
            NodeIndex::new(from.index()),
            NodeIndex::new(to.index()),
            None,
        )
    }

    pub fn set_signal(&mut self, road_id: RoadId, signal: SignalState) -> Result<()> {
        let road = self
            .get_road_mut(road_id)
            .with_context(|| format!("Road {:?} not found", road_id))?;
        road.set_signal(signal);
        Ok(())
    }

    /// Flip the signal of every road at once
    pub fn toggle_all_signals(&mut self) {
        for road in &mut self.roads {
            road.set_signal(road.signal().toggled());
        }
    }

    /// Run one tick of kinematics on every road, in id order
    ///
    /// Returns each car that completed its road together with the road it
    /// left. Nothing is delivered to successors here, so no road sees a car
    /// that moved during this tick.
    pub(crate) fn advance_roads(&mut self, following_distance: f32) -> Vec<(RoadId, SimCar)> {
        let mut departures = Vec::new();
        for road in &mut self.roads {
            let id = road.id;
            departures.extend(
                road.advance(following_distance)
                    .into_iter()
                    .map(|car| (id, car)),
            );
        }
        departures
    }
}

/// Collects segments and their successor lists, then validates the whole
/// network at once
#[derive(Debug, Default)]
pub struct RoadNetworkBuilder {
    roads: Vec<SimRoad>,
    successors: BTreeMap<RoadId, Vec<RoadId>>,
    entry_points: Vec<RoadId>,
}

impl RoadNetworkBuilder {
    fn next_road_id(&self) -> RoadId {
        RoadId(SimId(self.roads.len()))
    }

    /// Adds a straight road and returns its id
    pub fn add_straight(&mut self, from: Point, to: Point, speed: f32) -> RoadId {
        let id = self.next_road_id();
        self.roads.push(SimRoad::straight(id, from, to, speed));
        id
    }

    /// Adds an arc road and returns its id
    pub fn add_arc(
        &mut self,
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        counterclockwise: bool,
        speed: f32,
    ) -> RoadId {
        let id = self.next_road_id();
        self.roads.push(SimRoad::arc(
            id,
            center,
            radius,
            start_angle,
            end_angle,
            counterclockwise,
            speed,
        ));
        id
    }

    /// Sets the successor list of `road`, replacing any earlier one
    pub fn connect(&mut self, road: RoadId, successors: &[RoadId]) -> &mut Self {
        self.successors.insert(road, successors.to_vec());
        self
    }

    /// Marks a road as a place where cars are spawned
    pub fn add_entry_point(&mut self, road: RoadId) -> &mut Self {
        if !self.entry_points.contains(&road) {
            self.entry_points.push(road);
        }
        self
    }

    /// Validates the network and freezes it
    pub fn build(self) -> Result<SimRoadNetwork> {
        let Self {
            mut roads,
            successors,
            entry_points,
        } = self;

        if roads.is_empty() {
            bail!("Road network has no roads");
        }

        for road in &roads {
            road.validate()?;
        }

        let road_count = roads.len();
        let exists = |id: RoadId| id.index() < road_count;

        let mut graph = DiGraph::with_capacity(road_count, successors.len());
        for road in &roads {
            graph.add_node(road.id);
        }

        for (from, targets) in successors {
            if !exists(from) {
                bail!("Successor list given for unknown road {:?}", from);
            }
            for target in &targets {
                if !exists(*target) {
                    bail!("Road {:?} lists unknown successor {:?}", from, target);
                }
                graph.add_edge(NodeIndex::new(from.index()), NodeIndex::new(target.index()), ());
            }
            roads[from.index()].set_successors(targets);
        }

        if entry_points.is_empty() {
            bail!("Road network has no entry points");
        }

        let mut reached = vec![false; road_count];
        for entry in &entry_points {
            if !exists(*entry) {
                bail!("Entry point {:?} is not a road in the network", entry);
            }
            let mut dfs = Dfs::new(&graph, NodeIndex::new(entry.index()));
            while let Some(node) = dfs.next(&graph) {
                reached[node.index()] = true;
            }
        }

        let unreachable: Vec<RoadId> = roads
            .iter()
            .filter(|road| !reached[road.id.index()])
            .map(|road| road.id)
            .collect();
        if !unreachable.is_empty() {
            bail!(
                "Roads {:?} cannot be reached from any entry point",
                unreachable
            );
        }

        let dead_ends = roads.iter().filter(|road| road.successors().is_empty()).count();
        if dead_ends > 0 {
            debug!("Road network has {} dead-end roads", dead_ends);
        }

        info!(
            "Built road network: {} roads, {} connections, {} entry points",
            road_count,
            graph.edge_count(),
            entry_points.len()
        );

        Ok(SimRoadNetwork {
            roads,
            entry_points,
            graph,
        })
    }
}
