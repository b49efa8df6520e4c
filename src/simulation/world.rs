//! Main simulation world and tick orchestrator.
//!
//! Owns all mutable simulation state between ticks. External callers send
//! commands (overrides, incidents, live-feed data) and receive immutable
//! snapshots; nothing outside this module mutates live state.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

use super::incident::{Incident, IncidentId, IncidentKind, Severity};
use super::intersection::Intersection;
use super::spawner::Spawner;
use super::stats::{QueueMap, TrafficStats};
use super::types::{
    Direction, IntersectionId, LightOverride, SegmentId, VehicleId, VehicleKind, BLOCK_SIZE,
    BREAKDOWN_CHANCE, BREAKDOWN_CHECK_INTERVAL, MAX_VEHICLES, SPAWN_INTERVAL, WORLD_MARGIN,
};
use super::vehicle::{UpdateContext, Vehicle};

/// Immutable world snapshot published after every tick
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub vehicles: Vec<Vehicle>,
    pub intersections: Vec<Intersection>,
    pub stats: TrafficStats,
    pub queue_map: QueueMap,
}

/// The main simulation world
pub struct SimWorld {
    /// All intersections, keyed by grid identity
    pub intersections: HashMap<IntersectionId, Intersection>,

    /// All vehicles currently on the road
    pub vehicles: Vec<Vehicle>,

    /// Road names, keyed by segment
    pub roads: HashMap<SegmentId, String>,

    /// Open incidents
    pub incidents: Vec<Incident>,

    /// Segments currently impassable
    closed_segments: HashSet<SegmentId>,

    spawner: Spawner,
    grid_size: i32,

    /// Tick counter; advances only while running
    tick: u64,
    running: bool,
    real_time_mode: bool,

    /// When set, a supplied vehicle list replaces the simulated one
    live_mode: bool,
    live_vehicles: Option<Vec<Vehicle>>,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    next_vehicle_id: usize,
    next_incident_id: usize,
    spawn_count: usize,

    carbon_emission: f32,
    last_queues: QueueMap,
}

impl SimWorld {
    fn new_internal(grid_size: i32, rng: Option<StdRng>) -> Self {
        debug_assert!(grid_size > 0, "grid size must be positive");
        let grid_size = grid_size.max(1);

        let mut intersections = HashMap::new();
        for gx in 0..grid_size {
            for gy in 0..grid_size {
                let intersection = Intersection::new(gx, gy, format!("Sector {}-{}", gx, gy));
                intersections.insert(intersection.id, intersection);
            }
        }

        let mut roads = HashMap::new();
        for gy in 0..grid_size {
            for gx in 0..grid_size {
                if gx < grid_size - 1 {
                    let seg = SegmentId::new(
                        IntersectionId::new(gx, gy),
                        IntersectionId::new(gx + 1, gy),
                    );
                    roads.insert(seg, format!("Avenue {}", gy + 1));
                }
                if gy < grid_size - 1 {
                    let seg = SegmentId::new(
                        IntersectionId::new(gx, gy),
                        IntersectionId::new(gx, gy + 1),
                    );
                    roads.insert(seg, format!("Street {}", gx + 1));
                }
            }
        }

        Self {
            intersections,
            vehicles: Vec::new(),
            roads,
            incidents: Vec::new(),
            closed_segments: HashSet::new(),
            spawner: Spawner::new(grid_size),
            grid_size,
            tick: 0,
            running: true,
            real_time_mode: false,
            live_mode: false,
            live_vehicles: None,
            rng,
            next_vehicle_id: 0,
            next_incident_id: 0,
            spawn_count: 0,
            carbon_emission: 0.0,
            last_queues: QueueMap::new(),
        }
    }

    pub fn new(grid_size: i32) -> Self {
        Self::new_internal(grid_size, None)
    }

    /// Create a world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(grid_size: i32, seed: u64) -> Self {
        Self::new_internal(grid_size, Some(StdRng::seed_from_u64(seed)))
    }

    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Total vehicles ever spawned or inserted; rejected spawn attempts
    /// burn an id but are not counted
    pub fn total_spawned(&self) -> usize {
        self.spawn_count
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Flip the duty flag; an in-flight tick always completes
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn set_real_time_mode(&mut self, enabled: bool) {
        self.real_time_mode = enabled;
    }

    /// Enable or disable the live-feed pass-through mode
    pub fn set_live_mode(&mut self, enabled: bool) {
        self.live_mode = enabled;
        if !enabled {
            self.live_vehicles = None;
        }
    }

    /// Supply externally sourced vehicles for the next tick (live mode)
    pub fn supply_live_vehicles(&mut self, vehicles: Vec<Vehicle>) {
        self.live_vehicles = Some(vehicles);
    }

    /// Get a random value in [0, 1), using the seeded RNG if available
    fn random_f32(&mut self) -> f32 {
        match &mut self.rng {
            Some(rng) => rng.random(),
            None => rand::rng().random(),
        }
    }

    fn random_index(&mut self, len: usize) -> usize {
        match &mut self.rng {
            Some(rng) => rng.random_range(0..len),
            None => rand::rng().random_range(0..len),
        }
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;
        id
    }

    /// Insert a vehicle directly, bypassing the spawner
    pub fn insert_vehicle(
        &mut self,
        x: f32,
        y: f32,
        dir: Direction,
        kind: VehicleKind,
    ) -> VehicleId {
        let id = self.next_vehicle_id();
        self.vehicles.push(Vehicle::new(id, x, y, dir, kind));
        self.spawn_count += 1;
        id
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    /// Force or release a light override at an intersection
    pub fn set_override(
        &mut self,
        id: IntersectionId,
        override_state: Option<LightOverride>,
    ) -> Result<()> {
        let intersection = self
            .intersections
            .get_mut(&id)
            .with_context(|| format!("intersection {} not found", id))?;
        intersection.override_state = override_state;
        Ok(())
    }

    /// Retime an intersection's green dwell (e.g. from an analytics suggestion)
    pub fn set_green_duration(&mut self, id: IntersectionId, ticks: i32) -> Result<()> {
        let intersection = self
            .intersections
            .get_mut(&id)
            .with_context(|| format!("intersection {} not found", id))?;
        intersection.set_green_duration(ticks);
        Ok(())
    }

    pub fn set_intersection_label(&mut self, id: IntersectionId, label: String) -> Result<()> {
        let intersection = self
            .intersections
            .get_mut(&id)
            .with_context(|| format!("intersection {} not found", id))?;
        intersection.label = label;
        Ok(())
    }

    pub fn is_segment_closed(&self, segment: SegmentId) -> bool {
        self.closed_segments.contains(&segment)
    }

    pub fn close_segment(&mut self, segment: SegmentId) {
        self.closed_segments.insert(segment);
    }

    pub fn reopen_segment(&mut self, segment: SegmentId) {
        self.closed_segments.remove(&segment);
    }

    /// Raise an incident, closing its segment if it blocks one
    pub fn inject_incident(
        &mut self,
        kind: IncidentKind,
        x: f32,
        y: f32,
        severity: Severity,
        description: String,
        blocks_segment: Option<SegmentId>,
    ) -> IncidentId {
        let id = IncidentId(self.next_incident_id);
        self.next_incident_id += 1;

        if let Some(segment) = blocks_segment {
            self.closed_segments.insert(segment);
        }

        info!("incident {:?} raised: {}", id, description);
        self.incidents.push(Incident {
            id,
            kind,
            x,
            y,
            description,
            severity,
            tick: self.tick,
            blocks_segment,
        });
        id
    }

    /// Resolve an incident and reopen the segment it blocked
    pub fn resolve_incident(&mut self, id: IncidentId) -> Result<()> {
        let index = self
            .incidents
            .iter()
            .position(|i| i.id == id)
            .with_context(|| format!("incident {:?} not found", id))?;
        let incident = self.incidents.remove(index);
        if let Some(segment) = incident.blocks_segment {
            self.closed_segments.remove(&segment);
        }
        Ok(())
    }

    /// Reassign a patrolling police unit to respond to an incident.
    ///
    /// Returns `Ok(false)` when no patrol unit is free.
    pub fn dispatch_police(&mut self, incident_id: IncidentId) -> Result<bool> {
        let incident = self
            .incidents
            .iter()
            .find(|i| i.id == incident_id)
            .with_context(|| format!("incident {:?} not found", incident_id))?;

        let target = self.nearest_intersection(incident.x, incident.y);

        let unit = self.vehicles.iter_mut().find(|v| {
            v.kind == VehicleKind::Police
                && v.mission
                    .map(|m| m.kind == super::types::MissionKind::Patrol)
                    .unwrap_or(false)
        });

        match unit {
            Some(unit) => {
                unit.mission = Some(super::types::Mission {
                    kind: super::types::MissionKind::Response,
                    target: Some(target),
                });
                info!(
                    "police unit {:?} dispatched to {} for incident {:?}",
                    unit.id, target, incident_id
                );
                Ok(true)
            }
            None => {
                warn!("no patrol unit available for incident {:?}", incident_id);
                Ok(false)
            }
        }
    }

    /// Mark a vehicle as recovered from a breakdown
    pub fn clear_breakdown(&mut self, id: VehicleId) -> Result<()> {
        let vehicle = self
            .vehicle_mut(id)
            .with_context(|| format!("vehicle {:?} not found", id))?;
        vehicle.broken_down = false;
        Ok(())
    }

    /// Grid intersection closest to a world-space point
    fn nearest_intersection(&self, x: f32, y: f32) -> IntersectionId {
        let clamp = |v: f32| (v / BLOCK_SIZE).floor().clamp(0.0, (self.grid_size - 1) as f32);
        IntersectionId::new(clamp(x) as i32, clamp(y) as i32)
    }

    /// Main simulation tick. Publishes the updated world snapshot.
    ///
    /// While paused the tick still fires so consumers can keep rendering,
    /// but all state is left frozen.
    pub fn tick(&mut self) -> Snapshot {
        if !self.running {
            return self.snapshot(self.last_queues.clone());
        }

        self.tick += 1;

        // 1. Advance every traffic-light state machine
        for intersection in self.intersections.values_mut() {
            intersection.advance();
        }

        // 2. Live-feed pass-through: supplied vehicles replace the
        //    simulated set wholesale; spawner and kinematics are bypassed.
        if self.live_mode {
            match self.live_vehicles.take() {
                Some(feed) => {
                    self.vehicles = feed;
                    self.carbon_emission += self.vehicles.len() as f32 * 0.0001;
                    self.last_queues = QueueMap::new();
                    return self.snapshot(QueueMap::new());
                }
                None => {
                    warn!("live feed lost; falling back to internal simulation");
                }
            }
        }

        // 3. Spawn, subject to cadence and the population ceiling
        if self.tick % SPAWN_INTERVAL == 0 && self.vehicles.len() < MAX_VEHICLES {
            let id = self.next_vehicle_id();
            let spawned = match &mut self.rng {
                Some(rng) => self.spawner.spawn(rng, &self.vehicles, id),
                None => self.spawner.spawn(&mut rand::rng(), &self.vehicles, id),
            };
            match spawned {
                Some(vehicle) => {
                    debug!(
                        "spawned {:?} {:?} at ({:.0}, {:.0}) heading {:?}",
                        vehicle.kind, vehicle.id, vehicle.x, vehicle.y, vehicle.dir
                    );
                    self.vehicles.push(vehicle);
                    self.spawn_count += 1;
                }
                None => {
                    // Entry blocked; the id allocation is not rolled back
                    debug!("spawn rejected: entry point occupied");
                }
            }
        }

        // 4. Occasional spontaneous breakdowns
        self.roll_breakdown();

        // 5. Kinematics over the full vehicle set
        let mut queues = QueueMap::new();
        let others = self.vehicles.clone();
        let ctx = UpdateContext {
            intersections: &self.intersections,
            others: &others,
            closed_segments: &self.closed_segments,
            grid_size: self.grid_size,
            real_time_mode: self.real_time_mode,
            tick: self.tick,
        };
        for vehicle in &mut self.vehicles {
            match &mut self.rng {
                Some(rng) => vehicle.update(&ctx, rng, &mut queues),
                None => vehicle.update(&ctx, &mut rand::rng(), &mut queues),
            }
        }

        // 6. Evict vehicles beyond the world bounds
        let extent = self.grid_size as f32 * BLOCK_SIZE;
        self.vehicles.retain(|v| {
            v.x > -WORLD_MARGIN
                && v.x < extent + WORLD_MARGIN
                && v.y > -WORLD_MARGIN
                && v.y < extent + WORLD_MARGIN
        });

        // 7. Aggregate stats and publish
        self.carbon_emission += self.vehicles.len() as f32 * 0.0001;
        self.last_queues = queues.clone();
        self.snapshot(queues)
    }

    /// Roll for a spontaneous breakdown and raise a blocking incident.
    ///
    /// At most one vehicle may be broken down at a time; police units are
    /// exempt.
    fn roll_breakdown(&mut self) {
        if self.tick % BREAKDOWN_CHECK_INTERVAL != 0 {
            return;
        }
        if self.vehicles.len() <= 10 || self.vehicles.iter().any(|v| v.broken_down) {
            return;
        }
        if self.random_f32() >= BREAKDOWN_CHANCE {
            return;
        }

        let candidates: Vec<usize> = self
            .vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| v.kind != VehicleKind::Police && !v.broken_down)
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return;
        }

        let index = candidates[self.random_index(candidates.len())];
        let (kind, x, y, dir, cell) = {
            let vehicle = &mut self.vehicles[index];
            vehicle.broken_down = true;
            vehicle.speed = 0.0;
            vehicle.state = super::types::MotionState::Stopped;
            (vehicle.kind, vehicle.x, vehicle.y, vehicle.dir, vehicle.grid_cell())
        };

        // The segment the vehicle sits on, toward the cell it was heading for
        let near = IntersectionId::new(cell.0, cell.1);
        let (sx, sy) = dir.grid_step();
        let far = IntersectionId::new(cell.0 + sx, cell.1 + sy);
        let segment = SegmentId::new(near, far);

        let road_name = self
            .roads
            .get(&segment)
            .cloned()
            .unwrap_or_else(|| "an unnamed road".to_string());
        let description = format!(
            "A {:?} has broken down on {}, causing a major blockage.",
            kind, road_name
        );

        warn!("{}", description);
        self.inject_incident(
            IncidentKind::Breakdown,
            x,
            y,
            Severity::Medium,
            description,
            Some(segment),
        );
    }

    /// Clone out the externally visible state
    fn snapshot(&self, queue_map: QueueMap) -> Snapshot {
        let mut intersections: Vec<Intersection> = self.intersections.values().cloned().collect();
        intersections.sort_by_key(|i| (i.id.gy, i.id.gx));

        Snapshot {
            vehicles: self.vehicles.clone(),
            intersections,
            stats: TrafficStats::compute(
                &self.vehicles,
                self.carbon_emission,
                self.incidents.len(),
            ),
            queue_map,
        }
    }
}
