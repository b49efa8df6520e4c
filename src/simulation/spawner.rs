//! Probabilistic vehicle spawning at the grid edges.

use rand::Rng;

use super::types::{
    lane_center, Direction, VehicleId, VehicleKind, BLOCK_SIZE, CAR_SIZE,
};
use super::vehicle::Vehicle;

/// Maximum number of police units on the road at once
const MAX_POLICE: usize = 2;

/// Spawns vehicles at the edges of the grid
///
/// Produces at most one vehicle per call; the population ceiling and the
/// spawn cadence are the orchestrator's responsibility.
#[derive(Debug, Clone, Copy)]
pub struct Spawner {
    grid_size: i32,
}

impl Spawner {
    pub fn new(grid_size: i32) -> Self {
        Self { grid_size }
    }

    /// Attempt to spawn one vehicle.
    ///
    /// Picks an edge and lane uniformly, draws the type from a fixed
    /// probability ladder, and rejects the spawn when an existing vehicle
    /// sits inside the entry exclusion box.
    pub fn spawn<R: Rng>(
        &self,
        rng: &mut R,
        existing: &[Vehicle],
        id: VehicleId,
    ) -> Option<Vehicle> {
        let edge = rng.random_range(0..4u8);
        let lane = rng.random_range(0..self.grid_size);
        let extent = self.grid_size as f32 * BLOCK_SIZE;

        let (x, y, dir) = match edge {
            // Top edge, southbound
            0 => (lane_center(lane, true), -CAR_SIZE * 3.0, Direction::South),
            // Right edge, westbound
            1 => (extent + CAR_SIZE * 3.0, lane_center(lane, false), Direction::West),
            // Bottom edge, northbound
            2 => (lane_center(lane, false), extent + CAR_SIZE * 3.0, Direction::North),
            // Left edge, eastbound
            _ => (-CAR_SIZE * 3.0, lane_center(lane, true), Direction::East),
        };

        let kind = self.draw_kind(rng, existing);
        let (_, length) = kind.dimensions();

        // Reject spawns that would overlap traffic already at the entry
        let blocked = existing.iter().any(|other| {
            (other.x - x).abs() < length * 3.0 && (other.y - y).abs() < length * 3.0
        });
        if blocked {
            return None;
        }

        Some(Vehicle::new(id, x, y, dir, kind))
    }

    /// Fixed probability ladder: ~2% police (while under the cap),
    /// ~6% bus, ~27% auto-rickshaw, remainder car.
    fn draw_kind<R: Rng>(&self, rng: &mut R, existing: &[Vehicle]) -> VehicleKind {
        let police_count = existing
            .iter()
            .filter(|v| v.kind == VehicleKind::Police)
            .count();

        let r = rng.random::<f32>();
        if police_count < MAX_POLICE && r > 0.98 {
            VehicleKind::Police
        } else if r > 0.92 {
            VehicleKind::Bus
        } else if r > 0.65 {
            VehicleKind::Auto
        } else {
            VehicleKind::Car
        }
    }
}
