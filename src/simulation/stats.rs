//! Aggregate statistics derived from the vehicle set each tick.

use std::collections::HashMap;

use super::types::{Direction, IntersectionId};
use super::vehicle::Vehicle;

/// Count of vehicles queued near each intersection approach
pub type QueueMap = HashMap<(IntersectionId, Direction), usize>;

/// Snapshot statistics, recomputed from scratch every tick
///
/// Only `carbon_emission` accumulates across ticks; the rest is derived
/// from the surviving vehicle set.
#[derive(Debug, Clone, Default)]
pub struct TrafficStats {
    pub total_vehicles: usize,
    pub avg_speed: f32,
    /// 0..=100, scaled from the population relative to a nominal load
    pub congestion_level: u8,
    /// Simulated kg, accumulated by the orchestrator
    pub carbon_emission: f32,
    pub incident_count: usize,
}

impl TrafficStats {
    pub fn compute(vehicles: &[Vehicle], carbon_emission: f32, incident_count: usize) -> Self {
        let total_vehicles = vehicles.len();
        let avg_speed = if total_vehicles > 0 {
            vehicles.iter().map(|v| v.speed).sum::<f32>() / total_vehicles as f32
        } else {
            0.0
        };
        let congestion_level = ((total_vehicles as f32 / 80.0) * 100.0).floor().min(100.0) as u8;

        Self {
            total_vehicles,
            avg_speed,
            congestion_level,
            carbon_emission,
            incident_count,
        }
    }
}
