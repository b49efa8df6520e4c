//! Standalone traffic simulation module
//!
//! This module contains all the core traffic simulation logic. It runs
//! entirely in-process with no rendering or I/O dependencies and can be
//! driven tick-by-tick from a console binary or any frontend.

mod incident;
mod intersection;
mod spawner;
mod stats;
mod types;
mod vehicle;
mod world;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use incident::{Incident, IncidentId, IncidentKind, Severity};
#[allow(unused_imports)]
pub use intersection::Intersection;
#[allow(unused_imports)]
pub use spawner::Spawner;
#[allow(unused_imports)]
pub use stats::{QueueMap, TrafficStats};
#[allow(unused_imports)]
pub use types::{
    lane_center, Axis, Direction, IntersectionId, LightOverride, LightState, Mission,
    MissionKind, MotionState, SegmentId, VehicleId, VehicleKind, ACCELERATION, BLOCK_SIZE,
    BREAKDOWN_CHANCE, BREAKDOWN_CHECK_INTERVAL, CAR_SIZE, DECELERATION, HARD_BRAKE_FACTOR,
    INITIAL_GREEN_DURATION, LOOK_AHEAD_DISTANCE, MAX_SPEED, MAX_VEHICLES,
    PATROL_RETARGET_INTERVAL, QUEUE_RADIUS, REAL_TIME_SPEED_FACTOR, ROAD_WIDTH,
    SPAWN_INTERVAL, WORLD_MARGIN, YELLOW_DURATION,
};
#[allow(unused_imports)]
pub use vehicle::{UpdateContext, Vehicle};
pub use world::{SimWorld, Snapshot};
