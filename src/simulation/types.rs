//! Core types and tuning constants for the traffic simulation.

use std::fmt;

/// A unique identifier for a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleId(pub usize);

/// A stable intersection identity derived from its grid coordinates
///
/// Ids may be formed for coordinates outside the generated grid; lookups
/// against the world simply miss for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntersectionId {
    pub gx: i32,
    pub gy: i32,
}

impl IntersectionId {
    pub fn new(gx: i32, gy: i32) -> Self {
        Self { gx, gy }
    }
}

impl fmt::Display for IntersectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INT-{}-{}", self.gx, self.gy)
    }
}

/// Names the road segment between two grid-adjacent intersections.
///
/// The endpoint pair is normalized on construction so the same physical
/// segment always hashes to the same id regardless of travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId {
    a: IntersectionId,
    b: IntersectionId,
}

impl SegmentId {
    pub fn new(first: IntersectionId, second: IntersectionId) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    pub fn endpoints(&self) -> (IntersectionId, IntersectionId) {
        (self.a, self.b)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.a, self.b)
    }
}

/// The two perpendicular traffic-flow directions at an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

/// Axis-aligned heading of a vehicle
///
/// World coordinates follow screen convention: y grows southward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }

    /// Unit step in world coordinates
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::North => (0.0, -1.0),
            Direction::South => (0.0, 1.0),
            Direction::East => (1.0, 0.0),
            Direction::West => (-1.0, 0.0),
        }
    }

    /// Unit step in grid coordinates
    pub fn grid_step(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn turn_left(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::South => Direction::West,
            Direction::East => Direction::South,
            Direction::West => Direction::North,
        }
    }

    pub fn turn_right(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
            Direction::West => Direction::South,
        }
    }
}

/// State of one signal head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

/// A forced light state that suspends normal timer-driven cycling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightOverride {
    NsGreen,
    EwGreen,
    EmergencyAllRed,
}

/// Closed set of vehicle classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleKind {
    Car,
    Auto,
    Bus,
    Police,
}

impl VehicleKind {
    /// Fixed (width, length) in world units, used for spacing checks
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            VehicleKind::Car => (CAR_SIZE * 0.6, CAR_SIZE),
            VehicleKind::Auto => (CAR_SIZE * 0.7, CAR_SIZE * 0.8),
            VehicleKind::Bus => (CAR_SIZE * 1.3, CAR_SIZE * 3.5),
            VehicleKind::Police => (CAR_SIZE * 0.7, CAR_SIZE * 1.5),
        }
    }
}

/// Motion state of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Accelerating,
    Moving,
    Stopped,
}

/// Mission kind for police units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionKind {
    Patrol,
    /// Responding units ignore signals while en route
    Response,
}

/// Auxiliary state carried only by police vehicles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mission {
    pub kind: MissionKind,
    pub target: Option<IntersectionId>,
}

/// Side length of one grid block in world units
pub const BLOCK_SIZE: f32 = 240.0;
/// Width of a road in world units
pub const ROAD_WIDTH: f32 = 70.0;
/// Base vehicle size unit
pub const CAR_SIZE: f32 = 14.0;

/// Speed cap in world units per tick
pub const MAX_SPEED: f32 = 4.0;
/// Speed gained per tick while unobstructed
pub const ACCELERATION: f32 = 0.15;
/// Speed shed per tick while braking
pub const DECELERATION: f32 = 0.25;
/// Braking multiplier applied when blocked by a light or leader
pub const HARD_BRAKE_FACTOR: f32 = 1.2;
/// Speed cap multiplier in real-time mode
pub const REAL_TIME_SPEED_FACTOR: f32 = 1.2;

/// Default green dwell in ticks
pub const INITIAL_GREEN_DURATION: i32 = 150;
/// Yellow dwell in ticks
pub const YELLOW_DURATION: i32 = 60;

/// A spawn is attempted every this many ticks
pub const SPAWN_INTERVAL: u64 = 25;
/// Population ceiling enforced by the orchestrator
pub const MAX_VEHICLES: usize = 120;
/// Vehicles this far beyond the grid are evicted
pub const WORLD_MARGIN: f32 = 100.0;

/// Depth of the car-following look-ahead window
pub const LOOK_AHEAD_DISTANCE: f32 = 50.0;
/// Vehicles within this distance of an intersection count toward its queue
pub const QUEUE_RADIUS: f32 = ROAD_WIDTH * 1.5;

/// Ticks between spontaneous breakdown rolls
pub const BREAKDOWN_CHECK_INTERVAL: u64 = 300;
/// Probability of a breakdown on each roll
pub const BREAKDOWN_CHANCE: f32 = 0.1;
/// Ticks between patrol waypoint re-rolls for police units
pub const PATROL_RETARGET_INTERVAL: u64 = 300;

/// World-space center of the travel lane along grid line `grid_idx`.
///
/// Traffic keeps left of the road center line in the forward direction
/// (southbound on vertical roads, eastbound on horizontal ones).
pub fn lane_center(grid_idx: i32, forward: bool) -> f32 {
    let road_center = (grid_idx as f32 + 0.5) * BLOCK_SIZE;
    let offset = ROAD_WIDTH / 4.0;
    if forward {
        road_center - offset
    } else {
        road_center + offset
    }
}
