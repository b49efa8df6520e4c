//! Vehicle kinematics and car-following behavior.

use ordered_float::OrderedFloat;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use super::intersection::Intersection;
use super::stats::QueueMap;
use super::types::{
    lane_center, Direction, IntersectionId, LightState, Mission, MissionKind, MotionState,
    SegmentId, VehicleId, VehicleKind, ACCELERATION, BLOCK_SIZE, DECELERATION,
    HARD_BRAKE_FACTOR, LOOK_AHEAD_DISTANCE, MAX_SPEED, PATROL_RETARGET_INTERVAL, QUEUE_RADIUS,
    REAL_TIME_SPEED_FACTOR, ROAD_WIDTH,
};

/// Read-only world view a vehicle needs for one motion update
pub struct UpdateContext<'a> {
    pub intersections: &'a HashMap<IntersectionId, Intersection>,
    /// Previous-frame positions of every vehicle, used for look-ahead
    pub others: &'a [Vehicle],
    /// Segments currently impassable due to incidents
    pub closed_segments: &'a HashSet<SegmentId>,
    pub grid_size: i32,
    pub real_time_mode: bool,
    pub tick: u64,
}

/// A vehicle in the simulation
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub speed: f32,
    pub state: MotionState,
    pub kind: VehicleKind,
    pub width: f32,
    pub length: f32,
    /// Intersection currently being approached; re-derived when unset
    pub target: Option<IntersectionId>,
    /// Present on police units only
    pub mission: Option<Mission>,
    /// Broken-down vehicles never move but still occupy road space
    pub broken_down: bool,
}

impl Vehicle {
    pub fn new(id: VehicleId, x: f32, y: f32, dir: Direction, kind: VehicleKind) -> Self {
        let (width, length) = kind.dimensions();
        let mission = match kind {
            VehicleKind::Police => Some(Mission {
                kind: MissionKind::Patrol,
                target: None,
            }),
            _ => None,
        };
        Self {
            id,
            x,
            y,
            dir,
            speed: MAX_SPEED * 0.5,
            state: MotionState::Accelerating,
            kind,
            width,
            length,
            target: None,
            mission,
            broken_down: false,
        }
    }

    /// Grid cell containing the vehicle's current position
    pub fn grid_cell(&self) -> (i32, i32) {
        (
            (self.x / BLOCK_SIZE).floor() as i32,
            (self.y / BLOCK_SIZE).floor() as i32,
        )
    }

    pub fn is_responding(&self) -> bool {
        self.kind == VehicleKind::Police
            && matches!(
                self.mission,
                Some(Mission {
                    kind: MissionKind::Response,
                    ..
                })
            )
    }

    /// The intersection immediately ahead given heading and grid cell
    fn intersection_ahead(&self) -> IntersectionId {
        let (gx, gy) = self.grid_cell();
        match self.dir {
            Direction::South | Direction::East => IntersectionId::new(gx, gy),
            Direction::North => IntersectionId::new(gx, gy - 1),
            Direction::West => IntersectionId::new(gx - 1, gy),
        }
    }

    /// True once the given point lies behind the vehicle by more than
    /// half a road width, i.e. the junction box has been fully crossed.
    fn has_passed(&self, px: f32, py: f32) -> bool {
        let behind = match self.dir {
            Direction::North => py - self.y,
            Direction::South => self.y - py,
            Direction::East => self.x - px,
            Direction::West => px - self.x,
        };
        behind > ROAD_WIDTH / 2.0
    }

    /// Nearest other vehicle inside the rectangular look-ahead window.
    ///
    /// Candidates must lie ahead along the heading within
    /// `LOOK_AHEAD_DISTANCE` and within this vehicle's width laterally.
    fn car_in_front(&self, others: &[Vehicle]) -> Option<VehicleId> {
        others
            .iter()
            .filter(|other| other.id != self.id)
            .filter_map(|other| {
                let dx = other.x - self.x;
                let dy = other.y - self.y;
                let (ahead, lateral) = match self.dir {
                    Direction::North => (-dy, dx),
                    Direction::South => (dy, dx),
                    Direction::East => (dx, dy),
                    Direction::West => (-dx, dy),
                };
                let in_window =
                    ahead > 0.0 && ahead < LOOK_AHEAD_DISTANCE && lateral.abs() < self.width;
                in_window.then_some((OrderedFloat(ahead), other.id))
            })
            .min_by_key(|(ahead, _)| *ahead)
            .map(|(_, id)| id)
    }

    /// One motion update. Total over well-formed input; never fails.
    pub fn update<R: Rng>(&mut self, ctx: &UpdateContext, rng: &mut R, queues: &mut QueueMap) {
        if self.broken_down {
            return;
        }

        self.retarget_patrol(ctx, rng);

        if self.target.is_none() {
            self.target = Some(self.intersection_ahead());
        }

        let mut approaching_red = false;

        if let Some(target_id) = self.target {
            match ctx.intersections.get(&target_id) {
                Some(intersection) => {
                    let (ix, iy) = intersection.center();

                    if self.has_passed(ix, iy) {
                        // Crossed through; re-derive the target next tick so
                        // the vehicle starts observing the next signal ahead.
                        self.target = None;
                    } else {
                        let dist = (self.x - ix).hypot(self.y - iy);
                        let stopping_dist =
                            (self.speed * self.speed) / (2.0 * DECELERATION) + self.length;

                        if dist < stopping_dist && !self.is_responding() {
                            let signal = intersection.signal_for(self.dir.axis());
                            let must_stop = signal == LightState::Red
                                || (signal == LightState::Yellow && dist < ROAD_WIDTH / 2.0)
                                || self.exit_segment_closed(intersection, ctx);
                            if must_stop {
                                approaching_red = true;
                            }
                        }

                        if dist < QUEUE_RADIUS {
                            *queues.entry((target_id, self.dir)).or_insert(0) += 1;
                        }

                        if dist < 1.0 && self.speed < 0.1 {
                            self.turn_at(intersection, ctx, rng);
                        }
                    }
                }
                None => {
                    // Target off the generated grid. Vehicles entering from
                    // an edge derive one before their cell's junction exists;
                    // re-derive every tick so the first real junction ahead
                    // is acquired as soon as the grid is reached. Vehicles
                    // leaving the grid just keep re-deriving until evicted.
                    self.target = Some(self.intersection_ahead());
                }
            }
        }

        let blocked = approaching_red || self.car_in_front(ctx.others).is_some();

        if blocked {
            self.state = MotionState::Stopped;
            self.speed = (self.speed - DECELERATION * HARD_BRAKE_FACTOR).max(0.0);
        } else {
            self.state = MotionState::Moving;
            let cap = if ctx.real_time_mode {
                MAX_SPEED * REAL_TIME_SPEED_FACTOR
            } else {
                MAX_SPEED
            };
            self.speed = (self.speed + ACCELERATION).min(cap);
        }

        let (dx, dy) = self.dir.delta();
        self.x += dx * self.speed;
        self.y += dy * self.speed;
    }

    /// Periodically re-roll the patrol waypoint for idle police units
    fn retarget_patrol<R: Rng>(&mut self, ctx: &UpdateContext, rng: &mut R) {
        if self.kind != VehicleKind::Police {
            return;
        }
        let Some(mission) = &mut self.mission else {
            return;
        };
        if mission.kind != MissionKind::Patrol {
            return;
        }
        if ctx.tick % PATROL_RETARGET_INTERVAL == 0 && rng.random::<f32>() < 0.2 {
            let gx = rng.random_range(0..ctx.grid_size);
            let gy = rng.random_range(0..ctx.grid_size);
            mission.target = Some(IntersectionId::new(gx, gy));
        }
    }

    /// True if the segment the vehicle would enter by continuing straight
    /// through `intersection` is closed by an incident.
    fn exit_segment_closed(&self, intersection: &Intersection, ctx: &UpdateContext) -> bool {
        let (sx, sy) = self.dir.grid_step();
        let next = IntersectionId::new(intersection.id.gx + sx, intersection.id.gy + sy);
        ctx.closed_segments
            .contains(&SegmentId::new(intersection.id, next))
    }

    /// Turn choice at a junction, taken only when stopped at its center.
    ///
    /// Closed segments are never entered. Responding police steer toward
    /// their mission target; everyone else picks uniformly at random.
    fn turn_at<R: Rng>(&mut self, intersection: &Intersection, ctx: &UpdateContext, rng: &mut R) {
        let options = [self.dir, self.dir.turn_left(), self.dir.turn_right()];

        let available: Vec<Direction> = options
            .iter()
            .copied()
            .filter(|candidate| {
                let (sx, sy) = candidate.grid_step();
                let next =
                    IntersectionId::new(intersection.id.gx + sx, intersection.id.gy + sy);
                !ctx.closed_segments
                    .contains(&SegmentId::new(intersection.id, next))
            })
            .collect();

        let mut chosen: Option<Direction> = None;

        if self.is_responding() {
            if let Some(mission_target) = self.mission.as_ref().and_then(|m| m.target) {
                let dx = mission_target.gx - intersection.id.gx;
                let dy = mission_target.gy - intersection.id.gy;
                let steered = self.steer_toward(dx, dy);
                if let Some(dir) = steered {
                    if available.contains(&dir) {
                        chosen = Some(dir);
                    }
                }
            }
        }

        let chosen = match chosen.or_else(|| available.choose(rng).copied()) {
            Some(dir) => dir,
            None => return, // boxed in on all sides; hold position
        };

        let (ix, iy) = intersection.center();
        let (gx, gy) = (intersection.id.gx, intersection.id.gy);

        self.dir = chosen;
        self.state = MotionState::Accelerating;

        match chosen {
            Direction::East => {
                self.x = ix + ROAD_WIDTH / 2.0 + 1.0;
                self.y = lane_center(gy, true);
            }
            Direction::West => {
                self.x = ix - ROAD_WIDTH / 2.0 - 1.0;
                self.y = lane_center(gy, false);
            }
            Direction::South => {
                self.y = iy + ROAD_WIDTH / 2.0 + 1.0;
                self.x = lane_center(gx, true);
            }
            Direction::North => {
                self.y = iy - ROAD_WIDTH / 2.0 - 1.0;
                self.x = lane_center(gx, false);
            }
        }

        let (sx, sy) = chosen.grid_step();
        let (nx, ny) = (gx + sx, gy + sy);
        if nx >= 0 && nx < ctx.grid_size && ny >= 0 && ny < ctx.grid_size {
            self.target = Some(IntersectionId::new(nx, ny));
        } else {
            // Leaving the grid; bounds eviction takes it from here
            self.target = None;
        }
    }

    /// Preferred direction toward a target offset, relative to the
    /// current heading: straight first, then the closer turn.
    fn steer_toward(&self, dx: i32, dy: i32) -> Option<Direction> {
        match self.dir {
            Direction::North => {
                if dy < 0 {
                    Some(Direction::North)
                } else if dx > 0 {
                    Some(Direction::East)
                } else if dx < 0 {
                    Some(Direction::West)
                } else {
                    None
                }
            }
            Direction::South => {
                if dy > 0 {
                    Some(Direction::South)
                } else if dx < 0 {
                    Some(Direction::West)
                } else if dx > 0 {
                    Some(Direction::East)
                } else {
                    None
                }
            }
            Direction::East => {
                if dx > 0 {
                    Some(Direction::East)
                } else if dy > 0 {
                    Some(Direction::South)
                } else if dy < 0 {
                    Some(Direction::North)
                } else {
                    None
                }
            }
            Direction::West => {
                if dx < 0 {
                    Some(Direction::West)
                } else if dy < 0 {
                    Some(Direction::North)
                } else if dy > 0 {
                    Some(Direction::South)
                } else {
                    None
                }
            }
        }
    }
}
