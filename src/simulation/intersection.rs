//! Traffic-light state machine for a single grid intersection.

use super::types::{
    Axis, IntersectionId, LightOverride, LightState, BLOCK_SIZE, INITIAL_GREEN_DURATION,
    YELLOW_DURATION,
};

/// A signalled intersection on the grid
///
/// The NS and EW signal heads cycle Green -> Yellow -> Red, coupled so
/// that at most one axis is non-Red at any time. Created once at grid
/// generation, mutated every tick, never destroyed during a run.
#[derive(Debug, Clone)]
pub struct Intersection {
    pub id: IntersectionId,
    /// Human-readable junction name
    pub label: String,
    pub ns: LightState,
    pub ew: LightState,
    /// Ticks remaining before the current state's deadline
    pub timer: i32,
    /// Green dwell applied on each Yellow -> Red handover
    pub green_duration: i32,
    /// While set, normal cycling is suspended
    pub override_state: Option<LightOverride>,
}

impl Intersection {
    pub fn new(gx: i32, gy: i32, label: impl Into<String>) -> Self {
        Self {
            id: IntersectionId::new(gx, gy),
            label: label.into(),
            ns: LightState::Green,
            ew: LightState::Red,
            timer: INITIAL_GREEN_DURATION,
            green_duration: INITIAL_GREEN_DURATION,
            override_state: None,
        }
    }

    /// World-space center of the junction
    pub fn center(&self) -> (f32, f32) {
        (
            (self.id.gx as f32 + 0.5) * BLOCK_SIZE,
            (self.id.gy as f32 + 0.5) * BLOCK_SIZE,
        )
    }

    /// Signal facing traffic that travels along the given axis
    pub fn signal_for(&self, axis: Axis) -> LightState {
        match axis {
            Axis::NorthSouth => self.ns,
            Axis::EastWest => self.ew,
        }
    }

    /// Update the green dwell used for subsequent cycles.
    ///
    /// Non-positive durations are a caller error; asserted in debug
    /// builds and clamped to one tick in release.
    pub fn set_green_duration(&mut self, ticks: i32) {
        debug_assert!(ticks > 0, "green duration must be positive");
        self.green_duration = ticks.max(1);
    }

    /// Advance the state machine by one tick.
    ///
    /// An active override forces its implied signal pair and wins over
    /// the timer, which keeps counting down underneath it.
    pub fn advance(&mut self) {
        self.timer -= 1;

        if let Some(override_state) = self.override_state {
            match override_state {
                LightOverride::NsGreen => {
                    self.ns = LightState::Green;
                    self.ew = LightState::Red;
                }
                LightOverride::EwGreen => {
                    self.ns = LightState::Red;
                    self.ew = LightState::Green;
                }
                LightOverride::EmergencyAllRed => {
                    self.ns = LightState::Red;
                    self.ew = LightState::Red;
                }
            }
            return;
        }

        if self.timer > 0 {
            return;
        }

        match (self.ns, self.ew) {
            (LightState::Green, _) => {
                self.ns = LightState::Yellow;
                self.timer = YELLOW_DURATION;
            }
            (LightState::Yellow, _) => {
                self.ns = LightState::Red;
                self.ew = LightState::Green;
                self.timer = self.green_duration;
            }
            (_, LightState::Green) => {
                self.ew = LightState::Yellow;
                self.timer = YELLOW_DURATION;
            }
            (_, LightState::Yellow) => {
                self.ew = LightState::Red;
                self.ns = LightState::Green;
                self.timer = self.green_duration;
            }
            // Both red only after an all-red override clears; restart the
            // cycle on the NS axis rather than staying dark forever.
            (LightState::Red, LightState::Red) => {
                self.ns = LightState::Green;
                self.timer = self.green_duration;
            }
        }
    }
}
