//! Time-based playback of an object along a [`SplinePath`].

use crate::constants::{
    DEFAULT_MOVEMENT_DIRECTION, DEFAULT_MOVEMENT_SPEED, DEFAULT_TRAJECTORY_CLOCK,
    SPEED_ARC_SAMPLES,
};
use crate::geometry::Point3;
use crate::spline::SplinePath;

/// Per-object playback state. `clock` is the arc-length fraction along the
/// path, `direction` is +1 toward the end of the path and -1 toward its start.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryState {
    pub clock: f64,
    pub direction: f64,
    pub speed: f64,
    pub speed_increment: f64,
}

impl Default for TrajectoryState {
    fn default() -> Self {
        Self {
            clock: DEFAULT_TRAJECTORY_CLOCK,
            direction: DEFAULT_MOVEMENT_DIRECTION,
            speed: DEFAULT_MOVEMENT_SPEED,
            speed_increment: 0.0,
        }
    }
}

impl TrajectoryState {
    pub fn with_speed(speed: f64) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    /// Change the linear speed and recompute the per-tick increment.
    pub fn set_speed(&mut self, speed: f64, path: &SplinePath) {
        self.speed = speed;
        self.recompute_increment(path);
    }

    /// `speed / arc_length`. Call after the speed or the path geometry
    /// changes. A degenerate (zero or non-finite) length yields 0 so the
    /// object holds still instead of propagating infinities.
    pub fn recompute_increment(&mut self, path: &SplinePath) {
        let length = path.arc_length(SPEED_ARC_SAMPLES);
        self.speed_increment = if length.is_finite() && length > 0.0 {
            self.speed / length
        } else {
            log::warn!("[trajectory] zero-length path; holding position");
            0.0
        };
    }

    /// Advance the clock by one tick. Open paths bounce at either end,
    /// closed paths wrap around.
    pub fn advance(&mut self, closed: bool) {
        self.clock += self.direction * self.speed_increment;
        if self.clock >= 1.0 {
            if closed {
                self.clock = 0.0;
            } else {
                self.direction = -self.direction;
                self.clock = 1.0;
            }
        }
        if self.clock < 0.0 {
            if closed {
                self.clock = 1.0;
            } else {
                self.direction = -self.direction;
                self.clock = 0.0;
            }
        }
    }

    /// Advance along `path` and return the new position.
    pub fn tick(&mut self, path: &SplinePath) -> Point3 {
        self.advance(path.is_closed());
        path.point_at(self.clock)
    }
}

/// Advance an optional trajectory. With no path the object does not move.
pub fn follow(state: &mut TrajectoryState, path: Option<&SplinePath>) -> Option<Point3> {
    path.map(|p| state.tick(p))
}
