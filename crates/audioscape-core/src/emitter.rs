//! Directional emitters ("cones") and their spherical-coordinate geometry.
//!
//! Longitude and latitude are the source of truth for a cone's orientation.
//! Direction vectors, world transforms and the panner cone angles are derived
//! from them on demand.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DMat4, DQuat, DVec3};
use rand::Rng;

use crate::audio::SoundSlot;
use crate::constants::{
    CONE_BASE_LENGTH, CONE_LENGTH_PER_VOLUME, CONE_OUTER_ANGLE_MULTIPLIER, CONE_OUTER_GAIN,
    CONE_WIDTH_PER_SPREAD, DEFAULT_CONE_SPREAD, DEFAULT_CONE_VOLUME, POLE_EPSILON,
};
use crate::mute::MuteState;
use crate::scene::ConeId;

/// Unit direction for spherical angles (radians), Y up.
pub fn to_direction(longitude: f64, latitude: f64) -> DVec3 {
    let polar = FRAC_PI_2 - latitude;
    DVec3::new(
        polar.sin() * longitude.sin(),
        polar.cos(),
        polar.sin() * longitude.cos(),
    )
}

/// Inverse of [`to_direction`]: `(longitude, latitude)` in radians.
///
/// Straight up or down has no defined longitude; 0 is returned there and the
/// latitude is ±π/2. A zero vector maps to `(0, 0)`.
pub fn to_spherical(direction: DVec3) -> (f64, f64) {
    let Some(d) = direction.try_normalize() else {
        return (0.0, 0.0);
    };
    let horizontal = DVec3::new(d.x, 0.0, d.z).length();
    if horizontal < POLE_EPSILON {
        return (0.0, FRAC_PI_2.copysign(d.y));
    }
    let longitude = wrap_angle(-(-d.z).atan2(-d.x) - FRAC_PI_2);
    // Angle between the direction and its horizontal projection; the atan2
    // form stays accurate near the horizon where acos loses precision.
    let latitude = d.y.atan2(horizontal);
    (longitude, latitude)
}

/// Wrap an angle into \[-π, π).
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Cone dimensions and the panner angles derived from volume and spread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConeShape {
    pub radius: f64,
    pub length: f64,
    pub inner_angle_deg: f64,
    pub outer_angle_deg: f64,
    pub outer_gain: f64,
}

impl ConeShape {
    pub fn from_params(volume: f64, spread: f64) -> Self {
        let radius = spread * CONE_WIDTH_PER_SPREAD;
        let length = volume * CONE_LENGTH_PER_VOLUME + CONE_BASE_LENGTH;
        let inner_angle_deg = (radius / length).atan().to_degrees();
        Self {
            radius,
            length,
            inner_angle_deg,
            outer_angle_deg: inner_angle_deg * CONE_OUTER_ANGLE_MULTIPLIER,
            outer_gain: CONE_OUTER_GAIN,
        }
    }
}

/// A directional sound source owned by a sound object.
#[derive(Clone, Debug)]
pub struct Cone {
    pub id: ConeId,
    pub filename: Option<String>,
    pub color: String,
    pub mute: MuteState,
    pub sound: SoundSlot,
    longitude: f64,
    latitude: f64,
    volume: f64,
    spread: f64,
    shape: ConeShape,
}

impl Cone {
    pub fn new(id: ConeId) -> Self {
        Self::with_params(id, 0.0, 0.0, DEFAULT_CONE_VOLUME, DEFAULT_CONE_SPREAD, random_color())
    }

    pub fn with_params(
        id: ConeId,
        longitude: f64,
        latitude: f64,
        volume: f64,
        spread: f64,
        color: String,
    ) -> Self {
        Self {
            id,
            filename: None,
            color,
            mute: MuteState::default(),
            sound: SoundSlot::default(),
            longitude: wrap_angle(longitude),
            latitude: latitude.clamp(-FRAC_PI_2, FRAC_PI_2),
            volume,
            spread,
            shape: ConeShape::from_params(volume, spread),
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn spread(&self) -> f64 {
        self.spread
    }

    pub fn shape(&self) -> ConeShape {
        self.shape
    }

    pub fn set_angles(&mut self, longitude: f64, latitude: f64) {
        self.longitude = wrap_angle(longitude);
        self.latitude = latitude.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Point the cone along `direction` (dragging the cone directly).
    pub fn set_direction_from(&mut self, direction: DVec3) {
        let (longitude, latitude) = to_spherical(direction);
        self.set_angles(longitude, latitude);
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        self.shape = ConeShape::from_params(self.volume, self.spread);
    }

    pub fn set_spread(&mut self, spread: f64) {
        self.spread = spread;
        self.shape = ConeShape::from_params(self.volume, self.spread);
    }

    pub fn direction(&self) -> DVec3 {
        to_direction(self.longitude, self.latitude)
    }

    /// World transform of a cone attached to an object centered at `center`:
    /// local +Z is rotated onto the cone direction.
    pub fn world_transform(&self, center: DVec3) -> DMat4 {
        let rotation = DQuat::from_rotation_arc(DVec3::Z, self.direction());
        DMat4::from_rotation_translation(rotation, center)
    }
}

/// Pastel default in the editor's palette: fixed red and blue, random green.
fn random_color() -> String {
    let green: u8 = rand::thread_rng().gen();
    format!("#80{green:02x}e6")
}
