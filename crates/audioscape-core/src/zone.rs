//! Sound zones: closed regions that play their sound while the listener is
//! inside them.

use glam::DVec3;

use crate::audio::{AudioLayer, SoundSlot};
use crate::constants::{CURVE_SAMPLES, DEFAULT_ZONE_VOLUME, PICK_ZONE_POINT_RADIUS, ZONE_PLAYING_GAIN};
use crate::error::{AudioError, PathError};
use crate::geometry::{point_in_polygon_xz, Point3};
use crate::mute::{MixerState, MuteState};
use crate::pick::{hit_area, hit_path, Pick, Ray};
use crate::scene::{Editable, ZoneId};
use crate::spline::SplinePath;

#[derive(Clone, Debug)]
pub struct SoundZone {
    pub id: ZoneId,
    pub filename: Option<String>,
    pub sound: SoundSlot,
    pub mute: MuteState,
    path: SplinePath,
    volume: f64,
    outline: Vec<Point3>,
    is_playing: bool,
    is_active: bool,
}

impl SoundZone {
    pub fn new(id: ZoneId, points: Vec<Point3>) -> Result<Self, PathError> {
        let path = SplinePath::closed_loop(points)?;
        let outline = path.polyline(CURVE_SAMPLES);
        Ok(Self {
            id,
            filename: None,
            sound: SoundSlot::default(),
            mute: MuteState::default(),
            path,
            volume: DEFAULT_ZONE_VOLUME,
            outline,
            is_playing: false,
            is_active: true,
        })
    }

    pub fn path(&self) -> &SplinePath {
        &self.path
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Mean of the control points; shown as the zone position.
    pub fn position(&self) -> Point3 {
        self.path.centroid()
    }

    /// Apply an edit to the outline path and refresh the cached polygon.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut SplinePath) -> R) -> R {
        let out = f(&mut self.path);
        self.outline = self.path.polyline(CURVE_SAMPLES);
        out
    }

    pub fn set_volume(&mut self, audio: &mut dyn AudioLayer, volume: f64) {
        self.volume = volume;
        if let (true, Some(source)) = (self.is_playing, self.sound.source()) {
            audio.set_volume(source, ZONE_PLAYING_GAIN * volume);
        }
    }

    /// Whether `listener` stands inside the zone, seen from above.
    pub fn contains(&self, listener: Point3) -> bool {
        point_in_polygon_xz(listener, &self.outline)
    }

    /// Start playback on entry and stop it on exit. Returns true when the
    /// playing state changed.
    pub fn update_occupancy(
        &mut self,
        audio: &mut dyn AudioLayer,
        mixer: &MixerState,
        listener: Point3,
    ) -> Result<bool, AudioError> {
        let inside = self.contains(listener);
        match (inside, self.is_playing) {
            (true, false) => self.enter(audio, mixer).map(|_| self.is_playing),
            (false, true) => {
                self.leave(audio);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn enter(&mut self, audio: &mut dyn AudioLayer, mixer: &MixerState) -> Result<(), AudioError> {
        let Some(source) = self.sound.source().filter(|_| self.sound.is_loaded()) else {
            return Ok(());
        };
        self.sound.play(audio)?;
        audio.set_volume(source, ZONE_PLAYING_GAIN * self.volume);
        audio.set_gain(source, mixer.gain_for(&self.mute));
        self.is_playing = true;
        log::info!("[zone {}] listener entered", self.id.0);
        Ok(())
    }

    /// Fade out and stop.
    pub fn leave(&mut self, audio: &mut dyn AudioLayer) {
        if !self.is_playing {
            return;
        }
        if let Some(source) = self.sound.source() {
            audio.set_volume(source, 0.0);
        }
        self.sound.stop(audio);
        self.is_playing = false;
        log::info!("[zone {}] listener left", self.id.0);
    }

    pub fn push_gain(&self, audio: &mut dyn AudioLayer, mixer: &MixerState) {
        if let Some(source) = self.sound.source() {
            audio.set_gain(source, mixer.gain_for(&self.mute));
        }
    }

    pub fn release_audio(&mut self, audio: &mut dyn AudioLayer) {
        self.leave(audio);
        self.sound.release(audio);
    }
}

impl Editable for SoundZone {
    fn hit_test(&self, ray: &Ray) -> Option<(f64, Pick)> {
        if self.is_active {
            if let Some((t, hit)) = hit_path(&self.path, ray, PICK_ZONE_POINT_RADIUS) {
                return Some((t, Pick::Zone(self.id, hit)));
            }
        }
        hit_area(&self.path, ray).map(|t| (t, Pick::ZoneArea(self.id)))
    }

    fn translate(&mut self, delta: DVec3) {
        self.edit(|path| path.translate_all(delta));
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
