//! Sound objects: an omnidirectional source with optional cones and an
//! optional movement trajectory.

use glam::{DMat4, DVec3};
use smallvec::SmallVec;

use crate::audio::{AudioLayer, SourceKind};
use crate::constants::{
    DEFAULT_MOVEMENT_SPEED, DEFAULT_OBJECT_VOLUME, PICK_OBJECT_RADIUS,
    PICK_TRAJECTORY_POINT_RADIUS,
};
use crate::emitter::Cone;
use crate::error::{PathError, SceneError};
use crate::geometry::{ray_sphere, Point3};
use crate::mute::{effective_gain, MixerState, MuteState};
use crate::pick::{hit_path, Pick, Ray};
use crate::scene::{ConeId, Editable, ObjectId};
use crate::spline::SplinePath;
use crate::sync::sync_emitter;
use crate::trajectory::TrajectoryState;

/// A movement path attached to exactly one sound object.
#[derive(Clone, Debug)]
pub struct Trajectory {
    owner: ObjectId,
    path: SplinePath,
    pub state: TrajectoryState,
    is_active: bool,
}

impl Trajectory {
    pub fn new(owner: ObjectId, path: SplinePath, speed: f64) -> Self {
        let mut state = TrajectoryState::with_speed(speed);
        state.recompute_increment(&path);
        Self {
            owner,
            path,
            state,
            is_active: true,
        }
    }

    /// The object this trajectory moves.
    pub fn resolve_owning_object(&self) -> ObjectId {
        self.owner
    }

    pub fn path(&self) -> &SplinePath {
        &self.path
    }

    /// Apply an edit to the path and refresh the speed increment.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut SplinePath) -> R) -> R {
        let out = f(&mut self.path);
        self.state.recompute_increment(&self.path);
        out
    }
}

impl Editable for Trajectory {
    fn hit_test(&self, ray: &Ray) -> Option<(f64, Pick)> {
        if !self.is_active {
            return None;
        }
        hit_path(&self.path, ray, PICK_TRAJECTORY_POINT_RADIUS)
            .map(|(t, hit)| (t, Pick::Trajectory(self.owner, hit)))
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

#[derive(Clone, Debug)]
pub struct SoundObject {
    pub id: ObjectId,
    pub filename: Option<String>,
    pub sound: crate::audio::SoundSlot,
    pub mute: MuteState,
    position: Point3,
    volume: f64,
    movement_speed: f64,
    cones: SmallVec<[Cone; 4]>,
    trajectory: Option<Trajectory>,
    is_active: bool,
}

impl SoundObject {
    pub fn new(id: ObjectId, position: Point3) -> Self {
        Self {
            id,
            filename: None,
            sound: Default::default(),
            mute: MuteState::default(),
            position,
            volume: DEFAULT_OBJECT_VOLUME,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            cones: SmallVec::new(),
            trajectory: None,
            is_active: true,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn movement_speed(&self) -> f64 {
        self.movement_speed
    }

    pub fn cones(&self) -> &[Cone] {
        &self.cones
    }

    pub fn cone(&self, id: ConeId) -> Option<&Cone> {
        self.cones.iter().find(|c| c.id == id)
    }

    pub fn cone_mut(&mut self, id: ConeId) -> Option<&mut Cone> {
        self.cones.iter_mut().find(|c| c.id == id)
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    pub fn trajectory_mut(&mut self) -> Option<&mut Trajectory> {
        self.trajectory.as_mut()
    }

    pub fn transform(&self) -> DMat4 {
        DMat4::from_translation(self.position)
    }

    /// Attach a movement path, replacing any previous one.
    pub fn attach_trajectory(&mut self, points: Vec<Point3>) -> Result<(), PathError> {
        let path = SplinePath::new(points)?;
        log::info!(
            "[object {}] trajectory attached ({} points, closed={})",
            self.id.0,
            path.len(),
            path.is_closed()
        );
        self.trajectory = Some(Trajectory::new(self.id, path, self.movement_speed));
        Ok(())
    }

    pub fn detach_trajectory(&mut self) -> Option<Trajectory> {
        self.trajectory.take()
    }

    pub fn set_movement_speed(&mut self, speed: f64) {
        self.movement_speed = speed;
        if let Some(trajectory) = &mut self.trajectory {
            trajectory.state.set_speed(speed, &trajectory.path);
        }
    }

    pub fn set_volume(&mut self, audio: &mut dyn AudioLayer, volume: f64) {
        self.volume = volume;
        if let Some(source) = self.sound.source() {
            audio.set_volume(source, volume);
        }
    }

    pub fn add_cone(&mut self, cone: Cone) {
        self.cones.push(cone);
    }

    pub fn remove_cone(&mut self, audio: &mut dyn AudioLayer, id: ConeId) -> Result<Cone, SceneError> {
        let index = self
            .cones
            .iter()
            .position(|c| c.id == id)
            .ok_or(SceneError::UnknownCone(id))?;
        let mut cone = self.cones.remove(index);
        cone.sound.release(audio);
        Ok(cone)
    }

    /// Move the object; its trajectory travels with it.
    pub fn move_to(&mut self, audio: &mut dyn AudioLayer, position: Point3) {
        let delta = position - self.position;
        self.position = position;
        if let Some(trajectory) = &mut self.trajectory {
            trajectory.translate(delta);
        }
        self.sync_audio(audio);
    }

    /// Push the object and cone transforms to their sources.
    pub fn sync_audio(&self, audio: &mut dyn AudioLayer) {
        let transform = self.transform();
        if let Some(source) = self.sound.source() {
            sync_emitter(audio, source, SourceKind::Omni, &transform);
        }
        for cone in &self.cones {
            if let Some(source) = cone.sound.source() {
                sync_emitter(
                    audio,
                    source,
                    SourceKind::Directional,
                    &cone.world_transform(self.position),
                );
            }
        }
    }

    /// Recompute mute-stage gains for the object sound and every cone.
    pub fn push_gains(&self, audio: &mut dyn AudioLayer, mixer: &MixerState) {
        if let Some(source) = self.sound.source() {
            audio.set_gain(source, mixer.gain_for(&self.mute));
        }
        for cone in &self.cones {
            if let Some(source) = cone.sound.source() {
                let local = self.mute.is_muted || cone.mute.is_muted;
                audio.set_gain(source, effective_gain(mixer.global_mute, local));
            }
        }
    }

    /// Advance along the trajectory (if any and if allowed to move) and
    /// resync audio. Returns the new position when the object moved.
    pub fn tick(&mut self, audio: &mut dyn AudioLayer, mixer: &MixerState) -> Option<Point3> {
        if !self.mute.can_move(mixer) {
            return None;
        }
        let trajectory = self.trajectory.as_mut()?;
        let position = trajectory.state.tick(&trajectory.path);
        self.position = position;
        self.sync_audio(audio);
        Some(position)
    }

    /// Stop and disconnect every audio node owned by the object.
    pub fn release_audio(&mut self, audio: &mut dyn AudioLayer) {
        self.sound.release(audio);
        for cone in &mut self.cones {
            cone.sound.release(audio);
        }
    }
}

impl Editable for SoundObject {
    fn hit_test(&self, ray: &Ray) -> Option<(f64, Pick)> {
        let body = ray_sphere(ray.origin, ray.dir, self.position, PICK_OBJECT_RADIUS)
            .map(|t| (t, Pick::Object(self.id)));
        let path = self.trajectory.as_ref().and_then(|t| t.hit_test(ray));
        match (body, path) {
            (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    fn translate(&mut self, delta: DVec3) {
        self.position += delta;
        if let Some(trajectory) = &mut self.trajectory {
            trajectory.translate(delta);
        }
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
        if let Some(trajectory) = &mut self.trajectory {
            trajectory.set_active(active);
        }
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
