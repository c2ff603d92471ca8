//! The editable scene: sound objects, their cones and trajectories, and
//! sound zones.
//!
//! The scene holds no audio handle of its own; operations that affect sound
//! take the platform [`AudioLayer`] as an argument so the front-end decides
//! ownership and threading.

use glam::{DMat4, DVec3};

use crate::audio::{AudioLayer, BufferId, LoadOutcome, LoadTicket, SourceKind};
use crate::constants::MIN_PATH_POINTS;
use crate::draw::DrawOutcome;
use crate::emitter::Cone;
use crate::error::{DecodeError, SceneError};
use crate::geometry::Point3;
use crate::mute::MixerState;
use crate::object::SoundObject;
use crate::pick::{Pick, Ray};
use crate::sync::sync_listener;
use crate::zone::SoundZone;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConeId(pub u32);

/// Capabilities shared by everything the user can select and drag.
pub trait Editable {
    /// Nearest hit along `ray`, if any.
    fn hit_test(&self, ray: &Ray) -> Option<(f64, Pick)>;
    fn translate(&mut self, delta: DVec3);
    fn set_active(&mut self, active: bool);
    fn is_active(&self) -> bool;
}

/// A selectable scene element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneItem {
    Object(ObjectId),
    Zone(ZoneId),
    Trajectory(ObjectId),
}

impl SceneItem {
    /// The sound object that owns this item, if it belongs to one.
    pub fn resolve_owning_object(self) -> Option<ObjectId> {
        match self {
            SceneItem::Object(id) | SceneItem::Trajectory(id) => Some(id),
            SceneItem::Zone(_) => None,
        }
    }
}

impl From<Pick> for SceneItem {
    fn from(pick: Pick) -> Self {
        match pick {
            Pick::Object(id) => SceneItem::Object(id),
            Pick::Trajectory(id, _) => SceneItem::Trajectory(id),
            Pick::Zone(id, _) | Pick::ZoneArea(id) => SceneItem::Zone(id),
        }
    }
}

/// Anything a sound file can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundTarget {
    Object(ObjectId),
    Cone(ObjectId, ConeId),
    Zone(ZoneId),
}

/// Result of the editor's delete action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    PointRemoved,
    /// The path is at its 3-point floor; nothing changed.
    Refused,
    ObjectRemoved,
    ZoneRemoved,
    TrajectoryRemoved,
}

/// What a finished draw gesture created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Created {
    Object(ObjectId),
    Zone(ZoneId),
    Trajectory(ObjectId),
    Nothing,
}

#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SoundObject>,
    zones: Vec<SoundZone>,
    mixer: MixerState,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[SoundObject] {
        &self.objects
    }

    pub fn zones(&self) -> &[SoundZone] {
        &self.zones
    }

    pub fn mixer(&self) -> MixerState {
        self.mixer
    }

    pub fn object(&self, id: ObjectId) -> Result<&SoundObject, SceneError> {
        self.objects
            .iter()
            .find(|o| o.id == id)
            .ok_or(SceneError::UnknownObject(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut SoundObject, SceneError> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(SceneError::UnknownObject(id))
    }

    pub fn zone(&self, id: ZoneId) -> Result<&SoundZone, SceneError> {
        self.zones
            .iter()
            .find(|z| z.id == id)
            .ok_or(SceneError::UnknownZone(id))
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Result<&mut SoundZone, SceneError> {
        self.zones
            .iter_mut()
            .find(|z| z.id == id)
            .ok_or(SceneError::UnknownZone(id))
    }

    pub(crate) fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_object(&mut self, position: Point3) -> ObjectId {
        let id = ObjectId(self.allocate());
        self.objects.push(SoundObject::new(id, position));
        log::info!(
            "[scene] object {} at ({:.1},{:.1},{:.1})",
            id.0,
            position.x,
            position.y,
            position.z
        );
        id
    }

    pub fn add_zone(&mut self, points: Vec<Point3>) -> Result<ZoneId, SceneError> {
        let id = ZoneId(self.allocate());
        self.zones.push(SoundZone::new(id, points)?);
        log::info!("[scene] zone {}", id.0);
        Ok(id)
    }

    pub fn add_cone(&mut self, object: ObjectId) -> Result<ConeId, SceneError> {
        let id = ConeId(self.allocate());
        self.object_mut(object)?.add_cone(Cone::new(id));
        Ok(id)
    }

    /// Turn a finished gesture into a scene element.
    pub fn apply_draw(&mut self, outcome: DrawOutcome) -> Result<Created, SceneError> {
        Ok(match outcome {
            DrawOutcome::Trajectory { parent, points } => {
                self.object_mut(parent)?.attach_trajectory(points)?;
                Created::Trajectory(parent)
            }
            DrawOutcome::Zone { points } => Created::Zone(self.add_zone(points)?),
            DrawOutcome::PointObject { position } => Created::Object(self.add_object(position)),
            DrawOutcome::Discarded => Created::Nothing,
        })
    }

    pub fn remove_object(&mut self, audio: &mut dyn AudioLayer, id: ObjectId) -> Result<(), SceneError> {
        let index = self
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(SceneError::UnknownObject(id))?;
        let mut object = self.objects.remove(index);
        object.release_audio(audio);
        log::info!("[scene] removed object {}", id.0);
        Ok(())
    }

    pub fn remove_zone(&mut self, audio: &mut dyn AudioLayer, id: ZoneId) -> Result<(), SceneError> {
        let index = self
            .zones
            .iter()
            .position(|z| z.id == id)
            .ok_or(SceneError::UnknownZone(id))?;
        let mut zone = self.zones.remove(index);
        zone.release_audio(audio);
        log::info!("[scene] removed zone {}", id.0);
        Ok(())
    }

    pub fn remove_cone(
        &mut self,
        audio: &mut dyn AudioLayer,
        object: ObjectId,
        cone: ConeId,
    ) -> Result<(), SceneError> {
        self.object_mut(object)?.remove_cone(audio, cone).map(|_| ())
    }

    pub fn set_movement_speed(&mut self, id: ObjectId, speed: f64) -> Result<(), SceneError> {
        self.object_mut(id)?.set_movement_speed(speed);
        Ok(())
    }

    /// Insert a control point on a trajectory or zone outline near `world`.
    pub fn insert_path_point(&mut self, item: SceneItem, world: Point3) -> Result<usize, SceneError> {
        match item {
            SceneItem::Trajectory(id) => {
                let trajectory = self
                    .object_mut(id)?
                    .trajectory_mut()
                    .ok_or(SceneError::NoTrajectory(id))?;
                Ok(trajectory.edit(|path| path.insert_point(world)))
            }
            SceneItem::Zone(id) => Ok(self.zone_mut(id)?.edit(|path| path.insert_point(world))),
            SceneItem::Object(id) => Err(SceneError::NoTrajectory(id)),
        }
    }

    pub fn move_path_point(
        &mut self,
        item: SceneItem,
        index: usize,
        position: Point3,
    ) -> Result<(), SceneError> {
        match item {
            SceneItem::Trajectory(id) => {
                let trajectory = self
                    .object_mut(id)?
                    .trajectory_mut()
                    .ok_or(SceneError::NoTrajectory(id))?;
                Ok(trajectory.edit(|path| path.move_point(index, position))?)
            }
            SceneItem::Zone(id) => Ok(self.zone_mut(id)?.edit(|path| path.move_point(index, position))?),
            SceneItem::Object(id) => Err(SceneError::NoTrajectory(id)),
        }
    }

    /// The editor's delete action on the current selection.
    ///
    /// A selected control point is removed while its path keeps more than 3
    /// points. A zone with nothing removable is deleted outright; a selected
    /// object is deleted along with its trajectory.
    pub fn delete_selection(
        &mut self,
        audio: &mut dyn AudioLayer,
        item: SceneItem,
        point: Option<usize>,
    ) -> Result<DeleteOutcome, SceneError> {
        match item {
            SceneItem::Trajectory(id) => {
                let object = self.object_mut(id)?;
                let Some(index) = point else {
                    object
                        .detach_trajectory()
                        .ok_or(SceneError::NoTrajectory(id))?;
                    return Ok(DeleteOutcome::TrajectoryRemoved);
                };
                let trajectory = object.trajectory_mut().ok_or(SceneError::NoTrajectory(id))?;
                let removed = trajectory.path().len() > MIN_PATH_POINTS
                    && trajectory.edit(|path| path.remove_point(index));
                Ok(if removed {
                    DeleteOutcome::PointRemoved
                } else {
                    DeleteOutcome::Refused
                })
            }
            SceneItem::Zone(id) => {
                let removed = match point {
                    Some(index) => {
                        let zone = self.zone_mut(id)?;
                        (zone.path().len() > MIN_PATH_POINTS)
                            .then(|| zone.edit(|path| path.remove_point(index)))
                    }
                    None => None,
                };
                match removed {
                    Some(true) => Ok(DeleteOutcome::PointRemoved),
                    Some(false) => Ok(DeleteOutcome::Refused),
                    None => {
                        self.remove_zone(audio, id)?;
                        Ok(DeleteOutcome::ZoneRemoved)
                    }
                }
            }
            SceneItem::Object(id) => {
                self.remove_object(audio, id)?;
                Ok(DeleteOutcome::ObjectRemoved)
            }
        }
    }

    /// Drag a whole item. Objects carry their trajectory along.
    pub fn translate_item(
        &mut self,
        audio: &mut dyn AudioLayer,
        item: SceneItem,
        delta: DVec3,
    ) -> Result<(), SceneError> {
        match item {
            SceneItem::Object(id) => {
                let object = self.object_mut(id)?;
                let target = object.position() + delta;
                object.move_to(audio, target);
            }
            SceneItem::Trajectory(id) => {
                self.object_mut(id)?
                    .trajectory_mut()
                    .ok_or(SceneError::NoTrajectory(id))?
                    .translate(delta);
            }
            SceneItem::Zone(id) => self.zone_mut(id)?.translate(delta),
        }
        Ok(())
    }

    /// Mark one item active and every other item inactive.
    pub fn set_active(&mut self, item: Option<SceneItem>) {
        let owner = item.and_then(SceneItem::resolve_owning_object);
        for object in &mut self.objects {
            object.set_active(owner == Some(object.id));
        }
        for zone in &mut self.zones {
            zone.set_active(item == Some(SceneItem::Zone(zone.id)));
        }
    }

    /// Nearest element under `ray`.
    pub fn pick(&self, ray: &Ray) -> Option<Pick> {
        self.objects
            .iter()
            .filter_map(|o| o.hit_test(ray))
            .chain(self.zones.iter().filter_map(|z| z.hit_test(ray)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, pick)| pick)
    }

    /// One animation frame: move objects along their trajectories, sync
    /// their audio, place the listener and update zone playback.
    pub fn tick(&mut self, audio: &mut dyn AudioLayer, listener: Option<&DMat4>) -> Result<(), SceneError> {
        let mixer = self.mixer;
        for object in &mut self.objects {
            object.tick(audio, &mixer);
        }
        if let Some(transform) = listener {
            sync_listener(audio, transform);
            let position = transform.w_axis.truncate();
            for zone in &mut self.zones {
                zone.update_occupancy(audio, &mixer, position)?;
            }
        }
        Ok(())
    }

    pub fn toggle_global_mute(&mut self, audio: &mut dyn AudioLayer) -> bool {
        self.mixer.toggle_global_mute();
        log::info!("[mixer] global mute {}", self.mixer.global_mute);
        self.push_all_gains(audio);
        self.mixer.global_mute
    }

    pub fn set_object_muted(
        &mut self,
        audio: &mut dyn AudioLayer,
        id: ObjectId,
        muted: bool,
    ) -> Result<(), SceneError> {
        let mixer = self.mixer;
        let object = self.object_mut(id)?;
        object.mute.is_muted = muted;
        object.push_gains(audio, &mixer);
        Ok(())
    }

    pub fn set_cone_muted(
        &mut self,
        audio: &mut dyn AudioLayer,
        id: ObjectId,
        cone: ConeId,
        muted: bool,
    ) -> Result<(), SceneError> {
        let mixer = self.mixer;
        let object = self.object_mut(id)?;
        object
            .cone_mut(cone)
            .ok_or(SceneError::UnknownCone(cone))?
            .mute
            .is_muted = muted;
        object.push_gains(audio, &mixer);
        Ok(())
    }

    pub fn set_zone_muted(
        &mut self,
        audio: &mut dyn AudioLayer,
        id: ZoneId,
        muted: bool,
    ) -> Result<(), SceneError> {
        let mixer = self.mixer;
        let zone = self.zone_mut(id)?;
        zone.mute.is_muted = muted;
        zone.push_gain(audio, &mixer);
        Ok(())
    }

    /// Mute every object and zone except those in `except`.
    pub fn mute_all(&mut self, audio: &mut dyn AudioLayer, except: &[SceneItem]) {
        self.set_all_muted(audio, except, true);
    }

    pub fn unmute_all(&mut self, audio: &mut dyn AudioLayer, except: &[SceneItem]) {
        self.set_all_muted(audio, except, false);
    }

    fn set_all_muted(&mut self, audio: &mut dyn AudioLayer, except: &[SceneItem], muted: bool) {
        for object in &mut self.objects {
            if !except.contains(&SceneItem::Object(object.id)) {
                object.mute.is_muted = muted;
            }
        }
        for zone in &mut self.zones {
            if !except.contains(&SceneItem::Zone(zone.id)) {
                zone.mute.is_muted = muted;
            }
        }
        self.push_all_gains(audio);
    }

    /// Freeze every trajectory but the one being edited.
    pub fn pause_all_except(&mut self, keep: Option<ObjectId>) {
        for object in &mut self.objects {
            object.mute.is_paused = Some(object.id) != keep;
        }
    }

    pub fn resume_all(&mut self) {
        for object in &mut self.objects {
            object.mute.is_paused = false;
        }
    }

    fn push_all_gains(&self, audio: &mut dyn AudioLayer) {
        for object in &self.objects {
            object.push_gains(audio, &self.mixer);
        }
        for zone in &self.zones {
            zone.push_gain(audio, &self.mixer);
        }
    }

    /// Request a new sound for `target`. Any decode still in flight for the
    /// same target becomes stale.
    pub fn begin_sound_load(
        &mut self,
        target: SoundTarget,
        filename: impl Into<String>,
    ) -> Result<LoadTicket, SceneError> {
        let filename = filename.into();
        let slot = match target {
            SoundTarget::Object(id) => &mut self.object_mut(id)?.sound,
            SoundTarget::Cone(id, cone) => {
                &mut self
                    .object_mut(id)?
                    .cone_mut(cone)
                    .ok_or(SceneError::UnknownCone(cone))?
                    .sound
            }
            SoundTarget::Zone(id) => &mut self.zone_mut(id)?.sound,
        };
        log::info!("[sound] loading {} for {:?}", filename, target);
        Ok(slot.begin_load(filename))
    }

    /// Deliver a decode result. On success the sound is wired up, positioned,
    /// gain-gated and (for objects and cones) started.
    pub fn finish_sound_load(
        &mut self,
        audio: &mut dyn AudioLayer,
        target: SoundTarget,
        ticket: LoadTicket,
        decoded: Result<BufferId, DecodeError>,
    ) -> Result<LoadOutcome, SceneError> {
        let mixer = self.mixer;
        match target {
            SoundTarget::Object(id) => {
                let object = self.object_mut(id)?;
                let filename = ticket.filename.clone();
                let outcome = object
                    .sound
                    .finish_load(audio, ticket, decoded, SourceKind::Omni)?;
                if let LoadOutcome::Attached { source, .. } = outcome {
                    object.filename = Some(filename);
                    audio.set_volume(source, object.volume());
                    object.push_gains(audio, &mixer);
                    object.sync_audio(audio);
                    object.sound.play(audio)?;
                }
                Ok(outcome)
            }
            SoundTarget::Cone(id, cone_id) => {
                let object = self.object_mut(id)?;
                let center = object.position();
                let cone = object.cone_mut(cone_id).ok_or(SceneError::UnknownCone(cone_id))?;
                let filename = ticket.filename.clone();
                let outcome = cone
                    .sound
                    .finish_load(audio, ticket, decoded, SourceKind::Directional)?;
                if let LoadOutcome::Attached { source, .. } = outcome {
                    cone.filename = Some(filename);
                    audio.set_cone(source, &cone.shape());
                    audio.set_volume(source, cone.volume());
                    crate::sync::sync_emitter(
                        audio,
                        source,
                        SourceKind::Directional,
                        &cone.world_transform(center),
                    );
                    cone.sound.play(audio)?;
                    object.push_gains(audio, &mixer);
                }
                Ok(outcome)
            }
            SoundTarget::Zone(id) => {
                let zone = self.zone_mut(id)?;
                let filename = ticket.filename.clone();
                let outcome = zone
                    .sound
                    .finish_load(audio, ticket, decoded, SourceKind::Ambient)?;
                if let LoadOutcome::Attached { source, .. } = outcome {
                    // The next occupancy check restarts the new sound.
                    zone.leave(audio);
                    zone.filename = Some(filename);
                    audio.set_volume(source, 0.0);
                    zone.push_gain(audio, &mixer);
                }
                Ok(outcome)
            }
        }
    }

    /// Update a cone's shape parameters and push them to its panner.
    pub fn update_cone(
        &mut self,
        audio: &mut dyn AudioLayer,
        id: ObjectId,
        cone_id: ConeId,
        f: impl FnOnce(&mut Cone),
    ) -> Result<(), SceneError> {
        let object = self.object_mut(id)?;
        let center = object.position();
        let cone = object.cone_mut(cone_id).ok_or(SceneError::UnknownCone(cone_id))?;
        f(cone);
        if let Some(source) = cone.sound.source() {
            audio.set_cone(source, &cone.shape());
            audio.set_volume(source, cone.volume());
            crate::sync::sync_emitter(
                audio,
                source,
                SourceKind::Directional,
                &cone.world_transform(center),
            );
        }
        Ok(())
    }

    /// Drop everything, releasing audio nodes.
    pub fn clear(&mut self, audio: &mut dyn AudioLayer) {
        for object in &mut self.objects {
            object.release_audio(audio);
        }
        for zone in &mut self.zones {
            zone.release_audio(audio);
        }
        self.objects.clear();
        self.zones.clear();
    }

    /// An empty scene sharing this one's mixer flags.
    pub(crate) fn empty_like(&self) -> Scene {
        Scene {
            mixer: self.mixer,
            ..Scene::default()
        }
    }

    pub(crate) fn insert_object(&mut self, object: SoundObject) {
        self.next_id = self.next_id.max(object.id.0);
        self.objects.push(object);
    }

    pub(crate) fn insert_zone(&mut self, zone: SoundZone) {
        self.next_id = self.next_id.max(zone.id.0);
        self.zones.push(zone);
    }

    pub(crate) fn next_cone_id(&mut self) -> ConeId {
        ConeId(self.allocate())
    }
}
