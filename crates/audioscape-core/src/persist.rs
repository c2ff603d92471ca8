//! JSON scene documents.
//!
//! The editor writes each sound object and zone as a JSON string embedded in
//! the top-level arrays. Reading accepts those strings or plain objects.
//! Cone angles are stored in radians.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::audio::{AudioLayer, LoadTicket};
use crate::constants::MAX_IMPORTED_ANGLE;
use crate::emitter::Cone;
use crate::error::SceneError;
use crate::geometry::Point3;
use crate::object::SoundObject;
use crate::scene::{ObjectId, Scene, SoundTarget, ZoneId};
use crate::zone::SoundZone;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct XyzJson {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Point3> for XyzJson {
    fn from(p: Point3) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<XyzJson> for Point3 {
    fn from(p: XyzJson) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLongJson {
    pub lat: f64,
    pub long: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConeJson {
    pub filename: Option<String>,
    pub position: LatLongJson,
    pub volume: f64,
    pub spread: f64,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundObjectJson {
    pub filename: Option<String>,
    pub volume: f64,
    pub position: XyzJson,
    pub movement_speed: f64,
    pub trajectory: Option<Vec<XyzJson>>,
    #[serde(default)]
    pub cones: Vec<ConeJson>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoundZoneJson {
    pub position: XyzJson,
    pub points: Vec<XyzJson>,
    pub filename: Option<String>,
}

/// A value written as an embedded JSON string.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedded<T>(pub T);

impl<T: Serialize> Serialize for Embedded<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = serde_json::to_string(&self.0).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Embedded<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let inner = match Value::deserialize(deserializer)? {
            Value::String(text) => serde_json::from_str(&text),
            other => serde_json::from_value(other),
        }
        .map_err(serde::de::Error::custom)?;
        Ok(Embedded(inner))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    /// Camera state owned by the renderer; carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<Value>,
    #[serde(default)]
    pub sound_objects: Vec<Embedded<SoundObjectJson>>,
    #[serde(default)]
    pub sound_zones: Vec<Embedded<SoundZoneJson>>,
}

impl SceneDocument {
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A sound file the front-end must fetch and decode after an import.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSound {
    pub target: SoundTarget,
    pub ticket: LoadTicket,
}

fn points_to_json(points: &[Point3]) -> Vec<XyzJson> {
    points.iter().copied().map(XyzJson::from).collect()
}

fn points_from_json(points: &[XyzJson]) -> Vec<Point3> {
    points.iter().copied().map(Point3::from).collect()
}

impl SoundObjectJson {
    pub fn from_object(object: &SoundObject) -> Self {
        Self {
            filename: object.filename.clone(),
            volume: object.volume(),
            position: object.position().into(),
            movement_speed: object.movement_speed(),
            trajectory: object.trajectory().map(|t| points_to_json(t.path().points())),
            cones: object
                .cones()
                .iter()
                .map(|c| ConeJson {
                    filename: c.filename.clone(),
                    position: LatLongJson {
                        lat: c.latitude(),
                        long: c.longitude(),
                    },
                    volume: c.volume(),
                    spread: c.spread(),
                    color: c.color.clone(),
                })
                .collect(),
        }
    }
}

impl SoundZoneJson {
    pub fn from_zone(zone: &SoundZone) -> Self {
        Self {
            position: zone.position().into(),
            points: points_to_json(zone.path().points()),
            filename: zone.filename.clone(),
        }
    }
}

fn checked_angle(angle: f64) -> Result<f64, SceneError> {
    if angle.is_finite() && angle.abs() <= MAX_IMPORTED_ANGLE {
        Ok(angle)
    } else {
        Err(SceneError::InvalidAngle(angle))
    }
}

impl Scene {
    pub fn export_document(&self, camera: Option<Value>) -> SceneDocument {
        SceneDocument {
            camera,
            sound_objects: self
                .objects()
                .iter()
                .map(|o| Embedded(SoundObjectJson::from_object(o)))
                .collect(),
            sound_zones: self
                .zones()
                .iter()
                .map(|z| Embedded(SoundZoneJson::from_zone(z)))
                .collect(),
        }
    }

    pub fn export_json(&self, camera: Option<Value>) -> Result<String, SceneError> {
        self.export_document(camera).to_json()
    }

    /// Add the document's objects and zones to the scene.
    ///
    /// Everything is validated before the scene is touched, so a bad path
    /// or cone angle leaves the scene unchanged. Returns the sounds to fetch; each carries
    /// a ticket for [`Scene::finish_sound_load`].
    pub fn import_document(&mut self, document: &SceneDocument) -> Result<Vec<PendingSound>, SceneError> {
        let mut objects = Vec::with_capacity(document.sound_objects.len());
        for Embedded(json) in &document.sound_objects {
            let id = ObjectId(self.allocate());
            let mut object = SoundObject::new(id, json.position.into()).with_volume(json.volume);
            object.set_movement_speed(json.movement_speed);
            if let Some(points) = &json.trajectory {
                object.attach_trajectory(points_from_json(points))?;
            }
            for cone_json in &json.cones {
                let mut cone = Cone::with_params(
                    self.next_cone_id(),
                    checked_angle(cone_json.position.long)?,
                    checked_angle(cone_json.position.lat)?,
                    cone_json.volume,
                    cone_json.spread,
                    cone_json.color.clone(),
                );
                cone.filename = cone_json.filename.clone();
                object.add_cone(cone);
            }
            object.filename = json.filename.clone();
            objects.push(object);
        }

        let mut zones = Vec::with_capacity(document.sound_zones.len());
        for Embedded(json) in &document.sound_zones {
            let mut zone = SoundZone::new(ZoneId(self.allocate()), points_from_json(&json.points))?;
            zone.filename = json.filename.clone();
            zones.push(zone);
        }

        let mut requests = Vec::new();
        for object in objects {
            if let Some(filename) = &object.filename {
                requests.push((SoundTarget::Object(object.id), filename.clone()));
            }
            for cone in object.cones() {
                if let Some(filename) = &cone.filename {
                    requests.push((SoundTarget::Cone(object.id, cone.id), filename.clone()));
                }
            }
            self.insert_object(object);
        }
        for zone in zones {
            if let Some(filename) = &zone.filename {
                requests.push((SoundTarget::Zone(zone.id), filename.clone()));
            }
            self.insert_zone(zone);
        }
        let pending = requests
            .into_iter()
            .map(|(target, filename)| {
                self.begin_sound_load(target, filename)
                    .map(|ticket| PendingSound { target, ticket })
            })
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[scene] imported {} objects, {} zones, {} sounds pending",
            document.sound_objects.len(),
            document.sound_zones.len(),
            pending.len()
        );
        Ok(pending)
    }

    pub fn import_json(&mut self, text: &str) -> Result<(Vec<PendingSound>, Option<Value>), SceneError> {
        let document = SceneDocument::from_json(text)?;
        let pending = self.import_document(&document)?;
        Ok((pending, document.camera))
    }

    /// Replace the whole scene with a saved one. The current scene and its
    /// audio nodes are only released once the new document has imported.
    pub fn replace_from_json(
        &mut self,
        audio: &mut dyn AudioLayer,
        text: &str,
    ) -> Result<(Vec<PendingSound>, Option<Value>), SceneError> {
        let mut incoming = self.empty_like();
        let imported = incoming.import_json(text)?;
        self.clear(audio);
        *self = incoming;
        Ok(imported)
    }
}
