#![cfg(target_arch = "wasm32")]
use audioscape_core::draw::PathDrawSession;
use audioscape_core::persist::PendingSound;
use audioscape_core::pick::{PathHit, Pick, Ray};
use audioscape_core::{
    ConeId, Created, DecodeError, DeleteOutcome, LoadTicket, ObjectId, Point3, Scene, SceneItem,
    SoundTarget, ZoneId,
};
use glam::{DMat4, DVec3};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

mod audio;

use audio::WebAudioLayer;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("audioscape-web starting");
    Ok(())
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

struct EditorState {
    scene: Scene,
    audio: WebAudioLayer,
    listener: DMat4,
    camera: Option<serde_json::Value>,
    pending: Vec<PendingSound>,
    draw: Option<PathDrawSession>,
    selection: Option<SceneItem>,
    selected_point: Option<usize>,
}

/// Browser handle on a scene and its WebAudio graph.
#[wasm_bindgen]
pub struct Editor {
    state: Rc<RefCell<EditorState>>,
}

fn create_context() -> anyhow::Result<web::AudioContext> {
    web::AudioContext::new().map_err(|e| anyhow::anyhow!("AudioContext error: {:?}", e))
}

async fn decode(ctx: web::AudioContext, bytes: js_sys::ArrayBuffer) -> Result<web::AudioBuffer, JsValue> {
    let promise = ctx.decode_audio_data(&bytes)?;
    JsFuture::from(promise).await?.dyn_into::<web::AudioBuffer>()
}

/// Decode off the frame loop and hand the result back to the scene. A stale
/// ticket is dropped by the core.
fn spawn_decode(
    state: Rc<RefCell<EditorState>>,
    target: SoundTarget,
    ticket: LoadTicket,
    bytes: js_sys::ArrayBuffer,
) {
    let ctx = state.borrow().audio.context().clone();
    spawn_local(async move {
        let decoded = decode(ctx, bytes).await;
        let mut guard = state.borrow_mut();
        let st = &mut *guard;
        let decoded = match decoded {
            Ok(buffer) => Ok(st.audio.register_buffer(buffer)),
            Err(e) => Err(DecodeError {
                filename: ticket.filename.clone(),
                reason: format!("{:?}", e),
            }),
        };
        match st.scene.finish_sound_load(&mut st.audio, target, ticket, decoded) {
            Ok(outcome) => log::info!("[sound] {:?}: {:?}", target, outcome),
            Err(e) => log::error!("[sound] {:?}: {}", target, e),
        }
    });
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Editor, JsValue> {
        let ctx = create_context().map_err(js_err)?;
        Ok(Editor {
            state: Rc::new(RefCell::new(EditorState {
                scene: Scene::new(),
                audio: WebAudioLayer::new(ctx),
                listener: DMat4::IDENTITY,
                camera: None,
                pending: Vec::new(),
                draw: None,
                selection: None,
                selected_point: None,
            })),
        })
    }

    /// Drive the scene from requestAnimationFrame.
    pub fn start_loop(&self) -> Result<(), JsValue> {
        let state = self.state.clone();
        let mut last_report = Instant::now();
        let mut frames = 0u32;
        let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let tick_clone = tick.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            {
                let mut guard = state.borrow_mut();
                let st = &mut *guard;
                let listener = st.listener;
                if let Err(e) = st.scene.tick(&mut st.audio, Some(&listener)) {
                    log::error!("[frame] tick error: {}", e);
                }
            }
            frames += 1;
            let elapsed = last_report.elapsed();
            if elapsed.as_secs() >= 10 {
                log::debug!(
                    "[frame] {:.1} fps",
                    frames as f64 / elapsed.as_secs_f64()
                );
                frames = 0;
                last_report = Instant::now();
            }
            if let Some(w) = web::window() {
                if let Some(closure) = tick_clone.borrow().as_ref() {
                    let _ = w.request_animation_frame(closure.as_ref().unchecked_ref());
                }
            }
        }) as Box<dyn FnMut()>));

        let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
        if let Some(closure) = tick.borrow().as_ref() {
            window.request_animation_frame(closure.as_ref().unchecked_ref())?;
        }
        Ok(())
    }

    /// Browsers keep an AudioContext suspended until a user gesture.
    pub fn resume_audio(&self) -> Result<(), JsValue> {
        let _ = self.state.borrow().audio.context().resume()?;
        Ok(())
    }

    /// Listener (camera) world transform, 16 values in column-major order.
    pub fn set_listener_matrix(&self, cols: Vec<f64>) -> Result<(), JsValue> {
        let cols: [f64; 16] = cols
            .try_into()
            .map_err(|_| JsValue::from_str("listener matrix needs 16 values"))?;
        self.state.borrow_mut().listener = DMat4::from_cols_array(&cols);
        Ok(())
    }

    pub fn add_object(&self, x: f64, y: f64, z: f64) -> u32 {
        self.state.borrow_mut().scene.add_object(Point3::new(x, y, z)).0
    }

    pub fn add_cone(&self, object: u32) -> Result<u32, JsValue> {
        let mut st = self.state.borrow_mut();
        st.scene.add_cone(ObjectId(object)).map(|c| c.0).map_err(js_err)
    }

    /// Cone angles in radians, as stored in scene files.
    pub fn set_cone(
        &self,
        object: u32,
        cone: u32,
        longitude: f64,
        latitude: f64,
        volume: f64,
        spread: f64,
    ) -> Result<(), JsValue> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        st.scene
            .update_cone(&mut st.audio, ObjectId(object), ConeId(cone), |c| {
                c.set_angles(longitude, latitude);
                c.set_volume(volume);
                c.set_spread(spread);
            })
            .map_err(js_err)
    }

    pub fn set_movement_speed(&self, object: u32, speed: f64) -> Result<(), JsValue> {
        let mut st = self.state.borrow_mut();
        st.scene.set_movement_speed(ObjectId(object), speed).map_err(js_err)
    }

    pub fn load_object_sound(&self, object: u32, filename: String, bytes: js_sys::ArrayBuffer) -> Result<(), JsValue> {
        self.load(SoundTarget::Object(ObjectId(object)), filename, bytes)
    }

    pub fn load_cone_sound(
        &self,
        object: u32,
        cone: u32,
        filename: String,
        bytes: js_sys::ArrayBuffer,
    ) -> Result<(), JsValue> {
        self.load(SoundTarget::Cone(ObjectId(object), ConeId(cone)), filename, bytes)
    }

    pub fn load_zone_sound(&self, zone: u32, filename: String, bytes: js_sys::ArrayBuffer) -> Result<(), JsValue> {
        self.load(SoundTarget::Zone(ZoneId(zone)), filename, bytes)
    }

    /// Supply the bytes for a file requested by [`Editor::import_json`].
    pub fn provide_sound(&self, filename: String, bytes: js_sys::ArrayBuffer) {
        let waiting: Vec<PendingSound> = {
            let mut st = self.state.borrow_mut();
            let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut st.pending)
                .into_iter()
                .partition(|p| p.ticket.filename == filename);
            st.pending = rest;
            matching
        };
        if waiting.is_empty() {
            log::warn!("[sound] nothing waiting for {}", filename);
        }
        for sound in waiting {
            // Decoding detaches the buffer, so each request gets its own copy.
            spawn_decode(self.state.clone(), sound.target, sound.ticket, bytes.slice(0));
        }
    }

    pub fn begin_draw(&self, x: f64, y: f64, z: f64, parent: Option<u32>) {
        let mut st = self.state.borrow_mut();
        st.draw = Some(PathDrawSession::begin(Point3::new(x, y, z), parent.map(ObjectId)));
        st.scene.pause_all_except(parent.map(ObjectId));
    }

    pub fn draw_to(&self, x: f64, y: f64, z: f64) {
        if let Some(session) = self.state.borrow_mut().draw.as_mut() {
            session.add_point(Point3::new(x, y, z));
        }
    }

    /// Finish the gesture. Returns the id of the created object or zone, or
    /// the parent id when a trajectory was attached.
    pub fn end_draw(&self) -> Result<Option<u32>, JsValue> {
        let mut st = self.state.borrow_mut();
        st.scene.resume_all();
        let Some(session) = st.draw.take() else {
            return Ok(None);
        };
        let created = st.scene.apply_draw(session.finish()).map_err(js_err)?;
        Ok(match created {
            Created::Object(id) | Created::Trajectory(id) => Some(id.0),
            Created::Zone(id) => Some(id.0),
            Created::Nothing => None,
        })
    }

    /// Pick under a world-space ray and make the hit the selection. Clicking
    /// a curve inserts a control point there.
    pub fn select(&self, ox: f64, oy: f64, oz: f64, dx: f64, dy: f64, dz: f64) -> Result<bool, JsValue> {
        let mut st = self.state.borrow_mut();
        let ray = Ray::new(DVec3::new(ox, oy, oz), DVec3::new(dx, dy, dz));
        let Some(pick) = st.scene.pick(&ray) else {
            st.selection = None;
            st.selected_point = None;
            st.scene.set_active(None);
            return Ok(false);
        };
        let item = SceneItem::from(pick);
        let point = match pick {
            Pick::Trajectory(_, PathHit::ControlPoint(i)) | Pick::Zone(_, PathHit::ControlPoint(i)) => Some(i),
            Pick::Trajectory(_, PathHit::Curve(at)) | Pick::Zone(_, PathHit::Curve(at)) => {
                Some(st.scene.insert_path_point(item, at).map_err(js_err)?)
            }
            Pick::Object(_) | Pick::ZoneArea(_) => None,
        };
        st.selected_point = point;
        st.selection = Some(item);
        st.scene.set_active(Some(item));
        Ok(true)
    }

    pub fn move_selected_point(&self, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        let mut st = self.state.borrow_mut();
        let (Some(item), Some(index)) = (st.selection, st.selected_point) else {
            return Ok(());
        };
        st.scene
            .move_path_point(item, index, Point3::new(x, y, z))
            .map_err(js_err)
    }

    pub fn translate_selected(&self, dx: f64, dy: f64, dz: f64) -> Result<(), JsValue> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let Some(item) = st.selection else {
            return Ok(());
        };
        st.scene
            .translate_item(&mut st.audio, item, DVec3::new(dx, dy, dz))
            .map_err(js_err)
    }

    pub fn delete_selected(&self) -> Result<(), JsValue> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let Some(item) = st.selection else {
            return Ok(());
        };
        let outcome = st
            .scene
            .delete_selection(&mut st.audio, item, st.selected_point)
            .map_err(js_err)?;
        log::info!("[edit] delete {:?}: {:?}", item, outcome);
        st.selected_point = None;
        if !matches!(outcome, DeleteOutcome::PointRemoved | DeleteOutcome::Refused) {
            st.selection = None;
        }
        Ok(())
    }

    pub fn toggle_mute(&self) -> bool {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        st.scene.toggle_global_mute(&mut st.audio)
    }

    pub fn set_object_muted(&self, object: u32, muted: bool) -> Result<(), JsValue> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        st.scene
            .set_object_muted(&mut st.audio, ObjectId(object), muted)
            .map_err(js_err)
    }

    pub fn set_zone_muted(&self, zone: u32, muted: bool) -> Result<(), JsValue> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        st.scene
            .set_zone_muted(&mut st.audio, ZoneId(zone), muted)
            .map_err(js_err)
    }

    /// Mute everything except the selection (solo).
    pub fn solo_selected(&self) {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let except: Vec<SceneItem> = st.selection.into_iter().collect();
        st.scene.mute_all(&mut st.audio, &except);
    }

    pub fn unmute_all(&self) {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        st.scene.unmute_all(&mut st.audio, &[]);
    }

    /// Replace the scene with a saved one. Returns the sound files to pass
    /// to [`Editor::provide_sound`].
    pub fn import_json(&self, text: &str) -> Result<js_sys::Array, JsValue> {
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let (pending, camera) = st
            .scene
            .replace_from_json(&mut st.audio, text)
            .map_err(js_err)?;
        st.selection = None;
        st.selected_point = None;
        st.draw = None;
        let files = js_sys::Array::new();
        for sound in &pending {
            files.push(&JsValue::from_str(&sound.ticket.filename));
        }
        st.pending = pending;
        st.camera = camera;
        Ok(files)
    }

    pub fn export_json(&self) -> Result<String, JsValue> {
        let st = self.state.borrow();
        st.scene.export_json(st.camera.clone()).map_err(js_err)
    }

    /// Camera state from the last import, as JSON.
    pub fn camera_json(&self) -> Option<String> {
        self.state.borrow().camera.as_ref().map(|c| c.to_string())
    }

    pub fn set_camera_json(&self, text: &str) -> Result<(), JsValue> {
        let camera = serde_json::from_str(text).map_err(js_err)?;
        self.state.borrow_mut().camera = Some(camera);
        Ok(())
    }
}

impl Editor {
    fn load(&self, target: SoundTarget, filename: String, bytes: js_sys::ArrayBuffer) -> Result<(), JsValue> {
        let ticket = self
            .state
            .borrow_mut()
            .scene
            .begin_sound_load(target, filename)
            .map_err(js_err)?;
        spawn_decode(self.state.clone(), target, ticket, bytes);
        Ok(())
    }
}
