use audioscape_core::constants::PANNER_REF_DISTANCE;
use audioscape_core::emitter::ConeShape;
use audioscape_core::{AudioError, AudioLayer, BufferId, SourceId, SourceKind};
use fnv::FnvHashMap;
use glam::DVec3;
use wasm_bindgen::JsValue;
use web_sys as web;

/// Nodes behind one core source:
/// player -> volume -> mute -> [panner] -> destination.
struct SourceNodes {
    player: Option<web::AudioBufferSourceNode>,
    volume: web::GainNode,
    mute: web::GainNode,
    panner: Option<web::PannerNode>,
}

impl SourceNodes {
    fn stop_player(&mut self) {
        if let Some(player) = self.player.take() {
            #[allow(deprecated)]
            let _ = player.stop();
            let _ = player.disconnect();
        }
    }
}

fn node_error(node: &'static str, e: JsValue) -> AudioError {
    log::error!("{} error: {:?}", node, e);
    AudioError::NodeCreation {
        node,
        reason: format!("{:?}", e),
    }
}

fn create_gain(ctx: &web::AudioContext, value: f32, label: &'static str) -> Result<web::GainNode, AudioError> {
    let gain = web::GainNode::new(ctx).map_err(|e| node_error(label, e))?;
    gain.gain().set_value(value);
    Ok(gain)
}

/// [`AudioLayer`] over a WebAudio context.
pub struct WebAudioLayer {
    ctx: web::AudioContext,
    sources: FnvHashMap<SourceId, SourceNodes>,
    buffers: FnvHashMap<BufferId, web::AudioBuffer>,
    next_source: u32,
    next_buffer: u32,
}

impl WebAudioLayer {
    pub fn new(ctx: web::AudioContext) -> Self {
        Self {
            ctx,
            sources: FnvHashMap::default(),
            buffers: FnvHashMap::default(),
            next_source: 0,
            next_buffer: 0,
        }
    }

    pub fn context(&self) -> &web::AudioContext {
        &self.ctx
    }

    /// Keep a decoded buffer and hand out its id.
    pub fn register_buffer(&mut self, buffer: web::AudioBuffer) -> BufferId {
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        log::info!(
            "[audio] buffer {} ({:.1}s, {} ch)",
            id.0,
            buffer.duration(),
            buffer.number_of_channels()
        );
        self.buffers.insert(id, buffer);
        id
    }

    fn panner(&self, source: SourceId) -> Option<&web::PannerNode> {
        self.sources.get(&source).and_then(|n| n.panner.as_ref())
    }
}

impl AudioLayer for WebAudioLayer {
    fn create_positional_source(&mut self, kind: SourceKind) -> Result<SourceId, AudioError> {
        let volume = create_gain(&self.ctx, 1.0, "volume GainNode")?;
        let mute = create_gain(&self.ctx, 1.0, "mute GainNode")?;
        let _ = volume.connect_with_audio_node(&mute);

        let panner = match kind {
            SourceKind::Ambient => {
                let _ = mute.connect_with_audio_node(&self.ctx.destination());
                None
            }
            SourceKind::Omni | SourceKind::Directional => {
                let panner = web::PannerNode::new(&self.ctx).map_err(|e| node_error("PannerNode", e))?;
                panner.set_panning_model(web::PanningModelType::Hrtf);
                panner.set_distance_model(web::DistanceModelType::Inverse);
                panner.set_ref_distance(PANNER_REF_DISTANCE);
                let _ = mute.connect_with_audio_node(&panner);
                let _ = panner.connect_with_audio_node(&self.ctx.destination());
                Some(panner)
            }
        };

        self.next_source += 1;
        let id = SourceId(self.next_source);
        log::debug!("[audio] created {:?} source {}", kind, id.0);
        self.sources.insert(
            id,
            SourceNodes {
                player: None,
                volume,
                mute,
                panner,
            },
        );
        Ok(id)
    }

    fn set_position(&mut self, source: SourceId, position: DVec3) {
        if let Some(panner) = self.panner(source) {
            panner.set_position(position.x, position.y, position.z);
        }
    }

    fn set_orientation(&mut self, source: SourceId, forward: DVec3) {
        if let Some(panner) = self.panner(source) {
            panner.set_orientation(forward.x, forward.y, forward.z);
        }
    }

    fn set_cone(&mut self, source: SourceId, shape: &ConeShape) {
        if let Some(panner) = self.panner(source) {
            panner.set_cone_inner_angle(shape.inner_angle_deg);
            panner.set_cone_outer_angle(shape.outer_angle_deg);
            panner.set_cone_outer_gain(shape.outer_gain);
        }
    }

    fn set_volume(&mut self, source: SourceId, volume: f64) {
        if let Some(nodes) = self.sources.get(&source) {
            nodes.volume.gain().set_value(volume as f32);
        }
    }

    fn set_gain(&mut self, source: SourceId, gain: f64) {
        if let Some(nodes) = self.sources.get(&source) {
            nodes.mute.gain().set_value(gain as f32);
        }
    }

    fn start(&mut self, source: SourceId, buffer: BufferId) -> Result<(), AudioError> {
        let audio_buffer = self
            .buffers
            .get(&buffer)
            .ok_or(AudioError::UnknownBuffer(buffer.0))?;
        let nodes = self
            .sources
            .get_mut(&source)
            .ok_or(AudioError::UnknownSource(source.0))?;
        nodes.stop_player();

        let player = self
            .ctx
            .create_buffer_source()
            .map_err(|e| node_error("AudioBufferSourceNode", e))?;
        player.set_buffer(Some(audio_buffer));
        player.set_loop(true);
        player
            .connect_with_audio_node(&nodes.volume)
            .map_err(|e| node_error("AudioBufferSourceNode", e))?;
        #[allow(deprecated)]
        player
            .start()
            .map_err(|e| node_error("AudioBufferSourceNode", e))?;
        nodes.player = Some(player);
        Ok(())
    }

    fn stop(&mut self, source: SourceId) {
        if let Some(nodes) = self.sources.get_mut(&source) {
            nodes.stop_player();
        }
    }

    fn release(&mut self, source: SourceId) {
        if let Some(mut nodes) = self.sources.remove(&source) {
            nodes.stop_player();
            let _ = nodes.volume.disconnect();
            let _ = nodes.mute.disconnect();
            if let Some(panner) = nodes.panner {
                let _ = panner.disconnect();
            }
            log::debug!("[audio] released source {}", source.0);
        }
    }

    fn set_listener(&mut self, position: DVec3, forward: DVec3, up: DVec3) {
        let listener = self.ctx.listener();
        listener.set_position(position.x, position.y, position.z);
        listener.set_orientation(forward.x, forward.y, forward.z, up.x, up.y, up.z);
    }
}
