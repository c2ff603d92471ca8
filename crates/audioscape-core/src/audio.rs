//! Boundary to the audio-positioning layer.
//!
//! The core never touches an audio API directly. Front-ends implement
//! [`AudioLayer`] (WebAudio in the browser, a recorder in tests and the native
//! driver) and the core pushes positions, orientations and gains through it.
//! Decoding is asynchronous on the platform side; [`SoundSlot`] guards the
//! attachment so a slow decode cannot overwrite a newer choice of file.

use fnv::FnvHashMap;
use glam::DVec3;

use crate::emitter::ConeShape;
use crate::error::{AudioError, DecodeError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// How a source is wired: panned omnidirectionally, panned with a cone, or
/// not panned at all (zone ambience).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Omni,
    Directional,
    Ambient,
}

/// Operations the core needs from the platform audio graph. A source is a
/// looping buffer player feeding a volume stage, a mute stage and (unless
/// ambient) a panner.
pub trait AudioLayer {
    fn create_positional_source(&mut self, kind: SourceKind) -> Result<SourceId, AudioError>;
    fn set_position(&mut self, source: SourceId, position: DVec3);
    fn set_orientation(&mut self, source: SourceId, forward: DVec3);
    fn set_cone(&mut self, source: SourceId, shape: &ConeShape);
    /// User volume stage.
    fn set_volume(&mut self, source: SourceId, volume: f64);
    /// Mute stage, 0 or 1.
    fn set_gain(&mut self, source: SourceId, gain: f64);
    fn start(&mut self, source: SourceId, buffer: BufferId) -> Result<(), AudioError>;
    fn stop(&mut self, source: SourceId);
    /// Stop and disconnect the source; its id is not used again.
    fn release(&mut self, source: SourceId);
    fn set_listener(&mut self, position: DVec3, forward: DVec3, up: DVec3);
}

/// Proof that a decode was requested for the current generation of a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    pub filename: String,
}

#[derive(Debug, PartialEq)]
pub enum LoadOutcome {
    /// The buffer is attached. `created` is true when the source node was
    /// created by this attachment and still needs configuring.
    Attached { source: SourceId, created: bool },
    /// A newer load was requested after this ticket was issued.
    Stale,
    /// Decoding failed; any previous sound is untouched.
    Failed(DecodeError),
}

/// The sound attached to an emitter or zone.
#[derive(Clone, Debug, Default)]
pub struct SoundSlot {
    source: Option<SourceId>,
    buffer: Option<BufferId>,
    filename: Option<String>,
    generation: u64,
}

impl SoundSlot {
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer
    }

    /// File of the currently attached buffer.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    /// Start a new load. Every earlier ticket becomes stale.
    pub fn begin_load(&mut self, filename: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
            filename: filename.into(),
        }
    }

    /// Resolve a decode started with [`SoundSlot::begin_load`].
    pub fn finish_load(
        &mut self,
        audio: &mut dyn AudioLayer,
        ticket: LoadTicket,
        decoded: Result<BufferId, DecodeError>,
        kind: SourceKind,
    ) -> Result<LoadOutcome, AudioError> {
        if ticket.generation != self.generation {
            log::warn!(
                "[sound] dropping stale decode of {} (generation {} < {})",
                ticket.filename,
                ticket.generation,
                self.generation
            );
            return Ok(LoadOutcome::Stale);
        }
        let buffer = match decoded {
            Ok(buffer) => buffer,
            Err(e) => {
                log::error!("[sound] {}", e);
                return Ok(LoadOutcome::Failed(e));
            }
        };

        let (source, created) = match self.source {
            Some(source) => (source, false),
            None => (audio.create_positional_source(kind)?, true),
        };
        if self.buffer.is_some() {
            audio.stop(source);
        }
        self.source = Some(source);
        self.buffer = Some(buffer);
        log::info!("[sound] attached {} to source {}", ticket.filename, source.0);
        self.filename = Some(ticket.filename);
        Ok(LoadOutcome::Attached { source, created })
    }

    /// Start looping the attached buffer, if any.
    pub fn play(&self, audio: &mut dyn AudioLayer) -> Result<(), AudioError> {
        match (self.source, self.buffer) {
            (Some(source), Some(buffer)) => audio.start(source, buffer),
            _ => Ok(()),
        }
    }

    pub fn stop(&self, audio: &mut dyn AudioLayer) {
        if let (Some(source), Some(_)) = (self.source, self.buffer) {
            audio.stop(source);
        }
    }

    /// Tear down the audio node. Pending loads become stale.
    pub fn release(&mut self, audio: &mut dyn AudioLayer) {
        self.generation += 1;
        if let Some(source) = self.source.take() {
            audio.release(source);
        }
        self.buffer = None;
        self.filename = None;
    }
}

/// One recorded call on [`RecordingAudio`].
#[derive(Clone, Debug, PartialEq)]
pub enum AudioCall {
    Create(SourceId, SourceKind),
    Position(SourceId, DVec3),
    Orientation(SourceId, DVec3),
    Cone(SourceId, ConeShape),
    Volume(SourceId, f64),
    Gain(SourceId, f64),
    Start(SourceId, BufferId),
    Stop(SourceId),
    Release(SourceId),
    Listener(DVec3, DVec3, DVec3),
}

/// Audio layer that records every call. Used by tests and the headless
/// native driver.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub calls: Vec<AudioCall>,
    next_source: u32,
    next_buffer: u32,
    positions: FnvHashMap<SourceId, DVec3>,
    orientations: FnvHashMap<SourceId, DVec3>,
    gains: FnvHashMap<SourceId, f64>,
    playing: FnvHashMap<SourceId, bool>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stand-in for a successful platform decode.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<BufferId, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError {
                filename: String::new(),
                reason: "empty buffer".into(),
            });
        }
        self.next_buffer += 1;
        Ok(BufferId(self.next_buffer))
    }

    pub fn position(&self, source: SourceId) -> Option<DVec3> {
        self.positions.get(&source).copied()
    }

    pub fn orientation(&self, source: SourceId) -> Option<DVec3> {
        self.orientations.get(&source).copied()
    }

    pub fn gain(&self, source: SourceId) -> Option<f64> {
        self.gains.get(&source).copied()
    }

    pub fn is_playing(&self, source: SourceId) -> bool {
        self.playing.get(&source).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl AudioLayer for RecordingAudio {
    fn create_positional_source(&mut self, kind: SourceKind) -> Result<SourceId, AudioError> {
        self.next_source += 1;
        let id = SourceId(self.next_source);
        log::debug!("[audio] create {:?} source {}", kind, id.0);
        self.calls.push(AudioCall::Create(id, kind));
        Ok(id)
    }

    fn set_position(&mut self, source: SourceId, position: DVec3) {
        self.positions.insert(source, position);
        self.calls.push(AudioCall::Position(source, position));
    }

    fn set_orientation(&mut self, source: SourceId, forward: DVec3) {
        self.orientations.insert(source, forward);
        self.calls.push(AudioCall::Orientation(source, forward));
    }

    fn set_cone(&mut self, source: SourceId, shape: &ConeShape) {
        self.calls.push(AudioCall::Cone(source, *shape));
    }

    fn set_volume(&mut self, source: SourceId, volume: f64) {
        self.calls.push(AudioCall::Volume(source, volume));
    }

    fn set_gain(&mut self, source: SourceId, gain: f64) {
        log::debug!("[audio] source {} gain {}", source.0, gain);
        self.gains.insert(source, gain);
        self.calls.push(AudioCall::Gain(source, gain));
    }

    fn start(&mut self, source: SourceId, buffer: BufferId) -> Result<(), AudioError> {
        log::debug!("[audio] start source {} buffer {}", source.0, buffer.0);
        self.playing.insert(source, true);
        self.calls.push(AudioCall::Start(source, buffer));
        Ok(())
    }

    fn stop(&mut self, source: SourceId) {
        self.playing.insert(source, false);
        self.calls.push(AudioCall::Stop(source));
    }

    fn release(&mut self, source: SourceId) {
        self.playing.remove(&source);
        self.calls.push(AudioCall::Release(source));
    }

    fn set_listener(&mut self, position: DVec3, forward: DVec3, up: DVec3) {
        self.calls.push(AudioCall::Listener(position, forward, up));
    }
}
