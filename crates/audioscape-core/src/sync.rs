//! Pushes emitter and listener transforms into the audio layer.

use glam::{DMat4, DVec3, DVec4};

use crate::audio::{AudioLayer, SourceId, SourceKind};
use crate::constants::{LISTENER_FORWARD, LISTENER_UP};

/// Reference forward axis of an emitter in its local space.
pub const EMITTER_FORWARD: DVec3 = DVec3::Z;

/// Copy of `transform` with the translation column zeroed.
#[inline]
pub fn without_translation(transform: &DMat4) -> DMat4 {
    let mut rotation_only = *transform;
    rotation_only.w_axis = DVec4::W;
    rotation_only
}

/// Direction of `axis` under `transform`, ignoring its translation.
///
/// The translation is removed before projecting; projecting through the full
/// transform would translate a direction vector.
pub fn oriented_axis(transform: &DMat4, axis: DVec3) -> DVec3 {
    without_translation(transform)
        .project_point3(axis)
        .normalize_or_zero()
}

/// Push world position (and, for directional sources, orientation).
/// `transform` is read only; the caller's copy is never altered.
pub fn sync_emitter(
    audio: &mut dyn AudioLayer,
    source: SourceId,
    kind: SourceKind,
    transform: &DMat4,
) {
    match kind {
        SourceKind::Ambient => {}
        SourceKind::Omni => {
            audio.set_position(source, transform.w_axis.truncate());
        }
        SourceKind::Directional => {
            audio.set_position(source, transform.w_axis.truncate());
            audio.set_orientation(source, oriented_axis(transform, EMITTER_FORWARD));
        }
    }
}

/// Place the listener at `transform`, facing its local -Z.
pub fn sync_listener(audio: &mut dyn AudioLayer, transform: &DMat4) {
    let position = transform.w_axis.truncate();
    let forward = oriented_axis(transform, DVec3::from_array(LISTENER_FORWARD));
    let up = oriented_axis(transform, DVec3::from_array(LISTENER_UP));
    audio.set_listener(position, forward, up);
}
