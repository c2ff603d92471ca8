//! Mute and pause flags and the gain they resolve to.

/// Per-emitter flags. `is_paused` only freezes trajectory movement; it never
/// changes gain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MuteState {
    pub is_muted: bool,
    pub is_paused: bool,
}

impl MuteState {
    pub fn toggle_mute(&mut self) {
        self.is_muted = !self.is_muted;
    }

    /// Whether a trajectory may advance this tick.
    #[inline]
    pub fn can_move(&self, mixer: &MixerState) -> bool {
        !self.is_paused && !self.is_muted && !mixer.global_mute
    }
}

/// Process-wide mixer flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MixerState {
    pub global_mute: bool,
}

impl MixerState {
    pub fn toggle_global_mute(&mut self) {
        self.global_mute = !self.global_mute;
    }

    pub fn gain_for(&self, state: &MuteState) -> f64 {
        effective_gain(self.global_mute, state.is_muted)
    }
}

/// 0 when either the global or the local mute is set, otherwise 1.
#[inline]
pub fn effective_gain(global_mute: bool, local_mute: bool) -> f64 {
    if global_mute || local_mute {
        0.0
    } else {
        1.0
    }
}
