// Mute gating and pause behaviour.

use audioscape_core::mute::{effective_gain, MixerState, MuteState};
use audioscape_core::{RecordingAudio, Scene, SoundTarget};
use audioscape_core::Point3;

#[test]
fn gain_is_zero_when_either_flag_is_set() {
    for global in [false, true] {
        for local in [false, true] {
            let expected = if global || local { 0.0 } else { 1.0 };
            assert_eq!(effective_gain(global, local), expected);
        }
    }
}

#[test]
fn toggling_either_flag_updates_gain_immediately() {
    let mut mixer = MixerState::default();
    let mut state = MuteState::default();
    assert_eq!(mixer.gain_for(&state), 1.0);
    state.toggle_mute();
    assert_eq!(mixer.gain_for(&state), 0.0);
    mixer.toggle_global_mute();
    assert_eq!(mixer.gain_for(&state), 0.0);
    state.toggle_mute();
    assert_eq!(mixer.gain_for(&state), 0.0);
    mixer.toggle_global_mute();
    assert_eq!(mixer.gain_for(&state), 1.0);
}

#[test]
fn pause_does_not_change_gain() {
    let mixer = MixerState::default();
    let state = MuteState {
        is_muted: false,
        is_paused: true,
    };
    assert_eq!(mixer.gain_for(&state), 1.0);
    assert!(!state.can_move(&mixer));
}

#[test]
fn muting_stops_movement() {
    let mut mixer = MixerState::default();
    let mut state = MuteState::default();
    assert!(state.can_move(&mixer));
    state.toggle_mute();
    assert!(!state.can_move(&mixer));
    state.toggle_mute();
    mixer.toggle_global_mute();
    assert!(!state.can_move(&mixer));
}

fn scene_with_loaded_object(audio: &mut RecordingAudio) -> (Scene, audioscape_core::ObjectId) {
    let mut scene = Scene::new();
    let id = scene.add_object(Point3::ZERO);
    let ticket = scene.begin_sound_load(SoundTarget::Object(id), "rain.wav").unwrap();
    let buffer = audio.decode(b"pcm");
    scene
        .finish_sound_load(audio, SoundTarget::Object(id), ticket, buffer)
        .unwrap();
    (scene, id)
}

#[test]
fn global_mute_is_pushed_to_every_source() {
    let mut audio = RecordingAudio::new();
    let (mut scene, id) = scene_with_loaded_object(&mut audio);
    let source = scene.object(id).unwrap().sound.source().unwrap();
    assert_eq!(audio.gain(source), Some(1.0));

    assert!(scene.toggle_global_mute(&mut audio));
    assert_eq!(audio.gain(source), Some(0.0));
    assert!(!scene.toggle_global_mute(&mut audio));
    assert_eq!(audio.gain(source), Some(1.0));
}

#[test]
fn object_mute_survives_global_unmute() {
    let mut audio = RecordingAudio::new();
    let (mut scene, id) = scene_with_loaded_object(&mut audio);
    let source = scene.object(id).unwrap().sound.source().unwrap();

    scene.set_object_muted(&mut audio, id, true).unwrap();
    scene.toggle_global_mute(&mut audio);
    scene.toggle_global_mute(&mut audio);
    assert_eq!(audio.gain(source), Some(0.0));

    scene.set_object_muted(&mut audio, id, false).unwrap();
    assert_eq!(audio.gain(source), Some(1.0));
}

#[test]
fn muted_cone_is_silent_while_object_plays() {
    let mut audio = RecordingAudio::new();
    let (mut scene, id) = scene_with_loaded_object(&mut audio);
    let cone = scene.add_cone(id).unwrap();
    let target = SoundTarget::Cone(id, cone);
    let ticket = scene.begin_sound_load(target, "bell.wav").unwrap();
    let buffer = audio.decode(b"pcm");
    scene.finish_sound_load(&mut audio, target, ticket, buffer).unwrap();

    let object = scene.object(id).unwrap();
    let object_source = object.sound.source().unwrap();
    let cone_source = object.cone(cone).unwrap().sound.source().unwrap();

    scene.set_cone_muted(&mut audio, id, cone, true).unwrap();
    assert_eq!(audio.gain(cone_source), Some(0.0));
    assert_eq!(audio.gain(object_source), Some(1.0));

    // Muting the object silences its cones too.
    scene.set_cone_muted(&mut audio, id, cone, false).unwrap();
    scene.set_object_muted(&mut audio, id, true).unwrap();
    assert_eq!(audio.gain(cone_source), Some(0.0));
}

#[test]
fn mute_all_respects_exceptions() {
    let mut audio = RecordingAudio::new();
    let mut scene = Scene::new();
    let a = scene.add_object(Point3::ZERO);
    let b = scene.add_object(Point3::new(300.0, 0.0, 0.0));

    scene.mute_all(&mut audio, &[audioscape_core::SceneItem::Object(b)]);
    assert!(scene.object(a).unwrap().mute.is_muted);
    assert!(!scene.object(b).unwrap().mute.is_muted);

    scene.unmute_all(&mut audio, &[]);
    assert!(!scene.object(a).unwrap().mute.is_muted);
}
