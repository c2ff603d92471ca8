use std::path::{Path, PathBuf};

use anyhow::Context;
use audioscape_core::{DecodeError, RecordingAudio, Scene};
use glam::DMat4;

const DEFAULT_TICKS: u32 = 600; // ten seconds at 60 fps

struct Args {
    input: PathBuf,
    ticks: u32,
    output: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: audioscape-native <scene.json> [ticks] [out.json]"))?;
    let ticks = match args.next() {
        Some(t) => t.parse().with_context(|| format!("invalid tick count {t:?}"))?,
        None => DEFAULT_TICKS,
    };
    let output = args.next().map(PathBuf::from);
    Ok(Args {
        input,
        ticks,
        output,
    })
}

/// Sound files are looked up next to the scene file.
fn read_sound(dir: &Path, filename: &str) -> Result<Vec<u8>, DecodeError> {
    std::fs::read(dir.join(filename)).map_err(|e| DecodeError {
        filename: filename.to_string(),
        reason: e.to_string(),
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args()?;

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut scene = Scene::new();
    let mut audio = RecordingAudio::new();
    let (pending, camera) = scene.import_json(&text)?;

    let dir = args.input.parent().unwrap_or_else(|| Path::new("."));
    for sound in pending {
        let decoded = read_sound(dir, &sound.ticket.filename).and_then(|bytes| audio.decode(&bytes));
        let outcome = scene.finish_sound_load(&mut audio, sound.target, sound.ticket, decoded)?;
        log::info!("[sound] {:?}: {:?}", sound.target, outcome);
    }

    let listener = DMat4::IDENTITY;
    for _ in 0..args.ticks {
        scene.tick(&mut audio, Some(&listener))?;
    }

    for object in scene.objects() {
        let p = object.position();
        log::info!(
            "[object {}] ({:.1}, {:.1}, {:.1}) after {} ticks",
            object.id.0,
            p.x,
            p.y,
            p.z,
            args.ticks
        );
    }
    for zone in scene.zones() {
        log::info!("[zone {}] playing={}", zone.id.0, zone.is_playing());
    }
    log::info!("[audio] {} calls recorded", audio.calls.len());

    if let Some(output) = &args.output {
        std::fs::write(output, scene.export_json(camera)?)
            .with_context(|| format!("writing {}", output.display()))?;
        log::info!("wrote {}", output.display());
    }
    Ok(())
}
