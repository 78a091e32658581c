mod logger;
mod synth;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use facepaint::engine::load_obj;
use facepaint::{Config, Scene, ScriptedTracker, TrackerHandle};
use glam::{Vec2, Vec4};
use image::{Rgb, RgbImage};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Offline face painting demo. Plays a scripted pointer session against a
/// procedurally tracked mask and writes every rendered frame as a PNG.
#[derive(Parser, Debug)]
#[command(name = "paint_viewer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Triangulated OBJ mesh to paint on instead of the built-in mask
    #[arg(long, value_name = "FILE")]
    mesh: Option<PathBuf>,

    /// Render target width in pixels
    #[arg(long, default_value = "640")]
    width: u32,

    /// Render target height in pixels
    #[arg(long, default_value = "480")]
    height: u32,

    /// Number of frames to render
    #[arg(long, default_value = "90")]
    frames: usize,

    /// Directory the PNG frames are written to
    #[arg(long, default_value = "frames")]
    out: PathBuf,

    /// Initial brush color as RRGGBB hex
    #[arg(long, value_name = "RRGGBB")]
    color: Option<String>,

    /// Show the tracked mesh and the surface gizmos
    #[arg(long)]
    debug: bool,

    /// Log at debug level
    #[arg(long)]
    verbose: bool,
}

//Pointer and brush events, keyed to the frame they fire on.
enum Gesture {
    Down(Vec2),
    Move(Vec2),
    Up,
    Color(Vec4),
    Thickness(f32),
    Undo,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);

    let width = args.width as f32;
    let height = args.height as f32;
    let (geometry, base) = match &args.mesh {
        Some(path) => {
            let geometry =
                load_obj(path).with_context(|| format!("loading mesh {}", path.display()))?;
            let base = synth::landmarks_for(&geometry, width);
            (geometry, base)
        }
        None => (
            synth::mask_geometry(width, height),
            synth::base_landmarks(width, height),
        ),
    };
    let script = synth::landmark_script(&base, width, height, args.frames);
    let tracker = TrackerHandle::spawn(ScriptedTracker::new(base.len(), script));
    let mut scene = Scene::new(Config::new(args.width, args.height), geometry, tracker)?;
    scene.set_debug(args.debug);
    if let Some(hex) = &args.color {
        scene.set_color(parse_color(hex)?);
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    let gestures = gesture_schedule(args.frames, width, height);
    let mut rng = StdRng::seed_from_u64(7);
    for frame in 0..args.frames {
        for (_, gesture) in gestures.iter().filter(|(at, _)| *at == frame) {
            apply_gesture(&mut scene, gesture);
        }
        let video = synth::video_frame(args.width as usize, args.height as usize, frame, &mut rng);
        scene.advance(Some(&video));
        let times = scene.frametime();
        debug!(
            "frame {frame}: tracking {:?}, update {:?}, render {:?}",
            times.tracking_stage(),
            times.update_stage(),
            times.render_stage()
        );
        export_frame(&scene, &args.out, frame)?;
    }
    info!("wrote {} frames to {}", args.frames, args.out.display());
    Ok(())
}

//A white arc stroke, a fat red tap while the tracker is dropped out, then an
//undo that removes the tap and leaves the arc.
fn gesture_schedule(frames: usize, width: f32, height: f32) -> Vec<(usize, Gesture)> {
    let center = Vec2::new(width * 0.5, height * 0.45);
    let radius = height * 0.12;
    let down = frames / 9;
    let up = frames * 2 / 5;
    let tap = frames * 11 / 20;
    let undo = frames * 4 / 5;

    let mut schedule = vec![(down, Gesture::Down(arc_point(center, radius, 0.0)))];
    for frame in down + 1..up {
        let t = (frame - down) as f32 / (up - down) as f32;
        schedule.push((frame, Gesture::Move(arc_point(center, radius, t))));
    }
    schedule.push((up, Gesture::Up));
    schedule.push((tap, Gesture::Color(Vec4::new(0.9, 0.15, 0.1, 1.0))));
    schedule.push((tap, Gesture::Thickness(30.0)));
    schedule.push((tap, Gesture::Down(Vec2::new(width * 0.58, height * 0.6))));
    schedule.push((tap + 1, Gesture::Up));
    schedule.push((undo, Gesture::Undo));
    schedule
}

//Three quarters of a squashed circle, starting at the bottom.
fn arc_point(center: Vec2, radius: f32, t: f32) -> Vec2 {
    let angle = std::f32::consts::FRAC_PI_2 + t * std::f32::consts::PI * 1.5;
    center + Vec2::new(angle.cos(), angle.sin() * 0.8) * radius
}

fn apply_gesture(scene: &mut Scene, gesture: &Gesture) {
    match gesture {
        Gesture::Down(point) => scene.pointer_down(*point),
        Gesture::Move(point) => scene.pointer_move(*point),
        Gesture::Up => scene.pointer_up(),
        Gesture::Color(color) => scene.set_color(*color),
        Gesture::Thickness(thickness) => scene.set_thickness(*thickness),
        Gesture::Undo => scene.undo(),
    }
}

//Frames are flipped horizontally on the way out so the PNGs read like a
//mirror, the same convention the pointer coordinates use.
fn export_frame(scene: &Scene, out: &Path, frame: usize) -> anyhow::Result<()> {
    let framebuffer = scene.framebuffer();
    let width = framebuffer.width();
    let mut image = RgbImage::new(width, framebuffer.height());
    for (x, y, color) in framebuffer.color() {
        image.put_pixel(
            width - 1 - x,
            y,
            Rgb([to_byte(color.x), to_byte(color.y), to_byte(color.z)]),
        );
    }
    let path = out.join(format!("frame_{frame:04}.png"));
    image
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

fn parse_color(hex: &str) -> anyhow::Result<Vec4> {
    let hex = hex.trim_start_matches('#');
    anyhow::ensure!(hex.len() == 6, "expected RRGGBB, got {hex:?}");
    let channel = |range: std::ops::Range<usize>| -> anyhow::Result<f32> {
        Ok(u8::from_str_radix(&hex[range], 16)? as f32 / 255.0)
    };
    Ok(Vec4::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0))
}
