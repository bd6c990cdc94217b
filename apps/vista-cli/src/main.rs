use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use glam::Vec3;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vista_common::{DemoKind, Transform};
use vista_frame::{
    FrameLoop, FrameReport, ManualTime, ScriptedFrame, ScriptedHost, Settings, load_demo,
};
use vista_input::{InputEvent, Key};
use vista_render::DebugTextRenderer;
use vista_frame::FrameHost;

#[derive(Parser)]
#[command(name = "vista-cli", about = "Headless tools for the vista demo harness")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SceneArgs {
    /// YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demo scene: model, instancing or hdr
    #[arg(long)]
    demo: Option<DemoKind>,
}

impl SceneArgs {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(demo) = self.demo {
            settings.demo = demo;
        }
        Ok(settings)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective settings and the demo scene summary
    Info {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Run frames against a scripted window and a text renderer
    Run {
        #[command(flatten)]
        scene: SceneArgs,
        /// Number of frames to run
        #[arg(short, long, default_value = "10")]
        frames: usize,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f64,
        /// Keys held from the first frame on (w, a, s, d, q, e, space, escape, f1)
        #[arg(long = "hold")]
        hold: Vec<String>,
        /// Print the frame summary as JSON
        #[arg(long)]
        json: bool,
        /// Print every recorded frame
        #[arg(long)]
        dump: bool,
    },
    /// Build a transform and print its decomposed components
    Decompose {
        /// Translation x,y,z
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        translate: Option<Vec<f32>>,
        /// Rotation angle in degrees
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        angle: f32,
        /// Rotation axis x,y,z
        #[arg(long, value_delimiter = ',', default_value = "0,1,0", allow_negative_numbers = true)]
        axis: Vec<f32>,
        /// Scale x,y,z
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        scale: Option<Vec<f32>>,
    },
}

fn parse_key(name: &str) -> Result<Key> {
    Ok(match name.trim().to_ascii_lowercase().as_str() {
        "w" => Key::W,
        "a" => Key::A,
        "s" => Key::S,
        "d" => Key::D,
        "q" => Key::Q,
        "e" => Key::E,
        "space" => Key::Space,
        "escape" | "esc" => Key::Escape,
        "f1" => Key::F1,
        other => bail!("unknown key '{other}'"),
    })
}

fn vec3(values: &[f32]) -> Result<Vec3> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => bail!("expected three comma-separated values, got {}", values.len()),
    }
}

#[derive(Debug, Serialize)]
struct CameraSummary {
    position: [f32; 3],
    yaw: f32,
    pitch: f32,
    zoom: f32,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    demo: DemoKind,
    frames: u64,
    presented: u64,
    hdr: bool,
    exposure: f32,
    camera: CameraSummary,
    reports: Vec<FrameReport>,
    #[serde(skip)]
    frame_text: Vec<String>,
}

/// Run `frames` frames of the configured demo with `held` keys pressed on
/// the first frame. Frame text is only kept when `dump` is set.
fn run_headless(
    settings: &Settings,
    frames: usize,
    dt: f64,
    held: &[Key],
    dump: bool,
) -> Result<RunSummary> {
    if frames == 0 {
        bail!("at least one frame is required");
    }
    let setup = load_demo(settings);

    let mut host = ScriptedHost::new(settings.window.width, settings.window.height);
    host.push(ScriptedFrame::events(
        held.iter().map(|key| InputEvent::KeyPressed(*key)),
    ))
    .idle(frames - 1);

    let mut frame_loop = FrameLoop::new(
        host,
        DebugTextRenderer::new(),
        ManualTime::new(),
        setup.scene,
        settings,
    );

    let mut reports = Vec::with_capacity(frames);
    let mut frame_text = Vec::new();
    while frame_loop.host().is_open() {
        frame_loop.time_mut().advance(dt);
        reports.push(frame_loop.run_frame()?);
        let recorded = frame_loop.renderer_mut().take_frames();
        if dump {
            frame_text.extend(recorded.into_iter().map(|frame| frame.text));
        }
    }

    let camera = frame_loop.camera();
    let hdr = frame_loop.hdr();
    let summary = RunSummary {
        demo: settings.demo,
        frames: frame_loop.frame_index(),
        presented: frame_loop.renderer().presented(),
        hdr: hdr.enabled,
        exposure: hdr.exposure,
        camera: CameraSummary {
            position: camera.position.to_array(),
            yaw: camera.yaw(),
            pitch: camera.pitch(),
            zoom: camera.zoom(),
        },
        reports,
        frame_text,
    };
    Ok(summary)
}

fn decompose(
    translate: Option<Vec3>,
    angle: f32,
    axis: Vec3,
    scale: Option<Vec3>,
) -> Result<Transform> {
    if angle != 0.0 && axis.length_squared() == 0.0 {
        bail!("rotation axis must be non-zero");
    }
    let mut transform = Transform::default();
    if let Some(translation) = translate {
        transform.translate(translation);
    }
    if angle != 0.0 {
        transform.rotate(angle, axis);
    }
    if let Some(scale) = scale {
        transform.scale(scale);
    }
    transform.decompose();
    Ok(transform)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { scene } => {
            let settings = scene.settings()?;
            let setup = load_demo(&settings);
            println!("vista-cli v{}", env!("CARGO_PKG_VERSION"));
            print!("{}", settings.to_yaml()?);
            let summary = setup.scene.summary();
            println!(
                "scene: entities={}, renderables={}, roots={}",
                summary.entities, summary.renderables, summary.roots
            );
            println!(
                "assets: models={}, materials={}, textures={}, skybox={}",
                setup.assets.model_count(),
                setup.assets.materials().count(),
                setup.assets.textures().count(),
                setup.skybox.is_some()
            );
        }
        Commands::Run {
            scene,
            frames,
            dt,
            hold,
            json,
            dump,
        } => {
            let settings = scene.settings()?;
            let held = hold
                .iter()
                .map(|name| parse_key(name))
                .collect::<Result<Vec<_>>>()?;
            let summary = run_headless(&settings, frames, dt, &held, dump)?;

            if dump {
                for text in &summary.frame_text {
                    println!("{text}");
                }
            }
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("serializing run summary")?
                );
            } else {
                let [x, y, z] = summary.camera.position;
                println!(
                    "{} demo: {} frames, {} presented",
                    summary.demo, summary.frames, summary.presented
                );
                println!(
                    "camera: position=({x:.3}, {y:.3}, {z:.3}) yaw={:.2} pitch={:.2} zoom={:.2}",
                    summary.camera.yaw, summary.camera.pitch, summary.camera.zoom
                );
                println!(
                    "hdr: {} exposure={:.3}",
                    if summary.hdr { "on" } else { "off" },
                    summary.exposure
                );
                if let Some(last) = summary.reports.last() {
                    println!(
                        "last frame: batches={}, instances={}",
                        last.draw_batches, last.instances
                    );
                }
            }
        }
        Commands::Decompose {
            translate,
            angle,
            axis,
            scale,
        } => {
            let translate = translate.as_deref().map(vec3).transpose()?;
            let scale = scale.as_deref().map(vec3).transpose()?;
            let transform = decompose(translate, angle, vec3(&axis)?, scale)?;

            println!("local matrix: {:?}", transform.local_matrix().to_cols_array_2d());
            println!("translation: {}", transform.local_position(true));
            println!("scale: {}", transform.local_scale());
            println!("rotation: {}", transform.local_rotation());
            println!("skew: {}", transform.local_skew());
            println!("perspective: {}", transform.local_perspective());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_names_parse() {
        assert_eq!(parse_key("W").unwrap(), Key::W);
        assert_eq!(parse_key("esc").unwrap(), Key::Escape);
        assert_eq!(parse_key(" space ").unwrap(), Key::Space);
        assert!(parse_key("z").is_err());
    }

    #[test]
    fn holding_w_walks_forward() {
        let summary = run_headless(&Settings::default(), 4, 0.25, &[Key::W], false).unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.presented, 4);
        // 4 frames * 0.25 s * 2.5 units/s along -Z from z = 3.
        assert!((summary.camera.position[2] - 0.5).abs() < 1e-4);
        assert_eq!(summary.reports.len(), 4);
        assert!(summary.reports.iter().all(|r| r.instances == 1));
    }

    #[test]
    fn escape_stops_after_one_frame() {
        let summary =
            run_headless(&Settings::default(), 10, 0.016, &[Key::Escape], false).unwrap();
        assert_eq!(summary.frames, 1);
    }

    #[test]
    fn instancing_run_draws_every_rock() {
        let settings = Settings {
            demo: DemoKind::Instancing,
            ..Settings::default()
        };
        let summary = run_headless(&settings, 1, 0.016, &[], false).unwrap();
        // Planet and rocks share the cube without a model, but not a material.
        assert_eq!(summary.reports[0].instances, 1001);
        assert_eq!(summary.reports[0].draw_batches, 2);
    }

    #[test]
    fn zero_frames_is_rejected() {
        assert!(run_headless(&Settings::default(), 0, 0.016, &[], false).is_err());
    }

    #[test]
    fn summary_serializes_to_json() {
        let summary = run_headless(&Settings::default(), 2, 0.5, &[], false).unwrap();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["demo"], "model");
        assert_eq!(value["frames"], 2);
        assert_eq!(value["reports"][1]["index"], 1);
        assert!(value.get("frame_text").is_none());
    }

    #[test]
    fn frame_text_is_kept_only_for_dumps() {
        let quiet = run_headless(&Settings::default(), 3, 0.016, &[], false).unwrap();
        assert!(quiet.frame_text.is_empty());

        let dumped = run_headless(&Settings::default(), 3, 0.016, &[], true).unwrap();
        assert_eq!(dumped.frame_text.len(), 3);
        assert!(dumped.frame_text[2].contains("=== Frame 2 "));
    }

    #[test]
    fn decompose_recovers_inputs() {
        let transform = decompose(
            Some(Vec3::new(1.0, 2.0, 3.0)),
            0.0,
            Vec3::Y,
            Some(Vec3::new(2.0, 2.0, 2.0)),
        )
        .unwrap();
        assert!(transform.local_position(true).abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
        assert!(transform.local_scale().abs_diff_eq(Vec3::splat(2.0), 1e-5));
    }

    #[test]
    fn zero_axis_rotation_is_rejected() {
        assert!(decompose(None, 30.0, Vec3::ZERO, None).is_err());
    }
}
