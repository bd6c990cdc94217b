mod app;
mod host;
mod overlay;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vista_common::DemoKind;
use vista_frame::{Settings, load_demo};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "vista-desktop", about = "Fly-camera demo harness")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demo scene: model, instancing or hdr
    #[arg(long)]
    demo: Option<DemoKind>,

    /// OBJ model to show instead of the configured one
    #[arg(long)]
    model: Option<PathBuf>,

    /// Surface texture for the cube-based scenes
    #[arg(long)]
    texture: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Present without waiting for vertical sync
    #[arg(long)]
    no_vsync: bool,

    /// Start with HDR tone mapping on
    #[arg(long)]
    hdr: bool,
}

impl Cli {
    /// Settings file (or defaults) with command-line overrides applied.
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(demo) = self.demo {
            settings.demo = demo;
        }
        if let Some(model) = &self.model {
            settings.model_path = Some(model.clone());
        }
        if let Some(texture) = &self.texture {
            settings.texture_path = Some(texture.clone());
        }
        if let Some(width) = self.width {
            settings.window.width = width;
        }
        if let Some(height) = self.height {
            settings.window.height = height;
        }
        if self.no_vsync {
            settings.window.vsync = false;
        }
        if self.hdr {
            settings.hdr.enabled = true;
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = cli.settings()?;
    tracing::info!(demo = %settings.demo, "vista-desktop starting");

    let setup = load_demo(&settings);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(settings, setup);
    event_loop.run_app(&mut app)?;
    app.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "vista-desktop",
            "--demo",
            "instancing",
            "--width",
            "800",
            "--no-vsync",
            "--hdr",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(settings.demo, DemoKind::Instancing);
        assert_eq!(settings.window.width, 800);
        assert_eq!(settings.window.height, 720);
        assert!(!settings.window.vsync);
        assert!(settings.hdr.enabled);
    }

    #[test]
    fn unknown_demo_is_rejected() {
        assert!(Cli::try_parse_from(["vista-desktop", "--demo", "terrain"]).is_err());
    }
}
