use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;
use vista_common::DemoKind;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for vista")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests, docs and the demo smoke runs
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Run every demo headless through vista-cli and validate its report
    Smoke {
        #[arg(short, long, default_value = "30")]
        frames: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            fmt()?;
            clippy()?;
            test()?;
            doc()?;
            smoke(30)?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Doc => doc()?,
        Commands::Smoke { frames } => smoke(frames)?,
    }

    Ok(())
}

fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("==> {label}");
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("failed to spawn cargo for {label}"))?;
    if !status.success() {
        bail!("{label} failed");
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo("cargo fmt --check", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(
        "cargo clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Result<()> {
    cargo("cargo test", &["test", "--workspace"])
}

fn doc() -> Result<()> {
    cargo("cargo doc", &["doc", "--workspace", "--no-deps"])
}

fn smoke(frames: u32) -> Result<()> {
    let frames_arg = frames.to_string();
    for demo in DemoKind::ALL {
        println!("==> smoke run: {demo}");
        let output = Command::new("cargo")
            .args(["run", "--quiet", "-p", "vista-cli", "--", "run"])
            .args(["--demo", demo.as_str(), "--frames", &frames_arg, "--json"])
            .output()
            .context("failed to spawn vista-cli")?;
        if !output.status.success() {
            bail!(
                "{demo} smoke run failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let report: serde_json::Value = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("{demo} smoke run printed invalid JSON"))?;
        let ran = report["frames"].as_u64().unwrap_or(0);
        if ran != u64::from(frames) {
            bail!("{demo} smoke run stopped after {ran} of {frames} frames");
        }
        println!("    {ran} frames ok");
    }
    Ok(())
}
