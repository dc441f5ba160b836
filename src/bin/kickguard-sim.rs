//! Kickguard host simulator
//!
//! Drives the alarm controller against a simulated board, replaying a
//! scripted sequence of button and kickstand changes on a virtual clock.
//!
//! # Example
//!
//! ```bash
//! # Arm, then lift the kickstand, with the flag kept in nv.bin
//! kickguard-sim --script demo.json --nv nv.bin --duration-ms 180000
//!
//! # Same run with every transition logged and a checkpoint written out
//! RUST_LOG=kickguard=debug kickguard-sim -s demo.json --checkpoint-out run.json
//! ```
//!
//! A script is a JSON array of events:
//!
//! ```json
//! [
//!   { "at_ms": 100, "input": "button", "actuated": true },
//!   { "at_ms": 600, "input": "kickstand", "actuated": true }
//! ]
//! ```

use clap::Parser;
use kickguard::config::AlarmConfig;
use kickguard::driver::MainLoop;
use kickguard::io::{Board, FileNv, MemoryNv, NvStorage};
use kickguard::sim::{Script, SimBoard};
use kickguard::{AlarmController, State};
use std::error::Error;
use std::fs;
use std::ops::ControlFlow;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Kickguard Simulator
///
/// Runs the kickstand alarm on a virtual clock. The same script and
/// storage image always produce the same run.
#[derive(Parser, Debug)]
#[command(name = "kickguard-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Storage image file; persists the alarm flag across runs
    #[arg(long)]
    nv: Option<PathBuf>,

    /// JSON script of switch changes
    #[arg(short = 's', long)]
    script: Option<PathBuf>,

    /// Simulated duration in milliseconds
    #[arg(short = 'd', long, default_value = "10000")]
    duration_ms: u32,

    /// Clock advance between ticks in milliseconds
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    step_ms: u32,

    /// Write a JSON checkpoint of the final state here
    #[arg(long)]
    checkpoint_out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kickguard=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AlarmConfig::from_file(path)?,
        None => AlarmConfig::default(),
    };
    let script = match &args.script {
        Some(path) => Script::from_json_str(&fs::read_to_string(path)?)?,
        None => Script::default(),
    };

    info!(
        duration_ms = args.duration_ms,
        step_ms = args.step_ms,
        events = script.remaining(),
        "Starting simulation"
    );

    match &args.nv {
        Some(path) => simulate(&args, config, script, FileNv::open(path)?),
        None => simulate(&args, config, script, MemoryNv::new()),
    }
}

fn simulate<N: NvStorage + 'static>(
    args: &Args,
    config: AlarmConfig,
    mut script: Script,
    nv: N,
) -> Result<(), Box<dyn Error>> {
    let mut board = SimBoard::for_config(&config);
    script.apply_due(&mut board, &config, 0);

    let relay = config.relay_line;
    let controller = AlarmController::new(config.clone(), board, nv)?;
    let mut main_loop = MainLoop::new(controller);

    let max_ticks = u64::from(args.duration_ms / args.step_ms) + 1;
    let stats = main_loop.run_with(
        |controller| {
            controller.board_mut().advance(args.step_ms);
            let now = controller.board().now_ms();
            script.apply_due(controller.board_mut(), &config, now);
            ControlFlow::Continue(())
        },
        max_ticks,
    )?;

    let controller = main_loop.controller();
    let relay_changes = controller
        .board()
        .output_changes()
        .iter()
        .filter(|change| change.line == relay)
        .count();

    println!("\n=== Simulation Complete ===");
    println!("Ticks:          {}", stats.ticks);
    println!("Transitions:    {}", stats.transitions);
    println!("Relay changes:  {}", relay_changes);
    println!("Alarm flag:     {}", controller.context().alarm_triggered);
    match controller.state() {
        Some(state) => println!("Final state:    {}", state.name()),
        None => println!("Final state:    (not started)"),
    }

    if let Some(path) = &args.checkpoint_out {
        fs::write(path, controller.checkpoint().to_json()?)?;
        info!(path = %path.display(), "Checkpoint written");
    }

    Ok(())
}
