//! # Motion-Control Node
//!
//! Loads a board description, boots the NV dispatch core on its event task,
//! replays a script of NV writes through it and logs the CAN frames it
//! emits. With `--hold`, keeps the task alive and logs joint status once a
//! second until Ctrl-C.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::Parser;
use mc_node::canbus::queue::OutboundQueue;
use mc_node::config::{BoardConfig, load_board_config, load_replay_script};
use mc_node::controller::TracingController;
use mc_node::diagnostics::{DiagnosticCounters, Tee, TracingSink};
use mc_node::dispatch::Dispatcher;
use mc_node::runtime::{EventTask, RtParams};
use mc_node::store::StatusReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Joint-actuation board: NV write dispatch
#[derive(Parser, Debug)]
#[command(name = "mc_node")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Applies NV writes to joint controllers and emits CAN commands")]
struct Args {
    /// Board configuration TOML.
    #[arg(long, default_value = "config/board.toml")]
    config: PathBuf,

    /// Replay script of NV writes (`[[write]]` entries).
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Keep running after the script and log status until Ctrl-C.
    #[arg(long)]
    hold: bool,

    /// Run RT setup on the event task (needs the `rt` feature to take effect).
    #[arg(long)]
    rt: bool,

    /// CPU core to pin the event task to.
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority of the event task.
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // The board file names the log level, so it is read before tracing is up.
    let board = load_board_config(&args.config);
    let directive = match &board {
        Ok(board) => board.log_directive(args.verbose),
        Err(_) if args.verbose => "debug",
        Err(_) => "info",
    };
    setup_tracing(&args, directive);

    info!("mc_node v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = board
        .map_err(Into::into)
        .and_then(|board| run(&args, &board));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("mc_node shutdown complete");
}

fn run(args: &Args, board: &BoardConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        service = %board.shared.service_name,
        joints = board.board.joint_count,
        log_level = ?board.shared.log_level,
        "config OK"
    );

    let script = match &args.script {
        Some(path) => load_replay_script(path)?.to_writes(),
        None => Vec::new(),
    };

    let (outbound, frames) = OutboundQueue::bounded(board.board.outbound_queue_capacity);
    let counters = DiagnosticCounters::new();
    let sink = Arc::new(Tee(TracingSink, Arc::clone(&counters)));

    let dispatcher = Dispatcher::boot(
        board,
        TracingController::new(board.board.joint_count),
        outbound,
        sink,
    )?;
    let reader = dispatcher.status_reader();

    // CAN side: log every frame the dispatcher emits.
    let source_addr = board.board.source_addr;
    let bus = thread::Builder::new()
        .name("mc-bus".to_string())
        .spawn(move || {
            let mut sent = 0usize;
            while let Some((port, msg)) = frames.recv() {
                let frame = msg.to_frame(source_addr);
                info!(
                    ?port,
                    id = frame.id,
                    data = ?frame.bytes(),
                    command = ?msg.command,
                    "tx"
                );
                sent += 1;
            }
            sent
        })?;

    let rt = args.rt.then_some(RtParams {
        cpu_core: args.cpu_core,
        priority: args.rt_priority,
    });
    let task = EventTask::spawn(dispatcher, board.board.event_queue_capacity, rt)?;

    let sender = task.sender();
    for write in script {
        sender.submit_blocking(write)?;
    }

    if args.hold {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            r.store(false, Ordering::SeqCst);
        })?;
        while running.load(Ordering::SeqCst) {
            log_status(&reader);
            thread::sleep(Duration::from_secs(1));
        }
    }
    drop(sender);

    // Dropping the dispatcher closes the outbound queue and ends the bus thread.
    let dispatcher = task.join()?;
    let applied = dispatcher.applied_count();
    drop(dispatcher);
    let sent = bus
        .join()
        .map_err(|_| "bus thread panicked".to_string())?;

    log_status(&reader);
    info!(
        applied,
        frames = sent,
        absorbed = counters.total(),
        "replay finished"
    );
    for (flag, count) in counters.snapshot() {
        info!(?flag, count, "absorbed failures");
    }
    Ok(())
}

fn log_status(reader: &StatusReader) {
    for joint in 0..reader.joint_count() {
        if let Some(status) = reader.snapshot(joint as u8) {
            info!(
                joint,
                control_mode = %status.control_mode,
                monitor = ?status.monitor_status,
                "status"
            );
        }
    }
}

/// Setup tracing subscriber. `RUST_LOG` wins over `directive`.
fn setup_tracing(args: &Args, directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
