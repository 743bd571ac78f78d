use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

use arm_client::{ArmClient, ArmClientConfig};
use motion_playback::{
    sanitize_answer, Clock, ManualClock, MockController, PlaybackConfig, PlaybackDriver,
    PlaybackError, PlaybackMetrics, PlaybackReport, PoseStore, RobotController, SystemClock,
};

#[derive(Parser, Debug)]
#[command(
    name = "oracle",
    version,
    about = "Play one-word answers as recorded arm gestures",
    disable_help_subcommand = true
)]
struct Cli {
    /// Robot controller base URL
    #[arg(long, env = "ROBOT_SERVER_URL", default_value = "http://localhost:80", global = true)]
    base_url: String,

    /// Robot identifier to control
    #[arg(long, env = "ROBOT_ID", global = true)]
    robot_id: Option<u32>,

    /// JSON file with recorded joint configurations
    #[arg(
        long,
        env = "RECORDED_POSITIONS",
        default_value = "recorded_positions.json",
        global = true
    )]
    positions: PathBuf,

    /// YAML playback configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print playback counters in Prometheus text format on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(flatten)]
    motion: MotionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of the config file and environment.
#[derive(Args, Debug, Default)]
struct MotionArgs {
    /// Seconds to interpolate a full-length move
    #[arg(long, global = true)]
    duration: Option<f64>,
    /// Lower bound on motion duration after scaling
    #[arg(long, global = true)]
    min_duration: Option<f64>,
    /// Joint distance that maps to the full duration
    #[arg(long, global = true)]
    reference_motion: Option<f64>,
    /// Interpolation steps for a full-length move
    #[arg(long, global = true)]
    steps: Option<usize>,
    /// Pause in seconds between spelled-out letters
    #[arg(long, global = true)]
    letter_pause: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play an answer once (punctuation is stripped, case folded)
    Say {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Interactive loop: type labels to play, `end` to exit
    Play,
    /// List recorded pose labels
    Labels,
    /// Dry run against a simulated arm, printing the plan of each move
    Preview {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
        /// Joint count of the simulated arm (starts at all zeros)
        #[arg(long, default_value_t = 6)]
        joints: usize,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match &cli.command {
        Commands::Say { text } => say(&cli, config, &text.join(" ")),
        Commands::Play => play_loop(&cli, config),
        Commands::Labels => list_labels(&cli),
        Commands::Preview { text, joints } => preview(&cli, config, &text.join(" "), *joints),
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn build_config(cli: &Cli) -> Result<PlaybackConfig> {
    let mut cfg = match &cli.config {
        Some(path) => PlaybackConfig::from_yaml_file(path)?,
        None => PlaybackConfig::default(),
    };
    cfg.apply_env();
    apply_flags(&mut cfg, &cli.motion);
    cfg.validate()?;
    Ok(cfg)
}

fn apply_flags(cfg: &mut PlaybackConfig, m: &MotionArgs) {
    if let Some(v) = m.duration {
        cfg.motion.base_duration_s = v;
    }
    if let Some(v) = m.min_duration {
        cfg.motion.min_duration_s = v;
    }
    if let Some(v) = m.reference_motion {
        cfg.motion.reference_motion = v;
    }
    if let Some(v) = m.steps {
        cfg.motion.steps = v;
    }
    if let Some(v) = m.letter_pause {
        cfg.letter_pause_s = v;
    }
}

fn load_store(cli: &Cli) -> Result<PoseStore> {
    PoseStore::load(&cli.positions).context("Failed to load recorded positions")
}

fn connect(cli: &Cli, config: PlaybackConfig) -> Result<PlaybackDriver<ArmClient, SystemClock>> {
    let client = ArmClient::new(ArmClientConfig {
        base_url: cli.base_url.clone(),
        robot_id: cli.robot_id,
        ..Default::default()
    })?;
    info!("controller: {}", client.base_url());
    Ok(PlaybackDriver::new(client, SystemClock::new(), config).with_metrics(playback_metrics()?))
}

fn playback_metrics() -> Result<PlaybackMetrics> {
    PlaybackMetrics::new().map_err(anyhow::Error::msg)
}

fn report_metrics(cli: &Cli, metrics: Option<&PlaybackMetrics>) {
    let Some(m) = metrics else { return };
    if cli.metrics {
        print!("{}", m.encode_text());
    } else {
        debug!("playback counters:\n{}", m.encode_text());
    }
}

fn answer_word(text: &str) -> String {
    sanitize_answer(text).to_lowercase()
}

fn say(cli: &Cli, config: PlaybackConfig, text: &str) -> Result<()> {
    let word = answer_word(text);
    if word.is_empty() {
        anyhow::bail!("No word left in '{}' after cleanup", text);
    }
    let store = load_store(cli)?;
    let driver = connect(cli, config)?;
    if let Some(warning) = driver.initialize() {
        eprintln!("warning: {warning}");
    }

    let outcome = driver.play_word(&word, &store);
    report_metrics(cli, driver.metrics());
    match outcome {
        Ok(report) => {
            print_report(&report);
            println!("{}", serde_json::json!({ "success": true, "response": word }));
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "error": e.to_string() }));
            Err(e.into())
        }
    }
}

fn play_loop(cli: &Cli, config: PlaybackConfig) -> Result<()> {
    let store = load_store(cli)?;
    let driver = connect(cli, config)?;

    println!("Initializing robot…");
    if let Some(warning) = driver.initialize() {
        eprintln!("warning: {warning}");
    }
    println!("Type a recorded label to move there (or 'end' to exit).");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Target label: ");
        io::stdout().flush()?;
        let label = match lines.next() {
            Some(line) => line?.trim().to_string(),
            None => {
                println!("\nExiting playback loop.");
                break;
            }
        };

        if label.is_empty() {
            println!("Empty label ignored.");
            continue;
        }
        if label.eq_ignore_ascii_case("end") {
            break;
        }

        match driver.play_word(&label, &store) {
            Ok(report) => print_report(&report),
            Err(PlaybackError::NotFound(_)) => {
                println!(
                    "Label '{}' not found. Available keys: {}",
                    label,
                    store.labels().join(", ")
                );
            }
            Err(e) => error!("'{}' aborted: {}", label, e),
        }
    }
    report_metrics(cli, driver.metrics());
    Ok(())
}

fn list_labels(cli: &Cli) -> Result<()> {
    let store = load_store(cli)?;
    for label in store.labels() {
        match store.pose(&label) {
            Ok(pose) => println!("{}\t{}\t{:?}", label, pose.unit(), pose.angles()),
            Err(e) => println!("{}\tinvalid: {}", label, e),
        }
    }
    Ok(())
}

fn preview(cli: &Cli, config: PlaybackConfig, text: &str, joints: usize) -> Result<()> {
    let word = answer_word(text);
    let store = load_store(cli)?;
    let clock = ManualClock::new();
    let mut arm = MockController::new(vec![0.0; joints]).with_clock(clock.clone());
    arm.initialize()?;
    let driver = PlaybackDriver::new(arm, clock, config).with_metrics(playback_metrics()?);

    let report = driver.play_word(&word, &store)?;
    print_report(&report);
    report_metrics(cli, driver.metrics());
    let total = driver.clock().now();
    println!(
        "{} waypoints, {:.2}s simulated",
        report.waypoints_sent(),
        total.as_secs_f64()
    );
    Ok(())
}

fn print_report(report: &PlaybackReport) {
    println!("Label sequence: {}", report.labels.join(", "));
    for m in &report.moves {
        println!(
            "  {:<8} {:>3} steps  {:.2}s  (max delta {:.3}{})",
            m.label,
            m.plan.steps,
            m.plan.duration_s,
            m.plan.max_delta,
            if m.used_cached_state { ", cached start" } else { "" }
        );
    }
}
