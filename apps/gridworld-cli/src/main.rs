mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gridworld_common::Seed;
use gridworld_env::{EnvConfig, Environment, ObservationKind, StepType};
use gridworld_kernel::actions::table_by_name;
use gridworld_persist::{verify_replay, EpisodeLog, Snapshot};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Salt separating the policy's random stream from the environment's.
const POLICY_SALT: u64 = 0x706f_6c69_6379;

#[derive(Parser)]
#[command(name = "gridworld-cli", about = "Run and inspect gridworld episodes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// List an action table
    Actions {
        /// Table name: minigrid or complete
        #[arg(short, long, default_value = "minigrid")]
        table: String,
    },
    /// Run episodes under a uniformly random policy
    Run {
        /// YAML environment config; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Seed of the first episode; episode i uses seed + i
        #[arg(short, long, default_value = "0")]
        seed: u64,
        /// Number of episodes to run
        #[arg(short, long, default_value = "1")]
        episodes: u64,
        /// Print the grid after every step
        #[arg(short, long)]
        render: bool,
        /// Emit one JSON summary per episode
        #[arg(long)]
        json: bool,
    },
    /// Replay an action log twice and check that both runs agree
    Replay {
        /// YAML environment config; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Reset seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Comma-separated action indices
        #[arg(short, long, value_delimiter = ',', default_value = "2,2,1,2")]
        actions: Vec<usize>,
    },
}

#[derive(Debug, Serialize)]
struct EpisodeSummary {
    seed: u64,
    steps: u64,
    total_reward: f32,
    outcome: StepType,
    digest: String,
    actions: Vec<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("gridworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", gridworld_common::crate_info());
            println!("kernel: {}", gridworld_kernel::crate_info());
            println!("env: {}", gridworld_env::crate_info());
            println!("persist: {}", gridworld_persist::crate_info());
        }
        Commands::Actions { table } => {
            let Some(table) = table_by_name(&table) else {
                bail!("unknown action table `{table}` (expected minigrid or complete)");
            };
            println!("{} ({} actions)", table.name(), table.len());
            for (index, action) in table.iter().enumerate() {
                println!("  {index}: {}", action.name);
            }
        }
        Commands::Run {
            config,
            seed,
            episodes,
            render,
            json,
        } => {
            let env = load_env(config.as_deref())?;
            tracing::info!(
                layout = env.layout_name(),
                actions = env.action_table().name(),
                episodes,
                "running"
            );
            for episode in 0..episodes {
                let summary = run_episode(&env, seed.wrapping_add(episode), render)?;
                if json {
                    println!("{}", serde_json::to_string(&summary)?);
                } else {
                    println!(
                        "episode {episode}: seed={} steps={} return={:.2} outcome={:?} digest={}",
                        summary.seed,
                        summary.steps,
                        summary.total_reward,
                        summary.outcome,
                        &summary.digest[..16]
                    );
                }
            }
        }
        Commands::Replay {
            config,
            seed,
            actions,
        } => {
            let env = load_env(config.as_deref())?;
            let log = EpisodeLog::with_actions(seed, actions);
            let report = verify_replay(&env, &log)?;
            println!("Replay: seed={seed}, steps={}", report.steps);
            println!("State hashes: {}", if report.hashes_match { "OK" } else { "MISMATCH" });
            println!(
                "Snapshot digest: {} ({})",
                report.digest,
                if report.digests_match { "OK" } else { "MISMATCH" }
            );
            if !report.is_reproducible() {
                bail!("replay of seed {seed} is not reproducible");
            }
        }
    }

    Ok(())
}

fn load_env(path: Option<&Path>) -> anyhow::Result<Environment<ObservationKind>> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EnvConfig::from_yaml_str(&text)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => EnvConfig::default(),
    };
    Ok(Environment::from_config(&config)?)
}

/// Run one episode to termination or truncation with uniformly random actions.
fn run_episode(
    env: &Environment<ObservationKind>,
    seed: u64,
    render: bool,
) -> anyhow::Result<EpisodeSummary> {
    let mut policy = Seed::new(seed ^ POLICY_SALT);
    let mut log = EpisodeLog::new(seed);
    let mut timestep = env.reset(seed)?;
    let mut total_reward = 0.0;
    if render {
        println!("{}", render::census(&timestep.state));
        println!("{}", render::render(&timestep.state));
    }

    while !timestep.is_done() {
        let (draw, rest) = policy.split();
        policy = rest;
        let action = draw.below(env.action_table().len() as u64) as usize;
        log.record(action);
        timestep = env.step(&timestep.state, action)?;
        total_reward += timestep.reward;
        if render {
            let name = env.action_table().get(action)?.name;
            println!("t={} action={name} reward={}", timestep.t, timestep.reward);
            println!("{}", render::render(&timestep.state));
        }
    }

    let snapshot = Snapshot::capture(&timestep.state)?;
    Ok(EpisodeSummary {
        seed,
        steps: timestep.t,
        total_reward,
        outcome: timestep.step_type,
        digest: snapshot.digest,
        actions: log.actions().to_vec(),
    })
}
