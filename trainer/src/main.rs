use anyhow::Context;
use chrono::Local;
use clap::Parser;
use repcore::prelude::CancelToken;
use repcore::progress::{summarize, weekly_overview};
use repcore::storage::{JsonFileStore, WorkoutStore};
use status_bridge::bridge::{spawn_bridge, StatusBoard};
use std::path::{Path, PathBuf};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use tokio::sync::mpsc::unbounded_channel;
use workout::config::{ConfigOverrides, TrainerConfig};
use workout::runner::{record_workout, RunEnd, WorkoutRunner};

mod generator;
mod status_bridge;
mod workout;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Parser)]
#[command(author, version, about = "Synthetic workout driver for the rep counter core")]
struct Args {
    /// Run one complete workout against the synthetic camera and log it
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Print progress and the weekly overview from the workout store
    #[arg(long, default_value_t = false)]
    history: bool,
    /// Serve live session state on 127.0.0.1:9000 while the workout runs
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Load a trainer config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    exercise: Option<String>,
    #[arg(long)]
    sets: Option<u32>,
    #[arg(long)]
    reps: Option<u32>,
    /// Rest between sets, in seconds
    #[arg(long)]
    rest: Option<u32>,
    /// Workout store (JSON)
    #[arg(long)]
    store: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let overrides = ConfigOverrides {
        exercise: args.exercise,
        sets: args.sets,
        reps: args.reps,
        rest_seconds: args.rest,
        store_path: args.store,
    };
    let config = if let Some(path) = args.config {
        let mut config = TrainerConfig::load(path)?;
        config.apply(overrides);
        config
    } else {
        TrainerConfig::from_args(overrides)
    };
    config.validate()?;

    if args.offline || args.serve {
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating tokio runtime")?;
        runtime.block_on(run_workout(config.clone(), args.serve))?;
    }
    if args.history {
        print_history(&config.store_path)?;
    }
    if !(args.offline || args.serve || args.history) {
        println!("Nothing to do: pass --offline, --serve or --history.");
    }

    Ok(())
}

async fn run_workout(config: TrainerConfig, serve: bool) -> anyhow::Result<()> {
    let stop = CancelToken::new();
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                log::info!("interrupt received");
                stop.cancel();
            }
        });
    }

    let board = StatusBoard::default();
    let server_shutdown = CancelToken::new();
    let (server, commands) = if serve {
        let (commands_tx, commands_rx) = unbounded_channel();
        let server = spawn_bridge(board.clone(), commands_tx, server_shutdown.clone())?;
        (Some(server), Some(commands_rx))
    } else {
        (None, None)
    };

    let mut runner = WorkoutRunner::new(config.clone(), board)?;
    let outcome = runner.run(commands, &stop).await?;

    match &outcome.summary {
        Some(summary) => {
            println!(
                "{} -> {}/{} sets of {} reps ({} reps in last set) in {}s [{:?}]",
                summary.exercise_name,
                summary.sets_completed,
                summary.target_sets,
                summary.target_reps,
                summary.reps_in_current_set,
                summary.elapsed_seconds,
                outcome.end
            );
            match JsonFileStore::open(&config.store_path)
                .and_then(|mut store| record_workout(&mut store, summary))
            {
                Ok(Some(log)) => {
                    println!("Logged workout {} to {}", log.id, config.store_path.display())
                }
                Ok(None) => println!("No completed sets; nothing logged."),
                Err(err) => {
                    log::warn!("workout store {} failed: {err}", config.store_path.display());
                    println!("Workout not saved: {err}");
                }
            }
        }
        None => println!("Workout ended before it started [{:?}]", outcome.end),
    }

    if let Some((addr, handle)) = server {
        if outcome.end != RunEnd::Interrupted {
            println!("Final status available at http://{addr}/status (Ctrl+C to stop)...");
            stop.cancelled().await;
        }
        server_shutdown.cancel();
        handle.await.context("joining status bridge")?;
    }
    Ok(())
}

fn print_history(store_path: &Path) -> anyhow::Result<()> {
    let store = JsonFileStore::open(store_path)
        .with_context(|| format!("opening workout store {}", store_path.display()))?;
    let logs = store.list_logs().context("listing workout logs")?;
    let exercises = store.list_exercises().context("listing exercises")?;

    let summary = summarize(&logs);
    println!(
        "Workouts {} | sets {} | reps {} | exercises {}",
        summary.total_workouts, summary.total_sets, summary.total_reps, summary.unique_exercises
    );
    if !summary.badges.is_empty() {
        let labels: Vec<&str> = summary.badges.iter().map(|badge| badge.label()).collect();
        println!("Badges: {}", labels.join(", "));
    }

    println!("This week:");
    for day in weekly_overview(&logs, &Local::now()) {
        println!(
            "  {} sets {:>3} reps {:>4}",
            WEEKDAYS[usize::from(day.day)],
            day.sets,
            day.reps
        );
    }

    println!("Recent:");
    for log in logs.iter().take(10) {
        let name = exercises
            .iter()
            .find(|exercise| exercise.id == log.exercise_id)
            .map(|exercise| exercise.name.as_str())
            .unwrap_or("Unknown");
        println!("  {name}: {} x {}", log.sets, log.reps);
    }
    Ok(())
}
