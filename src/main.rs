//! NBA win percentage CLI
//!
//! Trains the network on the embedded 2021-22 season and predicts a team's
//! win percentage with a sensitivity sweep.

use clap::{Parser, Subcommand};
use hoops::{Config, Result};

#[derive(Parser)]
#[command(name = "hoops")]
#[command(about = "NBA win percentage prediction with a small neural network", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the model and report losses
    Train {
        /// Override number of epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Seed for the shuffle and weight init
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Train, then predict a team's win percentage
    Predict {
        #[arg(long)]
        wins: u32,
        #[arg(long)]
        losses: u32,
        /// Points per game
        #[arg(long)]
        points: f32,
        /// Rebounds per game
        #[arg(long)]
        rebounds: f32,
        /// Assists per game
        #[arg(long)]
        assists: f32,
        /// Seed for the shuffle and weight init
        #[arg(long)]
        seed: Option<u64>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Train in the background and answer predictions read from stdin
    Interactive,
    /// Write the default config
    Init,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Train { epochs, seed } => commands::train(config, epochs, seed),
        Commands::Predict {
            wins,
            losses,
            points,
            rebounds,
            assists,
            seed,
            format,
        } => {
            let stats = hoops::TeamStats {
                wins,
                losses,
                points_per_game: points,
                rebounds_per_game: rebounds,
                assists_per_game: assists,
            };
            commands::predict(config, stats, seed, format)
        }
        Commands::Interactive => commands::interactive(config),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use std::io::{BufRead, Write};

    use burn::backend::{Autodiff, NdArray};
    use hoops::predict::{sweep, ChartData, Estimator, WinPctModel};
    use hoops::{HoopsError, TeamStats, WinPrediction};
    use serde::Serialize;

    use super::*;

    type MyBackend = NdArray<f32>;
    type MyAutodiffBackend = Autodiff<MyBackend>;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);
        Ok(())
    }

    pub fn train(mut config: Config, epochs: Option<usize>, seed: Option<u64>) -> Result<()> {
        if let Some(epochs) = epochs {
            config.training.epochs = epochs;
        }
        if seed.is_some() {
            config.training.seed = seed;
        }

        let mut estimator = Estimator::<MyAutodiffBackend>::new(config, Default::default());
        let report = estimator.train()?;

        println!("Training complete: {}", report);
        println!(
            "Best validation loss {:.5} at epoch {}",
            report.history.best_val_loss,
            report.history.best_epoch + 1
        );
        Ok(())
    }

    #[derive(Serialize)]
    struct PredictOutput<'a> {
        stats: &'a TeamStats,
        prediction: WinPrediction,
        chart: ChartData,
    }

    pub fn predict(
        mut config: Config,
        stats: TeamStats,
        seed: Option<u64>,
        format: OutputFormat,
    ) -> Result<()> {
        if seed.is_some() {
            config.training.seed = seed;
        }

        let mut estimator = Estimator::<MyAutodiffBackend>::new(config, Default::default());
        estimator.train()?;

        let prediction = estimator.predict(&stats)?;
        let chart = sweep(&estimator, &stats)?;

        match format {
            OutputFormat::Json => {
                let output = PredictOutput {
                    stats: &stats,
                    prediction,
                    chart,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => print_table(&stats, prediction, &chart),
        }
        Ok(())
    }

    fn print_table(stats: &TeamStats, prediction: WinPrediction, chart: &ChartData) {
        println!("Team: {}", stats);
        if let Some(actual) = stats.record_win_pct() {
            println!("Record win %: {:.1}%", actual * 100.0);
        }
        println!("Predicted win %: {}", prediction);
        println!();

        print!("{:<10}", "Offset");
        for label in &chart.labels {
            print!("{:>5}", label);
        }
        println!();
        println!("{}", "-".repeat(10 + 5 * chart.labels.len()));

        for series in &chart.datasets {
            print!("{:<10}", series.label);
            for value in &series.data {
                print!("{:>5}", value);
            }
            println!();
        }
    }

    /// Predictions are rejected with "not ready" until the worker finishes
    pub fn interactive(config: Config) -> Result<()> {
        let mut estimator = Estimator::<MyAutodiffBackend>::new(config, Default::default());
        estimator.spawn_training()?;

        println!("Training in the background. Enter: wins losses points rebounds assists");
        println!("Empty line or Ctrl-D to quit.");

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("> ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
                break;
            }

            estimator.poll();

            let stats: TeamStats = match line.parse() {
                Ok(stats) => stats,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            match estimator.predict(&stats) {
                Ok(prediction) => {
                    let chart = sweep(&estimator, &stats)?;
                    print_table(&stats, prediction, &chart);
                }
                Err(e @ (HoopsError::NotReady | HoopsError::NoGames)) => println!("{}", e),
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}
