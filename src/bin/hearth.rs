//! Operator CLI for the house price core.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hearth::{AppCfg, Engine, FeatureRecord, RetrainOutcome};

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Retrain and query the house price model", version)]
struct Cli {
    /// Data directory holding models and the retrain history
    #[arg(long, global = true)]
    data_root: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrain from a CSV dataset and hot swap the active model
    Train {
        /// Path to the dataset
        #[arg(short, long)]
        dataset: PathBuf,

        /// Who requested the retrain
        #[arg(short, long, default_value = "admin")]
        actor: String,
    },

    /// Predict the price of one listing
    Predict {
        /// Listing as a JSON object
        #[arg(long, conflicts_with_all = ["location", "property_type", "furnishing"])]
        json: Option<String>,

        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        property_type: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        area: f64,
        #[arg(long, default_value_t = 0)]
        bhk: u32,
        #[arg(long, default_value_t = 0)]
        bath: u32,
        #[arg(long, default_value_t = 0)]
        balcony: u32,
        #[arg(long, default_value_t = 0)]
        parking: u32,
        #[arg(long)]
        furnishing: Option<String>,
        #[arg(long, default_value_t = 0)]
        age: u32,
    },

    /// Show the retrain history, newest first
    History {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut cfg = AppCfg::load();
    if let Some(root) = cli.data_root {
        cfg = cfg.with_data_root(root);
    }
    hearth::common::log::init(&cfg);

    match run(Engine::open(cfg), cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(engine: Engine, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Train { dataset, actor } => match engine.retrain_path(&actor, &dataset) {
            RetrainOutcome::Success(report) => {
                println!(
                    "retrained on {} ({} train / {} hold-out rows)",
                    report.dataset_name, report.train_rows, report.holdout_rows
                );
                if let Some(eval) = report.evaluation {
                    let r2 = eval.r2.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"));
                    println!("hold-out rmse {:.2}  mae {:.2}  r2 {r2}", eval.rmse, eval.mae);
                }
                Ok(())
            }
            RetrainOutcome::Failed { stage, error } => {
                Err(format!("retrain failed while {stage}: {error}").into())
            }
        },

        Commands::Predict {
            json,
            location,
            property_type,
            area,
            bhk,
            bath,
            balcony,
            parking,
            furnishing,
            age,
        } => {
            let record = match json {
                Some(json) => serde_json::from_str::<FeatureRecord>(&json)?,
                None => FeatureRecord {
                    location,
                    property_type,
                    area,
                    bhk,
                    bath,
                    balcony,
                    parking,
                    furnishing,
                    age,
                },
            };
            println!("{:.2}", engine.predict(&record)?);
            Ok(())
        }

        Commands::History { json } => {
            let history = engine.history()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
                return Ok(());
            }
            if let Some(at) = engine.last_retrained()? {
                println!("model last retrained {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            for record in history {
                println!(
                    "{}  {:<7}  {:<12}  {}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    format!("{:?}", record.status),
                    record.actor,
                    record.dataset_name
                );
            }
            Ok(())
        }
    }
}
