/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of speedy.
 *
 * speedy is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * speedy is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with speedy. If not, see <https://www.gnu.org/licenses/>.
 */


mod data;
mod report;
mod settings;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use perf_estimation::{build_gear_profiles, compute_performance, summarize, CoreError};
use crate::data::{DataSet, DataSetError, DataSetStore, UnitSystem, ValidationError};
use crate::report::Report;
use crate::settings::GlobalSettings;


#[derive(Parser)]
#[command(name = "speedy")]
#[command(about = "Estimate how quickly a car accelerates between two speeds")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    json: bool,

    /// Speed unit for reports and --from/--to. Defaults to the configured unit system
    #[arg(long, global = true)]
    units: Option<UnitSystem>,

    /// Log more detail to speedy.log
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands
}

#[derive(Args)]
struct DataSource {
    /// Name of a saved dataset
    #[arg(long, conflicts_with = "file")]
    dataset: Option<String>,

    /// Path to a dataset json file
    #[arg(long)]
    file: Option<PathBuf>
}

#[derive(Subcommand)]
enum Commands {
    /// Time a run between two speeds. Uses the built in Miata if no dataset is given
    Compute {
        #[command(flatten)]
        source: DataSource,

        /// Starting speed, overrides the dataset's value
        #[arg(long)]
        from: Option<f64>,

        /// Target speed, overrides the dataset's value
        #[arg(long)]
        to: Option<f64>
    },

    /// Show power figures, top speeds and shift points for each gear
    Gears {
        #[command(flatten)]
        source: DataSource
    },

    /// Manage saved datasets
    #[command(subcommand)]
    Datasets(DatasetCommands)
}

#[derive(Subcommand)]
enum DatasetCommands {
    List,
    Show { name: String },
    /// Copy a dataset json file into the store, optionally under another name
    Save {
        name: Option<String>,
        #[arg(long)]
        file: PathBuf
    },
    Rename { old_name: String, new_name: String },
    Delete { name: String },
    /// Save the built in Miata, optionally under another name
    Preset { name: Option<String> }
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    DataSet(#[from] DataSetError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("failed to load settings. {0}")]
    Settings(#[from] config::ConfigError),
    #[error("failed to encode output. {0}")]
    Json(#[from] serde_json::Error)
}

impl AppError {
    fn exit_code(&self) -> u8 {
        match self {
            AppError::Validation(_) => 2,
            AppError::DataSet(DataSetError::NotFound(_)) => 3,
            AppError::DataSet(_) => 4,
            AppError::Core(CoreError::InvalidArgument(_)) => 5,
            AppError::Core(CoreError::UnreachableSpeed(_)) => 6,
            AppError::Core(CoreError::InsufficientTorque(_)) => 7,
            AppError::Settings(_) | AppError::Json(_) => 1
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace"
    };
    match env::current_dir() {
        Ok(current_dir) => {
            let file_appender = tracing_appender::rolling::never(current_dir, "speedy.log");
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
                .with_writer(file_appender)
                .with_ansi(false)
                .compact()
                .finish();
            match tracing::subscriber::set_global_default(subscriber) {
                Ok(_) => {
                    info!("Logging initialised");
                }
                Err(e) => {
                    eprintln!("Failed to init logging. {}", e.to_string());
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to init logging. Couldn't determine current dir {}", e.to_string());
        }
    }
}

fn load_dataset(store: &DataSetStore, source: &DataSource) -> Result<DataSet, AppError> {
    let data = match (&source.dataset, &source.file) {
        (Some(name), _) => store.load(name)?,
        (None, Some(path)) => store.read_file(path)?,
        (None, None) => DataSet::miata()
    };
    info!("Using dataset '{}'", data.car_name);
    Ok(data)
}

fn print_report(report: &Report, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let settings = GlobalSettings::load()?;
    let units = cli.units.unwrap_or_else(|| settings.unit_system());
    let store = DataSetStore::new(settings.dataset_path());

    match &cli.command {
        Commands::Compute { source, from, to } => {
            let data = load_dataset(&store, source)?;
            let check_speed = from.is_none() || to.is_none();
            let mut params = data.to_vehicle_parameters(check_speed)?;
            if let Some(from) = from {
                params.initial_speed = units.speed_to_si(*from);
            }
            if let Some(to) = to {
                params.final_speed = units.speed_to_si(*to);
            }
            let result = compute_performance(&params)?;
            let report = Report::from_result(&data.car_name,
                                             &result,
                                             units.speed_from_si(params.initial_speed),
                                             units.speed_from_si(params.final_speed),
                                             units);
            print_report(&report, cli.json)
        }
        Commands::Gears { source } => {
            let data = load_dataset(&store, source)?;
            let params = data.to_vehicle_parameters(false)?;
            let (profiles, _) = build_gear_profiles(&params)?;
            let summary = summarize(&profiles)?;
            print_report(&Report::from_summary(&data.car_name, &summary, units), cli.json)
        }
        Commands::Datasets(command) => run_dataset_command(&store, command, cli.json)
    }
}

fn run_dataset_command(store: &DataSetStore, command: &DatasetCommands, json: bool) -> Result<(), AppError> {
    match command {
        DatasetCommands::List => {
            let names = store.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else if names.is_empty() {
                println!("No datasets saved in {}", store.root().display());
            } else {
                names.iter().for_each(|name| println!("{}", name));
            }
        }
        DatasetCommands::Show { name } => {
            let data = store.load(name)?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        DatasetCommands::Save { name, file } => {
            let mut data = store.read_file(file)?;
            if let Some(name) = name {
                data.car_name = name.clone();
            }
            data.validate(false)?;
            let path = store.save(&data)?;
            println!("Saved '{}' to {}", data.car_name, path.display());
        }
        DatasetCommands::Rename { old_name, new_name } => {
            let path = store.rename(old_name, new_name)?;
            println!("Renamed '{}' to '{}' ({})", old_name, new_name, path.display());
        }
        DatasetCommands::Delete { name } => {
            store.delete(name)?;
            println!("Deleted '{}'", name);
        }
        DatasetCommands::Preset { name } => {
            let mut data = DataSet::miata();
            if let Some(name) = name {
                data.car_name = name.clone();
            }
            let path = store.save(&data)?;
            println!("Saved '{}' to {}", data.car_name, path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if let AppError::Validation(invalid) = &e {
                eprintln!("Fix the {} section of the dataset.", invalid.section());
            }
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
