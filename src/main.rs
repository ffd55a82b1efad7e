use caixa::args::{AddSubcommand, Args, Command, EditSubcommand, ListSubcommand};
use caixa::model::DEFAULT_CURRENCY;
use caixa::{commands, Config, ErrorType, IntoResult, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {}: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().caixa_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => {
            let config = load_config(home).await?;
            match add_args.entity() {
                AddSubcommand::Transaction(args) => {
                    commands::add_transaction(config, args.clone())
                        .await?
                        .print()
                }
                AddSubcommand::Bill(args) => commands::add_bill(config, args.clone()).await?.print(),
            }
        }

        Command::Edit(edit_args) => {
            let config = load_config(home).await?;
            match edit_args.entity() {
                EditSubcommand::Transactions(args) => {
                    let batch = commands::read_batch(args).await?;
                    commands::edit_transactions(config, batch).await?.print()
                }
                EditSubcommand::Bills(args) => {
                    let batch = commands::read_batch(args).await?;
                    commands::edit_bills(config, batch).await?.print()
                }
            }
        }

        Command::List(list_args) => {
            let config = load_config(home).await?;
            match list_args.entity() {
                ListSubcommand::Transactions(args) => {
                    commands::list_transactions(config, args.clone())
                        .await?
                        .print()
                }
                ListSubcommand::Bills(args) => {
                    commands::list_bills(config, args.clone()).await?.print()
                }
                ListSubcommand::Categories => commands::list_categories(config).await?.print(),
            }
        }

        Command::Summary => commands::summary(load_config(home).await?)
            .await?
            .print(),

        Command::Series(series_args) => {
            commands::series(load_config(home).await?, series_args.clone())
                .await?
                .print()
        }

        Command::Simulate(simulate_args) => {
            // The projection does not need the data files, only the currency symbol.
            let symbol = match Config::load(home).await {
                Ok(config) => config.currency_symbol().to_string(),
                Err(_) => DEFAULT_CURRENCY.to_string(),
            };
            commands::simulate(simulate_args, &symbol)?.print()
        }
    };
    Ok(())
}

async fn load_config(home: &Path) -> Result<Config> {
    Config::load(home).await.pub_result(ErrorType::Config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
