use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use health_cost::config;
use health_cost::init_tracing;

fn print_version() {
    println!("Health Cost Estimator v{}", env!("CARGO_PKG_VERSION"));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli::Cli {
        config: config_path,
        command,
    } = cli::Cli::parse();

    // Version needs no configuration; a broken config file must not hide it
    if matches!(command, cli::Commands::Version) {
        print_version();
        return Ok(());
    }

    let cfg = config::load_config(&config_path)?;
    init_tracing(&cfg.logging.level, &cfg.logging.format);

    match command {
        cli::Commands::Estimate(estimate) => {
            commands::estimate::execute(&cfg, estimate).await?;
        }
        cli::Commands::Data { action } => match action {
            cli::DataCommands::Init { force } => commands::data::init(&cfg, force).await?,
            cli::DataCommands::Show => commands::data::show(&cfg).await?,
        },
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&config_path)?,
            cli::ConfigCommands::Validate => commands::config::validate(&config_path)?,
        },
        cli::Commands::Version => print_version(),
    }

    Ok(())
}
