use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{
    open_manager, parse_date_or_today, ConfigCommand, FoodCommand, LogCommand, ProfileCommand,
    ShellCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "yada")]
#[command(version)]
#[command(about = "Yet Another Diet Assistant: track foods, daily calories and targets", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the food catalog
    Food(FoodCommand),

    /// Log food and show daily calories
    Log(LogCommand),

    /// Manage body metrics and calorie method
    Profile(ProfileCommand),

    /// Manage configuration
    Config(ConfigCommand),

    /// Interactive session with undo and redo
    Shell(ShellCommand),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    match command {
        Commands::Config(cmd) => cmd.run(&config, cli_config_path),
        Commands::Shell(cmd) => {
            let (manager, store) = open_manager(&config, parse_date_or_today(None)?)?;
            cmd.run(manager, store)
        }
        Commands::Food(cmd) => {
            let (mut manager, store) = open_manager(&config, parse_date_or_today(None)?)?;
            if cmd.apply(&mut manager)? {
                manager.save(&store)?;
            }
            Ok(())
        }
        Commands::Log(cmd) => {
            let date = parse_date_or_today(cmd.date.as_deref())?;
            let (mut manager, store) = open_manager(&config, date)?;
            if cmd.apply(&mut manager)? {
                manager.save(&store)?;
            }
            Ok(())
        }
        Commands::Profile(cmd) => {
            let (mut manager, store) = open_manager(&config, parse_date_or_today(None)?)?;
            if cmd.apply(&mut manager)? {
                manager.save(&store)?;
            }
            Ok(())
        }
    }
}
