use clap::Parser;
use quorum::channels::console::{run_stdin_loop, ConsoleChannel};
use quorum::channels::MessageHandler;
use quorum::cli::{self, Cli, Command, ConfigCommand};
use quorum::config;
use quorum::dispatch::Dispatcher;
use quorum::poll::create_controller;
use quorum::render::CsvRenderer;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let config_path = config::resolve_config_path(args.config.clone());

    let result = match args.command {
        Some(Command::Version) => {
            cli::handle_version();
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => cli::handle_config_show(&config_path),
        Some(Command::Config(ConfigCommand::Path)) => {
            println!("{}", config_path.display());
            Ok(())
        }
        Some(Command::Run) | None => run(&config_path).await,
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = config::load_config(config_path)?;
    info!(
        control = %config.control_channel,
        display = %config.display_channel,
        "starting quorum"
    );

    let controller = create_controller(config.control_channel.as_str(), config.poll.clone());
    let sink = Arc::new(ConsoleChannel::new(config.command_prefix.as_str()));
    let renderer = Arc::new(CsvRenderer::new(config.artifact_dir.clone()));
    let dispatcher: Arc<dyn MessageHandler> = Arc::new(Dispatcher::new(
        controller,
        sink,
        renderer,
        config.command_prefix.as_str(),
        config.display_channel.as_str(),
    ));

    println!(
        "quorum ready; input lines look like: alice#{} {}start question|answer|answer",
        config.control_channel, config.command_prefix
    );

    tokio::select! {
        result = run_stdin_loop(dispatcher) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}
