mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use datarequest::config::PipelineSettings;
use datarequest::events::{FnListener, StatusChannel, StatusUpdate};
use datarequest::pipeline::{PipelineManager, PipelineReport};
use datarequest::plugins::builtin;
use datarequest::logging;
use std::process::ExitCode;
use std::sync::Arc;

fn settings_from(cli: &Cli) -> PipelineSettings {
    let plugin_root = cli
        .plugin_dir
        .clone()
        .unwrap_or_else(|| cli.config_dir.join("Plugins"));
    PipelineSettings::default()
        .with_config_root(cli.config_dir.clone())
        .with_plugin_root(plugin_root)
        .with_global_config_file(cli.global_config.clone())
}

async fn run(manager: &PipelineManager) -> Result<PipelineReport> {
    manager
        .execute()
        .await
        .context("DataRequestPipeline failed")
}

fn list_plugins(manager: &PipelineManager) {
    for (stage, ids) in manager.list_plugins() {
        if ids.is_empty() {
            println!("{stage}: (none)");
        } else {
            println!("{stage}: {}", ids.join(", "));
        }
    }
}

async fn real_main(cli: Cli) -> Result<()> {
    let settings = settings_from(&cli);
    let global = settings
        .config_store()
        .load_global(&settings.global_config_file)
        .context("loading global configuration")?;

    logging::init_for(&global, cli.log_level.as_deref())?;

    let status = Arc::new(StatusChannel::new());
    status.subscribe(Arc::new(FnListener::new(|update: &StatusUpdate| {
        println!("STATUS: {}", update.message);
    })));

    let manager = PipelineManager::with_global_config(
        settings,
        global,
        Arc::new(builtin::registry()),
        Arc::clone(&status),
    );

    let result = match cli.command.unwrap_or(Commands::Run { json: false }) {
        Commands::Plugins => {
            list_plugins(&manager);
            Ok(())
        }
        Commands::Run { json } => {
            tracing::info!("DataRequestPipeline starting...");
            let outcome = run(&manager).await;
            tracing::info!("DataRequestPipeline finished.");
            match outcome {
                Ok(report) if json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                Ok(_) => Ok(()),
                Err(err) => Err(err),
            }
        }
    };

    status.close();
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match real_main(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
