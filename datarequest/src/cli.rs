use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datarequest")]
#[command(author, version, about = "Staged data request pipeline with plugin rollback")]
pub struct Cli {
    /// Directory holding global.json and the per-stage config files
    #[arg(short, long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    /// Directory holding one plugin directory per stage [default: <config-dir>/Plugins]
    #[arg(short, long, global = true)]
    pub plugin_dir: Option<PathBuf>,

    /// Global configuration file name, relative to the config directory
    #[arg(long, global = true, default_value = "global.json")]
    pub global_config: PathBuf,

    /// Log filter directive, overriding the configured verbosity
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every stage of the pipeline (the default)
    Run {
        /// Print the run report as JSON on success
        #[arg(long)]
        json: bool,
    },

    /// List the plugins discoverable in each stage directory
    Plugins,
}
