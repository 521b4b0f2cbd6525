// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! tosca-modeler CLI - topology modeling and live deployment

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tosca_modeler::commands::{self, apply::ApplyArgs, parse_key_val, topology::ExportFormat, Output};
use tosca_modeler::config;
use tosca_modeler::types::NodeTemplateInstanceState;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tosca-modeler")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "TOSCA_MODELER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Data directory override
    #[arg(long, env = "TOSCA_MODELER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Container API base URL override
    #[arg(long, env = "TOSCA_MODELER_CONTAINER_URL", global = true)]
    container_url: Option<String>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and validate the stored topology
    Topology {
        #[command(subcommand)]
        command: TopologyCommand,
    },

    /// Replay a JSON array of actions against the stored state
    Apply {
        /// Actions file
        path: PathBuf,

        /// Show outcomes without saving
        #[arg(long)]
        dry_run: bool,

        /// Fail if any action is rejected
        #[arg(long)]
        strict: bool,
    },

    /// Deploy a CSAR and enable live modeling
    Deploy {
        /// CSAR id, e.g. `MyApp.csar`
        csar: String,

        /// Build plan input as KEY=VALUE (repeatable)
        #[arg(short, long = "input", value_parser = parse_key_val)]
        inputs: Vec<(String, String)>,
    },

    /// Migrate the deployed instance to another CSAR
    Migrate {
        /// Target CSAR id
        target: String,

        /// Transformation plan input as KEY=VALUE (repeatable)
        #[arg(short, long = "input", value_parser = parse_key_val)]
        inputs: Vec<(String, String)>,
    },

    /// Terminate the deployed instance
    Terminate,

    /// Refresh node template instance states
    Refresh,

    /// Print the live modeling log
    Logs,

    /// List build plan inputs of a CSAR
    Inputs {
        /// CSAR id
        csar: String,

        /// Include inputs the container fills in
        #[arg(long)]
        all: bool,
    },

    /// Show the state of a service template or node template instance
    InstanceState {
        /// CSAR id
        csar: String,

        /// Service template instance id
        instance: String,

        /// Node template id
        #[arg(long)]
        node: Option<String>,

        /// Overwrite the node template instance state
        #[arg(long, requires = "node")]
        set: Option<NodeTemplateInstanceState>,
    },

    /// Show configuration
    Config {
        /// Configuration key (omit to print everything)
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum TopologyCommand {
    /// Print nodes and relationships
    Show,

    /// Export the topology
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value = "dot")]
        format: ExportFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check ids and relationship references
    Validate,

    /// Replace the stored state with a topology template JSON file
    Import {
        /// Topology template file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(url) = cli.container_url {
        config.container_url = url;
    }

    // Initialize logging; -v/-q win over the configured level
    let level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let out = Output {
        json: cli.json,
        color: !cli.no_color,
    };

    // Execute command
    match cli.command {
        Commands::Topology { command } => match command {
            TopologyCommand::Show => commands::topology::show(&config, out),
            TopologyCommand::Export { format, output } => {
                commands::topology::export(&config, format, output)
            }
            TopologyCommand::Validate => commands::topology::validate(&config, out),
            TopologyCommand::Import { path } => commands::topology::import(&config, &path),
        },
        Commands::Apply { path, dry_run, strict } => {
            commands::apply::run(&config, &path, &ApplyArgs { dry_run, strict }, out)
        }
        Commands::Deploy { csar, inputs } => commands::live::deploy(&config, &csar, inputs, out),
        Commands::Migrate { target, inputs } => {
            commands::live::migrate(&config, &target, inputs, out)
        }
        Commands::Terminate => commands::live::terminate(&config, out),
        Commands::Refresh => commands::live::refresh(&config, out),
        Commands::Logs => commands::live::logs(&config, out),
        Commands::Inputs { csar, all } => commands::live::inputs(&config, &csar, all, out),
        Commands::InstanceState { csar, instance, node, set } => {
            commands::live::instance_state(&config, &csar, &instance, node.as_deref(), set)
        }
        Commands::Config { key } => commands::config::run(&config, key.as_deref()),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
