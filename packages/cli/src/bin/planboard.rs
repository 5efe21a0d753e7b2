use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;

mod cli;

use cli::projects::ProjectsCommands;
use planboard_cli::{init_tracing, run_server, Config};

#[derive(Parser)]
#[command(name = "planboard")]
#[command(about = "Planboard - day-by-day project planning boards")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (overrides PLANBOARD_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Inspect projects
    #[command(subcommand)]
    Projects(ProjectsCommands),
    /// Print a project's board as a day grid
    Board {
        /// Project ID
        project_id: String,
        /// Sub-project to show (defaults to the first one)
        #[arg(long)]
        sub_project: Option<String>,
    },
    /// Write a consistent copy of the database file
    Backup {
        /// Destination file
        dest: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if !matches!(command, Commands::Serve { .. }) {
        init_tracing("warn");
    }

    match command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            init_tracing("info");
            run_server(config).await
        }
        Commands::Projects(projects_cmd) => {
            cli::projects::handle_projects_command(&config, projects_cmd).await
        }
        Commands::Board {
            project_id,
            sub_project,
        } => cli::board::show_board(&config, &project_id, sub_project.as_deref()).await,
        Commands::Backup { dest } => cli::backup::write_backup(&config, &dest).await,
    }
}
