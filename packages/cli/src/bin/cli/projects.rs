use clap::Subcommand;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use planboard_cli::Config;
use planboard_core::parse_id_str;
use planboard_projects::Board;

use super::utils::{format_timestamp, open_service, truncate};

#[derive(Subcommand)]
pub enum ProjectsCommands {
    /// List all projects
    List,
    /// Show project details
    Show {
        /// Project ID to show
        id: String,
        /// Print the full board projection as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_projects_command(
    config: &Config,
    command: ProjectsCommands,
) -> anyhow::Result<()> {
    match command {
        ProjectsCommands::List => list_projects(config).await,
        ProjectsCommands::Show { id, json } => show_project(config, &id, json).await,
    }
}

async fn list_projects(config: &Config) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let projects = service.list_projects().await?;

    if projects.is_empty() {
        println!("{}", "No projects found".yellow());
        println!(
            "{}",
            "Start the server with 'planboard serve' and create one from the board".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Planboard Projects".blue().bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["ID", "Name", "Start", "End", "Days", "Updated"]);

    for project in &projects {
        table.add_row(vec![
            project.id.to_string(),
            truncate(&project.name, 30),
            project.start_date.to_string(),
            project.end_date.to_string(),
            project.length_days.to_string(),
            format_timestamp(&project.updated_at),
        ]);
    }

    println!("{}", table);
    println!("Total: {} projects", projects.len().to_string().cyan());

    Ok(())
}

async fn show_project(config: &Config, id: &str, json: bool) -> anyhow::Result<()> {
    let project_id = parse_id_str(id)?;
    let service = open_service(config).await?;
    let board = service.get_board(project_id, None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    print_project_details(&board);
    Ok(())
}

fn print_project_details(board: &Board) {
    let project = &board.project;
    println!(
        "{}",
        format!("Project Details - {}", project.name).blue().bold()
    );
    println!();
    println!("{:<12} {}", "ID:".bold(), project.id);
    println!(
        "{:<12} {} to {} ({} days)",
        "Range:".bold(),
        project.start_date,
        project.end_date,
        project.length_days
    );
    println!("{:<12} {}", "Created:".bold(), format_timestamp(&project.created_at));
    println!("{:<12} {}", "Updated:".bold(), format_timestamp(&project.updated_at));
    println!();

    println!("{}", "Sub-projects".cyan().bold());
    for sub in &board.subprojects {
        let count = board
            .instances
            .iter()
            .filter(|instance| instance.sub_project_id == sub.id)
            .count();
        println!("  {:>4}  {}  {}", sub.id, sub.name, format!("({} placed)", count).dimmed());
    }
    println!();

    println!("{}", "Activities".cyan().bold());
    if board.activities.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for activity in &board.activities {
        let count = board
            .instances
            .iter()
            .filter(|instance| instance.activity_id == activity.id)
            .count();
        println!(
            "  {:>4}  {}  {}  {}",
            activity.id,
            activity.color,
            activity.name,
            format!("({} placed)", count).dimmed()
        );
    }
}
