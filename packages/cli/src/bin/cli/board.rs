use chrono::Datelike;
use colored::*;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color,
    ContentArrangement, Table,
};

use planboard_cli::Config;
use planboard_core::parse_id_str;
use planboard_projects::Board;

use super::utils::{hex_rgb, open_service};

const MARK: &str = "■";

pub async fn show_board(
    config: &Config,
    project_id: &str,
    sub_project_id: Option<&str>,
) -> anyhow::Result<()> {
    let project_id = parse_id_str(project_id)?;
    let sub_project_id = sub_project_id.map(parse_id_str).transpose()?;

    let service = open_service(config).await?;
    let board = service.get_board(project_id, sub_project_id).await?;

    let active_name = board
        .subprojects
        .iter()
        .find(|sub| Some(sub.id) == board.active_sub_project_id)
        .map(|sub| sub.name.as_str())
        .unwrap_or("-");

    println!(
        "{} {}",
        board.project.name.blue().bold(),
        format!(
            "{} to {} / {}",
            board.project.start_date, board.project.end_date, active_name
        )
        .dimmed()
    );
    println!();

    if board.activities.is_empty() {
        println!("{}", "No activities yet".yellow());
        return Ok(());
    }

    println!("{}", build_grid(&board));
    Ok(())
}

/// One row per activity, one column per project day. Weekend columns are dimmed.
pub fn build_grid(board: &Board) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Disabled);

    let mut header = vec![Cell::new("Activity").add_attribute(Attribute::Bold)];
    for day in &board.days {
        let date = day.date.date();
        let label = format!("{:02}\n{}", date.day(), &date.weekday().to_string()[..2]);
        let cell = Cell::new(label).set_alignment(CellAlignment::Center);
        header.push(if day.is_weekend {
            cell.add_attribute(Attribute::Dim)
        } else {
            cell
        });
    }
    table.set_header(header);

    for activity in &board.activities {
        let color = hex_rgb(&activity.color).map(|(r, g, b)| Color::Rgb { r, g, b });
        let mut row = vec![Cell::new(&activity.name)];
        for day in &board.days {
            let cell = match board.cell(activity.id, day.date) {
                Some(_) => {
                    let mark = Cell::new(MARK).set_alignment(CellAlignment::Center);
                    match color {
                        Some(color) => mark.fg(color),
                        None => mark,
                    }
                }
                None if day.is_weekend => Cell::new("·")
                    .set_alignment(CellAlignment::Center)
                    .add_attribute(Attribute::Dim),
                None => Cell::new(""),
            };
            row.push(cell);
        }
        table.add_row(row);
    }

    table
}
