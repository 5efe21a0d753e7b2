use anyhow::Context;
use chrono::{DateTime, Local, Utc};

use planboard_cli::Config;
use planboard_projects::PlanningService;

/// Open the planning service on the configured database.
pub async fn open_service(config: &Config) -> anyhow::Result<PlanningService> {
    PlanningService::open(config.store_config())
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

/// Parse a `#RRGGBB` color into its components.
pub fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
