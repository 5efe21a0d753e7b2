use std::path::Path;

use colored::*;

use planboard_cli::Config;

use super::utils::open_service;

pub async fn write_backup(config: &Config, dest: &Path) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let bytes = service.store().backup_to(dest).await?;
    service.store().close().await;

    println!(
        "{} Backup of {} written to {} ({} bytes)",
        "✓".green(),
        config.db_path.display(),
        dest.display(),
        bytes.to_string().cyan()
    );
    Ok(())
}
