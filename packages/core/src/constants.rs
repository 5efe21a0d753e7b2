// ABOUTME: Shared constants and well-known filesystem locations
// ABOUTME: Default names and the ~/.planboard data directory

use std::env;
use std::path::PathBuf;

/// Name given to the seed sub-project of every new project
pub const DEFAULT_SUB_PROJECT_NAME: &str = "Main";

/// File name of the planning database inside the data directory
pub const DATABASE_FILE_NAME: &str = "planboard.db";

/// Get the path to the Planboard directory (~/.planboard)
pub fn planboard_dir() -> PathBuf {
    // HOME first so tests can redirect it
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".planboard")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".planboard")
    }
}

/// Get the default database path (~/.planboard/planboard.db)
pub fn database_file() -> PathBuf {
    planboard_dir().join(DATABASE_FILE_NAME)
}
