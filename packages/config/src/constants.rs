// ABOUTME: Environment variable name constants and their defaults
// ABOUTME: Centralized definitions of every environment variable Planboard reads

// Storage Configuration
pub const PLANBOARD_DB_PATH: &str = "PLANBOARD_DB_PATH";
pub const PLANBOARD_MAX_CONNECTIONS: &str = "PLANBOARD_MAX_CONNECTIONS";

// Server Configuration
pub const PLANBOARD_PORT: &str = "PLANBOARD_PORT";
pub const PLANBOARD_CORS_ORIGIN: &str = "PLANBOARD_CORS_ORIGIN";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";

// Defaults
pub const DEFAULT_PORT: u16 = 4001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;
